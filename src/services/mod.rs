//! Session policy and the services that orchestrate an improvement.

pub mod game_locks;
pub mod handler_registry;
pub mod improvement_service;
pub mod reference_guard;
pub mod session_policy;
pub mod usage_accumulator;

pub use game_locks::{GameLockGuard, GameLocks};
pub use handler_registry::GameRegistry;
pub use improvement_service::ImprovementService;
pub use reference_guard::ReferenceGuard;
pub use session_policy::SessionPolicy;
pub use usage_accumulator::UsageAccumulator;
