//! Post-edit verifier implementations.

pub mod fixed;
pub mod typescript;

pub use fixed::FixedVerifier;
pub use typescript::TypeScriptVerifier;
