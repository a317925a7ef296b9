//! Infrastructure adapters for external systems.

pub mod filesystem;
pub mod substrates;
pub mod verifiers;
