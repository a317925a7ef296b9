//! CLI command implementations.

pub mod games;
pub mod improve;
pub mod init;
pub mod session;
