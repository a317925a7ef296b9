//! Filesystem-backed adapters.

pub mod metadata_store;

pub use metadata_store::FsMetadataStore;
