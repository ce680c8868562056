/// Write-once sink for snapshots of deleted entities.
pub mod archive;
/// Typed wrapper turning entity records into store documents.
pub mod collection;
/// In-process document store.
#[cfg(feature = "memory-store")]
pub mod memory;
/// Database model definitions.
pub mod models;
/// MongoDB-backed document store.
#[cfg(feature = "mongo-store")]
pub mod mongodb;
/// Storage abstraction layer for database operations.
pub mod storage;
/// Backend-agnostic document store trait.
pub mod store;
