//! Storage layer
//!
//! Persists store snapshots.
//!
//! ## Architecture
//!
//! - **SnapshotStorage**: the load/save boundary the store is generic over
//! - **FileStorage**: JSON file, atomic writes, backup of malformed data
//! - **MemoryStorage**: in-process storage for tests and scratch sessions
//! - **WriteBehind**: queues saves for a single background writer so
//!   mutations never wait on disk and writes stay in issuance order

pub mod error;
pub mod persistence;
pub mod write_behind;

pub use error::{StorageError, StorageResult};
pub use persistence::{FileStorage, LoadOutcome, LoadWarning, MemoryStorage, SnapshotStorage};
pub use write_behind::WriteBehind;
