//! Watchlist Core Library
//!
//! This crate provides the core functionality for Watchlist, a local
//! organizer for movies and TV shows sorted into four fixed categories.
//!
//! # Architecture
//!
//! - **CategoryStore**: sole owner of all items; every operation is one
//!   atomic transition between valid snapshots
//! - **SnapshotStorage**: durable home for snapshots (JSON file, in-memory,
//!   or write-behind wrapper around either)
//! - **SearchProvider**: black-box remote lookup returning candidates
//!
//! # Quick Start
//!
//! ```text
//! let config = Config::load()?;
//! let mut store = CategoryStore::open(FileStorage::new(&config));
//!
//! // Add an item
//! let item = Item::new("Arrival", "", MediaKind::Movie)?;
//! let id = item.id.clone();
//! store.add(item, Category::PlanningToWatch)?;
//!
//! // Drag it to the top of "watched"
//! store.move_item(&id, Category::PlanningToWatch, Category::Watched, 0);
//! ```
//!
//! # Modules
//!
//! - `store`: Category store and its events (main entry point)
//! - `models`: Items, categories, scores and patches
//! - `snapshot`: Serializable store state and its validation
//! - `storage`: Snapshot persistence
//! - `search`: Provider contract and debounced search sessions
//! - `selection`: "Currently editing" reference kept in sync with events
//! - `config`: Application configuration

pub mod config;
pub mod error;
pub mod models;
pub mod search;
pub mod selection;
pub mod snapshot;
pub mod storage;
pub mod store;

pub use config::Config;
pub use error::{StoreError, StoreResult, ValidationError};
pub use models::{Category, Item, ItemId, ItemPatch, KindFilter, MediaKind, Score};
pub use search::{
    CandidateItem, Candidates, CombinedProvider, SearchOutcome, SearchProvider, SearchSession,
};
pub use selection::EditSelection;
pub use snapshot::Snapshot;
pub use storage::{
    FileStorage, LoadOutcome, LoadWarning, MemoryStorage, SnapshotStorage, StorageError,
    WriteBehind,
};
pub use store::{CategoryStore, StoreEvent};
