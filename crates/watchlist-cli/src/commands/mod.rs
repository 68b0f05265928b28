//! Command handlers
//!
//! Handlers are generic over the storage backend so they run the same
//! against the on-disk store and an in-memory one.

pub mod config;
pub mod data;
pub mod item;
pub mod search;
pub mod status;

use anyhow::{bail, Result};

use watchlist_core::{Category, CategoryStore, ItemId, SnapshotStorage};

/// Resolve an item ID (full ID or unique prefix) to where it lives
pub fn resolve_id<S: SnapshotStorage>(
    store: &CategoryStore<S>,
    id: &str,
) -> Result<(ItemId, Category)> {
    let exact = ItemId::from(id);
    if let Some((category, _)) = store.locate(&exact) {
        return Ok((exact, category));
    }

    let snapshot = store.snapshot();
    let matches: Vec<_> = snapshot
        .categories()
        .flat_map(|(category, items)| items.iter().map(move |item| (category, item)))
        .filter(|(_, item)| item.id.as_str().starts_with(id))
        .collect();

    match matches.as_slice() {
        [] => bail!("No item found matching: {}", id),
        [(category, item)] => Ok((item.id.clone(), *category)),
        _ => {
            eprintln!("Multiple items match '{}':", id);
            for (category, item) in &matches {
                eprintln!("  {} - {} ({})", item.id, item.title, category.title());
            }
            bail!("Ambiguous ID. Please provide more characters.");
        }
    }
}
