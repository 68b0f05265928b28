//! Status command handler

use anyhow::Result;

use watchlist_core::{CategoryStore, Config, FileStorage, WriteBehind};

use crate::output::{Output, OutputFormat};

/// Show storage location and per-category counts
pub fn show(
    store: &CategoryStore<WriteBehind<FileStorage>>,
    config: &Config,
    output: &Output,
) -> Result<()> {
    let file = store.storage().inner();
    let counts = store.counts();

    match output.format {
        OutputFormat::Json => {
            println!("{}", summary(store));
        }
        OutputFormat::Quiet => {
            println!("{}", store.len());
        }
        OutputFormat::Human => {
            println!("Watchlist Status");
            println!("================");
            println!();
            println!("Storage:");
            println!("  Location: {}", file.path().display());
            if file.exists() {
                println!("  Size:     {} bytes", file.size());
            } else {
                println!("  Size:     (not saved yet, showing the default list)");
            }
            println!();
            println!("Contents:");
            for (category, count) in counts {
                println!("  {:<19} {}", format!("{}:", category.title()), count);
            }
            println!("  {:<19} {}", "Total:", store.len());
            println!();
            println!("Search:");
            println!("  Debounce: {} ms", config.search_debounce_ms);
            println!("  Limit:    {}", config.search_limit);
        }
    }

    Ok(())
}

fn summary(store: &CategoryStore<WriteBehind<FileStorage>>) -> serde_json::Value {
    let file = store.storage().inner();
    let per_category: serde_json::Map<String, serde_json::Value> = store
        .counts()
        .iter()
        .map(|(c, n)| (c.key().to_string(), serde_json::json!(n)))
        .collect();

    serde_json::json!({
        "snapshot_path": file.path(),
        "snapshot_exists": file.exists(),
        "snapshot_size": file.size(),
        "total": store.len(),
        "counts": per_category
    })
}
