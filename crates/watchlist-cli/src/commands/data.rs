//! Export and import handlers

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use watchlist_core::config::SNAPSHOT_FILE_NAME;
use watchlist_core::{CategoryStore, SnapshotStorage};

use crate::output::Output;

/// Write the whole list as pretty-printed JSON
///
/// Defaults to `watchlist.json` in the current directory; `-` writes to
/// stdout.
pub fn export<S: SnapshotStorage>(
    store: &CategoryStore<S>,
    path: Option<PathBuf>,
    output: &Output,
) -> Result<()> {
    let snapshot = store.snapshot();
    let json = snapshot.to_pretty_json();

    let path = path.unwrap_or_else(|| PathBuf::from(SNAPSHOT_FILE_NAME));
    if path == Path::new("-") {
        println!("{}", json);
        return Ok(());
    }

    fs::write(&path, format!("{}\n", json))
        .with_context(|| format!("Failed to write export file: {:?}", path))?;

    output.success(&format!(
        "Exported {} item(s) to {}",
        snapshot.len(),
        path.display()
    ));
    Ok(())
}

/// Replace the whole list with the contents of an export file
///
/// An invalid file is rejected as a whole and the list is left untouched.
pub fn import<S: SnapshotStorage>(
    store: &mut CategoryStore<S>,
    path: PathBuf,
    output: &Output,
) -> Result<()> {
    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read import file: {:?}", path))?;

    store
        .import_json(&content)
        .with_context(|| format!("Import rejected: {}", path.display()))?;

    output.success(&format!(
        "Imported {} item(s) from {}",
        store.len(),
        path.display()
    ));
    Ok(())
}
