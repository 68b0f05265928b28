//! Item command handlers

use anyhow::{anyhow, bail, Context, Result};

use watchlist_core::{
    Category, CategoryStore, Item, ItemPatch, KindFilter, MediaKind, Score, SnapshotStorage,
};

use super::resolve_id;
use crate::editor::{confirm, edit_text, is_interactive, prompt_optional, prompt_with_default};
use crate::output::Output;

/// Field changes requested on the command line
#[derive(Debug, Default)]
pub struct EditArgs {
    pub title: Option<String>,
    pub poster: Option<String>,
    pub score: Option<u8>,
    pub clear_score: bool,
    pub notes: Option<String>,
    pub edit_notes: bool,
}

/// List items, one section per category
pub fn list<S: SnapshotStorage>(
    store: &CategoryStore<S>,
    category: Option<Category>,
    kind: KindFilter,
    output: &Output,
) -> Result<()> {
    let categories: Vec<Category> = match category {
        Some(c) => vec![c],
        None => Category::ALL.to_vec(),
    };

    let sections: Vec<(Category, Vec<&Item>)> = categories
        .into_iter()
        .map(|c| (c, store.filtered(c, kind)))
        .collect();

    output.print_sections(&sections, kind.label());
    Ok(())
}

/// Show a single item
pub fn show<S: SnapshotStorage>(store: &CategoryStore<S>, id: String, output: &Output) -> Result<()> {
    let (id, category) = resolve_id(store, &id)?;
    let item = store
        .get(&id)
        .ok_or_else(|| anyhow!("Item not found: {}", id))?;

    output.print_item(item, category);
    Ok(())
}

/// Add an item by hand
pub fn add<S: SnapshotStorage>(
    store: &mut CategoryStore<S>,
    title: String,
    poster: String,
    kind: MediaKind,
    category: Category,
    output: &Output,
) -> Result<()> {
    let item = Item::new(title.trim(), poster.trim(), kind).context("Invalid item")?;

    store
        .add(item.clone(), category)
        .context("Failed to add item")?;

    output.success(&format!("Added '{}' to {}", item.title, category.title()));
    output.print_item(&item, category);
    Ok(())
}

/// Edit an item's title, poster, score or notes
///
/// With no field flags on a terminal, prompts for each field.
pub fn edit<S: SnapshotStorage>(
    store: &mut CategoryStore<S>,
    id: String,
    args: EditArgs,
    output: &Output,
) -> Result<()> {
    let (id, category) = resolve_id(store, &id)?;
    let current = store
        .get(&id)
        .cloned()
        .ok_or_else(|| anyhow!("Item not found: {}", id))?;

    let mut patch = patch_from_args(&args)?;

    if args.edit_notes {
        let notes = edit_text(current.notes.as_deref().unwrap_or(""))?;
        patch = patch.notes(notes);
    }

    if patch.is_empty() && output.should_prompt() && is_interactive() {
        patch = prompt_patch(&current)?;
    }

    if patch.is_empty() {
        output.message("Nothing to change.");
        return Ok(());
    }

    let updated = store
        .update(&id, category, &patch)
        .context("Failed to update item")?;

    output.success("Item updated");
    output.print_item(&updated, category);
    Ok(())
}

/// Delete an item
pub fn delete<S: SnapshotStorage>(
    store: &mut CategoryStore<S>,
    id: String,
    yes: bool,
    output: &Output,
) -> Result<()> {
    let (id, category) = resolve_id(store, &id)?;

    if !yes && output.should_prompt() && is_interactive() {
        if let Some(item) = store.get(&id) {
            println!("Delete: {} ({})", item.title, category.title());
        }
        if !confirm("Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let title = store.get(&id).map(|i| i.title.clone()).unwrap_or_default();
    store.delete(&id, category);

    output.success(&format!("Deleted '{}' from {}", title, category.title()));
    Ok(())
}

/// Move an item to a position in a category
///
/// `position` is 1-based, the same as the position reported back. Without
/// it the item goes to the end. With a kind filter the position counts only
/// items of that kind, as in a filtered column.
pub fn move_item<S: SnapshotStorage>(
    store: &mut CategoryStore<S>,
    id: String,
    to: Category,
    position: Option<usize>,
    kind: KindFilter,
    output: &Output,
) -> Result<()> {
    let index = match position {
        None => usize::MAX,
        Some(0) => bail!("Positions start at 1"),
        Some(n) => n - 1,
    };
    let (id, from) = resolve_id(store, &id)?;

    let moved = match kind {
        KindFilter::All => store.move_item(&id, from, to, index),
        filter => store.move_in_view(&id, from, to, index, filter),
    };
    if !moved {
        return Err(anyhow!("Item {} is no longer in {}", id, from.title()));
    }

    let (category, position) = store
        .locate(&id)
        .ok_or_else(|| anyhow!("Item not found after move: {}", id))?;
    let title = store.get(&id).map(|i| i.title.as_str()).unwrap_or_default();

    output.success(&format!(
        "Moved '{}' to {} (position {})",
        title,
        category.title(),
        position + 1
    ));
    Ok(())
}

fn patch_from_args(args: &EditArgs) -> Result<ItemPatch> {
    let mut patch = ItemPatch::new();

    if let Some(ref title) = args.title {
        patch = patch.title(title.trim());
    }
    if let Some(ref poster) = args.poster {
        patch = patch.poster(poster.trim());
    }
    if args.clear_score {
        patch = patch.score(None);
    } else if let Some(score) = args.score {
        patch = patch.score(Some(Score::new(score).context("Invalid score")?));
    }
    if let Some(ref notes) = args.notes {
        patch = patch.notes(notes.as_str());
    }

    Ok(patch)
}

/// Ask for each field, keeping the current value on an empty answer
fn prompt_patch(current: &Item) -> Result<ItemPatch> {
    println!("Editing: {}", current.title);
    println!("Press Enter to keep current value, or type new value.\n");

    let mut patch = ItemPatch::new();

    if let Some(title) = prompt_with_default("Title", &current.title)? {
        patch = patch.title(title);
    }

    if let Some(poster) = prompt_with_default("Poster URL", &current.poster)? {
        patch = patch.poster(poster);
    }

    let score = current.score.map(|s| s.to_string()).unwrap_or_default();
    if let Some(answer) = prompt_with_default("Score 1-10 (same value again clears it)", &score)? {
        let value: u8 = answer.parse().context("Score must be a number from 1 to 10")?;
        let picked = Score::new(value).context("Invalid score")?;
        patch.score = ItemPatch::toggle_score(current.score, picked).score;
    }

    println!("Current notes: {}", current.notes.as_deref().unwrap_or("(none)"));
    if let Some(notes) = prompt_optional("New notes (\"-\" to clear)")? {
        patch = patch.notes(if notes == "-" { String::new() } else { notes });
    }

    Ok(patch)
}
