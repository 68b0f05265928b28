//! "Currently editing" reference held by a presentation layer
//!
//! The store never hands out long-lived references to items. A UI that keeps
//! an item open for editing instead holds its ID and category here and feeds
//! every [`StoreEvent`] through [`EditSelection::apply`], which drops the
//! reference once the item is gone.

use crate::models::{Category, ItemId};
use crate::store::StoreEvent;

/// The item currently open for editing, if any
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditSelection {
    current: Option<(ItemId, Category)>,
}

impl EditSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open an item for editing
    pub fn select(&mut self, id: ItemId, category: Category) {
        self.current = Some((id, category));
    }

    pub fn clear(&mut self) {
        self.current = None;
    }

    pub fn id(&self) -> Option<&ItemId> {
        self.current.as_ref().map(|(id, _)| id)
    }

    pub fn category(&self) -> Option<Category> {
        self.current.as_ref().map(|(_, category)| *category)
    }

    pub fn is_selected(&self, id: &ItemId) -> bool {
        self.id() == Some(id)
    }

    /// React to a store event
    ///
    /// Returns true if the selection changed.
    pub fn apply(&mut self, event: &StoreEvent) -> bool {
        match event {
            StoreEvent::ItemDeleted { id, .. } if self.is_selected(id) => {
                self.current = None;
                true
            }
            StoreEvent::ItemMoved { id, to, .. } if self.is_selected(id) => {
                // Follow the item so later updates target the right list
                let changed = self.category() != Some(*to);
                if let Some((_, category)) = self.current.as_mut() {
                    *category = *to;
                }
                changed
            }
            // Import may or may not keep the item; the caller re-checks
            StoreEvent::Replaced if self.current.is_some() => {
                self.current = None;
                true
            }
            _ => false,
        }
    }
}
