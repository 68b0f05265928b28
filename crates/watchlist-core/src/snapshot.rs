//! Snapshot: the complete serializable state of the store
//!
//! The JSON layout is shared by local persistence, export and import:
//!
//! ```text
//! {
//!   "watched": [Item...],
//!   "currentlyWatching": [Item...],
//!   "planningToWatch": [Item...],
//!   "dropped": [Item...]
//! }
//! ```
//!
//! Parsing goes through [`Snapshot::from_json`], which validates the whole
//! document before building anything, so a rejected document never yields a
//! partial snapshot.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ValidationError;
use crate::models::{Category, Item, ItemId, MediaKind, Score};

/// Items partitioned by category, order significant within each list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Snapshot {
    pub watched: Vec<Item>,
    pub currently_watching: Vec<Item>,
    pub planning_to_watch: Vec<Item>,
    pub dropped: Vec<Item>,
}

impl Snapshot {
    /// An empty snapshot with all four categories present
    pub fn empty() -> Self {
        Self::default()
    }

    /// Items of one category, in order
    pub fn items(&self, category: Category) -> &[Item] {
        match category {
            Category::Watched => &self.watched,
            Category::CurrentlyWatching => &self.currently_watching,
            Category::PlanningToWatch => &self.planning_to_watch,
            Category::Dropped => &self.dropped,
        }
    }

    pub(crate) fn items_mut(&mut self, category: Category) -> &mut Vec<Item> {
        match category {
            Category::Watched => &mut self.watched,
            Category::CurrentlyWatching => &mut self.currently_watching,
            Category::PlanningToWatch => &mut self.planning_to_watch,
            Category::Dropped => &mut self.dropped,
        }
    }

    /// Iterate `(category, items)` in display order
    pub fn categories(&self) -> impl Iterator<Item = (Category, &[Item])> {
        Category::ALL.into_iter().map(move |c| (c, self.items(c)))
    }

    /// Find an item anywhere: its category and position
    pub fn locate(&self, id: &ItemId) -> Option<(Category, usize)> {
        self.categories().find_map(|(category, items)| {
            items
                .iter()
                .position(|item| &item.id == id)
                .map(|index| (category, index))
        })
    }

    /// Look up an item by ID across all categories
    pub fn get(&self, id: &ItemId) -> Option<&Item> {
        self.locate(id).map(|(c, i)| &self.items(c)[i])
    }

    /// Total number of items across all categories
    pub fn len(&self) -> usize {
        self.categories().map(|(_, items)| items.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check the store-wide ID uniqueness invariant
    pub fn check_unique_ids(&self) -> Result<(), ValidationError> {
        let mut seen: HashSet<&ItemId> = HashSet::with_capacity(self.len());
        for (category, items) in self.categories() {
            for (index, item) in items.iter().enumerate() {
                if !seen.insert(&item.id) {
                    return Err(ValidationError::DuplicateId {
                        path: format!("{}[{}].id", category.key(), index),
                        id: item.id.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Check every data-model invariant a typed snapshot can still violate
    ///
    /// Kinds and scores are enforced by their types; titles and store-wide
    /// ID uniqueness are not.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (category, items) in self.categories() {
            if let Some(index) = items.iter().position(|item| item.title.trim().is_empty()) {
                return Err(ValidationError::EmptyTitle {
                    path: format!("{}[{}].title", category.key(), index),
                });
            }
        }
        self.check_unique_ids()
    }

    /// Serialize as pretty-printed JSON (export format)
    pub fn to_pretty_json(&self) -> String {
        // Serializing plain strings, integers and vecs cannot fail
        serde_json::to_string_pretty(self).unwrap_or_else(|_| String::from("{}"))
    }

    /// Serialize as compact JSON (local persistence format)
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| String::from("{}"))
    }

    /// Parse and validate a snapshot document
    pub fn from_json(input: &str) -> Result<Self, ValidationError> {
        let value: Value =
            serde_json::from_str(input).map_err(|e| ValidationError::Syntax(e.to_string()))?;
        Self::from_value(&value)
    }

    /// Validate an already-parsed JSON value and build a snapshot from it
    pub fn from_value(value: &Value) -> Result<Self, ValidationError> {
        let object = value.as_object().ok_or(ValidationError::NotAnObject)?;

        if let Some(unknown) = object
            .keys()
            .find(|key| !Category::ALL.iter().any(|c| c.key() == key.as_str()))
        {
            return Err(ValidationError::UnknownCategory(unknown.clone()));
        }

        let mut snapshot = Snapshot::empty();
        for category in Category::ALL {
            let list = object
                .get(category.key())
                .ok_or_else(|| ValidationError::MissingCategory(category.key().to_string()))?
                .as_array()
                .ok_or_else(|| ValidationError::NotAList(category.key().to_string()))?;

            let items = snapshot.items_mut(category);
            for (index, entry) in list.iter().enumerate() {
                let path = format!("{}[{}]", category.key(), index);
                items.push(parse_item(entry, &path)?);
            }
        }

        snapshot.check_unique_ids()?;
        Ok(snapshot)
    }

    /// Built-in content used when nothing has been saved yet
    pub fn sample() -> Self {
        fn entry(id: &str, title: &str, poster: &str, kind: MediaKind, score: Option<u8>) -> Item {
            Item {
                id: ItemId::from(id),
                title: title.to_string(),
                poster: format!("https://m.media-amazon.com/images/M/{}._V1_SX300.jpg", poster),
                kind,
                score: score.and_then(|s| Score::new(s).ok()),
                notes: None,
            }
        }

        use MediaKind::{Movie, Tv};
        Snapshot {
            watched: vec![
                entry("1", "Inception", "MV5BMjAxMzY3NjcxNF5BMl5BanBnXkFtZTcwNTI5OTM0Mw@@", Movie, Some(9)),
                entry("2", "Breaking Bad", "MV5BYmQ4YWMxYjUtNjZmYi00MDQ1LWFjMjMtNjA5ZDdiYjdiODU5XkEyXkFqcGdeQXVyMTMzNDExODE5", Tv, Some(10)),
                entry("3", "The Dark Knight", "MV5BMTMxNTMwODM0NF5BMl5BanBnXkFtZTcwODAyMTk2Mw@@", Movie, Some(9)),
            ],
            currently_watching: vec![
                entry("4", "Stranger Things", "MV5BN2ZmYjg1YmItNWQ4OC00YWM0LWE0ZDktYThjOTZiZjhhN2Q2XkEyXkFqcGdeQXVyNjgxNTQ3Mjk@", Tv, Some(8)),
                entry("5", "Dune", "MV5BN2FjNmEyNWMtYzM0ZS00NjIyLTg5YzYtYThlMGVjNzE1OGViXkEyXkFqcGdeQXVyMTkxNjUyNQ@@", Movie, Some(8)),
                entry("6", "The Last of Us", "MV5BZGUzYTI3NzUtZDI5MS00MGZiLTk0YWItMzg3Y2JlZTk1NTZiXkEyXkFqcGdeQXVyNTM0OTY1OQ@@", Tv, None),
            ],
            planning_to_watch: vec![
                entry("7", "Oppenheimer", "MV5BMDBmYTZjNjUtN2M1MS00MTQ2LTk2ODgtNzc2M2QyZGE5NTVjXkEyXkFqcGdeQXVyNzAwMjU2MTY@", Movie, None),
                entry("8", "The Wire", "MV5BZmY5ZDMxODEtNWIwOS00NjdkLTkyMGYtZGE2NTkzNTdhZmJjXkEyXkFqcGdeQXVyNTA4NzY1MzY@", Tv, None),
                entry("9", "Interstellar", "MV5BZjdkOTU3MDktN2IxOS00OGEyLWFmMjktY2FiMmZkNWIyODZiXkEyXkFqcGdeQXVyMTMxODk2OTU@", Movie, None),
                entry("10", "True Detective", "MV5BMmRlYmE0NTgtNDZhNS00ZTRkLTk5N2YtNDJhMGM1MjEyMDBmXkEyXkFqcGdeQXVyNjU2NjA5NjM@", Tv, None),
            ],
            dropped: vec![
                entry("11", "The Walking Dead", "MV5BZmFlMTA0MmUtNWVmOC00ZmE1LWFmMDYtZTJhYjJhNGVjYTU5XkEyXkFqcGdeQXVyMTAzMDM4MjM0", Tv, Some(5)),
            ],
        }
    }
}

/// Validate one item object and build it
fn parse_item(value: &Value, path: &str) -> Result<Item, ValidationError> {
    let object = value
        .as_object()
        .ok_or_else(|| ValidationError::NotAnItem(path.to_string()))?;

    let id = required_str(object, "id", path)?;
    let title = required_str(object, "title", path)?;
    let kind_raw = required_str(object, "type", path)?;

    if title.trim().is_empty() {
        return Err(ValidationError::EmptyTitle {
            path: format!("{}.title", path),
        });
    }

    let kind = match kind_raw {
        "movie" => MediaKind::Movie,
        "tv" => MediaKind::Tv,
        other => {
            return Err(ValidationError::InvalidKind {
                path: format!("{}.type", path),
                found: other.to_string(),
            })
        }
    };

    let poster = match object.get("poster") {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(_) => {
            return Err(ValidationError::WrongType {
                path: format!("{}.poster", path),
                expected: "a string",
            })
        }
    };

    let score = match object.get("score") {
        None | Some(Value::Null) => None,
        Some(Value::Number(n)) => {
            let raw = n.as_i64().ok_or_else(|| ValidationError::WrongType {
                path: format!("{}.score", path),
                expected: "an integer",
            })?;
            let score = u8::try_from(raw)
                .ok()
                .and_then(|v| Score::new(v).ok())
                .ok_or_else(|| ValidationError::ScoreOutOfRange {
                    path: "score".to_string(),
                    found: raw,
                })
                .map_err(|e| e.at(path))?;
            Some(score)
        }
        Some(_) => {
            return Err(ValidationError::WrongType {
                path: format!("{}.score", path),
                expected: "an integer",
            })
        }
    };

    let notes = match object.get("notes") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => {
            return Err(ValidationError::WrongType {
                path: format!("{}.notes", path),
                expected: "a string",
            })
        }
    };

    Ok(Item {
        id: ItemId::from(id),
        title: title.to_string(),
        poster,
        kind,
        score,
        notes,
    })
}

fn required_str<'a>(
    object: &'a Map<String, Value>,
    field: &'static str,
    path: &str,
) -> Result<&'a str, ValidationError> {
    match object.get(field) {
        None | Some(Value::Null) => Err(ValidationError::MissingField {
            path: path.to_string(),
            field,
        }),
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(ValidationError::WrongType {
            path: format!("{}.{}", path, field),
            expected: "a string",
        }),
    }
}
