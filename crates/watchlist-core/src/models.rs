//! Data models for Watchlist
//!
//! Defines the core data structures: Item, Category, Score and the
//! partial-update patch applied by the store's `update` operation.
//! The serde layout of these types is the persisted/exported wire format.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

/// Poster shown when an item has no artwork of its own
pub const PLACEHOLDER_POSTER: &str =
    "https://via.placeholder.com/300x450/1a1a1a/ffffff?text=No+Poster";

/// Opaque, store-wide unique item identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    /// Generate a fresh identifier for a newly created item
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Get the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ItemId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// What kind of work an item is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Movie,
    Tv,
}

impl MediaKind {
    /// Wire name ("movie" or "tv")
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Movie => "movie",
            MediaKind::Tv => "tv",
        }
    }

    /// Human label
    pub fn label(&self) -> &'static str {
        match self {
            MediaKind::Movie => "Movie",
            MediaKind::Tv => "TV Show",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "movie" | "film" => Ok(MediaKind::Movie),
            "tv" | "show" | "series" => Ok(MediaKind::Tv),
            _ => Err(ValidationError::InvalidKind {
                path: "type".to_string(),
                found: s.to_string(),
            }),
        }
    }
}

/// A rating between 1 and 10 inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Score(u8);

impl Score {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 10;

    /// Create a score, rejecting values outside [1, 10]
    pub fn new(value: u8) -> Result<Self, ValidationError> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ValidationError::ScoreOutOfRange {
                path: "score".to_string(),
                found: i64::from(value),
            })
        }
    }

    pub fn get(&self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Score {
    type Error = ValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Score::new(value)
    }
}

impl From<Score> for u8 {
    fn from(score: Score) -> Self {
        score.0
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single watchable work
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Unique identifier, immutable once assigned
    pub id: ItemId,
    /// Display title, never empty
    pub title: String,
    /// Poster URL; may be empty
    #[serde(default)]
    pub poster: String,
    /// Movie or show, immutable once assigned
    #[serde(rename = "type")]
    pub kind: MediaKind,
    /// Optional rating; absent means unrated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<Score>,
    /// Optional free-form notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Item {
    /// Create a new item with a freshly generated ID
    ///
    /// Fails if the title is empty after trimming.
    pub fn new(
        title: impl Into<String>,
        poster: impl Into<String>,
        kind: MediaKind,
    ) -> Result<Self, ValidationError> {
        Self::with_id(ItemId::generate(), title, poster, kind)
    }

    /// Create an item with a specific ID (for loading or tests)
    pub fn with_id(
        id: impl Into<ItemId>,
        title: impl Into<String>,
        poster: impl Into<String>,
        kind: MediaKind,
    ) -> Result<Self, ValidationError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle {
                path: "title".to_string(),
            });
        }
        Ok(Self {
            id: id.into(),
            title,
            poster: poster.into(),
            kind,
            score: None,
            notes: None,
        })
    }

    /// Set the score (builder style)
    pub fn scored(mut self, score: Score) -> Self {
        self.score = Some(score);
        self
    }

    /// Poster to render, substituting the placeholder when empty
    pub fn poster_or_placeholder(&self) -> &str {
        if self.poster.trim().is_empty() {
            PLACEHOLDER_POSTER
        } else {
            &self.poster
        }
    }

    /// Merge a patch into this item, field by field
    ///
    /// `id` and `kind` are never touched.
    pub fn apply(&mut self, patch: &ItemPatch) {
        if let Some(ref title) = patch.title {
            self.title = title.clone();
        }
        if let Some(ref poster) = patch.poster {
            self.poster = poster.clone();
        }
        if let Some(score) = patch.score {
            self.score = score;
        }
        if let Some(ref notes) = patch.notes {
            self.notes = notes.clone();
        }
    }
}

/// Partial set of editable fields
///
/// `None` leaves a field untouched. For the optional fields the inner
/// `Option` is the new value, so `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemPatch {
    pub title: Option<String>,
    pub poster: Option<String>,
    pub score: Option<Option<Score>>,
    pub notes: Option<Option<String>>,
}

impl ItemPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn poster(mut self, poster: impl Into<String>) -> Self {
        self.poster = Some(poster.into());
        self
    }

    pub fn score(mut self, score: Option<Score>) -> Self {
        self.score = Some(score);
        self
    }

    /// Set notes; blank text clears them
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        let notes = notes.into();
        self.notes = Some(if notes.trim().is_empty() {
            None
        } else {
            Some(notes)
        });
        self
    }

    /// Score chosen from a 1-10 picker: picking the current value again unrates
    pub fn toggle_score(current: Option<Score>, picked: Score) -> Self {
        let next = if current == Some(picked) {
            None
        } else {
            Some(picked)
        };
        Self::new().score(next)
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.poster.is_none() && self.score.is_none() && self.notes.is_none()
    }

    /// Reject patches that would break item invariants
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self.title {
            Some(ref title) if title.trim().is_empty() => Err(ValidationError::EmptyTitle {
                path: "title".to_string(),
            }),
            _ => Ok(()),
        }
    }
}

/// One of the four fixed buckets an item belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    Watched,
    CurrentlyWatching,
    PlanningToWatch,
    Dropped,
}

impl Category {
    /// All categories in display order
    pub const ALL: [Category; 4] = [
        Category::Watched,
        Category::CurrentlyWatching,
        Category::PlanningToWatch,
        Category::Dropped,
    ];

    /// Key used in the snapshot format
    pub fn key(&self) -> &'static str {
        match self {
            Category::Watched => "watched",
            Category::CurrentlyWatching => "currentlyWatching",
            Category::PlanningToWatch => "planningToWatch",
            Category::Dropped => "dropped",
        }
    }

    /// Column heading
    pub fn title(&self) -> &'static str {
        match self {
            Category::Watched => "Watched",
            Category::CurrentlyWatching => "Currently Watching",
            Category::PlanningToWatch => "Planning to Watch",
            Category::Dropped => "Dropped",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Category {
    type Err = ValidationError;

    /// Accepts the wire key in any case, plus kebab and snake spellings
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != '-' && *c != '_' && !c.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();

        Category::ALL
            .into_iter()
            .find(|c| c.key().to_ascii_lowercase() == normalized)
            .ok_or_else(|| ValidationError::UnknownCategory(s.to_string()))
    }
}

/// Per-category view filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KindFilter {
    #[default]
    All,
    Movie,
    Tv,
}

impl KindFilter {
    /// Cycle All -> Movie -> Tv -> All
    pub fn next(self) -> Self {
        match self {
            KindFilter::All => KindFilter::Movie,
            KindFilter::Movie => KindFilter::Tv,
            KindFilter::Tv => KindFilter::All,
        }
    }

    pub fn matches(&self, item: &Item) -> bool {
        match self {
            KindFilter::All => true,
            KindFilter::Movie => item.kind == MediaKind::Movie,
            KindFilter::Tv => item.kind == MediaKind::Tv,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            KindFilter::All => "All",
            KindFilter::Movie => "Movies",
            KindFilter::Tv => "TV Shows",
        }
    }
}

impl FromStr for KindFilter {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("all") {
            return Ok(KindFilter::All);
        }
        Ok(match s.parse::<MediaKind>()? {
            MediaKind::Movie => KindFilter::Movie,
            MediaKind::Tv => KindFilter::Tv,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(id: &str, title: &str) -> Item {
        Item::with_id(id, title, "", MediaKind::Movie).unwrap()
    }

    #[test]
    fn test_item_new_generates_unique_ids() {
        let a = Item::new("Dune", "", MediaKind::Movie).unwrap();
        let b = Item::new("Dune", "", MediaKind::Movie).unwrap();
        assert_ne!(a.id, b.id);
        assert!(a.score.is_none());
        assert!(a.notes.is_none());
    }

    #[test]
    fn test_item_rejects_blank_title() {
        let err = Item::new("   ", "", MediaKind::Tv).unwrap_err();
        assert!(matches!(err, ValidationError::EmptyTitle { .. }));
    }

    #[test]
    fn test_score_bounds() {
        assert!(Score::new(0).is_err());
        assert!(Score::new(11).is_err());
        assert_eq!(Score::new(1).unwrap().get(), 1);
        assert_eq!(Score::new(10).unwrap().get(), 10);
    }

    #[test]
    fn test_poster_placeholder() {
        let mut item = movie("1", "Inception");
        assert_eq!(item.poster_or_placeholder(), PLACEHOLDER_POSTER);

        item.poster = "https://example.com/p.jpg".to_string();
        assert_eq!(item.poster_or_placeholder(), "https://example.com/p.jpg");
    }

    #[test]
    fn test_apply_patch_is_per_field() {
        let mut item = movie("1", "Inception").scored(Score::new(9).unwrap());
        item.notes = Some("rewatch".to_string());

        item.apply(&ItemPatch::new().title("Inception (2010)"));
        assert_eq!(item.title, "Inception (2010)");
        assert_eq!(item.score, Some(Score::new(9).unwrap()));
        assert_eq!(item.notes.as_deref(), Some("rewatch"));

        item.apply(&ItemPatch::new().score(None).notes(""));
        assert!(item.score.is_none());
        assert!(item.notes.is_none());
        assert_eq!(item.id, ItemId::from("1"));
        assert_eq!(item.kind, MediaKind::Movie);
    }

    #[test]
    fn test_toggle_score() {
        let seven = Score::new(7).unwrap();
        let eight = Score::new(8).unwrap();

        assert_eq!(ItemPatch::toggle_score(None, seven).score, Some(Some(seven)));
        assert_eq!(ItemPatch::toggle_score(Some(seven), seven).score, Some(None));
        assert_eq!(ItemPatch::toggle_score(Some(seven), eight).score, Some(Some(eight)));
    }

    #[test]
    fn test_patch_validate() {
        assert!(ItemPatch::new().title("").validate().is_err());
        assert!(ItemPatch::new().title("ok").validate().is_ok());
        assert!(ItemPatch::new().is_empty());
    }

    #[test]
    fn test_category_parse() {
        assert_eq!("watched".parse::<Category>().unwrap(), Category::Watched);
        assert_eq!(
            "currentlyWatching".parse::<Category>().unwrap(),
            Category::CurrentlyWatching
        );
        assert_eq!(
            "planning-to-watch".parse::<Category>().unwrap(),
            Category::PlanningToWatch
        );
        assert_eq!("DROPPED".parse::<Category>().unwrap(), Category::Dropped);
        assert!("favorites".parse::<Category>().is_err());
    }

    #[test]
    fn test_category_serde_uses_camel_case_keys() {
        let json = serde_json::to_string(&Category::PlanningToWatch).unwrap();
        assert_eq!(json, "\"planningToWatch\"");
    }

    #[test]
    fn test_kind_filter_cycle() {
        let f = KindFilter::default();
        assert_eq!(f, KindFilter::All);
        assert_eq!(f.next(), KindFilter::Movie);
        assert_eq!(f.next().next(), KindFilter::Tv);
        assert_eq!(f.next().next().next(), KindFilter::All);
    }

    #[test]
    fn test_kind_filter_matches() {
        let film = movie("1", "Dune");
        let show = Item::with_id("2", "The Wire", "", MediaKind::Tv).unwrap();

        assert!(KindFilter::All.matches(&film));
        assert!(KindFilter::Movie.matches(&film));
        assert!(!KindFilter::Movie.matches(&show));
        assert!(KindFilter::Tv.matches(&show));
    }

    #[test]
    fn test_item_serialization_omits_absent_fields() {
        let item = movie("1", "Inception");
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["type"], "movie");
        assert!(json.get("score").is_none());
        assert!(json.get("notes").is_none());

        let scored = item.scored(Score::new(9).unwrap());
        let json = serde_json::to_value(&scored).unwrap();
        assert_eq!(json["score"], 9);
    }

    #[test]
    fn test_item_deserialize_rejects_bad_score() {
        let json = r#"{"id":"1","title":"X","poster":"","type":"movie","score":11}"#;
        assert!(serde_json::from_str::<Item>(json).is_err());
    }
}
