//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use serde::Serialize;
use serde_json::{json, Map, Value};

use watchlist_core::{CandidateItem, Category, Item};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Check if output is in quiet mode
    pub fn is_quiet(&self) -> bool {
        matches!(self.format, OutputFormat::Quiet)
    }

    /// Print a single item with its category
    pub fn print_item(&self, item: &Item, category: Category) {
        match self.format {
            OutputFormat::Human => {
                println!("ID:       {}", item.id);
                println!("Title:    {}", item.title);
                println!("Type:     {}", item.kind.label());
                println!("Category: {}", category.title());
                println!("Score:    {}", score_label(item));
                println!("Poster:   {}", item.poster_or_placeholder());
                if let Some(ref notes) = item.notes {
                    println!();
                    println!("── Notes ──");
                    println!("{}", notes);
                }
            }
            OutputFormat::Json => {
                print_json(&item_json(item, category));
            }
            OutputFormat::Quiet => {
                println!("{}", item.id);
            }
        }
    }

    /// Print category sections in display order
    pub fn print_sections(&self, sections: &[(Category, Vec<&Item>)], filter_label: &str) {
        match self.format {
            OutputFormat::Human => {
                let total: usize = sections.iter().map(|(_, items)| items.len()).sum();
                for (category, items) in sections {
                    println!("{} ({})", category.title(), items.len());
                    if items.is_empty() {
                        println!("  (empty)");
                    }
                    for item in items {
                        println!(
                            "  {:<8}  {:<36}  {:<7}  {}",
                            short_id(item),
                            truncate(&item.title, 36),
                            item.kind.label(),
                            score_label(item)
                        );
                    }
                    println!();
                }
                println!("{} item(s) · showing {}", total, filter_label);
            }
            OutputFormat::Json => {
                let mut object = Map::new();
                for (category, items) in sections {
                    object.insert(category.key().to_string(), json!(items));
                }
                print_json(&Value::Object(object));
            }
            OutputFormat::Quiet => {
                for (_, items) in sections {
                    for item in items {
                        println!("{}", item.id);
                    }
                }
            }
        }
    }

    /// Print numbered search candidates
    pub fn print_candidates(&self, candidates: &[CandidateItem]) {
        match self.format {
            OutputFormat::Human => {
                if candidates.is_empty() {
                    println!("No results.");
                    return;
                }
                for (i, candidate) in candidates.iter().enumerate() {
                    let year = candidate
                        .year
                        .as_deref()
                        .map(|y| format!(" • {}", y))
                        .unwrap_or_default();
                    println!(
                        "  [{}] {} ({}{})",
                        i + 1,
                        candidate.title,
                        candidate.kind.label(),
                        year
                    );
                }
            }
            OutputFormat::Json => print_json(&candidates),
            OutputFormat::Quiet => {
                for candidate in candidates {
                    println!("{}", candidate.title);
                }
            }
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Print a warning to stderr (all formats except quiet)
    pub fn warning(&self, message: &str) {
        if !self.is_quiet() {
            eprintln!("⚠ {}", message);
        }
    }

    /// Check if we should prompt for confirmation
    pub fn should_prompt(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }
}

/// An item plus its category, as emitted by `--json`
pub fn item_json(item: &Item, category: Category) -> Value {
    let mut value = json!(item);
    if let Value::Object(ref mut object) = value {
        object.insert("category".to_string(), json!(category.key()));
    }
    value
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(e) => eprintln!("Failed to encode JSON output: {}", e),
    }
}

fn score_label(item: &Item) -> String {
    item.score
        .map(|s| format!("★ {}", s))
        .unwrap_or_else(|| "unrated".to_string())
}

/// First 8 characters of the ID, enough to pass back as a prefix
fn short_id(item: &Item) -> String {
    item.id.as_str().chars().take(8).collect()
}

/// Truncate a string to max characters, adding "..." if truncated
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use watchlist_core::{MediaKind, Score};

    #[test]
    fn test_format_from_flags() {
        assert_eq!(OutputFormat::from_flags(false, false), OutputFormat::Human);
        assert_eq!(OutputFormat::from_flags(true, false), OutputFormat::Json);
        assert_eq!(OutputFormat::from_flags(false, true), OutputFormat::Quiet);
        // Quiet takes precedence
        assert_eq!(OutputFormat::from_flags(true, true), OutputFormat::Quiet);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("this is a long string", 10), "this is...");
        // Multi-byte characters are never split
        assert_eq!(truncate("Amélie Amélie Amélie", 8), "Améli...");
    }

    #[test]
    fn test_short_id() {
        let item = Item::with_id("0f9a1b2c-3d4e", "Dune", "", MediaKind::Movie).unwrap();
        assert_eq!(short_id(&item), "0f9a1b2c");

        let item = Item::with_id("7", "Oppenheimer", "", MediaKind::Movie).unwrap();
        assert_eq!(short_id(&item), "7");
    }

    #[test]
    fn test_score_label() {
        let item = Item::with_id("1", "Dune", "", MediaKind::Movie).unwrap();
        assert_eq!(score_label(&item), "unrated");
        let item = item.scored(Score::new(8).unwrap());
        assert_eq!(score_label(&item), "★ 8");
    }

    #[test]
    fn test_item_json_includes_category() {
        let item = Item::with_id("1", "Dune", "", MediaKind::Movie).unwrap();
        let value = item_json(&item, Category::PlanningToWatch);
        assert_eq!(value["category"], "planningToWatch");
        assert_eq!(value["type"], "movie");
        assert_eq!(value["id"], "1");
    }
}
