//! Search integration
//!
//! Remote metadata lookups sit behind the [`SearchProvider`] trait. A
//! provider returns [`Candidates`], a finite consume-once sequence that is
//! simply empty when anything goes wrong upstream; provider failures never
//! surface as errors here.
//!
//! [`SearchSession`] adds the interactive behavior on top of a provider:
//! short queries clear results without a lookup, queries are debounced, and
//! every issued query gets a generation token so that a response arriving
//! after a newer query was issued is discarded instead of applied.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::ValidationError;
use crate::models::{Item, MediaKind};

/// Queries shorter than this (in characters, after trimming) are not sent
pub const MIN_QUERY_LEN: usize = 2;

/// An unconfirmed search result
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateItem {
    pub title: String,
    /// May be empty
    pub poster: String,
    #[serde(rename = "type")]
    pub kind: MediaKind,
    /// Release year, when the provider knows it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
}

impl CandidateItem {
    pub fn new(title: impl Into<String>, poster: impl Into<String>, kind: MediaKind) -> Self {
        Self {
            title: title.into(),
            poster: poster.into(),
            kind,
            year: None,
        }
    }

    pub fn with_year(mut self, year: impl Into<String>) -> Self {
        self.year = Some(year.into());
        self
    }

    /// Turn the chosen candidate into a real item with a fresh ID
    pub fn into_item(self) -> Result<Item, ValidationError> {
        Item::new(self.title, self.poster, self.kind)
    }
}

/// Search results, consumed once in provider order
#[derive(Debug, Default)]
pub struct Candidates(std::vec::IntoIter<CandidateItem>);

impl Candidates {
    /// No results (also what a failed lookup yields)
    pub fn empty() -> Self {
        Self::default()
    }
}

impl From<Vec<CandidateItem>> for Candidates {
    fn from(items: Vec<CandidateItem>) -> Self {
        Self(items.into_iter())
    }
}

impl FromIterator<CandidateItem> for Candidates {
    fn from_iter<I: IntoIterator<Item = CandidateItem>>(iter: I) -> Self {
        Self::from(iter.into_iter().collect::<Vec<_>>())
    }
}

impl Iterator for Candidates {
    type Item = CandidateItem;

    fn next(&mut self) -> Option<CandidateItem> {
        self.0.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

/// Remote lookup of candidate items by free text
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &str;

    /// Look up `text`; errors must be swallowed and yield no candidates
    async fn query(&self, text: &str) -> Candidates;
}

/// Queries several providers in turn and keeps the first `limit` results
pub struct CombinedProvider {
    providers: Vec<Box<dyn SearchProvider>>,
    limit: usize,
}

impl CombinedProvider {
    pub fn new(limit: usize) -> Self {
        Self {
            providers: Vec::new(),
            limit,
        }
    }

    /// Append a provider; earlier providers' results come first
    pub fn with(mut self, provider: impl SearchProvider + 'static) -> Self {
        self.providers.push(Box::new(provider));
        self
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}

#[async_trait]
impl SearchProvider for CombinedProvider {
    fn name(&self) -> &str {
        "combined"
    }

    async fn query(&self, text: &str) -> Candidates {
        let mut results = Vec::new();
        for provider in &self.providers {
            let found: Vec<CandidateItem> = provider.query(text).await.collect();
            debug!("{} returned {} candidates for {:?}", provider.name(), found.len(), text);
            results.extend(found);
        }
        results.truncate(self.limit);
        Candidates::from(results)
    }
}

/// What became of a query issued through a [`SearchSession`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Newest query; show these results
    Applied(Vec<CandidateItem>),
    /// A newer query was issued meanwhile; ignore
    Stale,
    /// Query too short; clear any shown results
    Cleared,
}

/// Debounced search with stale-result suppression
pub struct SearchSession<P: SearchProvider> {
    provider: P,
    debounce: Duration,
    generation: AtomicU64,
}

impl<P: SearchProvider> SearchSession<P> {
    pub fn new(provider: P, debounce: Duration) -> Self {
        Self {
            provider,
            debounce,
            generation: AtomicU64::new(0),
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Issue a new generation token, invalidating all earlier ones
    pub fn issue(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Whether `token` is still the newest issued
    pub fn is_current(&self, token: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == token
    }

    /// Run a query the way a search box does
    ///
    /// Every call supersedes earlier ones, including calls that only clear.
    /// In-flight lookups are not cancelled; their results are discarded on
    /// arrival.
    pub async fn search(&self, text: &str) -> SearchOutcome {
        let token = self.issue();

        if text.trim().chars().count() < MIN_QUERY_LEN {
            return SearchOutcome::Cleared;
        }

        if !self.debounce.is_zero() {
            tokio::time::sleep(self.debounce).await;
            if !self.is_current(token) {
                debug!("Query {:?} superseded during debounce", text);
                return SearchOutcome::Stale;
            }
        }

        let results: Vec<CandidateItem> = self.provider.query(text).await.collect();

        if self.is_current(token) {
            SearchOutcome::Applied(results)
        } else {
            warn!("Discarding stale results for {:?} (#{})", text, token);
            SearchOutcome::Stale
        }
    }
}
