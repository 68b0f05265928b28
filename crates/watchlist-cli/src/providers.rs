//! Remote search providers
//!
//! Movies come from the iTunes Search API, shows from TVmaze. Both degrade
//! to an empty result on any failure.

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use tracing::warn;

use watchlist_core::{CandidateItem, Candidates, CombinedProvider, MediaKind, SearchProvider};

/// Fetch timeout in seconds
const FETCH_TIMEOUT: u64 = 10;

/// Results kept from each provider
const PER_PROVIDER: usize = 5;

const ITUNES_URL: &str = "https://itunes.apple.com/search";
const TVMAZE_URL: &str = "https://api.tvmaze.com/search/shows";

/// Movies then shows, truncated to `limit`
pub fn default_provider(limit: usize) -> Result<CombinedProvider> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(FETCH_TIMEOUT))
        .user_agent(concat!("watchlist/", env!("CARGO_PKG_VERSION")))
        .build()?;

    Ok(CombinedProvider::new(limit)
        .with(ItunesMovies::new(client.clone()))
        .with(TvMazeShows::new(client)))
}

/// Movie lookup via the iTunes Search API
pub struct ItunesMovies {
    client: reqwest::Client,
    url: String,
}

impl ItunesMovies {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            url: ITUNES_URL.to_string(),
        }
    }

    async fn fetch(&self, text: &str) -> Result<Candidates> {
        let limit = PER_PROVIDER.to_string();
        let body: Value = self
            .client
            .get(&self.url)
            .query(&[("term", text), ("entity", "movie"), ("limit", limit.as_str())])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(parse_itunes(&body))
    }
}

#[async_trait]
impl SearchProvider for ItunesMovies {
    fn name(&self) -> &str {
        "itunes"
    }

    async fn query(&self, text: &str) -> Candidates {
        self.fetch(text).await.unwrap_or_else(|e| {
            warn!("Movie search failed: {}", e);
            Candidates::empty()
        })
    }
}

/// Show lookup via TVmaze
pub struct TvMazeShows {
    client: reqwest::Client,
    url: String,
}

impl TvMazeShows {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            url: TVMAZE_URL.to_string(),
        }
    }

    async fn fetch(&self, text: &str) -> Result<Candidates> {
        let body: Value = self
            .client
            .get(&self.url)
            .query(&[("q", text)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(parse_tvmaze(&body))
    }
}

#[async_trait]
impl SearchProvider for TvMazeShows {
    fn name(&self) -> &str {
        "tvmaze"
    }

    async fn query(&self, text: &str) -> Candidates {
        self.fetch(text).await.unwrap_or_else(|e| {
            warn!("Show search failed: {}", e);
            Candidates::empty()
        })
    }
}

/// Parse an iTunes search response
///
/// Artwork comes as a 100x100 thumbnail; the same URL serves 600x600.
fn parse_itunes(body: &Value) -> Candidates {
    let Some(results) = body.get("results").and_then(Value::as_array) else {
        return Candidates::empty();
    };

    results
        .iter()
        .filter_map(|entry| {
            let title = non_empty(entry.get("trackName"))?;
            let poster = entry
                .get("artworkUrl100")
                .and_then(Value::as_str)
                .map(|url| url.replace("100x100", "600x600"))
                .unwrap_or_default();
            Some(with_year(
                CandidateItem::new(title, poster, MediaKind::Movie),
                entry.get("releaseDate"),
            ))
        })
        .collect()
}

/// Parse a TVmaze show search response, keeping the first few entries
fn parse_tvmaze(body: &Value) -> Candidates {
    let Some(results) = body.as_array() else {
        return Candidates::empty();
    };

    results
        .iter()
        .take(PER_PROVIDER)
        .filter_map(|entry| {
            let show = entry.get("show")?;
            let title = non_empty(show.get("name"))?;
            let image = show.get("image");
            let poster = image
                .and_then(|i| non_empty(i.get("original")).or_else(|| non_empty(i.get("medium"))))
                .unwrap_or_default();
            Some(with_year(
                CandidateItem::new(title, poster, MediaKind::Tv),
                show.get("premiered"),
            ))
        })
        .collect()
}

fn non_empty(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Attach the year part of an ISO-ish date ("2021-10-22T07:00:00Z" -> "2021")
fn with_year(candidate: CandidateItem, date: Option<&Value>) -> CandidateItem {
    match non_empty(date).and_then(|d| d.split('-').next().map(str::to_string)) {
        Some(year) => candidate.with_year(year),
        None => candidate,
    }
}
