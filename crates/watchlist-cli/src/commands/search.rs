//! Search command handler

use anyhow::{anyhow, bail, Context, Result};

use watchlist_core::{
    CandidateItem, Category, CategoryStore, SearchOutcome, SearchProvider, SearchSession,
    SnapshotStorage,
};

use crate::editor::{is_interactive, prompt_optional};
use crate::output::Output;

/// Search remote metadata and optionally add one of the results
///
/// `pick` is 1-based, matching the numbers shown in the result list. On a
/// terminal without `pick`, the user is asked which result to add.
pub async fn search<S: SnapshotStorage, P: SearchProvider>(
    store: &mut CategoryStore<S>,
    session: &SearchSession<P>,
    query: String,
    pick: Option<usize>,
    category: Category,
    output: &Output,
) -> Result<()> {
    let candidates = match session.search(&query).await {
        SearchOutcome::Applied(candidates) => candidates,
        SearchOutcome::Cleared => bail!(
            "Search query must be at least {} characters",
            watchlist_core::search::MIN_QUERY_LEN
        ),
        // Nothing else issues queries on this session
        SearchOutcome::Stale => Vec::new(),
    };

    let choice = match pick {
        Some(n) => Some(n),
        None => {
            output.print_candidates(&candidates);
            if candidates.is_empty() || !output.should_prompt() || !is_interactive() {
                return Ok(());
            }
            ask_choice(candidates.len())?
        }
    };

    let Some(n) = choice else {
        return Ok(());
    };
    let candidate = select(candidates, n)?;
    add_candidate(store, candidate, category, output)
}

fn ask_choice(count: usize) -> Result<Option<usize>> {
    let answer = prompt_optional(&format!("Add which result? [1-{}, Enter to skip]", count))?;
    answer
        .map(|a| a.parse::<usize>().context("Please enter a result number"))
        .transpose()
}

fn select(candidates: Vec<CandidateItem>, n: usize) -> Result<CandidateItem> {
    let count = candidates.len();
    n.checked_sub(1)
        .and_then(|i| candidates.into_iter().nth(i))
        .ok_or_else(|| anyhow!("No result #{} ({} result(s) found)", n, count))
}

fn add_candidate<S: SnapshotStorage>(
    store: &mut CategoryStore<S>,
    candidate: CandidateItem,
    category: Category,
    output: &Output,
) -> Result<()> {
    let item = candidate.into_item().context("Search result is not a valid item")?;
    store
        .add(item.clone(), category)
        .context("Failed to add item")?;

    output.success(&format!("Added '{}' to {}", item.title, category.title()));
    output.print_item(&item, category);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::testing::{quiet, sample_store};
    use super::*;
    use async_trait::async_trait;
    use std::time::Duration;
    use watchlist_core::{Candidates, MediaKind};

    struct Fixed(Vec<CandidateItem>);

    #[async_trait]
    impl SearchProvider for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn query(&self, _text: &str) -> Candidates {
            Candidates::from(self.0.clone())
        }
    }

    fn session() -> SearchSession<Fixed> {
        SearchSession::new(
            Fixed(vec![
                CandidateItem::new("Dune", "https://img/dune.jpg", MediaKind::Movie).with_year("2021"),
                CandidateItem::new("Dune", "", MediaKind::Tv),
            ]),
            Duration::ZERO,
        )
    }

    #[tokio::test]
    async fn test_pick_adds_candidate_with_fresh_id() {
        let mut store = sample_store();
        search(
            &mut store,
            &session(),
            "dune".to_string(),
            Some(2),
            Category::PlanningToWatch,
            &quiet(),
        )
        .await
        .unwrap();

        let added = store.items(Category::PlanningToWatch).last().unwrap();
        assert_eq!(added.title, "Dune");
        assert_eq!(added.kind, MediaKind::Tv);
        assert_eq!(added.id.as_str().len(), 36);
        assert_eq!(store.len(), 12);
    }

    #[tokio::test]
    async fn test_pick_out_of_range() {
        let mut store = sample_store();
        for pick in [0, 3] {
            let result = search(
                &mut store,
                &session(),
                "dune".to_string(),
                Some(pick),
                Category::Watched,
                &quiet(),
            )
            .await;
            assert!(result.is_err());
        }
        assert_eq!(store.len(), 11);
    }

    #[tokio::test]
    async fn test_short_query_rejected() {
        let mut store = sample_store();
        let result = search(
            &mut store,
            &session(),
            "d".to_string(),
            Some(1),
            Category::Watched,
            &quiet(),
        )
        .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_listing_without_pick_adds_nothing() {
        let mut store = sample_store();
        search(
            &mut store,
            &session(),
            "dune".to_string(),
            None,
            Category::Watched,
            &quiet(),
        )
        .await
        .unwrap();
        assert_eq!(store.len(), 11);
    }
}
