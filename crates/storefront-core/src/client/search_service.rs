use crate::config::SearchBackend;
use crate::error::Result;
use crate::models::ComponentSearchView;
use crate::scoring::sort_by_score_desc;

use super::Storefront;

impl Storefront {
    /// Fetches candidates from the search server and ranks them by relevance.
    pub fn search(&self, query: &str, limit: usize) -> Result<Vec<ComponentSearchView>> {
        let mut candidates = self.search.search(query, limit)?;
        self.rank(query, &mut candidates);
        Ok(candidates)
    }

    /// Scores and sorts candidates that were obtained elsewhere.
    pub fn rank(&self, query: &str, candidates: &mut [ComponentSearchView]) {
        self.scorer.score(query, candidates);
        sort_by_score_desc(candidates);
    }

    pub fn search_backend(&self) -> SearchBackend {
        self.search.backend()
    }

    pub fn search_started(&self) -> bool {
        self.search.is_started()
    }
}
