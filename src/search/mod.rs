//! The search core.
//!
//! ```text
//! normalize ─► retrieve_verse ─► (None) ──────────────────────► assemble
//!                  │
//!                  └─► (Some) ─► enrich: analysis ∥ parallels ─► assemble
//! ```
//!
//! Not finding a verse is a normal outcome with no follow-up calls. A model
//! failure at any step fails the whole search; nothing is retried or
//! papered over with a partial result.

pub mod ancillary;
pub mod assemble;
pub mod catalog;
pub mod enrich;
pub mod normalize;
pub mod parallels;
pub mod prompt;
pub mod retrieve;
pub mod schema;
pub mod template;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;

use crate::error::{Result, WisdomError};
use crate::llm::ModelClient;
use crate::models::{Parallels, SearchMode, SearchQuery, SearchResult};

pub use ancillary::Fact;

/// Entry point for everything the service asks of the model.
///
/// Holds no per-request state, so one instance serves any number of
/// concurrent searches.
#[derive(Clone)]
pub struct WisdomSearch {
    model: Arc<dyn ModelClient>,
}

impl WisdomSearch {
    pub fn new(model: Arc<dyn ModelClient>) -> Self {
        Self { model }
    }

    /// Validate and run one search.
    pub async fn search(
        &self,
        query: &str,
        mode: SearchMode,
        source: Option<&str>,
    ) -> Result<SearchResult> {
        let query = normalize::normalize(query, mode.as_str(), source)?;
        self.search_query(&query).await
    }

    /// Run an already-validated search.
    pub async fn search_query(&self, query: &SearchQuery) -> Result<SearchResult> {
        let model = self.model.as_ref();

        let Some(verse) = retrieve::retrieve_verse(model, query).await? else {
            return assemble::assemble(None, None, None);
        };

        let (analysis, parallels) = enrich::enrich(model, &verse, query.mode).await?;
        assemble::assemble(Some(verse), Some(analysis), Some(parallels))
    }

    /// Search one of the fixed themes across spiritual texts.
    pub async fn explore_theme(&self, theme: &str) -> Result<SearchResult> {
        let theme = catalog::find_theme(theme)
            .ok_or_else(|| WisdomError::InvalidInput(format!("unknown theme: {}", theme.trim())))?;
        tracing::info!(theme, "exploring theme");
        self.search(theme, catalog::THEME_MODE, None).await
    }

    pub async fn find_parallels(
        &self,
        verse_text: &str,
        tradition: &str,
        target_mode: SearchMode,
        target_sources: &[String],
    ) -> Result<Parallels> {
        parallels::find_parallels(
            self.model.as_ref(),
            verse_text,
            tradition,
            target_mode,
            target_sources,
        )
        .await
    }

    pub async fn random_fact(&self) -> Fact {
        ancillary::random_fact(self.model.as_ref()).await
    }

    pub async fn origin_map(&self, tradition: &str) -> Result<String> {
        ancillary::origin_map(self.model.as_ref(), tradition).await
    }

    pub async fn transcribe(&self, audio_data_uri: &str, max_bytes: usize) -> Result<String> {
        ancillary::transcribe(self.model.as_ref(), audio_data_uri, max_bytes).await
    }
}
