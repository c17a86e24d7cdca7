//! Combines the pieces of a search into one [`SearchResult`].

use anyhow::anyhow;

use crate::error::{Result, WisdomError};
use crate::models::{Analysis, Parallels, SearchResult, Verse};

/// No verse means nothing else is reported. A verse without its analysis
/// is an incomplete enrichment and is refused; missing parallels are an
/// empty list.
pub fn assemble(
    verse: Option<Verse>,
    analysis: Option<Analysis>,
    parallels: Option<Parallels>,
) -> Result<SearchResult> {
    match (verse, analysis) {
        (None, _) => Ok(SearchResult::not_found()),
        (Some(verse), Some(analysis)) => Ok(SearchResult::found(
            verse,
            analysis,
            parallels.unwrap_or_default(),
        )),
        (Some(verse), None) => Err(WisdomError::Service(anyhow!(
            "analysis missing for verse {}",
            verse.source
        ))),
    }
}
