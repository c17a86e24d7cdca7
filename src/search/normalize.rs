use crate::error::{Result, WisdomError};
use crate::models::{SearchMode, SearchQuery};
use crate::search::catalog;
use crate::search::prompt::sanitize_for_prompt;

pub const MIN_QUERY_CHARS: usize = 3;

/// Validate raw form input and turn it into a [`SearchQuery`].
///
/// The source picker's "Default (All … Texts)" entry is resolved against
/// the sentinel of the mode being searched, so it never reaches the core
/// as a literal filter.
pub fn normalize(query: &str, mode: &str, source: Option<&str>) -> Result<SearchQuery> {
    // Control tokens are stripped before prompting, so they must not count
    let query = sanitize_for_prompt(query);
    if query.chars().count() < MIN_QUERY_CHARS {
        return Err(WisdomError::QueryTooShort);
    }

    let mode: SearchMode = mode.parse()?;

    Ok(SearchQuery {
        query,
        mode,
        source: resolve_source(mode, source),
    })
}

/// `None` for no source, a blank source, or this mode's sentinel.
pub fn resolve_source(mode: SearchMode, source: Option<&str>) -> Option<String> {
    let source = source.map(str::trim).filter(|s| !s.is_empty())?;
    if source == catalog::profile(mode).sentinel {
        None
    } else {
        Some(source.to_string())
    }
}
