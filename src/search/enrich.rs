//! Analysis and parallels for a found verse, requested concurrently.

use anyhow::Context;

use crate::error::Result;
use crate::llm::{self, ModelClient};
use crate::models::{Analysis, Parallels, SearchMode, Verse};
use crate::search::parallels::{exclude_tradition, request_parallels};
use crate::search::{prompt, schema};

/// Both calls are in flight at once; if either fails the whole enrichment
/// fails, and the other call is dropped.
pub async fn enrich(
    model: &dyn ModelClient,
    verse: &Verse,
    mode: SearchMode,
) -> Result<(Analysis, Parallels)> {
    let analysis_prompt = prompt::analysis_prompt(&verse.text)?;
    let parallels_prompt = prompt::parallels_prompt(&verse.text, &verse.tradition, mode, &[])?;
    let analysis_schema = schema::analysis();

    let (analysis, parallels) = tokio::try_join!(
        async {
            llm::invoke::<Analysis>(model, &analysis_prompt, &analysis_schema)
                .await
                .context("Analysis failed")
        },
        request_parallels(model, &parallels_prompt),
    )?;

    let parallels = exclude_tradition(parallels, &verse.tradition);
    tracing::debug!(parallels = parallels.len(), "verse enriched");
    Ok((analysis, parallels))
}
