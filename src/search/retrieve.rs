//! Verse lookup: one model call per search, no retries.

use anyhow::Context;
use serde::Deserialize;

use crate::error::Result;
use crate::llm::{self, ModelClient};
use crate::models::{SearchQuery, Verse};
use crate::search::prompt::VersePrompt;
use crate::search::schema;

#[derive(Debug, Deserialize)]
struct VerseReply {
    #[serde(deserialize_with = "llm::required_nullable")]
    verse: Option<Verse>,
}

/// Ask the model for the best passage for `query`.
///
/// `Ok(None)` means the model answered and found nothing that qualifies.
/// Any failure to get a well-formed answer is an error.
pub async fn retrieve_verse(model: &dyn ModelClient, query: &SearchQuery) -> Result<Option<Verse>> {
    let prompt = VersePrompt::select(query.source.as_deref());
    let rendered = prompt.render(query.mode, &query.query)?;

    let reply: VerseReply = llm::invoke(model, &rendered, &schema::verse())
        .await
        .context("Verse lookup failed")?;

    let verse = reply.verse.map(tidy).filter(|v| {
        let usable = !v.text.is_empty();
        if !usable {
            tracing::warn!(source = %v.source, "model returned a verse with no text, treating as not found");
        }
        usable
    });

    match &verse {
        Some(v) => tracing::info!(
            mode = %query.mode,
            strict = prompt.source().is_some(),
            source = %v.source,
            tradition = %v.tradition,
            "verse found"
        ),
        None => tracing::info!(
            mode = %query.mode,
            strict = prompt.source().is_some(),
            "no verse found"
        ),
    }

    Ok(verse)
}

fn tidy(verse: Verse) -> Verse {
    Verse {
        text: verse.text.trim().to_string(),
        source: verse.source.trim().to_string(),
        tradition: verse.tradition.trim().to_string(),
    }
}
