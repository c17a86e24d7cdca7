//! Cross-tradition parallels, both as part of a search and on their own
//! when the user narrows the comparison to another mode or to chosen texts.

use anyhow::Context;
use serde::Deserialize;

use crate::error::{Result, WisdomError};
use crate::llm::{self, ModelClient};
use crate::models::{Parallels, SearchMode};
use crate::search::{prompt, schema};

#[derive(Debug, Deserialize)]
struct ParallelsReply {
    #[serde(deserialize_with = "llm::required_nullable")]
    parallels: Option<Vec<String>>,
}

/// One parallels call. A null list is read as "none found".
pub(crate) async fn request_parallels(
    model: &dyn ModelClient,
    prompt: &str,
) -> anyhow::Result<Parallels> {
    let reply: ParallelsReply = llm::invoke(model, prompt, &schema::parallels())
        .await
        .context("Parallels lookup failed")?;
    Ok(reply.parallels.unwrap_or_default())
}

/// Re-run the parallels lookup for a verse the user already has.
///
/// `target_sources` restricts the search to exactly those texts; blank
/// entries are ignored and an all-blank list means "whole category".
pub async fn find_parallels(
    model: &dyn ModelClient,
    verse_text: &str,
    tradition: &str,
    target_mode: SearchMode,
    target_sources: &[String],
) -> Result<Parallels> {
    let verse_text = verse_text.trim();
    if verse_text.is_empty() {
        return Err(WisdomError::InvalidInput("verse text is required".into()));
    }
    let tradition = tradition.trim();
    if tradition.is_empty() {
        return Err(WisdomError::InvalidInput("tradition is required".into()));
    }

    let mut targets: Vec<String> = Vec::new();
    for source in target_sources.iter().map(|s| s.trim()).filter(|s| !s.is_empty()) {
        if !targets.iter().any(|t| t == source) {
            targets.push(source.to_string());
        }
    }

    let rendered = prompt::parallels_prompt(verse_text, tradition, target_mode, &targets)?;
    let parallels = exclude_tradition(request_parallels(model, &rendered).await?, tradition);

    tracing::info!(
        mode = %target_mode,
        targets = targets.len(),
        found = parallels.len(),
        "parallels refined"
    );
    Ok(parallels)
}

/// Drop blank entries, repeats, and anything attributed to `tradition`.
///
/// The attribution is the trailing "(Citation, Tradition)" group when the
/// entry has one, otherwise the whole entry. Matching is case-insensitive
/// on whole words, so "Judaism" removes "Rabbinic Judaism" but "Islam"
/// keeps "Islamic art".
pub fn exclude_tradition(parallels: Parallels, tradition: &str) -> Parallels {
    let needle = words(tradition);
    let mut kept: Parallels = Vec::with_capacity(parallels.len());

    for entry in parallels {
        let entry = entry.trim();
        if entry.is_empty() || kept.iter().any(|k| k == entry) {
            continue;
        }
        if !needle.is_empty() && contains_phrase(&words(attribution(entry)), &needle) {
            tracing::debug!(entry, tradition, "dropping parallel from the origin tradition");
            continue;
        }
        kept.push(entry.to_string());
    }
    kept
}

fn attribution(entry: &str) -> &str {
    if entry.ends_with(')') {
        if let Some(open) = entry.rfind('(') {
            return &entry[open..];
        }
    }
    entry
}

fn words(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn contains_phrase(haystack: &[String], needle: &[String]) -> bool {
    haystack.windows(needle.len()).any(|window| window == needle)
}
