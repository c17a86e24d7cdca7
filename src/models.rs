use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::WisdomError;

/// The worldview filter that decides which categories of text are eligible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SearchMode {
    Religious,
    Spiritual,
    #[serde(rename = "Non-Religious")]
    NonReligious,
    Universalist,
}

impl SearchMode {
    pub const ALL: [SearchMode; 4] = [
        SearchMode::Religious,
        SearchMode::Spiritual,
        SearchMode::NonReligious,
        SearchMode::Universalist,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SearchMode::Religious => "Religious",
            SearchMode::Spiritual => "Spiritual",
            SearchMode::NonReligious => "Non-Religious",
            SearchMode::Universalist => "Universalist",
        }
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchMode {
    type Err = WisdomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        SearchMode::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| WisdomError::InvalidMode(s.to_string()))
    }
}

/// A retrieved passage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verse {
    pub text: String,
    /// Citation: book/chapter/verse or work title
    pub source: String,
    pub tradition: String,
}

/// Commentary derived from a verse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analysis {
    pub analysis: String,
    #[serde(deserialize_with = "string_or_list")]
    pub insights: String,
    pub reflection: String,
}

/// Cross-tradition echoes, each entry a quote with its citation.
pub type Parallels = Vec<String>;

/// Models sometimes answer a "string" field with a bulleted array.
fn string_or_list<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrList {
        One(String),
        Many(Vec<String>),
    }

    Ok(match StringOrList::deserialize(deserializer)? {
        StringOrList::One(s) => s,
        StringOrList::Many(items) => items.join("\n"),
    })
}

/// A validated search request, as seen by the core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub query: String,
    pub mode: SearchMode,
    /// `None` means "any eligible text"; the per-mode sentinel never gets here
    pub source: Option<String>,
}

/// Combined output of one search.
///
/// Only the assembler builds these, so a missing verse always comes with a
/// missing analysis and missing parallels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResult {
    verse: Option<Verse>,
    analysis: Option<Analysis>,
    parallels: Option<Parallels>,
}

impl SearchResult {
    pub(crate) fn not_found() -> Self {
        Self {
            verse: None,
            analysis: None,
            parallels: None,
        }
    }

    pub(crate) fn found(verse: Verse, analysis: Analysis, parallels: Parallels) -> Self {
        Self {
            verse: Some(verse),
            analysis: Some(analysis),
            parallels: Some(parallels),
        }
    }

    pub fn verse(&self) -> Option<&Verse> {
        self.verse.as_ref()
    }

    pub fn analysis(&self) -> Option<&Analysis> {
        self.analysis.as_ref()
    }

    pub fn parallels(&self) -> Option<&[String]> {
        self.parallels.as_deref()
    }

    pub fn is_found(&self) -> bool {
        self.verse.is_some()
    }
}

// ─── HTTP request/response types ─────────────────────────

/// Search request as posted by the form. Fields stay raw strings until the
/// normalizer has looked at them.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    pub mode: String,
    #[serde(default)]
    pub source: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    #[serde(flatten)]
    pub result: SearchResult,
    pub mode: SearchMode,
    /// Set when nothing matched, so the UI can suggest rephrasing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ParallelsRequest {
    pub verse: String,
    pub tradition: String,
    pub target_mode: String,
    #[serde(default)]
    pub target_sources: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ParallelsResponse {
    pub parallels: Parallels,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ThemeSearchRequest {
    pub theme: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ThemesResponse {
    pub themes: Vec<&'static str>,
    pub mode: SearchMode,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourcesQuery {
    pub mode: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SourcesResponse {
    pub mode: SearchMode,
    pub default_source: &'static str,
    pub sources: Vec<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FactResponse {
    pub fact: String,
    /// True when the model was unavailable and a stored fact was served
    pub fallback: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TranscribeRequest {
    pub audio_data_uri: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TranscribeResponse {
    pub text: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OriginMapRequest {
    pub tradition: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct OriginMapResponse {
    pub image_url: String,
}

/// LLM config update request
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfigUpdate {
    pub provider: Option<String>,
    // base_url intentionally omitted: immutable at runtime to prevent SSRF
    pub chat_model: Option<String>,
    pub image_model: Option<String>,
    pub transcription_model: Option<String>,
    pub api_key: Option<String>,
    pub temperature: Option<f32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LlmConfigResponse {
    pub provider: String,
    pub base_url: String,
    pub chat_model: String,
    pub image_model: String,
    pub transcription_model: String,
    pub temperature: f32,
    pub has_api_key: bool,
}
