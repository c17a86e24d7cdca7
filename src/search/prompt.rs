//! Prompt selection and rendering.
//!
//! There is one template per task. The per-mode differences (persona,
//! eligible texts, exclusions) come from [`catalog::ModeProfile`], and the
//! strict/lenient source split is a [`VersePrompt`] chosen once per search.

use anyhow::Result;

use crate::models::SearchMode;
use crate::search::catalog::{self, ModeProfile};
use crate::search::template::{render, Vars};

const VERSE_TEMPLATE: &str = "\
You are {{persona}}.
{{#if source}}Find the single best passage for the user's topic from \"{{source}}\".
ABSOLUTE REQUIREMENT: the passage MUST come from \"{{source}}\". If no passage in \"{{source}}\" relates to the topic, return null for \"verse\". DO NOT select a passage from any other text.
{{else}}Find the single best passage for the user's topic from {{category}} (e.g., {{examples}}).
{{#if exclusions}}Never use {{exclusions}}.
{{/if}}The user may misspell the topic or the names of texts; use fuzzy matching (\"forgivness\" means \"forgiveness\", \"Bhagvad Geeta\" means \"Bhagavad Gita\", \"Jon 3 16\" means \"John 3:16\"). If there is no exact match, return the closest relevant passage.
{{/if}}
ACCURACY FIRST: only return a passage you can confidently and accurately identify. Never invent or paraphrase text. If you are not certain, return null for \"verse\"; returning nothing is better than returning incorrect information.
If you find a passage, give its exact text, its specific source (book, chapter and verse, or work and section), and the tradition it belongs to.

Topic: {{query}}
";

const ANALYSIS_TEMPLATE: &str = "\
You are a religious and philosophical scholar skilled in analyzing texts from multiple perspectives.
For the following passage, provide:
1. \"analysis\": a clear analysis of its meaning within its original context.
2. \"insights\": the key insights and lessons that can be drawn from it.
3. \"reflection\": a non-religious, secular, or philosophical reflection on its universal themes, accessible to someone who follows no religion, including an atheist.

Passage: \"{{verse}}\"
";

const PARALLELS_TEMPLATE: &str = "\
You are a comparative religion and philosophy expert.
For the passage below, find several parallel teachings, quotes, or verses from other traditions, drawn from {{category}}.
{{#if exclusions}}Never use {{exclusions}}.
{{/if}}Do NOT include anything from the passage's own tradition (\"{{tradition}}\").
Each parallel MUST be a single string containing the quote, its full reference and its tradition, for example: \"Hatred does not cease by hatred, but only by love. (Dhammapada 5, Buddhism)\".
{{#if targets}}CRITICAL: parallels MUST come only from these texts:
{{#each targets}}- \"{{this}}\"
{{/each}}If none of them contains a parallel, return an empty array. Do not search in other texts.
{{else}}You may use any relevant text within this category.
{{/if}}Only cite passages you can accurately identify; return an empty array rather than inventing one.

Original passage: \"{{verse}}\"
Original tradition: \"{{tradition}}\"
";

const FACT_PROMPT: &str = "\
Generate a single, interesting, and lesser-known fact about world religions or philosophies.
Draw from a wide and diverse range of traditions: Abrahamic religions, Dharmic religions, East Asian philosophies, indigenous spiritual traditions, ancient philosophies such as Stoicism or Epicureanism, Zoroastrianism, and newer or syncretic faiths.
The fact should be concise, easily understood by a general audience, and framed as a standalone statement.
";

const ORIGIN_MAP_TEMPLATE: &str = "\
Create an artistic and illustrative map showing the origin of {{tradition}}. The style should be elegant and slightly vintage, like an old manuscript or map. It must feature:
1. A clear pin or marker on the primary city or region of origin.
2. The name of the region and the approximate date of origin in elegant typography.
3. Subtle artistic elements related to the tradition, such as small symbols or stylized borders.
Focus on the specific geographical area of origin, not a full world map. Avoid overly complex details.
";

/// How the verse lookup treats the user's source choice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersePrompt {
    /// Only the named source may be used; no match means no verse
    Strict { source: String },
    /// Any eligible text for the mode, with fuzzy matching
    General,
}

impl VersePrompt {
    pub fn select(source: Option<&str>) -> Self {
        match source {
            Some(source) => VersePrompt::Strict {
                source: sanitize_for_prompt(source),
            },
            None => VersePrompt::General,
        }
    }

    pub fn source(&self) -> Option<&str> {
        match self {
            VersePrompt::Strict { source } => Some(source),
            VersePrompt::General => None,
        }
    }

    pub fn render(&self, mode: SearchMode, query: &str) -> Result<String> {
        let profile = catalog::profile(mode);
        let vars = profile_vars(profile)
            .text("examples", profile.examples)
            .text("query", sanitize_for_prompt(query))
            .opt_text("source", self.source());
        render(VERSE_TEMPLATE, &vars)
    }
}

fn profile_vars(profile: &ModeProfile) -> Vars {
    Vars::new()
        .text("persona", profile.persona)
        .text("category", profile.category)
        .text("exclusions", profile.exclusions)
}

pub fn analysis_prompt(verse_text: &str) -> Result<String> {
    render(
        ANALYSIS_TEMPLATE,
        &Vars::new().text("verse", sanitize_for_prompt(verse_text)),
    )
}

/// Parallels for a verse within `mode`'s category. A non-empty `targets`
/// restricts the search to exactly those texts.
pub fn parallels_prompt(
    verse_text: &str,
    tradition: &str,
    mode: SearchMode,
    targets: &[String],
) -> Result<String> {
    let vars = profile_vars(catalog::profile(mode))
        .text("verse", sanitize_for_prompt(verse_text))
        .text("tradition", sanitize_for_prompt(tradition))
        .list(
            "targets",
            targets.iter().map(|t| sanitize_for_prompt(t)).collect(),
        );
    render(PARALLELS_TEMPLATE, &vars)
}

pub fn fact_prompt() -> &'static str {
    FACT_PROMPT
}

pub fn origin_map_prompt(tradition: &str) -> Result<String> {
    render(
        ORIGIN_MAP_TEMPLATE,
        &Vars::new().text("tradition", sanitize_for_prompt(tradition)),
    )
}

/// Strip chat-template control tokens so user text cannot open a new turn.
pub fn sanitize_for_prompt(text: &str) -> String {
    const CONTROL_TOKENS: [&str; 5] = [
        "<|im_start|>",
        "<|im_end|>",
        "<|endoftext|>",
        "<|system|>",
        "<|assistant|>",
    ];
    let mut clean = text.to_string();
    for token in CONTROL_TOKENS {
        clean = clean.replace(token, "");
    }
    clean.trim().to_string()
}
