use serde::{Deserialize, Serialize};

/// Providers the HTTP model client knows how to talk to.
pub const PROVIDERS: [&str; 3] = ["gemini", "openai", "ollama"];

/// Upper bound for `LLM_TIMEOUT_SECS`.
const MAX_TIMEOUT_SECS: u64 = 300;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server bind address
    pub bind_addr: String,
    /// LLM provider configuration
    pub llm: LlmConfig,
    /// Maximum searches running at once; extra requests get a 503
    pub max_concurrent_searches: usize,
    /// Maximum decoded size of an uploaded audio clip
    pub max_audio_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// "gemini", "openai" or "ollama"
    pub provider: String,
    /// Base URL for the LLM API
    pub base_url: String,
    /// Model name for structured text generation
    pub chat_model: String,
    /// Model name for origin-map illustrations
    pub image_model: String,
    /// Model name for speech-to-text (OpenAI-compatible providers only)
    pub transcription_model: String,
    /// API key (not needed for a local Ollama)
    pub api_key: Option<String>,
    pub temperature: f32,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:9000".to_string(),
            llm: LlmConfig::default(),
            max_concurrent_searches: 8,
            max_audio_bytes: 10 * 1024 * 1024,
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            chat_model: "gemini-2.0-flash".to_string(),
            image_model: "imagen-4.0-fast-generate-001".to_string(),
            transcription_model: "whisper-1".to_string(),
            api_key: None,
            temperature: 0.3,
            timeout_secs: 60,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup, starting from defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(addr) = lookup("WISDOM_BIND_ADDR") {
            config.bind_addr = addr;
        }
        if let Some(val) = lookup("WISDOM_MAX_CONCURRENT_SEARCHES") {
            if let Ok(v) = val.parse::<usize>() {
                config.max_concurrent_searches = v.max(1);
            }
        }
        if let Some(val) = lookup("WISDOM_MAX_AUDIO_BYTES") {
            if let Ok(v) = val.parse() {
                config.max_audio_bytes = v;
            }
        }

        if let Some(provider) = lookup("LLM_PROVIDER") {
            config.llm.provider = provider.trim().to_lowercase();
            // Switching provider without a base URL should not keep pointing at Google
            if lookup("LLM_BASE_URL").is_none() {
                config.llm.base_url = default_base_url(&config.llm.provider).to_string();
            }
        }
        if let Some(url) = lookup("LLM_BASE_URL") {
            config.llm.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(model) = lookup("LLM_CHAT_MODEL") {
            config.llm.chat_model = model;
        }
        if let Some(model) = lookup("LLM_IMAGE_MODEL") {
            config.llm.image_model = model;
        }
        if let Some(model) = lookup("LLM_TRANSCRIPTION_MODEL") {
            config.llm.transcription_model = model;
        }
        config.llm.api_key = lookup("LLM_API_KEY")
            .or_else(|| lookup("GEMINI_API_KEY"))
            .or_else(|| lookup("GOOGLE_API_KEY"));
        if let Some(val) = lookup("LLM_TEMPERATURE") {
            if let Ok(t) = val.parse::<f32>() {
                config.llm.temperature = t.clamp(0.0, 2.0);
            }
        }
        if let Some(val) = lookup("LLM_TIMEOUT_SECS") {
            if let Ok(v) = val.parse::<u64>() {
                config.llm.timeout_secs = v.clamp(1, MAX_TIMEOUT_SECS);
            }
        }

        config
    }
}

pub fn default_base_url(provider: &str) -> &'static str {
    match provider {
        "openai" => "https://api.openai.com",
        "ollama" => "http://localhost:11434",
        _ => "https://generativelanguage.googleapis.com",
    }
}
