use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Horadric";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default Gemini REST base (the model path is appended per request).
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Largest screenshot the loader accepts (advertised to the user as 10 MB).
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// Journal capacity; older entries are evicted first.
pub const JOURNAL_CAPACITY: usize = 50;

/// Artificial wait before a demo result is shown.
pub const DEMO_DELAY_MS: u64 = 1500;

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "horadric_lib=info,horadric=info,warn"
}

/// Get the application data directory.
///
/// `HORADRIC_DATA_DIR` wins; otherwise the platform local data dir
/// (falling back to the working directory when neither can be resolved).
pub fn app_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("HORADRIC_DATA_DIR") {
        if !dir.trim().is_empty() {
            return PathBuf::from(dir);
        }
    }
    dirs::data_local_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Get the key-value store directory
pub fn store_dir() -> PathBuf {
    app_data_dir().join("store")
}

/// Settings for the hosted inference service.
///
/// Model id and generation options drift between releases of the service,
/// so none of them are part of the pipeline contract.
#[derive(Debug, Clone, PartialEq)]
pub struct InferenceConfig {
    pub api_base: String,
    pub model: String,
    /// 0.0 biases the model toward deterministic output.
    pub temperature: f32,
    /// Optional "thinking" token budget; omitted from the request when `None`.
    pub thinking_budget: Option<u32>,
    pub timeout_secs: u64,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.0,
            thinking_budget: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl InferenceConfig {
    /// Defaults overridden by `HORADRIC_*` environment variables.
    ///
    /// Unparseable numeric values are ignored with a warning.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(base) = lookup("HORADRIC_API_BASE").filter(|v| !v.trim().is_empty()) {
            config.api_base = base.trim().trim_end_matches('/').to_string();
        }
        if let Some(model) = lookup("HORADRIC_MODEL").filter(|v| !v.trim().is_empty()) {
            config.model = model.trim().to_string();
        }
        if let Some(raw) = lookup("HORADRIC_TEMPERATURE") {
            match raw.trim().parse::<f32>() {
                Ok(t) if (0.0..=2.0).contains(&t) => config.temperature = t,
                _ => tracing::warn!(value = %raw, "Ignoring invalid HORADRIC_TEMPERATURE"),
            }
        }
        if let Some(raw) = lookup("HORADRIC_THINKING_BUDGET") {
            match raw.trim().parse::<u32>() {
                Ok(budget) => config.thinking_budget = Some(budget),
                Err(_) => tracing::warn!(value = %raw, "Ignoring invalid HORADRIC_THINKING_BUDGET"),
            }
        }
        if let Some(raw) = lookup("HORADRIC_TIMEOUT_SECS") {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => config.timeout_secs = secs,
                _ => tracing::warn!(value = %raw, "Ignoring invalid HORADRIC_TIMEOUT_SECS"),
            }
        }

        config
    }
}
