use std::time::Duration;

/// Application-level constants
pub const APP_NAME: &str = "Appointment Guide";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Gemini model used when `GEMINI_MODEL` is unset.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";

/// Public Generative Language API endpoint.
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Connect timeout only. The stream itself has no deadline.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Slider default for the creativity (temperature) control.
pub const DEFAULT_CREATIVITY: f32 = 0.7;

/// Largest upload accepted for text extraction (200 MiB).
pub const MAX_UPLOAD_BYTES: u64 = 200 * 1024 * 1024;

const ENV_API_KEY: &str = "GOOGLE_API_KEY";
const ENV_MODEL: &str = "GEMINI_MODEL";
const ENV_BASE_URL: &str = "GEMINI_BASE_URL";
const ENV_CONNECT_TIMEOUT: &str = "GEMINI_CONNECT_TIMEOUT_SECS";

/// Tracing filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "appointment_guide=info"
}

/// Process-wide settings for the hosted generation service.
///
/// Read once at startup and handed to `GeminiClient::new`. The API key is
/// not validated here: a missing key surfaces as an API error on the first
/// generation call.
#[derive(Debug, Clone, PartialEq)]
pub struct GeminiSettings {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub connect_timeout: Duration,
}

impl Default for GeminiSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: DEFAULT_GEMINI_MODEL.to_string(),
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
        }
    }
}

impl GeminiSettings {
    /// Read settings from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup (tests pass a map).
    ///
    /// Blank values fall back to defaults. An unparsable timeout is logged
    /// and ignored.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut settings = Self::default();

        if let Some(key) = get(ENV_API_KEY) {
            settings.api_key = key;
        }
        if let Some(model) = get(ENV_MODEL) {
            settings.model = model;
        }
        if let Some(url) = get(ENV_BASE_URL) {
            settings.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(raw) = get(ENV_CONNECT_TIMEOUT) {
            match raw.parse::<u64>() {
                Ok(secs) => settings.connect_timeout = Duration::from_secs(secs),
                Err(_) => tracing::warn!(
                    value = %raw,
                    "Ignoring invalid {ENV_CONNECT_TIMEOUT}, using default"
                ),
            }
        }

        settings
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.is_empty()
    }
}
