use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if a numeric variable does not parse.
#[derive(Debug, Clone)]
pub struct Config {
    /// Gemini API key. When absent the service still scores alignment but
    /// skips the LLM overview and transcript summary.
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub port: u16,
    pub rust_log: String,
    pub max_upload_bytes: usize,
    pub overview_cache_capacity: usize,
}

const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash-lite";
const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
const DEFAULT_OVERVIEW_CACHE_CAPACITY: usize = 256;

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        let defaults = Config::default();

        Ok(Config {
            gemini_api_key: optional_env("GEMINI_API_KEY"),
            gemini_model: optional_env("GEMINI_MODEL").unwrap_or(defaults.gemini_model),
            gemini_base_url: optional_env("GEMINI_BASE_URL").unwrap_or(defaults.gemini_base_url),
            port: parse_env("PORT", defaults.port)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or(defaults.rust_log),
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", defaults.max_upload_bytes)?,
            overview_cache_capacity: parse_env(
                "OVERVIEW_CACHE_CAPACITY",
                defaults.overview_cache_capacity,
            )?,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            gemini_base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            port: 8080,
            rust_log: "info".to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            overview_cache_capacity: DEFAULT_OVERVIEW_CACHE_CAPACITY,
        }
    }
}

/// Blank values count as unset so `GEMINI_API_KEY=` in a .env disables the LLM.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_model_matches_constant() {
        let config = Config::default();
        assert_eq!(config.gemini_model, "gemini-2.5-flash-lite");
        assert!(config.gemini_api_key.is_none());
    }

    #[test]
    fn test_parse_env_falls_back_to_default() {
        let value: usize = parse_env("INTERVIEW_ANALYZER_TEST_UNSET_VAR", 42).unwrap();
        assert_eq!(value, 42);
    }

    #[test]
    fn test_parse_env_rejects_garbage() {
        std::env::set_var("INTERVIEW_ANALYZER_TEST_BAD_PORT", "eighty");
        let result: Result<u16> = parse_env("INTERVIEW_ANALYZER_TEST_BAD_PORT", 8080);
        assert!(result.is_err());
        std::env::remove_var("INTERVIEW_ANALYZER_TEST_BAD_PORT");
    }

    #[test]
    fn test_blank_optional_env_is_none() {
        std::env::set_var("INTERVIEW_ANALYZER_TEST_BLANK", "   ");
        assert!(optional_env("INTERVIEW_ANALYZER_TEST_BLANK").is_none());
        std::env::remove_var("INTERVIEW_ANALYZER_TEST_BLANK");
    }
}
