use std::env;
use std::path::PathBuf;

pub const DEFAULT_CRICAPI_BASE_URL: &str = "https://api.cricapi.com/v1";
pub const DEFAULT_MODEL_PATH: &str = "models/win_model.json";
pub const DEFAULT_LEADERBOARD_PATH: &str = "data/final_combined_results.csv";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveFeedConfig {
    pub api_key: Option<String>,
    pub base_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub model_path: PathBuf,
    pub leaderboard_path: PathBuf,
    pub log_file: Option<PathBuf>,
    pub live: LiveFeedConfig,
}

impl AppConfig {
    /// Reads process environment. Call after `dotenvy` has loaded any
    /// `.env.local` / `.env` files.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).and_then(non_empty);
        Self {
            model_path: get("T20_MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_MODEL_PATH)),
            leaderboard_path: get("T20_LEADERBOARD_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LEADERBOARD_PATH)),
            log_file: get("T20_LOG_FILE").map(PathBuf::from),
            live: LiveFeedConfig {
                api_key: get("CRICAPI_KEY"),
                base_url: get("CRICAPI_BASE_URL")
                    .map(|url| url.trim_end_matches('/').to_string())
                    .unwrap_or_else(|| DEFAULT_CRICAPI_BASE_URL.to_string()),
            },
        }
    }
}

/// Loads `.env.local` then `.env`; neither file is required.
pub fn load_dotenv() {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(pairs: &[(&str, &str)]) -> AppConfig {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let cfg = config(&[]);
        assert_eq!(cfg.model_path, PathBuf::from(DEFAULT_MODEL_PATH));
        assert_eq!(cfg.leaderboard_path, PathBuf::from(DEFAULT_LEADERBOARD_PATH));
        assert_eq!(cfg.live.base_url, DEFAULT_CRICAPI_BASE_URL);
        assert!(cfg.live.api_key.is_none());
        assert!(cfg.log_file.is_none());
    }

    #[test]
    fn blank_values_count_as_unset() {
        let cfg = config(&[("CRICAPI_KEY", "   "), ("T20_MODEL_PATH", "")]);
        assert!(cfg.live.api_key.is_none());
        assert_eq!(cfg.model_path, PathBuf::from(DEFAULT_MODEL_PATH));
    }

    #[test]
    fn overrides_are_trimmed() {
        let cfg = config(&[
            ("CRICAPI_KEY", " abc123 "),
            ("CRICAPI_BASE_URL", "http://localhost:9000/v1/"),
            ("T20_LOG_FILE", "/tmp/t20.log"),
        ]);
        assert_eq!(cfg.live.api_key.as_deref(), Some("abc123"));
        assert_eq!(cfg.live.base_url, "http://localhost:9000/v1");
        assert_eq!(cfg.log_file, Some(PathBuf::from("/tmp/t20.log")));
    }
}
