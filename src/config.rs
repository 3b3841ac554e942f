//! Application configuration loaded from environment variables.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // === Server Configuration ===
    /// Address the HTTP server binds to.
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    // === Artifacts ===
    /// Serialized classifier.
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,

    /// Serialized TF-IDF vectorizer.
    #[serde(default = "default_vectorizer_path")]
    pub vectorizer_path: PathBuf,

    // === Input Bounds ===
    /// Longest accepted query in characters (0 disables the limit).
    #[serde(default = "default_max_query_chars")]
    pub max_query_chars: usize,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_request_timeout() -> u64 {
    30
}

fn default_model_path() -> PathBuf {
    PathBuf::from("rf_model.json")
}

fn default_vectorizer_path() -> PathBuf {
    PathBuf::from("tfidf_vectorizer.json")
}

fn default_max_query_chars() -> usize {
    10_000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_secs: default_request_timeout(),
            model_path: default_model_path(),
            vectorizer_path: default_vectorizer_path(),
            max_query_chars: default_max_query_chars(),
        }
    }
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    /// Check if the configuration is valid.
    pub fn validate(&self) -> Result<(), String> {
        if self.host.trim().is_empty() {
            return Err("HOST must not be empty".to_string());
        }

        if self.port == 0 {
            return Err("PORT must be non-zero".to_string());
        }

        if self.request_timeout_secs == 0 {
            return Err("REQUEST_TIMEOUT_SECS must be at least 1".to_string());
        }

        if self.model_path.as_os_str().is_empty() {
            return Err("MODEL_PATH must not be empty".to_string());
        }

        if self.vectorizer_path.as_os_str().is_empty() {
            return Err("VECTORIZER_PATH must not be empty".to_string());
        }

        Ok(())
    }

    /// Request timeout as a duration.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Query length cap, `None` when unlimited.
    pub fn query_limit(&self) -> Option<usize> {
        (self.max_query_chars > 0).then_some(self.max_query_chars)
    }

    /// `host:port` string for error messages.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values_are_sensible() {
        let config = Config::default();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8000);
        assert_eq!(config.model_path, PathBuf::from("rf_model.json"));
        assert_eq!(config.vectorizer_path, PathBuf::from("tfidf_vectorizer.json"));
        assert_eq!(config.query_limit(), Some(10_000));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn deserializes_from_env_style_pairs() {
        let vars = vec![
            ("PORT".to_string(), "9100".to_string()),
            ("MODEL_PATH".to_string(), "/models/rf.json".to_string()),
            ("MAX_QUERY_CHARS".to_string(), "0".to_string()),
        ];
        let config: Config = envy::from_iter(vars).unwrap();

        assert_eq!(config.port, 9100);
        assert_eq!(config.model_path, PathBuf::from("/models/rf.json"));
        assert_eq!(config.vectorizer_path, default_vectorizer_path());
        assert_eq!(config.query_limit(), None);
        assert_eq!(config.bind_address(), "127.0.0.1:9100");
    }

    #[test]
    fn validate_rejects_zero_port() {
        let config = Config {
            port: 0,
            ..Config::default()
        };

        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_timeout() {
        let config = Config {
            request_timeout_secs: 0,
            ..Config::default()
        };

        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_empty_artifact_path() {
        let config = Config {
            vectorizer_path: PathBuf::new(),
            ..Config::default()
        };

        assert!(config.validate().is_err());
    }
}
