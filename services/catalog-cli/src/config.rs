use std::fmt;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Settings read from the environment at start-up.
#[derive(Clone, PartialEq)]
pub struct Config {
    pub data_dir: PathBuf,
    pub api_url: Option<String>,
    pub language: Option<String>,
    pub fallback_api_key: Option<String>,
}

// keeps the API key out of log output
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("data_dir", &self.data_dir)
            .field("api_url", &self.api_url)
            .field("language", &self.language)
            .field(
                "fallback_api_key",
                &self.fallback_api_key.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_empty = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let data_dir = non_empty("MOVIEDECK_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./moviedeck-data"));

        let api_url = non_empty("TMDB_API_URL");
        if let Some(url) = &api_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ConfigError::InvalidValue(
                    "TMDB_API_URL".to_owned(),
                    url.clone(),
                ));
            }
        }

        Ok(Self {
            data_dir,
            api_url,
            language: non_empty("TMDB_LANGUAGE"),
            fallback_api_key: non_empty("TMDB_FALLBACK_API_KEY"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = Config::from_lookup(lookup(&[])).expect("defaults should load");
        assert_eq!(config.data_dir, PathBuf::from("./moviedeck-data"));
        assert_eq!(config.api_url, None);
        assert_eq!(config.language, None);
    }

    #[test]
    fn blank_values_count_as_unset() {
        let config = Config::from_lookup(lookup(&[("TMDB_FALLBACK_API_KEY", "  ")]))
            .expect("blank key should be ignored");
        assert_eq!(config.fallback_api_key, None);
    }

    #[test]
    fn rejects_non_http_api_url() {
        let err = Config::from_lookup(lookup(&[("TMDB_API_URL", "ftp://example.org")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(name, _) if name == "TMDB_API_URL"));
    }

    #[test]
    fn debug_output_hides_fallback_key() {
        let config = Config::from_lookup(lookup(&[("TMDB_FALLBACK_API_KEY", "secret-key-123")]))
            .expect("config should load");
        let printed = format!("{config:?}");
        assert!(!printed.contains("secret-key-123"));
        assert!(printed.contains("<redacted>"));
        assert_eq!(config.fallback_api_key.as_deref(), Some("secret-key-123"));
    }
}
