use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use stremthru::ClientConfig;

/// CLI configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub client: ClientConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String, // "json" or "pretty"
    pub file_path: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: "pretty".to_string(),
            file_path: None,
        }
    }
}

impl Config {
    /// Load configuration from an optional file and `STREMTHRU_*` variables
    pub fn load(config_file: Option<&str>) -> Result<Self, ConfigError> {
        Self::load_from(config_file, env_source())
    }

    fn load_from(config_file: Option<&str>, env: Environment) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder();

        // Load config file if provided
        if let Some(path) = config_file {
            if !Path::new(path).exists() {
                return Err(ConfigError::Message(format!("config file not found: {path}")));
            }
            builder = builder.add_source(File::with_name(path));
        }

        // Override with environment variables (STREMTHRU_CLIENT__BASE_URL, etc.)
        builder = builder.add_source(env);

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Validate configuration, collecting every problem found
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.client.base_url.trim().is_empty() {
            errors.push("client.base_url is required (--base-url or STREMTHRU_CLIENT__BASE_URL)".to_string());
        }
        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            errors.push(format!(
                "logging.format must be \"pretty\" or \"json\", got \"{}\"",
                self.logging.format
            ));
        }
        if crate::logging::parse_log_level(&self.logging.level).is_err() {
            errors.push(format!("logging.level is invalid: \"{}\"", self.logging.level));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

fn env_source() -> Environment {
    Environment::with_prefix("STREMTHRU")
        .prefix_separator("_")
        .separator("__")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use stremthru::Auth;

    fn env(vars: &[(&str, &str)]) -> Environment {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        env_source().source(Some(map))
    }

    fn config_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.client.base_url, "");
        assert!(config.client.auth.is_none());
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.logging.format, "pretty");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let file = config_file(
            r#"
            [client]
            base_url = "http://localhost:8080"
            timeout = 30
            client_ip = "10.0.0.1"

            [client.auth]
            store = "realdebrid"
            token = "secret"

            [logging]
            format = "json"
            "#,
        );
        let path = file.path().to_str().unwrap();

        let config = Config::load_from(Some(path), env(&[])).unwrap();
        assert_eq!(config.client.base_url, "http://localhost:8080");
        assert_eq!(config.client.timeout, Some(30));
        assert_eq!(config.client.client_ip.as_deref(), Some("10.0.0.1"));
        assert_eq!(config.client.auth, Some(Auth::store("realdebrid", "secret")));
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.logging.level, "warn");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_overrides_file() {
        let file = config_file(
            r#"
            [client]
            base_url = "http://file:8080"
            auth = "root:root"
            "#,
        );
        let path = file.path().to_str().unwrap();

        let config = Config::load_from(
            Some(path),
            env(&[
                ("STREMTHRU_CLIENT__BASE_URL", "http://env:8080"),
                ("STREMTHRU_LOGGING__LEVEL", "debug"),
            ]),
        )
        .unwrap();
        assert_eq!(config.client.base_url, "http://env:8080");
        assert_eq!(config.client.auth, Some(Auth::token("root:root")));
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_missing_file_is_error() {
        let result = Config::load_from(Some("/nonexistent/stremthru.toml"), env(&[]));
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_reports_all_errors() {
        let mut config = Config::default();
        config.logging.format = "xml".to_string();
        config.logging.level = "loud".to_string();
        let errors = config.validate().unwrap_err();
        assert_eq!(errors.len(), 3);
    }
}
