//! Console configuration.
//!
//! The embedded `console.yaml` is merged with an optional user file, keys are
//! lower-cased, then `PROGRAM_CONSOLE__SECTION__KEY` environment variables
//! override single values.

use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Duration;

use backend_http::{BackendHttpError, ProgramClient};
use serde::Deserialize;
use serde_yaml::{Mapping, Value};
use tracing::{debug, info};

const DEFAULT_CONFIG: &str = include_str!("console.yaml");

/// Prefix of environment variables overriding configuration keys.
pub const ENV_PREFIX: &str = "PROGRAM_CONSOLE__";

const CONFIG_DIR_NAME: &str = "program-console";
const CONFIG_FILE_NAME: &str = "console.yaml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ConsoleConfig {
    pub backend: BackendSettings,
    pub log: LogSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BackendSettings {
    pub base_url: String,
    pub timeout_secs: u64,
    pub user_agent: String,
    #[serde(default)]
    pub csrf_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LogSettings {
    pub filter: String,
}

impl ConsoleConfig {
    /// `<config dir>/program-console/console.yaml`, when the platform has one.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Loads configuration from `path` (or the default location) and the
    /// process environment.
    ///
    /// An explicit path must exist; a missing default file means defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let user_yaml = match path {
            Some(path) => Some(read_file(path)?),
            None => match Self::default_path() {
                Some(path) if path.is_file() => Some(read_file(&path)?),
                _ => {
                    info!("config file not found, using embedded defaults");
                    None
                }
            },
        };
        Self::from_sources(user_yaml.as_deref(), std::env::vars())
    }

    /// Builds configuration from an optional user document and environment pairs.
    pub fn from_sources(
        user_yaml: Option<&str>,
        vars: impl IntoIterator<Item = (String, String)>,
    ) -> Result<Self, ConfigError> {
        let mut value: Value = serde_yaml::from_str(DEFAULT_CONFIG)?;
        if let Some(user_yaml) = user_yaml {
            let external: Value = serde_yaml::from_str(user_yaml)?;
            if !external.is_null() {
                merge_yaml(&mut value, &external);
            }
        }
        let mut value = lower_keys(value);
        apply_env_overrides(&mut value, vars);

        let config: Self = serde_yaml::from_value(value)?;
        debug!(base_url = %config.backend.base_url, "configuration resolved");
        Ok(config)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.backend.timeout_secs)
    }

    /// Builds the HTTP client described by the `backend` section.
    pub fn build_client(&self) -> Result<ProgramClient, BackendHttpError> {
        let mut builder = ProgramClient::builder(self.backend.base_url.as_str())
            .timeout(self.request_timeout())
            .user_agent(self.backend.user_agent.as_str());
        if let Some(token) = &self.backend.csrf_token {
            builder = builder.csrf_token(token.as_str());
        }
        builder.build()
    }
}

/// Configuration loading failure.
#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Yaml(serde_yaml::Error),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config file {}: {source}", path.display())
            }
            Self::Yaml(err) => write!(f, "invalid configuration: {err}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Yaml(err) => Some(err),
        }
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(value: serde_yaml::Error) -> Self {
        Self::Yaml(value)
    }
}

fn read_file(path: &Path) -> Result<String, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!(config_file = %path.display(), "loaded config file");
    Ok(contents)
}

fn merge_yaml(base: &mut Value, external: &Value) {
    match (base, external) {
        (Value::Mapping(base), Value::Mapping(external)) => {
            for (key, value) in external {
                match base.get_mut(key) {
                    Some(existing) => merge_yaml(existing, value),
                    None => {
                        base.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (base, external) => *base = external.clone(),
    }
}

fn lower_keys(value: Value) -> Value {
    match value {
        Value::Mapping(map) => Value::Mapping(
            map.into_iter()
                .map(|(key, value)| {
                    let key = match key {
                        Value::String(key) => Value::String(key.to_lowercase()),
                        other => other,
                    };
                    (key, lower_keys(value))
                })
                .collect(),
        ),
        other => other,
    }
}

fn apply_env_overrides(config: &mut Value, vars: impl IntoIterator<Item = (String, String)>) {
    for (key, raw) in vars {
        let Some(path) = key.strip_prefix(ENV_PREFIX) else {
            continue;
        };
        let path: Vec<String> = path
            .split("__")
            .filter(|segment| !segment.is_empty())
            .map(str::to_lowercase)
            .collect();
        if path.is_empty() {
            continue;
        }
        debug!(key = %key, "config override from environment");
        set_path(config, &path, env_value(&raw));
    }
}

fn env_value(raw: &str) -> Value {
    match serde_yaml::from_str::<Value>(raw) {
        Ok(Value::Mapping(_)) | Ok(Value::Sequence(_)) | Err(_) => Value::String(raw.to_string()),
        Ok(value) => value,
    }
}

fn set_path(config: &mut Value, path: &[String], value: Value) {
    let Some((last, parents)) = path.split_last() else {
        return;
    };
    let mut node = config;
    for segment in parents {
        if !node.is_mapping() {
            *node = Value::Mapping(Mapping::new());
        }
        let Value::Mapping(map) = node else {
            return;
        };
        node = map
            .entry(Value::String(segment.clone()))
            .or_insert_with(|| Value::Mapping(Mapping::new()));
    }
    if !node.is_mapping() {
        *node = Value::Mapping(Mapping::new());
    }
    if let Value::Mapping(map) = node {
        map.insert(Value::String(last.clone()), value);
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, ConsoleConfig};

    fn no_env() -> Vec<(String, String)> {
        Vec::new()
    }

    #[test]
    fn embedded_defaults_resolve() {
        let config = ConsoleConfig::from_sources(None, no_env()).expect("defaults should parse");

        assert_eq!(config.backend.base_url, "http://127.0.0.1:8080");
        assert_eq!(config.backend.timeout_secs, 30);
        assert_eq!(config.backend.csrf_token, None);
        assert_eq!(config.log.filter, "info");
    }

    #[test]
    fn user_file_merges_over_defaults_with_case_insensitive_keys() {
        let user = "Backend:\n  BASE_URL: https://console.example\nlog:\n  filter: debug\n";

        let config = ConsoleConfig::from_sources(Some(user), no_env()).expect("merge should parse");

        assert_eq!(config.backend.base_url, "https://console.example");
        assert_eq!(config.backend.timeout_secs, 30);
        assert_eq!(config.log.filter, "debug");
    }

    #[test]
    fn environment_overrides_nested_keys() {
        let vars = vec![
            ("PROGRAM_CONSOLE__BACKEND__TIMEOUT_SECS".to_string(), "5".to_string()),
            ("PROGRAM_CONSOLE__BACKEND__CSRF_TOKEN".to_string(), "tok-1".to_string()),
            ("UNRELATED".to_string(), "x".to_string()),
        ];

        let config = ConsoleConfig::from_sources(None, vars).expect("overrides should apply");

        assert_eq!(config.backend.timeout_secs, 5);
        assert_eq!(config.backend.csrf_token.as_deref(), Some("tok-1"));
    }

    #[test]
    fn empty_user_file_keeps_defaults() {
        let config = ConsoleConfig::from_sources(Some(""), no_env()).expect("empty file is fine");

        assert_eq!(config.backend.user_agent, "program-console/0.1");
    }

    #[test]
    fn wrong_value_type_is_reported() {
        let user = "backend:\n  timeout_secs: soon\n";

        let error = ConsoleConfig::from_sources(Some(user), no_env())
            .expect_err("non-numeric timeout must fail");

        assert!(matches!(error, ConfigError::Yaml(_)));
    }

    #[test]
    fn missing_explicit_file_is_an_io_error() {
        let path = std::path::Path::new("/nonexistent/program-console/console.yaml");

        let error = ConsoleConfig::load(Some(path)).expect_err("missing file must fail");

        assert!(matches!(error, ConfigError::Io { .. }));
    }

    #[test]
    fn client_is_built_from_backend_section() {
        let config = ConsoleConfig::from_sources(None, no_env()).expect("defaults should parse");

        let client = config.build_client().expect("default url is valid");

        assert_eq!(client.base_url().as_str(), "http://127.0.0.1:8080/");
    }
}
