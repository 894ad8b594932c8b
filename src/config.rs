//! Configuration management for the Bedrock advisor MCP server
//!
//! Settings come from an optional JSON file in the config directory, then
//! environment variables, with later sources overriding earlier ones.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use crate::bedrock::family::ModelFamily;
use crate::bedrock::types::GenerationParams;
use crate::error::{ConfigError, Result};

/// Default AWS region
pub const DEFAULT_REGION: &str = "us-east-1";

/// Default bound on a single model call
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Environment variable naming an alternative config file
pub const CONFIG_PATH_ENV: &str = "BEDROCK_ADVISOR_CONFIG";

/// Environment variable names
pub mod env {
    pub const REGION: &str = "BEDROCK_REGION";
    pub const AWS_REGION: &str = "AWS_REGION";
    pub const ENDPOINT_URL: &str = "BEDROCK_ENDPOINT_URL";
    pub const BEARER_TOKEN: &str = "AWS_BEARER_TOKEN_BEDROCK";
    pub const TIMEOUT_SECS: &str = "BEDROCK_TIMEOUT_SECS";
    pub const MAX_TOKENS: &str = "BEDROCK_MAX_TOKENS";
    pub const TEMPERATURE: &str = "BEDROCK_TEMPERATURE";
    pub const TOP_P: &str = "BEDROCK_TOP_P";
    pub const TITAN_MODEL_ID: &str = "BEDROCK_TITAN_MODEL_ID";
    pub const NOVA_MODEL_ID: &str = "BEDROCK_NOVA_MODEL_ID";
    pub const CLAUDE_MODEL_ID: &str = "BEDROCK_CLAUDE_MODEL_ID";
}

/// Configuration for the Bedrock advisor MCP server
#[derive(Debug, Clone)]
pub struct Config {
    /// Config file that was loaded, if any
    pub config_path: Option<PathBuf>,

    /// AWS region of the Bedrock runtime
    pub region: String,

    /// Bedrock runtime endpoint
    pub endpoint_url: String,

    /// Bedrock API key sent as bearer auth
    pub bearer_token: Option<BearerToken>,

    /// Bound on each model call
    pub request_timeout: Duration,

    /// Generation options applied to every call
    pub generation: GenerationParams,

    /// Model ID per family
    pub models: ModelIds,
}

/// Bedrock model ID for each model family
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelIds {
    pub titan: String,
    pub nova: String,
    pub claude: String,
}

impl ModelIds {
    pub fn for_family(&self, family: ModelFamily) -> &str {
        match family {
            ModelFamily::Titan => &self.titan,
            ModelFamily::Nova => &self.nova,
            ModelFamily::Claude => &self.claude,
        }
    }
}

impl Default for ModelIds {
    fn default() -> Self {
        Self {
            titan: ModelFamily::Titan.default_model_id().to_string(),
            nova: ModelFamily::Nova.default_model_id().to_string(),
            claude: ModelFamily::Claude.default_model_id().to_string(),
        }
    }
}

/// API key that never shows up in logs
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken(***)")
    }
}

/// On-disk configuration file format
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub region: Option<String>,
    pub endpoint_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub generation: GenerationParams,
    pub models: FileModelIds,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FileModelIds {
    pub titan: Option<String>,
    pub nova: Option<String>,
    pub claude: Option<String>,
}

impl Config {
    /// Create a configuration from the config file and the environment,
    /// reading `path` instead of the default config file when given.
    ///
    /// An explicit path must exist; the default file is optional.
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let explicit = path.or_else(|| std::env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from));

        let (config_path, file) = match explicit {
            Some(path) => {
                let file = Self::read_file(&path)?;
                (Some(path), Some(file))
            }
            None => match Self::default_config_path() {
                Some(path) if path.exists() => {
                    let file = Self::read_file(&path)?;
                    (Some(path), Some(file))
                }
                _ => (None, None),
            },
        };

        let mut config = Self::from_sources(file, |key| std::env::var(key).ok())?;
        config.config_path = config_path;
        Ok(config)
    }

    /// Build a configuration from a parsed config file and an environment lookup
    pub fn from_sources<F>(file: Option<FileConfig>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file = file.unwrap_or_default();

        let region = lookup(env::REGION)
            .or_else(|| lookup(env::AWS_REGION))
            .or(file.region)
            .unwrap_or_else(|| DEFAULT_REGION.to_string());

        let endpoint_url = lookup(env::ENDPOINT_URL)
            .or(file.endpoint_url)
            .unwrap_or_else(|| format!("https://bedrock-runtime.{}.amazonaws.com", region));

        let bearer_token = lookup(env::BEARER_TOKEN)
            .filter(|t| !t.trim().is_empty())
            .map(BearerToken::new);

        let timeout_secs = parse_var(&lookup, env::TIMEOUT_SECS)?
            .or(file.timeout_secs)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(invalid(format!("{} must be greater than zero", env::TIMEOUT_SECS)).into());
        }

        let generation = file.generation.merged_with(GenerationParams {
            max_output_tokens: parse_var(&lookup, env::MAX_TOKENS)?,
            temperature: parse_var(&lookup, env::TEMPERATURE)?,
            top_p: parse_var(&lookup, env::TOP_P)?,
        });
        generation.validate().map_err(invalid)?;

        let defaults = ModelIds::default();
        let models = ModelIds {
            titan: lookup(env::TITAN_MODEL_ID)
                .or(file.models.titan)
                .unwrap_or(defaults.titan),
            nova: lookup(env::NOVA_MODEL_ID)
                .or(file.models.nova)
                .unwrap_or(defaults.nova),
            claude: lookup(env::CLAUDE_MODEL_ID)
                .or(file.models.claude)
                .unwrap_or(defaults.claude),
        };

        Ok(Self {
            config_path: None,
            region,
            endpoint_url,
            bearer_token,
            request_timeout: Duration::from_secs(timeout_secs),
            generation,
            models,
        })
    }

    /// Default config file location: `~/.bedrock-advisor-mcp/config.json`
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".bedrock-advisor-mcp").join("config.json"))
    }

    fn read_file(path: &Path) -> Result<FileConfig> {
        let read_error = |message: String| ConfigError::FileRead {
            path: path.display().to_string(),
            message,
        };

        let contents = std::fs::read_to_string(path).map_err(|e| read_error(e.to_string()))?;
        let file = serde_json::from_str(&contents).map_err(|e| read_error(e.to_string()))?;
        Ok(file)
    }

    #[cfg(test)]
    pub(crate) fn for_tests() -> Self {
        let mut config = Self::from_sources(None, |_| None).expect("default config");
        config.endpoint_url = "http://localhost:9".to_string();
        config
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| invalid(format!("{}='{}': {}", key, raw, e)).into()),
        None => Ok(None),
    }
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::InvalidConfig {
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_sources(None, lookup(&[])).unwrap();
        assert_eq!(config.region, "us-east-1");
        assert_eq!(config.endpoint_url, "https://bedrock-runtime.us-east-1.amazonaws.com");
        assert_eq!(config.request_timeout, Duration::from_secs(60));
        assert_eq!(config.models, ModelIds::default());
        assert!(config.bearer_token.is_none());
    }

    #[test]
    fn test_env_overrides_file() {
        let file = FileConfig {
            region: Some("eu-west-1".to_string()),
            timeout_secs: Some(10),
            generation: GenerationParams {
                max_output_tokens: Some(800),
                temperature: Some(0.1),
                top_p: None,
            },
            models: FileModelIds {
                nova: Some("amazon.nova-lite-v1:0".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        let vars = lookup(&[(env::TIMEOUT_SECS, "5"), (env::TEMPERATURE, "0.3")]);

        let config = Config::from_sources(Some(file), vars).unwrap();
        assert_eq!(config.endpoint_url, "https://bedrock-runtime.eu-west-1.amazonaws.com");
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.generation.max_output_tokens, Some(800));
        assert_eq!(config.generation.temperature, Some(0.3));
        assert_eq!(config.models.nova, "amazon.nova-lite-v1:0");
        assert_eq!(config.models.titan, "amazon.titan-text-express-v1");
    }

    #[test]
    fn test_rejects_out_of_range_temperature() {
        let result = Config::from_sources(None, lookup(&[(env::TEMPERATURE, "1.7")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_unparseable_timeout() {
        let err = Config::from_sources(None, lookup(&[(env::TIMEOUT_SECS, "soon")])).unwrap_err();
        assert!(err.to_string().contains(env::TIMEOUT_SECS));

        assert!(Config::from_sources(None, lookup(&[(env::TIMEOUT_SECS, "0")])).is_err());
    }

    #[test]
    fn test_bearer_token_is_redacted() {
        let config = Config::from_sources(None, lookup(&[(env::BEARER_TOKEN, "secret-key")])).unwrap();
        let token = config.bearer_token.as_ref().unwrap();
        assert_eq!(token.expose(), "secret-key");
        assert!(!format!("{:?}", config).contains("secret-key"));
    }

    #[test]
    fn test_file_config_deserialize() {
        let json = r#"{"region":"us-west-2","generation":{"top_p":0.8},"models":{"claude":"anthropic.claude-3-sonnet"}}"#;
        let file: FileConfig = serde_json::from_str(json).unwrap();
        assert_eq!(file.region.as_deref(), Some("us-west-2"));
        assert_eq!(file.generation.top_p, Some(0.8));
        assert_eq!(file.models.claude.as_deref(), Some("anthropic.claude-3-sonnet"));
    }
}
