//! Client connection settings and conversation defaults.
//!
//! [`Config`] describes how to reach the API. [`ConversationConfig`] holds the
//! generation settings a conversation applies to every request it sends, and
//! can be loaded from TOML:
//!
//! ```toml
//! model = "gpt-4o"
//! instructions = "Answer in one sentence."
//! temperature = 0.2
//! max_turns = 8
//!
//! [reasoning]
//! effort = "low"
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use typed_builder::TypedBuilder;

use crate::request::{ReasoningConfig, ResponsesTool, ToolChoice};

/// Default base URL for the Responses API.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    /// The configuration file is not valid TOML for this schema.
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    /// A value is out of range or missing.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// What the SSE decoder does with a payload it cannot decode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecodePolicy {
    /// Log the payload and continue with the next line.
    #[default]
    Skip,
    /// End the event sequence with a decode error.
    Fail,
}

/// Connection settings for a Responses API client.
///
/// # Examples
///
/// ```
/// use colloquy_common::Config;
///
/// let config = Config::new()
///     .with_api_key("sk-...")
///     .with_base_url("http://localhost:8080/v1")
///     .with_timeout(30);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL, without a trailing `/responses`.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// API key sent as a bearer token. Never serialized.
    #[serde(skip_serializing, default)]
    pub api_key: Option<SecretString>,
    /// Optional organization identifier.
    #[serde(default)]
    pub organization: Option<String>,
    /// Optional project identifier.
    #[serde(default)]
    pub project: Option<String>,
    /// Request timeout in seconds. Applies to non-streaming calls only.
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
    /// How undecodable stream payloads are handled.
    #[serde(default)]
    pub decode_policy: DecodePolicy,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            organization: None,
            project: None,
            timeout_seconds: None,
            decode_policy: DecodePolicy::default(),
        }
    }
}

impl Config {
    /// Creates a configuration pointing at the default endpoint, with no key.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads `OPENAI_API_KEY`, `OPENAI_BASE_URL`, `OPENAI_ORG_ID` and
    /// `OPENAI_PROJECT_ID` from the environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds a configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let present = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let mut config = Self::default();
        if let Some(key) = present("OPENAI_API_KEY") {
            config = config.with_api_key(key);
        }
        if let Some(base_url) = present("OPENAI_BASE_URL") {
            config = config.with_base_url(base_url);
        }
        config.organization = present("OPENAI_ORG_ID");
        config.project = present("OPENAI_PROJECT_ID");
        config
    }

    /// Sets a custom base URL. A trailing `/` is dropped.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Sets the API key.
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(SecretString::new(api_key.into().into()));
        self
    }

    /// Sets the organization identifier.
    #[must_use]
    pub fn with_organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = Some(organization.into());
        self
    }

    /// Sets the project identifier.
    #[must_use]
    pub fn with_project(mut self, project: impl Into<String>) -> Self {
        self.project = Some(project.into());
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = Some(timeout_seconds);
        self
    }

    /// Sets the stream decode policy.
    #[must_use]
    pub const fn with_decode_policy(mut self, decode_policy: DecodePolicy) -> Self {
        self.decode_policy = decode_policy;
        self
    }
}

/// Generation settings applied to every request of a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TypedBuilder)]
pub struct ConversationConfig {
    /// Model identifier.
    #[builder(setter(into))]
    pub model: String,
    /// Instructions (system prompt) sent with every turn.
    #[builder(default, setter(strip_option, into))]
    #[serde(default)]
    pub instructions: Option<String>,
    /// Hosted tools. Registered local functions are added per request.
    #[builder(default)]
    #[serde(default)]
    pub tools: Vec<ResponsesTool>,
    /// Tool selection strategy.
    #[builder(default)]
    #[serde(default)]
    pub tool_choice: Option<ToolChoice>,
    /// Sampling temperature (0.0-2.0).
    #[builder(default)]
    #[serde(default)]
    pub temperature: Option<f32>,
    /// Nucleus sampling threshold (0.0-1.0).
    #[builder(default)]
    #[serde(default)]
    pub top_p: Option<f32>,
    /// Maximum output tokens per response.
    #[builder(default)]
    #[serde(default)]
    pub max_output_tokens: Option<u32>,
    /// Whether the model may call tools in parallel.
    #[builder(default)]
    #[serde(default)]
    pub parallel_tool_calls: Option<bool>,
    /// Whether responses are stored server-side.
    #[builder(default)]
    #[serde(default)]
    pub store: Option<bool>,
    /// Reasoning configuration.
    #[builder(default)]
    #[serde(default)]
    pub reasoning: Option<ReasoningConfig>,
    /// Truncation strategy.
    #[builder(default)]
    #[serde(default)]
    pub truncation: Option<String>,
    /// Metadata attached to every request.
    #[builder(default)]
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    /// Extra output to include.
    #[builder(default)]
    #[serde(default)]
    pub include: Vec<String>,
    /// End-user identifier.
    #[builder(default)]
    #[serde(default)]
    pub user: Option<String>,
    /// Upper bound on requests per `send`, counting tool follow-ups.
    #[builder(default)]
    #[serde(default)]
    pub max_turns: Option<usize>,
}

impl ConversationConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the document does not parse or fails validation.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or is invalid.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` describing the first offending value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.model.trim().is_empty() {
            return Err(ConfigError::Invalid("model must not be empty".to_string()));
        }
        if let Some(temperature) = self.temperature
            && !(0.0..=2.0).contains(&temperature)
        {
            return Err(ConfigError::Invalid(format!(
                "temperature {temperature} is outside 0.0..=2.0"
            )));
        }
        if let Some(top_p) = self.top_p
            && !(0.0..=1.0).contains(&top_p)
        {
            return Err(ConfigError::Invalid(format!(
                "top_p {top_p} is outside 0.0..=1.0"
            )));
        }
        if self.max_turns == Some(0) {
            return Err(ConfigError::Invalid(
                "max_turns must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::io::Write as _;

    use secrecy::ExposeSecret;

    use super::*;
    use crate::request::ReasoningEffort;

    #[test]
    fn test_config_defaults() {
        let config = Config::new();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert!(config.api_key.is_none());
        assert_eq!(config.decode_policy, DecodePolicy::Skip);
    }

    #[test]
    fn test_config_builder() {
        let config = Config::new()
            .with_api_key("sk-test")
            .with_base_url("http://localhost:8080/v1/")
            .with_organization("org")
            .with_project("proj")
            .with_timeout(5)
            .with_decode_policy(DecodePolicy::Fail);

        assert_eq!(config.api_key.unwrap().expose_secret(), "sk-test");
        assert_eq!(config.base_url, "http://localhost:8080/v1");
        assert_eq!(config.organization.as_deref(), Some("org"));
        assert_eq!(config.project.as_deref(), Some("proj"));
        assert_eq!(config.timeout_seconds, Some(5));
        assert_eq!(config.decode_policy, DecodePolicy::Fail);
    }

    #[test]
    fn test_config_from_lookup() {
        let vars = HashMap::from([
            ("OPENAI_API_KEY", "sk-env"),
            ("OPENAI_BASE_URL", "https://proxy.example.com/v1"),
            ("OPENAI_ORG_ID", ""),
        ]);
        let config = Config::from_lookup(|name| vars.get(name).map(ToString::to_string));

        assert_eq!(config.api_key.unwrap().expose_secret(), "sk-env");
        assert_eq!(config.base_url, "https://proxy.example.com/v1");
        assert!(config.organization.is_none());
        assert!(config.project.is_none());
    }

    #[test]
    fn test_api_key_is_not_serialized() {
        let config = Config::new().with_api_key("sk-secret");
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("sk-secret"));
    }

    #[test]
    fn test_conversation_config_from_toml() {
        let config = ConversationConfig::from_toml_str(
            r#"
            model = "gpt-4o"
            instructions = "Be brief."
            temperature = 0.2
            max_turns = 4
            include = ["reasoning.encrypted_content"]

            [reasoning]
            effort = "low"

            [[tools]]
            type = "web_search_preview"
            "#,
        )
        .unwrap();

        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.instructions.as_deref(), Some("Be brief."));
        assert_eq!(config.max_turns, Some(4));
        assert_eq!(
            config.reasoning.unwrap().effort,
            Some(ReasoningEffort::Low)
        );
        assert_eq!(config.tools.len(), 1);
    }

    #[test]
    fn test_conversation_config_from_file() {
        let path = std::env::temp_dir().join(format!(
            "colloquy-config-{}.toml",
            std::process::id()
        ));
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "model = \"gpt-4o-mini\"").unwrap();
        drop(file);

        let config = ConversationConfig::from_file(&path).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(config.model, "gpt-4o-mini");
        assert!(config.tools.is_empty());
    }

    #[test]
    fn test_conversation_config_validation() {
        let err = ConversationConfig::from_toml_str("model = \"gpt-4o\"\ntemperature = 3.5")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = ConversationConfig::from_toml_str("model = \"\"").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = ConversationConfig::from_toml_str("model = \"gpt-4o\"\nmax_turns = 0")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = ConversationConfig::from_toml_str("model = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_conversation_config_builder() {
        let config = ConversationConfig::builder()
            .model("gpt-4o")
            .instructions("Be brief.")
            .max_turns(Some(3))
            .build();

        assert!(config.validate().is_ok());
        assert!(config.tools.is_empty());
    }
}
