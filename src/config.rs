use std::{
   fmt,
   path::{Path, PathBuf},
};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::{DocGenError, Result};

/// Closed set of generation backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
   /// Anthropic messages API
   Anthropic,
   /// OpenAI chat completions API
   #[value(name = "openai")]
   #[serde(rename = "openai")]
   OpenAi,
   /// Google Gemini generateContent API
   Gemini,
   /// Locally-served model (Ollama-compatible runtime)
   Local,
}

impl Provider {
   pub const fn as_str(self) -> &'static str {
      match self {
         Self::Anthropic => "anthropic",
         Self::OpenAi => "openai",
         Self::Gemini => "gemini",
         Self::Local => "local",
      }
   }

   pub const fn is_local(self) -> bool {
      matches!(self, Self::Local)
   }

   /// Default model identifier when none is configured for this provider.
   pub const fn default_model(self) -> &'static str {
      match self {
         Self::Anthropic => "claude-haiku-4-5",
         Self::OpenAi => "gpt-4o",
         Self::Gemini => "gemini-2.5-flash",
         Self::Local => crate::catalog::DEFAULT_LOCAL_MODEL,
      }
   }
}

impl fmt::Display for Provider {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      f.write_str(self.as_str())
   }
}

/// The two generation tasks the tool performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
   /// Long-form documentation from a diff
   Documentation,
   /// Single-line commit message from a diff
   CommitMessage,
}

impl TaskKind {
   pub const fn as_str(self) -> &'static str {
      match self {
         Self::Documentation => "documentation",
         Self::CommitMessage => "commit_message",
      }
   }
}

/// Configuration block for one hosted API provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HostedProviderConfig {
   /// API credential (overridden by the provider's env var, e.g.
   /// `ANTHROPIC_API_KEY`)
   pub api_key: Option<String>,

   /// Custom endpoint, for OpenAI-compatible proxies; vendor default if unset
   pub base_url: Option<String>,

   pub max_tokens:  u32,
   pub temperature: f32,
}

impl Default for HostedProviderConfig {
   fn default() -> Self {
      Self {
         api_key:     None,
         base_url:    None,
         max_tokens:  1024,
         temperature: 0.3,
      }
   }
}

/// Configuration block for the local runtime backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalProviderConfig {
   /// Model identifier from the local catalog; catalog default if unset
   pub model: Option<String>,

   /// Base URL of the local inference runtime
   pub base_url: String,

   pub max_tokens:  u32,
   pub temperature: f32,
}

impl Default for LocalProviderConfig {
   fn default() -> Self {
      Self {
         model:       None,
         base_url:    "http://localhost:11434".to_string(),
         max_tokens:  512,
         temperature: 0.3,
      }
   }
}

/// Optional per-task substitution of provider and/or model.
///
/// Absent fields inherit from the global settings field-by-field. Credentials
/// and generation parameters are never overridden here; they always come from
/// the resolved provider's block.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskOverride {
   pub provider: Option<Provider>,
   pub model:    Option<String>,
}

impl TaskOverride {
   pub const fn is_empty(&self) -> bool {
      self.provider.is_none() && self.model.is_none()
   }
}

/// Per-task override table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskOverrides {
   pub documentation:  Option<TaskOverride>,
   pub commit_message: Option<TaskOverride>,
}

impl TaskOverrides {
   pub const fn get(&self, task: TaskKind) -> Option<&TaskOverride> {
      match task {
         TaskKind::Documentation => self.documentation.as_ref(),
         TaskKind::CommitMessage => self.commit_message.as_ref(),
      }
   }
}

/// Settings for where generated documentation lands (hook flow).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentationSettings {
   pub output_dir: String,
}

impl Default for DocumentationSettings {
   fn default() -> Self {
      Self { output_dir: "docs".to_string() }
   }
}

/// Global configuration, persisted as JSON at the git root
/// (`.llm-docs.json`). The generation core only reads it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalConfig {
   /// Default backend for both tasks
   pub provider: Provider,

   /// Default model identifier
   pub model: String,

   pub anthropic: Option<HostedProviderConfig>,
   pub openai:    Option<HostedProviderConfig>,
   pub gemini:    Option<HostedProviderConfig>,
   pub local:     Option<LocalProviderConfig>,

   /// Generate documentation from the post-commit hook
   pub docs_enabled: bool,

   /// Generate commit messages on request
   pub commit_message_enabled: bool,

   /// Retry a recoverable hosted failure once against the local backend
   pub fallback_to_local: bool,

   pub tasks: TaskOverrides,

   pub documentation: DocumentationSettings,

   /// HTTP request timeout for hosted providers, in seconds
   pub request_timeout_secs: u64,

   /// HTTP connection timeout for hosted providers, in seconds
   pub connect_timeout_secs: u64,
}

impl Default for GlobalConfig {
   fn default() -> Self {
      Self {
         provider:               Provider::Local,
         model:                  crate::catalog::DEFAULT_LOCAL_MODEL.to_string(),
         anthropic:              None,
         openai:                 None,
         gemini:                 None,
         local:                  Some(LocalProviderConfig::default()),
         docs_enabled:           true,
         commit_message_enabled: true,
         fallback_to_local:      false,
         tasks:                  TaskOverrides::default(),
         documentation:          DocumentationSettings::default(),
         request_timeout_secs:   120,
         connect_timeout_secs:   30,
      }
   }
}

/// Config file name, looked up at the git root.
pub const CONFIG_FILE_NAME: &str = ".llm-docs.json";

impl GlobalConfig {
   /// Load config from the default location. Falls back to defaults when no
   /// file exists. Environment variables override file values:
   /// - `LLM_DOCS_CONFIG` overrides the config file path
   /// - `ANTHROPIC_API_KEY` / `OPENAI_API_KEY` / `GEMINI_API_KEY` override
   ///   the corresponding credentials
   pub fn load() -> Result<Self> {
      let config_path = if let Ok(custom_path) = std::env::var("LLM_DOCS_CONFIG") {
         Some(PathBuf::from(custom_path))
      } else {
         Self::default_config_path()
      };

      let mut config = match config_path {
         Some(ref path) if path.exists() => Self::from_file(path)?,
         _ => Self::default(),
      };

      config.apply_env_overrides();
      Ok(config)
   }

   /// Load config from a specific file.
   pub fn from_file(path: &Path) -> Result<Self> {
      let contents = std::fs::read_to_string(path).map_err(|e| {
         DocGenError::Configuration(format!("Failed to read config {}: {e}", path.display()))
      })?;
      let mut config: Self = serde_json::from_str(&contents).map_err(|e| {
         DocGenError::Configuration(format!("Failed to parse config {}: {e}", path.display()))
      })?;
      config.apply_env_overrides();
      Ok(config)
   }

   /// Persist config as pretty-printed JSON.
   pub fn save_to_file(&self, path: &Path) -> Result<()> {
      let json = serde_json::to_string_pretty(self)?;
      std::fs::write(path, json)?;
      Ok(())
   }

   /// Default config path: `.llm-docs.json` at the git root, falling back to
   /// the current directory when not inside a repository.
   pub fn default_config_path() -> Option<PathBuf> {
      crate::git::get_git_root(".")
         .map_or_else(|_| Some(PathBuf::from(CONFIG_FILE_NAME)), |root| {
            Some(root.join(CONFIG_FILE_NAME))
         })
   }

   fn apply_env_overrides(&mut self) {
      if let Ok(key) = std::env::var("ANTHROPIC_API_KEY") {
         self.anthropic.get_or_insert_with(Default::default).api_key = Some(key);
      }
      if let Ok(key) = std::env::var("OPENAI_API_KEY") {
         self.openai.get_or_insert_with(Default::default).api_key = Some(key);
      }
      if let Ok(key) = std::env::var("GEMINI_API_KEY") {
         self.gemini.get_or_insert_with(Default::default).api_key = Some(key);
      }
   }

   /// Hosted provider block for the given provider, if configured.
   pub const fn hosted_block(&self, provider: Provider) -> Option<&HostedProviderConfig> {
      match provider {
         Provider::Anthropic => self.anthropic.as_ref(),
         Provider::OpenAi => self.openai.as_ref(),
         Provider::Gemini => self.gemini.as_ref(),
         Provider::Local => None,
      }
   }

   /// Set a configuration value by dotted key with typed conversion.
   ///
   /// Unknown keys and unconvertible values are errors; a wrong-typed string
   /// is never silently kept.
   pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
      match key {
         "provider" => {
            self.provider = parse_provider(value)?;
         },
         "model" => {
            self.model = value.to_string();
         },
         "docs_enabled" => self.docs_enabled = parse_bool(key, value)?,
         "commit_message_enabled" => self.commit_message_enabled = parse_bool(key, value)?,
         "fallback_to_local" => self.fallback_to_local = parse_bool(key, value)?,
         "request_timeout_secs" => self.request_timeout_secs = parse_u64(key, value)?,
         "connect_timeout_secs" => self.connect_timeout_secs = parse_u64(key, value)?,
         "documentation.output_dir" => {
            self.documentation.output_dir = value.to_string();
         },
         _ => {
            if let Some((block_name, field)) = key.split_once('.') {
               return self.set_block_value(block_name, field, value);
            }
            return Err(DocGenError::Configuration(format!("Unknown configuration key '{key}'")));
         },
      }
      Ok(())
   }

   fn set_block_value(&mut self, block_name: &str, field: &str, value: &str) -> Result<()> {
      let key = format!("{block_name}.{field}");

      if block_name == "local" {
         let block = self.local.get_or_insert_with(Default::default);
         match field {
            "model" => block.model = Some(value.to_string()),
            "base_url" => block.base_url = value.to_string(),
            "max_tokens" => block.max_tokens = parse_u32(&key, value)?,
            "temperature" => block.temperature = parse_f32(&key, value)?,
            _ => {
               return Err(DocGenError::Configuration(format!(
                  "Unknown configuration key '{key}'"
               )));
            },
         }
         return Ok(());
      }

      let block = match block_name {
         "anthropic" => self.anthropic.get_or_insert_with(Default::default),
         "openai" => self.openai.get_or_insert_with(Default::default),
         "gemini" => self.gemini.get_or_insert_with(Default::default),
         _ => {
            return Err(DocGenError::Configuration(format!("Unknown configuration key '{key}'")));
         },
      };
      match field {
         "api_key" => block.api_key = Some(value.to_string()),
         "base_url" => block.base_url = Some(value.to_string()),
         "max_tokens" => block.max_tokens = parse_u32(&key, value)?,
         "temperature" => block.temperature = parse_f32(&key, value)?,
         _ => {
            return Err(DocGenError::Configuration(format!("Unknown configuration key '{key}'")));
         },
      }
      Ok(())
   }

   /// Read a configuration value by dotted key, rendered as JSON.
   pub fn get_value(&self, key: &str) -> Result<serde_json::Value> {
      let root = serde_json::to_value(self)?;
      let mut current = &root;
      for part in key.split('.') {
         current = current.get(part).ok_or_else(|| {
            DocGenError::Configuration(format!("Configuration key '{key}' not found"))
         })?;
      }
      Ok(current.clone())
   }
}

fn parse_provider(value: &str) -> Result<Provider> {
   match value.to_lowercase().as_str() {
      "anthropic" => Ok(Provider::Anthropic),
      "openai" => Ok(Provider::OpenAi),
      "gemini" => Ok(Provider::Gemini),
      "local" => Ok(Provider::Local),
      other => Err(DocGenError::Configuration(format!(
         "Invalid provider '{other}'. Must be one of: anthropic, openai, gemini, local"
      ))),
   }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
   match value.to_lowercase().as_str() {
      "true" | "1" | "yes" => Ok(true),
      "false" | "0" | "no" => Ok(false),
      other => {
         Err(DocGenError::Configuration(format!("'{key}' expects a boolean, got '{other}'")))
      },
   }
}

fn parse_u64(key: &str, value: &str) -> Result<u64> {
   value
      .parse()
      .map_err(|_| DocGenError::Configuration(format!("'{key}' expects an integer, got '{value}'")))
}

fn parse_u32(key: &str, value: &str) -> Result<u32> {
   value
      .parse()
      .map_err(|_| DocGenError::Configuration(format!("'{key}' expects an integer, got '{value}'")))
}

fn parse_f32(key: &str, value: &str) -> Result<f32> {
   value
      .parse()
      .map_err(|_| DocGenError::Configuration(format!("'{key}' expects a number, got '{value}'")))
}

#[cfg(test)]
mod tests {
   use super::*;

   #[test]
   fn test_default_config() {
      let config = GlobalConfig::default();
      assert_eq!(config.provider, Provider::Local);
      assert_eq!(config.model, crate::catalog::DEFAULT_LOCAL_MODEL);
      assert!(config.docs_enabled);
      assert!(!config.fallback_to_local);
      assert!(config.local.is_some());
      assert!(config.anthropic.is_none());
   }

   #[test]
   fn test_provider_serde_names() {
      assert_eq!(serde_json::to_string(&Provider::OpenAi).unwrap(), "\"openai\"");
      assert_eq!(serde_json::to_string(&Provider::Anthropic).unwrap(), "\"anthropic\"");
      let p: Provider = serde_json::from_str("\"gemini\"").unwrap();
      assert_eq!(p, Provider::Gemini);
   }

   #[test]
   fn test_config_roundtrip() {
      let dir = tempfile::tempdir().unwrap();
      let path = dir.path().join(CONFIG_FILE_NAME);

      let mut config = GlobalConfig::default();
      config.provider = Provider::Anthropic;
      config.model = "claude-haiku-4-5".to_string();
      config.anthropic = Some(HostedProviderConfig {
         api_key: Some("sk-test".to_string()),
         ..Default::default()
      });
      config.fallback_to_local = true;
      config.tasks.commit_message = Some(TaskOverride {
         provider: None,
         model:    Some("claude-sonnet-4.5".to_string()),
      });

      config.save_to_file(&path).unwrap();
      let loaded = GlobalConfig::from_file(&path).unwrap();

      assert_eq!(loaded.provider, Provider::Anthropic);
      assert_eq!(loaded.model, "claude-haiku-4-5");
      assert!(loaded.fallback_to_local);
      let override_ = loaded.tasks.get(TaskKind::CommitMessage).unwrap();
      assert_eq!(override_.model.as_deref(), Some("claude-sonnet-4.5"));
      assert!(override_.provider.is_none());
   }

   #[test]
   fn test_set_value_typed() {
      let mut config = GlobalConfig::default();

      config.set_value("provider", "openai").unwrap();
      assert_eq!(config.provider, Provider::OpenAi);

      config.set_value("fallback_to_local", "true").unwrap();
      assert!(config.fallback_to_local);

      config.set_value("openai.max_tokens", "2048").unwrap();
      assert_eq!(config.openai.as_ref().unwrap().max_tokens, 2048);

      config.set_value("local.temperature", "0.7").unwrap();
      assert_eq!(config.local.as_ref().unwrap().temperature, 0.7);
   }

   #[test]
   fn test_set_value_rejects_wrong_types() {
      let mut config = GlobalConfig::default();

      assert!(config.set_value("fallback_to_local", "maybe").is_err());
      assert!(config.set_value("request_timeout_secs", "soon").is_err());
      assert!(config.set_value("openai.temperature", "warm").is_err());
      assert!(config.set_value("provider", "huggingface").is_err());
      // Wrong-typed values must not be applied
      assert!(!config.fallback_to_local);
      assert_eq!(config.request_timeout_secs, 120);
   }

   #[test]
   fn test_set_value_unknown_key() {
      let mut config = GlobalConfig::default();
      assert!(config.set_value("nonsense", "x").is_err());
      assert!(config.set_value("openai.nonsense", "x").is_err());
      assert!(config.set_value("nonsense.api_key", "x").is_err());
   }

   #[test]
   fn test_get_value_dotted() {
      let config = GlobalConfig::default();
      let value = config.get_value("documentation.output_dir").unwrap();
      assert_eq!(value, serde_json::json!("docs"));
      assert!(config.get_value("documentation.missing").is_err());
   }

   #[test]
   fn test_task_override_is_empty() {
      assert!(TaskOverride::default().is_empty());
      let partial = TaskOverride { provider: Some(Provider::Gemini), model: None };
      assert!(!partial.is_empty());
   }
}
