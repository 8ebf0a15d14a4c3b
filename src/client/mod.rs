//! Provider clients: one implementation per backend, all polymorphic over a
//! single capability (produce text for a prompt, bounded by a token budget).
//!
//! Clients normalize vendor request/response/error shapes; callers never see
//! provider-specific wrapping or error types.

pub mod anthropic;
pub mod gemini;
pub mod local;
pub mod openai;

use std::time::Duration;

use reqwest::StatusCode;

use crate::{
   config::{GlobalConfig, Provider},
   error::{DocGenError, Result},
   resolve::EffectiveConfig,
};

/// Capability contract shared by every backend.
pub trait ProviderClient {
   /// Produce plain text for a prompt, bounded by `max_tokens`. The returned
   /// text is already vendor-agnostic: fences and wrapping artifacts are
   /// stripped here, not by callers.
   fn generate(&self, prompt: &str, max_tokens: u32) -> Result<String>;

   /// Which backend this client talks to.
   fn provider(&self) -> Provider;
}

/// HTTP timeout settings for hosted providers. Local inference carries no
/// wall-clock bound.
#[derive(Debug, Clone, Copy)]
pub struct HttpSettings {
   pub request_timeout_secs: u64,
   pub connect_timeout_secs: u64,
}

impl Default for HttpSettings {
   fn default() -> Self {
      Self { request_timeout_secs: 120, connect_timeout_secs: 30 }
   }
}

impl From<&GlobalConfig> for HttpSettings {
   fn from(global: &GlobalConfig) -> Self {
      Self {
         request_timeout_secs: global.request_timeout_secs,
         connect_timeout_secs: global.connect_timeout_secs,
      }
   }
}

/// Instantiate the client for the resolved backend.
///
/// `Provider` is a closed enumeration, so the "unrecognized provider" failure
/// mode of looser designs cannot be represented here; the match is exhaustive
/// by construction.
pub fn create(config: &EffectiveConfig, http: &HttpSettings) -> Result<Box<dyn ProviderClient>> {
   Ok(match config.provider {
      Provider::Anthropic => Box::new(anthropic::AnthropicClient::new(config, http)?),
      Provider::OpenAi => Box::new(openai::OpenAiClient::new(config, http)?),
      Provider::Gemini => Box::new(gemini::GeminiClient::new(config, http)?),
      Provider::Local => Box::new(local::LocalClient::new(config)),
   })
}

/// Build a blocking HTTP client with timeouts for hosted calls.
pub(crate) fn build_http_client(http: &HttpSettings) -> reqwest::blocking::Client {
   reqwest::blocking::Client::builder()
      .timeout(Duration::from_secs(http.request_timeout_secs))
      .connect_timeout(Duration::from_secs(http.connect_timeout_secs))
      .build()
      .expect("Failed to build HTTP client")
}

/// Credential for a hosted client; absence is an invariant violation the
/// resolver should have caught.
pub(crate) fn require_credential(config: &EffectiveConfig) -> Result<String> {
   config.credential.clone().ok_or_else(|| {
      DocGenError::Configuration(format!(
         "Provider '{}' reached the client factory without a credential",
         config.provider
      ))
   })
}

/// Map a transport-level reqwest failure into the normalized taxonomy.
pub(crate) fn map_transport_error(provider: Provider, err: &reqwest::Error) -> DocGenError {
   if err.is_decode() {
      return DocGenError::Generation {
         provider: provider.as_str().to_string(),
         reason:   format!("undecodable response: {err}"),
      };
   }
   let reason = if err.is_timeout() {
      "request timed out".to_string()
   } else if err.is_connect() {
      "connection failed".to_string()
   } else {
      err.to_string()
   };
   DocGenError::ProviderUnavailable { provider: provider.as_str().to_string(), reason }
}

/// Classify a non-success HTTP status into the normalized taxonomy.
pub(crate) fn classify_http_failure(
   provider: Provider,
   model: &str,
   status: StatusCode,
   body: &str,
) -> DocGenError {
   let provider_name = provider.as_str().to_string();
   let summary: String = body.trim().chars().take(200).collect();
   let lowered = summary.to_lowercase();

   match status.as_u16() {
      401 | 403 => DocGenError::Authentication { provider: provider_name, reason: summary },
      404 => DocGenError::ModelNotFound { model: model.to_string() },
      408 | 429 => DocGenError::ProviderUnavailable {
         provider: provider_name,
         reason:   format!("HTTP {status}: {summary}"),
      },
      code if code >= 500 => DocGenError::ProviderUnavailable {
         provider: provider_name,
         reason:   format!("HTTP {status}: {summary}"),
      },
      // Gemini reports an invalid key as 400 INVALID_ARGUMENT
      400 if lowered.contains("api key") || lowered.contains("api_key") => {
         DocGenError::Authentication { provider: provider_name, reason: summary }
      },
      _ if lowered.contains("model_not_found") || lowered.contains("model not found") => {
         DocGenError::ModelNotFound { model: model.to_string() }
      },
      _ => DocGenError::Generation {
         provider: provider_name,
         reason:   format!("HTTP {status}: {summary}"),
      },
   }
}

/// Strip vendor formatting artifacts from a completion: an outer markdown
/// code fence, wrapping quotes, surrounding whitespace.
pub(crate) fn strip_artifacts(raw: &str) -> String {
   let mut text = raw.trim();

   if let Some(inner) = strip_outer_fence(text) {
      text = inner;
   }

   // A completion quoted in full is an artifact; interior quotes are content
   if text.len() >= 2
      && (text.starts_with('"') && text.ends_with('"')
         || text.starts_with('`') && text.ends_with('`'))
      && !text[1..text.len() - 1].contains(&text[..1])
   {
      text = &text[1..text.len() - 1];
   }

   text.trim().to_string()
}

/// If the whole completion is wrapped in one triple-backtick fence (with an
/// optional language tag), return the fenced body.
fn strip_outer_fence(text: &str) -> Option<&str> {
   let rest = text.strip_prefix("```")?;
   let body_start = rest.find('\n')? + 1;
   let body = &rest[body_start..];
   let inner = body.strip_suffix("```").or_else(|| body.strip_suffix("```\n"))?;
   // Only strip when this is a single outer fence, not fenced blocks inside
   if inner.contains("```") {
      return None;
   }
   Some(inner.trim_end())
}
