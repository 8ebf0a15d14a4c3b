//! Configuration resolution: global settings + optional per-task override
//! merged into one immutable view for a single generation call.

use crate::{
   catalog,
   client::local,
   config::{GlobalConfig, LocalProviderConfig, Provider, TaskKind},
   error::{DocGenError, Result},
};

/// The fully resolved provider/model/credential/parameter set used for
/// exactly one call. Computed fresh per invocation, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectiveConfig {
   pub provider: Provider,
   pub model:    String,

   /// API credential for hosted providers; `None` for the local backend
   pub credential: Option<String>,

   /// Vendor endpoint, or the local runtime base URL
   pub endpoint: String,

   pub max_tokens:  u32,
   pub temperature: f32,
}

/// Resolve the effective configuration for one call.
///
/// With no task kind (or no override for the task), global defaults apply
/// unconditionally. An override substitutes provider and model
/// field-by-field; a missing field inherits from the global settings, never
/// from the other override field. Credentials and generation parameters
/// always come from the resolved provider's own block.
pub fn resolve(global: &GlobalConfig, task: Option<TaskKind>) -> Result<EffectiveConfig> {
   let (provider, model) = select(global, task);
   let effective = build(global, provider, model)?;

   if effective.provider.is_local() && !local::runtime_available(&effective.endpoint) {
      return Err(DocGenError::Configuration(format!(
         "Local backend selected but no local runtime answered at {}",
         effective.endpoint
      )));
   }

   Ok(effective)
}

/// Effective configuration for the single local-fallback attempt: local
/// backend, the configured (or catalog default) local model, local
/// generation parameters.
pub fn local_fallback(global: &GlobalConfig) -> EffectiveConfig {
   let block = global.local.clone().unwrap_or_default();
   let model = block
      .model
      .clone()
      .unwrap_or_else(|| catalog::DEFAULT_LOCAL_MODEL.to_string());
   effective_for_local(&block, model)
}

/// Field-by-field provider/model selection, before any block validation.
fn select(global: &GlobalConfig, task: Option<TaskKind>) -> (Provider, String) {
   let override_ = task.and_then(|kind| global.tasks.get(kind));
   let provider = override_
      .and_then(|o| o.provider)
      .unwrap_or(global.provider);
   let model = override_
      .and_then(|o| o.model.clone())
      .unwrap_or_else(|| global.model.clone());
   (provider, model)
}

fn build(global: &GlobalConfig, provider: Provider, model: String) -> Result<EffectiveConfig> {
   if provider.is_local() {
      let block = global.local.clone().unwrap_or_default();
      return Ok(effective_for_local(&block, model));
   }

   let block = global.hosted_block(provider).ok_or_else(|| {
      DocGenError::Configuration(format!(
         "Provider '{provider}' selected but no configuration block supplied"
      ))
   })?;

   let credential = block
      .api_key
      .clone()
      .filter(|key| !key.trim().is_empty())
      .ok_or_else(|| {
         DocGenError::Configuration(format!("No API key configured for provider '{provider}'"))
      })?;

   let endpoint = block
      .base_url
      .clone()
      .unwrap_or_else(|| default_endpoint(provider).to_string());

   Ok(EffectiveConfig {
      provider,
      model,
      credential: Some(credential),
      endpoint,
      max_tokens: block.max_tokens,
      temperature: block.temperature,
   })
}

fn effective_for_local(block: &LocalProviderConfig, model: String) -> EffectiveConfig {
   EffectiveConfig {
      provider: Provider::Local,
      model,
      credential: None,
      endpoint: block.base_url.clone(),
      max_tokens: block.max_tokens,
      temperature: block.temperature,
   }
}

/// Vendor default endpoints, used when a block carries no `base_url`.
const fn default_endpoint(provider: Provider) -> &'static str {
   match provider {
      Provider::Anthropic => "https://api.anthropic.com",
      Provider::OpenAi => "https://api.openai.com/v1",
      Provider::Gemini => "https://generativelanguage.googleapis.com/v1beta",
      Provider::Local => "http://localhost:11434",
   }
}
