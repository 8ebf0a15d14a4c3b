//! Public generation surface: resolution + dispatch behind one handle.
//!
//! The handle owns exactly one effective configuration. Input validation
//! runs before any provider client is constructed, so an empty diff never
//! costs an outbound call.

use crate::{
   catalog::{self, ModelCatalogEntry},
   client::{self, local},
   config::{GlobalConfig, LocalProviderConfig, TaskKind},
   device::{self, DeviceDescriptor},
   error::Result,
   fallback::{self, GenerationResult},
   prompt,
   resolve::{self, EffectiveConfig},
};

/// A configured generation client for one task invocation.
pub struct GenerationHandle {
   global:    GlobalConfig,
   effective: EffectiveConfig,
}

/// Resolve configuration for a task and wrap it in a generation handle.
pub fn create_client(global: &GlobalConfig, task: Option<TaskKind>) -> Result<GenerationHandle> {
   let effective = resolve::resolve(global, task)?;
   Ok(GenerationHandle { global: global.clone(), effective })
}

impl GenerationHandle {
   pub const fn effective_config(&self) -> &EffectiveConfig {
      &self.effective
   }

   /// Generate multi-paragraph documentation for a diff.
   pub fn generate_documentation(&self, diff: &str) -> Result<String> {
      Ok(self.generate_documentation_result(diff)?.text)
   }

   /// Documentation generation, exposing which path produced the text.
   pub fn generate_documentation_result(&self, diff: &str) -> Result<GenerationResult> {
      let prompt_text = prompt::build_documentation_prompt(diff)?;
      let result = fallback::generate_with_fallback(
         &self.global,
         &self.effective,
         &prompt_text,
         self.effective.max_tokens,
      )?;
      Ok(GenerationResult {
         text: prompt::post_process_documentation(&result.text),
         path: result.path,
      })
   }

   /// Generate a single-line commit message for a diff.
   pub fn generate_short_message(&self, diff: &str) -> Result<String> {
      Ok(self.generate_short_message_result(diff)?.text)
   }

   /// Message generation, exposing which path produced the text.
   pub fn generate_short_message_result(&self, diff: &str) -> Result<GenerationResult> {
      let prompt_text = prompt::build_message_prompt(diff)?;
      let result = fallback::generate_with_fallback(
         &self.global,
         &self.effective,
         &prompt_text,
         self.effective.max_tokens,
      )?;
      let budget = prompt::message_char_budget(self.effective.max_tokens);
      Ok(GenerationResult {
         text: prompt::post_process_message(&result.text, budget),
         path: result.path,
      })
   }

   /// Tiny direct generation against the resolved provider, used by
   /// `validate` to test the connection. No fallback.
   pub fn probe_generation(&self) -> Result<String> {
      let http = client::HttpSettings::from(&self.global);
      let provider_client = client::create(&self.effective, &http)?;
      provider_client.generate("Reply with a short greeting.", 32)
   }
}

/// Catalog models usable on this machine: filtered by the device descriptor,
/// empty when no local runtime answers.
pub fn list_available_local_models(
   local: &LocalProviderConfig,
) -> Vec<&'static ModelCatalogEntry> {
   if !local::runtime_available(&local.base_url) {
      return Vec::new();
   }
   catalog::available_models(device::probe())
}

/// Structured report of local hardware capability.
pub fn get_device_descriptor() -> DeviceDescriptor {
   device::probe().clone()
}

#[cfg(test)]
mod tests {
   use super::*;
   use crate::{
      config::{HostedProviderConfig, Provider},
      error::DocGenError,
   };

   fn hosted_global() -> GlobalConfig {
      let mut global = GlobalConfig::default();
      global.provider = Provider::Anthropic;
      global.model = "claude-haiku-4-5".to_string();
      global.anthropic = Some(HostedProviderConfig {
         api_key: Some("sk-ant-test".to_string()),
         ..Default::default()
      });
      global
   }

   #[test]
   fn test_create_client_resolves_effective_config() {
      let handle = create_client(&hosted_global(), Some(TaskKind::Documentation)).unwrap();
      assert_eq!(handle.effective_config().provider, Provider::Anthropic);
      assert_eq!(handle.effective_config().model, "claude-haiku-4-5");
   }

   #[test]
   fn test_create_client_rejects_unconfigured_provider() {
      let mut global = hosted_global();
      global.provider = Provider::Gemini;
      let result = create_client(&global, None);
      assert!(matches!(result, Err(DocGenError::Configuration(_))));
   }

   #[test]
   fn test_empty_diff_fails_before_any_call() {
      // The handle resolves to a hosted provider with a bogus key; an empty
      // diff must fail validation without any provider traffic (an attempted
      // call would surface as Authentication or ProviderUnavailable).
      let handle = create_client(&hosted_global(), None).unwrap();

      let docs = handle.generate_documentation("");
      assert!(matches!(docs, Err(DocGenError::Validation(_))));

      let message = handle.generate_short_message("   \n ");
      assert!(matches!(message, Err(DocGenError::Validation(_))));
   }

   #[test]
   fn test_device_descriptor_is_stable() {
      assert_eq!(get_device_descriptor(), get_device_descriptor());
   }

   #[test]
   fn test_list_models_without_runtime_is_empty() {
      // Nothing listens on port 9; the probe must fail fast and cleanly
      let local = LocalProviderConfig {
         base_url: "http://127.0.0.1:9".to_string(),
         ..Default::default()
      };
      assert!(list_available_local_models(&local).is_empty());
   }
}
