//! Local model client backed by an Ollama-compatible runtime.
//!
//! A model is a process-lifetime resource: the first generation against an
//! identifier verifies it is installed and issues a warm-up request so the
//! runtime keeps it resident; later calls reuse it. The loaded-model registry
//! is mutex-guarded so a future concurrent caller cannot double-load.

use std::{collections::HashSet, sync::LazyLock, time::Duration};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use super::{ProviderClient, map_transport_error, strip_artifacts};
use crate::{
   config::Provider,
   error::{DocGenError, Result},
   resolve::EffectiveConfig,
};

/// Model identifiers already warmed up in this process.
static LOADED_MODELS: LazyLock<Mutex<HashSet<String>>> = LazyLock::new(|| Mutex::new(HashSet::new()));

/// Whether a local runtime answers at `base_url`. Used by the resolver to
/// reject a local selection early, before any prompt work happens.
pub fn runtime_available(base_url: &str) -> bool {
   let Ok(client) = reqwest::blocking::Client::builder()
      .timeout(Duration::from_secs(2))
      .build()
   else {
      return false;
   };
   client
      .get(format!("{base_url}/api/tags"))
      .send()
      .is_ok_and(|response| response.status().is_success())
}

pub struct LocalClient {
   client:      reqwest::blocking::Client,
   base_url:    String,
   model:       String,
   temperature: f32,
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
   model:   String,
   prompt:  String,
   stream:  bool,
   options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
   num_predict: u32,
   temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
   #[serde(default)]
   response: String,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
   #[serde(default)]
   models: Vec<InstalledModel>,
}

#[derive(Debug, Deserialize)]
struct InstalledModel {
   name: String,
}

impl LocalClient {
   /// Construction is cheap and touches nothing: model loading is deferred
   /// to the first generation.
   pub fn new(config: &EffectiveConfig) -> Self {
      // Local inference has no enforced wall-clock bound; only the connect
      // phase is bounded.
      let client = reqwest::blocking::Client::builder()
         .timeout(None)
         .connect_timeout(Duration::from_secs(5))
         .build()
         .expect("Failed to build HTTP client");

      Self {
         client,
         base_url: config.endpoint.clone(),
         model: config.model.clone(),
         temperature: config.temperature,
      }
   }

   /// Acquire the model as a process-lifetime resource: verify it is
   /// installed, then warm it up. Runs at most once per identifier.
   fn ensure_loaded(&self) -> Result<()> {
      let mut loaded = LOADED_MODELS.lock();
      if loaded.contains(&self.model) {
         return Ok(());
      }

      let response = self
         .client
         .get(format!("{}/api/tags", self.base_url))
         .send()
         .map_err(|e| map_transport_error(Provider::Local, &e))?;
      let tags: TagsResponse = response
         .json()
         .map_err(|e| map_transport_error(Provider::Local, &e))?;

      if !tags.models.iter().any(|m| installed_matches(&m.name, &self.model)) {
         return Err(DocGenError::ModelNotFound { model: self.model.clone() });
      }

      // An empty prompt makes the runtime load the model without generating
      let warm_up = GenerateRequest {
         model:   self.model.clone(),
         prompt:  String::new(),
         stream:  false,
         options: GenerateOptions { num_predict: 1, temperature: 0.0 },
      };
      self
         .client
         .post(format!("{}/api/generate", self.base_url))
         .json(&warm_up)
         .send()
         .map_err(|e| map_transport_error(Provider::Local, &e))?;

      loaded.insert(self.model.clone());
      Ok(())
   }
}

/// An installed `name:tag` satisfies a request for the bare name or the
/// exact tagged identifier.
fn installed_matches(installed: &str, requested: &str) -> bool {
   installed == requested
      || (!requested.contains(':')
         && installed
            .split_once(':')
            .is_some_and(|(name, _)| name == requested))
}

impl ProviderClient for LocalClient {
   fn generate(&self, prompt: &str, max_tokens: u32) -> Result<String> {
      self.ensure_loaded()?;

      let request = GenerateRequest {
         model:   self.model.clone(),
         prompt:  prompt.to_string(),
         stream:  false,
         options: GenerateOptions { num_predict: max_tokens, temperature: self.temperature },
      };

      let response = self
         .client
         .post(format!("{}/api/generate", self.base_url))
         .json(&request)
         .send()
         .map_err(|e| map_transport_error(Provider::Local, &e))?;

      let status = response.status();
      if !status.is_success() {
         let body = response
            .text()
            .unwrap_or_else(|_| "Unknown error".to_string());
         return Err(super::classify_http_failure(Provider::Local, &self.model, status, &body));
      }

      let generate_response: GenerateResponse = response
         .json()
         .map_err(|e| map_transport_error(Provider::Local, &e))?;

      let text = strip_artifacts(&generate_response.response);
      if text.is_empty() {
         return Err(DocGenError::Generation {
            provider: Provider::Local.as_str().to_string(),
            reason:   "empty completion".to_string(),
         });
      }
      Ok(text)
   }

   fn provider(&self) -> Provider {
      Provider::Local
   }
}
