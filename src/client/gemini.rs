//! Google Gemini generateContent client.

use serde::{Deserialize, Serialize};

use super::{
   HttpSettings, ProviderClient, build_http_client, classify_http_failure, map_transport_error,
   require_credential, strip_artifacts,
};
use crate::{
   config::Provider,
   error::{DocGenError, Result},
   resolve::EffectiveConfig,
};

pub struct GeminiClient {
   client:      reqwest::blocking::Client,
   api_key:     String,
   base_url:    String,
   model:       String,
   temperature: f32,
}

#[derive(Debug, Serialize)]
struct ApiRequest {
   contents:          Vec<Content>,
   #[serde(rename = "generationConfig")]
   generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
   #[serde(default)]
   parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
   #[serde(default)]
   text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
   #[serde(rename = "maxOutputTokens")]
   max_output_tokens: u32,
   temperature:       f32,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
   #[serde(default)]
   candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
   content: Option<Content>,
}

impl GeminiClient {
   pub fn new(config: &EffectiveConfig, http: &HttpSettings) -> Result<Self> {
      Ok(Self {
         client:      build_http_client(http),
         api_key:     require_credential(config)?,
         base_url:    config.endpoint.clone(),
         model:       config.model.clone(),
         temperature: config.temperature,
      })
   }
}

/// Concatenate the text parts of the first candidate.
fn extract_text(response: &ApiResponse) -> String {
   response
      .candidates
      .first()
      .and_then(|candidate| candidate.content.as_ref())
      .map(|content| {
         content
            .parts
            .iter()
            .map(|part| part.text.as_str())
            .collect()
      })
      .unwrap_or_default()
}

impl ProviderClient for GeminiClient {
   fn generate(&self, prompt: &str, max_tokens: u32) -> Result<String> {
      let request = ApiRequest {
         contents:          vec![Content {
            parts: vec![Part { text: prompt.to_string() }],
         }],
         generation_config: GenerationConfig {
            max_output_tokens: max_tokens,
            temperature:       self.temperature,
         },
      };

      let response = self
         .client
         .post(format!("{}/models/{}:generateContent", self.base_url, self.model))
         .query(&[("key", self.api_key.as_str())])
         .header("content-type", "application/json")
         .json(&request)
         .send()
         .map_err(|e| map_transport_error(Provider::Gemini, &e))?;

      let status = response.status();
      if !status.is_success() {
         let body = response
            .text()
            .unwrap_or_else(|_| "Unknown error".to_string());
         return Err(classify_http_failure(Provider::Gemini, &self.model, status, &body));
      }

      let api_response: ApiResponse = response
         .json()
         .map_err(|e| map_transport_error(Provider::Gemini, &e))?;

      let text = strip_artifacts(&extract_text(&api_response));
      if text.is_empty() {
         return Err(DocGenError::Generation {
            provider: Provider::Gemini.as_str().to_string(),
            reason:   "empty completion".to_string(),
         });
      }
      Ok(text)
   }

   fn provider(&self) -> Provider {
      Provider::Gemini
   }
}

#[cfg(test)]
mod tests {
   use super::*;

   #[test]
   fn test_extract_text_joins_parts() {
      let json = r#"{
         "candidates": [
            {"content": {"parts": [{"text": "Updated"}, {"text": " the parser."}]}}
         ]
      }"#;
      let response: ApiResponse = serde_json::from_str(json).unwrap();
      assert_eq!(extract_text(&response), "Updated the parser.");
   }

   #[test]
   fn test_extract_text_blocked_candidate() {
      // Safety-blocked candidates come back without content
      let json = r#"{"candidates": [{"finishReason": "SAFETY"}]}"#;
      let response: ApiResponse = serde_json::from_str(json).unwrap();
      assert_eq!(extract_text(&response), "");

      let response: ApiResponse = serde_json::from_str("{}").unwrap();
      assert_eq!(extract_text(&response), "");
   }
}
