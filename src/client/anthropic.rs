//! Anthropic messages API client.

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

pub struct AnthropicClient {
   client:      reqwest::blocking::Client,
   api_key:     String,
   base_url:    String,
   model:       String,
   temperature: f32,
}

#[derive(Debug, Serialize)]
struct ApiRequest {
   model:       String,
   max_tokens:  u32,
   temperature: f32,
   messages:    Vec<Message>,
}

#[derive(Debug, Serialize)]
struct Message {
   role:    String,
   content: String,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
   #[serde(default)]
   content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
   #[serde(rename = "type")]
   block_type: String,
   #[serde(default)]
   text:       String,
}

impl AnthropicClient {
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

/// Concatenate the text blocks of a messages-API response.
fn extract_text(response: &ApiResponse) -> String {
   response
      .content
      .iter()
      .filter(|block| block.block_type == "text")
      .map(|block| block.text.as_str())
      .collect()
}

impl ProviderClient for AnthropicClient {
   fn generate(&self, prompt: &str, max_tokens: u32) -> Result<String> {
      let request = ApiRequest {
         model:       self.model.clone(),
         max_tokens,
         temperature: self.temperature,
         messages:    vec![Message { role: "user".to_string(), content: prompt.to_string() }],
      };

      let response = self
         .client
         .post(format!("{}/v1/messages", self.base_url))
         .header("x-api-key", &self.api_key)
         .header("anthropic-version", "2023-06-01")
         .header("content-type", "application/json")
         .json(&request)
         .send()
         .map_err(|e| map_transport_error(Provider::Anthropic, &e))?;

      let status = response.status();
      if !status.is_success() {
         let body = response
            .text()
            .unwrap_or_else(|_| "Unknown error".to_string());
         return Err(classify_http_failure(Provider::Anthropic, &self.model, status, &body));
      }

      let api_response: ApiResponse = response
         .json()
         .map_err(|e| map_transport_error(Provider::Anthropic, &e))?;

      let text = strip_artifacts(&extract_text(&api_response));
      if text.is_empty() {
         return Err(DocGenError::Generation {
            provider: Provider::Anthropic.as_str().to_string(),
            reason:   "empty completion".to_string(),
         });
      }
      Ok(text)
   }

   fn provider(&self) -> Provider {
      Provider::Anthropic
   }
}

#[cfg(test)]
mod tests {
   use super::*;

   #[test]
   fn test_extract_text_joins_text_blocks() {
      let json = r#"{
         "content": [
            {"type": "text", "text": "First paragraph."},
            {"type": "tool_use", "id": "x", "name": "t", "input": {}},
            {"type": "text", "text": " Second paragraph."}
         ]
      }"#;
      let response: ApiResponse = serde_json::from_str(json).unwrap();
      assert_eq!(extract_text(&response), "First paragraph. Second paragraph.");
   }

   #[test]
   fn test_extract_text_empty_content() {
      let response: ApiResponse = serde_json::from_str("{}").unwrap();
      assert_eq!(extract_text(&response), "");
   }
}
