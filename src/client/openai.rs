//! OpenAI chat completions client.

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

pub struct OpenAiClient {
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
   choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
   message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
   #[serde(default)]
   content: Option<String>,
}

impl OpenAiClient {
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

/// First choice's message content, if any.
fn extract_text(response: &ApiResponse) -> Option<&str> {
   response
      .choices
      .first()
      .and_then(|choice| choice.message.content.as_deref())
}

impl ProviderClient for OpenAiClient {
   fn generate(&self, prompt: &str, max_tokens: u32) -> Result<String> {
      let request = ApiRequest {
         model:       self.model.clone(),
         max_tokens,
         temperature: self.temperature,
         messages:    vec![Message { role: "user".to_string(), content: prompt.to_string() }],
      };

      let response = self
         .client
         .post(format!("{}/chat/completions", self.base_url))
         .header("Authorization", format!("Bearer {}", self.api_key))
         .header("content-type", "application/json")
         .json(&request)
         .send()
         .map_err(|e| map_transport_error(Provider::OpenAi, &e))?;

      let status = response.status();
      if !status.is_success() {
         let body = response
            .text()
            .unwrap_or_else(|_| "Unknown error".to_string());
         return Err(classify_http_failure(Provider::OpenAi, &self.model, status, &body));
      }

      let api_response: ApiResponse = response
         .json()
         .map_err(|e| map_transport_error(Provider::OpenAi, &e))?;

      let text = extract_text(&api_response)
         .map(strip_artifacts)
         .unwrap_or_default();
      if text.is_empty() {
         return Err(DocGenError::Generation {
            provider: Provider::OpenAi.as_str().to_string(),
            reason:   "empty completion".to_string(),
         });
      }
      Ok(text)
   }

   fn provider(&self) -> Provider {
      Provider::OpenAi
   }
}

#[cfg(test)]
mod tests {
   use super::*;

   #[test]
   fn test_extract_text_first_choice() {
      let json = r#"{
         "choices": [
            {"message": {"role": "assistant", "content": "Updated the parser."}},
            {"message": {"role": "assistant", "content": "ignored"}}
         ]
      }"#;
      let response: ApiResponse = serde_json::from_str(json).unwrap();
      assert_eq!(extract_text(&response), Some("Updated the parser."));
   }

   #[test]
   fn test_extract_text_missing_content() {
      let json = r#"{"choices": [{"message": {"role": "assistant"}}]}"#;
      let response: ApiResponse = serde_json::from_str(json).unwrap();
      assert_eq!(extract_text(&response), None);

      let response: ApiResponse = serde_json::from_str("{}").unwrap();
      assert_eq!(extract_text(&response), None);
   }
}
