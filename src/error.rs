use thiserror::Error;

/// Normalized error taxonomy for all generation backends.
///
/// Provider clients map vendor-specific failures into these variants; no
/// provider-specific error type crosses the library boundary.
#[derive(Debug, Error)]
pub enum DocGenError {
   #[error("Configuration error: {0}")]
   Configuration(String),

   #[error("Validation failed: {0}")]
   Validation(String),

   #[error("Authentication failed for {provider}: {reason}")]
   Authentication { provider: String, reason: String },

   #[error("Provider {provider} unavailable: {reason}")]
   ProviderUnavailable { provider: String, reason: String },

   #[error("Generation failed on {provider}: {reason}")]
   Generation { provider: String, reason: String },

   #[error("Model not found: {model}")]
   ModelNotFound { model: String },

   #[error("Git command failed: {0}")]
   Git(String),

   #[error("IO error: {0}")]
   Io(#[from] std::io::Error),

   #[error("JSON error: {0}")]
   Json(#[from] serde_json::Error),
}

impl DocGenError {
   /// Whether a single local-model fallback attempt may be made for this
   /// error. Only transient provider failures and malformed completions
   /// qualify; auth rejections and unknown models would fail again.
   pub const fn is_recoverable(&self) -> bool {
      matches!(self, Self::ProviderUnavailable { .. } | Self::Generation { .. })
   }
}

pub type Result<T> = std::result::Result<T, DocGenError>;

#[cfg(test)]
mod tests {
   use super::*;

   #[test]
   fn test_recoverable_classification() {
      let unavailable = DocGenError::ProviderUnavailable {
         provider: "anthropic".to_string(),
         reason:   "timeout".to_string(),
      };
      let generation = DocGenError::Generation {
         provider: "openai".to_string(),
         reason:   "empty completion".to_string(),
      };
      assert!(unavailable.is_recoverable());
      assert!(generation.is_recoverable());
   }

   #[test]
   fn test_non_recoverable_classification() {
      let auth = DocGenError::Authentication {
         provider: "gemini".to_string(),
         reason:   "key rejected".to_string(),
      };
      let missing = DocGenError::ModelNotFound { model: "no-such-model".to_string() };
      let config = DocGenError::Configuration("no api key".to_string());
      let validation = DocGenError::Validation("empty diff".to_string());
      assert!(!auth.is_recoverable());
      assert!(!missing.is_recoverable());
      assert!(!config.is_recoverable());
      assert!(!validation.is_recoverable());
   }
}
