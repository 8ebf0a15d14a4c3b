//! Token estimation with cascading fallback.
//!
//! Uses tiktoken when the model is known to it, otherwise a 4-chars-per-token
//! estimate. Good enough for diff truncation and output budgets; exact
//! counts are a provider concern.

use tiktoken_rs::{CoreBPE, get_bpe_from_model};

/// Rough chars-per-token ratio used when no BPE is available.
pub const CHARS_PER_TOKEN: usize = 4;

/// Character budget equivalent to a token budget.
pub const fn chars_for_tokens(tokens: u32) -> usize {
   tokens as usize * CHARS_PER_TOKEN
}

/// Estimate token count without a model (4 chars ≈ 1 token, rounded up).
pub const fn estimate_tokens(text: &str) -> usize {
   text.len().div_ceil(CHARS_PER_TOKEN)
}

/// Per-model token counter.
pub struct TokenEstimator {
   tiktoken: Option<CoreBPE>,
}

impl TokenEstimator {
   pub fn for_model(model: &str) -> Self {
      Self { tiktoken: get_bpe_from_model(model).ok() }
   }

   /// Count tokens via BPE when available, character estimate otherwise.
   pub fn count(&self, text: &str) -> usize {
      self.tiktoken.as_ref().map_or_else(
         || estimate_tokens(text),
         |encoder| encoder.encode_with_special_tokens(text).len(),
      )
   }
}

#[cfg(test)]
mod tests {
   use super::*;

   #[test]
   fn test_estimate_rounds_up() {
      assert_eq!(estimate_tokens(""), 0);
      assert_eq!(estimate_tokens("abc"), 1);
      assert_eq!(estimate_tokens("abcd"), 1);
      assert_eq!(estimate_tokens("abcde"), 2);
   }

   #[test]
   fn test_chars_for_tokens() {
      assert_eq!(chars_for_tokens(0), 0);
      assert_eq!(chars_for_tokens(72), 288);
   }

   #[test]
   fn test_unknown_model_uses_estimate() {
      let estimator = TokenEstimator::for_model("qwen2.5-coder:1.5b");
      assert_eq!(estimator.count("abcdefgh"), 2);
   }
}
