//! Task-specific prompt construction and completion post-processing.
//!
//! Both builders reject empty diff content before any provider client is
//! constructed, so a blank invocation never spends a hosted API call.

use std::borrow::Cow;

use crate::{
   error::{DocGenError, Result},
   normalization::{collapse_to_single_line, normalize_unicode},
   templates, tokens,
};

/// Token budget for diff content included in a prompt. Oversized diffs are
/// truncated at a line boundary rather than rejected.
pub const MAX_DIFF_TOKENS: usize = 24000;

const TRUNCATION_MARKER: &str = "\n[... diff truncated ...]";

/// Build the documentation prompt for a diff.
pub fn build_documentation_prompt(diff: &str) -> Result<String> {
   validate_diff(diff)?;
   templates::render_documentation_prompt(&truncate_diff(diff, MAX_DIFF_TOKENS))
}

/// Build the commit message prompt for a diff.
pub fn build_message_prompt(diff: &str) -> Result<String> {
   validate_diff(diff)?;
   templates::render_message_prompt(&truncate_diff(diff, MAX_DIFF_TOKENS))
}

/// Shape a raw completion into the documentation artifact: unicode cleanup
/// and whitespace trimming. Multi-paragraph structure is preserved.
pub fn post_process_documentation(raw: &str) -> String {
   normalize_unicode(raw).trim().to_string()
}

/// Shape a raw completion into a commit message: one line, truncated to the
/// task's character budget at a word boundary.
pub fn post_process_message(raw: &str, max_chars: usize) -> String {
   let single_line = collapse_to_single_line(&normalize_unicode(raw));
   truncate_at_word_boundary(&single_line, max_chars)
}

/// Character budget for a message produced under a token budget.
pub const fn message_char_budget(max_tokens: u32) -> usize {
   tokens::chars_for_tokens(max_tokens)
}

fn validate_diff(diff: &str) -> Result<()> {
   if diff.trim().is_empty() {
      return Err(DocGenError::Validation(
         "diff content is empty; nothing to generate from".to_string(),
      ));
   }
   Ok(())
}

/// Cut an oversized diff at a line boundary under the token budget and mark
/// the elision.
fn truncate_diff(diff: &str, max_tokens: usize) -> Cow<'_, str> {
   if tokens::estimate_tokens(diff) <= max_tokens {
      return Cow::Borrowed(diff);
   }

   let mut budget = max_tokens * tokens::CHARS_PER_TOKEN;
   while !diff.is_char_boundary(budget) {
      budget -= 1;
   }
   let cut = diff[..budget].rfind('\n').unwrap_or(budget);
   let mut truncated = diff[..cut].to_string();
   truncated.push_str(TRUNCATION_MARKER);
   Cow::Owned(truncated)
}

fn truncate_at_word_boundary(text: &str, max_chars: usize) -> String {
   if text.len() <= max_chars {
      return text.to_string();
   }

   let mut result = text.to_string();
   while result.len() > max_chars {
      if let Some(pos) = result.rfind(' ') {
         result.truncate(pos);
         result = result.trim_end_matches([',', ';', ':']).trim_end().to_string();
      } else {
         result.truncate(max_chars);
         break;
      }
   }
   result
}

#[cfg(test)]
mod tests {
   use super::*;

   #[test]
   fn test_empty_diff_rejected_by_both_builders() {
      for diff in ["", "   ", "\n\t\n"] {
         let docs = build_documentation_prompt(diff);
         assert!(matches!(docs, Err(DocGenError::Validation(_))), "docs accepted {diff:?}");

         let message = build_message_prompt(diff);
         assert!(matches!(message, Err(DocGenError::Validation(_))), "message accepted {diff:?}");
      }
   }

   #[test]
   fn test_builders_embed_diff() {
      let diff = "diff --git a/src/lib.rs b/src/lib.rs\n+pub fn added() {}";
      assert!(build_documentation_prompt(diff).unwrap().contains(diff));
      assert!(build_message_prompt(diff).unwrap().contains(diff));
   }

   #[test]
   fn test_post_process_message_single_line() {
      let processed = post_process_message("Fix bug\nin parser\n\nCloses #4", 72);
      assert_eq!(processed, "Fix bug in parser Closes #4");
      assert!(!processed.contains('\n'));
   }

   #[test]
   fn test_post_process_message_truncates_to_budget() {
      let raw = "update the documentation generator to cover configuration resolution edge cases";
      let processed = post_process_message(raw, 40);
      assert!(processed.len() <= 40, "got {} chars: {processed}", processed.len());
      // Word boundary, not mid-word
      assert!(raw.starts_with(&processed));
      assert!(!processed.ends_with(' '));
   }

   #[test]
   fn test_post_process_message_unbreakable_text() {
      let raw = "a".repeat(100);
      let processed = post_process_message(&raw, 20);
      assert_eq!(processed.len(), 20);
   }

   #[test]
   fn test_post_process_documentation_preserves_paragraphs() {
      let raw = "# Summary\n\nFirst paragraph.\n\nSecond paragraph.\n";
      let processed = post_process_documentation(raw);
      assert_eq!(processed, "# Summary\n\nFirst paragraph.\n\nSecond paragraph.");
      assert!(processed.contains("\n\n"));
   }

   #[test]
   fn test_post_process_normalizes_unicode() {
      let processed = post_process_message("Fix \u{201C}quoted\u{201D} handling\u{2026}", 72);
      assert_eq!(processed, "Fix \"quoted\" handling...");
   }

   #[test]
   fn test_truncate_diff_small_passthrough() {
      let diff = "+line one\n-line two";
      assert!(matches!(truncate_diff(diff, 100), Cow::Borrowed(_)));
   }

   #[test]
   fn test_truncate_diff_cuts_at_line_boundary() {
      let line = "+changed line with some content\n";
      let diff = line.repeat(200);
      let truncated = truncate_diff(&diff, 100);

      assert!(truncated.ends_with(TRUNCATION_MARKER));
      assert!(truncated.len() < diff.len());
      // Everything before the marker is whole lines
      let body = truncated.strip_suffix(TRUNCATION_MARKER).unwrap();
      assert!(body.lines().all(|l| l == line.trim_end()));
   }

   #[test]
   fn test_message_char_budget() {
      assert_eq!(message_char_budget(72), 288);
   }
}
