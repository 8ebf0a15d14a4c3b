//! Unicode cleanup for model output.
//!
//! Hosted models decorate text with smart quotes, long dashes and invisible
//! characters; generated artifacts should be plain ASCII-friendly text.

use unicode_normalization::UnicodeNormalization;

/// Normalize AI-flavored Unicode to plain equivalents.
pub fn normalize_unicode(text: &str) -> String {
   let normalized: String = text.nfkd().collect();

   normalized
      // Smart quotes to straight quotes
      .replace(['\u{2018}', '\u{2019}', '\u{201A}', '\u{2039}', '\u{203A}'], "'")
      .replace(['\u{201C}', '\u{201D}', '\u{201E}', '\u{00AB}', '\u{00BB}'], "\"")
      // Dashes and hyphens
      .replace(['\u{2010}', '\u{2011}', '\u{2012}', '\u{2212}'], "-")
      .replace(['\u{2013}', '\u{2014}', '\u{2015}'], "--")
      // Ellipsis
      .replace('\u{2026}', "...")
      // Bullet points to hyphens
      .replace(['\u{2022}', '\u{25E6}', '\u{25AA}'], "-")
      // Special spaces to regular space
      .replace(
         [
            '\u{00A0}', '\u{2002}', '\u{2003}', '\u{2009}', '\u{202F}', '\u{205F}', '\u{3000}',
         ],
         " ",
      )
      // Zero-width characters (remove)
      .replace(['\u{200B}', '\u{200C}', '\u{200D}', '\u{FEFF}'], "")
}

/// Collapse text to one line: embedded line breaks and runs of whitespace
/// become single spaces.
pub fn collapse_to_single_line(text: &str) -> String {
   text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
   use super::*;

   #[test]
   fn test_normalize_smart_quotes() {
      assert_eq!(normalize_unicode("\u{201C}fixed\u{201D} the \u{2018}bug\u{2019}"), "\"fixed\" the 'bug'");
   }

   #[test]
   fn test_normalize_dashes_and_ellipsis() {
      assert_eq!(normalize_unicode("a \u{2013} b \u{2014} c\u{2026}"), "a -- b -- c...");
   }

   #[test]
   fn test_normalize_removes_zero_width() {
      assert_eq!(normalize_unicode("a\u{200B}b\u{FEFF}c"), "abc");
   }

   #[test]
   fn test_normalize_plain_text_unchanged() {
      let plain = "Updated the parser to handle empty input.";
      assert_eq!(normalize_unicode(plain), plain);
   }

   #[test]
   fn test_collapse_to_single_line() {
      assert_eq!(collapse_to_single_line("Fix bug\nin parser\n\nCloses #4"), "Fix bug in parser Closes #4");
      assert_eq!(collapse_to_single_line("  spaced\t\tout  "), "spaced out");
      assert_eq!(collapse_to_single_line("already single line"), "already single line");
   }
}
