//! Git collaborator glue: locate the repository and extract diff content.
//!
//! Only the small surface the documentation flow needs; no staging, no
//! commit creation.

use std::{path::PathBuf, process::Command};

use crate::error::{DocGenError, Result};

fn run_git(dir: &str, args: &[&str]) -> Result<String> {
   let output = Command::new("git")
      .args(args)
      .current_dir(dir)
      .output()
      .map_err(|e| DocGenError::Git(format!("Failed to run git {}: {e}", args.join(" "))))?;

   if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      return Err(DocGenError::Git(format!("git {} failed: {}", args.join(" "), stderr.trim())));
   }

   Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

/// Repository root containing `dir`, if any.
pub fn get_git_root(dir: &str) -> Result<PathBuf> {
   let stdout = run_git(dir, &["rev-parse", "--show-toplevel"])?;
   let root = stdout.trim();
   if root.is_empty() {
      return Err(DocGenError::Git("git rev-parse returned no repository root".to_string()));
   }
   Ok(PathBuf::from(root))
}

pub fn is_git_repository(dir: &str) -> bool {
   get_git_root(dir).is_ok()
}

/// Diff of the most recent commit, without its message.
pub fn get_head_diff(dir: &str) -> Result<String> {
   run_git(dir, &["show", "--format=", "HEAD"])
}

/// Short hash of the most recent commit.
pub fn get_head_short_hash(dir: &str) -> Result<String> {
   Ok(run_git(dir, &["rev-parse", "--short", "HEAD"])?.trim().to_string())
}

/// Diff of currently staged changes.
pub fn get_staged_diff(dir: &str) -> Result<String> {
   run_git(dir, &["diff", "--cached"])
}

#[cfg(test)]
mod tests {
   use super::*;

   #[test]
   fn test_not_a_repository() {
      let dir = tempfile::tempdir().unwrap();
      let path = dir.path().to_str().unwrap();
      assert!(!is_git_repository(path));
      assert!(get_git_root(path).is_err());
   }

   #[test]
   fn test_git_error_is_normalized() {
      let dir = tempfile::tempdir().unwrap();
      let err = get_head_diff(dir.path().to_str().unwrap()).unwrap_err();
      assert!(matches!(err, DocGenError::Git(_)));
   }
}
