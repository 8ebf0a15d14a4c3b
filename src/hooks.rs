//! Git post-commit hook installation.
//!
//! The hook script is rendered from an embedded template and recognized on
//! uninstall by its marker line, so foreign hooks are never removed
//! silently.

use std::path::{Path, PathBuf};

use crate::{
   error::{DocGenError, Result},
   templates,
};

/// Marker identifying hooks written by this tool.
pub const HOOK_MARKER: &str = "llm-docs post-commit hook";

pub fn hook_path(git_root: &Path) -> PathBuf {
   git_root.join(".git").join("hooks").join("post-commit")
}

/// Install the post-commit hook. Refuses to overwrite an existing hook
/// unless `force` is set.
pub fn install_post_commit_hook(git_root: &Path, output_dir: &str, force: bool) -> Result<PathBuf> {
   let path = hook_path(git_root);

   if path.exists() && !force {
      return Err(DocGenError::Configuration(format!(
         "Post-commit hook already exists at {} (use --force to overwrite)",
         path.display()
      )));
   }

   let binary = std::env::current_exe()
      .map(|p| p.display().to_string())
      .unwrap_or_else(|_| "ldocs".to_string());
   let script = templates::render_post_commit_hook(&binary, output_dir)?;

   if let Some(hooks_dir) = path.parent() {
      std::fs::create_dir_all(hooks_dir)?;
   }
   std::fs::write(&path, script)?;

   #[cfg(unix)]
   {
      use std::os::unix::fs::PermissionsExt;
      std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))?;
   }

   Ok(path)
}

/// Remove the post-commit hook. Returns false when no hook exists; refuses
/// to remove a hook this tool did not write unless `force` is set.
pub fn uninstall_post_commit_hook(git_root: &Path, force: bool) -> Result<bool> {
   let path = hook_path(git_root);

   if !path.exists() {
      return Ok(false);
   }

   let content = std::fs::read_to_string(&path)?;
   if !content.contains(HOOK_MARKER) && !force {
      return Err(DocGenError::Configuration(format!(
         "Existing hook at {} was not installed by llm-docs (use --force to remove)",
         path.display()
      )));
   }

   std::fs::remove_file(&path)?;
   Ok(true)
}

#[cfg(test)]
mod tests {
   use super::*;

   fn fake_repo() -> tempfile::TempDir {
      let dir = tempfile::tempdir().unwrap();
      std::fs::create_dir_all(dir.path().join(".git").join("hooks")).unwrap();
      dir
   }

   #[test]
   fn test_install_writes_marked_script() {
      let repo = fake_repo();
      let path = install_post_commit_hook(repo.path(), "docs", false).unwrap();

      let content = std::fs::read_to_string(&path).unwrap();
      assert!(content.starts_with("#!/bin/sh"));
      assert!(content.contains(HOOK_MARKER));
      assert!(content.contains("--output-dir \"docs\""));
   }

   #[test]
   fn test_install_refuses_existing_without_force() {
      let repo = fake_repo();
      install_post_commit_hook(repo.path(), "docs", false).unwrap();

      let second = install_post_commit_hook(repo.path(), "docs", false);
      assert!(matches!(second, Err(DocGenError::Configuration(_))));

      // Forced install overwrites
      install_post_commit_hook(repo.path(), "generated", true).unwrap();
      let content = std::fs::read_to_string(hook_path(repo.path())).unwrap();
      assert!(content.contains("--output-dir \"generated\""));
   }

   #[test]
   fn test_uninstall_roundtrip() {
      let repo = fake_repo();
      assert!(!uninstall_post_commit_hook(repo.path(), false).unwrap());

      install_post_commit_hook(repo.path(), "docs", false).unwrap();
      assert!(uninstall_post_commit_hook(repo.path(), false).unwrap());
      assert!(!hook_path(repo.path()).exists());
   }

   #[test]
   fn test_uninstall_protects_foreign_hooks() {
      let repo = fake_repo();
      let path = hook_path(repo.path());
      std::fs::write(&path, "#!/bin/sh\necho custom hook\n").unwrap();

      let result = uninstall_post_commit_hook(repo.path(), false);
      assert!(matches!(result, Err(DocGenError::Configuration(_))));
      assert!(path.exists());

      assert!(uninstall_post_commit_hook(repo.path(), true).unwrap());
      assert!(!path.exists());
   }
}
