//! Prompt and hook-script templates.
//!
//! Templates are embedded in the binary and rendered with Tera. A user can
//! override any prompt by placing a file with the same relative path under
//! `~/.llm-docs/prompts/` (e.g. `documentation/default.md`).

use std::{path::PathBuf, sync::LazyLock};

use parking_lot::Mutex;
use rust_embed::RustEmbed;
use tera::{Context, Tera};

use crate::error::{DocGenError, Result};

/// Embedded prompts folder (compiled into the binary).
#[derive(RustEmbed)]
#[folder = "prompts/"]
struct Prompts;

static TERA: LazyLock<Mutex<Tera>> = LazyLock::new(|| {
   let mut tera = Tera::default();

   for file in Prompts::iter() {
      if let Some(embedded) = Prompts::get(file.as_ref()) {
         match std::str::from_utf8(embedded.data.as_ref()) {
            Ok(content) => {
               if let Err(e) = tera.add_raw_template(file.as_ref(), content) {
                  eprintln!("Warning: Failed to register embedded template {}: {e}", file.as_ref());
               }
            },
            Err(e) => {
               eprintln!("Warning: Embedded template {} is not valid UTF-8: {e}", file.as_ref());
            },
         }
      }
   }

   // User-provided templates replace the embedded ones
   if let Some(prompts_dir) = user_prompts_dir() {
      for file in Prompts::iter() {
         let candidate = prompts_dir.join(file.as_ref());
         if !candidate.is_file() {
            continue;
         }
         match std::fs::read_to_string(&candidate) {
            Ok(content) => {
               if let Err(e) = tera.add_raw_template(file.as_ref(), &content) {
                  eprintln!("Warning: Failed to load template {}: {e}", candidate.display());
               }
            },
            Err(e) => {
               eprintln!("Warning: Failed to read template {}: {e}", candidate.display());
            },
         }
      }
   }

   // Prompts are plain text, not HTML
   tera.autoescape_on(vec![]);

   Mutex::new(tera)
});

/// User prompt override directory (`~/.llm-docs/prompts/`), if a home
/// directory exists.
fn user_prompts_dir() -> Option<PathBuf> {
   std::env::var("HOME")
      .or_else(|_| std::env::var("USERPROFILE"))
      .ok()
      .map(|home| PathBuf::from(home).join(".llm-docs").join("prompts"))
}

fn render(name: &str, context: &Context) -> Result<String> {
   TERA
      .lock()
      .render(name, context)
      .map_err(|e| DocGenError::Configuration(format!("Failed to render template '{name}': {e}")))
}

/// Render the documentation prompt for a diff.
pub fn render_documentation_prompt(diff: &str) -> Result<String> {
   let mut context = Context::new();
   context.insert("diff", diff);
   render("documentation/default.md", &context)
}

/// Render the commit message prompt for a diff.
pub fn render_message_prompt(diff: &str) -> Result<String> {
   let mut context = Context::new();
   context.insert("diff", diff);
   render("message/default.md", &context)
}

/// Render the post-commit hook script.
pub fn render_post_commit_hook(binary: &str, output_dir: &str) -> Result<String> {
   let mut context = Context::new();
   context.insert("binary", binary);
   context.insert("output_dir", output_dir);
   render("hooks/post-commit.sh", &context)
}
