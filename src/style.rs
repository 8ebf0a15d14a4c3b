//! Terminal styling helpers for CLI output.
//!
//! Respects `NO_COLOR` and terminal capability detection.

use std::{
   io::{self, Write},
   sync::OnceLock,
   thread,
   time::Duration,
};

use owo_colors::OwoColorize;

static COLOR_ENABLED: OnceLock<bool> = OnceLock::new();

/// Check if colors should be used (cached on first call).
pub fn colors_enabled() -> bool {
   *COLOR_ENABLED.get_or_init(|| {
      // NO_COLOR takes precedence (https://no-color.org/)
      if std::env::var("NO_COLOR").is_ok() {
         return false;
      }
      supports_color::on(supports_color::Stream::Stdout).is_some_and(|level| level.has_basic)
   })
}

pub fn success(s: &str) -> String {
   if colors_enabled() { s.green().bold().to_string() } else { s.to_string() }
}

pub fn warning(s: &str) -> String {
   if colors_enabled() { s.yellow().to_string() } else { s.to_string() }
}

pub fn error(s: &str) -> String {
   if colors_enabled() { s.red().bold().to_string() } else { s.to_string() }
}

pub fn info(s: &str) -> String {
   if colors_enabled() { s.cyan().to_string() } else { s.to_string() }
}

pub fn dim(s: &str) -> String {
   if colors_enabled() { s.dimmed().to_string() } else { s.to_string() }
}

pub fn bold(s: &str) -> String {
   if colors_enabled() { s.bold().to_string() } else { s.to_string() }
}

/// Model name styling (magenta).
pub fn model(s: &str) -> String {
   if colors_enabled() { s.magenta().to_string() } else { s.to_string() }
}

/// Print a warning on its own line.
pub fn warn(msg: &str) {
   eprintln!("{} {}", warning(icons::WARNING), warning(msg));
}

/// Terminal width, capped at 100 columns.
pub fn term_width() -> usize {
   terminal_size::terminal_size()
      .map_or(80, |(w, _)| w.0 as usize)
      .min(100)
}

pub mod icons {
   pub const SUCCESS: &str = "\u{2713}";
   pub const WARNING: &str = "\u{26A0}";
   pub const ERROR: &str = "\u{2717}";
   pub const BULLET: &str = "\u{2022}";
   pub const ARROW: &str = "\u{2192}";
}

/// Render content inside a titled box, truncating overlong lines.
pub fn boxed(title: &str, content: &str, width: usize) -> String {
   let inner = width.saturating_sub(4).max(10);
   let mut out = String::new();

   out.push_str(&format!("\u{250C}\u{2500} {} ", bold(title)));
   let used = title.chars().count() + 4;
   out.push_str(&"\u{2500}".repeat(width.saturating_sub(used + 1)));
   out.push_str("\u{2510}\n");

   for line in content.lines() {
      let mut shown: String = line.chars().take(inner).collect();
      let pad = inner.saturating_sub(shown.chars().count());
      shown.push_str(&" ".repeat(pad));
      out.push_str(&format!("\u{2502} {shown} \u{2502}\n"));
   }

   out.push('\u{2514}');
   out.push_str(&"\u{2500}".repeat(width.saturating_sub(2)));
   out.push('\u{2518}');
   out
}

const SPINNER_FRAMES: &[char] = &[
   '\u{280B}', '\u{2819}', '\u{2839}', '\u{2838}', '\u{283C}', '\u{2834}', '\u{2826}', '\u{2827}',
   '\u{2807}', '\u{280F}',
];

/// Run a function with a spinner, marking success or failure when it ends.
/// Falls back to static text without a capable terminal.
pub fn with_spinner_result<F, T, E>(message: &str, f: F) -> Result<T, E>
where
   F: FnOnce() -> Result<T, E>,
{
   if !colors_enabled() {
      eprintln!("{message}");
      return f();
   }

   let (tx, rx) = std::sync::mpsc::channel::<bool>();
   let msg = message.to_string();

   let spinner = thread::spawn(move || {
      let mut idx = 0;
      loop {
         match rx.try_recv() {
            Ok(ok) => {
               let icon = if ok {
                  icons::SUCCESS.green().to_string()
               } else {
                  icons::ERROR.red().to_string()
               };
               eprint!("\r\x1b[K{icon} {msg}\n");
               io::stderr().flush().ok();
               break;
            },
            Err(std::sync::mpsc::TryRecvError::Disconnected) => break,
            Err(std::sync::mpsc::TryRecvError::Empty) => {},
         }
         eprint!("\r{} {}", SPINNER_FRAMES[idx].cyan(), msg);
         io::stderr().flush().ok();
         idx = (idx + 1) % SPINNER_FRAMES.len();
         thread::sleep(Duration::from_millis(80));
      }
   });

   let result = f();
   tx.send(result.is_ok()).ok();
   spinner.join().ok();
   result
}
