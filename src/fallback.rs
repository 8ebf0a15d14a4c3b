//! Fallback orchestration: one primary call, and at most one substitute call
//! against the local backend after a recoverable failure.

use crate::{
   client::{self, HttpSettings, ProviderClient},
   config::GlobalConfig,
   error::Result,
   resolve::{self, EffectiveConfig},
};

/// Which execution path produced a completion. Not shown to end users, but
/// available to tests and telemetry collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationPath {
   Primary,
   Fallback,
}

/// Raw completion text plus the path that produced it.
#[derive(Debug, Clone)]
pub struct GenerationResult {
   pub text: String,
   pub path: GenerationPath,
}

/// Invoke the resolved provider; on a recoverable failure, and only when
/// enabled and the primary is not already local, try the local backend once.
///
/// When both attempts fail, the local attempt's error surfaces, since it is
/// the last attempt made. Otherwise the original error propagates with its
/// kind intact.
pub fn generate_with_fallback(
   global: &GlobalConfig,
   effective: &EffectiveConfig,
   prompt: &str,
   max_tokens: u32,
) -> Result<GenerationResult> {
   let http = HttpSettings::from(global);
   let primary = client::create(effective, &http)?;

   run(primary.as_ref(), global.fallback_to_local, prompt, max_tokens, || {
      let local_config = resolve::local_fallback(global);
      let local_max_tokens = local_config.max_tokens;
      client::create(&local_config, &http).map(|client| (client, local_max_tokens))
   })
}

/// Orchestration core, generic over the local-client thunk so tests can
/// count invocations. The thunk runs at most once.
fn run<F>(
   primary: &dyn ProviderClient,
   fallback_enabled: bool,
   prompt: &str,
   max_tokens: u32,
   make_local: F,
) -> Result<GenerationResult>
where
   F: FnOnce() -> Result<(Box<dyn ProviderClient>, u32)>,
{
   let err = match primary.generate(prompt, max_tokens) {
      Ok(text) => return Ok(GenerationResult { text, path: GenerationPath::Primary }),
      Err(err) => err,
   };

   let eligible = err.is_recoverable() && fallback_enabled && !primary.provider().is_local();
   if !eligible {
      return Err(err);
   }

   // From here on the local attempt owns the outcome
   let (local, local_max_tokens) = make_local()?;
   let text = local.generate(prompt, local_max_tokens)?;
   Ok(GenerationResult { text, path: GenerationPath::Fallback })
}

#[cfg(test)]
mod tests {
   use std::cell::Cell;

   use super::*;
   use crate::{
      config::Provider,
      error::{DocGenError, Result},
   };

   /// Call-counting stub with a scripted outcome.
   struct StubClient {
      provider: Provider,
      calls:    Cell<u32>,
      outcome:  fn() -> Result<String>,
   }

   impl StubClient {
      fn new(provider: Provider, outcome: fn() -> Result<String>) -> Self {
         Self { provider, calls: Cell::new(0), outcome }
      }
   }

   impl ProviderClient for StubClient {
      fn generate(&self, _prompt: &str, _max_tokens: u32) -> Result<String> {
         self.calls.set(self.calls.get() + 1);
         (self.outcome)()
      }

      fn provider(&self) -> Provider {
         self.provider
      }
   }

   fn unavailable() -> Result<String> {
      Err(DocGenError::ProviderUnavailable {
         provider: "anthropic".to_string(),
         reason:   "timeout".to_string(),
      })
   }

   fn auth_rejected() -> Result<String> {
      Err(DocGenError::Authentication {
         provider: "anthropic".to_string(),
         reason:   "bad key".to_string(),
      })
   }

   fn local_ok() -> Result<String> {
      Ok("local completion".to_string())
   }

   fn local_fails() -> Result<String> {
      Err(DocGenError::Generation {
         provider: "local".to_string(),
         reason:   "empty completion".to_string(),
      })
   }

   #[test]
   fn test_primary_success_skips_fallback() {
      let primary = StubClient::new(Provider::Anthropic, || Ok("hosted completion".to_string()));
      let constructed = Cell::new(false);

      let result = run(&primary, true, "prompt", 256, || {
         constructed.set(true);
         Ok((
            Box::new(StubClient::new(Provider::Local, local_ok)) as Box<dyn ProviderClient>,
            128,
         ))
      })
      .unwrap();

      assert_eq!(result.text, "hosted completion");
      assert_eq!(result.path, GenerationPath::Primary);
      assert_eq!(primary.calls.get(), 1);
      assert!(!constructed.get());
   }

   #[test]
   fn test_recoverable_failure_falls_back_once() {
      let primary = StubClient::new(Provider::Anthropic, unavailable);
      let local_calls = std::rc::Rc::new(Cell::new(0u32));

      struct RcCountingStub {
         calls: std::rc::Rc<Cell<u32>>,
      }
      impl ProviderClient for RcCountingStub {
         fn generate(&self, _prompt: &str, _max_tokens: u32) -> Result<String> {
            self.calls.set(self.calls.get() + 1);
            Ok("local completion".to_string())
         }

         fn provider(&self) -> Provider {
            Provider::Local
         }
      }

      let counter = local_calls.clone();
      let result = run(&primary, true, "prompt", 256, move || {
         Ok((Box::new(RcCountingStub { calls: counter }) as Box<dyn ProviderClient>, 128))
      })
      .unwrap();

      assert_eq!(result.text, "local completion");
      assert_eq!(result.path, GenerationPath::Fallback);
      assert_eq!(primary.calls.get(), 1);
      assert_eq!(local_calls.get(), 1);
   }

   #[test]
   fn test_fallback_disabled_preserves_original_error() {
      let primary = StubClient::new(Provider::Anthropic, unavailable);
      let constructed = Cell::new(false);

      let err = run(&primary, false, "prompt", 256, || {
         constructed.set(true);
         Ok((
            Box::new(StubClient::new(Provider::Local, local_ok)) as Box<dyn ProviderClient>,
            128,
         ))
      })
      .unwrap_err();

      assert!(matches!(err, DocGenError::ProviderUnavailable { .. }));
      assert!(!constructed.get());
   }

   #[test]
   fn test_auth_error_never_falls_back() {
      let primary = StubClient::new(Provider::Anthropic, auth_rejected);
      let constructed = Cell::new(false);

      let err = run(&primary, true, "prompt", 256, || {
         constructed.set(true);
         Ok((
            Box::new(StubClient::new(Provider::Local, local_ok)) as Box<dyn ProviderClient>,
            128,
         ))
      })
      .unwrap_err();

      assert!(matches!(err, DocGenError::Authentication { .. }));
      assert!(!constructed.get());
   }

   #[test]
   fn test_local_primary_never_falls_back() {
      let primary = StubClient::new(Provider::Local, local_fails);
      let constructed = Cell::new(false);

      let err = run(&primary, true, "prompt", 256, || {
         constructed.set(true);
         Ok((
            Box::new(StubClient::new(Provider::Local, local_ok)) as Box<dyn ProviderClient>,
            128,
         ))
      })
      .unwrap_err();

      assert!(matches!(err, DocGenError::Generation { .. }));
      assert_eq!(primary.calls.get(), 1);
      assert!(!constructed.get());
   }

   #[test]
   fn test_double_failure_surfaces_local_error() {
      let primary = StubClient::new(Provider::Anthropic, unavailable);

      let err = run(&primary, true, "prompt", 256, || {
         Ok((
            Box::new(StubClient::new(Provider::Local, local_fails)) as Box<dyn ProviderClient>,
            128,
         ))
      })
      .unwrap_err();

      // The local attempt's error wins, not the original timeout
      match err {
         DocGenError::Generation { provider, .. } => assert_eq!(provider, "local"),
         other => panic!("expected local Generation error, got {other}"),
      }
   }

   #[test]
   fn test_local_construction_failure_surfaces() {
      let primary = StubClient::new(Provider::Anthropic, unavailable);

      let err = run(&primary, true, "prompt", 256, || {
         Err(DocGenError::Configuration("no local runtime".to_string()))
      })
      .unwrap_err();

      assert!(matches!(err, DocGenError::Configuration(_)));
   }
}
