use std::{
   io::{IsTerminal, Read},
   path::PathBuf,
   process::ExitCode,
};

use clap::{Parser, Subcommand};
use llm_docs::{
   DocGenError, GlobalConfig, Provider, Result, TaskKind,
   catalog::{self, DEFAULT_LOCAL_MODEL},
   config::CONFIG_FILE_NAME,
   create_client, generator, git, hooks, style,
};

#[derive(Parser, Debug)]
#[command(
   name = "ldocs",
   version,
   about = "Generate documentation and commit messages from diffs using hosted or local LLMs",
   long_about = None
)]
struct Cli {
   /// Path to config file (default: .llm-docs.json at the git root)
   #[arg(long, global = true)]
   config: Option<PathBuf>,

   #[command(subcommand)]
   command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
   /// Write an initial configuration file
   Init {
      /// Generation backend
      #[arg(long, value_enum)]
      provider: Option<Provider>,

      /// Model identifier (provider default when omitted)
      #[arg(long)]
      model: Option<String>,

      /// API key for the hosted provider (env vars override at runtime)
      #[arg(long)]
      api_key: Option<String>,

      /// Output directory for hook-generated documentation
      #[arg(long, default_value = "docs")]
      output_dir: String,

      /// Retry recoverable hosted failures once against the local backend
      #[arg(long)]
      fallback_to_local: bool,

      /// Overwrite an existing configuration file
      #[arg(long)]
      force: bool,
   },

   /// Validate configuration and test the model connection
   Validate,

   /// Show configuration, hardware and local runtime status
   Status,

   /// Generate documentation from diff content
   Generate {
      /// Diff content (also accepted via --file, --from-head or stdin)
      diff: Option<String>,

      /// Read diff from a file
      #[arg(long)]
      file: Option<PathBuf>,

      /// Use the diff of the most recent commit
      #[arg(long)]
      from_head: bool,

      /// Save output to a file
      #[arg(long)]
      output: Option<PathBuf>,

      /// Save output into a directory, named by commit hash and timestamp
      #[arg(long)]
      output_dir: Option<String>,

      /// Override the provider for this invocation
      #[arg(long, value_enum)]
      provider: Option<Provider>,

      /// Override the model for this invocation
      #[arg(long)]
      model: Option<String>,

      /// Suppress progress output (used by the post-commit hook)
      #[arg(long)]
      quiet: bool,
   },

   /// Generate a single-line commit message from diff content
   Message {
      /// Diff content (also accepted via --file, stdin, or staged changes)
      diff: Option<String>,

      /// Read diff from a file
      #[arg(long)]
      file: Option<PathBuf>,

      /// Override the provider for this invocation
      #[arg(long, value_enum)]
      provider: Option<Provider>,

      /// Override the model for this invocation
      #[arg(long)]
      model: Option<String>,
   },

   /// Read or change configuration values
   Config {
      #[command(subcommand)]
      action: ConfigAction,
   },

   /// Install the git post-commit hook
   InstallHook {
      /// Overwrite an existing hook
      #[arg(long)]
      force: bool,
   },

   /// Remove the git post-commit hook
   UninstallHook {
      /// Remove even if the hook was not installed by llm-docs
      #[arg(long)]
      force: bool,
   },

   /// List local models usable on this machine
   Models,

   /// Show the detected hardware descriptor
   Device,
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
   /// Print a value (or the whole config without a key)
   Get { key: Option<String> },
   /// Set a value
   Set { key: String, value: String },
}

fn main() -> ExitCode {
   dotenvy::dotenv().ok();
   let cli = Cli::parse();

   match run(cli) {
      Ok(()) => ExitCode::SUCCESS,
      Err(e) => {
         eprintln!("{} {e}", style::error(style::icons::ERROR));
         ExitCode::FAILURE
      },
   }
}

fn run(cli: Cli) -> Result<()> {
   match cli.command {
      Command::Init { provider, model, api_key, output_dir, fallback_to_local, force } => {
         run_init(cli.config, provider, model, api_key, &output_dir, fallback_to_local, force)
      },
      Command::Validate => run_validate(&load_config(cli.config.as_deref())?),
      Command::Status => run_status(&load_config(cli.config.as_deref())?),
      Command::Generate {
         diff,
         file,
         from_head,
         output,
         output_dir,
         provider,
         model,
         quiet,
      } => {
         let config = load_config(cli.config.as_deref())?;
         run_generate(&config, diff, file, from_head, output, output_dir, provider, model, quiet)
      },
      Command::Message { diff, file, provider, model } => {
         let config = load_config(cli.config.as_deref())?;
         run_message(&config, diff, file, provider, model)
      },
      Command::Config { action } => run_config(cli.config, action),
      Command::InstallHook { force } => run_install_hook(&load_config(cli.config.as_deref())?, force),
      Command::UninstallHook { force } => run_uninstall_hook(force),
      Command::Models => run_models(&load_config(cli.config.as_deref())?),
      Command::Device => run_device(),
   }
}

fn load_config(path: Option<&std::path::Path>) -> Result<GlobalConfig> {
   match path {
      Some(path) => GlobalConfig::from_file(path),
      None => GlobalConfig::load(),
   }
}

fn config_path(cli_path: Option<PathBuf>) -> PathBuf {
   cli_path
      .or_else(GlobalConfig::default_config_path)
      .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME))
}

/// Apply per-invocation provider/model flags on top of the persisted config.
/// Returns whether any override was applied; overridden invocations skip
/// per-task override resolution, matching what the user asked for literally.
fn apply_cli_overrides(
   config: &mut GlobalConfig,
   provider: Option<Provider>,
   model: Option<String>,
) -> bool {
   let mut overridden = false;
   if let Some(provider) = provider {
      config.provider = provider;
      // Model must follow the provider unless explicitly pinned
      if model.is_none() {
         config.model = provider.default_model().to_string();
      }
      overridden = true;
   }
   if let Some(model) = model {
      config.model = model;
      overridden = true;
   }
   overridden
}

fn run_init(
   cli_config: Option<PathBuf>,
   provider: Option<Provider>,
   model: Option<String>,
   api_key: Option<String>,
   output_dir: &str,
   fallback_to_local: bool,
   force: bool,
) -> Result<()> {
   let path = config_path(cli_config);

   if path.exists() && !force {
      return Err(DocGenError::Configuration(format!(
         "Configuration already exists at {} (use --force to overwrite)",
         path.display()
      )));
   }

   let provider = provider.unwrap_or(Provider::Local);
   let model = model.unwrap_or_else(|| provider.default_model().to_string());

   let mut config = GlobalConfig::default();
   config.provider = provider;
   config.model = model.clone();
   config.fallback_to_local = fallback_to_local;
   config.documentation.output_dir = output_dir.to_string();

   if !provider.is_local() {
      if api_key.is_none() {
         style::warn(&format!(
            "No --api-key given; set {} before generating",
            env_var_for(provider)
         ));
      }
      let block = llm_docs::config::HostedProviderConfig { api_key, ..Default::default() };
      match provider {
         Provider::Anthropic => config.anthropic = Some(block),
         Provider::OpenAi => config.openai = Some(block),
         Provider::Gemini => config.gemini = Some(block),
         Provider::Local => {},
      }
   }

   config.save_to_file(&path)?;
   println!("{} Configuration saved to {}", style::success(style::icons::SUCCESS), path.display());
   println!();
   println!("{}", style::bold("Next steps:"));
   println!("  {} ldocs validate      test the model connection", style::icons::BULLET);
   println!("  {} ldocs install-hook  generate docs on every commit", style::icons::BULLET);
   Ok(())
}

const fn env_var_for(provider: Provider) -> &'static str {
   match provider {
      Provider::Anthropic => "ANTHROPIC_API_KEY",
      Provider::OpenAi => "OPENAI_API_KEY",
      Provider::Gemini => "GEMINI_API_KEY",
      Provider::Local => "",
   }
}

fn run_validate(config: &GlobalConfig) -> Result<()> {
   println!("{}", style::bold("Validating configuration"));

   let handle = style::with_spinner_result("Resolving configuration", || create_client(config, None))?;
   let effective = handle.effective_config();
   println!(
      "  provider {} {}",
      style::icons::ARROW,
      style::info(effective.provider.as_str())
   );
   println!("  model    {} {}", style::icons::ARROW, style::model(&effective.model));

   let response = style::with_spinner_result("Testing generation", || handle.probe_generation())?;
   let preview: String = response.chars().take(60).collect();
   println!("  response {} {}", style::icons::ARROW, style::dim(preview.replace('\n', " ").trim()));

   println!("{} Configuration is usable", style::success(style::icons::SUCCESS));
   Ok(())
}

fn run_status(config: &GlobalConfig) -> Result<()> {
   println!("{}", style::bold("llm-docs status"));
   println!("  provider            {}", style::info(config.provider.as_str()));
   println!("  model               {}", style::model(&config.model));
   println!("  docs enabled        {}", config.docs_enabled);
   println!("  messages enabled    {}", config.commit_message_enabled);
   println!("  fallback to local   {}", config.fallback_to_local);

   let device = generator::get_device_descriptor();
   let accel = device.accelerator.as_deref().unwrap_or("-");
   println!("  hardware            {} ({}, {})", format!("{:?}", device.kind).to_lowercase(), device.backend, accel);

   let local = config.local.clone().unwrap_or_default();
   let models = generator::list_available_local_models(&local);
   if models.is_empty() {
      println!("  local runtime       {}", style::warning("not reachable"));
   } else {
      println!("  local runtime       {} ({} models usable)", style::success("ok"), models.len());
   }

   match GlobalConfig::default_config_path() {
      Some(path) if path.exists() => println!("  config file         {}", path.display()),
      _ => println!("  config file         {}", style::warning("none (run 'ldocs init')")),
   }
   Ok(())
}

/// Resolve diff content from the argument, a file, HEAD, or piped stdin.
fn read_diff_input(
   diff: Option<String>,
   file: Option<PathBuf>,
   from_head: bool,
) -> Result<String> {
   if let Some(path) = file {
      return Ok(std::fs::read_to_string(path)?);
   }
   if from_head {
      return git::get_head_diff(".");
   }
   if let Some(diff) = diff {
      return Ok(diff);
   }
   if !std::io::stdin().is_terminal() {
      let mut buffer = String::new();
      std::io::stdin().read_to_string(&mut buffer)?;
      return Ok(buffer);
   }
   Err(DocGenError::Validation(
      "No diff content supplied (argument, --file, --from-head, or stdin)".to_string(),
   ))
}

#[allow(clippy::too_many_arguments, reason = "Thin dispatch from clap fields")]
fn run_generate(
   config: &GlobalConfig,
   diff: Option<String>,
   file: Option<PathBuf>,
   from_head: bool,
   output: Option<PathBuf>,
   output_dir: Option<String>,
   provider: Option<Provider>,
   model: Option<String>,
   quiet: bool,
) -> Result<()> {
   // Hook-driven invocations respect the task enable flag
   if from_head && !config.docs_enabled {
      if !quiet {
         println!("Documentation generation is disabled; skipping");
      }
      return Ok(());
   }

   let diff_content = read_diff_input(diff, file, from_head)?;

   let mut runtime_config = config.clone();
   let overridden = apply_cli_overrides(&mut runtime_config, provider, model);
   let task = if overridden { None } else { Some(TaskKind::Documentation) };

   let handle = create_client(&runtime_config, task)?;
   if !quiet {
      let effective = handle.effective_config();
      println!(
         "Using {} {} {}",
         style::info(effective.provider.as_str()),
         style::icons::ARROW,
         style::model(&effective.model)
      );
   }

   let documentation = if quiet {
      handle.generate_documentation(&diff_content)?
   } else {
      style::with_spinner_result("Generating documentation", || {
         handle.generate_documentation(&diff_content)
      })?
   };

   if let Some(path) = output {
      if let Some(parent) = path.parent() {
         std::fs::create_dir_all(parent)?;
      }
      std::fs::write(&path, &documentation)?;
      if !quiet {
         println!("{} Documentation saved to {}", style::success(style::icons::SUCCESS), path.display());
      }
   } else if let Some(dir) = output_dir {
      let path = documentation_output_path(&dir)?;
      if let Some(parent) = path.parent() {
         std::fs::create_dir_all(parent)?;
      }
      std::fs::write(&path, &documentation)?;
      if !quiet {
         println!("{} Documentation saved to {}", style::success(style::icons::SUCCESS), path.display());
      }
   } else {
      println!("{}", style::boxed("Documentation", &documentation, style::term_width()));
   }
   Ok(())
}

/// Output file named after the current commit and wall clock.
fn documentation_output_path(dir: &str) -> Result<PathBuf> {
   let hash = git::get_head_short_hash(".").unwrap_or_else(|_| "nocommit".to_string());
   let timestamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
   Ok(PathBuf::from(dir).join(format!("{hash}-{timestamp}.md")))
}

fn run_message(
   config: &GlobalConfig,
   diff: Option<String>,
   file: Option<PathBuf>,
   provider: Option<Provider>,
   model: Option<String>,
) -> Result<()> {
   // No explicit input: describe what is currently staged
   let diff_content = match (&diff, &file, std::io::stdin().is_terminal()) {
      (None, None, true) => git::get_staged_diff(".")?,
      _ => read_diff_input(diff, file, false)?,
   };

   let mut runtime_config = config.clone();
   let overridden = apply_cli_overrides(&mut runtime_config, provider, model);
   let task = if overridden { None } else { Some(TaskKind::CommitMessage) };

   let handle = create_client(&runtime_config, task)?;
   let message = handle.generate_short_message(&diff_content)?;
   println!("{message}");
   Ok(())
}

fn run_config(cli_config: Option<PathBuf>, action: ConfigAction) -> Result<()> {
   let path = config_path(cli_config);

   match action {
      ConfigAction::Get { key } => {
         let config = GlobalConfig::from_file(&path)?;
         match key {
            Some(key) => {
               let value = config.get_value(&key)?;
               println!("{}", serde_json::to_string_pretty(&value)?);
            },
            None => println!("{}", serde_json::to_string_pretty(&config)?),
         }
      },
      ConfigAction::Set { key, value } => {
         let mut config =
            if path.exists() { GlobalConfig::from_file(&path)? } else { GlobalConfig::default() };
         config.set_value(&key, &value)?;
         config.save_to_file(&path)?;
         println!("{} Set '{key}' to '{value}'", style::success(style::icons::SUCCESS));
      },
   }
   Ok(())
}

fn run_install_hook(config: &GlobalConfig, force: bool) -> Result<()> {
   let git_root = git::get_git_root(".")?;
   let path = hooks::install_post_commit_hook(&git_root, &config.documentation.output_dir, force)?;

   println!("{} Post-commit hook installed at {}", style::success(style::icons::SUCCESS), path.display());
   println!();
   println!("Documentation will be generated into '{}/' after every commit.", config.documentation.output_dir);
   Ok(())
}

fn run_uninstall_hook(force: bool) -> Result<()> {
   let git_root = git::get_git_root(".")?;
   if hooks::uninstall_post_commit_hook(&git_root, force)? {
      println!("{} Post-commit hook removed", style::success(style::icons::SUCCESS));
   } else {
      style::warn("No post-commit hook found");
   }
   Ok(())
}

fn run_models(config: &GlobalConfig) -> Result<()> {
   let device = generator::get_device_descriptor();
   println!("{}", style::bold("Local model catalog"));

   for entry in catalog::catalog() {
      let usable = entry.requirement.is_satisfied_by(&device);
      let marker = if usable {
         style::success(style::icons::SUCCESS)
      } else {
         style::dim("needs GPU")
      };
      let default_tag = if entry.id == DEFAULT_LOCAL_MODEL { style::dim(" (default)") } else { String::new() };
      println!("  {:<22} {}  {}{}", style::model(entry.id), marker, entry.description, default_tag);
   }

   let local = config.local.clone().unwrap_or_default();
   if generator::list_available_local_models(&local).is_empty() {
      println!();
      style::warn(&format!("No local runtime reachable at {}", local.base_url));
   }
   Ok(())
}

fn run_device() -> Result<()> {
   let device = generator::get_device_descriptor();
   println!("{}", style::bold("Detected hardware"));
   println!("  kind        {:?}", device.kind);
   println!("  backend     {}", device.backend);
   if let Some(name) = &device.accelerator {
      println!("  accelerator {name}");
   }
   Ok(())
}
