//! Command-line front end for AnyGPT.
//!
//! stdout carries only the generated text (or the requested settings data);
//! logs go to stderr.

#![allow(clippy::print_stdout, reason = "CLI tool outputs to stdout")]

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use anygpt_client::adapters::{EnvCredentialStore, JsonSettingsFile, MemoryClipboard, TracingNotifier};
use anygpt_client::ports::{ClipboardPort, CredentialStore, SettingsSource};
use anygpt_client::{LlmClient, Settings, TextProcessor, OPENAI_CHAT_COMPLETIONS_URL};
use clap::{Parser, Subcommand};
use tokio::io::AsyncReadExt;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "anygpt", author, version, about, long_about = None)]
struct Cli {
    /// Chat completions URL (overrides the settings file)
    #[arg(long, global = true, env = "ANYGPT_ENDPOINT")]
    endpoint: Option<String>,

    /// Settings file to use instead of the default location
    #[arg(long, global = true, env = "ANYGPT_SETTINGS")]
    settings: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Sends text to the model and prints the completion
    Generate {
        /// Text to send; read from stdin when omitted
        text: Option<String>,
        /// Model identifier
        #[arg(long)]
        model: Option<String>,
        /// System prompt placed before the text
        #[arg(long)]
        system_prompt: Option<String>,
        /// Sampling temperature (0.0-2.0)
        #[arg(long)]
        temperature: Option<f32>,
        /// Maximum output tokens
        #[arg(long)]
        max_tokens: Option<u32>,
        /// Per-attempt timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,
        /// Extra attempts for transient failures
        #[arg(long)]
        retries: Option<u32>,
    },
    /// Checks that the configured API key is accepted
    Validate,
    /// Runs the clipboard pipeline with stdin as the clipboard
    Process {
        /// Use the built-in sample text instead of stdin
        #[arg(long)]
        sample: bool,
    },
    /// Inspects or creates the settings file
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(Subcommand, Debug)]
enum SettingsAction {
    /// Prints the effective settings as JSON
    Show,
    /// Prints the settings file location
    Path,
    /// Writes a settings file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn init_logging(verbose: bool) -> Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("setting default subscriber failed: {e}"))
}

fn settings_file(path: Option<PathBuf>) -> Result<JsonSettingsFile> {
    match path {
        Some(path) => Ok(JsonSettingsFile::new(path)),
        None => JsonSettingsFile::default_location().context("Cannot locate the settings directory"),
    }
}

fn build_client(flag: Option<&str>, settings: &Settings) -> Result<LlmClient> {
    let endpoint = flag
        .or(settings.endpoint.as_deref())
        .unwrap_or(OPENAI_CHAT_COMPLETIONS_URL);
    LlmClient::with_endpoint(endpoint).with_context(|| format!("Invalid endpoint {endpoint}"))
}

/// Cancel the in-flight call on Ctrl-C.
fn cancel_on_ctrl_c(client: &LlmClient) {
    let client = client.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling request");
            client.cancel_in_flight();
        }
    });
}

async fn read_stdin() -> Result<String> {
    let mut input = String::new();
    tokio::io::stdin()
        .read_to_string(&mut input)
        .await
        .context("Failed to read stdin")?;
    Ok(input)
}

/// Reject whitespace-only input before any request is built.
fn require_input(text: String) -> Result<String> {
    if text.trim().is_empty() {
        bail!("Input is blank, nothing to send");
    }
    Ok(text)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    let file = settings_file(cli.settings)?;

    match cli.command {
        Commands::Generate { text, model, system_prompt, temperature, max_tokens, timeout, retries } => {
            let settings = file.load().context("Failed to load settings")?;
            let mut config = settings.client_config();
            if let Some(temperature) = temperature {
                config.temperature = temperature;
            }
            if let Some(max_tokens) = max_tokens {
                config.max_output_tokens = max_tokens;
            }
            if let Some(timeout) = timeout {
                config.timeout_secs = timeout;
            }
            if let Some(retries) = retries {
                config.max_retries = retries;
            }

            let text = match text {
                Some(text) => text,
                None => read_stdin().await?,
            };
            let text = require_input(text)?;

            let credential = EnvCredentialStore.api_key().context("Set ANYGPT_API_KEY or OPENAI_API_KEY")?;
            let client = build_client(cli.endpoint.as_deref(), &settings)?;
            cancel_on_ctrl_c(&client);

            let model = model.unwrap_or_else(|| settings.effective_model().to_string());
            let system_prompt =
                system_prompt.unwrap_or_else(|| settings.effective_system_prompt().to_string());

            let generation = client
                .generate(&text, &credential, &model, &system_prompt, &config)
                .await
                .context("Generation failed")?;
            if generation.truncated {
                warn!("Input truncated to {} characters", config.effective_max_input_length());
            }
            if let Some(reason) = &generation.fallback_reason {
                warn!("Printing raw response: {}", reason);
            }
            info!(attempts = generation.attempts, "Generated {} chars", generation.text.chars().count());
            println!("{}", generation.text);
        },
        Commands::Validate => {
            let settings = file.load().context("Failed to load settings")?;
            let credential = EnvCredentialStore.api_key().context("Set ANYGPT_API_KEY or OPENAI_API_KEY")?;
            let client = build_client(cli.endpoint.as_deref(), &settings)?;
            cancel_on_ctrl_c(&client);

            client.validate_credential(&credential).await.context("API key validation failed")?;
            println!("API key is valid");
        },
        Commands::Process { sample } => {
            let settings = file.load().unwrap_or_else(|e| {
                warn!("Failed to load settings, using defaults: {}", e);
                Settings::default()
            });
            let client = build_client(cli.endpoint.as_deref(), &settings)?;
            cancel_on_ctrl_c(&client);

            let clipboard = Arc::new(if sample {
                MemoryClipboard::new()
            } else {
                MemoryClipboard::with_text(read_stdin().await?)
            });
            let processor = TextProcessor::new(
                client,
                Arc::new(EnvCredentialStore),
                clipboard.clone(),
                Arc::new(file),
                Arc::new(TracingNotifier),
            );

            let outcome = if sample {
                processor.process_sample().await
            } else {
                processor.process_clipboard().await
            };

            if let Some(contents) = clipboard.read_text() {
                println!("{contents}");
            }
            let processed = outcome.context("Processing failed")?;
            info!(paste = processed.paste, play_sound = processed.play_sound, "Pipeline finished");
        },
        Commands::Settings { action } => match action {
            SettingsAction::Show => {
                let settings = file.load().context("Failed to load settings")?;
                let json = serde_json::to_string_pretty(&settings).context("Failed to serialize settings")?;
                println!("{json}");
            },
            SettingsAction::Path => {
                println!("{}", file.path().display());
            },
            SettingsAction::Init { force } => {
                if file.exists() && !force {
                    bail!("{} already exists (use --force to overwrite)", file.path().display());
                }
                file.save(&Settings::default()).context("Failed to write settings")?;
                info!("Settings written to {}", file.path().display());
                println!("{}", file.path().display());
            },
        },
    }

    Ok(())
}
