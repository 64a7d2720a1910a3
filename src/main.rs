//! # Blissful CLI (`blissful`)
//!
//! Drives the wellness assistant from the terminal: browse the catalog,
//! get recommendations and prescriptions, chat, stream, extract structured
//! data, and talk to the generative backend directly.
//!
//! ## Usage
//!
//! ```bash
//! blissful --config ./config/blissful.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `blissful catalog` | List audio sessions, optionally by category |
//! | `blissful recommend <user>` | Recommended sessions (JSON) |
//! | `blissful prescribe --answer q1=Stress` | One session from questionnaire answers (JSON) |
//! | `blissful chat "<text>"` | One chat turn, optionally persisted with `--history` |
//! | `blissful stream "<text>"` | Streamed reply, fragment by fragment |
//! | `blissful extract "<prompt>"` | Best-effort structured data (JSON) |
//! | `blissful image "<prompt>"` | Image URL for a prompt |
//! | `blissful questions` | The diagnostic questionnaire |
//! | `blissful generate "<prompt>"` | Raw backend call (`--search`, `--json`) |
//! | `blissful completions <shell>` | Shell completion script |
//!
//! Logging is controlled by `RUST_LOG` (default `blissful=info`) and is
//! written to stderr; `--log-json` switches to JSON lines.

use std::path::PathBuf;

use blissful::{commands, config};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use tracing_subscriber::EnvFilter;

/// Blissful: a wellness assistant with scripted and backend-driven modes.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. A missing file means built-in defaults.
#[derive(Parser)]
#[command(
    name = "blissful",
    about = "Blissful: recommendations, prescriptions and chat for a meditation audio catalog",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/blissful.toml")]
    config: PathBuf,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the audio catalog.
    Catalog {
        /// Only show this category (`All` shows everything).
        #[arg(long)]
        category: Option<String>,
    },

    /// Recommend sessions for a user.
    Recommend {
        /// Opaque user identifier.
        user_id: String,
    },

    /// Prescribe one session from diagnostic answers.
    ///
    /// Numeric values are read as numbers and comma-separated values as
    /// lists. Example: `--answer q1=Stress,Anxiety --answer q2=4`.
    Prescribe {
        /// Answer as `QUESTION_ID=VALUE` (repeatable).
        #[arg(long = "answer", value_parser = parse_key_val)]
        answers: Vec<(String, String)>,
    },

    /// Send one chat message.
    Chat {
        /// Message text.
        text: String,

        /// JSON file holding the conversation; created if missing and
        /// updated with the new exchange.
        #[arg(long)]
        history: Option<PathBuf>,

        /// Name used in the welcome message of a new conversation.
        #[arg(long, default_value = "there")]
        name: String,
    },

    /// Stream a reply fragment by fragment.
    Stream {
        /// Message text.
        text: String,
    },

    /// Extract structured data for a prompt.
    Extract {
        prompt: String,
    },

    /// Generate an image URL for a prompt.
    Image {
        prompt: String,
    },

    /// Print the diagnostic questionnaire.
    Questions,

    /// Call the configured backend directly.
    Generate {
        prompt: String,

        /// Enable search grounding.
        #[arg(long)]
        search: bool,

        /// Request a JSON response.
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completions.
    Completions {
        shell: Shell,
    },
}

/// Parse a `key=value` pair for `--answer` arguments.
fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let pos = s
        .find('=')
        .ok_or_else(|| format!("invalid KEY=VALUE: no '=' found in '{}'", s))?;
    Ok((s[..pos].to_string(), s[pos + 1..].to_string()))
}

fn init_logging(json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("blissful=info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_json);

    // Commands that don't require config
    match &cli.command {
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(*shell, &mut command, "blissful", &mut std::io::stdout());
            return Ok(());
        }
        Commands::Questions => return commands::run_questions(),
        Commands::Catalog { category } => return commands::run_catalog(category.as_deref()).await,
        _ => {}
    }

    let cfg = config::load_or_default(&cli.config)?;

    match cli.command {
        Commands::Recommend { user_id } => {
            commands::run_recommend(&cfg, &user_id).await?;
        }
        Commands::Prescribe { answers } => {
            commands::run_prescribe(&cfg, answers).await?;
        }
        Commands::Chat {
            text,
            history,
            name,
        } => {
            commands::run_chat(&cfg, &text, history.as_deref(), &name).await?;
        }
        Commands::Stream { text } => {
            commands::run_stream(&cfg, &text).await?;
        }
        Commands::Extract { prompt } => {
            commands::run_extract(&cfg, &prompt).await?;
        }
        Commands::Image { prompt } => {
            commands::run_image(&cfg, &prompt).await?;
        }
        Commands::Generate {
            prompt,
            search,
            json,
        } => {
            commands::run_generate(&cfg, &prompt, search, json).await?;
        }
        Commands::Completions { .. } | Commands::Questions | Commands::Catalog { .. } => {
            // Handled above (before config loading)
            unreachable!()
        }
    }

    Ok(())
}
