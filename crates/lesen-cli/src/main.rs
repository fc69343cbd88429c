//! lesen CLI: play, score and inspect reading exams from the terminal.

use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand};

use lesen_core::Level;

mod commands;
mod render;

#[derive(Parser)]
#[command(name = "lesen", version, about = "Reading exam player (Lesen, B1/B2)")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Where content and settings come from.
#[derive(Args, Clone, Debug, Default)]
pub struct SourceArgs {
    /// Content document to read instead of the configured source
    #[arg(long)]
    pub content: Option<PathBuf>,

    /// Config file path
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a starter config and a sample content document
    Init,

    /// Check every theme of the content document
    Validate {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// List the themes of a level
    Themes {
        /// Level to list (b1, b2); all levels when omitted
        #[arg(long)]
        level: Option<Level>,

        #[command(flatten)]
        source: SourceArgs,
    },

    /// Work through an exam interactively
    Play {
        /// Theme key (e.g. "alicia")
        theme: String,

        /// Level (defaults to the configured level)
        #[arg(long)]
        level: Option<Level>,

        /// Version to start with on multi-version themes
        #[arg(long)]
        version: Option<String>,

        /// User id stored with the attempt
        #[arg(long)]
        user: Option<String>,

        /// Also write an HTML results page here
        #[arg(long)]
        html: Option<PathBuf>,

        /// Do not append finished attempts to the history file
        #[arg(long)]
        no_history: bool,

        #[command(flatten)]
        source: SourceArgs,
    },

    /// Score a JSON answer file without playing
    Score {
        /// Theme key
        theme: String,

        /// Answer file: `{ "teil-1": { "1": "b" }, ... }`
        #[arg(long)]
        answers: PathBuf,

        /// Level (defaults to the configured level)
        #[arg(long)]
        level: Option<Level>,

        /// Version to score against
        #[arg(long)]
        version: Option<String>,

        /// Output format: text, json, html, markdown
        #[arg(long, default_value = "text")]
        format: String,

        /// Write the report to a file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,

        /// Append the attempt to the history file
        #[arg(long)]
        record: bool,

        /// User id stored with the attempt
        #[arg(long)]
        user: Option<String>,

        #[command(flatten)]
        source: SourceArgs,
    },

    /// Show recorded attempts
    History {
        /// Only attempts of this user
        #[arg(long)]
        user: Option<String>,

        /// Only attempts on this theme
        #[arg(long)]
        theme: Option<String>,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    let mut filter = tracing_subscriber::EnvFilter::from_default_env();
    if let Ok(directive) = "lesen=info".parse() {
        filter = filter.add_directive(directive);
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init => commands::init::execute(),
        Commands::Validate { source } => commands::validate::execute(source).await,
        Commands::Themes { level, source } => commands::themes::execute(level, source).await,
        Commands::Play {
            theme,
            level,
            version,
            user,
            html,
            no_history,
            source,
        } => commands::play::execute(theme, level, version, user, html, no_history, source).await,
        Commands::Score {
            theme,
            answers,
            level,
            version,
            format,
            output,
            record,
            user,
            source,
        } => {
            commands::score::execute(
                theme, answers, level, version, format, output, record, user, source,
            )
            .await
        }
        Commands::History {
            user,
            theme,
            format,
            config,
        } => commands::history::execute(user, theme, format, config),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
