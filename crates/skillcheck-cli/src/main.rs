//! skillcheck CLI: a terminal shell for the conversational skills quiz.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "skillcheck",
    version,
    about = "Conversational skills quiz graded by an LLM"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Take the quiz interactively (answers are read from stdin, one per line)
    Run {
        /// Question bank TOML file (default: config, then the built-in Excel bank)
        #[arg(long)]
        bank: Option<PathBuf>,

        /// Provider name from the config (e.g. "gemini", "mock")
        #[arg(long)]
        provider: Option<String>,

        /// Model identifier (e.g. "gemini-2.5-flash")
        #[arg(long)]
        model: Option<String>,

        /// Maximum follow-up questions per quiz question
        #[arg(long)]
        max_follow_ups: Option<u32>,

        /// Show a placeholder instead of aborting the turn when the model call fails
        #[arg(long)]
        recover_errors: bool,

        /// Output directory for the session report
        #[arg(long)]
        output: Option<PathBuf>,

        /// Report format: json, markdown, all, none
        #[arg(long, default_value = "json")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate a question bank TOML file
    Validate {
        /// Path to the question bank file
        #[arg(long)]
        bank: PathBuf,
    },

    /// Print the questions of a bank as a table
    Show {
        /// Question bank TOML file (default: the built-in Excel bank)
        #[arg(long)]
        bank: Option<PathBuf>,

        /// Also print the ideal answers
        #[arg(long)]
        answers: bool,
    },

    /// Render a saved JSON session report as Markdown
    Report {
        /// Report JSON file
        #[arg(long)]
        input: PathBuf,
    },

    /// List available models
    ListModels {
        /// Filter to specific provider
        #[arg(long)]
        provider: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create starter config and example question bank
    Init,
}

#[tokio::main]
async fn main() {
    // A missing .env is fine; the key may come from the real environment.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("skillcheck=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            bank,
            provider,
            model,
            max_follow_ups,
            recover_errors,
            output,
            format,
            config,
        } => {
            commands::run::execute(commands::run::RunArgs {
                bank,
                provider,
                model,
                max_follow_ups,
                recover_errors,
                output,
                format,
                config,
            })
            .await
        }
        Commands::Validate { bank } => commands::validate::execute(bank),
        Commands::Show { bank, answers } => commands::show::execute(bank, answers),
        Commands::Report { input } => commands::report::execute(input),
        Commands::ListModels { provider, config } => {
            commands::list_models::execute(provider, config)
        }
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
