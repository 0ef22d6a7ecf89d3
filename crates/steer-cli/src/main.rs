mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::rules::RulesSubcommand;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "steer",
    about = "Prompt rule matcher and edit-check hook for AI coding assistants",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .steer/ or .git/)
    #[arg(long, global = true, env = "STEER_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scaffold .steer/rules.yaml in the current project
    Init,

    /// Match the rule set against a prompt and print the augmented prompt
    Augment {
        /// Prompt text (omit to read a JSON context from stdin)
        #[arg(long)]
        prompt: Option<String>,

        /// Edited file, as PATH or PATH=CONTENT (repeatable; only valid
        /// with --prompt, the stdin context carries its own files)
        #[arg(long = "file", value_name = "PATH[=CONTENT]", requires = "prompt")]
        files: Vec<String>,
    },

    /// Inspect and validate the rule set
    Rules {
        #[command(subcommand)]
        subcommand: RulesSubcommand,
    },

    /// Run configured check tools over edited files
    Check {
        /// Edited file path (repeatable; omit to read a JSON context from stdin)
        #[arg(long = "file", value_name = "PATH")]
        files: Vec<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    // Logs go to stderr: stdout carries the augmented prompt and must stay
    // clean for the calling harness.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Init => cmd::init::run(&root),
        Commands::Augment { prompt, files } => {
            cmd::augment::run(&root, prompt.as_deref(), &files, cli.json)
        }
        Commands::Rules { subcommand } => cmd::rules::run(&root, subcommand, cli.json),
        Commands::Check { files } => cmd::check::run(&root, &files, cli.json),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
