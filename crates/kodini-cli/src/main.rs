mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{
    config::ConfigSubcommand, guidance::GuidanceSubcommand, idea::IdeaSubcommand,
    project::ProjectSubcommand, story::StorySubcommand, task::TaskSubcommand,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "kodini",
    about = "Turn an app idea into user stories, tasks, and step-by-step guidance",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .kodini/ or .git/)
    #[arg(long, global = true, env = "KODINI_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    /// User id that owns created projects
    #[arg(long, global = true, env = "KODINI_USER", default_value = "local")]
    user: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize kodini in the current directory
    Init,

    /// Show or validate the configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },

    /// Ask the AI about an idea without storing anything
    Idea {
        #[command(subcommand)]
        subcommand: IdeaSubcommand,
    },

    /// Manage projects
    Project {
        #[command(subcommand)]
        subcommand: ProjectSubcommand,
    },

    /// Manage user stories
    Story {
        #[command(subcommand)]
        subcommand: StorySubcommand,
    },

    /// Manage tasks
    Task {
        #[command(subcommand)]
        subcommand: TaskSubcommand,
    },

    /// Generate and read implementation guidance for a task
    Guidance {
        #[command(subcommand)]
        subcommand: GuidanceSubcommand,
    },

    /// Start the HTTP API
    Ui {
        /// Port to listen on (0 = OS-assigned)
        #[arg(long, default_value = "0")]
        port: u16,

        /// Don't open browser automatically
        #[arg(long)]
        no_open: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Ui { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Init => cmd::init::run(&root),
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, cli.json),
        Commands::Idea { subcommand } => cmd::idea::run(&root, subcommand, cli.json),
        Commands::Project { subcommand } => {
            cmd::project::run(&root, &cli.user, subcommand, cli.json)
        }
        Commands::Story { subcommand } => cmd::story::run(&root, subcommand, cli.json),
        Commands::Task { subcommand } => cmd::task::run(&root, subcommand, cli.json),
        Commands::Guidance { subcommand } => cmd::guidance::run(&root, subcommand, cli.json),
        Commands::Ui { port, no_open } => cmd::ui::run(&root, port, no_open),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
