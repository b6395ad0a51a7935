mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::config::ConfigSubcommand;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "driftwatch",
    about = "Ingest, train, score and deploy a churn classifier, and redeploy it when it drifts",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: walk upward for config.yaml, else the current directory)
    #[arg(long, global = true, env = "DRIFTWATCH_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write config.yaml and create the project folders
    Init,

    /// Merge every source CSV into the consolidated dataset and manifest
    Ingest,

    /// Fit the classifier on the consolidated dataset and write it to staging
    Train,

    /// Score the staging model on the test dataset and record the F1
    Score,

    /// Promote the staging model, score and manifest into production
    Deploy,

    /// Run the drift check and redeploy when the production model has drifted
    Fullprocess,

    /// Timings, missing data, summary statistics and outdated packages
    Diagnostics,

    /// Confusion matrix of the production model on the test dataset
    Report,

    /// Inspect the project configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },

    /// Serve predictions and diagnostics over HTTP
    Serve {
        /// Port to listen on (default: server.port from config.yaml)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Call every endpoint of a running server and record the responses
    ApiCalls {
        /// Base URL of the server (default: http://127.0.0.1:<server.port>)
        #[arg(long)]
        url: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Serve { .. } | Commands::Fullprocess => tracing::Level::INFO,
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
        Commands::Init => cmd::init::run(&root, cli.json),
        Commands::Ingest => cmd::ingest::run(&root, cli.json),
        Commands::Train => cmd::train::run(&root, cli.json),
        Commands::Score => cmd::score::run(&root, cli.json),
        Commands::Deploy => cmd::deploy::run(&root, cli.json),
        Commands::Fullprocess => cmd::fullprocess::run(&root, cli.json),
        Commands::Diagnostics => cmd::diagnostics::run(&root, cli.json),
        Commands::Report => cmd::report::run(&root, cli.json),
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, cli.json),
        Commands::Serve { port } => cmd::serve::run(&root, port),
        Commands::ApiCalls { url } => cmd::api_calls::run(&root, url.as_deref(), cli.json),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
