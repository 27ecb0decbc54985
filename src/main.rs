mod cli;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use larder::config::LarderConfig;

#[derive(Parser)]
#[command(name = "larder", version, about = "Recipe-grounded cooking assistant chat")]
struct Cli {
    /// Config file (default: ~/.larder/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the chat web UI
    Serve,
    /// Chat with the assistant in the terminal
    Chat,
    /// Ask a single question and print the answer
    Ask {
        text: String,
        /// Also print the assembled prompt
        #[arg(long)]
        show_prompt: bool,
    },
    /// Import recipes from a JSON file or a directory of .md/.txt files
    Import { path: PathBuf },
    /// Export all recipes as JSON to stdout
    Export,
    /// Show the recipes a query would retrieve
    Search {
        query: String,
        /// Number of results (default: retrieval.max_results)
        #[arg(long)]
        limit: Option<usize>,
    },
    /// List stored recipes
    List,
    /// Show one recipe
    Show { id: String },
    /// Delete one recipe
    Remove { id: String },
    /// Recipe store statistics
    Stats,
    /// Check database, model files and LLM settings
    Doctor,
    /// Delete all recipes
    Reset,
    /// Regenerate all recipe vectors with the configured model
    ReEmbed,
    /// Manage the embedding model
    Model {
        #[command(subcommand)]
        action: ModelAction,
    },
}

#[derive(Subcommand)]
enum ModelAction {
    /// Download the embedding model to ~/.larder/models/
    Download,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => LarderConfig::load_from(path)?,
        None => LarderConfig::load()?,
    };

    // Log to stderr so stdout stays clean for `export` and `ask`.
    let filter = EnvFilter::try_new(&config.server.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Serve => larder::server::serve(config).await?,
        Command::Chat => cli::chat::chat(&config).await?,
        Command::Ask { text, show_prompt } => cli::chat::ask(&config, &text, show_prompt).await?,
        Command::Import { path } => cli::import::import(&config, &path).await?,
        Command::Export => cli::export::export(&config)?,
        Command::Search { query, limit } => cli::search::search(&config, &query, limit).await?,
        Command::List => cli::list::list(&config)?,
        Command::Show { id } => cli::show::show(&config, &id)?,
        Command::Remove { id } => cli::remove::remove(&config, &id)?,
        Command::Stats => cli::stats::stats(&config)?,
        Command::Doctor => cli::doctor::doctor(&config)?,
        Command::Reset => cli::reset::reset(&config)?,
        Command::ReEmbed => cli::re_embed::re_embed(&config).await?,
        Command::Model { action } => match action {
            ModelAction::Download => cli::model_download(&config.embedding).await?,
        },
    }

    Ok(())
}
