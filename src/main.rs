use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use edutor::cli;
use edutor::config::EdutorConfig;
use edutor::index::types::ContentClass;
use edutor::mailbox::Exchange;
use edutor::server;

#[derive(Parser)]
#[command(name = "edutor", version, about = "Retrieval-grounded HTML5 tutoring agent")]
struct Cli {
    /// Config file (default: ~/.edutor/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the agent side only: answer messages arriving in the user mailbox
    Agent,
    /// Chat with the agent from the terminal (the agent must be running)
    Chat,
    /// Serve the HTTP chat front end only (the agent must be running)
    Serve,
    /// Run the agent and the HTTP chat front end in one process
    Run,
    /// Query one content index
    Search {
        /// Content class: text, video, image or exercises
        class: ContentClass,
        query: String,
        /// Show the raw top-K candidates, ignoring the similarity threshold
        #[arg(long)]
        raw: bool,
    },
    /// Build or inspect the similarity indexes
    Index {
        #[command(subcommand)]
        action: IndexAction,
    },
    /// Turn raw material into indexable text
    Prepare {
        #[command(subcommand)]
        action: PrepareAction,
    },
    /// Manage the embedding model
    Model {
        #[command(subcommand)]
        action: ModelAction,
    },
    /// Check mailboxes, indexes, model files and API key
    Doctor,
}

#[derive(Subcommand)]
enum IndexAction {
    /// Build indexes from the prepared text files
    Build {
        /// Only this class (default: every class with a source directory)
        #[arg(long)]
        class: Option<ContentClass>,
    },
    /// Show per-class index statistics
    Stats,
}

#[derive(Subcommand)]
enum PrepareAction {
    /// Flatten the exercise bank JSON into text
    Exercises {
        #[arg(long)]
        input: PathBuf,
        /// Default: <sources_root>/<exercises dir>/exercises.txt
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Turn transcription segments into linked paragraphs
    Video {
        #[arg(long)]
        segments: PathBuf,
        /// Default: <sources_root>/<video dir>/video.txt
        #[arg(long)]
        output: Option<PathBuf>,
        /// Lesson video link (default: media.video_url)
        #[arg(long)]
        video_url: Option<String>,
    },
}

#[derive(Subcommand)]
enum ModelAction {
    /// Download the embedding model to the configured cache dir
    Download,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => EdutorConfig::load_from(path)?,
        None => EdutorConfig::load()?,
    };

    // Log to stderr so stdout stays clean for the terminal chat.
    let filter = EnvFilter::try_new(&config.server.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Agent => {
            let exchange = Arc::new(Exchange::open(&config)?);
            let driver = server::setup_driver(&config, exchange)?;
            driver.run().await?;
        }
        Command::Chat => cli::chat::chat(&config).await?,
        Command::Serve => {
            let exchange = Arc::new(Exchange::open(&config)?);
            server::serve_http(&config, exchange).await?;
        }
        Command::Run => server::serve_all(config).await?,
        Command::Search { class, query, raw } => {
            cli::search::search(&config, class, &query, raw).await?;
        }
        Command::Index { action } => match action {
            IndexAction::Build { class } => cli::index::build(&config, class)?,
            IndexAction::Stats => cli::index::stats(&config)?,
        },
        Command::Prepare { action } => match action {
            PrepareAction::Exercises { input, output } => {
                let output = output.unwrap_or_else(|| {
                    config.source_dir(ContentClass::Exercises).join("exercises.txt")
                });
                cli::prepare::exercises(&input, &output)?;
            }
            PrepareAction::Video {
                segments,
                output,
                video_url,
            } => {
                let output = output
                    .unwrap_or_else(|| config.source_dir(ContentClass::Video).join("video.txt"));
                cli::prepare::video(&config, &segments, &output, video_url.as_deref())?;
            }
        },
        Command::Model { action } => match action {
            ModelAction::Download => cli::model_download(&config.embedding).await?,
        },
        Command::Doctor => cli::doctor::doctor(&config)?,
    }

    Ok(())
}
