mod commands;
mod render;
mod utils;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use noticeboard_core::config::NoticeBoardConfig;
use noticeboard_core::export::DEFAULT_EXPORT_FILENAME;
use noticeboard_core::source::{AnySource, SourceLocation, StaticSource};
use noticeboard_core::storage::FileStore;
use noticeboard_core::{EventStore, NoticeBoardResult};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use crate::utils::tui;

#[derive(Parser)]
#[command(name = "noticeboard")]
#[command(about = "Browse, search and edit the events on your notice board")]
struct Cli {
    /// Directory your own events are stored in (overrides config)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// URL or file path of the default event list (overrides config)
    #[arg(long, global = true)]
    source: Option<String>,

    /// Print debug logs to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Event fields shared by `new` and `edit`.
#[derive(clap::Args)]
struct FieldArgs {
    #[arg(short, long)]
    title: Option<String>,

    /// Date/time (e.g., "2025-03-20T15:00" or "2025-03-20")
    #[arg(short, long)]
    at: Option<String>,

    #[arg(long)]
    venue: Option<String>,

    /// Comma-separated tags (e.g., "music,outdoor")
    #[arg(long)]
    tags: Option<String>,

    #[arg(short, long)]
    description: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// List events, oldest first
    List {
        /// Only events whose title, description, venue or tags contain this text
        #[arg(short, long)]
        query: Option<String>,

        /// Only events in this month (YYYY-MM)
        #[arg(short, long)]
        month: Option<String>,
    },
    /// List the months that have events
    Months,
    /// Show a single event
    Show { id: String },
    /// Add an event (prompts for anything not given)
    New {
        #[command(flatten)]
        fields: FieldArgs,
    },
    /// Edit an event. Editing a default event saves your own copy of it
    Edit {
        id: String,

        #[command(flatten)]
        fields: FieldArgs,
    },
    /// Delete one of your events
    Delete {
        id: String,

        /// Don't ask for confirmation
        #[arg(short, long)]
        force: bool,
    },
    /// Write all events to a JSON file ("-" for stdout)
    Export {
        #[arg(short, long, default_value = DEFAULT_EXPORT_FILENAME)]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut store = open_store(cli.data_dir, cli.source).await?;

    match cli.command {
        Commands::List { query, month } => {
            commands::list::run(&store, query.as_deref(), month.as_deref())
        }
        Commands::Months => commands::months::run(&store),
        Commands::Show { id } => commands::show::run(&store, &id),
        Commands::New { fields } => commands::new::run(&mut store, fields.into()),
        Commands::Edit { id, fields } => commands::edit::run(&mut store, &id, fields.into()),
        Commands::Delete { id, force } => commands::delete::run(&mut store, &id, force),
        Commands::Export { output } => commands::export::run(&store, &output),
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Open the user collection and load the default event list.
async fn open_store(
    data_dir: Option<PathBuf>,
    source: Option<String>,
) -> Result<EventStore<FileStore>> {
    let mut config = NoticeBoardConfig::load()?;
    if let Some(dir) = data_dir {
        config.data_dir = dir;
    }
    if let Some(source) = source {
        config.base_source = Some(source);
    }

    let storage = FileStore::new(config.data_path());
    debug!(data_dir = %storage.dir().display(), key = %config.storage_key, "opening event store");
    let mut store = EventStore::open(storage, config.storage_key.clone());

    let location = config.source_location();
    let message = loading_message(&location);
    let source = source_or_empty(location.into_source(config.request_timeout()));

    let spinner = tui::create_spinner(message);
    store.load(&source).await;
    spinner.finish_and_clear();

    Ok(store)
}

/// A source that can't even be set up is treated like one that failed to load.
fn source_or_empty(source: NoticeBoardResult<AnySource>) -> AnySource {
    source.unwrap_or_else(|e| {
        warn!(error = %e, "continuing without base events");
        AnySource::Static(StaticSource(Vec::new()))
    })
}

fn loading_message(location: &SourceLocation) -> String {
    match location {
        SourceLocation::Url(url) => format!("Fetching events from {}...", url),
        SourceLocation::Path(path) => format!("Reading events from {}...", path.display()),
        SourceLocation::Bundled => "Loading events...".to_string(),
    }
}

impl From<FieldArgs> for commands::FieldInput {
    fn from(args: FieldArgs) -> Self {
        commands::FieldInput {
            title: args.title,
            datetime: args.at,
            venue: args.venue,
            tags: args.tags,
            description: args.description,
        }
    }
}
