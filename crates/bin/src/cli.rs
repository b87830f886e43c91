//! CLI argument definitions for the Vitrina binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use vitrina::{ItemId, Scope};

use crate::output::OutputFormat;

/// Storage backend type
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Backend {
    /// SQLite database (default, production-ready)
    Sqlite,
    /// PostgreSQL database (for shared deployments)
    Postgres,
    /// In-memory with JSON persistence (for development and ephemeral deployments)
    Inmemory,
}

/// Storefront homepage content service
#[derive(Parser, Debug)]
#[command(name = "vitrina")]
#[command(about = "Vitrina: manually ordered carousel slides and featured products")]
#[command(version)]
pub struct Cli {
    /// Output format for item commands
    #[arg(long, global = true, value_enum, default_value = "human")]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the Vitrina API server
    Serve(ServeArgs),
    /// Check health of a running Vitrina server
    Health(HealthArgs),
    /// List the items of a collection in display order
    List(ListArgs),
    /// Add a slide or featured product to a collection
    Add(AddArgs),
    /// Swap the positions of two items
    Swap(SwapArgs),
    /// Delete an item and close the gap it leaves
    Remove(ItemArgs),
    /// Show or hide an item on the public homepage
    Toggle(ToggleArgs),
}

/// Where items live: a local storage backend
#[derive(clap::Args, Debug, Clone)]
pub struct BackendConfig {
    /// Storage backend to use
    #[arg(short, long, default_value = "sqlite", env = "VITRINA_BACKEND")]
    pub backend: Backend,

    /// Data directory for storage files.
    /// For SQLite: stores vitrina.db
    /// For InMemory: stores vitrina.json
    #[arg(short = 'D', long, env = "VITRINA_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// PostgreSQL connection URL (required when backend=postgres)
    #[arg(long, env = "VITRINA_POSTGRES_URL")]
    pub postgres_url: Option<String>,
}

/// Target of an item command: a running server, or a local backend
#[derive(clap::Args, Debug, Clone)]
pub struct TargetArgs {
    /// Base URL of a running server; when set, the local backend options are ignored
    #[arg(long, env = "VITRINA_URL")]
    pub url: Option<String>,

    #[command(flatten)]
    pub backend_config: BackendConfig,
}

/// Arguments for the serve command
#[derive(clap::Args, Debug)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(short, long, default_value_t = 3000, env = "VITRINA_PORT")]
    pub port: u16,

    /// Bind address
    #[arg(long, default_value = "0.0.0.0", env = "VITRINA_HOST")]
    pub host: String,

    #[command(flatten)]
    pub backend_config: BackendConfig,
}

impl ServeArgs {
    /// Settings for a bare `vitrina` invocation: environment variables, then defaults.
    pub fn from_env() -> Self {
        #[derive(Parser)]
        struct Bare {
            #[command(flatten)]
            args: ServeArgs,
        }
        Bare::parse_from(["vitrina"]).args
    }
}

/// Arguments for the health command
#[derive(clap::Args, Debug)]
pub struct HealthArgs {
    /// Base URL of the server to check
    #[arg(long, default_value = "http://127.0.0.1:3000", env = "VITRINA_URL")]
    pub url: String,

    /// Timeout in seconds
    #[arg(short, long, default_value_t = 5)]
    pub timeout: u64,
}

/// Arguments for the list command
#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Collection to list (carousel or products)
    pub scope: Scope,

    /// Only items shown on the public homepage
    #[arg(long)]
    pub public: bool,

    #[command(flatten)]
    pub target: TargetArgs,
}

/// Arguments for the add command
#[derive(clap::Args, Debug)]
pub struct AddArgs {
    /// Collection to add to (carousel or products)
    pub scope: Scope,

    /// Catalog product to feature (products only)
    #[arg(long, conflicts_with_all = ["title", "image_url", "image_mobile_url"])]
    pub product_id: Option<i64>,

    /// Slide title (carousel only)
    #[arg(long)]
    pub title: Option<String>,

    /// Desktop image reference (carousel only)
    #[arg(long)]
    pub image_url: Option<String>,

    /// Mobile image reference (carousel only)
    #[arg(long)]
    pub image_mobile_url: Option<String>,

    /// Explicit position; appended after the last item when omitted
    #[arg(long)]
    pub order: Option<u32>,

    #[command(flatten)]
    pub target: TargetArgs,
}

/// Arguments for the swap command
#[derive(clap::Args, Debug)]
pub struct SwapArgs {
    /// Collection holding both items
    pub scope: Scope,

    /// Item being moved
    pub dragged: ItemId,

    /// Item whose position it takes
    pub target_id: ItemId,

    #[command(flatten)]
    pub target: TargetArgs,
}

/// Arguments naming a single item
#[derive(clap::Args, Debug)]
pub struct ItemArgs {
    /// Collection holding the item
    pub scope: Scope,

    /// Item id
    pub id: ItemId,

    #[command(flatten)]
    pub target: TargetArgs,
}

/// Arguments for the toggle command
#[derive(clap::Args, Debug)]
pub struct ToggleArgs {
    /// Collection holding the item
    pub scope: Scope,

    /// Item id
    pub id: ItemId,

    /// New visibility (true shows the item, false hides it)
    #[arg(action = clap::ArgAction::Set)]
    pub active: bool,

    #[command(flatten)]
    pub target: TargetArgs,
}
