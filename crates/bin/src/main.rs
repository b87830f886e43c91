mod backend;
mod cli;
mod commands;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // The server logs at info, one-shot commands stay quiet unless RUST_LOG says otherwise
    let directive = match cli.command {
        None | Some(Commands::Serve(_)) => "vitrina=info",
        Some(_) => "vitrina=warn",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(directive.parse()?))
        .with_writer(std::io::stderr)
        .init();

    let format = cli.format;
    match cli.command {
        Some(Commands::Serve(args)) => commands::serve::run(&args).await,
        Some(Commands::Health(args)) => commands::health::run(&args).await,
        Some(Commands::List(args)) => commands::items::list(&args, format).await,
        Some(Commands::Add(args)) => commands::items::add(&args, format).await,
        Some(Commands::Swap(args)) => commands::items::swap(&args, format).await,
        Some(Commands::Remove(args)) => commands::items::remove(&args, format).await,
        Some(Commands::Toggle(args)) => commands::items::toggle(&args, format).await,
        None => commands::serve::run(&cli::ServeArgs::from_env()).await,
    }
}
