use clap::Parser;
use pebble_slug::cli::{Cli, Commands};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pebble_slug=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Init { path }) => {
            pebble_slug::cli::init::run(path).await?;
        }
        Some(Commands::Serve { host, port }) => {
            pebble_slug::cli::serve::run(&cli.config, host, port).await?;
        }
        Some(Commands::Migrate) => {
            pebble_slug::cli::migrate::run(&cli.config).await?;
        }
        Some(Commands::Types) => {
            pebble_slug::cli::types::run(&cli.config).await?;
        }
        Some(Commands::Slugify { text, content_type }) => {
            pebble_slug::cli::slugify::run(&cli.config, &text, content_type).await?;
        }
        None => {
            use clap::CommandFactory;
            Cli::command().print_help()?;
        }
    }

    Ok(())
}
