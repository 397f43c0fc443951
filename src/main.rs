use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use yt_scribe::app::Application;
use yt_scribe::cli::{Cli, Commands, Prompter};
use yt_scribe::{utils, Config};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let default_filter = if cli.verbose {
        "yt_scribe=debug"
    } else {
        "yt_scribe=warn"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // A missing .env file is fine
    dotenvy::dotenv().ok();

    let config = Config::load().await?;

    if let Some(Commands::Config { show }) = &cli.command {
        if *show {
            config.display();
        } else {
            config.interactive_setup()?;
        }
        return Ok(());
    }

    config.validate()?;

    let missing_deps = utils::check_dependencies(&config.app.ytdlp_path).await;
    if !missing_deps.is_empty() {
        eprintln!("⚠️  Dependency check warnings:");
        for dep in missing_deps {
            eprintln!("   • {}", dep);
        }
        eprintln!("   (Continuing anyway - tools may be available)");
    }

    let mut app = Application::new(config, Prompter::stdio(), cli.quiet)?;

    match cli.command {
        Some(command) => app.run_command(command).await?,
        None => app.run_interactive().await?,
    }

    Ok(())
}
