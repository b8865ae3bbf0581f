use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser as _;

use dealbrowser::view::{JsonRenderer, Renderer, TextRenderer};

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(err) = try_main().await {
        eprintln!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

async fn try_main() -> anyhow::Result<()> {
    dealbrowser::logging::init().context("init logging")?;

    let cli = dealbrowser::cli::Cli::parse();
    tracing::debug!(?cli, "parsed cli");

    let config = dealbrowser::commands::client_config(&cli).context("load configuration")?;
    tracing::debug!(?config, "resolved configuration");

    let mut renderer: Box<dyn Renderer> = if cli.json {
        Box::new(JsonRenderer::new(std::io::stdout()))
    } else {
        Box::new(TextRenderer::new(std::io::stdout()))
    };

    match cli.command {
        dealbrowser::cli::Command::Deals(args) => {
            dealbrowser::commands::deals(args, config, renderer.as_mut()).await?;
        }
        dealbrowser::cli::Command::Search(args) => {
            dealbrowser::commands::search(args, config, renderer.as_mut()).await?;
        }
        dealbrowser::cli::Command::Detail(args) => {
            dealbrowser::commands::detail(args, config, renderer.as_mut())
                .await
                .context("detail")?;
        }
        dealbrowser::cli::Command::Stores(args) => {
            dealbrowser::commands::stores(args, config, renderer.as_mut())
                .await
                .context("stores")?;
        }
        dealbrowser::cli::Command::Browse(args) => {
            let stdin = std::io::stdin();
            dealbrowser::commands::browse(args, config, stdin.lock(), renderer.as_mut()).await?;
        }
    }

    Ok(())
}
