use std::io::BufRead;

use anyhow::Context as _;

use crate::api::{CheapSharkClient, DealSource as _};
use crate::cli::{BrowseArgs, Cli, DealsArgs, DetailArgs, SearchArgs, StoresArgs};
use crate::config::ClientConfig;
use crate::controller::{Controller, DETAIL_FAILED};
use crate::model::{Deal, StoreDirectory};
use crate::view::{self, Renderer};

/// Environment first, then global flags on top.
pub fn client_config(cli: &Cli) -> anyhow::Result<ClientConfig> {
    let mut config = ClientConfig::from_env().context("read environment")?;
    if let Some(base_url) = cli.base_url.as_deref() {
        config.base_url = base_url.trim().to_owned();
    }
    if let Some(timeout_secs) = cli.timeout_secs {
        config.timeout_secs = timeout_secs;
    }
    config.validate()?;
    Ok(config)
}

pub async fn deals(
    args: DealsArgs,
    mut config: ClientConfig,
    renderer: &mut dyn Renderer,
) -> anyhow::Result<()> {
    if let Some(page_size) = args.page_size {
        config.page_size = page_size;
    }
    config.validate()?;

    let client = CheapSharkClient::new(&config)?;
    let mut controller = Controller::new(client, config)
        .with_filters(args.store.unwrap_or_default(), args.sort.unwrap_or_default());
    controller.start_at(args.page).await;
    for _ in 1..args.pages.max(1) {
        if controller.view().error.is_some() || !controller.load_more().await {
            break;
        }
    }

    let view = controller.view();
    renderer.page(&view)?;
    if let Some(error) = view.error {
        anyhow::bail!(error);
    }
    Ok(())
}

pub async fn search(
    args: SearchArgs,
    mut config: ClientConfig,
    renderer: &mut dyn Renderer,
) -> anyhow::Result<()> {
    if let Some(limit) = args.limit {
        config.search_limit = limit;
    }
    config.validate()?;

    let client = CheapSharkClient::new(&config)?;
    let mut controller = Controller::new(client, config)
        .with_filters(args.store.unwrap_or_default(), args.sort.unwrap_or_default());
    controller.load_stores().await;
    controller.search(&args.term).await;

    let view = controller.view();
    renderer.page(&view)?;
    if let Some(error) = view.error {
        anyhow::bail!(error);
    }
    Ok(())
}

pub async fn detail(
    args: DetailArgs,
    config: ClientConfig,
    renderer: &mut dyn Renderer,
) -> anyhow::Result<()> {
    let client = CheapSharkClient::new(&config)?;
    let detail = match client.deal_detail(&args.deal_id).await {
        Ok(detail) => detail,
        Err(err) => {
            tracing::warn!(error = %err, deal_id = %args.deal_id, "deal detail failed");
            anyhow::bail!(DETAIL_FAILED);
        }
    };
    let stores = match client.stores().await {
        Ok(raw) => StoreDirectory::from_raw(raw),
        Err(err) => {
            tracing::warn!(error = %err, "store list unavailable; using generic store labels");
            StoreDirectory::default()
        }
    };

    let deal = Deal::from_detail(&args.deal_id, &detail);
    renderer.detail(&view::detail_view(&deal, Some(&detail), &stores))
}

pub async fn stores(
    args: StoresArgs,
    config: ClientConfig,
    renderer: &mut dyn Renderer,
) -> anyhow::Result<()> {
    let client = CheapSharkClient::new(&config)?;
    let stores = match client.stores().await {
        Ok(raw) => StoreDirectory::from_raw(raw),
        Err(err) => {
            tracing::warn!(error = %err, "store list failed");
            anyhow::bail!("Could not load stores.");
        }
    };
    renderer.stores(&stores.entries(args.all))
}

pub async fn browse<R: BufRead>(
    args: BrowseArgs,
    mut config: ClientConfig,
    input: R,
    renderer: &mut dyn Renderer,
) -> anyhow::Result<()> {
    if let Some(page_size) = args.page_size {
        config.page_size = page_size;
    }
    if let Some(detail_mode) = args.detail_mode {
        config.detail_mode = detail_mode;
    }
    config.validate()?;

    let client = CheapSharkClient::new(&config)?;
    let mut controller = Controller::new(client, config);
    controller.start().await;
    crate::session::run(&mut controller, input, renderer)
        .await
        .context("browse session")
}
