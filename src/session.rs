use std::io::BufRead;

use anyhow::Context as _;

use crate::api::DealSource;
use crate::controller::Controller;
use crate::filter::{SortKey, StoreFilter};
use crate::view::Renderer;

pub const HELP: &str = "\
commands:
  more              load the next page of deals
  search <title>    search games by title (empty title returns to deals)
  reset             back to the deals listing
  store <id|all>    filter by store
  sort <key>        none, sale-asc, sale-desc, normal-asc, normal-desc
  detail <n>        show card n
  stores            list stores
  help              this text
  quit              leave";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    More,
    Search(String),
    Reset,
    Store(StoreFilter),
    Sort(SortKey),
    Detail(usize),
    Stores,
    Help,
    Quit,
}

/// `Ok(None)` for a blank line.
pub fn parse_command(line: &str) -> anyhow::Result<Option<Command>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word.to_ascii_lowercase().as_str() {
        "more" | "m" => Command::More,
        "search" | "s" => Command::Search(rest.to_owned()),
        "reset" => Command::Reset,
        "store" => Command::Store(rest.parse()?),
        "sort" => Command::Sort(SortKey::parse(rest)?),
        "detail" | "d" => {
            let position = rest
                .parse::<usize>()
                .with_context(|| format!("detail needs a card number, got {rest:?}"))?;
            Command::Detail(position)
        }
        "stores" => Command::Stores,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => anyhow::bail!("unknown command: {other} (try `help`)"),
    };
    Ok(Some(command))
}

/// Read commands until `quit` or end of input. The controller should already
/// be started.
pub async fn run<S, R>(
    controller: &mut Controller<S>,
    input: R,
    renderer: &mut dyn Renderer,
) -> anyhow::Result<()>
where
    S: DealSource + 'static,
    R: BufRead,
{
    renderer.page(&controller.view())?;
    renderer.message("Type `help` for commands.")?;

    for line in input.lines() {
        let line = line.context("read command")?;
        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(err) => {
                renderer.message(&format!("{err:#}"))?;
                continue;
            }
        };
        tracing::debug!(?command, "session command");

        match command {
            Command::More => {
                if controller.load_more().await {
                    renderer.page(&controller.view())?;
                } else {
                    renderer.message("No more deals to load.")?;
                }
            }
            Command::Search(term) => {
                controller.search(&term).await;
                renderer.page(&controller.view())?;
            }
            Command::Reset => {
                controller.reset().await;
                renderer.page(&controller.view())?;
            }
            Command::Store(filter) => {
                controller.select_store(filter).await;
                renderer.page(&controller.view())?;
            }
            Command::Sort(sort) => {
                controller.select_sort(sort);
                renderer.page(&controller.view())?;
            }
            Command::Detail(position) => match controller.open_detail(position).await {
                Some(detail) => {
                    renderer.detail(&detail)?;
                    if let Some(error) = controller.view().error {
                        renderer.message(&format!("error: {error}"))?;
                    }
                }
                None => {
                    let error = controller.view().error.unwrap_or_default();
                    renderer.message(&format!("error: {error}"))?;
                }
            },
            Command::Stores => {
                let entries = controller.stores().entries(false);
                if entries.is_empty() {
                    renderer.message("Store list unavailable.")?;
                } else {
                    renderer.stores(&entries)?;
                }
            }
            Command::Help => renderer.message(HELP)?,
            Command::Quit => break,
        }
    }

    Ok(())
}
