use clap::{Args, Parser, Subcommand};

use crate::config::DetailMode;
use crate::filter::{SortKey, StoreFilter};

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    /// API base URL (overrides DEALBROWSER_BASE_URL).
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Request timeout in seconds (overrides DEALBROWSER_TIMEOUT_SECS).
    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,

    /// Print JSON lines instead of text.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List current deals.
    Deals(DealsArgs),
    /// Search games by title.
    Search(SearchArgs),
    /// Show one deal by id.
    Detail(DetailArgs),
    /// List stores.
    Stores(StoresArgs),
    /// Interactive session.
    Browse(BrowseArgs),
}

#[derive(Debug, Args)]
pub struct DealsArgs {
    /// First page to load (0-based).
    #[arg(long, default_value_t = 0)]
    pub page: u32,

    /// Number of consecutive pages to load.
    #[arg(long, default_value_t = 1)]
    pub pages: u32,

    /// Deals per page (overrides DEALBROWSER_PAGE_SIZE).
    #[arg(long)]
    pub page_size: Option<u32>,

    /// Store id, or `all`.
    #[arg(long)]
    pub store: Option<StoreFilter>,

    #[arg(long, value_enum)]
    pub sort: Option<SortKey>,
}

#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Title to search for.
    pub term: String,

    /// Maximum number of results.
    #[arg(long)]
    pub limit: Option<u32>,

    /// Store id, or `all`.
    #[arg(long)]
    pub store: Option<StoreFilter>,

    #[arg(long, value_enum)]
    pub sort: Option<SortKey>,
}

#[derive(Debug, Args)]
pub struct DetailArgs {
    /// Deal id as returned by the deals listing.
    pub deal_id: String,
}

#[derive(Debug, Args)]
pub struct StoresArgs {
    /// Include inactive stores.
    #[arg(long)]
    pub all: bool,
}

#[derive(Debug, Args)]
pub struct BrowseArgs {
    /// Deals per page (overrides DEALBROWSER_PAGE_SIZE).
    #[arg(long)]
    pub page_size: Option<u32>,

    /// Where `detail <n>` reads from (overrides DEALBROWSER_DETAIL_MODE).
    #[arg(long, value_enum)]
    pub detail_mode: Option<DetailMode>,
}
