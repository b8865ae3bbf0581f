use anyhow::Context as _;
use clap::ValueEnum;

pub const DEFAULT_BASE_URL: &str = "https://www.cheapshark.com/api/1.0";

/// Where the detail view gets its data from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum DetailMode {
    /// Reuse the record already loaded for the card.
    #[default]
    Cached,
    /// Fetch the deal again by id.
    Fetch,
}

impl DetailMode {
    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(Self::Cached);
        }
        <Self as ValueEnum>::from_str(raw, true)
            .map_err(|_| anyhow::anyhow!("unsupported detail mode: {raw}"))
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub page_size: u32,
    pub search_limit: u32,
    pub enrich_concurrency: usize,
    pub detail_mode: DetailMode,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            timeout_secs: 15,
            page_size: 12,
            search_limit: 20,
            enrich_concurrency: 8,
            detail_mode: DetailMode::Cached,
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mut config = Self::default();

        if let Some(base_url) = lookup("DEALBROWSER_BASE_URL") {
            let base_url = base_url.trim().to_owned();
            if base_url.is_empty() {
                anyhow::bail!("DEALBROWSER_BASE_URL is empty");
            }
            config.base_url = base_url;
        }
        if let Some(raw) = lookup("DEALBROWSER_TIMEOUT_SECS") {
            config.timeout_secs = raw
                .trim()
                .parse()
                .with_context(|| format!("invalid DEALBROWSER_TIMEOUT_SECS={raw:?}"))?;
        }
        if let Some(raw) = lookup("DEALBROWSER_PAGE_SIZE") {
            config.page_size = raw
                .trim()
                .parse()
                .with_context(|| format!("invalid DEALBROWSER_PAGE_SIZE={raw:?}"))?;
        }
        if let Some(raw) = lookup("DEALBROWSER_DETAIL_MODE") {
            config.detail_mode = DetailMode::parse(&raw).with_context(|| {
                format!("invalid DEALBROWSER_DETAIL_MODE={raw:?}. expected one of: cached, fetch")
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.page_size == 0 {
            anyhow::bail!("page size must be > 0");
        }
        if self.search_limit == 0 {
            anyhow::bail!("search limit must be > 0");
        }
        if self.timeout_secs == 0 {
            anyhow::bail!("timeout must be > 0");
        }
        Ok(())
    }
}
