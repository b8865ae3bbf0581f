use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::Serialize;

use crate::model::{Deal, StoreId};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreFilter {
    #[default]
    All,
    Only(StoreId),
}

impl StoreFilter {
    pub fn matches(&self, deal: &Deal) -> bool {
        match self {
            Self::All => true,
            Self::Only(id) => deal.store_id.as_ref() == Some(id),
        }
    }

    pub fn store_id(&self) -> Option<&StoreId> {
        match self {
            Self::All => None,
            Self::Only(id) => Some(id),
        }
    }
}

impl FromStr for StoreFilter {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> anyhow::Result<Self> {
        let raw = raw.trim();
        if raw.is_empty() || raw.eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        if !raw.chars().all(|c| c.is_ascii_digit()) {
            anyhow::bail!("store must be a numeric id or `all`: {raw}");
        }
        Ok(Self::Only(StoreId::new(raw)))
    }
}

impl fmt::Display for StoreFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Only(id) => write!(f, "{id}"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    #[default]
    None,
    #[value(alias = "price-asc")]
    SaleAsc,
    #[value(alias = "price-desc")]
    SaleDesc,
    NormalAsc,
    NormalDesc,
}

impl SortKey {
    /// Case-insensitive; `_` works like `-` and `price-*` is an alias of `sale-*`.
    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        let raw = raw.trim().replace('_', "-");
        if raw.is_empty() {
            return Ok(Self::None);
        }
        <Self as ValueEnum>::from_str(&raw, true).map_err(|_| {
            let expected = Self::value_variants()
                .iter()
                .filter_map(|variant| variant.to_possible_value())
                .map(|value| value.get_name().to_owned())
                .collect::<Vec<_>>()
                .join(", ");
            anyhow::anyhow!("unsupported sort key: {raw} (expected {expected})")
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::SaleAsc => "sale-asc",
            Self::SaleDesc => "sale-desc",
            Self::NormalAsc => "normal-asc",
            Self::NormalDesc => "normal-desc",
        }
    }
}

/// Store filter, then a stable price sort. Missing prices rank as zero.
pub fn apply(records: &[Deal], store: &StoreFilter, sort: SortKey) -> Vec<Deal> {
    let mut out = records
        .iter()
        .filter(|deal| store.matches(deal))
        .cloned()
        .collect::<Vec<_>>();

    let price = |deal: &Deal| -> f64 {
        match sort {
            SortKey::SaleAsc | SortKey::SaleDesc => deal.sale_price.unwrap_or(0.0),
            SortKey::NormalAsc | SortKey::NormalDesc => deal.normal_price.unwrap_or(0.0),
            SortKey::None => 0.0,
        }
    };

    match sort {
        SortKey::None => {}
        SortKey::SaleAsc | SortKey::NormalAsc => {
            out.sort_by(|a, b| price(a).total_cmp(&price(b)));
        }
        SortKey::SaleDesc | SortKey::NormalDesc => {
            out.sort_by(|a, b| price(b).total_cmp(&price(a)));
        }
    }
    out
}
