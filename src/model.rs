use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::api::{DealDetail, RawDeal, RawGame, RawStore};

pub const FALLBACK_STORE_LABEL: &str = "Store";
pub const REDIRECT_BASE: &str = "https://www.cheapshark.com/redirect?dealID=";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoreId(String);

impl StoreId {
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(raw.as_ref().trim().to_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn sort_key(&self) -> (u64, &str) {
        (self.0.parse().unwrap_or(u64::MAX), self.0.as_str())
    }
}

impl fmt::Display for StoreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A normalized deal or game record, as held in the view state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deal {
    pub id: String,
    pub title: String,
    pub thumbnail: String,
    pub normal_price: Option<f64>,
    pub sale_price: Option<f64>,
    pub savings: Option<f64>,
    pub store_id: Option<StoreId>,
    pub deal_id: Option<String>,
    pub deal_link: String,
    pub game_id: Option<String>,
    pub metacritic_score: Option<u32>,
    pub steam_rating: Option<String>,
    /// Unix seconds.
    pub release_date: Option<i64>,
}

impl Deal {
    /// Returns `None` when the entry carries neither a deal id nor a game id.
    pub fn from_raw_deal(raw: RawDeal) -> Option<Self> {
        let deal_id = non_empty(raw.deal_id);
        let game_id = non_empty(raw.game_id);
        let id = deal_id.clone().or_else(|| game_id.clone())?;

        let normal_price = parse_price(raw.normal_price.as_deref());
        let sale_price = parse_price(raw.sale_price.as_deref());
        let savings = parse_price(raw.savings.as_deref())
            .or_else(|| savings_percent(normal_price, sale_price));

        Some(Self {
            id,
            title: raw.title.trim().to_owned(),
            thumbnail: raw.thumb.unwrap_or_default(),
            normal_price,
            sale_price,
            savings,
            store_id: non_empty(raw.store_id).map(StoreId::new),
            deal_link: deal_id.as_deref().map(deal_link).unwrap_or_default(),
            deal_id,
            game_id,
            metacritic_score: raw
                .metacritic_score
                .as_deref()
                .and_then(|s| s.trim().parse::<u32>().ok())
                .filter(|score| *score > 0),
            steam_rating: non_empty(raw.steam_rating_text),
            release_date: raw.release_date.filter(|ts| *ts > 0),
        })
    }

    /// A search hit. Without a cheapest deal id there is no offer to price.
    pub fn from_raw_game(raw: RawGame) -> Option<Self> {
        let game_id = non_empty(raw.game_id);
        let deal_id = non_empty(raw.cheapest_deal_id);
        let id = match (&deal_id, &game_id) {
            (Some(deal_id), _) => deal_id.clone(),
            (None, Some(game_id)) => format!("game:{game_id}"),
            (None, None) => return None,
        };
        let sale_price = if deal_id.is_some() {
            parse_price(raw.cheapest.as_deref())
        } else {
            None
        };

        Some(Self {
            id,
            title: raw.external.trim().to_owned(),
            thumbnail: raw.thumb.unwrap_or_default(),
            normal_price: None,
            sale_price,
            savings: None,
            store_id: None,
            deal_link: deal_id.as_deref().map(deal_link).unwrap_or_default(),
            deal_id,
            game_id,
            metacritic_score: None,
            steam_rating: None,
            release_date: None,
        })
    }

    /// A record built only from a deal lookup.
    pub fn from_detail(deal_id: &str, detail: &DealDetail) -> Self {
        let deal_id = deal_id.trim().to_owned();
        Self {
            id: deal_id.clone(),
            title: String::new(),
            thumbnail: String::new(),
            normal_price: None,
            sale_price: None,
            savings: None,
            store_id: None,
            deal_link: deal_link(&deal_id),
            deal_id: Some(deal_id),
            game_id: None,
            metacritic_score: None,
            steam_rating: None,
            release_date: None,
        }
        .with_detail(detail)
    }

    /// Overlay the fields a deal lookup knows better than a search hit.
    pub fn with_detail(mut self, detail: &DealDetail) -> Self {
        let info = &detail.game_info;
        if !info.name.trim().is_empty() {
            self.title = info.name.trim().to_owned();
        }
        if let Some(thumb) = info.thumb.as_deref().filter(|t| !t.is_empty()) {
            self.thumbnail = thumb.to_owned();
        }
        if let Some(sale) = parse_price(info.sale_price.as_deref()) {
            self.sale_price = Some(sale);
        }
        if let Some(retail) = parse_price(info.retail_price.as_deref()) {
            self.normal_price = Some(retail);
        }
        self.savings = savings_percent(self.normal_price, self.sale_price).or(self.savings);
        if let Some(store_id) = info.store_id.as_deref().filter(|s| !s.trim().is_empty()) {
            self.store_id = Some(StoreId::new(store_id));
        }
        if self.game_id.is_none() {
            self.game_id = non_empty(info.game_id.clone());
        }
        if let Some(score) = info
            .metacritic_score
            .as_deref()
            .and_then(|s| s.trim().parse::<u32>().ok())
            .filter(|score| *score > 0)
        {
            self.metacritic_score = Some(score);
        }
        if let Some(rating) = non_empty(info.steam_rating_text.clone()) {
            self.steam_rating = Some(rating);
        }
        if let Some(date) = info.release_date.filter(|ts| *ts > 0) {
            self.release_date = Some(date);
        }
        self
    }
}

/// Wire prices are decimal strings; negatives and garbage become `None`.
pub fn parse_price(raw: Option<&str>) -> Option<f64> {
    let value: f64 = raw?.trim().parse().ok()?;
    (value.is_finite() && value >= 0.0).then_some(value)
}

pub fn savings_percent(normal: Option<f64>, sale: Option<f64>) -> Option<f64> {
    let (normal, sale) = (normal?, sale?);
    if normal <= 0.0 || sale > normal {
        return None;
    }
    Some((normal - sale) / normal * 100.0)
}

pub fn deal_link(deal_id: &str) -> String {
    format!("{REDIRECT_BASE}{deal_id}")
}

/// Keep the first record for every id.
pub fn dedup_by_id(records: Vec<Deal>) -> Vec<Deal> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|record| seen.insert(record.id.clone()))
        .collect()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreEntry {
    pub id: StoreId,
    pub name: String,
    pub active: bool,
}

/// Store id to display name. Filled once, read-only afterward.
#[derive(Debug, Clone, Default)]
pub struct StoreDirectory {
    names: HashMap<StoreId, StoreEntry>,
}

impl StoreDirectory {
    pub fn from_raw(stores: Vec<RawStore>) -> Self {
        let names = stores
            .into_iter()
            .filter(|store| !store.store_id.trim().is_empty())
            .map(|store| {
                let id = StoreId::new(&store.store_id);
                let entry = StoreEntry {
                    id: id.clone(),
                    name: store.store_name.trim().to_owned(),
                    active: store.is_active != 0,
                };
                (id, entry)
            })
            .collect();
        Self { names }
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn name(&self, id: Option<&StoreId>) -> &str {
        id.and_then(|id| self.names.get(id))
            .map(|entry| entry.name.as_str())
            .filter(|name| !name.is_empty())
            .unwrap_or(FALLBACK_STORE_LABEL)
    }

    pub fn contains(&self, id: &StoreId) -> bool {
        self.names.contains_key(id)
    }

    /// Entries ordered by numeric id.
    pub fn entries(&self, include_inactive: bool) -> Vec<&StoreEntry> {
        let mut entries = self
            .names
            .values()
            .filter(|entry| include_inactive || entry.active)
            .collect::<Vec<_>>();
        entries.sort_by(|a, b| a.id.sort_key().cmp(&b.id.sort_key()));
        entries
    }
}
