use std::borrow::Cow;
use std::time::Duration;

use anyhow::Context as _;
use async_trait::async_trait;
use reqwest::header::{ACCEPT, USER_AGENT};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::model::StoreId;

/// One entry of `GET /deals`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawDeal {
    #[serde(default)]
    pub title: String,
    #[serde(rename = "dealID", default)]
    pub deal_id: Option<String>,
    #[serde(rename = "storeID", default)]
    pub store_id: Option<String>,
    #[serde(rename = "gameID", default)]
    pub game_id: Option<String>,
    #[serde(rename = "salePrice", default)]
    pub sale_price: Option<String>,
    #[serde(rename = "normalPrice", default)]
    pub normal_price: Option<String>,
    #[serde(default)]
    pub savings: Option<String>,
    #[serde(default)]
    pub thumb: Option<String>,
    #[serde(rename = "metacriticScore", default)]
    pub metacritic_score: Option<String>,
    #[serde(rename = "steamRatingText", default)]
    pub steam_rating_text: Option<String>,
    #[serde(rename = "releaseDate", default)]
    pub release_date: Option<i64>,
}

/// One entry of `GET /games?title=`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawGame {
    #[serde(rename = "gameID", default)]
    pub game_id: Option<String>,
    #[serde(default)]
    pub external: String,
    #[serde(default)]
    pub cheapest: Option<String>,
    #[serde(rename = "cheapestDealID", default)]
    pub cheapest_deal_id: Option<String>,
    #[serde(default)]
    pub thumb: Option<String>,
}

/// Payload of `GET /deals?id=`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DealDetail {
    #[serde(rename = "gameInfo")]
    pub game_info: GameInfo,
    #[serde(rename = "cheaperStores", default)]
    pub cheaper_stores: Vec<CheaperStore>,
    #[serde(rename = "cheapestPrice", default)]
    pub cheapest_price: Option<CheapestPrice>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameInfo {
    #[serde(rename = "storeID", default)]
    pub store_id: Option<String>,
    #[serde(rename = "gameID", default)]
    pub game_id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "salePrice", default)]
    pub sale_price: Option<String>,
    #[serde(rename = "retailPrice", default)]
    pub retail_price: Option<String>,
    #[serde(rename = "steamRatingText", default)]
    pub steam_rating_text: Option<String>,
    #[serde(rename = "metacriticScore", default)]
    pub metacritic_score: Option<String>,
    #[serde(rename = "releaseDate", default)]
    pub release_date: Option<i64>,
    #[serde(default)]
    pub publisher: Option<String>,
    #[serde(default)]
    pub thumb: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheaperStore {
    #[serde(rename = "dealID", default)]
    pub deal_id: Option<String>,
    #[serde(rename = "storeID", default)]
    pub store_id: Option<String>,
    #[serde(rename = "salePrice", default)]
    pub sale_price: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheapestPrice {
    #[serde(default)]
    pub price: Option<String>,
    /// Unix seconds.
    #[serde(default)]
    pub date: Option<i64>,
}

/// One entry of `GET /stores`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawStore {
    #[serde(rename = "storeID")]
    pub store_id: String,
    #[serde(rename = "storeName", default)]
    pub store_name: String,
    #[serde(rename = "isActive", default = "default_active")]
    pub is_active: u8,
}

fn default_active() -> u8 {
    1
}

/// Read-only view of the deals service.
#[async_trait]
pub trait DealSource: Send + Sync {
    async fn deals_page(
        &self,
        page: u32,
        page_size: u32,
        store_id: Option<&StoreId>,
    ) -> Result<Vec<RawDeal>, ApiError>;

    async fn search_games(&self, term: &str, limit: u32) -> Result<Vec<RawGame>, ApiError>;

    async fn deal_detail(&self, deal_id: &str) -> Result<DealDetail, ApiError>;

    async fn stores(&self) -> Result<Vec<RawStore>, ApiError>;
}

#[derive(Debug, Clone)]
pub struct CheapSharkClient {
    http: reqwest::Client,
    base_url: String,
}

impl CheapSharkClient {
    pub fn new(config: &ClientConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("build http client")?;
        let base_url = config.base_url.trim_end_matches('/').to_owned();
        Url::parse(&base_url).with_context(|| format!("parse base url: {base_url}"))?;
        Ok(Self { http, base_url })
    }

    pub fn endpoint(&self, path: &str, query: &[(&str, &str)]) -> Result<Url, ApiError> {
        let mut url = Url::parse(&format!("{}/{path}", self.base_url))?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    /// Deal ids come back percent-encoded (`...%3D`); decode first so the
    /// query builder does not encode them a second time.
    pub fn deal_detail_url(&self, deal_id: &str) -> Result<Url, ApiError> {
        let deal_id = deal_id.trim();
        let decoded = urlencoding::decode(deal_id).unwrap_or(Cow::Borrowed(deal_id));
        self.endpoint("deals", &[("id", &*decoded)])
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        tracing::debug!(%url, "api request");
        let response = self
            .http
            .get(url.clone())
            .header(USER_AGENT, "dealbrowser/0.1")
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|source| ApiError::Network {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                url: url.to_string(),
                status,
            });
        }

        let raw = response.text().await.map_err(|source| ApiError::Network {
            url: url.to_string(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ApiError::Data {
            url: url.to_string(),
            source,
        })
    }
}

#[async_trait]
impl DealSource for CheapSharkClient {
    async fn deals_page(
        &self,
        page: u32,
        page_size: u32,
        store_id: Option<&StoreId>,
    ) -> Result<Vec<RawDeal>, ApiError> {
        let page = page.to_string();
        let page_size = page_size.to_string();
        let mut query = vec![("pageNumber", page.as_str()), ("pageSize", page_size.as_str())];
        if let Some(store_id) = store_id {
            query.push(("storeID", store_id.as_str()));
        }
        let url = self.endpoint("deals", &query)?;
        self.get_json(url).await
    }

    async fn search_games(&self, term: &str, limit: u32) -> Result<Vec<RawGame>, ApiError> {
        let limit = limit.to_string();
        let url = self.endpoint("games", &[("title", term), ("limit", limit.as_str())])?;
        self.get_json(url).await
    }

    async fn deal_detail(&self, deal_id: &str) -> Result<DealDetail, ApiError> {
        let url = self.deal_detail_url(deal_id)?;
        self.get_json(url).await
    }

    async fn stores(&self) -> Result<Vec<RawStore>, ApiError> {
        let url = self.endpoint("stores", &[])?;
        self.get_json(url).await
    }
}
