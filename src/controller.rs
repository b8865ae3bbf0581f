use std::sync::Arc;

use tokio::task::JoinSet;

use crate::api::DealSource;
use crate::config::{ClientConfig, DetailMode};
use crate::filter::{SortKey, StoreFilter};
use crate::model::{Deal, StoreDirectory};
use crate::state::{self, Event, Mode, ViewState};
use crate::view::{self, DetailView, PageView};

pub const LOAD_DEALS_FAILED: &str = "Could not load deals.";
pub const SEARCH_FAILED: &str = "Could not search games.";
pub const FILTER_FAILED: &str = "Could not filter by store.";
pub const DETAIL_FAILED: &str = "Could not load game details.";

/// Drives browsing and searching against a [`DealSource`]. API failures
/// never escape: they are logged and turned into the view's error message.
pub struct Controller<S> {
    source: Arc<S>,
    config: ClientConfig,
    state: ViewState,
    stores: StoreDirectory,
}

impl<S: DealSource + 'static> Controller<S> {
    pub fn new(source: S, config: ClientConfig) -> Self {
        Self {
            source: Arc::new(source),
            config,
            state: ViewState::default(),
            stores: StoreDirectory::default(),
        }
    }

    /// Preset the store filter and sort without fetching anything.
    pub fn with_filters(mut self, store: StoreFilter, sort: SortKey) -> Self {
        self.apply(Event::StoreSelected(store));
        self.apply(Event::SortSelected(sort));
        self
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn stores(&self) -> &StoreDirectory {
        &self.stores
    }

    pub fn view(&self) -> PageView {
        view::page_view(&self.state, &self.stores)
    }

    fn apply(&mut self, event: Event) {
        let state = std::mem::take(&mut self.state);
        self.state = state::reduce(state, event);
    }

    /// Store names fall back to a generic label when this fails.
    pub async fn load_stores(&mut self) {
        match self.source.stores().await {
            Ok(raw) => {
                self.stores = StoreDirectory::from_raw(raw);
                tracing::debug!(
                    stores = self.stores.entries(true).len(),
                    "loaded store directory"
                );
            }
            Err(err) => {
                tracing::warn!(error = %err, "store list unavailable; using generic store labels");
            }
        }
    }

    pub async fn start(&mut self) {
        self.start_at(0).await;
    }

    /// Load stores, then browse from `page` with an empty list.
    pub async fn start_at(&mut self, page: u32) {
        self.load_stores().await;
        self.apply(Event::Reset);
        self.load_page(page, LOAD_DEALS_FAILED).await;
    }

    async fn load_page(&mut self, page: u32, failure_message: &str) {
        let store_id = self.state.store_filter.store_id().cloned();
        tracing::info!(page, store = ?store_id, "load deals page");
        match self
            .source
            .deals_page(page, self.config.page_size, store_id.as_ref())
            .await
        {
            Ok(raw) => {
                let records = raw
                    .into_iter()
                    .filter_map(Deal::from_raw_deal)
                    .collect::<Vec<_>>();
                tracing::debug!(page, records = records.len(), "deals page loaded");
                self.apply(Event::PageLoaded { page, records });
            }
            Err(err) => {
                tracing::warn!(error = %err, page, "deals page failed");
                self.apply(Event::Failed {
                    message: failure_message.to_owned(),
                });
            }
        }
    }

    /// Returns false when there is no further page to load.
    pub async fn load_more(&mut self) -> bool {
        let Some(page) = state::next_page(&self.state) else {
            tracing::debug!(mode = ?self.state.mode, "load more ignored");
            return false;
        };
        self.load_page(page, LOAD_DEALS_FAILED).await;
        true
    }

    pub async fn search(&mut self, term: &str) {
        let term = term.trim();
        if term.is_empty() {
            self.reset().await;
            return;
        }

        tracing::info!(term, "search games");
        let games = match self
            .source
            .search_games(term, self.config.search_limit)
            .await
        {
            Ok(games) => games,
            Err(err) => {
                tracing::warn!(error = %err, term, "search failed");
                self.apply(Event::Failed {
                    message: SEARCH_FAILED.to_owned(),
                });
                return;
            }
        };

        let records = games
            .into_iter()
            .take(self.config.search_limit as usize)
            .filter_map(Deal::from_raw_game)
            .collect::<Vec<_>>();
        let records = self.enrich(records).await;
        self.apply(Event::SearchLoaded {
            term: term.to_owned(),
            records,
        });
    }

    /// One deal lookup per search hit that has a cheapest deal id. A failed
    /// lookup leaves that record as the search returned it.
    async fn enrich(&self, records: Vec<Deal>) -> Vec<Deal> {
        let concurrency = self.config.enrich_concurrency.max(1);
        let mut results = records.clone();
        let mut pending = records
            .into_iter()
            .enumerate()
            .filter_map(|(index, deal)| deal.deal_id.clone().map(|id| (index, id, deal)));
        let mut join_set = JoinSet::new();
        let mut failed = 0usize;

        loop {
            while join_set.len() < concurrency {
                let Some((index, deal_id, deal)) = pending.next() else {
                    break;
                };
                let source = Arc::clone(&self.source);
                join_set.spawn(async move {
                    let outcome = source
                        .deal_detail(&deal_id)
                        .await
                        .map(|detail| deal.with_detail(&detail));
                    (index, deal_id, outcome)
                });
            }

            let Some(joined) = join_set.join_next().await else {
                break;
            };
            match joined {
                Ok((index, _, Ok(enriched))) => results[index] = enriched,
                Ok((index, deal_id, Err(err))) => {
                    failed += 1;
                    tracing::warn!(
                        index,
                        deal_id = %deal_id,
                        error = %err,
                        "deal lookup failed; keeping search data"
                    );
                }
                Err(err) => {
                    failed += 1;
                    tracing::warn!(error = %err, "deal lookup task failed");
                }
            }
        }

        tracing::debug!(records = results.len(), failed, "search results enriched");
        results
    }

    pub async fn reset(&mut self) {
        tracing::info!("reset to browsing");
        self.apply(Event::Reset);
        self.load_page(0, LOAD_DEALS_FAILED).await;
    }

    /// Browsing re-fetches from page 0 for the store; searching only
    /// narrows what is already loaded.
    pub async fn select_store(&mut self, filter: StoreFilter) {
        self.apply(Event::ClearError);
        if let StoreFilter::Only(id) = &filter
            && !self.stores.is_empty()
            && !self.stores.contains(id)
        {
            tracing::warn!(store = %id, "store id not in store directory");
        }
        self.apply(Event::StoreSelected(filter));
        if self.state.mode == Mode::Browsing {
            // Pages of the previous store must not outlive a failed refetch.
            self.apply(Event::Reset);
            self.load_page(0, FILTER_FAILED).await;
        }
    }

    pub fn select_sort(&mut self, sort: SortKey) {
        self.apply(Event::ClearError);
        self.apply(Event::SortSelected(sort));
    }

    /// `position` is the 1-based card position in the current view.
    pub async fn open_detail(&mut self, position: usize) -> Option<DetailView> {
        self.apply(Event::ClearError);
        let visible = state::visible(&self.state);
        let Some(deal) = position.checked_sub(1).and_then(|idx| visible.get(idx)) else {
            self.apply(Event::Failed {
                message: format!("No card at position {position}."),
            });
            return None;
        };

        let detail = match (self.config.detail_mode, deal.deal_id.as_deref()) {
            (DetailMode::Fetch, Some(deal_id)) => match self.source.deal_detail(deal_id).await {
                Ok(detail) => Some(detail),
                Err(err) => {
                    tracing::warn!(error = %err, deal_id, "deal detail failed; showing loaded data");
                    self.apply(Event::Failed {
                        message: DETAIL_FAILED.to_owned(),
                    });
                    None
                }
            },
            _ => None,
        };

        Some(view::detail_view(deal, detail.as_ref(), &self.stores))
    }
}
