//! In-memory view state and the pure transitions applied to it.

use serde::Serialize;

use crate::filter::{self, SortKey, StoreFilter};
use crate::model::{self, Deal};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    Browsing,
    Searching,
}

#[derive(Debug, Clone, Default)]
pub struct ViewState {
    pub page: u32,
    pub mode: Mode,
    pub search_term: String,
    pub records: Vec<Deal>,
    pub store_filter: StoreFilter,
    pub sort: SortKey,
    pub error: Option<String>,
    /// The last browse page came back empty.
    pub end_of_listing: bool,
    /// At least one listing or search response has landed.
    pub loaded: bool,
}

#[derive(Debug, Clone)]
pub enum Event {
    /// Back to browsing at page 0; the list is cleared until page 0 lands.
    Reset,
    PageLoaded { page: u32, records: Vec<Deal> },
    SearchLoaded { term: String, records: Vec<Deal> },
    Failed { message: String },
    /// A new user action starts; the previous message no longer applies.
    ClearError,
    StoreSelected(StoreFilter),
    SortSelected(SortKey),
}

pub fn reduce(mut state: ViewState, event: Event) -> ViewState {
    match event {
        Event::Reset => {
            state.mode = Mode::Browsing;
            state.page = 0;
            state.search_term.clear();
            state.records.clear();
            state.end_of_listing = false;
            state.error = None;
        }
        Event::PageLoaded { page, records } => {
            let append = page > 0 && state.mode == Mode::Browsing;
            state.end_of_listing = records.is_empty();
            if append {
                let mut merged = std::mem::take(&mut state.records);
                merged.extend(records);
                state.records = model::dedup_by_id(merged);
            } else {
                state.records = model::dedup_by_id(records);
            }
            state.mode = Mode::Browsing;
            state.page = page;
            state.search_term.clear();
            state.error = None;
            state.loaded = true;
        }
        Event::SearchLoaded { term, records } => {
            state.mode = Mode::Searching;
            state.page = 0;
            state.search_term = term;
            state.records = model::dedup_by_id(records);
            state.end_of_listing = false;
            state.error = None;
            state.loaded = true;
        }
        Event::Failed { message } => {
            state.error = Some(message);
        }
        Event::ClearError => {
            state.error = None;
        }
        Event::StoreSelected(filter) => {
            state.store_filter = filter;
        }
        Event::SortSelected(sort) => {
            state.sort = sort;
        }
    }
    state
}

/// Records after the active store filter and sort.
pub fn visible(state: &ViewState) -> Vec<Deal> {
    filter::apply(&state.records, &state.store_filter, state.sort)
}

/// The listing also ends at the last addressable page.
pub fn can_load_more(state: &ViewState) -> bool {
    state.mode == Mode::Browsing
        && state.loaded
        && !state.records.is_empty()
        && !state.end_of_listing
        && state.page < u32::MAX
}

pub fn next_page(state: &ViewState) -> Option<u32> {
    if can_load_more(state) {
        state.page.checked_add(1)
    } else {
        None
    }
}
