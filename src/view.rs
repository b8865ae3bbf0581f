use std::io::Write;

use anyhow::Context as _;
use serde::Serialize;

use crate::api::DealDetail;
use crate::model::{self, Deal, StoreDirectory, StoreEntry};
use crate::state::{self, Mode, ViewState};

pub const PRICE_NOT_AVAILABLE: &str = "price not available";
pub const EMPTY_MESSAGE: &str = "No results found.";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardView {
    /// 1-based, as typed by the user to open the detail.
    pub position: usize,
    pub id: String,
    pub title: String,
    pub thumbnail: String,
    pub price_label: String,
    pub normal_price_label: Option<String>,
    pub savings_label: Option<String>,
    pub store_name: String,
    pub deal_link: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageView {
    pub heading: String,
    pub mode: Mode,
    pub store_filter: String,
    pub sort: &'static str,
    pub cards: Vec<CardView>,
    pub empty_message: Option<String>,
    pub error: Option<String>,
    pub show_load_more: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailView {
    pub title: String,
    pub thumbnail: String,
    pub sale_price_label: String,
    pub normal_price_label: String,
    pub savings_label: Option<String>,
    pub store_name: String,
    pub deal_link: String,
    pub metacritic_score: Option<u32>,
    pub steam_rating: Option<String>,
    pub release_date: Option<String>,
    pub cheapest_ever: Option<String>,
    pub cheaper_stores: usize,
}

pub fn price_label(price: Option<f64>) -> String {
    match price {
        Some(price) => format!("${price:.2}"),
        None => PRICE_NOT_AVAILABLE.to_owned(),
    }
}

fn savings_label(savings: Option<f64>) -> Option<String> {
    savings
        .filter(|pct| *pct >= 0.5)
        .map(|pct| format!("-{pct:.0}%"))
}

fn format_date(unix_secs: i64) -> Option<String> {
    chrono::DateTime::from_timestamp(unix_secs, 0).map(|dt| dt.format("%Y-%m-%d").to_string())
}

pub fn card_view(position: usize, deal: &Deal, stores: &StoreDirectory) -> CardView {
    CardView {
        position,
        id: deal.id.clone(),
        title: deal.title.clone(),
        thumbnail: deal.thumbnail.clone(),
        price_label: price_label(deal.sale_price),
        normal_price_label: deal.normal_price.map(|p| price_label(Some(p))),
        savings_label: savings_label(deal.savings),
        store_name: stores.name(deal.store_id.as_ref()).to_owned(),
        deal_link: deal.deal_link.clone(),
    }
}

pub fn page_view(state: &ViewState, stores: &StoreDirectory) -> PageView {
    let visible = state::visible(state);
    let cards = visible
        .iter()
        .enumerate()
        .map(|(idx, deal)| card_view(idx + 1, deal, stores))
        .collect::<Vec<_>>();

    let heading = match state.mode {
        Mode::Browsing => format!("Deals: page {}", u64::from(state.page) + 1),
        Mode::Searching => format!("Results for \"{}\"", state.search_term),
    };
    let empty_message =
        (state.loaded && cards.is_empty() && state.error.is_none()).then(|| EMPTY_MESSAGE.to_owned());

    PageView {
        heading,
        mode: state.mode,
        store_filter: state.store_filter.to_string(),
        sort: state.sort.as_str(),
        cards,
        empty_message,
        error: state.error.clone(),
        show_load_more: state::can_load_more(state),
    }
}

/// Build the detail overlay from the loaded record, overlaid with a fresh
/// lookup when one is available.
pub fn detail_view(deal: &Deal, detail: Option<&DealDetail>, stores: &StoreDirectory) -> DetailView {
    let deal = match detail {
        Some(detail) => deal.clone().with_detail(detail),
        None => deal.clone(),
    };
    let cheapest_ever = detail
        .and_then(|d| d.cheapest_price.as_ref())
        .and_then(|cheapest| {
            let price = model::parse_price(cheapest.price.as_deref())?;
            let label = price_label(Some(price));
            Some(match cheapest.date.and_then(format_date) {
                Some(date) => format!("{label} on {date}"),
                None => label,
            })
        });

    DetailView {
        title: deal.title.clone(),
        thumbnail: deal.thumbnail.clone(),
        sale_price_label: price_label(deal.sale_price),
        normal_price_label: price_label(deal.normal_price),
        savings_label: savings_label(deal.savings),
        store_name: stores.name(deal.store_id.as_ref()).to_owned(),
        deal_link: deal.deal_link.clone(),
        metacritic_score: deal.metacritic_score,
        steam_rating: deal.steam_rating.clone(),
        release_date: deal.release_date.and_then(format_date),
        cheapest_ever,
        cheaper_stores: detail.map(|d| d.cheaper_stores.len()).unwrap_or(0),
    }
}

pub trait Renderer {
    fn page(&mut self, view: &PageView) -> anyhow::Result<()>;
    fn detail(&mut self, view: &DetailView) -> anyhow::Result<()>;
    fn stores(&mut self, entries: &[&StoreEntry]) -> anyhow::Result<()>;
    fn message(&mut self, text: &str) -> anyhow::Result<()>;
}

pub struct TextRenderer<W> {
    out: W,
}

impl<W: Write> TextRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Renderer for TextRenderer<W> {
    fn page(&mut self, view: &PageView) -> anyhow::Result<()> {
        let out = &mut self.out;
        writeln!(
            out,
            "== {} (store: {}, sort: {}) ==",
            view.heading, view.store_filter, view.sort
        )?;
        for card in &view.cards {
            writeln!(out, "[{}] {}", card.position, card.title)?;
            let mut line = format!("    {}", card.price_label);
            match (&card.normal_price_label, &card.savings_label) {
                (Some(normal), Some(savings)) => line.push_str(&format!(" (was {normal}, {savings})")),
                (Some(normal), None) if *normal != card.price_label => {
                    line.push_str(&format!(" (was {normal})"));
                }
                _ => {}
            }
            line.push_str(&format!(" at {}", card.store_name));
            writeln!(out, "{line}")?;
        }
        if let Some(message) = &view.empty_message {
            writeln!(out, "{message}")?;
        }
        if let Some(error) = &view.error {
            writeln!(out, "error: {error}")?;
        }
        if view.show_load_more {
            writeln!(out, "-- more deals available: `more` --")?;
        }
        out.flush().context("flush output")?;
        Ok(())
    }

    fn detail(&mut self, view: &DetailView) -> anyhow::Result<()> {
        let out = &mut self.out;
        writeln!(out, "== {} ==", view.title)?;
        writeln!(out, "Sale price:   {}", view.sale_price_label)?;
        writeln!(out, "Normal price: {}", view.normal_price_label)?;
        if let Some(savings) = &view.savings_label {
            writeln!(out, "Savings:      {savings}")?;
        }
        writeln!(out, "Store:        {}", view.store_name)?;
        if let Some(score) = view.metacritic_score {
            writeln!(out, "Metacritic:   {score}")?;
        }
        if let Some(rating) = &view.steam_rating {
            writeln!(out, "Steam rating: {rating}")?;
        }
        if let Some(date) = &view.release_date {
            writeln!(out, "Released:     {date}")?;
        }
        if let Some(cheapest) = &view.cheapest_ever {
            writeln!(out, "Lowest ever:  {cheapest}")?;
        }
        if view.cheaper_stores > 0 {
            writeln!(out, "Cheaper at {} other store(s)", view.cheaper_stores)?;
        }
        if !view.thumbnail.is_empty() {
            writeln!(out, "Image:        {}", view.thumbnail)?;
        }
        if !view.deal_link.is_empty() {
            writeln!(out, "Link:         {}", view.deal_link)?;
        }
        out.flush().context("flush output")?;
        Ok(())
    }

    fn stores(&mut self, entries: &[&StoreEntry]) -> anyhow::Result<()> {
        for entry in entries {
            let suffix = if entry.active { "" } else { " (inactive)" };
            writeln!(self.out, "{:>4}  {}{suffix}", entry.id.as_str(), entry.name)?;
        }
        self.out.flush().context("flush output")?;
        Ok(())
    }

    fn message(&mut self, text: &str) -> anyhow::Result<()> {
        writeln!(self.out, "{text}")?;
        self.out.flush().context("flush output")?;
        Ok(())
    }
}

/// One JSON document per line.
pub struct JsonRenderer<W> {
    out: W,
}

impl<W: Write> JsonRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    fn write_value<T: Serialize + ?Sized>(&mut self, value: &T) -> anyhow::Result<()> {
        serde_json::to_writer(&mut self.out, value).context("serialize view")?;
        self.out.write_all(b"\n").context("write newline")?;
        self.out.flush().context("flush output")?;
        Ok(())
    }
}

impl<W: Write> Renderer for JsonRenderer<W> {
    fn page(&mut self, view: &PageView) -> anyhow::Result<()> {
        self.write_value(view)
    }

    fn detail(&mut self, view: &DetailView) -> anyhow::Result<()> {
        self.write_value(view)
    }

    fn stores(&mut self, entries: &[&StoreEntry]) -> anyhow::Result<()> {
        self.write_value(entries)
    }

    fn message(&mut self, text: &str) -> anyhow::Result<()> {
        self.write_value(&serde_json::json!({ "message": text }))
    }
}
