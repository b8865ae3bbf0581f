#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex, mpsc};
use std::thread;
use std::time::Duration;

use serde_json::{Value, json};

#[derive(Debug, Clone, Default)]
pub struct CheapSharkStubConfig {
    /// Deals by page number; missing pages are empty.
    pub pages: Vec<Vec<Value>>,
    pub fail_deals: bool,
    pub games: Vec<Value>,
    /// Deal detail by decoded deal id; missing ids answer 404.
    pub details: HashMap<String, Value>,
    /// `None` makes `/stores` answer 500.
    pub stores: Option<Vec<Value>>,
    /// Answer deals pages with a 200 and a non-JSON body.
    pub malformed_deals: bool,
}

pub struct CheapSharkStub {
    pub base_url: String,
    requests: Arc<Mutex<Vec<String>>>,
    shutdown_tx: Option<mpsc::Sender<()>>,
    handle: Option<thread::JoinHandle<()>>,
}

impl CheapSharkStub {
    pub fn spawn(config: CheapSharkStubConfig) -> Self {
        let server = tiny_http::Server::http("127.0.0.1:0").expect("start cheapshark stub server");
        let addr = server.server_addr();
        let base_url = format!("http://{addr}/api/1.0");

        let requests = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&requests);
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

        let handle = thread::spawn(move || {
            loop {
                if shutdown_rx.try_recv().is_ok() {
                    break;
                }

                let request = match server.recv_timeout(Duration::from_millis(50)) {
                    Ok(Some(req)) => req,
                    Ok(None) => continue,
                    Err(_) => break,
                };

                let raw_url = request.url().to_string();
                seen.lock().expect("lock request log").push(raw_url.clone());

                let url = url::Url::parse(&format!("http://stub{raw_url}")).expect("parse url");
                let query: HashMap<String, String> = url.query_pairs().into_owned().collect();

                let (status, body) = route(&config, url.path(), &query);
                let header = tiny_http::Header::from_bytes(
                    &b"Content-Type"[..],
                    &b"application/json; charset=utf-8"[..],
                )
                .expect("build header");
                let response = tiny_http::Response::from_string(body)
                    .with_status_code(status)
                    .with_header(header);
                let _ = request.respond(response);
            }
        });

        Self {
            base_url,
            requests,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    /// Raw request targets (path and query) in arrival order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().expect("lock request log").clone()
    }
}

impl Drop for CheapSharkStub {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn route(config: &CheapSharkStubConfig, path: &str, query: &HashMap<String, String>) -> (u16, String) {
    match path {
        "/api/1.0/deals" => {
            if let Some(id) = query.get("id") {
                return match config.details.get(id) {
                    Some(detail) => (200, detail.to_string()),
                    None => (404, json!({ "error": "unknown deal" }).to_string()),
                };
            }
            if config.fail_deals {
                return (500, json!({ "error": "boom" }).to_string());
            }
            if config.malformed_deals {
                return (200, "<html>maintenance</html>".to_owned());
            }
            let page = query
                .get("pageNumber")
                .and_then(|p| p.parse::<usize>().ok())
                .unwrap_or(0);
            let deals = config.pages.get(page).cloned().unwrap_or_default();
            let deals = match query.get("storeID") {
                Some(store) => deals
                    .into_iter()
                    .filter(|deal| deal["storeID"].as_str() == Some(store.as_str()))
                    .collect(),
                None => deals,
            };
            (200, Value::Array(deals).to_string())
        }
        "/api/1.0/games" => (200, Value::Array(config.games.clone()).to_string()),
        "/api/1.0/stores" => match &config.stores {
            Some(stores) => (200, Value::Array(stores.clone()).to_string()),
            None => (500, json!({ "error": "stores down" }).to_string()),
        },
        _ => (404, json!({ "error": "not found" }).to_string()),
    }
}

pub fn deal(id: &str, title: &str, store: &str, sale: &str, normal: &str) -> Value {
    json!({
        "internalName": title.to_uppercase(),
        "title": title,
        "dealID": id,
        "storeID": store,
        "gameID": format!("g-{id}"),
        "salePrice": sale,
        "normalPrice": normal,
        "isOnSale": "1",
        "metacriticScore": "80",
        "steamRatingText": "Very Positive",
        "releaseDate": 1_300_000_000,
        "thumb": format!("https://img.example/{id}.jpg"),
    })
}

pub fn game(game_id: &str, title: &str, cheapest: &str, deal_id: Option<&str>) -> Value {
    let mut value = json!({
        "gameID": game_id,
        "steamAppID": null,
        "cheapest": cheapest,
        "external": title,
        "internalName": title.to_uppercase(),
        "thumb": format!("https://img.example/g{game_id}.jpg"),
    });
    if let Some(deal_id) = deal_id {
        value["cheapestDealID"] = json!(deal_id);
    }
    value
}

pub fn detail(name: &str, store: &str, sale: &str, retail: &str) -> Value {
    json!({
        "gameInfo": {
            "storeID": store,
            "gameID": "1",
            "name": name,
            "steamAppID": null,
            "salePrice": sale,
            "retailPrice": retail,
            "steamRatingText": null,
            "metacriticScore": "0",
            "releaseDate": 0,
            "publisher": "N/A",
            "thumb": "https://img.example/detail.jpg",
        },
        "cheaperStores": [],
        "cheapestPrice": { "price": "1.49", "date": 1_577_836_800 },
    })
}

pub fn stores() -> Vec<Value> {
    vec![
        json!({ "storeID": "1", "storeName": "Steam", "isActive": 1 }),
        json!({ "storeID": "7", "storeName": "GOG", "isActive": 1 }),
        json!({ "storeID": "9", "storeName": "Closed Shop", "isActive": 0 }),
    ]
}

/// Two pages of two deals each, split across stores 1 and 7.
pub fn two_pages() -> Vec<Vec<Value>> {
    vec![
        vec![
            deal("d1", "Portal 2", "1", "1.99", "9.99"),
            deal("d2", "Hades", "7", "12.49", "24.99"),
        ],
        vec![
            deal("d3", "Celeste", "1", "4.99", "19.99"),
            deal("d4", "Outer Wilds", "7", "14.99", "24.99"),
        ],
    ]
}

/// Five "Halo" hits: one without a cheapest deal id, one whose lookup fails.
pub fn halo_config() -> CheapSharkStubConfig {
    let mut details = HashMap::new();
    details.insert(
        "h1=".to_owned(),
        detail("Halo: The Master Chief Collection", "1", "9.99", "39.99"),
    );
    details.insert("h2".to_owned(), detail("Halo Wars", "7", "4.99", "19.99"));
    details.insert("h4".to_owned(), detail("Halo 2", "1", "2.99", "9.99"));
    CheapSharkStubConfig {
        games: vec![
            game("1", "Halo: MCC", "12.00", Some("h1%3D")),
            game("2", "Halo Wars", "6.00", Some("h2")),
            game("3", "Halo Spartan Assault", "7.00", None),
            game("4", "Halo 2", "3.00", Some("h4")),
            game("5", "Halo 3", "8.50", Some("h5")),
        ],
        details,
        stores: Some(stores()),
        ..CheapSharkStubConfig::default()
    }
}
