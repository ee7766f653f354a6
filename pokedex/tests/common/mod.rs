//! Scripted transport shared by the integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use pokedex::api::PokeClient;
use pokedex::config::ClientConfig;
use pokedex::error::FetchError;
use pokedex::fetch::{RetryPolicy, Transport};

pub const BASE: &str = "http://mock.test/api/v2";

type Reply = Result<Value, FetchError>;

#[derive(Default)]
struct Route {
    replies: VecDeque<Reply>,
    delay: Option<Duration>,
}

/// Serves canned replies per URL. A route's last reply repeats once the
/// script runs out; unknown URLs answer 404.
#[derive(Default)]
pub struct MockTransport {
    routes: Mutex<HashMap<String, Route>>,
    calls: Mutex<Vec<String>>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, url: &str, body: Value) {
        self.script(url, vec![Ok(body)]);
    }

    pub fn fail(&self, url: &str, error: FetchError) {
        self.script(url, vec![Err(error)]);
    }

    pub fn script(&self, url: &str, replies: Vec<Reply>) {
        let mut routes = self.routes.lock().unwrap();
        routes.entry(url.to_string()).or_default().replies = replies.into();
    }

    /// Holds every reply for `url` back by `delay` (tokio time).
    pub fn delay(&self, url: &str, delay: Duration) {
        let mut routes = self.routes.lock().unwrap();
        routes.entry(url.to_string()).or_default().delay = Some(delay);
    }

    pub fn calls_to(&self, url: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call.as_str() == url)
            .count()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get_json(&self, url: &str) -> Result<Value, FetchError> {
        self.calls.lock().unwrap().push(url.to_string());
        let (reply, delay) = {
            let mut routes = self.routes.lock().unwrap();
            match routes.get_mut(url) {
                Some(route) => {
                    let reply = if route.replies.len() > 1 {
                        route.replies.pop_front()
                    } else {
                        route.replies.front().cloned()
                    };
                    (reply.unwrap_or(Err(FetchError::Status(404))), route.delay)
                }
                None => (Err(FetchError::Status(404)), None),
            }
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        reply
    }
}

pub fn config() -> ClientConfig {
    ClientConfig {
        retry: RetryPolicy {
            max_attempts: 3,
            initial_delay: Duration::from_millis(1000),
        },
        ..ClientConfig::default()
    }
    .with_base_url(BASE)
}

pub fn client(transport: &Arc<MockTransport>) -> PokeClient {
    PokeClient::with_transport(config(), transport.clone())
}

pub fn list_url(category: &str, limit: u32) -> String {
    format!("{BASE}/{category}?limit={limit}&offset=0")
}

pub fn detail_url(category: &str, id: &str) -> String {
    format!("{BASE}/{category}/{id}")
}

pub fn species_url(id: &str) -> String {
    format!("{BASE}/pokemon-species/{id}/")
}

pub fn chain_url(id: &str) -> String {
    format!("{BASE}/evolution-chain/{id}/")
}

pub fn list_body(category: &str, names: &[(&str, &str)]) -> Value {
    let results: Vec<Value> = names
        .iter()
        .map(|(id, name)| json!({ "name": name, "url": format!("{BASE}/{category}/{id}/") }))
        .collect();
    json!({ "count": results.len(), "next": null, "previous": null, "results": results })
}

pub fn pokemon_body(id: u64, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "height": 7,
        "weight": 69,
        "species": { "name": name, "url": species_url(&id.to_string()) },
        "types": [
            { "slot": 1, "type": { "name": "grass", "url": format!("{BASE}/type/12/") } },
            { "slot": 2, "type": { "name": "poison", "url": format!("{BASE}/type/4/") } }
        ],
        "stats": [
            { "base_stat": 45, "effort": 0, "stat": { "name": "hp", "url": "" } },
            { "base_stat": 49, "effort": 0, "stat": { "name": "attack", "url": "" } }
        ],
        "abilities": [
            { "ability": { "name": "overgrow", "url": "" }, "is_hidden": false, "slot": 1 }
        ]
    })
}

pub fn species_body(chain_id: &str) -> Value {
    json!({
        "flavor_text_entries": [
            { "flavor_text": "A strange seed was\nplanted on its\u{000C}back at birth.", "language": { "name": "en" } },
            { "flavor_text": "Una rara semilla\nle fue plantada.", "language": { "name": "es" } }
        ],
        "genera": [
            { "genus": "Seed Pokemon", "language": { "name": "en" } },
            { "genus": "Pokemon Semilla", "language": { "name": "es" } }
        ],
        "evolution_chain": { "url": chain_url(chain_id) }
    })
}

pub fn chain_body() -> Value {
    json!({
        "id": 1,
        "chain": {
            "species": { "name": "bulbasaur", "url": species_url("1") },
            "evolves_to": [{
                "species": { "name": "ivysaur", "url": species_url("2") },
                "evolves_to": [{
                    "species": { "name": "venusaur", "url": species_url("3") },
                    "evolves_to": []
                }]
            }]
        }
    })
}
