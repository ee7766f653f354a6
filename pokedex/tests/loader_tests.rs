mod common;

use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;

use common::{
    chain_body, chain_url, client, detail_url, list_body, list_url, pokemon_body, species_body,
    species_url, MockTransport,
};
use pokedex::error::{FetchError, LoadError};
use pokedex::state::{EvolutionChain, ListEntry};

#[tokio::test(start_paused = true)]
async fn test_list_is_parsed_in_order_and_cached() {
    let transport = MockTransport::new();
    let url = list_url("pokemon", 151);
    transport.respond(
        &url,
        list_body("pokemon", &[("1", "bulbasaur"), ("2", "ivysaur"), ("3", "venusaur")]),
    );
    let client = client(&transport);

    let entries = client.fetch_list("pokemon").await.unwrap();
    let again = client.fetch_list("pokemon").await.unwrap();

    assert_eq!(
        entries.iter().map(|e| e.id.as_str()).collect::<Vec<_>>(),
        vec!["1", "2", "3"]
    );
    assert_eq!(entries[0].name, "bulbasaur");
    assert_eq!(entries, again);
    assert_eq!(transport.calls_to(&url), 1);
    assert_eq!(client.rate_budget().remaining, 99);
}

#[tokio::test(start_paused = true)]
async fn test_list_uses_category_page_size() {
    let transport = MockTransport::new();
    let url = list_url("type", 18);
    transport.respond(&url, list_body("type", &[("1", "normal"), ("10", "fire")]));
    let client = client(&transport);

    let entries = client.fetch_list("type").await.unwrap();

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[1].id, "10");
}

#[tokio::test(start_paused = true)]
async fn test_entries_without_id_are_dropped() {
    let transport = MockTransport::new();
    let url = list_url("version", 30);
    transport.respond(
        &url,
        json!({ "results": [
            { "name": "red", "url": format!("{}/version/1/", common::BASE) },
            { "name": "broken", "url": "" }
        ] }),
    );
    let client = client(&transport);

    let entries = client.fetch_list("version").await.unwrap();

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].name, "red");
}

#[tokio::test(start_paused = true)]
async fn test_unknown_category_fails_without_network() {
    let transport = MockTransport::new();
    let client = client(&transport);

    let list = client.fetch_list("berry").await;
    let detail = client.fetch_detail("berry", "1").await;

    assert_eq!(list, Err(LoadError::UnknownCategory("berry".into())));
    assert_eq!(detail, Err(LoadError::UnknownCategory("berry".into())));
    assert_eq!(transport.total_calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_list_failure_surfaces_after_retries() {
    let transport = MockTransport::new();
    let url = list_url("pokemon", 151);
    transport.fail(&url, FetchError::Status(500));
    let client = client(&transport);

    let result = client.fetch_list("pokemon").await;

    assert_eq!(result, Err(LoadError::Fetch(FetchError::Status(500))));
    assert_eq!(transport.calls_to(&url), 3);
    assert_eq!(client.cache_size(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_pokemon_detail_is_enriched_from_species() {
    let transport = MockTransport::new();
    transport.respond(&detail_url("pokemon", "1"), pokemon_body(1, "bulbasaur"));
    transport.respond(&species_url("1"), species_body("1"));
    transport.respond(&chain_url("1"), chain_body());
    let client = client(&transport);

    let detail = client.fetch_detail("pokemon", "1").await.unwrap();

    assert_eq!(detail.category, "pokemon");
    assert!(detail.is_enriched());
    assert_eq!(detail.flavor_text(), Some("Una rara semilla le fue plantada."));
    assert_eq!(detail.genus(), Some("Pokemon Semilla"));
    assert_eq!(
        detail.evolution_chain(),
        Some(&EvolutionChain {
            id: "1".into(),
            stages: vec!["bulbasaur".into(), "ivysaur".into(), "venusaur".into()],
        })
    );
    assert_eq!(detail.types(), vec!["grass", "poison"]);
    assert_eq!(detail.stats().len(), 2);
    assert_eq!(transport.calls_to(&species_url("1")), 1);
}

#[tokio::test(start_paused = true)]
async fn test_english_is_used_when_spanish_is_missing() {
    let transport = MockTransport::new();
    transport.respond(&detail_url("pokemon", "1"), pokemon_body(1, "bulbasaur"));
    transport.respond(
        &species_url("1"),
        json!({
            "flavor_text_entries": [
                { "flavor_text": "A strange seed.", "language": { "name": "en" } },
                { "flavor_text": "Une graine.", "language": { "name": "fr" } }
            ],
            "genera": [{ "genus": "Seed Pokemon", "language": { "name": "en" } }],
            "evolution_chain": null
        }),
    );
    let client = client(&transport);

    let detail = client.fetch_detail("pokemon", "1").await.unwrap();

    assert_eq!(detail.flavor_text(), Some("A strange seed."));
    assert_eq!(detail.genus(), Some("Seed Pokemon"));
    assert_eq!(detail.evolution_chain(), None);
}

#[tokio::test(start_paused = true)]
async fn test_species_failure_degrades_detail() {
    let transport = MockTransport::new();
    transport.respond(&detail_url("pokemon", "1"), pokemon_body(1, "bulbasaur"));
    transport.fail(&species_url("1"), FetchError::Status(500));
    let client = client(&transport);

    let detail = client.fetch_detail("pokemon", "1").await.unwrap();

    assert_eq!(detail.category, "pokemon");
    assert_eq!(detail.name(), Some("bulbasaur"));
    assert!(!detail.is_enriched());
    assert_eq!(detail.flavor_text(), None);
    assert_eq!(detail.genus(), None);
    assert_eq!(detail.evolution_chain(), None);
}

#[tokio::test(start_paused = true)]
async fn test_chain_failure_degrades_detail() {
    let transport = MockTransport::new();
    transport.respond(&detail_url("pokemon", "1"), pokemon_body(1, "bulbasaur"));
    transport.respond(&species_url("1"), species_body("1"));
    transport.fail(&chain_url("1"), FetchError::Transport("reset".into()));
    let client = client(&transport);

    let detail = client.fetch_detail("pokemon", "1").await.unwrap();

    assert!(!detail.is_enriched());
    assert_eq!(transport.calls_to(&chain_url("1")), 3);
}

#[tokio::test(start_paused = true)]
async fn test_primary_detail_failure_is_an_error() {
    let transport = MockTransport::new();
    transport.fail(&detail_url("pokemon", "9"), FetchError::Status(404));
    let client = client(&transport);

    let result = client.fetch_detail("pokemon", "9").await;

    assert_eq!(result, Err(LoadError::Fetch(FetchError::Status(404))));
    assert!(!client.is_detail_cached("pokemon", "9"));
}

#[tokio::test(start_paused = true)]
async fn test_other_categories_are_not_enriched() {
    let transport = MockTransport::new();
    transport.respond(
        &detail_url("type", "10"),
        json!({ "id": 10, "name": "fire", "generation": { "name": "generation-i" } }),
    );
    let client = client(&transport);

    let detail = client.fetch_detail("type", "10").await.unwrap();

    assert_eq!(detail.category, "type");
    assert_eq!(detail.name(), Some("fire"));
    assert!(!detail.is_enriched());
    assert_eq!(transport.total_calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_detail_cache_expires_after_ttl() {
    let transport = MockTransport::new();
    let url = detail_url("version", "1");
    transport.respond(&url, json!({ "id": 1, "name": "red" }));
    let client = client(&transport);

    client.fetch_detail("version", "1").await.unwrap();
    client.fetch_detail("version", "1").await.unwrap();
    assert_eq!(transport.calls_to(&url), 1);

    tokio::time::advance(client.config().cache_ttl + Duration::from_secs(1)).await;
    assert!(!client.is_detail_cached("version", "1"));

    client.fetch_detail("version", "1").await.unwrap();
    assert_eq!(transport.calls_to(&url), 2);
}

fn entries(ids: &[&str]) -> Vec<ListEntry> {
    ids.iter()
        .map(|id| ListEntry {
            id: id.to_string(),
            name: format!("v{id}"),
            url: format!("{}/version/{id}/", common::BASE),
        })
        .collect()
}

#[tokio::test(start_paused = true)]
async fn test_prefetch_warms_next_entry() {
    let transport = MockTransport::new();
    transport.respond(&detail_url("version", "2"), json!({ "id": 2, "name": "blue" }));
    let client = client(&transport);
    let list = entries(&["1", "2", "3"]);

    let handle = client.prefetch_next("version", &list, "1").expect("prefetch spawned");
    handle.await.unwrap();

    assert!(client.is_detail_cached("version", "2"));
    assert!(client.prefetch_next("version", &list, "1").is_none());
}

#[tokio::test(start_paused = true)]
async fn test_prefetch_is_noop_at_end_or_for_missing_entry() {
    let transport = MockTransport::new();
    let client = client(&transport);
    let list = entries(&["1", "2"]);

    assert!(client.prefetch_next("version", &list, "2").is_none());
    assert!(client.prefetch_next("version", &list, "7").is_none());
    assert_eq!(transport.total_calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_prefetch_failure_is_swallowed() {
    let transport = MockTransport::new();
    transport.fail(&detail_url("version", "2"), FetchError::Status(500));
    let client = client(&transport);
    let list = entries(&["1", "2"]);

    let handle = client.prefetch_next("version", &list, "1").expect("prefetch spawned");

    assert!(handle.await.is_ok());
    assert!(!client.is_detail_cached("version", "2"));
}

#[tokio::test(start_paused = true)]
async fn test_rate_budget_recovers_after_window() {
    let transport = MockTransport::new();
    transport.respond(&detail_url("version", "1"), json!({ "id": 1, "name": "red" }));
    let client = client(&transport);

    client.fetch_detail("version", "1").await.unwrap();
    assert_eq!(client.rate_budget().remaining, 99);

    tokio::time::advance(client.config().rate_window + Duration::from_millis(1)).await;

    assert_eq!(client.rate_budget().remaining, 100);
}
