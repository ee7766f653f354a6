use std::sync::{Arc, Mutex, MutexGuard};

use futures_util::future::{self, FutureExt};
use serde::Deserialize;
use tokio::task::JoinHandle;

use crate::cache::{self, ResponseCache};
use crate::category::{self, CategoryDescriptor, DetailEnrichment};
use crate::config::ClientConfig;
use crate::error::{FetchError, LoadError};
use crate::fetch::{self, HttpTransport, Transport};
use crate::rate::{RateBudget, RateTracker};
use crate::state::{DetailRecord, EvolutionChain, ListEntry, SpeciesInfo};

const PREFERRED_LANGUAGES: [&str; 2] = ["es", "en"];

#[derive(Clone, Debug, Deserialize)]
struct NamedResource {
    name: String,
    url: String,
}

#[derive(Clone, Debug, Deserialize)]
struct ListResponse {
    #[serde(default)]
    results: Vec<NamedResource>,
}

#[derive(Clone, Debug, Deserialize)]
struct LanguageRef {
    name: String,
}

#[derive(Clone, Debug, Deserialize)]
struct ApiResource {
    url: String,
}

#[derive(Clone, Debug, Deserialize)]
struct PokemonSpeciesResponse {
    #[serde(default)]
    flavor_text_entries: Vec<FlavorTextEntry>,
    #[serde(default)]
    genera: Vec<GenusEntry>,
    evolution_chain: Option<ApiResource>,
}

#[derive(Clone, Debug, Deserialize)]
struct FlavorTextEntry {
    flavor_text: String,
    language: LanguageRef,
}

#[derive(Clone, Debug, Deserialize)]
struct GenusEntry {
    genus: String,
    language: LanguageRef,
}

#[derive(Clone, Debug, Deserialize)]
struct EvolutionChainResponse {
    chain: ChainLink,
}

#[derive(Clone, Debug, Deserialize)]
struct ChainLink {
    species: NamedResource,
    #[serde(default)]
    evolves_to: Vec<ChainLink>,
}

#[derive(Clone, Debug)]
enum CachedPayload {
    List(Vec<ListEntry>),
    Detail(DetailRecord),
}

struct ClientInner {
    config: ClientConfig,
    transport: Arc<dyn Transport>,
    cache: Mutex<ResponseCache<CachedPayload>>,
    rate: Mutex<RateTracker>,
}

/// Owns the response cache and rate tracker and runs every remote load.
/// Clones share the same cache and tracker.
#[derive(Clone)]
pub struct PokeClient {
    inner: Arc<ClientInner>,
}

impl PokeClient {
    pub fn new(config: ClientConfig) -> Self {
        Self::with_transport(config, Arc::new(HttpTransport::new()))
    }

    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        let cache = ResponseCache::new(config.cache_ttl);
        let rate = RateTracker::new(config.rate_window, config.rate_max_requests);
        Self {
            inner: Arc::new(ClientInner {
                config,
                transport,
                cache: Mutex::new(cache),
                rate: Mutex::new(rate),
            }),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    pub fn rate_budget(&self) -> RateBudget {
        lock(&self.inner.rate).budget()
    }

    pub fn cache_size(&self) -> usize {
        lock(&self.inner.cache).size()
    }

    pub fn clear_cache(&self) {
        lock(&self.inner.cache).clear();
    }

    pub fn is_detail_cached(&self, category_id: &str, id: &str) -> bool {
        lock(&self.inner.cache)
            .get(&cache::detail_key(category_id, id))
            .is_some()
    }

    /// Entries of one category page, in source order.
    pub async fn fetch_list(&self, category_id: &str) -> Result<Vec<ListEntry>, LoadError> {
        let key = cache::list_key(category_id);
        if let Some(CachedPayload::List(entries)) = self.cache_get(&key) {
            return Ok(entries);
        }

        let category = category::find(category_id)
            .ok_or_else(|| LoadError::UnknownCategory(category_id.to_string()))?;
        let url = format!(
            "{}/{}?limit={}&offset=0",
            self.inner.config.base_url, category.id, category.page_size
        );
        let response: ListResponse = decode(self.fetch_json(&url).await?)?;
        let entries: Vec<ListEntry> = response
            .results
            .into_iter()
            .filter_map(|item| {
                let id = id_from_url(&item.url)?;
                Some(ListEntry {
                    id,
                    name: item.name,
                    url: item.url,
                })
            })
            .collect();

        self.cache_set(key, CachedPayload::List(entries.clone()));
        Ok(entries)
    }

    /// One entity, enriched according to its category.
    pub async fn fetch_detail(&self, category_id: &str, id: &str) -> Result<DetailRecord, LoadError> {
        let key = cache::detail_key(category_id, id);
        if let Some(CachedPayload::Detail(record)) = self.cache_get(&key) {
            return Ok(record);
        }

        let category = category::find(category_id)
            .ok_or_else(|| LoadError::UnknownCategory(category_id.to_string()))?;
        let url = format!("{}/{}/{}", self.inner.config.base_url, category.id, id);
        let payload = self.fetch_json(&url).await?;
        let record = self.enrich(category, payload).await;

        self.cache_set(key, CachedPayload::Detail(record.clone()));
        Ok(record)
    }

    /// Warms the detail cache for the entry after `current_id`. Returns the
    /// spawned task, or `None` when there is nothing to do. Failures are
    /// logged and dropped.
    pub fn prefetch_next(
        &self,
        category_id: &str,
        list: &[ListEntry],
        current_id: &str,
    ) -> Option<JoinHandle<()>> {
        let position = list.iter().position(|entry| entry.id == current_id)?;
        let next = list.get(position + 1)?;
        if self.is_detail_cached(category_id, &next.id) {
            return None;
        }

        let client = self.clone();
        let category_id = category_id.to_string();
        let id = next.id.clone();
        Some(tokio::spawn(async move {
            match client.fetch_detail(&category_id, &id).await {
                Ok(_) => tracing::debug!(category = category_id.as_str(), id = id.as_str(), "prefetched"),
                Err(err) => tracing::debug!(
                    category = category_id.as_str(),
                    id = id.as_str(),
                    error = %err,
                    "prefetch failed"
                ),
            }
        }))
    }

    async fn enrich(&self, category: &CategoryDescriptor, payload: serde_json::Value) -> DetailRecord {
        match category.enrichment {
            DetailEnrichment::Identity => DetailRecord::plain(category.id, payload),
            DetailEnrichment::SpeciesFanOut => {
                let Some(species_url) = payload
                    .pointer("/species/url")
                    .and_then(|value| value.as_str())
                    .map(|s| s.to_string())
                else {
                    return DetailRecord::plain(category.id, payload);
                };
                match self.fetch_species_info(&species_url).await {
                    Ok(info) => DetailRecord {
                        category: category.id.to_string(),
                        payload,
                        species: Some(info),
                    },
                    Err(err) => {
                        tracing::warn!(url = species_url.as_str(), error = %err, "species lookup failed, detail degraded");
                        DetailRecord::plain(category.id, payload)
                    }
                }
            }
        }
    }

    // One species request feeds two branches running side by side: the text
    // derivation and the evolution-chain lookup. Either failing fails both.
    async fn fetch_species_info(&self, species_url: &str) -> Result<SpeciesInfo, FetchError> {
        let species = self
            .fetch_json(species_url)
            .map(|result| result.and_then(decode::<PokemonSpeciesResponse>))
            .boxed()
            .shared();

        let text = species.clone().map(|result| {
            result.map(|species| {
                (
                    preferred(&species.flavor_text_entries, |entry| &entry.language.name)
                        .map(|entry| clean_text(&entry.flavor_text))
                        .unwrap_or_default(),
                    preferred(&species.genera, |entry| &entry.language.name)
                        .map(|entry| entry.genus.clone())
                        .unwrap_or_default(),
                )
            })
        });

        let chain = async {
            let species = species.clone().await?;
            let Some(chain_ref) = species.evolution_chain else {
                return Ok(None);
            };
            let response: EvolutionChainResponse = decode(self.fetch_json(&chain_ref.url).await?)?;
            let mut stages = Vec::new();
            build_chain_stages(&response.chain, &mut stages);
            Ok::<_, FetchError>(Some(EvolutionChain {
                id: id_from_url(&chain_ref.url).unwrap_or_default(),
                stages,
            }))
        };

        let ((flavor_text, genus), evolution_chain) = future::try_join(text, chain).await?;
        Ok(SpeciesInfo {
            flavor_text,
            genus,
            evolution_chain,
        })
    }

    async fn fetch_json(&self, url: &str) -> Result<serde_json::Value, FetchError> {
        let rate = &self.inner.rate;
        fetch::fetch_with_retry(
            self.inner.transport.as_ref(),
            url,
            self.inner.config.retry,
            || lock(rate).add_request(),
        )
        .await
    }

    fn cache_get(&self, key: &str) -> Option<CachedPayload> {
        lock(&self.inner.cache).get(key)
    }

    fn cache_set(&self, key: String, payload: CachedPayload) {
        lock(&self.inner.cache).set(key, payload);
    }
}

impl std::fmt::Debug for PokeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PokeClient")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

// The guarded data stays consistent even if a holder panicked, so a
// poisoned lock is recovered rather than propagated.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn decode<T: serde::de::DeserializeOwned>(value: serde_json::Value) -> Result<T, FetchError> {
    serde_json::from_value(value).map_err(|err| FetchError::Decode(err.to_string()))
}

/// Trailing path segment of a resource URL, `None` when empty.
pub fn id_from_url(url: &str) -> Option<String> {
    let id = url.trim_end_matches('/').rsplit('/').next()?;
    if id.is_empty() {
        return None;
    }
    Some(id.to_string())
}

fn preferred<'a, T>(entries: &'a [T], language: impl Fn(&T) -> &String) -> Option<&'a T> {
    PREFERRED_LANGUAGES
        .iter()
        .find_map(|wanted| entries.iter().find(|entry| language(entry).as_str() == *wanted))
}

fn clean_text(text: &str) -> String {
    text.replace(['\u{000C}', '\n', '\r'], " ")
}

fn build_chain_stages(chain: &ChainLink, stages: &mut Vec<String>) {
    if !stages.contains(&chain.species.name) {
        stages.push(chain.species.name.clone());
    }
    for next in &chain.evolves_to {
        build_chain_stages(next, stages);
    }
}
