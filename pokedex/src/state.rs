use serde::{Deserialize, Serialize};
use tui_dispatch_debug::debug::{ron_string, DebugSection, DebugState};

use crate::category::{self, CATEGORIES};
use crate::rate::RateBudget;
use crate::search::search_in_list;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchState {
    pub active: bool,
    pub query: String,
}

/// A lightweight list item. `id` is the trailing path segment of `url`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListEntry {
    pub id: String,
    pub name: String,
    pub url: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvolutionChain {
    pub id: String,
    pub stages: Vec<String>,
}

/// Fields derived from the species resource of a Pokemon.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpeciesInfo {
    pub flavor_text: String,
    pub genus: String,
    pub evolution_chain: Option<EvolutionChain>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PokemonStat {
    pub name: String,
    pub value: u16,
}

/// Raw entity payload tagged with the category it came from. `species` is
/// only present for enriched Pokemon details; a failed species lookup
/// leaves it empty instead of failing the load.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetailRecord {
    pub category: String,
    pub payload: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub species: Option<SpeciesInfo>,
}

impl DetailRecord {
    pub fn plain(category: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            category: category.into(),
            payload,
            species: None,
        }
    }

    pub fn is_enriched(&self) -> bool {
        self.species.is_some()
    }

    pub fn name(&self) -> Option<&str> {
        self.payload.get("name").and_then(|value| value.as_str())
    }

    pub fn numeric_id(&self) -> Option<u64> {
        self.payload.get("id").and_then(|value| value.as_u64())
    }

    pub fn flavor_text(&self) -> Option<&str> {
        self.species.as_ref().map(|info| info.flavor_text.as_str())
    }

    pub fn genus(&self) -> Option<&str> {
        self.species.as_ref().map(|info| info.genus.as_str())
    }

    pub fn evolution_chain(&self) -> Option<&EvolutionChain> {
        self.species.as_ref()?.evolution_chain.as_ref()
    }

    pub fn types(&self) -> Vec<String> {
        self.named_list("types", "/type/name")
    }

    pub fn abilities(&self) -> Vec<String> {
        self.named_list("abilities", "/ability/name")
    }

    pub fn stats(&self) -> Vec<PokemonStat> {
        let Some(slots) = self.payload.get("stats").and_then(|value| value.as_array()) else {
            return Vec::new();
        };
        slots
            .iter()
            .filter_map(|slot| {
                Some(PokemonStat {
                    name: slot.pointer("/stat/name")?.as_str()?.to_string(),
                    value: u16::try_from(slot.get("base_stat")?.as_u64()?).ok()?,
                })
            })
            .collect()
    }

    pub fn pointer_string(&self, pointer: &str) -> Option<String> {
        self.payload
            .pointer(pointer)
            .and_then(|value| value.as_str())
            .map(|s| s.to_string())
    }

    pub fn pointer_u64(&self, pointer: &str) -> Option<u64> {
        self.payload.pointer(pointer).and_then(|value| value.as_u64())
    }

    fn named_list(&self, field: &str, pointer: &str) -> Vec<String> {
        self.payload
            .get(field)
            .and_then(|value| value.as_array())
            .map(|slots| {
                slots
                    .iter()
                    .filter_map(|slot| slot.pointer(pointer)?.as_str())
                    .map(|s| s.to_string())
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Uniquely keyed by `(category, id)`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteRecord {
    pub id: String,
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub sprite_url: Option<String>,
}

impl FavoriteRecord {
    pub fn same_key(&self, id: &str, category: &str) -> bool {
        self.id == id && self.category == category
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum View {
    #[default]
    List,
    Detail,
    Favorites,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppState {
    pub terminal_size: (u16, u16),
    pub category: String,
    pub category_index: usize,
    pub list: Vec<ListEntry>,
    pub selected: Option<ListEntry>,
    pub detail: Option<DetailRecord>,
    pub list_loading: bool,
    pub detail_loading: bool,
    pub error: Option<String>,
    pub view: View,
    pub favorites: Vec<FavoriteRecord>,
    pub favorite_index: usize,

    pub search: SearchState,
    pub list_generation: u64,
    pub detail_generation: u64,
    pub rate: RateBudget,
    pub rng_seed: u64,
    pub tick: u64,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl AppState {
    pub fn new(favorites: Vec<FavoriteRecord>) -> Self {
        Self {
            terminal_size: (80, 24),
            category: CATEGORIES[0].id.to_string(),
            category_index: 0,
            list: Vec::new(),
            selected: None,
            detail: None,
            list_loading: false,
            detail_loading: false,
            error: None,
            view: View::List,
            favorites,
            favorite_index: 0,
            search: SearchState::default(),
            list_generation: 0,
            detail_generation: 0,
            rate: RateBudget::default(),
            rng_seed: seed_from_time(),
            tick: 0,
        }
    }

    /// The list as currently filtered by the search query.
    pub fn visible_list(&self) -> Vec<&ListEntry> {
        search_in_list(&self.list, &self.search.query)
    }

    pub fn selected_visible_index(&self) -> Option<usize> {
        let selected = self.selected.as_ref()?;
        self.visible_list()
            .iter()
            .position(|entry| entry.id == selected.id)
    }

    pub fn category_label(&self) -> &'static str {
        category::find(&self.category)
            .map(|descriptor| descriptor.label)
            .unwrap_or("?")
    }

    pub fn is_favorite(&self, id: &str, category: &str) -> bool {
        self.favorites
            .iter()
            .any(|favorite| favorite.same_key(id, category))
    }

    pub fn selected_is_favorite(&self) -> bool {
        self.selected
            .as_ref()
            .map(|entry| self.is_favorite(&entry.id, &self.category))
            .unwrap_or(false)
    }
}

impl DebugState for AppState {
    fn debug_sections(&self) -> Vec<DebugSection> {
        vec![
            DebugSection::new("Browse")
                .entry("category", ron_string(&self.category))
                .entry("view", ron_string(&self.view))
                .entry("list", ron_string(&self.list.len()))
                .entry(
                    "selected",
                    ron_string(&self.selected.as_ref().map(|entry| entry.name.clone())),
                )
                .entry("search", ron_string(&self.search.query))
                .entry("favorites", ron_string(&self.favorites.len())),
            DebugSection::new("Loads")
                .entry("list_loading", ron_string(&self.list_loading))
                .entry("detail_loading", ron_string(&self.detail_loading))
                .entry("list_generation", ron_string(&self.list_generation))
                .entry("detail_generation", ron_string(&self.detail_generation))
                .entry("rate_remaining", ron_string(&self.rate.remaining))
                .entry("error", ron_string(&self.error)),
        ]
    }
}

fn seed_from_time() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    (now.as_secs() << 32) ^ now.subsec_nanos() as u64 | 1
}
