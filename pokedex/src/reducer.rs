use tui_dispatch::DispatchResult;

use crate::action::Action;
use crate::category;
use crate::effect::Effect;
use crate::error::LoadError;
use crate::sprites;
use crate::state::{AppState, FavoriteRecord, ListEntry, View};

pub fn reducer(state: &mut AppState, action: Action) -> DispatchResult<Effect> {
    match action {
        Action::Init => {
            let id = state.category.clone();
            let index = state.category_index;
            set_category(state, id, index)
        }

        Action::CategorySet { id, index } => set_category(state, id, index),

        Action::CategoryCycle(direction) => {
            let index = category::cycle_index(state.category_index, direction);
            if index == state.category_index {
                return DispatchResult::unchanged();
            }
            let id = category::at(index).id.to_string();
            set_category(state, id, index)
        }

        Action::ListLoading => {
            if state.list_loading {
                return DispatchResult::unchanged();
            }
            state.list_loading = true;
            DispatchResult::changed()
        }

        Action::ListDidLoad { generation, items } => {
            if generation != state.list_generation {
                return DispatchResult::unchanged();
            }
            state.list = items;
            state.list_loading = false;
            DispatchResult::changed()
        }

        Action::ListDidError { generation, error } => {
            if generation != state.list_generation {
                return DispatchResult::unchanged();
            }
            set_error(state, format!("List error: {error}"))
        }

        Action::ListSelect(index) => {
            let Some(entry) = state.visible_list().get(index).map(|entry| (*entry).clone()) else {
                return DispatchResult::unchanged();
            };
            select(state, Some(entry))
        }

        Action::Select(entry) => select(state, entry),

        Action::SelectionMove(delta) => {
            let visible = state.visible_list();
            if visible.is_empty() {
                return DispatchResult::unchanged();
            }
            let next = match state.selected_visible_index() {
                Some(current) => current as i64 + delta as i64,
                None => 0,
            };
            if next < 0 || next as usize >= visible.len() {
                return DispatchResult::unchanged();
            }
            let entry = visible[next as usize].clone();
            select(state, Some(entry))
        }

        Action::SelectRandom => {
            let len = state.visible_list().len();
            if len == 0 {
                return DispatchResult::unchanged();
            }
            let index = next_rand(state) as usize % len;
            let entry = state.visible_list()[index].clone();
            select(state, Some(entry))
        }

        Action::DetailLoading => {
            if state.selected.is_none() || state.detail_loading {
                return DispatchResult::unchanged();
            }
            state.detail_loading = true;
            DispatchResult::changed()
        }

        Action::DetailDidLoad { generation, detail } => {
            if generation != state.detail_generation || state.selected.is_none() {
                return DispatchResult::unchanged();
            }
            state.detail = Some(*detail);
            state.detail_loading = false;
            DispatchResult::changed()
        }

        Action::DetailDidError { generation, error } => {
            if generation != state.detail_generation {
                return DispatchResult::unchanged();
            }
            let name = state
                .selected
                .as_ref()
                .map(|entry| entry.name.clone())
                .unwrap_or_default();
            set_error(state, format!("{name} load error: {error}"))
        }

        Action::ErrorSet(message) => set_error(state, message),

        Action::ViewSet(view) => {
            if view == View::Detail && state.selected.is_none() {
                return DispatchResult::unchanged();
            }
            if state.view == view {
                return DispatchResult::unchanged();
            }
            state.view = view;
            clamp_favorite_index(state);
            DispatchResult::changed()
        }

        Action::FavoritesToggleView => {
            state.view = match state.view {
                View::Favorites => View::List,
                View::List | View::Detail => View::Favorites,
            };
            clamp_favorite_index(state);
            DispatchResult::changed()
        }

        Action::Back => match state.view {
            View::Favorites => {
                state.view = View::List;
                DispatchResult::changed()
            }
            View::Detail => select(state, None),
            View::List => {
                if state.search.query.is_empty() {
                    return DispatchResult::unchanged();
                }
                state.search.active = false;
                state.search.query.clear();
                DispatchResult::changed()
            }
        },

        Action::FavoriteToggle(record) => toggle_favorite(state, record),

        Action::FavoriteToggleSelected => {
            let Some(entry) = state.selected.as_ref() else {
                return DispatchResult::unchanged();
            };
            let sprite_url =
                (state.category == category::POKEMON).then(|| sprites::sprite_url(&entry.id));
            let record = FavoriteRecord {
                id: entry.id.clone(),
                name: entry.name.clone(),
                category: state.category.clone(),
                sprite_url,
            };
            toggle_favorite(state, record)
        }

        Action::FavoriteRemove { id, category } => {
            let previous = state.favorites.clone();
            state
                .favorites
                .retain(|favorite| !favorite.same_key(&id, &category));
            if state.favorites.len() == previous.len() {
                return DispatchResult::unchanged();
            }
            clamp_favorite_index(state);
            DispatchResult::changed_with(save_favorites(state, previous))
        }

        Action::FavoriteOpen(index) => {
            let Some(favorite) = state.favorites.get(index).cloned() else {
                return DispatchResult::unchanged();
            };
            state.favorite_index = index;
            open_favorite(state, favorite)
        }

        Action::FavoriteSelect(index) => {
            if index >= state.favorites.len() || index == state.favorite_index {
                return DispatchResult::unchanged();
            }
            state.favorite_index = index;
            DispatchResult::changed()
        }

        Action::FavoritesDidFailSave {
            attempted,
            previous,
            error,
        } => {
            // A newer list has been saved since; only report.
            if state.favorites == attempted {
                state.favorites = previous;
                clamp_favorite_index(state);
            }
            state.error = Some(format!("Could not save favorites: {error}"));
            DispatchResult::changed()
        }

        Action::SearchStart => {
            if state.search.active {
                return DispatchResult::unchanged();
            }
            state.search.active = true;
            state.search.query.clear();
            state.view = View::List;
            DispatchResult::changed()
        }

        Action::SearchCancel => {
            if !state.search.active && state.search.query.is_empty() {
                return DispatchResult::unchanged();
            }
            state.search.active = false;
            state.search.query.clear();
            DispatchResult::changed()
        }

        Action::SearchSubmit => {
            if !state.search.active {
                return DispatchResult::unchanged();
            }
            state.search.active = false;
            DispatchResult::changed()
        }

        Action::SearchInput(ch) => {
            if !state.search.active {
                return DispatchResult::unchanged();
            }
            state.search.query.push(ch);
            DispatchResult::changed()
        }

        Action::SearchBackspace => {
            if state.search.query.pop().is_none() {
                return DispatchResult::unchanged();
            }
            DispatchResult::changed()
        }

        Action::RateDidUpdate(budget) => {
            if state.rate == budget {
                return DispatchResult::unchanged();
            }
            state.rate = budget;
            DispatchResult::changed()
        }

        Action::UiTerminalResize(width, height) => {
            if state.terminal_size != (width, height) {
                state.terminal_size = (width, height);
                DispatchResult::changed()
            } else {
                DispatchResult::unchanged()
            }
        }

        Action::Tick => {
            state.tick = state.tick.wrapping_add(1);
            if state.list_loading || state.detail_loading {
                DispatchResult::changed()
            } else {
                DispatchResult::unchanged()
            }
        }

        Action::Quit => DispatchResult::unchanged(),
    }
}

fn set_category(state: &mut AppState, id: String, index: usize) -> DispatchResult<Effect> {
    DispatchResult::changed_with(reset_category(state, id, index))
}

/// Drops everything scoped to the previous category and bumps both
/// generations so in-flight results for it are never committed.
fn reset_category(state: &mut AppState, id: String, index: usize) -> Effect {
    state.category = id;
    state.category_index = index;
    state.list.clear();
    state.selected = None;
    state.detail = None;
    state.error = None;
    state.view = View::List;
    state.search.active = false;
    state.search.query.clear();
    state.list_generation += 1;
    state.detail_generation += 1;
    state.list_loading = true;
    state.detail_loading = false;
    Effect::LoadList {
        category: state.category.clone(),
        generation: state.list_generation,
    }
}

fn select(state: &mut AppState, entry: Option<ListEntry>) -> DispatchResult<Effect> {
    DispatchResult::changed_with_many(select_effects(state, entry))
}

fn select_effects(state: &mut AppState, entry: Option<ListEntry>) -> Vec<Effect> {
    state.detail_generation += 1;
    state.detail = None;
    let Some(entry) = entry else {
        state.selected = None;
        state.detail_loading = false;
        state.view = View::List;
        return Vec::new();
    };

    state.error = None;
    state.detail_loading = true;
    state.view = View::Detail;
    let mut effects = vec![Effect::LoadDetail {
        category: state.category.clone(),
        id: entry.id.clone(),
        generation: state.detail_generation,
    }];
    if state.list.iter().any(|item| item.id == entry.id) {
        effects.push(Effect::PrefetchNext {
            category: state.category.clone(),
            list: state.list.clone(),
            current_id: entry.id.clone(),
        });
    }
    state.selected = Some(entry);
    effects
}

fn set_error(state: &mut AppState, message: String) -> DispatchResult<Effect> {
    state.error = Some(message);
    state.list_loading = false;
    state.detail_loading = false;
    DispatchResult::changed()
}

fn toggle_favorite(state: &mut AppState, record: FavoriteRecord) -> DispatchResult<Effect> {
    let previous = state.favorites.clone();
    if let Some(pos) = state
        .favorites
        .iter()
        .position(|favorite| favorite.same_key(&record.id, &record.category))
    {
        state.favorites.remove(pos);
    } else {
        state.favorites.push(record);
    }
    clamp_favorite_index(state);
    DispatchResult::changed_with(save_favorites(state, previous))
}

fn open_favorite(state: &mut AppState, favorite: FavoriteRecord) -> DispatchResult<Effect> {
    let mut effects = Vec::new();
    if favorite.category != state.category {
        let Some(index) = category::index_of(&favorite.category) else {
            return set_error(state, LoadError::UnknownCategory(favorite.category).to_string());
        };
        effects.push(reset_category(state, favorite.category.clone(), index));
    }
    let entry = state
        .list
        .iter()
        .find(|entry| entry.id == favorite.id)
        .cloned()
        .unwrap_or(ListEntry {
            id: favorite.id,
            name: favorite.name,
            url: String::new(),
        });
    effects.extend(select_effects(state, Some(entry)));
    DispatchResult::changed_with_many(effects)
}

fn save_favorites(state: &AppState, previous: Vec<FavoriteRecord>) -> Effect {
    Effect::SaveFavorites {
        favorites: state.favorites.clone(),
        previous,
    }
}

fn clamp_favorite_index(state: &mut AppState) {
    state.favorite_index = state
        .favorite_index
        .min(state.favorites.len().saturating_sub(1));
}

fn next_rand(state: &mut AppState) -> u32 {
    state.rng_seed = state
        .rng_seed
        .wrapping_mul(6364136223846793005)
        .wrapping_add(1);
    (state.rng_seed >> 32) as u32
}
