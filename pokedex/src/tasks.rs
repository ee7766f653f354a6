//! Bodies of the effects. The load tasks resolve to the action that
//! commits (or reports) their result, tagged with the generation they were
//! started for.

use crate::action::Action;
use crate::api::PokeClient;
use crate::state::FavoriteRecord;
use crate::store::{self, KeyValueStore};

pub async fn load_list(client: PokeClient, category: String, generation: u64) -> Action {
    match client.fetch_list(&category).await {
        Ok(items) => {
            tracing::debug!(category = category.as_str(), count = items.len(), "list loaded");
            Action::ListDidLoad { generation, items }
        }
        Err(err) => {
            tracing::warn!(category = category.as_str(), error = %err, "list load failed");
            Action::ListDidError {
                generation,
                error: err.to_string(),
            }
        }
    }
}

pub async fn load_detail(
    client: PokeClient,
    category: String,
    id: String,
    generation: u64,
) -> Action {
    match client.fetch_detail(&category, &id).await {
        Ok(detail) => Action::DetailDidLoad {
            generation,
            detail: Box::new(detail),
        },
        Err(err) => {
            tracing::warn!(
                category = category.as_str(),
                id = id.as_str(),
                error = %err,
                "detail load failed"
            );
            Action::DetailDidError {
                generation,
                error: err.to_string(),
            }
        }
    }
}

/// Writes the favorites list through to `store`. On failure returns the
/// action that rolls the in-memory list back to `previous`.
pub fn persist_favorites(
    store: &mut dyn KeyValueStore,
    favorites: Vec<FavoriteRecord>,
    previous: Vec<FavoriteRecord>,
) -> Option<Action> {
    match store::save_favorites(store, &favorites) {
        Ok(()) => None,
        Err(err) => {
            tracing::error!(error = %err, count = favorites.len(), "failed to save favorites");
            Some(Action::FavoritesDidFailSave {
                attempted: favorites,
                previous,
                error: err.to_string(),
            })
        }
    }
}
