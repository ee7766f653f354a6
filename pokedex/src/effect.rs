use crate::state::{FavoriteRecord, ListEntry};

/// Side effects requested by the reducer. Load effects carry the generation
/// their result must still match to be committed.
#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    LoadList {
        category: String,
        generation: u64,
    },
    LoadDetail {
        category: String,
        id: String,
        generation: u64,
    },
    PrefetchNext {
        category: String,
        list: Vec<ListEntry>,
        current_id: String,
    },
    /// `previous` is the list to fall back to if the write fails.
    SaveFavorites {
        favorites: Vec<FavoriteRecord>,
        previous: Vec<FavoriteRecord>,
    },
}
