use serde::{Deserialize, Serialize};

use crate::rate::RateBudget;
use crate::state::{DetailRecord, FavoriteRecord, ListEntry, View};

#[derive(tui_dispatch::Action, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[action(infer_categories)]
pub enum Action {
    Init,

    CategorySet { id: String, index: usize },
    CategoryCycle(i32),

    ListLoading,
    ListDidLoad { generation: u64, items: Vec<ListEntry> },
    ListDidError { generation: u64, error: String },
    ListSelect(usize),

    Select(Option<ListEntry>),
    SelectionMove(i16),
    SelectRandom,

    DetailLoading,
    DetailDidLoad { generation: u64, detail: Box<DetailRecord> },
    DetailDidError { generation: u64, error: String },

    ErrorSet(String),

    ViewSet(View),
    FavoritesToggleView,
    Back,

    FavoriteToggle(FavoriteRecord),
    FavoriteToggleSelected,
    FavoriteRemove { id: String, category: String },
    FavoriteOpen(usize),
    FavoriteSelect(usize),
    FavoritesDidFailSave {
        attempted: Vec<FavoriteRecord>,
        previous: Vec<FavoriteRecord>,
        error: String,
    },

    SearchStart,
    SearchCancel,
    SearchSubmit,
    SearchInput(char),
    SearchBackspace,

    RateDidUpdate(RateBudget),

    UiTerminalResize(u16, u16),
    Tick,
    Quit,
}
