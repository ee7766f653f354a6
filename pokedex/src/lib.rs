pub mod action;
pub mod api;
pub mod cache;
pub mod category;
pub mod config;
pub mod effect;
pub mod error;
pub mod fetch;
pub mod rate;
pub mod reducer;
pub mod search;
pub mod sprites;
pub mod state;
pub mod store;
pub mod tasks;
