pub mod app;
pub mod auth;
pub mod config;
pub mod donations;
pub mod donors;
pub mod error;
pub mod extract;
pub mod inventory;
pub mod models;
pub mod requests;
pub mod rules;
pub mod state;
pub mod stats;
pub mod store;
pub mod validation;

pub use app::{build_app, serve};
pub use state::AppState;
