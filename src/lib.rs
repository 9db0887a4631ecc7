//! Stockcast client
//!
//! Session and request orchestration for the stock prediction service:
//! credential persistence, the HTTP API client, normalization of prediction
//! payloads, the session guard and the per-action view controller. UI
//! bindings sit on top and only read state and dispatch actions.

pub mod api;
pub mod config;
pub mod controller;
pub mod models;
pub mod services;
pub mod store;
pub mod utils;

pub use api::stockcast::{ApiError, PredictionApi, StockcastClient};
pub use config::ClientConfig;
pub use controller::ViewController;
pub use services::SessionGuard;
pub use store::{CredentialStore, FileCredentialStore, InMemoryCredentialStore};
