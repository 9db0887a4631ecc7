pub mod client;
pub mod models;

use async_trait::async_trait;
use serde_json::Value;

use crate::models::{Credential, LoginRequest, PredictionRequest, RegisterRequest};

pub use client::StockcastClient;
pub use models::ApiError;

/// Remote actions of the prediction backend
///
/// Every call is single-shot: no retries, no shared state mutated. Protected
/// calls (`predict`, `list_predictions`) read the current credential at
/// issuance time.
#[async_trait]
pub trait PredictionApi: Send + Sync {
    /// `POST /api/v1/token/`
    async fn login(&self, request: &LoginRequest) -> Result<Credential, ApiError>;

    /// `POST /api/v1/register/`
    async fn register(&self, request: &RegisterRequest) -> Result<(), ApiError>;

    /// `POST /api/v1/predict/`, returning the raw payload for normalization
    async fn predict(&self, request: &PredictionRequest) -> Result<Value, ApiError>;

    /// `GET /api/v1/predictions/`, returning the raw list payload
    async fn list_predictions(&self) -> Result<Value, ApiError>;

    /// `POST /api/v1/token/refresh/`. The returned pair keeps `refresh_token`
    /// unless the server rotated it.
    async fn refresh(&self, refresh_token: &str) -> Result<Credential, ApiError>;
}
