use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::ErrorDetails;

pub const LOGIN_FALLBACK: &str = "Login failed. Please try again.";
pub const REGISTER_FALLBACK: &str = "Registration failed";
pub const PREDICT_FALLBACK: &str = "Invalid ticker symbol or request data";
pub const HISTORY_FALLBACK: &str = "Failed to load prediction history";
pub const REFRESH_FALLBACK: &str = "Session renewal failed";

/// Token pair response from the token endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access: Option<String>,
    pub refresh: Option<String>,
}

/// Request body for `POST /api/v1/token/refresh/`
#[derive(Debug, Clone, Serialize)]
pub struct RefreshRequest<'a> {
    pub refresh: &'a str,
}

/// Outcome of a failed API call
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// 401, the credential is missing, expired or rejected
    #[error("Unauthorized")]
    Unauthorized,
    /// 4xx other than 401, with the message the server gave
    #[error("{0}")]
    ClientError(ErrorDetails),
    /// 5xx; the body is not surfaced
    #[error("Server error ({0})")]
    ServerError(u16),
    /// No response at all
    #[error("Network failure: {0}")]
    NetworkFailure(String),
    /// 2xx whose body lacks required fields
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}
