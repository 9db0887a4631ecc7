//! Data models shared by the client layers
//!
//! Credentials, prediction payloads after normalization, account forms and the
//! per-action presentation state handed to whatever binds the client to a UI.

pub mod account;
pub mod credential;
pub mod prediction;
pub mod session;
pub mod ui_state;

// Re-export commonly used types for convenience
pub use account::{LoginRequest, RegisterForm, RegisterRequest};
pub use credential::Credential;
pub use prediction::{Metrics, PredictionHistoryEntry, PredictionRequest, PredictionResult};
pub use session::{Navigation, SessionState};
pub use ui_state::{Action, ErrorDetails, FieldMessage, HistoryView, Submission, UiState};
