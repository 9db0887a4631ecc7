pub mod prediction_service;
pub mod session_service;

pub use prediction_service::{normalize, parse_history};
pub use session_service::SessionGuard;
