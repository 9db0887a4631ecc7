//! Pure state transitions and input validation for the view controller
//!
//! Nothing here performs I/O; the controller feeds events in and applies
//! whatever comes out.

use crate::api::stockcast::ApiError;
use crate::models::{
    Action, ErrorDetails, HistoryView, LoginRequest, PredictionRequest, PredictionResult,
    RegisterForm, RegisterRequest, UiState,
};

pub const SESSION_EXPIRED: &str = "Session expired. Please log in again.";
pub const LOGIN_REQUIRED: &str = "Please log in to continue.";
pub const INVALID_CREDENTIALS: &str = "Invalid username or password. Please try again.";
pub const SERVER_ERROR: &str = "Server error occurred. Please try again later.";
pub const NETWORK_ERROR: &str = "Network error. Please check your connection and try again.";
pub const INVALID_RESPONSE: &str = "Invalid response from server. Please try again.";

/// Something that happened to one action
#[derive(Debug, Clone, PartialEq)]
pub enum ActionEvent {
    Submit,
    /// Local validation failed; nothing is sent
    Invalid(String),
    Succeeded(String),
    Failed(ErrorDetails),
}

/// Next state of one action slot, or `None` when the event is refused.
///
/// A slot that is `Loading` refuses another submission (its submit control
/// is unavailable) and refuses validation errors for the same reason.
/// Completions are always accepted, including late ones.
pub fn next_state(current: &UiState, event: ActionEvent) -> Option<UiState> {
    match event {
        ActionEvent::Submit if current.is_loading() => None,
        ActionEvent::Submit => Some(UiState::Loading),
        ActionEvent::Invalid(_) if current.is_loading() => None,
        ActionEvent::Invalid(message) => Some(UiState::Error(ErrorDetails::Message(message))),
        ActionEvent::Succeeded(message) => Some(UiState::Success(message)),
        ActionEvent::Failed(details) => Some(UiState::Error(details)),
    }
}

/// User-facing error for a failed remote call
pub fn error_details(error: &ApiError) -> ErrorDetails {
    match error {
        ApiError::Unauthorized => ErrorDetails::message(SESSION_EXPIRED),
        ApiError::ClientError(details) => details.clone(),
        ApiError::ServerError(_) => ErrorDetails::message(SERVER_ERROR),
        ApiError::NetworkFailure(_) => ErrorDetails::message(NETWORK_ERROR),
        ApiError::MalformedResponse(_) => ErrorDetails::message(INVALID_RESPONSE),
    }
}

/// Everything the view binding renders, one independent slot per action
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ControllerState {
    pub login: UiState,
    pub register: UiState,
    pub predict: UiState,
    pub history: UiState,
    /// Latest normalized prediction; cleared when a new one starts
    pub result: Option<PredictionResult>,
    pub history_view: HistoryView,
    /// Registration fields, reset after a successful registration
    pub register_form: RegisterForm,
}

impl ControllerState {
    pub fn slot(&self, action: Action) -> &UiState {
        match action {
            Action::Login => &self.login,
            Action::Register => &self.register,
            Action::Predict => &self.predict,
            Action::History => &self.history,
        }
    }

    fn slot_mut(&mut self, action: Action) -> &mut UiState {
        match action {
            Action::Login => &mut self.login,
            Action::Register => &mut self.register,
            Action::Predict => &mut self.predict,
            Action::History => &mut self.history,
        }
    }

    /// Apply an event to one slot. Returns false if it was refused.
    pub fn apply(&mut self, action: Action, event: ActionEvent) -> bool {
        let slot = self.slot_mut(action);
        match next_state(slot, event) {
            Some(next) => {
                *slot = next;
                true
            }
            None => false,
        }
    }
}

pub fn validate_ticker(raw: &str) -> Result<PredictionRequest, String> {
    PredictionRequest::from_input(raw).ok_or_else(|| "Please enter a stock ticker symbol".to_string())
}

pub fn validate_login(username: &str, password: &str) -> Result<LoginRequest, String> {
    let username = username.trim();
    if username.is_empty() || password.is_empty() {
        return Err("Please enter both username and password".to_string());
    }

    Ok(LoginRequest {
        username: username.to_string(),
        password: password.to_string(),
    })
}

pub fn validate_registration(form: &RegisterForm) -> Result<RegisterRequest, String> {
    let username = form.username.trim();
    if username.is_empty() {
        return Err("Please enter a username".to_string());
    }
    if form.password.is_empty() {
        return Err("Please enter a password".to_string());
    }
    if form.password != form.confirm_password {
        return Err("Passwords do not match".to_string());
    }

    Ok(RegisterRequest {
        username: username.to_string(),
        email: form.email.trim().to_string(),
        password: form.password.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_refused_while_loading() {
        assert_eq!(next_state(&UiState::Idle, ActionEvent::Submit), Some(UiState::Loading));
        assert_eq!(next_state(&UiState::Loading, ActionEvent::Submit), None);
        assert_eq!(
            next_state(&UiState::Error(ErrorDetails::message("x")), ActionEvent::Submit),
            Some(UiState::Loading)
        );
    }

    #[test]
    fn test_completion_accepted_from_any_state() {
        let done = ActionEvent::Succeeded("ok".into());
        assert_eq!(next_state(&UiState::Loading, done.clone()), Some(UiState::Success("ok".into())));
        assert_eq!(next_state(&UiState::Idle, done), Some(UiState::Success("ok".into())));
    }

    #[test]
    fn test_slots_are_independent() {
        let mut state = ControllerState::default();
        assert!(state.apply(Action::Predict, ActionEvent::Submit));
        assert!(state.apply(Action::History, ActionEvent::Submit));
        assert!(state.apply(Action::History, ActionEvent::Failed(ErrorDetails::message("boom"))));
        assert!(state.apply(Action::Predict, ActionEvent::Succeeded("done".into())));

        assert_eq!(state.predict, UiState::Success("done".into()));
        assert_eq!(state.history, UiState::Error(ErrorDetails::message("boom")));
        assert_eq!(state.login, UiState::Idle);
    }

    #[test]
    fn test_error_messages_per_outcome() {
        assert_eq!(error_details(&ApiError::ServerError(500)), ErrorDetails::message(SERVER_ERROR));
        assert_eq!(
            error_details(&ApiError::NetworkFailure("refused".into())),
            ErrorDetails::message(NETWORK_ERROR)
        );
        assert_eq!(error_details(&ApiError::Unauthorized), ErrorDetails::message(SESSION_EXPIRED));
    }

    #[test]
    fn test_ticker_validation() {
        assert_eq!(validate_ticker("  aapl ").unwrap().ticker, "AAPL");
        assert!(validate_ticker(" \t").is_err());
    }

    #[test]
    fn test_login_validation() {
        assert!(validate_login("  ", "x").is_err());
        assert!(validate_login("bob", "").is_err());
        assert_eq!(validate_login(" bob ", "x").unwrap().username, "bob");
    }

    #[test]
    fn test_registration_validation() {
        let mismatch = RegisterForm::new("bob", "bob@example.com", "hunter22", "hunter23");
        assert_eq!(validate_registration(&mismatch), Err("Passwords do not match".to_string()));

        let blank = RegisterForm::new("", "bob@example.com", "hunter22", "hunter22");
        assert!(validate_registration(&blank).is_err());

        let ok = RegisterForm::new("bob", "bob@example.com", "hunter22", "hunter22");
        assert_eq!(validate_registration(&ok).unwrap().email, "bob@example.com");
    }
}
