//! Per-action presentation state

use std::fmt;

use super::prediction::PredictionHistoryEntry;

/// User-triggered actions, each with its own independent state slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Login,
    Register,
    Predict,
    History,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::Login => "login",
            Action::Register => "register",
            Action::Predict => "predict",
            Action::History => "history",
        };
        f.write_str(name)
    }
}

/// One `field: message` item of a field-keyed error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMessage {
    pub field: String,
    pub message: String,
}

/// Human readable error carried by `UiState::Error`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorDetails {
    Message(String),
    /// Itemized field errors, every message of every field kept
    Fields(Vec<FieldMessage>),
}

impl ErrorDetails {
    pub fn message(text: impl Into<String>) -> Self {
        ErrorDetails::Message(text.into())
    }

    /// Render as display lines, one per message
    pub fn lines(&self) -> Vec<String> {
        match self {
            ErrorDetails::Message(text) => vec![text.clone()],
            ErrorDetails::Fields(items) => items
                .iter()
                .map(|item| format!("{}: {}", item.field, item.message))
                .collect(),
        }
    }
}

impl fmt::Display for ErrorDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.lines().join("\n"))
    }
}

/// Status of the most recent run of one action
#[derive(Debug, Clone, Default, PartialEq)]
pub enum UiState {
    #[default]
    Idle,
    Loading,
    Success(String),
    Error(ErrorDetails),
}

impl UiState {
    pub fn is_loading(&self) -> bool {
        matches!(self, UiState::Loading)
    }
}

/// Result of asking the controller to run an action
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    /// The same action was already in flight; nothing was sent
    Ignored,
    /// The action ran to completion (or failed validation) with this state
    Finished(UiState),
}

/// History list as presented to the view
#[derive(Debug, Clone, Default, PartialEq)]
pub enum HistoryView {
    #[default]
    NotLoaded,
    /// Loaded, and the server has no predictions for this user
    Empty,
    Entries(Vec<PredictionHistoryEntry>),
}

impl HistoryView {
    pub fn from_entries(entries: Vec<PredictionHistoryEntry>) -> Self {
        if entries.is_empty() {
            HistoryView::Empty
        } else {
            HistoryView::Entries(entries)
        }
    }
}
