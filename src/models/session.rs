//! Session models

use std::time::Duration;

/// Authentication fact as seen by the session guard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Authenticated,
    Unauthenticated,
}

/// Navigation side effect requested from the UI binding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// Go to the authentication entry point, after `delay` so an
    /// explanatory message can be read first.
    ToLogin { delay: Duration },
    /// Go to the protected dashboard view
    ToDashboard,
}
