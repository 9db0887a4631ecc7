//! Session guard
//!
//! Two states, `Authenticated` and `Unauthenticated`. Only a login that
//! stores a valid pair authenticates. Logout, a 401 from any call, or finding
//! the store empty at check time all drop back to unauthenticated.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, error, info, warn};

use crate::models::{Credential, Navigation, SessionState};
use crate::store::{CredentialStore, StoreError};

pub struct SessionGuard {
    store: Arc<dyn CredentialStore>,
    state: Mutex<SessionState>,
    navigator: UnboundedSender<Navigation>,
    redirect_delay: Duration,
}

impl SessionGuard {
    /// Start in whatever state the store currently implies
    pub fn new(
        store: Arc<dyn CredentialStore>,
        navigator: UnboundedSender<Navigation>,
        redirect_delay: Duration,
    ) -> Self {
        let initial = match store.load() {
            Some(_) => SessionState::Authenticated,
            None => SessionState::Unauthenticated,
        };

        Self {
            store,
            state: Mutex::new(initial),
            navigator,
            redirect_delay,
        }
    }

    pub fn state(&self) -> SessionState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_state(&self, next: SessionState) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if *state != next {
            debug!("Session {:?} -> {:?}", *state, next);
            *state = next;
        }
    }

    /// Read the store now and sync the state with it, without navigating
    pub fn current(&self) -> Option<Credential> {
        match self.store.load() {
            Some(credential) => {
                self.set_state(SessionState::Authenticated);
                Some(credential)
            }
            None => {
                self.set_state(SessionState::Unauthenticated);
                None
            }
        }
    }

    /// Gate for protected actions; without a credential, send the user to
    /// the authentication entry point
    pub fn require(&self) -> Option<Credential> {
        let credential = self.current();
        if credential.is_none() {
            info!("No stored credential, authentication required");
            self.navigate(Navigation::ToLogin { delay: Duration::ZERO });
        }
        credential
    }

    /// Persist a freshly issued pair and become authenticated
    pub fn authenticate(&self, credential: &Credential) -> Result<(), StoreError> {
        self.store.save(credential)?;
        self.set_state(SessionState::Authenticated);
        Ok(())
    }

    /// Explicit logout: forget the pair and go to login immediately
    pub fn logout(&self) -> Result<(), StoreError> {
        self.store.clear()?;
        self.set_state(SessionState::Unauthenticated);
        info!("Logged out");
        self.navigate(Navigation::ToLogin { delay: Duration::ZERO });
        Ok(())
    }

    /// A protected call came back 401. The stored pair may already be dead
    /// server-side, so it is cleared before redirecting after the configured
    /// delay.
    pub fn invalidate(&self) {
        self.discard_credential();
        warn!("Session expired, redirecting to login");
        self.navigate(Navigation::ToLogin { delay: self.redirect_delay });
    }

    /// A 401 for a request sent with `issued`. Only invalidates while the
    /// store still holds that pair; a response that outlived a logout or a
    /// newer login leaves the current session alone. Returns whether the
    /// session was invalidated.
    pub fn invalidate_issued(&self, issued: &Credential) -> bool {
        if self.store.load().as_ref() != Some(issued) {
            debug!("Ignoring 401 for a credential that is no longer stored");
            return false;
        }
        self.invalidate();
        true
    }

    /// Clear the pair and become unauthenticated without navigating
    pub fn discard_credential(&self) {
        if let Err(e) = self.store.clear() {
            error!("Failed to clear stored credential: {}", e);
        }
        self.set_state(SessionState::Unauthenticated);
    }

    pub fn navigate(&self, navigation: Navigation) {
        if self.navigator.send(navigation).is_err() {
            debug!("Navigation {:?} dropped, no UI binding is listening", navigation);
        }
    }
}
