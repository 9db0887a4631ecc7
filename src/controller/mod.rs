//! View controller
//!
//! Runs user-triggered actions against the API, feeds results through the
//! normalizer and records per-action state. Each action has its own slot, so
//! a prediction in flight is never clobbered by a history refresh. A second
//! submission of an action that is still loading is ignored.

pub mod state;

use std::sync::{Arc, Mutex, PoisonError};

use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::api::stockcast::{ApiError, PredictionApi};
use crate::models::{
    Action, Credential, ErrorDetails, HistoryView, Navigation, RegisterForm, SessionState, Submission,
    UiState,
};
use crate::services::{normalize, parse_history, SessionGuard};
use crate::store::StoreError;

pub use state::{ActionEvent, ControllerState};
use state::{
    error_details, validate_login, validate_registration, validate_ticker, INVALID_CREDENTIALS,
    LOGIN_REQUIRED,
};

/// Cheap to clone; clones share state
#[derive(Clone)]
pub struct ViewController {
    inner: Arc<Inner>,
}

struct Inner {
    api: Arc<dyn PredictionApi>,
    guard: Arc<SessionGuard>,
    state: Mutex<ControllerState>,
    history_refresh: Mutex<Option<JoinHandle<()>>>,
}

impl ViewController {
    pub fn new(api: Arc<dyn PredictionApi>, guard: Arc<SessionGuard>) -> Self {
        Self {
            inner: Arc::new(Inner {
                api,
                guard,
                state: Mutex::new(ControllerState::default()),
                history_refresh: Mutex::new(None),
            }),
        }
    }

    /// Copy of everything the view renders
    pub fn snapshot(&self) -> ControllerState {
        self.with_state(|state| state.clone())
    }

    pub fn session(&self) -> SessionState {
        self.inner.guard.state()
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut ControllerState) -> R) -> R {
        let mut state = self.inner.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut state)
    }

    /// Enter `Loading` if the action is free and its input is valid.
    /// Otherwise hand back what the caller should return.
    fn begin<T>(&self, action: Action, validated: Result<T, String>) -> Result<T, Submission> {
        self.with_state(|state| {
            if state.slot(action).is_loading() {
                debug!("{} already in flight, ignoring submission", action);
                return Err(Submission::Ignored);
            }

            match validated {
                Ok(request) => {
                    state.apply(action, ActionEvent::Submit);
                    Ok(request)
                }
                Err(message) => {
                    debug!("{} rejected locally: {}", action, message);
                    state.apply(action, ActionEvent::Invalid(message));
                    Err(Submission::Finished(state.slot(action).clone()))
                }
            }
        })
    }

    fn finish(&self, action: Action, event: ActionEvent) -> Submission {
        self.with_state(|state| {
            state.apply(action, event);
            Submission::Finished(state.slot(action).clone())
        })
    }

    /// Record a failed remote call. A 401 invalidates the session first, but
    /// only if the credential it was sent with is still the stored one.
    fn fail(&self, action: Action, error: ApiError, issued: Option<&Credential>) -> Submission {
        warn!("{} failed: {}", action, error);
        if error == ApiError::Unauthorized {
            if let Some(issued) = issued {
                self.inner.guard.invalidate_issued(issued);
            }
        }
        self.finish(action, ActionEvent::Failed(error_details(&error)))
    }

    /// Protected actions stop here when the store holds no pair; otherwise
    /// the pair the request goes out with
    fn require_credential(&self, action: Action) -> Result<Credential, Submission> {
        match self.inner.guard.require() {
            Some(credential) => Ok(credential),
            None => Err(self.finish(
                action,
                ActionEvent::Failed(ErrorDetails::message(LOGIN_REQUIRED)),
            )),
        }
    }

    pub async fn submit_login(&self, username: &str, password: &str) -> Submission {
        let request = match self.begin(Action::Login, validate_login(username, password)) {
            Ok(request) => request,
            Err(submission) => return submission,
        };

        match self.inner.api.login(&request).await {
            Ok(credential) => {
                if let Err(e) = self.inner.guard.authenticate(&credential) {
                    error!("Failed to persist credential: {}", e);
                    return self.finish(
                        Action::Login,
                        ActionEvent::Failed(ErrorDetails::message(format!(
                            "Could not save your session: {}",
                            e
                        ))),
                    );
                }

                info!("Logged in as {}", request.username);
                let submission =
                    self.finish(Action::Login, ActionEvent::Succeeded("Login successful".to_string()));
                self.inner.guard.navigate(Navigation::ToDashboard);
                submission
            }
            // Rejected credentials, not an expired session
            Err(ApiError::Unauthorized) => {
                self.inner.guard.discard_credential();
                self.finish(
                    Action::Login,
                    ActionEvent::Failed(ErrorDetails::message(INVALID_CREDENTIALS)),
                )
            }
            Err(e) => self.fail(Action::Login, e, None),
        }
    }

    /// Replace the registration fields held for the view
    pub fn set_register_form(&self, form: RegisterForm) {
        self.with_state(|state| state.register_form = form);
    }

    /// Submit the held registration fields
    pub async fn submit_register(&self) -> Submission {
        let form = self.with_state(|state| state.register_form.clone());
        let request = match self.begin(Action::Register, validate_registration(&form)) {
            Ok(request) => request,
            Err(submission) => return submission,
        };

        match self.inner.api.register(&request).await {
            Ok(()) => self.with_state(|state| {
                state.register_form = RegisterForm::default();
                state.apply(
                    Action::Register,
                    ActionEvent::Succeeded("Account created successfully! You can now sign in.".to_string()),
                );
                Submission::Finished(state.register.clone())
            }),
            Err(e) => self.fail(Action::Register, e, None),
        }
    }

    pub async fn submit_predict(&self, ticker: &str) -> Submission {
        let request = match self.begin(Action::Predict, validate_ticker(ticker)) {
            Ok(request) => request,
            Err(submission) => return submission,
        };
        let issued = match self.require_credential(Action::Predict) {
            Ok(credential) => credential,
            Err(submission) => return submission,
        };
        self.with_state(|state| state.result = None);

        match self.inner.api.predict(&request).await {
            Ok(raw) => {
                let result = normalize(&raw);
                info!("Prediction for {} received", result.ticker);

                let submission = self.with_state(|state| {
                    state.result = Some(result);
                    state.apply(
                        Action::Predict,
                        ActionEvent::Succeeded(format!(
                            "Prediction completed successfully for {}!",
                            request.ticker
                        )),
                    );
                    Submission::Finished(state.predict.clone())
                });

                self.spawn_history_refresh();
                submission
            }
            Err(e) => self.fail(Action::Predict, e, Some(&issued)),
        }
    }

    pub async fn load_history(&self) -> Submission {
        if let Err(submission) = self.begin(Action::History, Ok(())) {
            return submission;
        }
        let issued = match self.require_credential(Action::History) {
            Ok(credential) => credential,
            Err(submission) => return submission,
        };

        let outcome = self
            .inner
            .api
            .list_predictions()
            .await
            .and_then(|raw| parse_history(&raw));

        match outcome {
            Ok(entries) => {
                let count = entries.len();
                debug!("Loaded {} predictions", count);
                self.with_state(|state| {
                    state.history_view = HistoryView::from_entries(entries);
                    state.apply(
                        Action::History,
                        ActionEvent::Succeeded(format!("Loaded {} predictions", count)),
                    );
                    Submission::Finished(state.history.clone())
                })
            }
            Err(e) => self.fail(Action::History, e, Some(&issued)),
        }
    }

    /// Refresh history in the background after a prediction. Its outcome
    /// lands in the history slot only; the prediction stays successful.
    fn spawn_history_refresh(&self) {
        let controller = self.clone();
        let handle = tokio::spawn(async move {
            match controller.load_history().await {
                Submission::Finished(UiState::Error(details)) => {
                    warn!("History refresh after prediction failed: {}", details)
                }
                Submission::Ignored => debug!("History load already in flight, skipping refresh"),
                Submission::Finished(_) => {}
            }
        });

        *self
            .inner
            .history_refresh
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(handle);
    }

    /// Wait for the refresh started by the last successful prediction, if any
    pub async fn wait_for_history_refresh(&self) {
        let handle = self
            .inner
            .history_refresh
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                error!("History refresh task failed: {}", e);
            }
        }
    }

    /// Login page entry: an existing stored pair counts as authenticated
    pub fn enter_login(&self) -> SessionState {
        if self.inner.guard.current().is_some() {
            info!("Existing session found");
        }
        self.session()
    }

    /// Dashboard entry: redirect to login without a credential, otherwise
    /// load history
    pub async fn enter_dashboard(&self) -> Submission {
        if self.inner.guard.require().is_none() {
            return Submission::Ignored;
        }
        self.load_history().await
    }

    /// Forget the credential and everything shown for it
    pub fn logout(&self) -> Result<(), StoreError> {
        self.inner.guard.logout()?;
        self.with_state(|state| *state = ControllerState::default());
        Ok(())
    }

    /// Trade the refresh token for a new access token
    pub async fn renew_session(&self) -> UiState {
        let Some(credential) = self.inner.guard.require() else {
            return UiState::Error(ErrorDetails::message(LOGIN_REQUIRED));
        };

        match self.inner.api.refresh(&credential.refresh_token).await {
            Ok(renewed) => match self.inner.guard.authenticate(&renewed) {
                Ok(()) => {
                    info!("Session renewed");
                    UiState::Success("Session renewed".to_string())
                }
                Err(e) => {
                    error!("Failed to persist renewed credential: {}", e);
                    UiState::Error(ErrorDetails::message(format!(
                        "Could not save your session: {}",
                        e
                    )))
                }
            },
            Err(e) => {
                warn!("Session renewal failed: {}", e);
                if e == ApiError::Unauthorized {
                    self.inner.guard.invalidate_issued(&credential);
                }
                UiState::Error(error_details(&e))
            }
        }
    }
}
