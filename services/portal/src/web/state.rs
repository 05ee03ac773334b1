//! services/portal/src/web/state.rs
//!
//! Wires the configuration, the API client and the persisted session
//! together. Built once at startup and handed to every command.

use crate::adapters::{FileSessionStore, HttpApiClient};
use crate::config::Config;
use crate::error::AppError;
use crate::web::routes::{guard, GuardDecision, Route};
use crate::web::search::{SearchDebouncer, SearchResults};
use crate::web::session::{AuthSession, SessionPhase};
use std::sync::Arc;
use tracing::info;

//=========================================================================================
// AppState
//=========================================================================================

/// The shared application state.
pub struct AppState {
    pub config: Arc<Config>,
    pub client: Arc<HttpApiClient>,
    pub session: AuthSession,
}

impl AppState {
    /// Builds the client and restores any saved session. Nothing is sent to
    /// the backend here.
    pub fn new(config: Arc<Config>) -> Result<Self, AppError> {
        let client = Arc::new(HttpApiClient::from_config(&config)?);
        let store = Arc::new(FileSessionStore::new(config.session_path.clone()));
        let mut session = AuthSession::new(client.clone(), store);

        let phase = session.initialize()?;
        info!("Session restored from {:?}: {:?}", config.session_path, phase);

        Ok(Self {
            config,
            client,
            session,
        })
    }

    pub fn phase(&self) -> SessionPhase {
        self.session.state().phase()
    }

    /// Runs the route guard for `route` against the current session.
    pub fn check(&self, route: Route) -> GuardDecision {
        guard(route, self.session.state())
    }

    /// A debouncer using the configured delay.
    pub fn search<T: Send + 'static>(&self) -> (SearchDebouncer<T>, SearchResults<T>) {
        SearchDebouncer::new(self.config.search_debounce)
    }
}
