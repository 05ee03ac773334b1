//! services/portal/src/web/session.rs
//!
//! The admin login session: who is signed in, mirrored to a `SessionStore`
//! so that a restart picks the session back up without asking the backend.

use spa_portal_core::domain::{AuthPayload, Registration, User};
use spa_portal_core::ports::{AuthService, PortError, PortResult, SessionStore};
use std::sync::Arc;
use tracing::{info, warn};

/// Storage key holding the bearer token.
pub const TOKEN_KEY: &str = "token";
/// Storage key holding the serialized `User`.
pub const USER_KEY: &str = "user";

//=========================================================================================
// Session State
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// The persisted session has not been read yet.
    Loading,
    Unauthenticated,
    Authenticated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub user: Option<User>,
    pub loading: bool,
}

impl SessionState {
    /// The state before `AuthSession::initialize` has run.
    pub fn loading() -> Self {
        Self {
            user: None,
            loading: true,
        }
    }

    pub fn signed_out() -> Self {
        Self {
            user: None,
            loading: false,
        }
    }

    pub fn signed_in(user: User) -> Self {
        Self {
            user: Some(user),
            loading: false,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn phase(&self) -> SessionPhase {
        if self.loading {
            SessionPhase::Loading
        } else if self.is_authenticated() {
            SessionPhase::Authenticated
        } else {
            SessionPhase::Unauthenticated
        }
    }
}

//=========================================================================================
// AuthSession
//=========================================================================================

/// Owns the session state. It is the only writer of the persisted token and
/// user; everything else reads through `state()`.
pub struct AuthSession {
    auth: Arc<dyn AuthService>,
    store: Arc<dyn SessionStore>,
    state: SessionState,
}

impl AuthSession {
    pub fn new(auth: Arc<dyn AuthService>, store: Arc<dyn SessionStore>) -> Self {
        Self {
            auth,
            store,
            state: SessionState::loading(),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn user(&self) -> Option<&User> {
        self.state.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.is_authenticated()
    }

    pub fn auth_service(&self) -> Arc<dyn AuthService> {
        Arc::clone(&self.auth)
    }

    /// Restores a persisted session. No request is made: a token the backend
    /// has since revoked is only noticed when a later call fails.
    pub fn initialize(&mut self) -> PortResult<SessionPhase> {
        let restored = self.read_persisted();
        self.state.loading = false;

        match restored {
            Ok(Some((token, user))) => {
                info!("Restored session for {}", user.email);
                self.auth.set_auth_token(Some(token));
                self.state.user = Some(user);
            }
            Ok(None) => {
                self.auth.set_auth_token(None);
                self.state.user = None;
            }
            Err(e) => {
                warn!("Could not restore the saved session: {}", e);
                self.auth.set_auth_token(None);
                self.state.user = None;
                return Err(e);
            }
        }
        Ok(self.state.phase())
    }

    fn read_persisted(&self) -> PortResult<Option<(String, User)>> {
        let token = self.store.get(TOKEN_KEY)?;
        let user_json = self.store.get(USER_KEY)?;
        let (Some(token), Some(user_json)) = (token, user_json) else {
            return Ok(None);
        };
        match serde_json::from_str::<User>(&user_json) {
            Ok(user) if !token.trim().is_empty() => Ok(Some((token, user))),
            _ => {
                warn!("Discarding an unreadable saved session");
                self.clear_persisted()?;
                Ok(None)
            }
        }
    }

    /// Signs in with an email or username. A failure leaves the session as it was.
    pub async fn login(&mut self, identifier: &str, password: &str) -> PortResult<&User> {
        let payload = self.auth.login(identifier, password).await?;
        self.accept(payload)
    }

    /// Creates an admin account and signs straight into it.
    pub async fn register(&mut self, registration: Registration) -> PortResult<&User> {
        let payload = self.auth.register(registration).await?;
        self.accept(payload)
    }

    fn accept(&mut self, payload: AuthPayload) -> PortResult<&User> {
        let AuthPayload { token, user } = payload;
        self.persist(&token, &user)?;
        self.auth.set_auth_token(Some(token));
        info!("Signed in as {}", user.email);
        self.state = SessionState::signed_in(user);
        self.user()
            .ok_or_else(|| PortError::Storage("session user missing after sign-in".to_string()))
    }

    /// Forgets the session locally. The backend is not told.
    pub fn logout(&mut self) -> PortResult<()> {
        self.auth.set_auth_token(None);
        self.state = SessionState::signed_out();
        self.clear_persisted()
    }

    /// Replaces the signed-in user (after a profile edit). The token is kept.
    pub fn set_user(&mut self, user: User) -> PortResult<()> {
        let json = serde_json::to_string(&user).map_err(|e| PortError::Storage(e.to_string()))?;
        self.store.set(USER_KEY, &json)?;
        self.state.user = Some(user);
        Ok(())
    }

    /// Fetches `/auth/me` and stores the result.
    pub async fn refresh_profile(&mut self) -> PortResult<&User> {
        let user = self.auth.me().await?;
        self.set_user(user)?;
        self.user()
            .ok_or_else(|| PortError::Storage("session user missing after refresh".to_string()))
    }

    fn persist(&self, token: &str, user: &User) -> PortResult<()> {
        let json = serde_json::to_string(user).map_err(|e| PortError::Storage(e.to_string()))?;
        self.store.set(TOKEN_KEY, token)?;
        self.store.set(USER_KEY, &json)
    }

    fn clear_persisted(&self) -> PortResult<()> {
        self.store.remove(TOKEN_KEY)?;
        self.store.remove(USER_KEY)
    }
}
