pub mod admin;
pub mod booking;
pub mod catalog;
pub mod forms;
pub mod pages;
pub mod pricing;
pub mod routes;
pub mod search;
pub mod session;
pub mod state;
pub mod validation;

#[cfg(test)]
pub(crate) mod fakes;

// Re-export the pieces the binary and the integration tests reach for most.
pub use admin::{AdminList, AdminRecord, Editor, ListSource};
pub use routes::{guard, resolve, GuardDecision, Route};
pub use session::{AuthSession, SessionPhase, SessionState};
pub use state::AppState;
