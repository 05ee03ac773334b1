//! crates/spa_portal_core/src/ports.rs
//!
//! Defines the service contracts (traits) the portal's controllers depend on.
//! The HTTP client implements every backend port; tests implement them with
//! in-memory fakes.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::{
    Analytics, AnalyticsPeriod, AuthPayload, Availability, Booking, BookingStats, BookingUpdate,
    Category, Contact, ContactStats, ContactUpdate, DashboardStats, FieldErrors, ListQuery,
    NewBooking, NewContact, Paginated, ProfileUpdate, Registration, Service, ServiceInput,
    Subscriber, Therapist, TherapistInput, User,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// Shown to users for failures that never produced a server response.
pub const UNEXPECTED_ERROR_MESSAGE: &str = "An unexpected error occurred. Please try again.";

/// The error every port operation fails with.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PortError {
    /// The request never reached the backend or no response came back.
    #[error("Network error: {0}")]
    Network(String),
    /// The backend answered with a non-2xx status or `success: false`.
    #[error("{message}")]
    Server { status: u16, message: String },
    /// Rejected credentials or a missing/expired token.
    #[error("{0}")]
    Unauthorized(String),
    /// Client-side validation failed; no request was issued.
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),
    /// A response arrived but did not have the expected shape.
    #[error("Unexpected response: {0}")]
    Decode(String),
    /// The persisted session could not be read or written.
    #[error("Session storage error: {0}")]
    Storage(String),
}

/// Coarse classification of a [`PortError`], for callers that branch on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Network,
    Server,
    Unauthorized,
    Validation,
    Decode,
    Storage,
}

impl PortError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PortError::Network(_) => ErrorKind::Network,
            PortError::Server { .. } => ErrorKind::Server,
            PortError::Unauthorized(_) => ErrorKind::Unauthorized,
            PortError::Validation(_) => ErrorKind::Validation,
            PortError::Decode(_) => ErrorKind::Decode,
            PortError::Storage(_) => ErrorKind::Storage,
        }
    }

    /// The text a page shows in its toast or inline banner.
    pub fn user_message(&self) -> String {
        match self {
            PortError::Server { message, .. } | PortError::Unauthorized(message) => {
                message.clone()
            }
            PortError::Validation(errors) => errors.to_string(),
            PortError::Network(_) | PortError::Decode(_) | PortError::Storage(_) => {
                UNEXPECTED_ERROR_MESSAGE.to_string()
            }
        }
    }

    /// The message the server sent, if this error carries one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            PortError::Server { message, .. } | PortError::Unauthorized(message) => Some(message),
            _ => None,
        }
    }
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Backend Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait AuthService: Send + Sync {
    async fn login(&self, identifier: &str, password: &str) -> PortResult<AuthPayload>;

    async fn register(&self, registration: Registration) -> PortResult<AuthPayload>;

    async fn me(&self) -> PortResult<User>;

    async fn update_profile(&self, update: ProfileUpdate) -> PortResult<User>;

    async fn change_password(&self, current: &str, new_password: &str) -> PortResult<()>;

    /// Sets or clears the bearer token attached to every subsequent request.
    fn set_auth_token(&self, token: Option<String>);
}

#[async_trait]
pub trait BookingService: Send + Sync {
    async fn create_booking(&self, booking: &NewBooking) -> PortResult<Booking>;

    async fn get_bookings(&self, query: &ListQuery) -> PortResult<Paginated<Booking>>;

    async fn get_booking(&self, id: &str) -> PortResult<Booking>;

    async fn update_booking(&self, id: &str, update: &BookingUpdate) -> PortResult<Booking>;

    async fn delete_booking(&self, id: &str) -> PortResult<()>;

    async fn get_booking_stats(&self) -> PortResult<BookingStats>;

    async fn get_availability(&self, date: NaiveDate) -> PortResult<Availability>;

    async fn resend_booking_email(&self, id: &str) -> PortResult<()>;
}

#[async_trait]
pub trait ContactService: Send + Sync {
    async fn create_contact(&self, contact: &NewContact) -> PortResult<Contact>;

    async fn get_contacts(&self, query: &ListQuery) -> PortResult<Paginated<Contact>>;

    async fn get_contact(&self, id: &str) -> PortResult<Contact>;

    async fn update_contact(&self, id: &str, update: &ContactUpdate) -> PortResult<Contact>;

    async fn delete_contact(&self, id: &str) -> PortResult<()>;

    async fn get_contact_stats(&self) -> PortResult<ContactStats>;
}

#[async_trait]
pub trait NewsletterService: Send + Sync {
    async fn subscribe(&self, email: &str) -> PortResult<Subscriber>;

    async fn unsubscribe(&self, email: &str) -> PortResult<()>;

    async fn get_subscribers(&self, query: &ListQuery) -> PortResult<Paginated<Subscriber>>;

    async fn get_subscriber_count(&self) -> PortResult<u64>;

    async fn delete_subscriber(&self, id: &str) -> PortResult<()>;
}

#[async_trait]
pub trait CatalogService: Send + Sync {
    async fn get_services(&self, query: &ListQuery) -> PortResult<Paginated<Service>>;

    /// Looks a service up by id or slug.
    async fn get_service(&self, id_or_slug: &str) -> PortResult<Service>;

    async fn create_service(&self, service: &ServiceInput) -> PortResult<Service>;

    async fn update_service(&self, id: &str, service: &ServiceInput) -> PortResult<Service>;

    async fn delete_service(&self, id: &str) -> PortResult<()>;

    async fn get_service_categories(&self) -> PortResult<Vec<Category>>;

    async fn toggle_service_status(&self, id: &str) -> PortResult<Service>;
}

#[async_trait]
pub trait TherapistService: Send + Sync {
    async fn get_therapists(&self, query: &ListQuery) -> PortResult<Paginated<Therapist>>;

    async fn get_therapist(&self, id: &str) -> PortResult<Therapist>;

    async fn create_therapist(&self, therapist: &TherapistInput) -> PortResult<Therapist>;

    async fn update_therapist(&self, id: &str, therapist: &TherapistInput)
        -> PortResult<Therapist>;

    async fn delete_therapist(&self, id: &str) -> PortResult<()>;

    async fn toggle_therapist_status(&self, id: &str) -> PortResult<Therapist>;

    async fn toggle_therapist_featured(&self, id: &str) -> PortResult<Therapist>;
}

#[async_trait]
pub trait InsightsService: Send + Sync {
    async fn get_dashboard_stats(&self) -> PortResult<DashboardStats>;

    async fn get_analytics(&self, period: AnalyticsPeriod) -> PortResult<Analytics>;
}

//=========================================================================================
// Client-side Persistence Port
//=========================================================================================

/// String key/value storage that survives restarts, like a browser's local storage.
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> PortResult<Option<String>>;

    fn set(&self, key: &str, value: &str) -> PortResult<()>;

    fn remove(&self, key: &str) -> PortResult<()>;
}
