//! services/portal/src/adapters/http.rs
//!
//! This module contains the HTTP adapter for the spa backend. It implements
//! every backend port from the `core` crate on top of a single `reqwest`
//! client, so that no other part of the portal builds URLs or parses raw
//! responses.

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use spa_portal_core::domain::{
    Analytics, AnalyticsPeriod, AuthPayload, Availability, Booking, BookingStats, BookingUpdate,
    Category, Contact, ContactStats, ContactUpdate, DashboardStats, Envelope, FieldErrors,
    ListQuery, NewBooking, NewContact, Paginated, ProfileUpdate, Registration, Service,
    ServiceInput, Subscriber, Therapist, TherapistInput, Upload, User,
};
use spa_portal_core::ports::{
    AuthService, BookingService, CatalogService, ContactService, InsightsService,
    NewsletterService, PortError, PortResult, TherapistService,
};
use std::sync::RwLock;
use tracing::{debug, warn};
use url::Url;

use crate::config::Config;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A typed client for the spa backend's REST API.
pub struct HttpApiClient {
    http: reqwest::Client,
    base_url: Url,
    token: RwLock<Option<String>>,
}

impl HttpApiClient {
    /// Creates a new `HttpApiClient` rooted at `base_url`.
    pub fn new(base_url: Url) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self {
            http,
            base_url,
            token: RwLock::new(None),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        Self::new(config.api_base_url.clone())
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The bearer token currently attached to requests.
    pub fn auth_token(&self) -> Option<String> {
        self.token.read().ok().and_then(|guard| guard.clone())
    }

    fn endpoint(&self, segments: &[&str]) -> PortResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                PortError::Network(format!("'{}' cannot be used as a base URL", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    //=====================================================================================
    // The Single Request Helper
    //=====================================================================================

    /// Performs one request and normalizes the outcome.
    ///
    /// Every public method goes through here: URL building, headers, the bearer
    /// token, and the mapping of failures onto `PortError` happen exactly once.
    async fn send<T: DeserializeOwned>(&self, request: ApiRequest<'_>) -> PortResult<Envelope<T>> {
        let ApiRequest {
            method,
            segments,
            query,
            body,
            fallback,
        } = request;

        let mut url = self.endpoint(&segments)?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query.iter());
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        // Multipart bodies bring their own content type with the boundary.
        if !matches!(body, Body::Multipart(_)) {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }
        if let Some(token) = self.auth_token() {
            let value = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|_| {
                PortError::Unauthorized("Stored token is not a valid header value".into())
            })?;
            headers.insert(AUTHORIZATION, value);
        }

        debug!("{} {}", method, url.path());
        let mut builder = self.http.request(method.clone(), url.clone()).headers(headers);
        builder = match body {
            Body::Empty => builder,
            Body::Json(value) => builder.json(&value),
            Body::Multipart(form) => builder.multipart(form),
        };

        let response = builder.send().await.map_err(|e| {
            warn!("{} {} failed before a response arrived: {}", method, url.path(), e);
            PortError::Network(e.to_string())
        })?;
        let status = response.status();
        let text = response.text().await.map_err(|e| {
            warn!("{} {} failed while reading the body: {}", method, url.path(), e);
            PortError::Network(e.to_string())
        })?;

        let envelope = match serde_json::from_str::<Envelope<Value>>(&text) {
            Ok(envelope) => envelope,
            Err(e) if status.is_success() => {
                warn!("{} {} returned a malformed body: {}", method, url.path(), e);
                return Err(PortError::Decode(e.to_string()));
            }
            Err(_) => {
                warn!("{} {} returned {} without an envelope", method, url.path(), status);
                return Err(failure(status, None, fallback));
            }
        };

        if !status.is_success() || !envelope.success {
            warn!(
                "{} {} rejected ({}): {}",
                method,
                url.path(),
                status,
                envelope.message.as_deref().unwrap_or(fallback)
            );
            return Err(failure(status, envelope.message, fallback));
        }

        let data = envelope
            .data
            .map(serde_json::from_value::<T>)
            .transpose()
            .map_err(|e| PortError::Decode(e.to_string()))?;

        Ok(Envelope {
            success: true,
            message: envelope.message,
            data,
            pagination: envelope.pagination,
        })
    }

    /// Sends a request whose envelope must carry `data`.
    async fn fetch<T: DeserializeOwned>(&self, request: ApiRequest<'_>) -> PortResult<T> {
        self.send::<T>(request)
            .await?
            .data
            .ok_or_else(|| PortError::Decode("response did not include data".to_string()))
    }

    /// Sends a request that only needs to succeed.
    async fn execute(&self, request: ApiRequest<'_>) -> PortResult<()> {
        self.send::<Value>(request).await.map(|_| ())
    }

    async fn fetch_page<T: DeserializeOwned>(
        &self,
        request: ApiRequest<'_>,
    ) -> PortResult<Paginated<T>> {
        let envelope = self.send::<Vec<T>>(request).await?;
        Ok(Paginated::new(envelope.data.unwrap_or_default(), envelope.pagination))
    }
}

/// Maps a rejected response onto the matching `PortError`.
fn failure(status: StatusCode, message: Option<String>, fallback: &str) -> PortError {
    let message = message
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| fallback.to_string());
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => PortError::Unauthorized(message),
        _ => PortError::Server {
            status: status.as_u16(),
            message,
        },
    }
}

//=========================================================================================
// Request Description
//=========================================================================================

enum Body {
    Empty,
    Json(Value),
    Multipart(Form),
}

struct ApiRequest<'a> {
    method: Method,
    segments: Vec<&'a str>,
    query: Vec<(&'static str, String)>,
    body: Body,
    fallback: &'static str,
}

impl<'a> ApiRequest<'a> {
    fn new(method: Method, segments: &[&'a str], fallback: &'static str) -> Self {
        Self {
            method,
            segments: segments.to_vec(),
            query: Vec::new(),
            body: Body::Empty,
            fallback,
        }
    }

    fn get(segments: &[&'a str], fallback: &'static str) -> Self {
        Self::new(Method::GET, segments, fallback)
    }

    fn post(segments: &[&'a str], fallback: &'static str) -> Self {
        Self::new(Method::POST, segments, fallback)
    }

    fn put(segments: &[&'a str], fallback: &'static str) -> Self {
        Self::new(Method::PUT, segments, fallback)
    }

    fn patch(segments: &[&'a str], fallback: &'static str) -> Self {
        Self::new(Method::PATCH, segments, fallback)
    }

    fn delete(segments: &[&'a str], fallback: &'static str) -> Self {
        Self::new(Method::DELETE, segments, fallback)
    }

    fn list(mut self, query: &ListQuery) -> Self {
        self.query.extend(query.query_pairs());
        self
    }

    fn param(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.query.push((name, value.into()));
        self
    }

    fn json<B: Serialize + ?Sized>(mut self, body: &B) -> PortResult<Self> {
        let value = serde_json::to_value(body).map_err(|e| PortError::Decode(e.to_string()))?;
        self.body = Body::Json(value);
        Ok(self)
    }

    fn multipart(mut self, form: Form) -> Self {
        self.body = Body::Multipart(form);
        self
    }
}

//=========================================================================================
// Multipart and Category Helpers
//=========================================================================================

fn upload_part(field: &str, upload: &Upload) -> PortResult<Part> {
    Part::bytes(upload.data.to_vec())
        .file_name(upload.file_name.clone())
        .mime_str(&upload.content_type)
        .map_err(|_| {
            let mut errors = FieldErrors::new();
            errors.insert(field, format!("'{}' is not a valid content type", upload.content_type));
            PortError::Validation(errors)
        })
}

fn registration_form(registration: Registration) -> PortResult<Form> {
    let mut form = Form::new()
        .text("name", registration.name)
        .text("email", registration.email)
        .text("username", registration.username)
        .text("mobile", registration.mobile)
        .text("password", registration.password)
        .text("role", role_name(&registration.role));
    if let Some(upload) = registration.profile_picture.as_ref() {
        form = form.part("profilePicture", upload_part("profilePicture", upload)?);
    }
    Ok(form)
}

fn profile_form(update: ProfileUpdate) -> PortResult<Form> {
    let mut form = Form::new();
    let fields = [
        ("name", update.name),
        ("email", update.email),
        ("username", update.username),
        ("mobile", update.mobile),
    ];
    for (name, value) in fields {
        if let Some(value) = value {
            form = form.text(name, value);
        }
    }
    if let Some(upload) = update.profile_picture.as_ref() {
        form = form.part("profilePicture", upload_part("profilePicture", upload)?);
    }
    Ok(form)
}

fn role_name(role: &spa_portal_core::domain::Role) -> String {
    serde_json::to_value(role)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_else(|| "admin".to_string())
}

/// Turns whatever the categories endpoint sends for one entry into a
/// `Category` with its required fields filled in.
pub fn normalize_category(raw: &Value) -> Option<Category> {
    let text = |key: &str| {
        raw.get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };
    match raw {
        Value::String(name) if !name.trim().is_empty() => Some(Category {
            id: slugify(name),
            name: name.trim().to_string(),
            icon: None,
        }),
        Value::Object(_) => {
            let name = text("name").or_else(|| text("label")).or_else(|| text("slug"))?;
            let id = text("id")
                .or_else(|| text("_id"))
                .or_else(|| text("slug"))
                .unwrap_or_else(|| slugify(&name));
            Some(Category {
                id,
                name,
                icon: text("icon"),
            })
        }
        _ => None,
    }
}

fn slugify(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

//=========================================================================================
// Port Implementations
//=========================================================================================

#[async_trait]
impl AuthService for HttpApiClient {
    async fn login(&self, identifier: &str, password: &str) -> PortResult<AuthPayload> {
        let request = ApiRequest::post(&["auth", "login"], "Login failed")
            .json(&json!({ "identifier": identifier, "password": password }))?;
        self.fetch(request).await.map_err(as_auth_failure)
    }

    async fn register(&self, registration: Registration) -> PortResult<AuthPayload> {
        let request = ApiRequest::post(&["auth", "register"], "Registration failed")
            .multipart(registration_form(registration)?);
        self.fetch(request).await.map_err(as_auth_failure)
    }

    async fn me(&self) -> PortResult<User> {
        self.fetch(ApiRequest::get(&["auth", "me"], "Failed to load profile"))
            .await
    }

    async fn update_profile(&self, update: ProfileUpdate) -> PortResult<User> {
        let request = ApiRequest::put(&["auth", "profile"], "Failed to update profile")
            .multipart(profile_form(update)?);
        self.fetch(request).await
    }

    async fn change_password(&self, current: &str, new_password: &str) -> PortResult<()> {
        let request = ApiRequest::put(&["auth", "password"], "Failed to change password")
            .json(&json!({ "currentPassword": current, "newPassword": new_password }))?;
        self.execute(request).await
    }

    fn set_auth_token(&self, token: Option<String>) {
        match self.token.write() {
            Ok(mut guard) => *guard = token,
            Err(poisoned) => *poisoned.into_inner() = token,
        }
    }
}

/// Rejected credentials are an authorization failure whatever status the
/// backend picked for them.
fn as_auth_failure(err: PortError) -> PortError {
    match err {
        PortError::Server { message, .. } => PortError::Unauthorized(message),
        other => other,
    }
}

#[async_trait]
impl BookingService for HttpApiClient {
    async fn create_booking(&self, booking: &NewBooking) -> PortResult<Booking> {
        let request = ApiRequest::post(&["bookings"], "Failed to create booking").json(booking)?;
        self.fetch(request).await
    }

    async fn get_bookings(&self, query: &ListQuery) -> PortResult<Paginated<Booking>> {
        self.fetch_page(ApiRequest::get(&["bookings"], "Failed to load bookings").list(query))
            .await
    }

    async fn get_booking(&self, id: &str) -> PortResult<Booking> {
        self.fetch(ApiRequest::get(&["bookings", id], "Failed to load booking"))
            .await
    }

    async fn update_booking(&self, id: &str, update: &BookingUpdate) -> PortResult<Booking> {
        let request =
            ApiRequest::put(&["bookings", id], "Failed to update booking").json(update)?;
        self.fetch(request).await
    }

    async fn delete_booking(&self, id: &str) -> PortResult<()> {
        self.execute(ApiRequest::delete(&["bookings", id], "Failed to delete booking"))
            .await
    }

    async fn get_booking_stats(&self) -> PortResult<BookingStats> {
        self.fetch(ApiRequest::get(&["bookings", "stats"], "Failed to load booking statistics"))
            .await
    }

    async fn get_availability(&self, date: NaiveDate) -> PortResult<Availability> {
        let day = date.format("%Y-%m-%d").to_string();
        self.fetch(ApiRequest::get(
            &["bookings", "availability", day.as_str()],
            "Failed to load availability",
        ))
        .await
    }

    async fn resend_booking_email(&self, id: &str) -> PortResult<()> {
        self.execute(ApiRequest::post(
            &["bookings", id, "resend-email"],
            "Failed to resend confirmation email",
        ))
        .await
    }
}

#[async_trait]
impl ContactService for HttpApiClient {
    async fn create_contact(&self, contact: &NewContact) -> PortResult<Contact> {
        let request = ApiRequest::post(&["contacts"], "Failed to send message").json(contact)?;
        self.fetch(request).await
    }

    async fn get_contacts(&self, query: &ListQuery) -> PortResult<Paginated<Contact>> {
        self.fetch_page(ApiRequest::get(&["contacts"], "Failed to load contacts").list(query))
            .await
    }

    async fn get_contact(&self, id: &str) -> PortResult<Contact> {
        self.fetch(ApiRequest::get(&["contacts", id], "Failed to load contact"))
            .await
    }

    async fn update_contact(&self, id: &str, update: &ContactUpdate) -> PortResult<Contact> {
        let request =
            ApiRequest::put(&["contacts", id], "Failed to update contact").json(update)?;
        self.fetch(request).await
    }

    async fn delete_contact(&self, id: &str) -> PortResult<()> {
        self.execute(ApiRequest::delete(&["contacts", id], "Failed to delete contact"))
            .await
    }

    async fn get_contact_stats(&self) -> PortResult<ContactStats> {
        self.fetch(ApiRequest::get(&["contacts", "stats"], "Failed to load contact statistics"))
            .await
    }
}

#[async_trait]
impl NewsletterService for HttpApiClient {
    async fn subscribe(&self, email: &str) -> PortResult<Subscriber> {
        let request = ApiRequest::post(&["newsletter", "subscribe"], "Failed to subscribe")
            .json(&json!({ "email": email }))?;
        self.fetch(request).await
    }

    async fn unsubscribe(&self, email: &str) -> PortResult<()> {
        let request = ApiRequest::post(&["newsletter", "unsubscribe"], "Failed to unsubscribe")
            .json(&json!({ "email": email }))?;
        self.execute(request).await
    }

    async fn get_subscribers(&self, query: &ListQuery) -> PortResult<Paginated<Subscriber>> {
        self.fetch_page(
            ApiRequest::get(&["newsletter", "subscribers"], "Failed to load subscribers")
                .list(query),
        )
        .await
    }

    async fn get_subscriber_count(&self) -> PortResult<u64> {
        let data: Value = self
            .fetch(ApiRequest::get(&["newsletter", "count"], "Failed to load subscriber count"))
            .await?;
        data.as_u64()
            .or_else(|| data.get("count").and_then(Value::as_u64))
            .ok_or_else(|| PortError::Decode(format!("'{}' is not a subscriber count", data)))
    }

    async fn delete_subscriber(&self, id: &str) -> PortResult<()> {
        self.execute(ApiRequest::delete(&["newsletter", id], "Failed to delete subscriber"))
            .await
    }
}

#[async_trait]
impl CatalogService for HttpApiClient {
    async fn get_services(&self, query: &ListQuery) -> PortResult<Paginated<Service>> {
        self.fetch_page(ApiRequest::get(&["services"], "Failed to load services").list(query))
            .await
    }

    async fn get_service(&self, id_or_slug: &str) -> PortResult<Service> {
        self.fetch(ApiRequest::get(&["services", id_or_slug], "Failed to load service"))
            .await
    }

    async fn create_service(&self, service: &ServiceInput) -> PortResult<Service> {
        let request = ApiRequest::post(&["services"], "Failed to create service").json(service)?;
        self.fetch(request).await
    }

    async fn update_service(&self, id: &str, service: &ServiceInput) -> PortResult<Service> {
        let request =
            ApiRequest::put(&["services", id], "Failed to update service").json(service)?;
        self.fetch(request).await
    }

    async fn delete_service(&self, id: &str) -> PortResult<()> {
        self.execute(ApiRequest::delete(&["services", id], "Failed to delete service"))
            .await
    }

    async fn get_service_categories(&self) -> PortResult<Vec<Category>> {
        let raw: Vec<Value> = self
            .fetch(ApiRequest::get(&["services", "categories"], "Failed to load categories"))
            .await?;
        let categories: Vec<Category> = raw.iter().filter_map(normalize_category).collect();
        if categories.len() < raw.len() {
            warn!("Dropped {} unrecognized category entries", raw.len() - categories.len());
        }
        Ok(categories)
    }

    async fn toggle_service_status(&self, id: &str) -> PortResult<Service> {
        self.fetch(ApiRequest::patch(
            &["services", id, "toggle-status"],
            "Failed to update service status",
        ))
        .await
    }
}

#[async_trait]
impl TherapistService for HttpApiClient {
    async fn get_therapists(&self, query: &ListQuery) -> PortResult<Paginated<Therapist>> {
        self.fetch_page(ApiRequest::get(&["therapists"], "Failed to load therapists").list(query))
            .await
    }

    async fn get_therapist(&self, id: &str) -> PortResult<Therapist> {
        self.fetch(ApiRequest::get(&["therapists", id], "Failed to load therapist"))
            .await
    }

    async fn create_therapist(&self, therapist: &TherapistInput) -> PortResult<Therapist> {
        let request =
            ApiRequest::post(&["therapists"], "Failed to create therapist").json(therapist)?;
        self.fetch(request).await
    }

    async fn update_therapist(
        &self,
        id: &str,
        therapist: &TherapistInput,
    ) -> PortResult<Therapist> {
        let request =
            ApiRequest::put(&["therapists", id], "Failed to update therapist").json(therapist)?;
        self.fetch(request).await
    }

    async fn delete_therapist(&self, id: &str) -> PortResult<()> {
        self.execute(ApiRequest::delete(&["therapists", id], "Failed to delete therapist"))
            .await
    }

    async fn toggle_therapist_status(&self, id: &str) -> PortResult<Therapist> {
        self.fetch(ApiRequest::patch(
            &["therapists", id, "toggle-status"],
            "Failed to update therapist status",
        ))
        .await
    }

    async fn toggle_therapist_featured(&self, id: &str) -> PortResult<Therapist> {
        self.fetch(ApiRequest::patch(
            &["therapists", id, "toggle-featured"],
            "Failed to update featured therapist",
        ))
        .await
    }
}

#[async_trait]
impl InsightsService for HttpApiClient {
    async fn get_dashboard_stats(&self) -> PortResult<DashboardStats> {
        self.fetch(ApiRequest::get(&["dashboard", "stats"], "Failed to load dashboard"))
            .await
    }

    async fn get_analytics(&self, period: AnalyticsPeriod) -> PortResult<Analytics> {
        self.fetch(
            ApiRequest::get(&["analytics"], "Failed to load analytics")
                .param("period", period.as_str()),
        )
        .await
    }
}
