//! crates/spa_portal_core/src/domain.rs
//!
//! Defines the core data structures exchanged with the spa backend.
//! Every record here is a transient, re-fetchable copy of something the
//! backend owns; nothing in this module enforces server-side rules.

use bytes::Bytes;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

//=========================================================================================
// Response Envelope and Pagination
//=========================================================================================

/// The uniform wrapper every backend response is assumed to use.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub pages: u32,
}

/// One page of a list endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub pagination: Option<Pagination>,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, pagination: Option<Pagination>) -> Self {
        Self { items, pagination }
    }
}

//=========================================================================================
// List Filters
//=========================================================================================

/// Filter and pagination options accepted by every list endpoint.
///
/// Only the options that are set end up in the query string. Empty strings
/// count as unset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListQuery {
    pub status: Option<String>,
    pub date: Option<NaiveDate>,
    pub search: Option<String>,
    pub category: Option<String>,
    pub active: Option<bool>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(mut self, status: impl fmt::Display) -> Self {
        self.status = non_empty(status.to_string());
        self
    }

    pub fn date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = non_empty(term.into());
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = non_empty(category.into());
        self
    }

    pub fn active(mut self, active: bool) -> Self {
        self.active = Some(active);
        self
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// The `(name, value)` pairs for the options that are set, in a stable order.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        push_text(&mut pairs, "status", &self.status);
        if let Some(date) = self.date {
            pairs.push(("date", date.format("%Y-%m-%d").to_string()));
        }
        push_text(&mut pairs, "search", &self.search);
        push_text(&mut pairs, "category", &self.category);
        if let Some(active) = self.active {
            pairs.push(("active", active.to_string()));
        }
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        pairs
    }

    /// The form-urlencoded query string, without the leading `?`.
    pub fn to_query_string(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.query_pairs())
            .finish()
    }

    pub fn is_empty(&self) -> bool {
        self.query_pairs().is_empty()
    }
}

fn push_text(pairs: &mut Vec<(&'static str, String)>, name: &'static str, value: &Option<String>) {
    if let Some(v) = value.as_deref().filter(|v| !v.trim().is_empty()) {
        pairs.push((name, v.to_string()));
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

//=========================================================================================
// Validation Errors
//=========================================================================================

/// Field name -> message, ordered by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.insert(field.into(), message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn remove(&mut self, field: &str) {
        self.0.remove(field);
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn extend(&mut self, other: FieldErrors) {
        self.0.extend(other.0);
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .0
            .iter()
            .map(|(field, message)| format!("{}: {}", field, message))
            .collect::<Vec<_>>()
            .join("; ");
        f.write_str(&joined)
    }
}

//=========================================================================================
// Status Enums
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BookingStatus {
    #[default]
    Pending,
    Confirmed,
    Cancelled,
    Completed,
    NoShow,
}

impl BookingStatus {
    pub const ALL: [BookingStatus; 5] = [
        BookingStatus::Pending,
        BookingStatus::Confirmed,
        BookingStatus::Cancelled,
        BookingStatus::Completed,
        BookingStatus::NoShow,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Completed => "completed",
            BookingStatus::NoShow => "no-show",
        }
    }

    /// The status changes the admin screens offer for a booking in this status.
    /// Advisory only; the backend decides which transitions it accepts.
    pub fn suggested_next(&self) -> &'static [BookingStatus] {
        match self {
            BookingStatus::Pending => &[BookingStatus::Confirmed, BookingStatus::Cancelled],
            BookingStatus::Confirmed => &[
                BookingStatus::Completed,
                BookingStatus::NoShow,
                BookingStatus::Cancelled,
            ],
            _ => &[],
        }
    }

    /// Whether a booking in this status contributes to revenue figures.
    pub fn is_billable(&self) -> bool {
        matches!(self, BookingStatus::Confirmed | BookingStatus::Completed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactStatus {
    #[default]
    New,
    Read,
    Replied,
    Archived,
}

impl ContactStatus {
    pub const ALL: [ContactStatus; 4] = [
        ContactStatus::New,
        ContactStatus::Read,
        ContactStatus::Replied,
        ContactStatus::Archived,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContactStatus::New => "new",
            ContactStatus::Read => "read",
            ContactStatus::Replied => "replied",
            ContactStatus::Archived => "archived",
        }
    }

    /// Advisory, like [`BookingStatus::suggested_next`].
    pub fn suggested_next(&self) -> &'static [ContactStatus] {
        match self {
            ContactStatus::New => &[ContactStatus::Read, ContactStatus::Archived],
            ContactStatus::Read => &[ContactStatus::Replied, ContactStatus::Archived],
            ContactStatus::Replied => &[ContactStatus::Archived],
            ContactStatus::Archived => &[],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriberStatus {
    #[default]
    Subscribed,
    Unsubscribed,
}

impl SubscriberStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriberStatus::Subscribed => "subscribed",
            SubscriberStatus::Unsubscribed => "unsubscribed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    Admin,
    SubAdmin,
    Manager,
}

macro_rules! display_as_str {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.pad(self.as_str())
            }
        })*
    };
}

display_as_str!(BookingStatus, ContactStatus, SubscriberStatus);

//=========================================================================================
// Status Counters
//=========================================================================================

/// Locally tracked per-status totals, seeded from a stats endpoint and
/// patched after each successful mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusCounts<S: Ord> {
    pub total: u64,
    by_status: BTreeMap<S, u64>,
}

impl<S: Ord + Copy> Default for StatusCounts<S> {
    fn default() -> Self {
        Self {
            total: 0,
            by_status: BTreeMap::new(),
        }
    }
}

impl<S: Ord + Copy> StatusCounts<S> {
    pub fn from_pairs(total: u64, pairs: impl IntoIterator<Item = (S, u64)>) -> Self {
        Self {
            total,
            by_status: pairs.into_iter().collect(),
        }
    }

    pub fn get(&self, status: S) -> u64 {
        self.by_status.get(&status).copied().unwrap_or(0)
    }

    /// Moves one item from `from` to `to`. A no-op when they are equal.
    pub fn transition(&mut self, from: S, to: S) {
        if from == to {
            return;
        }
        self.decrement_status(from);
        *self.by_status.entry(to).or_insert(0) += 1;
    }

    /// Accounts for a newly created item.
    pub fn added(&mut self, status: S) {
        self.total += 1;
        *self.by_status.entry(status).or_insert(0) += 1;
    }

    /// Accounts for a deleted item.
    pub fn removed(&mut self, status: S) {
        self.total = self.total.saturating_sub(1);
        self.decrement_status(status);
    }

    fn decrement_status(&mut self, status: S) {
        if let Some(count) = self.by_status.get_mut(&status) {
            *count = count.saturating_sub(1);
        }
    }
}

//=========================================================================================
// Bookings
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub service: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub therapist: Option<String>,
    #[serde(with = "calendar_date")]
    pub date: NaiveDate,
    pub time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub status: BookingStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// The writable fields of a booking, as submitted by the public booking form.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBooking {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub service: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub therapist: Option<String>,
    #[serde(with = "calendar_date")]
    pub date: NaiveDate,
    pub time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// A partial booking update. Absent fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<BookingStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub therapist: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "optional_calendar_date"
    )]
    pub date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl BookingUpdate {
    pub fn status(status: BookingStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BookingStats {
    pub total: u64,
    pub pending: u64,
    pub confirmed: u64,
    pub cancelled: u64,
    pub completed: u64,
    pub no_show: u64,
    pub today: u64,
    pub upcoming: u64,
}

impl BookingStats {
    pub fn counts(&self) -> StatusCounts<BookingStatus> {
        StatusCounts::from_pairs(
            self.total,
            [
                (BookingStatus::Pending, self.pending),
                (BookingStatus::Confirmed, self.confirmed),
                (BookingStatus::Cancelled, self.cancelled),
                (BookingStatus::Completed, self.completed),
                (BookingStatus::NoShow, self.no_show),
            ],
        )
    }
}

/// Booked and free time slots for one calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Availability {
    #[serde(with = "calendar_date")]
    pub date: NaiveDate,
    #[serde(default)]
    pub booked_slots: Vec<String>,
    #[serde(default)]
    pub available_slots: Vec<String>,
}

impl Availability {
    /// When the backend lists free slots those are authoritative, otherwise
    /// anything not booked is free.
    pub fn is_available(&self, time: &str) -> bool {
        if !self.available_slots.is_empty() {
            return self.available_slots.iter().any(|slot| slot == time);
        }
        !self.booked_slots.iter().any(|slot| slot == time)
    }
}

//=========================================================================================
// Contacts and Newsletter
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    pub message: String,
    #[serde(default)]
    pub status: ContactStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct NewContact {
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ContactUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ContactStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl ContactUpdate {
    pub fn status(status: ContactStatus) -> Self {
        Self {
            status: Some(status),
            notes: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ContactStats {
    pub total: u64,
    pub new: u64,
    pub read: u64,
    pub replied: u64,
    pub archived: u64,
}

impl ContactStats {
    pub fn counts(&self) -> StatusCounts<ContactStatus> {
        StatusCounts::from_pairs(
            self.total,
            [
                (ContactStatus::New, self.new),
                (ContactStatus::Read, self.read),
                (ContactStatus::Replied, self.replied),
                (ContactStatus::Archived, self.archived),
            ],
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscriber {
    #[serde(alias = "_id")]
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub status: SubscriberStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

//=========================================================================================
// Services and Categories
//=========================================================================================

/// One bookable length of a service and its price.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct DurationOption {
    #[serde(rename = "duration")]
    pub minutes: u32,
    pub price: f64,
}

/// Lowest and highest price across a service's duration options.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

impl PriceRange {
    pub fn from_durations(durations: &[DurationOption]) -> Option<Self> {
        let mut prices = durations.iter().map(|d| d.price);
        let first = prices.next()?;
        let (min, max) = prices.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p)));
        Some(Self { min, max })
    }
}

impl fmt::Display for PriceRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.min == self.max {
            write!(f, "${}", format_amount(self.min))
        } else {
            write!(f, "${} - ${}", format_amount(self.min), format_amount(self.max))
        }
    }
}

pub fn format_amount(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.2}", value)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    #[serde(alias = "_id")]
    pub id: String,
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub short_description: String,
    #[serde(default)]
    pub description: String,
    pub durations: Vec<DurationOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_range: Option<String>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub popular: bool,
    #[serde(default)]
    pub benefits: Vec<String>,
    #[serde(default)]
    pub ideal_for: Vec<String>,
    #[serde(default)]
    pub what_to_expect: Vec<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl Service {
    pub fn price_range(&self) -> Option<PriceRange> {
        PriceRange::from_durations(&self.durations)
    }

    pub fn starting_price(&self) -> Option<f64> {
        self.price_range().map(|range| range.min)
    }
}

/// The writable fields of a service, as edited in the admin screens.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceInput {
    pub name: String,
    pub slug: String,
    pub short_description: String,
    pub description: String,
    pub durations: Vec<DurationOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_range: Option<String>,
    pub category: String,
    pub featured: bool,
    pub popular: bool,
    pub benefits: Vec<String>,
    pub ideal_for: Vec<String>,
    pub what_to_expect: Vec<String>,
    pub is_active: bool,
}

impl ServiceInput {
    /// Rewrites `price_range` from the duration list.
    pub fn with_recomputed_price_range(mut self) -> Self {
        self.price_range = PriceRange::from_durations(&self.durations).map(|r| r.to_string());
        self
    }
}

impl From<&Service> for ServiceInput {
    fn from(service: &Service) -> Self {
        Self {
            name: service.name.clone(),
            slug: service.slug.clone(),
            short_description: service.short_description.clone(),
            description: service.description.clone(),
            durations: service.durations.clone(),
            price_range: service.price_range.clone(),
            category: service.category.clone(),
            featured: service.featured,
            popular: service.popular,
            benefits: service.benefits.clone(),
            ideal_for: service.ideal_for.clone(),
            what_to_expect: service.what_to_expect.clone(),
            is_active: service.is_active,
        }
    }
}

/// A service category. Always carries an id and a display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

//=========================================================================================
// Therapists
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklySlot {
    pub day: String,
    pub start_time: String,
    pub end_time: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Therapist {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub specialties: BTreeSet<String>,
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub rating: f32,
    #[serde(default)]
    pub review_count: u32,
    #[serde(default)]
    pub booking_count: u32,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability: Option<Vec<WeeklySlot>>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TherapistInput {
    pub name: String,
    pub title: String,
    pub specialties: BTreeSet<String>,
    pub languages: Vec<String>,
    pub bio: String,
    pub is_active: bool,
    pub is_featured: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability: Option<Vec<WeeklySlot>>,
}

impl From<&Therapist> for TherapistInput {
    fn from(therapist: &Therapist) -> Self {
        Self {
            name: therapist.name.clone(),
            title: therapist.title.clone(),
            specialties: therapist.specialties.clone(),
            languages: therapist.languages.clone(),
            bio: therapist.bio.clone(),
            is_active: therapist.is_active,
            is_featured: therapist.is_featured,
            availability: therapist.availability.clone(),
        }
    }
}

fn default_true() -> bool {
    true
}

//=========================================================================================
// Admin Accounts
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub mobile: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
}

/// What a successful login or registration hands back.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AuthPayload {
    pub token: String,
    pub user: User,
}

/// A file attached to a multipart request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub file_name: String,
    pub content_type: String,
    pub data: Bytes,
}

/// Account details sent to `/auth/register` as multipart form data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub username: String,
    pub mobile: String,
    pub password: String,
    pub role: Role,
    pub profile_picture: Option<Upload>,
}

/// A partial profile update, sent as multipart form data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub username: Option<String>,
    pub mobile: Option<String>,
    pub profile_picture: Option<Upload>,
}

//=========================================================================================
// Dashboard and Analytics
//=========================================================================================

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_bookings: u64,
    pub pending_bookings: u64,
    pub today_bookings: u64,
    pub total_contacts: u64,
    pub new_contacts: u64,
    pub total_subscribers: u64,
    pub total_services: u64,
    pub active_therapists: u64,
    pub monthly_revenue: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalyticsPeriod {
    Week,
    #[default]
    Month,
    Year,
}

impl AnalyticsPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalyticsPeriod::Week => "week",
            AnalyticsPeriod::Month => "month",
            AnalyticsPeriod::Year => "year",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct SeriesPoint {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ServiceShare {
    pub service: String,
    pub bookings: u64,
    pub revenue: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Analytics {
    pub period: AnalyticsPeriod,
    pub total_revenue: f64,
    pub total_bookings: u64,
    pub revenue: Vec<SeriesPoint>,
    pub bookings: Vec<SeriesPoint>,
    pub by_service: Vec<ServiceShare>,
    pub by_status: BTreeMap<String, u64>,
}

//=========================================================================================
// Date (De)serialization
//=========================================================================================

/// Calendar dates go out as `YYYY-MM-DD`. Coming back, the backend may send
/// either that or a full RFC3339 timestamp.
pub mod calendar_date {
    use chrono::{DateTime, NaiveDate};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&date.format("%Y-%m-%d").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(serde::de::Error::custom)
    }

    pub fn parse(raw: &str) -> Result<NaiveDate, String> {
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|dt| dt.date_naive()))
            .map_err(|_| format!("'{}' is not a calendar date", raw))
    }
}

mod optional_calendar_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        date: &Option<NaiveDate>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match date {
            Some(date) => super::calendar_date::serialize(date, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDate>, D::Error> {
        Option::<String>::deserialize(deserializer)?
            .map(|raw| super::calendar_date::parse(&raw).map_err(serde::de::Error::custom))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_string_contains_only_set_options() {
        let query = ListQuery::new()
            .status(BookingStatus::NoShow)
            .search("jane doe & co")
            .page(2);

        let qs = query.to_query_string();
        assert_eq!(qs, "status=no-show&search=jane+doe+%26+co&page=2");
        assert_eq!(query.query_pairs().len(), 3);
    }

    #[test]
    fn test_query_string_empty_when_nothing_set() {
        assert_eq!(ListQuery::new().to_query_string(), "");
        assert!(ListQuery::new().search("   ").is_empty());
    }

    #[test]
    fn test_query_string_all_options() {
        let query = ListQuery::new()
            .status("confirmed")
            .date(NaiveDate::from_ymd_opt(2025, 3, 10).unwrap())
            .search("a")
            .category("massage")
            .active(false)
            .page(1)
            .limit(20);
        assert_eq!(
            query.to_query_string(),
            "status=confirmed&date=2025-03-10&search=a&category=massage\
             &active=false&page=1&limit=20"
        );
    }

    #[test]
    fn test_booking_accepts_mongo_style_payload() {
        let json = r#"{
            "_id": "b1",
            "name": "Jane Doe",
            "phone": "555-0100",
            "email": "jane@example.com",
            "service": "Swedish Massage",
            "date": "2025-03-10T00:00:00.000Z",
            "time": "10:00 AM",
            "status": "no-show",
            "createdAt": "2025-03-01T09:30:00.000Z"
        }"#;
        let booking: Booking = serde_json::from_str(json).unwrap();
        assert_eq!(booking.id, "b1");
        assert_eq!(booking.date, NaiveDate::from_ymd_opt(2025, 3, 10).unwrap());
        assert_eq!(booking.status, BookingStatus::NoShow);
        assert!(booking.therapist.is_none());

        let out = serde_json::to_value(&booking).unwrap();
        assert_eq!(out["date"], "2025-03-10");
    }

    #[test]
    fn test_booking_update_skips_absent_fields() {
        let update = BookingUpdate::status(BookingStatus::Confirmed);
        let out = serde_json::to_string(&update).unwrap();
        assert_eq!(out, r#"{"status":"confirmed"}"#);
    }

    #[test]
    fn test_price_range_from_durations() {
        let durations = [
            DurationOption { minutes: 90, price: 120.0 },
            DurationOption { minutes: 60, price: 85.0 },
            DurationOption { minutes: 120, price: 150.5 },
        ];
        let range = PriceRange::from_durations(&durations).unwrap();
        assert_eq!(range.min, 85.0);
        assert_eq!(range.max, 150.5);
        assert_eq!(range.to_string(), "$85 - $150.50");
        assert!(PriceRange::from_durations(&[]).is_none());
    }

    #[test]
    fn test_service_input_recomputes_stale_price_range() {
        let mut input = ServiceInput {
            name: "Swedish Massage".into(),
            slug: "swedish-massage".into(),
            short_description: String::new(),
            description: String::new(),
            durations: vec![DurationOption { minutes: 60, price: 85.0 }],
            price_range: Some("$85".into()),
            category: "massage".into(),
            featured: false,
            popular: false,
            benefits: Vec::new(),
            ideal_for: Vec::new(),
            what_to_expect: Vec::new(),
            is_active: true,
        };
        input.durations.push(DurationOption { minutes: 90, price: 120.0 });

        let input = input.with_recomputed_price_range();
        assert_eq!(input.price_range.as_deref(), Some("$85 - $120"));

        let json = serde_json::to_value(&input).unwrap();
        assert_eq!(json["priceRange"], "$85 - $120");

        let cleared = ServiceInput { durations: Vec::new(), ..input }.with_recomputed_price_range();
        assert_eq!(cleared.price_range, None);
    }

    #[test]
    fn test_status_counts_patching() {
        let stats = BookingStats {
            total: 3,
            pending: 2,
            confirmed: 1,
            ..Default::default()
        };
        let mut counts = stats.counts();
        counts.transition(BookingStatus::Pending, BookingStatus::Confirmed);
        assert_eq!(counts.get(BookingStatus::Pending), 1);
        assert_eq!(counts.get(BookingStatus::Confirmed), 2);

        counts.removed(BookingStatus::Cancelled);
        assert_eq!(counts.total, 2);
        assert_eq!(counts.get(BookingStatus::Cancelled), 0);
    }

    #[test]
    fn test_suggested_transitions() {
        assert!(BookingStatus::Completed.suggested_next().is_empty());
        assert_eq!(
            ContactStatus::New.suggested_next(),
            &[ContactStatus::Read, ContactStatus::Archived]
        );
    }
}
