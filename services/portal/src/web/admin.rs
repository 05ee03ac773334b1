//! services/portal/src/web/admin.rs
//!
//! The list controller behind every admin table: server-side filters, a
//! local substring filter, per-status counters, status changes and the
//! two-step delete.

use async_trait::async_trait;
use spa_portal_core::domain::{
    Booking, BookingStatus, BookingUpdate, Contact, ContactStatus, ContactUpdate, FieldErrors,
    ListQuery, Paginated, Pagination, Service, ServiceInput, StatusCounts, Subscriber,
    SubscriberStatus, Therapist, TherapistInput,
};
use spa_portal_core::ports::{
    BookingService, CatalogService, ContactService, NewsletterService, PortError, PortResult,
    TherapistService,
};
use std::fmt;
use tracing::{info, warn};

//=========================================================================================
// Record and Source Traits
//=========================================================================================

/// A row in an admin table.
pub trait AdminRecord: Clone + Send + Sync {
    type Status: Copy + Ord + fmt::Debug + Send + Sync;

    /// Plural resource name used in messages ("bookings").
    const RESOURCE: &'static str;

    fn id(&self) -> &str;
    fn status(&self) -> Self::Status;
    /// The text the local filter searches, already lowercased.
    fn haystack(&self) -> String;
    /// Writes a status filter into the server query.
    fn filter_by(query: &mut ListQuery, status: Option<Self::Status>);
}

/// Where an `AdminList` reads and writes its rows.
#[async_trait]
pub trait ListSource<T: AdminRecord>: Send + Sync {
    async fn fetch(&self, query: &ListQuery) -> PortResult<Paginated<T>>;
    /// Moves `item` to `status` and returns the server's copy.
    async fn set_status(&self, item: &T, status: T::Status) -> PortResult<T>;
    async fn remove(&self, id: &str) -> PortResult<()>;
}

fn lowered(parts: &[&str]) -> String {
    parts.join(" ").to_lowercase()
}

impl AdminRecord for Booking {
    type Status = BookingStatus;
    const RESOURCE: &'static str = "bookings";

    fn id(&self) -> &str {
        &self.id
    }

    fn status(&self) -> BookingStatus {
        self.status
    }

    fn haystack(&self) -> String {
        lowered(&[
            self.name.as_str(),
            self.email.as_str(),
            self.phone.as_str(),
            self.service.as_str(),
        ])
    }

    fn filter_by(query: &mut ListQuery, status: Option<BookingStatus>) {
        query.status = status.map(|s| s.as_str().to_string());
    }
}

impl AdminRecord for Contact {
    type Status = ContactStatus;
    const RESOURCE: &'static str = "contacts";

    fn id(&self) -> &str {
        &self.id
    }

    fn status(&self) -> ContactStatus {
        self.status
    }

    fn haystack(&self) -> String {
        lowered(&[
            self.name.as_str(),
            self.email.as_str(),
            self.subject.as_deref().unwrap_or_default(),
            self.message.as_str(),
        ])
    }

    fn filter_by(query: &mut ListQuery, status: Option<ContactStatus>) {
        query.status = status.map(|s| s.as_str().to_string());
    }
}

impl AdminRecord for Subscriber {
    type Status = SubscriberStatus;
    const RESOURCE: &'static str = "subscribers";

    fn id(&self) -> &str {
        &self.id
    }

    fn status(&self) -> SubscriberStatus {
        self.status
    }

    fn haystack(&self) -> String {
        self.email.to_lowercase()
    }

    fn filter_by(query: &mut ListQuery, status: Option<SubscriberStatus>) {
        query.status = status.map(|s| s.as_str().to_string());
    }
}

/// Status is `is_active`.
impl AdminRecord for Service {
    type Status = bool;
    const RESOURCE: &'static str = "services";

    fn id(&self) -> &str {
        &self.id
    }

    fn status(&self) -> bool {
        self.is_active
    }

    fn haystack(&self) -> String {
        lowered(&[
            self.name.as_str(),
            self.slug.as_str(),
            self.category.as_str(),
            self.short_description.as_str(),
        ])
    }

    fn filter_by(query: &mut ListQuery, status: Option<bool>) {
        query.active = status;
    }
}

/// Status is `is_active`.
impl AdminRecord for Therapist {
    type Status = bool;
    const RESOURCE: &'static str = "therapists";

    fn id(&self) -> &str {
        &self.id
    }

    fn status(&self) -> bool {
        self.is_active
    }

    fn haystack(&self) -> String {
        let specialties: Vec<&str> = self.specialties.iter().map(String::as_str).collect();
        format!("{} {} {}", self.name, self.title, specialties.join(" ")).to_lowercase()
    }

    fn filter_by(query: &mut ListQuery, status: Option<bool>) {
        query.active = status;
    }
}

//=========================================================================================
// ListSource Implementations over the Ports
//=========================================================================================

#[async_trait]
impl<B: BookingService + ?Sized> ListSource<Booking> for B {
    async fn fetch(&self, query: &ListQuery) -> PortResult<Paginated<Booking>> {
        self.get_bookings(query).await
    }

    async fn set_status(&self, item: &Booking, status: BookingStatus) -> PortResult<Booking> {
        self.update_booking(&item.id, &BookingUpdate::status(status)).await
    }

    async fn remove(&self, id: &str) -> PortResult<()> {
        self.delete_booking(id).await
    }
}

#[async_trait]
impl<B: ContactService + ?Sized> ListSource<Contact> for B {
    async fn fetch(&self, query: &ListQuery) -> PortResult<Paginated<Contact>> {
        self.get_contacts(query).await
    }

    async fn set_status(&self, item: &Contact, status: ContactStatus) -> PortResult<Contact> {
        self.update_contact(&item.id, &ContactUpdate::status(status)).await
    }

    async fn remove(&self, id: &str) -> PortResult<()> {
        self.delete_contact(id).await
    }
}

#[async_trait]
impl<B: NewsletterService + ?Sized> ListSource<Subscriber> for B {
    async fn fetch(&self, query: &ListQuery) -> PortResult<Paginated<Subscriber>> {
        self.get_subscribers(query).await
    }

    /// The newsletter endpoints work by email, so the row is patched locally.
    async fn set_status(
        &self,
        item: &Subscriber,
        status: SubscriberStatus,
    ) -> PortResult<Subscriber> {
        match status {
            SubscriberStatus::Subscribed => self.subscribe(&item.email).await,
            SubscriberStatus::Unsubscribed => {
                self.unsubscribe(&item.email).await?;
                Ok(Subscriber {
                    status,
                    ..item.clone()
                })
            }
        }
    }

    async fn remove(&self, id: &str) -> PortResult<()> {
        self.delete_subscriber(id).await
    }
}

/// The backend only exposes a toggle, so asking for the current state is a no-op.
#[async_trait]
impl<B: CatalogService + ?Sized> ListSource<Service> for B {
    async fn fetch(&self, query: &ListQuery) -> PortResult<Paginated<Service>> {
        self.get_services(query).await
    }

    async fn set_status(&self, item: &Service, active: bool) -> PortResult<Service> {
        if item.is_active == active {
            return Ok(item.clone());
        }
        self.toggle_service_status(&item.id).await
    }

    async fn remove(&self, id: &str) -> PortResult<()> {
        self.delete_service(id).await
    }
}

#[async_trait]
impl<B: TherapistService + ?Sized> ListSource<Therapist> for B {
    async fn fetch(&self, query: &ListQuery) -> PortResult<Paginated<Therapist>> {
        self.get_therapists(query).await
    }

    async fn set_status(&self, item: &Therapist, active: bool) -> PortResult<Therapist> {
        if item.is_active == active {
            return Ok(item.clone());
        }
        self.toggle_therapist_status(&item.id).await
    }

    async fn remove(&self, id: &str) -> PortResult<()> {
        self.delete_therapist(id).await
    }
}

//=========================================================================================
// AdminList
//=========================================================================================

/// What the confirmation dialog shows before a delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletePrompt {
    pub id: String,
    pub message: String,
}

pub struct AdminList<T: AdminRecord> {
    query: ListQuery,
    status_filter: Option<T::Status>,
    local_filter: String,
    items: Vec<T>,
    pagination: Option<Pagination>,
    counts: StatusCounts<T::Status>,
    loading: bool,
    error: Option<String>,
    pending_delete: Option<String>,
}

impl<T: AdminRecord> Default for AdminList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: AdminRecord> AdminList<T> {
    pub fn new() -> Self {
        Self {
            query: ListQuery::default(),
            status_filter: None,
            local_filter: String::new(),
            items: Vec::new(),
            pagination: None,
            counts: StatusCounts::default(),
            loading: false,
            error: None,
            pending_delete: None,
        }
    }

    pub fn query(&self) -> &ListQuery {
        &self.query
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn pagination(&self) -> Option<&Pagination> {
        self.pagination.as_ref()
    }

    pub fn counts(&self) -> &StatusCounts<T::Status> {
        &self.counts
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// The inline error shown above the table, with a retry button.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn status_filter(&self) -> Option<T::Status> {
        self.status_filter
    }

    pub fn load_failed_message() -> String {
        format!("Failed to load {}", T::RESOURCE)
    }

    // --- Server-side filters; each takes effect on the next `load` ---

    pub fn set_status_filter(&mut self, status: Option<T::Status>) {
        self.status_filter = status;
        T::filter_by(&mut self.query, status);
        self.query.page = None;
    }

    pub fn set_search(&mut self, term: &str) {
        let term = term.trim();
        self.query.search = (!term.is_empty()).then(|| term.to_string());
        self.query.page = None;
    }

    pub fn set_date(&mut self, date: Option<chrono::NaiveDate>) {
        self.query.date = date;
        self.query.page = None;
    }

    pub fn set_page(&mut self, page: u32) {
        self.query.page = Some(page.max(1));
    }

    pub fn set_local_filter(&mut self, text: &str) {
        self.local_filter = text.trim().to_lowercase();
    }

    /// Items matching the local filter, in server order.
    pub fn visible(&self) -> Vec<&T> {
        if self.local_filter.is_empty() {
            return self.items.iter().collect();
        }
        self.items
            .iter()
            .filter(|item| item.haystack().contains(&self.local_filter))
            .collect()
    }

    /// Fetches the current page. On failure the previous rows stay on screen.
    pub async fn load(&mut self, source: &dyn ListSource<T>) -> PortResult<()> {
        self.loading = true;
        let result = source.fetch(&self.query).await;
        self.loading = false;

        match result {
            Ok(page) => {
                self.items = page.items;
                self.pagination = page.pagination;
                self.error = None;
                Ok(())
            }
            Err(e) => {
                warn!("Loading {} failed: {}", T::RESOURCE, e);
                self.error = Some(
                    e.server_message()
                        .filter(|m| !m.is_empty())
                        .map(str::to_string)
                        .unwrap_or_else(Self::load_failed_message),
                );
                Err(e)
            }
        }
    }

    pub fn load_counts(&mut self, counts: StatusCounts<T::Status>) {
        self.counts = counts;
    }

    /// Counts derived from the loaded rows, for resources without a stats endpoint.
    pub fn tally_loaded(&mut self) {
        let mut counts = StatusCounts::default();
        for item in &self.items {
            counts.added(item.status());
        }
        self.counts = counts;
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }

    /// The server is asked first; the row and the counters change only when it agrees.
    pub async fn change_status(
        &mut self,
        source: &dyn ListSource<T>,
        id: &str,
        status: T::Status,
    ) -> PortResult<&T> {
        let index = self.position(id)?;
        let previous = self.items[index].status();
        let updated = source.set_status(&self.items[index], status).await?;

        self.counts.transition(previous, updated.status());
        info!("{} {} moved to {:?}", T::RESOURCE, id, updated.status());
        self.items[index] = updated;
        Ok(&self.items[index])
    }

    /// Replaces a row after an edit made elsewhere (a detail modal).
    /// Rows not on the current page leave the list untouched.
    pub fn update_item(&mut self, item: T) {
        if let Some(existing) = self.items.iter_mut().find(|i| i.id() == item.id()) {
            self.counts.transition(existing.status(), item.status());
            *existing = item;
        }
    }

    /// Puts a freshly created row at the top.
    pub fn insert_item(&mut self, item: T) {
        self.counts.added(item.status());
        if let Some(pagination) = self.pagination.as_mut() {
            pagination.total += 1;
        }
        self.items.insert(0, item);
    }

    // --- Delete confirmation ---

    pub fn request_delete(&mut self, id: &str) -> PortResult<DeletePrompt> {
        self.position(id)?;
        self.pending_delete = Some(id.to_string());
        Ok(DeletePrompt {
            id: id.to_string(),
            message: format!(
                "Are you sure you want to delete this {}? This action cannot be undone.",
                T::RESOURCE.trim_end_matches('s')
            ),
        })
    }

    pub fn pending_delete(&self) -> Option<&str> {
        self.pending_delete.as_deref()
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Issues the DELETE for the row named by the last `request_delete`.
    /// Returns the removed row, or `None` when it already left the page
    /// (a reload in between) and only the server copy was deleted.
    pub async fn confirm_delete(&mut self, source: &dyn ListSource<T>) -> PortResult<Option<T>> {
        let Some(id) = self.pending_delete.take() else {
            return Err(invalid("delete", "Nothing is waiting to be deleted"));
        };

        if let Err(e) = source.remove(&id).await {
            warn!("Deleting {} {} failed: {}", T::RESOURCE, id, e);
            return Err(e);
        }
        info!("Deleted {} {}", T::RESOURCE, id);

        if let Some(pagination) = self.pagination.as_mut() {
            pagination.total = pagination.total.saturating_sub(1);
        }
        let Some(index) = self.items.iter().position(|item| item.id() == id) else {
            return Ok(None);
        };
        let removed = self.items.remove(index);
        self.counts.removed(removed.status());
        Ok(Some(removed))
    }

    /// Rows are addressed by id; an id not on the current page is a caller error.
    fn position(&self, id: &str) -> PortResult<usize> {
        self.items
            .iter()
            .position(|item| item.id() == id)
            .ok_or_else(|| invalid("id", &format!("No such entry in {}: {}", T::RESOURCE, id)))
    }
}

fn invalid(field: &str, message: &str) -> PortError {
    let mut errors = FieldErrors::new();
    errors.insert(field, message);
    PortError::Validation(errors)
}

//=========================================================================================
// Create and Edit
//=========================================================================================

/// A row the admin screens can create and edit through a form.
pub trait EditableRecord: AdminRecord {
    type Input: Clone + Send + Sync;

    /// The form prefilled from an existing row.
    fn to_input(&self) -> Self::Input;

    /// Normalizes the form before it is sent. Derived fields are rebuilt here.
    fn prepare(input: Self::Input) -> Self::Input {
        input
    }
}

/// Where an `Editor` sends its form.
#[async_trait]
pub trait RecordWriter<T: EditableRecord>: Send + Sync {
    async fn create(&self, input: &T::Input) -> PortResult<T>;
    async fn update(&self, id: &str, input: &T::Input) -> PortResult<T>;
}

impl EditableRecord for Service {
    type Input = ServiceInput;

    fn to_input(&self) -> ServiceInput {
        ServiceInput::from(self)
    }

    fn prepare(input: ServiceInput) -> ServiceInput {
        input.with_recomputed_price_range()
    }
}

impl EditableRecord for Therapist {
    type Input = TherapistInput;

    fn to_input(&self) -> TherapistInput {
        TherapistInput::from(self)
    }
}

#[async_trait]
impl<B: CatalogService + ?Sized> RecordWriter<Service> for B {
    async fn create(&self, input: &ServiceInput) -> PortResult<Service> {
        self.create_service(input).await
    }

    async fn update(&self, id: &str, input: &ServiceInput) -> PortResult<Service> {
        self.update_service(id, input).await
    }
}

#[async_trait]
impl<B: TherapistService + ?Sized> RecordWriter<Therapist> for B {
    async fn create(&self, input: &TherapistInput) -> PortResult<Therapist> {
        self.create_therapist(input).await
    }

    async fn update(&self, id: &str, input: &TherapistInput) -> PortResult<Therapist> {
        self.update_therapist(id, input).await
    }
}

/// The create/edit modal. A successful save patches the list behind it.
pub struct Editor<T: EditableRecord> {
    editing: Option<String>,
    pub input: T::Input,
    error: Option<String>,
}

impl<T: EditableRecord> Editor<T> {
    pub fn create(input: T::Input) -> Self {
        Self {
            editing: None,
            input,
            error: None,
        }
    }

    pub fn edit(item: &T) -> Self {
        Self {
            editing: Some(item.id().to_string()),
            input: item.to_input(),
            error: None,
        }
    }

    /// The id being edited, or `None` for a new row.
    pub fn editing(&self) -> Option<&str> {
        self.editing.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub async fn save(
        &mut self,
        writer: &dyn RecordWriter<T>,
        list: &mut AdminList<T>,
    ) -> PortResult<T> {
        self.input = T::prepare(self.input.clone());
        let result = match &self.editing {
            None => writer.create(&self.input).await,
            Some(id) => writer.update(id, &self.input).await,
        };

        let saved = match result {
            Ok(saved) => saved,
            Err(e) => {
                warn!("Saving {} failed: {}", T::RESOURCE, e);
                self.error = Some(e.user_message());
                return Err(e);
            }
        };
        self.error = None;

        if self.editing.is_some() {
            list.update_item(saved.clone());
        } else {
            info!("Created {} {}", T::RESOURCE, saved.id());
            self.editing = Some(saved.id().to_string());
            list.insert_item(saved.clone());
        }
        Ok(saved)
    }
}
