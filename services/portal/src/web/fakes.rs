//! services/portal/src/web/fakes.rs
//!
//! An in-memory backend implementing every port, for controller tests.

use async_trait::async_trait;
use chrono::NaiveDate;
use spa_portal_core::domain::{
    Analytics, AnalyticsPeriod, AuthPayload, Availability, Booking, BookingStats, BookingStatus,
    BookingUpdate, Category, Contact, ContactStats, ContactStatus, ContactUpdate, DashboardStats,
    ListQuery, NewBooking, NewContact, Paginated, ProfileUpdate, Registration, Role, Service,
    ServiceInput, Subscriber, SubscriberStatus, Therapist, TherapistInput, User,
};
use spa_portal_core::ports::{
    AuthService, BookingService, CatalogService, ContactService, InsightsService,
    NewsletterService, PortError, PortResult, TherapistService,
};
use std::sync::Mutex;

#[derive(Default)]
pub struct FakeBackend {
    pub calls: Mutex<Vec<String>>,
    pub fail_with: Mutex<Option<PortError>>,
    pub token: Mutex<Option<String>>,
    pub bookings: Mutex<Vec<Booking>>,
    pub contacts: Mutex<Vec<Contact>>,
    pub subscribers: Mutex<Vec<Subscriber>>,
    pub services: Mutex<Vec<Service>>,
    pub therapists: Mutex<Vec<Therapist>>,
    pub booked_slots: Mutex<Vec<String>>,
}

pub fn admin_user() -> User {
    User {
        id: "u1".into(),
        name: "Ada Admin".into(),
        email: "ada@spa.test".into(),
        username: "ada".into(),
        mobile: "5550100".into(),
        role: Role::Admin,
        profile_picture: None,
    }
}

pub fn booking(id: &str, name: &str, status: BookingStatus) -> Booking {
    Booking {
        id: id.into(),
        name: name.into(),
        phone: "555-0100".into(),
        email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
        service: "Swedish Massage".into(),
        therapist: None,
        date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
        time: "10:00 AM".into(),
        message: None,
        status,
        created_at: None,
        updated_at: None,
    }
}

pub fn service(id: &str, name: &str, active: bool) -> Service {
    let mut service = crate::web::catalog::SIGNATURE_SERVICES[0].to_service();
    service.id = id.into();
    service.name = name.into();
    service.slug = name.to_lowercase().replace(' ', "-");
    service.is_active = active;
    service
}

pub fn therapist(id: &str, name: &str, active: bool) -> Therapist {
    Therapist {
        id: id.into(),
        name: name.into(),
        title: "Massage Therapist".into(),
        specialties: ["Deep Tissue".to_string()].into_iter().collect(),
        languages: vec!["English".into()],
        bio: String::new(),
        rating: 4.8,
        review_count: 12,
        booking_count: 40,
        is_active: active,
        is_featured: false,
        availability: None,
    }
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bookings(bookings: Vec<Booking>) -> Self {
        let backend = Self::new();
        *backend.bookings.lock().unwrap() = bookings;
        backend
    }

    pub fn fail_next(&self, err: PortError) {
        *self.fail_with.lock().unwrap() = Some(err);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, name: &str) -> usize {
        self.calls().iter().filter(|c| c.as_str() == name).count()
    }

    fn record(&self, name: &str) -> PortResult<()> {
        self.calls.lock().unwrap().push(name.to_string());
        match self.fail_with.lock().unwrap().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn not_found(what: &str) -> PortError {
        PortError::Server {
            status: 404,
            message: format!("{} not found", what),
        }
    }
}

fn page<T: Clone>(items: &[T]) -> Paginated<T> {
    Paginated::new(items.to_vec(), None)
}

#[async_trait]
impl AuthService for FakeBackend {
    async fn login(&self, identifier: &str, password: &str) -> PortResult<AuthPayload> {
        self.record("login")?;
        if identifier == "ada" && password == "correct horse" {
            Ok(AuthPayload {
                token: "tok-123".into(),
                user: admin_user(),
            })
        } else {
            Err(PortError::Unauthorized("Invalid credentials".into()))
        }
    }

    async fn register(&self, registration: Registration) -> PortResult<AuthPayload> {
        self.record("register")?;
        let mut user = admin_user();
        user.name = registration.name;
        user.email = registration.email;
        user.username = registration.username;
        user.role = registration.role;
        Ok(AuthPayload {
            token: "tok-new".into(),
            user,
        })
    }

    async fn me(&self) -> PortResult<User> {
        self.record("me")?;
        Ok(admin_user())
    }

    async fn update_profile(&self, update: ProfileUpdate) -> PortResult<User> {
        self.record("update_profile")?;
        let mut user = admin_user();
        if let Some(name) = update.name {
            user.name = name;
        }
        if let Some(mobile) = update.mobile {
            user.mobile = mobile;
        }
        Ok(user)
    }

    async fn change_password(&self, current: &str, _new_password: &str) -> PortResult<()> {
        self.record("change_password")?;
        if current == "correct horse" {
            Ok(())
        } else {
            Err(PortError::Server {
                status: 400,
                message: "Current password is incorrect".into(),
            })
        }
    }

    fn set_auth_token(&self, token: Option<String>) {
        *self.token.lock().unwrap() = token;
    }
}

#[async_trait]
impl BookingService for FakeBackend {
    async fn create_booking(&self, new: &NewBooking) -> PortResult<Booking> {
        self.record("create_booking")?;
        let mut bookings = self.bookings.lock().unwrap();
        let created = Booking {
            id: format!("b{}", bookings.len() + 1),
            name: new.name.clone(),
            phone: new.phone.clone(),
            email: new.email.clone(),
            service: new.service.clone(),
            therapist: new.therapist.clone(),
            date: new.date,
            time: new.time.clone(),
            message: new.message.clone(),
            status: BookingStatus::Pending,
            created_at: None,
            updated_at: None,
        };
        bookings.push(created.clone());
        Ok(created)
    }

    async fn get_bookings(&self, query: &ListQuery) -> PortResult<Paginated<Booking>> {
        self.record("get_bookings")?;
        let bookings = self.bookings.lock().unwrap();
        let filtered: Vec<Booking> = bookings
            .iter()
            .filter(|b| query.status.as_deref().map_or(true, |s| b.status.as_str() == s))
            .cloned()
            .collect();
        Ok(page(&filtered))
    }

    async fn get_booking(&self, id: &str) -> PortResult<Booking> {
        self.record("get_booking")?;
        self.bookings
            .lock()
            .unwrap()
            .iter()
            .find(|b| b.id == id)
            .cloned()
            .ok_or_else(|| Self::not_found("Booking"))
    }

    async fn update_booking(&self, id: &str, update: &BookingUpdate) -> PortResult<Booking> {
        self.record("update_booking")?;
        let mut bookings = self.bookings.lock().unwrap();
        let booking = bookings
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| Self::not_found("Booking"))?;
        if let Some(status) = update.status {
            booking.status = status;
        }
        Ok(booking.clone())
    }

    async fn delete_booking(&self, id: &str) -> PortResult<()> {
        self.record("delete_booking")?;
        self.bookings.lock().unwrap().retain(|b| b.id != id);
        Ok(())
    }

    async fn get_booking_stats(&self) -> PortResult<BookingStats> {
        self.record("get_booking_stats")?;
        let bookings = self.bookings.lock().unwrap();
        let count = |s: BookingStatus| bookings.iter().filter(|b| b.status == s).count() as u64;
        Ok(BookingStats {
            total: bookings.len() as u64,
            pending: count(BookingStatus::Pending),
            confirmed: count(BookingStatus::Confirmed),
            cancelled: count(BookingStatus::Cancelled),
            completed: count(BookingStatus::Completed),
            no_show: count(BookingStatus::NoShow),
            ..Default::default()
        })
    }

    async fn get_availability(&self, date: NaiveDate) -> PortResult<Availability> {
        self.record("get_availability")?;
        Ok(Availability {
            date,
            booked_slots: self.booked_slots.lock().unwrap().clone(),
            available_slots: Vec::new(),
        })
    }

    async fn resend_booking_email(&self, _id: &str) -> PortResult<()> {
        self.record("resend_booking_email")
    }
}

#[async_trait]
impl ContactService for FakeBackend {
    async fn create_contact(&self, new: &NewContact) -> PortResult<Contact> {
        self.record("create_contact")?;
        let mut contacts = self.contacts.lock().unwrap();
        let created = Contact {
            id: format!("c{}", contacts.len() + 1),
            name: new.name.clone(),
            email: new.email.clone(),
            subject: new.subject.clone(),
            message: new.message.clone(),
            status: ContactStatus::New,
            notes: None,
            created_at: None,
            updated_at: None,
        };
        contacts.push(created.clone());
        Ok(created)
    }

    async fn get_contacts(&self, _query: &ListQuery) -> PortResult<Paginated<Contact>> {
        self.record("get_contacts")?;
        Ok(page(self.contacts.lock().unwrap().as_slice()))
    }

    async fn get_contact(&self, id: &str) -> PortResult<Contact> {
        self.record("get_contact")?;
        self.contacts
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| Self::not_found("Contact"))
    }

    async fn update_contact(&self, id: &str, update: &ContactUpdate) -> PortResult<Contact> {
        self.record("update_contact")?;
        let mut contacts = self.contacts.lock().unwrap();
        let contact = contacts
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| Self::not_found("Contact"))?;
        if let Some(status) = update.status {
            contact.status = status;
        }
        if let Some(notes) = &update.notes {
            contact.notes = Some(notes.clone());
        }
        Ok(contact.clone())
    }

    async fn delete_contact(&self, id: &str) -> PortResult<()> {
        self.record("delete_contact")?;
        self.contacts.lock().unwrap().retain(|c| c.id != id);
        Ok(())
    }

    async fn get_contact_stats(&self) -> PortResult<ContactStats> {
        self.record("get_contact_stats")?;
        let contacts = self.contacts.lock().unwrap();
        let count = |s: ContactStatus| contacts.iter().filter(|c| c.status == s).count() as u64;
        Ok(ContactStats {
            total: contacts.len() as u64,
            new: count(ContactStatus::New),
            read: count(ContactStatus::Read),
            replied: count(ContactStatus::Replied),
            archived: count(ContactStatus::Archived),
        })
    }
}

#[async_trait]
impl NewsletterService for FakeBackend {
    async fn subscribe(&self, email: &str) -> PortResult<Subscriber> {
        self.record("subscribe")?;
        let mut subscribers = self.subscribers.lock().unwrap();
        if let Some(existing) = subscribers.iter_mut().find(|s| s.email == email) {
            existing.status = SubscriberStatus::Subscribed;
            return Ok(existing.clone());
        }
        let created = Subscriber {
            id: format!("s{}", subscribers.len() + 1),
            email: email.into(),
            status: SubscriberStatus::Subscribed,
            created_at: None,
            updated_at: None,
        };
        subscribers.push(created.clone());
        Ok(created)
    }

    async fn unsubscribe(&self, email: &str) -> PortResult<()> {
        self.record("unsubscribe")?;
        let mut subscribers = self.subscribers.lock().unwrap();
        if let Some(existing) = subscribers.iter_mut().find(|s| s.email == email) {
            existing.status = SubscriberStatus::Unsubscribed;
        }
        Ok(())
    }

    async fn get_subscribers(&self, _query: &ListQuery) -> PortResult<Paginated<Subscriber>> {
        self.record("get_subscribers")?;
        Ok(page(self.subscribers.lock().unwrap().as_slice()))
    }

    async fn get_subscriber_count(&self) -> PortResult<u64> {
        self.record("get_subscriber_count")?;
        Ok(self.subscribers.lock().unwrap().len() as u64)
    }

    async fn delete_subscriber(&self, id: &str) -> PortResult<()> {
        self.record("delete_subscriber")?;
        self.subscribers.lock().unwrap().retain(|s| s.id != id);
        Ok(())
    }
}

#[async_trait]
impl CatalogService for FakeBackend {
    async fn get_services(&self, query: &ListQuery) -> PortResult<Paginated<Service>> {
        self.record("get_services")?;
        let services = self.services.lock().unwrap();
        let filtered: Vec<Service> = services
            .iter()
            .filter(|s| query.category.as_deref().map_or(true, |c| s.category == c))
            .filter(|s| query.active.map_or(true, |a| s.is_active == a))
            .cloned()
            .collect();
        Ok(page(&filtered))
    }

    async fn get_service(&self, id_or_slug: &str) -> PortResult<Service> {
        self.record("get_service")?;
        self.services
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.id == id_or_slug || s.slug == id_or_slug)
            .cloned()
            .ok_or_else(|| Self::not_found("Service"))
    }

    async fn create_service(&self, input: &ServiceInput) -> PortResult<Service> {
        self.record("create_service")?;
        let mut services = self.services.lock().unwrap();
        let id = format!("svc{}", services.len() + 1);
        let mut created = service(&id, &input.name, input.is_active);
        created.durations = input.durations.clone();
        created.price_range = input.price_range.clone();
        created.category = input.category.clone();
        services.push(created.clone());
        Ok(created)
    }

    async fn update_service(&self, id: &str, input: &ServiceInput) -> PortResult<Service> {
        self.record("update_service")?;
        let mut services = self.services.lock().unwrap();
        let existing = services
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| Self::not_found("Service"))?;
        existing.name = input.name.clone();
        existing.durations = input.durations.clone();
        existing.price_range = input.price_range.clone();
        existing.is_active = input.is_active;
        Ok(existing.clone())
    }

    async fn delete_service(&self, id: &str) -> PortResult<()> {
        self.record("delete_service")?;
        self.services.lock().unwrap().retain(|s| s.id != id);
        Ok(())
    }

    async fn get_service_categories(&self) -> PortResult<Vec<Category>> {
        self.record("get_service_categories")?;
        Ok(vec![
            Category {
                id: "massage".into(),
                name: "Massage".into(),
                icon: None,
            },
            Category {
                id: "facial".into(),
                name: "Facials".into(),
                icon: Some("sparkles".into()),
            },
        ])
    }

    async fn toggle_service_status(&self, id: &str) -> PortResult<Service> {
        self.record("toggle_service_status")?;
        let mut services = self.services.lock().unwrap();
        let existing = services
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| Self::not_found("Service"))?;
        existing.is_active = !existing.is_active;
        Ok(existing.clone())
    }
}

#[async_trait]
impl TherapistService for FakeBackend {
    async fn get_therapists(&self, query: &ListQuery) -> PortResult<Paginated<Therapist>> {
        self.record("get_therapists")?;
        let therapists = self.therapists.lock().unwrap();
        let filtered: Vec<Therapist> = therapists
            .iter()
            .filter(|t| query.active.map_or(true, |a| t.is_active == a))
            .cloned()
            .collect();
        Ok(page(&filtered))
    }

    async fn get_therapist(&self, id: &str) -> PortResult<Therapist> {
        self.record("get_therapist")?;
        self.therapists
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(|| Self::not_found("Therapist"))
    }

    async fn create_therapist(&self, input: &TherapistInput) -> PortResult<Therapist> {
        self.record("create_therapist")?;
        let mut therapists = self.therapists.lock().unwrap();
        let created = Therapist {
            id: format!("t{}", therapists.len() + 1),
            name: input.name.clone(),
            title: input.title.clone(),
            specialties: input.specialties.clone(),
            languages: input.languages.clone(),
            bio: input.bio.clone(),
            rating: 0.0,
            review_count: 0,
            booking_count: 0,
            is_active: input.is_active,
            is_featured: input.is_featured,
            availability: input.availability.clone(),
        };
        therapists.push(created.clone());
        Ok(created)
    }

    async fn update_therapist(&self, id: &str, input: &TherapistInput) -> PortResult<Therapist> {
        self.record("update_therapist")?;
        let mut therapists = self.therapists.lock().unwrap();
        let existing = therapists
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| Self::not_found("Therapist"))?;
        existing.name = input.name.clone();
        existing.title = input.title.clone();
        existing.specialties = input.specialties.clone();
        existing.languages = input.languages.clone();
        existing.bio = input.bio.clone();
        existing.is_active = input.is_active;
        existing.is_featured = input.is_featured;
        existing.availability = input.availability.clone();
        Ok(existing.clone())
    }

    async fn delete_therapist(&self, id: &str) -> PortResult<()> {
        self.record("delete_therapist")?;
        self.therapists.lock().unwrap().retain(|t| t.id != id);
        Ok(())
    }

    async fn toggle_therapist_status(&self, id: &str) -> PortResult<Therapist> {
        self.record("toggle_therapist_status")?;
        let mut therapists = self.therapists.lock().unwrap();
        let existing = therapists
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| Self::not_found("Therapist"))?;
        existing.is_active = !existing.is_active;
        Ok(existing.clone())
    }

    async fn toggle_therapist_featured(&self, id: &str) -> PortResult<Therapist> {
        self.record("toggle_therapist_featured")?;
        let mut therapists = self.therapists.lock().unwrap();
        let existing = therapists
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| Self::not_found("Therapist"))?;
        existing.is_featured = !existing.is_featured;
        Ok(existing.clone())
    }
}

#[async_trait]
impl InsightsService for FakeBackend {
    async fn get_dashboard_stats(&self) -> PortResult<DashboardStats> {
        self.record("get_dashboard_stats")?;
        Ok(DashboardStats {
            total_bookings: self.bookings.lock().unwrap().len() as u64,
            total_contacts: self.contacts.lock().unwrap().len() as u64,
            ..Default::default()
        })
    }

    async fn get_analytics(&self, period: AnalyticsPeriod) -> PortResult<Analytics> {
        self.record("get_analytics")?;
        Ok(Analytics {
            period,
            total_bookings: self.bookings.lock().unwrap().len() as u64,
            ..Default::default()
        })
    }
}
