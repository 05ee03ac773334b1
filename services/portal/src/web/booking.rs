//! services/portal/src/web/booking.rs
//!
//! The three-step public booking wizard: pick a service, pick a date and
//! time, leave contact details, submit.

use chrono::NaiveDate;
use spa_portal_core::domain::{Availability, Booking, FieldErrors, NewBooking};
use spa_portal_core::ports::{BookingService, PortError, PortResult};
use tracing::{info, warn};

use crate::web::catalog::TIME_SLOTS;
use crate::web::validation::{is_valid_phone, require, require_email};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum WizardStep {
    Service = 1,
    Schedule = 2,
    Details = 3,
}

impl WizardStep {
    pub fn number(&self) -> u8 {
        *self as u8
    }

    fn next(&self) -> Option<Self> {
        match self {
            WizardStep::Service => Some(WizardStep::Schedule),
            WizardStep::Schedule => Some(WizardStep::Details),
            WizardStep::Details => None,
        }
    }

    fn previous(&self) -> Option<Self> {
        match self {
            WizardStep::Service => None,
            WizardStep::Schedule => Some(WizardStep::Service),
            WizardStep::Details => Some(WizardStep::Schedule),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookingForm {
    pub service: String,
    pub therapist: Option<String>,
    pub date: Option<NaiveDate>,
    pub time: String,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct BookingWizard {
    active_step: WizardStep,
    form: BookingForm,
    errors: FieldErrors,
    availability: Option<Availability>,
    confirmation: Option<Booking>,
}

impl Default for BookingWizard {
    fn default() -> Self {
        Self::new()
    }
}

impl BookingWizard {
    pub fn new() -> Self {
        Self {
            active_step: WizardStep::Service,
            form: BookingForm::default(),
            errors: FieldErrors::new(),
            availability: None,
            confirmation: None,
        }
    }

    /// Starts with a service already chosen, e.g. from a "Book now" link.
    pub fn with_service(service: impl Into<String>) -> Self {
        let mut wizard = Self::new();
        wizard.form.service = service.into();
        wizard
    }

    pub fn active_step(&self) -> WizardStep {
        self.active_step
    }

    pub fn form(&self) -> &BookingForm {
        &self.form
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn confirmation(&self) -> Option<&Booking> {
        self.confirmation.as_ref()
    }

    //=====================================================================================
    // Field Setters (each clears that field's error)
    //=====================================================================================

    pub fn set_service(&mut self, service: impl Into<String>) {
        self.form.service = service.into();
        self.errors.remove("service");
    }

    pub fn set_therapist(&mut self, therapist: Option<String>) {
        self.form.therapist = therapist.filter(|t| !t.trim().is_empty());
    }

    /// Changing the date drops the availability fetched for the old one.
    pub fn set_date(&mut self, date: NaiveDate) {
        if self.form.date != Some(date) {
            self.availability = None;
        }
        self.form.date = Some(date);
        self.errors.remove("date");
    }

    pub fn set_time(&mut self, time: impl Into<String>) {
        self.form.time = time.into();
        self.errors.remove("time");
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.form.name = name.into();
        self.errors.remove("name");
    }

    pub fn set_phone(&mut self, phone: impl Into<String>) {
        self.form.phone = phone.into();
        self.errors.remove("phone");
    }

    pub fn set_email(&mut self, email: impl Into<String>) {
        self.form.email = email.into();
        self.errors.remove("email");
    }

    pub fn set_message(&mut self, message: impl Into<String>) {
        self.form.message = message.into();
    }

    //=====================================================================================
    // Navigation
    //=====================================================================================

    /// Checks the fields that belong to `step` and nothing else.
    pub fn validate_step(&self, step: WizardStep) -> FieldErrors {
        let mut errors = FieldErrors::new();
        let form = &self.form;
        match step {
            WizardStep::Service => {
                require(&mut errors, "service", &form.service, "Please select a service");
            }
            WizardStep::Schedule => {
                if form.date.is_none() {
                    errors.insert("date", "Please select a date");
                }
                if require(&mut errors, "time", &form.time, "Please select a time") {
                    if let Some(availability) = &self.availability {
                        if !availability.is_available(form.time.trim()) {
                            errors.insert("time", "This time slot is no longer available");
                        }
                    }
                }
            }
            WizardStep::Details => {
                require(&mut errors, "name", &form.name, "Name is required");
                if require(&mut errors, "phone", &form.phone, "Phone number is required")
                    && !is_valid_phone(&form.phone)
                {
                    errors.insert("phone", "Please enter a valid phone number");
                }
                require_email(&mut errors, "email", &form.email);
            }
        }
        errors
    }

    /// Moves forward when the current step is valid. Returns whether it moved.
    pub fn next(&mut self) -> bool {
        let errors = self.validate_step(self.active_step);
        if !errors.is_empty() {
            self.errors = errors;
            return false;
        }
        self.errors.clear();
        match self.active_step.next() {
            Some(step) => {
                self.active_step = step;
                true
            }
            None => false,
        }
    }

    /// Moves back one step without validating anything.
    pub fn back(&mut self) {
        if let Some(step) = self.active_step.previous() {
            self.active_step = step;
        }
    }

    //=====================================================================================
    // Backend Calls
    //=====================================================================================

    /// Loads booked slots for the chosen date.
    pub async fn load_availability(
        &mut self,
        bookings: &dyn BookingService,
    ) -> PortResult<&Availability> {
        let date = self.form.date.ok_or_else(|| {
            let mut errors = FieldErrors::new();
            errors.insert("date", "Please select a date");
            PortError::Validation(errors)
        })?;
        let availability = bookings.get_availability(date).await?;
        if !self.form.time.trim().is_empty() && !availability.is_available(self.form.time.trim()) {
            self.errors.insert("time", "This time slot is no longer available");
        }
        Ok(self.availability.insert(availability))
    }

    /// Slots to offer for the chosen date.
    pub fn open_slots(&self) -> Vec<&'static str> {
        TIME_SLOTS
            .iter()
            .copied()
            .filter(|slot| self.availability.as_ref().map_or(true, |a| a.is_available(slot)))
            .collect()
    }

    /// Validates every step and creates the booking. Nothing is sent when
    /// any step is invalid; the wizard then shows the first invalid step.
    pub async fn submit(&mut self, bookings: &dyn BookingService) -> PortResult<Booking> {
        let mut all_errors = FieldErrors::new();
        let mut first_invalid = None;
        for step in [WizardStep::Service, WizardStep::Schedule, WizardStep::Details] {
            let errors = self.validate_step(step);
            if !errors.is_empty() {
                first_invalid.get_or_insert(step);
                all_errors.extend(errors);
            }
        }
        if let Some(step) = first_invalid {
            self.active_step = step;
            self.errors = all_errors.clone();
            return Err(PortError::Validation(all_errors));
        }

        let new_booking = self.to_new_booking()?;
        match bookings.create_booking(&new_booking).await {
            Ok(booking) => {
                info!("Booking {} created for {}", booking.id, booking.service);
                self.errors.clear();
                self.confirmation = Some(booking.clone());
                Ok(booking)
            }
            Err(e) => {
                warn!("Booking submission failed: {}", e);
                Err(e)
            }
        }
    }

    fn to_new_booking(&self) -> PortResult<NewBooking> {
        let form = &self.form;
        let date = form.date.ok_or_else(|| {
            let mut errors = FieldErrors::new();
            errors.insert("date", "Please select a date");
            PortError::Validation(errors)
        })?;
        let message = form.message.trim();
        Ok(NewBooking {
            name: form.name.trim().to_string(),
            phone: form.phone.trim().to_string(),
            email: form.email.trim().to_string(),
            service: form.service.trim().to_string(),
            therapist: form.therapist.clone(),
            date,
            time: form.time.trim().to_string(),
            message: (!message.is_empty()).then(|| message.to_string()),
        })
    }

    /// Clears everything for a new booking.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::fakes::FakeBackend;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
    }

    fn filled() -> BookingWizard {
        let mut wizard = BookingWizard::with_service("Swedish Massage");
        wizard.set_date(date());
        wizard.set_time("10:00 AM");
        wizard.set_name("Jane Doe");
        wizard.set_phone("555-0100");
        wizard.set_email("jane@example.com");
        wizard
    }

    #[test]
    fn test_step_one_requires_a_service() {
        let mut wizard = BookingWizard::new();
        assert!(!wizard.next());
        assert_eq!(wizard.active_step(), WizardStep::Service);
        assert!(wizard.errors().contains("service"));
        assert_eq!(wizard.errors().len(), 1);
    }

    #[test]
    fn test_step_two_flags_date_and_time_independently() {
        let mut wizard = BookingWizard::with_service("Swedish Massage");
        assert!(wizard.next());
        assert_eq!(wizard.active_step(), WizardStep::Schedule);

        assert!(!wizard.next());
        assert_eq!(wizard.active_step(), WizardStep::Schedule);
        assert!(wizard.errors().contains("date"));
        assert!(wizard.errors().contains("time"));

        wizard.set_date(date());
        assert!(!wizard.next());
        assert!(!wizard.errors().contains("date"));
        assert!(wizard.errors().contains("time"));
    }

    #[test]
    fn test_back_never_validates() {
        let mut wizard = BookingWizard::with_service("Swedish Massage");
        assert!(wizard.next());
        wizard.set_service("");
        wizard.back();
        assert_eq!(wizard.active_step(), WizardStep::Service);
        assert!(wizard.errors().is_empty());
        wizard.back();
        assert_eq!(wizard.active_step().number(), 1);
    }

    #[test]
    fn test_details_step_checks_contact_fields() {
        let mut wizard = filled();
        wizard.set_email("not-an-email");
        wizard.set_phone("12");
        let errors = wizard.validate_step(WizardStep::Details);
        assert_eq!(errors.get("email"), Some("Please enter a valid email address"));
        assert_eq!(errors.get("phone"), Some("Please enter a valid phone number"));
        assert!(!errors.contains("name"));
    }

    #[tokio::test]
    async fn test_invalid_submit_sends_nothing() {
        let backend = FakeBackend::new();
        let mut wizard = BookingWizard::with_service("Swedish Massage");
        wizard.set_name("Jane Doe");

        let err = wizard.submit(&backend).await.unwrap_err();
        assert!(matches!(err, PortError::Validation(_)));
        assert_eq!(wizard.active_step(), WizardStep::Schedule);
        assert_eq!(backend.count("create_booking"), 0);
    }

    #[tokio::test]
    async fn test_valid_submit_creates_one_booking() {
        let backend = FakeBackend::new();
        let mut wizard = filled();
        wizard.set_message("   ");

        let booking = wizard.submit(&backend).await.unwrap();
        assert_eq!(booking.name, "Jane Doe");
        assert_eq!(booking.date, date());
        assert!(booking.message.is_none());
        assert_eq!(backend.count("create_booking"), 1);
        assert_eq!(wizard.confirmation().map(|b| b.id.as_str()), Some("b1"));
    }

    #[tokio::test]
    async fn test_booked_slot_is_rejected_after_loading_availability() {
        let backend = FakeBackend::new();
        backend.booked_slots.lock().unwrap().push("10:00 AM".into());
        let mut wizard = filled();

        wizard.load_availability(&backend).await.unwrap();
        assert!(wizard.errors().contains("time"));
        assert!(!wizard.open_slots().contains(&"10:00 AM"));
        assert!(wizard.open_slots().contains(&"11:00 AM"));

        wizard.set_time("11:00 AM");
        assert!(wizard.validate_step(WizardStep::Schedule).is_empty());
    }

    #[tokio::test]
    async fn test_server_failure_keeps_the_form() {
        let backend = FakeBackend::new();
        backend.fail_next(PortError::Server {
            status: 409,
            message: "Slot taken".into(),
        });
        let mut wizard = filled();
        let err = wizard.submit(&backend).await.unwrap_err();
        assert_eq!(err.user_message(), "Slot taken");
        assert!(wizard.confirmation().is_none());
        assert_eq!(wizard.form().name, "Jane Doe");
    }
}
