//! services/portal/src/web/forms.rs
//!
//! Contact, newsletter and account forms. Each validates locally first and
//! only then calls its port.

use spa_portal_core::domain::{Contact, FieldErrors, NewContact, Registration, Role, Upload, User};
use spa_portal_core::ports::{AuthService, ContactService, NewsletterService, PortError, PortResult};
use tracing::{info, warn};

use crate::web::session::AuthSession;
use crate::web::validation::{is_valid_email, require, require_email};

fn rejected(errors: FieldErrors) -> PortResult<()> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(PortError::Validation(errors))
    }
}

//=========================================================================================
// Contact Form
//=========================================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

impl ContactForm {
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        require(&mut errors, "name", &self.name, "Name is required");
        require_email(&mut errors, "email", &self.email);
        require(&mut errors, "message", &self.message, "Message is required");
        errors
    }

    /// An empty subject is left out of the request.
    pub fn to_new_contact(&self) -> NewContact {
        let subject = self.subject.trim();
        NewContact {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            subject: (!subject.is_empty()).then(|| subject.to_string()),
            message: self.message.trim().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ContactPhase {
    Editing,
    /// The confirmation view, shown in place of the form.
    Sent(Contact),
}

#[derive(Debug, Clone)]
pub struct ContactFlow {
    pub form: ContactForm,
    errors: FieldErrors,
    phase: ContactPhase,
}

impl Default for ContactFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl ContactFlow {
    pub fn new() -> Self {
        Self {
            form: ContactForm::default(),
            errors: FieldErrors::new(),
            phase: ContactPhase::Editing,
        }
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn phase(&self) -> &ContactPhase {
        &self.phase
    }

    /// One `create_contact` call per valid submit. On failure the form stays
    /// as typed so the visitor can try again.
    pub async fn submit(&mut self, contacts: &dyn ContactService) -> PortResult<&Contact> {
        if matches!(self.phase, ContactPhase::Sent(_)) {
            return Err(PortError::Validation({
                let mut errors = FieldErrors::new();
                errors.insert("form", "This message has already been sent");
                errors
            }));
        }
        self.errors = self.form.validate();
        if !self.errors.is_empty() {
            return Err(PortError::Validation(self.errors.clone()));
        }

        let contact = contacts
            .create_contact(&self.form.to_new_contact())
            .await
            .map_err(|e| {
                warn!("Contact form submission failed: {}", e);
                e
            })?;
        info!("Contact message {} received", contact.id);
        self.phase = ContactPhase::Sent(contact);
        match &self.phase {
            ContactPhase::Sent(contact) => Ok(contact),
            ContactPhase::Editing => Err(PortError::Decode("contact was not recorded".to_string())),
        }
    }

    /// "Send another message".
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

//=========================================================================================
// Newsletter Signup
//=========================================================================================

#[derive(Debug, Clone, Default)]
pub struct NewsletterForm {
    pub email: String,
    errors: FieldErrors,
    subscribed: bool,
}

impl NewsletterForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscribed
    }

    pub async fn submit(&mut self, newsletter: &dyn NewsletterService) -> PortResult<()> {
        let mut errors = FieldErrors::new();
        require_email(&mut errors, "email", &self.email);
        self.errors = errors.clone();
        rejected(errors)?;

        newsletter.subscribe(self.email.trim()).await?;
        self.subscribed = true;
        self.email.clear();
        Ok(())
    }
}

//=========================================================================================
// Admin Login and Registration
//=========================================================================================

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    /// Email or username.
    pub identifier: String,
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        require(&mut errors, "identifier", &self.identifier, "Email or username is required");
        require(&mut errors, "password", &self.password, "Password is required");
        errors
    }

    pub async fn submit<'s>(&self, session: &'s mut AuthSession) -> PortResult<&'s User> {
        rejected(self.validate())?;
        session.login(self.identifier.trim(), &self.password).await
    }
}

pub const MIN_PASSWORD_LENGTH: usize = 8;

#[derive(Debug, Clone, Default)]
pub struct RegistrationForm {
    pub name: String,
    pub email: String,
    pub username: String,
    pub mobile: String,
    pub password: String,
    pub confirm_password: String,
    pub role: Role,
    pub profile_picture: Option<Upload>,
}

impl RegistrationForm {
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        require(&mut errors, "name", &self.name, "Name is required");
        require_email(&mut errors, "email", &self.email);
        require(&mut errors, "username", &self.username, "Username is required");
        require(&mut errors, "mobile", &self.mobile, "Mobile number is required");
        check_new_password(&mut errors, &self.password, &self.confirm_password);
        if let Some(upload) = &self.profile_picture {
            if !upload.content_type.starts_with("image/") {
                errors.insert("profilePicture", "Profile picture must be an image");
            }
        }
        errors
    }

    pub fn to_registration(&self) -> Registration {
        Registration {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            username: self.username.trim().to_string(),
            mobile: self.mobile.trim().to_string(),
            password: self.password.clone(),
            role: self.role,
            profile_picture: self.profile_picture.clone(),
        }
    }

    pub async fn submit<'s>(&self, session: &'s mut AuthSession) -> PortResult<&'s User> {
        rejected(self.validate())?;
        session.register(self.to_registration()).await
    }
}

fn check_new_password(errors: &mut FieldErrors, password: &str, confirm: &str) {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        errors.insert(
            "password",
            format!("Password must be at least {} characters", MIN_PASSWORD_LENGTH),
        );
    }
    if password != confirm {
        errors.insert("confirmPassword", "Passwords do not match");
    }
}

//=========================================================================================
// Password Change
//=========================================================================================

#[derive(Debug, Clone, Default)]
pub struct PasswordChange {
    pub current: String,
    pub new_password: String,
    pub confirm: String,
}

impl PasswordChange {
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        require(&mut errors, "currentPassword", &self.current, "Current password is required");
        check_new_password(&mut errors, &self.new_password, &self.confirm);
        // A length problem is reported first; it already blocks the change.
        if !self.current.is_empty()
            && self.current == self.new_password
            && !errors.contains("password")
        {
            errors.insert("password", "New password must differ from the current one");
        }
        errors
    }

    pub async fn submit(&self, auth: &dyn AuthService) -> PortResult<()> {
        rejected(self.validate())?;
        auth.change_password(&self.current, &self.new_password).await
    }
}

/// Whether `identifier` looks like an email rather than a username.
pub fn is_email_identifier(identifier: &str) -> bool {
    is_valid_email(identifier)
}
