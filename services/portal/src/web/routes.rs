//! services/portal/src/web/routes.rs
//!
//! The portal's route table and the guard that decides, from the session
//! state alone, whether a route may render.

use crate::web::session::SessionState;
use std::fmt;

//=========================================================================================
// Routes
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminPage {
    Dashboard,
    Bookings,
    Contacts,
    Subscribers,
    Services,
    Therapists,
    Analytics,
    Settings,
}

impl AdminPage {
    pub const ALL: [AdminPage; 8] = [
        AdminPage::Dashboard,
        AdminPage::Bookings,
        AdminPage::Contacts,
        AdminPage::Subscribers,
        AdminPage::Services,
        AdminPage::Therapists,
        AdminPage::Analytics,
        AdminPage::Settings,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            AdminPage::Dashboard => "dashboard",
            AdminPage::Bookings => "bookings",
            AdminPage::Contacts => "contacts",
            AdminPage::Subscribers => "subscribers",
            AdminPage::Services => "services",
            AdminPage::Therapists => "therapists",
            AdminPage::Analytics => "analytics",
            AdminPage::Settings => "settings",
        }
    }

    fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|page| page.slug() == slug)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Services,
    ServiceDetail(String),
    Gallery,
    Booking,
    Contact,
    Faq,
    AdminLogin,
    AdminRegister,
    Admin(AdminPage),
    NotFound,
}

impl Route {
    /// Maps a URL path (query string and fragment allowed) onto a route.
    ///
    /// Unknown paths under `/admin` land on the dashboard; unknown public
    /// paths are `NotFound`.
    pub fn parse(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or("");
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            [] => Route::Home,
            ["services"] => Route::Services,
            ["services", slug] => Route::ServiceDetail((*slug).to_string()),
            ["gallery"] => Route::Gallery,
            ["booking"] => Route::Booking,
            ["contact"] => Route::Contact,
            ["faq"] => Route::Faq,
            ["admin", "login"] => Route::AdminLogin,
            ["admin", "register"] => Route::AdminRegister,
            ["admin"] => Route::Admin(AdminPage::Dashboard),
            ["admin", page, ..] => {
                Route::Admin(AdminPage::from_slug(page).unwrap_or(AdminPage::Dashboard))
            }
            _ => Route::NotFound,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Services => "/services".to_string(),
            Route::ServiceDetail(slug) => format!("/services/{}", slug),
            Route::Gallery => "/gallery".to_string(),
            Route::Booking => "/booking".to_string(),
            Route::Contact => "/contact".to_string(),
            Route::Faq => "/faq".to_string(),
            Route::AdminLogin => "/admin/login".to_string(),
            Route::AdminRegister => "/admin/register".to_string(),
            Route::Admin(page) => format!("/admin/{}", page.slug()),
            Route::NotFound => "/404".to_string(),
        }
    }

    /// Routes that need a signed-in admin.
    pub fn is_protected(&self) -> bool {
        matches!(self, Route::Admin(_))
    }

    /// The login and registration screens.
    pub fn is_auth_entry(&self) -> bool {
        matches!(self, Route::AdminLogin | Route::AdminRegister)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

//=========================================================================================
// Guard
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// The session is still being restored; show the neutral loading screen.
    Loading,
    Render(Route),
    Redirect(Route),
}

/// Decides what to show for `route`. Pure and synchronous: the token is not
/// re-validated here.
pub fn guard(route: Route, session: &SessionState) -> GuardDecision {
    if session.loading {
        return GuardDecision::Loading;
    }
    let signed_in = session.is_authenticated();
    if route.is_protected() && !signed_in {
        return GuardDecision::Redirect(Route::AdminLogin);
    }
    if route.is_auth_entry() && signed_in {
        return GuardDecision::Redirect(Route::Admin(AdminPage::Dashboard));
    }
    GuardDecision::Render(route)
}

/// Parses `path` and runs it through [`guard`].
pub fn resolve(path: &str, session: &SessionState) -> GuardDecision {
    guard(Route::parse(path), session)
}
