//! services/portal/src/web/pages.rs
//!
//! Data loaders for the public pages and the admin dashboard, analytics and
//! settings screens. Each page keeps a `PageState` so the caller can show a
//! spinner, the data, or an inline error with a retry.

use futures::join;
use spa_portal_core::domain::{
    Analytics, AnalyticsPeriod, Booking, BookingStatus, Category, ContactStatus, DashboardStats,
    ListQuery, ProfileUpdate, Service, StatusCounts, Therapist, User,
};
use spa_portal_core::ports::{
    BookingService, CatalogService, ContactService, InsightsService, NewsletterService,
    PortError, PortResult, TherapistService,
};
use std::future::Future;
use tracing::warn;

use crate::web::catalog;
use crate::web::forms::PasswordChange;
use crate::web::session::AuthSession;

//=========================================================================================
// PageState
//=========================================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct PageState<T> {
    pub data: Option<T>,
    pub loading: bool,
    pub error: Option<String>,
}

impl<T> Default for PageState<T> {
    fn default() -> Self {
        Self {
            data: None,
            loading: false,
            error: None,
        }
    }
}

impl<T> PageState<T> {
    /// Runs `load`. A failure keeps whatever data was already shown and
    /// records the server's message, or `fallback` when there is none.
    pub async fn load_with<F>(&mut self, fallback: &str, load: F) -> PortResult<&T>
    where
        F: Future<Output = PortResult<T>>,
    {
        self.loading = true;
        let result = load.await;
        self.loading = false;

        match result {
            Ok(data) => {
                self.error = None;
                Ok(self.data.insert(data))
            }
            Err(e) => {
                warn!("{}: {}", fallback, e);
                self.error = Some(
                    e.server_message()
                        .filter(|m| !m.is_empty())
                        .unwrap_or(fallback)
                        .to_string(),
                );
                Err(e)
            }
        }
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }
}

//=========================================================================================
// Public Pages
//=========================================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct HomeContent {
    pub featured_services: Vec<Service>,
    pub featured_therapists: Vec<Therapist>,
}

#[derive(Debug, Default)]
pub struct HomePage {
    pub state: PageState<HomeContent>,
}

impl HomePage {
    /// The two lists load concurrently. When the services request fails or
    /// comes back empty the built-in signature menu is shown instead; a
    /// therapist failure just hides that section.
    pub async fn load(
        &mut self,
        services: &dyn CatalogService,
        therapists: &dyn TherapistService,
    ) -> PortResult<&HomeContent> {
        let active = ListQuery::new().active(true);
        let (service_page, therapist_page) =
            join!(services.get_services(&active), therapists.get_therapists(&active));

        let mut featured_services: Vec<Service> = match service_page {
            Ok(page) => page.items.into_iter().filter(|s| s.featured).collect(),
            Err(e) => {
                warn!("Falling back to the signature menu: {}", e);
                Vec::new()
            }
        };
        if featured_services.is_empty() {
            featured_services = catalog::featured().map(|entry| entry.to_service()).collect();
        }

        let featured_therapists = therapist_page
            .map(|page| page.items.into_iter().filter(|t| t.is_featured).collect())
            .unwrap_or_default();

        let content = HomeContent {
            featured_services,
            featured_therapists,
        };
        self.state
            .load_with("Failed to load the home page", async { Ok(content) })
            .await
    }
}

#[derive(Debug, Default)]
pub struct ServicesPage {
    pub categories: Vec<Category>,
    pub state: PageState<Vec<Service>>,
    selected: Option<String>,
}

impl ServicesPage {
    pub async fn load(&mut self, catalog: &dyn CatalogService) -> PortResult<()> {
        let active = ListQuery::new().active(true);
        let (categories, services) = join!(catalog.get_service_categories(), async {
            catalog.get_services(&active).await.map(|page| page.items)
        });

        self.categories = categories.unwrap_or_else(|e| {
            warn!("Service categories unavailable: {}", e);
            Vec::new()
        });
        self.state
            .load_with("Failed to load services", async { services })
            .await?;
        Ok(())
    }

    pub fn selected_category(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// `None` (or "all") shows every service.
    pub fn select_category(&mut self, category: Option<&str>) {
        self.selected = category
            .filter(|c| !c.is_empty() && *c != "all")
            .map(str::to_string);
    }

    pub fn visible(&self) -> Vec<&Service> {
        let Some(services) = self.state.data() else {
            return Vec::new();
        };
        services
            .iter()
            .filter(|s| self.selected.as_deref().map_or(true, |c| s.category == c))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceView {
    pub service: Service,
    /// True when the backend did not have it and the built-in menu did.
    pub from_catalog: bool,
}

#[derive(Debug, Default)]
pub struct ServiceDetail {
    pub state: PageState<ServiceView>,
}

impl ServiceDetail {
    pub async fn load(
        &mut self,
        catalog: &dyn CatalogService,
        slug: &str,
    ) -> PortResult<&ServiceView> {
        let fetched = catalog.get_service(slug).await;
        let view = match fetched {
            Ok(service) => Ok(ServiceView {
                service,
                from_catalog: false,
            }),
            Err(e) => match catalog::find(slug) {
                Some(entry) => {
                    warn!("Showing '{}' from the built-in menu: {}", slug, e);
                    Ok(ServiceView {
                        service: entry.to_service(),
                        from_catalog: true,
                    })
                }
                None => Err(e),
            },
        };
        self.state.load_with("Service not found", async { view }).await
    }
}

//=========================================================================================
// Admin Dashboard
//=========================================================================================

pub const RECENT_BOOKINGS: u32 = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub stats: DashboardStats,
    pub bookings: StatusCounts<BookingStatus>,
    pub contacts: StatusCounts<ContactStatus>,
    pub subscribers: u64,
    pub recent_bookings: Vec<Booking>,
}

/// The backend ports the dashboard reads from.
pub trait DashboardSource:
    InsightsService + BookingService + ContactService + NewsletterService
{
}

impl<B> DashboardSource for B where
    B: InsightsService + BookingService + ContactService + NewsletterService + ?Sized
{
}

#[derive(Debug, Default)]
pub struct DashboardPage {
    pub state: PageState<Dashboard>,
}

impl DashboardPage {
    /// All five requests run at once; any failure fails the page.
    pub async fn load<B: DashboardSource + ?Sized>(
        &mut self,
        backend: &B,
    ) -> PortResult<&Dashboard> {
        let recent_query = ListQuery::new().page(1).limit(RECENT_BOOKINGS);
        let (stats, bookings, contacts, subscribers, recent) = join!(
            backend.get_dashboard_stats(),
            backend.get_booking_stats(),
            backend.get_contact_stats(),
            backend.get_subscriber_count(),
            backend.get_bookings(&recent_query),
        );

        let dashboard = (|| {
            Ok::<_, PortError>(Dashboard {
                stats: stats?,
                bookings: bookings?.counts(),
                contacts: contacts?.counts(),
                subscribers: subscribers?,
                recent_bookings: recent?.items,
            })
        })();
        self.state
            .load_with("Failed to load dashboard data", async { dashboard })
            .await
    }
}

#[derive(Debug, Default)]
pub struct AnalyticsPage {
    pub period: AnalyticsPeriod,
    pub state: PageState<Analytics>,
}

impl AnalyticsPage {
    pub async fn load(&mut self, insights: &dyn InsightsService) -> PortResult<&Analytics> {
        let period = self.period;
        self.state
            .load_with("Failed to load analytics", insights.get_analytics(period))
            .await
    }

    /// Switches the period and reloads; a no-op when it is already selected.
    pub async fn set_period(
        &mut self,
        insights: &dyn InsightsService,
        period: AnalyticsPeriod,
    ) -> PortResult<&Analytics> {
        let loaded = self.period == period
            && self.state.data.as_ref().is_some_and(|data| data.period == period);
        if !loaded {
            self.period = period;
            self.load(insights).await?;
        }
        self.state
            .data
            .as_ref()
            .ok_or_else(|| PortError::Decode("analytics missing after load".to_string()))
    }
}

//=========================================================================================
// Admin Settings
//=========================================================================================

#[derive(Debug, Default)]
pub struct SettingsPage {
    pub profile: ProfileUpdate,
    pub password: PasswordChange,
    pub notice: Option<String>,
}

impl SettingsPage {
    /// Pre-fills the profile form from the signed-in user.
    pub fn for_user(user: &User) -> Self {
        Self {
            profile: ProfileUpdate {
                name: Some(user.name.clone()),
                email: Some(user.email.clone()),
                username: Some(user.username.clone()),
                mobile: Some(user.mobile.clone()),
                profile_picture: None,
            },
            ..Default::default()
        }
    }

    /// Saves the profile and swaps the session's user for the server's copy.
    pub async fn save_profile(&mut self, session: &mut AuthSession) -> PortResult<()> {
        let auth = session.auth_service();
        let user = auth.update_profile(self.profile.clone()).await?;
        session.set_user(user)?;
        self.profile.profile_picture = None;
        self.notice = Some("Profile updated successfully".to_string());
        Ok(())
    }

    pub async fn change_password(&mut self, session: &AuthSession) -> PortResult<()> {
        let auth = session.auth_service();
        self.password.submit(&*auth).await?;
        self.password = PasswordChange::default();
        self.notice = Some("Password changed successfully".to_string());
        Ok(())
    }
}
