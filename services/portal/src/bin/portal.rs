//! services/portal/src/bin/portal.rs

use chrono::NaiveDate;
use portal_lib::{
    config::Config,
    error::AppError,
    web::{
        admin::AdminList,
        booking::BookingWizard,
        catalog::TIME_SLOTS,
        forms::LoginForm,
        pages::DashboardPage,
        pricing::PriceBook,
        routes::AdminPage,
        state::AppState,
        GuardDecision, Route,
    },
};
use spa_portal_core::domain::{
    Booking, BookingStatus, Contact, ContactStatus, ListQuery, PriceRange,
};
use spa_portal_core::ports::{BookingService, CatalogService, ContactService};
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const USAGE: &str = "usage: portal <command> [args]

commands:
  login <email-or-username>   sign in (password is read from stdin)
  logout                      forget the saved session
  whoami                      show the signed-in admin
  services                    list the active services
  availability <YYYY-MM-DD>   show open booking slots for a day
  dashboard                   admin overview
  bookings [status]           list bookings, optionally by status
  contacts [status]           list contact messages, optionally by status
  search <term>               search bookings by name, email or phone";

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
    info!("Configuration loaded. Backend at {}", config.api_base_url);

    // --- 2. Build the Client & Restore the Session ---
    let mut state = AppState::new(config)?;

    // --- 3. Dispatch ---
    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first().map(String::as_str) else {
        println!("{}", USAGE);
        return Ok(());
    };
    let arg = args.get(1).map(String::as_str);

    match command {
        "login" => login(&mut state, arg).await,
        "logout" => {
            state.session.logout()?;
            println!("Signed out.");
            Ok(())
        }
        "whoami" => whoami(&state),
        "services" => services(&state).await,
        "availability" => availability(&state, arg).await,
        "dashboard" => dashboard(&state).await,
        "bookings" => bookings(&state, arg).await,
        "contacts" => contacts(&state, arg).await,
        "search" => search(&state, arg).await,
        "help" | "--help" | "-h" => {
            println!("{}", USAGE);
            Ok(())
        }
        other => Err(AppError::Usage(format!("unknown command '{}'\n\n{}", other, USAGE))),
    }
}

//=========================================================================================
// Commands
//=========================================================================================

async fn login(state: &mut AppState, identifier: Option<&str>) -> Result<(), AppError> {
    if let GuardDecision::Redirect(_) = state.check(Route::AdminLogin) {
        println!("Already signed in. Run `portal logout` first.");
        return Ok(());
    }
    let identifier =
        identifier.ok_or_else(|| AppError::Usage("login needs an email or username".into()))?;

    eprint!("Password: ");
    io::stderr().flush()?;
    let mut password = String::new();
    io::stdin().lock().read_line(&mut password)?;

    let form = LoginForm {
        identifier: identifier.to_string(),
        password: password.trim_end_matches(['\r', '\n']).to_string(),
    };
    let user = form.submit(&mut state.session).await?;
    println!("Signed in as {} <{}>", user.name, user.email);
    Ok(())
}

fn whoami(state: &AppState) -> Result<(), AppError> {
    match state.session.user() {
        Some(user) => println!("{} <{}> ({:?})", user.name, user.email, user.role),
        None => println!("Not signed in."),
    }
    Ok(())
}

/// Fails unless the admin page would render for the current session.
fn require_admin(state: &AppState, page: AdminPage) -> Result<(), AppError> {
    match state.check(Route::Admin(page)) {
        GuardDecision::Render(_) => Ok(()),
        _ => Err(AppError::Usage(
            "this command needs an admin session; run `portal login <email-or-username>`".into(),
        )),
    }
}

async fn services(state: &AppState) -> Result<(), AppError> {
    let page = state.client.get_services(&ListQuery::new().active(true)).await?;
    for service in &page.items {
        let price = service
            .price_range()
            .map(|range: PriceRange| range.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!("{:<28} {:<10} {}", service.name, service.category, price);
    }
    Ok(())
}

async fn availability(state: &AppState, date: Option<&str>) -> Result<(), AppError> {
    let raw =
        date.ok_or_else(|| AppError::Usage("availability needs a date (YYYY-MM-DD)".into()))?;
    let day = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|e| AppError::Usage(format!("'{}' is not a date: {}", raw, e)))?;

    let mut wizard = BookingWizard::new();
    wizard.set_date(day);
    wizard.load_availability(&*state.client).await?;
    let open = wizard.open_slots();
    println!("{}: {} of {} slots open", day, open.len(), TIME_SLOTS.len());
    for slot in open {
        println!("  {}", slot);
    }
    Ok(())
}

async fn dashboard(state: &AppState) -> Result<(), AppError> {
    require_admin(state, AdminPage::Dashboard)?;
    let mut page = DashboardPage::default();
    let data = page.load(&*state.client).await?;

    println!(
        "Bookings:    {} total, {} today",
        data.stats.total_bookings, data.stats.today_bookings
    );
    for status in BookingStatus::ALL {
        println!("  {:<10} {}", status, data.bookings.get(status));
    }
    println!("Contacts:    {} total", data.contacts.total);
    for status in ContactStatus::ALL {
        println!("  {:<10} {}", status, data.contacts.get(status));
    }
    println!("Subscribers: {}", data.subscribers);
    println!("Recent bookings:");
    for booking in &data.recent_bookings {
        print_booking(booking);
    }
    Ok(())
}

async fn bookings(state: &AppState, status: Option<&str>) -> Result<(), AppError> {
    require_admin(state, AdminPage::Bookings)?;
    let status = status.map(parse_booking_status).transpose()?;

    let mut list = AdminList::<Booking>::new();
    list.set_status_filter(status);
    let all_services = ListQuery::new();
    let (loaded, services) = futures::join!(
        list.load(&*state.client),
        state.client.get_services(&all_services)
    );
    loaded?;

    for booking in list.visible() {
        print_booking(booking);
    }

    // Revenue is only an estimate when some services have no price on record.
    if let Ok(services) = services {
        let estimate = PriceBook::from_services(&services.items).estimate_revenue(list.items());
        println!(
            "Estimated revenue: ${:.2} from {} bookings ({} unpriced)",
            estimate.total, estimate.priced, estimate.unpriced
        );
    }
    Ok(())
}

async fn contacts(state: &AppState, status: Option<&str>) -> Result<(), AppError> {
    require_admin(state, AdminPage::Contacts)?;
    let status = status
        .map(|raw| {
            ContactStatus::ALL
                .into_iter()
                .find(|s| s.as_str() == raw)
                .ok_or_else(|| AppError::Usage(format!("unknown contact status '{}'", raw)))
        })
        .transpose()?;

    let mut list = AdminList::<Contact>::new();
    list.set_status_filter(status);
    list.load(&*state.client).await?;
    list.load_counts(state.client.get_contact_stats().await?.counts());

    for contact in list.visible() {
        println!(
            "{:<10} {:<24} {:<28} {}",
            contact.status,
            contact.name,
            contact.email,
            contact.subject.as_deref().unwrap_or("(no subject)")
        );
    }
    println!("{} new of {}", list.counts().get(ContactStatus::New), list.counts().total);
    Ok(())
}

async fn search(state: &AppState, term: Option<&str>) -> Result<(), AppError> {
    require_admin(state, AdminPage::Bookings)?;
    let term = term.ok_or_else(|| AppError::Usage("search needs a term".into()))?;

    let (mut debouncer, mut results) = state.search::<Vec<Booking>>();
    let client = Arc::clone(&state.client);
    debouncer.submit(term, move |term| async move {
        client
            .get_bookings(&ListQuery::new().search(term))
            .await
            .map(|page| page.items)
    });

    let Some(outcome) = results.next().await else {
        return Ok(());
    };
    for booking in outcome.result? {
        print_booking(&booking);
    }
    Ok(())
}

//=========================================================================================
// Helpers
//=========================================================================================

fn parse_booking_status(raw: &str) -> Result<BookingStatus, AppError> {
    BookingStatus::ALL
        .into_iter()
        .find(|s| s.as_str() == raw)
        .ok_or_else(|| AppError::Usage(format!("unknown booking status '{}'", raw)))
}

fn print_booking(booking: &Booking) {
    println!(
        "{} {:<8} {:<10} {:<22} {}",
        booking.date, booking.time, booking.status, booking.name, booking.service
    );
}
