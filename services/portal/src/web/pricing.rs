//! services/portal/src/web/pricing.rs
//!
//! Price and duration lookups built from the service records the admin
//! pages already fetched.

use spa_portal_core::domain::{Booking, DurationOption, Service};
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct PriceBook {
    by_key: HashMap<String, Vec<DurationOption>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RevenueEstimate {
    pub total: f64,
    pub priced: usize,
    /// Billable bookings whose service is not in the price book.
    pub unpriced: usize,
}

fn key(name: &str) -> String {
    name.trim().to_lowercase()
}

impl PriceBook {
    pub fn from_services(services: &[Service]) -> Self {
        let mut by_key = HashMap::new();
        for service in services {
            let mut durations = service.durations.clone();
            durations.sort_by_key(|d| d.minutes);
            by_key.insert(key(&service.slug), durations.clone());
            by_key.insert(key(&service.name), durations);
        }
        Self { by_key }
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }

    pub fn durations(&self, service: &str) -> Option<&[DurationOption]> {
        self.by_key.get(&key(service)).map(Vec::as_slice)
    }

    /// The price of `service` for `minutes`, or of its shortest option when
    /// no length is given.
    pub fn price_for(&self, service: &str, minutes: Option<u32>) -> Option<f64> {
        let durations = self.durations(service)?;
        match minutes {
            Some(m) => durations.iter().find(|d| d.minutes == m).map(|d| d.price),
            None => durations.first().map(|d| d.price),
        }
    }

    pub fn default_duration(&self, service: &str) -> Option<u32> {
        self.durations(service)?.first().map(|d| d.minutes)
    }

    /// Sums the default price of every confirmed or completed booking.
    pub fn estimate_revenue(&self, bookings: &[Booking]) -> RevenueEstimate {
        bookings
            .iter()
            .filter(|b| b.status.is_billable())
            .fold(RevenueEstimate::default(), |mut acc, booking| {
                match self.price_for(&booking.service, None) {
                    Some(price) => {
                        acc.total += price;
                        acc.priced += 1;
                    }
                    None => acc.unpriced += 1,
                }
                acc
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::catalog::SIGNATURE_SERVICES;
    use chrono::NaiveDate;
    use spa_portal_core::domain::BookingStatus;

    fn booking(service: &str, status: BookingStatus) -> Booking {
        Booking {
            id: format!("{}-{:?}", service, status),
            name: "Jane Doe".into(),
            phone: "555-0100".into(),
            email: "jane@example.com".into(),
            service: service.into(),
            therapist: None,
            date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            time: "10:00 AM".into(),
            message: None,
            status,
            created_at: None,
            updated_at: None,
        }
    }

    fn book() -> PriceBook {
        let services: Vec<Service> = SIGNATURE_SERVICES.iter().map(|e| e.to_service()).collect();
        PriceBook::from_services(&services)
    }

    #[test]
    fn test_lookup_by_name_or_slug() {
        let prices = book();
        assert_eq!(prices.price_for("Swedish Massage", None), Some(85.0));
        assert_eq!(prices.price_for("swedish-massage", Some(90)), Some(120.0));
        assert_eq!(prices.price_for("swedish massage", Some(45)), None);
        assert_eq!(prices.default_duration("Hot Stone Therapy"), Some(75));
    }

    #[test]
    fn test_revenue_counts_only_billable_bookings() {
        let prices = book();
        let bookings = vec![
            booking("Swedish Massage", BookingStatus::Confirmed),
            booking("Signature Facial", BookingStatus::Completed),
            booking("Swedish Massage", BookingStatus::Cancelled),
            booking("Mystery Ritual", BookingStatus::Confirmed),
        ];
        let estimate = prices.estimate_revenue(&bookings);
        assert_eq!(estimate.total, 155.0);
        assert_eq!(estimate.priced, 2);
        assert_eq!(estimate.unpriced, 1);
    }
}
