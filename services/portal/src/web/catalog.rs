//! services/portal/src/web/catalog.rs
//!
//! Static content for the public pages: the signature service menu shown
//! when the backend has nothing to offer, the FAQ, the gallery and the
//! bookable time slots.

use spa_portal_core::domain::{DurationOption, Service};

pub struct CatalogEntry {
    pub slug: &'static str,
    pub name: &'static str,
    pub category: &'static str,
    pub short_description: &'static str,
    /// (minutes, price)
    pub durations: &'static [(u32, f64)],
    pub featured: bool,
    pub popular: bool,
    pub benefits: &'static [&'static str],
}

impl CatalogEntry {
    pub fn to_service(&self) -> Service {
        Service {
            id: self.slug.to_string(),
            slug: self.slug.to_string(),
            name: self.name.to_string(),
            short_description: self.short_description.to_string(),
            description: self.short_description.to_string(),
            durations: self
                .durations
                .iter()
                .map(|&(minutes, price)| DurationOption { minutes, price })
                .collect(),
            price_range: None,
            category: self.category.to_string(),
            featured: self.featured,
            popular: self.popular,
            benefits: self.benefits.iter().map(|b| b.to_string()).collect(),
            ideal_for: Vec::new(),
            what_to_expect: Vec::new(),
            is_active: true,
        }
    }
}

pub const SIGNATURE_SERVICES: &[CatalogEntry] = &[
    CatalogEntry {
        slug: "swedish-massage",
        name: "Swedish Massage",
        category: "massage",
        short_description: "Long, flowing strokes to ease tension and improve circulation.",
        durations: &[(60, 85.0), (90, 120.0)],
        featured: true,
        popular: true,
        benefits: &["Relieves muscle tension", "Improves circulation", "Promotes deep relaxation"],
    },
    CatalogEntry {
        slug: "deep-tissue-massage",
        name: "Deep Tissue Massage",
        category: "massage",
        short_description: "Firm pressure targeting the deeper layers of muscle.",
        durations: &[(60, 95.0), (90, 135.0)],
        featured: true,
        popular: false,
        benefits: &["Breaks up knots", "Eases chronic pain"],
    },
    CatalogEntry {
        slug: "hot-stone-therapy",
        name: "Hot Stone Therapy",
        category: "massage",
        short_description: "Heated basalt stones melt away stiffness.",
        durations: &[(75, 110.0)],
        featured: false,
        popular: true,
        benefits: &["Warms and loosens muscles", "Calms the nervous system"],
    },
    CatalogEntry {
        slug: "signature-facial",
        name: "Signature Facial",
        category: "facial",
        short_description: "Cleanse, exfoliate and hydrate for a lasting glow.",
        durations: &[(45, 70.0), (60, 90.0)],
        featured: true,
        popular: false,
        benefits: &["Deep cleansing", "Restores hydration"],
    },
    CatalogEntry {
        slug: "aromatherapy-body-wrap",
        name: "Aromatherapy Body Wrap",
        category: "body",
        short_description: "Essential oils and a warm wrap to detoxify and soften skin.",
        durations: &[(60, 100.0)],
        featured: false,
        popular: false,
        benefits: &["Softens skin", "Supports detoxification"],
    },
];

pub fn find(slug: &str) -> Option<&'static CatalogEntry> {
    SIGNATURE_SERVICES.iter().find(|entry| entry.slug == slug)
}

pub fn featured() -> impl Iterator<Item = &'static CatalogEntry> {
    SIGNATURE_SERVICES.iter().filter(|entry| entry.featured)
}

pub struct Faq {
    pub question: &'static str,
    pub answer: &'static str,
}

pub const FAQS: &[Faq] = &[
    Faq {
        question: "How early should I arrive for my appointment?",
        answer: "Please arrive 15 minutes early so you can settle in and complete a short \
                 intake form.",
    },
    Faq {
        question: "What is your cancellation policy?",
        answer: "Cancel or reschedule at least 24 hours ahead to avoid a late-cancellation fee.",
    },
    Faq {
        question: "Can I request a specific therapist?",
        answer: "Yes. Choose a therapist while booking, or leave it open and we will match you.",
    },
    Faq {
        question: "Do you offer gift cards?",
        answer: "Gift cards are available at reception and can be used for any service.",
    },
];

pub struct GalleryImage {
    pub src: &'static str,
    pub alt: &'static str,
    pub category: &'static str,
}

pub const GALLERY: &[GalleryImage] = &[
    GalleryImage {
        src: "/images/gallery/reception.jpg",
        alt: "Reception lounge",
        category: "interior",
    },
    GalleryImage {
        src: "/images/gallery/massage-room.jpg",
        alt: "Couples massage room",
        category: "interior",
    },
    GalleryImage {
        src: "/images/gallery/hot-stones.jpg",
        alt: "Hot stone setup",
        category: "treatments",
    },
    GalleryImage {
        src: "/images/gallery/facial.jpg",
        alt: "Facial treatment",
        category: "treatments",
    },
];

pub fn gallery_in(category: &str) -> impl Iterator<Item = &'static GalleryImage> + '_ {
    GALLERY.iter().filter(move |image| image.category == category)
}

/// Appointment start times offered by the booking form.
pub const TIME_SLOTS: &[&str] = &[
    "09:00 AM", "10:00 AM", "11:00 AM", "12:00 PM", "01:00 PM", "02:00 PM", "03:00 PM",
    "04:00 PM", "05:00 PM", "06:00 PM", "07:00 PM",
];
