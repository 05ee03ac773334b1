pub mod domain;
pub mod ports;

pub use domain::{
    Analytics, AnalyticsPeriod, AuthPayload, Availability, Booking, BookingStats, BookingStatus,
    BookingUpdate, Category, Contact, ContactStats, ContactStatus, ContactUpdate, DashboardStats,
    DurationOption, Envelope, FieldErrors, ListQuery, NewBooking, NewContact, Paginated,
    Pagination, PriceRange, ProfileUpdate, Registration, Role, Service, ServiceInput,
    StatusCounts, Subscriber, SubscriberStatus, Therapist, TherapistInput, Upload, User,
};
pub use ports::{
    AuthService, BookingService, CatalogService, ContactService, ErrorKind, InsightsService,
    NewsletterService, PortError, PortResult, SessionStore, TherapistService,
};
