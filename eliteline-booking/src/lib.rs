pub mod lifecycle;
pub mod locations;
pub mod metadata;
pub mod normalize;
pub mod reference;
pub mod summary;
pub mod tariff;

pub use lifecycle::{BookingService, CreatedBooking, EnquiryForm};
