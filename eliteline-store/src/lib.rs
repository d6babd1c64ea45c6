pub mod app_config;
pub mod booking_repo;
pub mod database;

pub use booking_repo::{PgBookingRepository, PgSequenceRepository};
pub use database::DbClient;
