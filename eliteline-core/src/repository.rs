use async_trait::async_trait;
use uuid::Uuid;

use crate::booking::{Booking, BookingUpdate};

/// Repository trait for booking persistence
#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn insert(
        &self,
        booking: &Booking,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    async fn find_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<Booking>, Box<dyn std::error::Error + Send + Sync>>;

    async fn find_by_reference(
        &self,
        reference: &str,
    ) -> Result<Option<Booking>, Box<dyn std::error::Error + Send + Sync>>;

    /// Applies a partial update and returns the record after the update.
    /// Returns None when no booking matched. Must never overwrite
    /// `created_at` or `booking_ref`.
    async fn update(
        &self,
        id: Uuid,
        update: &BookingUpdate,
    ) -> Result<Option<Booking>, Box<dyn std::error::Error + Send + Sync>>;

    /// Conditional `pending_payment -> paid` transition. Returns true only
    /// when a row actually moved to paid, false when the booking was
    /// already paid or does not exist.
    async fn mark_paid_by_reference(
        &self,
        reference: &str,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>>;

    /// Returns false (not an error) when no booking matched.
    async fn delete(
        &self,
        id: Uuid,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>>;

    /// All bookings, newest first.
    async fn list_all(
        &self,
    ) -> Result<Vec<Booking>, Box<dyn std::error::Error + Send + Sync>>;
}

/// Repository trait for the named atomic counters backing booking
/// references. `next_seq` must be a single atomic increment-and-read: two
/// concurrent callers can never observe the same value.
#[async_trait]
pub trait SequenceRepository: Send + Sync {
    async fn next_seq(
        &self,
        name: &str,
    ) -> Result<i64, Box<dyn std::error::Error + Send + Sync>>;
}
