use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use eliteline_core::booking::{Booking, BookingStatus, BookingUpdate};
use eliteline_core::repository::{BookingRepository, SequenceRepository};

pub struct PgBookingRepository {
    pool: PgPool,
}

impl PgBookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal struct for type-safe querying
#[derive(sqlx::FromRow)]
struct BookingRow {
    id: Uuid,
    booking_ref: String,
    status: String,
    full_name: String,
    email: String,
    phone: String,
    trip_type: String,
    vehicle: String,
    standard_location_type: String,
    airport_code: String,
    city_code: String,
    pickup: String,
    dropoff: String,
    date: String,
    time: String,
    return_date: String,
    return_time: String,
    hours: String,
    wait_hours: String,
    terminal: String,
    flight_number: String,
    child_seat: bool,
    extra_stops: bool,
    extra_stop_address: String,
    direction: String,
    pickup_postcode: String,
    pickup_surcharge: String,
    journey_at: Option<chrono::DateTime<chrono::Utc>>,
    journey_day_of_week: String,
    price: i64,
    stripe_session_id: String,
    dispatcher: String,
    driver_info: String,
    vehicle_reg_badge: String,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl BookingRow {
    fn into_booking(self) -> Result<Booking, Box<dyn std::error::Error + Send + Sync>> {
        let status = BookingStatus::parse(&self.status)
            .ok_or_else(|| format!("unknown booking status {:?} in store", self.status))?;
        Ok(Booking {
            id: self.id,
            booking_ref: self.booking_ref,
            status,
            full_name: self.full_name,
            email: self.email,
            phone: self.phone,
            trip_type: self.trip_type,
            vehicle: self.vehicle,
            standard_location_type: self.standard_location_type,
            airport_code: self.airport_code,
            city_code: self.city_code,
            pickup: self.pickup,
            dropoff: self.dropoff,
            date: self.date,
            time: self.time,
            return_date: self.return_date,
            return_time: self.return_time,
            hours: self.hours,
            wait_hours: self.wait_hours,
            terminal: self.terminal,
            flight_number: self.flight_number,
            child_seat: self.child_seat,
            extra_stops: self.extra_stops,
            extra_stop_address: self.extra_stop_address,
            direction: self.direction,
            pickup_postcode: self.pickup_postcode,
            pickup_surcharge: self.pickup_surcharge,
            journey_at: self.journey_at,
            journey_day_of_week: self.journey_day_of_week,
            price: self.price,
            stripe_session_id: self.stripe_session_id,
            dispatcher: self.dispatcher,
            driver_info: self.driver_info,
            vehicle_reg_badge: self.vehicle_reg_badge,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const BOOKING_COLUMNS: &str = "id, booking_ref, status, full_name, email, phone, trip_type, \
     vehicle, standard_location_type, airport_code, city_code, pickup, dropoff, \
     date, time, return_date, return_time, hours, wait_hours, terminal, \
     flight_number, child_seat, extra_stops, extra_stop_address, direction, \
     pickup_postcode, pickup_surcharge, journey_at, journey_day_of_week, price, \
     stripe_session_id, dispatcher, driver_info, vehicle_reg_badge, created_at, updated_at";

#[async_trait]
impl BookingRepository for PgBookingRepository {
    async fn insert(
        &self,
        booking: &Booking,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let sql = format!(
            "INSERT INTO bookings ({}) VALUES \
             ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, \
              $17, $18, $19, $20, $21, $22, $23, $24, $25, $26, $27, $28, $29, $30, \
              $31, $32, $33, $34, $35, $36)",
            BOOKING_COLUMNS
        );
        sqlx::query(&sql)
            .bind(booking.id)
            .bind(&booking.booking_ref)
            .bind(booking.status.as_str())
            .bind(&booking.full_name)
            .bind(&booking.email)
            .bind(&booking.phone)
            .bind(&booking.trip_type)
            .bind(&booking.vehicle)
            .bind(&booking.standard_location_type)
            .bind(&booking.airport_code)
            .bind(&booking.city_code)
            .bind(&booking.pickup)
            .bind(&booking.dropoff)
            .bind(&booking.date)
            .bind(&booking.time)
            .bind(&booking.return_date)
            .bind(&booking.return_time)
            .bind(&booking.hours)
            .bind(&booking.wait_hours)
            .bind(&booking.terminal)
            .bind(&booking.flight_number)
            .bind(booking.child_seat)
            .bind(booking.extra_stops)
            .bind(&booking.extra_stop_address)
            .bind(&booking.direction)
            .bind(&booking.pickup_postcode)
            .bind(&booking.pickup_surcharge)
            .bind(booking.journey_at)
            .bind(&booking.journey_day_of_week)
            .bind(booking.price)
            .bind(&booking.stripe_session_id)
            .bind(&booking.dispatcher)
            .bind(&booking.driver_info)
            .bind(&booking.vehicle_reg_badge)
            .bind(booking.created_at)
            .bind(booking.updated_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<Booking>, Box<dyn std::error::Error + Send + Sync>> {
        let sql = format!("SELECT {} FROM bookings WHERE id = $1", BOOKING_COLUMNS);
        let row = sqlx::query_as::<_, BookingRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(BookingRow::into_booking).transpose()
    }

    async fn find_by_reference(
        &self,
        reference: &str,
    ) -> Result<Option<Booking>, Box<dyn std::error::Error + Send + Sync>> {
        let sql = format!(
            "SELECT {} FROM bookings WHERE booking_ref = $1",
            BOOKING_COLUMNS
        );
        let row = sqlx::query_as::<_, BookingRow>(&sql)
            .bind(reference)
            .fetch_optional(&self.pool)
            .await?;
        row.map(BookingRow::into_booking).transpose()
    }

    async fn update(
        &self,
        id: Uuid,
        update: &BookingUpdate,
    ) -> Result<Option<Booking>, Box<dyn std::error::Error + Send + Sync>> {
        // Read-modify-write keeps the partial-update rules (created_at and
        // booking_ref untouched) in one place: BookingUpdate::apply_to.
        let existing = match self.find_by_id(id).await? {
            Some(b) => b,
            None => return Ok(None),
        };

        let mut booking = existing;
        update.apply_to(&mut booking);
        booking.updated_at = Some(chrono::Utc::now());

        sqlx::query(
            "UPDATE bookings SET status = $2, full_name = $3, email = $4, phone = $5, \
             trip_type = $6, vehicle = $7, standard_location_type = $8, airport_code = $9, \
             city_code = $10, pickup = $11, dropoff = $12, date = $13, time = $14, \
             return_date = $15, return_time = $16, hours = $17, wait_hours = $18, \
             terminal = $19, flight_number = $20, child_seat = $21, extra_stops = $22, \
             extra_stop_address = $23, direction = $24, pickup_postcode = $25, \
             pickup_surcharge = $26, journey_at = $27, journey_day_of_week = $28, \
             price = $29, stripe_session_id = $30, dispatcher = $31, driver_info = $32, \
             vehicle_reg_badge = $33, updated_at = $34 \
             WHERE id = $1",
        )
        .bind(booking.id)
        .bind(booking.status.as_str())
        .bind(&booking.full_name)
        .bind(&booking.email)
        .bind(&booking.phone)
        .bind(&booking.trip_type)
        .bind(&booking.vehicle)
        .bind(&booking.standard_location_type)
        .bind(&booking.airport_code)
        .bind(&booking.city_code)
        .bind(&booking.pickup)
        .bind(&booking.dropoff)
        .bind(&booking.date)
        .bind(&booking.time)
        .bind(&booking.return_date)
        .bind(&booking.return_time)
        .bind(&booking.hours)
        .bind(&booking.wait_hours)
        .bind(&booking.terminal)
        .bind(&booking.flight_number)
        .bind(booking.child_seat)
        .bind(booking.extra_stops)
        .bind(&booking.extra_stop_address)
        .bind(&booking.direction)
        .bind(&booking.pickup_postcode)
        .bind(&booking.pickup_surcharge)
        .bind(booking.journey_at)
        .bind(&booking.journey_day_of_week)
        .bind(booking.price)
        .bind(&booking.stripe_session_id)
        .bind(&booking.dispatcher)
        .bind(&booking.driver_info)
        .bind(&booking.vehicle_reg_badge)
        .bind(booking.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(Some(booking))
    }

    async fn mark_paid_by_reference(
        &self,
        reference: &str,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        let result = sqlx::query(
            "UPDATE bookings SET status = 'paid', updated_at = NOW() \
             WHERE booking_ref = $1 AND status <> 'paid'",
        )
        .bind(reference)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(
        &self,
        id: Uuid,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        let result = sqlx::query("DELETE FROM bookings WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_all(
        &self,
    ) -> Result<Vec<Booking>, Box<dyn std::error::Error + Send + Sync>> {
        let sql = format!(
            "SELECT {} FROM bookings ORDER BY created_at DESC",
            BOOKING_COLUMNS
        );
        let rows = sqlx::query_as::<_, BookingRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(BookingRow::into_booking).collect()
    }
}

pub struct PgSequenceRepository {
    pool: PgPool,
}

impl PgSequenceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SequenceRepository for PgSequenceRepository {
    /// Single-statement upsert-and-increment. The database applies the
    /// increment atomically, so concurrent allocations can never observe
    /// the same value. No fallback: if the store is unreachable the caller
    /// fails closed instead of guessing a number.
    async fn next_seq(
        &self,
        name: &str,
    ) -> Result<i64, Box<dyn std::error::Error + Send + Sync>> {
        let seq: i64 = sqlx::query_scalar(
            "INSERT INTO booking_counters (name, seq) VALUES ($1, 1) \
             ON CONFLICT (name) DO UPDATE SET seq = booking_counters.seq + 1 \
             RETURNING seq",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;
        Ok(seq)
    }
}
