use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    PendingPayment,
    Paid,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::PendingPayment => "pending_payment",
            BookingStatus::Paid => "paid",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending_payment" => Some(BookingStatus::PendingPayment),
            "paid" => Some(BookingStatus::Paid),
            "cancelled" => Some(BookingStatus::Cancelled),
            _ => None,
        }
    }
}

/// A stored booking. The reference (`ELITE-NNNNNN`) is assigned once at
/// creation and is distinct from the storage id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: Uuid,
    pub booking_ref: String,
    pub status: BookingStatus,

    pub full_name: String,
    pub email: String,
    pub phone: String,

    pub trip_type: String,
    pub vehicle: String,
    pub standard_location_type: String,
    pub airport_code: String,
    pub city_code: String,
    pub pickup: String,
    pub dropoff: String,

    pub date: String,
    pub time: String,
    pub return_date: String,
    pub return_time: String,
    pub hours: String,
    pub wait_hours: String,

    pub terminal: String,
    pub flight_number: String,

    pub child_seat: bool,
    pub extra_stops: bool,
    pub extra_stop_address: String,

    // Hidden fields the distance widget posts along with the form.
    pub direction: String,
    pub pickup_postcode: String,
    pub pickup_surcharge: String,

    pub journey_at: Option<DateTime<Utc>>,
    pub journey_day_of_week: String,

    /// Whole pounds, GBP. Matches the amount quoted to the payment gateway
    /// (which receives minor units).
    pub price: i64,
    pub stripe_session_id: String,

    // Dispatch fields, set by admins only.
    pub dispatcher: String,
    pub driver_info: String,
    pub vehicle_reg_badge: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Raw booking form as posted by the website. Unknown fields are dropped on
/// deserialization; nothing the customer sends can set status or price.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BookingForm {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub vehicle: String,
    pub trip_type: String,
    pub pickup: String,
    pub dropoff: String,
    pub date: String,
    pub time: String,
    pub return_date: String,
    pub return_time: String,
    pub hours: String,
    pub wait_hours: String,
    pub terminal: String,
    pub flight_number: String,
    /// "yes" to request a child seat, anything else is no.
    pub child_seat: String,
    /// "yes" when extra stops were requested.
    pub extra_stops: String,
    pub extra_stop_address: String,
    pub standard_location_type: String,
    pub airport_code: String,
    pub city_code: String,
    pub direction: String,
    pub pickup_postcode: String,
    pub pickup_surcharge: String,
}

/// Typed partial update applied by the admin endpoint. `id`, `bookingRef`
/// and `createdAt` deliberately have no field here: the reference is
/// assigned exactly once and the creation timestamp is immutable, so a
/// payload naming them is stripped rather than applied.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BookingUpdate {
    pub status: Option<BookingStatus>,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub trip_type: Option<String>,
    pub vehicle: Option<String>,
    pub standard_location_type: Option<String>,
    pub airport_code: Option<String>,
    pub city_code: Option<String>,
    pub pickup: Option<String>,
    pub dropoff: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub return_date: Option<String>,
    pub return_time: Option<String>,
    pub hours: Option<String>,
    pub wait_hours: Option<String>,
    pub terminal: Option<String>,
    pub flight_number: Option<String>,
    pub child_seat: Option<bool>,
    pub extra_stops: Option<bool>,
    pub extra_stop_address: Option<String>,
    pub direction: Option<String>,
    pub pickup_postcode: Option<String>,
    pub pickup_surcharge: Option<String>,
    pub price: Option<i64>,
    pub dispatcher: Option<String>,
    pub driver_info: Option<String>,
    pub vehicle_reg_badge: Option<String>,
}

impl BookingUpdate {
    /// Apply this partial update onto an existing record. `created_at` and
    /// `booking_ref` are untouched by construction; the caller stamps
    /// `updated_at`.
    pub fn apply_to(&self, booking: &mut Booking) {
        fn set(target: &mut String, value: &Option<String>) {
            if let Some(v) = value {
                *target = v.clone();
            }
        }

        if let Some(status) = self.status {
            booking.status = status;
        }
        set(&mut booking.full_name, &self.full_name);
        set(&mut booking.email, &self.email);
        set(&mut booking.phone, &self.phone);
        set(&mut booking.trip_type, &self.trip_type);
        set(&mut booking.vehicle, &self.vehicle);
        set(
            &mut booking.standard_location_type,
            &self.standard_location_type,
        );
        set(&mut booking.airport_code, &self.airport_code);
        set(&mut booking.city_code, &self.city_code);
        set(&mut booking.pickup, &self.pickup);
        set(&mut booking.dropoff, &self.dropoff);
        set(&mut booking.date, &self.date);
        set(&mut booking.time, &self.time);
        set(&mut booking.return_date, &self.return_date);
        set(&mut booking.return_time, &self.return_time);
        set(&mut booking.hours, &self.hours);
        set(&mut booking.wait_hours, &self.wait_hours);
        set(&mut booking.terminal, &self.terminal);
        set(&mut booking.flight_number, &self.flight_number);
        if let Some(v) = self.child_seat {
            booking.child_seat = v;
        }
        if let Some(v) = self.extra_stops {
            booking.extra_stops = v;
        }
        set(&mut booking.extra_stop_address, &self.extra_stop_address);
        set(&mut booking.direction, &self.direction);
        set(&mut booking.pickup_postcode, &self.pickup_postcode);
        set(&mut booking.pickup_surcharge, &self.pickup_surcharge);
        if let Some(v) = self.price {
            booking.price = v;
        }
        set(&mut booking.dispatcher, &self.dispatcher);
        set(&mut booking.driver_info, &self.driver_info);
        set(&mut booking.vehicle_reg_badge, &self.vehicle_reg_badge);
    }
}
