use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use eliteline_core::booking::{Booking, BookingForm, BookingStatus};
use uuid::Uuid;

use crate::locations;
use crate::tariff;

/// Map a raw form submission to a canonical pending booking. The reference
/// and payment-session id are left empty for the lifecycle controller to
/// fill in; nothing the customer posts can influence status or price.
pub fn normalize(form: &BookingForm, now: DateTime<Utc>) -> Booking {
    let (pickup, dropoff) = resolve_route(form);
    let journey_at = derive_journey_at(&form.date, &form.time);
    let journey_day_of_week = journey_at
        .map(|dt| dt.format("%A").to_string())
        .unwrap_or_default();

    Booking {
        id: Uuid::new_v4(),
        booking_ref: String::new(),
        status: BookingStatus::PendingPayment,

        full_name: form.full_name.clone(),
        email: form.email.clone(),
        phone: form.phone.clone(),

        trip_type: or_default(&form.trip_type, "one_way"),
        vehicle: or_default(&form.vehicle, tariff::DEFAULT_VEHICLE),
        standard_location_type: or_default(&form.standard_location_type, "airport"),
        airport_code: form.airport_code.clone(),
        city_code: form.city_code.clone(),
        pickup,
        dropoff,

        date: form.date.clone(),
        time: form.time.clone(),
        return_date: form.return_date.clone(),
        return_time: form.return_time.clone(),
        hours: form.hours.clone(),
        wait_hours: form.wait_hours.clone(),

        terminal: form.terminal.clone(),
        flight_number: form.flight_number.clone(),

        child_seat: form.child_seat == "yes",
        extra_stops: form.extra_stops == "yes",
        extra_stop_address: form.extra_stop_address.clone(),

        direction: form.direction.clone(),
        pickup_postcode: form.pickup_postcode.clone(),
        pickup_surcharge: form.pickup_surcharge.clone(),

        journey_at,
        journey_day_of_week,

        price: tariff::price_for_vehicle(&form.vehicle),
        stripe_session_id: String::new(),

        dispatcher: String::new(),
        driver_info: String::new(),
        vehicle_reg_badge: String::new(),

        created_at: now,
        updated_at: None,
    }
}

/// Fixed airport/city routes leave pickup/dropoff blank in the form; build
/// the display names from the coded journey, defaulting the unspecified end
/// to the home base.
fn resolve_route(form: &BookingForm) -> (String, String) {
    let mut pickup = form.pickup.clone();
    let mut dropoff = form.dropoff.clone();

    if pickup.is_empty() || dropoff.is_empty() {
        let destination = match form.standard_location_type.as_str() {
            "airport" if !form.airport_code.is_empty() => {
                Some(locations::airport_display_name(&form.airport_code).to_string())
            }
            "city" if !form.city_code.is_empty() => {
                Some(locations::city_display_name(&form.city_code).to_string())
            }
            _ => None,
        };

        if let Some(destination) = destination {
            if pickup.is_empty() {
                pickup = locations::HOME_BASE.to_string();
            }
            if dropoff.is_empty() {
                dropoff = destination;
            }
        }
    }

    (pickup, dropoff)
}

/// Journey timestamp from the `YYYY-MM-DD` date and `HH:MM` time fields.
/// Missing or malformed parts leave the derived fields empty rather than
/// rejecting the booking.
pub fn derive_journey_at(date: &str, time: &str) -> Option<DateTime<Utc>> {
    if date.is_empty() || time.is_empty() {
        return None;
    }
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
    let time = NaiveTime::parse_from_str(time, "%H:%M").ok()?;
    Some(date.and_time(time).and_utc())
}

fn or_default(value: &str, default: &str) -> String {
    if value.is_empty() {
        default.to_string()
    } else {
        value.to_string()
    }
}
