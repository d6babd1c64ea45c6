use std::collections::HashMap;

use chrono::{DateTime, Utc};
use eliteline_core::booking::{Booking, BookingStatus};
use eliteline_core::{CoreError, CoreResult};
use uuid::Uuid;

use crate::normalize::derive_journey_at;

/// Flatten the normalized record into the checkout session's metadata so
/// the completion webhook can rebuild the booking without a prior database
/// read. The gateway only accepts flat string values.
pub fn flatten(booking: &Booking) -> HashMap<String, String> {
    let mut meta = HashMap::new();
    let mut put = |key: &str, value: &str| {
        meta.insert(key.to_string(), value.to_string());
    };

    put("bookingRef", &booking.booking_ref);
    put("fullName", &booking.full_name);
    put("email", &booking.email);
    put("phone", &booking.phone);
    put("tripType", &booking.trip_type);
    put("vehicle", &booking.vehicle);
    put("standardLocationType", &booking.standard_location_type);
    put("airportCode", &booking.airport_code);
    put("cityCode", &booking.city_code);
    put("pickup", &booking.pickup);
    put("dropoff", &booking.dropoff);
    put("date", &booking.date);
    put("time", &booking.time);
    put("returnDate", &booking.return_date);
    put("returnTime", &booking.return_time);
    put("hours", &booking.hours);
    put("waitHours", &booking.wait_hours);
    put("terminal", &booking.terminal);
    put("flightNumber", &booking.flight_number);
    put("childSeat", if booking.child_seat { "true" } else { "false" });
    put("extraStops", if booking.extra_stops { "true" } else { "false" });
    put("extraStopAddress", &booking.extra_stop_address);
    put("direction", &booking.direction);
    put("pickupPostcode", &booking.pickup_postcode);
    put("pickupSurcharge", &booking.pickup_surcharge);
    put("price", &booking.price.to_string());
    meta
}

/// Rebuild a paid booking from session metadata when the pending record was
/// never persisted. Metadata is provider-echoed strings; numeric fields are
/// parsed explicitly instead of being stored verbatim.
pub fn booking_from_metadata(
    metadata: &HashMap<String, String>,
    session_id: &str,
    now: DateTime<Utc>,
) -> CoreResult<Booking> {
    let field = |key: &str| metadata.get(key).cloned().unwrap_or_default();

    let booking_ref = field("bookingRef");
    if booking_ref.is_empty() {
        return Err(CoreError::Validation(
            "session metadata missing bookingRef".to_string(),
        ));
    }

    let price_raw = field("price");
    let price: i64 = price_raw.parse().map_err(|_| {
        CoreError::Validation(format!(
            "session metadata carries unparseable price {:?}",
            price_raw
        ))
    })?;

    let date = field("date");
    let time = field("time");
    let journey_at = derive_journey_at(&date, &time);
    let journey_day_of_week = journey_at
        .map(|dt| dt.format("%A").to_string())
        .unwrap_or_default();

    Ok(Booking {
        id: Uuid::new_v4(),
        booking_ref,
        status: BookingStatus::Paid,

        full_name: field("fullName"),
        email: field("email"),
        phone: field("phone"),

        trip_type: field("tripType"),
        vehicle: field("vehicle"),
        standard_location_type: field("standardLocationType"),
        airport_code: field("airportCode"),
        city_code: field("cityCode"),
        pickup: field("pickup"),
        dropoff: field("dropoff"),

        date,
        time,
        return_date: field("returnDate"),
        return_time: field("returnTime"),
        hours: field("hours"),
        wait_hours: field("waitHours"),

        terminal: field("terminal"),
        flight_number: field("flightNumber"),

        child_seat: field("childSeat") == "true",
        extra_stops: field("extraStops") == "true",
        extra_stop_address: field("extraStopAddress"),

        direction: field("direction"),
        pickup_postcode: field("pickupPostcode"),
        pickup_surcharge: field("pickupSurcharge"),

        journey_at,
        journey_day_of_week,

        price,
        stripe_session_id: session_id.to_string(),

        dispatcher: String::new(),
        driver_info: String::new(),
        vehicle_reg_badge: String::new(),

        created_at: now,
        updated_at: None,
    })
}
