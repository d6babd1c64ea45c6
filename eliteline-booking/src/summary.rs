use eliteline_core::booking::Booking;

use crate::lifecycle::EnquiryForm;

fn dash_if_empty(value: &str) -> &str {
    if value.is_empty() {
        "-"
    } else {
        value
    }
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "Yes"
    } else {
        "No"
    }
}

/// Shared booking summary used by both operator and customer mails.
pub fn summary_html(booking: &Booking) -> String {
    format!(
        "<p><b>Booking Ref:</b> {ref_}</p>\
         <p><b>Name:</b> {name}</p>\
         <p><b>Email:</b> {email}</p>\
         <p><b>Phone:</b> {phone}</p>\
         <p><b>Trip type:</b> {trip_type}</p>\
         <p><b>Car class:</b> {vehicle}</p>\
         <p><b>Journey type:</b> {location_type}</p>\
         <p><b>Pickup:</b> {pickup}</p>\
         <p><b>Dropoff:</b> {dropoff}</p>\
         <p><b>Date / time (outbound):</b> {date} {time}</p>\
         <p><b>Return date / time:</b> {return_date} {return_time}</p>\
         <p><b>Hourly hours:</b> {hours}</p>\
         <p><b>Wait &amp; return hours:</b> {wait_hours}</p>\
         <p><b>Flight number:</b> {flight_number}</p>\
         <p><b>Terminal:</b> {terminal}</p>\
         <p><b>Child seat:</b> {child_seat}</p>\
         <p><b>Extra stops:</b> {extra_stops}</p>\
         <p><b>Extra stop address:</b> {extra_stop_address}</p>\
         <p><b>Dispatcher:</b> {dispatcher}</p>\
         <p><b>Driver (name &amp; badge):</b> {driver_info}</p>\
         <p><b>Vehicle reg &amp; badge:</b> {vehicle_reg_badge}</p>\
         <p><b>Status:</b> {status}</p>\
         <p><b>PRICE:</b> \u{a3}{price}</p>",
        ref_ = booking.booking_ref,
        name = booking.full_name,
        email = booking.email,
        phone = booking.phone,
        trip_type = booking.trip_type,
        vehicle = booking.vehicle,
        location_type = booking.standard_location_type,
        pickup = booking.pickup,
        dropoff = booking.dropoff,
        date = booking.date,
        time = booking.time,
        return_date = dash_if_empty(&booking.return_date),
        return_time = booking.return_time,
        hours = dash_if_empty(&booking.hours),
        wait_hours = dash_if_empty(&booking.wait_hours),
        flight_number = dash_if_empty(&booking.flight_number),
        terminal = dash_if_empty(&booking.terminal),
        child_seat = yes_no(booking.child_seat),
        extra_stops = yes_no(booking.extra_stops),
        extra_stop_address = dash_if_empty(&booking.extra_stop_address),
        dispatcher = dash_if_empty(&booking.dispatcher),
        driver_info = dash_if_empty(&booking.driver_info),
        vehicle_reg_badge = dash_if_empty(&booking.vehicle_reg_badge),
        status = booking.status.as_str(),
        price = booking.price,
    )
}

pub fn new_booking_company_email(booking: &Booking, payment_url: &str) -> (String, String) {
    let subject = format!("New Chauffeur Booking \u{2013} {}", booking.booking_ref);
    let html = format!(
        "<h2>New Booking Received</h2>{}<br>\
         <p><b>Stripe Payment Link:</b> <a href=\"{url}\">{url}</a></p>",
        summary_html(booking),
        url = payment_url,
    );
    (subject, html)
}

pub fn new_booking_customer_email(booking: &Booking, payment_url: &str) -> (String, String) {
    let subject = format!("Your Eliteline Booking \u{2013} {}", booking.booking_ref);
    let html = format!(
        "<h2>Thank you for your booking, {}</h2>{}\
         <p>Please complete your booking by paying securely online:</p>\
         <p><a href=\"{}\">Click here to pay now</a></p>",
        booking.full_name,
        summary_html(booking),
        payment_url,
    );
    (subject, html)
}

pub fn updated_booking_company_email(booking: &Booking) -> (String, String) {
    let subject = format!("Booking update \u{2013} {}", booking.booking_ref);
    let html = format!("<h2>Booking Updated (Admin)</h2>{}", summary_html(booking));
    (subject, html)
}

pub fn updated_booking_customer_email(booking: &Booking) -> (String, String) {
    let subject = format!(
        "Your Eliteline booking has been updated \u{2013} {}",
        booking.booking_ref
    );
    let name = if booking.full_name.is_empty() {
        "Customer"
    } else {
        &booking.full_name
    };
    let html = format!(
        "<h2>Your booking has been updated</h2>\
         <p>Dear {},</p>\
         <p>Your booking details have been updated. Here is the latest summary:</p>{}",
        name,
        summary_html(booking),
    );
    (subject, html)
}

/// Plain-text body for the website enquiry form relay.
pub fn enquiry_text(enquiry: &EnquiryForm) -> String {
    format!(
        "New enquiry received:\n\n\
         Full Name: {}\n\
         Phone: {}\n\
         Email: {}\n\
         Pickup: {}\n\
         Dropoff: {}\n\n\
         Message:\n{}\n",
        enquiry.full_name,
        enquiry.phone,
        enquiry.email,
        enquiry.pickup,
        enquiry.dropoff,
        enquiry.message,
    )
}
