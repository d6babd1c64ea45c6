use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use eliteline_core::booking::{Booking, BookingForm, BookingStatus, BookingUpdate};
use eliteline_core::notify::{EmailMessage, NotificationSender};
use eliteline_core::payment::{CheckoutRequest, PaymentGateway};
use eliteline_core::repository::{BookingRepository, SequenceRepository};
use eliteline_core::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::metadata;
use crate::normalize::normalize;
use crate::reference::format_reference;
use crate::summary;

/// Counter backing the human-readable booking references.
const BOOKING_COUNTER: &str = "bookingCounter";

const CHECKOUT_CURRENCY: &str = "gbp";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedBooking {
    pub payment_url: String,
    pub booking_ref: String,
}

/// Website contact-form enquiry, relayed to the operator by mail.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EnquiryForm {
    pub full_name: String,
    pub phone: String,
    pub email: String,
    pub pickup: String,
    pub dropoff: String,
    pub message: String,
}

/// Orchestrates the booking state machine: create / confirm / update /
/// delete. Mail is dispatched after the state mutation committed and never
/// feeds back into the reported outcome.
pub struct BookingService {
    bookings: Arc<dyn BookingRepository>,
    sequences: Arc<dyn SequenceRepository>,
    gateway: Arc<dyn PaymentGateway>,
    mailer: Arc<dyn NotificationSender>,
    operator_email: String,
}

impl BookingService {
    pub fn new(
        bookings: Arc<dyn BookingRepository>,
        sequences: Arc<dyn SequenceRepository>,
        gateway: Arc<dyn PaymentGateway>,
        mailer: Arc<dyn NotificationSender>,
        operator_email: String,
    ) -> Self {
        Self {
            bookings,
            sequences,
            gateway,
            mailer,
            operator_email,
        }
    }

    /// `(none) -> pending_payment`. Allocates the reference, creates the
    /// checkout session, persists the pending record and returns the hosted
    /// payment URL. Nothing is persisted when the counter or the gateway
    /// fails; a persist failure after session creation is reported as a
    /// failure and the orphaned session logged.
    pub async fn create(&self, form: BookingForm) -> CoreResult<CreatedBooking> {
        let mut booking = normalize(&form, Utc::now());

        let seq = self
            .sequences
            .next_seq(BOOKING_COUNTER)
            .await
            .map_err(|e| upstream("booking counter unavailable", e.as_ref()))?;
        booking.booking_ref = format_reference(seq);

        let request = CheckoutRequest {
            product_name: format!(
                "Chauffeur Booking {} ({})",
                booking.booking_ref, booking.vehicle
            ),
            amount_minor: booking.price * 100,
            currency: CHECKOUT_CURRENCY.to_string(),
            metadata: metadata::flatten(&booking),
        };
        let session = self
            .gateway
            .create_session(&request)
            .await
            .map_err(|e| upstream("payment session creation failed", e.as_ref()))?;
        booking.stripe_session_id = session.id.clone();

        if let Err(e) = self.bookings.insert(&booking).await {
            tracing::error!(
                error = %e,
                booking_ref = %booking.booking_ref,
                session_id = %session.id,
                "booking persist failed after checkout session was created, session is orphaned"
            );
            return Err(CoreError::Upstream("failed to save booking".to_string()));
        }

        tracing::info!(
            booking_ref = %booking.booking_ref,
            price = booking.price,
            "booking created, awaiting payment"
        );

        self.notify_created(booking.clone(), session.url.clone());

        Ok(CreatedBooking {
            payment_url: session.url,
            booking_ref: booking.booking_ref,
        })
    }

    /// `pending_payment -> paid`, driven only by a verified provider
    /// notification. Safe under at-least-once delivery: an already-paid
    /// record is a no-op, a pending record is moved with a conditional
    /// update, and a missing record is rebuilt from the session metadata.
    pub async fn confirm_checkout_completed(
        &self,
        session_id: &str,
        meta: &HashMap<String, String>,
    ) -> CoreResult<()> {
        let reference = meta.get("bookingRef").cloned().unwrap_or_default();
        if reference.is_empty() {
            return Err(CoreError::Validation(
                "checkout session metadata missing bookingRef".to_string(),
            ));
        }

        let existing = self
            .bookings
            .find_by_reference(&reference)
            .await
            .map_err(|e| upstream("booking lookup failed", e.as_ref()))?;

        match existing {
            Some(booking) if booking.status == BookingStatus::Paid => {
                tracing::info!(booking_ref = %reference, "payment confirmation replayed, no-op");
                Ok(())
            }
            Some(_) => {
                let moved = self
                    .bookings
                    .mark_paid_by_reference(&reference)
                    .await
                    .map_err(|e| upstream("payment confirmation failed", e.as_ref()))?;
                if moved {
                    tracing::info!(booking_ref = %reference, "booking marked paid");
                } else {
                    tracing::info!(booking_ref = %reference, "booking already paid, no-op");
                }
                Ok(())
            }
            None => {
                // The pending record was never persisted; the metadata
                // bundle carries everything needed to store it as paid.
                let booking = metadata::booking_from_metadata(meta, session_id, Utc::now())?;
                self.bookings
                    .insert(&booking)
                    .await
                    .map_err(|e| upstream("paid booking persist failed", e.as_ref()))?;
                tracing::info!(booking_ref = %reference, "paid booking inserted from session metadata");
                Ok(())
            }
        }
    }

    /// Admin-triggered update. Any field except `createdAt` and the
    /// reference; an explicit `status` here is an authorized override.
    pub async fn update(&self, id: &str, update: BookingUpdate) -> CoreResult<Booking> {
        let id = parse_id(id)?;
        let updated = self
            .bookings
            .update(id, &update)
            .await
            .map_err(|e| upstream("booking update failed", e.as_ref()))?
            .ok_or_else(|| CoreError::NotFound("Booking not found".to_string()))?;

        self.notify_updated(updated.clone());

        Ok(updated)
    }

    /// Admin-triggered, irreversible delete.
    pub async fn delete(&self, id: &str) -> CoreResult<()> {
        let id = parse_id(id)?;
        let deleted = self
            .bookings
            .delete(id)
            .await
            .map_err(|e| upstream("booking delete failed", e.as_ref()))?;
        if !deleted {
            return Err(CoreError::NotFound("Booking not found".to_string()));
        }
        Ok(())
    }

    /// All bookings, newest first.
    pub async fn list(&self) -> CoreResult<Vec<Booking>> {
        self.bookings
            .list_all()
            .await
            .map_err(|e| upstream("booking list failed", e.as_ref()))
    }

    /// Website enquiry relay. Unlike booking notifications the mail is the
    /// whole point of the request, so the send is awaited.
    pub async fn send_enquiry(&self, enquiry: &EnquiryForm) -> CoreResult<()> {
        let message = EmailMessage {
            to: self.operator_email.clone(),
            subject: "New Website Enquiry".to_string(),
            html: None,
            text: Some(summary::enquiry_text(enquiry)),
        };
        self.mailer
            .send(&message)
            .await
            .map_err(|e| upstream("enquiry mail failed", e.as_ref()))
    }

    fn notify_created(&self, booking: Booking, payment_url: String) {
        let mailer = Arc::clone(&self.mailer);
        let operator = self.operator_email.clone();
        tokio::spawn(async move {
            let (subject, html) = summary::new_booking_company_email(&booking, &payment_url);
            send_logged(&*mailer, &operator, subject, html, &booking.booking_ref).await;

            if !booking.email.is_empty() {
                let (subject, html) =
                    summary::new_booking_customer_email(&booking, &payment_url);
                send_logged(&*mailer, &booking.email, subject, html, &booking.booking_ref)
                    .await;
            }
        });
    }

    fn notify_updated(&self, booking: Booking) {
        let mailer = Arc::clone(&self.mailer);
        let operator = self.operator_email.clone();
        tokio::spawn(async move {
            let (subject, html) = summary::updated_booking_company_email(&booking);
            send_logged(&*mailer, &operator, subject, html, &booking.booking_ref).await;

            if !booking.email.is_empty() {
                let (subject, html) = summary::updated_booking_customer_email(&booking);
                send_logged(&*mailer, &booking.email, subject, html, &booking.booking_ref)
                    .await;
            }
        });
    }
}

async fn send_logged(
    mailer: &dyn NotificationSender,
    to: &str,
    subject: String,
    html: String,
    booking_ref: &str,
) {
    let message = EmailMessage {
        to: to.to_string(),
        subject,
        html: Some(html),
        text: None,
    };
    if let Err(e) = mailer.send(&message).await {
        tracing::warn!(error = %e, booking_ref = %booking_ref, to = %to, "notification mail failed");
    }
}

fn parse_id(id: &str) -> CoreResult<Uuid> {
    Uuid::parse_str(id.trim())
        .map_err(|_| CoreError::Validation("invalid booking id".to_string()))
}

fn upstream(context: &str, err: &(dyn std::error::Error + Send + Sync)) -> CoreError {
    tracing::error!(error = %err, "{}", context);
    CoreError::Upstream(context.to_string())
}
