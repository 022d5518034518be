use crate::backend::{AvailabilityBackend, BookingBackend, Directory};
use crate::context::RequestContext;
use crate::error::BookingError;
use crate::notification::{NotificationType, Notifier};
use crate::types::{Booking, BookingAction, BookingAlternative, NewBooking};
use chrono::NaiveDate;
use uuid::Uuid;

/// Booking State Machine: drives a booking through its lifecycle and the
/// alternative-time negotiation, reserving seats through the ledger's
/// backend and dispatching notifications after each committed change.
#[derive(Debug, Clone)]
pub struct BookingEngine<S, N> {
    store: S,
    notifier: N,
}

impl<S, N> BookingEngine<S, N>
where
    S: AvailabilityBackend + BookingBackend + Directory,
    N: Notifier + Clone,
{
    pub fn new(store: S, notifier: N) -> Self {
        Self { store, notifier }
    }

    pub fn booking(&self, _ctx: &RequestContext, id: Uuid) -> Result<Booking, BookingError> {
        self.store.booking(id)
    }

    pub fn bookings_for_restaurant(
        &self,
        _ctx: &RequestContext,
        restaurant_id: Uuid,
    ) -> Result<Vec<Booking>, BookingError> {
        self.store.bookings_by_restaurant(restaurant_id)
    }

    pub fn bookings_for_user(
        &self,
        _ctx: &RequestContext,
        user_id: Uuid,
    ) -> Result<Vec<Booking>, BookingError> {
        self.store.bookings_by_user(user_id)
    }

    /// Creates a pending booking and reserves its seats.
    ///
    /// The slot lookup is a fast-path check; `adjust_reserved_seats` is the
    /// authoritative capacity gate. When reservation fails after the booking
    /// row exists, the booking is cancelled as a compensating action and the
    /// capacity error is returned.
    pub fn create_booking(
        &self,
        ctx: &RequestContext,
        new: NewBooking,
    ) -> Result<Uuid, BookingError> {
        ctx.check_deadline()?;
        tracing::info!(
            request_id = %ctx.request_id(),
            restaurant_id = %new.restaurant_id,
            user_id = %new.user_id,
            date = %new.date,
            time = %new.time,
            guests = new.guests_count,
            "creating booking"
        );

        if new.guests_count < 1 {
            return Err(BookingError::Validation(format!(
                "guests count must be at least 1, got {}",
                new.guests_count
            )));
        }

        let slots = self
            .store
            .slots_by_restaurant_and_date(new.restaurant_id, new.date)?;
        let slot = slots
            .into_iter()
            .find(|slot| slot.time_slot == new.time)
            .filter(|slot| slot.available_seats() >= new.guests_count)
            .ok_or_else(|| {
                tracing::warn!(
                    request_id = %ctx.request_id(),
                    restaurant_id = %new.restaurant_id,
                    date = %new.date,
                    time = %new.time,
                    guests = new.guests_count,
                    "no availability for booking"
                );
                BookingError::NoAvailability {
                    restaurant_id: new.restaurant_id,
                    date: new.date,
                    time_slot: new.time.clone(),
                }
            })?;

        let booking = self.store.insert_booking(&new)?;

        if let Err(reserve_err) = self.store.adjust_reserved_seats(slot.id, new.guests_count) {
            tracing::error!(
                request_id = %ctx.request_id(),
                booking_id = %booking.id,
                slot_id = %slot.id,
                error = %reserve_err,
                "seat reservation failed, cancelling booking"
            );
            if let Err(cancel_err) = self.store.transition(booking.id, BookingAction::Cancel) {
                // A failed compensation leaves the booking and the ledger
                // inconsistent; surface both ids for operators.
                tracing::error!(
                    request_id = %ctx.request_id(),
                    booking_id = %booking.id,
                    slot_id = %slot.id,
                    error = %cancel_err,
                    "compensating cancel failed after seat reservation failure"
                );
            }
            return Err(reserve_err);
        }

        self.notify_restaurant(
            ctx,
            booking.restaurant_id,
            NotificationType::NewBooking,
            "New booking",
            &format!(
                "You have a new booking on {} at {}",
                format_date(booking.date),
                booking.time
            ),
            booking.id,
        );

        tracing::info!(
            request_id = %ctx.request_id(),
            booking_id = %booking.id,
            "booking created"
        );
        Ok(booking.id)
    }

    pub fn confirm_booking(&self, ctx: &RequestContext, id: Uuid) -> Result<Booking, BookingError> {
        ctx.check_deadline()?;
        tracing::info!(request_id = %ctx.request_id(), booking_id = %id, "confirming booking");

        let booking = self.transition_logged(ctx, id, BookingAction::Confirm)?;
        self.notify_user(
            ctx,
            booking.user_id,
            NotificationType::BookingConfirmed,
            "Booking confirmed",
            &format!(
                "Your booking on {} at {} has been confirmed by the restaurant.",
                format_date(booking.date),
                booking.time
            ),
            booking.id,
        );
        Ok(booking)
    }

    pub fn reject_booking(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        reason: &str,
    ) -> Result<Booking, BookingError> {
        ctx.check_deadline()?;
        tracing::info!(request_id = %ctx.request_id(), booking_id = %id, reason, "rejecting booking");

        let booking = self.transition_logged(ctx, id, BookingAction::Reject)?;

        let mut message = format!(
            "Your booking on {} at {} has been rejected by the restaurant.",
            format_date(booking.date),
            booking.time
        );
        if !reason.is_empty() {
            message.push_str(" Reason: ");
            message.push_str(reason);
        }
        self.notify_user(
            ctx,
            booking.user_id,
            NotificationType::BookingRejected,
            "Booking rejected",
            &message,
            booking.id,
        );
        Ok(booking)
    }

    /// Cancellation leaves the slot's reserved count untouched.
    pub fn cancel_booking(&self, ctx: &RequestContext, id: Uuid) -> Result<Booking, BookingError> {
        ctx.check_deadline()?;
        tracing::info!(request_id = %ctx.request_id(), booking_id = %id, "cancelling booking");

        let booking = self.transition_logged(ctx, id, BookingAction::Cancel)?;
        self.notify_restaurant(
            ctx,
            booking.restaurant_id,
            NotificationType::BookingCancelled,
            "Booking cancelled",
            &format!(
                "Booking on {} at {} has been cancelled by the user.",
                format_date(booking.date),
                booking.time
            ),
            booking.id,
        );
        Ok(booking)
    }

    pub fn complete_booking(
        &self,
        ctx: &RequestContext,
        id: Uuid,
    ) -> Result<Booking, BookingError> {
        ctx.check_deadline()?;
        tracing::info!(request_id = %ctx.request_id(), booking_id = %id, "completing booking");
        self.transition_logged(ctx, id, BookingAction::Complete)
    }

    /// Offers a substitute date/time for a pending booking. The booking's
    /// status does not change and no seats are reserved for the proposal.
    pub fn suggest_alternative_time(
        &self,
        ctx: &RequestContext,
        booking_id: Uuid,
        date: NaiveDate,
        time: &str,
        message: &str,
    ) -> Result<BookingAlternative, BookingError> {
        ctx.check_deadline()?;
        tracing::info!(
            request_id = %ctx.request_id(),
            booking_id = %booking_id,
            alternative_date = %date,
            alternative_time = time,
            "suggesting alternative booking time"
        );

        let booking = self.store.booking(booking_id)?;
        if !booking.status.allows(BookingAction::ProposeAlternative) {
            tracing::warn!(
                request_id = %ctx.request_id(),
                booking_id = %booking_id,
                status = %booking.status,
                "invalid booking status for alternative offer"
            );
            return Err(BookingError::InvalidBookingStatus {
                booking_id,
                status: booking.status,
                action: BookingAction::ProposeAlternative,
            });
        }

        let alternative = self.store.add_alternative(booking_id, date, time, message)?;
        self.notify_user(
            ctx,
            booking.user_id,
            NotificationType::AlternativeOffer,
            "Alternative time offered",
            &format!(
                "Restaurant offers alternative time for your booking: {} at {}",
                format_date(date),
                time
            ),
            booking_id,
        );
        Ok(alternative)
    }

    /// Accepts an undecided offer: the parent booking is re-targeted to the
    /// offered date/time and confirmed in the same atomic unit. The ledger
    /// is not consulted; the original slot's seats stay reserved and the
    /// offered slot is not incremented.
    pub fn accept_alternative(
        &self,
        ctx: &RequestContext,
        alternative_id: Uuid,
    ) -> Result<Booking, BookingError> {
        ctx.check_deadline()?;
        tracing::info!(
            request_id = %ctx.request_id(),
            alternative_id = %alternative_id,
            "accepting alternative offer"
        );

        let (booking, alternative) = self.store.accept_alternative(alternative_id)?;
        self.notify_restaurant(
            ctx,
            booking.restaurant_id,
            NotificationType::AlternativeAccepted,
            "Alternative booking accepted",
            &format!(
                "User has accepted your alternative booking offer for {} at {}",
                format_date(alternative.date),
                alternative.time
            ),
            booking.id,
        );
        Ok(booking)
    }

    pub fn reject_alternative(
        &self,
        ctx: &RequestContext,
        alternative_id: Uuid,
    ) -> Result<BookingAlternative, BookingError> {
        ctx.check_deadline()?;
        tracing::info!(
            request_id = %ctx.request_id(),
            alternative_id = %alternative_id,
            "rejecting alternative offer"
        );

        let (booking, alternative) = self.store.reject_alternative(alternative_id)?;
        self.notify_restaurant(
            ctx,
            booking.restaurant_id,
            NotificationType::AlternativeRejected,
            "Alternative booking rejected",
            &format!(
                "User has rejected your alternative booking offer for {} at {}",
                format_date(alternative.date),
                alternative.time
            ),
            booking.id,
        );
        Ok(alternative)
    }

    fn transition_logged(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        action: BookingAction,
    ) -> Result<Booking, BookingError> {
        self.store.transition(id, action).map_err(|err| {
            tracing::warn!(
                request_id = %ctx.request_id(),
                booking_id = %id,
                action = action.as_str(),
                error = %err,
                "booking transition failed"
            );
            err
        })
    }

    fn notify_user(
        &self,
        ctx: &RequestContext,
        user_id: Uuid,
        kind: NotificationType,
        title: &str,
        message: &str,
        related_id: Uuid,
    ) {
        if let Err(err) = self
            .notifier
            .notify_user(user_id, kind, title, message, related_id)
        {
            tracing::error!(
                request_id = %ctx.request_id(),
                %user_id,
                kind = kind.as_str(),
                error = %err,
                "failed to deliver user notification"
            );
        }
    }

    fn notify_restaurant(
        &self,
        ctx: &RequestContext,
        restaurant_id: Uuid,
        kind: NotificationType,
        title: &str,
        message: &str,
        related_id: Uuid,
    ) {
        if let Err(err) = self
            .notifier
            .notify_restaurant(restaurant_id, kind, title, message, related_id)
        {
            tracing::error!(
                request_id = %ctx.request_id(),
                %restaurant_id,
                kind = kind.as_str(),
                error = %err,
                "failed to deliver restaurant notification"
            );
        }
    }
}

fn format_date(date: NaiveDate) -> String {
    date.format("%d.%m.%Y").to_string()
}
