use crate::error::BookingError;
use crate::types::{AvailabilitySlot, Booking, BookingAction, BookingAlternative, NewBooking};
use chrono::NaiveDate;
use uuid::Uuid;

/// Existence checks for foreign references (restaurant/user aggregates are
/// owned elsewhere; the engine only ever asks whether an id is real).
pub trait Directory: Clone + Send + Sync + 'static {
    fn restaurant_exists(&self, id: Uuid) -> Result<bool, BookingError>;
    fn user_exists(&self, id: Uuid) -> Result<bool, BookingError>;
}

pub trait AvailabilityBackend: Clone + Send + Sync + 'static {
    /// Slots for one restaurant and date, ordered by time slot ascending.
    fn slots_by_restaurant_and_date(
        &self,
        restaurant_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<AvailabilitySlot>, BookingError>;

    /// Upsert on `(restaurant_id, date, time_slot)`: a new slot starts with
    /// `reserved = 0`, re-publishing updates capacity and preserves the
    /// current reserved count.
    fn upsert_slot(
        &self,
        restaurant_id: Uuid,
        date: NaiveDate,
        time_slot: &str,
        capacity: i32,
    ) -> Result<AvailabilitySlot, BookingError>;

    /// Atomic read-modify-write of the reserved count under a lock on the
    /// slot row. Fails with `InsufficientCapacity` when the delta would
    /// exceed capacity; a negative result clamps to zero.
    fn adjust_reserved_seats(&self, slot_id: Uuid, delta: i32) -> Result<(), BookingError>;
}

pub trait BookingBackend: Clone + Send + Sync + 'static {
    fn booking(&self, id: Uuid) -> Result<Booking, BookingError>;
    fn bookings_by_restaurant(&self, restaurant_id: Uuid) -> Result<Vec<Booking>, BookingError>;
    fn bookings_by_user(&self, user_id: Uuid) -> Result<Vec<Booking>, BookingError>;

    /// Persists a new pending booking. Restaurant and user references are
    /// checked here and fail with the matching `NotFound` kind.
    fn insert_booking(&self, booking: &NewBooking) -> Result<Booking, BookingError>;

    /// Applies one state-machine action under a lock on the booking row.
    /// Legality is judged against the status read inside the lock, so two
    /// racing transitions cannot both succeed from the same stale status.
    /// Sets the status timestamp the action calls for and returns the
    /// updated booking.
    fn transition(&self, id: Uuid, action: BookingAction) -> Result<Booking, BookingError>;

    fn add_alternative(
        &self,
        booking_id: Uuid,
        date: NaiveDate,
        time: &str,
        message: &str,
    ) -> Result<BookingAlternative, BookingError>;

    fn alternative(&self, id: Uuid) -> Result<BookingAlternative, BookingError>;

    /// Accepts an undecided alternative and re-targets the parent booking
    /// (date, time, status = confirmed) in the same atomic unit. Decided
    /// offers are invisible here and fail with `AlternativeNotFound`.
    fn accept_alternative(
        &self,
        alternative_id: Uuid,
    ) -> Result<(Booking, BookingAlternative), BookingError>;

    /// Rejects an undecided alternative; the parent booking is untouched.
    fn reject_alternative(
        &self,
        alternative_id: Uuid,
    ) -> Result<(Booking, BookingAlternative), BookingError>;
}
