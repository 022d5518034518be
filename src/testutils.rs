use std::sync::{
    atomic::{AtomicBool, AtomicU64, Ordering},
    Arc, Mutex,
};

use chrono::NaiveDate;
use uuid::Uuid;

use crate::backend::{AvailabilityBackend, BookingBackend, Directory};
use crate::error::BookingError;
use crate::notification::{NotificationType, Notifier, NotifyError};
use crate::types::{AvailabilitySlot, Booking, BookingAction, BookingAlternative, NewBooking};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient {
    User(Uuid),
    Restaurant(Uuid),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedNotification {
    pub recipient: Recipient,
    pub kind: NotificationType,
    pub title: String,
    pub message: String,
    pub related_id: Uuid,
}

/// Notifier that records every dispatch for assertion.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<RecordedNotification>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<RecordedNotification> {
        self.sent.lock().unwrap().clone()
    }

    fn record(&self, recipient: Recipient, kind: NotificationType, title: &str, message: &str, related_id: Uuid) {
        self.sent.lock().unwrap().push(RecordedNotification {
            recipient,
            kind,
            title: title.to_string(),
            message: message.to_string(),
            related_id,
        });
    }
}

impl Notifier for RecordingNotifier {
    fn notify_user(
        &self,
        user_id: Uuid,
        kind: NotificationType,
        title: &str,
        message: &str,
        related_id: Uuid,
    ) -> Result<(), NotifyError> {
        self.record(Recipient::User(user_id), kind, title, message, related_id);
        Ok(())
    }

    fn notify_restaurant(
        &self,
        restaurant_id: Uuid,
        kind: NotificationType,
        title: &str,
        message: &str,
        related_id: Uuid,
    ) -> Result<(), NotifyError> {
        self.record(Recipient::Restaurant(restaurant_id), kind, title, message, related_id);
        Ok(())
    }
}

/// Store wrapper that delegates everything but can be told to fail the
/// next seat adjustment, for exercising the compensation path.
#[derive(Clone)]
pub struct FlakySlots<S> {
    inner: S,
    fail_next_adjust: Arc<AtomicBool>,
    pub calls_to_adjust: Arc<AtomicU64>,
}

impl<S> FlakySlots<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            fail_next_adjust: Arc::new(AtomicBool::new(false)),
            calls_to_adjust: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn fail_next_adjust(&self) {
        self.fail_next_adjust.store(true, Ordering::SeqCst);
    }
}

impl<S: AvailabilityBackend> AvailabilityBackend for FlakySlots<S> {
    fn slots_by_restaurant_and_date(
        &self,
        restaurant_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<AvailabilitySlot>, BookingError> {
        self.inner.slots_by_restaurant_and_date(restaurant_id, date)
    }

    fn upsert_slot(
        &self,
        restaurant_id: Uuid,
        date: NaiveDate,
        time_slot: &str,
        capacity: i32,
    ) -> Result<AvailabilitySlot, BookingError> {
        self.inner.upsert_slot(restaurant_id, date, time_slot, capacity)
    }

    fn adjust_reserved_seats(&self, slot_id: Uuid, delta: i32) -> Result<(), BookingError> {
        self.calls_to_adjust.fetch_add(1, Ordering::SeqCst);
        if self.fail_next_adjust.swap(false, Ordering::SeqCst) {
            return Err(BookingError::InsufficientCapacity {
                slot_id,
                requested: delta,
                available: 0,
            });
        }
        self.inner.adjust_reserved_seats(slot_id, delta)
    }
}

impl<S: BookingBackend> BookingBackend for FlakySlots<S> {
    fn booking(&self, id: Uuid) -> Result<Booking, BookingError> {
        self.inner.booking(id)
    }

    fn bookings_by_restaurant(&self, restaurant_id: Uuid) -> Result<Vec<Booking>, BookingError> {
        self.inner.bookings_by_restaurant(restaurant_id)
    }

    fn bookings_by_user(&self, user_id: Uuid) -> Result<Vec<Booking>, BookingError> {
        self.inner.bookings_by_user(user_id)
    }

    fn insert_booking(&self, booking: &NewBooking) -> Result<Booking, BookingError> {
        self.inner.insert_booking(booking)
    }

    fn transition(&self, id: Uuid, action: BookingAction) -> Result<Booking, BookingError> {
        self.inner.transition(id, action)
    }

    fn add_alternative(
        &self,
        booking_id: Uuid,
        date: NaiveDate,
        time: &str,
        message: &str,
    ) -> Result<BookingAlternative, BookingError> {
        self.inner.add_alternative(booking_id, date, time, message)
    }

    fn alternative(&self, id: Uuid) -> Result<BookingAlternative, BookingError> {
        self.inner.alternative(id)
    }

    fn accept_alternative(
        &self,
        alternative_id: Uuid,
    ) -> Result<(Booking, BookingAlternative), BookingError> {
        self.inner.accept_alternative(alternative_id)
    }

    fn reject_alternative(
        &self,
        alternative_id: Uuid,
    ) -> Result<(Booking, BookingAlternative), BookingError> {
        self.inner.reject_alternative(alternative_id)
    }
}

impl<S: Directory> Directory for FlakySlots<S> {
    fn restaurant_exists(&self, id: Uuid) -> Result<bool, BookingError> {
        self.inner.restaurant_exists(id)
    }

    fn user_exists(&self, id: Uuid) -> Result<bool, BookingError> {
        self.inner.user_exists(id)
    }
}
