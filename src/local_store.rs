use crate::backend::{AvailabilityBackend, BookingBackend, Directory};
use crate::error::BookingError;
use crate::types::{
    apply_reserved_delta, AvailabilitySlot, Booking, BookingAction, BookingAlternative,
    BookingStatus, NewBooking,
};
use chrono::{NaiveDate, Utc};
use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex},
};
use uuid::Uuid;

/// In-memory store backing tests and the demo mode.
///
/// The slot table and the booking tables sit behind separate mutexes so
/// seat adjustments never contend with booking transitions. Bookings and
/// alternatives share one lock because accepting an alternative writes
/// both rows as a single atomic unit.
#[derive(Debug, Clone, Default)]
pub struct LocalStore {
    directory: Arc<Mutex<DirectoryState>>,
    slots: Arc<Mutex<HashMap<Uuid, AvailabilitySlot>>>,
    bookings: Arc<Mutex<BookingState>>,
}

#[derive(Debug, Default)]
struct DirectoryState {
    restaurants: HashSet<Uuid>,
    users: HashSet<Uuid>,
}

#[derive(Debug, Default)]
struct BookingState {
    bookings: HashMap<Uuid, Booking>,
    alternatives: HashMap<Uuid, BookingAlternative>,
}

impl BookingState {
    /// Bookings are stored without their offers; reads compose them,
    /// newest first.
    fn compose(&self, mut booking: Booking) -> Booking {
        let mut alternatives: Vec<BookingAlternative> = self
            .alternatives
            .values()
            .filter(|alt| alt.booking_id == booking.id)
            .cloned()
            .collect();
        alternatives.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        booking.alternatives = alternatives;
        booking
    }
}

impl LocalStore {
    pub fn register_restaurant(&self) -> Uuid {
        let id = Uuid::new_v4();
        self.directory.lock().unwrap().restaurants.insert(id);
        id
    }

    pub fn register_user(&self) -> Uuid {
        let id = Uuid::new_v4();
        self.directory.lock().unwrap().users.insert(id);
        id
    }

    /// Demo fixture: one restaurant, one user, evening slots for the next
    /// few days. Returns the generated ids so callers can log them.
    pub fn seed_demo_data(&self) -> Result<(Uuid, Uuid), BookingError> {
        const DEMO_DAYS: i64 = 5;
        const DEMO_CAPACITY: i32 = 20;

        let restaurant_id = self.register_restaurant();
        let user_id = self.register_user();
        for day in 1..=DEMO_DAYS {
            let date = Utc::now().date_naive() + chrono::Duration::days(day);
            for time_slot in ["18:00", "19:00", "20:00"] {
                self.upsert_slot(restaurant_id, date, time_slot, DEMO_CAPACITY)?;
            }
        }
        Ok((restaurant_id, user_id))
    }
}

impl Directory for LocalStore {
    fn restaurant_exists(&self, id: Uuid) -> Result<bool, BookingError> {
        Ok(self.directory.lock().unwrap().restaurants.contains(&id))
    }

    fn user_exists(&self, id: Uuid) -> Result<bool, BookingError> {
        Ok(self.directory.lock().unwrap().users.contains(&id))
    }
}

impl AvailabilityBackend for LocalStore {
    fn slots_by_restaurant_and_date(
        &self,
        restaurant_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<AvailabilitySlot>, BookingError> {
        let slots = self.slots.lock().unwrap();
        let mut matching: Vec<AvailabilitySlot> = slots
            .values()
            .filter(|slot| slot.restaurant_id == restaurant_id && slot.date == date)
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.time_slot.cmp(&b.time_slot));
        Ok(matching)
    }

    fn upsert_slot(
        &self,
        restaurant_id: Uuid,
        date: NaiveDate,
        time_slot: &str,
        capacity: i32,
    ) -> Result<AvailabilitySlot, BookingError> {
        let mut slots = self.slots.lock().unwrap();
        let now = Utc::now();

        if let Some(slot) = slots.values_mut().find(|slot| {
            slot.restaurant_id == restaurant_id && slot.date == date && slot.time_slot == time_slot
        }) {
            slot.capacity = capacity;
            slot.updated_at = now;
            return Ok(slot.clone());
        }

        let slot = AvailabilitySlot {
            id: Uuid::new_v4(),
            restaurant_id,
            date,
            time_slot: time_slot.to_string(),
            capacity,
            reserved: 0,
            updated_at: now,
        };
        slots.insert(slot.id, slot.clone());
        Ok(slot)
    }

    fn adjust_reserved_seats(&self, slot_id: Uuid, delta: i32) -> Result<(), BookingError> {
        let mut slots = self.slots.lock().unwrap();
        let slot = slots
            .get_mut(&slot_id)
            .ok_or(BookingError::SlotNotFound(slot_id))?;

        let new_reserved = apply_reserved_delta(slot.capacity, slot.reserved, delta).ok_or(
            BookingError::InsufficientCapacity {
                slot_id,
                requested: delta,
                available: slot.available_seats(),
            },
        )?;

        slot.reserved = new_reserved;
        slot.updated_at = Utc::now();
        Ok(())
    }
}

impl BookingBackend for LocalStore {
    fn booking(&self, id: Uuid) -> Result<Booking, BookingError> {
        let state = self.bookings.lock().unwrap();
        let booking = state
            .bookings
            .get(&id)
            .cloned()
            .ok_or(BookingError::BookingNotFound(id))?;
        Ok(state.compose(booking))
    }

    fn bookings_by_restaurant(&self, restaurant_id: Uuid) -> Result<Vec<Booking>, BookingError> {
        let state = self.bookings.lock().unwrap();
        let mut bookings: Vec<Booking> = state
            .bookings
            .values()
            .filter(|booking| booking.restaurant_id == restaurant_id)
            .cloned()
            .map(|booking| state.compose(booking))
            .collect();
        bookings.sort_by(|a, b| (b.date, &b.time).cmp(&(a.date, &a.time)));
        Ok(bookings)
    }

    fn bookings_by_user(&self, user_id: Uuid) -> Result<Vec<Booking>, BookingError> {
        let state = self.bookings.lock().unwrap();
        let mut bookings: Vec<Booking> = state
            .bookings
            .values()
            .filter(|booking| booking.user_id == user_id)
            .cloned()
            .map(|booking| state.compose(booking))
            .collect();
        bookings.sort_by(|a, b| (b.date, &b.time).cmp(&(a.date, &a.time)));
        Ok(bookings)
    }

    fn insert_booking(&self, new: &NewBooking) -> Result<Booking, BookingError> {
        if !self.restaurant_exists(new.restaurant_id)? {
            return Err(BookingError::RestaurantNotFound(new.restaurant_id));
        }
        if !self.user_exists(new.user_id)? {
            return Err(BookingError::UserNotFound(new.user_id));
        }

        let now = Utc::now();
        let booking = Booking {
            id: Uuid::new_v4(),
            restaurant_id: new.restaurant_id,
            user_id: new.user_id,
            date: new.date,
            time: new.time.clone(),
            duration_minutes: new.duration_minutes,
            guests_count: new.guests_count,
            status: BookingStatus::Pending,
            comment: new.comment.clone(),
            created_at: now,
            updated_at: now,
            confirmed_at: None,
            rejected_at: None,
            completed_at: None,
            alternatives: Vec::new(),
        };

        let mut state = self.bookings.lock().unwrap();
        state.bookings.insert(booking.id, booking.clone());
        Ok(booking)
    }

    fn transition(&self, id: Uuid, action: BookingAction) -> Result<Booking, BookingError> {
        let mut state = self.bookings.lock().unwrap();
        let booking = state
            .bookings
            .get_mut(&id)
            .ok_or(BookingError::BookingNotFound(id))?;

        if !booking.status.allows(action) {
            return Err(BookingError::InvalidBookingStatus {
                booking_id: id,
                status: booking.status,
                action,
            });
        }

        let now = Utc::now();
        booking.status = action.target_status();
        booking.updated_at = now;
        match action {
            BookingAction::Confirm => booking.confirmed_at = Some(now),
            BookingAction::Reject => booking.rejected_at = Some(now),
            BookingAction::Complete => booking.completed_at = Some(now),
            BookingAction::Cancel | BookingAction::ProposeAlternative => {}
        }

        let updated = booking.clone();
        Ok(state.compose(updated))
    }

    fn add_alternative(
        &self,
        booking_id: Uuid,
        date: NaiveDate,
        time: &str,
        message: &str,
    ) -> Result<BookingAlternative, BookingError> {
        let mut state = self.bookings.lock().unwrap();
        if !state.bookings.contains_key(&booking_id) {
            return Err(BookingError::BookingNotFound(booking_id));
        }

        let alternative = BookingAlternative {
            id: Uuid::new_v4(),
            booking_id,
            date,
            time: time.to_string(),
            message: message.to_string(),
            created_at: Utc::now(),
            accepted_at: None,
            rejected_at: None,
        };
        state.alternatives.insert(alternative.id, alternative.clone());
        Ok(alternative)
    }

    fn alternative(&self, id: Uuid) -> Result<BookingAlternative, BookingError> {
        self.bookings
            .lock()
            .unwrap()
            .alternatives
            .get(&id)
            .cloned()
            .ok_or(BookingError::AlternativeNotFound(id))
    }

    fn accept_alternative(
        &self,
        alternative_id: Uuid,
    ) -> Result<(Booking, BookingAlternative), BookingError> {
        let mut state = self.bookings.lock().unwrap();

        let (booking_id, date, time) = match state.alternatives.get(&alternative_id) {
            Some(alt) if !alt.is_decided() => (alt.booking_id, alt.date, alt.time.clone()),
            _ => return Err(BookingError::AlternativeNotFound(alternative_id)),
        };
        // Both writes or neither: verify the parent before touching the offer.
        if !state.bookings.contains_key(&booking_id) {
            return Err(BookingError::BookingNotFound(booking_id));
        }

        let now = Utc::now();
        let alt = state
            .alternatives
            .get_mut(&alternative_id)
            .ok_or(BookingError::AlternativeNotFound(alternative_id))?;
        alt.accepted_at = Some(now);
        let accepted = alt.clone();

        let booking = state
            .bookings
            .get_mut(&booking_id)
            .ok_or(BookingError::BookingNotFound(booking_id))?;
        booking.date = date;
        booking.time = time;
        booking.status = BookingStatus::Confirmed;
        booking.confirmed_at = Some(now);
        booking.updated_at = now;
        let updated = booking.clone();

        Ok((state.compose(updated), accepted))
    }

    fn reject_alternative(
        &self,
        alternative_id: Uuid,
    ) -> Result<(Booking, BookingAlternative), BookingError> {
        let mut state = self.bookings.lock().unwrap();

        let booking_id = match state.alternatives.get(&alternative_id) {
            Some(alt) if !alt.is_decided() => alt.booking_id,
            _ => return Err(BookingError::AlternativeNotFound(alternative_id)),
        };
        let booking = state
            .bookings
            .get(&booking_id)
            .cloned()
            .ok_or(BookingError::BookingNotFound(booking_id))?;

        let alt = state
            .alternatives
            .get_mut(&alternative_id)
            .ok_or(BookingError::AlternativeNotFound(alternative_id))?;
        alt.rejected_at = Some(Utc::now());
        let rejected = alt.clone();

        Ok((state.compose(booking), rejected))
    }
}
