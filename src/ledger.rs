use crate::backend::{AvailabilityBackend, Directory};
use crate::context::RequestContext;
use crate::error::BookingError;
use crate::types::AvailabilitySlot;
use chrono::NaiveDate;
use uuid::Uuid;

/// Availability Ledger: capacity queries and atomic seat accounting over a
/// storage backend. Owns no state of its own.
#[derive(Debug, Clone)]
pub struct AvailabilityLedger<S> {
    store: S,
}

impl<S> AvailabilityLedger<S>
where
    S: AvailabilityBackend + Directory,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn slots_for_date(
        &self,
        _ctx: &RequestContext,
        restaurant_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<AvailabilitySlot>, BookingError> {
        self.store.slots_by_restaurant_and_date(restaurant_id, date)
    }

    pub fn publish_slot(
        &self,
        ctx: &RequestContext,
        restaurant_id: Uuid,
        date: NaiveDate,
        time_slot: &str,
        capacity: i32,
    ) -> Result<AvailabilitySlot, BookingError> {
        ctx.check_deadline()?;
        tracing::info!(
            request_id = %ctx.request_id(),
            %restaurant_id,
            %date,
            time_slot,
            capacity,
            "publishing availability slot"
        );

        if capacity < 1 {
            return Err(BookingError::Validation(format!(
                "slot capacity must be at least 1, got {capacity}"
            )));
        }
        if !self.store.restaurant_exists(restaurant_id)? {
            tracing::warn!(request_id = %ctx.request_id(), %restaurant_id, "unknown restaurant");
            return Err(BookingError::RestaurantNotFound(restaurant_id));
        }

        self.store
            .upsert_slot(restaurant_id, date, time_slot, capacity)
    }

    pub fn adjust_reserved_seats(
        &self,
        ctx: &RequestContext,
        slot_id: Uuid,
        delta: i32,
    ) -> Result<(), BookingError> {
        ctx.check_deadline()?;
        tracing::info!(request_id = %ctx.request_id(), %slot_id, delta, "adjusting reserved seats");

        self.store.adjust_reserved_seats(slot_id, delta).map_err(|err| {
            tracing::warn!(
                request_id = %ctx.request_id(),
                %slot_id,
                delta,
                error = %err,
                "seat adjustment failed"
            );
            err
        })
    }

    /// `false` (never an error) when no slot matches the requested time.
    pub fn check_availability(
        &self,
        _ctx: &RequestContext,
        restaurant_id: Uuid,
        date: NaiveDate,
        time_slot: &str,
        guests_count: i32,
    ) -> Result<bool, BookingError> {
        let slots = self.store.slots_by_restaurant_and_date(restaurant_id, date)?;
        Ok(slots
            .iter()
            .find(|slot| slot.time_slot == time_slot)
            .map(|slot| slot.available_seats() >= guests_count)
            .unwrap_or(false))
    }
}
