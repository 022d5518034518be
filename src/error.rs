use crate::types::{BookingAction, BookingStatus};
use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

/// Stable error kinds for every booking and availability operation.
///
/// Transport adapters map on the variant, never on the message text.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BookingError {
    #[error("restaurant {0} not found")]
    RestaurantNotFound(Uuid),

    #[error("user {0} not found")]
    UserNotFound(Uuid),

    #[error("booking {0} not found")]
    BookingNotFound(Uuid),

    #[error("availability slot {0} not found")]
    SlotNotFound(Uuid),

    /// Unknown id, or the offer has already been accepted or rejected.
    #[error("alternative offer {0} not found or already decided")]
    AlternativeNotFound(Uuid),

    #[error("booking {booking_id} is {status}, cannot {action}")]
    InvalidBookingStatus {
        booking_id: Uuid,
        status: BookingStatus,
        action: BookingAction,
    },

    /// Fast-path check: no slot for the requested time, or not enough free
    /// seats at request time.
    #[error("no availability at restaurant {restaurant_id} on {date} at {time_slot}")]
    NoAvailability {
        restaurant_id: Uuid,
        date: NaiveDate,
        time_slot: String,
    },

    /// Authoritative check: the atomic adjustment would exceed capacity.
    #[error("slot {slot_id} has {available} free seats, {requested} requested")]
    InsufficientCapacity {
        slot_id: Uuid,
        requested: i32,
        available: i32,
    },

    /// Lost a write-write race; the caller may retry.
    #[error("conflicting concurrent update")]
    Conflict,

    /// Input rejected before any write. HTTP callers normally hit the DTO
    /// validator first; this guards direct engine callers.
    #[error("invalid input: {0}")]
    Validation(String),

    #[error("operation deadline exceeded")]
    DeadlineExceeded,

    #[error("storage failure: {0}")]
    Storage(String),
}

impl From<diesel::result::Error> for BookingError {
    fn from(err: diesel::result::Error) -> Self {
        use diesel::result::{DatabaseErrorKind, Error};
        match err {
            Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _)
            | Error::DatabaseError(DatabaseErrorKind::SerializationFailure, _) => {
                BookingError::Conflict
            }
            other => BookingError::Storage(other.to_string()),
        }
    }
}
