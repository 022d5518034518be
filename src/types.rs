use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Occupancy ratio above which a slot is reported as `Limited`.
pub const HIGH_OCCUPANCY_THRESHOLD: f64 = 0.8;

/// One bookable unit of capacity: a (restaurant, date, time slot) triple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailabilitySlot {
    pub id: Uuid,
    pub restaurant_id: Uuid,
    pub date: NaiveDate,
    pub time_slot: String,
    pub capacity: i32,
    pub reserved: i32,
    pub updated_at: DateTime<Utc>,
}

impl AvailabilitySlot {
    pub fn available_seats(&self) -> i32 {
        self.capacity - self.reserved
    }

    pub fn occupancy(&self) -> Occupancy {
        if self.reserved >= self.capacity {
            return Occupancy::FullyBooked;
        }
        if f64::from(self.reserved) / f64::from(self.capacity) >= HIGH_OCCUPANCY_THRESHOLD {
            return Occupancy::Limited;
        }
        Occupancy::Available
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Occupancy {
    Available,
    Limited,
    FullyBooked,
}

/// New reserved count after applying `delta` to a slot's counters.
///
/// `None` means the delta would exceed capacity. A negative result clamps
/// to zero instead of failing, so over-release never errors.
pub fn apply_reserved_delta(capacity: i32, reserved: i32, delta: i32) -> Option<i32> {
    let new_reserved = reserved + delta;
    if new_reserved > capacity {
        return None;
    }
    Some(new_reserved.max(0))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Rejected,
    Cancelled,
    Completed,
}

impl BookingStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Rejected => "rejected",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Completed => "completed",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            BookingStatus::Rejected | BookingStatus::Cancelled | BookingStatus::Completed
        )
    }

    /// The transition table. Everything not listed here is illegal.
    pub fn allows(self, action: BookingAction) -> bool {
        if self.is_terminal() {
            return false;
        }
        match self {
            BookingStatus::Pending => matches!(
                action,
                BookingAction::Confirm
                    | BookingAction::Reject
                    | BookingAction::Cancel
                    | BookingAction::ProposeAlternative
            ),
            BookingStatus::Confirmed => {
                matches!(action, BookingAction::Cancel | BookingAction::Complete)
            }
            _ => false,
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(BookingStatus::Pending),
            "confirmed" => Ok(BookingStatus::Confirmed),
            "rejected" => Ok(BookingStatus::Rejected),
            "cancelled" => Ok(BookingStatus::Cancelled),
            "completed" => Ok(BookingStatus::Completed),
            other => Err(format!("unknown booking status: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingAction {
    Confirm,
    Reject,
    Cancel,
    Complete,
    /// Offer a substitute date/time; the booking stays pending.
    ProposeAlternative,
}

impl BookingAction {
    pub fn target_status(self) -> BookingStatus {
        match self {
            BookingAction::Confirm => BookingStatus::Confirmed,
            BookingAction::Reject => BookingStatus::Rejected,
            BookingAction::Cancel => BookingStatus::Cancelled,
            BookingAction::Complete => BookingStatus::Completed,
            BookingAction::ProposeAlternative => BookingStatus::Pending,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BookingAction::Confirm => "confirm",
            BookingAction::Reject => "reject",
            BookingAction::Cancel => "cancel",
            BookingAction::Complete => "complete",
            BookingAction::ProposeAlternative => "propose alternative",
        }
    }
}

impl fmt::Display for BookingAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub restaurant_id: Uuid,
    pub user_id: Uuid,
    pub date: NaiveDate,
    pub time: String,
    pub duration_minutes: i32,
    pub guests_count: i32,
    pub status: BookingStatus,
    pub comment: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirmed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejected_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    /// Alternative offers for this booking, newest first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alternatives: Vec<BookingAlternative>,
}

/// Input for creating a booking. Id, status and timestamps are assigned by
/// the engine.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub restaurant_id: Uuid,
    pub user_id: Uuid,
    pub date: NaiveDate,
    pub time: String,
    pub duration_minutes: i32,
    pub guests_count: i32,
    pub comment: String,
}

/// A restaurant-proposed substitute date/time for a pending booking.
///
/// At most one of `accepted_at`/`rejected_at` is ever set; once either is,
/// the offer is immutable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingAlternative {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub date: NaiveDate,
    pub time: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accepted_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejected_at: Option<DateTime<Utc>>,
}

impl BookingAlternative {
    pub fn is_decided(&self) -> bool {
        self.accepted_at.is_some() || self.rejected_at.is_some()
    }
}
