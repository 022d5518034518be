use crate::error::BookingError;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Request-scoped context passed by reference through the call chain:
/// a correlation id for log fields and an optional caller deadline.
#[derive(Debug, Clone)]
pub struct RequestContext {
    request_id: Uuid,
    deadline: Option<Instant>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self {
            request_id: Uuid::new_v4(),
            deadline: None,
        }
    }

    pub fn with_request_id(request_id: Uuid) -> Self {
        Self {
            request_id,
            deadline: None,
        }
    }

    pub fn with_deadline(mut self, timeout: Duration) -> Self {
        self.deadline = Some(Instant::now() + timeout);
        self
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    /// Fails once the caller's deadline has passed. Checked before every
    /// mutating step so an expired request never leaves partial state.
    pub fn check_deadline(&self) -> Result<(), BookingError> {
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(BookingError::DeadlineExceeded),
            _ => Ok(()),
        }
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}
