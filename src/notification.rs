use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// Closed set of notification tags; transports branch on the tag, the
/// engine never branches per type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    NewBooking,
    BookingConfirmed,
    BookingRejected,
    BookingCancelled,
    AlternativeOffer,
    AlternativeAccepted,
    AlternativeRejected,
}

impl NotificationType {
    pub fn as_str(self) -> &'static str {
        match self {
            NotificationType::NewBooking => "new_booking",
            NotificationType::BookingConfirmed => "booking_confirmed",
            NotificationType::BookingRejected => "booking_rejected",
            NotificationType::BookingCancelled => "booking_cancelled",
            NotificationType::AlternativeOffer => "alternative_offer",
            NotificationType::AlternativeAccepted => "alternative_accepted",
            NotificationType::AlternativeRejected => "alternative_rejected",
        }
    }
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("notification delivery failed: {0}")]
pub struct NotifyError(pub String);

/// Delivery seam. The engine dispatches after its transactional write has
/// committed and treats every failure as best-effort: logged, never
/// propagated.
#[cfg_attr(test, mockall::automock)]
pub trait Notifier: Send + Sync + 'static {
    fn notify_user(
        &self,
        user_id: Uuid,
        kind: NotificationType,
        title: &str,
        message: &str,
        related_id: Uuid,
    ) -> Result<(), NotifyError>;

    fn notify_restaurant(
        &self,
        restaurant_id: Uuid,
        kind: NotificationType,
        title: &str,
        message: &str,
        related_id: Uuid,
    ) -> Result<(), NotifyError>;
}

impl<T: Notifier + ?Sized> Notifier for Arc<T> {
    fn notify_user(
        &self,
        user_id: Uuid,
        kind: NotificationType,
        title: &str,
        message: &str,
        related_id: Uuid,
    ) -> Result<(), NotifyError> {
        (**self).notify_user(user_id, kind, title, message, related_id)
    }

    fn notify_restaurant(
        &self,
        restaurant_id: Uuid,
        kind: NotificationType,
        title: &str,
        message: &str,
        related_id: Uuid,
    ) -> Result<(), NotifyError> {
        (**self).notify_restaurant(restaurant_id, kind, title, message, related_id)
    }
}

/// Console transport: structured log lines instead of real delivery.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify_user(
        &self,
        user_id: Uuid,
        kind: NotificationType,
        title: &str,
        message: &str,
        related_id: Uuid,
    ) -> Result<(), NotifyError> {
        tracing::info!(
            recipient = "user",
            recipient_id = %user_id,
            kind = kind.as_str(),
            title,
            message,
            related_id = %related_id,
            "notification dispatched"
        );
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
        tracing::info!(
            recipient = "restaurant",
            recipient_id = %restaurant_id,
            kind = kind.as_str(),
            title,
            message,
            related_id = %related_id,
            "notification dispatched"
        );
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test_case::test_case(NotificationType::NewBooking => "new_booking")]
    #[test_case::test_case(NotificationType::BookingConfirmed => "booking_confirmed")]
    #[test_case::test_case(NotificationType::BookingRejected => "booking_rejected")]
    #[test_case::test_case(NotificationType::BookingCancelled => "booking_cancelled")]
    #[test_case::test_case(NotificationType::AlternativeOffer => "alternative_offer")]
    #[test_case::test_case(NotificationType::AlternativeAccepted => "alternative_accepted")]
    #[test_case::test_case(NotificationType::AlternativeRejected => "alternative_rejected")]
    fn type_tags(kind: NotificationType) -> &'static str {
        kind.as_str()
    }

    #[test]
    fn log_notifier_always_delivers() {
        let notifier = LogNotifier;
        let id = Uuid::new_v4();
        assert!(notifier
            .notify_user(id, NotificationType::NewBooking, "t", "m", id)
            .is_ok());
        assert!(notifier
            .notify_restaurant(id, NotificationType::BookingCancelled, "t", "m", id)
            .is_ok());
    }
}
