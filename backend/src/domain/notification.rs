//! Per-user notification queue entries.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::closed_enum::closed_enum;
use crate::domain::{OrderCode, OrderId, UserId};

/// Maximum number of notifications returned by one poll.
pub const NOTIFICATION_FETCH_MAX: usize = 50;

closed_enum! {
    /// Event a notification reports.
    pub enum NotificationKind as "notification type" {
        BuyerJoined => "buyer_joined",
        PaymentConfirmed => "payment_confirmed",
        AssetTransferred => "asset_transferred",
        OrderCompleted => "order_completed",
        OrderCancelled => "order_cancelled",
    }
}

impl NotificationKind {
    /// Human readable text for an event on the order with `code`.
    ///
    /// # Examples
    /// ```
    /// use escrow_market::domain::{NotificationKind, OrderCode};
    ///
    /// let code = OrderCode::parse("AB12CD34").expect("valid code");
    /// assert_eq!(
    ///     NotificationKind::BuyerJoined.message_for(&code),
    ///     "Buyer joined order #AB12CD34"
    /// );
    /// ```
    pub fn message_for(self, code: &OrderCode) -> String {
        match self {
            Self::BuyerJoined => format!("Buyer joined order #{code}"),
            Self::PaymentConfirmed => format!("Buyer confirmed payment for order #{code}"),
            Self::AssetTransferred => {
                format!("Seller transferred the asset for order #{code}. Check receipt.")
            }
            Self::OrderCompleted => format!("Order #{code} completed successfully"),
            Self::OrderCancelled => format!("Seller cancelled order #{code}"),
        }
    }
}

/// Notification identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationId(Uuid);

impl NotificationId {
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Notification waiting to be appended to a recipient's queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
    pub recipient: UserId,
    pub order_id: OrderId,
    pub kind: NotificationKind,
    pub message: String,
}

impl NewNotification {
    /// Notification about `kind` on the order identified by `order_id`/`code`.
    pub fn about(
        recipient: UserId,
        order_id: OrderId,
        code: &OrderCode,
        kind: NotificationKind,
    ) -> Self {
        Self {
            recipient,
            order_id,
            kind,
            message: kind.message_for(code),
        }
    }
}

/// Stored notification. Only `read` ever changes after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: NotificationId,
    pub recipient: UserId,
    pub order_id: OrderId,
    pub kind: NotificationKind,
    pub message: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Materialise a queued notification as unread.
    pub fn unread(new: NewNotification) -> Self {
        Self {
            id: NotificationId::random(),
            recipient: new.recipient,
            order_id: new.order_id,
            kind: new.kind,
            message: new.message,
            read: false,
            created_at: Utc::now(),
        }
    }
}
