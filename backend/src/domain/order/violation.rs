//! Business-rule rejections raised by the order services.

use serde_json::json;

use crate::domain::{Error, OrderStatus, ParticipantRole};

/// A request the marketplace rules refuse.
///
/// Each variant maps onto a transport-agnostic [`Error`] whose
/// `details.code` names the rule.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrderRuleViolation {
    #[error("user not found")]
    UserNotFound,
    #[error("order not found")]
    OrderNotFound,
    #[error("the seller cannot join their own order")]
    SelfTrade,
    #[error("order already has a buyer")]
    AlreadyJoined,
    #[error("order is not open for joining")]
    OrderNotActive,
    #[error("unknown order status `{value}`")]
    InvalidStatus { value: String },
    #[error("cannot move order from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },
    #[error("order has no buyer yet")]
    NoBuyer,
    #[error("user is not a participant of this order")]
    NotParticipant,
    #[error("only the {required} may perform this action")]
    RoleMismatch { required: ParticipantRole },
    #[error("could not allocate a unique order code after {attempts} attempts")]
    CodeExhausted { attempts: usize },
}

impl OrderRuleViolation {
    /// Stable identifier placed in `details.code`.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::UserNotFound => "user_not_found",
            Self::OrderNotFound => "order_not_found",
            Self::SelfTrade => "self_trade",
            Self::AlreadyJoined => "already_joined",
            Self::OrderNotActive => "order_not_active",
            Self::InvalidStatus { .. } => "invalid_status",
            Self::InvalidTransition { .. } => "invalid_transition",
            Self::NoBuyer => "no_buyer",
            Self::NotParticipant => "not_participant",
            Self::RoleMismatch { .. } => "role_mismatch",
            Self::CodeExhausted { .. } => "code_exhausted",
        }
    }
}

impl From<OrderRuleViolation> for Error {
    fn from(value: OrderRuleViolation) -> Self {
        let message = value.to_string();
        let reason = value.reason();
        let error = match &value {
            OrderRuleViolation::UserNotFound
            | OrderRuleViolation::OrderNotFound
            | OrderRuleViolation::OrderNotActive => Error::not_found(message),
            OrderRuleViolation::SelfTrade | OrderRuleViolation::InvalidStatus { .. } => {
                Error::invalid_request(message)
            }
            OrderRuleViolation::NotParticipant | OrderRuleViolation::RoleMismatch { .. } => {
                Error::forbidden(message)
            }
            OrderRuleViolation::AlreadyJoined
            | OrderRuleViolation::InvalidTransition { .. }
            | OrderRuleViolation::NoBuyer
            | OrderRuleViolation::CodeExhausted { .. } => Error::conflict(message),
        };
        let details = match value {
            OrderRuleViolation::InvalidStatus { value } => {
                json!({ "code": reason, "field": "status", "value": value })
            }
            OrderRuleViolation::InvalidTransition { from, to } => {
                json!({ "code": reason, "from": from, "to": to })
            }
            OrderRuleViolation::RoleMismatch { required } => {
                json!({ "code": reason, "requiredRole": required })
            }
            _ => json!({ "code": reason }),
        };
        error.with_details(details)
    }
}
