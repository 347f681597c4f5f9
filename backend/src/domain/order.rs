//! Escrow order aggregate.
//!
//! An order is listed by a seller, joined by at most one buyer, and then
//! driven through its lifecycle by the state machine in [`transitions`].

mod code;
mod kinds;
pub mod transitions;
mod violation;

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::UserId;

pub use self::code::{
    ORDER_CODE_ALPHABET, ORDER_CODE_LEN, OrderCode, OrderCodeError, OrderCodeGenerator,
    RandomOrderCodeGenerator,
};
#[cfg(test)]
pub use self::code::MockOrderCodeGenerator;
pub use self::kinds::{AssetType, Currency, OrderStatus, ParticipantRole, PaymentMethod};
pub use self::violation::OrderRuleViolation;

/// Internal order identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(Uuid);

impl OrderId {
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

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Either form a client may use to address an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderIdentifier {
    Id(OrderId),
    Code(OrderCode),
}

impl OrderIdentifier {
    /// Interpret raw input as a UUID or, failing that, an order code.
    ///
    /// Returns `None` when the input is neither; such an order cannot exist.
    ///
    /// # Examples
    /// ```
    /// use escrow_market::domain::OrderIdentifier;
    ///
    /// assert!(matches!(
    ///     OrderIdentifier::parse("ab12cd34"),
    ///     Some(OrderIdentifier::Code(_))
    /// ));
    /// assert!(OrderIdentifier::parse("not a code").is_none());
    /// ```
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if let Ok(uuid) = Uuid::parse_str(raw) {
            return Some(Self::Id(OrderId::from_uuid(uuid)));
        }
        OrderCode::parse(raw).ok().map(Self::Code)
    }
}

impl fmt::Display for OrderIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => id.fmt(f),
            Self::Code(code) => code.fmt(f),
        }
    }
}

/// Most fractional digits an order amount may carry.
pub const AMOUNT_MAX_SCALE: u32 = 9;
/// Number of integer digits an order amount may carry; amounts stay below
/// `10^AMOUNT_MAX_INTEGER_DIGITS`.
pub const AMOUNT_MAX_INTEGER_DIGITS: u32 = 21;

/// Validation errors raised while building orders.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrderValidationError {
    #[error("amount must be greater than zero")]
    NonPositiveAmount,
    #[error("amount must be below 10^{max_integer_digits}")]
    AmountTooLarge { max_integer_digits: u32 },
    #[error("amount may have at most {max_scale} decimal places")]
    AmountTooPrecise { max_scale: u32 },
    #[error("description must not be empty")]
    EmptyDescription,
    #[error("seller requisites must not be empty")]
    EmptyRequisites,
    #[error("buyer must differ from seller")]
    BuyerIsSeller,
}

/// Caller-supplied listing terms, before validation.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderListingDraft {
    pub asset_type: AssetType,
    pub payment_method: PaymentMethod,
    pub amount: Decimal,
    pub currency: Currency,
    pub description: String,
    pub seller_requisites: String,
}

/// Validated listing terms of an order.
///
/// ## Invariants
/// - `amount` is strictly positive, below `10^21` and has at most nine
///   decimal places, so it fits the `NUMERIC(30, 9)` column exactly.
/// - `description` and `seller_requisites` are non-empty once trimmed.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderListing {
    asset_type: AssetType,
    payment_method: PaymentMethod,
    amount: Decimal,
    currency: Currency,
    description: String,
    seller_requisites: String,
}

impl TryFrom<OrderListingDraft> for OrderListing {
    type Error = OrderValidationError;

    fn try_from(value: OrderListingDraft) -> Result<Self, Self::Error> {
        let amount = value.amount.normalize();
        if amount <= Decimal::ZERO {
            return Err(OrderValidationError::NonPositiveAmount);
        }
        if amount >= Decimal::from_i128_with_scale(10_i128.pow(AMOUNT_MAX_INTEGER_DIGITS), 0) {
            return Err(OrderValidationError::AmountTooLarge {
                max_integer_digits: AMOUNT_MAX_INTEGER_DIGITS,
            });
        }
        if amount.scale() > AMOUNT_MAX_SCALE {
            return Err(OrderValidationError::AmountTooPrecise {
                max_scale: AMOUNT_MAX_SCALE,
            });
        }
        let description = value.description.trim();
        if description.is_empty() {
            return Err(OrderValidationError::EmptyDescription);
        }
        let seller_requisites = value.seller_requisites.trim();
        if seller_requisites.is_empty() {
            return Err(OrderValidationError::EmptyRequisites);
        }
        Ok(Self {
            asset_type: value.asset_type,
            payment_method: value.payment_method,
            amount,
            currency: value.currency,
            description: description.to_owned(),
            seller_requisites: seller_requisites.to_owned(),
        })
    }
}

impl OrderListing {
    pub fn asset_type(&self) -> AssetType {
        self.asset_type
    }

    pub fn payment_method(&self) -> PaymentMethod {
        self.payment_method
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn description(&self) -> &str {
        self.description.as_str()
    }

    pub fn seller_requisites(&self) -> &str {
        self.seller_requisites.as_str()
    }
}

/// Input for [`Order::new`], used by adapters rehydrating stored records.
#[derive(Debug, Clone)]
pub struct OrderDraft {
    pub id: OrderId,
    pub code: OrderCode,
    pub seller_id: UserId,
    pub buyer_id: Option<UserId>,
    pub listing: OrderListing,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Escrow order.
///
/// ## Invariants
/// - `buyer_id`, when bound, differs from `seller_id`.
/// - `code` never changes after creation.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    id: OrderId,
    code: OrderCode,
    seller_id: UserId,
    buyer_id: Option<UserId>,
    listing: OrderListing,
    status: OrderStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Order {
    /// Build an order from stored components.
    pub fn new(draft: OrderDraft) -> Result<Self, OrderValidationError> {
        if draft.buyer_id == Some(draft.seller_id) {
            return Err(OrderValidationError::BuyerIsSeller);
        }
        Ok(Self {
            id: draft.id,
            code: draft.code,
            seller_id: draft.seller_id,
            buyer_id: draft.buyer_id,
            listing: draft.listing,
            status: draft.status,
            created_at: draft.created_at,
            updated_at: draft.updated_at,
        })
    }

    /// A freshly listed order: `active`, without a buyer.
    pub fn open(code: OrderCode, seller_id: UserId, listing: OrderListing) -> Self {
        let now = Utc::now();
        Self {
            id: OrderId::random(),
            code,
            seller_id,
            buyer_id: None,
            listing,
            status: OrderStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> OrderId {
        self.id
    }

    pub fn code(&self) -> &OrderCode {
        &self.code
    }

    pub fn seller_id(&self) -> UserId {
        self.seller_id
    }

    pub fn buyer_id(&self) -> Option<UserId> {
        self.buyer_id
    }

    pub fn listing(&self) -> &OrderListing {
        &self.listing
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Role `user` holds in this order, if any.
    pub fn role_of(&self, user: UserId) -> Option<ParticipantRole> {
        if user == self.seller_id {
            Some(ParticipantRole::Seller)
        } else if Some(user) == self.buyer_id {
            Some(ParticipantRole::Buyer)
        } else {
            None
        }
    }

    /// Every bound participant, seller first.
    pub fn participants(&self) -> impl Iterator<Item = UserId> + '_ {
        std::iter::once(self.seller_id).chain(self.buyer_id)
    }
}

impl From<Order> for OrderDraft {
    fn from(value: Order) -> Self {
        Self {
            id: value.id,
            code: value.code,
            seller_id: value.seller_id,
            buyer_id: value.buyer_id,
            listing: value.listing,
            status: value.status,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

#[cfg(test)]
mod tests;
