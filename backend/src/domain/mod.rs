//! Domain primitives, aggregates, ports and services.
//!
//! Purpose: model the escrow marketplace independently of HTTP and storage.
//! Entities validate their invariants on construction; services implement
//! the driving ports on top of the driven ports in [`ports`].
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure envelope.
//! - User, Order, Notification and ledger value types.
//! - `transitions`: the order state machine table.
//! - Services: identity, orders, notifications, statistics.

pub(crate) mod closed_enum;
pub mod error;
mod identity_service;
mod ledger;
mod ledger_service;
mod notification;
mod notification_service;
pub mod order;
mod order_service;
pub mod ports;
pub mod trace_id;
mod user;

pub use self::closed_enum::UnknownVariantError;
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::identity_service::IdentityService;
pub use self::ledger::{CurrencyVolumes, PlatformStats, Settlement, VolumeEntry, VolumeOverflow};
pub use self::ledger_service::LedgerService;
pub use self::notification::{
    NOTIFICATION_FETCH_MAX, NewNotification, Notification, NotificationId, NotificationKind,
};
pub use self::notification_service::{NotificationPublisher, NotificationService};
pub use self::order::transitions;
#[cfg(test)]
pub use self::order::MockOrderCodeGenerator;
pub use self::order::{
    AMOUNT_MAX_INTEGER_DIGITS, AMOUNT_MAX_SCALE, AssetType, Currency, ORDER_CODE_ALPHABET,
    ORDER_CODE_LEN, Order, OrderCode, OrderCodeError, OrderCodeGenerator, OrderDraft, OrderId, OrderIdentifier, OrderListing, OrderListingDraft,
    OrderRuleViolation, OrderStatus, OrderValidationError, ParticipantRole, PaymentMethod,
    RandomOrderCodeGenerator,
};
pub use self::order_service::{MAX_CODE_ATTEMPTS, OrderService};
pub use self::trace_id::TraceId;
pub use self::user::{
    DISPLAY_NAME_MAX, DisplayName, EXTERNAL_ID_MAX, ExternalId, Requisites, RequisitesUpdate,
    User, UserDraft, UserId, UserProfile, UserValidationError,
};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use escrow_market::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
