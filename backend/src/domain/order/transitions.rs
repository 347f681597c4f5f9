//! Order state machine.
//!
//! ```text
//! active ──► paid ──► transferred ──► completed
//!   │          └──────────────────────────▲
//!   └──► cancelled
//! ```
//!
//! Each target status has exactly one rule naming the states it may be
//! entered from, the role that drives it, and its side effect.

use crate::domain::{
    NotificationKind, Order, OrderRuleViolation, OrderStatus, ParticipantRole, UserId,
};

/// Side effect a successful transition triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionEffect {
    /// Tell the counterparty holding `recipient` about the change.
    Notify {
        recipient: ParticipantRole,
        kind: NotificationKind,
    },
    /// Settle the deal: bump completed-deal counts, record volumes, and
    /// notify both participants.
    Settle,
}

/// A permitted status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionRule {
    pub sources: &'static [OrderStatus],
    pub target: OrderStatus,
    pub actor: ParticipantRole,
    pub effect: TransitionEffect,
}

const RULES: &[TransitionRule] = &[
    TransitionRule {
        sources: &[OrderStatus::Active],
        target: OrderStatus::Paid,
        actor: ParticipantRole::Buyer,
        effect: TransitionEffect::Notify {
            recipient: ParticipantRole::Seller,
            kind: NotificationKind::PaymentConfirmed,
        },
    },
    TransitionRule {
        sources: &[OrderStatus::Paid],
        target: OrderStatus::Transferred,
        actor: ParticipantRole::Seller,
        effect: TransitionEffect::Notify {
            recipient: ParticipantRole::Buyer,
            kind: NotificationKind::AssetTransferred,
        },
    },
    TransitionRule {
        sources: &[OrderStatus::Paid, OrderStatus::Transferred],
        target: OrderStatus::Completed,
        actor: ParticipantRole::Buyer,
        effect: TransitionEffect::Settle,
    },
    TransitionRule {
        sources: &[OrderStatus::Active],
        target: OrderStatus::Cancelled,
        actor: ParticipantRole::Seller,
        effect: TransitionEffect::Notify {
            recipient: ParticipantRole::Buyer,
            kind: NotificationKind::OrderCancelled,
        },
    },
];

/// Rule for entering `target`, if any state may lead there.
pub fn rule_for(target: OrderStatus) -> Option<&'static TransitionRule> {
    RULES.iter().find(|rule| rule.target == target)
}

/// Outcome of planning a status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionPlan {
    /// The order already sits in the requested status.
    Unchanged,
    /// The change is allowed and must be applied under this rule.
    Apply(&'static TransitionRule),
}

/// Decide whether `caller` may move `order` to `target`.
///
/// Checks run in a fixed order: participation, idempotent repeat, the
/// transition table, a bound buyer for buyer-driven steps, then the role.
/// Administrators skip the participation and role checks only.
///
/// # Examples
/// ```
/// use escrow_market::domain::transitions::{plan, TransitionPlan};
/// use escrow_market::domain::{
///     AssetType, Currency, Order, OrderCode, OrderListing, OrderListingDraft, OrderStatus,
///     PaymentMethod, UserId,
/// };
/// use rust_decimal::Decimal;
///
/// let seller = UserId::random();
/// let listing = OrderListing::try_from(OrderListingDraft {
///     asset_type: AssetType::Gift,
///     payment_method: PaymentMethod::Wallet,
///     amount: Decimal::TEN,
///     currency: Currency::Ton,
///     description: "Plush Pepe".into(),
///     seller_requisites: "UQ-wallet".into(),
/// })
/// .expect("valid listing");
/// let order = Order::open(OrderCode::parse("AB12CD34").expect("code"), seller, listing);
///
/// let plan = plan(&order, OrderStatus::Cancelled, seller, false).expect("seller may cancel");
/// assert!(matches!(plan, TransitionPlan::Apply(_)));
/// ```
pub fn plan(
    order: &Order,
    target: OrderStatus,
    caller: UserId,
    is_admin: bool,
) -> Result<TransitionPlan, OrderRuleViolation> {
    let role = order.role_of(caller);
    if role.is_none() && !is_admin {
        return Err(OrderRuleViolation::NotParticipant);
    }
    let current = order.status();
    if current == target {
        return Ok(TransitionPlan::Unchanged);
    }
    let rule = rule_for(target)
        .filter(|rule| rule.sources.contains(&current))
        .ok_or(OrderRuleViolation::InvalidTransition {
            from: current,
            to: target,
        })?;
    if rule.actor == ParticipantRole::Buyer && order.buyer_id().is_none() {
        return Err(OrderRuleViolation::NoBuyer);
    }
    if !is_admin && role != Some(rule.actor) {
        return Err(OrderRuleViolation::RoleMismatch {
            required: rule.actor,
        });
    }
    Ok(TransitionPlan::Apply(rule))
}
