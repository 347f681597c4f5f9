//! Statistics ledger value types.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::domain::{Currency, Order, OrderId, UserId};

/// One participant's share of a completed deal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeEntry {
    pub user_id: UserId,
    pub order_id: OrderId,
    pub currency: Currency,
    pub amount: Decimal,
}

/// Ledger effects of completing an order.
///
/// Both participants are credited with the full order amount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settlement {
    pub order_id: OrderId,
    pub seller_id: UserId,
    pub buyer_id: UserId,
    pub currency: Currency,
    pub amount: Decimal,
}

impl Settlement {
    /// Settlement for `order`, or `None` when no buyer is bound.
    pub fn for_order(order: &Order) -> Option<Self> {
        let buyer_id = order.buyer_id()?;
        Some(Self {
            order_id: order.id(),
            seller_id: order.seller_id(),
            buyer_id,
            currency: order.listing().currency(),
            amount: order.listing().amount(),
        })
    }

    /// Volume rows to append, seller first.
    pub fn volume_entries(&self) -> [VolumeEntry; 2] {
        [self.seller_id, self.buyer_id].map(|user_id| VolumeEntry {
            user_id,
            order_id: self.order_id,
            currency: self.currency,
            amount: self.amount,
        })
    }
}

/// Traded volume per currency, aggregated at read time.
///
/// # Examples
/// ```
/// use escrow_market::domain::{CurrencyVolumes, Currency};
/// use rust_decimal::Decimal;
///
/// let volumes = CurrencyVolumes::from_amounts([
///     (Currency::Usd, Decimal::new(10, 0)),
///     (Currency::Usd, Decimal::new(5, 0)),
/// ]);
/// assert_eq!(volumes.expect("fits").get(Currency::Usd), Decimal::new(15, 0));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CurrencyVolumes(BTreeMap<Currency, Decimal>);

/// A per-currency total left the range [`Decimal`] can represent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("traded {currency} volume exceeds the representable range")]
pub struct VolumeOverflow {
    pub currency: Currency,
}

impl CurrencyVolumes {
    /// Sum amounts per currency.
    ///
    /// # Errors
    /// Returns [`VolumeOverflow`] when a running total overflows.
    pub fn from_amounts(
        amounts: impl IntoIterator<Item = (Currency, Decimal)>,
    ) -> Result<Self, VolumeOverflow> {
        let mut totals = BTreeMap::new();
        for (currency, amount) in amounts {
            let total = totals.entry(currency).or_insert(Decimal::ZERO);
            *total = total
                .checked_add(amount)
                .ok_or(VolumeOverflow { currency })?;
        }
        Ok(Self(totals))
    }

    /// Volume in `currency`; zero when nothing was traded.
    pub fn get(&self, currency: Currency) -> Decimal {
        self.0.get(&currency).copied().unwrap_or(Decimal::ZERO)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Currency, Decimal)> + '_ {
        self.0.iter().map(|(currency, amount)| (*currency, *amount))
    }
}

/// Marketplace-wide counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlatformStats {
    pub completed_deals: u64,
    pub total_users: u64,
    pub active_orders: u64,
}
