//! Closed vocabularies describing an order.

use crate::domain::closed_enum::closed_enum;

closed_enum! {
    /// Kind of digital asset being sold.
    pub enum AssetType as "asset type" {
        Gift => "gift" | "nft_gift",
        Username => "username" | "nft_username",
        Number => "number" | "nft_number",
    }
}

closed_enum! {
    /// How the buyer pays the seller.
    pub enum PaymentMethod as "payment method" {
        Wallet => "wallet",
        Card => "card",
        Stars => "stars",
    }
}

closed_enum! {
    /// Currency the order amount is denominated in.
    pub enum Currency as "currency" {
        Ton => "TON",
        Stars => "STARS",
        Usd => "USD",
        Eur => "EUR",
        Rub => "RUB",
        Kzt => "KZT",
        Uah => "UAH",
    }
}

closed_enum! {
    /// Lifecycle state of an order.
    pub enum OrderStatus as "status" {
        /// Listed and open for a buyer.
        Active => "active",
        /// The buyer claims to have paid.
        Paid => "paid",
        /// The seller claims to have handed over the asset.
        Transferred => "transferred",
        /// Terminal: the deal is settled.
        Completed => "completed",
        /// Terminal: withdrawn by the seller before payment.
        Cancelled => "cancelled",
    }
}

impl OrderStatus {
    /// Returns `true` for states no transition leaves.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

closed_enum! {
    /// Side a user takes in an order.
    pub enum ParticipantRole as "role" {
        Seller => "seller",
        Buyer => "buyer",
    }
}
