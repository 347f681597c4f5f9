//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Enumerations are stored as their stable
//! lowercase (or currency-code) labels and parsed back through the domain's
//! closed enums when rows are read.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::RequisitesUpdate;

use super::schema::{notifications, order_participants, orders, users, volume_entries};

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub external_id: String,
    pub display_name: String,
    pub wallet: Option<String>,
    pub card_number: Option<String>,
    pub card_bank: Option<String>,
    pub card_currency: Option<String>,
    pub messaging_handle: Option<String>,
    pub completed_deals: i32,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for registering users.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub external_id: &'a str,
    pub display_name: &'a str,
    pub created_at: DateTime<Utc>,
}

/// Changeset writing only the requisite columns an update supplies.
///
/// `None` fields are left out of the `SET` clause, so the merge with the
/// stored row happens inside the single `UPDATE` statement.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
pub(crate) struct RequisitesChangeset<'a> {
    pub wallet: Option<&'a str>,
    pub card_number: Option<&'a str>,
    pub card_bank: Option<&'a str>,
    pub card_currency: Option<&'a str>,
    pub messaging_handle: Option<&'a str>,
}

impl<'a> From<&'a RequisitesUpdate> for RequisitesChangeset<'a> {
    fn from(update: &'a RequisitesUpdate) -> Self {
        Self {
            wallet: update.wallet.as_deref(),
            card_number: update.card_number.as_deref(),
            card_bank: update.card_bank.as_deref(),
            card_currency: update.card_currency.as_deref(),
            messaging_handle: update.messaging_handle.as_deref(),
        }
    }
}

// ---------------------------------------------------------------------------
// Orders and participations
// ---------------------------------------------------------------------------

/// Row struct for reading from the orders table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct OrderRow {
    pub id: Uuid,
    pub code: String,
    pub seller_id: Uuid,
    pub buyer_id: Option<Uuid>,
    pub asset_type: String,
    pub payment_method: String,
    pub amount: Decimal,
    pub currency: String,
    pub description: String,
    pub seller_requisites: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for listing new orders.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = orders)]
pub(crate) struct NewOrderRow<'a> {
    pub id: Uuid,
    pub code: &'a str,
    pub seller_id: Uuid,
    pub asset_type: &'a str,
    pub payment_method: &'a str,
    pub amount: Decimal,
    pub currency: &'a str,
    pub description: &'a str,
    pub seller_requisites: &'a str,
    pub status: &'a str,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for binding a user to an order.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = order_participants)]
pub(crate) struct NewParticipantRow<'a> {
    pub order_id: Uuid,
    pub user_id: Uuid,
    pub role: &'a str,
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

/// Row struct for reading from the notifications table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = notifications)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct NotificationRow {
    pub id: Uuid,
    pub recipient_id: Uuid,
    pub order_id: Uuid,
    pub kind: String,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for enqueueing notifications.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = notifications)]
pub(crate) struct NewNotificationRow<'a> {
    pub id: Uuid,
    pub recipient_id: Uuid,
    pub order_id: Uuid,
    pub kind: &'a str,
    pub message: &'a str,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Volume ledger
// ---------------------------------------------------------------------------

/// Insertable struct for appending settled volume.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = volume_entries)]
pub(crate) struct NewVolumeEntryRow<'a> {
    pub user_id: Uuid,
    pub order_id: Uuid,
    pub currency: &'a str,
    pub amount: Decimal,
}
