//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the migrations under `backend/migrations`
//! exactly. The `diesel print-schema` command can regenerate them from a live
//! database.

diesel::table! {
    /// Marketplace participants keyed by internal UUID.
    users (id) {
        id -> Uuid,
        /// Client-supplied identifier, unique across users.
        external_id -> Varchar,
        display_name -> Varchar,
        wallet -> Nullable<Text>,
        card_number -> Nullable<Text>,
        card_bank -> Nullable<Text>,
        card_currency -> Nullable<Text>,
        messaging_handle -> Nullable<Text>,
        completed_deals -> Int4,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Escrow orders. `code` is unique; `buyer_id` is bound at most once.
    orders (id) {
        id -> Uuid,
        code -> Varchar,
        seller_id -> Uuid,
        buyer_id -> Nullable<Uuid>,
        asset_type -> Text,
        payment_method -> Text,
        amount -> Numeric,
        currency -> Text,
        description -> Text,
        seller_requisites -> Text,
        status -> Text,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Role each user holds in an order; unique per `(order_id, user_id)`.
    order_participants (order_id, user_id) {
        order_id -> Uuid,
        user_id -> Uuid,
        role -> Text,
        joined_at -> Timestamptz,
    }
}

diesel::table! {
    /// Per-user notification queue.
    notifications (id) {
        id -> Uuid,
        recipient_id -> Uuid,
        order_id -> Uuid,
        kind -> Text,
        message -> Text,
        is_read -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Settled volume, one row per participant per completed order.
    volume_entries (id) {
        id -> Int8,
        user_id -> Uuid,
        order_id -> Uuid,
        currency -> Text,
        amount -> Numeric,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(notifications -> users (recipient_id));
diesel::joinable!(order_participants -> orders (order_id));
diesel::joinable!(order_participants -> users (user_id));
diesel::joinable!(volume_entries -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(
    notifications,
    order_participants,
    orders,
    users,
    volume_entries,
);
