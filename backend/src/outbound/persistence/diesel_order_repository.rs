//! PostgreSQL-backed `OrderRepository` implementation using Diesel ORM.
//!
//! Order rows and participations are written together. Buyer binding and
//! every status change are conditional `UPDATE ... RETURNING` statements, so
//! a statement that matches no row means a concurrent caller got there first.
//! Completion runs the status change, deal counters and volume rows in one
//! transaction.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection as _, RunQueryDsl};

use crate::domain::ports::{OrderPersistenceError, OrderRepository};
use crate::domain::{
    Order, OrderCode, OrderDraft, OrderId, OrderIdentifier, OrderListing, OrderListingDraft,
    OrderStatus, ParticipantRole, Settlement, UserId,
};

use super::diesel_error_mapping::{
    ORDER_CODE_CONSTRAINT, is_unique_violation, map_diesel_error, map_pool_error,
};
use super::models::{NewOrderRow, NewParticipantRow, NewVolumeEntryRow, OrderRow};
use super::pool::{DbPool, PoolError};
use super::schema::{order_participants, orders, users, volume_entries};

/// Diesel-backed implementation of the [`OrderRepository`] port.
#[derive(Clone)]
pub struct DieselOrderRepository {
    pool: DbPool,
}

impl DieselOrderRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> OrderPersistenceError {
    map_pool_error(error, OrderPersistenceError::connection)
}

fn diesel_error(error: diesel::result::Error) -> OrderPersistenceError {
    map_diesel_error(
        error,
        OrderPersistenceError::query,
        OrderPersistenceError::connection,
    )
}

fn sql_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

fn status_labels(statuses: &[OrderStatus]) -> Vec<&'static str> {
    statuses.iter().map(|status| status.as_str()).collect()
}

fn corrupt(field: &str, err: impl std::fmt::Display) -> OrderPersistenceError {
    OrderPersistenceError::query(format!("stored order {field} is invalid: {err}"))
}

/// Convert a database row into a domain [`Order`].
pub(crate) fn row_to_order(row: OrderRow) -> Result<Order, OrderPersistenceError> {
    let listing = OrderListing::try_from(OrderListingDraft {
        asset_type: row.asset_type.parse().map_err(|err| corrupt("asset type", err))?,
        payment_method: row
            .payment_method
            .parse()
            .map_err(|err| corrupt("payment method", err))?,
        amount: row.amount,
        currency: row.currency.parse().map_err(|err| corrupt("currency", err))?,
        description: row.description,
        seller_requisites: row.seller_requisites,
    })
    .map_err(|err| corrupt("listing", err))?;

    Order::new(OrderDraft {
        id: OrderId::from_uuid(row.id),
        code: OrderCode::parse(&row.code).map_err(|err| corrupt("code", err))?,
        seller_id: UserId::from_uuid(row.seller_id),
        buyer_id: row.buyer_id.map(UserId::from_uuid),
        listing,
        status: row.status.parse().map_err(|err| corrupt("status", err))?,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
    .map_err(|err| corrupt("participants", err))
}

fn rows_to_orders(rows: Vec<OrderRow>) -> Result<Vec<Order>, OrderPersistenceError> {
    rows.into_iter().map(row_to_order).collect()
}

#[async_trait]
impl OrderRepository for DieselOrderRepository {
    async fn insert_with_seller(&self, order: &Order) -> Result<(), OrderPersistenceError> {
        let listing = order.listing();
        let order_row = NewOrderRow {
            id: *order.id().as_uuid(),
            code: order.code().as_ref(),
            seller_id: *order.seller_id().as_uuid(),
            asset_type: listing.asset_type().as_str(),
            payment_method: listing.payment_method().as_str(),
            amount: listing.amount(),
            currency: listing.currency().as_str(),
            description: listing.description(),
            seller_requisites: listing.seller_requisites(),
            status: order.status().as_str(),
            created_at: order.created_at(),
            updated_at: order.updated_at(),
        };
        let seller_row = NewParticipantRow {
            order_id: *order.id().as_uuid(),
            user_id: *order.seller_id().as_uuid(),
            role: ParticipantRole::Seller.as_str(),
        };
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        conn.transaction(|conn| {
            async move {
                diesel::insert_into(orders::table)
                    .values(&order_row)
                    .execute(conn)
                    .await?;
                diesel::insert_into(order_participants::table)
                    .values(&seller_row)
                    .execute(conn)
                    .await?;
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(|err: diesel::result::Error| {
            if is_unique_violation(&err, ORDER_CODE_CONSTRAINT) {
                OrderPersistenceError::duplicate_code(order.code().as_ref())
            } else {
                diesel_error(err)
            }
        })
    }

    async fn find(
        &self,
        identifier: &OrderIdentifier,
    ) -> Result<Option<Order>, OrderPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let query = orders::table.select(OrderRow::as_select()).into_boxed();
        let query = match identifier {
            OrderIdentifier::Id(id) => query.filter(orders::id.eq(*id.as_uuid())),
            OrderIdentifier::Code(code) => query.filter(orders::code.eq(code.as_ref().to_owned())),
        };

        let row = query
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;
        row.map(row_to_order).transpose()
    }

    async fn list_for_user(
        &self,
        user: UserId,
        limit: usize,
    ) -> Result<Vec<Order>, OrderPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let participations = order_participants::table
            .filter(order_participants::user_id.eq(*user.as_uuid()))
            .select(order_participants::order_id);

        let rows = orders::table
            .filter(orders::id.eq_any(participations))
            .order((orders::created_at.desc(), orders::id.desc()))
            .limit(sql_limit(limit))
            .select(OrderRow::as_select())
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;
        rows_to_orders(rows)
    }

    async fn list_by_status(
        &self,
        status: OrderStatus,
        limit: usize,
    ) -> Result<Vec<Order>, OrderPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let rows = orders::table
            .filter(orders::status.eq(status.as_str()))
            .order((orders::created_at.desc(), orders::id.desc()))
            .limit(sql_limit(limit))
            .select(OrderRow::as_select())
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;
        rows_to_orders(rows)
    }

    async fn bind_buyer(
        &self,
        order: OrderId,
        buyer: UserId,
    ) -> Result<Option<Order>, OrderPersistenceError> {
        let order_id = *order.as_uuid();
        let buyer_id = *buyer.as_uuid();
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let row = conn
            .transaction(|conn| {
                async move {
                    let bound: Option<OrderRow> = diesel::update(
                        orders::table
                            .filter(orders::id.eq(order_id))
                            .filter(orders::buyer_id.is_null())
                            .filter(orders::seller_id.ne(buyer_id))
                            .filter(orders::status.eq(OrderStatus::Active.as_str())),
                    )
                    .set((
                        orders::buyer_id.eq(Some(buyer_id)),
                        orders::updated_at.eq(Utc::now()),
                    ))
                    .returning(OrderRow::as_returning())
                    .get_result(conn)
                    .await
                    .optional()?;

                    if bound.is_some() {
                        diesel::insert_into(order_participants::table)
                            .values(&NewParticipantRow {
                                order_id,
                                user_id: buyer_id,
                                role: ParticipantRole::Buyer.as_str(),
                            })
                            .on_conflict_do_nothing()
                            .execute(conn)
                            .await?;
                    }
                    Ok(bound)
                }
                .scope_boxed()
            })
            .await
            .map_err(diesel_error)?;

        row.map(row_to_order).transpose()
    }

    async fn transition(
        &self,
        order: OrderId,
        sources: &[OrderStatus],
        target: OrderStatus,
    ) -> Result<Option<Order>, OrderPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row: Option<OrderRow> = diesel::update(
            orders::table
                .filter(orders::id.eq(*order.as_uuid()))
                .filter(orders::status.eq_any(status_labels(sources))),
        )
        .set((
            orders::status.eq(target.as_str()),
            orders::updated_at.eq(Utc::now()),
        ))
        .returning(OrderRow::as_returning())
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(diesel_error)?;

        row.map(row_to_order).transpose()
    }

    async fn complete(
        &self,
        settlement: &Settlement,
        sources: &[OrderStatus],
    ) -> Result<Option<Order>, OrderPersistenceError> {
        let order_id = *settlement.order_id.as_uuid();
        let participants = [*settlement.seller_id.as_uuid(), *settlement.buyer_id.as_uuid()];
        let sources = status_labels(sources);
        let entries = settlement.volume_entries();
        let volume_rows: Vec<NewVolumeEntryRow<'_>> = entries
            .iter()
            .map(|entry| NewVolumeEntryRow {
                user_id: *entry.user_id.as_uuid(),
                order_id: *entry.order_id.as_uuid(),
                currency: entry.currency.as_str(),
                amount: entry.amount,
            })
            .collect();
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let row = conn
            .transaction(|conn| {
                async move {
                    let completed: Option<OrderRow> = diesel::update(
                        orders::table
                            .filter(orders::id.eq(order_id))
                            .filter(orders::status.eq_any(sources)),
                    )
                    .set((
                        orders::status.eq(OrderStatus::Completed.as_str()),
                        orders::updated_at.eq(Utc::now()),
                    ))
                    .returning(OrderRow::as_returning())
                    .get_result(conn)
                    .await
                    .optional()?;

                    if completed.is_none() {
                        return Ok(None);
                    }

                    diesel::update(users::table.filter(users::id.eq_any(participants)))
                        .set(users::completed_deals.eq(users::completed_deals + 1))
                        .execute(conn)
                        .await?;
                    diesel::insert_into(volume_entries::table)
                        .values(&volume_rows)
                        .execute(conn)
                        .await?;
                    Ok(completed)
                }
                .scope_boxed()
            })
            .await
            .map_err(diesel_error)?;

        row.map(row_to_order).transpose()
    }

    async fn role_of(
        &self,
        order: OrderId,
        user: UserId,
    ) -> Result<Option<ParticipantRole>, OrderPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let role: Option<String> = order_participants::table
            .filter(order_participants::order_id.eq(*order.as_uuid()))
            .filter(order_participants::user_id.eq(*user.as_uuid()))
            .select(order_participants::role)
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;

        role.map(|raw| raw.parse().map_err(|err| corrupt("role", err)))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use rstest::{fixture, rstest};
    use rust_decimal::Decimal;
    use uuid::Uuid;

    use super::*;
    use crate::domain::{AssetType, Currency, PaymentMethod};

    #[fixture]
    fn row() -> OrderRow {
        let now = Utc::now();
        OrderRow {
            id: Uuid::new_v4(),
            code: "AB12CD34".into(),
            seller_id: Uuid::new_v4(),
            buyer_id: None,
            asset_type: "username".into(),
            payment_method: "card".into(),
            amount: Decimal::new(1250, 2),
            currency: "USD".into(),
            description: "@collectible".into(),
            seller_requisites: "4111 1111 1111 1111".into(),
            status: "transferred".into(),
            created_at: now,
            updated_at: now,
        }
    }

    #[rstest]
    fn rows_become_orders(row: OrderRow) {
        let order = row_to_order(row).expect("valid row");
        assert_eq!(order.code().as_ref(), "AB12CD34");
        assert_eq!(order.listing().asset_type(), AssetType::Username);
        assert_eq!(order.listing().payment_method(), PaymentMethod::Card);
        assert_eq!(order.listing().currency(), Currency::Usd);
        assert_eq!(order.status(), OrderStatus::Transferred);
    }

    #[rstest]
    #[case::status("status")]
    #[case::currency("currency")]
    fn unknown_labels_are_reported_as_query_errors(mut row: OrderRow, #[case] field: &str) {
        match field {
            "status" => row.status = "escrowed".into(),
            _ => row.currency = "BTC".into(),
        }
        let err = row_to_order(row).expect_err("unknown label");
        assert!(matches!(err, OrderPersistenceError::Query { .. }));
        assert!(err.to_string().contains(field));
    }

    #[rstest]
    fn rows_where_buyer_equals_seller_are_rejected(mut row: OrderRow) {
        row.buyer_id = Some(row.seller_id);
        assert!(row_to_order(row).is_err());
    }

    #[rstest]
    fn status_labels_use_stored_spelling() {
        assert_eq!(
            status_labels(&[OrderStatus::Paid, OrderStatus::Transferred]),
            ["paid", "transferred"]
        );
    }
}
