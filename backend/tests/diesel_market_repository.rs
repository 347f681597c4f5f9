//! Integration tests for the Diesel adapters against embedded PostgreSQL.
//!
//! Gated by `RUN_PG_EMBEDDED=1`; run with `cargo test -- --ignored`. The
//! suite applies the embedded migrations to a scratch database and then
//! exercises every driven port the way the domain services do.

use escrow_market::domain::ports::{
    LedgerRepository, NotificationRepository, OrderPersistenceError, OrderRepository,
    UserRepository,
};
use escrow_market::domain::{
    AssetType, Currency, DisplayName, ExternalId, NewNotification, NotificationKind, Order,
    OrderCode, OrderIdentifier, OrderListing, OrderListingDraft, OrderStatus, ParticipantRole,
    PaymentMethod, Requisites, RequisitesUpdate, Settlement, User,
};
use escrow_market::outbound::persistence::{
    DbPool, DieselLedgerRepository, DieselNotificationRepository, DieselOrderRepository,
    DieselUserRepository, PoolConfig, run_pending_migrations,
};
use rust_decimal::Decimal;
use tokio::runtime::Runtime;

mod support;

use support::pg_embed::test_cluster;
use support::{create_scratch_database, embedded_postgres_enabled};

struct Adapters {
    users: DieselUserRepository,
    orders: DieselOrderRepository,
    notifications: DieselNotificationRepository,
    ledger: DieselLedgerRepository,
}

async fn adapters(database_url: &str) -> Adapters {
    let applied = run_pending_migrations(database_url)
        .await
        .expect("migrations apply");
    assert!(applied > 0, "fresh database receives the schema");

    let pool = DbPool::new(PoolConfig::new(database_url).with_max_size(2))
        .await
        .expect("pool builds");
    Adapters {
        users: DieselUserRepository::new(pool.clone()),
        orders: DieselOrderRepository::new(pool.clone()),
        notifications: DieselNotificationRepository::new(pool.clone()),
        ledger: DieselLedgerRepository::new(pool),
    }
}

fn user(external: &str) -> User {
    User::register(
        ExternalId::new(external).expect("valid external id"),
        DisplayName::new(format!("user {external}")).expect("valid name"),
    )
}

fn order(seller: &User, code: &str, amount: i64) -> Order {
    let listing = OrderListing::try_from(OrderListingDraft {
        asset_type: AssetType::Username,
        payment_method: PaymentMethod::Card,
        amount: Decimal::new(amount, 1),
        currency: Currency::Eur,
        description: "@short handle".to_owned(),
        seller_requisites: "IBAN DE00".to_owned(),
    })
    .expect("valid listing");
    Order::open(OrderCode::parse(code).expect("valid code"), seller.id(), listing)
}

async fn exercise(adapters: Adapters) {
    let Adapters {
        users,
        orders,
        notifications,
        ledger,
    } = adapters;

    let seller = user("pg-seller");
    let buyer = user("pg-buyer");
    users.insert_if_absent(&seller).await.expect("insert seller");
    users.insert_if_absent(&seller).await.expect("insert is idempotent");
    users.insert_if_absent(&buyer).await.expect("insert buyer");

    let stored = users
        .find_by_external_id(seller.external_id())
        .await
        .expect("lookup")
        .expect("seller stored");
    assert_eq!(stored.id(), seller.id());

    let wallet = RequisitesUpdate {
        wallet: Some("UQ-wallet".to_owned()),
        ..RequisitesUpdate::default()
    };
    let bank = RequisitesUpdate {
        card_bank: Some("Monobank".to_owned()),
        ..RequisitesUpdate::default()
    };
    assert!(users.merge_requisites(seller.id(), &wallet).await.expect("merge"));
    assert!(users.merge_requisites(seller.id(), &bank).await.expect("merge"));
    assert!(
        users
            .merge_requisites(seller.id(), &RequisitesUpdate::default())
            .await
            .expect("empty merge")
    );
    let reloaded = users
        .find_by_id(seller.id())
        .await
        .expect("lookup")
        .expect("seller stored");
    assert_eq!(
        reloaded.requisites(),
        &Requisites {
            wallet: Some("UQ-wallet".to_owned()),
            card_bank: Some("Monobank".to_owned()),
            ..Requisites::default()
        },
        "each merge writes only its own column"
    );

    let listed = order(&seller, "PGTEST01", 125);
    orders.insert_with_seller(&listed).await.expect("insert order");
    let duplicate = orders
        .insert_with_seller(&order(&seller, "PGTEST01", 10))
        .await
        .expect_err("codes are unique");
    assert!(matches!(duplicate, OrderPersistenceError::DuplicateCode { .. }));

    let by_code = orders
        .find(&OrderIdentifier::Code(listed.code().clone()))
        .await
        .expect("find")
        .expect("order stored");
    assert_eq!(by_code.listing().amount(), Decimal::new(125, 1));

    let bound = orders
        .bind_buyer(listed.id(), buyer.id())
        .await
        .expect("bind")
        .expect("first bind wins");
    assert_eq!(bound.buyer_id(), Some(buyer.id()));
    assert!(
        orders
            .bind_buyer(listed.id(), seller.id())
            .await
            .expect("bind")
            .is_none(),
        "second bind matches nothing"
    );
    assert_eq!(
        orders.role_of(listed.id(), buyer.id()).await.expect("role"),
        Some(ParticipantRole::Buyer)
    );

    let paid = orders
        .transition(listed.id(), &[OrderStatus::Active], OrderStatus::Paid)
        .await
        .expect("transition")
        .expect("active order becomes paid");
    assert_eq!(paid.status(), OrderStatus::Paid);
    assert!(
        orders
            .transition(listed.id(), &[OrderStatus::Active], OrderStatus::Cancelled)
            .await
            .expect("transition")
            .is_none(),
        "stale source status is refused"
    );

    let settlement = Settlement::for_order(&paid).expect("buyer bound");
    let completed = orders
        .complete(&settlement, &[OrderStatus::Paid, OrderStatus::Transferred])
        .await
        .expect("complete")
        .expect("paid order completes");
    assert_eq!(completed.status(), OrderStatus::Completed);
    assert!(
        orders
            .complete(&settlement, &[OrderStatus::Paid, OrderStatus::Transferred])
            .await
            .expect("complete")
            .is_none(),
        "settlement applies once"
    );

    let volumes = ledger.volumes_for(buyer.id()).await.expect("volumes");
    assert_eq!(volumes.get(Currency::Eur), Decimal::new(125, 1));
    let buyer_after = users
        .find_by_id(buyer.id())
        .await
        .expect("lookup")
        .expect("buyer stored");
    assert_eq!(buyer_after.completed_deals(), 1);

    let stats = ledger.platform_stats().await.expect("stats");
    assert_eq!(stats.completed_deals, 1);
    assert_eq!(stats.total_users, 2);
    assert_eq!(stats.active_orders, 0);

    let appended = notifications
        .append(&NewNotification::about(
            seller.id(),
            listed.id(),
            listed.code(),
            NotificationKind::OrderCompleted,
        ))
        .await
        .expect("append");
    assert!(!appended.read);
    assert_eq!(
        notifications.unread_count(seller.id()).await.expect("count"),
        1
    );
    notifications.mark_read(appended.id).await.expect("mark read");
    notifications.mark_read(appended.id).await.expect("repeat is harmless");
    let recent = notifications
        .recent_for(seller.id(), 50)
        .await
        .expect("recent");
    assert_eq!(recent.len(), 1);
    assert!(recent[0].read);
    assert_eq!(
        notifications.unread_count(seller.id()).await.expect("count"),
        0
    );

    let seller_orders = orders
        .list_for_user(seller.id(), 200)
        .await
        .expect("list");
    assert_eq!(seller_orders.len(), 1);
    assert!(
        orders
            .list_by_status(OrderStatus::Active, 50)
            .await
            .expect("list")
            .is_empty()
    );
}

#[test]
#[ignore = "requires embedded Postgres binaries; opt-in via RUN_PG_EMBEDDED=1"]
fn diesel_adapters_round_trip_the_order_lifecycle() {
    if !embedded_postgres_enabled() {
        eprintln!("SKIP-TEST-CLUSTER: set RUN_PG_EMBEDDED=1 to run");
        return;
    }

    let cluster = test_cluster().expect("embedded Postgres should start");
    let connection = cluster.connection();
    let database = create_scratch_database(&connection.database_url("postgres"))
        .expect("scratch database");
    let database_url = connection.database_url(&database);

    let runtime = Runtime::new().expect("tokio runtime");
    runtime.block_on(async {
        exercise(adapters(&database_url).await).await;
    });
}
