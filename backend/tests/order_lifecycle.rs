//! End-to-end order lifecycle against the in-memory adapter.
//!
//! Drives the domain services through their public ports exactly as the
//! HTTP layer does, covering settlement, concurrency and code allocation.

use std::sync::Arc;

use escrow_market::domain::ports::{
    CreateOrderRequest, JoinOrderRequest, JoinOutcome, MarketStatsQuery, NotificationInbox,
    OrdersCommand, OrdersQuery, ResolveUserRequest, UpdateStatusRequest, UserAccountsCommand,
    UserAccountsQuery,
};
use escrow_market::domain::{
    AssetType, Currency, DisplayName, ErrorCode, ExternalId, IdentityService, LedgerService,
    MAX_CODE_ATTEMPTS, NotificationKind, NotificationService, Order, OrderCode,
    OrderCodeGenerator, OrderListing, OrderListingDraft, OrderService, OrderStatus,
    ParticipantRole, PaymentMethod, RandomOrderCodeGenerator,
};
use escrow_market::outbound::memory::InMemoryMarket;
use futures::future::join_all;
use rstest::{fixture, rstest};
use rust_decimal::Decimal;
use tokio::sync::Barrier;

const RACERS: usize = 8;

/// Generator that always proposes the same code.
struct FixedCode(OrderCode);

impl OrderCodeGenerator for FixedCode {
    fn next_code(&self) -> OrderCode {
        self.0.clone()
    }
}

struct Market<G: OrderCodeGenerator> {
    accounts: IdentityService<InMemoryMarket, InMemoryMarket>,
    orders: OrderService<InMemoryMarket, InMemoryMarket, InMemoryMarket, G>,
    inbox: NotificationService<InMemoryMarket, InMemoryMarket>,
    stats: LedgerService<InMemoryMarket>,
}

fn market_with<G: OrderCodeGenerator>(codes: G) -> Market<G> {
    let store = Arc::new(InMemoryMarket::new());
    Market {
        accounts: IdentityService::new(store.clone(), store.clone()),
        orders: OrderService::new(store.clone(), store.clone(), store.clone(), Arc::new(codes)),
        inbox: NotificationService::new(store.clone(), store.clone()),
        stats: LedgerService::new(store),
    }
}

#[fixture]
fn market() -> Market<RandomOrderCodeGenerator> {
    market_with(RandomOrderCodeGenerator)
}

fn external(raw: &str) -> ExternalId {
    ExternalId::new(raw).expect("valid external id")
}

async fn register<G: OrderCodeGenerator>(market: &Market<G>, raw: &str) -> ExternalId {
    let external_id = external(raw);
    market
        .accounts
        .resolve_or_create(ResolveUserRequest {
            external_id: external_id.clone(),
            display_name: DisplayName::new(format!("user {raw}")).expect("valid name"),
        })
        .await
        .expect("registration succeeds");
    external_id
}

fn listing(amount: i64, currency: Currency) -> OrderListing {
    OrderListing::try_from(OrderListingDraft {
        asset_type: AssetType::Gift,
        payment_method: PaymentMethod::Wallet,
        amount: Decimal::new(amount, 0),
        currency,
        description: "Plush Pepe".to_owned(),
        seller_requisites: "UQ-wallet".to_owned(),
    })
    .expect("valid listing")
}

async fn list<G: OrderCodeGenerator>(
    market: &Market<G>,
    seller: &ExternalId,
    amount: i64,
    currency: Currency,
) -> Order {
    market
        .orders
        .create_order(CreateOrderRequest {
            seller: seller.clone(),
            listing: listing(amount, currency),
        })
        .await
        .expect("order created")
}

async fn set_status<G: OrderCodeGenerator>(
    market: &Market<G>,
    order: &Order,
    status: &str,
    caller: &ExternalId,
) -> Result<Order, escrow_market::domain::Error> {
    market
        .orders
        .update_status(UpdateStatusRequest {
            order: order.code().to_string(),
            status: status.to_owned(),
            caller: caller.clone(),
        })
        .await
}

async fn join<G: OrderCodeGenerator>(
    market: &Market<G>,
    order: &Order,
    buyer: &ExternalId,
) -> Result<JoinOutcome, escrow_market::domain::Error> {
    market
        .orders
        .join_order(JoinOrderRequest {
            order: order.id().to_string(),
            buyer: buyer.clone(),
        })
        .await
}

#[rstest]
#[tokio::test]
async fn gift_sale_settles_volumes_and_notifies_both_sides(
    market: Market<RandomOrderCodeGenerator>,
) {
    let seller = register(&market, "seller-1").await;
    let buyer = register(&market, "buyer-1").await;
    let order = list(&market, &seller, 10, Currency::Ton).await;
    assert_eq!(order.status(), OrderStatus::Active);

    let outcome = join(&market, &order, &buyer).await.expect("join succeeds");
    assert!(matches!(outcome, JoinOutcome::Joined(_)));
    assert_eq!(
        market
            .orders
            .role_of(order.code().as_ref(), &buyer)
            .await
            .expect("role lookup"),
        Some(ParticipantRole::Buyer)
    );

    let paid = set_status(&market, &order, "paid", &buyer)
        .await
        .expect("buyer pays");
    assert_eq!(paid.status(), OrderStatus::Paid);
    let transferred = set_status(&market, &order, "transferred", &seller)
        .await
        .expect("seller transfers");
    assert_eq!(transferred.status(), OrderStatus::Transferred);
    let completed = set_status(&market, &order, "completed", &buyer)
        .await
        .expect("buyer completes");
    assert_eq!(completed.status(), OrderStatus::Completed);

    for participant in [&seller, &buyer] {
        let profile = market.accounts.profile(participant).await.expect("profile");
        assert_eq!(profile.user.completed_deals(), 1);
        assert_eq!(profile.volumes.get(Currency::Ton), Decimal::new(10, 0));
    }

    let stats = market.stats.platform_stats().await.expect("stats");
    assert_eq!(stats.completed_deals, 1);
    assert_eq!(stats.total_users, 2);
    assert_eq!(stats.active_orders, 0);

    let seller_inbox = market
        .inbox
        .fetch_recent(&seller, None)
        .await
        .expect("seller inbox");
    let kinds: Vec<NotificationKind> = seller_inbox.iter().map(|n| n.kind).collect();
    assert_eq!(
        kinds,
        vec![
            NotificationKind::OrderCompleted,
            NotificationKind::PaymentConfirmed,
            NotificationKind::BuyerJoined,
        ]
    );
    let buyer_inbox = market
        .inbox
        .fetch_recent(&buyer, None)
        .await
        .expect("buyer inbox");
    let kinds: Vec<NotificationKind> = buyer_inbox.iter().map(|n| n.kind).collect();
    assert_eq!(
        kinds,
        vec![
            NotificationKind::OrderCompleted,
            NotificationKind::AssetTransferred,
        ]
    );
    assert_eq!(
        buyer_inbox[0].message,
        format!("Order #{} completed successfully", order.code())
    );
    for inbox in [&seller_inbox, &buyer_inbox] {
        let completions = inbox
            .iter()
            .filter(|n| n.kind == NotificationKind::OrderCompleted)
            .count();
        assert_eq!(completions, 1, "each participant hears of completion once");
    }
}

#[rstest]
#[tokio::test]
async fn repeated_completion_settles_once(market: Market<RandomOrderCodeGenerator>) {
    let seller = register(&market, "seller-2").await;
    let buyer = register(&market, "buyer-2").await;
    let order = list(&market, &seller, 10, Currency::Usd).await;
    join(&market, &order, &buyer).await.expect("join");
    set_status(&market, &order, "paid", &buyer).await.expect("paid");
    set_status(&market, &order, "completed", &buyer)
        .await
        .expect("first completion");
    let again = set_status(&market, &order, "completed", &buyer)
        .await
        .expect("second completion is a no-op");
    assert_eq!(again.status(), OrderStatus::Completed);

    let profile = market.accounts.profile(&seller).await.expect("profile");
    assert_eq!(profile.user.completed_deals(), 1);
    assert_eq!(profile.volumes.get(Currency::Usd), Decimal::new(10, 0));
    assert_eq!(
        market.inbox.unread_count(&buyer).await.expect("count"),
        1,
        "completion is announced once"
    );
}

#[rstest]
#[tokio::test]
async fn volumes_accumulate_per_currency(market: Market<RandomOrderCodeGenerator>) {
    let seller = register(&market, "seller-3").await;
    let buyer = register(&market, "buyer-3").await;
    for (amount, currency) in [(10, Currency::Usd), (5, Currency::Usd), (3, Currency::Eur)] {
        let order = list(&market, &seller, amount, currency).await;
        join(&market, &order, &buyer).await.expect("join");
        set_status(&market, &order, "paid", &buyer).await.expect("paid");
        set_status(&market, &order, "transferred", &seller)
            .await
            .expect("transferred");
        set_status(&market, &order, "completed", &buyer)
            .await
            .expect("completed");
    }

    let profile = market.accounts.profile(&buyer).await.expect("profile");
    assert_eq!(profile.user.completed_deals(), 3);
    assert_eq!(profile.volumes.get(Currency::Usd), Decimal::new(15, 0));
    assert_eq!(profile.volumes.get(Currency::Eur), Decimal::new(3, 0));
    assert_eq!(profile.volumes.get(Currency::Ton), Decimal::ZERO);
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_joins_bind_exactly_one_buyer(market: Market<RandomOrderCodeGenerator>) {
    let seller = register(&market, "seller-4").await;
    let mut buyers = Vec::new();
    for index in 0..RACERS {
        buyers.push(register(&market, &format!("racer-{index}")).await);
    }
    let order = list(&market, &seller, 1, Currency::Stars).await;

    let market = Arc::new(market);
    let start = Arc::new(Barrier::new(RACERS));
    let tasks: Vec<_> = buyers
        .into_iter()
        .map(|buyer| {
            let market = market.clone();
            let order = order.clone();
            let start = start.clone();
            tokio::spawn(async move {
                start.wait().await;
                join(&market, &order, &buyer).await
            })
        })
        .collect();
    let results: Vec<_> = join_all(tasks)
        .await
        .into_iter()
        .map(|task| task.expect("join task"))
        .collect();

    let winners = results
        .iter()
        .filter(|result| matches!(result, Ok(JoinOutcome::Joined(_))))
        .count();
    assert_eq!(winners, 1);
    let losers: Vec<_> = results.iter().filter_map(|result| result.as_ref().err()).collect();
    assert_eq!(losers.len(), RACERS - 1);
    for err in losers {
        assert_eq!(err.code(), ErrorCode::Conflict);
        assert_eq!(err.reason(), Some("already_joined"));
    }

    let stored = market
        .orders
        .lookup(order.code().as_ref())
        .await
        .expect("lookup");
    let bound = stored.buyer_id().expect("buyer bound");
    assert_ne!(bound, stored.seller_id());
    assert_eq!(
        market.inbox.unread_count(&seller).await.expect("count"),
        1,
        "seller hears about exactly one buyer"
    );
}

#[rstest]
#[tokio::test]
async fn unknown_codes_are_not_found(market: Market<RandomOrderCodeGenerator>) {
    let err = market
        .orders
        .lookup("ZZZZZZZZ")
        .await
        .expect_err("no such order");
    assert_eq!(err.code(), ErrorCode::NotFound);
    assert_eq!(err.reason(), Some("order_not_found"));
}

#[tokio::test]
async fn colliding_codes_exhaust_allocation() {
    let code = OrderCode::parse("FIXED001").expect("valid code");
    let market = market_with(FixedCode(code.clone()));
    let seller = register(&market, "seller-5").await;

    let first = list(&market, &seller, 2, Currency::Rub).await;
    assert_eq!(first.code(), &code);

    let err = market
        .orders
        .create_order(CreateOrderRequest {
            seller: seller.clone(),
            listing: listing(2, Currency::Rub),
        })
        .await
        .expect_err("every candidate collides");
    assert_eq!(err.code(), ErrorCode::Conflict);
    assert_eq!(err.reason(), Some("code_exhausted"));
    assert!(err.message().contains(&MAX_CODE_ATTEMPTS.to_string()));

    let listed = market
        .orders
        .list_public(OrderStatus::Active, 50)
        .await
        .expect("listing");
    assert_eq!(listed.len(), 1);
}
