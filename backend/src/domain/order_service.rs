//! Order services: the order store, participant registry and state machine.
//!
//! Every mutation is a conditional update in the repository, so concurrent
//! callers can never bind two buyers or apply one transition twice. When a
//! conditional update matches nothing the service re-reads the order and
//! reports what actually happened.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info, warn};

use crate::domain::identity_service::{map_user_error, require_user};
use crate::domain::ports::{
    CreateOrderRequest, JoinOrderRequest, JoinOutcome, NotificationRepository,
    OrderPersistenceError, OrderRepository, OrdersCommand, OrdersQuery, PUBLIC_LIST_MAX,
    USER_ORDERS_MAX, UpdateStatusRequest, UserRepository,
};
use crate::domain::transitions::{self, TransitionEffect, TransitionPlan};
use crate::domain::{
    Error, ExternalId, NewNotification, NotificationKind, NotificationPublisher, Order,
    OrderCodeGenerator, OrderIdentifier, OrderRuleViolation, OrderStatus, ParticipantRole,
    Settlement, UserId,
};

/// Code allocation attempts before [`OrderRuleViolation::CodeExhausted`].
pub const MAX_CODE_ATTEMPTS: usize = 10;

fn map_order_error(err: OrderPersistenceError) -> Error {
    error!(error = %err, "order repository failure");
    match err {
        OrderPersistenceError::Connection { message } => {
            Error::internal(format!("order repository unavailable: {message}"))
        }
        OrderPersistenceError::Query { message } => {
            Error::internal(format!("order repository error: {message}"))
        }
        OrderPersistenceError::DuplicateCode { code } => {
            Error::internal(format!("unexpected order code collision on {code}"))
        }
    }
}

/// Order service implementing [`OrdersCommand`] and [`OrdersQuery`].
pub struct OrderService<U, O, N, G> {
    users: Arc<U>,
    orders: Arc<O>,
    notifications: NotificationPublisher<N>,
    codes: Arc<G>,
    admins: HashSet<ExternalId>,
}

impl<U, O, N, G> OrderService<U, O, N, G>
where
    N: NotificationRepository,
{
    /// Create a new service with the given repositories and code source.
    pub fn new(users: Arc<U>, orders: Arc<O>, notifications: Arc<N>, codes: Arc<G>) -> Self {
        Self {
            users,
            orders,
            notifications: NotificationPublisher::new(notifications),
            codes,
            admins: HashSet::new(),
        }
    }

    /// Users allowed to drive any permitted transition regardless of role.
    pub fn with_admins(mut self, admins: impl IntoIterator<Item = ExternalId>) -> Self {
        self.admins = admins.into_iter().collect();
        self
    }
}

impl<U, O, N, G> OrderService<U, O, N, G>
where
    U: UserRepository,
    O: OrderRepository,
    N: NotificationRepository,
    G: OrderCodeGenerator,
{
    async fn find_order(&self, identifier: &OrderIdentifier) -> Result<Order, Error> {
        self.orders
            .find(identifier)
            .await
            .map_err(map_order_error)?
            .ok_or_else(|| OrderRuleViolation::OrderNotFound.into())
    }

    async fn load_order(&self, raw: &str) -> Result<Order, Error> {
        let identifier = OrderIdentifier::parse(raw).ok_or(OrderRuleViolation::OrderNotFound)?;
        self.find_order(&identifier).await
    }

    async fn reload(&self, order: &Order) -> Result<Order, Error> {
        self.find_order(&OrderIdentifier::Id(order.id())).await
    }

    async fn notify(&self, recipient: UserId, order: &Order, kind: NotificationKind) {
        self.notifications
            .publish(NewNotification::about(
                recipient,
                order.id(),
                order.code(),
                kind,
            ))
            .await;
    }

    async fn apply_effect(&self, effect: TransitionEffect, order: &Order) {
        match effect {
            TransitionEffect::Notify { recipient, kind } => {
                let user = match recipient {
                    ParticipantRole::Seller => Some(order.seller_id()),
                    ParticipantRole::Buyer => order.buyer_id(),
                };
                if let Some(user) = user {
                    self.notify(user, order, kind).await;
                }
            }
            TransitionEffect::Settle => {
                for participant in order.participants() {
                    self.notify(participant, order, NotificationKind::OrderCompleted)
                        .await;
                }
            }
        }
    }

    /// Explain a join whose conditional bind matched nothing.
    async fn explain_lost_join(&self, order: &Order, buyer: UserId) -> Result<JoinOutcome, Error> {
        let current = self.reload(order).await?;
        match current.buyer_id() {
            Some(bound) if bound == buyer => Ok(JoinOutcome::AlreadyBuyer(current)),
            Some(_) => Err(OrderRuleViolation::AlreadyJoined.into()),
            None => Err(OrderRuleViolation::OrderNotActive.into()),
        }
    }

    /// Explain a transition whose compare-and-set matched nothing.
    async fn explain_lost_transition(
        &self,
        order: &Order,
        target: OrderStatus,
    ) -> Result<Order, Error> {
        let current = self.reload(order).await?;
        if current.status() == target {
            return Ok(current);
        }
        Err(OrderRuleViolation::InvalidTransition {
            from: current.status(),
            to: target,
        }
        .into())
    }
}

#[async_trait]
impl<U, O, N, G> OrdersCommand for OrderService<U, O, N, G>
where
    U: UserRepository,
    O: OrderRepository,
    N: NotificationRepository,
    G: OrderCodeGenerator,
{
    async fn create_order(&self, request: CreateOrderRequest) -> Result<Order, Error> {
        let CreateOrderRequest { seller, listing } = request;
        let seller = require_user(self.users.as_ref(), &seller).await?;

        for attempt in 1..=MAX_CODE_ATTEMPTS {
            let order = Order::open(self.codes.next_code(), seller.id(), listing.clone());
            match self.orders.insert_with_seller(&order).await {
                Ok(()) => {
                    info!(
                        order_id = %order.id(),
                        code = %order.code(),
                        seller = %seller.external_id(),
                        "order created"
                    );
                    return Ok(order);
                }
                Err(OrderPersistenceError::DuplicateCode { code }) => {
                    warn!(attempt, code = %code, "order code collision, regenerating");
                }
                Err(err) => return Err(map_order_error(err)),
            }
        }

        Err(OrderRuleViolation::CodeExhausted {
            attempts: MAX_CODE_ATTEMPTS,
        }
        .into())
    }

    async fn join_order(&self, request: JoinOrderRequest) -> Result<JoinOutcome, Error> {
        let buyer = require_user(self.users.as_ref(), &request.buyer).await?;
        let order = self.load_order(&request.order).await?;

        if order.seller_id() == buyer.id() {
            return Err(OrderRuleViolation::SelfTrade.into());
        }
        if order.buyer_id() == Some(buyer.id()) {
            return Ok(JoinOutcome::AlreadyBuyer(order));
        }
        if order.status() != OrderStatus::Active {
            return Err(OrderRuleViolation::OrderNotActive.into());
        }
        if order.buyer_id().is_some() {
            return Err(OrderRuleViolation::AlreadyJoined.into());
        }

        let Some(bound) = self
            .orders
            .bind_buyer(order.id(), buyer.id())
            .await
            .map_err(map_order_error)?
        else {
            return self.explain_lost_join(&order, buyer.id()).await;
        };

        info!(
            order_id = %bound.id(),
            code = %bound.code(),
            buyer = %buyer.external_id(),
            "buyer joined order"
        );
        self.notify(bound.seller_id(), &bound, NotificationKind::BuyerJoined)
            .await;
        Ok(JoinOutcome::Joined(bound))
    }

    async fn update_status(&self, request: UpdateStatusRequest) -> Result<Order, Error> {
        let target = request.status.parse::<OrderStatus>().map_err(|_| {
            OrderRuleViolation::InvalidStatus {
                value: request.status.clone(),
            }
        })?;
        let caller = require_user(self.users.as_ref(), &request.caller).await?;
        let order = self.load_order(&request.order).await?;
        let is_admin = self.admins.contains(caller.external_id());

        let rule = match transitions::plan(&order, target, caller.id(), is_admin)? {
            TransitionPlan::Unchanged => return Ok(order),
            TransitionPlan::Apply(rule) => rule,
        };

        let updated = match rule.effect {
            TransitionEffect::Settle => {
                let settlement =
                    Settlement::for_order(&order).ok_or(OrderRuleViolation::NoBuyer)?;
                self.orders.complete(&settlement, rule.sources).await
            }
            TransitionEffect::Notify { .. } => {
                self.orders
                    .transition(order.id(), rule.sources, target)
                    .await
            }
        }
        .map_err(map_order_error)?;

        let Some(updated) = updated else {
            return self.explain_lost_transition(&order, target).await;
        };

        info!(
            order_id = %updated.id(),
            code = %updated.code(),
            from = %order.status(),
            to = %updated.status(),
            caller = %caller.external_id(),
            admin = is_admin,
            "order status changed"
        );
        self.apply_effect(rule.effect, &updated).await;
        Ok(updated)
    }
}

#[async_trait]
impl<U, O, N, G> OrdersQuery for OrderService<U, O, N, G>
where
    U: UserRepository,
    O: OrderRepository,
    N: NotificationRepository,
    G: OrderCodeGenerator,
{
    async fn lookup(&self, identifier: &str) -> Result<Order, Error> {
        self.load_order(identifier).await
    }

    async fn list_for_user(&self, external_id: &ExternalId) -> Result<Vec<Order>, Error> {
        let user = require_user(self.users.as_ref(), external_id).await?;
        self.orders
            .list_for_user(user.id(), USER_ORDERS_MAX)
            .await
            .map_err(map_order_error)
    }

    async fn list_public(&self, status: OrderStatus, limit: usize) -> Result<Vec<Order>, Error> {
        self.orders
            .list_by_status(status, limit.clamp(1, PUBLIC_LIST_MAX))
            .await
            .map_err(map_order_error)
    }

    async fn role_of(
        &self,
        identifier: &str,
        external_id: &ExternalId,
    ) -> Result<Option<ParticipantRole>, Error> {
        let order = self.load_order(identifier).await?;
        let Some(user) = self
            .users
            .find_by_external_id(external_id)
            .await
            .map_err(map_user_error)?
        else {
            return Ok(None);
        };
        self.orders
            .role_of(order.id(), user.id())
            .await
            .map_err(map_order_error)
    }
}
