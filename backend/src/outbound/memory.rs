//! In-process adapter implementing every driven port.
//!
//! All state lives behind one [`Mutex`], so each port call is atomic with
//! respect to every other call. This gives the same conditional-update
//! guarantees as the PostgreSQL adapter within a single process. Used when
//! no database URL is configured and by behavioural tests.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::ports::{
    LedgerPersistenceError, LedgerRepository, NotificationPersistenceError,
    NotificationRepository, OrderPersistenceError, OrderRepository, UserPersistenceError,
    UserRepository,
};
use crate::domain::{
    CurrencyVolumes, ExternalId, NewNotification, Notification, NotificationId, Order, OrderDraft,
    OrderId, OrderIdentifier, OrderStatus, ParticipantRole, PlatformStats, RequisitesUpdate,
    Settlement, User, UserDraft, UserId, VolumeEntry,
};

const POISONED: &str = "in-memory store lock poisoned";

#[derive(Default)]
struct MarketState {
    users: HashMap<UserId, User>,
    orders: HashMap<OrderId, Order>,
    /// Insertion order, oldest first; ties on `created_at` resolve by it.
    order_sequence: Vec<OrderId>,
    participations: Vec<(OrderId, UserId, ParticipantRole)>,
    notifications: Vec<Notification>,
    volumes: Vec<VolumeEntry>,
}

impl MarketState {
    fn user_by_external_id(&self, external_id: &ExternalId) -> Option<&User> {
        self.users
            .values()
            .find(|user| user.external_id() == external_id)
    }

    fn order_by_identifier(&self, identifier: &OrderIdentifier) -> Option<&Order> {
        match identifier {
            OrderIdentifier::Id(id) => self.orders.get(id),
            OrderIdentifier::Code(code) => self.orders.values().find(|order| order.code() == code),
        }
    }

    fn newest_first<'a>(
        &'a self,
        keep: impl Fn(&Order) -> bool + 'a,
    ) -> impl Iterator<Item = Order> + 'a {
        self.order_sequence
            .iter()
            .rev()
            .filter_map(|id| self.orders.get(id))
            .filter(move |order| keep(order))
            .cloned()
    }

    fn rewrite_order(
        &mut self,
        id: OrderId,
        change: impl FnOnce(&mut OrderDraft),
    ) -> Result<Order, String> {
        let current = self
            .orders
            .get(&id)
            .cloned()
            .ok_or_else(|| format!("order {id} vanished"))?;
        let mut draft = OrderDraft::from(current);
        change(&mut draft);
        draft.updated_at = Utc::now();
        let updated = Order::new(draft).map_err(|err| err.to_string())?;
        self.orders.insert(id, updated.clone());
        Ok(updated)
    }

    fn credit_deal(&mut self, id: UserId) -> Result<(), String> {
        let user = self
            .users
            .get(&id)
            .cloned()
            .ok_or_else(|| format!("participant {id} vanished"))?;
        let mut draft = UserDraft::from(user);
        draft.completed_deals += 1;
        self.users.insert(id, User::new(draft));
        Ok(())
    }
}

/// Shared in-memory marketplace store.
#[derive(Default)]
pub struct InMemoryMarket {
    state: Mutex<MarketState>,
}

impl InMemoryMarket {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, MarketState>, String> {
        self.state.lock().map_err(|_| POISONED.to_owned())
    }
}

#[async_trait]
impl UserRepository for InMemoryMarket {
    async fn insert_if_absent(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut state = self.lock().map_err(UserPersistenceError::query)?;
        if state.user_by_external_id(user.external_id()).is_none() {
            state.users.insert(user.id(), user.clone());
        }
        Ok(())
    }

    async fn find_by_external_id(
        &self,
        external_id: &ExternalId,
    ) -> Result<Option<User>, UserPersistenceError> {
        let state = self.lock().map_err(UserPersistenceError::query)?;
        Ok(state.user_by_external_id(external_id).cloned())
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError> {
        let state = self.lock().map_err(UserPersistenceError::query)?;
        Ok(state.users.get(&id).cloned())
    }

    async fn merge_requisites(
        &self,
        id: UserId,
        update: &RequisitesUpdate,
    ) -> Result<bool, UserPersistenceError> {
        let mut state = self.lock().map_err(UserPersistenceError::query)?;
        let Some(user) = state.users.get(&id).cloned() else {
            return Ok(false);
        };
        let mut draft = UserDraft::from(user);
        draft.requisites = update.clone().apply_to(draft.requisites);
        state.users.insert(id, User::new(draft));
        Ok(true)
    }
}

#[async_trait]
impl OrderRepository for InMemoryMarket {
    async fn insert_with_seller(&self, order: &Order) -> Result<(), OrderPersistenceError> {
        let mut state = self.lock().map_err(OrderPersistenceError::query)?;
        if state.orders.values().any(|stored| stored.code() == order.code()) {
            return Err(OrderPersistenceError::duplicate_code(order.code().to_string()));
        }
        state.orders.insert(order.id(), order.clone());
        state.order_sequence.push(order.id());
        state
            .participations
            .push((order.id(), order.seller_id(), ParticipantRole::Seller));
        Ok(())
    }

    async fn find(
        &self,
        identifier: &OrderIdentifier,
    ) -> Result<Option<Order>, OrderPersistenceError> {
        let state = self.lock().map_err(OrderPersistenceError::query)?;
        Ok(state.order_by_identifier(identifier).cloned())
    }

    async fn list_for_user(
        &self,
        user: UserId,
        limit: usize,
    ) -> Result<Vec<Order>, OrderPersistenceError> {
        let state = self.lock().map_err(OrderPersistenceError::query)?;
        let joined: Vec<OrderId> = state
            .participations
            .iter()
            .filter(|(_, participant, _)| *participant == user)
            .map(|(order, _, _)| *order)
            .collect();
        Ok(state
            .newest_first(move |order| joined.contains(&order.id()))
            .take(limit)
            .collect())
    }

    async fn list_by_status(
        &self,
        status: OrderStatus,
        limit: usize,
    ) -> Result<Vec<Order>, OrderPersistenceError> {
        let state = self.lock().map_err(OrderPersistenceError::query)?;
        Ok(state
            .newest_first(move |order| order.status() == status)
            .take(limit)
            .collect())
    }

    async fn bind_buyer(
        &self,
        order: OrderId,
        buyer: UserId,
    ) -> Result<Option<Order>, OrderPersistenceError> {
        let mut state = self.lock().map_err(OrderPersistenceError::query)?;
        let bindable = state
            .orders
            .get(&order)
            .is_some_and(|stored| {
                stored.status() == OrderStatus::Active && stored.buyer_id().is_none()
            });
        if !bindable {
            return Ok(None);
        }
        let updated = state
            .rewrite_order(order, |draft| draft.buyer_id = Some(buyer))
            .map_err(OrderPersistenceError::query)?;
        let registered = state
            .participations
            .iter()
            .any(|(id, user, _)| *id == order && *user == buyer);
        if !registered {
            state
                .participations
                .push((order, buyer, ParticipantRole::Buyer));
        }
        Ok(Some(updated))
    }

    async fn transition(
        &self,
        order: OrderId,
        sources: &[OrderStatus],
        target: OrderStatus,
    ) -> Result<Option<Order>, OrderPersistenceError> {
        let mut state = self.lock().map_err(OrderPersistenceError::query)?;
        let matches = state
            .orders
            .get(&order)
            .is_some_and(|stored| sources.contains(&stored.status()));
        if !matches {
            return Ok(None);
        }
        state
            .rewrite_order(order, |draft| draft.status = target)
            .map(Some)
            .map_err(OrderPersistenceError::query)
    }

    async fn complete(
        &self,
        settlement: &Settlement,
        sources: &[OrderStatus],
    ) -> Result<Option<Order>, OrderPersistenceError> {
        let mut state = self.lock().map_err(OrderPersistenceError::query)?;
        let matches = state
            .orders
            .get(&settlement.order_id)
            .is_some_and(|stored| sources.contains(&stored.status()));
        if !matches {
            return Ok(None);
        }
        // Validate every participant before mutating so a failure leaves
        // the store untouched.
        for id in [settlement.seller_id, settlement.buyer_id] {
            if !state.users.contains_key(&id) {
                return Err(OrderPersistenceError::query(format!(
                    "participant {id} vanished"
                )));
            }
        }
        let completed = state
            .rewrite_order(settlement.order_id, |draft| {
                draft.status = OrderStatus::Completed;
            })
            .map_err(OrderPersistenceError::query)?;
        for id in [settlement.seller_id, settlement.buyer_id] {
            state.credit_deal(id).map_err(OrderPersistenceError::query)?;
        }
        state.volumes.extend(settlement.volume_entries());
        Ok(Some(completed))
    }

    async fn role_of(
        &self,
        order: OrderId,
        user: UserId,
    ) -> Result<Option<ParticipantRole>, OrderPersistenceError> {
        let state = self.lock().map_err(OrderPersistenceError::query)?;
        Ok(state
            .participations
            .iter()
            .find(|(id, participant, _)| *id == order && *participant == user)
            .map(|(_, _, role)| *role))
    }
}

#[async_trait]
impl NotificationRepository for InMemoryMarket {
    async fn append(
        &self,
        notification: &NewNotification,
    ) -> Result<Notification, NotificationPersistenceError> {
        let mut state = self.lock().map_err(NotificationPersistenceError::query)?;
        let stored = Notification::unread(notification.clone());
        state.notifications.push(stored.clone());
        Ok(stored)
    }

    async fn recent_for(
        &self,
        recipient: UserId,
        limit: usize,
    ) -> Result<Vec<Notification>, NotificationPersistenceError> {
        let state = self.lock().map_err(NotificationPersistenceError::query)?;
        Ok(state
            .notifications
            .iter()
            .rev()
            .filter(|notification| notification.recipient == recipient)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn mark_read(&self, id: NotificationId) -> Result<(), NotificationPersistenceError> {
        let mut state = self.lock().map_err(NotificationPersistenceError::query)?;
        if let Some(notification) = state
            .notifications
            .iter_mut()
            .find(|notification| notification.id == id)
        {
            notification.read = true;
        }
        Ok(())
    }

    async fn unread_count(&self, recipient: UserId) -> Result<u64, NotificationPersistenceError> {
        let state = self.lock().map_err(NotificationPersistenceError::query)?;
        let unread = state
            .notifications
            .iter()
            .filter(|notification| notification.recipient == recipient && !notification.read)
            .count();
        Ok(unread as u64)
    }
}

#[async_trait]
impl LedgerRepository for InMemoryMarket {
    async fn volumes_for(&self, user: UserId) -> Result<CurrencyVolumes, LedgerPersistenceError> {
        let state = self.lock().map_err(LedgerPersistenceError::query)?;
        CurrencyVolumes::from_amounts(
            state
                .volumes
                .iter()
                .filter(|entry| entry.user_id == user)
                .map(|entry| (entry.currency, entry.amount)),
        )
        .map_err(|err| LedgerPersistenceError::query(err.to_string()))
    }

    async fn platform_stats(&self) -> Result<PlatformStats, LedgerPersistenceError> {
        let state = self.lock().map_err(LedgerPersistenceError::query)?;
        let count_in = |status: OrderStatus| {
            state
                .orders
                .values()
                .filter(|order| order.status() == status)
                .count() as u64
        };
        Ok(PlatformStats {
            completed_deals: count_in(OrderStatus::Completed),
            total_users: state.users.len() as u64,
            active_orders: count_in(OrderStatus::Active),
        })
    }
}
