//! Driving port for order mutations: listing, joining and status changes.

use async_trait::async_trait;

use crate::domain::{Error, ExternalId, Order, OrderListing};

/// Request to list a new order.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateOrderRequest {
    pub seller: ExternalId,
    pub listing: OrderListing,
}

/// Request for a user to join an order as buyer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinOrderRequest {
    /// Order id or code as supplied by the client.
    pub order: String,
    pub buyer: ExternalId,
}

/// Successful join result.
#[derive(Debug, Clone, PartialEq)]
pub enum JoinOutcome {
    /// The caller is now the order's buyer.
    Joined(Order),
    /// The caller was already the buyer; nothing changed.
    AlreadyBuyer(Order),
}

impl JoinOutcome {
    pub fn order(&self) -> &Order {
        match self {
            Self::Joined(order) | Self::AlreadyBuyer(order) => order,
        }
    }

    /// Confirmation text for the client.
    pub fn message(&self) -> &'static str {
        match self {
            Self::Joined(_) => "Joined order as buyer",
            Self::AlreadyBuyer(_) => "Already joined as buyer",
        }
    }
}

/// Request to move an order to another status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateStatusRequest {
    /// Order id or code as supplied by the client.
    pub order: String,
    /// Target status as supplied by the client; parsed by the service.
    pub status: String,
    pub caller: ExternalId,
}

/// Domain use-case port for order write operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrdersCommand: Send + Sync {
    /// List a new order with a freshly allocated code.
    async fn create_order(&self, request: CreateOrderRequest) -> Result<Order, Error>;

    /// Bind the caller as buyer.
    async fn join_order(&self, request: JoinOrderRequest) -> Result<JoinOutcome, Error>;

    /// Drive the order state machine, returning the order after the change.
    async fn update_status(&self, request: UpdateStatusRequest) -> Result<Order, Error>;
}
