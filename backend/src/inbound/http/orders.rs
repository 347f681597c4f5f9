//! Order HTTP handlers.
//!
//! ```text
//! POST /api/orders
//! GET  /api/orders?status=active&limit=50
//! GET  /api/orders/{code_or_id}
//! POST /api/orders/{code_or_id}/join
//! PUT  /api/orders/{code_or_id}/status
//! GET  /api/orders/{code_or_id}/role/{external_id}
//! ```
//!
//! Orders are addressed by their eight-character code or their UUID.

use actix_web::{get, post, put, web};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::{
    CreateOrderRequest as CreateOrderCommand, JoinOrderRequest, PUBLIC_LIST_DEFAULT,
    UpdateStatusRequest as UpdateStatusCommand,
};
use crate::domain::{
    AssetType, Currency, Order, OrderListing, OrderListingDraft, OrderStatus, PaymentMethod,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, order_validation_error, parse_amount, parse_external_id, parse_variant, require,
};

/// Order as returned by every order endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderResponse {
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: String,
    #[schema(example = "AB12CD34")]
    pub code: String,
    pub seller_id: String,
    pub buyer_id: Option<String>,
    #[serde(rename = "type")]
    #[schema(example = "gift")]
    pub asset_type: String,
    #[schema(example = "wallet")]
    pub payment_method: String,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64, example = 10.0)]
    pub amount: Decimal,
    #[schema(example = "TON")]
    pub currency: String,
    pub description: String,
    pub seller_requisites: String,
    #[schema(example = "active")]
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&Order> for OrderResponse {
    fn from(order: &Order) -> Self {
        let listing = order.listing();
        Self {
            id: order.id().to_string(),
            code: order.code().to_string(),
            seller_id: order.seller_id().to_string(),
            buyer_id: order.buyer_id().map(|id| id.to_string()),
            asset_type: listing.asset_type().as_str().to_owned(),
            payment_method: listing.payment_method().as_str().to_owned(),
            amount: listing.amount(),
            currency: listing.currency().as_str().to_owned(),
            description: listing.description().to_owned(),
            seller_requisites: listing.seller_requisites().to_owned(),
            status: order.status().as_str().to_owned(),
            created_at: order.created_at().to_rfc3339(),
            updated_at: order.updated_at().to_rfc3339(),
        }
    }
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self::from(&order)
    }
}

/// Request body for `POST /api/orders`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct CreateOrderRequest {
    #[schema(example = "tg-1001")]
    pub seller_external_id: Option<String>,
    #[serde(rename = "type")]
    #[schema(example = "gift")]
    pub asset_type: Option<String>,
    #[schema(example = "wallet")]
    pub payment_method: Option<String>,
    #[schema(example = 10.0)]
    pub amount: Option<f64>,
    #[schema(example = "TON")]
    pub currency: Option<String>,
    #[schema(example = "Plush Pepe #42")]
    pub description: Option<String>,
    #[schema(example = "UQBm-wallet-address")]
    pub seller_requisites: Option<String>,
}

fn parse_create_order(payload: CreateOrderRequest) -> ApiResult<CreateOrderCommand> {
    let seller = parse_external_id(
        require(payload.seller_external_id, FieldName::new("seller_external_id"))?,
        FieldName::new("seller_external_id"),
    )?;
    let asset_type: AssetType = parse_variant(
        &require(payload.asset_type, FieldName::new("type"))?,
        FieldName::new("type"),
    )?;
    let payment_method: PaymentMethod = parse_variant(
        &require(payload.payment_method, FieldName::new("payment_method"))?,
        FieldName::new("payment_method"),
    )?;
    let amount = parse_amount(
        require(payload.amount, FieldName::new("amount"))?,
        FieldName::new("amount"),
    )?;
    let currency: Currency = parse_variant(
        &require(payload.currency, FieldName::new("currency"))?,
        FieldName::new("currency"),
    )?;
    let description = require(payload.description, FieldName::new("description"))?;
    let seller_requisites = require(
        payload.seller_requisites,
        FieldName::new("seller_requisites"),
    )?;

    let listing = OrderListing::try_from(OrderListingDraft {
        asset_type,
        payment_method,
        amount,
        currency,
        description,
        seller_requisites,
    })
    .map_err(order_validation_error)?;

    Ok(CreateOrderCommand { seller, listing })
}

/// List a new order on behalf of a registered seller.
#[utoipa::path(
    post,
    path = "/api/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 200, description = "Order listed", body = OrderResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Seller not registered", body = ErrorSchema),
        (status = 409, description = "No free order code", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["orders"],
    operation_id = "createOrder"
)]
#[post("/orders")]
pub async fn create_order(
    state: web::Data<HttpState>,
    payload: web::Json<CreateOrderRequest>,
) -> ApiResult<web::Json<OrderResponse>> {
    let command = parse_create_order(payload.into_inner())?;
    let order = state.orders.create_order(command).await?;
    info!(order_code = %order.code(), "order listed");
    Ok(web::Json(order.into()))
}

/// Query parameters for `GET /api/orders`.
#[derive(Debug, Default, Deserialize, Serialize, IntoParams)]
pub struct ListOrdersQuery {
    /// Status to filter by. Defaults to `active`.
    pub status: Option<String>,
    /// Page size. Defaults to 50 and is capped at 200.
    pub limit: Option<usize>,
}

/// Public order listing, newest first.
#[utoipa::path(
    get,
    path = "/api/orders",
    params(ListOrdersQuery),
    responses(
        (status = 200, description = "Orders", body = [OrderResponse]),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["orders"],
    operation_id = "listOrders"
)]
#[get("/orders")]
pub async fn list_orders(
    state: web::Data<HttpState>,
    query: web::Query<ListOrdersQuery>,
) -> ApiResult<web::Json<Vec<OrderResponse>>> {
    let ListOrdersQuery { status, limit } = query.into_inner();
    let status = match status {
        Some(raw) => parse_variant(&raw, FieldName::new("status"))?,
        None => OrderStatus::Active,
    };
    let orders = state
        .orders_query
        .list_public(status, limit.unwrap_or(PUBLIC_LIST_DEFAULT))
        .await?;
    Ok(web::Json(orders.iter().map(OrderResponse::from).collect()))
}

/// Fetch one order by code or id.
#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    params(("id" = String, Path, description = "Order code or UUID")),
    responses(
        (status = 200, description = "Order", body = OrderResponse),
        (status = 404, description = "Order not found", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["orders"],
    operation_id = "getOrder"
)]
#[get("/orders/{id}")]
pub async fn get_order(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<OrderResponse>> {
    let order = state.orders_query.lookup(&path.into_inner()).await?;
    Ok(web::Json(order.into()))
}

/// Request body for `POST /api/orders/{id}/join`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct JoinRequest {
    #[schema(example = "tg-2002")]
    pub buyer_external_id: Option<String>,
}

/// Response body for `POST /api/orders/{id}/join`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct JoinResponse {
    pub success: bool,
    #[schema(example = "Joined order as buyer")]
    pub message: String,
    pub order: OrderResponse,
}

/// Bind the caller as the order's buyer.
///
/// Repeating the call as the bound buyer succeeds without changes.
#[utoipa::path(
    post,
    path = "/api/orders/{id}/join",
    params(("id" = String, Path, description = "Order code or UUID")),
    request_body = JoinRequest,
    responses(
        (status = 200, description = "Joined, or already the buyer", body = JoinResponse),
        (status = 400, description = "Invalid request or self trade", body = ErrorSchema),
        (status = 404, description = "Order, user or open order not found", body = ErrorSchema),
        (status = 409, description = "Another buyer already joined", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["orders"],
    operation_id = "joinOrder"
)]
#[post("/orders/{id}/join")]
pub async fn join_order(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<JoinRequest>,
) -> ApiResult<web::Json<JoinResponse>> {
    let buyer = parse_external_id(
        require(
            payload.into_inner().buyer_external_id,
            FieldName::new("buyer_external_id"),
        )?,
        FieldName::new("buyer_external_id"),
    )?;
    let outcome = state
        .orders
        .join_order(JoinOrderRequest {
            order: path.into_inner(),
            buyer,
        })
        .await?;
    Ok(web::Json(JoinResponse {
        success: true,
        message: outcome.message().to_owned(),
        order: outcome.order().into(),
    }))
}

/// Request body for `PUT /api/orders/{id}/status`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct UpdateStatusRequest {
    #[schema(example = "paid")]
    pub status: Option<String>,
    #[schema(example = "tg-2002")]
    pub user_external_id: Option<String>,
}

/// Response body for `PUT /api/orders/{id}/status`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateStatusResponse {
    pub success: bool,
    pub order: OrderResponse,
}

/// Drive the order to a new status.
///
/// The buyer confirms payment, the seller confirms transfer or cancels, the
/// buyer completes. Completion credits both participants in one step.
#[utoipa::path(
    put,
    path = "/api/orders/{id}/status",
    params(("id" = String, Path, description = "Order code or UUID")),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Status changed or unchanged", body = UpdateStatusResponse),
        (status = 400, description = "Invalid request or unknown status", body = ErrorSchema),
        (status = 403, description = "Caller may not make this change", body = ErrorSchema),
        (status = 404, description = "Order or user not found", body = ErrorSchema),
        (status = 409, description = "Transition not permitted", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["orders"],
    operation_id = "updateOrderStatus"
)]
#[put("/orders/{id}/status")]
pub async fn update_status(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<UpdateStatusRequest>,
) -> ApiResult<web::Json<UpdateStatusResponse>> {
    let UpdateStatusRequest {
        status,
        user_external_id,
    } = payload.into_inner();
    let status = require(status, FieldName::new("status"))?;
    let caller = parse_external_id(
        require(user_external_id, FieldName::new("user_external_id"))?,
        FieldName::new("user_external_id"),
    )?;
    let order = state
        .orders
        .update_status(UpdateStatusCommand {
            order: path.into_inner(),
            status,
            caller,
        })
        .await?;
    Ok(web::Json(UpdateStatusResponse {
        success: true,
        order: order.into(),
    }))
}

/// Response body for `GET /api/orders/{id}/role/{external_id}`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RoleResponse {
    /// `seller`, `buyer`, or `null` for non-participants.
    #[schema(example = "buyer")]
    pub role: Option<String>,
}

/// Report which side of the order a user is on.
#[utoipa::path(
    get,
    path = "/api/orders/{id}/role/{external_id}",
    params(
        ("id" = String, Path, description = "Order code or UUID"),
        ("external_id" = String, Path, description = "Caller's external identifier")
    ),
    responses(
        (status = 200, description = "Participant role", body = RoleResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Order not found", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["orders"],
    operation_id = "getOrderRole"
)]
#[get("/orders/{id}/role/{external_id}")]
pub async fn get_role(
    state: web::Data<HttpState>,
    path: web::Path<(String, String)>,
) -> ApiResult<web::Json<RoleResponse>> {
    let (order, external_id) = path.into_inner();
    let external_id = parse_external_id(external_id, FieldName::new("external_id"))?;
    let role = state.orders_query.role_of(&order, &external_id).await?;
    Ok(web::Json(RoleResponse {
        role: role.map(|role| role.as_str().to_owned()),
    }))
}

#[cfg(test)]
#[path = "orders_tests.rs"]
mod tests;
