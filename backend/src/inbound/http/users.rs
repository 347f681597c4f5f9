//! User HTTP handlers.
//!
//! ```text
//! POST /api/users {"username":"Alice","external_id":"tg-1001"}
//! GET  /api/users/{external_id}
//! PUT  /api/users/{external_id}/requisites
//! GET  /api/users/{external_id}/orders
//! GET  /api/users/{external_id}/notifications?limit=50
//! GET  /api/users/{external_id}/notifications/unread
//! ```

use std::collections::BTreeMap;

use actix_web::{get, post, put, web};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::ser::{Error as _, SerializeMap};
use serde::{Deserialize, Serialize, Serializer};
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::ResolveUserRequest;
use crate::domain::{ExternalId, RequisitesUpdate, User, UserProfile};
use crate::inbound::http::ApiResult;
use crate::inbound::http::notifications::{NotificationResponse, SuccessResponse};
use crate::inbound::http::orders::OrderResponse;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, parse_display_name, parse_external_id, require,
};

const EXTERNAL_ID: FieldName = FieldName::new("external_id");

/// Request body for `POST /api/users`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct RegisterUserRequest {
    #[schema(example = "Alice")]
    pub username: Option<String>,
    #[schema(example = "tg-1001")]
    pub external_id: Option<String>,
}

/// User as returned by the user endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: String,
    #[schema(example = "tg-1001")]
    pub external_id: String,
    #[schema(example = "Alice")]
    pub username: String,
    pub wallet: Option<String>,
    pub card_number: Option<String>,
    pub card_bank: Option<String>,
    pub card_currency: Option<String>,
    pub messaging_handle: Option<String>,
    pub completed_deals: u32,
    pub created_at: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        let requisites = user.requisites().clone();
        Self {
            id: user.id().to_string(),
            external_id: user.external_id().to_string(),
            username: user.display_name().to_string(),
            wallet: requisites.wallet,
            card_number: requisites.card_number,
            card_bank: requisites.card_bank,
            card_currency: requisites.card_currency,
            messaging_handle: requisites.messaging_handle,
            completed_deals: user.completed_deals(),
            created_at: user.created_at().to_rfc3339(),
        }
    }
}

/// User together with traded volume per currency.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserProfileResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    /// Total traded amount keyed by currency code, e.g. `{"TON": 10.0}`.
    #[serde(serialize_with = "serialize_volumes")]
    #[schema(value_type = BTreeMap<String, f64>)]
    pub volumes: BTreeMap<String, Decimal>,
}

/// Write volumes as JSON numbers, failing the response rather than
/// reporting a wrong total when a value has no `f64` form.
fn serialize_volumes<S>(
    volumes: &BTreeMap<String, Decimal>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let mut map = serializer.serialize_map(Some(volumes.len()))?;
    for (currency, amount) in volumes {
        let value = amount.to_f64().ok_or_else(|| {
            S::Error::custom(format_args!("{currency} volume {amount} has no float form"))
        })?;
        map.serialize_entry(currency, &value)?;
    }
    map.end()
}

impl From<UserProfile> for UserProfileResponse {
    fn from(value: UserProfile) -> Self {
        let volumes = value
            .volumes
            .iter()
            .map(|(currency, amount)| (currency.as_str().to_owned(), amount))
            .collect();
        Self {
            user: UserResponse::from(&value.user),
            volumes,
        }
    }
}

fn path_external_id(path: web::Path<String>) -> ApiResult<ExternalId> {
    parse_external_id(path.into_inner(), EXTERNAL_ID)
}

/// Resolve a user by external id, registering them on first contact.
///
/// The display name is only recorded on registration.
#[utoipa::path(
    post,
    path = "/api/users",
    request_body = RegisterUserRequest,
    responses(
        (status = 200, description = "Existing or newly registered user", body = UserResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "registerUser"
)]
#[post("/users")]
pub async fn register_user(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterUserRequest>,
) -> ApiResult<web::Json<UserResponse>> {
    let RegisterUserRequest {
        username,
        external_id,
    } = payload.into_inner();
    let external_id = parse_external_id(require(external_id, EXTERNAL_ID)?, EXTERNAL_ID)?;
    let display_name = parse_display_name(
        require(username, FieldName::new("username"))?,
        FieldName::new("username"),
    )?;
    let user = state
        .accounts
        .resolve_or_create(ResolveUserRequest {
            external_id,
            display_name,
        })
        .await?;
    Ok(web::Json(UserResponse::from(&user)))
}

/// Fetch a user's profile with per-currency volumes.
#[utoipa::path(
    get,
    path = "/api/users/{external_id}",
    params(("external_id" = String, Path, description = "Caller's external identifier")),
    responses(
        (status = 200, description = "User profile", body = UserProfileResponse),
        (status = 404, description = "User not found", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "getUser"
)]
#[get("/users/{external_id}")]
pub async fn get_user(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<UserProfileResponse>> {
    let external_id = path_external_id(path)?;
    let profile = state.profiles.profile(&external_id).await?;
    Ok(web::Json(profile.into()))
}

/// Request body for `PUT /api/users/{external_id}/requisites`.
///
/// Omitted fields keep their stored value.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct RequisitesRequest {
    pub wallet: Option<String>,
    pub card_number: Option<String>,
    pub card_bank: Option<String>,
    pub card_currency: Option<String>,
    pub messaging_handle: Option<String>,
}

impl From<RequisitesRequest> for RequisitesUpdate {
    fn from(value: RequisitesRequest) -> Self {
        Self {
            wallet: value.wallet,
            card_number: value.card_number,
            card_bank: value.card_bank,
            card_currency: value.card_currency,
            messaging_handle: value.messaging_handle,
        }
    }
}

/// Update the settlement requisites a user advertises.
#[utoipa::path(
    put,
    path = "/api/users/{external_id}/requisites",
    params(("external_id" = String, Path, description = "Caller's external identifier")),
    request_body = RequisitesRequest,
    responses(
        (status = 200, description = "Requisites saved", body = SuccessResponse),
        (status = 400, description = "Empty update", body = ErrorSchema),
        (status = 404, description = "User not found", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "updateRequisites"
)]
#[put("/users/{external_id}/requisites")]
pub async fn update_requisites(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<RequisitesRequest>,
) -> ApiResult<web::Json<SuccessResponse>> {
    let external_id = path_external_id(path)?;
    state
        .accounts
        .update_requisites(&external_id, payload.into_inner().into())
        .await?;
    Ok(web::Json(SuccessResponse::ok()))
}

/// Every order the user takes part in, newest first.
#[utoipa::path(
    get,
    path = "/api/users/{external_id}/orders",
    params(("external_id" = String, Path, description = "Caller's external identifier")),
    responses(
        (status = 200, description = "Orders", body = [OrderResponse]),
        (status = 404, description = "User not found", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "listUserOrders"
)]
#[get("/users/{external_id}/orders")]
pub async fn list_user_orders(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<OrderResponse>>> {
    let external_id = path_external_id(path)?;
    let orders = state.orders_query.list_for_user(&external_id).await?;
    Ok(web::Json(orders.iter().map(OrderResponse::from).collect()))
}

/// Query parameters for notification polling.
#[derive(Debug, Default, Deserialize, Serialize, IntoParams)]
pub struct NotificationsQuery {
    /// Page size. Defaults to and is capped at 50.
    pub limit: Option<usize>,
}

/// Poll the user's most recent notifications, newest first.
#[utoipa::path(
    get,
    path = "/api/users/{external_id}/notifications",
    params(
        ("external_id" = String, Path, description = "Caller's external identifier"),
        NotificationsQuery
    ),
    responses(
        (status = 200, description = "Notifications", body = [NotificationResponse]),
        (status = 404, description = "User not found", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["notifications"],
    operation_id = "listNotifications"
)]
#[get("/users/{external_id}/notifications")]
pub async fn list_notifications(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    query: web::Query<NotificationsQuery>,
) -> ApiResult<web::Json<Vec<NotificationResponse>>> {
    let external_id = path_external_id(path)?;
    let notifications = state
        .inbox
        .fetch_recent(&external_id, query.into_inner().limit)
        .await?;
    Ok(web::Json(
        notifications
            .into_iter()
            .map(NotificationResponse::from)
            .collect(),
    ))
}

/// Response body for the unread counter.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UnreadCountResponse {
    pub count: u64,
}

/// Number of unread notifications waiting for the user.
#[utoipa::path(
    get,
    path = "/api/users/{external_id}/notifications/unread",
    params(("external_id" = String, Path, description = "Caller's external identifier")),
    responses(
        (status = 200, description = "Unread count", body = UnreadCountResponse),
        (status = 404, description = "User not found", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["notifications"],
    operation_id = "countUnreadNotifications"
)]
#[get("/users/{external_id}/notifications/unread")]
pub async fn unread_notifications(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<UnreadCountResponse>> {
    let external_id = path_external_id(path)?;
    let count = state.inbox.unread_count(&external_id).await?;
    Ok(web::Json(UnreadCountResponse { count }))
}

#[cfg(test)]
#[path = "users_tests.rs"]
mod tests;
