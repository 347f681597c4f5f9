//! Notification HTTP handlers.
//!
//! ```text
//! PUT /api/notifications/{id}/read
//! ```
//!
//! Polling lives with the user routes in [`crate::inbound::http::users`].

use actix_web::{put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Notification, NotificationId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_uuid};

/// Notification as returned to the recipient.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NotificationResponse {
    pub id: String,
    pub order_id: String,
    #[serde(rename = "type")]
    #[schema(example = "buyer_joined")]
    pub kind: String,
    #[schema(example = "Buyer joined order #AB12CD34")]
    pub message: String,
    pub is_read: bool,
    pub created_at: String,
}

impl From<Notification> for NotificationResponse {
    fn from(value: Notification) -> Self {
        Self {
            id: value.id.to_string(),
            order_id: value.order_id.to_string(),
            kind: value.kind.as_str().to_owned(),
            message: value.message,
            is_read: value.read,
            created_at: value.created_at.to_rfc3339(),
        }
    }
}

/// Generic acknowledgement body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

/// Mark a notification as read. Unknown ids succeed without effect.
#[utoipa::path(
    put,
    path = "/api/notifications/{id}/read",
    params(("id" = String, Path, description = "Notification UUID")),
    responses(
        (status = 200, description = "Notification marked read", body = SuccessResponse),
        (status = 400, description = "Invalid notification id", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["notifications"],
    operation_id = "markNotificationRead"
)]
#[put("/notifications/{id}/read")]
pub async fn mark_read(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<SuccessResponse>> {
    let id = parse_uuid(&path.into_inner(), FieldName::new("id"))?;
    state.inbox.mark_read(NotificationId::from_uuid(id)).await?;
    Ok(web::Json(SuccessResponse::ok()))
}
