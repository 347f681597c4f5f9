//! Platform statistics handler.
//!
//! ```text
//! GET /api/stats
//! ```

use actix_web::{get, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::PlatformStats;
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;

/// Marketplace-wide counters. Field names are camelCase on the wire.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub completed_deals: u64,
    pub total_users: u64,
    pub active_orders: u64,
}

impl From<PlatformStats> for StatsResponse {
    fn from(value: PlatformStats) -> Self {
        Self {
            completed_deals: value.completed_deals,
            total_users: value.total_users,
            active_orders: value.active_orders,
        }
    }
}

/// Completed deals, registered users and open orders.
#[utoipa::path(
    get,
    path = "/api/stats",
    responses(
        (status = 200, description = "Platform statistics", body = StatsResponse),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["stats"],
    operation_id = "getStats"
)]
#[get("/stats")]
pub async fn get_stats(state: web::Data<HttpState>) -> ApiResult<web::Json<StatsResponse>> {
    let stats = state.stats.platform_stats().await?;
    Ok(web::Json(stats.into()))
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use std::sync::Arc;

    use actix_web::{App, test as actix_test};
    use rstest::rstest;
    use serde_json::Value;

    use super::*;
    use crate::domain::Error;
    use crate::domain::ports::{
        MockMarketStatsQuery, MockNotificationInbox, MockOrdersCommand, MockOrdersQuery,
        MockUserAccountsCommand, MockUserAccountsQuery,
    };
    use crate::inbound::http::state::HttpStatePorts;

    fn state_with(stats: MockMarketStatsQuery) -> HttpState {
        HttpState::new(HttpStatePorts {
            accounts: Arc::new(MockUserAccountsCommand::new()),
            profiles: Arc::new(MockUserAccountsQuery::new()),
            orders: Arc::new(MockOrdersCommand::new()),
            orders_query: Arc::new(MockOrdersQuery::new()),
            inbox: Arc::new(MockNotificationInbox::new()),
            stats: Arc::new(stats),
        })
    }

    async fn call(state: HttpState) -> actix_web::dev::ServiceResponse {
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .service(web::scope("/api").service(get_stats)),
        )
        .await;
        let request = actix_test::TestRequest::get().uri("/api/stats").to_request();
        actix_test::call_service(&app, request).await
    }

    #[rstest]
    #[actix_web::test]
    async fn stats_use_camel_case_keys() {
        let mut stats = MockMarketStatsQuery::new();
        stats.expect_platform_stats().times(1).return_once(|| {
            Ok(PlatformStats {
                completed_deals: 3,
                total_users: 7,
                active_orders: 2,
            })
        });

        let response = call(state_with(stats)).await;
        assert!(response.status().is_success());
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["completedDeals"], 3);
        assert_eq!(body["totalUsers"], 7);
        assert_eq!(body["activeOrders"], 2);
    }

    #[rstest]
    #[actix_web::test]
    async fn storage_failures_are_redacted() {
        let mut stats = MockMarketStatsQuery::new();
        stats
            .expect_platform_stats()
            .return_once(|| Err(Error::internal("ledger repository error: relation missing")));

        let response = call(state_with(stats)).await;
        assert_eq!(
            response.status(),
            actix_web::http::StatusCode::INTERNAL_SERVER_ERROR
        );
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["message"], "Internal server error");
    }
}
