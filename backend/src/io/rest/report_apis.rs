use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use tracing::{error, info};

use super::error::ApiError;
use super::mappers::RentMapper;
use crate::domain::models::BillingPeriod;
use crate::AppState;

/// Create the reports API router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/yearly/:year", get(get_yearly_report))
        .route("/tenants", get(get_tenant_statistics))
        .route("/dashboard", get(get_dashboard))
}

/// Month-by-month rent collection for a year
pub async fn get_yearly_report(State(state): State<AppState>, Path(year): Path<i32>) -> impl IntoResponse {
    info!("GET /api/reports/yearly/{}", year);

    match state
        .report_service
        .yearly_report(year, BillingPeriod::current())
        .await
    {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) => {
            error!("Failed to build yearly report for {}: {}", year, e);
            ApiError::from(e).into_response()
        }
    }
}

pub async fn get_tenant_statistics(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/reports/tenants");

    match state.report_service.tenant_statistics().await {
        Ok(stats) => (StatusCode::OK, Json(stats)).into_response(),
        Err(e) => {
            error!("Failed to build tenant statistics: {}", e);
            ApiError::from(e).into_response()
        }
    }
}

/// Current month overview for the landing page
pub async fn get_dashboard(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/reports/dashboard");

    match state.report_service.dashboard(BillingPeriod::current()).await {
        Ok(dashboard) => (StatusCode::OK, Json(RentMapper::to_dashboard_dto(dashboard))).into_response(),
        Err(e) => {
            error!("Failed to build dashboard: {}", e);
            ApiError::from(e).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::models::BillingPeriod;
    use crate::io::rest::test_support::{body_json, json_request, seed_tenant, setup_test_app};
    use axum::{
        body::Body,
        http::{Method, Request, StatusCode},
    };
    use serde_json::json;
    use tower::util::ServiceExt; // for `oneshot`

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_yearly_report_has_twelve_months() {
        let app = setup_test_app().await;
        let tenant = seed_tenant(&app, "Asha Verma", 1).await;
        let request = json_request(
            Method::POST,
            "/api/rent",
            json!({ "tenant_id": tenant.id, "month": "2023-05", "rent_amount": 7000.0, "light_bill_amount": 250.0 }),
        );
        app.router.clone().oneshot(request).await.unwrap();

        let response = app.router.clone().oneshot(get("/api/reports/yearly/2023")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let report = body_json(response).await;
        assert_eq!(report["year"], 2023);
        assert_eq!(report["months"].as_array().unwrap().len(), 12);
        assert_eq!(report["months"][4]["month_name"], "May");
        assert_eq!(report["months"][4]["pending_amount"], 7250.0);
        assert_eq!(report["totals"]["total_overdue"], 7250.0);

        let response = app.router.clone().oneshot(get("/api/reports/yearly/twenty")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_tenant_statistics_and_dashboard() {
        let app = setup_test_app().await;
        let tenant = seed_tenant(&app, "Asha Verma", 1).await;
        seed_tenant(&app, "Ravi Kumar", 2).await;

        let current = BillingPeriod::current().to_string();
        let request = json_request(
            Method::POST,
            "/api/rent",
            json!({ "tenant_id": tenant.id, "month": current, "rent_amount": 8000.0 }),
        );
        app.router.clone().oneshot(request).await.unwrap();

        let stats = body_json(app.router.clone().oneshot(get("/api/reports/tenants")).await.unwrap()).await;
        assert_eq!(stats["total"], 2);
        assert_eq!(stats["active"], 2);
        assert_eq!(stats["total_monthly_rent"], 20000.0);

        let dashboard = body_json(app.router.clone().oneshot(get("/api/reports/dashboard")).await.unwrap()).await;
        assert_eq!(dashboard["month"], current);
        assert_eq!(dashboard["total_tenants"], 2);
        assert_eq!(dashboard["pending_rent"], 8000.0);
        assert_eq!(dashboard["recent_tenants"][0]["name"], "Ravi Kumar");
        assert_eq!(dashboard["recent_rent_records"][0]["tenant"]["name"], "Asha Verma");
    }
}
