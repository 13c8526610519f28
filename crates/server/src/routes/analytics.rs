use axum::{extract::State, Json};
use chrono::Utc;

use service::analytics_service::{self, TodaySummary, TopProduct};

use crate::{errors::JsonApiError, extract::Tenant, state::ServerState};

#[utoipa::path(get, path = "/api/v1/analytics/today-summary", tag = "analytics", responses((status = 200, description = "Revenue, count and average for the current UTC day")))]
pub async fn today_summary(State(state): State<ServerState>, Tenant(ctx): Tenant) -> Result<Json<TodaySummary>, JsonApiError> {
    Ok(Json(analytics_service::today_summary(&state.db, &ctx, Utc::now()).await?))
}

#[utoipa::path(get, path = "/api/v1/analytics/top-selling", tag = "analytics", responses((status = 200, description = "Top five products by quantity over 30 days")))]
pub async fn top_selling(State(state): State<ServerState>, Tenant(ctx): Tenant) -> Result<Json<Vec<TopProduct>>, JsonApiError> {
    Ok(Json(analytics_service::top_selling(&state.db, &ctx, Utc::now()).await?))
}
