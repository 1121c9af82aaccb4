use axum::{extract::State, routing::get, Json, Router};
use time::OffsetDateTime;
use tracing::instrument;

use super::{
    dto::Summary,
    repo_types::{DailyRevenue, TypeCount},
    scope::KpiScope,
    services,
};
use crate::{auth::extractors::AuthUser, error::AppResult, state::AppState};

pub fn kpi_routes() -> Router<AppState> {
    Router::new()
        .route("/kpis/summary", get(get_summary))
        .route("/kpis/daily", get(get_daily))
        .route("/kpis/top", get(get_top))
}

#[instrument(skip_all)]
pub async fn get_summary(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
) -> AppResult<Json<Summary>> {
    let scope = KpiScope::for_caller(&caller);
    let summary = services::summary(state.kpis.as_ref(), scope).await?;
    Ok(Json(summary))
}

#[instrument(skip_all)]
pub async fn get_daily(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
) -> AppResult<Json<Vec<DailyRevenue>>> {
    let scope = KpiScope::for_caller(&caller);
    let rows = services::daily(state.kpis.as_ref(), scope, OffsetDateTime::now_utc()).await?;
    Ok(Json(rows))
}

#[instrument(skip_all)]
pub async fn get_top(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
) -> AppResult<Json<Vec<TypeCount>>> {
    let scope = KpiScope::for_caller(&caller);
    let rows = services::top(state.kpis.as_ref(), scope).await?;
    Ok(Json(rows))
}
