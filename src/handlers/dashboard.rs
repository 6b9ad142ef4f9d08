// src/handlers/dashboard.rs

use axum::{extract::State, Json};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::dashboard::DashboardSummary,
};

// GET /api/dashboard/summary
#[utoipa::path(
    get,
    path = "/api/dashboard/summary",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Totais do painel", body = DashboardSummary),
        (status = 401, description = "Não autorizado")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn get_summary(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<DashboardSummary>, AppError> {
    tracing::debug!("📊 Painel pedido por {}", user.actor());
    Ok(Json(app_state.dashboard_service.summary().await?))
}
