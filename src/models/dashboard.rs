// src/models/dashboard.rs

use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

// Os cards do topo do painel
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_companies: i64,
    pub total_contacts: i64,
    pub total_opportunities: i64,
    pub total_tasks: i64,
    pub completed_tasks: i64,
    pub overdue_tasks: i64,

    // Soma do valor estimado de todas as oportunidades ativas
    #[schema(value_type = f64)]
    pub total_opportunity_value: Decimal,
}
