// src/models/opportunity.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::models::audit::Audit;

// Etapa do funil de vendas (dado fixo, vem da migração)
#[derive(Debug, Clone, Default, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SalesStage {
    #[schema(example = 3)]
    pub id: i32,

    #[schema(example = "Proposal")]
    pub name: String,

    pub description: Option<String>,

    #[schema(example = 3)]
    pub stage_order: i32,

    #[schema(example = "#ffc107")]
    pub color: String,

    pub is_won: bool,
    pub is_lost: bool,
}

#[derive(Debug, Clone, Default, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Opportunity {
    #[schema(example = 10)]
    pub id: i32,

    #[schema(example = "Renovação de contrato 2025")]
    pub name: String,

    pub description: Option<String>,

    #[schema(value_type = f64, example = 25000.00)]
    pub estimated_value: Decimal,

    #[schema(example = 60)]
    pub probability: i32,

    pub expected_close_date: Option<DateTime<Utc>>,
    pub actual_close_date: Option<DateTime<Utc>>,

    pub stage_id: i32,
    pub company_id: i32,
    pub contact_id: Option<i32>,
    pub assigned_user_id: i32,

    // Nomes relacionados (JOINs da listagem)
    #[sqlx(default)]
    pub stage_name: Option<String>,
    #[sqlx(default)]
    pub company_name: Option<String>,
    #[sqlx(default)]
    pub contact_name: Option<String>,
    #[sqlx(default)]
    pub assigned_user_name: Option<String>,

    #[sqlx(flatten)]
    #[serde(flatten)]
    pub audit: Audit,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OpportunityPayload {
    pub id: Option<i32>,

    #[validate(length(min = 1, max = 200, message = "O nome da oportunidade é obrigatório."))]
    #[schema(example = "Renovação de contrato 2025")]
    pub name: String,

    #[validate(length(max = 1000))]
    pub description: Option<String>,

    #[schema(value_type = f64, example = 25000.00)]
    #[serde(default)]
    pub estimated_value: Decimal,

    #[validate(range(min = 0, max = 100, message = "A probabilidade deve estar entre 0 e 100."))]
    #[serde(default)]
    pub probability: i32,

    pub expected_close_date: Option<DateTime<Utc>>,
    pub actual_close_date: Option<DateTime<Utc>>,

    pub stage_id: i32,
    pub company_id: i32,
    pub contact_id: Option<i32>,
    pub assigned_user_id: i32,

    pub is_active: Option<bool>,
}

impl OpportunityPayload {
    pub fn apply(self, opportunity: &mut Opportunity) {
        opportunity.name = self.name;
        opportunity.description = self.description;
        opportunity.estimated_value = self.estimated_value;
        opportunity.probability = self.probability;
        opportunity.expected_close_date = self.expected_close_date;
        opportunity.actual_close_date = self.actual_close_date;
        opportunity.stage_id = self.stage_id;
        opportunity.company_id = self.company_id;
        opportunity.contact_id = self.contact_id;
        opportunity.assigned_user_id = self.assigned_user_id;
        if let Some(active) = self.is_active {
            opportunity.audit.is_active = active;
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TotalValueResponse {
    pub user_id: i32,
    #[schema(value_type = f64)]
    pub total_value: Decimal,
}

// Soma das oportunidades por etapa do funil
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StageValue {
    #[schema(example = "Proposal")]
    pub stage_name: String,
    #[schema(value_type = f64)]
    pub total_value: Decimal,
}
