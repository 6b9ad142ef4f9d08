// src/models/activity.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::models::audit::Audit;

// Mapeia o CREATE TYPE activity_type do banco
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "activity_type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityType {
    #[default]
    Call,
    Meeting,
    Email,
    Note,
    Task,
}

#[derive(Debug, Clone, Default, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    #[schema(example = 21)]
    pub id: i32,

    #[schema(example = "Reunião de alinhamento")]
    pub subject: String,

    pub description: Option<String>,

    pub activity_type: ActivityType,

    pub scheduled_at: Option<DateTime<Utc>>,

    /// Duração em minutos
    #[schema(example = 30)]
    pub duration: Option<i32>,

    pub user_id: i32,
    pub company_id: Option<i32>,
    pub contact_id: Option<i32>,
    pub opportunity_id: Option<i32>,

    #[sqlx(default)]
    pub user_name: Option<String>,
    #[sqlx(default)]
    pub company_name: Option<String>,
    #[sqlx(default)]
    pub contact_name: Option<String>,
    #[sqlx(default)]
    pub opportunity_name: Option<String>,

    #[sqlx(flatten)]
    #[serde(flatten)]
    pub audit: Audit,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActivityPayload {
    pub id: Option<i32>,

    #[validate(length(min = 1, max = 200, message = "O assunto é obrigatório."))]
    #[schema(example = "Reunião de alinhamento")]
    pub subject: String,

    pub description: Option<String>,

    pub activity_type: ActivityType,

    pub scheduled_at: Option<DateTime<Utc>>,

    #[validate(range(min = 0, message = "A duração não pode ser negativa."))]
    pub duration: Option<i32>,

    pub user_id: i32,
    pub company_id: Option<i32>,
    pub contact_id: Option<i32>,
    pub opportunity_id: Option<i32>,

    pub is_active: Option<bool>,
}

impl ActivityPayload {
    pub fn apply(self, activity: &mut Activity) {
        activity.subject = self.subject;
        activity.description = self.description;
        activity.activity_type = self.activity_type;
        activity.scheduled_at = self.scheduled_at;
        activity.duration = self.duration;
        activity.user_id = self.user_id;
        activity.company_id = self.company_id;
        activity.contact_id = self.contact_id;
        activity.opportunity_id = self.opportunity_id;
        if let Some(active) = self.is_active {
            activity.audit.is_active = active;
        }
    }
}

// ?start=&end= (ISO 8601), intervalo fechado
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TypeCount {
    pub activity_type: ActivityType,
    pub count: i64,
}
