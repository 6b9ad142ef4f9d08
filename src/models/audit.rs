// src/models/audit.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

// Colunas comuns a todas as tabelas (auditoria + soft delete).
// Entra nas entidades com #[sqlx(flatten)] / #[serde(flatten)].
#[derive(Debug, Clone, Default, PartialEq, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Audit {
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub created_by: String,
    pub updated_by: Option<String>,
    pub is_active: bool,

    #[serde(skip_serializing)]
    #[schema(ignore)]
    pub is_deleted: bool,
}

impl Audit {
    /// Carimbo de criação
    pub fn created(actor: &str) -> Self {
        Self {
            created_at: Utc::now(),
            updated_at: None,
            created_by: actor.to_string(),
            updated_by: None,
            is_active: true,
            is_deleted: false,
        }
    }

    pub fn touch(&mut self, actor: &str) {
        self.updated_at = Some(Utc::now());
        self.updated_by = Some(actor.to_string());
    }

    /// Soft delete: a linha continua no banco, só some das leituras.
    pub fn mark_deleted(&mut self, actor: &str) {
        self.is_deleted = true;
        self.touch(actor);
    }
}
