// src/models/task.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::models::audit::Audit;

// --- ENUMS ---

// Mapeia o CREATE TYPE task_status do banco. No JSON vai como "InProgress" etc.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "task_status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "task_priority", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

// --- TAREFA ---

#[derive(Debug, Clone, Default, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CrmTask {
    #[schema(example = 3)]
    pub id: i32,

    #[schema(example = "Ligar para o cliente")]
    pub title: String,

    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,

    pub status: TaskStatus,
    pub priority: TaskPriority,

    pub assigned_user_id: i32,
    pub company_id: Option<i32>,
    pub contact_id: Option<i32>,
    pub opportunity_id: Option<i32>,

    #[sqlx(default)]
    pub assigned_user_name: Option<String>,
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

impl CrmTask {
    /// Atrasada: venceu e não foi concluída
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.status != TaskStatus::Completed && self.due_date.is_some_and(|due| due < now)
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskPayload {
    pub id: Option<i32>,

    #[validate(length(min = 1, max = 200, message = "O título da tarefa é obrigatório."))]
    #[schema(example = "Ligar para o cliente")]
    pub title: String,

    #[validate(length(max = 1000))]
    pub description: Option<String>,

    pub due_date: Option<DateTime<Utc>>,

    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub priority: TaskPriority,

    pub assigned_user_id: i32,
    pub company_id: Option<i32>,
    pub contact_id: Option<i32>,
    pub opportunity_id: Option<i32>,

    pub is_active: Option<bool>,
}

impl TaskPayload {
    pub fn apply(self, task: &mut CrmTask) {
        task.title = self.title;
        task.description = self.description;
        task.due_date = self.due_date;
        task.status = self.status;
        task.priority = self.priority;
        task.assigned_user_id = self.assigned_user_id;
        task.company_id = self.company_id;
        task.contact_id = self.contact_id;
        task.opportunity_id = self.opportunity_id;
        if let Some(active) = self.is_active {
            task.audit.is_active = active;
        }
    }
}

// --- COMENTÁRIOS ---

#[derive(Debug, Clone, Default, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskComment {
    pub id: i32,

    #[schema(example = "Cliente pediu retorno na sexta.")]
    pub comment: String,

    pub task_id: i32,
    pub user_id: i32,

    #[sqlx(default)]
    pub user_name: Option<String>,

    #[sqlx(flatten)]
    #[serde(flatten)]
    pub audit: Audit,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CommentPayload {
    #[validate(length(min = 1, max = 2000, message = "O comentário não pode ser vazio."))]
    pub comment: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskWithComments {
    #[serde(flatten)]
    pub task: CrmTask,
    pub comments: Vec<TaskComment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct StatusCount {
    pub status: TaskStatus,
    pub count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn status_travels_as_pascal_case() {
        assert_eq!(serde_json::to_string(&TaskStatus::InProgress).unwrap(), "\"InProgress\"");
        let parsed: TaskPriority = serde_json::from_str("\"Critical\"").unwrap();
        assert_eq!(parsed, TaskPriority::Critical);
    }

    #[test]
    fn completed_tasks_are_never_overdue() {
        let now = Utc::now();
        let mut task = CrmTask {
            due_date: Some(now - Duration::hours(1)),
            ..Default::default()
        };
        assert!(task.is_overdue(now));

        task.status = TaskStatus::Completed;
        assert!(!task.is_overdue(now));

        task.status = TaskStatus::Pending;
        task.due_date = None;
        assert!(!task.is_overdue(now));
    }
}
