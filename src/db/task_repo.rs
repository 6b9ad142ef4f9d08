// src/db/task_repo.rs

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;

use crate::common::error::AppError;
use crate::common::pagination::PageRequest;
use crate::db::repository::CrudRepository;
use crate::models::task::{CrmTask, TaskComment, TaskStatus, TaskWithComments};

#[async_trait]
pub trait TaskRepository: CrudRepository<CrmTask> {
    async fn find_by_user(&self, user_id: i32) -> Result<Vec<CrmTask>, AppError>;

    async fn find_by_status(&self, status: TaskStatus) -> Result<Vec<CrmTask>, AppError>;

    /// Vencidas antes de `now` e ainda não concluídas
    async fn find_overdue(&self, now: DateTime<Utc>) -> Result<Vec<CrmTask>, AppError>;

    /// Vencem no dia que começa em `day_start` e ainda não foram concluídas
    async fn find_due_today(&self, day_start: DateTime<Utc>) -> Result<Vec<CrmTask>, AppError>;

    async fn find_with_comments(&self, id: i32) -> Result<Option<TaskWithComments>, AppError>;

    async fn find_comments(&self, task_id: i32) -> Result<Vec<TaskComment>, AppError>;

    async fn add_comment(&self, comment: &TaskComment) -> Result<TaskComment, AppError>;
}

const TASK_COLUMNS: &str = "t.id, t.title, t.description, t.due_date, t.completed_at, \
     t.status, t.priority, t.assigned_user_id, t.company_id, t.contact_id, t.opportunity_id, \
     u.first_name || ' ' || u.last_name AS assigned_user_name, \
     co.name AS company_name, \
     ct.first_name || ' ' || ct.last_name AS contact_name, \
     o.name AS opportunity_name, \
     t.created_at, t.updated_at, t.created_by, t.updated_by, t.is_active, t.is_deleted";

const TASK_JOINS: &str = "LEFT JOIN users u ON u.id = t.assigned_user_id \
     LEFT JOIN companies co ON co.id = t.company_id \
     LEFT JOIN contacts ct ON ct.id = t.contact_id \
     LEFT JOIN opportunities o ON o.id = t.opportunity_id";

fn select_tasks(filter: &str) -> String {
    format!("SELECT {TASK_COLUMNS} FROM tasks t {TASK_JOINS} WHERE t.is_deleted = FALSE {filter}")
}

const COMMENT_COLUMNS: &str = "tc.id, tc.comment, tc.task_id, tc.user_id, \
     u.first_name || ' ' || u.last_name AS user_name, \
     tc.created_at, tc.updated_at, tc.created_by, tc.updated_by, tc.is_active, tc.is_deleted";

#[derive(Clone)]
pub struct PgTaskRepository {
    pool: PgPool,
}

impl PgTaskRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CrudRepository<CrmTask> for PgTaskRepository {
    async fn find_all(&self) -> Result<Vec<CrmTask>, AppError> {
        let sql = select_tasks("ORDER BY t.id");
        let tasks = sqlx::query_as::<_, CrmTask>(&sql).fetch_all(&self.pool).await?;
        Ok(tasks)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<CrmTask>, AppError> {
        let sql = select_tasks("AND t.id = $1");
        let task = sqlx::query_as::<_, CrmTask>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(task)
    }

    async fn add(&self, task: &CrmTask) -> Result<CrmTask, AppError> {
        let sql = format!(
            "WITH t AS ( \
                 INSERT INTO tasks (title, description, due_date, completed_at, status, priority, \
                     assigned_user_id, company_id, contact_id, opportunity_id, \
                     created_at, created_by, is_active) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) \
                 RETURNING *) \
             SELECT {TASK_COLUMNS} FROM t {TASK_JOINS}"
        );
        let created = sqlx::query_as::<_, CrmTask>(&sql)
            .bind(&task.title)
            .bind(&task.description)
            .bind(task.due_date)
            .bind(task.completed_at)
            .bind(task.status)
            .bind(task.priority)
            .bind(task.assigned_user_id)
            .bind(task.company_id)
            .bind(task.contact_id)
            .bind(task.opportunity_id)
            .bind(task.audit.created_at)
            .bind(&task.audit.created_by)
            .bind(task.audit.is_active)
            .fetch_one(&self.pool)
            .await?;
        Ok(created)
    }

    async fn update(&self, task: &CrmTask) -> Result<CrmTask, AppError> {
        let sql = format!(
            "WITH t AS ( \
                 UPDATE tasks SET title = $2, description = $3, due_date = $4, completed_at = $5, \
                     status = $6, priority = $7, assigned_user_id = $8, company_id = $9, \
                     contact_id = $10, opportunity_id = $11, \
                     updated_at = $12, updated_by = $13, is_active = $14, is_deleted = $15 \
                 WHERE id = $1 AND is_deleted = FALSE \
                 RETURNING *) \
             SELECT {TASK_COLUMNS} FROM t {TASK_JOINS}"
        );
        let updated = sqlx::query_as::<_, CrmTask>(&sql)
            .bind(task.id)
            .bind(&task.title)
            .bind(&task.description)
            .bind(task.due_date)
            .bind(task.completed_at)
            .bind(task.status)
            .bind(task.priority)
            .bind(task.assigned_user_id)
            .bind(task.company_id)
            .bind(task.contact_id)
            .bind(task.opportunity_id)
            .bind(task.audit.updated_at)
            .bind(&task.audit.updated_by)
            .bind(task.audit.is_active)
            .bind(task.audit.is_deleted)
            .fetch_optional(&self.pool)
            .await?;

        updated.ok_or_else(|| AppError::not_found(format!("Tarefa {} não encontrada.", task.id)))
    }

    async fn count(&self) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tasks WHERE is_deleted = FALSE")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn exists(&self, id: i32) -> Result<bool, AppError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM tasks WHERE id = $1 AND is_deleted = FALSE)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn find_paged(&self, page: PageRequest) -> Result<Vec<CrmTask>, AppError> {
        let sql = select_tasks("ORDER BY t.id LIMIT $1 OFFSET $2");
        let tasks = sqlx::query_as::<_, CrmTask>(&sql)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;
        Ok(tasks)
    }
}

#[async_trait]
impl TaskRepository for PgTaskRepository {
    async fn find_by_user(&self, user_id: i32) -> Result<Vec<CrmTask>, AppError> {
        let sql = select_tasks("AND t.assigned_user_id = $1 ORDER BY t.id");
        let tasks = sqlx::query_as::<_, CrmTask>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(tasks)
    }

    async fn find_by_status(&self, status: TaskStatus) -> Result<Vec<CrmTask>, AppError> {
        let sql = select_tasks("AND t.status = $1 ORDER BY t.id");
        let tasks = sqlx::query_as::<_, CrmTask>(&sql)
            .bind(status)
            .fetch_all(&self.pool)
            .await?;
        Ok(tasks)
    }

    async fn find_overdue(&self, now: DateTime<Utc>) -> Result<Vec<CrmTask>, AppError> {
        let sql = select_tasks("AND t.due_date < $1 AND t.status <> 'COMPLETED' ORDER BY t.due_date, t.id");
        let tasks = sqlx::query_as::<_, CrmTask>(&sql)
            .bind(now)
            .fetch_all(&self.pool)
            .await?;
        Ok(tasks)
    }

    async fn find_due_today(&self, day_start: DateTime<Utc>) -> Result<Vec<CrmTask>, AppError> {
        let sql = select_tasks(
            "AND t.due_date >= $1 AND t.due_date < $2 AND t.status <> 'COMPLETED' ORDER BY t.due_date, t.id",
        );
        let tasks = sqlx::query_as::<_, CrmTask>(&sql)
            .bind(day_start)
            .bind(day_start + Duration::days(1))
            .fetch_all(&self.pool)
            .await?;
        Ok(tasks)
    }

    async fn find_with_comments(&self, id: i32) -> Result<Option<TaskWithComments>, AppError> {
        let Some(task) = self.find_by_id(id).await? else {
            return Ok(None);
        };
        let comments = self.find_comments(id).await?;
        Ok(Some(TaskWithComments { task, comments }))
    }

    async fn find_comments(&self, task_id: i32) -> Result<Vec<TaskComment>, AppError> {
        let sql = format!(
            "SELECT {COMMENT_COLUMNS} FROM task_comments tc \
             LEFT JOIN users u ON u.id = tc.user_id \
             WHERE tc.task_id = $1 AND tc.is_deleted = FALSE \
             ORDER BY tc.created_at, tc.id"
        );
        let comments = sqlx::query_as::<_, TaskComment>(&sql)
            .bind(task_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(comments)
    }

    async fn add_comment(&self, comment: &TaskComment) -> Result<TaskComment, AppError> {
        let sql = format!(
            "WITH tc AS ( \
                 INSERT INTO task_comments (comment, task_id, user_id, created_at, created_by) \
                 VALUES ($1, $2, $3, $4, $5) \
                 RETURNING *) \
             SELECT {COMMENT_COLUMNS} FROM tc LEFT JOIN users u ON u.id = tc.user_id"
        );
        let created = sqlx::query_as::<_, TaskComment>(&sql)
            .bind(&comment.comment)
            .bind(comment.task_id)
            .bind(comment.user_id)
            .bind(comment.audit.created_at)
            .bind(&comment.audit.created_by)
            .fetch_one(&self.pool)
            .await?;
        Ok(created)
    }
}
