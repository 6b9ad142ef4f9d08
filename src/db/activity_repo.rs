// src/db/activity_repo.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::common::error::AppError;
use crate::common::pagination::PageRequest;
use crate::db::repository::CrudRepository;
use crate::models::activity::Activity;

// Listagens vêm das mais recentes para as mais antigas (created_at DESC)
#[async_trait]
pub trait ActivityRepository: CrudRepository<Activity> {
    async fn find_by_user(&self, user_id: i32) -> Result<Vec<Activity>, AppError>;

    async fn find_by_company(&self, company_id: i32) -> Result<Vec<Activity>, AppError>;

    async fn find_by_contact(&self, contact_id: i32) -> Result<Vec<Activity>, AppError>;

    async fn find_by_opportunity(&self, opportunity_id: i32) -> Result<Vec<Activity>, AppError>;

    /// Agendadas dentro de [start, end], em ordem de agenda
    async fn find_by_date_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Activity>, AppError>;

    /// Próximas atividades do usuário (agendadas depois de `now`)
    async fn find_upcoming(&self, user_id: i32, now: DateTime<Utc>) -> Result<Vec<Activity>, AppError>;
}

const ACTIVITY_COLUMNS: &str = "a.id, a.subject, a.description, a.activity_type, a.scheduled_at, \
     a.duration, a.user_id, a.company_id, a.contact_id, a.opportunity_id, \
     u.first_name || ' ' || u.last_name AS user_name, \
     co.name AS company_name, \
     ct.first_name || ' ' || ct.last_name AS contact_name, \
     o.name AS opportunity_name, \
     a.created_at, a.updated_at, a.created_by, a.updated_by, a.is_active, a.is_deleted";

const ACTIVITY_JOINS: &str = "LEFT JOIN users u ON u.id = a.user_id \
     LEFT JOIN companies co ON co.id = a.company_id \
     LEFT JOIN contacts ct ON ct.id = a.contact_id \
     LEFT JOIN opportunities o ON o.id = a.opportunity_id";

const NEWEST_FIRST: &str = "ORDER BY a.created_at DESC, a.id DESC";

fn select_activities(filter: &str) -> String {
    format!("SELECT {ACTIVITY_COLUMNS} FROM activities a {ACTIVITY_JOINS} WHERE a.is_deleted = FALSE {filter}")
}

#[derive(Clone)]
pub struct PgActivityRepository {
    pool: PgPool,
}

impl PgActivityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn newest_where(&self, column: &str, value: i32) -> Result<Vec<Activity>, AppError> {
        let sql = select_activities(&format!("AND a.{column} = $1 {NEWEST_FIRST}"));
        let activities = sqlx::query_as::<_, Activity>(&sql)
            .bind(value)
            .fetch_all(&self.pool)
            .await?;
        Ok(activities)
    }
}

#[async_trait]
impl CrudRepository<Activity> for PgActivityRepository {
    async fn find_all(&self) -> Result<Vec<Activity>, AppError> {
        let sql = select_activities(NEWEST_FIRST);
        let activities = sqlx::query_as::<_, Activity>(&sql).fetch_all(&self.pool).await?;
        Ok(activities)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Activity>, AppError> {
        let sql = select_activities("AND a.id = $1");
        let activity = sqlx::query_as::<_, Activity>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(activity)
    }

    async fn add(&self, activity: &Activity) -> Result<Activity, AppError> {
        let sql = format!(
            "WITH a AS ( \
                 INSERT INTO activities (subject, description, activity_type, scheduled_at, duration, \
                     user_id, company_id, contact_id, opportunity_id, created_at, created_by, is_active) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
                 RETURNING *) \
             SELECT {ACTIVITY_COLUMNS} FROM a {ACTIVITY_JOINS}"
        );
        let created = sqlx::query_as::<_, Activity>(&sql)
            .bind(&activity.subject)
            .bind(&activity.description)
            .bind(activity.activity_type)
            .bind(activity.scheduled_at)
            .bind(activity.duration)
            .bind(activity.user_id)
            .bind(activity.company_id)
            .bind(activity.contact_id)
            .bind(activity.opportunity_id)
            .bind(activity.audit.created_at)
            .bind(&activity.audit.created_by)
            .bind(activity.audit.is_active)
            .fetch_one(&self.pool)
            .await?;
        Ok(created)
    }

    async fn update(&self, activity: &Activity) -> Result<Activity, AppError> {
        let sql = format!(
            "WITH a AS ( \
                 UPDATE activities SET subject = $2, description = $3, activity_type = $4, \
                     scheduled_at = $5, duration = $6, user_id = $7, company_id = $8, \
                     contact_id = $9, opportunity_id = $10, \
                     updated_at = $11, updated_by = $12, is_active = $13, is_deleted = $14 \
                 WHERE id = $1 AND is_deleted = FALSE \
                 RETURNING *) \
             SELECT {ACTIVITY_COLUMNS} FROM a {ACTIVITY_JOINS}"
        );
        let updated = sqlx::query_as::<_, Activity>(&sql)
            .bind(activity.id)
            .bind(&activity.subject)
            .bind(&activity.description)
            .bind(activity.activity_type)
            .bind(activity.scheduled_at)
            .bind(activity.duration)
            .bind(activity.user_id)
            .bind(activity.company_id)
            .bind(activity.contact_id)
            .bind(activity.opportunity_id)
            .bind(activity.audit.updated_at)
            .bind(&activity.audit.updated_by)
            .bind(activity.audit.is_active)
            .bind(activity.audit.is_deleted)
            .fetch_optional(&self.pool)
            .await?;

        updated.ok_or_else(|| AppError::not_found(format!("Atividade {} não encontrada.", activity.id)))
    }

    async fn count(&self) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM activities WHERE is_deleted = FALSE")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn exists(&self, id: i32) -> Result<bool, AppError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM activities WHERE id = $1 AND is_deleted = FALSE)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn find_paged(&self, page: PageRequest) -> Result<Vec<Activity>, AppError> {
        let sql = select_activities(&format!("{NEWEST_FIRST} LIMIT $1 OFFSET $2"));
        let activities = sqlx::query_as::<_, Activity>(&sql)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;
        Ok(activities)
    }
}

#[async_trait]
impl ActivityRepository for PgActivityRepository {
    async fn find_by_user(&self, user_id: i32) -> Result<Vec<Activity>, AppError> {
        self.newest_where("user_id", user_id).await
    }

    async fn find_by_company(&self, company_id: i32) -> Result<Vec<Activity>, AppError> {
        self.newest_where("company_id", company_id).await
    }

    async fn find_by_contact(&self, contact_id: i32) -> Result<Vec<Activity>, AppError> {
        self.newest_where("contact_id", contact_id).await
    }

    async fn find_by_opportunity(&self, opportunity_id: i32) -> Result<Vec<Activity>, AppError> {
        self.newest_where("opportunity_id", opportunity_id).await
    }

    async fn find_by_date_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Activity>, AppError> {
        let sql = select_activities("AND a.scheduled_at BETWEEN $1 AND $2 ORDER BY a.scheduled_at, a.id");
        let activities = sqlx::query_as::<_, Activity>(&sql)
            .bind(start)
            .bind(end)
            .fetch_all(&self.pool)
            .await?;
        Ok(activities)
    }

    async fn find_upcoming(&self, user_id: i32, now: DateTime<Utc>) -> Result<Vec<Activity>, AppError> {
        let sql = select_activities("AND a.user_id = $1 AND a.scheduled_at > $2 ORDER BY a.scheduled_at, a.id");
        let activities = sqlx::query_as::<_, Activity>(&sql)
            .bind(user_id)
            .bind(now)
            .fetch_all(&self.pool)
            .await?;
        Ok(activities)
    }
}
