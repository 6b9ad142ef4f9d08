// src/db/opportunity_repo.rs

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::common::error::AppError;
use crate::common::pagination::PageRequest;
use crate::db::repository::CrudRepository;
use crate::models::opportunity::{Opportunity, SalesStage};

#[async_trait]
pub trait OpportunityRepository: CrudRepository<Opportunity> {
    async fn find_by_user(&self, user_id: i32) -> Result<Vec<Opportunity>, AppError>;

    async fn find_by_stage(&self, stage_id: i32) -> Result<Vec<Opportunity>, AppError>;

    async fn find_by_company(&self, company_id: i32) -> Result<Vec<Opportunity>, AppError>;

    /// Soma do valor estimado das oportunidades ativas do usuário
    async fn total_value_by_user(&self, user_id: i32) -> Result<Decimal, AppError>;
}

#[async_trait]
pub trait SalesStageRepository: Send + Sync {
    /// Etapas na ordem do funil
    async fn list_stages(&self) -> Result<Vec<SalesStage>, AppError>;

    async fn stage_exists(&self, id: i32) -> Result<bool, AppError>;
}

const OPPORTUNITY_COLUMNS: &str = "o.id, o.name, o.description, o.estimated_value, o.probability, \
     o.expected_close_date, o.actual_close_date, \
     o.stage_id, o.company_id, o.contact_id, o.assigned_user_id, \
     s.name AS stage_name, co.name AS company_name, \
     ct.first_name || ' ' || ct.last_name AS contact_name, \
     u.first_name || ' ' || u.last_name AS assigned_user_name, \
     o.created_at, o.updated_at, o.created_by, o.updated_by, o.is_active, o.is_deleted";

const OPPORTUNITY_JOINS: &str = "LEFT JOIN sales_stages s ON s.id = o.stage_id \
     LEFT JOIN companies co ON co.id = o.company_id \
     LEFT JOIN contacts ct ON ct.id = o.contact_id \
     LEFT JOIN users u ON u.id = o.assigned_user_id";

pub(crate) fn select_opportunities(filter: &str) -> String {
    format!(
        "SELECT {OPPORTUNITY_COLUMNS} FROM opportunities o {OPPORTUNITY_JOINS} WHERE o.is_deleted = FALSE {filter}"
    )
}

const STAGE_COLUMNS: &str = "id, name, description, stage_order, color, is_won, is_lost";

#[derive(Clone)]
pub struct PgOpportunityRepository {
    pool: PgPool,
}

impl PgOpportunityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_where(&self, filter: &str, value: i32) -> Result<Vec<Opportunity>, AppError> {
        let sql = select_opportunities(filter);
        let opportunities = sqlx::query_as::<_, Opportunity>(&sql)
            .bind(value)
            .fetch_all(&self.pool)
            .await?;
        Ok(opportunities)
    }
}

#[async_trait]
impl CrudRepository<Opportunity> for PgOpportunityRepository {
    async fn find_all(&self) -> Result<Vec<Opportunity>, AppError> {
        let sql = select_opportunities("ORDER BY o.id");
        let opportunities = sqlx::query_as::<_, Opportunity>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(opportunities)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Opportunity>, AppError> {
        let sql = select_opportunities("AND o.id = $1");
        let opportunity = sqlx::query_as::<_, Opportunity>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(opportunity)
    }

    async fn add(&self, opportunity: &Opportunity) -> Result<Opportunity, AppError> {
        let sql = format!(
            "WITH o AS ( \
                 INSERT INTO opportunities (name, description, estimated_value, probability, \
                     expected_close_date, actual_close_date, stage_id, company_id, contact_id, \
                     assigned_user_id, created_at, created_by, is_active) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) \
                 RETURNING *) \
             SELECT {OPPORTUNITY_COLUMNS} FROM o {OPPORTUNITY_JOINS}"
        );
        let created = sqlx::query_as::<_, Opportunity>(&sql)
            .bind(&opportunity.name)
            .bind(&opportunity.description)
            .bind(opportunity.estimated_value)
            .bind(opportunity.probability)
            .bind(opportunity.expected_close_date)
            .bind(opportunity.actual_close_date)
            .bind(opportunity.stage_id)
            .bind(opportunity.company_id)
            .bind(opportunity.contact_id)
            .bind(opportunity.assigned_user_id)
            .bind(opportunity.audit.created_at)
            .bind(&opportunity.audit.created_by)
            .bind(opportunity.audit.is_active)
            .fetch_one(&self.pool)
            .await?;
        Ok(created)
    }

    async fn update(&self, opportunity: &Opportunity) -> Result<Opportunity, AppError> {
        let sql = format!(
            "WITH o AS ( \
                 UPDATE opportunities SET name = $2, description = $3, estimated_value = $4, \
                     probability = $5, expected_close_date = $6, actual_close_date = $7, \
                     stage_id = $8, company_id = $9, contact_id = $10, assigned_user_id = $11, \
                     updated_at = $12, updated_by = $13, is_active = $14, is_deleted = $15 \
                 WHERE id = $1 AND is_deleted = FALSE \
                 RETURNING *) \
             SELECT {OPPORTUNITY_COLUMNS} FROM o {OPPORTUNITY_JOINS}"
        );
        let updated = sqlx::query_as::<_, Opportunity>(&sql)
            .bind(opportunity.id)
            .bind(&opportunity.name)
            .bind(&opportunity.description)
            .bind(opportunity.estimated_value)
            .bind(opportunity.probability)
            .bind(opportunity.expected_close_date)
            .bind(opportunity.actual_close_date)
            .bind(opportunity.stage_id)
            .bind(opportunity.company_id)
            .bind(opportunity.contact_id)
            .bind(opportunity.assigned_user_id)
            .bind(opportunity.audit.updated_at)
            .bind(&opportunity.audit.updated_by)
            .bind(opportunity.audit.is_active)
            .bind(opportunity.audit.is_deleted)
            .fetch_optional(&self.pool)
            .await?;

        updated.ok_or_else(|| {
            AppError::not_found(format!("Oportunidade {} não encontrada.", opportunity.id))
        })
    }

    async fn count(&self) -> Result<i64, AppError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM opportunities WHERE is_deleted = FALSE")
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    async fn exists(&self, id: i32) -> Result<bool, AppError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM opportunities WHERE id = $1 AND is_deleted = FALSE)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn find_paged(&self, page: PageRequest) -> Result<Vec<Opportunity>, AppError> {
        let sql = select_opportunities("ORDER BY o.id LIMIT $1 OFFSET $2");
        let opportunities = sqlx::query_as::<_, Opportunity>(&sql)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;
        Ok(opportunities)
    }
}

#[async_trait]
impl OpportunityRepository for PgOpportunityRepository {
    async fn find_by_user(&self, user_id: i32) -> Result<Vec<Opportunity>, AppError> {
        self.fetch_where("AND o.assigned_user_id = $1 ORDER BY o.id", user_id).await
    }

    async fn find_by_stage(&self, stage_id: i32) -> Result<Vec<Opportunity>, AppError> {
        self.fetch_where("AND o.stage_id = $1 ORDER BY o.id", stage_id).await
    }

    async fn find_by_company(&self, company_id: i32) -> Result<Vec<Opportunity>, AppError> {
        self.fetch_where("AND o.company_id = $1 ORDER BY o.id", company_id).await
    }

    async fn total_value_by_user(&self, user_id: i32) -> Result<Decimal, AppError> {
        let total: Decimal = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(estimated_value), 0)
            FROM opportunities
            WHERE assigned_user_id = $1 AND is_deleted = FALSE
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(total)
    }
}

#[async_trait]
impl SalesStageRepository for PgOpportunityRepository {
    async fn list_stages(&self) -> Result<Vec<SalesStage>, AppError> {
        let sql = format!(
            "SELECT {STAGE_COLUMNS} FROM sales_stages WHERE is_deleted = FALSE ORDER BY stage_order, id"
        );
        let stages = sqlx::query_as::<_, SalesStage>(&sql).fetch_all(&self.pool).await?;
        Ok(stages)
    }

    async fn stage_exists(&self, id: i32) -> Result<bool, AppError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM sales_stages WHERE id = $1 AND is_deleted = FALSE)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }
}
