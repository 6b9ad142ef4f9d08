// src/db/company_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;

use crate::common::error::AppError;
use crate::common::pagination::PageRequest;
use crate::db::contact_repo::select_contacts;
use crate::db::opportunity_repo::select_opportunities;
use crate::db::repository::{contains_pattern, CrudRepository};
use crate::models::company::{Company, CompanyDetails};
use crate::models::contact::Contact;
use crate::models::opportunity::Opportunity;

#[async_trait]
pub trait CompanyRepository: CrudRepository<Company> {
    /// Busca por trecho do nome, sem diferenciar maiúsculas
    async fn search_by_name(&self, name: &str) -> Result<Vec<Company>, AppError>;

    async fn find_by_industry(&self, industry: &str) -> Result<Vec<Company>, AppError>;

    /// Empresa + contatos + oportunidades (três consultas)
    async fn find_with_contacts(&self, id: i32) -> Result<Option<CompanyDetails>, AppError>;
}

// Serve tanto para o SELECT quanto para o RETURNING (tabela sem JOIN)
const COMPANY_COLUMNS: &str = "id, name, description, industry, phone, email, website, address, \
     city, country, postal_code, annual_revenue, employee_count, \
     created_at, updated_at, created_by, updated_by, is_active, is_deleted";

fn select_companies(filter: &str) -> String {
    format!("SELECT {COMPANY_COLUMNS} FROM companies WHERE is_deleted = FALSE {filter}")
}

#[derive(Clone)]
pub struct PgCompanyRepository {
    pool: PgPool,
}

impl PgCompanyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CrudRepository<Company> for PgCompanyRepository {
    async fn find_all(&self) -> Result<Vec<Company>, AppError> {
        let sql = select_companies("ORDER BY id");
        let companies = sqlx::query_as::<_, Company>(&sql).fetch_all(&self.pool).await?;
        Ok(companies)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Company>, AppError> {
        let sql = select_companies("AND id = $1");
        let company = sqlx::query_as::<_, Company>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(company)
    }

    async fn add(&self, company: &Company) -> Result<Company, AppError> {
        let sql = format!(
            "INSERT INTO companies (name, description, industry, phone, email, website, address, \
                 city, country, postal_code, annual_revenue, employee_count, \
                 created_at, created_by, is_active) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15) \
             RETURNING {COMPANY_COLUMNS}"
        );
        let created = sqlx::query_as::<_, Company>(&sql)
            .bind(&company.name)
            .bind(&company.description)
            .bind(&company.industry)
            .bind(&company.phone)
            .bind(&company.email)
            .bind(&company.website)
            .bind(&company.address)
            .bind(&company.city)
            .bind(&company.country)
            .bind(&company.postal_code)
            .bind(company.annual_revenue)
            .bind(company.employee_count)
            .bind(company.audit.created_at)
            .bind(&company.audit.created_by)
            .bind(company.audit.is_active)
            .fetch_one(&self.pool)
            .await?;
        Ok(created)
    }

    async fn update(&self, company: &Company) -> Result<Company, AppError> {
        let sql = format!(
            "UPDATE companies SET name = $2, description = $3, industry = $4, phone = $5, \
                 email = $6, website = $7, address = $8, city = $9, country = $10, \
                 postal_code = $11, annual_revenue = $12, employee_count = $13, \
                 updated_at = $14, updated_by = $15, is_active = $16, is_deleted = $17 \
             WHERE id = $1 AND is_deleted = FALSE \
             RETURNING {COMPANY_COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Company>(&sql)
            .bind(company.id)
            .bind(&company.name)
            .bind(&company.description)
            .bind(&company.industry)
            .bind(&company.phone)
            .bind(&company.email)
            .bind(&company.website)
            .bind(&company.address)
            .bind(&company.city)
            .bind(&company.country)
            .bind(&company.postal_code)
            .bind(company.annual_revenue)
            .bind(company.employee_count)
            .bind(company.audit.updated_at)
            .bind(&company.audit.updated_by)
            .bind(company.audit.is_active)
            .bind(company.audit.is_deleted)
            .fetch_optional(&self.pool)
            .await?;

        updated.ok_or_else(|| AppError::not_found(format!("Empresa {} não encontrada.", company.id)))
    }

    async fn count(&self) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM companies WHERE is_deleted = FALSE")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn exists(&self, id: i32) -> Result<bool, AppError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM companies WHERE id = $1 AND is_deleted = FALSE)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn find_paged(&self, page: PageRequest) -> Result<Vec<Company>, AppError> {
        let sql = select_companies("ORDER BY id LIMIT $1 OFFSET $2");
        let companies = sqlx::query_as::<_, Company>(&sql)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;
        Ok(companies)
    }
}

#[async_trait]
impl CompanyRepository for PgCompanyRepository {
    async fn search_by_name(&self, name: &str) -> Result<Vec<Company>, AppError> {
        let sql = select_companies("AND name ILIKE $1 ESCAPE '\\' ORDER BY id");
        let companies = sqlx::query_as::<_, Company>(&sql)
            .bind(contains_pattern(name))
            .fetch_all(&self.pool)
            .await?;
        Ok(companies)
    }

    async fn find_by_industry(&self, industry: &str) -> Result<Vec<Company>, AppError> {
        let sql = select_companies("AND industry = $1 ORDER BY id");
        let companies = sqlx::query_as::<_, Company>(&sql)
            .bind(industry)
            .fetch_all(&self.pool)
            .await?;
        Ok(companies)
    }

    async fn find_with_contacts(&self, id: i32) -> Result<Option<CompanyDetails>, AppError> {
        let Some(company) = self.find_by_id(id).await? else {
            return Ok(None);
        };

        let contacts_sql = select_contacts("AND c.company_id = $1 ORDER BY c.id");
        let contacts = sqlx::query_as::<_, Contact>(&contacts_sql)
            .bind(id)
            .fetch_all(&self.pool)
            .await?;

        let opportunities_sql = select_opportunities("AND o.company_id = $1 ORDER BY o.id");
        let opportunities = sqlx::query_as::<_, Opportunity>(&opportunities_sql)
            .bind(id)
            .fetch_all(&self.pool)
            .await?;

        Ok(Some(CompanyDetails {
            company,
            contacts,
            opportunities,
        }))
    }
}
