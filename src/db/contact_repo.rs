// src/db/contact_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;

use crate::common::error::AppError;
use crate::common::pagination::PageRequest;
use crate::db::repository::{contains_pattern, CrudRepository};
use crate::models::contact::Contact;

#[async_trait]
pub trait ContactRepository: CrudRepository<Contact> {
    async fn find_by_company(&self, company_id: i32) -> Result<Vec<Contact>, AppError>;

    async fn find_primary_contact(&self, company_id: i32) -> Result<Option<Contact>, AppError>;

    /// Busca em "nome sobrenome"
    async fn search_by_name(&self, name: &str) -> Result<Vec<Contact>, AppError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<Contact>, AppError>;

    /// Deixa `contact_id` como único contato principal da empresa, num único UPDATE
    async fn replace_primary_contact(
        &self,
        company_id: i32,
        contact_id: i32,
        actor: &str,
    ) -> Result<(), AppError>;
}

const CONTACT_COLUMNS: &str = "c.id, c.first_name, c.last_name, c.email, c.phone, c.mobile, \
     c.position, c.department, c.is_primary_contact, c.company_id, \
     co.name AS company_name, \
     c.created_at, c.updated_at, c.created_by, c.updated_by, c.is_active, c.is_deleted";

const CONTACT_JOINS: &str = "LEFT JOIN companies co ON co.id = c.company_id";

pub(crate) fn select_contacts(filter: &str) -> String {
    format!("SELECT {CONTACT_COLUMNS} FROM contacts c {CONTACT_JOINS} WHERE c.is_deleted = FALSE {filter}")
}

#[derive(Clone)]
pub struct PgContactRepository {
    pool: PgPool,
}

impl PgContactRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CrudRepository<Contact> for PgContactRepository {
    async fn find_all(&self) -> Result<Vec<Contact>, AppError> {
        let sql = select_contacts("ORDER BY c.id");
        let contacts = sqlx::query_as::<_, Contact>(&sql).fetch_all(&self.pool).await?;
        Ok(contacts)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Contact>, AppError> {
        let sql = select_contacts("AND c.id = $1");
        let contact = sqlx::query_as::<_, Contact>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(contact)
    }

    // O CTE devolve a linha nova já com o nome da empresa
    async fn add(&self, contact: &Contact) -> Result<Contact, AppError> {
        let sql = format!(
            "WITH c AS ( \
                 INSERT INTO contacts (first_name, last_name, email, phone, mobile, position, \
                     department, is_primary_contact, company_id, created_at, created_by, is_active) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
                 RETURNING *) \
             SELECT {CONTACT_COLUMNS} FROM c {CONTACT_JOINS}"
        );
        let created = sqlx::query_as::<_, Contact>(&sql)
            .bind(&contact.first_name)
            .bind(&contact.last_name)
            .bind(&contact.email)
            .bind(&contact.phone)
            .bind(&contact.mobile)
            .bind(&contact.position)
            .bind(&contact.department)
            .bind(contact.is_primary_contact)
            .bind(contact.company_id)
            .bind(contact.audit.created_at)
            .bind(&contact.audit.created_by)
            .bind(contact.audit.is_active)
            .fetch_one(&self.pool)
            .await?;
        Ok(created)
    }

    async fn update(&self, contact: &Contact) -> Result<Contact, AppError> {
        let sql = format!(
            "WITH c AS ( \
                 UPDATE contacts SET first_name = $2, last_name = $3, email = $4, phone = $5, \
                     mobile = $6, position = $7, department = $8, is_primary_contact = $9, \
                     company_id = $10, updated_at = $11, updated_by = $12, is_active = $13, \
                     is_deleted = $14 \
                 WHERE id = $1 AND is_deleted = FALSE \
                 RETURNING *) \
             SELECT {CONTACT_COLUMNS} FROM c {CONTACT_JOINS}"
        );
        let updated = sqlx::query_as::<_, Contact>(&sql)
            .bind(contact.id)
            .bind(&contact.first_name)
            .bind(&contact.last_name)
            .bind(&contact.email)
            .bind(&contact.phone)
            .bind(&contact.mobile)
            .bind(&contact.position)
            .bind(&contact.department)
            .bind(contact.is_primary_contact)
            .bind(contact.company_id)
            .bind(contact.audit.updated_at)
            .bind(&contact.audit.updated_by)
            .bind(contact.audit.is_active)
            .bind(contact.audit.is_deleted)
            .fetch_optional(&self.pool)
            .await?;

        updated.ok_or_else(|| AppError::not_found(format!("Contato {} não encontrado.", contact.id)))
    }

    async fn count(&self) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM contacts WHERE is_deleted = FALSE")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn exists(&self, id: i32) -> Result<bool, AppError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM contacts WHERE id = $1 AND is_deleted = FALSE)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn find_paged(&self, page: PageRequest) -> Result<Vec<Contact>, AppError> {
        let sql = select_contacts("ORDER BY c.id LIMIT $1 OFFSET $2");
        let contacts = sqlx::query_as::<_, Contact>(&sql)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;
        Ok(contacts)
    }
}

#[async_trait]
impl ContactRepository for PgContactRepository {
    async fn find_by_company(&self, company_id: i32) -> Result<Vec<Contact>, AppError> {
        let sql = select_contacts("AND c.company_id = $1 ORDER BY c.id");
        let contacts = sqlx::query_as::<_, Contact>(&sql)
            .bind(company_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(contacts)
    }

    async fn find_primary_contact(&self, company_id: i32) -> Result<Option<Contact>, AppError> {
        let sql = select_contacts("AND c.company_id = $1 AND c.is_primary_contact = TRUE ORDER BY c.id LIMIT 1");
        let contact = sqlx::query_as::<_, Contact>(&sql)
            .bind(company_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(contact)
    }

    async fn search_by_name(&self, name: &str) -> Result<Vec<Contact>, AppError> {
        let sql = select_contacts(
            "AND (c.first_name || ' ' || c.last_name) ILIKE $1 ESCAPE '\\' ORDER BY c.id",
        );
        let contacts = sqlx::query_as::<_, Contact>(&sql)
            .bind(contains_pattern(name))
            .fetch_all(&self.pool)
            .await?;
        Ok(contacts)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Contact>, AppError> {
        let sql = select_contacts("AND c.email = $1 ORDER BY c.id LIMIT 1");
        let contact = sqlx::query_as::<_, Contact>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(contact)
    }

    // Uma instrução só: o antigo principal e o novo mudam juntos
    async fn replace_primary_contact(
        &self,
        company_id: i32,
        contact_id: i32,
        actor: &str,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE contacts
            SET is_primary_contact = (id = $2), updated_at = NOW(), updated_by = $3
            WHERE company_id = $1
              AND is_deleted = FALSE
              AND (is_primary_contact = TRUE OR id = $2)
            "#,
        )
        .bind(company_id)
        .bind(contact_id)
        .bind(actor)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
