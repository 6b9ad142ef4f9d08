// src/services/company_service.rs

use std::sync::Arc;

use crate::{
    common::{error::AppError, pagination::PageRequest},
    db::CompanyRepository,
    models::audit::Audit,
    models::company::{Company, CompanyDetails, CompanyPayload},
    services::list_page,
};

#[derive(Clone)]
pub struct CompanyService {
    companies: Arc<dyn CompanyRepository>,
}

impl CompanyService {
    pub fn new(companies: Arc<dyn CompanyRepository>) -> Self {
        Self { companies }
    }

    pub async fn list(&self, page: Option<PageRequest>) -> Result<Vec<Company>, AppError> {
        list_page(&*self.companies, page).await
    }

    pub async fn get(&self, id: i32) -> Result<Company, AppError> {
        self.companies
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Empresa {} não encontrada.", id)))
    }

    pub async fn create(&self, payload: CompanyPayload, actor: &str) -> Result<Company, AppError> {
        let mut company = Company {
            audit: Audit::created(actor),
            ..Default::default()
        };
        payload.apply(&mut company);
        self.companies.add(&company).await
    }

    pub async fn update(&self, id: i32, payload: CompanyPayload, actor: &str) -> Result<Company, AppError> {
        let mut company = self.get(id).await?;
        payload.apply(&mut company);
        company.audit.touch(actor);
        self.companies.update(&company).await
    }

    /// Soft delete: a empresa some das leituras mas a linha fica
    pub async fn delete(&self, id: i32, actor: &str) -> Result<(), AppError> {
        let mut company = self.get(id).await?;
        company.audit.mark_deleted(actor);
        self.companies.update(&company).await?;
        tracing::info!("Empresa {} excluída por {}", id, actor);
        Ok(())
    }

    pub async fn search_by_name(&self, name: &str) -> Result<Vec<Company>, AppError> {
        self.companies.search_by_name(name.trim()).await
    }

    pub async fn find_by_industry(&self, industry: &str) -> Result<Vec<Company>, AppError> {
        self.companies.find_by_industry(industry).await
    }

    pub async fn count(&self) -> Result<i64, AppError> {
        self.companies.count().await
    }

    pub async fn details(&self, id: i32) -> Result<CompanyDetails, AppError> {
        self.companies
            .find_with_contacts(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Empresa {} não encontrada.", id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{repos, seed_company, ACTOR};

    fn payload(name: &str) -> CompanyPayload {
        CompanyPayload {
            name: name.to_string(),
            industry: Some("Tecnologia".to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn soft_deleted_company_is_hidden_but_kept() {
        let (repos, store) = repos();
        let service = CompanyService::new(repos.companies.clone());
        let acme = service.create(payload("Acme"), ACTOR).await.unwrap();

        service.delete(acme.id, ACTOR).await.unwrap();

        assert!(service.list(None).await.unwrap().is_empty());
        assert!(matches!(service.get(acme.id).await, Err(AppError::NotFound(_))));
        assert_eq!(service.count().await.unwrap(), 0);

        let raw: Company = store.raw(acme.id).unwrap();
        assert!(raw.audit.is_deleted);

        // Excluir de novo é 404
        assert!(matches!(service.delete(acme.id, ACTOR).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn update_stamps_the_author() {
        let (repos, _) = repos();
        let service = CompanyService::new(repos.companies.clone());
        let acme = service.create(payload("Acme"), ACTOR).await.unwrap();
        assert_eq!(acme.audit.created_by, ACTOR);
        assert!(acme.audit.updated_at.is_none());

        let updated = service.update(acme.id, payload("Acme S.A."), "outra@crm.local").await.unwrap();

        assert_eq!(updated.name, "Acme S.A.");
        assert_eq!(updated.audit.updated_by.as_deref(), Some("outra@crm.local"));
        assert!(updated.audit.updated_at.is_some());

        let missing = service.update(999, payload("X"), ACTOR).await;
        assert!(matches!(missing, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn pages_concatenate_into_the_full_list() {
        let (repos, _) = repos();
        let service = CompanyService::new(repos.companies.clone());
        for name in ["A", "B", "C", "D", "E", "F", "G"] {
            seed_company(&repos, name).await;
        }

        let full = service.list(None).await.unwrap();
        let mut paged = Vec::new();
        for page in 1..=3 {
            let chunk = service.list(Some(PageRequest::new(page, 3))).await.unwrap();
            assert!(chunk.len() <= 3);
            paged.extend(chunk);
        }

        let full_ids: Vec<i32> = full.iter().map(|c| c.id).collect();
        let paged_ids: Vec<i32> = paged.iter().map(|c| c.id).collect();
        assert_eq!(full_ids.len(), 7);
        assert_eq!(paged_ids, full_ids);
    }

    #[tokio::test]
    async fn search_ignores_case() {
        let (repos, _) = repos();
        let service = CompanyService::new(repos.companies.clone());
        seed_company(&repos, "Padaria Central").await;
        seed_company(&repos, "Oficina Norte").await;

        let found = service.search_by_name("central").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Padaria Central");
    }

    #[tokio::test]
    async fn percent_and_underscore_are_literal_in_search() {
        let (repos, _) = repos();
        let service = CompanyService::new(repos.companies.clone());
        seed_company(&repos, "Liquida 50% Off").await;
        seed_company(&repos, "Loja 500").await;
        seed_company(&repos, "Mercado_Sul").await;
        seed_company(&repos, "Mercado Sul").await;

        let found = service.search_by_name("50%").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Liquida 50% Off");

        let found = service.search_by_name("o_s").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Mercado_Sul");
    }
}
