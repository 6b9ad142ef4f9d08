// src/services/contact_service.rs

use std::sync::Arc;

use crate::{
    common::{error::AppError, pagination::PageRequest},
    db::{CompanyRepository, ContactRepository},
    models::audit::Audit,
    models::company::Company,
    models::contact::{Contact, ContactPayload},
    services::{ensure_optional, list_page},
};

#[derive(Clone)]
pub struct ContactService {
    contacts: Arc<dyn ContactRepository>,
    companies: Arc<dyn CompanyRepository>,
}

impl ContactService {
    pub fn new(contacts: Arc<dyn ContactRepository>, companies: Arc<dyn CompanyRepository>) -> Self {
        Self { contacts, companies }
    }

    pub async fn list(&self, page: Option<PageRequest>) -> Result<Vec<Contact>, AppError> {
        list_page(&*self.contacts, page).await
    }

    pub async fn get(&self, id: i32) -> Result<Contact, AppError> {
        self.contacts
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Contato {} não encontrado.", id)))
    }

    pub async fn create(&self, payload: ContactPayload, actor: &str) -> Result<Contact, AppError> {
        self.check_company_reference(payload.company_id).await?;

        let mut contact = Contact {
            audit: Audit::created(actor),
            ..Default::default()
        };
        payload.apply(&mut contact);

        let created = self.contacts.add(&contact).await?;
        self.sync_primary(&created, actor).await?;
        Ok(created)
    }

    pub async fn update(&self, id: i32, payload: ContactPayload, actor: &str) -> Result<Contact, AppError> {
        let mut contact = self.get(id).await?;
        self.check_company_reference(payload.company_id).await?;

        payload.apply(&mut contact);
        contact.audit.touch(actor);

        let updated = self.contacts.update(&contact).await?;
        self.sync_primary(&updated, actor).await?;
        Ok(updated)
    }

    pub async fn delete(&self, id: i32, actor: &str) -> Result<(), AppError> {
        let mut contact = self.get(id).await?;
        contact.audit.mark_deleted(actor);
        self.contacts.update(&contact).await?;
        Ok(())
    }

    pub async fn find_by_company(&self, company_id: i32) -> Result<Vec<Contact>, AppError> {
        self.contacts.find_by_company(company_id).await
    }

    pub async fn primary_contact(&self, company_id: i32) -> Result<Contact, AppError> {
        self.ensure_company(company_id).await?;
        self.contacts
            .find_primary_contact(company_id)
            .await?
            .ok_or_else(|| AppError::not_found("A empresa não tem contato principal."))
    }

    pub async fn search_by_name(&self, name: &str) -> Result<Vec<Contact>, AppError> {
        self.contacts.search_by_name(name.trim()).await
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Contact, AppError> {
        self.contacts
            .find_by_email(email)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Nenhum contato com o e-mail {}.", email)))
    }

    /// Troca o contato principal da empresa. O contato precisa ser dela.
    pub async fn set_primary_contact(
        &self,
        company_id: i32,
        contact_id: i32,
        actor: &str,
    ) -> Result<(), AppError> {
        self.ensure_company(company_id).await?;
        let contact = self.get(contact_id).await?;

        if contact.company_id != Some(company_id) {
            return Err(AppError::bad_request("O contato não pertence a esta empresa."));
        }

        self.contacts
            .replace_primary_contact(company_id, contact_id, actor)
            .await?;
        tracing::info!(
            "Contato principal da empresa {}: {} (por {})",
            company_id,
            contact.full_name(),
            actor
        );
        Ok(())
    }

    // Um contato salvo como principal derruba o anterior
    async fn sync_primary(&self, contact: &Contact, actor: &str) -> Result<(), AppError> {
        if let (true, Some(company_id)) = (contact.is_primary_contact, contact.company_id) {
            self.contacts
                .replace_primary_contact(company_id, contact.id, actor)
                .await?;
        }
        Ok(())
    }

    async fn check_company_reference(&self, company_id: Option<i32>) -> Result<(), AppError> {
        ensure_optional::<Company, _>(&*self.companies, company_id, "A empresa informada não existe.")
            .await
    }

    async fn ensure_company(&self, company_id: i32) -> Result<(), AppError> {
        if !self.companies.exists(company_id).await? {
            return Err(AppError::not_found(format!("Empresa {} não encontrada.", company_id)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{repos, seed_company, ACTOR};

    fn payload(first_name: &str, company_id: Option<i32>, primary: bool) -> ContactPayload {
        ContactPayload {
            first_name: first_name.to_string(),
            last_name: "Teste".to_string(),
            email: Some(format!("{}@cliente.com", first_name.to_lowercase())),
            company_id,
            is_primary_contact: primary,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn setting_b_primary_clears_a() {
        let (repos, _) = repos();
        let service = ContactService::new(repos.contacts.clone(), repos.companies.clone());
        let acme = seed_company(&repos, "Acme").await;
        let a = service.create(payload("A", Some(acme.id), true), ACTOR).await.unwrap();
        let b = service.create(payload("B", Some(acme.id), false), ACTOR).await.unwrap();

        service.set_primary_contact(acme.id, b.id, ACTOR).await.unwrap();

        assert!(!service.get(a.id).await.unwrap().is_primary_contact);
        assert!(service.get(b.id).await.unwrap().is_primary_contact);
        assert_eq!(service.primary_contact(acme.id).await.unwrap().id, b.id);
    }

    #[tokio::test]
    async fn creating_a_new_primary_replaces_the_old_one() {
        let (repos, _) = repos();
        let service = ContactService::new(repos.contacts.clone(), repos.companies.clone());
        let acme = seed_company(&repos, "Acme").await;
        let a = service.create(payload("A", Some(acme.id), true), ACTOR).await.unwrap();
        let b = service.create(payload("B", Some(acme.id), true), ACTOR).await.unwrap();

        let primaries: Vec<i32> = service
            .find_by_company(acme.id)
            .await
            .unwrap()
            .into_iter()
            .filter(|c| c.is_primary_contact)
            .map(|c| c.id)
            .collect();
        assert_eq!(primaries, vec![b.id]);
        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn primary_contact_must_belong_to_the_company() {
        let (repos, _) = repos();
        let service = ContactService::new(repos.contacts.clone(), repos.companies.clone());
        let acme = seed_company(&repos, "Acme").await;
        let other = seed_company(&repos, "Outra").await;
        let stranger = service.create(payload("C", Some(other.id), false), ACTOR).await.unwrap();

        assert!(matches!(
            service.set_primary_contact(acme.id, stranger.id, ACTOR).await,
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            service.set_primary_contact(acme.id, 999, ACTOR).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            service.primary_contact(acme.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn unknown_company_is_a_bad_request() {
        let (repos, _) = repos();
        let service = ContactService::new(repos.contacts.clone(), repos.companies.clone());

        let err = service.create(payload("A", Some(42), false), ACTOR).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn search_matches_the_full_name() {
        let (repos, _) = repos();
        let service = ContactService::new(repos.contacts.clone(), repos.companies.clone());
        service.create(payload("Joana", None, false), ACTOR).await.unwrap();
        service.create(payload("Pedro", None, false), ACTOR).await.unwrap();

        let found = service.search_by_name("joana teste").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(service.find_by_email("pedro@cliente.com").await.unwrap().first_name, "Pedro");
    }
}
