// src/services/opportunity_service.rs

use std::sync::Arc;

use rust_decimal::Decimal;

use crate::{
    common::{error::AppError, pagination::PageRequest},
    db::{
        CompanyRepository, ContactRepository, OpportunityRepository, Repositories,
        SalesStageRepository, UserRepository,
    },
    models::audit::Audit,
    models::contact::Contact,
    models::opportunity::{Opportunity, OpportunityPayload, SalesStage, StageValue, TotalValueResponse},
    services::{ensure_found, ensure_optional, list_page},
};

#[derive(Clone)]
pub struct OpportunityService {
    opportunities: Arc<dyn OpportunityRepository>,
    stages: Arc<dyn SalesStageRepository>,
    companies: Arc<dyn CompanyRepository>,
    contacts: Arc<dyn ContactRepository>,
    users: Arc<dyn UserRepository>,
}

impl OpportunityService {
    pub fn new(repos: &Repositories) -> Self {
        Self {
            opportunities: repos.opportunities.clone(),
            stages: repos.stages.clone(),
            companies: repos.companies.clone(),
            contacts: repos.contacts.clone(),
            users: repos.users.clone(),
        }
    }

    pub async fn list(&self, page: Option<PageRequest>) -> Result<Vec<Opportunity>, AppError> {
        list_page(&*self.opportunities, page).await
    }

    pub async fn get(&self, id: i32) -> Result<Opportunity, AppError> {
        self.opportunities
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Oportunidade {} não encontrada.", id)))
    }

    pub async fn create(&self, payload: OpportunityPayload, actor: &str) -> Result<Opportunity, AppError> {
        self.check_references(&payload).await?;

        let mut opportunity = Opportunity {
            audit: Audit::created(actor),
            ..Default::default()
        };
        payload.apply(&mut opportunity);
        self.opportunities.add(&opportunity).await
    }

    pub async fn update(
        &self,
        id: i32,
        payload: OpportunityPayload,
        actor: &str,
    ) -> Result<Opportunity, AppError> {
        let mut opportunity = self.get(id).await?;
        self.check_references(&payload).await?;

        payload.apply(&mut opportunity);
        opportunity.audit.touch(actor);
        self.opportunities.update(&opportunity).await
    }

    pub async fn delete(&self, id: i32, actor: &str) -> Result<(), AppError> {
        let mut opportunity = self.get(id).await?;
        opportunity.audit.mark_deleted(actor);
        self.opportunities.update(&opportunity).await?;
        Ok(())
    }

    pub async fn find_by_user(&self, user_id: i32) -> Result<Vec<Opportunity>, AppError> {
        self.opportunities.find_by_user(user_id).await
    }

    pub async fn find_by_stage(&self, stage_id: i32) -> Result<Vec<Opportunity>, AppError> {
        self.opportunities.find_by_stage(stage_id).await
    }

    pub async fn find_by_company(&self, company_id: i32) -> Result<Vec<Opportunity>, AppError> {
        self.opportunities.find_by_company(company_id).await
    }

    pub async fn total_value_by_user(&self, user_id: i32) -> Result<TotalValueResponse, AppError> {
        let total_value = self.opportunities.total_value_by_user(user_id).await?;
        Ok(TotalValueResponse { user_id, total_value })
    }

    /// Move a oportunidade no funil. Etapa inexistente é 400.
    pub async fn move_to_stage(&self, id: i32, stage_id: i32, actor: &str) -> Result<Opportunity, AppError> {
        let mut opportunity = self.get(id).await?;
        ensure_found(
            self.stages.stage_exists(stage_id).await?,
            "A etapa informada não existe.",
        )?;

        opportunity.stage_id = stage_id;
        opportunity.audit.touch(actor);
        self.opportunities.update(&opportunity).await
    }

    /// Valor somado por etapa, na ordem do funil (etapas vazias entram com zero)
    pub async fn value_by_stage(&self) -> Result<Vec<StageValue>, AppError> {
        let stages = self.stages.list_stages().await?;
        let opportunities = self.opportunities.find_all().await?;

        Ok(stages
            .into_iter()
            .map(|stage| StageValue {
                total_value: opportunities
                    .iter()
                    .filter(|o| o.stage_id == stage.id)
                    .map(|o| o.estimated_value)
                    .sum::<Decimal>(),
                stage_name: stage.name,
            })
            .collect())
    }

    pub async fn list_stages(&self) -> Result<Vec<SalesStage>, AppError> {
        self.stages.list_stages().await
    }

    async fn check_references(&self, payload: &OpportunityPayload) -> Result<(), AppError> {
        ensure_found(
            self.stages.stage_exists(payload.stage_id).await?,
            "A etapa informada não existe.",
        )?;
        ensure_found(
            self.companies.exists(payload.company_id).await?,
            "A empresa informada não existe.",
        )?;
        ensure_found(
            self.users.exists(payload.assigned_user_id).await?,
            "O usuário responsável não existe.",
        )?;
        ensure_optional::<Contact, _>(&*self.contacts, payload.contact_id, "O contato informado não existe.")
            .await
    }
}
