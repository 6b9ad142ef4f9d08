// src/services/dashboard_service.rs

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;

use crate::{
    common::error::AppError,
    db::{
        CompanyRepository, ContactRepository, OpportunityRepository, Repositories,
        TaskRepository,
    },
    models::dashboard::DashboardSummary,
    models::task::TaskStatus,
};

#[derive(Clone)]
pub struct DashboardService {
    companies: Arc<dyn CompanyRepository>,
    contacts: Arc<dyn ContactRepository>,
    opportunities: Arc<dyn OpportunityRepository>,
    tasks: Arc<dyn TaskRepository>,
}

impl DashboardService {
    pub fn new(repos: &Repositories) -> Self {
        Self {
            companies: repos.companies.clone(),
            contacts: repos.contacts.clone(),
            opportunities: repos.opportunities.clone(),
            tasks: repos.tasks.clone(),
        }
    }

    pub async fn summary(&self) -> Result<DashboardSummary, AppError> {
        let (total_companies, total_contacts, opportunities, tasks) = tokio::try_join!(
            self.companies.count(),
            self.contacts.count(),
            self.opportunities.find_all(),
            self.tasks.find_all(),
        )?;

        let now = Utc::now();
        Ok(DashboardSummary {
            total_companies,
            total_contacts,
            total_opportunities: opportunities.len() as i64,
            total_tasks: tasks.len() as i64,
            completed_tasks: tasks.iter().filter(|t| t.status == TaskStatus::Completed).count() as i64,
            overdue_tasks: tasks.iter().filter(|t| t.is_overdue(now)).count() as i64,
            total_opportunity_value: opportunities.iter().map(|o| o.estimated_value).sum::<Decimal>(),
        })
    }
}
