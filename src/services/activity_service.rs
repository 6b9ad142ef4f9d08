// src/services/activity_service.rs

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::{
    common::{error::AppError, pagination::PageRequest},
    db::{
        ActivityRepository, CompanyRepository, ContactRepository,
        OpportunityRepository, Repositories, UserRepository,
    },
    models::activity::{Activity, ActivityPayload, ActivityType, TypeCount},
    models::audit::Audit,
    models::company::Company,
    models::contact::Contact,
    models::opportunity::Opportunity,
    services::{ensure_found, ensure_optional, list_page},
};

const ALL_TYPES: [ActivityType; 5] = [
    ActivityType::Call,
    ActivityType::Meeting,
    ActivityType::Email,
    ActivityType::Note,
    ActivityType::Task,
];

#[derive(Clone)]
pub struct ActivityService {
    activities: Arc<dyn ActivityRepository>,
    users: Arc<dyn UserRepository>,
    companies: Arc<dyn CompanyRepository>,
    contacts: Arc<dyn ContactRepository>,
    opportunities: Arc<dyn OpportunityRepository>,
}

impl ActivityService {
    pub fn new(repos: &Repositories) -> Self {
        Self {
            activities: repos.activities.clone(),
            users: repos.users.clone(),
            companies: repos.companies.clone(),
            contacts: repos.contacts.clone(),
            opportunities: repos.opportunities.clone(),
        }
    }

    pub async fn list(&self, page: Option<PageRequest>) -> Result<Vec<Activity>, AppError> {
        list_page(&*self.activities, page).await
    }

    pub async fn get(&self, id: i32) -> Result<Activity, AppError> {
        self.activities
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Atividade {} não encontrada.", id)))
    }

    pub async fn create(&self, payload: ActivityPayload, actor: &str) -> Result<Activity, AppError> {
        self.check_references(&payload).await?;

        let mut activity = Activity {
            audit: Audit::created(actor),
            ..Default::default()
        };
        payload.apply(&mut activity);
        self.activities.add(&activity).await
    }

    pub async fn update(&self, id: i32, payload: ActivityPayload, actor: &str) -> Result<Activity, AppError> {
        let mut activity = self.get(id).await?;
        self.check_references(&payload).await?;

        payload.apply(&mut activity);
        activity.audit.touch(actor);
        self.activities.update(&activity).await
    }

    pub async fn delete(&self, id: i32, actor: &str) -> Result<(), AppError> {
        let mut activity = self.get(id).await?;
        activity.audit.mark_deleted(actor);
        self.activities.update(&activity).await?;
        Ok(())
    }

    pub async fn find_by_user(&self, user_id: i32) -> Result<Vec<Activity>, AppError> {
        self.activities.find_by_user(user_id).await
    }

    pub async fn find_by_company(&self, company_id: i32) -> Result<Vec<Activity>, AppError> {
        self.activities.find_by_company(company_id).await
    }

    pub async fn find_by_contact(&self, contact_id: i32) -> Result<Vec<Activity>, AppError> {
        self.activities.find_by_contact(contact_id).await
    }

    pub async fn find_by_opportunity(&self, opportunity_id: i32) -> Result<Vec<Activity>, AppError> {
        self.activities.find_by_opportunity(opportunity_id).await
    }

    pub async fn find_by_date_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Activity>, AppError> {
        if start > end {
            return Err(AppError::bad_request("O início do período deve ser anterior ao fim."));
        }
        self.activities.find_by_date_range(start, end).await
    }

    pub async fn upcoming(&self, user_id: i32) -> Result<Vec<Activity>, AppError> {
        self.activities.find_upcoming(user_id, Utc::now()).await
    }

    pub async fn type_summary(&self) -> Result<Vec<TypeCount>, AppError> {
        let activities = self.activities.find_all().await?;
        Ok(ALL_TYPES
            .into_iter()
            .map(|activity_type| TypeCount {
                activity_type,
                count: activities
                    .iter()
                    .filter(|a| a.activity_type == activity_type)
                    .count() as i64,
            })
            .collect())
    }

    async fn check_references(&self, payload: &ActivityPayload) -> Result<(), AppError> {
        ensure_found(
            self.users.exists(payload.user_id).await?,
            "O usuário informado não existe.",
        )?;
        ensure_optional::<Company, _>(&*self.companies, payload.company_id, "A empresa informada não existe.")
            .await?;
        ensure_optional::<Contact, _>(&*self.contacts, payload.contact_id, "O contato informado não existe.")
            .await?;
        ensure_optional::<Opportunity, _>(
            &*self.opportunities,
            payload.opportunity_id,
            "A oportunidade informada não existe.",
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{repos, seed_company, seed_user, ACTOR};
    use chrono::Duration;

    fn payload(user_id: i32, activity_type: ActivityType, scheduled_at: Option<DateTime<Utc>>) -> ActivityPayload {
        ActivityPayload {
            subject: "Reunião".to_string(),
            activity_type,
            scheduled_at,
            user_id,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn date_range_is_inclusive_and_ordered_by_schedule() {
        let (repos, _) = repos();
        let service = ActivityService::new(&repos);
        let ana = seed_user(&repos, "ana@crm.local").await;
        let base = Utc::now();

        let late = service
            .create(payload(ana.id, ActivityType::Call, Some(base + Duration::hours(5))), ACTOR)
            .await
            .unwrap();
        let early = service
            .create(payload(ana.id, ActivityType::Meeting, Some(base)), ACTOR)
            .await
            .unwrap();
        service
            .create(payload(ana.id, ActivityType::Email, Some(base + Duration::days(3))), ACTOR)
            .await
            .unwrap();

        let found = service
            .find_by_date_range(base, base + Duration::hours(5))
            .await
            .unwrap();
        let ids: Vec<i32> = found.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![early.id, late.id]);

        let inverted = service.find_by_date_range(base + Duration::hours(1), base).await;
        assert!(matches!(inverted, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn upcoming_only_lists_future_activities_of_the_user() {
        let (repos, _) = repos();
        let service = ActivityService::new(&repos);
        let ana = seed_user(&repos, "ana@crm.local").await;
        let bia = seed_user(&repos, "bia@crm.local").await;
        let now = Utc::now();

        service
            .create(payload(ana.id, ActivityType::Call, Some(now - Duration::days(1))), ACTOR)
            .await
            .unwrap();
        let later = service
            .create(payload(ana.id, ActivityType::Call, Some(now + Duration::days(2))), ACTOR)
            .await
            .unwrap();
        let sooner = service
            .create(payload(ana.id, ActivityType::Note, Some(now + Duration::days(1))), ACTOR)
            .await
            .unwrap();
        service
            .create(payload(bia.id, ActivityType::Call, Some(now + Duration::days(1))), ACTOR)
            .await
            .unwrap();

        let ids: Vec<i32> = service.upcoming(ana.id).await.unwrap().iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![sooner.id, later.id]);
    }

    #[tokio::test]
    async fn summary_and_references() {
        let (repos, _) = repos();
        let service = ActivityService::new(&repos);
        let ana = seed_user(&repos, "ana@crm.local").await;
        let acme = seed_company(&repos, "Acme").await;

        let mut linked = payload(ana.id, ActivityType::Meeting, None);
        linked.company_id = Some(acme.id);
        service.create(linked, ACTOR).await.unwrap();
        service.create(payload(ana.id, ActivityType::Meeting, None), ACTOR).await.unwrap();

        assert_eq!(service.find_by_company(acme.id).await.unwrap().len(), 1);

        let summary = service.type_summary().await.unwrap();
        assert_eq!(summary.len(), 5);
        assert_eq!(summary[1], TypeCount { activity_type: ActivityType::Meeting, count: 2 });

        let mut dangling = payload(ana.id, ActivityType::Call, None);
        dangling.opportunity_id = Some(77);
        assert!(matches!(
            service.create(dangling, ACTOR).await,
            Err(AppError::BadRequest(_))
        ));
    }
}
