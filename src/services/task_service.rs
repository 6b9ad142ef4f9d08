// src/services/task_service.rs

use std::sync::Arc;

use chrono::{NaiveTime, Utc};

use crate::{
    common::{error::AppError, pagination::PageRequest},
    db::{
        CompanyRepository, ContactRepository, OpportunityRepository, Repositories,
        TaskRepository, UserRepository,
    },
    models::audit::Audit,
    models::auth::User,
    models::company::Company,
    models::contact::Contact,
    models::opportunity::Opportunity,
    models::task::{
        CommentPayload, CrmTask, StatusCount, TaskComment, TaskPayload, TaskStatus, TaskWithComments,
    },
    services::{ensure_found, ensure_optional, list_page},
};

const ALL_STATUSES: [TaskStatus; 4] = [
    TaskStatus::Pending,
    TaskStatus::InProgress,
    TaskStatus::Completed,
    TaskStatus::Cancelled,
];

#[derive(Clone)]
pub struct TaskService {
    tasks: Arc<dyn TaskRepository>,
    users: Arc<dyn UserRepository>,
    companies: Arc<dyn CompanyRepository>,
    contacts: Arc<dyn ContactRepository>,
    opportunities: Arc<dyn OpportunityRepository>,
}

impl TaskService {
    pub fn new(repos: &Repositories) -> Self {
        Self {
            tasks: repos.tasks.clone(),
            users: repos.users.clone(),
            companies: repos.companies.clone(),
            contacts: repos.contacts.clone(),
            opportunities: repos.opportunities.clone(),
        }
    }

    pub async fn list(&self, page: Option<PageRequest>) -> Result<Vec<CrmTask>, AppError> {
        list_page(&*self.tasks, page).await
    }

    pub async fn get(&self, id: i32) -> Result<CrmTask, AppError> {
        self.tasks
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Tarefa {} não encontrada.", id)))
    }

    pub async fn create(&self, payload: TaskPayload, actor: &str) -> Result<CrmTask, AppError> {
        self.check_references(&payload).await?;

        let mut task = CrmTask {
            audit: Audit::created(actor),
            ..Default::default()
        };
        payload.apply(&mut task);
        if task.status == TaskStatus::Completed {
            task.completed_at = Some(Utc::now());
        }
        self.tasks.add(&task).await
    }

    // O status muda livremente aqui; só o `complete` força Completed
    pub async fn update(&self, id: i32, payload: TaskPayload, actor: &str) -> Result<CrmTask, AppError> {
        let mut task = self.get(id).await?;
        self.check_references(&payload).await?;

        payload.apply(&mut task);
        match task.status {
            TaskStatus::Completed if task.completed_at.is_none() => task.completed_at = Some(Utc::now()),
            TaskStatus::Completed => {}
            _ => task.completed_at = None,
        }
        task.audit.touch(actor);
        self.tasks.update(&task).await
    }

    pub async fn delete(&self, id: i32, actor: &str) -> Result<(), AppError> {
        let mut task = self.get(id).await?;
        task.audit.mark_deleted(actor);
        self.tasks.update(&task).await?;
        Ok(())
    }

    /// Conclui a tarefa seja qual for o status atual
    pub async fn complete(&self, id: i32, actor: &str) -> Result<(), AppError> {
        let mut task = self.get(id).await?;
        task.status = TaskStatus::Completed;
        task.completed_at = Some(Utc::now());
        task.audit.touch(actor);
        self.tasks.update(&task).await?;
        tracing::info!("Tarefa {} concluída por {}", id, actor);
        Ok(())
    }

    pub async fn find_by_user(&self, user_id: i32) -> Result<Vec<CrmTask>, AppError> {
        self.tasks.find_by_user(user_id).await
    }

    pub async fn find_by_status(&self, status: TaskStatus) -> Result<Vec<CrmTask>, AppError> {
        self.tasks.find_by_status(status).await
    }

    pub async fn overdue(&self) -> Result<Vec<CrmTask>, AppError> {
        self.tasks.find_overdue(Utc::now()).await
    }

    // "Hoje" é o dia corrente em UTC
    pub async fn due_today(&self) -> Result<Vec<CrmTask>, AppError> {
        let day_start = Utc::now().date_naive().and_time(NaiveTime::MIN).and_utc();
        self.tasks.find_due_today(day_start).await
    }

    /// Tarefa com o histórico de comentários
    pub async fn details(&self, id: i32) -> Result<TaskWithComments, AppError> {
        self.tasks
            .find_with_comments(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Tarefa {} não encontrada.", id)))
    }

    pub async fn comments(&self, task_id: i32) -> Result<Vec<TaskComment>, AppError> {
        self.get(task_id).await?;
        self.tasks.find_comments(task_id).await
    }

    pub async fn add_comment(
        &self,
        task_id: i32,
        payload: CommentPayload,
        author: &User,
    ) -> Result<TaskComment, AppError> {
        self.get(task_id).await?;

        let comment = TaskComment {
            comment: payload.comment,
            task_id,
            user_id: author.id,
            user_name: Some(author.full_name()),
            audit: Audit::created(&author.email),
            ..Default::default()
        };
        self.tasks.add_comment(&comment).await
    }

    /// Quantidade de tarefas em cada status (todos os status aparecem)
    pub async fn status_summary(&self) -> Result<Vec<StatusCount>, AppError> {
        let tasks = self.tasks.find_all().await?;
        Ok(ALL_STATUSES
            .into_iter()
            .map(|status| StatusCount {
                status,
                count: tasks.iter().filter(|t| t.status == status).count() as i64,
            })
            .collect())
    }

    async fn check_references(&self, payload: &TaskPayload) -> Result<(), AppError> {
        ensure_found(
            self.users.exists(payload.assigned_user_id).await?,
            "O usuário responsável não existe.",
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
