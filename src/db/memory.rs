// src/db/memory.rs
//
// Repositórios em memória para os testes de serviço e de rota.
// Seguem as mesmas regras dos repositórios Postgres: soft delete escondido,
// e-mail de usuário único, ordenação estável.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;

use crate::common::error::AppError;
use crate::common::pagination::PageRequest;
use crate::db::activity_repo::ActivityRepository;
use crate::db::company_repo::CompanyRepository;
use crate::db::contact_repo::ContactRepository;
use crate::db::opportunity_repo::{OpportunityRepository, SalesStageRepository};
use crate::db::rbac_repo::RoleRepository;
use crate::db::repository::CrudRepository;
use crate::db::task_repo::TaskRepository;
use crate::db::user_repo::UserRepository;
use crate::models::activity::Activity;
use crate::models::audit::Audit;
use crate::models::auth::User;
use crate::models::company::{Company, CompanyDetails};
use crate::models::contact::Contact;
use crate::models::opportunity::{Opportunity, SalesStage};
use crate::models::rbac::{Permission, Role, RoleGrant, RoleWithPermissions, UserGrants};
use crate::models::task::{CrmTask, TaskComment, TaskStatus, TaskWithComments};

#[derive(Default)]
pub struct Tables {
    pub users: Vec<User>,
    // (user_id, role_id, excluído)
    pub user_roles: Vec<(i32, i32, bool)>,
    pub roles: Vec<Role>,
    pub permissions: Vec<Permission>,
    pub role_permissions: Vec<(i32, i32)>,
    pub companies: Vec<Company>,
    pub contacts: Vec<Contact>,
    pub stages: Vec<SalesStage>,
    pub opportunities: Vec<Opportunity>,
    pub tasks: Vec<CrmTask>,
    pub comments: Vec<TaskComment>,
    pub activities: Vec<Activity>,
}

pub struct InMemoryStore {
    tables: Mutex<Tables>,
}

impl InMemoryStore {
    /// Mesmos cargos, permissões e etapas da migração de seed
    pub fn seeded() -> Arc<Self> {
        let mut tables = Tables::default();

        for (id, name) in [(1, "Admin"), (2, "Manager"), (3, "SalesRep"), (4, "User")] {
            tables.roles.push(Role {
                id,
                name: name.to_string(),
                description: None,
                audit: Audit::created("System"),
            });
        }

        let mut id = 1;
        for module in ["Users", "Companies", "Contacts", "Opportunities", "Tasks"] {
            for verb in ["View", "Create", "Update", "Delete"] {
                tables.permissions.push(Permission {
                    id,
                    name: format!("{module}.{verb}"),
                    description: Some(format!("{verb} {module}")),
                    module: module.to_string(),
                });
                id += 1;
            }
        }
        tables.role_permissions.extend((1..=20).map(|p| (1, p)));
        tables.role_permissions.extend((5..=20).map(|p| (2, p)));

        let stages = [
            ("Lead", "#6c757d"),
            ("Qualified", "#17a2b8"),
            ("Proposal", "#ffc107"),
            ("Negotiation", "#fd7e14"),
            ("Won", "#28a745"),
            ("Lost", "#dc3545"),
        ];
        for (index, (name, color)) in stages.into_iter().enumerate() {
            let order = index as i32 + 1;
            tables.stages.push(SalesStage {
                id: order,
                name: name.to_string(),
                description: None,
                stage_order: order,
                color: color.to_string(),
                is_won: name == "Won",
                is_lost: name == "Lost",
            });
        }

        Arc::new(Self {
            tables: Mutex::new(tables),
        })
    }

    pub fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap()
    }

    /// Lê a linha mesmo se estiver excluída (para conferir o soft delete)
    pub fn raw<T: Row>(&self, id: i32) -> Option<T> {
        let mut tables = self.tables();
        T::table(&mut tables).iter().find(|row| row.id() == id).cloned()
    }
}

// Uma tabela do store
pub trait Row: Clone + Send + Sync + 'static {
    fn id(&self) -> i32;
    fn set_id(&mut self, id: i32);
    fn audit(&self) -> &Audit;
    fn table(tables: &mut Tables) -> &mut Vec<Self>;

    fn sort(rows: &mut [Self]) {
        rows.sort_by_key(|row| row.id());
    }

    fn check_insert(_tables: &Tables, _row: &Self) -> Result<(), AppError> {
        Ok(())
    }
}

macro_rules! row {
    ($entity:ty, $table:ident) => {
        fn id(&self) -> i32 {
            self.id
        }
        fn set_id(&mut self, id: i32) {
            self.id = id;
        }
        fn audit(&self) -> &Audit {
            &self.audit
        }
        fn table(tables: &mut Tables) -> &mut Vec<$entity> {
            &mut tables.$table
        }
    };
}

impl Row for User {
    row!(User, users);

    fn check_insert(tables: &Tables, row: &Self) -> Result<(), AppError> {
        if tables.users.iter().any(|u| u.email == row.email) {
            return Err(AppError::EmailAlreadyExists);
        }
        Ok(())
    }
}

impl Row for Company {
    row!(Company, companies);
}

impl Row for Contact {
    row!(Contact, contacts);
}

impl Row for Opportunity {
    row!(Opportunity, opportunities);
}

impl Row for CrmTask {
    row!(CrmTask, tasks);
}

impl Row for Activity {
    row!(Activity, activities);

    fn sort(rows: &mut [Self]) {
        rows.sort_by(|a, b| {
            b.audit.created_at
                .cmp(&a.audit.created_at)
                .then(b.id.cmp(&a.id))
        });
    }
}

fn live<T: Row>(tables: &mut Tables) -> Vec<T> {
    let mut rows: Vec<T> = T::table(tables)
        .iter()
        .filter(|row| !row.audit().is_deleted)
        .cloned()
        .collect();
    T::sort(&mut rows);
    rows
}

fn live_where<T: Row>(tables: &mut Tables, predicate: impl Fn(&T) -> bool) -> Vec<T> {
    live::<T>(tables).into_iter().filter(|row| predicate(row)).collect()
}

#[async_trait]
impl<T: Row> CrudRepository<T> for InMemoryStore {
    async fn find_all(&self) -> Result<Vec<T>, AppError> {
        Ok(live(&mut self.tables()))
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<T>, AppError> {
        Ok(live::<T>(&mut self.tables()).into_iter().find(|row| row.id() == id))
    }

    async fn add(&self, entity: &T) -> Result<T, AppError> {
        let mut tables = self.tables();
        T::check_insert(&tables, entity)?;

        let table = T::table(&mut tables);
        let next_id = table.iter().map(Row::id).max().unwrap_or(0) + 1;
        let mut row = entity.clone();
        row.set_id(next_id);
        table.push(row.clone());
        Ok(row)
    }

    async fn update(&self, entity: &T) -> Result<T, AppError> {
        let mut tables = self.tables();
        let slot = T::table(&mut tables)
            .iter_mut()
            .find(|row| row.id() == entity.id() && !row.audit().is_deleted)
            .ok_or_else(|| AppError::not_found(format!("Registro {} não encontrado.", entity.id())))?;
        *slot = entity.clone();
        Ok(entity.clone())
    }

    async fn count(&self) -> Result<i64, AppError> {
        Ok(live::<T>(&mut self.tables()).len() as i64)
    }

    async fn exists(&self, id: i32) -> Result<bool, AppError> {
        Ok(live::<T>(&mut self.tables()).iter().any(|row| row.id() == id))
    }

    async fn find_paged(&self, page: PageRequest) -> Result<Vec<T>, AppError> {
        Ok(live::<T>(&mut self.tables())
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect())
    }
}

fn role_names(tables: &Tables, user_id: i32) -> Vec<String> {
    let mut role_ids: Vec<i32> = tables
        .user_roles
        .iter()
        .filter(|(user, _, deleted)| *user == user_id && !deleted)
        .map(|(_, role, _)| *role)
        .collect();
    role_ids.sort();
    role_ids
        .into_iter()
        .filter_map(|id| tables.roles.iter().find(|r| r.id == id))
        .map(|r| r.name.clone())
        .collect()
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let mut tables = self.tables();
        let user = live_where::<User>(&mut tables, |u| u.email == email).into_iter().next();
        Ok(user.map(|mut u| {
            u.roles = role_names(&tables, u.id);
            u
        }))
    }

    async fn email_exists(&self, email: &str) -> Result<bool, AppError> {
        Ok(self.tables().users.iter().any(|u| u.email == email))
    }

    async fn find_with_roles(&self, user_id: i32) -> Result<UserGrants, AppError> {
        let tables = self.tables();
        let mut rows = Vec::new();
        for role_name in role_names(&tables, user_id) {
            let Some(role) = tables.roles.iter().find(|r| r.name == role_name) else {
                continue;
            };
            let mut permission_ids: Vec<i32> = tables
                .role_permissions
                .iter()
                .filter(|(r, _)| *r == role.id)
                .map(|(_, p)| *p)
                .collect();
            permission_ids.sort();

            if permission_ids.is_empty() {
                rows.push(RoleGrant {
                    role_name: role.name.clone(),
                    permission_name: None,
                });
            }
            for permission_id in permission_ids {
                let permission = tables.permissions.iter().find(|p| p.id == permission_id);
                rows.push(RoleGrant {
                    role_name: role.name.clone(),
                    permission_name: permission.map(|p| p.name.clone()),
                });
            }
        }
        Ok(UserGrants::from_rows(&rows))
    }

    async fn find_by_role(&self, role_name: &str) -> Result<Vec<User>, AppError> {
        let mut tables = self.tables();
        let users = live::<User>(&mut tables);
        Ok(users
            .into_iter()
            .map(|mut u| {
                u.roles = role_names(&tables, u.id);
                u
            })
            .filter(|u| u.roles.iter().any(|r| r == role_name))
            .collect())
    }

    async fn assign_role(&self, user_id: i32, role_id: i32, _actor: &str) -> Result<(), AppError> {
        let mut tables = self.tables();
        match tables
            .user_roles
            .iter_mut()
            .find(|(user, role, _)| *user == user_id && *role == role_id)
        {
            Some(link) => link.2 = false,
            None => tables.user_roles.push((user_id, role_id, false)),
        }
        Ok(())
    }

    async fn remove_role(&self, user_id: i32, role_id: i32, _actor: &str) -> Result<bool, AppError> {
        let mut tables = self.tables();
        match tables
            .user_roles
            .iter_mut()
            .find(|(user, role, deleted)| *user == user_id && *role == role_id && !deleted)
        {
            Some(link) => {
                link.2 = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl RoleRepository for InMemoryStore {
    async fn list_roles_with_permissions(&self) -> Result<Vec<RoleWithPermissions>, AppError> {
        let tables = self.tables();
        Ok(tables
            .roles
            .iter()
            .map(|role| RoleWithPermissions {
                role: role.clone(),
                permissions: tables
                    .role_permissions
                    .iter()
                    .filter(|(r, _)| *r == role.id)
                    .filter_map(|(_, p)| tables.permissions.iter().find(|perm| perm.id == *p))
                    .map(|perm| perm.name.clone())
                    .collect(),
            })
            .collect())
    }

    async fn list_permissions(&self) -> Result<Vec<Permission>, AppError> {
        Ok(self.tables().permissions.clone())
    }

    async fn find_role_by_name(&self, name: &str) -> Result<Option<Role>, AppError> {
        Ok(self.tables().roles.iter().find(|r| r.name == name).cloned())
    }

    async fn find_role_by_id(&self, id: i32) -> Result<Option<Role>, AppError> {
        Ok(self.tables().roles.iter().find(|r| r.id == id).cloned())
    }
}

#[async_trait]
impl CompanyRepository for InMemoryStore {
    async fn search_by_name(&self, name: &str) -> Result<Vec<Company>, AppError> {
        let needle = name.to_lowercase();
        Ok(live_where::<Company>(&mut self.tables(), |c| {
            c.name.to_lowercase().contains(&needle)
        }))
    }

    async fn find_by_industry(&self, industry: &str) -> Result<Vec<Company>, AppError> {
        Ok(live_where::<Company>(&mut self.tables(), |c| {
            c.industry.as_deref() == Some(industry)
        }))
    }

    async fn find_with_contacts(&self, id: i32) -> Result<Option<CompanyDetails>, AppError> {
        let mut tables = self.tables();
        let Some(company) = live::<Company>(&mut tables).into_iter().find(|c| c.id == id) else {
            return Ok(None);
        };
        let contacts = live_where::<Contact>(&mut tables, |c| c.company_id == Some(id));
        let opportunities = live_where::<Opportunity>(&mut tables, |o| o.company_id == id);
        Ok(Some(CompanyDetails {
            company,
            contacts,
            opportunities,
        }))
    }
}

#[async_trait]
impl ContactRepository for InMemoryStore {
    async fn find_by_company(&self, company_id: i32) -> Result<Vec<Contact>, AppError> {
        Ok(live_where::<Contact>(&mut self.tables(), |c| {
            c.company_id == Some(company_id)
        }))
    }

    async fn find_primary_contact(&self, company_id: i32) -> Result<Option<Contact>, AppError> {
        Ok(live_where::<Contact>(&mut self.tables(), |c| {
            c.company_id == Some(company_id) && c.is_primary_contact
        })
        .into_iter()
        .next())
    }

    async fn search_by_name(&self, name: &str) -> Result<Vec<Contact>, AppError> {
        let needle = name.to_lowercase();
        Ok(live_where::<Contact>(&mut self.tables(), |c| {
            c.full_name().to_lowercase().contains(&needle)
        }))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Contact>, AppError> {
        Ok(live_where::<Contact>(&mut self.tables(), |c| {
            c.email.as_deref() == Some(email)
        })
        .into_iter()
        .next())
    }

    async fn replace_primary_contact(
        &self,
        company_id: i32,
        contact_id: i32,
        actor: &str,
    ) -> Result<(), AppError> {
        let mut tables = self.tables();
        for contact in tables.contacts.iter_mut().filter(|c| {
            c.company_id == Some(company_id)
                && !c.audit.is_deleted
                && (c.is_primary_contact || c.id == contact_id)
        }) {
            contact.is_primary_contact = contact.id == contact_id;
            contact.audit.touch(actor);
        }
        Ok(())
    }
}

#[async_trait]
impl OpportunityRepository for InMemoryStore {
    async fn find_by_user(&self, user_id: i32) -> Result<Vec<Opportunity>, AppError> {
        Ok(live_where::<Opportunity>(&mut self.tables(), |o| {
            o.assigned_user_id == user_id
        }))
    }

    async fn find_by_stage(&self, stage_id: i32) -> Result<Vec<Opportunity>, AppError> {
        Ok(live_where::<Opportunity>(&mut self.tables(), |o| o.stage_id == stage_id))
    }

    async fn find_by_company(&self, company_id: i32) -> Result<Vec<Opportunity>, AppError> {
        Ok(live_where::<Opportunity>(&mut self.tables(), |o| {
            o.company_id == company_id
        }))
    }

    async fn total_value_by_user(&self, user_id: i32) -> Result<Decimal, AppError> {
        Ok(live_where::<Opportunity>(&mut self.tables(), |o| {
            o.assigned_user_id == user_id
        })
        .iter()
        .map(|o| o.estimated_value)
        .sum())
    }
}

#[async_trait]
impl SalesStageRepository for InMemoryStore {
    async fn list_stages(&self) -> Result<Vec<SalesStage>, AppError> {
        let mut stages = self.tables().stages.clone();
        stages.sort_by_key(|s| (s.stage_order, s.id));
        Ok(stages)
    }

    async fn stage_exists(&self, id: i32) -> Result<bool, AppError> {
        Ok(self.tables().stages.iter().any(|s| s.id == id))
    }
}

#[async_trait]
impl TaskRepository for InMemoryStore {
    async fn find_by_user(&self, user_id: i32) -> Result<Vec<CrmTask>, AppError> {
        Ok(live_where::<CrmTask>(&mut self.tables(), |t| {
            t.assigned_user_id == user_id
        }))
    }

    async fn find_by_status(&self, status: TaskStatus) -> Result<Vec<CrmTask>, AppError> {
        Ok(live_where::<CrmTask>(&mut self.tables(), |t| t.status == status))
    }

    async fn find_overdue(&self, now: DateTime<Utc>) -> Result<Vec<CrmTask>, AppError> {
        let mut tasks = live_where::<CrmTask>(&mut self.tables(), |t| t.is_overdue(now));
        tasks.sort_by_key(|t| (t.due_date, t.id));
        Ok(tasks)
    }

    async fn find_due_today(&self, day_start: DateTime<Utc>) -> Result<Vec<CrmTask>, AppError> {
        let day_end = day_start + Duration::days(1);
        let mut tasks = live_where::<CrmTask>(&mut self.tables(), |t| {
            t.status != TaskStatus::Completed
                && t.due_date.is_some_and(|due| due >= day_start && due < day_end)
        });
        tasks.sort_by_key(|t| (t.due_date, t.id));
        Ok(tasks)
    }

    async fn find_with_comments(&self, id: i32) -> Result<Option<TaskWithComments>, AppError> {
        let Some(task) = CrudRepository::<CrmTask>::find_by_id(self, id).await? else {
            return Ok(None);
        };
        let comments = self.find_comments(id).await?;
        Ok(Some(TaskWithComments { task, comments }))
    }

    async fn find_comments(&self, task_id: i32) -> Result<Vec<TaskComment>, AppError> {
        Ok(self
            .tables()
            .comments
            .iter()
            .filter(|c| c.task_id == task_id && !c.audit.is_deleted)
            .cloned()
            .collect())
    }

    async fn add_comment(&self, comment: &TaskComment) -> Result<TaskComment, AppError> {
        let mut tables = self.tables();
        let mut row = comment.clone();
        row.id = tables.comments.iter().map(|c| c.id).max().unwrap_or(0) + 1;
        tables.comments.push(row.clone());
        Ok(row)
    }
}

#[async_trait]
impl ActivityRepository for InMemoryStore {
    async fn find_by_user(&self, user_id: i32) -> Result<Vec<Activity>, AppError> {
        Ok(live_where::<Activity>(&mut self.tables(), |a| a.user_id == user_id))
    }

    async fn find_by_company(&self, company_id: i32) -> Result<Vec<Activity>, AppError> {
        Ok(live_where::<Activity>(&mut self.tables(), |a| {
            a.company_id == Some(company_id)
        }))
    }

    async fn find_by_contact(&self, contact_id: i32) -> Result<Vec<Activity>, AppError> {
        Ok(live_where::<Activity>(&mut self.tables(), |a| {
            a.contact_id == Some(contact_id)
        }))
    }

    async fn find_by_opportunity(&self, opportunity_id: i32) -> Result<Vec<Activity>, AppError> {
        Ok(live_where::<Activity>(&mut self.tables(), |a| {
            a.opportunity_id == Some(opportunity_id)
        }))
    }

    async fn find_by_date_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Activity>, AppError> {
        let mut activities = live_where::<Activity>(&mut self.tables(), |a| {
            a.scheduled_at.is_some_and(|at| at >= start && at <= end)
        });
        activities.sort_by_key(|a| (a.scheduled_at, a.id));
        Ok(activities)
    }

    async fn find_upcoming(&self, user_id: i32, now: DateTime<Utc>) -> Result<Vec<Activity>, AppError> {
        let mut activities = live_where::<Activity>(&mut self.tables(), |a| {
            a.user_id == user_id && a.scheduled_at.is_some_and(|at| at > now)
        });
        activities.sort_by_key(|a| (a.scheduled_at, a.id));
        Ok(activities)
    }
}
