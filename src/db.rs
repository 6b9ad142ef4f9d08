pub mod repository;
pub use repository::CrudRepository;
pub mod user_repo;
pub use user_repo::{PgUserRepository, UserRepository};
pub mod rbac_repo;
pub use rbac_repo::{PgRoleRepository, RoleRepository};
pub mod company_repo;
pub use company_repo::{CompanyRepository, PgCompanyRepository};
pub mod contact_repo;
pub use contact_repo::{ContactRepository, PgContactRepository};
pub mod opportunity_repo;
pub use opportunity_repo::{OpportunityRepository, PgOpportunityRepository, SalesStageRepository};
pub mod task_repo;
pub use task_repo::{PgTaskRepository, TaskRepository};
pub mod activity_repo;
pub use activity_repo::{ActivityRepository, PgActivityRepository};

#[cfg(test)]
pub mod memory;

use std::sync::Arc;

use sqlx::PgPool;

// Todos os repositórios da aplicação, atrás dos traits.
// Os serviços recebem daqui o que precisam.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub roles: Arc<dyn RoleRepository>,
    pub companies: Arc<dyn CompanyRepository>,
    pub contacts: Arc<dyn ContactRepository>,
    pub opportunities: Arc<dyn OpportunityRepository>,
    pub stages: Arc<dyn SalesStageRepository>,
    pub tasks: Arc<dyn TaskRepository>,
    pub activities: Arc<dyn ActivityRepository>,
}

impl Repositories {
    pub fn postgres(pool: PgPool) -> Self {
        let opportunities = Arc::new(PgOpportunityRepository::new(pool.clone()));
        Self {
            users: Arc::new(PgUserRepository::new(pool.clone())),
            roles: Arc::new(PgRoleRepository::new(pool.clone())),
            companies: Arc::new(PgCompanyRepository::new(pool.clone())),
            contacts: Arc::new(PgContactRepository::new(pool.clone())),
            stages: opportunities.clone(),
            opportunities,
            tasks: Arc::new(PgTaskRepository::new(pool.clone())),
            activities: Arc::new(PgActivityRepository::new(pool)),
        }
    }

    #[cfg(test)]
    pub fn in_memory() -> (Self, Arc<memory::InMemoryStore>) {
        let store = memory::InMemoryStore::seeded();
        let repos = Self {
            users: store.clone(),
            roles: store.clone(),
            companies: store.clone(),
            contacts: store.clone(),
            opportunities: store.clone(),
            stages: store.clone(),
            tasks: store.clone(),
            activities: store.clone(),
        };
        (repos, store)
    }
}
