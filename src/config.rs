// src/config.rs

use std::{env, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    db::Repositories,
    services::{
        activity_service::ActivityService, auth::AuthService, company_service::CompanyService,
        contact_service::ContactService, dashboard_service::DashboardService,
        opportunity_service::OpportunityService, rbac_service::RbacService,
        task_service::TaskService, user_service::UserService,
    },
};

// Parâmetros do JWT e do bcrypt, repassados ao AuthService
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub issuer: String,
    pub audience: String,
    pub expiry_hours: i64,
    pub bcrypt_cost: u32,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub server_addr: String,
    pub max_connections: u32,
    pub frontend_dir: Option<String>,
    // (e-mail, senha) do administrador inicial
    pub admin: Option<(String, String)>,
    pub auth: AuthConfig,
}

impl Config {
    /// Lê tudo das variáveis de ambiente (o .env é opcional)
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").context("DATABASE_URL deve ser definida")?;
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET deve ser definido")?;

        let expiry_hours = match env::var("JWT_EXPIRY_HOURS") {
            Ok(value) => value.parse().context("JWT_EXPIRY_HOURS deve ser um número")?,
            Err(_) => 24,
        };
        let max_connections = match env::var("DB_MAX_CONNECTIONS") {
            Ok(value) => value.parse().context("DB_MAX_CONNECTIONS deve ser um número")?,
            Err(_) => 5,
        };

        let admin = match (env::var("ADMIN_EMAIL"), env::var("ADMIN_PASSWORD")) {
            (Ok(email), Ok(password)) => Some((email, password)),
            _ => None,
        };

        Ok(Self {
            database_url,
            server_addr: env::var("SERVER_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            max_connections,
            frontend_dir: env::var("FRONTEND_DIR").ok(),
            admin,
            auth: AuthConfig {
                jwt_secret,
                issuer: env::var("JWT_ISSUER").unwrap_or_else(|_| "CrmApi".to_string()),
                audience: env::var("JWT_AUDIENCE").unwrap_or_else(|_| "CrmClient".to_string()),
                expiry_hours,
                bcrypt_cost: bcrypt::DEFAULT_COST,
            },
        })
    }

    pub async fn connect(&self) -> anyhow::Result<PgPool> {
        let pool = PgPoolOptions::new()
            .max_connections(self.max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&self.database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");
        Ok(pool)
    }
}

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub auth_service: AuthService,
    pub user_service: UserService,
    pub rbac_service: RbacService,
    pub company_service: CompanyService,
    pub contact_service: ContactService,
    pub opportunity_service: OpportunityService,
    pub task_service: TaskService,
    pub activity_service: ActivityService,
    pub dashboard_service: DashboardService,
}

impl AppState {
    // --- Monta o gráfico de dependências ---
    pub fn new(repos: &Repositories, auth: AuthConfig) -> Self {
        let bcrypt_cost = auth.bcrypt_cost;
        Self {
            auth_service: AuthService::new(repos.users.clone(), repos.roles.clone(), auth),
            user_service: UserService::new(repos.users.clone(), repos.roles.clone(), bcrypt_cost),
            rbac_service: RbacService::new(repos.roles.clone()),
            company_service: CompanyService::new(repos.companies.clone()),
            contact_service: ContactService::new(repos.contacts.clone(), repos.companies.clone()),
            opportunity_service: OpportunityService::new(repos),
            task_service: TaskService::new(repos),
            activity_service: ActivityService::new(repos),
            dashboard_service: DashboardService::new(repos),
        }
    }
}
