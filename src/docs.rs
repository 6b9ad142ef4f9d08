// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "CRM API",
        description = "Empresas, contatos, oportunidades, tarefas e atividades"
    ),
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::refresh,
        handlers::auth::change_password,
        handlers::auth::get_me,

        // --- Users ---
        handlers::users::list_users,
        handlers::users::get_user,
        handlers::users::create_user,
        handlers::users::update_user,
        handlers::users::delete_user,
        handlers::users::get_user_roles,
        handlers::users::assign_role,
        handlers::users::remove_role,
        handlers::users::users_by_role,

        // --- RBAC ---
        handlers::rbac::list_roles,
        handlers::rbac::list_permissions,

        // --- Companies ---
        handlers::companies::list_companies,
        handlers::companies::get_company,
        handlers::companies::create_company,
        handlers::companies::update_company,
        handlers::companies::delete_company,
        handlers::companies::search_companies,
        handlers::companies::companies_by_industry,
        handlers::companies::count_companies,
        handlers::companies::company_details,
        handlers::companies::company_contacts,
        handlers::companies::get_primary_contact,
        handlers::companies::set_primary_contact,

        // --- Contacts ---
        handlers::contacts::list_contacts,
        handlers::contacts::get_contact,
        handlers::contacts::create_contact,
        handlers::contacts::update_contact,
        handlers::contacts::delete_contact,
        handlers::contacts::contacts_by_company,
        handlers::contacts::search_contacts,
        handlers::contacts::contact_by_email,

        // --- Opportunities ---
        handlers::opportunities::list_opportunities,
        handlers::opportunities::get_opportunity,
        handlers::opportunities::create_opportunity,
        handlers::opportunities::update_opportunity,
        handlers::opportunities::delete_opportunity,
        handlers::opportunities::opportunities_by_user,
        handlers::opportunities::opportunities_by_stage,
        handlers::opportunities::opportunities_by_company,
        handlers::opportunities::total_value_by_user,
        handlers::opportunities::move_to_stage,
        handlers::opportunities::value_by_stage,
        handlers::opportunities::list_sales_stages,

        // --- Tasks ---
        handlers::tasks::list_tasks,
        handlers::tasks::get_task,
        handlers::tasks::task_details,
        handlers::tasks::create_task,
        handlers::tasks::update_task,
        handlers::tasks::delete_task,
        handlers::tasks::complete_task,
        handlers::tasks::list_comments,
        handlers::tasks::add_comment,
        handlers::tasks::tasks_by_user,
        handlers::tasks::tasks_by_status,
        handlers::tasks::overdue_tasks,
        handlers::tasks::tasks_due_today,
        handlers::tasks::status_summary,

        // --- Activities ---
        handlers::activities::list_activities,
        handlers::activities::get_activity,
        handlers::activities::create_activity,
        handlers::activities::update_activity,
        handlers::activities::delete_activity,
        handlers::activities::activities_by_user,
        handlers::activities::activities_by_company,
        handlers::activities::activities_by_contact,
        handlers::activities::activities_by_opportunity,
        handlers::activities::activities_in_range,
        handlers::activities::upcoming_activities,
        handlers::activities::type_summary,

        // --- Dashboard ---
        handlers::dashboard::get_summary,
    ),
    components(
        schemas(
            models::audit::Audit,

            // --- Auth ---
            models::auth::User,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::ChangePasswordPayload,
            models::auth::RefreshTokenPayload,
            models::auth::AuthResponse,
            models::auth::CreateUserPayload,
            models::auth::UpdateUserPayload,

            // --- RBAC ---
            models::rbac::Role,
            models::rbac::Permission,
            models::rbac::RoleWithPermissions,

            // --- Companies / Contacts ---
            models::company::Company,
            models::company::CompanyPayload,
            models::company::CompanyDetails,
            models::company::CountResponse,
            models::contact::Contact,
            models::contact::ContactPayload,

            // --- Opportunities ---
            models::opportunity::SalesStage,
            models::opportunity::Opportunity,
            models::opportunity::OpportunityPayload,
            models::opportunity::TotalValueResponse,
            models::opportunity::StageValue,

            // --- Tasks ---
            models::task::TaskStatus,
            models::task::TaskPriority,
            models::task::CrmTask,
            models::task::TaskPayload,
            models::task::TaskComment,
            models::task::CommentPayload,
            models::task::TaskWithComments,
            models::task::StatusCount,

            // --- Activities ---
            models::activity::ActivityType,
            models::activity::Activity,
            models::activity::ActivityPayload,
            models::activity::TypeCount,

            // --- Dashboard ---
            models::dashboard::DashboardSummary,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação e Registro"),
        (name = "Users", description = "Gestão de Usuários e Cargos"),
        (name = "RBAC", description = "Controle de Acesso (Cargos e Permissões)"),
        (name = "Companies", description = "Empresas clientes"),
        (name = "Contacts", description = "Pessoas de contato"),
        (name = "Opportunities", description = "Funil de vendas"),
        (name = "Tasks", description = "Tarefas e comentários"),
        (name = "Activities", description = "Ligações, reuniões, e-mails e notas"),
        (name = "Dashboard", description = "Indicadores Gerenciais")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_the_bearer_scheme_and_crm_paths() {
        let doc = ApiDoc::openapi();

        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("api_jwt"));
        assert!(doc.paths.paths.contains_key("/api/companies/{id}"));
        assert!(doc.paths.paths.contains_key("/api/tasks/{id}/complete"));
    }
}
