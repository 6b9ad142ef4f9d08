//src/main.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::{AppState, Config};
use crate::db::Repositories;
use crate::docs::ApiDoc;
use crate::middleware::auth::auth_guard;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // RUST_LOG manda; sem ele, info
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    let config = Config::from_env()?;
    let db_pool = config.connect().await?;

    // Faz o app rodar as migrações do SQLx na inicialização
    sqlx::migrate!().run(&db_pool).await?;
    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    let repos = Repositories::postgres(db_pool);
    let app_state = AppState::new(&repos, config.auth.clone());

    if let Some((email, password)) = &config.admin {
        app_state.auth_service.ensure_admin(email, password).await?;
    }

    let mut app = build_router(app_state);

    // O frontend compilado (SPA): qualquer rota desconhecida cai no index.html
    if let Some(dir) = &config.frontend_dir {
        let index = ServeFile::new(format!("{}/index.html", dir));
        app = app.fallback_service(ServeDir::new(dir).fallback(index));
        tracing::info!("📁 Servindo o frontend de {}", dir);
    }

    // Inicia o servidor
    let listener = TcpListener::bind(&config.server_addr).await?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_router(app_state: AppState) -> Router {
    // Define as rotas de autenticação (públicas)
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login))
        .route("/refresh", post(handlers::auth::refresh));

    let user_routes = Router::new()
        .route("/", get(handlers::users::list_users).post(handlers::users::create_user))
        .route(
            "/{id}",
            get(handlers::users::get_user)
                .put(handlers::users::update_user)
                .delete(handlers::users::delete_user),
        )
        .route("/{id}/roles", get(handlers::users::get_user_roles))
        .route(
            "/{id}/roles/{roleId}",
            post(handlers::users::assign_role).delete(handlers::users::remove_role),
        )
        .route("/by-role/{name}", get(handlers::users::users_by_role));

    let company_routes = Router::new()
        .route(
            "/",
            get(handlers::companies::list_companies).post(handlers::companies::create_company),
        )
        .route("/search", get(handlers::companies::search_companies))
        .route("/count", get(handlers::companies::count_companies))
        .route("/industry/{industry}", get(handlers::companies::companies_by_industry))
        .route(
            "/{id}",
            get(handlers::companies::get_company)
                .put(handlers::companies::update_company)
                .delete(handlers::companies::delete_company),
        )
        .route("/{id}/details", get(handlers::companies::company_details))
        .route("/{id}/contacts", get(handlers::companies::company_contacts))
        .route("/{id}/primary-contact", get(handlers::companies::get_primary_contact))
        .route(
            "/{id}/primary-contact/{contactId}",
            put(handlers::companies::set_primary_contact),
        );

    let contact_routes = Router::new()
        .route(
            "/",
            get(handlers::contacts::list_contacts).post(handlers::contacts::create_contact),
        )
        .route("/search", get(handlers::contacts::search_contacts))
        .route("/by-email", get(handlers::contacts::contact_by_email))
        .route("/company/{companyId}", get(handlers::contacts::contacts_by_company))
        .route(
            "/{id}",
            get(handlers::contacts::get_contact)
                .put(handlers::contacts::update_contact)
                .delete(handlers::contacts::delete_contact),
        );

    let opportunity_routes = Router::new()
        .route(
            "/",
            get(handlers::opportunities::list_opportunities)
                .post(handlers::opportunities::create_opportunity),
        )
        .route("/summary/by-stage", get(handlers::opportunities::value_by_stage))
        .route("/user/{userId}", get(handlers::opportunities::opportunities_by_user))
        .route(
            "/user/{userId}/total-value",
            get(handlers::opportunities::total_value_by_user),
        )
        .route("/stage/{stageId}", get(handlers::opportunities::opportunities_by_stage))
        .route("/company/{companyId}", get(handlers::opportunities::opportunities_by_company))
        .route(
            "/{id}",
            get(handlers::opportunities::get_opportunity)
                .put(handlers::opportunities::update_opportunity)
                .delete(handlers::opportunities::delete_opportunity),
        )
        .route("/{id}/stage/{stageId}", put(handlers::opportunities::move_to_stage));

    let task_routes = Router::new()
        .route("/", get(handlers::tasks::list_tasks).post(handlers::tasks::create_task))
        .route("/overdue", get(handlers::tasks::overdue_tasks))
        .route("/due-today", get(handlers::tasks::tasks_due_today))
        .route("/summary/status", get(handlers::tasks::status_summary))
        .route("/user/{userId}", get(handlers::tasks::tasks_by_user))
        .route("/status/{status}", get(handlers::tasks::tasks_by_status))
        .route(
            "/{id}",
            get(handlers::tasks::get_task)
                .put(handlers::tasks::update_task)
                .delete(handlers::tasks::delete_task),
        )
        .route("/{id}/details", get(handlers::tasks::task_details))
        .route("/{id}/complete", post(handlers::tasks::complete_task))
        .route(
            "/{id}/comments",
            get(handlers::tasks::list_comments).post(handlers::tasks::add_comment),
        );

    let activity_routes = Router::new()
        .route(
            "/",
            get(handlers::activities::list_activities).post(handlers::activities::create_activity),
        )
        .route("/range", get(handlers::activities::activities_in_range))
        .route("/summary/types", get(handlers::activities::type_summary))
        .route("/user/{userId}", get(handlers::activities::activities_by_user))
        .route("/upcoming/{userId}", get(handlers::activities::upcoming_activities))
        .route("/company/{id}", get(handlers::activities::activities_by_company))
        .route("/contact/{id}", get(handlers::activities::activities_by_contact))
        .route("/opportunity/{id}", get(handlers::activities::activities_by_opportunity))
        .route(
            "/{id}",
            get(handlers::activities::get_activity)
                .put(handlers::activities::update_activity)
                .delete(handlers::activities::delete_activity),
        );

    // Tudo aqui dentro exige Bearer válido; a permissão é checada em cada handler
    let protected = Router::new()
        .route("/api/auth/me", get(handlers::auth::get_me))
        .route("/api/auth/change-password", post(handlers::auth::change_password))
        .nest("/api/users", user_routes)
        .route("/api/roles", get(handlers::rbac::list_roles))
        .route("/api/permissions", get(handlers::rbac::list_permissions))
        .route("/api/sales-stages", get(handlers::opportunities::list_sales_stages))
        .nest("/api/companies", company_routes)
        .nest("/api/contacts", contact_routes)
        .nest("/api/opportunities", opportunity_routes)
        .nest("/api/tasks", task_routes)
        .nest("/api/activities", activity_routes)
        .route("/api/dashboard/summary", get(handlers::dashboard::get_summary))
        .route_layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Combina tudo no router principal
    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .merge(protected)
        .with_state(app_state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::models::auth::RegisterUserPayload;
    use crate::services::test_support::auth_config;

    const ADMIN_EMAIL: &str = "admin@crm.local";
    const ADMIN_PASSWORD: &str = "admin123";

    async fn app() -> (Router, AppState) {
        let (repos, _) = Repositories::in_memory();
        let state = AppState::new(&repos, auth_config());
        state
            .auth_service
            .ensure_admin(ADMIN_EMAIL, ADMIN_PASSWORD)
            .await
            .unwrap();
        (build_router(state.clone()), state)
    }

    async fn token_for(state: &AppState, email: &str, password: &str) -> String {
        state.auth_service.login(email, password).await.unwrap().token
    }

    fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_is_public() {
        let (app, _) = app().await;

        let response = app.oneshot(request("GET", "/api/health", None, None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn missing_or_bad_token_is_unauthorized() {
        let (app, _) = app().await;

        let response = app
            .clone()
            .oneshot(request("GET", "/api/companies", None, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app
            .oneshot(request("GET", "/api/companies", Some("nao-e-um-jwt"), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn plain_user_lacks_module_permissions() {
        let (app, state) = app().await;
        state
            .auth_service
            .register(RegisterUserPayload {
                first_name: "Joana".to_string(),
                last_name: "Lima".to_string(),
                email: "joana@crm.local".to_string(),
                password: "segredo123".to_string(),
            })
            .await
            .unwrap();
        let token = token_for(&state, "joana@crm.local", "segredo123").await;

        let response = app
            .clone()
            .oneshot(request("GET", "/api/companies", Some(&token), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        // Sem permissão de módulo, mas autenticado
        let response = app
            .oneshot(request("GET", "/api/auth/me", Some(&token), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["roles"], json!(["User"]));
    }

    #[tokio::test]
    async fn admin_creates_and_updates_a_company() {
        let (app, state) = app().await;
        let token = token_for(&state, ADMIN_EMAIL, ADMIN_PASSWORD).await;

        let response = app
            .clone()
            .oneshot(request(
                "POST",
                "/api/companies",
                Some(&token),
                Some(json!({ "name": "Acme", "industry": "Varejo" })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let created = json_body(response).await;
        let id = created["id"].as_i64().unwrap();
        assert_eq!(created["createdBy"], ADMIN_EMAIL);

        let mismatch = app
            .clone()
            .oneshot(request(
                "PUT",
                &format!("/api/companies/{}", id),
                Some(&token),
                Some(json!({ "id": id + 1, "name": "Acme S.A." })),
            ))
            .await
            .unwrap();
        assert_eq!(mismatch.status(), StatusCode::BAD_REQUEST);

        let updated = app
            .clone()
            .oneshot(request(
                "PUT",
                &format!("/api/companies/{}", id),
                Some(&token),
                Some(json!({ "id": id, "name": "Acme S.A." })),
            ))
            .await
            .unwrap();
        assert_eq!(updated.status(), StatusCode::OK);
        assert_eq!(json_body(updated).await["name"], "Acme S.A.");

        let deleted = app
            .clone()
            .oneshot(request("DELETE", &format!("/api/companies/{}", id), Some(&token), None))
            .await
            .unwrap();
        assert_eq!(deleted.status(), StatusCode::NO_CONTENT);

        let missing = app
            .oneshot(request("GET", &format!("/api/companies/{}", id), Some(&token), None))
            .await
            .unwrap();
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn login_and_refresh_over_http() {
        let (app, _) = app().await;

        let wrong = app
            .clone()
            .oneshot(request(
                "POST",
                "/api/auth/login",
                None,
                Some(json!({ "email": ADMIN_EMAIL, "password": "errada" })),
            ))
            .await
            .unwrap();
        assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);

        let ok = app
            .clone()
            .oneshot(request(
                "POST",
                "/api/auth/login",
                None,
                Some(json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD })),
            ))
            .await
            .unwrap();
        assert_eq!(ok.status(), StatusCode::OK);
        let body = json_body(ok).await;
        assert!(body["token"].as_str().is_some());
        assert!(body["refreshToken"].as_str().is_some());

        let refresh = app
            .oneshot(request(
                "POST",
                "/api/auth/refresh",
                None,
                Some(json!({ "token": "x", "refreshToken": "y" })),
            ))
            .await
            .unwrap();
        assert_eq!(refresh.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn completing_a_task_returns_no_content() {
        let (app, state) = app().await;
        let token = token_for(&state, ADMIN_EMAIL, ADMIN_PASSWORD).await;
        let me = state.auth_service.validate_token(&token).unwrap();

        let created = app
            .clone()
            .oneshot(request(
                "POST",
                "/api/tasks",
                Some(&token),
                Some(json!({ "title": "Retornar ligação", "assignedUserId": me.sub, "status": "InProgress" })),
            ))
            .await
            .unwrap();
        assert_eq!(created.status(), StatusCode::CREATED);
        let id = json_body(created).await["id"].as_i64().unwrap();

        let done = app
            .clone()
            .oneshot(request("POST", &format!("/api/tasks/{}/complete", id), Some(&token), None))
            .await
            .unwrap();
        assert_eq!(done.status(), StatusCode::NO_CONTENT);

        let task = app
            .oneshot(request("GET", &format!("/api/tasks/{}", id), Some(&token), None))
            .await
            .unwrap();
        let task = json_body(task).await;
        assert_eq!(task["status"], "Completed");
        assert!(task["completedAt"].is_string());
    }

    #[tokio::test]
    async fn unreadable_json_body_is_a_bad_request() {
        let (app, state) = app().await;
        let token = token_for(&state, ADMIN_EMAIL, ADMIN_PASSWORD).await;

        // Falta o título
        let missing_field = app
            .clone()
            .oneshot(request(
                "POST",
                "/api/tasks",
                Some(&token),
                Some(json!({ "assignedUserId": 1 })),
            ))
            .await
            .unwrap();
        assert_eq!(missing_field.status(), StatusCode::BAD_REQUEST);
        assert!(json_body(missing_field).await["error"].is_string());

        let unknown_status = app
            .oneshot(request(
                "POST",
                "/api/tasks",
                Some(&token),
                Some(json!({ "title": "Ligar", "assignedUserId": 1, "status": "Done" })),
            ))
            .await
            .unwrap();
        assert_eq!(unknown_status.status(), StatusCode::BAD_REQUEST);
        assert!(json_body(unknown_status).await["error"].is_string());
    }

    #[tokio::test]
    async fn wrong_current_password_is_a_bad_request() {
        let (app, state) = app().await;
        let token = token_for(&state, ADMIN_EMAIL, ADMIN_PASSWORD).await;

        let response = app
            .oneshot(request(
                "POST",
                "/api/auth/change-password",
                Some(&token),
                Some(json!({ "currentPassword": "errada", "newPassword": "novasenha" })),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(json_body(response).await["error"].is_string());
        // A senha antiga continua valendo
        assert!(state.auth_service.login(ADMIN_EMAIL, ADMIN_PASSWORD).await.is_ok());
    }
}
