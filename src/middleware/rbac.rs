// src/middleware/rbac.rs

use std::marker::PhantomData;

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::{common::error::AppError, middleware::auth::AuthenticatedUser};

/// 1. O Trait que define o que é uma Permissão
pub trait PermissionDef: Send + Sync + 'static {
    fn slug() -> &'static str;
}

/// 2. O Extractor (Guardião)
///
/// As permissões já vêm nas claims do token, então não há ida ao banco.
pub struct RequirePermission<T>(pub PhantomData<T>);

// 3. Implementação do FromRequestParts
impl<T, S> FromRequestParts<S> for RequirePermission<T>
where
    T: PermissionDef,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // A. Extrai Usuário
        let auth = parts
            .extensions
            .get::<AuthenticatedUser>()
            .ok_or(AppError::InvalidToken)?;

        // B. Confere a permissão nas claims
        let required_perm = T::slug();
        if !auth.claims.has_permission(required_perm) {
            tracing::warn!("⛔ {} sem a permissão {}", auth.user.email, required_perm);
            return Err(AppError::Forbidden(format!(
                "Você precisa da permissão '{}' para realizar esta ação.",
                required_perm
            )));
        }

        Ok(RequirePermission(PhantomData))
    }
}

// ---
// DEFINIÇÃO DAS PERMISSÕES (TIPOS)
// ---

macro_rules! permissions {
    ($($name:ident => $slug:literal),* $(,)?) => {
        $(
            pub struct $name;
            impl PermissionDef for $name {
                fn slug() -> &'static str { $slug }
            }
        )*
    };
}

permissions! {
    UsersView => "Users.View",
    UsersCreate => "Users.Create",
    UsersUpdate => "Users.Update",
    UsersDelete => "Users.Delete",

    CompaniesView => "Companies.View",
    CompaniesCreate => "Companies.Create",
    CompaniesUpdate => "Companies.Update",
    CompaniesDelete => "Companies.Delete",

    ContactsView => "Contacts.View",
    ContactsCreate => "Contacts.Create",
    ContactsUpdate => "Contacts.Update",
    ContactsDelete => "Contacts.Delete",

    OpportunitiesView => "Opportunities.View",
    OpportunitiesCreate => "Opportunities.Create",
    OpportunitiesUpdate => "Opportunities.Update",
    OpportunitiesDelete => "Opportunities.Delete",

    // Atividades também ficam sob o módulo Tasks
    TasksView => "Tasks.View",
    TasksCreate => "Tasks.Create",
    TasksUpdate => "Tasks.Update",
    TasksDelete => "Tasks.Delete",
}
