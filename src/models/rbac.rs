// src/models/rbac.rs

use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::models::audit::Audit;

// O que sai do banco (Tabela roles)
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    #[schema(example = 2)]
    pub id: i32,

    #[schema(example = "Manager")]
    pub name: String,

    #[schema(example = "Sales Manager")]
    pub description: Option<String>,

    #[sqlx(flatten)]
    #[serde(flatten)]
    pub audit: Audit,
}

// O que sai do banco (Tabela permissions)
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Permission {
    #[schema(example = 5)]
    pub id: i32,

    #[schema(example = "Companies.View")]
    pub name: String,

    #[schema(example = "View Companies")]
    pub description: Option<String>,

    #[schema(example = "Companies")]
    pub module: String,
}

// Resposta completa (Cargo + Lista de Permissões)
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoleWithPermissions {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub role: Role,

    #[schema(example = json!(["Companies.View", "Companies.Create"]))]
    pub permissions: Vec<String>,
}

// Uma linha do join usuário -> cargos -> permissões.
// Cargo sem permissão nenhuma vem com permission_name nulo (LEFT JOIN).
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct RoleGrant {
    pub role_name: String,
    pub permission_name: Option<String>,
}

/// Cargos e permissões efetivos de um usuário, sem repetição.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserGrants {
    pub roles: Vec<String>,
    pub permissions: Vec<String>,
}

impl UserGrants {
    pub fn from_rows(rows: &[RoleGrant]) -> Self {
        let mut grants = UserGrants::default();
        for row in rows {
            if !grants.roles.contains(&row.role_name) {
                grants.roles.push(row.role_name.clone());
            }
            if let Some(permission) = &row.permission_name {
                if !grants.permissions.contains(permission) {
                    grants.permissions.push(permission.clone());
                }
            }
        }
        grants
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grant(role: &str, permission: Option<&str>) -> RoleGrant {
        RoleGrant {
            role_name: role.to_string(),
            permission_name: permission.map(str::to_string),
        }
    }

    #[test]
    fn grants_are_deduplicated_across_roles() {
        let rows = vec![
            grant("Admin", Some("Companies.View")),
            grant("Admin", Some("Users.View")),
            grant("Manager", Some("Companies.View")),
            grant("User", None),
        ];

        let grants = UserGrants::from_rows(&rows);

        assert_eq!(grants.roles, vec!["Admin", "Manager", "User"]);
        assert_eq!(grants.permissions, vec!["Companies.View", "Users.View"]);
    }
}
