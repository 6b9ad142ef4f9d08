// src/models/contact.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::models::audit::Audit;

#[derive(Debug, Clone, Default, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    #[schema(example = 7)]
    pub id: i32,

    #[schema(example = "João")]
    pub first_name: String,

    #[schema(example = "Pereira")]
    pub last_name: String,

    #[schema(example = "joao@acme.com")]
    pub email: Option<String>,

    pub phone: Option<String>,
    pub mobile: Option<String>,
    pub position: Option<String>,
    pub department: Option<String>,

    pub is_primary_contact: bool,

    #[schema(example = 1)]
    pub company_id: Option<i32>,

    // Carregado via LEFT JOIN em companies
    #[sqlx(default)]
    #[schema(example = "Acme Ltda")]
    pub company_name: Option<String>,

    #[sqlx(flatten)]
    #[serde(flatten)]
    pub audit: Audit,
}

impl Contact {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContactPayload {
    pub id: Option<i32>,

    #[validate(length(min = 1, max = 100, message = "O nome é obrigatório."))]
    #[schema(example = "João")]
    pub first_name: String,

    #[validate(length(min = 1, max = 100, message = "O sobrenome é obrigatório."))]
    #[schema(example = "Pereira")]
    pub last_name: String,

    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: Option<String>,

    #[validate(length(max = 20))]
    pub phone: Option<String>,
    #[validate(length(max = 20))]
    pub mobile: Option<String>,
    #[validate(length(max = 100))]
    pub position: Option<String>,
    #[validate(length(max = 100))]
    pub department: Option<String>,

    #[serde(default)]
    pub is_primary_contact: bool,

    pub company_id: Option<i32>,

    pub is_active: Option<bool>,
}

impl ContactPayload {
    pub fn apply(self, contact: &mut Contact) {
        contact.first_name = self.first_name;
        contact.last_name = self.last_name;
        contact.email = self.email;
        contact.phone = self.phone;
        contact.mobile = self.mobile;
        contact.position = self.position;
        contact.department = self.department;
        contact.is_primary_contact = self.is_primary_contact;
        contact.company_id = self.company_id;
        if let Some(active) = self.is_active {
            contact.audit.is_active = active;
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EmailQuery {
    pub email: String,
}
