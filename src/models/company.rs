// src/models/company.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::models::audit::Audit;
use crate::models::contact::Contact;
use crate::models::opportunity::Opportunity;

#[derive(Debug, Clone, Default, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    #[schema(example = 1)]
    pub id: i32,

    #[schema(example = "Acme Ltda")]
    pub name: String,

    pub description: Option<String>,

    #[schema(example = "Tecnologia")]
    pub industry: Option<String>,

    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub postal_code: Option<String>,

    #[schema(value_type = Option<f64>, example = 1500000.00)]
    pub annual_revenue: Option<Decimal>,

    #[schema(example = 42)]
    pub employee_count: Option<i32>,

    #[sqlx(flatten)]
    #[serde(flatten)]
    pub audit: Audit,
}

// Payload de criação e de edição (no PUT o `id` é opcional e, se vier, tem que bater com a rota)
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompanyPayload {
    pub id: Option<i32>,

    #[validate(length(min = 1, max = 200, message = "O nome da empresa é obrigatório."))]
    #[schema(example = "Acme Ltda")]
    pub name: String,

    #[validate(length(max = 500))]
    pub description: Option<String>,

    #[validate(length(max = 100))]
    pub industry: Option<String>,

    #[validate(length(max = 20))]
    pub phone: Option<String>,

    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: Option<String>,

    #[validate(length(max = 255))]
    pub website: Option<String>,

    #[validate(length(max = 500))]
    pub address: Option<String>,
    #[validate(length(max = 100))]
    pub city: Option<String>,
    #[validate(length(max = 100))]
    pub country: Option<String>,
    #[validate(length(max = 20))]
    pub postal_code: Option<String>,

    #[schema(value_type = Option<f64>)]
    pub annual_revenue: Option<Decimal>,

    #[validate(range(min = 0, message = "O número de funcionários não pode ser negativo."))]
    pub employee_count: Option<i32>,

    pub is_active: Option<bool>,
}

impl CompanyPayload {
    /// Copia os campos editáveis para a entidade
    pub fn apply(self, company: &mut Company) {
        company.name = self.name;
        company.description = self.description;
        company.industry = self.industry;
        company.phone = self.phone;
        company.email = self.email;
        company.website = self.website;
        company.address = self.address;
        company.city = self.city;
        company.country = self.country;
        company.postal_code = self.postal_code;
        company.annual_revenue = self.annual_revenue;
        company.employee_count = self.employee_count;
        if let Some(active) = self.is_active {
            company.audit.is_active = active;
        }
    }
}

// Empresa com os contatos e oportunidades ativos
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompanyDetails {
    #[serde(flatten)]
    pub company: Company,
    pub contacts: Vec<Contact>,
    pub opportunities: Vec<Opportunity>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct NameSearch {
    /// Trecho do nome (sem diferenciar maiúsculas)
    pub name: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CountResponse {
    #[schema(example = 12)]
    pub count: i64,
}
