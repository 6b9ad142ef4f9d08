// src/common/extract.rs

use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};

use crate::common::error::AppError;

// Igual ao Json do axum, mas um corpo mal formado vira AppError (400 com {"error"})
// em vez do 422 em texto puro.
pub struct AppJson<T>(pub T);

impl<T, S> FromRequest<S> for AppJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(AppJson(value))
    }
}
