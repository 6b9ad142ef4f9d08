pub mod activities;
pub mod auth;
pub mod companies;
pub mod contacts;
pub mod dashboard;
pub mod opportunities;
pub mod rbac;
pub mod tasks;
pub mod users;

use crate::common::error::AppError;

// O `id` do corpo é opcional, mas se vier tem que ser o mesmo da rota
pub(crate) fn check_path_id(path_id: i32, body_id: Option<i32>) -> Result<(), AppError> {
    match body_id {
        Some(body_id) if body_id != path_id => Err(AppError::bad_request(format!(
            "O ID do corpo ({}) não confere com o ID da rota ({}).",
            body_id, path_id
        ))),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_id_must_match_the_path() {
        assert!(check_path_id(3, None).is_ok());
        assert!(check_path_id(3, Some(3)).is_ok());
        assert!(matches!(check_path_id(3, Some(4)), Err(AppError::BadRequest(_))));
    }
}
