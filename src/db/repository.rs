// src/db/repository.rs

use async_trait::async_trait;

use crate::common::{error::AppError, pagination::PageRequest};

// Contrato comum a todos os repositórios de entidade.
// Toda leitura ignora linhas com is_deleted = TRUE.
// `find_all` e `find_paged` usam o mesmo ORDER BY, então juntar todas as
// páginas reproduz a listagem completa.
#[async_trait]
pub trait CrudRepository<T>: Send + Sync
where
    T: Send + Sync + 'static,
{
    async fn find_all(&self) -> Result<Vec<T>, AppError>;

    async fn find_by_id(&self, id: i32) -> Result<Option<T>, AppError>;

    /// Insere e devolve a linha gravada (com o ID gerado)
    async fn add(&self, entity: &T) -> Result<T, AppError>;

    /// Grava todas as colunas editáveis, inclusive `is_deleted`.
    /// ID inexistente (ou já excluído) vira NotFound.
    async fn update(&self, entity: &T) -> Result<T, AppError>;

    async fn count(&self) -> Result<i64, AppError>;

    async fn exists(&self, id: i32) -> Result<bool, AppError>;

    async fn find_paged(&self, page: PageRequest) -> Result<Vec<T>, AppError>;
}

// Padrão "contém" para ILIKE ... ESCAPE '\': % e _ digitados pelo usuário
// são literais.
pub(crate) fn contains_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wildcards_in_the_search_term_are_escaped() {
        assert_eq!(contains_pattern("acme"), "%acme%");
        assert_eq!(contains_pattern("50%"), "%50\\%%");
        assert_eq!(contains_pattern("a_b"), "%a\\_b%");
        assert_eq!(contains_pattern("c:\\x"), "%c:\\\\x%");
    }
}
