// src/common/pagination.rs

use serde::Deserialize;
use utoipa::IntoParams;

const DEFAULT_PAGE_SIZE: u32 = 25;
const MAX_PAGE_SIZE: u32 = 100;

/// Parâmetros de query `?page=&pageSize=` aceitos pelas listagens.
/// Sem `page` a listagem devolve tudo.
#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PageParams {
    /// Página (começa em 1)
    pub page: Option<u32>,
    /// Itens por página (1 a 100, padrão 25)
    pub page_size: Option<u32>,
}

impl PageParams {
    pub fn page_request(&self) -> Option<PageRequest> {
        self.page
            .map(|page| PageRequest::new(page, self.page_size.unwrap_or(DEFAULT_PAGE_SIZE)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
}

impl PageRequest {
    pub fn new(page: u32, page_size: u32) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.page_size)
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.page_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_request_is_clamped() {
        let page = PageRequest::new(0, 1000);
        assert_eq!(page, PageRequest { page: 1, page_size: 100 });
        assert_eq!(page.offset(), 0);

        let page = PageRequest::new(3, 10);
        assert_eq!(page.offset(), 20);
        assert_eq!(page.limit(), 10);
    }

    #[test]
    fn missing_page_means_full_list() {
        let params = PageParams { page: None, page_size: Some(10) };
        assert!(params.page_request().is_none());

        let params = PageParams { page: Some(2), page_size: None };
        assert_eq!(params.page_request(), Some(PageRequest::new(2, DEFAULT_PAGE_SIZE)));
    }
}
