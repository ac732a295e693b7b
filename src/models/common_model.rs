//! models/common_model.rs
//! Paginación y respuestas genéricas.

use serde::{Deserialize, Serialize};

use crate::config::AppConfig;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaginationQuery {
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

/// Página ya resuelta (page >= 1, page_size acotado por la configuración).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub page_size: u64,
}

impl PageRequest {
    pub fn new(query: &PaginationQuery, config: &AppConfig) -> Self {
        let page_size = query
            .page_size
            .unwrap_or(config.default_page_size)
            .clamp(1, config.max_page_size);
        // El OFFSET debe caber en un i64 de SQLite.
        let max_page = i64::MAX as u64 / page_size;
        let page = query.page.unwrap_or(1).clamp(1, max_page);
        PageRequest { page, page_size }
    }

    pub fn limit(&self) -> i64 {
        self.page_size as i64
    }

    pub fn offset(&self) -> i64 {
        let offset = self.page.saturating_sub(1).saturating_mul(self.page_size);
        i64::try_from(offset).unwrap_or(i64::MAX)
    }

    /// Pagina en memoria un listado ya materializado.
    pub fn slice<T>(&self, items: Vec<T>) -> Page<T> {
        let total = items.len() as u64;
        let items = items
            .into_iter()
            .skip(usize::try_from(self.offset()).unwrap_or(usize::MAX))
            .take(self.page_size as usize)
            .collect();
        Page {
            total,
            page: self.page,
            page_size: self.page_size,
            items,
        }
    }
}

/// Para listar con paginación
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
    pub items: Vec<T>,
}

impl<T> Page<T> {
    pub fn new(request: PageRequest, total: i64, items: Vec<T>) -> Self {
        Page {
            total: total.max(0) as u64,
            page: request.page,
            page_size: request.page_size,
            items,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DetailResponse {
    pub detail: String,
}

/// Orden solicitado por `?ordering=campo` / `?ordering=-campo`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ordering<'a> {
    pub field: &'a str,
    pub descending: bool,
}

impl<'a> Ordering<'a> {
    /// Devuelve el orden pedido si el campo está en `allowed`, si no el de defecto.
    pub fn parse(raw: Option<&'a str>, allowed: &[&'a str], default: Ordering<'a>) -> Self {
        let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
            return default;
        };
        let (field, descending) = match raw.strip_prefix('-') {
            Some(rest) => (rest, true),
            None => (raw, false),
        };
        match allowed.iter().find(|a| **a == field) {
            Some(field) => Ordering {
                field: *field,
                descending,
            },
            None => default,
        }
    }

    pub fn direction(&self) -> &'static str {
        if self.descending {
            "DESC"
        } else {
            "ASC"
        }
    }
}
