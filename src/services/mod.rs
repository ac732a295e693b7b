//! services/mod.rs
//! Módulo que agrupa las capas de negocio de la app (una por recurso).

pub mod account_service;
pub mod attribute_service;
pub mod auth_service;
pub mod category_service;
pub mod company_service;
pub mod product_service;
pub mod report_service;
pub mod specification;
pub mod stock_service;
pub mod template_service;
pub mod warehouse_service;
