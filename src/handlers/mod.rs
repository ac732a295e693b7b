//! handlers/mod.rs
//! Módulo que agrupa los handlers HTTP, uno por recurso de la API.

pub mod account_handler;
pub mod attribute_handler;
pub mod auth_handler;
pub mod category_handler;
pub mod company_handler;
pub mod onboarding_handler;
pub mod product_handler;
pub mod report_handler;
pub mod stock_handler;
pub mod template_handler;
pub mod warehouse_handler;
