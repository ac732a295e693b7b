//! models/mod.rs
//! Módulo raíz para modelos/estructuras compartidas.

pub mod account_model;
pub mod attribute_model;
pub mod category_model;
pub mod common_model;
pub mod company_model;
pub mod product_model;
pub mod report_model;
pub mod stock_model;
pub mod template_model;
pub mod warehouse_model;
