//! tests/mod.rs
//! Pruebas del servicio; comparten la base en memoria y los fixtures de `common`.

mod common;

mod auth_tests;
mod company_tests;
mod database_tests;
mod report_tests;
mod specification_tests;
mod stock_tests;
mod utils_tests;
