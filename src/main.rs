use std::time::Duration;

use actix_web::{middleware, App, HttpServer};
use dotenv::dotenv;

use crate::app::AppServices;
use crate::config::AppConfig;
use crate::database::setup_database;
use crate::logger::init_logger;
use crate::services::auth_service::AuthService;

mod app;
mod config;
mod database;
mod errors;
mod extractors;
mod handlers;
mod logger;
mod models;
mod services;
mod utils;

#[cfg(test)]
mod tests;

const PURGE_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Limpia cada hora los refresh tokens revocados que ya expiraron.
fn spawn_revocation_purge(auth_service: AuthService) {
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(PURGE_INTERVAL).await;
            match auth_service.purge_expired_revocations().await {
                Ok(0) => {}
                Ok(n) => log::info!("Purgados {} tokens revocados expirados", n),
                Err(e) => log::error!("Error purgando tokens revocados: {:?}", e),
            }
        }
    });
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok(); // Cargar .env al inicio
    init_logger();

    // 1) Configuración
    let config = AppConfig::from_env()?;

    // 2) Base de datos + migraciones
    let db_pool = setup_database(&config.database_url).await?;

    // 3) Servicios
    let services = AppServices::new(db_pool, config.clone());
    spawn_revocation_purge(services.auth_service.clone());

    // 4) Levantar servidor
    log::info!(
        "Levantando servidor en {}:{}",
        config.bind_address,
        config.port
    );
    let mut server = HttpServer::new(move || {
        let services = services.clone();
        App::new()
            .wrap(middleware::Logger::default())
            .configure(|cfg| services.register(cfg))
            .configure(app::init_app)
    });
    if let Some(workers) = config.workers {
        server = server.workers(workers);
    }

    server
        .bind((config.bind_address.as_str(), config.port))?
        .run()
        .await?;
    Ok(())
}
