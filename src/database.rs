//! database.rs
//! Conexión a SQLite y migraciones embebidas.

use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};

/// Conecta al `database_url` indicado y deja el esquema al día.
pub async fn setup_database(database_url: &str) -> Result<Pool<Sqlite>> {
    // 1) Crear la carpeta contenedora del archivo, si corresponde
    if let Some(dir) = database_dir(database_url) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("No se pudo crear el directorio {:?}", dir))?;
    }

    log::info!("Conectando a SQLite en {}", database_url);

    // 2) Conectarnos con SQLx
    let options = SqliteConnectOptions::from_str(database_url)
        .with_context(|| format!("DATABASE_URL inválida: {}", database_url))?
        .create_if_missing(true)
        .foreign_keys(true);

    let db_pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .context("No se pudo conectar a la base de datos SQLite")?;

    // 3) Migraciones
    run_migrations(&db_pool).await?;

    Ok(db_pool)
}

/// Base en memoria con una sola conexión (cada conexión `:memory:` es una base distinta).
pub async fn setup_memory_database() -> Result<Pool<Sqlite>> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

    let db_pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .context("No se pudo abrir la base en memoria")?;

    run_migrations(&db_pool).await?;
    Ok(db_pool)
}

pub async fn run_migrations(db_pool: &Pool<Sqlite>) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(db_pool)
        .await
        .context("Fallo al correr migraciones")?;
    Ok(())
}

fn database_dir(database_url: &str) -> Option<&Path> {
    let path = database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))?;
    let path = path.split('?').next().unwrap_or(path);

    if path.is_empty() || path.starts_with(":memory:") {
        return None;
    }

    Path::new(path)
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
}
