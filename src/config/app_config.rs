//! config/app_config.rs
//! Configuración global del servicio, leída desde variables de entorno (.env).

use std::env;
use std::str::FromStr;

use anyhow::{Context, Result};

const DEV_JWT_SECRET: &str = "insecure-dev-secret-change-me";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_address: String,
    pub port: u16,
    pub workers: Option<usize>,
    pub jwt_secret: String,
    pub access_token_minutes: i64,
    pub refresh_token_days: i64,
    pub password_hash_iterations: u32,
    pub default_page_size: u64,
    pub max_page_size: u64,
    pub secure_cookies: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            database_url: "sqlite:data/inventory.db".to_string(),
            bind_address: "0.0.0.0".to_string(),
            port: 5022,
            workers: None,
            jwt_secret: DEV_JWT_SECRET.to_string(),
            access_token_minutes: 15,
            refresh_token_days: 7,
            password_hash_iterations: 260_000,
            default_page_size: 10,
            max_page_size: 100,
            secure_cookies: false,
        }
    }
}

impl AppConfig {
    /// Construye la configuración a partir del entorno.
    /// Cualquier valor numérico inválido aborta el arranque.
    pub fn from_env() -> Result<Self> {
        let defaults = AppConfig::default();

        let jwt_secret = match env::var("JWT_SECRET") {
            Ok(secret) if !secret.trim().is_empty() => secret,
            _ => {
                log::warn!("JWT_SECRET no definido, usando secreto de desarrollo");
                defaults.jwt_secret.clone()
            }
        };

        let config = AppConfig {
            database_url: env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            bind_address: env::var("BIND_ADDRESS").unwrap_or(defaults.bind_address),
            port: parse_var("PORT", defaults.port)?,
            workers: parse_optional_var("WORKERS")?,
            jwt_secret,
            access_token_minutes: parse_var("ACCESS_TOKEN_LIFETIME", defaults.access_token_minutes)?,
            refresh_token_days: parse_var("REFRESH_TOKEN_LIFETIME", defaults.refresh_token_days)?,
            password_hash_iterations: parse_var(
                "PASSWORD_HASH_ITERATIONS",
                defaults.password_hash_iterations,
            )?,
            default_page_size: parse_var("PAGE_SIZE", defaults.default_page_size)?,
            max_page_size: parse_var("MAX_PAGE_SIZE", defaults.max_page_size)?,
            secure_cookies: parse_var("SECURE_COOKIES", defaults.secure_cookies)?,
        };

        anyhow::ensure!(config.default_page_size > 0, "PAGE_SIZE debe ser mayor a 0");
        anyhow::ensure!(
            config.max_page_size >= config.default_page_size,
            "MAX_PAGE_SIZE debe ser >= PAGE_SIZE"
        );
        anyhow::ensure!(
            config.access_token_minutes > 0 && config.refresh_token_days > 0,
            "Los tiempos de vida de los tokens deben ser positivos"
        );

        Ok(config)
    }
}

fn parse_var<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Valor inválido para {}: {:?}", key, raw)),
        Err(_) => Ok(default),
    }
}

fn parse_optional_var<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .with_context(|| format!("Valor inválido para {}: {:?}", key, raw)),
        Err(_) => Ok(None),
    }
}
