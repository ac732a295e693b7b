//! services/auth_service.rs
//! Hash de contraseñas, emisión/validación de JWT y lista de refresh tokens revocados.

use anyhow::Context;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use openssl::hash::MessageDigest;
use openssl::pkcs5::pbkdf2_hmac;
use openssl::rand::rand_bytes;
use sqlx::{Pool, Sqlite};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::errors::{ApiError, ApiResult, FieldError};
use crate::models::account_model::{Account, Claims, LoginRequest, TokenPair, TokenType};
use crate::services::account_service::AccountService;

const HASH_ALGORITHM: &str = "pbkdf2_sha256";
const SALT_LEN: usize = 16;
const KEY_LEN: usize = 32;

pub const INVALID_ACCESS_TOKEN: &str = "Given token not valid for any token type";
pub const INVALID_REFRESH_TOKEN: &str = "Invalid or expired refresh token.";
const BAD_CREDENTIALS: &str = "Account not found with the given credentials.";

/// `pbkdf2_sha256$<iteraciones>$<salt_b64>$<hash_b64>`
pub fn hash_password(password: &str, iterations: u32) -> anyhow::Result<String> {
    let mut salt = [0u8; SALT_LEN];
    rand_bytes(&mut salt).context("No se pudo generar el salt")?;

    let mut key = [0u8; KEY_LEN];
    pbkdf2_hmac(
        password.as_bytes(),
        &salt,
        iterations as usize,
        MessageDigest::sha256(),
        &mut key,
    )
    .context("Fallo al derivar la contraseña")?;

    Ok(format!(
        "{}${}${}${}",
        HASH_ALGORITHM,
        iterations,
        base64::encode(salt),
        base64::encode(key)
    ))
}

/// Comparación en tiempo constante. Un hash mal formado nunca verifica.
pub fn verify_password(password: &str, encoded: &str) -> bool {
    let parts: Vec<&str> = encoded.split('$').collect();
    let [algorithm, iterations, salt, expected] = parts.as_slice() else {
        return false;
    };
    if *algorithm != HASH_ALGORITHM {
        return false;
    }

    let (Ok(iterations), Ok(salt), Ok(expected)) = (
        iterations.parse::<usize>(),
        base64::decode(salt),
        base64::decode(expected),
    ) else {
        return false;
    };
    if iterations == 0 || expected.is_empty() {
        return false;
    }

    let mut derived = vec![0u8; expected.len()];
    if pbkdf2_hmac(
        password.as_bytes(),
        &salt,
        iterations,
        MessageDigest::sha256(),
        &mut derived,
    )
    .is_err()
    {
        return false;
    }

    derived.len() == expected.len() && openssl::memcmp::eq(&derived, &expected)
}

/// `hash_password` en el pool bloqueante de tokio, sin ocupar el worker de actix.
pub async fn hash_password_blocking(password: &str, iterations: u32) -> ApiResult<String> {
    let password = password.to_string();
    let encoded = tokio::task::spawn_blocking(move || hash_password(&password, iterations))
        .await
        .context("La tarea de hash fue interrumpida")??;
    Ok(encoded)
}

/// `verify_password` en el pool bloqueante de tokio.
pub async fn verify_password_blocking(password: &str, encoded: &str) -> ApiResult<bool> {
    let password = password.to_string();
    let encoded = encoded.to_string();
    let verified = tokio::task::spawn_blocking(move || verify_password(&password, &encoded))
        .await
        .context("La tarea de verificación fue interrumpida")?;
    Ok(verified)
}

/// Hash bien formado con el mismo costo que uno real. Ninguna contraseña lo verifica
/// en la práctica; se usa cuando el email no existe para igualar el tiempo de respuesta.
pub fn dummy_password_hash(iterations: u32) -> String {
    format!(
        "{}${}${}${}",
        HASH_ALGORITHM,
        iterations.max(1),
        base64::encode([0u8; SALT_LEN]),
        base64::encode([0u8; KEY_LEN])
    )
}

#[derive(Clone)]
pub struct AuthService {
    db_pool: Pool<Sqlite>,
    account_service: AccountService,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_lifetime: Duration,
    refresh_lifetime: Duration,
    dummy_hash: String,
}

impl AuthService {
    pub fn new(db_pool: Pool<Sqlite>, account_service: AccountService, config: &AppConfig) -> Self {
        AuthService {
            db_pool,
            account_service,
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            access_lifetime: Duration::minutes(config.access_token_minutes),
            refresh_lifetime: Duration::days(config.refresh_token_days),
            dummy_hash: dummy_password_hash(config.password_hash_iterations),
        }
    }

    pub fn refresh_lifetime(&self) -> Duration {
        self.refresh_lifetime
    }

    /// POST /api/v1/auth/login/
    pub async fn login(&self, req: LoginRequest) -> ApiResult<(Account, TokenPair)> {
        let mut errors = Vec::new();
        let email = req.email.as_deref().map(str::trim).filter(|e| !e.is_empty());
        let password = req.password.as_deref().filter(|p| !p.is_empty());
        if email.is_none() {
            errors.push(FieldError::new("email", "Email is required."));
        }
        if password.is_none() {
            errors.push(FieldError::new("password", "Password is required."));
        }
        let (Some(email), Some(password)) = (email, password) else {
            return Err(ApiError::Validation(errors));
        };

        let account = self.account_service.find_by_email(email).await?;
        let encoded = account
            .as_ref()
            .map_or(self.dummy_hash.as_str(), |a| a.password_hash.as_str());
        let verified = verify_password_blocking(password, encoded).await?;

        let account = match account {
            Some(account) if verified => account,
            _ => {
                log::warn!("Login fallido para {}", email);
                return Err(ApiError::bad_request(BAD_CREDENTIALS));
            }
        };
        if !account.is_active {
            return Err(ApiError::bad_request(
                "This account is deactivated. Please contact support.",
            ));
        }

        let tokens = self.issue_tokens(&account)?;
        log::info!("Login de cuenta {}", account.id);
        Ok((account, tokens))
    }

    pub fn issue_tokens(&self, account: &Account) -> ApiResult<TokenPair> {
        Ok(TokenPair {
            access: self.issue_token(account, TokenType::Access, self.access_lifetime)?,
            refresh: self.issue_token(account, TokenType::Refresh, self.refresh_lifetime)?,
        })
    }

    fn issue_token(
        &self,
        account: &Account,
        token_type: TokenType,
        lifetime: Duration,
    ) -> ApiResult<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: account.id.to_string(),
            email: account.email.clone(),
            role: account.role,
            is_staff: account.is_staff,
            token_type,
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: (now + lifetime).timestamp(),
        };
        self.encode_claims(&claims)
    }

    pub fn encode_claims(&self, claims: &Claims) -> ApiResult<String> {
        let token = encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .context("Fallo al firmar JWT")?;
        Ok(token)
    }

    fn decode_claims(&self, token: &str) -> Option<Claims> {
        let validation = Validation::new(Algorithm::HS256);
        match decode::<Claims>(token, &self.decoding_key, &validation) {
            Ok(data) => Some(data.claims),
            Err(e) => {
                log::debug!("JWT rechazado: {}", e);
                None
            }
        }
    }

    /// Sólo acepta access tokens vigentes y bien firmados.
    pub fn decode_access(&self, token: &str) -> ApiResult<Claims> {
        self.decode_claims(token)
            .filter(|claims| claims.token_type == TokenType::Access)
            .ok_or_else(|| ApiError::unauthorized(INVALID_ACCESS_TOKEN))
    }

    fn decode_refresh(&self, token: &str) -> ApiResult<Claims> {
        self.decode_claims(token)
            .filter(|claims| claims.token_type == TokenType::Refresh)
            .ok_or_else(|| ApiError::bad_request(INVALID_REFRESH_TOKEN))
    }

    /// Resuelve la cuenta dueña de un access token, releyendo su estado actual.
    pub async fn authenticate(&self, token: &str) -> ApiResult<Account> {
        let claims = self.decode_access(token)?;
        let account_id = claims
            .account_id()
            .ok_or_else(|| ApiError::unauthorized(INVALID_ACCESS_TOKEN))?;

        match self.account_service.find_by_id(account_id).await? {
            Some(account) if account.is_active => Ok(account),
            Some(_) => Err(ApiError::unauthorized("User is inactive")),
            None => Err(ApiError::unauthorized("User not found")),
        }
    }

    /// Rota el refresh token: el presentado queda revocado y se emite un par nuevo.
    pub async fn refresh(&self, refresh_token: &str) -> ApiResult<TokenPair> {
        let claims = self.decode_refresh(refresh_token)?;
        let account_id = claims
            .account_id()
            .ok_or_else(|| ApiError::bad_request(INVALID_REFRESH_TOKEN))?;

        let account = match self.account_service.find_by_id(account_id).await? {
            Some(account) if account.is_active => account,
            _ => return Err(ApiError::bad_request(INVALID_REFRESH_TOKEN)),
        };

        self.revoke_claims(&claims).await?;
        self.issue_tokens(&account)
    }

    pub async fn revoke(&self, refresh_token: &str) -> ApiResult<()> {
        let claims = self.decode_refresh(refresh_token)?;
        self.revoke_claims(&claims).await
    }

    /// Un `jti` ya revocado no se puede volver a usar.
    async fn revoke_claims(&self, claims: &Claims) -> ApiResult<()> {
        let inserted = sqlx::query(
            "INSERT INTO revoked_tokens (jti, expires_at) VALUES (?, ?) ON CONFLICT(jti) DO NOTHING",
        )
        .bind(&claims.jti)
        .bind(claims.exp)
        .execute(&self.db_pool)
        .await?
        .rows_affected();

        if inserted == 1 {
            Ok(())
        } else {
            log::warn!("Refresh token reutilizado (jti {})", claims.jti);
            Err(ApiError::bad_request(INVALID_REFRESH_TOKEN))
        }
    }

    pub async fn purge_expired_revocations(&self) -> anyhow::Result<u64> {
        let purged = sqlx::query("DELETE FROM revoked_tokens WHERE expires_at < ?")
            .bind(Utc::now().timestamp())
            .execute(&self.db_pool)
            .await
            .context("Fallo al purgar tokens revocados")?
            .rows_affected();
        Ok(purged)
    }
}
