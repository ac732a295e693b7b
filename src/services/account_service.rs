//! services/account_service.rs
//! Alta y mantenimiento de cuentas de usuario.

use sqlx::{Pool, Sqlite};

use crate::config::AppConfig;
use crate::errors::{ApiError, ApiResult, FieldError};
use crate::models::account_model::{
    Account, CreateTeamMemberRequest, RegisterRequest, Role, SetPasswordRequest,
    UpdateAccountRequest,
};
use crate::services::auth_service::{hash_password_blocking, verify_password_blocking};
use crate::utils::now_timestamp;

const MIN_PASSWORD_LEN: usize = 8;

#[derive(Clone, Debug)]
pub struct AccountService {
    db_pool: Pool<Sqlite>,
    hash_iterations: u32,
}

impl AccountService {
    pub fn new(db_pool: Pool<Sqlite>, config: &AppConfig) -> Self {
        AccountService {
            db_pool,
            hash_iterations: config.password_hash_iterations,
        }
    }

    pub async fn find_by_id(&self, id: i64) -> ApiResult<Option<Account>> {
        let account = sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.db_pool)
            .await?;
        Ok(account)
    }

    pub async fn find_by_email(&self, email: &str) -> ApiResult<Option<Account>> {
        let account = sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE email = ?")
            .bind(normalize_email(email))
            .fetch_optional(&self.db_pool)
            .await?;
        Ok(account)
    }

    /// Inserta una cuenta ya validada y la devuelve.
    pub async fn create_account(
        &self,
        email: &str,
        password: &str,
        role: Role,
        company_id: Option<i64>,
    ) -> ApiResult<Account> {
        let password_hash = hash_password_blocking(password, self.hash_iterations).await?;

        let id = sqlx::query(
            r#"
            INSERT INTO accounts (email, password_hash, role, company_id, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(normalize_email(email))
        .bind(password_hash)
        .bind(role.as_str())
        .bind(company_id)
        .bind(now_timestamp())
        .execute(&self.db_pool)
        .await?
        .last_insert_rowid();

        log::info!("Cuenta {} creada con rol {}", id, role);
        self.get_account(id).await
    }

    async fn get_account(&self, id: i64) -> ApiResult<Account> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Account not found."))
    }

    /// POST /api/v1/accounts/ : registro público, sin empresa y con rol viewer.
    pub async fn register(&self, req: RegisterRequest) -> ApiResult<Account> {
        let mut errors = Vec::new();

        let email = self.validate_new_email(req.email.as_deref(), &mut errors).await?;
        let password = validate_password_pair(
            "password",
            req.password.as_deref(),
            "re_password",
            req.re_password.as_deref(),
            &mut errors,
        );

        match (email, password, errors.is_empty()) {
            (Some(email), Some(password), true) => {
                self.create_account(&email, &password, Role::Viewer, None)
                    .await
            }
            _ => Err(ApiError::Validation(errors)),
        }
    }

    pub async fn update_me(&self, account: &Account, req: UpdateAccountRequest) -> ApiResult<Account> {
        if let Some(raw) = req.email.as_deref() {
            if normalize_email(raw) != account.email {
                let mut errors = Vec::new();
                let email = self.validate_new_email(Some(raw), &mut errors).await?;
                let Some(email) = email.filter(|_| errors.is_empty()) else {
                    return Err(ApiError::Validation(errors));
                };

                sqlx::query("UPDATE accounts SET email = ? WHERE id = ?")
                    .bind(email)
                    .bind(account.id)
                    .execute(&self.db_pool)
                    .await?;
            }
        }
        self.get_account(account.id).await
    }

    pub async fn set_password(&self, account: &Account, req: SetPasswordRequest) -> ApiResult<()> {
        let mut errors = Vec::new();

        match req.current_password.as_deref() {
            Some(current) => {
                if !verify_password_blocking(current, &account.password_hash).await? {
                    errors.push(FieldError::new("current_password", "Invalid password."));
                }
            }
            None => errors.push(FieldError::new("current_password", "This field is required.")),
        }

        let new_password = validate_password_pair(
            "new_password",
            req.new_password.as_deref(),
            "re_new_password",
            req.re_new_password.as_deref(),
            &mut errors,
        );

        let Some(new_password) = new_password.filter(|_| errors.is_empty()) else {
            return Err(ApiError::Validation(errors));
        };

        let password_hash = hash_password_blocking(&new_password, self.hash_iterations).await?;
        sqlx::query("UPDATE accounts SET password_hash = ? WHERE id = ?")
            .bind(password_hash)
            .bind(account.id)
            .execute(&self.db_pool)
            .await?;

        log::info!("Cuenta {} cambió su contraseña", account.id);
        Ok(())
    }

    pub async fn list_team(&self, company_id: i64) -> ApiResult<Vec<Account>> {
        let members = sqlx::query_as::<_, Account>(
            "SELECT * FROM accounts WHERE company_id = ? AND is_active = 1 ORDER BY email",
        )
        .bind(company_id)
        .fetch_all(&self.db_pool)
        .await?;
        Ok(members)
    }

    /// Un administrador agrega a alguien directamente a su empresa.
    pub async fn create_team_member(
        &self,
        company_id: i64,
        req: CreateTeamMemberRequest,
    ) -> ApiResult<Account> {
        let mut errors = Vec::new();
        let email = self.validate_new_email(req.email.as_deref(), &mut errors).await?;

        let password = match req.password.as_deref() {
            Some(p) if p.chars().count() >= MIN_PASSWORD_LEN => Some(p.to_string()),
            Some(_) => {
                errors.push(password_too_short("password"));
                None
            }
            None => {
                errors.push(FieldError::new("password", "This field is required."));
                None
            }
        };

        match (email, password, errors.is_empty()) {
            (Some(email), Some(password), true) => {
                let role = req.role.unwrap_or(Role::Viewer);
                self.create_account(&email, &password, role, Some(company_id))
                    .await
            }
            _ => Err(ApiError::Validation(errors)),
        }
    }

    async fn validate_new_email(
        &self,
        raw: Option<&str>,
        errors: &mut Vec<FieldError>,
    ) -> ApiResult<Option<String>> {
        let Some(raw) = raw else {
            errors.push(FieldError::new("email", "This field is required."));
            return Ok(None);
        };

        let email = normalize_email(raw);
        if !is_valid_email(&email) {
            errors.push(FieldError::new("email", "Enter a valid email address."));
            return Ok(None);
        }
        if self.find_by_email(&email).await?.is_some() {
            errors.push(FieldError::new(
                "email",
                "An account with this email already exists.",
            ));
            return Ok(None);
        }
        Ok(Some(email))
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Forma mínima `local@dominio.tld`, sin espacios.
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !email.chars().any(char::is_whitespace)
        && domain
            .split_once('.')
            .map(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
            .unwrap_or(false)
}

fn password_too_short(field: &str) -> FieldError {
    FieldError::new(
        field,
        format!(
            "This password is too short. It must contain at least {} characters.",
            MIN_PASSWORD_LEN
        ),
    )
}

fn validate_password_pair(
    field: &str,
    password: Option<&str>,
    confirm_field: &str,
    confirmation: Option<&str>,
    errors: &mut Vec<FieldError>,
) -> Option<String> {
    let Some(password) = password else {
        errors.push(FieldError::new(field, "This field is required."));
        return None;
    };
    if password.chars().count() < MIN_PASSWORD_LEN {
        errors.push(password_too_short(field));
        return None;
    }
    if confirmation != Some(password) {
        errors.push(FieldError::new(
            confirm_field,
            "The two password fields didn't match.",
        ));
        return None;
    }
    Some(password.to_string())
}
