//! extractors.rs
//! Autenticación por Bearer token y chequeos de permisos por rol/empresa.

use std::ops::Deref;

use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::{web, FromRequest, HttpRequest};
use futures_util::future::LocalBoxFuture;

use crate::errors::{ApiError, ApiResult};
use crate::models::account_model::{Account, Role};
use crate::services::auth_service::AuthService;

const MISSING_CREDENTIALS: &str = "Authentication credentials were not provided.";

/// Cuenta dueña del access token del request, leída desde la base en cada request.
#[derive(Debug, Clone)]
pub struct AuthenticatedAccount(pub Account);

impl Deref for AuthenticatedAccount {
    type Target = Account;

    fn deref(&self) -> &Account {
        &self.0
    }
}

impl FromRequest for AuthenticatedAccount {
    type Error = ApiError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token = bearer_token(req);
        let auth_service = req.app_data::<web::Data<AuthService>>().cloned();

        Box::pin(async move {
            let token = token.ok_or_else(|| ApiError::unauthorized(MISSING_CREDENTIALS))?;
            let auth_service = auth_service.ok_or_else(|| {
                ApiError::Internal(anyhow::anyhow!("AuthService no registrado en la app"))
            })?;
            let account = auth_service.authenticate(&token).await?;
            Ok(AuthenticatedAccount(account))
        })
    }
}

fn bearer_token(req: &HttpRequest) -> Option<String> {
    let value = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then(|| token.to_string())
}

impl AuthenticatedAccount {
    /// Id de la empresa del usuario; 403 si aún no tiene una.
    pub fn require_company(&self) -> ApiResult<i64> {
        self.company_id.ok_or_else(|| {
            ApiError::forbidden("You must belong to a company to access this resource.")
        })
    }

    pub fn require_admin(&self) -> ApiResult<i64> {
        let company_id = self.require_company()?;
        if self.role != Role::Admin {
            return Err(ApiError::forbidden(
                "Only administrators can perform this action.",
            ));
        }
        Ok(company_id)
    }

    /// Administrador del sistema (catálogo global de atributos).
    pub fn require_staff(&self) -> ApiResult<()> {
        if !self.is_staff {
            return Err(ApiError::forbidden(
                "Only administrators can perform this action.",
            ));
        }
        Ok(())
    }

    pub fn require_stock_writer(&self) -> ApiResult<i64> {
        let company_id = self.require_company()?;
        if !self.role.can_modify_stock() {
            return Err(ApiError::forbidden(
                "Only administrators, managers and sellers can modify stock.",
            ));
        }
        Ok(company_id)
    }

    pub fn into_inner(self) -> Account {
        self.0
    }
}
