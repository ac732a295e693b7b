//! handlers/auth_handler.rs
//! Login, refresh y logout con el refresh token en cookie HttpOnly.

use actix_web::cookie::{time, Cookie, SameSite};
use actix_web::{web, HttpRequest, HttpResponse};

use crate::config::AppConfig;
use crate::errors::{ApiError, ApiResult};
use crate::extractors::AuthenticatedAccount;
use crate::models::account_model::{AccessTokenResponse, LoginRequest, VerifyTokenResponse};
use crate::models::common_model::DetailResponse;
use crate::services::auth_service::AuthService;

pub const REFRESH_COOKIE: &str = "refresh_token";

fn refresh_cookie<'c>(value: String, max_age_secs: i64, secure: bool) -> Cookie<'c> {
    Cookie::build(REFRESH_COOKIE, value)
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(max_age_secs))
        .finish()
}

fn cookie_token(req: &HttpRequest) -> ApiResult<String> {
    req.cookie(REFRESH_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::bad_request("Refresh token not found in cookies."))
}

/// POST /api/v1/auth/login/
pub async fn login_endpoint(
    auth_service: web::Data<AuthService>,
    config: web::Data<AppConfig>,
    body: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let (_, tokens) = auth_service.login(body.into_inner()).await?;

    let max_age = auth_service.refresh_lifetime().num_seconds();
    Ok(HttpResponse::Ok()
        .cookie(refresh_cookie(tokens.refresh, max_age, config.secure_cookies))
        .json(AccessTokenResponse {
            access: tokens.access,
        }))
}

/// POST /api/v1/auth/refresh/
pub async fn refresh_endpoint(
    auth_service: web::Data<AuthService>,
    config: web::Data<AppConfig>,
    req: HttpRequest,
) -> ApiResult<HttpResponse> {
    let token = cookie_token(&req)?;
    let tokens = auth_service.refresh(&token).await?;

    let max_age = auth_service.refresh_lifetime().num_seconds();
    Ok(HttpResponse::Ok()
        .cookie(refresh_cookie(tokens.refresh, max_age, config.secure_cookies))
        .json(AccessTokenResponse {
            access: tokens.access,
        }))
}

/// POST /api/v1/auth/logout/
pub async fn logout_endpoint(
    auth_service: web::Data<AuthService>,
    config: web::Data<AppConfig>,
    req: HttpRequest,
) -> ApiResult<HttpResponse> {
    let token = cookie_token(&req)?;
    auth_service.revoke(&token).await?;

    let mut removal = refresh_cookie(String::new(), 0, config.secure_cookies);
    removal.make_removal();
    Ok(HttpResponse::Ok().cookie(removal).json(DetailResponse {
        detail: "Successfully logged out.".to_string(),
    }))
}

/// GET /api/v1/auth/verify/
pub async fn verify_endpoint(account: AuthenticatedAccount) -> ApiResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(VerifyTokenResponse {
        valid: true,
        user_id: account.id,
        email: account.email.clone(),
    }))
}
