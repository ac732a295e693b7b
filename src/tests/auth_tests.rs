//! tests/auth_tests.rs

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use crate::app::AppServices;
    use crate::database::setup_memory_database;
    use crate::errors::ApiError;
    use crate::models::account_model::{
        Claims, LoginRequest, RegisterRequest, SetPasswordRequest, TokenType,
    };
    use crate::services::auth_service::{
        dummy_password_hash, hash_password, hash_password_blocking, verify_password,
        verify_password_blocking, INVALID_ACCESS_TOKEN, INVALID_REFRESH_TOKEN,
    };
    use crate::tests::common::{register, test_config, test_services, PASSWORD};

    fn login_request(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: Some(email.to_string()),
            password: Some(password.to_string()),
        }
    }

    #[test]
    fn password_hash_round_trip() {
        let encoded = hash_password("hunter22", 1_000).unwrap();
        assert!(encoded.starts_with("pbkdf2_sha256$1000$"));
        assert!(verify_password("hunter22", &encoded));
        assert!(!verify_password("hunter23", &encoded));

        // mismo password, salt distinto
        let other = hash_password("hunter22", 1_000).unwrap();
        assert_ne!(encoded, other);
    }

    #[test]
    fn malformed_hashes_never_verify() {
        assert!(!verify_password("x", ""));
        assert!(!verify_password("x", "md5$1$abc$def"));
        assert!(!verify_password("x", "pbkdf2_sha256$0$AAAA$AAAA"));
        assert!(!verify_password("x", "pbkdf2_sha256$1000$%%%$AAAA"));
    }

    #[test]
    fn dummy_hash_costs_the_same_and_never_verifies() {
        let dummy = dummy_password_hash(1_000);
        assert!(dummy.starts_with("pbkdf2_sha256$1000$"));
        assert_eq!(dummy.split('$').count(), 4);
        assert!(!verify_password("", &dummy));
        assert!(!verify_password("hunter22", &dummy));
    }

    #[actix_rt::test]
    async fn hashing_runs_off_the_async_worker() {
        let encoded = hash_password_blocking("hunter22", 1_000).await.unwrap();
        assert!(verify_password_blocking("hunter22", &encoded).await.unwrap());
        assert!(!verify_password_blocking("hunter23", &encoded).await.unwrap());
    }

    #[actix_rt::test]
    async fn login_issues_access_and_refresh_tokens() {
        let services = test_services().await;
        let account = register(&services, "Ana@Example.com").await;
        assert_eq!(account.email, "ana@example.com");

        let (logged, tokens) = services
            .auth_service
            .login(login_request(" ana@example.com ", PASSWORD))
            .await
            .unwrap();
        assert_eq!(logged.id, account.id);

        let claims = services.auth_service.decode_access(&tokens.access).unwrap();
        assert_eq!(claims.token_type, TokenType::Access);
        assert_eq!(claims.account_id(), Some(account.id));

        let resolved = services.auth_service.authenticate(&tokens.access).await.unwrap();
        assert_eq!(resolved.email, "ana@example.com");
    }

    #[actix_rt::test]
    async fn login_rejects_bad_credentials() {
        let services = test_services().await;
        register(&services, "ana@example.com").await;

        for (email, password) in [("ana@example.com", "wrong-password"), ("nadie@example.com", PASSWORD)] {
            match services.auth_service.login(login_request(email, password)).await {
                Err(ApiError::BadRequest(msg)) => {
                    assert_eq!(msg, "Account not found with the given credentials.")
                }
                other => panic!("login inesperado: {:?}", other.map(|(a, _)| a.id)),
            }
        }

        match services.auth_service.login(LoginRequest::default()).await {
            Err(ApiError::Validation(errors)) => {
                let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
                assert_eq!(fields, vec!["email", "password"]);
            }
            other => panic!("se esperaba validación: {:?}", other.map(|(a, _)| a.id)),
        }
    }

    #[actix_rt::test]
    async fn expired_or_wrong_type_tokens_are_rejected() {
        let services = test_services().await;
        let account = register(&services, "ana@example.com").await;
        let tokens = services.auth_service.issue_tokens(&account).unwrap();

        // el refresh no sirve como access
        match services.auth_service.decode_access(&tokens.refresh) {
            Err(ApiError::Unauthorized(msg)) => assert_eq!(msg, INVALID_ACCESS_TOKEN),
            other => panic!("refresh aceptado como access: {:?}", other),
        }

        let now = Utc::now().timestamp();
        let expired = services
            .auth_service
            .encode_claims(&Claims {
                sub: account.id.to_string(),
                email: account.email.clone(),
                role: account.role,
                is_staff: false,
                token_type: TokenType::Access,
                jti: "expired".to_string(),
                iat: now - 7_200,
                exp: now - 3_600,
            })
            .unwrap();
        assert!(services.auth_service.authenticate(&expired).await.is_err());

        // firmado con otro secreto
        let foreign = AppServices::new(
            setup_memory_database().await.unwrap(),
            crate::config::AppConfig {
                jwt_secret: "otro-secreto".to_string(),
                ..test_config()
            },
        );
        let forged = foreign.auth_service.issue_tokens(&account).unwrap();
        assert!(services.auth_service.decode_access(&forged.access).is_err());
    }

    #[actix_rt::test]
    async fn refresh_rotates_and_revokes_previous_token() {
        let services = test_services().await;
        let account = register(&services, "ana@example.com").await;
        let first = services.auth_service.issue_tokens(&account).unwrap();

        let second = services.auth_service.refresh(&first.refresh).await.unwrap();
        assert_ne!(second.refresh, first.refresh);
        assert!(services.auth_service.decode_access(&second.access).is_ok());

        // reutilizar el refresh rotado falla
        match services.auth_service.refresh(&first.refresh).await {
            Err(ApiError::BadRequest(msg)) => assert_eq!(msg, INVALID_REFRESH_TOKEN),
            other => panic!("refresh reutilizado aceptado: {:?}", other.is_ok()),
        }

        // un access token no sirve para refrescar
        assert!(services.auth_service.refresh(&second.access).await.is_err());

        services.auth_service.revoke(&second.refresh).await.unwrap();
        assert!(services.auth_service.refresh(&second.refresh).await.is_err());
        assert!(services.auth_service.revoke(&second.refresh).await.is_err());
    }

    #[actix_rt::test]
    async fn deactivated_accounts_cannot_authenticate() {
        let db_pool = setup_memory_database().await.unwrap();
        let services = AppServices::new(db_pool.clone(), test_config());
        let account = register(&services, "ana@example.com").await;
        let tokens = services.auth_service.issue_tokens(&account).unwrap();

        sqlx::query("UPDATE accounts SET is_active = 0 WHERE id = ?")
            .bind(account.id)
            .execute(&db_pool)
            .await
            .unwrap();

        match services.auth_service.login(login_request("ana@example.com", PASSWORD)).await {
            Err(ApiError::BadRequest(msg)) => assert!(msg.contains("deactivated")),
            other => panic!("login de cuenta inactiva: {:?}", other.map(|(a, _)| a.id)),
        }
        match services.auth_service.authenticate(&tokens.access).await {
            Err(ApiError::Unauthorized(msg)) => assert_eq!(msg, "User is inactive"),
            other => panic!("access de cuenta inactiva: {:?}", other.map(|a| a.id)),
        }
        assert!(services.auth_service.refresh(&tokens.refresh).await.is_err());
    }

    #[actix_rt::test]
    async fn register_and_set_password_validate_input() {
        let services = test_services().await;
        let account = register(&services, "ana@example.com").await;

        match services
            .account_service
            .register(RegisterRequest {
                email: Some("ANA@example.com".to_string()),
                password: Some("corta".to_string()),
                re_password: Some("distinta".to_string()),
            })
            .await
        {
            Err(ApiError::Validation(errors)) => {
                assert!(errors.iter().any(|e| e.field == "email"));
                assert!(errors.iter().any(|e| e.field == "password" || e.field == "re_password"));
            }
            other => panic!("registro inválido aceptado: {:?}", other.map(|a| a.id)),
        }

        let change = |current: &str| SetPasswordRequest {
            current_password: Some(current.to_string()),
            new_password: Some("otra-clave-larga".to_string()),
            re_new_password: Some("otra-clave-larga".to_string()),
        };
        assert!(services
            .account_service
            .set_password(&account, change("equivocada"))
            .await
            .is_err());
        services
            .account_service
            .set_password(&account, change(PASSWORD))
            .await
            .unwrap();

        assert!(services
            .auth_service
            .login(login_request("ana@example.com", PASSWORD))
            .await
            .is_err());
        assert!(services
            .auth_service
            .login(login_request("ana@example.com", "otra-clave-larga"))
            .await
            .is_ok());
    }
}
