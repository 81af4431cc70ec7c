//! HTTP API tests against the SQLite credential store

use auth::application::TokenService;
use auth::domain::value_object::{totp_secret::TotpSecret, user_name::UserName};
use auth::domain::repository::CredentialStore;
use auth::{AuthAppState, AuthConfig, SqliteCredentialStore, auth_router, ensure_admin};
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use platform::password::HashAlgorithm;
use serde_json::{Value, json};
use tower::ServiceExt;

const SECRET: &[u8] = b"http-test-signing-key-32-bytes!!";
const ADMIN_PASSWORD: &str = "admin123";
const USER_PASSWORD: &str = "Retoma-2024!";

struct TestApp {
    router: Router,
    state: AuthAppState<SqliteCredentialStore>,
}

async fn test_app_with(allow_signup: bool) -> TestApp {
    let store = SqliteCredentialStore::in_memory().await.unwrap();
    let fast = HashAlgorithm::Bcrypt { cost: 4 };
    ensure_admin(&store, ADMIN_PASSWORD.to_string(), fast)
        .await
        .unwrap();

    let mut config = AuthConfig::new(SECRET);
    config.hash_algorithm = fast;
    config.allow_signup = allow_signup;

    let state = AuthAppState::new(store, config).unwrap();
    TestApp {
        router: auth_router(state.clone()),
        state,
    }
}

async fn test_app() -> TestApp {
    test_app_with(false).await
}

impl TestApp {
    async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    async fn login(&self, username: &str, password: &str) -> String {
        let (status, body) = self
            .send(
                Method::POST,
                "/login",
                None,
                Some(json!({ "username": username, "password": password })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["token"].as_str().unwrap().to_string()
    }

    async fn create_user(&self, admin_token: &str, username: &str, role: Option<&str>) -> Value {
        let (status, body) = self
            .send(
                Method::POST,
                "/users",
                Some(admin_token),
                Some(json!({
                    "username": username,
                    "password": USER_PASSWORD,
                    "fullName": "Ana Silva",
                    "role": role,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body
    }
}

fn now() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp()).unwrap()
}

mod login {
    use super::*;

    #[tokio::test]
    async fn test_login_returns_token_and_account() {
        let app = test_app().await;

        let (status, body) = app
            .send(
                Method::POST,
                "/login",
                None,
                Some(json!({ "username": "admin", "password": ADMIN_PASSWORD })),
            )
            .await;

        assert_eq!(status, StatusCode::OK);
        assert!(body["token"].as_str().unwrap().split('.').count() == 3);
        assert_eq!(body["account"]["username"], "admin");
        assert_eq!(body["account"]["role"], "admin");
        assert!(body["account"]["id"].as_str().is_some());
    }

    #[tokio::test]
    async fn test_bad_credentials() {
        let app = test_app().await;

        for (username, password) in [("admin", "wrong-password"), ("ghost", ADMIN_PASSWORD)] {
            let (status, body) = app
                .send(
                    Method::POST,
                    "/login",
                    None,
                    Some(json!({ "username": username, "password": password })),
                )
                .await;
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            assert_eq!(body, json!({ "error": "invalid credentials", "status": 401 }));
        }
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let app = test_app().await;

        let request = Request::builder()
            .method(Method::POST)
            .uri("/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app.router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert!(body["error"].as_str().is_some());
    }
}

mod tokens {
    use super::*;

    #[tokio::test]
    async fn test_missing_token() {
        let app = test_app().await;

        let (status, body) = app.send(Method::GET, "/auth/me", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "missing token");
    }

    #[tokio::test]
    async fn test_garbage_and_expired_tokens_look_the_same() {
        let app = test_app().await;

        let admin = app
            .state
            .store
            .find_by_user_name(&UserName::parse("admin").unwrap())
            .await
            .unwrap()
            .unwrap();
        let issuer = TokenService::new(SECRET, 60).unwrap();
        let expired = issuer
            .issue_at(&admin, chrono::Utc::now().timestamp() - 120)
            .unwrap();
        let foreign = TokenService::new(b"some-other-signing-key-32-bytes!", 60)
            .unwrap()
            .issue(&admin)
            .unwrap();

        for token in ["garbage", expired.as_str(), foreign.as_str()] {
            let (status, body) = app.send(Method::GET, "/auth/me", Some(token), None).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            assert_eq!(body, json!({ "error": "invalid token", "status": 401 }));
        }
    }

    #[tokio::test]
    async fn test_me() {
        let app = test_app().await;
        let token = app.login("admin", ADMIN_PASSWORD).await;

        let (status, body) = app.send(Method::GET, "/auth/me", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["username"], "admin");
        assert_eq!(body["isAdmin"], true);
        assert_eq!(body["secondFactorEnabled"], false);
    }
}

mod second_factor {
    use super::*;

    async fn enroll(app: &TestApp, token: &str) -> TotpSecret {
        let (status, body) = app.send(Method::POST, "/2fa/setup", Some(token), None).await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert!(
            body["provisioningURI"]
                .as_str()
                .unwrap()
                .starts_with("otpauth://totp/")
        );
        assert!(!body["qrCode"].as_str().unwrap().is_empty());

        TotpSecret::from_base32(body["sharedSecretBase32"].as_str().unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_full_flow() {
        let app = test_app().await;
        let token = app.login("admin", ADMIN_PASSWORD).await;
        let secret = enroll(&app, &token).await;

        let (status, body) = app
            .send(
                Method::POST,
                "/2fa/confirm",
                Some(&token),
                Some(json!({
                    "sharedSecret": secret.as_base32(),
                    "code": secret.code_at(now()),
                })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "ok": true }));

        // Password alone is no longer enough
        let (status, body) = app
            .send(
                Method::POST,
                "/login",
                None,
                Some(json!({ "username": "admin", "password": ADMIN_PASSWORD })),
            )
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "second factor required");

        let (status, body) = app
            .send(
                Method::POST,
                "/login",
                None,
                Some(json!({
                    "username": "admin",
                    "password": ADMIN_PASSWORD,
                    "secondFactorCode": secret.code_at(now() - 300),
                })),
            )
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "invalid second factor");

        let (status, body) = app
            .send(
                Method::POST,
                "/login",
                None,
                Some(json!({
                    "username": "admin",
                    "password": ADMIN_PASSWORD,
                    "secondFactorCode": secret.code_at(now()),
                })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");

        let (_, me) = app.send(Method::GET, "/auth/me", Some(&token), None).await;
        assert_eq!(me["secondFactorEnabled"], true);
    }

    #[tokio::test]
    async fn test_confirm_with_wrong_code() {
        let app = test_app().await;
        let token = app.login("admin", ADMIN_PASSWORD).await;
        let secret = enroll(&app, &token).await;

        let (status, body) = app
            .send(
                Method::POST,
                "/2fa/confirm",
                Some(&token),
                Some(json!({
                    "sharedSecret": secret.as_base32(),
                    "code": secret.code_at(now() + 300),
                })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid enrollment code");

        // Nothing was stored, so password-only login still works
        app.login("admin", ADMIN_PASSWORD).await;
    }

    #[tokio::test]
    async fn test_disable() {
        let app = test_app().await;
        let token = app.login("admin", ADMIN_PASSWORD).await;
        let secret = enroll(&app, &token).await;
        app.send(
            Method::POST,
            "/2fa/confirm",
            Some(&token),
            Some(json!({ "sharedSecret": secret.as_base32(), "code": secret.code_at(now()) })),
        )
        .await;

        let (status, body) = app
            .send(
                Method::POST,
                "/2fa/disable",
                Some(&token),
                Some(json!({ "code": secret.code_at(now()) })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");

        app.login("admin", ADMIN_PASSWORD).await;
    }

    #[tokio::test]
    async fn test_requires_token() {
        let app = test_app().await;

        let (status, _) = app.send(Method::POST, "/2fa/setup", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}

mod users {
    use super::*;

    #[tokio::test]
    async fn test_non_admin_is_forbidden() {
        let app = test_app().await;
        let admin_token = app.login("admin", ADMIN_PASSWORD).await;
        app.create_user(&admin_token, "vera", Some("vendedor")).await;
        let token = app.login("vera", USER_PASSWORD).await;

        let (status, body) = app.send(Method::GET, "/users", Some(&token), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body, json!({ "error": "forbidden", "status": 403 }));

        // Authenticated but not admin-only
        let (status, body) = app.send(Method::GET, "/groups", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 3);
        assert_eq!(body[0], json!({ "name": "comercial", "displayName": "Comercial" }));
    }

    #[tokio::test]
    async fn test_crud() {
        let app = test_app().await;
        let token = app.login("admin", ADMIN_PASSWORD).await;

        let created = app.create_user(&token, "Vera", None).await;
        assert_eq!(created["role"], "vendedor");
        assert_eq!(created["fullName"], "Ana Silva");
        let id = created["id"].as_str().unwrap().to_string();

        let (status, body) = app
            .send(
                Method::POST,
                "/users",
                Some(&token),
                Some(json!({ "username": "vera", "password": USER_PASSWORD })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "username already exists");

        let (status, body) = app
            .send(
                Method::PATCH,
                &format!("/users/{id}"),
                Some(&token),
                Some(json!({ "role": "gerencia" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["role"], "gerencia");

        let (status, body) = app.send(Method::GET, "/users", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 2);

        let (status, _) = app
            .send(Method::DELETE, &format!("/users/{id}"), Some(&token), None)
            .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, body) = app
            .send(Method::DELETE, &format!("/users/{id}"), Some(&token), None)
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "account not found");
    }

    #[tokio::test]
    async fn test_unknown_group_and_bad_id() {
        let app = test_app().await;
        let token = app.login("admin", ADMIN_PASSWORD).await;

        let (status, body) = app
            .send(
                Method::POST,
                "/users",
                Some(&token),
                Some(json!({ "username": "vera", "password": USER_PASSWORD, "role": "marketing" })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "unknown group 'marketing'");

        let (status, _) = app
            .send(Method::DELETE, "/users/not-a-uuid", Some(&token), None)
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_admin_cannot_delete_self() {
        let app = test_app().await;
        let token = app.login("admin", ADMIN_PASSWORD).await;
        let (_, me) = app.send(Method::GET, "/auth/me", Some(&token), None).await;
        let id = me["id"].as_str().unwrap();

        let (status, body) = app
            .send(Method::DELETE, &format!("/users/{id}"), Some(&token), None)
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "you cannot delete your own account");
    }
}

mod signup {
    use super::*;

    #[tokio::test]
    async fn test_disabled_by_default() {
        let app = test_app().await;

        let (status, _) = app
            .send(
                Method::POST,
                "/signup",
                None,
                Some(json!({ "username": "novo", "password": USER_PASSWORD })),
            )
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_enabled() {
        let app = test_app_with(true).await;

        let (status, body) = app
            .send(
                Method::POST,
                "/signup",
                None,
                Some(json!({ "username": "novo", "password": USER_PASSWORD })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        assert_eq!(body["role"], "vendedor");
        assert_eq!(body["isAdmin"], false);

        app.login("novo", USER_PASSWORD).await;
    }
}

mod group_gate {
    use super::*;
    use auth::middleware::{RolePolicy, require_auth, require_roles};
    use axum::{Json, middleware, routing::get};

    /// The auth routes plus a reports route open to comercial and gerencia
    fn with_reports(app: TestApp) -> TestApp {
        let reports = Router::new()
            .route("/reports", get(|| async { Json(json!({ "report": "vendas" })) }))
            .route_layer(middleware::from_fn_with_state(
                RolePolicy::any_of(&["comercial", "gerencia"]),
                require_roles,
            ))
            .route_layer(middleware::from_fn_with_state(
                app.state.clone(),
                require_auth::<SqliteCredentialStore>,
            ));

        TestApp {
            router: app.router.merge(reports),
            state: app.state,
        }
    }

    #[tokio::test]
    async fn test_listed_groups_and_admin_pass() {
        let app = with_reports(test_app().await);
        let admin_token = app.login("admin", ADMIN_PASSWORD).await;
        app.create_user(&admin_token, "vera", Some("vendedor")).await;
        app.create_user(&admin_token, "caio", Some("comercial")).await;
        app.create_user(&admin_token, "gil", Some("gerencia")).await;

        let (status, body) = app
            .send(Method::GET, "/reports", Some(&app.login("vera", USER_PASSWORD).await), None)
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body, json!({ "error": "forbidden", "status": 403 }));

        for token in [
            app.login("caio", USER_PASSWORD).await,
            app.login("gil", USER_PASSWORD).await,
            admin_token,
        ] {
            let (status, body) = app.send(Method::GET, "/reports", Some(&token), None).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body, json!({ "report": "vendas" }));
        }
    }

    #[tokio::test]
    async fn test_token_is_checked_before_group() {
        let app = with_reports(test_app().await);

        let (status, body) = app.send(Method::GET, "/reports", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({ "error": "missing token", "status": 401 }));
    }
}
