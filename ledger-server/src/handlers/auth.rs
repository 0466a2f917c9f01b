use ledger_common::accounting::Ledger;
use ledger_common::db::Store;
use ledger_common::request_io::inputs::InputLogin;
use ledger_common::request_io::outputs::{OutputAccessToken, OutputMessage, OutputUserCreated};
use ledger_common::token::auth_token::{AuthToken, NewAuthTokenClaims};

use actix_web::{web, HttpResponse};
use serde_json::Value;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::oneshot;

use crate::env::AuthConfig;
use crate::handlers::error::HttpErrorResponse;
use crate::middleware::auth::VerifiedToken;

pub async fn signup(
    store: web::Data<dyn Store>,
    auth_config: web::Data<AuthConfig>,
    user_data: web::Json<Value>,
) -> Result<HttpResponse, HttpErrorResponse> {
    let Value::Object(record) = user_data.into_inner() else {
        return Err(HttpErrorResponse::IncorrectlyFormed(String::from(
            "Expected a JSON object",
        )));
    };

    let store = store.into_inner();
    let store_ref = Arc::clone(&store);

    let fields = web::block(move || Ledger::new(&store_ref).check_new_user(&record)).await??;
    let fields = Arc::new(fields);
    let fields_ref = Arc::clone(&fields);

    let (sender, receiver) = oneshot::channel();

    rayon::spawn(move || {
        let hash_result = argon2_kdf::Hasher::default()
            .algorithm(argon2_kdf::Algorithm::Argon2id)
            .salt_length(auth_config.hash_salt_length)
            .hash_length(auth_config.hash_length)
            .iterations(auth_config.hash_iterations)
            .memory_cost_kib(auth_config.hash_mem_cost_kib)
            .threads(auth_config.hash_threads)
            .secret(argon2_kdf::Secret::using(&auth_config.hashing_key))
            .hash(fields_ref.password.as_bytes())
            .map(|h| h.to_string());

        // The receiver is gone only if the client disconnected
        let _ = sender.send(hash_result);
    });

    let password_hash = match receiver.await? {
        Ok(h) => h,
        Err(e) => {
            log::error!("{e}");
            return Err(HttpErrorResponse::InternalError(String::from(
                "Failed to hash password",
            )));
        }
    };

    let user_id =
        web::block(move || Ledger::new(&store).register_user(&fields, &password_hash)).await??;

    log::info!("Created user {user_id}");

    Ok(HttpResponse::Created().json(OutputUserCreated {
        message: String::from("User created successfully"),
        user_id,
    }))
}

pub async fn login(
    store: web::Data<dyn Store>,
    auth_config: web::Data<AuthConfig>,
    credentials: web::Json<InputLogin>,
) -> Result<HttpResponse, HttpErrorResponse> {
    let (Some(username), Some(_)) = (
        credentials.username.as_deref().filter(|u| !u.is_empty()),
        credentials.password.as_deref().filter(|p| !p.is_empty()),
    ) else {
        return Err(HttpErrorResponse::IncorrectlyFormed(String::from(
            "Username and password are required",
        )));
    };

    let username = String::from(username);
    let store = store.into_inner();

    let Some(user) = web::block(move || Ledger::new(&store).find_user(&username)).await?? else {
        return Err(HttpErrorResponse::IncorrectCredential(String::from(
            "Invalid credentials",
        )));
    };

    let credentials = Arc::new(credentials.into_inner());
    let credentials_ref = Arc::clone(&credentials);
    let auth_config_ref = auth_config.clone();
    let password_hash = user.password_hash.clone();

    let (sender, receiver) = oneshot::channel();

    rayon::spawn(move || {
        let password = credentials_ref.password.as_deref().unwrap_or_default();

        let does_password_match = match argon2_kdf::Hash::from_str(&password_hash) {
            Ok(hash) => hash.verify_with_secret(
                password.as_bytes(),
                argon2_kdf::Secret::using(&auth_config_ref.hashing_key),
            ),
            Err(e) => {
                log::error!("Stored password hash failed to parse: {e}");
                false
            }
        };

        let _ = sender.send(does_password_match);
    });

    if !receiver.await? {
        return Err(HttpErrorResponse::IncorrectCredential(String::from(
            "Invalid credentials",
        )));
    }

    let access_token = AuthToken::sign_new(
        NewAuthTokenClaims::expiring_in(
            user.id,
            &user.username,
            auth_config.access_token_lifetime,
        ),
        &auth_config.token_signing_key,
    );

    Ok(HttpResponse::Ok().json(OutputAccessToken {
        message: String::from("Login successful"),
        access_token,
    }))
}

/// Tokens are stateless, so logging out only confirms that the caller's token was valid. The
/// client discards it.
pub async fn logout(token: VerifiedToken) -> Result<HttpResponse, HttpErrorResponse> {
    log::info!("User {} logged out", token.user_id());

    Ok(HttpResponse::Ok().json(OutputMessage {
        message: String::from("Logged out successfully"),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    use actix_web::http::{header, StatusCode};
    use actix_web::test::{self, TestRequest};
    use ledger_common::request_io::outputs::{ErrorType, ServerErrorResponse};
    use serde_json::json;

    use crate::handlers::test_utils::{init_app, TestContext};

    #[actix_web::test]
    async fn test_signup_login_logout() {
        let ctx = TestContext::new();
        let app = init_app!(ctx);

        let req = TestRequest::post()
            .uri("/auth/signup")
            .set_json(json!({
                "username": "alice",
                "email": "alice@example.com",
                "password": "secret1",
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let created: OutputUserCreated = test::read_body_json(resp).await;
        let stored = ctx.store.get_user_by_username("alice").unwrap();
        assert_eq!(created.user_id, stored.id);
        assert_ne!(stored.password_hash, "secret1");

        let req = TestRequest::post()
            .uri("/auth/login")
            .set_json(json!({ "username": "alice", "password": "secret1" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let login: OutputAccessToken = test::read_body_json(resp).await;
        assert!(!login.access_token.is_empty());

        let req = TestRequest::post()
            .uri("/auth/logout")
            .insert_header((
                header::AUTHORIZATION,
                format!("Bearer {}", login.access_token),
            ))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let req = TestRequest::post().uri("/auth/logout").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let body: ServerErrorResponse = test::read_body_json(resp).await;
        assert_eq!(body.err_type, ErrorType::TokenMissing);
    }

    #[actix_web::test]
    async fn test_signup_rejections() {
        let ctx = TestContext::new();
        let app = init_app!(ctx);

        let req = TestRequest::post()
            .uri("/auth/signup")
            .set_json(json!({
                "username": "bob",
                "email": "bob@example.com",
                "password": "secret1",
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let req = TestRequest::post()
            .uri("/auth/signup")
            .set_json(json!({
                "username": "bob",
                "email": "other@example.com",
                "password": "secret1",
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: ServerErrorResponse = test::read_body_json(resp).await;
        assert_eq!(body.err_type, ErrorType::ConflictWithExisting);
        assert!(body.err_message.contains("Username already exists"));

        let req = TestRequest::post()
            .uri("/auth/signup")
            .set_json(json!({
                "username": "bobby",
                "email": "bob@example.com",
                "password": "secret1",
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        let body: ServerErrorResponse = test::read_body_json(resp).await;
        assert_eq!(body.err_type, ErrorType::ConflictWithExisting);
        assert!(body.err_message.contains("Email already exists"));

        let req = TestRequest::post()
            .uri("/auth/signup")
            .set_json(json!({
                "username": "carol",
                "email": "not-an-email",
                "password": "123",
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: ServerErrorResponse = test::read_body_json(resp).await;
        assert_eq!(body.err_type, ErrorType::InvalidInput);
        let field_errors = body.field_errors.unwrap();
        assert!(field_errors.get("email").is_some());
        assert!(field_errors.get("password").is_some());

        let req = TestRequest::post()
            .uri("/auth/signup")
            .set_json(json!(["not", "an", "object"]))
            .to_request();
        let resp = test::call_service(&app, req).await;
        let body: ServerErrorResponse = test::read_body_json(resp).await;
        assert_eq!(body.err_type, ErrorType::IncorrectlyFormed);
    }

    #[actix_web::test]
    async fn test_login_rejections() {
        let ctx = TestContext::new();
        let app = init_app!(ctx);

        let req = TestRequest::post()
            .uri("/auth/signup")
            .set_json(json!({
                "username": "dave",
                "email": "dave@example.com",
                "password": "secret1",
            }))
            .to_request();
        test::call_service(&app, req).await;

        let req = TestRequest::post()
            .uri("/auth/login")
            .set_json(json!({ "username": "dave", "password": "wrong-password" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let body: ServerErrorResponse = test::read_body_json(resp).await;
        assert_eq!(body.err_type, ErrorType::IncorrectCredential);

        let req = TestRequest::post()
            .uri("/auth/login")
            .set_json(json!({ "username": "nobody", "password": "secret1" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let req = TestRequest::post()
            .uri("/auth/login")
            .set_json(json!({ "username": "dave" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = TestRequest::post()
            .uri("/auth/login")
            .set_json(json!({ "username": "", "password": "secret1" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
