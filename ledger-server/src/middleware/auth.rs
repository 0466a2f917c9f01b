use ledger_common::token::auth_token::{AuthToken, AuthTokenClaims};
use ledger_common::token::{Token, TokenError};

use actix_web::dev::Payload;
use actix_web::{web, FromRequest, HttpRequest};
use futures::future;

use crate::env::AuthConfig;
use crate::handlers::error::HttpErrorResponse;
use crate::middleware::bearer_token;

/// The claims of a signed, unexpired bearer token. Handlers that take this extractor reject
/// requests that don't carry one.
#[derive(Clone, Debug)]
pub struct VerifiedToken {
    pub claims: AuthTokenClaims,
}

impl VerifiedToken {
    pub fn user_id(&self) -> i32 {
        self.claims.user_id
    }
}

impl FromRequest for VerifiedToken {
    type Error = HttpErrorResponse;
    type Future = future::Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let Some(auth_config) = req.app_data::<web::Data<AuthConfig>>() else {
            log::error!("AuthConfig is missing from the app data");
            return future::err(HttpErrorResponse::InternalError(String::from(
                "Server is misconfigured",
            )));
        };

        let Some(token) = bearer_token(req) else {
            return future::err(TokenError::TokenMissing.into());
        };

        let decoded_token = match AuthToken::decode(token) {
            Ok(t) => t,
            Err(e) => return future::err(e.into()),
        };

        match decoded_token.into_verified(&auth_config.token_signing_key) {
            Ok(claims) => future::ok(VerifiedToken { claims }),
            Err(e) => future::err(e.into()),
        }
    }
}
