pub mod auth;

use actix_web::http::header;
use actix_web::HttpRequest;

const BEARER_PREFIX: &str = "Bearer ";

/// The token from an `Authorization: Bearer <token>` header, if the request carries one
fn bearer_token(req: &HttpRequest) -> Option<&str> {
    let header = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;

    if header.len() < BEARER_PREFIX.len()
        || !header[..BEARER_PREFIX.len()].eq_ignore_ascii_case(BEARER_PREFIX)
    {
        return None;
    }

    let token = header[BEARER_PREFIX.len()..].trim();

    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}
