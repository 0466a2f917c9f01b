use actix_web::web::*;

use crate::handlers::auth;

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/auth")
            .service(resource("/signup").route(post().to(auth::signup)))
            .service(resource("/login").route(post().to(auth::login)))
            .service(resource("/logout").route(post().to(auth::logout))),
    );
}
