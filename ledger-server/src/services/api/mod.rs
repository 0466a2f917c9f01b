use actix_web::web::*;

use crate::handlers::error;

mod auth;
mod routes;

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.app_data(error::json_config())
        .app_data(error::query_config())
        .app_data(error::path_config())
        .configure(auth::configure)
        .configure(routes::configure);
}
