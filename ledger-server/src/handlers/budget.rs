use ledger_common::accounting::Ledger;
use ledger_common::db::Store;
use ledger_common::request_io::outputs::{OutputBudgets, OutputMessage, OutputRecordCreated};

use actix_web::{web, HttpResponse};
use serde_json::{Map, Value};

use crate::handlers::error::HttpErrorResponse;
use crate::middleware::auth::VerifiedToken;

pub async fn create(
    store: web::Data<dyn Store>,
    token: VerifiedToken,
    budget_data: web::Json<Map<String, Value>>,
) -> Result<HttpResponse, HttpErrorResponse> {
    let store = store.into_inner();

    let id = web::block(move || {
        Ledger::new(&store).add_budget(token.user_id(), budget_data.into_inner())
    })
    .await??;

    Ok(HttpResponse::Created().json(OutputRecordCreated {
        message: String::from("Budget created successfully"),
        id,
    }))
}

pub async fn list(
    store: web::Data<dyn Store>,
    token: VerifiedToken,
) -> Result<HttpResponse, HttpErrorResponse> {
    let store = store.into_inner();

    let budgets = web::block(move || Ledger::new(&store).list_budgets(token.user_id())).await??;

    Ok(HttpResponse::Ok().json(OutputBudgets { budgets }))
}

pub async fn get(
    store: web::Data<dyn Store>,
    token: VerifiedToken,
    budget_id: web::Path<i32>,
) -> Result<HttpResponse, HttpErrorResponse> {
    let store = store.into_inner();
    let budget_id = budget_id.into_inner();

    let budget =
        web::block(move || Ledger::new(&store).get_budget(token.user_id(), budget_id)).await??;

    Ok(HttpResponse::Ok().json(budget))
}

pub async fn edit(
    store: web::Data<dyn Store>,
    token: VerifiedToken,
    budget_id: web::Path<i32>,
    patch: web::Json<Map<String, Value>>,
) -> Result<HttpResponse, HttpErrorResponse> {
    let store = store.into_inner();
    let budget_id = budget_id.into_inner();

    let budget = web::block(move || {
        Ledger::new(&store).update_budget(token.user_id(), budget_id, patch.into_inner())
    })
    .await??;

    Ok(HttpResponse::Ok().json(budget))
}

pub async fn delete(
    store: web::Data<dyn Store>,
    token: VerifiedToken,
    budget_id: web::Path<i32>,
) -> Result<HttpResponse, HttpErrorResponse> {
    let store = store.into_inner();
    let budget_id = budget_id.into_inner();

    web::block(move || Ledger::new(&store).delete_budget(token.user_id(), budget_id)).await??;

    Ok(HttpResponse::Ok().json(OutputMessage {
        message: String::from("Budget deleted successfully"),
    }))
}
