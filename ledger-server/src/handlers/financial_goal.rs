use ledger_common::accounting::Ledger;
use ledger_common::db::Store;
use ledger_common::request_io::outputs::{
    OutputFinancialGoals, OutputMessage, OutputRecordCreated,
};

use actix_web::{web, HttpResponse};
use serde_json::{Map, Value};

use crate::handlers::error::HttpErrorResponse;
use crate::middleware::auth::VerifiedToken;

pub async fn create(
    store: web::Data<dyn Store>,
    token: VerifiedToken,
    goal_data: web::Json<Map<String, Value>>,
) -> Result<HttpResponse, HttpErrorResponse> {
    let store = store.into_inner();

    let id = web::block(move || {
        Ledger::new(&store).add_financial_goal(token.user_id(), goal_data.into_inner())
    })
    .await??;

    Ok(HttpResponse::Created().json(OutputRecordCreated {
        message: String::from("Financial goal created successfully"),
        id,
    }))
}

pub async fn list(
    store: web::Data<dyn Store>,
    token: VerifiedToken,
) -> Result<HttpResponse, HttpErrorResponse> {
    let store = store.into_inner();

    let financial_goals =
        web::block(move || Ledger::new(&store).list_financial_goals(token.user_id())).await??;

    Ok(HttpResponse::Ok().json(OutputFinancialGoals { financial_goals }))
}

pub async fn get(
    store: web::Data<dyn Store>,
    token: VerifiedToken,
    goal_id: web::Path<i32>,
) -> Result<HttpResponse, HttpErrorResponse> {
    let store = store.into_inner();
    let goal_id = goal_id.into_inner();

    let goal = web::block(move || Ledger::new(&store).get_financial_goal(token.user_id(), goal_id))
        .await??;

    Ok(HttpResponse::Ok().json(goal))
}

pub async fn edit(
    store: web::Data<dyn Store>,
    token: VerifiedToken,
    goal_id: web::Path<i32>,
    patch: web::Json<Map<String, Value>>,
) -> Result<HttpResponse, HttpErrorResponse> {
    let store = store.into_inner();
    let goal_id = goal_id.into_inner();

    let goal = web::block(move || {
        Ledger::new(&store).update_financial_goal(token.user_id(), goal_id, patch.into_inner())
    })
    .await??;

    Ok(HttpResponse::Ok().json(goal))
}

pub async fn delete(
    store: web::Data<dyn Store>,
    token: VerifiedToken,
    goal_id: web::Path<i32>,
) -> Result<HttpResponse, HttpErrorResponse> {
    let store = store.into_inner();
    let goal_id = goal_id.into_inner();

    web::block(move || Ledger::new(&store).delete_financial_goal(token.user_id(), goal_id))
        .await??;

    Ok(HttpResponse::Ok().json(OutputMessage {
        message: String::from("Financial goal deleted successfully"),
    }))
}
