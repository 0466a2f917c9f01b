use ledger_common::accounting::{Ledger, RecordPayload};
use ledger_common::db::Store;
use ledger_common::request_io::inputs::{InputMonthlySummaryQuery, InputTransactionQuery};
use ledger_common::request_io::outputs::{
    OutputBalance, OutputMessage, OutputRecentTransactions, OutputRecordsCreated,
    OutputTransactions,
};

use actix_web::{web, HttpResponse};
use serde_json::{Map, Value};

use crate::handlers::error::HttpErrorResponse;
use crate::middleware::auth::VerifiedToken;

fn created_message(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{singular} added successfully")
    } else {
        format!("{count} {plural} added successfully")
    }
}

pub async fn add_income(
    store: web::Data<dyn Store>,
    token: VerifiedToken,
    body: web::Json<Value>,
) -> Result<HttpResponse, HttpErrorResponse> {
    let payload = RecordPayload::try_from(body.into_inner())?;
    let store = store.into_inner();

    let ids =
        web::block(move || Ledger::new(&store).add_incomes(token.user_id(), payload)).await??;

    Ok(HttpResponse::Created().json(OutputRecordsCreated {
        message: created_message(ids.len(), "Income", "incomes"),
        ids,
    }))
}

pub async fn add_expense(
    store: web::Data<dyn Store>,
    token: VerifiedToken,
    body: web::Json<Value>,
) -> Result<HttpResponse, HttpErrorResponse> {
    let payload = RecordPayload::try_from(body.into_inner())?;
    let store = store.into_inner();

    let ids =
        web::block(move || Ledger::new(&store).add_expenses(token.user_id(), payload)).await??;

    Ok(HttpResponse::Created().json(OutputRecordsCreated {
        message: created_message(ids.len(), "Expense", "expenses"),
        ids,
    }))
}

pub async fn update_income(
    store: web::Data<dyn Store>,
    token: VerifiedToken,
    income_id: web::Path<i32>,
    patch: web::Json<Map<String, Value>>,
) -> Result<HttpResponse, HttpErrorResponse> {
    let store = store.into_inner();
    let income_id = income_id.into_inner();

    let income = web::block(move || {
        Ledger::new(&store).update_income(token.user_id(), income_id, patch.into_inner())
    })
    .await??;

    Ok(HttpResponse::Ok().json(income))
}

pub async fn update_expense(
    store: web::Data<dyn Store>,
    token: VerifiedToken,
    expense_id: web::Path<i32>,
    patch: web::Json<Map<String, Value>>,
) -> Result<HttpResponse, HttpErrorResponse> {
    let store = store.into_inner();
    let expense_id = expense_id.into_inner();

    let expense = web::block(move || {
        Ledger::new(&store).update_expense(token.user_id(), expense_id, patch.into_inner())
    })
    .await??;

    Ok(HttpResponse::Ok().json(expense))
}

pub async fn delete_income(
    store: web::Data<dyn Store>,
    token: VerifiedToken,
    income_id: web::Path<i32>,
) -> Result<HttpResponse, HttpErrorResponse> {
    let store = store.into_inner();
    let income_id = income_id.into_inner();

    web::block(move || Ledger::new(&store).delete_income(token.user_id(), income_id)).await??;

    Ok(HttpResponse::Ok().json(OutputMessage {
        message: String::from("Income deleted successfully"),
    }))
}

pub async fn delete_expense(
    store: web::Data<dyn Store>,
    token: VerifiedToken,
    expense_id: web::Path<i32>,
) -> Result<HttpResponse, HttpErrorResponse> {
    let store = store.into_inner();
    let expense_id = expense_id.into_inner();

    web::block(move || Ledger::new(&store).delete_expense(token.user_id(), expense_id))
        .await??;

    Ok(HttpResponse::Ok().json(OutputMessage {
        message: String::from("Expense deleted successfully"),
    }))
}

pub async fn search(
    store: web::Data<dyn Store>,
    token: VerifiedToken,
    query: web::Query<InputTransactionQuery>,
) -> Result<HttpResponse, HttpErrorResponse> {
    let store = store.into_inner();
    let query = query.into_inner();

    let (incomes, expenses) = web::block(move || {
        Ledger::new(&store).search_transactions(
            token.user_id(),
            query.start_date.as_deref(),
            query.end_date.as_deref(),
            query.category.as_deref(),
        )
    })
    .await??;

    Ok(HttpResponse::Ok().json(OutputTransactions { incomes, expenses }))
}

pub async fn recent(
    store: web::Data<dyn Store>,
    token: VerifiedToken,
) -> Result<HttpResponse, HttpErrorResponse> {
    let store = store.into_inner();

    let (recent_incomes, recent_expenses) =
        web::block(move || Ledger::new(&store).recent_transactions(token.user_id())).await??;

    Ok(HttpResponse::Ok().json(OutputRecentTransactions {
        recent_incomes,
        recent_expenses,
    }))
}

pub async fn balance(
    store: web::Data<dyn Store>,
    token: VerifiedToken,
) -> Result<HttpResponse, HttpErrorResponse> {
    let store = store.into_inner();

    let balance = web::block(move || Ledger::new(&store).balance(token.user_id())).await??;

    Ok(HttpResponse::Ok().json(OutputBalance { balance }))
}

pub async fn monthly_summary(
    store: web::Data<dyn Store>,
    token: VerifiedToken,
    query: web::Query<InputMonthlySummaryQuery>,
) -> Result<HttpResponse, HttpErrorResponse> {
    let store = store.into_inner();
    let InputMonthlySummaryQuery { year, month } = query.into_inner();

    let summary =
        web::block(move || Ledger::new(&store).monthly_summary(token.user_id(), year, month))
            .await??;

    Ok(HttpResponse::Ok().json(summary))
}

#[cfg(test)]
mod tests {
    use super::*;

    use actix_web::http::{header, StatusCode};
    use actix_web::test::{self, TestRequest};
    use chrono::{Datelike, Utc};
    use ledger_common::accounting::MonthlySummary;
    use ledger_common::models::expense::Expense;
    use ledger_common::models::income::Income;
    use ledger_common::request_io::outputs::{ErrorType, ServerErrorResponse};
    use serde_json::json;

    use crate::handlers::test_utils::{init_app, TestContext};

    #[actix_web::test]
    async fn test_add_and_search_transactions() {
        let ctx = TestContext::new();
        let app = init_app!(ctx);
        let (_, bearer) = ctx.create_user();

        let req = TestRequest::post()
            .uri("/routes/expense")
            .insert_header((header::AUTHORIZATION, bearer.as_str()))
            .set_json(json!({ "amount": 50.0, "category": "Food", "date": "2024-03-15" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let created: OutputRecordsCreated = test::read_body_json(resp).await;
        assert_eq!(created.ids.len(), 1);

        let req = TestRequest::post()
            .uri("/routes/income")
            .insert_header((header::AUTHORIZATION, bearer.as_str()))
            .set_json(json!([
                { "amount": 1000, "source": "Salary", "date": "2024-03-01" },
                { "amount": "250.5", "source": "Freelance", "date": "2024-04-02" },
            ]))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let created: OutputRecordsCreated = test::read_body_json(resp).await;
        assert_eq!(created.ids.len(), 2);

        let req = TestRequest::get()
            .uri("/routes/transactions?start_date=2024-03-01&end_date=2024-03-31")
            .insert_header((header::AUTHORIZATION, bearer.as_str()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let found: OutputTransactions = test::read_body_json(resp).await;
        assert_eq!(found.incomes.len(), 1);
        assert_eq!(found.incomes[0].source, "Salary");
        assert_eq!(found.expenses.len(), 1);
        assert_eq!(found.expenses[0].amount, 50.0);
        assert_eq!(found.expenses[0].category, "Food");
        assert_eq!(found.expenses[0].date.to_string(), "2024-03-15");

        let req = TestRequest::get()
            .uri("/routes/transactions?category=Rent")
            .insert_header((header::AUTHORIZATION, bearer.as_str()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        let found: OutputTransactions = test::read_body_json(resp).await;
        assert_eq!(found.incomes.len(), 2);
        assert!(found.expenses.is_empty());

        let req = TestRequest::get()
            .uri("/routes/transactions?start_date=03-01-2024&end_date=2024-03-31")
            .insert_header((header::AUTHORIZATION, bearer.as_str()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: ServerErrorResponse = test::read_body_json(resp).await;
        assert_eq!(body.err_type, ErrorType::IncorrectlyFormed);

        let req = TestRequest::get()
            .uri("/routes/transactions?start_date=%2B2024-1-05&end_date=2024-03-31")
            .insert_header((header::AUTHORIZATION, bearer.as_str()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_rejects_loose_dates_and_huge_amounts() {
        let ctx = TestContext::new();
        let app = init_app!(ctx);
        let (_, bearer) = ctx.create_user();

        let req = TestRequest::post()
            .uri("/routes/income")
            .insert_header((header::AUTHORIZATION, bearer.as_str()))
            .set_json(json!({ "amount": 1, "source": "Salary", "date": "+2024-1-05" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: ServerErrorResponse = test::read_body_json(resp).await;
        assert_eq!(body.err_type, ErrorType::InvalidInput);
        assert!(body.field_errors.unwrap().get("date").is_some());

        let req = TestRequest::post()
            .uri("/routes/income")
            .insert_header((header::AUTHORIZATION, bearer.as_str()))
            .set_json(json!([
                { "amount": 1e308, "source": "Salary", "date": "2024-01-05" },
                { "amount": 1e308, "source": "Bonus", "date": "2024-01-06" },
            ]))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = TestRequest::get()
            .uri("/routes/balance")
            .insert_header((header::AUTHORIZATION, bearer.as_str()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["balance"], json!(0.0));
    }

    #[actix_web::test]
    async fn test_batch_is_atomic() {
        let ctx = TestContext::new();
        let app = init_app!(ctx);
        let (_, bearer) = ctx.create_user();

        let req = TestRequest::post()
            .uri("/routes/expense")
            .insert_header((header::AUTHORIZATION, bearer.as_str()))
            .set_json(json!([
                { "amount": 10, "category": "Food", "date": "2024-01-01" },
                { "amount": -5, "category": "Food", "date": "2024-01-02" },
                { "amount": 7, "category": "", "date": "2024-01-03" },
            ]))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: ServerErrorResponse = test::read_body_json(resp).await;
        assert_eq!(body.err_type, ErrorType::InvalidInput);
        let field_errors = body.field_errors.unwrap();
        assert!(field_errors.get("0").is_none());
        assert!(field_errors.get("1").unwrap().get("amount").is_some());
        assert!(field_errors.get("2").unwrap().get("category").is_some());

        let req = TestRequest::get()
            .uri("/routes/transactions")
            .insert_header((header::AUTHORIZATION, bearer.as_str()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        let found: OutputTransactions = test::read_body_json(resp).await;
        assert!(found.expenses.is_empty());

        for bad_body in [json!([]), json!([1, 2]), json!("income")] {
            let req = TestRequest::post()
                .uri("/routes/income")
                .insert_header((header::AUTHORIZATION, bearer.as_str()))
                .set_json(bad_body)
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

            let body: ServerErrorResponse = test::read_body_json(resp).await;
            assert_eq!(body.err_type, ErrorType::IncorrectlyFormed);
        }
    }

    #[actix_web::test]
    async fn test_update_and_delete() {
        let ctx = TestContext::new();
        let app = init_app!(ctx);
        let (_, bearer) = ctx.create_user();
        let (_, other_bearer) = ctx.create_user();

        let req = TestRequest::post()
            .uri("/routes/income")
            .insert_header((header::AUTHORIZATION, bearer.as_str()))
            .set_json(json!({
                "amount": 1000,
                "source": "Salary",
                "date": "2024-01-05",
                "description": "January",
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        let created: OutputRecordsCreated = test::read_body_json(resp).await;
        let income_id = created.ids[0];

        let req = TestRequest::put()
            .uri(&format!("/routes/income/{income_id}"))
            .insert_header((header::AUTHORIZATION, bearer.as_str()))
            .set_json(json!({ "amount": 1200 }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let updated: Income = test::read_body_json(resp).await;
        assert_eq!(updated.id, income_id);
        assert_eq!(updated.amount, 1200.0);
        assert_eq!(updated.source, "Salary");
        assert_eq!(updated.date.to_string(), "2024-01-05");
        assert_eq!(updated.description.as_deref(), Some("January"));

        let req = TestRequest::put()
            .uri(&format!("/routes/income/{income_id}"))
            .insert_header((header::AUTHORIZATION, other_bearer.as_str()))
            .set_json(json!({ "amount": 1 }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let body: ServerErrorResponse = test::read_body_json(resp).await;
        assert_eq!(body.err_type, ErrorType::IncomeDoesNotExist);

        let req = TestRequest::delete()
            .uri(&format!("/routes/income/{income_id}"))
            .insert_header((header::AUTHORIZATION, other_bearer.as_str()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let req = TestRequest::delete()
            .uri(&format!("/routes/income/{income_id}"))
            .insert_header((header::AUTHORIZATION, bearer.as_str()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let req = TestRequest::delete()
            .uri(&format!("/routes/income/{income_id}"))
            .insert_header((header::AUTHORIZATION, bearer.as_str()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_update_expense_rejects_bad_patch() {
        let ctx = TestContext::new();
        let app = init_app!(ctx);
        let (_, bearer) = ctx.create_user();

        let req = TestRequest::post()
            .uri("/routes/expense")
            .insert_header((header::AUTHORIZATION, bearer.as_str()))
            .set_json(json!({ "amount": 20, "category": "Transport", "date": "2024-02-02" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        let created: OutputRecordsCreated = test::read_body_json(resp).await;
        let expense_id = created.ids[0];

        let req = TestRequest::put()
            .uri(&format!("/routes/expense/{expense_id}"))
            .insert_header((header::AUTHORIZATION, bearer.as_str()))
            .set_json(json!({ "date": "2024-02-30" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: ServerErrorResponse = test::read_body_json(resp).await;
        assert_eq!(body.err_type, ErrorType::InvalidInput);

        let req = TestRequest::put()
            .uri(&format!("/routes/expense/{expense_id}"))
            .insert_header((header::AUTHORIZATION, bearer.as_str()))
            .set_json(json!({ "category": "Travel" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        let updated: Expense = test::read_body_json(resp).await;
        assert_eq!(updated.category, "Travel");
        assert_eq!(updated.amount, 20.0);
    }

    #[actix_web::test]
    async fn test_balance_recent_and_summary() {
        let ctx = TestContext::new();
        let app = init_app!(ctx);
        let (_, bearer) = ctx.create_user();

        let req = TestRequest::post()
            .uri("/routes/income")
            .insert_header((header::AUTHORIZATION, bearer.as_str()))
            .set_json(json!({ "amount": 1000, "source": "Salary", "date": "2024-01-05" }))
            .to_request();
        test::call_service(&app, req).await;

        let req = TestRequest::post()
            .uri("/routes/expense")
            .insert_header((header::AUTHORIZATION, bearer.as_str()))
            .set_json(json!({ "amount": 300, "category": "Rent", "date": "2024-01-10" }))
            .to_request();
        test::call_service(&app, req).await;

        for _ in 0..2 {
            let req = TestRequest::get()
                .uri("/routes/balance")
                .insert_header((header::AUTHORIZATION, bearer.as_str()))
                .to_request();
            let resp = test::call_service(&app, req).await;
            let balance: OutputBalance = test::read_body_json(resp).await;
            assert_eq!(balance.balance, 700.0);
        }

        let req = TestRequest::get()
            .uri("/routes/recent_transactions")
            .insert_header((header::AUTHORIZATION, bearer.as_str()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        let recent: OutputRecentTransactions = test::read_body_json(resp).await;
        assert_eq!(recent.recent_incomes.len(), 1);
        assert_eq!(recent.recent_expenses.len(), 1);

        let req = TestRequest::get()
            .uri("/routes/monthly_summary?year=2024&month=1")
            .insert_header((header::AUTHORIZATION, bearer.as_str()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let summary: MonthlySummary = test::read_body_json(resp).await;
        assert_eq!(
            summary,
            MonthlySummary {
                year: 2024,
                month: 1,
                total_income: 1000.0,
                total_expenses: 300.0,
            }
        );

        let req = TestRequest::get()
            .uri("/routes/monthly_summary")
            .insert_header((header::AUTHORIZATION, bearer.as_str()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        let summary: MonthlySummary = test::read_body_json(resp).await;
        assert_eq!(summary.year, Utc::now().year());

        let next_year = Utc::now().year() + 1;
        for uri in [
            String::from("/routes/monthly_summary?year=2024&month=13"),
            String::from("/routes/monthly_summary?year=1899&month=1"),
            format!("/routes/monthly_summary?year={next_year}&month=1"),
        ] {
            let req = TestRequest::get()
                .uri(&uri)
                .insert_header((header::AUTHORIZATION, bearer.as_str()))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

            let body: ServerErrorResponse = test::read_body_json(resp).await;
            assert_eq!(body.err_type, ErrorType::OutOfRange);
        }

        let req = TestRequest::get()
            .uri("/routes/monthly_summary?year=abc")
            .insert_header((header::AUTHORIZATION, bearer.as_str()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        let body: ServerErrorResponse = test::read_body_json(resp).await;
        assert_eq!(body.err_type, ErrorType::IncorrectlyFormed);
    }

    #[actix_web::test]
    async fn test_requires_token() {
        let ctx = TestContext::new();
        let app = init_app!(ctx);

        let req = TestRequest::get().uri("/routes/balance").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let req = TestRequest::get()
            .uri("/routes/balance")
            .insert_header((header::AUTHORIZATION, "Bearer garbage"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let body: ServerErrorResponse = test::read_body_json(resp).await;
        assert_eq!(body.err_type, ErrorType::BadToken);
    }
}
