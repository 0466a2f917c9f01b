use actix_web::web::*;

use crate::handlers::{budget, financial_goal, transaction};

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/routes")
            .service(resource("/income").route(post().to(transaction::add_income)))
            .service(
                resource("/income/{income_id}")
                    .route(put().to(transaction::update_income))
                    .route(delete().to(transaction::delete_income)),
            )
            .service(resource("/expense").route(post().to(transaction::add_expense)))
            .service(
                resource("/expense/{expense_id}")
                    .route(put().to(transaction::update_expense))
                    .route(delete().to(transaction::delete_expense)),
            )
            .service(resource("/transactions").route(get().to(transaction::search)))
            .service(resource("/recent_transactions").route(get().to(transaction::recent)))
            .service(resource("/balance").route(get().to(transaction::balance)))
            .service(resource("/monthly_summary").route(get().to(transaction::monthly_summary)))
            .service(
                resource("/budget")
                    .route(post().to(budget::create))
                    .route(get().to(budget::list)),
            )
            .service(
                resource("/budget/{budget_id}")
                    .route(get().to(budget::get))
                    .route(put().to(budget::edit))
                    .route(delete().to(budget::delete)),
            )
            .service(
                resource("/financial_goals")
                    .route(post().to(financial_goal::create))
                    .route(get().to(financial_goal::list)),
            )
            .service(
                resource("/financial_goals/{goal_id}")
                    .route(get().to(financial_goal::get))
                    .route(put().to(financial_goal::edit))
                    .route(delete().to(financial_goal::delete)),
            ),
    );
}
