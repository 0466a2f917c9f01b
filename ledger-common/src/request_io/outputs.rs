use serde::{Deserialize, Serialize};

use crate::models::budget::Budget;
use crate::models::expense::Expense;
use crate::models::financial_goal::FinancialGoal;
use crate::models::income::Income;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub enum ErrorType {
    // 400
    InvalidInput,
    ConflictWithExisting,
    IncorrectlyFormed,
    OutOfRange,

    // 401
    IncorrectCredential,
    TokenMissing,
    BadToken,
    TokenExpired,

    // 404
    UserDoesNotExist,
    IncomeDoesNotExist,
    ExpenseDoesNotExist,
    BudgetDoesNotExist,
    FinancialGoalDoesNotExist,

    // 500
    InternalError,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ServerErrorResponse {
    pub err_type: ErrorType,
    pub err_message: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_errors: Option<serde_json::Value>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct OutputMessage {
    pub message: String,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct OutputUserCreated {
    pub message: String,
    pub user_id: i32,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct OutputAccessToken {
    pub message: String,
    pub access_token: String,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct OutputRecordsCreated {
    pub message: String,
    pub ids: Vec<i32>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct OutputRecordCreated {
    pub message: String,
    pub id: i32,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct OutputTransactions {
    pub incomes: Vec<Income>,
    pub expenses: Vec<Expense>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct OutputRecentTransactions {
    pub recent_incomes: Vec<Income>,
    pub recent_expenses: Vec<Expense>,
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
pub struct OutputBalance {
    pub balance: f64,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct OutputBudgets {
    pub budgets: Vec<Budget>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct OutputFinancialGoals {
    pub financial_goals: Vec<FinancialGoal>,
}
