use serde_json::{Map, Value};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::models::budget::BudgetFields;
use crate::models::expense::ExpenseFields;
use crate::models::financial_goal::FinancialGoalFields;
use crate::models::income::IncomeFields;

use crate::validators::{is_valid_email_address, FieldErrors, FieldReader, NOT_AN_EMAIL};

pub const SOURCE_MAX_LEN: usize = 100;
pub const CATEGORY_MAX_LEN: usize = 100;
pub const DESCRIPTION_MAX_LEN: usize = 255;
pub const GOAL_NAME_MAX_LEN: usize = 200;
pub const USERNAME_MAX_LEN: usize = 150;
pub const EMAIL_MAX_LEN: usize = 150;
pub const PASSWORD_MIN_LEN: usize = 6;
pub const PASSWORD_MAX_LEN: usize = 512;

pub const BUDGET_MIN_YEAR: i32 = 1900;
pub const BUDGET_MAX_YEAR: i32 = 9999;

#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct UserFields {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl fmt::Debug for UserFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserFields")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

pub fn validate_user(record: &Map<String, Value>) -> Result<UserFields, FieldErrors> {
    let mut reader = FieldReader::new(record);

    let username = reader.string("username", 1, USERNAME_MAX_LEN);
    let email = reader.string("email", 0, EMAIL_MAX_LEN);
    let password = reader.string("password", PASSWORD_MIN_LEN, PASSWORD_MAX_LEN);

    let email = match email {
        Some(e) if !is_valid_email_address(&e) => {
            reader.add_error("email", NOT_AN_EMAIL);
            None
        }
        e => e,
    };

    let fields = match (username, email, password) {
        (Some(username), Some(email), Some(password)) => Some(UserFields {
            username,
            email,
            password,
        }),
        _ => None,
    };

    reader.finish_into(&["username", "email", "password"], fields)
}

pub fn validate_income(record: &Map<String, Value>) -> Result<IncomeFields, FieldErrors> {
    let mut reader = FieldReader::new(record);

    let amount = reader.non_negative_number("amount");
    let source = reader.string("source", 1, SOURCE_MAX_LEN);
    let date = reader.date("date");
    let description = reader.optional_string("description", DESCRIPTION_MAX_LEN);

    let fields = match (amount, source, date, description) {
        (Some(amount), Some(source), Some(date), Some(description)) => Some(IncomeFields {
            amount,
            source,
            date,
            description,
        }),
        _ => None,
    };

    reader.finish_into(&["amount", "source", "date", "description"], fields)
}

pub fn validate_expense(record: &Map<String, Value>) -> Result<ExpenseFields, FieldErrors> {
    let mut reader = FieldReader::new(record);

    let amount = reader.non_negative_number("amount");
    let category = reader.string("category", 1, CATEGORY_MAX_LEN);
    let date = reader.date("date");
    let description = reader.optional_string("description", DESCRIPTION_MAX_LEN);

    let fields = match (amount, category, date, description) {
        (Some(amount), Some(category), Some(date), Some(description)) => Some(ExpenseFields {
            amount,
            category,
            date,
            description,
        }),
        _ => None,
    };

    reader.finish_into(&["amount", "category", "date", "description"], fields)
}

pub fn validate_budget(record: &Map<String, Value>) -> Result<BudgetFields, FieldErrors> {
    let mut reader = FieldReader::new(record);

    let category = reader.string("category", 0, CATEGORY_MAX_LEN);
    let limit = reader.number("limit");
    let year = reader.integer_in_range("year", BUDGET_MIN_YEAR, BUDGET_MAX_YEAR);
    let month = reader.integer_in_range("month", 1, 12);

    let fields = match (category, limit, year, month) {
        (Some(category), Some(limit), Some(year), Some(month)) => Some(BudgetFields {
            category,
            limit,
            year,
            month,
        }),
        _ => None,
    };

    reader.finish_into(&["category", "limit", "year", "month"], fields)
}

pub fn validate_financial_goal(
    record: &Map<String, Value>,
) -> Result<FinancialGoalFields, FieldErrors> {
    let mut reader = FieldReader::new(record);

    let goal_name = reader.string("goal_name", 0, GOAL_NAME_MAX_LEN);
    let target_amount = reader.number("target_amount");
    let current_amount = reader.number_or("current_amount", 0.0);
    let target_date = reader.date("target_date");

    let fields = match (goal_name, target_amount, current_amount, target_date) {
        (Some(goal_name), Some(target_amount), Some(current_amount), Some(target_date)) => {
            Some(FinancialGoalFields {
                goal_name,
                target_amount,
                current_amount,
                target_date,
            })
        }
        _ => None,
    };

    reader.finish_into(&["goal_name", "target_amount", "current_amount", "target_date"], fields)
}
