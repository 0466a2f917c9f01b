use chrono::{Datelike, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::accounting::{
    merge_for_update, validate_one, AccountingError, Ledger, RecordKind, RecordPayload,
};
use crate::db::DateRange;
use crate::models::expense::Expense;
use crate::models::income::Income;
use crate::validators::{parse_date_str, validate_expense, validate_income};

pub const RECENT_TRANSACTION_LIMIT: i64 = 5;

const SUMMARY_MIN_YEAR: i32 = 1900;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MonthlySummary {
    pub year: i32,
    pub month: i32,
    pub total_income: f64,
    pub total_expenses: f64,
}

fn month_range(year: i32, month: u32) -> Option<DateRange> {
    let start = NaiveDate::from_ymd_opt(year, month, 1)?;
    let end = start.checked_add_months(Months::new(1))?.pred_opt()?;

    Some(DateRange { start, end })
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

impl Ledger {
    pub fn add_incomes(
        &self,
        user_id: i32,
        payload: RecordPayload,
    ) -> Result<Vec<i32>, AccountingError> {
        let records = payload.validate_all(validate_income)?;

        self.store
            .create_incomes(user_id, &records)
            .map_err(|e| AccountingError::from_dao(e, RecordKind::Income))
    }

    pub fn add_expenses(
        &self,
        user_id: i32,
        payload: RecordPayload,
    ) -> Result<Vec<i32>, AccountingError> {
        let records = payload.validate_all(validate_expense)?;

        self.store
            .create_expenses(user_id, &records)
            .map_err(|e| AccountingError::from_dao(e, RecordKind::Expense))
    }

    pub fn update_income(
        &self,
        user_id: i32,
        income_id: i32,
        patch: Map<String, Value>,
    ) -> Result<Income, AccountingError> {
        let stored = self
            .store
            .get_income(income_id, user_id)
            .map_err(|e| AccountingError::from_dao(e, RecordKind::Income))?;

        let fields = validate_one(&merge_for_update(&stored, patch)?, validate_income)?;

        self.store
            .update_income(income_id, user_id, &fields)
            .map_err(|e| AccountingError::from_dao(e, RecordKind::Income))
    }

    pub fn update_expense(
        &self,
        user_id: i32,
        expense_id: i32,
        patch: Map<String, Value>,
    ) -> Result<Expense, AccountingError> {
        let stored = self
            .store
            .get_expense(expense_id, user_id)
            .map_err(|e| AccountingError::from_dao(e, RecordKind::Expense))?;

        let fields = validate_one(&merge_for_update(&stored, patch)?, validate_expense)?;

        self.store
            .update_expense(expense_id, user_id, &fields)
            .map_err(|e| AccountingError::from_dao(e, RecordKind::Expense))
    }

    pub fn delete_income(&self, user_id: i32, income_id: i32) -> Result<(), AccountingError> {
        self.store
            .delete_income(income_id, user_id)
            .map_err(|e| AccountingError::from_dao(e, RecordKind::Income))
    }

    pub fn delete_expense(&self, user_id: i32, expense_id: i32) -> Result<(), AccountingError> {
        self.store
            .delete_expense(expense_id, user_id)
            .map_err(|e| AccountingError::from_dao(e, RecordKind::Expense))
    }

    /// Incomes and expenses of the user, narrowed to `start_date..=end_date` when both bounds
    /// are given. A lone bound is ignored. `category` only narrows expenses.
    pub fn search_transactions(
        &self,
        user_id: i32,
        start_date: Option<&str>,
        end_date: Option<&str>,
        category: Option<&str>,
    ) -> Result<(Vec<Income>, Vec<Expense>), AccountingError> {
        let range = match (non_empty(start_date), non_empty(end_date)) {
            (Some(start), Some(end)) => match (parse_date_str(start), parse_date_str(end)) {
                (Some(start), Some(end)) => Some(DateRange { start, end }),
                _ => {
                    return Err(AccountingError::Format(String::from(
                        "Invalid date format. Use YYYY-MM-DD",
                    )))
                }
            },
            _ => None,
        };

        if let Some(range) = range {
            if range.start > range.end {
                return Ok((Vec::new(), Vec::new()));
            }
        }

        let incomes = self.store.find_incomes(user_id, range)?;
        let expenses = self
            .store
            .find_expenses(user_id, range, non_empty(category))?;

        Ok((incomes, expenses))
    }

    pub fn recent_transactions(
        &self,
        user_id: i32,
    ) -> Result<(Vec<Income>, Vec<Expense>), AccountingError> {
        let incomes = self
            .store
            .recent_incomes(user_id, RECENT_TRANSACTION_LIMIT)?;
        let expenses = self
            .store
            .recent_expenses(user_id, RECENT_TRANSACTION_LIMIT)?;

        Ok((incomes, expenses))
    }

    pub fn balance(&self, user_id: i32) -> Result<f64, AccountingError> {
        let total_income = self.store.total_income(user_id, None)?;
        let total_expenses = self.store.total_expenses(user_id, None)?;

        Ok(total_income - total_expenses)
    }

    /// Income and expense totals for a calendar month. Missing year or month default to the
    /// current UTC date.
    pub fn monthly_summary(
        &self,
        user_id: i32,
        year: Option<i32>,
        month: Option<i32>,
    ) -> Result<MonthlySummary, AccountingError> {
        self.monthly_summary_as_of(user_id, year, month, Utc::now().date_naive())
    }

    pub fn monthly_summary_as_of(
        &self,
        user_id: i32,
        year: Option<i32>,
        month: Option<i32>,
        today: NaiveDate,
    ) -> Result<MonthlySummary, AccountingError> {
        let year = year.unwrap_or(today.year());
        let month = month.unwrap_or(today.month() as i32);

        if !(1..=12).contains(&month) {
            return Err(AccountingError::Range(String::from(
                "Invalid month. Must be between 1 and 12.",
            )));
        }

        if year < SUMMARY_MIN_YEAR || year > today.year() {
            return Err(AccountingError::Range(String::from("Invalid year.")));
        }

        let Some(range) = month_range(year, month as u32) else {
            return Err(AccountingError::Range(String::from("Invalid year.")));
        };

        Ok(MonthlySummary {
            year,
            month,
            total_income: self.store.total_income(user_id, Some(range))?,
            total_expenses: self.store.total_expenses(user_id, Some(range))?,
        })
    }
}
