use chrono::NaiveDate;
use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, PooledConnection};
use diesel::result::DatabaseErrorKind;
use std::fmt;
use std::time::Duration;

pub mod budget;
pub mod expense;
pub mod financial_goal;
pub mod income;
pub mod memory;
pub mod user;

use crate::models::budget::{Budget, BudgetFields};
use crate::models::expense::{Expense, ExpenseFields};
use crate::models::financial_goal::{FinancialGoal, FinancialGoalFields};
use crate::models::income::{Income, IncomeFields};
use crate::models::user::User;

pub type DbThreadPool = diesel::r2d2::Pool<ConnectionManager<PgConnection>>;
pub type DbConnection = PooledConnection<ConnectionManager<PgConnection>>;

pub const USERNAME_UNIQUE_CONSTRAINT: &str = "users_username_key";
pub const EMAIL_UNIQUE_CONSTRAINT: &str = "users_email_key";
pub const BUDGET_PERIOD_UNIQUE_CONSTRAINT: &str = "budgets_user_id_category_year_month_key";

pub fn create_db_thread_pool(
    database_uri: &str,
    max_db_connections: u32,
    idle_timeout: Duration,
) -> Result<DbThreadPool, DaoError> {
    Ok(r2d2::Pool::builder()
        .max_size(max_db_connections)
        .idle_timeout(Some(idle_timeout))
        .build(ConnectionManager::<PgConnection>::new(database_uri))?)
}

#[derive(Debug)]
pub enum DaoError {
    DbThreadPoolFailure(r2d2::Error),
    QueryFailure(diesel::result::Error),
    UniqueViolation(String),
    CannotRunQuery(&'static str),
}

impl DaoError {
    pub fn not_found() -> Self {
        DaoError::QueryFailure(diesel::result::Error::NotFound)
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, DaoError::QueryFailure(diesel::result::Error::NotFound))
    }
}

impl std::error::Error for DaoError {}

impl fmt::Display for DaoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DaoError::DbThreadPoolFailure(e) => {
                write!(f, "DaoError: Failed to obtain DB connection: {e}")
            }
            DaoError::QueryFailure(e) => {
                write!(f, "DaoError: Query failed: {e}")
            }
            DaoError::UniqueViolation(constraint) => {
                write!(f, "DaoError: Unique constraint violated: {constraint}")
            }
            DaoError::CannotRunQuery(msg) => {
                write!(f, "DaoError: Cannot run query: {msg}")
            }
        }
    }
}

impl From<r2d2::Error> for DaoError {
    fn from(error: r2d2::Error) -> Self {
        DaoError::DbThreadPoolFailure(error)
    }
}

impl From<diesel::result::Error> for DaoError {
    fn from(error: diesel::result::Error) -> Self {
        match error {
            diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                DaoError::UniqueViolation(String::from(info.constraint_name().unwrap_or_default()))
            }
            e => DaoError::QueryFailure(e),
        }
    }
}

/// An inclusive span of calendar days.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Persistence port for the ledger. Every record operation is scoped to an owner; a record
/// belonging to someone else is reported exactly like a missing one.
pub trait Store: Send + Sync {
    fn create_user(&self, username: &str, email: &str, password_hash: &str)
        -> Result<i32, DaoError>;
    fn get_user_by_username(&self, username: &str) -> Result<User, DaoError>;
    fn username_exists(&self, username: &str) -> Result<bool, DaoError>;
    fn email_exists(&self, email: &str) -> Result<bool, DaoError>;

    /// Inserts every record or none of them.
    fn create_incomes(&self, owner_id: i32, records: &[IncomeFields])
        -> Result<Vec<i32>, DaoError>;
    fn get_income(&self, income_id: i32, owner_id: i32) -> Result<Income, DaoError>;
    fn update_income(
        &self,
        income_id: i32,
        owner_id: i32,
        fields: &IncomeFields,
    ) -> Result<Income, DaoError>;
    fn delete_income(&self, income_id: i32, owner_id: i32) -> Result<(), DaoError>;
    fn find_incomes(&self, owner_id: i32, range: Option<DateRange>)
        -> Result<Vec<Income>, DaoError>;
    fn recent_incomes(&self, owner_id: i32, limit: i64) -> Result<Vec<Income>, DaoError>;
    fn total_income(&self, owner_id: i32, range: Option<DateRange>) -> Result<f64, DaoError>;

    /// Inserts every record or none of them.
    fn create_expenses(
        &self,
        owner_id: i32,
        records: &[ExpenseFields],
    ) -> Result<Vec<i32>, DaoError>;
    fn get_expense(&self, expense_id: i32, owner_id: i32) -> Result<Expense, DaoError>;
    fn update_expense(
        &self,
        expense_id: i32,
        owner_id: i32,
        fields: &ExpenseFields,
    ) -> Result<Expense, DaoError>;
    fn delete_expense(&self, expense_id: i32, owner_id: i32) -> Result<(), DaoError>;
    fn find_expenses(
        &self,
        owner_id: i32,
        range: Option<DateRange>,
        category: Option<&str>,
    ) -> Result<Vec<Expense>, DaoError>;
    fn recent_expenses(&self, owner_id: i32, limit: i64) -> Result<Vec<Expense>, DaoError>;
    fn total_expenses(&self, owner_id: i32, range: Option<DateRange>) -> Result<f64, DaoError>;

    fn create_budget(&self, owner_id: i32, fields: &BudgetFields) -> Result<i32, DaoError>;
    fn get_budget(&self, budget_id: i32, owner_id: i32) -> Result<Budget, DaoError>;
    fn list_budgets(&self, owner_id: i32) -> Result<Vec<Budget>, DaoError>;
    fn update_budget(
        &self,
        budget_id: i32,
        owner_id: i32,
        fields: &BudgetFields,
    ) -> Result<Budget, DaoError>;
    fn delete_budget(&self, budget_id: i32, owner_id: i32) -> Result<(), DaoError>;

    fn create_financial_goal(
        &self,
        owner_id: i32,
        fields: &FinancialGoalFields,
    ) -> Result<i32, DaoError>;
    fn get_financial_goal(&self, goal_id: i32, owner_id: i32) -> Result<FinancialGoal, DaoError>;
    fn list_financial_goals(&self, owner_id: i32) -> Result<Vec<FinancialGoal>, DaoError>;
    fn update_financial_goal(
        &self,
        goal_id: i32,
        owner_id: i32,
        fields: &FinancialGoalFields,
    ) -> Result<FinancialGoal, DaoError>;
    fn delete_financial_goal(&self, goal_id: i32, owner_id: i32) -> Result<(), DaoError>;
}

/// `Store` backed by Postgres through the per-table DAOs.
pub struct PgStore {
    db_thread_pool: DbThreadPool,
}

impl PgStore {
    pub fn new(db_thread_pool: &DbThreadPool) -> Self {
        Self {
            db_thread_pool: db_thread_pool.clone(),
        }
    }
}

impl Store for PgStore {
    fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<i32, DaoError> {
        user::Dao::new(&self.db_thread_pool).create_user(username, email, password_hash)
    }

    fn get_user_by_username(&self, username: &str) -> Result<User, DaoError> {
        user::Dao::new(&self.db_thread_pool).get_user_by_username(username)
    }

    fn username_exists(&self, username: &str) -> Result<bool, DaoError> {
        user::Dao::new(&self.db_thread_pool).username_exists(username)
    }

    fn email_exists(&self, email: &str) -> Result<bool, DaoError> {
        user::Dao::new(&self.db_thread_pool).email_exists(email)
    }

    fn create_incomes(
        &self,
        owner_id: i32,
        records: &[IncomeFields],
    ) -> Result<Vec<i32>, DaoError> {
        income::Dao::new(&self.db_thread_pool).create_incomes(owner_id, records)
    }

    fn get_income(&self, income_id: i32, owner_id: i32) -> Result<Income, DaoError> {
        income::Dao::new(&self.db_thread_pool).get_income(income_id, owner_id)
    }

    fn update_income(
        &self,
        income_id: i32,
        owner_id: i32,
        fields: &IncomeFields,
    ) -> Result<Income, DaoError> {
        income::Dao::new(&self.db_thread_pool).update_income(income_id, owner_id, fields)
    }

    fn delete_income(&self, income_id: i32, owner_id: i32) -> Result<(), DaoError> {
        income::Dao::new(&self.db_thread_pool).delete_income(income_id, owner_id)
    }

    fn find_incomes(
        &self,
        owner_id: i32,
        range: Option<DateRange>,
    ) -> Result<Vec<Income>, DaoError> {
        income::Dao::new(&self.db_thread_pool).find_incomes(owner_id, range)
    }

    fn recent_incomes(&self, owner_id: i32, limit: i64) -> Result<Vec<Income>, DaoError> {
        income::Dao::new(&self.db_thread_pool).recent_incomes(owner_id, limit)
    }

    fn total_income(&self, owner_id: i32, range: Option<DateRange>) -> Result<f64, DaoError> {
        income::Dao::new(&self.db_thread_pool).total_income(owner_id, range)
    }

    fn create_expenses(
        &self,
        owner_id: i32,
        records: &[ExpenseFields],
    ) -> Result<Vec<i32>, DaoError> {
        expense::Dao::new(&self.db_thread_pool).create_expenses(owner_id, records)
    }

    fn get_expense(&self, expense_id: i32, owner_id: i32) -> Result<Expense, DaoError> {
        expense::Dao::new(&self.db_thread_pool).get_expense(expense_id, owner_id)
    }

    fn update_expense(
        &self,
        expense_id: i32,
        owner_id: i32,
        fields: &ExpenseFields,
    ) -> Result<Expense, DaoError> {
        expense::Dao::new(&self.db_thread_pool).update_expense(expense_id, owner_id, fields)
    }

    fn delete_expense(&self, expense_id: i32, owner_id: i32) -> Result<(), DaoError> {
        expense::Dao::new(&self.db_thread_pool).delete_expense(expense_id, owner_id)
    }

    fn find_expenses(
        &self,
        owner_id: i32,
        range: Option<DateRange>,
        category: Option<&str>,
    ) -> Result<Vec<Expense>, DaoError> {
        expense::Dao::new(&self.db_thread_pool).find_expenses(owner_id, range, category)
    }

    fn recent_expenses(&self, owner_id: i32, limit: i64) -> Result<Vec<Expense>, DaoError> {
        expense::Dao::new(&self.db_thread_pool).recent_expenses(owner_id, limit)
    }

    fn total_expenses(&self, owner_id: i32, range: Option<DateRange>) -> Result<f64, DaoError> {
        expense::Dao::new(&self.db_thread_pool).total_expenses(owner_id, range)
    }

    fn create_budget(&self, owner_id: i32, fields: &BudgetFields) -> Result<i32, DaoError> {
        budget::Dao::new(&self.db_thread_pool).create_budget(owner_id, fields)
    }

    fn get_budget(&self, budget_id: i32, owner_id: i32) -> Result<Budget, DaoError> {
        budget::Dao::new(&self.db_thread_pool).get_budget(budget_id, owner_id)
    }

    fn list_budgets(&self, owner_id: i32) -> Result<Vec<Budget>, DaoError> {
        budget::Dao::new(&self.db_thread_pool).list_budgets(owner_id)
    }

    fn update_budget(
        &self,
        budget_id: i32,
        owner_id: i32,
        fields: &BudgetFields,
    ) -> Result<Budget, DaoError> {
        budget::Dao::new(&self.db_thread_pool).update_budget(budget_id, owner_id, fields)
    }

    fn delete_budget(&self, budget_id: i32, owner_id: i32) -> Result<(), DaoError> {
        budget::Dao::new(&self.db_thread_pool).delete_budget(budget_id, owner_id)
    }

    fn create_financial_goal(
        &self,
        owner_id: i32,
        fields: &FinancialGoalFields,
    ) -> Result<i32, DaoError> {
        financial_goal::Dao::new(&self.db_thread_pool).create_financial_goal(owner_id, fields)
    }

    fn get_financial_goal(&self, goal_id: i32, owner_id: i32) -> Result<FinancialGoal, DaoError> {
        financial_goal::Dao::new(&self.db_thread_pool).get_financial_goal(goal_id, owner_id)
    }

    fn list_financial_goals(&self, owner_id: i32) -> Result<Vec<FinancialGoal>, DaoError> {
        financial_goal::Dao::new(&self.db_thread_pool).list_financial_goals(owner_id)
    }

    fn update_financial_goal(
        &self,
        goal_id: i32,
        owner_id: i32,
        fields: &FinancialGoalFields,
    ) -> Result<FinancialGoal, DaoError> {
        financial_goal::Dao::new(&self.db_thread_pool)
            .update_financial_goal(goal_id, owner_id, fields)
    }

    fn delete_financial_goal(&self, goal_id: i32, owner_id: i32) -> Result<(), DaoError> {
        financial_goal::Dao::new(&self.db_thread_pool).delete_financial_goal(goal_id, owner_id)
    }
}
