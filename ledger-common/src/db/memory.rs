use std::sync::{Mutex, MutexGuard};
use std::time::SystemTime;

use crate::db::{
    DaoError, DateRange, Store, BUDGET_PERIOD_UNIQUE_CONSTRAINT, EMAIL_UNIQUE_CONSTRAINT,
    USERNAME_UNIQUE_CONSTRAINT,
};
use crate::models::budget::{Budget, BudgetFields};
use crate::models::expense::{Expense, ExpenseFields};
use crate::models::financial_goal::{FinancialGoal, FinancialGoalFields};
use crate::models::income::{Income, IncomeFields};
use crate::models::user::User;

struct Table<T> {
    rows: Vec<T>,
    last_id: i32,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            last_id: 0,
        }
    }
}

impl<T> Table<T> {
    fn next_id(&mut self) -> i32 {
        self.last_id += 1;
        self.last_id
    }
}

#[derive(Default)]
struct Tables {
    users: Table<User>,
    incomes: Table<Income>,
    expenses: Table<Expense>,
    budgets: Table<Budget>,
    financial_goals: Table<FinancialGoal>,
}

/// Process-local `Store`. Each call holds the lock for its whole duration, so every write is
/// applied all at once or not at all.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, DaoError> {
        self.tables.lock().map_err(|_| {
            log::error!("In-memory store lock was poisoned");
            DaoError::CannotRunQuery("In-memory store lock was poisoned")
        })
    }
}

fn owned<'a, T>(
    rows: &'a mut [T],
    record_id: i32,
    owner_id: i32,
    key: fn(&T) -> (i32, i32),
) -> Result<&'a mut T, DaoError> {
    rows.iter_mut()
        .find(|row| key(row) == (record_id, owner_id))
        .ok_or_else(DaoError::not_found)
}

fn remove_owned<T>(
    rows: &mut Vec<T>,
    record_id: i32,
    owner_id: i32,
    key: fn(&T) -> (i32, i32),
) -> Result<(), DaoError> {
    let Some(position) = rows.iter().position(|row| key(row) == (record_id, owner_id)) else {
        return Err(DaoError::not_found());
    };

    rows.remove(position);
    Ok(())
}

fn in_range(range: Option<DateRange>, date: chrono::NaiveDate) -> bool {
    range.map_or(true, |r| r.contains(date))
}

fn budget_period_taken(
    budgets: &[Budget],
    owner_id: i32,
    fields: &BudgetFields,
    except_id: Option<i32>,
) -> bool {
    budgets.iter().any(|b| {
        b.user_id == owner_id
            && b.category == fields.category
            && b.year == fields.year
            && b.month == fields.month
            && Some(b.id) != except_id
    })
}

impl Store for MemoryStore {
    fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<i32, DaoError> {
        let mut tables = self.lock()?;

        if tables.users.rows.iter().any(|u| u.username == username) {
            return Err(DaoError::UniqueViolation(String::from(
                USERNAME_UNIQUE_CONSTRAINT,
            )));
        }

        if tables.users.rows.iter().any(|u| u.email == email) {
            return Err(DaoError::UniqueViolation(String::from(
                EMAIL_UNIQUE_CONSTRAINT,
            )));
        }

        let id = tables.users.next_id();
        let current_time = SystemTime::now();

        tables.users.rows.push(User {
            id,
            username: String::from(username),
            email: String::from(email),
            password_hash: String::from(password_hash),
            created_at: current_time,
            updated_at: current_time,
        });

        Ok(id)
    }

    fn get_user_by_username(&self, username: &str) -> Result<User, DaoError> {
        self.lock()?
            .users
            .rows
            .iter()
            .find(|u| u.username == username)
            .cloned()
            .ok_or_else(DaoError::not_found)
    }

    fn username_exists(&self, username: &str) -> Result<bool, DaoError> {
        Ok(self.lock()?.users.rows.iter().any(|u| u.username == username))
    }

    fn email_exists(&self, email: &str) -> Result<bool, DaoError> {
        Ok(self.lock()?.users.rows.iter().any(|u| u.email == email))
    }

    fn create_incomes(
        &self,
        owner_id: i32,
        records: &[IncomeFields],
    ) -> Result<Vec<i32>, DaoError> {
        if records.is_empty() {
            return Err(DaoError::CannotRunQuery("No incomes to insert"));
        }

        let mut tables = self.lock()?;
        let mut ids = Vec::with_capacity(records.len());

        for fields in records {
            let id = tables.incomes.next_id();
            let fields = fields.clone();

            tables.incomes.rows.push(Income {
                id,
                amount: fields.amount,
                source: fields.source,
                date: fields.date,
                description: fields.description,
                user_id: owner_id,
            });

            ids.push(id);
        }

        Ok(ids)
    }

    fn get_income(&self, income_id: i32, owner_id: i32) -> Result<Income, DaoError> {
        let mut tables = self.lock()?;
        owned(&mut tables.incomes.rows, income_id, owner_id, |i| (i.id, i.user_id)).cloned()
    }

    fn update_income(
        &self,
        income_id: i32,
        owner_id: i32,
        fields: &IncomeFields,
    ) -> Result<Income, DaoError> {
        let mut tables = self.lock()?;
        let income = owned(&mut tables.incomes.rows, income_id, owner_id, |i| {
            (i.id, i.user_id)
        })?;

        income.amount = fields.amount;
        income.source = fields.source.clone();
        income.date = fields.date;
        income.description = fields.description.clone();

        Ok(income.clone())
    }

    fn delete_income(&self, income_id: i32, owner_id: i32) -> Result<(), DaoError> {
        let mut tables = self.lock()?;
        remove_owned(&mut tables.incomes.rows, income_id, owner_id, |i| {
            (i.id, i.user_id)
        })
    }

    fn find_incomes(
        &self,
        owner_id: i32,
        range: Option<DateRange>,
    ) -> Result<Vec<Income>, DaoError> {
        let mut found = self
            .lock()?
            .incomes
            .rows
            .iter()
            .filter(|i| i.user_id == owner_id && in_range(range, i.date))
            .cloned()
            .collect::<Vec<_>>();

        found.sort_by_key(|i| (i.date, i.id));
        Ok(found)
    }

    fn recent_incomes(&self, owner_id: i32, limit: i64) -> Result<Vec<Income>, DaoError> {
        let mut found = self.find_incomes(owner_id, None)?;
        found.reverse();
        found.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(found)
    }

    fn total_income(&self, owner_id: i32, range: Option<DateRange>) -> Result<f64, DaoError> {
        Ok(self
            .find_incomes(owner_id, range)?
            .iter()
            .fold(0.0, |total, i| total + i.amount))
    }

    fn create_expenses(
        &self,
        owner_id: i32,
        records: &[ExpenseFields],
    ) -> Result<Vec<i32>, DaoError> {
        if records.is_empty() {
            return Err(DaoError::CannotRunQuery("No expenses to insert"));
        }

        let mut tables = self.lock()?;
        let mut ids = Vec::with_capacity(records.len());

        for fields in records {
            let id = tables.expenses.next_id();
            let fields = fields.clone();

            tables.expenses.rows.push(Expense {
                id,
                amount: fields.amount,
                category: fields.category,
                date: fields.date,
                description: fields.description,
                user_id: owner_id,
            });

            ids.push(id);
        }

        Ok(ids)
    }

    fn get_expense(&self, expense_id: i32, owner_id: i32) -> Result<Expense, DaoError> {
        let mut tables = self.lock()?;
        owned(&mut tables.expenses.rows, expense_id, owner_id, |e| {
            (e.id, e.user_id)
        })
        .cloned()
    }

    fn update_expense(
        &self,
        expense_id: i32,
        owner_id: i32,
        fields: &ExpenseFields,
    ) -> Result<Expense, DaoError> {
        let mut tables = self.lock()?;
        let expense = owned(&mut tables.expenses.rows, expense_id, owner_id, |e| {
            (e.id, e.user_id)
        })?;

        expense.amount = fields.amount;
        expense.category = fields.category.clone();
        expense.date = fields.date;
        expense.description = fields.description.clone();

        Ok(expense.clone())
    }

    fn delete_expense(&self, expense_id: i32, owner_id: i32) -> Result<(), DaoError> {
        let mut tables = self.lock()?;
        remove_owned(&mut tables.expenses.rows, expense_id, owner_id, |e| {
            (e.id, e.user_id)
        })
    }

    fn find_expenses(
        &self,
        owner_id: i32,
        range: Option<DateRange>,
        category: Option<&str>,
    ) -> Result<Vec<Expense>, DaoError> {
        let mut found = self
            .lock()?
            .expenses
            .rows
            .iter()
            .filter(|e| e.user_id == owner_id && in_range(range, e.date))
            .filter(|e| category.map_or(true, |c| e.category == c))
            .cloned()
            .collect::<Vec<_>>();

        found.sort_by_key(|e| (e.date, e.id));
        Ok(found)
    }

    fn recent_expenses(&self, owner_id: i32, limit: i64) -> Result<Vec<Expense>, DaoError> {
        let mut found = self.find_expenses(owner_id, None, None)?;
        found.reverse();
        found.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(found)
    }

    fn total_expenses(&self, owner_id: i32, range: Option<DateRange>) -> Result<f64, DaoError> {
        Ok(self
            .find_expenses(owner_id, range, None)?
            .iter()
            .fold(0.0, |total, e| total + e.amount))
    }

    fn create_budget(&self, owner_id: i32, fields: &BudgetFields) -> Result<i32, DaoError> {
        let mut tables = self.lock()?;

        if budget_period_taken(&tables.budgets.rows, owner_id, fields, None) {
            return Err(DaoError::UniqueViolation(String::from(
                BUDGET_PERIOD_UNIQUE_CONSTRAINT,
            )));
        }

        let id = tables.budgets.next_id();
        tables.budgets.rows.push(Budget {
            id,
            category: fields.category.clone(),
            limit: fields.limit,
            year: fields.year,
            month: fields.month,
            user_id: owner_id,
        });

        Ok(id)
    }

    fn get_budget(&self, budget_id: i32, owner_id: i32) -> Result<Budget, DaoError> {
        let mut tables = self.lock()?;
        owned(&mut tables.budgets.rows, budget_id, owner_id, |b| {
            (b.id, b.user_id)
        })
        .cloned()
    }

    fn list_budgets(&self, owner_id: i32) -> Result<Vec<Budget>, DaoError> {
        Ok(self
            .lock()?
            .budgets
            .rows
            .iter()
            .filter(|b| b.user_id == owner_id)
            .cloned()
            .collect())
    }

    fn update_budget(
        &self,
        budget_id: i32,
        owner_id: i32,
        fields: &BudgetFields,
    ) -> Result<Budget, DaoError> {
        let mut tables = self.lock()?;

        // Ownership is checked first so a foreign id never reveals a conflict
        owned(&mut tables.budgets.rows, budget_id, owner_id, |b| {
            (b.id, b.user_id)
        })?;

        if budget_period_taken(&tables.budgets.rows, owner_id, fields, Some(budget_id)) {
            return Err(DaoError::UniqueViolation(String::from(
                BUDGET_PERIOD_UNIQUE_CONSTRAINT,
            )));
        }

        let budget = owned(&mut tables.budgets.rows, budget_id, owner_id, |b| {
            (b.id, b.user_id)
        })?;

        budget.category = fields.category.clone();
        budget.limit = fields.limit;
        budget.year = fields.year;
        budget.month = fields.month;

        Ok(budget.clone())
    }

    fn delete_budget(&self, budget_id: i32, owner_id: i32) -> Result<(), DaoError> {
        let mut tables = self.lock()?;
        remove_owned(&mut tables.budgets.rows, budget_id, owner_id, |b| {
            (b.id, b.user_id)
        })
    }

    fn create_financial_goal(
        &self,
        owner_id: i32,
        fields: &FinancialGoalFields,
    ) -> Result<i32, DaoError> {
        let mut tables = self.lock()?;

        let id = tables.financial_goals.next_id();
        tables.financial_goals.rows.push(FinancialGoal {
            id,
            goal_name: fields.goal_name.clone(),
            target_amount: fields.target_amount,
            current_amount: fields.current_amount,
            target_date: fields.target_date,
            user_id: owner_id,
        });

        Ok(id)
    }

    fn get_financial_goal(&self, goal_id: i32, owner_id: i32) -> Result<FinancialGoal, DaoError> {
        let mut tables = self.lock()?;
        owned(&mut tables.financial_goals.rows, goal_id, owner_id, |g| {
            (g.id, g.user_id)
        })
        .cloned()
    }

    fn list_financial_goals(&self, owner_id: i32) -> Result<Vec<FinancialGoal>, DaoError> {
        Ok(self
            .lock()?
            .financial_goals
            .rows
            .iter()
            .filter(|g| g.user_id == owner_id)
            .cloned()
            .collect())
    }

    fn update_financial_goal(
        &self,
        goal_id: i32,
        owner_id: i32,
        fields: &FinancialGoalFields,
    ) -> Result<FinancialGoal, DaoError> {
        let mut tables = self.lock()?;
        let goal = owned(&mut tables.financial_goals.rows, goal_id, owner_id, |g| {
            (g.id, g.user_id)
        })?;

        goal.goal_name = fields.goal_name.clone();
        goal.target_amount = fields.target_amount;
        goal.current_amount = fields.current_amount;
        goal.target_date = fields.target_date;

        Ok(goal.clone())
    }

    fn delete_financial_goal(&self, goal_id: i32, owner_id: i32) -> Result<(), DaoError> {
        let mut tables = self.lock()?;
        remove_owned(&mut tables.financial_goals.rows, goal_id, owner_id, |g| {
            (g.id, g.user_id)
        })
    }
}
