use diesel::{dsl, ExpressionMethods, QueryDsl, RunQueryDsl};

use crate::db::{DaoError, DateRange, DbThreadPool};
use crate::models::expense::{Expense, ExpenseFields, NewExpense};
use crate::schema::expenses as expense_fields;
use crate::schema::expenses::dsl::expenses;

pub struct Dao {
    db_thread_pool: DbThreadPool,
}

impl Dao {
    pub fn new(db_thread_pool: &DbThreadPool) -> Self {
        Self {
            db_thread_pool: db_thread_pool.clone(),
        }
    }

    pub fn create_expenses(
        &self,
        owner_id: i32,
        records: &[ExpenseFields],
    ) -> Result<Vec<i32>, DaoError> {
        if records.is_empty() {
            return Err(DaoError::CannotRunQuery("No expenses to insert"));
        }

        let new_expenses = records
            .iter()
            .map(|fields| NewExpense::owned_by(fields, owner_id))
            .collect::<Vec<_>>();

        let mut db_connection = self.db_thread_pool.get()?;

        let ids = db_connection
            .build_transaction()
            .run::<_, diesel::result::Error, _>(|conn| {
                dsl::insert_into(expenses)
                    .values(&new_expenses)
                    .returning(expense_fields::id)
                    .get_results::<i32>(conn)
            })?;

        Ok(ids)
    }

    pub fn get_expense(&self, expense_id: i32, owner_id: i32) -> Result<Expense, DaoError> {
        Ok(expenses
            .find(expense_id)
            .filter(expense_fields::user_id.eq(owner_id))
            .get_result::<Expense>(&mut self.db_thread_pool.get()?)?)
    }

    pub fn update_expense(
        &self,
        expense_id: i32,
        owner_id: i32,
        fields: &ExpenseFields,
    ) -> Result<Expense, DaoError> {
        Ok(dsl::update(
            expenses
                .find(expense_id)
                .filter(expense_fields::user_id.eq(owner_id)),
        )
        .set(fields)
        .get_result::<Expense>(&mut self.db_thread_pool.get()?)?)
    }

    pub fn delete_expense(&self, expense_id: i32, owner_id: i32) -> Result<(), DaoError> {
        let deleted_row_count = diesel::delete(
            expenses
                .find(expense_id)
                .filter(expense_fields::user_id.eq(owner_id)),
        )
        .execute(&mut self.db_thread_pool.get()?)?;

        if deleted_row_count == 0 {
            return Err(DaoError::not_found());
        }

        Ok(())
    }

    pub fn find_expenses(
        &self,
        owner_id: i32,
        range: Option<DateRange>,
        category: Option<&str>,
    ) -> Result<Vec<Expense>, DaoError> {
        let mut query = expenses
            .filter(expense_fields::user_id.eq(owner_id))
            .into_boxed();

        if let Some(range) = range {
            query = query.filter(expense_fields::date.between(range.start, range.end));
        }

        if let Some(category) = category {
            query = query.filter(expense_fields::category.eq(category));
        }

        Ok(query
            .order((expense_fields::date.asc(), expense_fields::id.asc()))
            .load::<Expense>(&mut self.db_thread_pool.get()?)?)
    }

    pub fn recent_expenses(&self, owner_id: i32, limit: i64) -> Result<Vec<Expense>, DaoError> {
        Ok(expenses
            .filter(expense_fields::user_id.eq(owner_id))
            .order((expense_fields::date.desc(), expense_fields::id.desc()))
            .limit(limit)
            .load::<Expense>(&mut self.db_thread_pool.get()?)?)
    }

    pub fn total_expenses(
        &self,
        owner_id: i32,
        range: Option<DateRange>,
    ) -> Result<f64, DaoError> {
        let mut query = expenses
            .select(dsl::sum(expense_fields::amount))
            .filter(expense_fields::user_id.eq(owner_id))
            .into_boxed();

        if let Some(range) = range {
            query = query.filter(expense_fields::date.between(range.start, range.end));
        }

        let total = query.get_result::<Option<f64>>(&mut self.db_thread_pool.get()?)?;
        Ok(total.unwrap_or(0.0))
    }
}
