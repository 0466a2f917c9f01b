use diesel::{dsl, ExpressionMethods, QueryDsl, RunQueryDsl};

use crate::db::{DaoError, DbThreadPool};
use crate::models::budget::{Budget, BudgetFields, NewBudget};
use crate::schema::budgets as budget_fields;
use crate::schema::budgets::dsl::budgets;

pub struct Dao {
    db_thread_pool: DbThreadPool,
}

impl Dao {
    pub fn new(db_thread_pool: &DbThreadPool) -> Self {
        Self {
            db_thread_pool: db_thread_pool.clone(),
        }
    }

    pub fn create_budget(&self, owner_id: i32, fields: &BudgetFields) -> Result<i32, DaoError> {
        Ok(dsl::insert_into(budgets)
            .values(&NewBudget::owned_by(fields, owner_id))
            .returning(budget_fields::id)
            .get_result::<i32>(&mut self.db_thread_pool.get()?)?)
    }

    pub fn get_budget(&self, budget_id: i32, owner_id: i32) -> Result<Budget, DaoError> {
        Ok(budgets
            .find(budget_id)
            .filter(budget_fields::user_id.eq(owner_id))
            .get_result::<Budget>(&mut self.db_thread_pool.get()?)?)
    }

    pub fn list_budgets(&self, owner_id: i32) -> Result<Vec<Budget>, DaoError> {
        Ok(budgets
            .filter(budget_fields::user_id.eq(owner_id))
            .order(budget_fields::id.asc())
            .load::<Budget>(&mut self.db_thread_pool.get()?)?)
    }

    pub fn update_budget(
        &self,
        budget_id: i32,
        owner_id: i32,
        fields: &BudgetFields,
    ) -> Result<Budget, DaoError> {
        Ok(dsl::update(
            budgets
                .find(budget_id)
                .filter(budget_fields::user_id.eq(owner_id)),
        )
        .set(fields)
        .get_result::<Budget>(&mut self.db_thread_pool.get()?)?)
    }

    pub fn delete_budget(&self, budget_id: i32, owner_id: i32) -> Result<(), DaoError> {
        let deleted_row_count = diesel::delete(
            budgets
                .find(budget_id)
                .filter(budget_fields::user_id.eq(owner_id)),
        )
        .execute(&mut self.db_thread_pool.get()?)?;

        if deleted_row_count == 0 {
            return Err(DaoError::not_found());
        }

        Ok(())
    }
}
