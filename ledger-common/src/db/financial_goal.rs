use diesel::{dsl, ExpressionMethods, QueryDsl, RunQueryDsl};

use crate::db::{DaoError, DbThreadPool};
use crate::models::financial_goal::{FinancialGoal, FinancialGoalFields, NewFinancialGoal};
use crate::schema::financial_goals as financial_goal_fields;
use crate::schema::financial_goals::dsl::financial_goals;

pub struct Dao {
    db_thread_pool: DbThreadPool,
}

impl Dao {
    pub fn new(db_thread_pool: &DbThreadPool) -> Self {
        Self {
            db_thread_pool: db_thread_pool.clone(),
        }
    }

    pub fn create_financial_goal(
        &self,
        owner_id: i32,
        fields: &FinancialGoalFields,
    ) -> Result<i32, DaoError> {
        Ok(dsl::insert_into(financial_goals)
            .values(&NewFinancialGoal::owned_by(fields, owner_id))
            .returning(financial_goal_fields::id)
            .get_result::<i32>(&mut self.db_thread_pool.get()?)?)
    }

    pub fn get_financial_goal(
        &self,
        goal_id: i32,
        owner_id: i32,
    ) -> Result<FinancialGoal, DaoError> {
        Ok(financial_goals
            .find(goal_id)
            .filter(financial_goal_fields::user_id.eq(owner_id))
            .get_result::<FinancialGoal>(&mut self.db_thread_pool.get()?)?)
    }

    pub fn list_financial_goals(&self, owner_id: i32) -> Result<Vec<FinancialGoal>, DaoError> {
        Ok(financial_goals
            .filter(financial_goal_fields::user_id.eq(owner_id))
            .order(financial_goal_fields::id.asc())
            .load::<FinancialGoal>(&mut self.db_thread_pool.get()?)?)
    }

    pub fn update_financial_goal(
        &self,
        goal_id: i32,
        owner_id: i32,
        fields: &FinancialGoalFields,
    ) -> Result<FinancialGoal, DaoError> {
        Ok(dsl::update(
            financial_goals
                .find(goal_id)
                .filter(financial_goal_fields::user_id.eq(owner_id)),
        )
        .set(fields)
        .get_result::<FinancialGoal>(&mut self.db_thread_pool.get()?)?)
    }

    pub fn delete_financial_goal(&self, goal_id: i32, owner_id: i32) -> Result<(), DaoError> {
        let deleted_row_count = diesel::delete(
            financial_goals
                .find(goal_id)
                .filter(financial_goal_fields::user_id.eq(owner_id)),
        )
        .execute(&mut self.db_thread_pool.get()?)?;

        if deleted_row_count == 0 {
            return Err(DaoError::not_found());
        }

        Ok(())
    }
}
