use diesel::{dsl, ExpressionMethods, QueryDsl, RunQueryDsl};

use crate::db::{DaoError, DateRange, DbThreadPool};
use crate::models::income::{Income, IncomeFields, NewIncome};
use crate::schema::incomes as income_fields;
use crate::schema::incomes::dsl::incomes;

pub struct Dao {
    db_thread_pool: DbThreadPool,
}

impl Dao {
    pub fn new(db_thread_pool: &DbThreadPool) -> Self {
        Self {
            db_thread_pool: db_thread_pool.clone(),
        }
    }

    pub fn create_incomes(
        &self,
        owner_id: i32,
        records: &[IncomeFields],
    ) -> Result<Vec<i32>, DaoError> {
        if records.is_empty() {
            return Err(DaoError::CannotRunQuery("No incomes to insert"));
        }

        let new_incomes = records
            .iter()
            .map(|fields| NewIncome::owned_by(fields, owner_id))
            .collect::<Vec<_>>();

        let mut db_connection = self.db_thread_pool.get()?;

        let ids = db_connection
            .build_transaction()
            .run::<_, diesel::result::Error, _>(|conn| {
                dsl::insert_into(incomes)
                    .values(&new_incomes)
                    .returning(income_fields::id)
                    .get_results::<i32>(conn)
            })?;

        Ok(ids)
    }

    pub fn get_income(&self, income_id: i32, owner_id: i32) -> Result<Income, DaoError> {
        Ok(incomes
            .find(income_id)
            .filter(income_fields::user_id.eq(owner_id))
            .get_result::<Income>(&mut self.db_thread_pool.get()?)?)
    }

    pub fn update_income(
        &self,
        income_id: i32,
        owner_id: i32,
        fields: &IncomeFields,
    ) -> Result<Income, DaoError> {
        Ok(dsl::update(
            incomes
                .find(income_id)
                .filter(income_fields::user_id.eq(owner_id)),
        )
        .set(fields)
        .get_result::<Income>(&mut self.db_thread_pool.get()?)?)
    }

    pub fn delete_income(&self, income_id: i32, owner_id: i32) -> Result<(), DaoError> {
        let deleted_row_count = diesel::delete(
            incomes
                .find(income_id)
                .filter(income_fields::user_id.eq(owner_id)),
        )
        .execute(&mut self.db_thread_pool.get()?)?;

        if deleted_row_count == 0 {
            return Err(DaoError::not_found());
        }

        Ok(())
    }

    pub fn find_incomes(
        &self,
        owner_id: i32,
        range: Option<DateRange>,
    ) -> Result<Vec<Income>, DaoError> {
        let mut query = incomes
            .filter(income_fields::user_id.eq(owner_id))
            .into_boxed();

        if let Some(range) = range {
            query = query.filter(income_fields::date.between(range.start, range.end));
        }

        Ok(query
            .order((income_fields::date.asc(), income_fields::id.asc()))
            .load::<Income>(&mut self.db_thread_pool.get()?)?)
    }

    pub fn recent_incomes(&self, owner_id: i32, limit: i64) -> Result<Vec<Income>, DaoError> {
        Ok(incomes
            .filter(income_fields::user_id.eq(owner_id))
            .order((income_fields::date.desc(), income_fields::id.desc()))
            .limit(limit)
            .load::<Income>(&mut self.db_thread_pool.get()?)?)
    }

    pub fn total_income(&self, owner_id: i32, range: Option<DateRange>) -> Result<f64, DaoError> {
        let mut query = incomes
            .select(dsl::sum(income_fields::amount))
            .filter(income_fields::user_id.eq(owner_id))
            .into_boxed();

        if let Some(range) = range {
            query = query.filter(income_fields::date.between(range.start, range.end));
        }

        let total = query.get_result::<Option<f64>>(&mut self.db_thread_pool.get()?)?;
        Ok(total.unwrap_or(0.0))
    }
}
