use diesel::{dsl, ExpressionMethods, QueryDsl, RunQueryDsl};
use std::time::SystemTime;

use crate::db::{DaoError, DbThreadPool};
use crate::models::user::{NewUser, User};
use crate::schema::users as user_fields;
use crate::schema::users::dsl::users;

pub struct Dao {
    db_thread_pool: DbThreadPool,
}

impl Dao {
    pub fn new(db_thread_pool: &DbThreadPool) -> Self {
        Self {
            db_thread_pool: db_thread_pool.clone(),
        }
    }

    pub fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<i32, DaoError> {
        let current_time = SystemTime::now();

        let new_user = NewUser {
            username,
            email,
            password_hash,
            created_at: current_time,
            updated_at: current_time,
        };

        Ok(dsl::insert_into(users)
            .values(&new_user)
            .returning(user_fields::id)
            .get_result::<i32>(&mut self.db_thread_pool.get()?)?)
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<User, DaoError> {
        Ok(users
            .filter(user_fields::username.eq(username))
            .first::<User>(&mut self.db_thread_pool.get()?)?)
    }

    pub fn username_exists(&self, username: &str) -> Result<bool, DaoError> {
        Ok(
            dsl::select(dsl::exists(users.filter(user_fields::username.eq(username))))
                .get_result::<bool>(&mut self.db_thread_pool.get()?)?,
        )
    }

    pub fn email_exists(&self, email: &str) -> Result<bool, DaoError> {
        Ok(
            dsl::select(dsl::exists(users.filter(user_fields::email.eq(email))))
                .get_result::<bool>(&mut self.db_thread_pool.get()?)?,
        )
    }
}
