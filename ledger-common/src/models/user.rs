use diesel::{Insertable, Queryable, Selectable};
use std::time::SystemTime;

use crate::schema::users;

#[derive(Clone, Debug, Identifiable, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,

    pub password_hash: String,

    pub created_at: SystemTime,
    pub updated_at: SystemTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewUser<'a> {
    pub username: &'a str,
    pub email: &'a str,

    pub password_hash: &'a str,

    pub created_at: SystemTime,
    pub updated_at: SystemTime,
}
