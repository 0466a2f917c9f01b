use chrono::NaiveDate;
use diesel::{AsChangeset, Insertable, Queryable, Selectable};
use serde::{Deserialize, Serialize};

use crate::models::user::User;
use crate::schema::expenses;

#[derive(
    Clone, Debug, PartialEq, Serialize, Deserialize, Associations, Identifiable, Queryable, Selectable,
)]
#[diesel(belongs_to(User, foreign_key = user_id))]
#[diesel(table_name = expenses)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Expense {
    pub id: i32,
    pub amount: f64,
    pub category: String,
    pub date: NaiveDate,
    pub description: Option<String>,

    #[serde(skip)]
    pub user_id: i32,
}

#[derive(Clone, Debug, PartialEq, AsChangeset)]
#[diesel(table_name = expenses)]
#[diesel(treat_none_as_null = true)]
pub struct ExpenseFields {
    pub amount: f64,
    pub category: String,
    pub date: NaiveDate,
    pub description: Option<String>,
}

#[derive(Clone, Debug, Insertable)]
#[diesel(table_name = expenses)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewExpense<'a> {
    pub amount: f64,
    pub category: &'a str,
    pub date: NaiveDate,
    pub description: Option<&'a str>,
    pub user_id: i32,
}

impl<'a> NewExpense<'a> {
    pub fn owned_by(fields: &'a ExpenseFields, user_id: i32) -> Self {
        Self {
            amount: fields.amount,
            category: &fields.category,
            date: fields.date,
            description: fields.description.as_deref(),
            user_id,
        }
    }
}
