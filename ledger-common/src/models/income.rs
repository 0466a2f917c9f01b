use chrono::NaiveDate;
use diesel::{AsChangeset, Insertable, Queryable, Selectable};
use serde::{Deserialize, Serialize};

use crate::models::user::User;
use crate::schema::incomes;

#[derive(
    Clone, Debug, PartialEq, Serialize, Deserialize, Associations, Identifiable, Queryable, Selectable,
)]
#[diesel(belongs_to(User, foreign_key = user_id))]
#[diesel(table_name = incomes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Income {
    pub id: i32,
    pub amount: f64,
    pub source: String,
    pub date: NaiveDate,
    pub description: Option<String>,

    #[serde(skip)]
    pub user_id: i32,
}

/// The client-editable columns of an income, as produced by validation.
#[derive(Clone, Debug, PartialEq, AsChangeset)]
#[diesel(table_name = incomes)]
#[diesel(treat_none_as_null = true)]
pub struct IncomeFields {
    pub amount: f64,
    pub source: String,
    pub date: NaiveDate,
    pub description: Option<String>,
}

#[derive(Clone, Debug, Insertable)]
#[diesel(table_name = incomes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewIncome<'a> {
    pub amount: f64,
    pub source: &'a str,
    pub date: NaiveDate,
    pub description: Option<&'a str>,
    pub user_id: i32,
}

impl<'a> NewIncome<'a> {
    pub fn owned_by(fields: &'a IncomeFields, user_id: i32) -> Self {
        Self {
            amount: fields.amount,
            source: &fields.source,
            date: fields.date,
            description: fields.description.as_deref(),
            user_id,
        }
    }
}
