use diesel::{AsChangeset, Insertable, Queryable, Selectable};
use serde::{Deserialize, Serialize};

use crate::models::user::User;
use crate::schema::budgets;

#[derive(
    Clone, Debug, PartialEq, Serialize, Deserialize, Associations, Identifiable, Queryable, Selectable,
)]
#[diesel(belongs_to(User, foreign_key = user_id))]
#[diesel(table_name = budgets)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Budget {
    pub id: i32,
    pub category: String,
    pub limit: f64,
    pub year: i32,
    pub month: i32,

    #[serde(skip)]
    pub user_id: i32,
}

#[derive(Clone, Debug, PartialEq, AsChangeset)]
#[diesel(table_name = budgets)]
pub struct BudgetFields {
    pub category: String,
    pub limit: f64,
    pub year: i32,
    pub month: i32,
}

#[derive(Clone, Debug, Insertable)]
#[diesel(table_name = budgets)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewBudget<'a> {
    pub category: &'a str,
    pub limit: f64,
    pub year: i32,
    pub month: i32,
    pub user_id: i32,
}

impl<'a> NewBudget<'a> {
    pub fn owned_by(fields: &'a BudgetFields, user_id: i32) -> Self {
        Self {
            category: &fields.category,
            limit: fields.limit,
            year: fields.year,
            month: fields.month,
            user_id,
        }
    }
}
