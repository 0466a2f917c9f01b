use chrono::NaiveDate;
use diesel::{AsChangeset, Insertable, Queryable, Selectable};
use serde::{Deserialize, Serialize};

use crate::models::user::User;
use crate::schema::financial_goals;

#[derive(
    Clone, Debug, PartialEq, Serialize, Deserialize, Associations, Identifiable, Queryable, Selectable,
)]
#[diesel(belongs_to(User, foreign_key = user_id))]
#[diesel(table_name = financial_goals)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct FinancialGoal {
    pub id: i32,
    pub goal_name: String,
    pub target_amount: f64,
    pub current_amount: f64,
    pub target_date: NaiveDate,

    #[serde(skip)]
    pub user_id: i32,
}

#[derive(Clone, Debug, PartialEq, AsChangeset)]
#[diesel(table_name = financial_goals)]
pub struct FinancialGoalFields {
    pub goal_name: String,
    pub target_amount: f64,
    pub current_amount: f64,
    pub target_date: NaiveDate,
}

#[derive(Clone, Debug, Insertable)]
#[diesel(table_name = financial_goals)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewFinancialGoal<'a> {
    pub goal_name: &'a str,
    pub target_amount: f64,
    pub current_amount: f64,
    pub target_date: NaiveDate,
    pub user_id: i32,
}

impl<'a> NewFinancialGoal<'a> {
    pub fn owned_by(fields: &'a FinancialGoalFields, user_id: i32) -> Self {
        Self {
            goal_name: &fields.goal_name,
            target_amount: fields.target_amount,
            current_amount: fields.current_amount,
            target_date: fields.target_date,
            user_id,
        }
    }
}
