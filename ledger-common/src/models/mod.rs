pub mod budget;
pub mod expense;
pub mod financial_goal;
pub mod income;
pub mod user;
