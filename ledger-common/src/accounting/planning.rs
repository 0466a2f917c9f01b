use serde_json::{Map, Value};

use crate::accounting::{merge_for_update, validate_one, AccountingError, Ledger, RecordKind};
use crate::models::budget::Budget;
use crate::models::financial_goal::FinancialGoal;
use crate::validators::{validate_budget, validate_financial_goal};

impl Ledger {
    pub fn add_budget(
        &self,
        user_id: i32,
        record: Map<String, Value>,
    ) -> Result<i32, AccountingError> {
        let fields = validate_one(&record, validate_budget)?;

        self.store
            .create_budget(user_id, &fields)
            .map_err(|e| AccountingError::from_dao(e, RecordKind::Budget))
    }

    pub fn get_budget(&self, user_id: i32, budget_id: i32) -> Result<Budget, AccountingError> {
        self.store
            .get_budget(budget_id, user_id)
            .map_err(|e| AccountingError::from_dao(e, RecordKind::Budget))
    }

    pub fn list_budgets(&self, user_id: i32) -> Result<Vec<Budget>, AccountingError> {
        Ok(self.store.list_budgets(user_id)?)
    }

    pub fn update_budget(
        &self,
        user_id: i32,
        budget_id: i32,
        patch: Map<String, Value>,
    ) -> Result<Budget, AccountingError> {
        let stored = self.get_budget(user_id, budget_id)?;
        let fields = validate_one(&merge_for_update(&stored, patch)?, validate_budget)?;

        self.store
            .update_budget(budget_id, user_id, &fields)
            .map_err(|e| AccountingError::from_dao(e, RecordKind::Budget))
    }

    pub fn delete_budget(&self, user_id: i32, budget_id: i32) -> Result<(), AccountingError> {
        self.store
            .delete_budget(budget_id, user_id)
            .map_err(|e| AccountingError::from_dao(e, RecordKind::Budget))
    }

    pub fn add_financial_goal(
        &self,
        user_id: i32,
        record: Map<String, Value>,
    ) -> Result<i32, AccountingError> {
        let fields = validate_one(&record, validate_financial_goal)?;

        self.store
            .create_financial_goal(user_id, &fields)
            .map_err(|e| AccountingError::from_dao(e, RecordKind::FinancialGoal))
    }

    pub fn get_financial_goal(
        &self,
        user_id: i32,
        goal_id: i32,
    ) -> Result<FinancialGoal, AccountingError> {
        self.store
            .get_financial_goal(goal_id, user_id)
            .map_err(|e| AccountingError::from_dao(e, RecordKind::FinancialGoal))
    }

    pub fn list_financial_goals(&self, user_id: i32) -> Result<Vec<FinancialGoal>, AccountingError> {
        Ok(self.store.list_financial_goals(user_id)?)
    }

    pub fn update_financial_goal(
        &self,
        user_id: i32,
        goal_id: i32,
        patch: Map<String, Value>,
    ) -> Result<FinancialGoal, AccountingError> {
        let stored = self.get_financial_goal(user_id, goal_id)?;
        let fields = validate_one(&merge_for_update(&stored, patch)?, validate_financial_goal)?;

        self.store
            .update_financial_goal(goal_id, user_id, &fields)
            .map_err(|e| AccountingError::from_dao(e, RecordKind::FinancialGoal))
    }

    pub fn delete_financial_goal(&self, user_id: i32, goal_id: i32) -> Result<(), AccountingError> {
        self.store
            .delete_financial_goal(goal_id, user_id)
            .map_err(|e| AccountingError::from_dao(e, RecordKind::FinancialGoal))
    }
}
