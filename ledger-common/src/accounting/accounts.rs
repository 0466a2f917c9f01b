use serde_json::{Map, Value};

use crate::accounting::{
    validate_one, AccountingError, Ledger, RecordKind, EMAIL_TAKEN, USERNAME_TAKEN,
};
use crate::models::user::User;
use crate::validators::{validate_user, UserFields};

impl Ledger {
    /// Validates a signup record and checks that neither the username nor the email is taken.
    pub fn check_new_user(&self, record: &Map<String, Value>) -> Result<UserFields, AccountingError> {
        let fields = validate_one(record, validate_user)?;

        if self.store.username_exists(&fields.username)? {
            return Err(AccountingError::Duplicate(String::from(USERNAME_TAKEN)));
        }

        if self.store.email_exists(&fields.email)? {
            return Err(AccountingError::Duplicate(String::from(EMAIL_TAKEN)));
        }

        Ok(fields)
    }

    pub fn register_user(
        &self,
        fields: &UserFields,
        password_hash: &str,
    ) -> Result<i32, AccountingError> {
        self.store
            .create_user(&fields.username, &fields.email, password_hash)
            .map_err(|e| AccountingError::from_dao(e, RecordKind::User))
    }

    pub fn find_user(&self, username: &str) -> Result<Option<User>, AccountingError> {
        match self.store.get_user_by_username(username) {
            Ok(user) => Ok(Some(user)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(AccountingError::Storage(e)),
        }
    }
}
