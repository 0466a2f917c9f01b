mod accounts;
mod planning;
mod transactions;

pub use transactions::{MonthlySummary, RECENT_TRANSACTION_LIMIT};

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::db::{
    DaoError, Store, BUDGET_PERIOD_UNIQUE_CONSTRAINT, EMAIL_UNIQUE_CONSTRAINT,
    USERNAME_UNIQUE_CONSTRAINT,
};
use crate::validators::FieldErrors;

pub const USERNAME_TAKEN: &str = "Username already exists";
pub const EMAIL_TAKEN: &str = "Email already exists";
pub const BUDGET_PERIOD_TAKEN: &str = "A budget for this category and month already exists";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordKind {
    User,
    Income,
    Expense,
    Budget,
    FinancialGoal,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::User => write!(f, "User"),
            RecordKind::Income => write!(f, "Income"),
            RecordKind::Expense => write!(f, "Expense"),
            RecordKind::Budget => write!(f, "Budget"),
            RecordKind::FinancialGoal => write!(f, "Financial goal"),
        }
    }
}

/// Field errors for a single record, or for each failing element of a batch keyed by its
/// position in the batch.
#[derive(Clone, Debug, PartialEq)]
pub enum ValidationFailure {
    Record(FieldErrors),
    Batch(BTreeMap<usize, FieldErrors>),
}

impl Serialize for ValidationFailure {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ValidationFailure::Record(errors) => errors.serialize(serializer),
            ValidationFailure::Batch(errors) => errors.serialize(serializer),
        }
    }
}

#[derive(Debug)]
pub enum AccountingError {
    Validation(ValidationFailure),
    Duplicate(String),
    NotFound(RecordKind),
    Format(String),
    Range(String),
    Internal(String),
    Storage(DaoError),
}

impl AccountingError {
    /// Translates a store failure for a record of `kind`. Missing rows and unique-constraint
    /// violations become client errors; anything else stays a storage failure.
    pub fn from_dao(error: DaoError, kind: RecordKind) -> Self {
        if error.is_not_found() {
            return AccountingError::NotFound(kind);
        }

        match error {
            DaoError::UniqueViolation(constraint) => {
                AccountingError::Duplicate(String::from(match constraint.as_str() {
                    USERNAME_UNIQUE_CONSTRAINT => USERNAME_TAKEN,
                    EMAIL_UNIQUE_CONSTRAINT => EMAIL_TAKEN,
                    BUDGET_PERIOD_UNIQUE_CONSTRAINT => BUDGET_PERIOD_TAKEN,
                    _ => "Record already exists",
                }))
            }
            e => AccountingError::Storage(e),
        }
    }
}

impl std::error::Error for AccountingError {}

impl fmt::Display for AccountingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountingError::Validation(ValidationFailure::Record(errors)) => {
                write!(f, "AccountingError: Invalid fields: {errors:?}")
            }
            AccountingError::Validation(ValidationFailure::Batch(errors)) => {
                write!(f, "AccountingError: Invalid batch records: {errors:?}")
            }
            AccountingError::Duplicate(msg) => write!(f, "AccountingError: Duplicate: {msg}"),
            AccountingError::NotFound(kind) => write!(f, "AccountingError: {kind} not found"),
            AccountingError::Format(msg) => write!(f, "AccountingError: Bad format: {msg}"),
            AccountingError::Range(msg) => write!(f, "AccountingError: Out of range: {msg}"),
            AccountingError::Internal(msg) => write!(f, "AccountingError: Internal: {msg}"),
            AccountingError::Storage(e) => write!(f, "AccountingError: {e}"),
        }
    }
}

impl From<DaoError> for AccountingError {
    fn from(error: DaoError) -> Self {
        AccountingError::Storage(error)
    }
}

/// A create body, which may hold one record or a list of them.
#[derive(Clone, Debug, PartialEq)]
pub enum RecordPayload {
    Single(Map<String, Value>),
    Batch(Vec<Map<String, Value>>),
}

impl TryFrom<Value> for RecordPayload {
    type Error = AccountingError;

    fn try_from(value: Value) -> Result<Self, AccountingError> {
        match value {
            Value::Object(record) => Ok(RecordPayload::Single(record)),
            Value::Array(elements) => {
                if elements.is_empty() {
                    return Err(AccountingError::Format(String::from(
                        "Expected at least one record",
                    )));
                }

                let mut records = Vec::with_capacity(elements.len());

                for element in elements {
                    let Value::Object(record) = element else {
                        return Err(AccountingError::Format(String::from(
                            "Every element of the list must be a record",
                        )));
                    };

                    records.push(record);
                }

                Ok(RecordPayload::Batch(records))
            }
            _ => Err(AccountingError::Format(String::from(
                "Expected a record or a list of records",
            ))),
        }
    }
}

impl RecordPayload {
    pub fn len(&self) -> usize {
        match self {
            RecordPayload::Single(_) => 1,
            RecordPayload::Batch(records) => records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Validates every record before returning any of them.
    fn validate_all<T>(
        self,
        validate: fn(&Map<String, Value>) -> Result<T, FieldErrors>,
    ) -> Result<Vec<T>, AccountingError> {
        match self {
            RecordPayload::Single(record) => match validate(&record) {
                Ok(fields) => Ok(vec![fields]),
                Err(errors) => Err(AccountingError::Validation(ValidationFailure::Record(
                    errors,
                ))),
            },
            RecordPayload::Batch(records) => {
                let mut validated = Vec::with_capacity(records.len());
                let mut batch_errors = BTreeMap::new();

                for (index, record) in records.iter().enumerate() {
                    match validate(record) {
                        Ok(fields) => validated.push(fields),
                        Err(errors) => {
                            batch_errors.insert(index, errors);
                        }
                    }
                }

                if !batch_errors.is_empty() {
                    return Err(AccountingError::Validation(ValidationFailure::Batch(
                        batch_errors,
                    )));
                }

                Ok(validated)
            }
        }
    }
}

/// Entry point for every bookkeeping operation. All record operations take the id of the
/// authenticated user and never touch records owned by anyone else.
pub struct Ledger {
    store: Arc<dyn Store>,
}

impl Ledger {
    pub fn new(store: &Arc<dyn Store>) -> Self {
        Self {
            store: Arc::clone(store),
        }
    }
}

/// Overlays `patch` on the stored client-editable fields of `stored`.
fn merge_for_update<T: Serialize>(
    stored: &T,
    patch: Map<String, Value>,
) -> Result<Map<String, Value>, AccountingError> {
    let mut record = match serde_json::to_value(stored) {
        Ok(Value::Object(record)) => record,
        Ok(_) => {
            return Err(AccountingError::Internal(String::from(
                "Stored record did not serialize to an object",
            )))
        }
        Err(e) => return Err(AccountingError::Internal(e.to_string())),
    };

    record.remove("id");
    record.extend(patch);

    Ok(record)
}

fn validate_one<T>(
    record: &Map<String, Value>,
    validate: fn(&Map<String, Value>) -> Result<T, FieldErrors>,
) -> Result<T, AccountingError> {
    validate(record).map_err(|errors| AccountingError::Validation(ValidationFailure::Record(errors)))
}
