mod fields;
mod records;

pub(crate) use fields::parse_date_str;
pub use fields::{range_message, FieldErrors, FieldReader};
pub use records::{
    validate_budget, validate_expense, validate_financial_goal, validate_income, validate_user,
    UserFields,
};

pub const MISSING_FIELD: &str = "Missing data for required field.";
pub const NULL_FIELD: &str = "Field may not be null.";
pub const NOT_A_NUMBER: &str = "Not a valid number.";
pub const NOT_AN_INTEGER: &str = "Not a valid integer.";
pub const NOT_A_STRING: &str = "Not a valid string.";
pub const NOT_A_DATE: &str = "Not a valid date.";
pub const NOT_AN_EMAIL: &str = "Not a valid email address.";
pub const NEGATIVE_AMOUNT: &str = "Must be greater than or equal to 0.";
pub const UNKNOWN_FIELD: &str = "Unknown field.";
pub const INVALID_RECORD: &str = "Invalid record.";
pub const AMOUNT_TOO_LARGE: &str =
    "Must be greater than or equal to -1000000000000 and less than or equal to 1000000000000.";

/// Upper bound on the magnitude of any currency field
pub const MAX_AMOUNT: f64 = 1_000_000_000_000.0;

const ADDRESS_MAX_LEN: usize = 320;

pub fn is_valid_email_address(email: &str) -> bool {
    if email.chars().count() > ADDRESS_MAX_LEN
        || email.chars().any(|c| c.is_ascii_whitespace() || !c.is_ascii())
    {
        return false;
    }

    let Some((local_part, domain)) = email.split_once('@') else {
        return false;
    };

    !local_part.is_empty()
        && domain.len() >= 3
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}
