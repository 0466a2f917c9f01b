use chrono::NaiveDate;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use super::{
    AMOUNT_TOO_LARGE, INVALID_RECORD, MAX_AMOUNT, MISSING_FIELD, NEGATIVE_AMOUNT, NOT_AN_INTEGER, NOT_A_DATE,
    NOT_A_NUMBER, NOT_A_STRING, NULL_FIELD, UNKNOWN_FIELD,
};

/// Field name to the messages collected for it, sorted by field name.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Pulls typed values out of an untyped JSON record, collecting a message for every field that
/// is missing or malformed instead of stopping at the first one.
pub struct FieldReader<'a> {
    record: &'a Map<String, Value>,
    errors: FieldErrors,
}

impl<'a> FieldReader<'a> {
    pub fn new(record: &'a Map<String, Value>) -> Self {
        Self {
            record,
            errors: FieldErrors::new(),
        }
    }

    pub fn add_error(&mut self, field: &str, message: impl Into<String>) {
        self.errors
            .entry(String::from(field))
            .or_default()
            .push(message.into());
    }

    fn required<T>(
        &mut self,
        field: &str,
        parse: fn(&Value) -> Result<T, &'static str>,
    ) -> Option<T> {
        match self.record.get(field) {
            None => {
                self.add_error(field, MISSING_FIELD);
                None
            }
            Some(Value::Null) => {
                self.add_error(field, NULL_FIELD);
                None
            }
            Some(value) => match parse(value) {
                Ok(v) => Some(v),
                Err(msg) => {
                    self.add_error(field, msg);
                    None
                }
            },
        }
    }

    /// Absent and null both read as `Some(None)`; `None` means the field was present but invalid.
    fn optional<T>(
        &mut self,
        field: &str,
        parse: fn(&Value) -> Result<T, &'static str>,
    ) -> Option<Option<T>> {
        match self.record.get(field) {
            None | Some(Value::Null) => Some(None),
            Some(value) => match parse(value) {
                Ok(v) => Some(Some(v)),
                Err(msg) => {
                    self.add_error(field, msg);
                    None
                }
            },
        }
    }

    pub fn number(&mut self, field: &str) -> Option<f64> {
        self.required(field, parse_number)
    }

    pub fn non_negative_number(&mut self, field: &str) -> Option<f64> {
        let value = self.number(field)?;

        if value < 0.0 {
            self.add_error(field, NEGATIVE_AMOUNT);
            return None;
        }

        Some(value)
    }

    pub fn number_or(&mut self, field: &str, default: f64) -> Option<f64> {
        self.optional(field, parse_number)
            .map(|value| value.unwrap_or(default))
    }

    pub fn integer_in_range(&mut self, field: &str, min: i32, max: i32) -> Option<i32> {
        let value = self.required(field, parse_integer)?;

        if value < min || value > max {
            self.add_error(field, range_message(min, max));
            return None;
        }

        Some(value)
    }

    pub fn string(&mut self, field: &str, min_len: usize, max_len: usize) -> Option<String> {
        let value = self.required(field, parse_string)?;
        self.check_length(field, value, min_len, max_len)
    }

    pub fn optional_string(&mut self, field: &str, max_len: usize) -> Option<Option<String>> {
        match self.optional(field, parse_string)? {
            Some(value) => self.check_length(field, value, 0, max_len).map(Some),
            None => Some(None),
        }
    }

    pub fn date(&mut self, field: &str) -> Option<NaiveDate> {
        self.required(field, parse_date)
    }

    fn check_length(
        &mut self,
        field: &str,
        value: String,
        min_len: usize,
        max_len: usize,
    ) -> Option<String> {
        let len = value.chars().count();

        if len < min_len {
            self.add_error(field, format!("Shorter than minimum length {min_len}."));
            return None;
        }

        if len > max_len {
            self.add_error(field, format!("Longer than maximum length {max_len}."));
            return None;
        }

        Some(value)
    }

    /// Consumes the reader. Fields outside `known_fields` are reported as unknown.
    pub fn finish(mut self, known_fields: &[&str]) -> Result<(), FieldErrors> {
        let unknown = self
            .record
            .keys()
            .filter(|k| !known_fields.contains(&k.as_str()))
            .cloned()
            .collect::<Vec<_>>();

        for field in unknown {
            self.add_error(&field, UNKNOWN_FIELD);
        }

        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}

impl FieldReader<'_> {
    /// Like `finish`, but yields the record built from the fields read. A record that failed to
    /// build without any field error is reported under `_schema`.
    pub fn finish_into<T>(
        self,
        known_fields: &[&str],
        value: Option<T>,
    ) -> Result<T, FieldErrors> {
        self.finish(known_fields)?;

        value.ok_or_else(|| {
            FieldErrors::from([(String::from("_schema"), vec![String::from(INVALID_RECORD)])])
        })
    }
}

pub fn range_message(min: i32, max: i32) -> String {
    format!("Must be greater than or equal to {min} and less than or equal to {max}.")
}

fn parse_number(value: &Value) -> Result<f64, &'static str> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match number {
        Some(n) if !n.is_finite() => Err(NOT_A_NUMBER),
        Some(n) if n.abs() > MAX_AMOUNT => Err(AMOUNT_TOO_LARGE),
        Some(n) => Ok(n),
        None => Err(NOT_A_NUMBER),
    }
}

fn parse_integer(value: &Value) -> Result<i32, &'static str> {
    let integer = match value {
        Value::Number(n) => match n.as_i64() {
            Some(i) => Some(i),
            None => n
                .as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() <= i32::MAX as f64)
                .map(|f| f as i64),
        },
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };

    integer
        .and_then(|i| i32::try_from(i).ok())
        .ok_or(NOT_AN_INTEGER)
}

fn parse_string(value: &Value) -> Result<String, &'static str> {
    match value {
        Value::String(s) => Ok(s.clone()),
        _ => Err(NOT_A_STRING),
    }
}

pub(crate) fn parse_date_str(value: &str) -> Option<NaiveDate> {
    // chrono tolerates signs and single-digit months and days, the wire format does not
    let bytes = value.as_bytes();
    let is_well_shaped = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        });

    if !is_well_shaped {
        return None;
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

fn parse_date(value: &Value) -> Result<NaiveDate, &'static str> {
    match value {
        Value::String(s) => parse_date_str(s).ok_or(NOT_A_DATE),
        _ => Err(NOT_A_DATE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    fn record(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(m) => m,
            _ => panic!("Test record must be an object"),
        }
    }

    #[test]
    fn test_number_coercion() {
        let r = record(json!({
            "int": 12,
            "float": 12.5,
            "string": " 7.25 ",
            "bad_string": "seven",
            "bool": true,
            "negative": -1,
            "huge": 1e308,
            "huge_string": "-1e13",
            "ceiling": MAX_AMOUNT,
        }));

        let mut reader = FieldReader::new(&r);

        assert_eq!(reader.number("int"), Some(12.0));
        assert_eq!(reader.number("float"), Some(12.5));
        assert_eq!(reader.number("string"), Some(7.25));
        assert_eq!(reader.number("bad_string"), None);
        assert_eq!(reader.number("bool"), None);
        assert_eq!(reader.non_negative_number("negative"), None);
        assert_eq!(reader.number("missing"), None);
        assert_eq!(reader.number("huge"), None);
        assert_eq!(reader.number("huge_string"), None);
        assert_eq!(reader.number("ceiling"), Some(MAX_AMOUNT));

        let errors = reader
            .finish(&[
                "int",
                "float",
                "string",
                "bad_string",
                "bool",
                "negative",
                "huge",
                "huge_string",
                "ceiling",
            ])
            .unwrap_err();

        assert_eq!(errors["bad_string"], vec![NOT_A_NUMBER]);
        assert_eq!(errors["bool"], vec![NOT_A_NUMBER]);
        assert_eq!(errors["negative"], vec![NEGATIVE_AMOUNT]);
        assert_eq!(errors["missing"], vec![MISSING_FIELD]);
        assert_eq!(errors["huge"], vec![AMOUNT_TOO_LARGE]);
        assert_eq!(errors["huge_string"], vec![AMOUNT_TOO_LARGE]);
        assert_eq!(errors.len(), 6);
    }

    #[test]
    fn test_integer_coercion() {
        let r = record(json!({
            "int": 3,
            "integral_float": 4.0,
            "string": "5",
            "fraction": 4.5,
            "huge": 10_000_000_000i64,
            "low": 0,
        }));

        let mut reader = FieldReader::new(&r);

        assert_eq!(reader.integer_in_range("int", 1, 12), Some(3));
        assert_eq!(reader.integer_in_range("integral_float", 1, 12), Some(4));
        assert_eq!(reader.integer_in_range("string", 1, 12), Some(5));
        assert_eq!(reader.integer_in_range("fraction", 1, 12), None);
        assert_eq!(reader.integer_in_range("huge", 1, 12), None);
        assert_eq!(reader.integer_in_range("low", 1, 12), None);

        let errors = reader
            .finish(&["int", "integral_float", "string", "fraction", "huge", "low"])
            .unwrap_err();

        assert_eq!(errors["fraction"], vec![NOT_AN_INTEGER]);
        assert_eq!(errors["huge"], vec![NOT_AN_INTEGER]);
        assert_eq!(errors["low"], vec![range_message(1, 12)]);
    }

    #[test]
    fn test_strings_and_dates() {
        let r = record(json!({
            "name": "",
            "long": "abcdef",
            "num": 5,
            "note": null,
            "date": "2024-03-15",
            "short_date": "2024-3-5",
            "signed_date": "+2024-1-05",
            "spaced_date": " 2024-1-05",
            "slashed_date": "2024/01/05",
            "not_a_date": "2024-02-30",
        }));

        let mut reader = FieldReader::new(&r);

        assert_eq!(reader.string("name", 1, 10), None);
        assert_eq!(reader.string("long", 1, 5), None);
        assert_eq!(reader.string("num", 0, 5), None);
        assert_eq!(reader.optional_string("note", 5), Some(None));
        assert_eq!(reader.optional_string("absent", 5), Some(None));
        assert_eq!(
            reader.date("date"),
            NaiveDate::from_ymd_opt(2024, 3, 15)
        );
        assert_eq!(reader.date("short_date"), None);
        assert_eq!(reader.date("signed_date"), None);
        assert_eq!(reader.date("spaced_date"), None);
        assert_eq!(reader.date("slashed_date"), None);
        assert_eq!(reader.date("not_a_date"), None);

        let errors = reader
            .finish(&[
                "name",
                "long",
                "num",
                "note",
                "date",
                "short_date",
                "signed_date",
                "spaced_date",
                "slashed_date",
                "not_a_date",
            ])
            .unwrap_err();

        assert_eq!(errors["name"], vec!["Shorter than minimum length 1."]);
        assert_eq!(errors["long"], vec!["Longer than maximum length 5."]);
        assert_eq!(errors["num"], vec![NOT_A_STRING]);
        assert_eq!(errors["short_date"], vec![NOT_A_DATE]);
        assert_eq!(errors["signed_date"], vec![NOT_A_DATE]);
        assert_eq!(errors["spaced_date"], vec![NOT_A_DATE]);
        assert_eq!(errors["slashed_date"], vec![NOT_A_DATE]);
        assert_eq!(errors["not_a_date"], vec![NOT_A_DATE]);
        assert!(!errors.contains_key("note"));
    }

    #[test]
    fn test_finish_into() {
        let r = record(json!({ "amount": 3 }));

        let mut reader = FieldReader::new(&r);
        let amount = reader.number("amount");
        assert_eq!(reader.finish_into(&["amount"], amount), Ok(3.0));

        let reader = FieldReader::new(&r);
        let errors = reader.finish_into::<f64>(&["amount"], None).unwrap_err();
        assert_eq!(errors["_schema"], vec![INVALID_RECORD]);
        assert_eq!(errors.len(), 1);

        let mut reader = FieldReader::new(&r);
        let missing = reader.number("current");
        let errors = reader.finish_into(&["amount", "current"], missing).unwrap_err();
        assert_eq!(errors["current"], vec![MISSING_FIELD]);
        assert!(!errors.contains_key("_schema"));
    }

    #[test]
    fn test_null_and_unknown_fields() {
        let r = record(json!({ "amount": null, "user_id": 4 }));
        let mut reader = FieldReader::new(&r);

        assert_eq!(reader.number("amount"), None);
        assert_eq!(reader.number_or("current", 0.0), Some(0.0));

        let errors = reader.finish(&["amount", "current"]).unwrap_err();

        assert_eq!(errors["amount"], vec![NULL_FIELD]);
        assert_eq!(errors["user_id"], vec![UNKNOWN_FIELD]);
    }
}
