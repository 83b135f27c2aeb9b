//! Field validators
//!
//! A [`FieldSpec`] carries the required/nullable policy of one named field plus
//! a [`FieldKind`] tag selecting the type-specific rule. Binding a raw JSON
//! value yields either a typed [`Bound`] value or a [`FieldError`].

use chrono::NaiveDate;
use serde_json::{Map, Value};
use std::fmt;

/// Canonical date pattern, day first
pub const DATE_FORMAT: &str = "%d.%m.%Y";

/// Birthdays giving an age at or above this are rejected
pub const MAX_AGE_YEARS: i64 = 70;

const DAYS_PER_YEAR: f64 = 365.25;

/// Type tag selecting the validation rule of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Char,
    Arguments,
    Email,
    Phone,
    Date,
    BirthDay,
    Gender,
    ClientIds,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Char => write!(f, "string"),
            FieldKind::Arguments => write!(f, "object"),
            FieldKind::Email => write!(f, "email"),
            FieldKind::Phone => write!(f, "phone"),
            FieldKind::Date => write!(f, "date"),
            FieldKind::BirthDay => write!(f, "birthday"),
            FieldKind::Gender => write!(f, "gender"),
            FieldKind::ClientIds => write!(f, "client id list"),
        }
    }
}

/// Client gender as encoded on the wire.
///
/// Code `0` never reaches this type: it is an empty sentinel and binds to
/// [`Bound::Empty`] before the gender rule runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gender {
    Male = 1,
    Female = 2,
}

impl TryFrom<i64> for Gender {
    type Error = i64;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Gender::Male),
            2 => Ok(Gender::Female),
            other => Err(other),
        }
    }
}

/// Typed result of a successful bind
#[derive(Debug, Clone, PartialEq)]
pub enum Bound {
    /// Logically absent, or present but empty on a nullable field
    Empty,
    Text(String),
    Arguments(Map<String, Value>),
    Date(NaiveDate),
    Gender(Gender),
    ClientIds(Vec<u64>),
}

impl Bound {
    pub fn into_text(self) -> Option<String> {
        match self {
            Bound::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn into_arguments(self) -> Map<String, Value> {
        match self {
            Bound::Arguments(map) => map,
            _ => Map::new(),
        }
    }

    pub fn into_date(self) -> Option<NaiveDate> {
        match self {
            Bound::Date(date) => Some(date),
            _ => None,
        }
    }

    pub fn into_gender(self) -> Option<Gender> {
        match self {
            Bound::Gender(gender) => Some(gender),
            _ => None,
        }
    }

    pub fn into_client_ids(self) -> Vec<u64> {
        match self {
            Bound::ClientIds(ids) => ids,
            _ => Vec::new(),
        }
    }
}

/// Why a field failed to bind
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldErrorKind {
    /// Required key not present in the input mapping
    Missing,
    /// Empty value on a non-nullable field
    Empty,
    /// Value has the wrong JSON type
    WrongType { expected: FieldKind, actual: &'static str },
    /// Value has the right type but an invalid format or range
    Invalid(String),
}

/// A single field that failed to bind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub kind: FieldErrorKind,
}

impl FieldError {
    fn new(field: &'static str, kind: FieldErrorKind) -> Self {
        Self { field, kind }
    }

    /// Missing or empty, as opposed to a type/format failure
    pub fn is_structural(&self) -> bool {
        matches!(self.kind, FieldErrorKind::Missing | FieldErrorKind::Empty)
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            FieldErrorKind::Missing => write!(f, "'{}' is required", self.field),
            FieldErrorKind::Empty => write!(f, "'{}' must not be empty", self.field),
            FieldErrorKind::WrongType { expected, actual } => write!(
                f,
                "'{}' expected {}, found {}",
                self.field, expected, actual
            ),
            FieldErrorKind::Invalid(reason) => write!(f, "'{}' {}", self.field, reason),
        }
    }
}

/// Declarative description of one schema field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub required: bool,
    pub nullable: bool,
    pub kind: FieldKind,
}

impl FieldSpec {
    /// Optional, nullable field
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            required: false,
            nullable: true,
            kind,
        }
    }

    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub const fn not_nullable(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Bind a raw value; `today` is only read by birthday fields
    pub fn bind_at(&self, raw: Option<&Value>, today: NaiveDate) -> Result<Bound, FieldError> {
        let value = match raw {
            None if self.required => {
                return Err(FieldError::new(self.name, FieldErrorKind::Missing));
            }
            None => None,
            Some(value) => Some(value),
        };

        match value {
            Some(value) if !is_empty_value(value) => self.validate(value, today),
            _ if self.nullable => Ok(Bound::Empty),
            _ => Err(FieldError::new(self.name, FieldErrorKind::Empty)),
        }
    }

    fn validate(&self, value: &Value, today: NaiveDate) -> Result<Bound, FieldError> {
        match self.kind {
            FieldKind::Char => self.text(value).map(|s| Bound::Text(s.to_string())),
            FieldKind::Arguments => match value {
                Value::Object(map) => Ok(Bound::Arguments(map.clone())),
                other => Err(self.wrong_type(other)),
            },
            FieldKind::Email => {
                let email = self.text(value)?;
                if email.matches('@').count() == 1 {
                    Ok(Bound::Text(email.to_string()))
                } else {
                    Err(self.invalid("must contain exactly one '@'"))
                }
            }
            FieldKind::Phone => {
                let phone = match value {
                    Value::String(s) => s.clone(),
                    Value::Number(n) => n.to_string(),
                    other => return Err(self.wrong_type(other)),
                };
                if is_valid_phone(&phone) {
                    Ok(Bound::Text(phone))
                } else {
                    Err(self.invalid("is not a valid phone number"))
                }
            }
            FieldKind::Date => self.date(value).map(Bound::Date),
            FieldKind::BirthDay => {
                let birthday = self.date(value)?;
                if age_in_years(birthday, today) < MAX_AGE_YEARS {
                    Ok(Bound::Date(birthday))
                } else {
                    Err(self.invalid(format!(
                        "gives an age of {} years or more",
                        MAX_AGE_YEARS
                    )))
                }
            }
            FieldKind::Gender => match value.as_i64() {
                Some(code) => Gender::try_from(code)
                    .map(Bound::Gender)
                    .map_err(|code| self.invalid(format!("has unknown gender code {}", code))),
                None => Err(self.wrong_type(value)),
            },
            FieldKind::ClientIds => match value {
                Value::Array(items) => items
                    .iter()
                    .map(Value::as_u64)
                    .collect::<Option<Vec<_>>>()
                    .map(Bound::ClientIds)
                    .ok_or_else(|| self.invalid("must contain only non-negative integer ids")),
                other => Err(self.wrong_type(other)),
            },
        }
    }

    fn text<'a>(&self, value: &'a Value) -> Result<&'a str, FieldError> {
        value.as_str().ok_or_else(|| self.wrong_type(value))
    }

    fn date(&self, value: &Value) -> Result<NaiveDate, FieldError> {
        let text = self.text(value)?;
        NaiveDate::parse_from_str(text, DATE_FORMAT)
            .map_err(|_| self.invalid(format!("'{}' does not match DD.MM.YYYY", text)))
    }

    fn wrong_type(&self, value: &Value) -> FieldError {
        FieldError::new(
            self.name,
            FieldErrorKind::WrongType {
                expected: self.kind,
                actual: json_type_name(value),
            },
        )
    }

    fn invalid(&self, reason: impl Into<String>) -> FieldError {
        FieldError::new(self.name, FieldErrorKind::Invalid(reason.into()))
    }
}

/// Empty sentinels: `""`, `[]`, `{}` and numeric zero.
///
/// `null` is not one of them; it is rejected by every type rule.
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::Null | Value::Bool(_) => false,
    }
}

/// All ASCII digits starting with `7`, or exactly eleven characters long
pub fn is_valid_phone(phone: &str) -> bool {
    let all_digits = !phone.is_empty() && phone.chars().all(|c| c.is_ascii_digit());
    (all_digits && phone.starts_with('7')) || phone.chars().count() == 11
}

/// Whole years between `birthday` and `today`
pub fn age_in_years(birthday: NaiveDate, today: NaiveDate) -> i64 {
    let days = (today - birthday).num_days();
    (days as f64 / DAYS_PER_YEAR).floor() as i64
}

pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
