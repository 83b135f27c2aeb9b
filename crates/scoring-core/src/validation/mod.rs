//! Request schema engine
//!
//! A schema is a plain struct plus a `const` table of [`Field`]s, each pairing
//! a [`FieldSpec`] with the setter that stores the bound value. Binding walks
//! the table in declaration order, attempts every field, and returns either the
//! populated instance or every failing field at once.
//!
//! All state lives in the call: the instance and the error list are created
//! inside [`bind_all`] and handed back to the caller.

pub mod fields;

pub use fields::{Bound, FieldError, FieldErrorKind, FieldKind, FieldSpec, Gender};

use crate::error::ApiError;
use chrono::NaiveDate;
use serde_json::{Map, Value};
use std::fmt;

/// One declared field of schema `S`
pub struct Field<S> {
    pub spec: FieldSpec,
    pub assign: fn(&mut S, Bound),
}

impl<S> Field<S> {
    pub const fn new(spec: FieldSpec, assign: fn(&mut S, Bound)) -> Self {
        Self { spec, assign }
    }

    pub fn name(&self) -> &'static str {
        self.spec.name
    }
}

/// A request type that can be populated from a raw JSON mapping
pub trait RequestSchema: Default + Sized + 'static {
    /// Schema name used in logs
    const NAME: &'static str;

    /// Declared fields, in binding order
    const FIELDS: &'static [Field<Self>];

    /// Bind against today's local date
    fn bind(raw: &Map<String, Value>) -> Result<Self, BindErrors> {
        bind_all(raw, chrono::Local::now().date_naive())
    }

    /// Names of the declared fields
    fn field_names() -> Vec<&'static str> {
        Self::FIELDS.iter().map(Field::name).collect()
    }
}

/// Bind every declared field of `S` from `raw`
pub fn bind_all<S: RequestSchema>(
    raw: &Map<String, Value>,
    today: NaiveDate,
) -> Result<S, BindErrors> {
    let mut instance = S::default();
    let mut errors = BindErrors::new(S::NAME);

    for field in S::FIELDS {
        match field.spec.bind_at(raw.get(field.spec.name), today) {
            Ok(bound) => (field.assign)(&mut instance, bound),
            Err(err) => {
                tracing::debug!(schema = S::NAME, error = %err, "Field rejected");
                errors.push(err);
            }
        }
    }

    if errors.is_empty() {
        Ok(instance)
    } else {
        Err(errors)
    }
}

/// Ordered field failures of one bind pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindErrors {
    schema: &'static str,
    errors: Vec<FieldError>,
}

impl BindErrors {
    fn new(schema: &'static str) -> Self {
        Self {
            schema,
            errors: Vec::new(),
        }
    }

    fn push(&mut self, error: FieldError) {
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn schema(&self) -> &'static str {
        self.schema
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Failing field names in declaration order
    pub fn field_names(&self) -> Vec<&'static str> {
        self.errors.iter().map(|e| e.field).collect()
    }
}

impl fmt::Display for BindErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid fields: {}", self.field_names().join(", "))
    }
}

impl std::error::Error for BindErrors {}

impl From<BindErrors> for ApiError {
    fn from(errors: BindErrors) -> Self {
        ApiError::InvalidRequest(errors.to_string())
    }
}
