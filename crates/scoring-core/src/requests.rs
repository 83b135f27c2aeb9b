//! Concrete request schemas
//!
//! `MethodRequest` is the envelope every call arrives in; the two payload
//! schemas are bound from its `arguments` mapping by the method handlers.

use chrono::NaiveDate;
use serde_json::{Map, Value};

use crate::validation::{Bound, Field, FieldKind, FieldSpec, Gender, RequestSchema};

/// Login granted the admin rules
pub const ADMIN_LOGIN: &str = "admin";

/// Outer request carrying credentials, method name and nested arguments
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MethodRequest {
    pub account: Option<String>,
    pub login: String,
    pub token: String,
    pub arguments: Map<String, Value>,
    pub method: String,
}

impl MethodRequest {
    pub fn is_admin(&self) -> bool {
        self.login == ADMIN_LOGIN
    }

    fn set_account(&mut self, value: Bound) {
        self.account = value.into_text();
    }

    fn set_login(&mut self, value: Bound) {
        self.login = value.into_text().unwrap_or_default();
    }

    fn set_token(&mut self, value: Bound) {
        self.token = value.into_text().unwrap_or_default();
    }

    fn set_arguments(&mut self, value: Bound) {
        self.arguments = value.into_arguments();
    }

    fn set_method(&mut self, value: Bound) {
        self.method = value.into_text().unwrap_or_default();
    }
}

impl RequestSchema for MethodRequest {
    const NAME: &'static str = "method_request";
    const FIELDS: &'static [Field<Self>] = &[
        Field::new(FieldSpec::new("account", FieldKind::Char), Self::set_account),
        Field::new(FieldSpec::new("login", FieldKind::Char).required(), Self::set_login),
        Field::new(FieldSpec::new("token", FieldKind::Char).required(), Self::set_token),
        Field::new(
            FieldSpec::new("arguments", FieldKind::Arguments).required(),
            Self::set_arguments,
        ),
        Field::new(
            FieldSpec::new("method", FieldKind::Char).required().not_nullable(),
            Self::set_method,
        ),
    ];
}

/// Fields of the `online_score` payload, in declaration order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProfileField {
    FirstName,
    LastName,
    Email,
    Phone,
    Birthday,
    Gender,
}

impl ProfileField {
    pub const ALL: [ProfileField; 6] = [
        ProfileField::FirstName,
        ProfileField::LastName,
        ProfileField::Email,
        ProfileField::Phone,
        ProfileField::Birthday,
        ProfileField::Gender,
    ];

    /// Key of the field in the `arguments` mapping
    pub const fn name(self) -> &'static str {
        match self {
            ProfileField::FirstName => "first_name",
            ProfileField::LastName => "last_name",
            ProfileField::Email => "email",
            ProfileField::Phone => "phone",
            ProfileField::Birthday => "birthday",
            ProfileField::Gender => "gender",
        }
    }
}

/// Payload of the `online_score` method
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OnlineScoreRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub birthday: Option<NaiveDate>,
    pub gender: Option<Gender>,
}

impl OnlineScoreRequest {
    /// Pairs of which at least one must be fully present
    pub const REQUIRED_PAIRS: [(ProfileField, ProfileField); 3] = [
        (ProfileField::FirstName, ProfileField::LastName),
        (ProfileField::Email, ProfileField::Phone),
        (ProfileField::Birthday, ProfileField::Gender),
    ];

    /// Whether `field` holds a non-empty value
    pub fn has(&self, field: ProfileField) -> bool {
        match field {
            ProfileField::FirstName => self.first_name.is_some(),
            ProfileField::LastName => self.last_name.is_some(),
            ProfileField::Email => self.email.is_some(),
            ProfileField::Phone => self.phone.is_some(),
            ProfileField::Birthday => self.birthday.is_some(),
            ProfileField::Gender => self.gender.is_some(),
        }
    }

    /// Non-empty fields in declaration order
    pub fn non_empty_fields(&self) -> Vec<&'static str> {
        ProfileField::ALL
            .into_iter()
            .filter(|field| self.has(*field))
            .map(ProfileField::name)
            .collect()
    }

    /// True if any of [`Self::REQUIRED_PAIRS`] is complete
    pub fn has_complete_pair(&self) -> bool {
        Self::REQUIRED_PAIRS
            .iter()
            .any(|(a, b)| self.has(*a) && self.has(*b))
    }

    /// Empty members of the required pairs, in declaration order
    pub fn empty_pair_fields(&self) -> Vec<&'static str> {
        ProfileField::ALL
            .into_iter()
            .filter(|field| !self.has(*field))
            .map(ProfileField::name)
            .collect()
    }

    fn set_first_name(&mut self, value: Bound) {
        self.first_name = value.into_text();
    }

    fn set_last_name(&mut self, value: Bound) {
        self.last_name = value.into_text();
    }

    fn set_email(&mut self, value: Bound) {
        self.email = value.into_text();
    }

    fn set_phone(&mut self, value: Bound) {
        self.phone = value.into_text();
    }

    fn set_birthday(&mut self, value: Bound) {
        self.birthday = value.into_date();
    }

    fn set_gender(&mut self, value: Bound) {
        self.gender = value.into_gender();
    }
}

impl RequestSchema for OnlineScoreRequest {
    const NAME: &'static str = "online_score_request";
    const FIELDS: &'static [Field<Self>] = &[
        Field::new(
            FieldSpec::new(ProfileField::FirstName.name(), FieldKind::Char),
            Self::set_first_name,
        ),
        Field::new(
            FieldSpec::new(ProfileField::LastName.name(), FieldKind::Char),
            Self::set_last_name,
        ),
        Field::new(
            FieldSpec::new(ProfileField::Email.name(), FieldKind::Email),
            Self::set_email,
        ),
        Field::new(
            FieldSpec::new(ProfileField::Phone.name(), FieldKind::Phone),
            Self::set_phone,
        ),
        Field::new(
            FieldSpec::new(ProfileField::Birthday.name(), FieldKind::BirthDay),
            Self::set_birthday,
        ),
        Field::new(
            FieldSpec::new(ProfileField::Gender.name(), FieldKind::Gender),
            Self::set_gender,
        ),
    ];
}

/// Payload of the `clients_interests` method
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientsInterestsRequest {
    pub client_ids: Vec<u64>,
    pub date: Option<NaiveDate>,
}

impl ClientsInterestsRequest {
    fn set_client_ids(&mut self, value: Bound) {
        self.client_ids = value.into_client_ids();
    }

    fn set_date(&mut self, value: Bound) {
        self.date = value.into_date();
    }
}

impl RequestSchema for ClientsInterestsRequest {
    const NAME: &'static str = "clients_interests_request";
    const FIELDS: &'static [Field<Self>] = &[
        Field::new(
            FieldSpec::new("client_ids", FieldKind::ClientIds).required(),
            Self::set_client_ids,
        ),
        Field::new(FieldSpec::new("date", FieldKind::Date), Self::set_date),
    ];
}
