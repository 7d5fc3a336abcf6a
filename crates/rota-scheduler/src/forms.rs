//! Request bodies and their field rules

use std::fmt;

use rota_core::{DefinedError, TraceId};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::Permission;

/// One failed field rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub reason: &'static str,
}

impl FieldError {
    pub fn new(field: impl Into<String>, reason: &'static str) -> Self {
        Self {
            field: field.into(),
            reason,
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.reason)
    }
}

/// Field-level checks run after a body deserializes
pub trait Validate {
    /// Every failing field; empty when the value is acceptable
    fn validate(&self) -> Vec<FieldError>;
}

/// Validation error naming every failing field
pub fn validation_error(errors: &[FieldError], trace_id: TraceId) -> DefinedError {
    let fields = errors.iter().map(|e| e.field.clone()).collect();
    let detail = errors.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ");

    DefinedError::validation(fields)
        .message(format!("Invalid request: {detail}"))
        .trace_id(trace_id)
        .build()
}

fn is_hex_colour(value: &str) -> bool {
    value
        .strip_prefix('#')
        .is_some_and(|hex| matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit()))
}

fn is_email(value: &str) -> bool {
    value
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.') && !domain.starts_with('.'))
}

fn is_phone_number(value: &str) -> bool {
    let digits = value.strip_prefix('+').unwrap_or(value);
    (10..=18).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit())
}

fn is_timestamp(value: &str) -> bool {
    chrono::DateTime::parse_from_rfc3339(value).is_ok()
}

fn check_staff_fields(errors: &mut Vec<FieldError>, name: &str, color: &str, email: Option<&str>) {
    if name.trim().is_empty() {
        errors.push(FieldError::new("name", "must not be empty"));
    }
    if !is_hex_colour(color) {
        errors.push(FieldError::new("color", "must be a hex colour such as #1e90ff"));
    }
    if email.is_some_and(|e| !e.contains('@')) {
        errors.push(FieldError::new("email", "must be an email address"));
    }
}

const MIN_PASSWORD_LEN: usize = 8;

fn check_password(errors: &mut Vec<FieldError>, password: &SecretString) {
    if password.expose_secret().chars().count() < MIN_PASSWORD_LEN {
        errors.push(FieldError::new("password", "must be at least 8 characters"));
    }
}

/// Account registration
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: SecretString,
    pub color: String,
    pub image: Option<String>,
    pub phone_number: Option<String>,
}

impl Validate for Registration {
    fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();

        for (field, value) in [("firstName", &self.first_name), ("lastName", &self.last_name)] {
            if !(2..=64).contains(&value.trim().chars().count()) {
                errors.push(FieldError::new(field, "must be 2 to 64 characters"));
            }
        }
        if !is_email(&self.email) {
            errors.push(FieldError::new("email", "must be an email address"));
        }
        check_password(&mut errors, &self.password);
        if !(self.color.len() == 7 && is_hex_colour(&self.color)) {
            errors.push(FieldError::new("color", "must be a hex colour such as #1e90ff"));
        }
        if self.phone_number.as_deref().is_some_and(|p| !is_phone_number(p)) {
            errors.push(FieldError::new("phoneNumber", "must be 10 to 18 digits, optionally after +"));
        }

        errors
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignIn {
    pub email: String,
    pub password: SecretString,
}

impl Validate for SignIn {
    fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        if !is_email(&self.email) {
            errors.push(FieldError::new("email", "must be an email address"));
        }
        check_password(&mut errors, &self.password);
        errors
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStaff {
    pub name: String,
    pub color: String,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub image: Option<String>,
}

impl Validate for NewStaff {
    fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        check_staff_fields(&mut errors, &self.name, &self.color, self.email.as_deref());
        errors
    }
}

/// Full replacement of a staff member's editable fields
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffUpdate {
    pub name: String,
    pub color: String,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub image: Option<String>,
}

impl Validate for StaffUpdate {
    fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        check_staff_fields(&mut errors, &self.name, &self.color, self.email.as_deref());
        errors
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAppointment {
    /// Client-chosen id, echoed in partial failure reports
    pub id: Option<String>,
    pub staff_name: String,
    pub week_view_id: String,
    pub start_date: String,
    pub end_date: String,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAppointments {
    pub appointments: Vec<NewAppointment>,
}

impl Validate for NewAppointments {
    fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();

        if self.appointments.is_empty() {
            errors.push(FieldError::new("appointments", "must not be empty"));
        }

        for (i, item) in self.appointments.iter().enumerate() {
            if item.staff_name.trim().is_empty() {
                errors.push(FieldError::new(format!("appointments[{i}].staffName"), "must not be empty"));
            }
            if item.week_view_id.trim().is_empty() {
                errors.push(FieldError::new(format!("appointments[{i}].weekViewId"), "must not be empty"));
            }
            let start = chrono::DateTime::parse_from_rfc3339(&item.start_date);
            let end = chrono::DateTime::parse_from_rfc3339(&item.end_date);
            if start.is_err() {
                errors.push(FieldError::new(format!("appointments[{i}].startDate"), "must be an RFC 3339 timestamp"));
            }
            match (start, end) {
                (_, Err(_)) => {
                    errors.push(FieldError::new(format!("appointments[{i}].endDate"), "must be an RFC 3339 timestamp"));
                }
                (Ok(start), Ok(end)) if end < start => {
                    errors.push(FieldError::new(format!("appointments[{i}].endDate"), "must not precede startDate"));
                }
                _ => {}
            }
        }

        errors
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewShareLink {
    pub permission: String,
    pub expiry: Option<String>,
    #[serde(default)]
    pub week_view_ids: Vec<String>,
}

impl Validate for NewShareLink {
    fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();

        if self.permission.parse::<Permission>().is_err() {
            errors.push(FieldError::new("permission", "must be read or write"));
        }
        if self.expiry.as_deref().is_some_and(|e| !is_timestamp(e)) {
            errors.push(FieldError::new("expiry", "must be an RFC 3339 timestamp"));
        }
        if self.week_view_ids.iter().any(|w| w.trim().is_empty() || w.contains(',')) {
            errors.push(FieldError::new("weekViewIds", "must be non-empty ids without commas"));
        }

        errors
    }
}
