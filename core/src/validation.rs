//! Client-side checks for worker forms.
//!
//! Validation rejects sloppy input instead of fixing it: a name with a
//! leading, trailing or doubled space is an error even though
//! `normalize_name` would clean it up. The `sanitized()` pass still runs
//! before submission, so both behaviors apply to every payload.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::types::{CreateWorker, UpdateWorker};

pub const NAME_MIN_CHARS: usize = 2;
pub const NAME_MAX_CHARS: usize = 50;
pub const EMAIL_MAX_CHARS: usize = 100;
/// Highest template slot on the fingerprint sensor; slots start at 0.
pub const MAX_FINGERPRINT_SLOT: u16 = 127;

// Letters, Latin-1 accented letters (minus × and ÷) and plain spaces.
static NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-zÀ-ÖØ-öø-ÿ ]+$").expect("valid name regex"));
static DOCUMENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{8}$").expect("valid document regex"));
static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{9}$").expect("valid phone regex"));
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    FirstName,
    LastName,
    DocumentNumber,
    Email,
    PhoneNumber,
    FingerprintId,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::FirstName => "firstName",
            Field::LastName => "lastName",
            Field::DocumentNumber => "documentNumber",
            Field::Email => "email",
            Field::PhoneNumber => "phoneNumber",
            Field::FingerprintId => "fingerprintId",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Reason {
    #[error("must have at least 2 characters")]
    TooShort,
    #[error("must have at most {0} characters")]
    TooLong(usize),
    #[error("may only contain letters and spaces")]
    InvalidCharacters,
    #[error("must not have leading, trailing or repeated spaces")]
    ExtraWhitespace,
    #[error("must not contain spaces")]
    ContainsWhitespace,
    #[error("must be exactly 8 digits")]
    NotEightDigits,
    #[error("must be exactly 9 digits")]
    NotNineDigits,
    #[error("is not a valid email address")]
    InvalidEmail,
    #[error("must be between 0 and {0}")]
    SlotOutOfRange(u16),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{} {reason}", .field.as_str())]
pub struct ValidationError {
    pub field: Field,
    pub reason: Reason,
}

/// Every failed check of one payload, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(pub Vec<ValidationError>);

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn for_field(&self, field: Field) -> Option<&ValidationError> {
        self.0.iter().find(|e| e.field == field)
    }

    fn check(&mut self, result: Result<(), ValidationError>) {
        if let Err(e) = result {
            self.0.push(e);
        }
    }

    fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|e| e.to_string()).collect();
        write!(f, "{}", parts.join("; "))
    }
}

/// Trim and collapse internal runs of whitespace to one space.
pub fn normalize_name(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn validate_name(field: Field, value: &str) -> Result<(), ValidationError> {
    let err = |reason| ValidationError { field, reason };
    let normalized = normalize_name(value);
    let len = normalized.chars().count();
    if len < NAME_MIN_CHARS {
        return Err(err(Reason::TooShort));
    }
    if len > NAME_MAX_CHARS {
        return Err(err(Reason::TooLong(NAME_MAX_CHARS)));
    }
    if !NAME_RE.is_match(&normalized) {
        return Err(err(Reason::InvalidCharacters));
    }
    if normalized != value {
        return Err(err(Reason::ExtraWhitespace));
    }
    Ok(())
}

pub fn validate_document_number(value: &str) -> Result<(), ValidationError> {
    let err = |reason| ValidationError {
        field: Field::DocumentNumber,
        reason,
    };
    if value.chars().any(char::is_whitespace) {
        return Err(err(Reason::ContainsWhitespace));
    }
    if !DOCUMENT_RE.is_match(value) {
        return Err(err(Reason::NotEightDigits));
    }
    Ok(())
}

pub fn validate_email(value: &str) -> Result<(), ValidationError> {
    let err = |reason| ValidationError {
        field: Field::Email,
        reason,
    };
    if value.chars().any(char::is_whitespace) {
        return Err(err(Reason::ContainsWhitespace));
    }
    if value.chars().count() > EMAIL_MAX_CHARS {
        return Err(err(Reason::TooLong(EMAIL_MAX_CHARS)));
    }
    if !EMAIL_RE.is_match(value) {
        return Err(err(Reason::InvalidEmail));
    }
    Ok(())
}

pub fn validate_phone_number(value: &str) -> Result<(), ValidationError> {
    let err = |reason| ValidationError {
        field: Field::PhoneNumber,
        reason,
    };
    if value.chars().any(char::is_whitespace) {
        return Err(err(Reason::ContainsWhitespace));
    }
    if !PHONE_RE.is_match(value) {
        return Err(err(Reason::NotNineDigits));
    }
    Ok(())
}

pub fn validate_fingerprint_slot(slot: u16) -> Result<(), ValidationError> {
    if slot > MAX_FINGERPRINT_SLOT {
        return Err(ValidationError {
            field: Field::FingerprintId,
            reason: Reason::SlotOutOfRange(MAX_FINGERPRINT_SLOT),
        });
    }
    Ok(())
}

/// Empty or blank optional strings count as "not provided".
fn provided(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

fn trimmed(value: &Option<String>) -> Option<String> {
    provided(value).map(|v| v.trim().to_string())
}

impl CreateWorker {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        errors.check(validate_name(Field::FirstName, &self.first_name));
        errors.check(validate_name(Field::LastName, &self.last_name));
        errors.check(validate_document_number(&self.document_number));
        if let Some(email) = provided(&self.email) {
            errors.check(validate_email(email));
        }
        if let Some(phone) = provided(&self.phone_number) {
            errors.check(validate_phone_number(phone));
        }
        errors.into_result()
    }

    pub fn sanitized(&self) -> Self {
        Self {
            first_name: normalize_name(&self.first_name),
            last_name: normalize_name(&self.last_name),
            document_number: self.document_number.trim().to_string(),
            email: trimmed(&self.email),
            phone_number: trimmed(&self.phone_number),
            has_restricted_area_access: self.has_restricted_area_access,
        }
    }
}

impl UpdateWorker {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        if let Some(name) = &self.first_name {
            errors.check(validate_name(Field::FirstName, name));
        }
        if let Some(name) = &self.last_name {
            errors.check(validate_name(Field::LastName, name));
        }
        if let Some(email) = provided(&self.email) {
            errors.check(validate_email(email));
        }
        if let Some(phone) = provided(&self.phone_number) {
            errors.check(validate_phone_number(phone));
        }
        errors.into_result()
    }

    /// Blank email or phone is kept as an empty string so the server
    /// clears the field; only keys the caller set are sent.
    pub fn sanitized(&self) -> Self {
        Self {
            first_name: self.first_name.as_deref().map(normalize_name),
            last_name: self.last_name.as_deref().map(normalize_name),
            email: self.email.as_deref().map(|v| v.trim().to_string()),
            phone_number: self.phone_number.as_deref().map(|v| v.trim().to_string()),
            has_restricted_area_access: self.has_restricted_area_access,
        }
    }
}
