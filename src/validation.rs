//! Input validation for public inquiry submissions
//!
//! Runs before the admission gate so malformed submissions never consume
//! quota. Phone numbers are normalized to digits before they are checked.

use std::borrow::Cow;

use validator::{Validate, ValidationError};

use crate::models::CreateInquiryRequest;
use crate::types::{AppError, AppResult};

const BLOCKED_KEYWORDS: &[&str] = &[
    "SELECT", "AND", "SLEEP", "UNION", "INSERT", "UPDATE", "DELETE", "DROP", "CREATE", "ALTER",
    "EXEC", "EXECUTE", "SCRIPT",
];

const BLOCKED_CHARS: &[char] = &['"', '\'', '\\', ';', '<', '>'];

/// A submission after trimming and phone normalization.
#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct NewInquiry {
    #[validate(
        length(min = 1, max = 50, message = "Name must be 1-50 characters"),
        custom(function = "validate_free_text")
    )]
    pub name: String,

    #[validate(custom(function = "validate_phone"))]
    pub phone: String,

    #[validate(length(max = 50), custom(function = "validate_free_text"))]
    pub affiliation: Option<String>,

    #[validate(length(max = 50), custom(function = "validate_free_text"))]
    pub vehicle_type: Option<String>,

    #[validate(length(max = 100), custom(function = "validate_free_text"))]
    pub car_name: Option<String>,
}

fn error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}

pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    let len = phone.len();
    if phone.chars().all(|c| c.is_ascii_digit()) && (10..=11).contains(&len) {
        Ok(())
    } else {
        Err(error("phone", "Phone number must be 10-11 digits"))
    }
}

pub fn validate_free_text(value: &str) -> Result<(), ValidationError> {
    if contains_disallowed(value) {
        Err(error("disallowed", "Input contains characters that are not allowed"))
    } else {
        Ok(())
    }
}

/// True when `value` holds a blocked SQL keyword as a whole word or any
/// blocked punctuation. Word boundaries follow ASCII word characters, so
/// Hangul next to a keyword still separates it.
pub fn contains_disallowed(value: &str) -> bool {
    if value.contains(BLOCKED_CHARS) {
        return true;
    }

    value
        .split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .filter(|word| !word.is_empty())
        .any(|word| {
            BLOCKED_KEYWORDS
                .iter()
                .any(|keyword| word.eq_ignore_ascii_case(keyword))
        })
}

pub fn normalize_phone(phone: &str) -> String {
    phone.chars().filter(|c| c.is_ascii_digit()).collect()
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl CreateInquiryRequest {
    /// Normalize and validate the submission.
    pub fn into_new_inquiry(self) -> AppResult<NewInquiry> {
        let inquiry = NewInquiry {
            name: self.name.unwrap_or_default().trim().to_string(),
            phone: normalize_phone(self.phone.as_deref().unwrap_or_default()),
            affiliation: optional(self.affiliation),
            vehicle_type: optional(self.vehicle_type),
            car_name: optional(self.car_name),
        };

        inquiry
            .validate()
            .map_err(|e| AppError::InvalidRequest(e.to_string()))?;

        Ok(inquiry)
    }
}
