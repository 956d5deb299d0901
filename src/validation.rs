use lazy_static::lazy_static;
use regex::Regex;
use time::{macros::format_description, Date};

use crate::error::AppError;

pub const MIN_PASSWORD_LEN: usize = 8;

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    static ref PHONE_RE: Regex = Regex::new(r"^\+?[0-9][0-9 \-]{5,18}[0-9]$").unwrap();
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Trims and lower-cases, then checks the shape.
pub fn normalize_email(raw: &str) -> Result<String, AppError> {
    let email = raw.trim().to_lowercase();
    if email.is_empty() {
        return Err(AppError::validation("Please provide your email"));
    }
    if !is_valid_email(&email) {
        return Err(AppError::validation("Please provide a valid email"));
    }
    Ok(email)
}

pub fn new_password(password: &str, confirm: &str) -> Result<(), AppError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    if password != confirm {
        return Err(AppError::validation("Passwords do not match"));
    }
    Ok(())
}

pub fn required(value: Option<String>, what: &str) -> Result<String, AppError> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::validation(format!("Please provide your {what}")))
}

/// Trims and drops empty strings.
pub fn optional(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_owned()).filter(|v| !v.is_empty())
}

pub fn phone(raw: &str) -> Result<String, AppError> {
    let phone = raw.trim();
    if PHONE_RE.is_match(phone) {
        Ok(phone.to_owned())
    } else {
        Err(AppError::validation(format!("{phone} is not a valid phone number!")))
    }
}

pub fn date(raw: &str) -> Result<Date, AppError> {
    Date::parse(raw.trim(), format_description!("[year]-[month]-[day]"))
        .map_err(|_| AppError::validation("Dates must be formatted as YYYY-MM-DD"))
}

pub fn non_negative(value: f64, what: &str) -> Result<f64, AppError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(AppError::validation(format!("{what} must not be negative")))
    }
}
