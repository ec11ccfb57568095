//! Field checks shared by the record operations.
use super::{ServiceError, ServiceResult};
use chrono::NaiveDate;
use url::Url;

pub const USERNAME_MAX: usize = 150;
pub const EMAIL_MAX: usize = 254;
pub const NAME_MAX: usize = 150;
pub const ADDRESS_MAX: usize = 255;
pub const CITY_MAX: usize = 100;
pub const PROVINCE_MAX: usize = 100;
pub const TITLE_MAX: usize = 255;
pub const LANGUAGE_MAX: usize = 50;

fn invalid(field: &str, reason: impl std::fmt::Display) -> ServiceError {
    ServiceError::Validation(format!("{field}: {reason}"))
}

/// Non-blank and at most `max` characters.
pub fn required(field: &str, value: &str, max: usize) -> ServiceResult<()> {
    if value.trim().is_empty() {
        return Err(invalid(field, "must not be blank"));
    }
    at_most(field, value, max)
}

pub fn at_most(field: &str, value: &str, max: usize) -> ServiceResult<()> {
    if value.chars().count() > max {
        return Err(invalid(field, format_args!("must be at most {max} characters")));
    }
    Ok(())
}

pub fn required_text(field: &str, value: &str) -> ServiceResult<()> {
    if value.trim().is_empty() {
        return Err(invalid(field, "must not be blank"));
    }
    Ok(())
}

pub fn username(value: &str) -> ServiceResult<()> {
    required("username", value, USERNAME_MAX)?;
    let allowed = |c: char| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_');
    if !value.chars().all(allowed) {
        return Err(invalid(
            "username",
            "may contain only letters, digits and @/./+/-/_",
        ));
    }
    Ok(())
}

pub fn email(value: &str) -> ServiceResult<()> {
    required("email", value, EMAIL_MAX)?;
    let mut parts = value.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(invalid("email", "must contain exactly one @"));
    };
    if local.is_empty() || domain.is_empty() || value.chars().any(char::is_whitespace) {
        return Err(invalid("email", "is not a valid address"));
    }
    Ok(())
}

pub fn password(value: &str) -> ServiceResult<()> {
    if value.is_empty() {
        return Err(invalid("password", "must not be empty"));
    }
    Ok(())
}

/// Absolute http(s) URL with a non-empty host.
pub fn url(value: &str) -> ServiceResult<()> {
    let parsed = Url::parse(value).map_err(|err| invalid("url", err))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid("url", "must use http or https"));
    }
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(invalid("url", "must include a host"));
    }
    Ok(())
}

pub fn date_order(start: NaiveDate, end: NaiveDate) -> ServiceResult<()> {
    if start > end {
        return Err(invalid("end_date", "must not be before start_date"));
    }
    Ok(())
}
