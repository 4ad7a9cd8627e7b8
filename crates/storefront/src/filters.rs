//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Reduce a display phone number to a `tel:`-safe dial string.
///
/// Usage in templates: `<a href="tel:{{ contact_phone|tel_href }}">`
#[askama::filter_fn]
pub fn tel_href(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(value
        .to_string()
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect())
}
