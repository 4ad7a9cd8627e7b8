//! Display price parsing and formatting.
//!
//! Product prices arrive as free-form display strings (`"$24.99"`). The cart
//! needs a numeric amount for arithmetic, so this module converts between the
//! two. All arithmetic uses [`Decimal`]; floats never touch money.
//!
//! # Range-priced strings
//!
//! A string like `"$24.99 - $49.99"` cannot be stripped and parsed as one
//! number (the digits would concatenate across the hyphen). Such strings
//! resolve to the LOW end of the range. This is a deliberate behavior change
//! from the previous site, which produced an undefined value for ranges.

use std::str::FromStr;

use rust_decimal::Decimal;

/// Parse a display price string into a numeric amount.
///
/// Strips every character that is not a digit, `.`, or `-`, then parses the
/// remainder. A range string resolves to its low end. An empty or
/// unparseable remainder yields zero - a missing price never poisons a
/// total.
///
/// ```
/// use nonna_rues_core::price::parse_display;
/// use rust_decimal::Decimal;
///
/// assert_eq!(parse_display("$24.99"), Decimal::new(2499, 2));
/// assert_eq!(parse_display("$24.99 - $49.99"), Decimal::new(2499, 2));
/// assert_eq!(parse_display("call for price"), Decimal::ZERO);
/// ```
#[must_use]
pub fn parse_display(raw: &str) -> Decimal {
    if let Some(amount) = parse_stripped(raw) {
        return amount;
    }

    // The whole string did not parse. If it looks like a price range, take
    // the low end: the first hyphen-separated segment that parses.
    raw.split('-')
        .find_map(parse_stripped)
        .unwrap_or(Decimal::ZERO)
}

/// Format a numeric amount as a display price string (`"$"` + 2 decimals).
///
/// ```
/// use nonna_rues_core::price::format_display;
/// use rust_decimal::Decimal;
///
/// assert_eq!(format_display(Decimal::new(2499, 2)), "$24.99");
/// assert_eq!(format_display(Decimal::new(5, 0)), "$5.00");
/// ```
#[must_use]
pub fn format_display(amount: Decimal) -> String {
    format!("${amount:.2}")
}

/// Strip non-numeric characters and parse, or `None` if nothing parseable
/// remains.
fn parse_stripped(raw: &str) -> Option<Decimal> {
    let stripped: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();

    if stripped.is_empty() {
        return None;
    }

    Decimal::from_str(&stripped).ok()
}
