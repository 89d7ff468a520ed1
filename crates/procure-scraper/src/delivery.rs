//! Heuristic parsing of free-text delivery estimates.
//!
//! Store tiles describe delivery in prose ("Free delivery by Mon, May 20",
//! "Get it in 3-5 business days", "Pickup today"). [`parse_delivery`] turns
//! that prose into a [`DeliveryInfo`] without any external state.

use std::sync::LazyLock;

use procure_core::{DeliveryInfo, DeliverySpeed, DELIVERY_PRICE_PLACEHOLDER};
use regex::Regex;

/// Date/window patterns in priority order. The first pattern that matches
/// anywhere in the text wins, so an explicit date beats a bare day count.
static DATE_PATTERNS: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        // "by Mon, May 20", "on Tuesday June 3"
        Regex::new(
            r"(?i)\b(?:by|on)\s+(?:mon|tue|wed|thu|fri|sat|sun)[a-z]*,?\s+(?:jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\s+\d{1,2}",
        )
        .expect("valid weekday date regex"),
        // "05/20", "5/20/24", "5/20/2024"
        Regex::new(r"\d{1,2}/\d{1,2}(?:/\d{2,4})?").expect("valid numeric date regex"),
        // "in 2 days", "3-5 business days", "1 week"
        Regex::new(r"(?i)(?:in\s+)?\d+\s*(?:-\s*\d+)?\s*(?:day|business day|week)")
            .expect("valid day-count regex"),
    ]
});

/// Parses delivery prose into a structured estimate.
///
/// Total over all inputs: text that matches nothing still yields a
/// `Standard` speed with no date. The delivery price is always
/// [`DELIVERY_PRICE_PLACEHOLDER`].
#[must_use]
pub fn parse_delivery(text: &str) -> DeliveryInfo {
    let collapsed = collapse_whitespace(text);
    let lowered = collapsed.to_lowercase();

    DeliveryInfo {
        date: extract_date(&collapsed),
        speed: Some(classify_speed(&lowered)),
        text: Some(lowered),
        price: Some(DELIVERY_PRICE_PLACEHOLDER.to_owned()),
    }
}

/// Returns the full match of the highest-priority date pattern, preserving
/// the source casing (`"by Mon, May 20"`).
fn extract_date(text: &str) -> Option<String> {
    DATE_PATTERNS
        .iter()
        .find_map(|re| re.find(text))
        .map(|m| m.as_str().to_owned())
}

/// Classifies delivery speed from lowercased text. Earlier rules win.
fn classify_speed(lower: &str) -> DeliverySpeed {
    if lower.contains("same day") || lower.contains("today") {
        DeliverySpeed::SameDay
    } else if lower.contains("next day") || lower.contains("1 day") {
        DeliverySpeed::NextDay
    } else if lower.contains("2 day") || lower.contains("2-day") {
        DeliverySpeed::TwoDay
    } else {
        DeliverySpeed::Standard
    }
}

pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
