use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Price substituted when a product tile has no price element.
pub const PRICE_NOT_AVAILABLE: &str = "Price not available";

/// Delivery cost recorded for every parsed delivery block. Result pages do
/// not expose shipping cost in the delivery markup, so this is a fixed zero.
pub const DELIVERY_PRICE_PLACEHOLDER: &str = "0.00";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliverySpeed {
    SameDay,
    NextDay,
    TwoDay,
    Standard,
}

impl DeliverySpeed {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            DeliverySpeed::SameDay => "same_day",
            DeliverySpeed::NextDay => "next_day",
            DeliverySpeed::TwoDay => "two_day",
            DeliverySpeed::Standard => "standard",
        }
    }
}

impl std::fmt::Display for DeliverySpeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured delivery estimate for one listing.
///
/// A listing whose tile had no delivery block carries the all-`None`
/// [`DeliveryInfo::default`]; a parsed block always has `text`, `speed`
/// and `price` set, with `date` set only when a date pattern matched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryInfo {
    /// Lowercased, whitespace-collapsed delivery text.
    pub text: Option<String>,
    /// Matched date or window token, e.g. `"by Mon, May 20"` or `"in 3-5 days"`.
    pub date: Option<String>,
    pub speed: Option<DeliverySpeed>,
    pub price: Option<String>,
}

impl DeliveryInfo {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_none() && self.date.is_none() && self.speed.is_none() && self.price.is_none()
    }
}

/// One product record extracted from a store's search results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    /// [`crate::SourceConfig::name`] of the store the listing came from.
    pub store: String,
    /// Whitespace-normalized product title. May be empty.
    pub name: String,
    /// Absolute product URL.
    pub url: String,
    /// Display price exactly as shown, or [`PRICE_NOT_AVAILABLE`].
    pub price: String,
    pub captured_at: DateTime<Utc>,
    pub delivery: DeliveryInfo,
}
