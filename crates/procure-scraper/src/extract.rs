//! Generic product-tile extraction driven by a source's selector set.
//!
//! Every store is handled by the same code path; only the
//! [`procure_core::SelectorSet`] differs. Missing elements are modelled as
//! `Option`s: a tile without a usable title link is skipped, a tile without a
//! price gets [`PRICE_NOT_AVAILABLE`], and a tile without a delivery block
//! gets an empty [`DeliveryInfo`].

use chrono::{DateTime, Utc};
use procure_core::{DeliveryInfo, Listing, SelectorSet, SourceConfig, PRICE_NOT_AVAILABLE};
use scraper::{ElementRef, Html, Selector};

use crate::delivery::{collapse_whitespace, parse_delivery};
use crate::error::ExtractError;
use crate::fetch::RawPage;
use crate::urls::resolve_url;

/// A source's [`SelectorSet`] parsed into `scraper` selectors.
#[derive(Debug, Clone)]
pub struct CompiledSelectors {
    container: Selector,
    title: Selector,
    price: Selector,
    delivery: Selector,
}

impl CompiledSelectors {
    /// # Errors
    ///
    /// Returns [`ExtractError::InvalidSelector`] naming the first selector
    /// that is not valid CSS.
    pub fn compile(set: &SelectorSet) -> Result<Self, ExtractError> {
        Ok(Self {
            container: compile_one("container", &set.container)?,
            title: compile_one("title", &set.title)?,
            price: compile_one("price", &set.price)?,
            delivery: compile_one("delivery", &set.delivery)?,
        })
    }
}

fn compile_one(field: &'static str, selector: &str) -> Result<Selector, ExtractError> {
    Selector::parse(selector).map_err(|e| ExtractError::InvalidSelector {
        field,
        selector: selector.to_owned(),
        reason: e.to_string(),
    })
}

/// Why a single product tile produced no listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemSkip {
    MissingTitle,
    MissingHref,
    EmptyHref,
}

/// Listings extracted from one page plus the bookkeeping needed to tell
/// "store had no results" apart from "selectors no longer match".
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    /// Listings in document order.
    pub listings: Vec<Listing>,
    pub containers_found: usize,
    /// Containers that were skipped (see [`ItemSkip`]).
    pub skipped: usize,
}

impl Extraction {
    /// `true` when the page matched zero product containers. On a page that
    /// fetched successfully this usually means the store changed its markup.
    #[must_use]
    pub fn markup_mismatch(&self) -> bool {
        self.containers_found == 0
    }
}

/// Compiles the source's selectors and extracts listings from `page`.
///
/// # Errors
///
/// Returns [`ExtractError::InvalidSelector`] if the source's selector set is
/// not valid CSS. Markup-shape problems never error.
pub fn extract(page: &RawPage, source: &SourceConfig) -> Result<Extraction, ExtractError> {
    let selectors = CompiledSelectors::compile(&source.selectors)?;
    Ok(extract_listings(page, source, &selectors))
}

/// Extracts one listing per product container in `page`, skipping tiles
/// that cannot be turned into a listing.
#[must_use]
pub fn extract_listings(
    page: &RawPage,
    source: &SourceConfig,
    selectors: &CompiledSelectors,
) -> Extraction {
    let document = Html::parse_document(&page.body);
    let containers: Vec<ElementRef<'_>> = document.select(&selectors.container).collect();

    if containers.is_empty() {
        tracing::warn!(
            source = %source.name,
            url = %page.url,
            "no product containers matched; the site structure may have changed"
        );
        return Extraction::default();
    }

    tracing::debug!(
        source = %source.name,
        count = containers.len(),
        "found product containers"
    );

    let mut extraction = Extraction {
        listings: Vec::with_capacity(containers.len()),
        containers_found: containers.len(),
        skipped: 0,
    };

    for (index, container) in containers.into_iter().enumerate() {
        match extract_item(container, source, selectors, Utc::now()) {
            Ok(listing) => extraction.listings.push(listing),
            Err(reason) => {
                tracing::debug!(source = %source.name, index, ?reason, "skipping product tile");
                extraction.skipped += 1;
            }
        }
    }

    if extraction.skipped > 0 {
        tracing::warn!(
            source = %source.name,
            skipped = extraction.skipped,
            extracted = extraction.listings.len(),
            "some product tiles could not be parsed"
        );
    }

    extraction
}

fn extract_item(
    container: ElementRef<'_>,
    source: &SourceConfig,
    selectors: &CompiledSelectors,
    captured_at: DateTime<Utc>,
) -> Result<Listing, ItemSkip> {
    let title = container
        .select(&selectors.title)
        .next()
        .ok_or(ItemSkip::MissingTitle)?;
    let href = title.value().attr("href").ok_or(ItemSkip::MissingHref)?;
    if href.trim().is_empty() {
        return Err(ItemSkip::EmptyHref);
    }

    let price = container
        .select(&selectors.price)
        .next()
        .map(|el| element_text(el, ""))
        .unwrap_or_else(|| PRICE_NOT_AVAILABLE.to_owned());

    let delivery = container
        .select(&selectors.delivery)
        .next()
        .map_or_else(DeliveryInfo::default, |el| {
            parse_delivery(&element_text(el, " "))
        });

    Ok(Listing {
        store: source.name.clone(),
        name: element_text(title, ""),
        url: resolve_url(href, &source.base_url),
        price,
        captured_at,
        delivery,
    })
}

/// Element text with whitespace runs collapsed. `separator` is placed
/// between text nodes: `""` keeps split prices like `$<sup>5</sup>98` intact,
/// `" "` keeps block-level delivery lines apart.
fn element_text(element: ElementRef<'_>, separator: &str) -> String {
    collapse_whitespace(&element.text().collect::<Vec<_>>().join(separator))
}

#[cfg(test)]
#[path = "extract_test.rs"]
mod tests;
