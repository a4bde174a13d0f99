//! Default values for cart item fields.
//!
//! Each field that may be missing or malformed on the way in has an ordered
//! chain of sources, tried top to bottom until one yields a value:
//!
//! | field   | chain                                                        |
//! |---------|--------------------------------------------------------------|
//! | `name`  | explicit non-empty value → `"Item"`                          |
//! | `price` | leading number of the input, if non-negative → `0`           |
//! | `image` | explicit non-empty value → per-product default → placeholder |
//!
//! Prices beyond the range of [`Decimal`] saturate at [`Decimal::MAX`].

use std::collections::BTreeMap;

use dispaso_core::Price;
use rust_decimal::Decimal;
use serde_json::Value;

/// Name shown for items added without one.
pub const GENERIC_NAME: &str = "Item";

/// Sources for an item's display name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameSource {
    Explicit,
    Generic,
}

/// Sources for an item's unit price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceSource {
    LeadingNumber,
    Zero,
}

/// Sources for an item's image URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSource {
    Explicit,
    ProductDefault,
    Placeholder,
}

pub const NAME_CHAIN: [NameSource; 2] = [NameSource::Explicit, NameSource::Generic];
pub const PRICE_CHAIN: [PriceSource; 2] = [PriceSource::LeadingNumber, PriceSource::Zero];
pub const IMAGE_CHAIN: [ImageSource; 3] = [
    ImageSource::Explicit,
    ImageSource::ProductDefault,
    ImageSource::Placeholder,
];

/// Products that ship with their own image.
const PRODUCT_IMAGES: [(&str, &str); 3] = [
    ("energy-rush", "energy-rush.png"),
    ("cherry-burst", "cherry-burst.png"),
    ("citrus-kick", "citrus-kick.png"),
];

const PLACEHOLDER_IMAGE: &str = "default-can.png";

/// Resolves item fields through the fallback chains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemDefaults {
    product_images: BTreeMap<String, String>,
    placeholder_image: String,
}

impl Default for ItemDefaults {
    fn default() -> Self {
        Self::new("./images")
    }
}

impl ItemDefaults {
    /// Defaults for the stock catalogue, with images under `image_dir`.
    #[must_use]
    pub fn new(image_dir: &str) -> Self {
        let dir = image_dir.trim_end_matches('/');
        Self {
            product_images: PRODUCT_IMAGES
                .iter()
                .map(|(id, file)| ((*id).to_string(), format!("{dir}/{file}")))
                .collect(),
            placeholder_image: format!("{dir}/{PLACEHOLDER_IMAGE}"),
        }
    }

    /// Register (or replace) the default image for a product.
    #[must_use]
    pub fn with_product_image(mut self, id: &str, url: &str) -> Self {
        self.product_images.insert(id.to_string(), url.to_string());
        self
    }

    /// The per-product default image, if one is registered.
    #[must_use]
    pub fn product_image(&self, id: &str) -> Option<&str> {
        self.product_images.get(id).map(String::as_str)
    }

    /// The generic placeholder image.
    #[must_use]
    pub fn placeholder_image(&self) -> &str {
        &self.placeholder_image
    }

    /// Resolve a display name.
    #[must_use]
    pub fn resolve_name(explicit: Option<&str>) -> String {
        NAME_CHAIN
            .iter()
            .find_map(|source| match source {
                NameSource::Explicit => non_empty(explicit),
                NameSource::Generic => Some(GENERIC_NAME),
            })
            .unwrap_or(GENERIC_NAME)
            .to_string()
    }

    /// Resolve a unit price from raw text.
    #[must_use]
    pub fn resolve_price(raw: Option<&str>) -> Decimal {
        PRICE_CHAIN
            .iter()
            .find_map(|source| match source {
                PriceSource::LeadingNumber => raw
                    .and_then(Price::leading_number)
                    .filter(|amount| !amount.is_sign_negative()),
                PriceSource::Zero => Some(Decimal::ZERO),
            })
            .unwrap_or(Decimal::ZERO)
    }

    /// Resolve a unit price from a persisted JSON value.
    ///
    /// Numbers and numeric strings both go through the text chain; anything
    /// else resolves to zero.
    #[must_use]
    pub fn resolve_price_value(value: &Value) -> Decimal {
        match value {
            Value::Number(n) => Self::resolve_price(Some(&n.to_string())),
            Value::String(s) => Self::resolve_price(Some(s)),
            _ => Self::resolve_price(None),
        }
    }

    /// Resolve an image URL for product `id`.
    #[must_use]
    pub fn resolve_image(&self, id: &str, explicit: Option<&str>) -> String {
        IMAGE_CHAIN
            .iter()
            .find_map(|source| match source {
                ImageSource::Explicit => non_empty(explicit),
                ImageSource::ProductDefault => self.product_image(id),
                ImageSource::Placeholder => Some(self.placeholder_image.as_str()),
            })
            .unwrap_or(self.placeholder_image.as_str())
            .to_string()
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_chain() {
        assert_eq!(ItemDefaults::resolve_name(Some("Energy Rush")), "Energy Rush");
        assert_eq!(ItemDefaults::resolve_name(Some("")), "Item");
        assert_eq!(ItemDefaults::resolve_name(None), "Item");
    }

    #[test]
    fn test_price_chain() {
        assert_eq!(ItemDefaults::resolve_price(Some("49.99")), Decimal::new(4999, 2));
        assert_eq!(ItemDefaults::resolve_price(Some("12abc")), Decimal::new(12, 0));
        assert_eq!(ItemDefaults::resolve_price(Some("free")), Decimal::ZERO);
        assert_eq!(ItemDefaults::resolve_price(Some("-5")), Decimal::ZERO);
        assert_eq!(ItemDefaults::resolve_price(None), Decimal::ZERO);
    }

    #[test]
    fn test_price_chain_saturates_huge_prices() {
        assert_eq!(
            ItemDefaults::resolve_price(Some("100000000000000000000000000000")),
            Decimal::MAX
        );
        assert_eq!(ItemDefaults::resolve_price(Some("-1e40")), Decimal::ZERO);
    }

    #[test]
    fn test_price_from_json_values() {
        assert_eq!(
            ItemDefaults::resolve_price_value(&serde_json::json!(10)),
            Decimal::new(10, 0)
        );
        assert_eq!(
            ItemDefaults::resolve_price_value(&serde_json::json!(2.5)),
            Decimal::new(25, 1)
        );
        assert_eq!(
            ItemDefaults::resolve_price_value(&serde_json::json!("7.25")),
            Decimal::new(725, 2)
        );
        assert_eq!(
            ItemDefaults::resolve_price_value(&serde_json::json!(null)),
            Decimal::ZERO
        );
        assert_eq!(
            ItemDefaults::resolve_price_value(&serde_json::json!([1])),
            Decimal::ZERO
        );
    }

    #[test]
    fn test_image_chain_order() {
        let defaults = ItemDefaults::new("./images");

        assert_eq!(
            defaults.resolve_image("energy-rush", Some("https://cdn/x.png")),
            "https://cdn/x.png"
        );
        assert_eq!(
            defaults.resolve_image("energy-rush", None),
            "./images/energy-rush.png"
        );
        assert_eq!(
            defaults.resolve_image("energy-rush", Some("")),
            "./images/energy-rush.png"
        );
        assert_eq!(
            defaults.resolve_image("mango-mist", None),
            "./images/default-can.png"
        );
    }

    #[test]
    fn test_custom_product_image() {
        let defaults = ItemDefaults::new("/static/").with_product_image("mango-mist", "/m.png");
        assert_eq!(defaults.resolve_image("mango-mist", None), "/m.png");
        assert_eq!(defaults.placeholder_image(), "/static/default-can.png");
    }
}
