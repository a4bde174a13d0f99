//! The cart model.
//!
//! A cart is an ordered list of lines keyed by product id. Lines keep the
//! order in which products were first added. Two invariants hold for every
//! cart this module hands out, including carts loaded from storage:
//!
//! - product ids are unique;
//! - every stored quantity is at least 1.

use dispaso_core::{CurrencyCode, Price, ProductId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::PersistedDataError;
use crate::fallback::ItemDefaults;
use crate::store::KeyValueStore;

/// Raw add-to-cart input, as read from a product card.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddRequest {
    pub id: String,
    pub name: Option<String>,
    pub price: Option<String>,
    pub image: Option<String>,
}

impl AddRequest {
    /// Request for product `id` with no other details.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn price(mut self, price: impl Into<String>) -> Self {
        self.price = Some(price.into());
        self
    }

    #[must_use]
    pub fn image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }
}

/// One line of the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartItem {
    id: ProductId,
    name: String,
    #[serde(with = "rust_decimal::serde::float")]
    price: Decimal,
    quantity: u32,
    image: String,
}

impl CartItem {
    #[must_use]
    pub const fn id(&self) -> &ProductId {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Unit price.
    #[must_use]
    pub const fn price(&self) -> Decimal {
        self.price
    }

    #[must_use]
    pub const fn quantity(&self) -> u32 {
        self.quantity
    }

    #[must_use]
    pub fn image(&self) -> &str {
        &self.image
    }

    /// Unit price × quantity, saturating at [`Decimal::MAX`].
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price
            .checked_mul(Decimal::from(self.quantity))
            .unwrap_or(Decimal::MAX)
    }

    /// Unit price in `currency`.
    #[must_use]
    pub const fn unit_price(&self, currency: CurrencyCode) -> Price {
        Price::new(self.price, currency)
    }
}

/// Result of [`Cart::add`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    /// The request had no product id.
    Ignored,
    /// A new line was appended.
    Inserted { name: String },
    /// An existing line gained one unit; its name/price/image are unchanged.
    Incremented { name: String, quantity: u32 },
}

/// Result of [`Cart::change_quantity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityChange {
    /// No line with that id.
    Missing,
    /// The line now holds this quantity.
    Updated(u32),
    /// The quantity dropped to zero or below and the line was removed.
    Removed,
}

/// Ordered collection of cart lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Lines in first-added order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Look up the line for `id`.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&CartItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Add one unit of a product.
    ///
    /// An existing line only gains quantity. A new line gets its name, price
    /// and image from the request through the [`ItemDefaults`] chains.
    pub fn add(&mut self, request: &AddRequest, defaults: &ItemDefaults) -> AddOutcome {
        let Ok(id) = ProductId::parse(&request.id) else {
            return AddOutcome::Ignored;
        };

        if let Some(item) = self.items.iter_mut().find(|item| item.id == id) {
            item.quantity = item.quantity.saturating_add(1);
            return AddOutcome::Incremented {
                name: item.name.clone(),
                quantity: item.quantity,
            };
        }

        let item = CartItem {
            name: ItemDefaults::resolve_name(request.name.as_deref()),
            price: ItemDefaults::resolve_price(request.price.as_deref()),
            quantity: 1,
            image: defaults.resolve_image(id.as_str(), request.image.as_deref()),
            id,
        };
        let name = item.name.clone();
        self.items.push(item);
        AddOutcome::Inserted { name }
    }

    /// Remove every line for `id`. Returns whether anything was removed.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        self.items.len() != before
    }

    /// Apply `delta` to the quantity of `id`, removing the line at zero.
    pub fn change_quantity(&mut self, id: &str, delta: i64) -> QuantityChange {
        let Some(item) = self.items.iter_mut().find(|item| item.id == id) else {
            return QuantityChange::Missing;
        };

        let next = i64::from(item.quantity).saturating_add(delta);
        if next <= 0 {
            self.remove(id);
            return QuantityChange::Removed;
        }

        item.quantity = u32::try_from(next).unwrap_or(u32::MAX);
        QuantityChange::Updated(item.quantity)
    }

    /// Drop every line.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Sum of quantities.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// Sum of line totals, saturating at [`Decimal::MAX`].
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.items.iter().fold(Decimal::ZERO, |acc, item| {
            acc.checked_add(item.line_total()).unwrap_or(Decimal::MAX)
        })
    }

    /// Serialize as the persisted JSON array.
    ///
    /// # Errors
    ///
    /// Returns an error if a price cannot be represented as a JSON number.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse a persisted JSON array.
    ///
    /// Records are read leniently: a bad price becomes zero, a missing name
    /// becomes `"Item"` and a missing image is resolved again. Records with
    /// no id or a quantity below 1 are dropped, and only the first record for
    /// a repeated id is kept.
    ///
    /// # Errors
    ///
    /// Returns `PersistedDataError` if the text is not JSON or not an array.
    pub fn from_json(raw: &str, defaults: &ItemDefaults) -> Result<Self, PersistedDataError> {
        let Value::Array(records) = serde_json::from_str::<Value>(raw)? else {
            return Err(PersistedDataError::NotAnArray);
        };

        let mut cart = Self::new();
        for (index, record) in records.into_iter().enumerate() {
            let Some(item) = PersistedItem::from_value(record, defaults) else {
                debug!(index, "Dropping unusable persisted cart record");
                continue;
            };
            if cart.get(item.id.as_str()).is_some() {
                debug!(index, id = %item.id, "Dropping duplicate persisted cart record");
                continue;
            }
            cart.items.push(item);
        }
        Ok(cart)
    }

    /// Load the cart stored under `key`, falling back to an empty cart.
    ///
    /// Never fails: an unreadable store, a missing key and a malformed
    /// payload all yield an empty cart.
    pub fn load<S: KeyValueStore + ?Sized>(store: &S, key: &str, defaults: &ItemDefaults) -> Self {
        let Some(raw) = store.read(key) else {
            return Self::new();
        };
        match Self::from_json(&raw, defaults) {
            Ok(cart) => cart,
            Err(e) => {
                warn!(key, error = %e, "Discarding malformed persisted cart");
                Self::new()
            }
        }
    }

    /// Persist the cart under `key`. Failures are logged and ignored.
    pub fn save<S: KeyValueStore + ?Sized>(&self, store: &S, key: &str) -> bool {
        match self.to_json() {
            Ok(json) => store.write(key, &json),
            Err(e) => {
                warn!(key, error = %e, "Failed to serialize cart");
                false
            }
        }
    }
}

/// Loosely-typed persisted record.
#[derive(Debug, Default, Deserialize)]
struct PersistedItem {
    #[serde(default)]
    id: Value,
    #[serde(default)]
    name: Value,
    #[serde(default)]
    price: Value,
    #[serde(default)]
    quantity: Value,
    #[serde(default)]
    image: Value,
}

impl PersistedItem {
    fn from_value(value: Value, defaults: &ItemDefaults) -> Option<CartItem> {
        let record: Self = serde_json::from_value(value).ok()?;

        let id = match &record.id {
            Value::String(s) => ProductId::parse(s).ok()?,
            Value::Number(n) => ProductId::parse(&n.to_string()).ok()?,
            _ => return None,
        };

        let quantity = record
            .quantity
            .as_u64()
            .filter(|q| *q >= 1)
            .map(|q| u32::try_from(q).unwrap_or(u32::MAX))?;

        Some(CartItem {
            name: ItemDefaults::resolve_name(record.name.as_str()),
            price: ItemDefaults::resolve_price_value(&record.price),
            quantity,
            image: defaults.resolve_image(id.as_str(), record.image.as_str()),
            id,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, UnavailableStore};

    fn defaults() -> ItemDefaults {
        ItemDefaults::new("./images")
    }

    fn add(cart: &mut Cart, id: &str, price: &str) -> AddOutcome {
        cart.add(&AddRequest::new(id).name(id).price(price), &defaults())
    }

    #[test]
    fn test_add_same_id_twice_increments() {
        let mut cart = Cart::new();
        add(&mut cart, "energy-rush", "10");
        let outcome = add(&mut cart, "energy-rush", "10");

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.items()[0].quantity(), 2);
        assert!(matches!(outcome, AddOutcome::Incremented { quantity: 2, .. }));
    }

    #[test]
    fn test_add_existing_keeps_first_fields() {
        let mut cart = Cart::new();
        cart.add(
            &AddRequest::new("energy-rush").name("Energy Rush").price("10"),
            &defaults(),
        );
        cart.add(
            &AddRequest::new("energy-rush")
                .name("Renamed")
                .price("99")
                .image("/other.png"),
            &defaults(),
        );

        let item = cart.get("energy-rush").unwrap();
        assert_eq!(item.name(), "Energy Rush");
        assert_eq!(item.price(), Decimal::new(10, 0));
        assert_eq!(item.image(), "./images/energy-rush.png");
    }

    #[test]
    fn test_add_without_id_is_ignored() {
        let mut cart = Cart::new();
        let outcome = cart.add(&AddRequest::new("").name("Ghost"), &defaults());
        assert_eq!(outcome, AddOutcome::Ignored);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_add_normalizes_missing_fields() {
        let mut cart = Cart::new();
        cart.add(&AddRequest::new("mango-mist").price("n/a"), &defaults());

        let item = cart.get("mango-mist").unwrap();
        assert_eq!(item.name(), "Item");
        assert_eq!(item.price(), Decimal::ZERO);
        assert_eq!(item.quantity(), 1);
        assert_eq!(item.image(), "./images/default-can.png");
    }

    #[test]
    fn test_insertion_order_preserved() {
        let mut cart = Cart::new();
        add(&mut cart, "a", "1");
        add(&mut cart, "b", "1");
        add(&mut cart, "a", "1");
        cart.change_quantity("b", 3);

        let ids: Vec<&str> = cart.items().iter().map(|i| i.id().as_str()).collect();
        assert_eq!(ids, ["a", "b"]);
    }

    #[test]
    fn test_remove() {
        let mut cart = Cart::new();
        add(&mut cart, "a", "1");
        assert!(cart.remove("a"));
        assert!(!cart.remove("a"));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_change_quantity_to_zero_removes() {
        let mut cart = Cart::new();
        add(&mut cart, "a", "1");
        add(&mut cart, "a", "1");

        assert_eq!(cart.change_quantity("a", -2), QuantityChange::Removed);
        assert!(cart.get("a").is_none());
    }

    #[test]
    fn test_change_quantity_below_zero_removes_not_clamps() {
        let mut cart = Cart::new();
        add(&mut cart, "a", "1");
        assert_eq!(cart.change_quantity("a", -5), QuantityChange::Removed);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_change_quantity_missing_is_noop() {
        let mut cart = Cart::new();
        assert_eq!(cart.change_quantity("a", 1), QuantityChange::Missing);
    }

    #[test]
    fn test_change_quantity_updates() {
        let mut cart = Cart::new();
        add(&mut cart, "a", "1");
        assert_eq!(cart.change_quantity("a", 4), QuantityChange::Updated(5));
        assert_eq!(cart.change_quantity("a", -1), QuantityChange::Updated(4));
    }

    #[test]
    fn test_totals() {
        let mut cart = Cart::new();
        add(&mut cart, "a", "10");
        add(&mut cart, "a", "10");
        add(&mut cart, "b", "5");

        assert_eq!(cart.total(), Decimal::new(25, 0));
        assert_eq!(cart.item_count(), 3);
    }

    #[test]
    fn test_empty_totals() {
        let cart = Cart::new();
        assert_eq!(cart.total(), Decimal::ZERO);
        assert_eq!(cart.item_count(), 0);
    }

    #[test]
    fn test_decimal_total_is_exact() {
        let mut cart = Cart::new();
        add(&mut cart, "a", "0.1");
        add(&mut cart, "b", "0.2");
        assert_eq!(cart.total(), Decimal::new(3, 1));
    }

    #[test]
    fn test_to_json_layout() {
        let mut cart = Cart::new();
        cart.add(
            &AddRequest::new("energy-rush").name("Energy Rush").price("10.5"),
            &defaults(),
        );

        let value: Value = serde_json::from_str(&cart.to_json().unwrap()).unwrap();
        assert_eq!(
            value,
            serde_json::json!([{
                "id": "energy-rush",
                "name": "Energy Rush",
                "price": 10.5,
                "quantity": 1,
                "image": "./images/energy-rush.png"
            }])
        );
    }

    #[test]
    fn test_from_json_round_trip() {
        let mut cart = Cart::new();
        add(&mut cart, "a", "3.25");
        add(&mut cart, "b", "4");
        cart.change_quantity("b", 2);

        let restored = Cart::from_json(&cart.to_json().unwrap(), &defaults()).unwrap();
        assert_eq!(restored, cart);
    }

    #[test]
    fn test_from_json_rejects_non_array() {
        assert!(matches!(
            Cart::from_json("{\"id\":\"a\"}", &defaults()),
            Err(PersistedDataError::NotAnArray)
        ));
        assert!(matches!(
            Cart::from_json("not json", &defaults()),
            Err(PersistedDataError::Unparseable(_))
        ));
    }

    #[test]
    fn test_from_json_normalizes_records() {
        let raw = r#"[
            {"id": "a", "price": "oops", "quantity": 2},
            {"id": "", "name": "no id", "price": 1, "quantity": 1},
            {"id": "b", "name": "Zero", "price": 1, "quantity": 0},
            {"id": "a", "name": "dup", "price": 9, "quantity": 9},
            {"id": "c", "name": "C", "price": 1.5, "quantity": 1, "image": "/c.png"},
            "garbage",
            {"name": "no id at all", "quantity": 1}
        ]"#;

        let cart = Cart::from_json(raw, &defaults()).unwrap();
        assert_eq!(cart.len(), 2);

        let a = cart.get("a").unwrap();
        assert_eq!(a.name(), "Item");
        assert_eq!(a.price(), Decimal::ZERO);
        assert_eq!(a.quantity(), 2);
        assert_eq!(a.image(), "./images/default-can.png");

        let c = cart.get("c").unwrap();
        assert_eq!(c.price(), Decimal::new(15, 1));
        assert_eq!(c.image(), "/c.png");
    }

    #[test]
    fn test_load_missing_key_is_empty() {
        let store = MemoryStore::new();
        assert!(Cart::load(&store, "dispasoCart", &defaults()).is_empty());
    }

    #[test]
    fn test_load_corrupted_payload_is_empty() {
        let store = MemoryStore::with_entry("dispasoCart", "{not json");
        assert!(Cart::load(&store, "dispasoCart", &defaults()).is_empty());

        let store = MemoryStore::with_entry("dispasoCart", "42");
        assert!(Cart::load(&store, "dispasoCart", &defaults()).is_empty());
    }

    #[test]
    fn test_load_from_unavailable_store_is_empty() {
        assert!(Cart::load(&UnavailableStore, "dispasoCart", &defaults()).is_empty());
    }

    #[test]
    fn test_save_then_load() {
        let store = MemoryStore::new();
        let mut cart = Cart::new();
        add(&mut cart, "a", "2");

        assert!(cart.save(&store, "dispasoCart"));
        assert_eq!(Cart::load(&store, "dispasoCart", &defaults()), cart);
    }

    #[test]
    fn test_save_to_unavailable_store_is_ignored() {
        let mut cart = Cart::new();
        add(&mut cart, "a", "2");
        assert!(!cart.save(&UnavailableStore, "dispasoCart"));
    }
}
