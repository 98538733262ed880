//! The local cart and its persistent store.
//!
//! A [`Cart`] maps product ids to [`CartItem`]s. Keys are unique and every
//! stored quantity is at least one. [`CartStore`] loads and saves a cart
//! under a single key of a [`KeyValueStore`], persisting after each mutation.

mod schema;
mod summary;

use std::collections::BTreeMap;
use std::sync::Arc;

use meatshop_core::{Price, ProductId, ProductSnapshot};

use crate::error::add_breadcrumb;
use crate::storage::{KeyValueStore, StorageError};

pub use schema::{CART_SCHEMA_VERSION, CartDecodeError, decode_cart, encode_cart};
pub use summary::{CartLineView, CartView, item_count, total, unit_count};

/// One product in the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItem {
    product: ProductSnapshot,
    quantity: u32,
}

impl CartItem {
    /// Create an item. A quantity of zero is raised to one.
    #[must_use]
    pub fn new(product: ProductSnapshot, quantity: u32) -> Self {
        Self {
            product,
            quantity: quantity.max(1),
        }
    }

    /// The product snapshot taken when the item was added.
    #[must_use]
    pub const fn product(&self) -> &ProductSnapshot {
        &self.product
    }

    /// Units of the product, always at least one.
    #[must_use]
    pub const fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Price of a single unit.
    #[must_use]
    pub fn unit_price(&self) -> Price {
        self.product.unit_price()
    }

    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.unit_price().times(self.quantity)
    }
}

/// The shopping cart.
///
/// Iteration is in ascending product id order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    items: BTreeMap<ProductId, CartItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the cart has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of distinct products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Look up the item for a product.
    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&CartItem> {
        self.items.get(&id)
    }

    /// Whether the cart holds the product.
    #[must_use]
    pub fn contains(&self, id: ProductId) -> bool {
        self.items.contains_key(&id)
    }

    /// Items in ascending product id order.
    pub fn items(&self) -> impl Iterator<Item = &CartItem> {
        self.items.values()
    }

    /// Add `quantity` units of a product, merging with an existing entry.
    ///
    /// A quantity below one counts as one. A newer snapshot replaces the
    /// stored one so that name and price stay current.
    pub fn add(&mut self, product: ProductSnapshot, quantity: u32) {
        let quantity = quantity.max(1);
        match self.items.get_mut(&product.id) {
            Some(item) => {
                item.quantity = item.quantity.saturating_add(quantity);
                item.product = product;
            }
            None => {
                self.items
                    .insert(product.id, CartItem::new(product, quantity));
            }
        }
    }

    /// Raise the quantity by one. Returns `false` if the product is absent.
    pub fn increment(&mut self, id: ProductId) -> bool {
        self.items.get_mut(&id).is_some_and(|item| {
            item.quantity = item.quantity.saturating_add(1);
            true
        })
    }

    /// Lower the quantity by one, removing the item when it would reach zero.
    ///
    /// Returns `false` if the product is absent.
    pub fn decrement(&mut self, id: ProductId) -> bool {
        let Some(item) = self.items.get_mut(&id) else {
            return false;
        };
        if item.quantity <= 1 {
            self.items.remove(&id);
        } else {
            item.quantity -= 1;
        }
        true
    }

    /// Set the quantity directly, clamping to a minimum of one.
    ///
    /// Unlike [`Cart::decrement`] this never removes the item. Returns
    /// `false` if the product is absent.
    pub fn set_quantity(&mut self, id: ProductId, quantity: i64) -> bool {
        self.items.get_mut(&id).is_some_and(|item| {
            item.quantity = u32::try_from(quantity.max(1)).unwrap_or(u32::MAX);
            true
        })
    }

    /// Remove a product. Returns the removed item, if any.
    pub fn remove(&mut self, id: ProductId) -> Option<CartItem> {
        self.items.remove(&id)
    }

    /// Remove every item.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub(crate) fn insert(&mut self, item: CartItem) {
        self.items.insert(item.product.id, item);
    }
}

/// Parse a typed-in quantity.
///
/// Anything that is not a number, and any number below one, gives 1.
/// Fractions are truncated.
///
/// ```
/// use meatshop_storefront::cart::parse_quantity;
///
/// assert_eq!(parse_quantity("3"), 3);
/// assert_eq!(parse_quantity("0"), 1);
/// assert_eq!(parse_quantity("abc"), 1);
/// ```
#[must_use]
pub fn parse_quantity(input: &str) -> i64 {
    input
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .map(f64::trunc)
        .filter(|n| *n >= 1.0)
        .map_or(1, saturating_f64_to_i64)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)] // clamped to the i64 range first
fn saturating_f64_to_i64(n: f64) -> i64 {
    n.min(i64::MAX as f64) as i64
}

// =============================================================================
// CartStore
// =============================================================================

/// The cart persisted under one storage key.
///
/// Every mutating method reads the current cart, applies the change and
/// writes it back when something changed, returning the resulting cart.
/// There is no locking across the read-modify-write.
#[derive(Clone)]
pub struct CartStore {
    store: Arc<dyn KeyValueStore>,
    key: String,
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore").field("key", &self.key).finish()
    }
}

impl CartStore {
    /// Create a cart store over `store`, keeping the cart under `key`.
    pub fn new(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// The storage key the cart lives under.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Load the cart.
    ///
    /// Missing, unreadable, corrupt or unsupported data gives an empty cart.
    /// Problems are logged, never returned.
    #[must_use]
    pub fn get(&self) -> Cart {
        let raw = match self.store.read(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Cart::new(),
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "Failed to read cart, using empty cart");
                return Cart::new();
            }
        };

        decode_cart(&raw).unwrap_or_else(|e| {
            tracing::warn!(key = %self.key, error = %e, "Discarding unreadable cart data");
            Cart::new()
        })
    }

    /// Persist the full cart with a single write.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the cart cannot be encoded or written.
    pub fn save(&self, cart: &Cart) -> Result<(), StorageError> {
        let encoded = encode_cart(cart)?;
        self.store.write(&self.key, &encoded)
    }

    /// Add a product, or raise its quantity if already present.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the cart cannot be saved.
    pub fn add(&self, product: ProductSnapshot, quantity: u32) -> Result<Cart, StorageError> {
        let id = product.id.to_string();
        let name = product.name.clone();
        let mut cart = self.get();
        cart.add(product, quantity);
        self.save(&cart)?;
        add_breadcrumb(
            "cart",
            "Added to cart",
            Some(&[("product_id", id.as_str()), ("name", name.as_str())]),
        );
        Ok(cart)
    }

    /// Raise a product's quantity by one. No-op if absent.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the cart cannot be saved.
    pub fn increment(&self, id: ProductId) -> Result<Cart, StorageError> {
        self.mutate(id, "Increased quantity", |cart| cart.increment(id))
    }

    /// Lower a product's quantity by one, removing it below one. No-op if absent.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the cart cannot be saved.
    pub fn decrement(&self, id: ProductId) -> Result<Cart, StorageError> {
        self.mutate(id, "Decreased quantity", |cart| cart.decrement(id))
    }

    /// Set a product's quantity, clamped to at least one. No-op if absent.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the cart cannot be saved.
    pub fn set_quantity(&self, id: ProductId, quantity: i64) -> Result<Cart, StorageError> {
        self.mutate(id, "Set quantity", |cart| cart.set_quantity(id, quantity))
    }

    /// Remove a product. No-op if absent.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the cart cannot be saved.
    pub fn remove(&self, id: ProductId) -> Result<Cart, StorageError> {
        self.mutate(id, "Removed from cart", |cart| cart.remove(id).is_some())
    }

    /// Empty the cart and persist the empty cart.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the cart cannot be saved.
    pub fn clear(&self) -> Result<(), StorageError> {
        self.save(&Cart::new())?;
        add_breadcrumb("cart", "Cleared cart", None);
        Ok(())
    }

    fn mutate(
        &self,
        id: ProductId,
        action: &str,
        apply: impl FnOnce(&mut Cart) -> bool,
    ) -> Result<Cart, StorageError> {
        let mut cart = self.get();
        if apply(&mut cart) {
            self.save(&cart)?;
            add_breadcrumb(
                "cart",
                action,
                Some(&[("product_id", id.to_string().as_str())]),
            );
        } else {
            tracing::debug!(product_id = %id, action, "Product not in cart, nothing to do");
        }
        Ok(cart)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::storage::MemoryStore;

    fn snapshot(id: i64, price: i64) -> ProductSnapshot {
        ProductSnapshot::new(
            ProductId::new(id),
            format!("Product {id}"),
            Price::new(Decimal::from(price)),
        )
    }

    fn store() -> (Arc<MemoryStore>, CartStore) {
        let backend = Arc::new(MemoryStore::new());
        let store = CartStore::new(backend.clone(), "cart_v1");
        (backend, store)
    }

    #[test]
    fn test_add_merges_quantities() {
        let (_, store) = store();
        store.add(snapshot(1, 100), 1).unwrap();
        let cart = store.add(snapshot(1, 100), 2).unwrap();

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.get(ProductId::new(1)).unwrap().quantity(), 3);
        assert_eq!(store.get(), cart);
    }

    #[test]
    fn test_add_zero_counts_as_one() {
        let mut cart = Cart::new();
        cart.add(snapshot(1, 100), 0);
        assert_eq!(cart.get(ProductId::new(1)).unwrap().quantity(), 1);
    }

    #[test]
    fn test_decrement_removes_last_unit() {
        let (_, store) = store();
        store.add(snapshot(1, 100), 1).unwrap();

        let cart = store.decrement(ProductId::new(1)).unwrap();
        assert!(cart.is_empty());
        assert!(store.get().is_empty());
    }

    #[test]
    fn test_decrement_steps_down() {
        let mut cart = Cart::new();
        cart.add(snapshot(1, 100), 3);
        assert!(cart.decrement(ProductId::new(1)));
        assert_eq!(cart.get(ProductId::new(1)).unwrap().quantity(), 2);
    }

    #[test]
    fn test_set_quantity_clamps_instead_of_removing() {
        let (_, store) = store();
        store.add(snapshot(1, 100), 1).unwrap();

        let cart = store.set_quantity(ProductId::new(1), 0).unwrap();
        assert_eq!(cart.get(ProductId::new(1)).unwrap().quantity(), 1);

        let cart = store.set_quantity(ProductId::new(1), -5).unwrap();
        assert_eq!(cart.get(ProductId::new(1)).unwrap().quantity(), 1);

        let cart = store
            .set_quantity(ProductId::new(1), parse_quantity("7"))
            .unwrap();
        assert_eq!(cart.get(ProductId::new(1)).unwrap().quantity(), 7);
    }

    #[test]
    fn test_mutations_on_absent_product_do_not_write() {
        let (backend, store) = store();

        store.increment(ProductId::new(9)).unwrap();
        store.set_quantity(ProductId::new(9), 4).unwrap();
        store.remove(ProductId::new(9)).unwrap();

        assert_eq!(backend.read("cart_v1").unwrap(), None);
    }

    #[test]
    fn test_remove_and_clear() {
        let (_, store) = store();
        store.add(snapshot(1, 100), 1).unwrap();
        store.add(snapshot(2, 50), 1).unwrap();

        let cart = store.remove(ProductId::new(1)).unwrap();
        assert!(!cart.contains(ProductId::new(1)));
        assert!(cart.contains(ProductId::new(2)));

        store.clear().unwrap();
        assert!(store.get().is_empty());
    }

    #[test]
    fn test_get_fails_soft_on_corrupt_data() {
        let (backend, store) = store();
        backend.write("cart_v1", "{not json").unwrap();
        assert!(store.get().is_empty());

        backend.write("cart_v1", r#"{"version": 99, "items": {}}"#).unwrap();
        assert!(store.get().is_empty());
    }

    #[test]
    fn test_extreme_stored_price_totals_without_panicking() {
        let (backend, store) = store();
        backend
            .write(
                "cart_v1",
                r#"{"version":1,"items":{"1":{"product":{"id":1,"name":"A","price":"10000000000000000000000000000"},"qty":100}}}"#,
            )
            .unwrap();

        let cart = store.get();
        assert_eq!(cart.len(), 1);
        assert_eq!(total(&cart), Price::new(Decimal::MAX));
        assert_eq!(CartView::from(&cart).lines.len(), 1);
    }

    #[test]
    fn test_items_iterate_in_numeric_id_order() {
        let mut cart = Cart::new();
        cart.add(snapshot(10, 1), 1);
        cart.add(snapshot(2, 1), 1);
        cart.add(snapshot(33, 1), 1);

        let ids: Vec<i64> = cart.items().map(|item| item.product().id.as_i64()).collect();
        assert_eq!(ids, vec![2, 10, 33]);
    }

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity(" 4 "), 4);
        assert_eq!(parse_quantity("2.9"), 2);
        assert_eq!(parse_quantity("0.5"), 1);
        assert_eq!(parse_quantity("-3"), 1);
        assert_eq!(parse_quantity(""), 1);
        assert_eq!(parse_quantity("NaN"), 1);
        assert_eq!(parse_quantity("inf"), 1);
    }
}
