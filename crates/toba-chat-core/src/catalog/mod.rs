//! Catalog store abstraction.
//!
//! The [`CatalogStore`] trait is the read contract the retriever needs from
//! the business catalog: lookups by primary key, by foreign key, by
//! case-insensitive name substring, and by active/category filter. The
//! catalog's write path lives outside this system.
//!
//! Implementations must be `Send + Sync` so a single instance can be shared
//! across concurrent requests.

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{Customer, Faq, Order, OrderDetail, OrderItem, OrderLine, Product, UNKNOWN_PRODUCT};

/// Read-only access to products, customers, orders and FAQ entries.
///
/// # Operations
///
/// | Method | Lookup |
/// |--------|--------|
/// | [`product_by_id`](CatalogStore::product_by_id) | product primary key |
/// | [`product_by_name`](CatalogStore::product_by_name) | first product (by id) whose name contains the text, ignoring ASCII case |
/// | [`customer_by_id`](CatalogStore::customer_by_id) | customer primary key |
/// | [`order_by_id`](CatalogStore::order_by_id) | order primary key |
/// | [`order_items`](CatalogStore::order_items) | lines of an order |
/// | [`orders_for_customer`](CatalogStore::orders_for_customer) | a customer's orders, by id |
/// | [`active_faqs`](CatalogStore::active_faqs) | active FAQ rows, optionally in one category |
/// | [`order_detail`](CatalogStore::order_detail) | order plus lines with product names |
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn product_by_id(&self, id: i64) -> Result<Option<Product>>;

    async fn product_by_name(&self, name: &str) -> Result<Option<Product>>;

    async fn customer_by_id(&self, id: i64) -> Result<Option<Customer>>;

    async fn order_by_id(&self, id: i64) -> Result<Option<Order>>;

    async fn order_items(&self, order_id: i64) -> Result<Vec<OrderItem>>;

    async fn orders_for_customer(&self, customer_id: i64) -> Result<Vec<Order>>;

    /// Active FAQ rows ordered by id. Inactive rows are never returned.
    async fn active_faqs(&self, category: Option<&str>) -> Result<Vec<Faq>>;

    /// Fetch an order with each line resolved to its product name.
    ///
    /// The default implementation composes the primitive lookups; backends
    /// that can answer in a single round trip should override it.
    async fn order_detail(&self, id: i64) -> Result<Option<OrderDetail>> {
        let order = match self.order_by_id(id).await? {
            Some(order) => order,
            None => return Ok(None),
        };

        let mut items = Vec::new();
        for item in self.order_items(id).await? {
            let product_name = self
                .product_by_id(item.product_id)
                .await?
                .map(|p| p.name)
                .unwrap_or_else(|| UNKNOWN_PRODUCT.to_string());
            items.push(OrderLine {
                product_name,
                quantity: item.quantity,
                unit_price: item.unit_price,
                subtotal: item.subtotal,
            });
        }

        Ok(Some(OrderDetail { order, items }))
    }
}
