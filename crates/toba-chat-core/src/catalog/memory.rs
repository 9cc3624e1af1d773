//! In-memory [`CatalogStore`] for tests and demos.
//!
//! Rows live in `Vec`s behind `std::sync::RwLock`. Lookups scan linearly,
//! which is fine for the handful of rows a test fixture holds.

use std::sync::{PoisonError, RwLock};

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{Customer, Faq, Order, OrderItem, Product};

use super::CatalogStore;

/// In-memory catalog.
#[derive(Default)]
pub struct InMemoryCatalog {
    products: RwLock<Vec<Product>>,
    customers: RwLock<Vec<Customer>>,
    orders: RwLock<Vec<Order>>,
    order_items: RwLock<Vec<OrderItem>>,
    faqs: RwLock<Vec<Faq>>,
}

fn insert<T>(lock: &RwLock<Vec<T>>, row: T) {
    lock.write().unwrap_or_else(PoisonError::into_inner).push(row);
}

fn snapshot<T: Clone>(lock: &RwLock<Vec<T>>) -> Vec<T> {
    lock.read().unwrap_or_else(PoisonError::into_inner).clone()
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_product(&self, product: Product) {
        insert(&self.products, product);
    }

    pub fn insert_customer(&self, customer: Customer) {
        insert(&self.customers, customer);
    }

    pub fn insert_order(&self, order: Order) {
        insert(&self.orders, order);
    }

    pub fn insert_order_item(&self, item: OrderItem) {
        insert(&self.order_items, item);
    }

    pub fn insert_faq(&self, faq: Faq) {
        insert(&self.faqs, faq);
    }
}

/// Sort by id so results match the SQLite backend's `ORDER BY id`.
fn sorted_by<T, F: Fn(&T) -> i64>(mut rows: Vec<T>, key: F) -> Vec<T> {
    rows.sort_by_key(|r| key(r));
    rows
}

#[async_trait]
impl CatalogStore for InMemoryCatalog {
    async fn product_by_id(&self, id: i64) -> Result<Option<Product>> {
        Ok(snapshot(&self.products).into_iter().find(|p| p.id == id))
    }

    async fn product_by_name(&self, name: &str) -> Result<Option<Product>> {
        // ASCII folding only, matching SQLite's LOWER().
        let needle = name.to_ascii_lowercase();
        Ok(sorted_by(snapshot(&self.products), |p| p.id)
            .into_iter()
            .find(|p| p.name.to_ascii_lowercase().contains(&needle)))
    }

    async fn customer_by_id(&self, id: i64) -> Result<Option<Customer>> {
        Ok(snapshot(&self.customers).into_iter().find(|c| c.id == id))
    }

    async fn order_by_id(&self, id: i64) -> Result<Option<Order>> {
        Ok(snapshot(&self.orders).into_iter().find(|o| o.id == id))
    }

    async fn order_items(&self, order_id: i64) -> Result<Vec<OrderItem>> {
        Ok(snapshot(&self.order_items)
            .into_iter()
            .filter(|i| i.order_id == order_id)
            .collect())
    }

    async fn orders_for_customer(&self, customer_id: i64) -> Result<Vec<Order>> {
        Ok(sorted_by(snapshot(&self.orders), |o| o.id)
            .into_iter()
            .filter(|o| o.customer_id == customer_id)
            .collect())
    }

    async fn active_faqs(&self, category: Option<&str>) -> Result<Vec<Faq>> {
        Ok(sorted_by(snapshot(&self.faqs), |f| f.id)
            .into_iter()
            .filter(|f| f.active)
            .filter(|f| match category {
                Some(cat) => f.category.as_deref() == Some(cat),
                None => true,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn product(id: i64, name: &str, stock: i64) -> Product {
        Product {
            id,
            name: name.to_string(),
            description: None,
            category: "Tenun".to_string(),
            price: 100000.0,
            stock,
        }
    }

    fn faq(id: i64, category: &str, active: bool) -> Faq {
        Faq {
            id,
            question: format!("Pertanyaan {}", id),
            answer: format!("Jawaban {}", id),
            category: Some(category.to_string()),
            active,
        }
    }

    #[tokio::test]
    async fn product_by_name_is_case_insensitive_first_by_id() {
        let catalog = InMemoryCatalog::new();
        catalog.insert_product(product(5, "Kain Tenun Sadum", 3));
        catalog.insert_product(product(2, "Kain Tenun Toba", 42));

        let found = catalog.product_by_name("KAIN TENUN").await.unwrap().unwrap();
        assert_eq!(found.id, 2);
        assert!(catalog.product_by_name("gorga").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn product_by_name_folds_ascii_case_only() {
        let catalog = InMemoryCatalog::new();
        catalog.insert_product(product(1, "Ulos Édisi Khusus", 2));

        assert!(catalog.product_by_name("ULOS ÉDISI").await.unwrap().is_some());
        assert!(catalog.product_by_name("ulos Édisi").await.unwrap().is_some());
        assert!(catalog.product_by_name("ulos édisi").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn active_faqs_skip_inactive_and_filter_category() {
        let catalog = InMemoryCatalog::new();
        catalog.insert_faq(faq(3, "pengiriman", true));
        catalog.insert_faq(faq(1, "pengiriman", false));
        catalog.insert_faq(faq(2, "pembayaran", true));

        let all: Vec<i64> = catalog
            .active_faqs(None)
            .await
            .unwrap()
            .iter()
            .map(|f| f.id)
            .collect();
        assert_eq!(all, vec![2, 3]);

        let shipping = catalog.active_faqs(Some("pengiriman")).await.unwrap();
        assert_eq!(shipping.len(), 1);
        assert_eq!(shipping[0].id, 3);
    }

    #[tokio::test]
    async fn order_detail_resolves_names_and_unknowns() {
        let catalog = InMemoryCatalog::new();
        catalog.insert_product(product(1, "Ulos Ragi Hotang", 4));
        catalog.insert_order(Order {
            id: 10,
            customer_id: 1,
            ordered_at: NaiveDate::from_ymd_opt(2024, 5, 1)
                .unwrap()
                .and_hms_opt(9, 30, 0)
                .unwrap(),
            status: "diproses".to_string(),
            total: 300000.0,
        });
        for product_id in [1, 99] {
            catalog.insert_order_item(OrderItem {
                order_id: 10,
                product_id,
                quantity: 1,
                unit_price: 150000.0,
                subtotal: 150000.0,
            });
        }

        let detail = catalog.order_detail(10).await.unwrap().unwrap();
        let names: Vec<&str> = detail.items.iter().map(|l| l.product_name.as_str()).collect();
        assert_eq!(names, vec!["Ulos Ragi Hotang", "Unknown"]);
        assert!(catalog.order_detail(9999).await.unwrap().is_none());
    }
}
