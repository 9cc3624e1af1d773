//! SQLite-backed [`CatalogStore`].
//!
//! Reads the `produk`, `pelanggan`, `pesanan`, `pesanan_item` and `faq`
//! tables created by [`migrate`](crate::migrate). The catalog's write path is
//! owned by the shop backend; this store only reads.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use toba_chat_core::catalog::CatalogStore;
use toba_chat_core::models::{
    Customer, Faq, Order, OrderDetail, OrderItem, OrderLine, Product, UNKNOWN_PRODUCT,
};

const PRODUCT_COLUMNS: &str = "id, nama, deskripsi, kategori, harga, stok";
const ORDER_COLUMNS: &str = "id, pelanggan_id, tanggal_pesanan, status, total_harga";

#[derive(Clone)]
pub struct SqliteCatalog {
    pool: SqlitePool,
}

impl SqliteCatalog {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn product_from_row(row: &SqliteRow) -> Result<Product> {
    Ok(Product {
        id: row.try_get("id")?,
        name: row.try_get("nama")?,
        description: row.try_get("deskripsi")?,
        category: row.try_get("kategori")?,
        price: row.try_get("harga")?,
        stock: row.try_get("stok")?,
    })
}

fn order_from_row(row: &SqliteRow) -> Result<Order> {
    Ok(Order {
        id: row.try_get("id")?,
        customer_id: row.try_get("pelanggan_id")?,
        ordered_at: row.try_get("tanggal_pesanan")?,
        status: row.try_get("status")?,
        total: row.try_get("total_harga")?,
    })
}

fn faq_from_row(row: &SqliteRow) -> Result<Faq> {
    Ok(Faq {
        id: row.try_get("id")?,
        question: row.try_get("pertanyaan")?,
        answer: row.try_get("jawaban")?,
        category: row.try_get("kategori")?,
        active: row.try_get("aktif")?,
    })
}

#[async_trait]
impl CatalogStore for SqliteCatalog {
    async fn product_by_id(&self, id: i64) -> Result<Option<Product>> {
        let row = sqlx::query(&format!("SELECT {} FROM produk WHERE id = ?", PRODUCT_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("product lookup by id")?;
        row.as_ref().map(product_from_row).transpose()
    }

    async fn product_by_name(&self, name: &str) -> Result<Option<Product>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM produk WHERE instr(LOWER(nama), LOWER(?)) > 0 ORDER BY id LIMIT 1",
            PRODUCT_COLUMNS
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .context("product lookup by name")?;
        row.as_ref().map(product_from_row).transpose()
    }

    async fn customer_by_id(&self, id: i64) -> Result<Option<Customer>> {
        let row = sqlx::query(
            "SELECT id, nama, email, telepon, alamat FROM pelanggan WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("customer lookup")?;

        match row {
            Some(row) => Ok(Some(Customer {
                id: row.try_get("id")?,
                name: row.try_get("nama")?,
                email: row.try_get("email")?,
                phone: row.try_get("telepon")?,
                address: row.try_get("alamat")?,
            })),
            None => Ok(None),
        }
    }

    async fn order_by_id(&self, id: i64) -> Result<Option<Order>> {
        let row = sqlx::query(&format!("SELECT {} FROM pesanan WHERE id = ?", ORDER_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("order lookup")?;
        row.as_ref().map(order_from_row).transpose()
    }

    async fn order_items(&self, order_id: i64) -> Result<Vec<OrderItem>> {
        let rows = sqlx::query(
            "SELECT pesanan_id, produk_id, jumlah, harga_satuan, subtotal \
             FROM pesanan_item WHERE pesanan_id = ? ORDER BY id",
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await
        .context("order item lookup")?;

        rows.iter()
            .map(|row| -> Result<OrderItem> {
                Ok(OrderItem {
                    order_id: row.try_get("pesanan_id")?,
                    product_id: row.try_get("produk_id")?,
                    quantity: row.try_get("jumlah")?,
                    unit_price: row.try_get("harga_satuan")?,
                    subtotal: row.try_get("subtotal")?,
                })
            })
            .collect()
    }

    async fn orders_for_customer(&self, customer_id: i64) -> Result<Vec<Order>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM pesanan WHERE pelanggan_id = ? ORDER BY id",
            ORDER_COLUMNS
        ))
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await
        .context("customer order lookup")?;
        rows.iter().map(order_from_row).collect()
    }

    async fn active_faqs(&self, category: Option<&str>) -> Result<Vec<Faq>> {
        let rows = match category {
            Some(category) => {
                sqlx::query(
                    "SELECT id, pertanyaan, jawaban, kategori, aktif FROM faq \
                     WHERE aktif = 1 AND kategori = ? ORDER BY id",
                )
                .bind(category)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query(
                    "SELECT id, pertanyaan, jawaban, kategori, aktif FROM faq \
                     WHERE aktif = 1 ORDER BY id",
                )
                .fetch_all(&self.pool)
                .await
            }
        }
        .context("faq lookup")?;
        rows.iter().map(faq_from_row).collect()
    }

    /// Single connection: the order row and its lines joined to product names.
    async fn order_detail(&self, id: i64) -> Result<Option<OrderDetail>> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .context("acquire connection for order detail")?;

        let row = sqlx::query(&format!("SELECT {} FROM pesanan WHERE id = ?", ORDER_COLUMNS))
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
            .context("order lookup")?;
        let order = match row {
            Some(row) => order_from_row(&row)?,
            None => return Ok(None),
        };

        let rows = sqlx::query(
            "SELECT p.nama AS produk_nama, i.jumlah, i.harga_satuan, i.subtotal \
             FROM pesanan_item i LEFT JOIN produk p ON p.id = i.produk_id \
             WHERE i.pesanan_id = ? ORDER BY i.id",
        )
        .bind(id)
        .fetch_all(&mut *conn)
        .await
        .context("order line lookup")?;

        let items = rows
            .iter()
            .map(|row| -> Result<OrderLine> {
                let name: Option<String> = row.try_get("produk_nama")?;
                Ok(OrderLine {
                    product_name: name.unwrap_or_else(|| UNKNOWN_PRODUCT.to_string()),
                    quantity: row.try_get("jumlah")?,
                    unit_price: row.try_get("harga_satuan")?,
                    subtotal: row.try_get("subtotal")?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Some(OrderDetail { order, items }))
    }
}
