use anyhow::Result;
use sqlx::SqlitePool;

use crate::config::Config;
use crate::db;

/// Create the catalog and document index tables if they do not exist.
pub async fn run_migrations(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;
    migrate_pool(&pool).await?;
    pool.close().await;
    Ok(())
}

pub async fn migrate_pool(pool: &SqlitePool) -> Result<()> {
    // Catalog tables
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS produk (
            id INTEGER PRIMARY KEY,
            nama TEXT NOT NULL,
            deskripsi TEXT,
            kategori TEXT NOT NULL,
            harga REAL NOT NULL,
            stok INTEGER NOT NULL DEFAULT 0,
            gambar_url TEXT,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS pelanggan (
            id INTEGER PRIMARY KEY,
            nama TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            telepon TEXT,
            alamat TEXT,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS pesanan (
            id INTEGER PRIMARY KEY,
            pelanggan_id INTEGER NOT NULL,
            tanggal_pesanan TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            status TEXT NOT NULL DEFAULT 'pending',
            total_harga REAL NOT NULL DEFAULT 0.0,
            alamat_pengiriman TEXT,
            catatan TEXT,
            FOREIGN KEY (pelanggan_id) REFERENCES pelanggan(id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // produk_id is not a foreign key: order history outlives deleted products
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS pesanan_item (
            id INTEGER PRIMARY KEY,
            pesanan_id INTEGER NOT NULL,
            produk_id INTEGER NOT NULL,
            jumlah INTEGER NOT NULL DEFAULT 1,
            harga_satuan REAL NOT NULL,
            subtotal REAL NOT NULL,
            FOREIGN KEY (pesanan_id) REFERENCES pesanan(id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS faq (
            id INTEGER PRIMARY KEY,
            pertanyaan TEXT NOT NULL,
            jawaban TEXT NOT NULL,
            kategori TEXT,
            aktif INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Document index tables, filled by the external index build
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS doc_chunks (
            id INTEGER PRIMARY KEY,
            source_id TEXT,
            text TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS chunk_vectors (
            chunk_id INTEGER PRIMARY KEY,
            model TEXT NOT NULL DEFAULT '',
            dims INTEGER NOT NULL DEFAULT 0,
            embedding BLOB NOT NULL,
            FOREIGN KEY (chunk_id) REFERENCES doc_chunks(id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_pesanan_pelanggan_id ON pesanan(pelanggan_id)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_pesanan_item_pesanan_id ON pesanan_item(pesanan_id)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_faq_kategori ON faq(kategori)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_doc_chunks_source_id ON doc_chunks(source_id)")
        .execute(pool)
        .await?;

    Ok(())
}
