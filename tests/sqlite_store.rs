mod common;

use std::sync::Arc;
use tempfile::TempDir;

use toba_chat::catalog::SqliteCatalog;
use toba_chat::migrate;
use toba_chat::vector_index::SqliteVectorIndex;
use toba_chat_core::catalog::memory::InMemoryCatalog;
use toba_chat_core::catalog::CatalogStore;
use toba_chat_core::index::VectorIndex;
use toba_chat_core::models::UNKNOWN_PRODUCT;

use common::{insert_chunk, seeded_pool, TopicEmbedder};

#[tokio::test]
async fn test_migrations_are_idempotent() {
    let tmp = TempDir::new().unwrap();
    let (config, pool) = seeded_pool(tmp.path()).await;
    migrate::migrate_pool(&pool).await.unwrap();
    pool.close().await;
    migrate::run_migrations(&config).await.unwrap();
    assert!(config.db.path.exists());
}

#[tokio::test]
async fn test_product_lookups() {
    let tmp = TempDir::new().unwrap();
    let (_config, pool) = seeded_pool(tmp.path()).await;
    let catalog = SqliteCatalog::new(pool);

    let product = catalog.product_by_id(2).await.unwrap().unwrap();
    assert_eq!(product.name, "Ulos Ragi Hotang");
    assert_eq!(product.description, None);
    assert_eq!(product.stock, 7);
    assert!(catalog.product_by_id(77).await.unwrap().is_none());

    let product = catalog.product_by_name("KAIN tenun").await.unwrap().unwrap();
    assert_eq!(product.id, 1);
    assert_eq!(product.price, 350000.0);

    // Both 'Kain Tenun Toba' and 'Tas Anyaman Pandan' contain "a"; lowest id wins.
    let product = catalog.product_by_name("a").await.unwrap().unwrap();
    assert_eq!(product.id, 1);

    assert!(catalog.product_by_name("songket").await.unwrap().is_none());
}

#[tokio::test]
async fn test_product_name_folds_ascii_case_like_memory_catalog() {
    let tmp = TempDir::new().unwrap();
    let (_config, pool) = seeded_pool(tmp.path()).await;
    sqlx::query(
        "INSERT INTO produk (id, nama, kategori, harga, stok) \
         VALUES (4, 'Ulos Édisi Khusus', 'Ulos', 900000, 2)",
    )
    .execute(&pool)
    .await
    .unwrap();

    let sqlite = SqliteCatalog::new(pool);
    let memory = InMemoryCatalog::new();
    memory.insert_product(sqlite.product_by_id(4).await.unwrap().unwrap());

    for (query, found) in [("ULOS ÉDISI", true), ("ulos Édisi", true), ("ulos édisi", false)] {
        let a = sqlite.product_by_name(query).await.unwrap().map(|p| p.id);
        let b = memory.product_by_name(query).await.unwrap().map(|p| p.id);
        assert_eq!(a, b, "backends disagree on {:?}", query);
        assert_eq!(a.is_some(), found, "{:?}", query);
    }
}

#[tokio::test]
async fn test_order_detail_resolves_product_names() {
    let tmp = TempDir::new().unwrap();
    let (_config, pool) = seeded_pool(tmp.path()).await;
    let catalog = SqliteCatalog::new(pool);

    let detail = catalog.order_detail(100).await.unwrap().unwrap();
    assert_eq!(detail.order.status, "dikirim");
    assert_eq!(detail.order.ordered_at.to_string(), "2024-06-02 14:00:00");
    assert_eq!(detail.items.len(), 1);
    assert_eq!(detail.items[0].product_name, "Kain Tenun Toba");
    assert_eq!(detail.items[0].quantity, 3);

    let detail = catalog.order_detail(101).await.unwrap().unwrap();
    assert_eq!(detail.items[0].product_name, UNKNOWN_PRODUCT);

    assert!(catalog.order_detail(9999).await.unwrap().is_none());
}

#[tokio::test]
async fn test_customer_orders() {
    let tmp = TempDir::new().unwrap();
    let (_config, pool) = seeded_pool(tmp.path()).await;
    let catalog = SqliteCatalog::new(pool);

    let customer = catalog.customer_by_id(5).await.unwrap().unwrap();
    assert_eq!(customer.email, "rina@example.com");
    assert!(catalog.customer_by_id(6).await.unwrap().is_none());

    let ids: Vec<i64> = catalog
        .orders_for_customer(5)
        .await
        .unwrap()
        .iter()
        .map(|o| o.id)
        .collect();
    assert_eq!(ids, vec![100, 101]);

    let items = catalog.order_items(101).await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].product_id, 99);
}

#[tokio::test]
async fn test_inactive_faqs_are_never_returned() {
    let tmp = TempDir::new().unwrap();
    let (_config, pool) = seeded_pool(tmp.path()).await;
    let catalog = SqliteCatalog::new(pool);

    let ids: Vec<i64> = catalog
        .active_faqs(None)
        .await
        .unwrap()
        .iter()
        .map(|f| f.id)
        .collect();
    assert_eq!(ids, vec![1, 3]);

    assert!(catalog.active_faqs(Some("retur")).await.unwrap().is_empty());

    let faqs = catalog.active_faqs(Some("pembayaran")).await.unwrap();
    assert_eq!(faqs.len(), 1);
    assert!(faqs[0].active);
}

#[tokio::test]
async fn test_vector_index_ranks_by_cosine() {
    let tmp = TempDir::new().unwrap();
    let (_config, pool) = seeded_pool(tmp.path()).await;

    insert_chunk(&pool, 1, Some("katalog.md"), "Jam buka toko 08.00-17.00.", &[0.0, 0.0, 1.0]).await;
    insert_chunk(&pool, 2, Some("faq:1"), "Pengiriman ke Jakarta 3-5 hari.", &[0.0, 1.0, 0.0]).await;
    insert_chunk(&pool, 3, None, "Kain tenun Toba ditenun dengan tangan.", &[1.0, 0.0, 0.0]).await;
    insert_chunk(&pool, 4, None, "Tenun ikat memakai pewarna alami.", &[1.0, 0.0, 0.0]).await;

    let index = SqliteVectorIndex::new(pool, Arc::new(TopicEmbedder));
    assert_eq!(index.vector_count().await.unwrap(), 4);

    let hits = index.similarity_search("motif tenun", 2).await.unwrap();
    let texts: Vec<&str> = hits.iter().map(|c| c.text.as_str()).collect();
    // Equal scores keep ascending chunk id.
    assert_eq!(
        texts,
        vec![
            "Kain tenun Toba ditenun dengan tangan.",
            "Tenun ikat memakai pewarna alami."
        ]
    );

    let hits = index.similarity_search("pengiriman", 1).await.unwrap();
    assert_eq!(hits[0].source_id.as_deref(), Some("faq:1"));
    assert_eq!(hits[0].faq_id(), Some(1));

    assert!(index.similarity_search("apa saja", 0).await.unwrap().is_empty());
}
