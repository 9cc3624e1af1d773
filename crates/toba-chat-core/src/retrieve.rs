//! Context retrieval: intent → catalog and index lookups → context string.
//!
//! # Source selection
//!
//! | Intent | Lookup | Fragment |
//! |--------|--------|----------|
//! | `product_info` | product by id, else by name | `Informasi Produk` |
//! | `stock_check` | same | `Informasi Stok` sentence |
//! | `order_status` | order by id with resolved lines | `Informasi Pesanan` |
//! | `customer_orders` | orders of a customer | `Daftar Pesanan Pelanggan` |
//! | `faq` | active FAQ rows, relevance-filtered | `Informasi FAQ yang relevan` |
//! | `general` | none | none |
//!
//! Every intent then gets document fragments from a similarity search on
//! the original query.
//!
//! Retrieval never fails: store and index errors are logged and treated as
//! empty results, and a miss simply omits the fragment.

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::Result;

use crate::catalog::CatalogStore;
use crate::context::{assemble, ContextFragment};
use crate::index::VectorIndex;
use crate::intent::{Intent, IntentKind};
use crate::models::{CustomerOrderSummary, DocumentChunk, Faq, Product};

/// Retrieval tuning parameters, decoupled from application config.
#[derive(Debug, Clone)]
pub struct RetrievalParams {
    /// Document chunks appended to every context.
    pub document_k: usize,
    /// Index hits considered when filtering FAQ rows by relevance.
    pub faq_candidate_k: usize,
    /// FAQ rows used when relevance filtering keeps nothing.
    pub faq_fallback_limit: usize,
}

impl Default for RetrievalParams {
    fn default() -> Self {
        Self {
            document_k: 3,
            faq_candidate_k: 5,
            faq_fallback_limit: 5,
        }
    }
}

/// Log a failed lookup and substitute an empty result.
fn absorb<T: Default>(what: &str, result: Result<T>) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            tracing::error!(lookup = what, error = %format!("{:#}", e), "lookup failed; treating as empty");
            T::default()
        }
    }
}

pub struct ContextRetriever {
    catalog: Arc<dyn CatalogStore>,
    index: Option<Arc<dyn VectorIndex>>,
    params: RetrievalParams,
}

impl ContextRetriever {
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        index: Option<Arc<dyn VectorIndex>>,
        params: RetrievalParams,
    ) -> Self {
        Self {
            catalog,
            index,
            params,
        }
    }

    pub fn params(&self) -> &RetrievalParams {
        &self.params
    }

    pub fn has_index(&self) -> bool {
        self.index.is_some()
    }

    /// Assemble the full context string for `intent`.
    pub async fn retrieve_context(&self, intent: &Intent) -> String {
        assemble(&self.fragments(intent).await)
    }

    /// Intent-specific fragments followed by document fragments.
    pub async fn fragments(&self, intent: &Intent) -> Vec<ContextFragment> {
        let mut fragments = Vec::new();

        match intent.kind {
            IntentKind::ProductInfo => {
                if let Some(product) = self.find_product(intent).await {
                    fragments.extend(ContextFragment::product(&product));
                }
            }
            IntentKind::StockCheck => {
                if let Some(product) = self.find_product(intent).await {
                    fragments.push(ContextFragment::stock(&product));
                }
            }
            IntentKind::OrderStatus => {
                if let Some(id) = intent.order_id() {
                    match absorb("order", self.catalog.order_detail(id).await) {
                        Some(detail) => fragments.extend(ContextFragment::order(&detail)),
                        None => tracing::debug!(order_id = id, "order not found"),
                    }
                }
            }
            IntentKind::CustomerOrders => {
                if let Some(id) = intent.customer_id() {
                    let orders = self.customer_orders(id).await;
                    if !orders.is_empty() {
                        fragments.extend(ContextFragment::customer_orders(&orders));
                    }
                }
            }
            IntentKind::Faq => {
                let query = Some(intent.query.as_str()).filter(|q| !q.trim().is_empty());
                let faqs = self.retrieve_faqs(query, intent.category()).await;
                if !faqs.is_empty() {
                    fragments.push(ContextFragment::faqs(&faqs));
                }
            }
            IntentKind::General => {}
        }

        let chunks = self
            .retrieve_documents(&intent.query, self.params.document_k)
            .await;
        fragments.extend(ContextFragment::documents(&chunks));

        tracing::debug!(
            intent = %intent.kind,
            fragments = fragments.len(),
            "context assembled"
        );
        fragments
    }

    /// Product by id when one is given and exists, otherwise by name.
    async fn find_product(&self, intent: &Intent) -> Option<Product> {
        if let Some(id) = intent.product_id() {
            if let Some(product) = absorb("product by id", self.catalog.product_by_id(id).await) {
                return Some(product);
            }
            tracing::debug!(product_id = id, "product id not found");
        }
        if let Some(name) = intent.product_name() {
            let found = absorb("product by name", self.catalog.product_by_name(name).await);
            if found.is_none() {
                tracing::debug!(product_name = name, "product name not found");
            }
            return found;
        }
        None
    }

    async fn customer_orders(&self, customer_id: i64) -> Vec<CustomerOrderSummary> {
        if absorb("customer", self.catalog.customer_by_id(customer_id).await).is_none() {
            tracing::debug!(customer_id, "customer not found");
            return Vec::new();
        }
        absorb(
            "customer orders",
            self.catalog.orders_for_customer(customer_id).await,
        )
        .iter()
        .map(CustomerOrderSummary::from)
        .collect()
    }

    /// Top-`k` document chunks for `query`; empty when there is no index,
    /// the query is blank, or the search fails.
    pub async fn retrieve_documents(&self, query: &str, k: usize) -> Vec<DocumentChunk> {
        if query.trim().is_empty() || k == 0 {
            return Vec::new();
        }
        let Some(index) = &self.index else {
            tracing::debug!("no vector index configured; skipping document retrieval");
            return Vec::new();
        };
        let chunks = absorb("documents", index.similarity_search(query, k).await);
        tracing::info!(count = chunks.len(), "retrieved document chunks");
        chunks
    }

    /// Active FAQ rows, optionally restricted to `category` and filtered by
    /// relevance to `query`.
    ///
    /// With an index, rows are kept when an index hit carries their
    /// `faq:<id>` source id. Without one (or when the search fails), rows
    /// are kept when their text contains the query. If filtering keeps
    /// nothing, the first `faq_fallback_limit` rows are returned.
    pub async fn retrieve_faqs(&self, query: Option<&str>, category: Option<&str>) -> Vec<Faq> {
        let faqs = absorb("faqs", self.catalog.active_faqs(category).await);
        let query = match query {
            Some(q) if !faqs.is_empty() => q,
            _ => return faqs,
        };

        let relevant = match self.faq_hits(query, faqs.len()).await {
            Some(ids) => faqs
                .iter()
                .filter(|f| ids.contains(&f.id))
                .cloned()
                .collect::<Vec<_>>(),
            None => {
                let needle = query.to_lowercase();
                faqs.iter()
                    .filter(|f| f.searchable_text().to_lowercase().contains(&needle))
                    .cloned()
                    .collect()
            }
        };

        if relevant.is_empty() {
            faqs.into_iter()
                .take(self.params.faq_fallback_limit)
                .collect()
        } else {
            relevant
        }
    }

    /// FAQ ids referenced by index hits, or `None` when the index is
    /// unavailable.
    async fn faq_hits(&self, query: &str, rows: usize) -> Option<HashSet<i64>> {
        let index = self.index.as_ref()?;
        let k = self.params.faq_candidate_k.min(rows);
        match index.similarity_search(query, k).await {
            Ok(hits) => Some(hits.iter().filter_map(DocumentChunk::faq_id).collect()),
            Err(e) => {
                tracing::error!(error = %format!("{:#}", e), "faq relevance search failed; using keyword match");
                None
            }
        }
    }
}
