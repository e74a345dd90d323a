//! # Catalog Service
//!
//! Product data for the shop and admin views, served from an in-memory
//! list with simulated network latency.
//!
//! ## Browse Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     browse(ProductQuery)                                │
//! │                                                                         │
//! │  all products (catalog order)                                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  search ──── case-insensitive substring of name / description /        │
//! │       │      category (empty query keeps everything)                   │
//! │       ▼                                                                 │
//! │  category ── exact match                                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  price ───── min <= price <= max, either bound optional                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  sort ────── name │ price low→high │ price high→low │ newest           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust,ignore
//! let catalog = backend.catalog();
//! let tees = catalog.fetch_by_category("Clothing").await?;
//! let widget = catalog.fetch_by_id(&ProductId::from(1)).await?;
//! ```

use std::str::FromStr;
use std::sync::Arc;

use chrono::Utc;
use quickcommerce_core::validation::validate_search_query;
use quickcommerce_core::{
    Money, Product, ProductDraft, ProductId, ProductPatch, ValidationError,
    LOW_STOCK_REPORT_THRESHOLD,
};
use serde::{Deserialize, Serialize};
use tokio::sync::{RwLock, RwLockWriteGuard};
use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};
use crate::latency::{Operation, SimulatedLatency};
use crate::snapshot::SnapshotSlot;

// =============================================================================
// Browse Query
// =============================================================================

/// Sort order of the product grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortOrder {
    #[default]
    Name,
    PriceLow,
    PriceHigh,
    Newest,
}

impl FromStr for SortOrder {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "name" => Ok(SortOrder::Name),
            "price-low" => Ok(SortOrder::PriceLow),
            "price-high" => Ok(SortOrder::PriceHigh),
            "newest" => Ok(SortOrder::Newest),
            _ => Err(ValidationError::NotAllowed {
                field: "sort".to_string(),
                allowed: ["name", "price-low", "price-high", "newest"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            }),
        }
    }
}

/// Filters and ordering for [`CatalogService::browse`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub min_price: Option<Money>,
    pub max_price: Option<Money>,
    pub sort: SortOrder,
}

impl ProductQuery {
    fn matches(&self, product: &Product, needle: &str) -> bool {
        if !needle.is_empty() && !matches_search(product, needle) {
            return false;
        }
        if let Some(category) = self.category.as_deref().filter(|c| !c.is_empty()) {
            if product.category != category {
                return false;
            }
        }
        if self.min_price.is_some_and(|min| product.price < min) {
            return false;
        }
        if self.max_price.is_some_and(|max| product.price > max) {
            return false;
        }
        true
    }
}

/// `needle` must already be lowercase.
fn matches_search(product: &Product, needle: &str) -> bool {
    product.name.to_lowercase().contains(needle)
        || product.description.to_lowercase().contains(needle)
        || product.category.to_lowercase().contains(needle)
}

fn sort_products(products: &mut [Product], order: SortOrder) {
    match order {
        SortOrder::Name => products.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then_with(|| a.name.cmp(&b.name))
        }),
        SortOrder::PriceLow => products.sort_by_key(|p| p.price),
        SortOrder::PriceHigh => products.sort_by(|a, b| b.price.cmp(&a.price)),
        // Products without a timestamp sink to the end
        SortOrder::Newest => products.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
    }
}

// =============================================================================
// Catalog Service
// =============================================================================

/// Shared handle to the product list. Clones see the same data.
#[derive(Debug, Clone)]
pub struct CatalogService {
    products: Arc<RwLock<Vec<Product>>>,
    latency: SimulatedLatency,
    snapshot: Option<SnapshotSlot>,
}

impl CatalogService {
    /// A catalog over `products`, kept in memory only.
    pub fn new(products: Vec<Product>, latency: SimulatedLatency) -> Self {
        CatalogService {
            products: Arc::new(RwLock::new(products)),
            latency,
            snapshot: None,
        }
    }

    /// A catalog that starts from the snapshot in `slot` (or `seed` when
    /// there is none) and writes every change back to it.
    pub fn with_snapshot(seed: Vec<Product>, latency: SimulatedLatency, slot: SnapshotSlot) -> Self {
        let products = slot.load().unwrap_or(seed);
        CatalogService {
            products: Arc::new(RwLock::new(products)),
            latency,
            snapshot: Some(slot),
        }
    }

    // -------------------------------------------------------------------------
    // Shop queries
    // -------------------------------------------------------------------------

    /// All products, in catalog order.
    pub async fn fetch_all(&self) -> StoreResult<Vec<Product>> {
        self.latency.wait(Operation::FetchAll).await;
        Ok(self.products.read().await.clone())
    }

    /// One product.
    ///
    /// ## Errors
    /// [`StoreError::NotFound`] when no product has this id.
    pub async fn fetch_by_id(&self, id: &ProductId) -> StoreResult<Product> {
        self.latency.wait(Operation::FetchById).await;
        debug!(product_id = %id, "Fetching product");

        self.products
            .read()
            .await
            .iter()
            .find(|p| p.id == *id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("Product", id))
    }

    pub async fn fetch_by_category(&self, category: &str) -> StoreResult<Vec<Product>> {
        self.latency.wait(Operation::FetchByCategory).await;
        Ok(self
            .products
            .read()
            .await
            .iter()
            .filter(|p| p.category == category)
            .cloned()
            .collect())
    }

    /// Case-insensitive substring search over name, description and
    /// category. An empty query matches everything.
    pub async fn search(&self, query: &str) -> StoreResult<Vec<Product>> {
        self.latency.wait(Operation::Search).await;
        let needle = validate_search_query(query)?.to_lowercase();
        debug!(query = %needle, "Searching products");

        Ok(self
            .products
            .read()
            .await
            .iter()
            .filter(|p| matches_search(p, &needle))
            .cloned()
            .collect())
    }

    /// Distinct categories, sorted.
    pub async fn list_categories(&self) -> StoreResult<Vec<String>> {
        self.latency.wait(Operation::ListCategories).await;
        let mut categories: Vec<String> = self
            .products
            .read()
            .await
            .iter()
            .map(|p| p.category.clone())
            .collect();
        categories.sort();
        categories.dedup();
        Ok(categories)
    }

    /// Filtered and sorted product grid.
    pub async fn browse(&self, query: &ProductQuery) -> StoreResult<Vec<Product>> {
        self.latency.wait(Operation::Browse).await;
        let needle = validate_search_query(query.search.as_deref().unwrap_or_default())?
            .to_lowercase();

        let mut products: Vec<Product> = self
            .products
            .read()
            .await
            .iter()
            .filter(|p| query.matches(p, &needle))
            .cloned()
            .collect();
        sort_products(&mut products, query.sort);

        debug!(results = products.len(), sort = ?query.sort, "Browse");
        Ok(products)
    }

    // -------------------------------------------------------------------------
    // Admin operations
    // -------------------------------------------------------------------------

    /// Adds a product. The id is one past the highest numeric id.
    pub async fn create(&self, draft: ProductDraft) -> StoreResult<Product> {
        self.latency.wait(Operation::CreateProduct).await;
        draft.validate()?;

        let mut products = self.products.write().await;
        let next_id = products
            .iter()
            .filter_map(|p| p.id.as_numeric())
            .max()
            .unwrap_or(0)
            + 1;
        let product = draft.into_product(ProductId::from(next_id), Utc::now());

        let mut next = products.clone();
        next.push(product.clone());
        self.commit(&mut products, next)?;

        info!(product_id = %product.id, name = %product.name, "Product created");
        Ok(product)
    }

    /// Merges `patch` into an existing product.
    pub async fn update(&self, id: &ProductId, patch: ProductPatch) -> StoreResult<Product> {
        self.latency.wait(Operation::UpdateProduct).await;

        let mut products = self.products.write().await;
        let index = position(&products, id)?;

        let mut next = products.clone();
        patch.apply_to(&mut next[index])?;
        let updated = next[index].clone();
        self.commit(&mut products, next)?;

        info!(product_id = %id, "Product updated");
        Ok(updated)
    }

    pub async fn delete(&self, id: &ProductId) -> StoreResult<()> {
        self.latency.wait(Operation::DeleteProduct).await;

        let mut products = self.products.write().await;
        let index = position(&products, id)?;

        let mut next = products.clone();
        next.remove(index);
        self.commit(&mut products, next)?;

        info!(product_id = %id, "Product deleted");
        Ok(())
    }

    /// Takes `quantity` units off the shelf. Stock never goes below zero.
    pub async fn decrement_stock(&self, id: &ProductId, quantity: u32) -> StoreResult<Product> {
        self.latency.wait(Operation::DecrementStock).await;

        let mut products = self.products.write().await;
        let index = position(&products, id)?;

        let mut next = products.clone();
        let product = &mut next[index];
        product.stock = product.stock.saturating_sub(quantity);
        let updated = product.clone();
        self.commit(&mut products, next)?;

        debug!(product_id = %id, stock = updated.stock, "Stock decremented");
        Ok(updated)
    }

    /// Products with `stock <= threshold` (default 20).
    pub async fn low_stock(&self, threshold: Option<u32>) -> StoreResult<Vec<Product>> {
        self.latency.wait(Operation::LowStock).await;
        let threshold = threshold.unwrap_or(LOW_STOCK_REPORT_THRESHOLD);

        Ok(self
            .products
            .read()
            .await
            .iter()
            .filter(|p| p.stock <= threshold)
            .cloned()
            .collect())
    }

    /// Replaces the whole list, e.g. when reseeding.
    pub async fn replace_all(&self, products: Vec<Product>) -> StoreResult<()> {
        let mut current = self.products.write().await;
        self.commit(&mut current, products)
    }

    /// Writes `next` to the snapshot slot, then swaps it in. A failed
    /// write leaves the in-memory list untouched.
    fn commit(
        &self,
        current: &mut RwLockWriteGuard<'_, Vec<Product>>,
        next: Vec<Product>,
    ) -> StoreResult<()> {
        if let Some(slot) = &self.snapshot {
            slot.save(&next)?;
        }
        **current = next;
        Ok(())
    }
}

fn position(products: &[Product], id: &ProductId) -> StoreResult<usize> {
    products
        .iter()
        .position(|p| p.id == *id)
        .ok_or_else(|| StoreError::not_found("Product", id))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use chrono::TimeZone;

    fn product(id: u64, name: &str, cents: i64, category: &str, stock: u32) -> Product {
        Product::new(ProductId::from(id), name, Money::from_cents(cents))
            .with_category(category)
            .with_stock(stock)
    }

    fn catalog() -> CatalogService {
        let mut mug = product(3, "Coffee Mug", 1299, "Home", 40);
        mug.description = "Ceramic, holds hot drinks".to_string();
        mug.created_at = Some(Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap());

        let mut hoodie = product(1, "hoodie", 4999, "Clothing", 8);
        hoodie.created_at = Some(Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap());

        CatalogService::new(
            vec![
                hoodie,
                product(2, "Backpack", 7999, "Accessories", 0),
                mug,
                product(4, "T-Shirt", 1999, "Clothing", 25),
            ],
            SimulatedLatency::none(),
        )
    }

    fn names(products: &[Product]) -> Vec<&str> {
        products.iter().map(|p| p.name.as_str()).collect()
    }

    fn draft(name: &str) -> ProductDraft {
        ProductDraft {
            name: name.to_string(),
            description: String::new(),
            price: Money::from_cents(500),
            images: vec![],
            stock: 3,
            category: "Home".to_string(),
            variants: vec![],
        }
    }

    #[tokio::test]
    async fn test_fetch_by_id() {
        let catalog = catalog();
        let found = catalog.fetch_by_id(&ProductId::from(3)).await.unwrap();
        assert_eq!(found.name, "Coffee Mug");

        let missing = catalog.fetch_by_id(&ProductId::from(99)).await.unwrap_err();
        assert!(missing.is_not_found());
        assert_eq!(missing.to_string(), "Product not found: 99");

        // Text ids never match numeric ones
        assert!(catalog.fetch_by_id(&ProductId::from("3")).await.is_err());
    }

    #[tokio::test]
    async fn test_categories_sorted_unique() {
        let categories = catalog().list_categories().await.unwrap();
        assert_eq!(categories, vec!["Accessories", "Clothing", "Home"]);
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive_over_fields() {
        let catalog = catalog();
        assert_eq!(names(&catalog.search("HOODIE").await.unwrap()), vec!["hoodie"]);
        assert_eq!(names(&catalog.search("ceramic").await.unwrap()), vec!["Coffee Mug"]);
        assert_eq!(
            names(&catalog.search("cloth").await.unwrap()),
            vec!["hoodie", "T-Shirt"]
        );
        assert_eq!(catalog.search("  ").await.unwrap().len(), 4);
        assert!(catalog.search(&"x".repeat(101)).await.is_err());
    }

    #[tokio::test]
    async fn test_fetch_by_category_exact() {
        let catalog = catalog();
        assert_eq!(catalog.fetch_by_category("Clothing").await.unwrap().len(), 2);
        assert!(catalog.fetch_by_category("clothing").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_browse_filters_and_sorts() {
        let catalog = catalog();

        let by_name = catalog.browse(&ProductQuery::default()).await.unwrap();
        assert_eq!(
            names(&by_name),
            vec!["Backpack", "Coffee Mug", "hoodie", "T-Shirt"]
        );

        let query = ProductQuery {
            min_price: Some(Money::from_cents(1999)),
            max_price: Some(Money::from_cents(4999)),
            sort: SortOrder::PriceHigh,
            ..ProductQuery::default()
        };
        assert_eq!(
            names(&catalog.browse(&query).await.unwrap()),
            vec!["hoodie", "T-Shirt"]
        );

        let query = ProductQuery {
            category: Some("Clothing".to_string()),
            sort: SortOrder::PriceLow,
            ..ProductQuery::default()
        };
        assert_eq!(
            names(&catalog.browse(&query).await.unwrap()),
            vec!["T-Shirt", "hoodie"]
        );

        let query = ProductQuery {
            sort: SortOrder::Newest,
            ..ProductQuery::default()
        };
        let newest = catalog.browse(&query).await.unwrap();
        assert_eq!(names(&newest)[..2], ["hoodie", "Coffee Mug"]);
    }

    #[test]
    fn test_sort_order_parse() {
        assert_eq!("price-low".parse::<SortOrder>().unwrap(), SortOrder::PriceLow);
        assert_eq!("Newest".parse::<SortOrder>().unwrap(), SortOrder::Newest);
        assert!("rating".parse::<SortOrder>().is_err());
    }

    #[tokio::test]
    async fn test_create_assigns_next_id() {
        let catalog = catalog();
        let created = catalog.create(draft("Candle")).await.unwrap();
        assert_eq!(created.id, ProductId::from(5));
        assert!(created.created_at.is_some());
        assert_eq!(catalog.fetch_all().await.unwrap().len(), 5);

        assert!(matches!(
            catalog.create(draft("  ")).await,
            Err(StoreError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let catalog = catalog();
        let patch = ProductPatch {
            price: Some(Money::from_cents(1499)),
            stock: Some(12),
            ..ProductPatch::default()
        };
        let updated = catalog.update(&ProductId::from(3), patch).await.unwrap();
        assert_eq!(updated.price.cents(), 1499);
        assert_eq!(updated.name, "Coffee Mug");

        catalog.delete(&ProductId::from(3)).await.unwrap();
        assert!(catalog.delete(&ProductId::from(3)).await.unwrap_err().is_not_found());
        assert!(catalog
            .update(&ProductId::from(3), ProductPatch::default())
            .await
            .unwrap_err()
            .is_not_found());
    }

    #[tokio::test]
    async fn test_decrement_stock_floors_at_zero() {
        let catalog = catalog();
        let id = ProductId::from(1);
        assert_eq!(catalog.decrement_stock(&id, 3).await.unwrap().stock, 5);
        assert_eq!(catalog.decrement_stock(&id, 50).await.unwrap().stock, 0);
    }

    #[tokio::test]
    async fn test_low_stock_threshold() {
        let catalog = catalog();
        assert_eq!(
            names(&catalog.low_stock(None).await.unwrap()),
            vec!["hoodie", "Backpack"]
        );
        assert_eq!(names(&catalog.low_stock(Some(0)).await.unwrap()), vec!["Backpack"]);
    }

    #[tokio::test]
    async fn test_snapshot_survives_new_service() {
        let storage = Arc::new(MemoryStorage::new());
        let slot = || SnapshotSlot::new(storage.clone(), "quickcommerce", "products");
        let seed = vec![product(1, "Lamp", 2500, "Home", 4)];

        let first = CatalogService::with_snapshot(seed.clone(), SimulatedLatency::none(), slot());
        first.create(draft("Rug")).await.unwrap();

        let second = CatalogService::with_snapshot(seed, SimulatedLatency::none(), slot());
        assert_eq!(names(&second.fetch_all().await.unwrap()), vec!["Lamp", "Rug"]);
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let catalog = catalog();
        let other = catalog.clone();
        other.delete(&ProductId::from(2)).await.unwrap();
        assert_eq!(catalog.fetch_all().await.unwrap().len(), 3);
    }
}
