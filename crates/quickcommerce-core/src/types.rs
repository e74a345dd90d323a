//! # Domain Types
//!
//! Core domain types used throughout QuickCommerce.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Order      │   │   OrderItem     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  id (ORD-###)   │   │  productId      │       │
//! │  │  name, price    │   │  status         │   │  productName    │       │
//! │  │  images, stock  │   │  customer       │   │  quantity       │       │
//! │  │  category       │   │  shippingAddr   │   │  price          │       │
//! │  │  variants[]     │   │  total          │   │  variant        │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   ProductId     │   │  OrderStatus    │   │  StockStatus    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  Numeric(u64)   │   │  Pending        │   │  InStock        │       │
//! │  │  Text(String)   │   │  Processing     │   │  LowStock       │       │
//! │  └─────────────────┘   │  Shipped        │   │  OutOfStock     │       │
//! │                        │  Delivered      │   └─────────────────┘       │
//! │                        └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All wire names are camelCase to match the mock JSON data.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::validation;
use crate::variant::VariantSelection;
use crate::LOW_STOCK_BADGE_LEVEL;

// =============================================================================
// Product Id
// =============================================================================

/// Identifier of a product: a JSON number or a JSON string.
///
/// `Numeric(1)` and `Text("1")` are different ids. Parsing user input with
/// [`FromStr`] treats all-digit text as numeric, which is what the catalog
/// uses.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProductId {
    Numeric(u64),
    Text(String),
}

impl ProductId {
    /// Returns the numeric value, if this is a numeric id.
    pub fn as_numeric(&self) -> Option<u64> {
        match self {
            ProductId::Numeric(n) => Some(*n),
            ProductId::Text(_) => None,
        }
    }
}

impl From<u64> for ProductId {
    fn from(id: u64) -> Self {
        ProductId::Numeric(id)
    }
}

impl From<&str> for ProductId {
    fn from(id: &str) -> Self {
        ProductId::Text(id.to_string())
    }
}

impl FromStr for ProductId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ValidationError::Required {
                field: "productId".to_string(),
            });
        }
        Ok(s.parse::<u64>()
            .map(ProductId::Numeric)
            .unwrap_or_else(|_| ProductId::Text(s.to_string())))
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProductId::Numeric(n) => write!(f, "{n}"),
            ProductId::Text(s) => f.write_str(s),
        }
    }
}

// =============================================================================
// Product
// =============================================================================

/// A named option dimension of a product (e.g. "Size" with S/M/L).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct VariantAxis {
    pub name: String,
    pub options: Vec<String>,
}

/// A product in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Product {
    #[ts(type = "number | string")]
    pub id: ProductId,

    /// Display name shown on cards, in the cart and on orders.
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Unit price.
    #[ts(type = "number")]
    pub price: Money,

    /// Image references; the first one is the primary image.
    #[serde(default)]
    pub images: Vec<String>,

    /// Units on hand.
    pub stock: u32,

    pub category: String,

    /// Variant axes; empty when the product comes in one form only.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variants: Vec<VariantAxis>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(as = "Option<String>")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Product {
    /// Creates a product with no images, no stock and no variants.
    pub fn new(id: ProductId, name: impl Into<String>, price: Money) -> Self {
        Product {
            id,
            name: name.into(),
            description: String::new(),
            price,
            images: Vec::new(),
            stock: 0,
            category: String::new(),
            variants: Vec::new(),
            created_at: None,
        }
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.images.push(image.into());
        self
    }

    pub fn with_stock(mut self, stock: u32) -> Self {
        self.stock = stock;
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_variant_axis<I, S>(mut self, name: impl Into<String>, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.variants.push(VariantAxis {
            name: name.into(),
            options: options.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// The first image, if any.
    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    /// Badge shown on product cards and in the admin table.
    pub fn stock_status(&self) -> StockStatus {
        StockStatus::for_stock(self.stock)
    }

    /// Selection the detail view starts from: first option on every axis.
    pub fn default_selection(&self) -> VariantSelection {
        self.variants
            .iter()
            .filter_map(|axis| axis.options.first().map(|o| (axis.name.clone(), o.clone())))
            .collect()
    }

    /// Checks that `selection` picks a listed option on every axis and
    /// names no axis the product lacks.
    pub fn validate_selection(&self, selection: &VariantSelection) -> CoreResult<()> {
        for (axis, _) in selection.iter() {
            if !self.variants.iter().any(|a| a.name == axis) {
                return Err(CoreError::UnknownVariantAxis {
                    product: self.name.clone(),
                    axis: axis.to_string(),
                });
            }
        }

        for axis in &self.variants {
            match selection.get(&axis.name) {
                None => {
                    return Err(CoreError::MissingVariant {
                        product: self.name.clone(),
                        axis: axis.name.clone(),
                    })
                }
                Some(value) if !axis.options.iter().any(|o| o == value) => {
                    return Err(CoreError::InvalidVariantOption {
                        product: self.name.clone(),
                        axis: axis.name.clone(),
                        value: value.to_string(),
                    })
                }
                Some(_) => {}
            }
        }

        Ok(())
    }

    /// Fails with [`CoreError::InsufficientStock`] if fewer than `quantity`
    /// units are on hand.
    pub fn ensure_available(&self, quantity: u64) -> CoreResult<()> {
        if u64::from(self.stock) < quantity {
            return Err(CoreError::InsufficientStock {
                product: self.name.clone(),
                available: self.stock,
                requested: quantity,
            });
        }
        Ok(())
    }
}

// =============================================================================
// Stock Status
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum StockStatus {
    InStock,
    LowStock,
    OutOfStock,
}

impl StockStatus {
    pub fn for_stock(stock: u32) -> Self {
        match stock {
            0 => StockStatus::OutOfStock,
            s if s <= LOW_STOCK_BADGE_LEVEL => StockStatus::LowStock,
            _ => StockStatus::InStock,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StockStatus::InStock => "In Stock",
            StockStatus::LowStock => "Low Stock",
            StockStatus::OutOfStock => "Out of Stock",
        }
    }
}

// =============================================================================
// Product Draft / Patch (admin)
// =============================================================================

/// Fields for creating a product. The catalog assigns `id` and `createdAt`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ProductDraft {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[ts(type = "number")]
    pub price: Money,
    #[serde(default)]
    pub images: Vec<String>,
    pub stock: u32,
    pub category: String,
    #[serde(default)]
    pub variants: Vec<VariantAxis>,
}

impl ProductDraft {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validation::validate_product_name(&self.name)?;
        validation::validate_price(self.price)?;
        validation::validate_category(&self.category)?;
        validation::validate_variant_axes(&self.variants)?;
        Ok(())
    }

    /// Builds the catalog record.
    pub fn into_product(self, id: ProductId, created_at: DateTime<Utc>) -> Product {
        Product {
            id,
            name: self.name.trim().to_string(),
            description: self.description,
            price: self.price,
            images: self.images,
            stock: self.stock,
            category: self.category.trim().to_string(),
            variants: self.variants,
            created_at: Some(created_at),
        }
    }
}

/// Partial update for a product; `None` leaves the field as it is.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    #[ts(type = "number | null")]
    pub price: Option<Money>,
    pub images: Option<Vec<String>>,
    pub stock: Option<u32>,
    pub category: Option<String>,
    pub variants: Option<Vec<VariantAxis>>,
}

impl ProductPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.images.is_none()
            && self.stock.is_none()
            && self.category.is_none()
            && self.variants.is_none()
    }

    /// Merges the patch into `product` after validating the new values.
    ///
    /// Nothing is written when validation fails.
    pub fn apply_to(self, product: &mut Product) -> Result<(), ValidationError> {
        if let Some(name) = &self.name {
            validation::validate_product_name(name)?;
        }
        if let Some(price) = self.price {
            validation::validate_price(price)?;
        }
        if let Some(category) = &self.category {
            validation::validate_category(category)?;
        }
        if let Some(variants) = &self.variants {
            validation::validate_variant_axes(variants)?;
        }

        if let Some(name) = self.name {
            product.name = name.trim().to_string();
        }
        if let Some(description) = self.description {
            product.description = description;
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(images) = self.images {
            product.images = images;
        }
        if let Some(stock) = self.stock {
            product.stock = stock;
        }
        if let Some(category) = self.category {
            product.category = category.trim().to_string();
        }
        if let Some(variants) = self.variants {
            product.variants = variants;
        }
        Ok(())
    }
}

// =============================================================================
// Order Status
// =============================================================================

/// Fulfilment state of an order. New orders always start as `Pending`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    Shipped,
    Delivered,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 4] = [
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == needle)
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "status".to_string(),
                allowed: OrderStatus::ALL.iter().map(|s| s.to_string()).collect(),
            })
    }
}

// =============================================================================
// Orders
// =============================================================================

/// One line of an order, frozen from the cart at checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct OrderItem {
    #[ts(type = "number | string")]
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: u32,
    #[ts(type = "number")]
    pub price: Money,
    #[serde(default)]
    pub variant: VariantSelection,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Customer {
    pub name: String,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ShippingAddress {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
}

/// Order payload handed to the order submitter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct NewOrder {
    pub items: Vec<OrderItem>,
    pub customer: Customer,
    #[ts(type = "number")]
    pub total: Money,
    pub shipping_address: ShippingAddress,
}

/// A created order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Order {
    /// `ORD-001`, `ORD-002`, ...
    pub id: String,
    pub items: Vec<OrderItem>,
    pub customer: Customer,
    #[ts(type = "number")]
    pub total: Money,
    pub shipping_address: ShippingAddress,
    pub status: OrderStatus,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Turns a payload into a pending order record.
    pub fn from_new(order: NewOrder, id: String, created_at: DateTime<Utc>) -> Self {
        Order {
            id,
            items: order.items,
            customer: order.customer,
            total: order.total,
            shipping_address: order.shipping_address,
            status: OrderStatus::Pending,
            created_at,
        }
    }

    /// Total number of units across all lines.
    pub fn unit_count(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }
}

/// Formats the display id for the `sequence`-th order: `ORD-007`.
pub fn order_number(sequence: usize) -> String {
    format!("ORD-{sequence:03}")
}

// =============================================================================
// Order Stats
// =============================================================================

/// Dashboard counters over a set of orders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct OrderStats {
    pub total: usize,
    pub pending: usize,
    pub processing: usize,
    pub shipped: usize,
    pub delivered: usize,
    #[ts(type = "number")]
    pub total_revenue: Money,
}

impl OrderStats {
    pub fn from_orders(orders: &[Order]) -> Self {
        let mut stats = OrderStats {
            total: orders.len(),
            ..OrderStats::default()
        };
        for order in orders {
            match order.status {
                OrderStatus::Pending => stats.pending += 1,
                OrderStatus::Processing => stats.processing += 1,
                OrderStatus::Shipped => stats.shipped += 1,
                OrderStatus::Delivered => stats.delivered += 1,
            }
            stats.total_revenue += order.total;
        }
        stats
    }

    pub fn count(&self, status: OrderStatus) -> usize {
        match status {
            OrderStatus::Pending => self.pending,
            OrderStatus::Processing => self.processing,
            OrderStatus::Shipped => self.shipped,
            OrderStatus::Delivered => self.delivered,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn tee() -> Product {
        Product::new(ProductId::from(3), "Tee", Money::from_cents(1500))
            .with_variant_axis("Size", ["S", "M", "L"])
            .with_variant_axis("Color", ["Black", "White"])
            .with_stock(8)
    }

    #[test]
    fn test_product_id_wire_forms() {
        let numeric: ProductId = serde_json::from_str("42").unwrap();
        assert_eq!(numeric, ProductId::Numeric(42));
        let text: ProductId = serde_json::from_str(r#""sku-9""#).unwrap();
        assert_eq!(text, ProductId::Text("sku-9".to_string()));

        assert_eq!(serde_json::to_string(&numeric).unwrap(), "42");
        assert_ne!(ProductId::from(1), ProductId::from("1"));
    }

    #[test]
    fn test_product_id_parse() {
        assert_eq!("12".parse::<ProductId>().unwrap(), ProductId::Numeric(12));
        assert_eq!("abc".parse::<ProductId>().unwrap(), ProductId::from("abc"));
        assert!("  ".parse::<ProductId>().is_err());
    }

    #[test]
    fn test_stock_status_thresholds() {
        assert_eq!(StockStatus::for_stock(0), StockStatus::OutOfStock);
        assert_eq!(StockStatus::for_stock(1), StockStatus::LowStock);
        assert_eq!(StockStatus::for_stock(10), StockStatus::LowStock);
        assert_eq!(StockStatus::for_stock(11), StockStatus::InStock);
        assert_eq!(StockStatus::OutOfStock.label(), "Out of Stock");
    }

    #[test]
    fn test_default_selection_takes_first_options() {
        let selection = tee().default_selection();
        assert_eq!(selection.get("Size"), Some("S"));
        assert_eq!(selection.get("Color"), Some("Black"));
        assert!(tee().validate_selection(&selection).is_ok());
    }

    #[test]
    fn test_validate_selection_errors() {
        let product = tee();

        let missing = VariantSelection::new().with("Size", "M");
        assert!(matches!(
            product.validate_selection(&missing),
            Err(CoreError::MissingVariant { .. })
        ));

        let invalid = VariantSelection::new().with("Size", "XXL").with("Color", "Black");
        assert!(matches!(
            product.validate_selection(&invalid),
            Err(CoreError::InvalidVariantOption { .. })
        ));

        let unknown = product.default_selection().with("Fit", "Slim");
        assert!(matches!(
            product.validate_selection(&unknown),
            Err(CoreError::UnknownVariantAxis { .. })
        ));
    }

    #[test]
    fn test_ensure_available() {
        assert!(tee().ensure_available(8).is_ok());
        assert!(matches!(
            tee().ensure_available(9),
            Err(CoreError::InsufficientStock { available: 8, requested: 9, .. })
        ));
    }

    #[test]
    fn test_product_deserializes_from_mock_shape() {
        let json = r#"{
            "id": 1,
            "name": "Widget",
            "price": 9.99,
            "images": ["x.png"],
            "stock": 5,
            "category": "Gadgets"
        }"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.price.cents(), 999);
        assert_eq!(product.primary_image(), Some("x.png"));
        assert!(product.variants.is_empty());
        assert!(product.default_selection().is_empty());
    }

    #[test]
    fn test_patch_is_all_or_nothing() {
        let mut product = tee();
        let patch = ProductPatch {
            stock: Some(1),
            name: Some("   ".to_string()),
            ..ProductPatch::default()
        };
        assert!(patch.apply_to(&mut product).is_err());
        assert_eq!(product.stock, 8);

        let patch = ProductPatch {
            stock: Some(1),
            price: Some(Money::from_cents(1200)),
            ..ProductPatch::default()
        };
        patch.apply_to(&mut product).unwrap();
        assert_eq!(product.stock, 1);
        assert_eq!(product.price.cents(), 1200);
    }

    #[test]
    fn test_order_status_parse_and_display() {
        assert_eq!("Shipped".parse::<OrderStatus>().unwrap(), OrderStatus::Shipped);
        assert!("lost".parse::<OrderStatus>().is_err());
        assert_eq!(OrderStatus::default().to_string(), "pending");
        assert_eq!(
            serde_json::to_string(&OrderStatus::Delivered).unwrap(),
            r#""delivered""#
        );
    }

    #[test]
    fn test_order_number_padding() {
        assert_eq!(order_number(1), "ORD-001");
        assert_eq!(order_number(42), "ORD-042");
        assert_eq!(order_number(1234), "ORD-1234");
    }
}
