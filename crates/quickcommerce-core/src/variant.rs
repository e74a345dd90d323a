//! # Variant Selections and Line Identity
//!
//! A line in the cart is identified by the product it references plus the
//! options chosen on each of the product's variant axes.
//!
//! ## Canonical Identity Key
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Selection A: { Size: M, Color: Red }                                   │
//! │  Selection B: { Color: Red, Size: M }     (same entries, other order)   │
//! │                        │                                                │
//! │                        ▼                                                │
//! │  canonical(): entries sorted by axis name, escaped, joined with ';'     │
//! │                        │                                                │
//! │                        ▼                                                │
//! │  "Color=Red;Size=M"  ── identical for A and B                           │
//! │                        │                                                │
//! │                        ▼                                                │
//! │  LineKey { product_id: 1, variants: "Color=Red;Size=M" }                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The key never depends on insertion order or on how a serializer happens
//! to lay out a map.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::types::ProductId;

// =============================================================================
// Variant Selection
// =============================================================================

/// Mapping from variant-axis name to the chosen option (`{"Size": "M"}`).
///
/// An empty selection means the product has no variant axes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(transparent)]
#[ts(export)]
pub struct VariantSelection(BTreeMap<String, String>);

impl VariantSelection {
    /// Creates an empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    ///
    /// ## Example
    /// ```rust
    /// use quickcommerce_core::VariantSelection;
    ///
    /// let a = VariantSelection::new().with("Size", "M").with("Color", "Red");
    /// let b = VariantSelection::new().with("Color", "Red").with("Size", "M");
    /// assert_eq!(a.canonical(), b.canonical());
    /// ```
    pub fn with(mut self, axis: impl Into<String>, option: impl Into<String>) -> Self {
        self.insert(axis, option);
        self
    }

    /// Chooses `option` on `axis`, replacing any previous choice.
    pub fn insert(&mut self, axis: impl Into<String>, option: impl Into<String>) {
        self.0.insert(axis.into(), option.into());
    }

    /// Returns the option chosen on `axis`.
    pub fn get(&self, axis: &str) -> Option<&str> {
        self.0.get(axis).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterates `(axis, option)` pairs sorted by axis name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Stable textual form used for identity.
    ///
    /// Entries are sorted by axis name. `\`, `=` and `;` inside names or
    /// options are backslash-escaped so distinct selections can never
    /// produce the same string.
    pub fn canonical(&self) -> String {
        let mut out = String::new();
        for (i, (axis, option)) in self.0.iter().enumerate() {
            if i > 0 {
                out.push(';');
            }
            push_escaped(&mut out, axis);
            out.push('=');
            push_escaped(&mut out, option);
        }
        out
    }

    /// Human-readable label, e.g. `Color: Red, Size: M`.
    pub fn label(&self) -> String {
        self.iter()
            .map(|(axis, option)| format!("{axis}: {option}"))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn push_escaped(out: &mut String, raw: &str) {
    for c in raw.chars() {
        if matches!(c, '\\' | '=' | ';') {
            out.push('\\');
        }
        out.push(c);
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for VariantSelection {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        VariantSelection(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Parses the command-line form `Size=M,Color=Red`.
///
/// Blank input is the empty selection. Whitespace around names and options
/// is trimmed.
impl FromStr for VariantSelection {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut selection = VariantSelection::new();
        for pair in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (axis, option) = pair
                .split_once('=')
                .map(|(a, o)| (a.trim(), o.trim()))
                .filter(|(a, o)| !a.is_empty() && !o.is_empty())
                .ok_or_else(|| ValidationError::InvalidFormat {
                    field: "variants".to_string(),
                    reason: format!("expected Axis=Option, got '{pair}'"),
                })?;
            selection.insert(axis, option);
        }
        Ok(selection)
    }
}

// =============================================================================
// Line Key
// =============================================================================

/// Composite identity of a cart line: product id + canonical selection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LineKey {
    pub product_id: ProductId,
    pub variants: String,
}

impl LineKey {
    pub fn new(product_id: &ProductId, variants: &VariantSelection) -> Self {
        LineKey {
            product_id: product_id.clone(),
            variants: variants.canonical(),
        }
    }
}

impl fmt::Display for LineKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.variants.is_empty() {
            write!(f, "{}", self.product_id)
        } else {
            write!(f, "{}[{}]", self.product_id, self.variants)
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
