//! # Product Commands
//!
//! Shop-side browsing: the product grid, product detail, search and the
//! category list.

use quickcommerce_core::{Product, ProductId, VariantSelection};
use quickcommerce_store::ProductQuery;
use serde::Serialize;
use tracing::debug;

use super::{product_table, Output};
use crate::error::CliResult;
use crate::state::AppState;

/// Lists products, filtered and sorted like the shop grid.
pub async fn list(state: &AppState, query: ProductQuery) -> CliResult<Output> {
    debug!(?query, "products list");
    let products = state.backend.catalog().browse(&query).await?;
    let text = product_table(&state.config, &products);
    Output::new(&products, text)
}

/// Product detail with its variant axes and the preselected options.
pub async fn show(state: &AppState, id: &ProductId) -> CliResult<Output> {
    debug!(product_id = %id, "products show");
    let product = state.backend.catalog().fetch_by_id(id).await?;
    let text = render_detail(state, &product);

    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct Detail<'a> {
        #[serde(flatten)]
        product: &'a Product,
        stock_status: &'static str,
        default_selection: VariantSelection,
    }

    let detail = Detail {
        product: &product,
        stock_status: product.stock_status().label(),
        default_selection: product.default_selection(),
    };
    Output::new(&detail, text)
}

pub async fn search(state: &AppState, query: &str) -> CliResult<Output> {
    debug!(query = %query, "products search");
    let products = state.backend.catalog().search(query).await?;
    let text = format!(
        "Search results for \"{}\"\n\n{}",
        query.trim(),
        product_table(&state.config, &products)
    );
    Output::new(&products, text)
}

pub async fn categories(state: &AppState) -> CliResult<Output> {
    let categories = state.backend.catalog().list_categories().await?;
    let text = if categories.is_empty() {
        "No categories.".to_string()
    } else {
        categories.join("\n")
    };
    Output::new(&categories, text)
}

fn render_detail(state: &AppState, product: &Product) -> String {
    let mut out = format!(
        "{} (#{})\n{}\n\nPrice:    {}\nStock:    {} ({} left)\nCategory: {}\n",
        product.name,
        product.id,
        product.description,
        state.config.format_currency(product.price),
        product.stock_status().label(),
        product.stock,
        product.category
    );

    if !product.variants.is_empty() {
        out.push_str("\nOptions:\n");
        for axis in &product.variants {
            out.push_str(&format!("  {:<8} {}\n", axis.name, axis.options.join(" | ")));
        }
        out.push_str(&format!(
            "\nDefault selection: {}",
            product.default_selection().label()
        ));
    }

    if let Some(image) = product.primary_image() {
        out.push_str(&format!("\nImage: {image}"));
    }
    out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::state;
    use crate::error::ErrorCode;
    use quickcommerce_store::SortOrder;

    #[tokio::test]
    async fn test_list_sorted_by_price() {
        let state = state();
        let query = ProductQuery {
            category: Some("Clothing".to_string()),
            sort: SortOrder::PriceLow,
            ..ProductQuery::default()
        };
        let output = list(&state, query).await.unwrap();

        let names: Vec<&str> = output
            .json
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["Wool Beanie", "Classic Cotton T-Shirt", "Denim Jacket"]);
        assert!(output.text.contains("Showing 3 products"));
    }

    #[tokio::test]
    async fn test_show_includes_default_selection() {
        let state = state();
        let output = show(&state, &ProductId::from(1)).await.unwrap();

        assert_eq!(output.json["defaultSelection"]["Size"], "S");
        assert_eq!(output.json["defaultSelection"]["Color"], "White");
        assert_eq!(output.json["stockStatus"], "In Stock");
        assert!(output.text.contains("Size     S | M | L | XL"));
    }

    #[tokio::test]
    async fn test_show_missing_product() {
        let err = show(&state(), &ProductId::from(404)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_search_and_categories() {
        let state = state();
        let output = search(&state, "leather").await.unwrap();
        // Variant options are not searched
        assert_eq!(output.json.as_array().unwrap().len(), 1);

        let output = categories(&state).await.unwrap();
        assert_eq!(
            output.text,
            "Accessories\nClothing\nElectronics\nFootwear\nHome"
        );
    }
}
