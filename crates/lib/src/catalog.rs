//! Product listing: search, filters and price ordering.

use serde::{Deserialize, Serialize};

/// A catalog product as the storefront lists it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    #[serde(default)]
    pub category: Option<String>,
    /// Sizes the product comes in; empty for products without sizes
    #[serde(default)]
    pub sizes: Vec<String>,
    #[serde(default)]
    pub stock: u32,
}

/// Direction of the price sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceOrder {
    Asc,
    Desc,
}

/// The listing parameters, as found in the catalog page's query string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub price: Option<PriceOrder>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl CatalogQuery {
    fn matches(&self, product: &Product) -> bool {
        if let Some(text) = non_empty(&self.search) {
            let text = text.to_lowercase();
            if !product.name.to_lowercase().contains(&text)
                && !product.description.to_lowercase().contains(&text)
            {
                return false;
            }
        }
        if let Some(category) = non_empty(&self.category)
            && product.category.as_deref() != Some(category)
        {
            return false;
        }
        if let Some(size) = non_empty(&self.size)
            && !product.sizes.iter().any(|s| s == size)
        {
            return false;
        }
        true
    }
}

/// Products matching `query`, sorted by price when requested.
///
/// Without a price order the input sequence is kept. The sort is stable, so
/// products with equal prices also keep their relative order.
pub fn filter_and_sort(products: &[Product], query: &CatalogQuery) -> Vec<Product> {
    let mut result: Vec<Product> = products
        .iter()
        .filter(|product| query.matches(product))
        .cloned()
        .collect();

    match query.price {
        Some(PriceOrder::Asc) => result.sort_by(|a, b| a.price.total_cmp(&b.price)),
        Some(PriceOrder::Desc) => result.sort_by(|a, b| b.price.total_cmp(&a.price)),
        None => {}
    }
    result
}
