use crate::product::{Category, Product};

/// Keywords the image search reports for any picture.
pub const IMAGE_KEYWORDS: [&str; 4] = ["electronics", "laptop", "computer", "tech"];

/// Browse filters. Image keywords take precedence over the text query.
#[derive(Debug, Clone, Default)]
pub struct SearchFilter {
    pub category: Option<Category>,
    pub query: Option<String>,
    pub keywords: Vec<String>,
}

fn matches_term(product: &Product, term: &str) -> bool {
    let term = term.to_lowercase();
    product.name.to_lowercase().contains(&term)
        || product.description.to_lowercase().contains(&term)
        || product.category.as_str().contains(&term)
}

pub fn filter_products(products: Vec<Product>, filter: &SearchFilter) -> Vec<Product> {
    let query = filter.query.as_deref().map(str::trim).filter(|q| !q.is_empty());

    products
        .into_iter()
        .filter(|p| filter.category.map_or(true, |c| p.category == c))
        .filter(|p| {
            if !filter.keywords.is_empty() {
                filter.keywords.iter().any(|k| matches_term(p, k))
            } else if let Some(q) = query {
                matches_term(p, q)
            } else {
                true
            }
        })
        .collect()
}

/// Stand-in for visual search: no recognition happens, the image is ignored.
pub fn analyze_image(_image: &[u8]) -> Vec<String> {
    IMAGE_KEYWORDS.iter().map(|k| k.to_string()).collect()
}
