pub mod catalog;
pub mod product;
pub mod search;
mod seed;

pub use catalog::Catalog;
pub use product::{Category, NewListing, Product, ProductError};
pub use search::{analyze_image, filter_products, SearchFilter};
