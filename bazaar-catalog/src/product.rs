use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Listing categories
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Electronics,
    Fashion,
    Books,
    Sports,
    Home,
    Other,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Electronics,
        Category::Fashion,
        Category::Books,
        Category::Sports,
        Category::Home,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Electronics => "electronics",
            Category::Fashion => "fashion",
            Category::Books => "books",
            Category::Sports => "sports",
            Category::Home => "home",
            Category::Other => "other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ProductError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ProductError::UnknownCategory(s.to_string()))
    }
}

/// A listed item
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Whole rupiah
    pub price: u64,
    pub category: Category,
    pub condition: String,
    pub image_url: String,
    pub seller_id: String,
    pub seller_name: String,
    pub sold_out: bool,
    pub created_at: DateTime<Utc>,
    /// Order in which the item was listed, starting at 1.
    pub listing_seq: u64,
}

impl Product {
    pub fn is_available(&self) -> bool {
        !self.sold_out
    }
}

/// Seller input for a new listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewListing {
    pub name: String,
    pub price: u64,
    pub category: Category,
    pub condition: String,
    pub description: String,
    pub image_url: Option<String>,
}

impl NewListing {
    pub fn validate(&self) -> Result<(), ProductError> {
        let required = [
            ("name", &self.name),
            ("condition", &self.condition),
            ("description", &self.description),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ProductError::MissingField(field));
            }
        }
        if self.price == 0 {
            return Err(ProductError::InvalidPrice);
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProductError {
    #[error("Product not found: {0}")]
    NotFound(String),

    #[error("Please fill in all required fields: {0} is missing")]
    MissingField(&'static str),

    #[error("Price must be greater than zero")]
    InvalidPrice,

    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    #[error(transparent)]
    Store(#[from] bazaar_store::StoreError),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing() -> NewListing {
        NewListing {
            name: "Kindle Paperwhite".to_string(),
            price: 1_200_000,
            category: Category::Electronics,
            condition: "Good".to_string(),
            description: "10th gen, with case".to_string(),
            image_url: None,
        }
    }

    #[test]
    fn test_category_parsing() {
        assert_eq!("Electronics".parse::<Category>().unwrap(), Category::Electronics);
        assert_eq!("home".parse::<Category>().unwrap(), Category::Home);
        assert!("vehicles".parse::<Category>().is_err());
    }

    #[test]
    fn test_category_serializes_lowercase() {
        assert_eq!(serde_json::to_value(Category::Books).unwrap(), "books");
    }

    #[test]
    fn test_listing_validation() {
        assert!(listing().validate().is_ok());

        let mut blank = listing();
        blank.condition = "  ".to_string();
        assert!(matches!(blank.validate(), Err(ProductError::MissingField("condition"))));

        let mut free = listing();
        free.price = 0;
        assert!(matches!(free.validate(), Err(ProductError::InvalidPrice)));
    }
}
