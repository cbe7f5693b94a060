//! Product catalog types.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use greencart_core::{ProductId, money};

/// The fixed set of store categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Electronics,
    Clothing,
    Books,
    Home,
}

impl Category {
    /// All categories, in display order.
    pub const ALL: [Self; 4] = [Self::Electronics, Self::Clothing, Self::Books, Self::Home];

    /// Lowercase label as used in filters and search.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Electronics => "electronics",
            Self::Clothing => "clothing",
            Self::Books => "books",
            Self::Home => "home",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "electronics" => Ok(Self::Electronics),
            "clothing" => Ok(Self::Clothing),
            "books" => Ok(Self::Books),
            "home" => Ok(Self::Home),
            _ => Err(format!("invalid category: {s}")),
        }
    }
}

/// A catalog product.
///
/// `original_price`, when present, is the pre-discount price and must be
/// at least `price`; the catalog rejects records violating that.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_price: Option<Decimal>,
    pub category: Category,
    pub image: String,
    /// Average review rating, 0 to 5.
    pub rating: f32,
    /// Number of reviews behind the rating.
    pub reviews: u32,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specifications: Option<BTreeMap<String, String>>,
    /// Size variants where applicable (apparel); `None` for single-variant
    /// products.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sizes: Option<Vec<String>>,
    pub in_stock: bool,
}

impl Product {
    /// Whether the product is displayed with a discount badge.
    #[must_use]
    pub fn is_discounted(&self) -> bool {
        self.original_price.is_some_and(|original| original > self.price)
    }

    /// Discount against the original price, as a whole percentage.
    #[must_use]
    pub fn discount_percent(&self) -> u32 {
        self.original_price
            .map_or(0, |original| money::discount_percent(original, self.price))
    }

    /// Whether the pricing invariant (`original_price >= price`) holds.
    #[must_use]
    pub fn pricing_is_valid(&self) -> bool {
        self.original_price.is_none_or(|original| original >= self.price)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product(price: &str, original: Option<&str>) -> Product {
        Product {
            id: ProductId::new(1),
            name: "Widget".to_owned(),
            price: price.parse().unwrap(),
            original_price: original.map(|p| p.parse().unwrap()),
            category: Category::Electronics,
            image: "widget.jpg".to_owned(),
            rating: 4.5,
            reviews: 10,
            description: "A widget".to_owned(),
            specifications: None,
            sizes: None,
            in_stock: true,
        }
    }

    #[test]
    fn test_discount_percent() {
        assert_eq!(product("79.99", Some("99.99")).discount_percent(), 20);
        assert_eq!(product("79.99", None).discount_percent(), 0);
    }

    #[test]
    fn test_pricing_invariant() {
        assert!(product("79.99", Some("99.99")).pricing_is_valid());
        assert!(product("79.99", None).pricing_is_valid());
        assert!(!product("99.99", Some("79.99")).pricing_is_valid());
    }

    #[test]
    fn test_category_roundtrip() {
        for category in Category::ALL {
            let parsed: Category = category.as_str().parse().unwrap();
            assert_eq!(parsed, category);
        }
    }

    #[test]
    fn test_serde_camel_case() {
        let json = serde_json::to_value(product("79.99", Some("99.99"))).unwrap();
        assert!(json.get("originalPrice").is_some());
        assert!(json.get("inStock").is_some());
    }
}
