//! In-memory product catalog.
//!
//! The catalog is a fixed, pre-populated ordered sequence of products.
//! Shoppers only read it; the admin surface mutates the same in-memory
//! sequence directly with no persistence, so catalog edits are lost on
//! restart. That is the documented behavior, not an oversight.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use rust_decimal::Decimal;

use greencart_core::ProductId;

use crate::error::StoreError;
use crate::models::{Category, Product};

/// Price range buckets offered by the product-list filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceBucket {
    /// Up to and including $50.
    UpTo50,
    /// Over $50, up to and including $100.
    From50To100,
    /// Over $100, up to and including $500.
    From100To500,
    /// Over $500.
    Over500,
}

impl PriceBucket {
    fn contains(self, price: Decimal) -> bool {
        let (d50, d100, d500) = (
            Decimal::new(5000, 2),
            Decimal::new(10000, 2),
            Decimal::new(50000, 2),
        );
        match self {
            Self::UpTo50 => price <= d50,
            Self::From50To100 => price > d50 && price <= d100,
            Self::From100To500 => price > d100 && price <= d500,
            Self::Over500 => price > d500,
        }
    }
}

/// Sort order for product listings. All sorts are stable, preserving the
/// catalog's original order for ties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    /// Lexicographic by name.
    #[default]
    Name,
    PriceAscending,
    PriceDescending,
    RatingDescending,
}

/// Active product-list filters, composed category → price → search → sort.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub category: Option<Category>,
    pub price: Option<PriceBucket>,
    pub search: Option<String>,
    pub sort: SortKey,
}

/// The product catalog.
pub struct CatalogProvider {
    products: RwLock<Vec<Product>>,
}

impl CatalogProvider {
    /// A catalog seeded with the store's sample products.
    #[must_use]
    pub fn with_sample_catalog() -> Self {
        Self::new(sample_products())
    }

    /// A catalog holding the given products.
    #[must_use]
    pub fn new(products: Vec<Product>) -> Self {
        Self {
            products: RwLock::new(products),
        }
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Vec<Product>> {
        self.products.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Vec<Product>> {
        self.products
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Products matching `filter`, in catalog order (then sorted).
    #[must_use]
    pub fn list(&self, filter: &ProductFilter) -> Vec<Product> {
        let mut products: Vec<Product> = self.read().clone();

        if let Some(category) = filter.category {
            products.retain(|product| product.category == category);
        }

        if let Some(bucket) = filter.price {
            products.retain(|product| bucket.contains(product.price));
        }

        if let Some(term) = filter.search.as_deref() {
            let term = term.to_lowercase();
            products.retain(|product| matches_search(product, &term));
        }

        match filter.sort {
            SortKey::Name => products.sort_by(|a, b| a.name.cmp(&b.name)),
            SortKey::PriceAscending => products.sort_by(|a, b| a.price.cmp(&b.price)),
            SortKey::PriceDescending => products.sort_by(|a, b| b.price.cmp(&a.price)),
            SortKey::RatingDescending => products.sort_by(|a, b| b.rating.total_cmp(&a.rating)),
        }

        products
    }

    /// Look up a product by ID.
    #[must_use]
    pub fn by_id(&self, id: ProductId) -> Option<Product> {
        self.read().iter().find(|product| product.id == id).cloned()
    }

    /// Case-insensitive substring search over name, description, and
    /// category, in catalog order.
    #[must_use]
    pub fn search(&self, term: &str) -> Vec<Product> {
        let term = term.to_lowercase();
        self.read()
            .iter()
            .filter(|product| matches_search(product, &term))
            .cloned()
            .collect()
    }

    /// All products in a category, in catalog order.
    #[must_use]
    pub fn by_category(&self, category: Category) -> Vec<Product> {
        self.read()
            .iter()
            .filter(|product| product.category == category)
            .cloned()
            .collect()
    }

    /// The top-rated products, for the home page.
    #[must_use]
    pub fn featured(&self, limit: usize) -> Vec<Product> {
        let mut products: Vec<Product> = self.read().clone();
        products.sort_by(|a, b| b.rating.total_cmp(&a.rating));
        products.truncate(limit);
        products
    }

    /// The fixed category list.
    #[must_use]
    pub fn categories(&self) -> Vec<Category> {
        Category::ALL.to_vec()
    }

    // =========================================================================
    // Admin surface (in-memory only; lost on restart)
    // =========================================================================

    /// Add a product, assigning it the next free ID.
    ///
    /// # Errors
    ///
    /// Returns a validation error when the pricing invariant
    /// (`original_price >= price`) does not hold.
    pub fn add_product(&self, mut product: Product) -> Result<Product, StoreError> {
        if !product.pricing_is_valid() {
            return Err(StoreError::Validation(
                "original price must be at least the sale price".to_owned(),
            ));
        }

        let mut products = self.write();
        let next_id = products
            .iter()
            .map(|existing| existing.id.as_i32())
            .max()
            .unwrap_or(0)
            + 1;
        product.id = ProductId::new(next_id);
        products.push(product.clone());
        Ok(product)
    }

    /// Replace an existing product record.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when no product has the given ID, or a
    /// validation error when the pricing invariant does not hold.
    pub fn update_product(&self, product: Product) -> Result<(), StoreError> {
        if !product.pricing_is_valid() {
            return Err(StoreError::Validation(
                "original price must be at least the sale price".to_owned(),
            ));
        }

        let mut products = self.write();
        let slot = products
            .iter_mut()
            .find(|existing| existing.id == product.id)
            .ok_or_else(|| StoreError::NotFound(format!("product {}", product.id)))?;
        *slot = product;
        Ok(())
    }

    /// Remove a product. Returns whether a record was removed.
    pub fn remove_product(&self, id: ProductId) -> bool {
        let mut products = self.write();
        let before = products.len();
        products.retain(|product| product.id != id);
        products.len() != before
    }
}

fn matches_search(product: &Product, lowercase_term: &str) -> bool {
    product.name.to_lowercase().contains(lowercase_term)
        || product.description.to_lowercase().contains(lowercase_term)
        || product.category.as_str().contains(lowercase_term)
}

fn specs(pairs: &[(&str, &str)]) -> Option<BTreeMap<String, String>> {
    Some(
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect(),
    )
}

fn sizes(labels: &[&str]) -> Option<Vec<String>> {
    Some(labels.iter().map(|label| (*label).to_owned()).collect())
}

/// The store's fixed sample catalog.
#[must_use]
#[allow(clippy::too_many_lines)]
pub fn sample_products() -> Vec<Product> {
    vec![
        Product {
            id: ProductId::new(1),
            name: "Wireless Bluetooth Headphones".to_owned(),
            price: Decimal::new(7999, 2),
            original_price: Some(Decimal::new(9999, 2)),
            category: Category::Electronics,
            image: "images/headphones.jpg".to_owned(),
            rating: 4.5,
            reviews: 128,
            description: "High-quality wireless Bluetooth headphones with noise cancellation \
                          and 30-hour battery life."
                .to_owned(),
            specifications: specs(&[
                ("Battery Life", "30 hours"),
                ("Connectivity", "Bluetooth 5.0"),
                ("Weight", "250g"),
                ("Color", "Black"),
            ]),
            sizes: None,
            in_stock: true,
        },
        Product {
            id: ProductId::new(2),
            name: "Premium Cotton T-Shirt".to_owned(),
            price: Decimal::new(2499, 2),
            original_price: Some(Decimal::new(3499, 2)),
            category: Category::Clothing,
            image: "images/tshirt.jpg".to_owned(),
            rating: 4.2,
            reviews: 89,
            description: "Comfortable premium cotton t-shirt available in multiple sizes and \
                          colors."
                .to_owned(),
            specifications: specs(&[
                ("Material", "100% Cotton"),
                ("Fit", "Regular"),
                ("Care", "Machine Washable"),
                ("Origin", "Made in USA"),
            ]),
            sizes: sizes(&["S", "M", "L", "XL"]),
            in_stock: true,
        },
        Product {
            id: ProductId::new(3),
            name: "JavaScript: The Complete Guide".to_owned(),
            price: Decimal::new(3999, 2),
            original_price: Some(Decimal::new(4999, 2)),
            category: Category::Books,
            image: "images/js-book.jpg".to_owned(),
            rating: 4.8,
            reviews: 245,
            description: "Comprehensive guide to JavaScript programming from beginner to \
                          advanced level."
                .to_owned(),
            specifications: specs(&[
                ("Pages", "850"),
                ("Publisher", "Tech Books"),
                ("Language", "English"),
                ("Edition", "2024"),
            ]),
            sizes: None,
            in_stock: true,
        },
        Product {
            id: ProductId::new(4),
            name: "Smart LED Light Bulb".to_owned(),
            price: Decimal::new(1999, 2),
            original_price: Some(Decimal::new(2999, 2)),
            category: Category::Home,
            image: "images/led-bulb.jpg".to_owned(),
            rating: 4.3,
            reviews: 67,
            description: "Smart WiFi-enabled LED light bulb with color changing and dimming \
                          features."
                .to_owned(),
            specifications: specs(&[
                ("Wattage", "9W"),
                ("Brightness", "800 lumens"),
                ("Connectivity", "WiFi"),
                ("Lifespan", "25,000 hours"),
            ]),
            sizes: None,
            in_stock: true,
        },
        Product {
            id: ProductId::new(5),
            name: "Gaming Mechanical Keyboard".to_owned(),
            price: Decimal::new(12999, 2),
            original_price: Some(Decimal::new(15999, 2)),
            category: Category::Electronics,
            image: "images/keyboard.jpg".to_owned(),
            rating: 4.6,
            reviews: 156,
            description: "RGB mechanical gaming keyboard with customizable keys and macro \
                          support."
                .to_owned(),
            specifications: specs(&[
                ("Switch Type", "Cherry MX Blue"),
                ("Backlight", "RGB"),
                ("Connectivity", "USB-C"),
                ("Layout", "Full Size"),
            ]),
            sizes: None,
            in_stock: true,
        },
        Product {
            id: ProductId::new(6),
            name: "Denim Jeans".to_owned(),
            price: Decimal::new(5999, 2),
            original_price: Some(Decimal::new(7999, 2)),
            category: Category::Clothing,
            image: "images/jeans.jpg".to_owned(),
            rating: 4.1,
            reviews: 92,
            description: "Classic fit denim jeans made from premium quality denim fabric."
                .to_owned(),
            specifications: specs(&[
                ("Material", "98% Cotton, 2% Elastane"),
                ("Fit", "Regular"),
                ("Wash", "Dark Blue"),
                ("Origin", "Made in Turkey"),
            ]),
            sizes: sizes(&["28", "30", "32", "34", "36"]),
            in_stock: true,
        },
        Product {
            id: ProductId::new(7),
            name: "Python Programming Cookbook".to_owned(),
            price: Decimal::new(4499, 2),
            original_price: Some(Decimal::new(5499, 2)),
            category: Category::Books,
            image: "images/python-book.jpg".to_owned(),
            rating: 4.7,
            reviews: 189,
            description: "Practical Python programming recipes and solutions for real-world \
                          problems."
                .to_owned(),
            specifications: specs(&[
                ("Pages", "720"),
                ("Publisher", "Code Press"),
                ("Language", "English"),
                ("Edition", "3rd Edition"),
            ]),
            sizes: None,
            in_stock: true,
        },
        Product {
            id: ProductId::new(8),
            name: "Indoor Plant Pot Set".to_owned(),
            price: Decimal::new(3499, 2),
            original_price: Some(Decimal::new(4499, 2)),
            category: Category::Home,
            image: "images/plant-pots.jpg".to_owned(),
            rating: 4.4,
            reviews: 73,
            description: "Set of 3 ceramic plant pots with drainage holes, perfect for indoor \
                          plants."
                .to_owned(),
            specifications: specs(&[
                ("Material", "Ceramic"),
                ("Sizes", "Small, Medium, Large"),
                ("Color", "White"),
                ("Drainage", "Yes"),
            ]),
            sizes: None,
            in_stock: true,
        },
    ]
}
