use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::model::{Category, Company, ProductDocument, ProductImage};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Product {
    pub product_id: i32,
    pub name: String,
    pub seller_id: Option<i32>,
    pub slug: String,
    pub sku: Option<String>,
    pub description: String,
    pub is_active: bool,
    pub weight: Option<String>,
    pub cost: Decimal,
    pub brochure: Option<String>,
    pub views: i32,
    pub unit: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProductView {
    pub view_id: Uuid,
    pub ip: String,
    pub product_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A product together with the related rows its payload is built from.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductDetails {
    pub product: Product,
    pub categories: Vec<Category>,
    pub images: Vec<ProductImage>,
    pub documents: Vec<ProductDocument>,
    pub seller: Option<Company>,
}

impl ProductDetails {
    pub fn bare(product: Product) -> Self {
        Self {
            product,
            categories: Vec::new(),
            images: Vec::new(),
            documents: Vec::new(),
            seller: None,
        }
    }
}
