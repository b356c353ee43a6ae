use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema, IntoParams, PartialEq)]
pub struct FindAllProducts {
    #[serde(default = "default_page")]
    pub page: i32,

    #[serde(default = "default_page_size")]
    pub page_size: i32,

    /// Matched against name and description.
    #[serde(default)]
    pub search: String,

    /// Restricts results to this category and its descendants.
    #[serde(default)]
    pub category_id: Option<i32>,
}

impl Default for FindAllProducts {
    fn default() -> Self {
        Self {
            page: default_page(),
            page_size: default_page_size(),
            search: String::new(),
            category_id: None,
        }
    }
}

pub(crate) fn default_page() -> i32 {
    1
}

pub(crate) fn default_page_size() -> i32 {
    10
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, IntoParams, PartialEq)]
pub struct CountProductsQuery {
    pub seller_id: Option<i32>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema, PartialEq)]
pub struct DocumentUpload {
    #[validate(length(max = 500, message = "Document name is too long"))]
    pub name: Option<String>,

    /// Labelled base64 payload: `data:<mime>;name=<file>;base64,<data>`.
    #[validate(length(min = 1, message = "Document file is required"))]
    pub file: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema, PartialEq)]
pub struct CreateProductRequest {
    #[validate(length(min = 1, max = 255, message = "Name is required (max 255)"))]
    #[schema(example = "Raw cocoa beans")]
    pub name: String,

    #[validate(length(max = 100, message = "SKU is too long"))]
    pub sku: Option<String>,

    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,

    /// Category ids, not names.
    #[serde(default)]
    pub categories: Vec<i32>,

    pub is_active: Option<bool>,

    #[validate(length(max = 20, message = "Weight is too long"))]
    pub weight: Option<String>,

    #[validate(custom(function = "validate_cost"))]
    #[schema(value_type = Option<String>, example = "1250.00")]
    pub cost: Option<Decimal>,

    pub brochure: Option<String>,

    #[serde(default)]
    pub images: Vec<String>,

    #[serde(default)]
    #[validate(nested)]
    pub documents: Vec<DocumentUpload>,

    #[validate(length(max = 250, message = "Unit is too long"))]
    pub unit: Option<String>,
}

/// Partial update. Absent fields are left unchanged. Images and documents are
/// appended to the existing ones.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema, PartialEq)]
pub struct UpdateProductRequest {
    pub id: i32,

    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: Option<String>,

    #[validate(length(max = 100, message = "SKU is too long"))]
    pub sku: Option<String>,

    #[validate(length(min = 1, message = "Description cannot be empty"))]
    pub description: Option<String>,

    pub categories: Option<Vec<i32>>,

    pub is_active: Option<bool>,

    #[validate(length(max = 20, message = "Weight is too long"))]
    pub weight: Option<String>,

    #[validate(custom(function = "validate_cost"))]
    #[schema(value_type = Option<String>, example = "1250.00")]
    pub cost: Option<Decimal>,

    pub brochure: Option<String>,

    #[serde(default)]
    pub images: Vec<String>,

    #[serde(default)]
    #[validate(nested)]
    pub documents: Vec<DocumentUpload>,

    #[validate(length(max = 250, message = "Unit is too long"))]
    pub unit: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema, PartialEq)]
pub struct ProductIdRequest {
    #[validate(range(min = 1, message = "Product id is required"))]
    pub id: i32,
}

fn validate_cost(cost: &Decimal) -> Result<(), ValidationError> {
    if cost.is_sign_negative() {
        return Err(ValidationError::new("range").with_message("Cost cannot be negative".into()));
    }
    if cost.normalize().scale() > 2 {
        return Err(ValidationError::new("scale")
            .with_message("Cost allows at most 2 decimal places".into()));
    }
    // NUMERIC(20, 2) leaves 18 integer digits.
    if cost.trunc().abs() >= Decimal::from(10_i64.pow(18)) {
        return Err(ValidationError::new("range").with_message("Cost is too large".into()));
    }
    Ok(())
}

/// Rows handed to the repository once uploads are stored.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub seller_id: Option<i32>,
    pub slug: String,
    pub sku: Option<String>,
    pub description: String,
    pub is_active: bool,
    pub weight: Option<String>,
    pub cost: Decimal,
    pub brochure: Option<String>,
    pub unit: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductChanges {
    pub id: i32,
    pub name: Option<String>,
    pub sku: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
    pub weight: Option<String>,
    pub cost: Option<Decimal>,
    pub brochure: Option<String>,
    pub unit: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewDocument {
    pub name: Option<String>,
    pub file: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductAttachments {
    /// `Some` replaces the category links, `None` leaves them alone.
    pub category_ids: Option<Vec<i32>>,
    pub image_paths: Vec<String>,
    pub documents: Vec<NewDocument>,
}
