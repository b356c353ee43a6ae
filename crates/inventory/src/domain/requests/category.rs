use crate::domain::requests::product::{default_page, default_page_size};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema, IntoParams, PartialEq)]
pub struct FindAllCategories {
    #[serde(default = "default_page")]
    pub page: i32,

    #[serde(default = "default_page_size")]
    pub page_size: i32,

    #[serde(default)]
    pub search: String,

    /// Only direct children of this category.
    #[serde(default)]
    pub parent_id: Option<i32>,

    #[serde(default)]
    pub is_active: Option<bool>,
}

impl Default for FindAllCategories {
    fn default() -> Self {
        Self {
            page: default_page(),
            page_size: default_page_size(),
            search: String::new(),
            parent_id: None,
            is_active: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema, PartialEq)]
pub struct CreateCategoryRequest {
    #[validate(length(min = 1, max = 100, message = "Name is required (max 100)"))]
    #[schema(example = "Agricultural produce")]
    pub name: String,

    pub is_active: Option<bool>,

    pub parent_id: Option<i32>,

    pub description: Option<String>,

    /// Labelled base64 payload.
    pub category_image: Option<String>,

    /// Owning company ids.
    #[serde(default)]
    pub companies: Vec<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema, PartialEq)]
pub struct UpdateCategoryRequest {
    pub id: i32,

    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,

    pub is_active: Option<bool>,

    /// New parent. Ignored when `detach_parent` is set.
    pub parent_id: Option<i32>,

    /// Moves the category to the root of the tree.
    #[serde(default)]
    pub detach_parent: bool,

    pub description: Option<String>,

    pub category_image: Option<String>,

    pub companies: Option<Vec<i32>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewCategory {
    pub name: String,
    pub slug: String,
    pub is_active: bool,
    pub parent_id: Option<i32>,
    pub description: Option<String>,
    pub category_image: Option<String>,
    pub companies: Vec<i32>,
}

/// Where a category should sit after an edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentChange {
    Keep,
    MoveTo(i32),
    Detach,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryChanges {
    pub id: i32,
    pub name: Option<String>,
    pub is_active: Option<bool>,
    pub parent: ParentChange,
    pub description: Option<String>,
    pub category_image: Option<String>,
    pub companies: Option<Vec<i32>>,
}
