use crate::{domain::response::media::MediaUrls, model::Category};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct CategoryResponse {
    pub id: i32,
    pub name: String,
    pub slug: String,
    pub is_active: bool,
    pub parent: Option<i32>,
    pub description: String,
    pub category_image: String,
    pub path: String,
    pub depth: i32,
    pub companies: Vec<i32>,
    pub created_at: String,
    pub updated_at: String,
}

impl CategoryResponse {
    pub fn build(category: Category, companies: Vec<i32>, media: &MediaUrls) -> Self {
        Self {
            id: category.category_id,
            category_image: media.absolute_or_empty(category.category_image.as_deref()),
            name: category.name,
            slug: category.slug,
            is_active: category.is_active,
            parent: category.parent_id,
            description: category.description.unwrap_or_default(),
            path: category.path,
            depth: category.depth,
            companies,
            created_at: category.created_at.to_rfc3339(),
            updated_at: category.updated_at.to_rfc3339(),
        }
    }
}
