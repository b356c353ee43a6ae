use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Category {
    pub category_id: i32,
    pub name: String,
    pub slug: String,
    pub is_active: bool,
    pub parent_id: Option<i32>,
    pub description: Option<String>,
    pub category_image: Option<String>,
    /// Materialized ancestor path, e.g. `/1/5/9/` for category 9 under 5 under 1.
    pub path: String,
    pub depth: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
