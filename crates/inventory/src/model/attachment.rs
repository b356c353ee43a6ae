use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct ProductImage {
    pub image_id: i32,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct ProductDocument {
    pub document_id: i32,
    pub name: Option<String>,
    pub file: Option<String>,
    pub date_uploaded: Option<DateTime<Utc>>,
}
