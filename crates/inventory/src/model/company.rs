use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Company {
    pub company_id: i32,
    pub user_id: i64,
    pub company_name: String,
    pub about: Option<String>,
}
