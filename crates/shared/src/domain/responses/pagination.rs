use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, Clone, ToSchema, PartialEq, Eq)]
pub struct Pagination {
    pub page: i32,
    pub page_size: i32,
    pub total_items: i32,
    pub total_pages: i32,
}

impl Pagination {
    /// Builds pagination metadata. An empty result still reports one page.
    pub fn new(page: i32, page_size: i32, total: i64) -> Self {
        let page_size = page_size.max(1);
        let total_pages = if total <= 0 {
            1
        } else {
            ((total - 1) / page_size as i64) + 1
        };

        Self {
            page,
            page_size,
            total_items: total as i32,
            total_pages: total_pages as i32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_total_pages_up() {
        let p = Pagination::new(2, 10, 21);
        assert_eq!(p.total_pages, 3);
        assert_eq!(p.total_items, 21);
    }

    #[test]
    fn empty_result_has_one_page() {
        assert_eq!(Pagination::new(1, 10, 0).total_pages, 1);
    }
}
