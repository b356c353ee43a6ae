pub mod category;
pub mod currency;
pub mod listing;
pub mod media;
pub mod product;

pub use shared::domain::responses::{ApiResponse, ApiResponsePagination, Pagination};
