pub mod category_path;
pub mod requests;
pub mod response;
