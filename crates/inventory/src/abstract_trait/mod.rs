pub mod category;
pub mod company;
pub mod currency;
pub mod listing;
pub mod product;
pub mod storage;
