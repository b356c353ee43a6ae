mod category;
mod company;
mod currency;
mod listing;
mod product;

pub use self::category::CategoryRepository;
pub use self::company::CompanyRepository;
pub use self::currency::CurrencyRatesRepository;
pub use self::listing::ListingRepository;
pub use self::product::{ProductCommandRepository, ProductQueryRepository};
