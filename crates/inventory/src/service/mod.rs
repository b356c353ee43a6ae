mod category;
mod currency;
mod listing;
mod product;

pub use self::category::CategoryService;
pub use self::currency::CurrencyService;
pub use self::listing::ListingService;
pub use self::product::{ProductCommandService, ProductQueryService};

pub(crate) use self::product::{ProductPresenter, SellerGuard};
