mod attachment;
mod category;
mod company;
mod currency;
mod listing;
mod product;

pub use self::attachment::{ProductDocument, ProductImage};
pub use self::category::Category;
pub use self::company::Company;
pub use self::currency::{CurrencyRates, TRACKED_CURRENCIES};
pub use self::listing::{
    AdditionalInformation, Certification, PaymentMethods, ProductListing, SampleInfo,
    TradingAreas,
};
pub use self::product::{Product, ProductDetails, ProductView};
