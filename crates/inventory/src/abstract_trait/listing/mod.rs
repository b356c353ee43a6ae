mod repository;
mod service;

pub use self::repository::{DynListingRepository, ListingRepositoryTrait};
pub use self::service::{DynListingService, ListingServiceTrait};

#[cfg(test)]
pub use self::repository::MockListingRepositoryTrait;
#[cfg(test)]
pub use self::service::MockListingServiceTrait;
