mod command;
mod query;

pub use self::command::{DynProductCommandService, ProductCommandServiceTrait};
pub use self::query::{DynProductQueryService, ProductQueryServiceTrait};

#[cfg(test)]
pub use self::command::MockProductCommandServiceTrait;
#[cfg(test)]
pub use self::query::MockProductQueryServiceTrait;
