mod command;
mod query;

pub use self::command::ProductCommandRepository;
pub use self::query::ProductQueryRepository;

pub(crate) const PRODUCT_COLUMNS: &str = "p.product_id, p.name, p.seller_id, p.slug, p.sku, \
    p.description, p.is_active, p.weight, p.cost, p.brochure, p.views, p.unit, \
    p.created_at, p.updated_at";
