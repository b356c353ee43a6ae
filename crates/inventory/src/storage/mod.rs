mod local;

pub use self::local::LocalFileStorage;

use crate::abstract_trait::storage::DynFileStorage;
use tracing::warn;

/// Directory for product brochures, images and documents.
pub const PRODUCT_FILES: &str = "user_main";
/// Directory for category images.
pub const CATEGORY_FILES: &str = "categories";

/// Best-effort removal of uploads that no row ended up referencing.
pub async fn discard(storage: &DynFileStorage, paths: &[String]) {
    for path in paths {
        if let Err(e) = storage.remove(path).await {
            warn!("⚠️ Could not remove orphaned upload {path}: {e}");
        }
    }
}
