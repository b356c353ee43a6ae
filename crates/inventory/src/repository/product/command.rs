use crate::{
    abstract_trait::product::repository::ProductCommandRepositoryTrait,
    domain::requests::product::{NewProduct, ProductAttachments, ProductChanges},
    model::Product,
};
use async_trait::async_trait;
use shared::{config::ConnectionPool, errors::RepositoryError};
use sqlx::PgConnection;
use tracing::{error, info};
use uuid::Uuid;

const RETURNING: &str = "RETURNING product_id, name, seller_id, slug, sku, description, \
    is_active, weight, cost, brochure, views, unit, created_at, updated_at";

#[derive(Clone)]
pub struct ProductCommandRepository {
    db: ConnectionPool,
}

impl ProductCommandRepository {
    pub fn new(db: ConnectionPool) -> Self {
        Self { db }
    }
}

/// Writes category links, images and documents for `product_id`.
async fn attach(
    conn: &mut PgConnection,
    product_id: i32,
    attachments: &ProductAttachments,
) -> Result<(), RepositoryError> {
    if let Some(category_ids) = &attachments.category_ids {
        sqlx::query("DELETE FROM product_categories WHERE product_id = $1")
            .bind(product_id)
            .execute(&mut *conn)
            .await?;

        sqlx::query(
            r#"
            INSERT INTO product_categories (product_id, category_id)
            SELECT $1, UNNEST($2::INT[])
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(product_id)
        .bind(category_ids)
        .execute(&mut *conn)
        .await?;
    }

    for path in &attachments.image_paths {
        let image_id: i32 =
            sqlx::query_scalar("INSERT INTO product_images (image) VALUES ($1) RETURNING image_id")
                .bind(path)
                .fetch_one(&mut *conn)
                .await?;

        sqlx::query("INSERT INTO product_image_links (product_id, image_id) VALUES ($1, $2)")
            .bind(product_id)
            .bind(image_id)
            .execute(&mut *conn)
            .await?;
    }

    for document in &attachments.documents {
        let document_id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO product_documents (name, file, date_uploaded)
            VALUES ($1, $2, current_timestamp)
            RETURNING document_id
            "#,
        )
        .bind(&document.name)
        .bind(&document.file)
        .fetch_one(&mut *conn)
        .await?;

        sqlx::query(
            "INSERT INTO product_document_links (product_id, document_id) VALUES ($1, $2)",
        )
        .bind(product_id)
        .bind(document_id)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

#[async_trait]
impl ProductCommandRepositoryTrait for ProductCommandRepository {
    async fn create_product(
        &self,
        product: &NewProduct,
        attachments: &ProductAttachments,
    ) -> Result<Product, RepositoryError> {
        info!("🆕 Creating product: {}", product.name);

        let mut tx = self.db.begin().await.map_err(|e| {
            error!("❌ Failed to begin transaction: {e:?}");
            RepositoryError::from(e)
        })?;

        let sql = format!(
            r#"
            INSERT INTO products
                (name, seller_id, slug, sku, description, is_active, weight, cost, brochure, unit)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            {RETURNING}
            "#
        );

        let created = sqlx::query_as::<_, Product>(&sql)
            .bind(&product.name)
            .bind(product.seller_id)
            .bind(&product.slug)
            .bind(&product.sku)
            .bind(&product.description)
            .bind(product.is_active)
            .bind(&product.weight)
            .bind(product.cost)
            .bind(&product.brochure)
            .bind(&product.unit)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                error!("❌ Failed to insert product: {e:?}");
                RepositoryError::from(e)
            })?;

        attach(&mut tx, created.product_id, attachments).await?;

        tx.commit().await?;

        info!("✅ Product created: {} ({})", created.slug, created.product_id);
        Ok(created)
    }

    async fn update_product(
        &self,
        changes: &ProductChanges,
        attachments: &ProductAttachments,
    ) -> Result<Product, RepositoryError> {
        info!("✏️ Updating product {}", changes.id);

        let mut tx = self.db.begin().await?;

        let sql = format!(
            r#"
            UPDATE products SET
                name = COALESCE($2, name),
                sku = COALESCE($3, sku),
                description = COALESCE($4, description),
                is_active = COALESCE($5, is_active),
                weight = COALESCE($6, weight),
                cost = COALESCE($7, cost),
                brochure = COALESCE($8, brochure),
                unit = COALESCE($9, unit),
                updated_at = current_timestamp
            WHERE product_id = $1
            {RETURNING}
            "#
        );

        let updated = sqlx::query_as::<_, Product>(&sql)
            .bind(changes.id)
            .bind(&changes.name)
            .bind(&changes.sku)
            .bind(&changes.description)
            .bind(changes.is_active)
            .bind(&changes.weight)
            .bind(changes.cost)
            .bind(&changes.brochure)
            .bind(&changes.unit)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| {
                error!("❌ Failed to update product {}: {e:?}", changes.id);
                RepositoryError::from(e)
            })?
            .ok_or(RepositoryError::NotFound)?;

        attach(&mut tx, updated.product_id, attachments).await?;

        tx.commit().await?;

        Ok(updated)
    }

    async fn set_active(&self, id: i32, is_active: bool) -> Result<Product, RepositoryError> {
        info!("🔁 Setting product {id} active={is_active}");

        let sql = format!(
            r#"
            UPDATE products SET is_active = $2, updated_at = current_timestamp
            WHERE product_id = $1
            {RETURNING}
            "#
        );

        sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .bind(is_active)
            .fetch_optional(&self.db)
            .await
            .map_err(|e| {
                error!("❌ Failed to toggle product {id}: {e:?}");
                RepositoryError::from(e)
            })?
            .ok_or(RepositoryError::NotFound)
    }

    async fn record_view(&self, product_id: i32, ip: &str) -> Result<i32, RepositoryError> {
        let mut tx = self.db.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO product_views (view_id, ip, product_id, created_at, updated_at)
            VALUES ($1, $2, $3, current_timestamp, current_timestamp)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(ip)
        .bind(product_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            error!("❌ Failed to record view of product {product_id}: {e:?}");
            RepositoryError::from(e)
        })?;

        let views: i32 = sqlx::query_scalar(
            r#"
            UPDATE products
            SET views = views + 1
            WHERE product_id = $1
            RETURNING views
            "#,
        )
        .bind(product_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(views)
    }
}
