use crate::{
    abstract_trait::product::repository::ProductQueryRepositoryTrait,
    domain::requests::{
        contains_pattern, limit_offset,
        product::{CountProductsQuery, FindAllProducts},
        window_total,
    },
    model::{Category, Company, Product, ProductDetails, ProductDocument, ProductImage},
    repository::product::PRODUCT_COLUMNS,
};
use async_trait::async_trait;
use shared::{config::ConnectionPool, errors::RepositoryError};
use sqlx::FromRow;
use std::collections::HashMap;
use tracing::{error, info};

#[derive(FromRow)]
struct ProductRow {
    #[sqlx(flatten)]
    product: Product,
    total_count: i64,
}

#[derive(FromRow)]
struct LinkedCategory {
    product_id: i32,
    #[sqlx(flatten)]
    category: Category,
}

#[derive(FromRow)]
struct LinkedImage {
    product_id: i32,
    #[sqlx(flatten)]
    image: ProductImage,
}

#[derive(FromRow)]
struct LinkedDocument {
    product_id: i32,
    #[sqlx(flatten)]
    document: ProductDocument,
}

/// Active products, `$1` an escaped search pattern, `$2` a category subtree.
const ACTIVE_FILTER: &str = r#"
    p.is_active
    AND (
        $1::TEXT IS NULL OR
        p.name ILIKE $1 ESCAPE '\' OR
        p.description ILIKE $1 ESCAPE '\'
    )
    AND (
        $2::INT IS NULL OR EXISTS (
            SELECT 1
            FROM product_categories pc
            JOIN categories c ON c.category_id = pc.category_id
            JOIN categories root ON root.category_id = $2
            WHERE pc.product_id = p.product_id
            AND c.path LIKE root.path || '%'
        )
    )
"#;

/// Products of seller `$1`, `$2` an escaped search pattern.
const SELLER_FILTER: &str = r#"
    p.seller_id = $1
    AND (
        $2::TEXT IS NULL OR
        p.name ILIKE $2 ESCAPE '\' OR
        p.description ILIKE $2 ESCAPE '\'
    )
"#;

fn split_total(rows: Vec<ProductRow>, offset: i64) -> (Vec<Product>, Option<i64>) {
    let total = window_total(rows.first().map(|r| r.total_count), offset);
    let products = rows.into_iter().map(|r| r.product).collect();
    (products, total)
}

#[derive(Clone)]
pub struct ProductQueryRepository {
    db: ConnectionPool,
}

impl ProductQueryRepository {
    pub fn new(db: ConnectionPool) -> Self {
        Self { db }
    }

    async fn find_one(
        &self,
        column: &str,
        bind: ProductKey<'_>,
    ) -> Result<Option<Product>, RepositoryError> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products p WHERE p.{column} = $1");
        let query = sqlx::query_as::<_, Product>(&sql);
        let query = match bind {
            ProductKey::Id(id) => query.bind(id),
            ProductKey::Slug(slug) => query.bind(slug),
        };

        query.fetch_optional(&self.db).await.map_err(|e| {
            error!("❌ Failed to fetch product by {column}: {e:?}");
            RepositoryError::from(e)
        })
    }
}

enum ProductKey<'a> {
    Id(i32),
    Slug(&'a str),
}

#[async_trait]
impl ProductQueryRepositoryTrait for ProductQueryRepository {
    async fn search(
        &self,
        req: &FindAllProducts,
    ) -> Result<(Vec<Product>, i64), RepositoryError> {
        info!(
            "🔍 Searching products: search={:?} category={:?}",
            req.search, req.category_id
        );

        let (limit, offset) = limit_offset(req.page, req.page_size);

        let pattern = contains_pattern(&req.search);
        let sql = format!(
            r#"
            SELECT {PRODUCT_COLUMNS}, COUNT(*) OVER() AS total_count
            FROM products p
            WHERE {ACTIVE_FILTER}
            ORDER BY p.created_at DESC, p.product_id DESC
            LIMIT $3 OFFSET $4
            "#
        );

        let rows = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(&pattern)
            .bind(req.category_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.db)
            .await
            .map_err(|e| {
                error!("❌ Failed to search products: {e:?}");
                RepositoryError::from(e)
            })?;

        let (products, total) = split_total(rows, offset);
        let total = match total {
            Some(total) => total,
            None => {
                sqlx::query_scalar::<_, i64>(&format!(
                    "SELECT COUNT(*) FROM products p WHERE {ACTIVE_FILTER}"
                ))
                .bind(&pattern)
                .bind(req.category_id)
                .fetch_one(&self.db)
                .await?
            }
        };

        Ok((products, total))
    }

    async fn find_by_seller(
        &self,
        seller_id: i32,
        req: &FindAllProducts,
    ) -> Result<(Vec<Product>, i64), RepositoryError> {
        info!("🏷️ Fetching products of seller {seller_id}");

        let (limit, offset) = limit_offset(req.page, req.page_size);

        let pattern = contains_pattern(&req.search);
        let sql = format!(
            r#"
            SELECT {PRODUCT_COLUMNS}, COUNT(*) OVER() AS total_count
            FROM products p
            WHERE {SELLER_FILTER}
            ORDER BY p.created_at DESC, p.product_id DESC
            LIMIT $3 OFFSET $4
            "#
        );

        let rows = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(seller_id)
            .bind(&pattern)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.db)
            .await
            .map_err(|e| {
                error!("❌ Failed to fetch seller products: {e:?}");
                RepositoryError::from(e)
            })?;

        let (products, total) = split_total(rows, offset);
        let total = match total {
            Some(total) => total,
            None => {
                sqlx::query_scalar::<_, i64>(&format!(
                    "SELECT COUNT(*) FROM products p WHERE {SELLER_FILTER}"
                ))
                .bind(seller_id)
                .bind(&pattern)
                .fetch_one(&self.db)
                .await?
            }
        };

        Ok((products, total))
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Product>, RepositoryError> {
        self.find_one("product_id", ProductKey::Id(id)).await
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Product>, RepositoryError> {
        self.find_one("slug", ProductKey::Slug(slug)).await
    }

    async fn count(&self, req: &CountProductsQuery) -> Result<i64, RepositoryError> {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM products
            WHERE ($1::INT IS NULL OR seller_id = $1)
            AND ($2::BOOLEAN IS NULL OR is_active = $2)
            "#,
        )
        .bind(req.seller_id)
        .bind(req.is_active)
        .fetch_one(&self.db)
        .await
        .map_err(|e| {
            error!("❌ Failed to count products: {e:?}");
            RepositoryError::from(e)
        })
    }

    async fn slug_exists(&self, slug: &str) -> Result<bool, RepositoryError> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM products WHERE slug = $1)")
            .bind(slug)
            .fetch_one(&self.db)
            .await
            .map_err(RepositoryError::from)
    }

    async fn load_details(
        &self,
        products: Vec<Product>,
    ) -> Result<Vec<ProductDetails>, RepositoryError> {
        if products.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i32> = products.iter().map(|p| p.product_id).collect();
        let seller_ids: Vec<i32> = products.iter().filter_map(|p| p.seller_id).collect();

        let categories = sqlx::query_as::<_, LinkedCategory>(
            r#"
            SELECT pc.product_id, c.category_id, c.name, c.slug, c.is_active, c.parent_id,
                   c.description, c.category_image, c.path, c.depth, c.created_at, c.updated_at
            FROM product_categories pc
            JOIN categories c ON c.category_id = pc.category_id
            WHERE pc.product_id = ANY($1)
            ORDER BY c.name
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.db)
        .await?;

        let images = sqlx::query_as::<_, LinkedImage>(
            r#"
            SELECT l.product_id, i.image_id, i.image
            FROM product_image_links l
            JOIN product_images i ON i.image_id = l.image_id
            WHERE l.product_id = ANY($1)
            ORDER BY i.image_id
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.db)
        .await?;

        let documents = sqlx::query_as::<_, LinkedDocument>(
            r#"
            SELECT l.product_id, d.document_id, d.name, d.file, d.date_uploaded
            FROM product_document_links l
            JOIN product_documents d ON d.document_id = l.document_id
            WHERE l.product_id = ANY($1)
            ORDER BY d.document_id
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.db)
        .await?;

        let sellers = sqlx::query_as::<_, Company>(
            "SELECT company_id, user_id, company_name, about FROM companies WHERE company_id = ANY($1)",
        )
        .bind(&seller_ids)
        .fetch_all(&self.db)
        .await?;

        let mut details: Vec<ProductDetails> =
            products.into_iter().map(ProductDetails::bare).collect();
        let index: HashMap<i32, usize> = details
            .iter()
            .enumerate()
            .map(|(i, d)| (d.product.product_id, i))
            .collect();
        let sellers: HashMap<i32, Company> =
            sellers.into_iter().map(|c| (c.company_id, c)).collect();

        for row in categories {
            if let Some(&i) = index.get(&row.product_id) {
                details[i].categories.push(row.category);
            }
        }
        for row in images {
            if let Some(&i) = index.get(&row.product_id) {
                details[i].images.push(row.image);
            }
        }
        for row in documents {
            if let Some(&i) = index.get(&row.product_id) {
                details[i].documents.push(row.document);
            }
        }
        for detail in &mut details {
            detail.seller = detail
                .product
                .seller_id
                .and_then(|id| sellers.get(&id).cloned());
        }

        Ok(details)
    }
}
