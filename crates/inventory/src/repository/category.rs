use crate::{
    abstract_trait::category::CategoryRepositoryTrait,
    domain::{
        category_path::{ancestry, can_reparent, child_path, depth_of, rebase, sort_tree},
        requests::{
            category::{CategoryChanges, FindAllCategories, NewCategory, ParentChange},
            contains_pattern, page_slice,
        },
    },
    model::Category,
};
use async_trait::async_trait;
use shared::{config::ConnectionPool, errors::RepositoryError};
use sqlx::PgConnection;
use std::collections::{BTreeSet, HashMap};
use tracing::{error, info};

const CATEGORY_COLUMNS: &str = "category_id, name, slug, is_active, parent_id, description, \
    category_image, path, depth, created_at, updated_at";

#[derive(Clone)]
pub struct CategoryRepository {
    db: ConnectionPool,
}

impl CategoryRepository {
    pub fn new(db: ConnectionPool) -> Self {
        Self { db }
    }
}

async fn lock_category(
    conn: &mut PgConnection,
    id: i32,
) -> Result<Option<Category>, RepositoryError> {
    let sql = format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE category_id = $1 FOR UPDATE");
    let category = sqlx::query_as::<_, Category>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(category)
}

async fn replace_companies(
    conn: &mut PgConnection,
    category_id: i32,
    companies: &[i32],
) -> Result<(), RepositoryError> {
    sqlx::query("DELETE FROM category_companies WHERE category_id = $1")
        .bind(category_id)
        .execute(&mut *conn)
        .await?;

    sqlx::query(
        r#"
        INSERT INTO category_companies (category_id, company_id)
        SELECT $1, UNNEST($2::INT[])
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(category_id)
    .bind(companies)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

#[async_trait]
impl CategoryRepositoryTrait for CategoryRepository {
    async fn find_all(
        &self,
        req: &FindAllCategories,
    ) -> Result<(Vec<Category>, i64), RepositoryError> {
        info!("🔍 Fetching categories with search: {:?}", req.search);

        let sql = format!(
            r#"
            SELECT {CATEGORY_COLUMNS}
            FROM categories
            WHERE ($1::TEXT IS NULL OR name ILIKE $1 ESCAPE '\')
            AND ($2::INT IS NULL OR parent_id = $2)
            AND ($3::BOOLEAN IS NULL OR is_active = $3)
            "#
        );

        let mut categories = sqlx::query_as::<_, Category>(&sql)
            .bind(contains_pattern(&req.search))
            .bind(req.parent_id)
            .bind(req.is_active)
            .fetch_all(&self.db)
            .await
            .map_err(|e| {
                error!("❌ Failed to fetch categories: {e:?}");
                RepositoryError::from(e)
            })?;

        let ancestors: Vec<i32> = categories
            .iter()
            .flat_map(|c| ancestry(&c.path))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let names: HashMap<i32, String> = sqlx::query_as::<_, (i32, String)>(
            "SELECT category_id, name FROM categories WHERE category_id = ANY($1)",
        )
        .bind(&ancestors)
        .fetch_all(&self.db)
        .await?
        .into_iter()
        .collect();

        sort_tree(&mut categories, &names);

        Ok(page_slice(categories, req.page, req.page_size))
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Category>, RepositoryError> {
        let sql = format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE category_id = $1");
        sqlx::query_as::<_, Category>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await
            .map_err(RepositoryError::from)
    }

    async fn find_existing_ids(&self, ids: &[i32]) -> Result<Vec<i32>, RepositoryError> {
        sqlx::query_scalar::<_, i32>(
            "SELECT category_id FROM categories WHERE category_id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(&self.db)
        .await
        .map_err(RepositoryError::from)
    }

    async fn slug_exists(&self, slug: &str) -> Result<bool, RepositoryError> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM categories WHERE slug = $1)")
            .bind(slug)
            .fetch_one(&self.db)
            .await
            .map_err(RepositoryError::from)
    }

    async fn create(&self, category: &NewCategory) -> Result<Category, RepositoryError> {
        info!("🆕 Creating category: {}", category.name);

        let mut tx = self.db.begin().await?;

        let parent_path = match category.parent_id {
            Some(parent_id) => Some(
                lock_category(&mut tx, parent_id)
                    .await?
                    .ok_or_else(|| {
                        RepositoryError::Custom(format!("parent category {parent_id} does not exist"))
                    })?
                    .path,
            ),
            None => None,
        };

        let id: i32 =
            sqlx::query_scalar("SELECT nextval(pg_get_serial_sequence('categories', 'category_id'))::INT")
                .fetch_one(&mut *tx)
                .await?;
        let path = child_path(parent_path.as_deref(), id);

        let sql = format!(
            r#"
            INSERT INTO categories
                (category_id, name, slug, is_active, parent_id, description, category_image, path, depth)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {CATEGORY_COLUMNS}
            "#
        );

        let created = sqlx::query_as::<_, Category>(&sql)
            .bind(id)
            .bind(&category.name)
            .bind(&category.slug)
            .bind(category.is_active)
            .bind(category.parent_id)
            .bind(&category.description)
            .bind(&category.category_image)
            .bind(&path)
            .bind(depth_of(&path))
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                error!("❌ Failed to insert category: {e:?}");
                RepositoryError::from(e)
            })?;

        if !category.companies.is_empty() {
            replace_companies(&mut tx, id, &category.companies).await?;
        }

        tx.commit().await?;

        info!("✅ Category created at {}", created.path);
        Ok(created)
    }

    async fn update(&self, changes: &CategoryChanges) -> Result<Category, RepositoryError> {
        info!("✏️ Updating category {}", changes.id);

        let mut tx = self.db.begin().await?;

        let current = lock_category(&mut tx, changes.id)
            .await?
            .ok_or(RepositoryError::NotFound)?;

        let (parent_id, path) = match changes.parent {
            ParentChange::Keep => (current.parent_id, current.path.clone()),
            ParentChange::Detach => (None, child_path(None, current.category_id)),
            ParentChange::MoveTo(parent_id) => {
                let parent = lock_category(&mut tx, parent_id).await?.ok_or_else(|| {
                    RepositoryError::Custom(format!("parent category {parent_id} does not exist"))
                })?;
                if !can_reparent(current.category_id, parent_id, &parent.path) {
                    return Err(RepositoryError::Custom(
                        "a category cannot be moved under itself or its descendants".into(),
                    ));
                }
                (Some(parent_id), child_path(Some(&parent.path), current.category_id))
            }
        };

        let sql = format!(
            r#"
            UPDATE categories SET
                name = COALESCE($2, name),
                is_active = COALESCE($3, is_active),
                description = COALESCE($4, description),
                category_image = COALESCE($5, category_image),
                parent_id = $6,
                path = $7,
                depth = $8,
                updated_at = current_timestamp
            WHERE category_id = $1
            RETURNING {CATEGORY_COLUMNS}
            "#
        );

        let updated = sqlx::query_as::<_, Category>(&sql)
            .bind(changes.id)
            .bind(&changes.name)
            .bind(changes.is_active)
            .bind(&changes.description)
            .bind(&changes.category_image)
            .bind(parent_id)
            .bind(&path)
            .bind(depth_of(&path))
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                error!("❌ Failed to update category {}: {e:?}", changes.id);
                RepositoryError::from(e)
            })?;

        if path != current.path {
            let descendants: Vec<(i32, String)> = sqlx::query_as(
                "SELECT category_id, path FROM categories WHERE path LIKE $1 || '%' AND category_id <> $2",
            )
            .bind(&current.path)
            .bind(current.category_id)
            .fetch_all(&mut *tx)
            .await?;

            info!("🌳 Moving {} descendants to {path}", descendants.len());

            for (id, old_path) in descendants {
                if let Some(new_path) = rebase(&old_path, &current.path, &path) {
                    sqlx::query("UPDATE categories SET path = $2, depth = $3 WHERE category_id = $1")
                        .bind(id)
                        .bind(&new_path)
                        .bind(depth_of(&new_path))
                        .execute(&mut *tx)
                        .await?;
                }
            }
        }

        if let Some(companies) = &changes.companies {
            replace_companies(&mut tx, changes.id, companies).await?;
        }

        tx.commit().await?;

        Ok(updated)
    }

    async fn delete(&self, id: i32) -> Result<(), RepositoryError> {
        info!("🗑️ Deleting category {id}");

        let deleted = sqlx::query("DELETE FROM categories WHERE category_id = $1")
            .bind(id)
            .execute(&self.db)
            .await
            .map_err(|e| match RepositoryError::from(e) {
                RepositoryError::ForeignKey(_) => {
                    RepositoryError::Conflict("category still has subcategories".into())
                }
                other => {
                    error!("❌ Failed to delete category {id}: {other:?}");
                    other
                }
            })?;

        if deleted.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn companies_of(
        &self,
        category_ids: &[i32],
    ) -> Result<HashMap<i32, Vec<i32>>, RepositoryError> {
        let links: Vec<(i32, i32)> = sqlx::query_as(
            r#"
            SELECT category_id, company_id
            FROM category_companies
            WHERE category_id = ANY($1)
            ORDER BY company_id
            "#,
        )
        .bind(category_ids)
        .fetch_all(&self.db)
        .await?;

        let mut map: HashMap<i32, Vec<i32>> = HashMap::new();
        for (category_id, company_id) in links {
            map.entry(category_id).or_default().push(company_id);
        }
        Ok(map)
    }
}
