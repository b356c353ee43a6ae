//! Repository queries against a real Postgres.
//!
//! Ignored by default; run with `DATABASE_URL` pointing at a server where the
//! test user may create databases: `cargo test -p inventory -- --ignored`.

use inventory::{
    abstract_trait::{
        category::CategoryRepositoryTrait,
        product::repository::{ProductCommandRepositoryTrait, ProductQueryRepositoryTrait},
    },
    domain::requests::{
        category::{FindAllCategories, NewCategory},
        product::{FindAllProducts, NewProduct, ProductAttachments},
    },
    repository::{CategoryRepository, ProductCommandRepository, ProductQueryRepository},
};
use rust_decimal::Decimal;
use sqlx::PgPool;

fn new_category(name: &str, parent_id: Option<i32>) -> NewCategory {
    NewCategory {
        name: name.into(),
        slug: name.to_lowercase(),
        is_active: true,
        parent_id,
        description: None,
        category_image: None,
        companies: vec![],
    }
}

fn new_product(name: &str, slug: &str) -> NewProduct {
    NewProduct {
        name: name.into(),
        seller_id: None,
        slug: slug.into(),
        sku: None,
        description: "Bulk lot".into(),
        is_active: true,
        weight: None,
        cost: Decimal::ZERO,
        brochure: None,
        unit: None,
    }
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "needs DATABASE_URL"]
async fn categories_come_back_depth_first_by_name(pool: PgPool) {
    let repo = CategoryRepository::new(pool);

    let zinc = repo.create(&new_category("Zinc", None)).await.unwrap();
    repo.create(&new_category("Apples", None)).await.unwrap();
    repo.create(&new_category("Yams", Some(zinc.category_id)))
        .await
        .unwrap();
    repo.create(&new_category("Alloys", Some(zinc.category_id)))
        .await
        .unwrap();
    repo.create(&new_category("Bananas", None)).await.unwrap();

    let (categories, total) = repo.find_all(&FindAllCategories::default()).await.unwrap();

    let names: Vec<&str> = categories.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Apples", "Bananas", "Zinc", "Alloys", "Yams"]);
    assert_eq!(total, 5);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "needs DATABASE_URL"]
async fn pages_past_the_end_still_report_the_total(pool: PgPool) {
    let categories = CategoryRepository::new(pool.clone());
    for name in ["Cocoa", "Coffee", "Cotton"] {
        categories.create(&new_category(name, None)).await.unwrap();
    }

    let (page, total) = categories
        .find_all(&FindAllCategories {
            page: 5,
            ..FindAllCategories::default()
        })
        .await
        .unwrap();
    assert!(page.is_empty());
    assert_eq!(total, 3);

    let command = ProductCommandRepository::new(pool.clone());
    for slug in ["kola", "shea", "sesame"] {
        command
            .create_product(&new_product(slug, slug), &ProductAttachments::default())
            .await
            .unwrap();
    }

    let (products, total) = ProductQueryRepository::new(pool)
        .search(&FindAllProducts {
            page: 3,
            page_size: 5,
            ..FindAllProducts::default()
        })
        .await
        .unwrap();
    assert!(products.is_empty());
    assert_eq!(total, 3);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "needs DATABASE_URL"]
async fn search_treats_wildcards_literally(pool: PgPool) {
    let command = ProductCommandRepository::new(pool.clone());
    command
        .create_product(&new_product("100% arabica", "pure"), &ProductAttachments::default())
        .await
        .unwrap();
    command
        .create_product(&new_product("1000 bags arabica", "bags"), &ProductAttachments::default())
        .await
        .unwrap();

    let (products, total) = ProductQueryRepository::new(pool)
        .search(&FindAllProducts {
            search: "100%".into(),
            ..FindAllProducts::default()
        })
        .await
        .unwrap();

    assert_eq!(total, 1);
    assert_eq!(products[0].slug, "pure");
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "needs DATABASE_URL"]
async fn every_view_increments_the_counter(pool: PgPool) {
    let command = ProductCommandRepository::new(pool);
    let product = command
        .create_product(&new_product("Kola nuts", "kola-nuts"), &ProductAttachments::default())
        .await
        .unwrap();

    let (first, second) = tokio::join!(
        command.record_view(product.product_id, "203.0.113.7"),
        command.record_view(product.product_id, "203.0.113.8"),
    );
    let mut counts = vec![first.unwrap(), second.unwrap()];
    counts.sort();

    assert_eq!(counts, vec![1, 2]);
}
