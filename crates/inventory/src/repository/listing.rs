use crate::{
    abstract_trait::listing::ListingRepositoryTrait,
    domain::requests::listing::UpsertListingRequest,
    model::{
        AdditionalInformation, Certification, PaymentMethods, ProductListing, SampleInfo,
        TradingAreas,
    },
};
use async_trait::async_trait;
use shared::{config::ConnectionPool, errors::RepositoryError};
use sqlx::PgConnection;
use tracing::{error, info};

#[derive(Clone)]
pub struct ListingRepository {
    db: ConnectionPool,
}

impl ListingRepository {
    pub fn new(db: ConnectionPool) -> Self {
        Self { db }
    }
}

async fn load(conn: &mut PgConnection, product_id: i32) -> Result<ProductListing, RepositoryError> {
    let certification = sqlx::query_as::<_, Certification>(
        r#"
        SELECT name, number, organization, issue_date, date_valid
        FROM product_certifications WHERE product_id = $1
        "#,
    )
    .bind(product_id)
    .fetch_optional(&mut *conn)
    .await?;

    let additional_information = sqlx::query_as::<_, AdditionalInformation>(
        r#"
        SELECT production_capacity, unit, time_span, brand_name
        FROM product_additional_information WHERE product_id = $1
        "#,
    )
    .bind(product_id)
    .fetch_optional(&mut *conn)
    .await?;

    let sample_info = sqlx::query_as::<_, SampleInfo>(
        r#"
        SELECT maximum_order_quantity, measure, sample_price, brand_name
        FROM product_sample_info WHERE product_id = $1
        "#,
    )
    .bind(product_id)
    .fetch_optional(&mut *conn)
    .await?;

    let payment_methods = sqlx::query_as::<_, PaymentMethods>(
        r#"
        SELECT papss, peoples_pay, letter_of_credit, cash_against_document
        FROM product_payment_methods WHERE product_id = $1
        "#,
    )
    .bind(product_id)
    .fetch_optional(&mut *conn)
    .await?;

    let trading_areas = sqlx::query_as::<_, TradingAreas>(
        "SELECT domestic, international FROM product_trading_areas WHERE product_id = $1",
    )
    .bind(product_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(ProductListing {
        product_id,
        certification,
        additional_information,
        sample_info,
        payment_methods,
        trading_areas,
    })
}

#[async_trait]
impl ListingRepositoryTrait for ListingRepository {
    async fn find(&self, product_id: i32) -> Result<ProductListing, RepositoryError> {
        let mut conn = self.db.acquire().await.map_err(|e| {
            error!("❌ Failed to acquire DB connection: {e:?}");
            RepositoryError::from(e)
        })?;

        load(&mut conn, product_id).await
    }

    async fn upsert(
        &self,
        product_id: i32,
        req: &UpsertListingRequest,
    ) -> Result<ProductListing, RepositoryError> {
        info!("📝 Upserting listing metadata of product {product_id}");

        let mut tx = self.db.begin().await?;

        if let Some(c) = &req.certification {
            sqlx::query(
                r#"
                INSERT INTO product_certifications
                    (product_id, name, number, organization, issue_date, date_valid)
                VALUES ($1, $2, $3, $4, $5, $6)
                ON CONFLICT (product_id) DO UPDATE SET
                    name = EXCLUDED.name,
                    number = EXCLUDED.number,
                    organization = EXCLUDED.organization,
                    issue_date = EXCLUDED.issue_date,
                    date_valid = EXCLUDED.date_valid
                "#,
            )
            .bind(product_id)
            .bind(&c.name)
            .bind(c.number)
            .bind(&c.organization)
            .bind(c.issue_date)
            .bind(c.date_valid)
            .execute(&mut *tx)
            .await?;
        }

        if let Some(a) = &req.additional_information {
            sqlx::query(
                r#"
                INSERT INTO product_additional_information
                    (product_id, production_capacity, unit, time_span, brand_name)
                VALUES ($1, $2, $3, $4, $5)
                ON CONFLICT (product_id) DO UPDATE SET
                    production_capacity = EXCLUDED.production_capacity,
                    unit = EXCLUDED.unit,
                    time_span = EXCLUDED.time_span,
                    brand_name = EXCLUDED.brand_name
                "#,
            )
            .bind(product_id)
            .bind(&a.production_capacity)
            .bind(&a.unit)
            .bind(&a.time_span)
            .bind(&a.brand_name)
            .execute(&mut *tx)
            .await?;
        }

        if let Some(s) = &req.sample_info {
            sqlx::query(
                r#"
                INSERT INTO product_sample_info
                    (product_id, maximum_order_quantity, measure, sample_price, brand_name)
                VALUES ($1, $2, $3, $4, $5)
                ON CONFLICT (product_id) DO UPDATE SET
                    maximum_order_quantity = EXCLUDED.maximum_order_quantity,
                    measure = EXCLUDED.measure,
                    sample_price = EXCLUDED.sample_price,
                    brand_name = EXCLUDED.brand_name
                "#,
            )
            .bind(product_id)
            .bind(&s.maximum_order_quantity)
            .bind(&s.measure)
            .bind(&s.sample_price)
            .bind(&s.brand_name)
            .execute(&mut *tx)
            .await?;
        }

        if let Some(p) = &req.payment_methods {
            sqlx::query(
                r#"
                INSERT INTO product_payment_methods
                    (product_id, papss, peoples_pay, letter_of_credit, cash_against_document)
                VALUES ($1, $2, $3, $4, $5)
                ON CONFLICT (product_id) DO UPDATE SET
                    papss = EXCLUDED.papss,
                    peoples_pay = EXCLUDED.peoples_pay,
                    letter_of_credit = EXCLUDED.letter_of_credit,
                    cash_against_document = EXCLUDED.cash_against_document
                "#,
            )
            .bind(product_id)
            .bind(p.papss)
            .bind(p.peoples_pay)
            .bind(p.letter_of_credit)
            .bind(p.cash_against_document)
            .execute(&mut *tx)
            .await?;
        }

        if let Some(t) = &req.trading_areas {
            sqlx::query(
                r#"
                INSERT INTO product_trading_areas (product_id, domestic, international)
                VALUES ($1, $2, $3)
                ON CONFLICT (product_id) DO UPDATE SET
                    domestic = EXCLUDED.domestic,
                    international = EXCLUDED.international
                "#,
            )
            .bind(product_id)
            .bind(t.domestic)
            .bind(t.international)
            .execute(&mut *tx)
            .await?;
        }

        let listing = load(&mut tx, product_id).await?;

        tx.commit().await?;

        Ok(listing)
    }
}
