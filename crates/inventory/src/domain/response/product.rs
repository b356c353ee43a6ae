use crate::{
    domain::response::media::MediaUrls,
    model::{ProductDetails, ProductDocument},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct DocumentResponse {
    pub filename: String,
    pub file: String,
    /// RFC 3339, or empty when the upload time is unknown.
    pub date_uploaded: String,
}

impl DocumentResponse {
    fn from_model(document: &ProductDocument, media: &MediaUrls) -> Self {
        Self {
            filename: document.name.clone().unwrap_or_default(),
            file: media.absolute_or_empty(document.file.as_deref()),
            date_uploaded: document
                .date_uploaded
                .map(|dt| dt.to_rfc3339())
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct ProductResponse {
    pub id: i32,
    pub name: String,
    pub slug: String,
    pub sku: Option<String>,
    pub description: String,
    /// Category names.
    pub categories: Vec<String>,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
    pub weight: Option<String>,
    #[schema(value_type = String, example = "1250.00")]
    pub cost: Decimal,
    pub brochure: String,
    pub images: Vec<String>,
    pub documents: Vec<DocumentResponse>,
    pub views: i32,
    pub unit: Option<String>,
    /// Seller company name, empty when the product has no seller.
    pub seller: String,
    pub about_company: String,
    /// Stored rates for the tracked currencies, without cache metadata.
    pub rates: BTreeMap<String, f64>,
}

impl ProductResponse {
    pub fn build(details: ProductDetails, media: &MediaUrls, rates: &BTreeMap<String, f64>) -> Self {
        let ProductDetails {
            product,
            categories,
            images,
            documents,
            seller,
        } = details;

        let mut cost = product.cost;
        cost.rescale(2);

        Self {
            id: product.product_id,
            name: product.name,
            slug: product.slug,
            sku: product.sku,
            description: product.description,
            categories: categories.into_iter().map(|c| c.name).collect(),
            is_active: product.is_active,
            created_at: product.created_at.to_rfc3339(),
            updated_at: product.updated_at.to_rfc3339(),
            weight: product.weight,
            cost,
            brochure: media.absolute_or_empty(product.brochure.as_deref()),
            images: images
                .iter()
                .filter_map(|img| img.image.as_deref())
                .map(|path| media.absolute(path))
                .collect(),
            documents: documents
                .iter()
                .map(|doc| DocumentResponse::from_model(doc, media))
                .collect(),
            views: product.views,
            unit: product.unit,
            seller: seller
                .as_ref()
                .map(|s| s.company_name.clone())
                .unwrap_or_default(),
            about_company: seller.and_then(|s| s.about).unwrap_or_default(),
            rates: rates.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct ProductCountResponse {
    pub total: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Category, Company, Product, ProductImage};
    use chrono::{TimeZone, Utc};
    use std::str::FromStr;

    fn product() -> Product {
        let at = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
        Product {
            product_id: 7,
            name: "Cashew kernels".into(),
            seller_id: Some(3),
            slug: "cashew-kernels".into(),
            sku: Some("CK-1".into()),
            description: "W320 grade".into(),
            is_active: true,
            weight: Some("25kg".into()),
            cost: Decimal::from_str("1250.5").unwrap(),
            brochure: None,
            views: 4,
            unit: Some("bag".into()),
            created_at: at,
            updated_at: at,
        }
    }

    fn category(id: i32, name: &str) -> Category {
        let at = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        Category {
            category_id: id,
            name: name.into(),
            slug: name.to_lowercase(),
            is_active: true,
            parent_id: None,
            description: None,
            category_image: None,
            path: format!("/{id}/"),
            depth: 0,
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn categories_are_names_even_when_empty() {
        let media = MediaUrls::new("https://cdn.example.com");
        let rates = BTreeMap::new();

        let empty = ProductResponse::build(ProductDetails::bare(product()), &media, &rates);
        assert!(empty.categories.is_empty());

        let mut details = ProductDetails::bare(product());
        details.categories = vec![category(11, "Nuts"), category(12, "Export")];
        let response = ProductResponse::build(details, &media, &rates);
        assert_eq!(response.categories, vec!["Nuts", "Export"]);
    }

    #[test]
    fn flattens_seller_files_and_cost() {
        let media = MediaUrls::new("https://cdn.example.com");
        let rates = BTreeMap::from([("GHS".to_string(), 12.0)]);

        let mut details = ProductDetails::bare(product());
        details.product.brochure = Some("user_main/brochure.pdf".into());
        details.images = vec![ProductImage {
            image_id: 1,
            image: Some("user_main/a.png".into()),
        }];
        details.documents = vec![ProductDocument {
            document_id: 2,
            name: Some("coa.pdf".into()),
            file: Some("user_main/coa.pdf".into()),
            date_uploaded: None,
        }];
        details.seller = Some(Company {
            company_id: 3,
            user_id: 30,
            company_name: "Accra Agro".into(),
            about: None,
        });

        let response = ProductResponse::build(details, &media, &rates);

        assert_eq!(response.brochure, "https://cdn.example.com/media/user_main/brochure.pdf");
        assert_eq!(response.images, vec!["https://cdn.example.com/media/user_main/a.png"]);
        assert_eq!(response.documents[0].filename, "coa.pdf");
        assert_eq!(response.documents[0].date_uploaded, "");
        assert_eq!(response.seller, "Accra Agro");
        assert_eq!(response.about_company, "");
        assert_eq!(response.cost.to_string(), "1250.50");
        assert_eq!(response.rates["GHS"], 12.0);
    }

    #[test]
    fn missing_seller_serializes_as_empty_strings() {
        let media = MediaUrls::new("https://cdn.example.com");
        let response =
            ProductResponse::build(ProductDetails::bare(product()), &media, &BTreeMap::new());

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["seller"], "");
        assert_eq!(json["brochure"], "");
        assert_eq!(json["cost"], "1250.50");
    }
}
