use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema, PartialEq)]
pub struct Certification {
    pub name: String,
    pub number: i32,
    pub organization: String,
    pub issue_date: NaiveDate,
    pub date_valid: NaiveDate,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, FromRow, ToSchema, PartialEq)]
pub struct AdditionalInformation {
    pub production_capacity: Option<String>,
    pub unit: Option<String>,
    pub time_span: Option<String>,
    pub brand_name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, FromRow, ToSchema, PartialEq)]
pub struct SampleInfo {
    pub maximum_order_quantity: Option<String>,
    pub measure: Option<String>,
    pub sample_price: Option<String>,
    pub brand_name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, FromRow, ToSchema, PartialEq)]
pub struct PaymentMethods {
    pub papss: bool,
    pub peoples_pay: bool,
    pub letter_of_credit: bool,
    pub cash_against_document: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, FromRow, ToSchema, PartialEq)]
pub struct TradingAreas {
    pub domestic: bool,
    pub international: bool,
}

/// Every listing section stored for one product. Sections never filled in
/// are `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductListing {
    pub product_id: i32,
    pub certification: Option<Certification>,
    pub additional_information: Option<AdditionalInformation>,
    pub sample_info: Option<SampleInfo>,
    pub payment_methods: Option<PaymentMethods>,
    pub trading_areas: Option<TradingAreas>,
}
