use crate::model::{
    AdditionalInformation, Certification, PaymentMethods, ProductListing, SampleInfo,
    TradingAreas,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct ListingResponse {
    pub product_id: i32,
    pub certification: Option<Certification>,
    pub additional_information: Option<AdditionalInformation>,
    pub sample_info: Option<SampleInfo>,
    pub payment_methods: Option<PaymentMethods>,
    pub trading_areas: Option<TradingAreas>,
}

impl From<ProductListing> for ListingResponse {
    fn from(value: ProductListing) -> Self {
        Self {
            product_id: value.product_id,
            certification: value.certification,
            additional_information: value.additional_information,
            sample_info: value.sample_info,
            payment_methods: value.payment_methods,
            trading_areas: value.trading_areas,
        }
    }
}
