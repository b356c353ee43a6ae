use crate::model::{AdditionalInformation, Certification, PaymentMethods, SampleInfo, TradingAreas};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

/// Listing metadata for one product. Sections left out are not touched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema, PartialEq)]
pub struct UpsertListingRequest {
    #[validate(custom(function = "validate_certification"))]
    pub certification: Option<Certification>,
    pub additional_information: Option<AdditionalInformation>,
    pub sample_info: Option<SampleInfo>,
    pub payment_methods: Option<PaymentMethods>,
    pub trading_areas: Option<TradingAreas>,
}

fn validate_certification(cert: &Certification) -> Result<(), ValidationError> {
    if cert.name.trim().is_empty() || cert.organization.trim().is_empty() {
        return Err(ValidationError::new("required")
            .with_message("Certification name and organization are required".into()));
    }
    if cert.date_valid < cert.issue_date {
        return Err(ValidationError::new("range")
            .with_message("Certification cannot expire before it is issued".into()));
    }
    Ok(())
}
