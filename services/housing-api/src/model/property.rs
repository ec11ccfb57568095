//! Property listings.
use crate::model::{RecordId, RentalPrice, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq)]
pub struct Property {
    pub id: RecordId,
    /// Set from the creating actor; never client supplied.
    pub landlord: UserId,
    pub address: String,
    pub city: String,
    pub province: String,
    pub description: String,
    #[schema(value_type = String, example = "1250.00")]
    pub rental_price: RentalPrice,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body for `POST` and `PUT`. There is deliberately no `landlord` field;
/// any such key in the JSON is ignored.
#[derive(Debug, Deserialize, ToSchema, Clone)]
pub struct PropertyWrite {
    pub address: String,
    pub city: String,
    pub province: String,
    #[serde(default)]
    pub description: String,
    #[schema(value_type = String, example = "1250.00")]
    pub rental_price: RentalPrice,
}

#[derive(Debug, Deserialize, ToSchema, Clone, Default)]
pub struct PropertyPatch {
    pub address: Option<String>,
    pub city: Option<String>,
    pub province: Option<String>,
    pub description: Option<String>,
    #[schema(value_type = Option<String>)]
    pub rental_price: Option<RentalPrice>,
}

impl From<PropertyWrite> for PropertyPatch {
    fn from(write: PropertyWrite) -> Self {
        Self {
            address: Some(write.address),
            city: Some(write.city),
            province: Some(write.province),
            description: Some(write.description),
            rental_price: Some(write.rental_price),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewProperty {
    pub landlord: UserId,
    pub address: String,
    pub city: String,
    pub province: String,
    pub description: String,
    pub rental_price: RentalPrice,
}
