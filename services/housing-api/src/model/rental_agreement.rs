//! Rental agreements between a property and a tenant.
use crate::model::{RecordId, UserId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq)]
pub struct RentalAgreement {
    pub id: RecordId,
    pub property: RecordId,
    pub tenant: UserId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub terms_and_conditions: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body for `POST` and `PUT`. The tenant comes from the body.
#[derive(Debug, Deserialize, ToSchema, Clone)]
pub struct RentalAgreementWrite {
    pub property: RecordId,
    pub tenant: UserId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub terms_and_conditions: String,
}

#[derive(Debug, Deserialize, ToSchema, Clone, Default)]
pub struct RentalAgreementPatch {
    pub property: Option<RecordId>,
    pub tenant: Option<UserId>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub terms_and_conditions: Option<String>,
}

impl From<RentalAgreementWrite> for RentalAgreementPatch {
    fn from(write: RentalAgreementWrite) -> Self {
        Self {
            property: Some(write.property),
            tenant: Some(write.tenant),
            start_date: Some(write.start_date),
            end_date: Some(write.end_date),
            terms_and_conditions: Some(write.terms_and_conditions),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewRentalAgreement {
    pub property: RecordId,
    pub tenant: UserId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub terms_and_conditions: String,
}

impl From<RentalAgreementWrite> for NewRentalAgreement {
    fn from(write: RentalAgreementWrite) -> Self {
        Self {
            property: write.property,
            tenant: write.tenant,
            start_date: write.start_date,
            end_date: write.end_date,
            terms_and_conditions: write.terms_and_conditions,
        }
    }
}
