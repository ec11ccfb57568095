//! Rental agreements. Landlords see agreements on their own properties and
//! tenants see agreements naming them.
use super::{
    RecordService, ServiceError, ServiceResult, not_owner, record_created, record_deleted,
    record_updated, validate,
};
use crate::model::{
    NewRentalAgreement, RecordId, RentalAgreement, RentalAgreementPatch, RentalAgreementWrite,
};
use crate::store::StoreError;
use housing_authz::{Action, Actor, EntityKind};

const ENTITY: EntityKind = EntityKind::RentalAgreement;

impl RecordService {
    /// With `strict_ownership`, only the property's landlord or an
    /// administrator may write agreements on it.
    async fn check_agreement_owner(
        &self,
        actor: &Actor,
        property: RecordId,
        action: Action,
    ) -> ServiceResult<()> {
        if !self.options.strict_ownership || actor.is_administrator() {
            return Ok(());
        }
        let landlord = match self.store.get_property(property).await {
            Ok(property) => property.landlord,
            Err(StoreError::NotFound(_)) => {
                return Err(ServiceError::Validation(format!(
                    "property: property {property} does not exist"
                )));
            }
            Err(err) => return Err(err.into()),
        };
        if actor.user_id() == Some(landlord) {
            Ok(())
        } else {
            Err(not_owner(ENTITY, action))
        }
    }

    pub async fn create_rental_agreement(
        &self,
        actor: &Actor,
        write: RentalAgreementWrite,
    ) -> ServiceResult<RentalAgreement> {
        self.authorize(actor, ENTITY, Action::Create)?;
        validate::date_order(write.start_date, write.end_date)?;
        self.check_agreement_owner(actor, write.property, Action::Create)
            .await?;
        let agreement = self
            .store
            .create_rental_agreement(NewRentalAgreement::from(write))
            .await?;
        record_created(ENTITY);
        Ok(agreement)
    }

    pub async fn list_rental_agreements(&self, actor: &Actor) -> ServiceResult<Vec<RentalAgreement>> {
        let scope = self.scope_for(actor, ENTITY, Action::Read)?;
        Ok(self.store.list_rental_agreements(&scope).await?)
    }

    pub async fn get_rental_agreement(
        &self,
        actor: &Actor,
        id: RecordId,
    ) -> ServiceResult<RentalAgreement> {
        let scope = self.scope_for(actor, ENTITY, Action::Read)?;
        Ok(self.store.get_rental_agreement(id, &scope).await?)
    }

    pub async fn update_rental_agreement(
        &self,
        actor: &Actor,
        id: RecordId,
        patch: RentalAgreementPatch,
    ) -> ServiceResult<RentalAgreement> {
        let scope = self.scope_for(actor, ENTITY, Action::Update)?;
        let current = self.store.get_rental_agreement(id, &scope).await?;
        self.check_agreement_owner(actor, current.property, Action::Update)
            .await?;
        if let Some(property) = patch.property.filter(|p| *p != current.property) {
            self.check_agreement_owner(actor, property, Action::Update)
                .await?;
        }
        let agreement = self
            .store
            .update_rental_agreement(id, &scope, patch)
            .await?;
        record_updated(ENTITY);
        Ok(agreement)
    }

    pub async fn delete_rental_agreement(&self, actor: &Actor, id: RecordId) -> ServiceResult<()> {
        let scope = self.scope_for(actor, ENTITY, Action::Delete)?;
        if self.options.strict_ownership {
            let current = self.store.get_rental_agreement(id, &scope).await?;
            self.check_agreement_owner(actor, current.property, Action::Delete)
                .await?;
        }
        self.store.delete_rental_agreement(id, &scope).await?;
        record_deleted(ENTITY);
        Ok(())
    }
}
