//! Property listings.
use super::{
    RecordService, ServiceResult, acting_user, record_created, record_deleted, record_updated,
    validate,
};
use crate::model::{NewProperty, Property, PropertyPatch, PropertyWrite, RecordId};
use housing_authz::{Action, Actor, EntityKind};

const ENTITY: EntityKind = EntityKind::Property;

fn check_patch(patch: &PropertyPatch) -> ServiceResult<()> {
    if let Some(address) = &patch.address {
        validate::required("address", address, validate::ADDRESS_MAX)?;
    }
    if let Some(city) = &patch.city {
        validate::required("city", city, validate::CITY_MAX)?;
    }
    if let Some(province) = &patch.province {
        validate::required("province", province, validate::PROVINCE_MAX)?;
    }
    Ok(())
}

impl RecordService {
    /// Creates a listing owned by the acting landlord or administrator.
    pub async fn create_property(
        &self,
        actor: &Actor,
        write: PropertyWrite,
    ) -> ServiceResult<Property> {
        self.authorize(actor, ENTITY, Action::Create)?;
        let landlord = acting_user(actor)?;
        check_patch(&PropertyPatch::from(write.clone()))?;
        let property = self
            .store
            .create_property(NewProperty {
                landlord,
                address: write.address,
                city: write.city,
                province: write.province,
                description: write.description,
                rental_price: write.rental_price,
            })
            .await?;
        record_created(ENTITY);
        Ok(property)
    }

    pub async fn list_properties(&self, actor: &Actor) -> ServiceResult<Vec<Property>> {
        self.authorize(actor, ENTITY, Action::Read)?;
        Ok(self.store.list_properties().await?)
    }

    pub async fn get_property(&self, actor: &Actor, id: RecordId) -> ServiceResult<Property> {
        self.authorize(actor, ENTITY, Action::Read)?;
        Ok(self.store.get_property(id).await?)
    }

    pub async fn update_property(
        &self,
        actor: &Actor,
        id: RecordId,
        patch: PropertyPatch,
    ) -> ServiceResult<Property> {
        self.authorize(actor, ENTITY, Action::Update)?;
        check_patch(&patch)?;
        let property = self.store.update_property(id, patch).await?;
        record_updated(ENTITY);
        Ok(property)
    }

    /// Also removes the property's rental agreements.
    pub async fn delete_property(&self, actor: &Actor, id: RecordId) -> ServiceResult<()> {
        self.authorize(actor, ENTITY, Action::Delete)?;
        self.store.delete_property(id).await?;
        record_deleted(ENTITY);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::ServiceError;
    use super::super::test_support::{seed_user, service};
    use super::*;
    use crate::model::{RentalPrice, Role};

    fn listing() -> PropertyWrite {
        PropertyWrite {
            address: "5 Rue Saint-Denis".to_string(),
            city: "Montreal".to_string(),
            province: "QC".to_string(),
            description: "Two bedrooms".to_string(),
            rental_price: "1450.50".parse::<RentalPrice>().expect("price"),
        }
    }

    #[tokio::test]
    async fn landlord_is_stamped_from_actor() {
        let service = service();
        let (landlord, actor) = seed_user(&service, "lucie", Role::Landlord).await;
        let property = service
            .create_property(&actor, listing())
            .await
            .expect("create");
        assert_eq!(property.landlord, landlord.id);
        assert_eq!(property.rental_price.to_string(), "1450.50");
    }

    #[tokio::test]
    async fn tenants_read_but_cannot_write() {
        let service = service();
        let (_, landlord) = seed_user(&service, "lucie", Role::Landlord).await;
        let (_, tenant) = seed_user(&service, "theo", Role::Tenant).await;
        let property = service
            .create_property(&landlord, listing())
            .await
            .expect("create");

        assert_eq!(service.list_properties(&tenant).await.expect("list").len(), 1);
        let err = service
            .create_property(&tenant, listing())
            .await
            .expect_err("tenant create");
        assert!(matches!(err, ServiceError::Forbidden));
        let err = service
            .delete_property(&tenant, property.id)
            .await
            .expect_err("tenant delete");
        assert!(matches!(err, ServiceError::Forbidden));
        let err = service
            .get_property(&Actor::Anonymous, property.id)
            .await
            .expect_err("anonymous read");
        assert!(matches!(err, ServiceError::Unauthorized));
    }

    #[tokio::test]
    async fn blank_city_is_rejected() {
        let service = service();
        let (_, landlord) = seed_user(&service, "lucie", Role::Landlord).await;
        let mut write = listing();
        write.city = "  ".to_string();
        let err = service
            .create_property(&landlord, write)
            .await
            .expect_err("blank city");
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn missing_property_is_not_found() {
        let service = service();
        let (_, admin) = seed_user(&service, "root", Role::Administrator).await;
        let err = service
            .update_property(&admin, 404, PropertyPatch::default())
            .await
            .expect_err("missing");
        assert!(matches!(err, ServiceError::NotFound(_)));
    }
}
