//! Educational resources. Readable by any signed-in user, written by
//! administrators.
use super::{RecordService, ServiceResult, record_created, record_deleted, record_updated, validate};
use crate::model::{NewResource, RecordId, Resource, ResourcePatch};
use housing_authz::{Action, Actor, EntityKind};

const ENTITY: EntityKind = EntityKind::Resource;

fn check_patch(patch: &ResourcePatch) -> ServiceResult<()> {
    if let Some(title) = &patch.title {
        validate::required("title", title, validate::TITLE_MAX)?;
    }
    if let Some(url) = &patch.url {
        validate::url(url)?;
    }
    if let Some(language) = &patch.language {
        validate::required("language", language, validate::LANGUAGE_MAX)?;
    }
    Ok(())
}

impl RecordService {
    pub async fn create_resource(
        &self,
        actor: &Actor,
        resource: NewResource,
    ) -> ServiceResult<Resource> {
        self.authorize(actor, ENTITY, Action::Create)?;
        check_patch(&ResourcePatch::from(resource.clone()))?;
        let created = self.store.create_resource(resource).await?;
        record_created(ENTITY);
        Ok(created)
    }

    pub async fn list_resources(&self, actor: &Actor) -> ServiceResult<Vec<Resource>> {
        self.authorize(actor, ENTITY, Action::Read)?;
        Ok(self.store.list_resources().await?)
    }

    pub async fn get_resource(&self, actor: &Actor, id: RecordId) -> ServiceResult<Resource> {
        self.authorize(actor, ENTITY, Action::Read)?;
        Ok(self.store.get_resource(id).await?)
    }

    pub async fn update_resource(
        &self,
        actor: &Actor,
        id: RecordId,
        patch: ResourcePatch,
    ) -> ServiceResult<Resource> {
        self.authorize(actor, ENTITY, Action::Update)?;
        check_patch(&patch)?;
        let updated = self.store.update_resource(id, patch).await?;
        record_updated(ENTITY);
        Ok(updated)
    }

    pub async fn delete_resource(&self, actor: &Actor, id: RecordId) -> ServiceResult<()> {
        self.authorize(actor, ENTITY, Action::Delete)?;
        self.store.delete_resource(id).await?;
        record_deleted(ENTITY);
        Ok(())
    }
}
