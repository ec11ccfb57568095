//! Support tickets. Non-administrators only ever see their own.
use super::{
    RecordService, ServiceResult, acting_user, record_created, record_deleted, record_updated,
    validate,
};
use crate::model::{
    NewSupportTicket, RecordId, SupportTicket, SupportTicketPatch, SupportTicketWrite,
};
use housing_authz::{Action, Actor, EntityKind};

const ENTITY: EntityKind = EntityKind::SupportTicket;

fn check_patch(patch: &SupportTicketPatch) -> ServiceResult<()> {
    if let Some(title) = &patch.title {
        validate::required("title", title, validate::TITLE_MAX)?;
    }
    if let Some(description) = &patch.description {
        validate::required_text("description", description)?;
    }
    Ok(())
}

impl RecordService {
    pub async fn create_support_ticket(
        &self,
        actor: &Actor,
        write: SupportTicketWrite,
    ) -> ServiceResult<SupportTicket> {
        self.authorize(actor, ENTITY, Action::Create)?;
        let user = acting_user(actor)?;
        check_patch(&SupportTicketPatch::from(write.clone()))?;
        let ticket = self
            .store
            .create_support_ticket(NewSupportTicket {
                user,
                title: write.title,
                description: write.description,
                status: write.status,
            })
            .await?;
        record_created(ENTITY);
        Ok(ticket)
    }

    pub async fn list_support_tickets(&self, actor: &Actor) -> ServiceResult<Vec<SupportTicket>> {
        let scope = self.scope_for(actor, ENTITY, Action::Read)?;
        Ok(self.store.list_support_tickets(&scope).await?)
    }

    pub async fn get_support_ticket(
        &self,
        actor: &Actor,
        id: RecordId,
    ) -> ServiceResult<SupportTicket> {
        let scope = self.scope_for(actor, ENTITY, Action::Read)?;
        Ok(self.store.get_support_ticket(id, &scope).await?)
    }

    pub async fn update_support_ticket(
        &self,
        actor: &Actor,
        id: RecordId,
        patch: SupportTicketPatch,
    ) -> ServiceResult<SupportTicket> {
        let scope = self.scope_for(actor, ENTITY, Action::Update)?;
        check_patch(&patch)?;
        let ticket = self
            .store
            .update_support_ticket(id, &scope, patch)
            .await?;
        record_updated(ENTITY);
        Ok(ticket)
    }

    pub async fn delete_support_ticket(&self, actor: &Actor, id: RecordId) -> ServiceResult<()> {
        let scope = self.scope_for(actor, ENTITY, Action::Delete)?;
        self.store.delete_support_ticket(id, &scope).await?;
        record_deleted(ENTITY);
        Ok(())
    }
}
