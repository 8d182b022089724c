//! services/client/src/app/organizations.rs
//!
//! Creating, editing and deleting organizations.

use super::state::AppContext;
use arsipku_core::domain::{NewOrganization, Organization};
use arsipku_core::members::MemberEditor;
use arsipku_core::ports::OrEmpty;
use arsipku_core::routes::Route;
use arsipku_core::store::{ModalAction, ModalKind};

const BLANK_NAME: &str = "Nama organisasi tidak boleh kosong.";

/// The organizations the user belongs to, one entry per organization.
pub async fn list(ctx: &AppContext) -> Vec<Organization> {
    match ctx.api.list_organizations().await.or_empty() {
        Ok(memberships) => {
            let mut organizations: Vec<Organization> = Vec::new();
            for membership in memberships {
                if !organizations.iter().any(|o| o.id == membership.organization.id) {
                    organizations.push(membership.organization);
                }
            }
            organizations
        }
        Err(e) => {
            ctx.report(&e, "Error fetching organizations.").await;
            Vec::new()
        }
    }
}

pub async fn create(ctx: &AppContext, name: &str, members: &MemberEditor) -> bool {
    let name = name.trim();
    if name.is_empty() {
        ctx.show(ModalKind::Error, BLANK_NAME).await;
        return false;
    }
    let organization = NewOrganization {
        organization_name: name.to_string(),
        members: members.members().to_vec(),
    };
    let result = ctx
        .with_loading("Memproses...", ctx.api.create_organization(&organization))
        .await;
    match result {
        Ok(()) => {
            ctx.show_then(
                ModalKind::Success,
                "Organisasi berhasil dibuat!",
                ModalAction::Navigate(Route::Dashboard.path()),
            )
            .await;
            true
        }
        Err(e) => {
            ctx.report(&e, "Gagal membuat organisasi.").await;
            false
        }
    }
}

/// The update form for one organization: its current name and an editor
/// seeded with the current member emails.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrganizationForm {
    pub id: i64,
    pub name: String,
    pub members: MemberEditor,
}

pub async fn load_for_update(ctx: &AppContext, id: i64) -> Option<OrganizationForm> {
    match ctx.api.organization_members(id).await {
        Ok(memberships) => {
            let name = memberships
                .first()
                .map(|m| m.organization.organization_name.clone())
                .unwrap_or_default();
            let emails = memberships.into_iter().filter_map(|m| m.email).collect();
            Some(OrganizationForm {
                id,
                name,
                members: MemberEditor::with_members(emails),
            })
        }
        Err(e) => {
            ctx.report(&e, "Error fetching organization details.").await;
            None
        }
    }
}

/// Sends the name and the member diff since the form was loaded.
pub async fn update(ctx: &AppContext, form: &OrganizationForm) -> bool {
    if form.name.trim().is_empty() {
        ctx.show(ModalKind::Error, "Pilih organisasi dan masukkan nama organisasi.")
            .await;
        return false;
    }
    let update = form.members.to_update(&form.name);
    let result = ctx
        .with_loading("Memproses...", ctx.api.update_organization(form.id, &update))
        .await;
    match result {
        Ok(()) => {
            ctx.show_then(
                ModalKind::Success,
                "Organisasi berhasil diperbarui!",
                ModalAction::Navigate(Route::Dashboard.path()),
            )
            .await;
            true
        }
        Err(e) => {
            ctx.report(&e, "Gagal memperbarui organisasi.").await;
            false
        }
    }
}

/// Asks for confirmation; confirming yields `ModalAction::DeleteOrganization`.
pub async fn request_delete(ctx: &AppContext, id: i64) {
    ctx.show_then(
        ModalKind::Confirm,
        "Apakah Anda yakin ingin menghapus organisasi ini?",
        ModalAction::DeleteOrganization(id),
    )
    .await;
}

pub async fn delete(ctx: &AppContext, id: i64) -> bool {
    match ctx.api.delete_organization(id).await {
        Ok(()) => {
            ctx.show_then(
                ModalKind::Success,
                "Organisasi berhasil dihapus!",
                ModalAction::Navigate(Route::Dashboard.path()),
            )
            .await;
            true
        }
        Err(e) => {
            ctx.report(&e, "Gagal menghapus organisasi.").await;
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::MemoryTokenStore;
    use crate::app::testing::StubApi;
    use arsipku_core::domain::OrganizationMembership;
    use std::sync::Arc;

    fn membership(org_id: i64, email: &str) -> OrganizationMembership {
        OrganizationMembership {
            user_id: None,
            email: Some(email.to_string()),
            organization_owner: false,
            organization: Organization {
                id: org_id,
                organization_name: format!("Org {org_id}"),
                public_visibility: false,
            },
        }
    }

    fn context(api: StubApi) -> (Arc<StubApi>, AppContext) {
        let api = Arc::new(api);
        let ctx = AppContext::new(api.clone(), Arc::new(MemoryTokenStore::with_token("t")), 10);
        (api, ctx)
    }

    #[tokio::test]
    async fn blank_name_is_rejected() {
        let (api, ctx) = context(StubApi::default());
        assert!(!create(&ctx, "  ", &MemberEditor::default()).await);
        assert_eq!(api.called("create_organization"), 0);
        assert_eq!(ctx.state().await.modal.message, BLANK_NAME);
    }

    #[tokio::test]
    async fn list_collapses_memberships() {
        let (_, ctx) = context(StubApi {
            memberships: Ok(vec![membership(1, "a@x.id"), membership(1, "b@x.id"), membership(2, "a@x.id")]),
            ..StubApi::default()
        });
        let ids: Vec<i64> = list(&ctx).await.iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[tokio::test]
    async fn update_sends_member_diff() {
        let (api, ctx) = context(StubApi {
            memberships: Ok(vec![membership(3, "a@x.id"), membership(3, "b@x.id")]),
            ..StubApi::default()
        });
        let mut form = load_for_update(&ctx, 3).await.unwrap();
        assert_eq!(form.name, "Org 3");
        form.members.remove("a@x.id");
        form.members.add("c@x.id");
        form.name = "Arsip Desa".into();

        assert!(update(&ctx, &form).await);
        let sent = api.sent_updates.lock().unwrap();
        assert_eq!(sent[0].organization_name, "Arsip Desa");
        assert_eq!(sent[0].add_member, vec!["c@x.id"]);
        assert_eq!(sent[0].remove_member, vec!["a@x.id"]);
    }

    #[tokio::test]
    async fn delete_needs_confirmation() {
        let (api, ctx) = context(StubApi::default());
        request_delete(&ctx, 3).await;
        assert_eq!(api.called("delete_organization"), 0);
        assert_eq!(
            ctx.confirm_modal().await,
            Some(ModalAction::DeleteOrganization(3))
        );
        assert!(delete(&ctx, 3).await);
        assert_eq!(ctx.state().await.modal.message, "Organisasi berhasil dihapus!");
    }
}
