//! services/client/src/app/appliances.rs
//!
//! Verifier appliances: a user applies to verify a document, the owner accepts
//! or rejects from `/list-appliance`.

use super::state::AppContext;
use arsipku_core::domain::{Appliance, ApplianceStatus};
use arsipku_core::error_code::ErrorPolicy;
use arsipku_core::listing::ListQuery;
use arsipku_core::ports::OrEmpty;
use arsipku_core::routes::Route;
use arsipku_core::store::{ModalAction, ModalKind};
use tracing::{error, warn};

/// The signed-in user's standing on a document. Never fails: any error,
/// including a rejected session, reads as "not a verifier".
pub async fn status(ctx: &AppContext, document_id: i64) -> ApplianceStatus {
    if !ctx.tokens.has_token() {
        return ApplianceStatus::NotApplied;
    }
    match ctx.api.appliance_status(document_id).await {
        Ok(status) => status,
        Err(e) => {
            match e.policy() {
                ErrorPolicy::ShowMessage => {
                    error!("Error fetching appliance status: {}", e)
                }
                _ => warn!("No appliance status for document {}: {}", document_id, e),
            }
            ApplianceStatus::NotApplied
        }
    }
}

pub async fn apply(ctx: &AppContext, document_id: i64) -> bool {
    let result = ctx
        .with_loading("Memproses...", ctx.api.apply_as_verifier(document_id))
        .await;
    match result {
        Ok(()) => {
            ctx.show(
                ModalKind::Success,
                "Permintaan menjadi verifikator telah dikirim.",
            )
            .await;
            true
        }
        Err(e) => {
            ctx.report(&e, "Gagal mengajukan diri sebagai verifikator.")
                .await;
            false
        }
    }
}

/// One page of appliances for documents the user owns.
pub async fn list(ctx: &AppContext, query: &mut ListQuery) -> Vec<Appliance> {
    if !ctx.tokens.has_token() {
        ctx.show_then(
            ModalKind::Error,
            "Authentication token not found. Please log in.",
            ModalAction::Navigate(Route::Login.path()),
        )
        .await;
        return Vec::new();
    }
    let result = ctx
        .with_loading(
            "Memuat data...",
            ctx.api.list_appliances(query.page(), query.page_size()),
        )
        .await
        .or_empty();
    match result {
        Ok(page) => {
            query.apply_total_pages(page.total_pages.max(1));
            page.items
        }
        Err(e) => {
            ctx.report(&e, "Terjadi kesalahan saat mengambil data.").await;
            Vec::new()
        }
    }
}

/// Accepts or rejects `username` as verifier of `document_id`. Confirming
/// the success dialog reloads the list.
pub async fn decide(ctx: &AppContext, document_id: i64, username: &str, accepted: bool) -> bool {
    let result = ctx
        .with_loading(
            "Memproses...",
            ctx.api.decide_appliance(document_id, username, accepted),
        )
        .await;
    match result {
        Ok(()) => {
            ctx.show_then(
                ModalKind::Success,
                format!("Appliance {} updated successfully!", document_id),
                ModalAction::ReloadAppliances,
            )
            .await;
            true
        }
        Err(e) => {
            ctx.report(&e, "Terjadi kesalahan saat memperbarui data.")
                .await;
            false
        }
    }
}
