//! services/client/src/app/documents.rs
//!
//! Document screens: landing posts, the public archive, the dashboard list,
//! the detail view with related versions, and publishing.

use super::appliances;
use super::state::AppContext;
use arsipku_core::display::{format_published, version_label};
use arsipku_core::domain::{ApplianceStatus, Document, NewDocument, Page, Version, Visibility};
use arsipku_core::listing::{ListFilter, ListQuery};
use arsipku_core::ports::{OrEmpty, PortError, PortResult};
use arsipku_core::routes::Route;
use arsipku_core::store::{Action, ModalAction, ModalKind};
use arsipku_core::tags::dedup_names;
use chrono::Utc;
use tracing::warn;

pub const NO_OTHER_VERSIONS: &str = "Belum ada versi lain.";

/// The public archive answers 400 when a search has no hits.
fn empty_on_bad_request<T: Default>(result: PortResult<T>) -> PortResult<T> {
    match result {
        Err(PortError::Api { status: 400, .. }) => Ok(T::default()),
        other => other.or_empty(),
    }
}

//=========================================================================================
// Lists
//=========================================================================================

/// Fills the posts slice for the landing page.
pub async fn load_landing_posts(ctx: &AppContext) {
    ctx.dispatch(Action::PostsRequested).await;
    match ctx.api.list_public_documents(0, None).await {
        Ok(page) => ctx.dispatch(Action::PostsLoaded(page.items)).await,
        Err(e) => {
            warn!("Failed to load landing posts: {}", e);
            ctx.dispatch(Action::PostsFailed(e.to_string())).await;
        }
    }
}

/// One page of the public archive (`/arsip`), honouring a title search.
pub async fn browse_public(ctx: &AppContext, query: &mut ListQuery) -> Vec<Document> {
    let keyword = match query.filter() {
        ListFilter::Search(term) => Some(term.clone()),
        _ => None,
    };
    let result = ctx
        .with_loading(
            "Memuat arsip...",
            ctx.api.list_public_documents(query.page(), keyword.as_deref()),
        )
        .await;
    take_page(ctx, query, empty_on_bad_request(result), "Gagal memuat arsip.").await
}

/// Runs a search from the navbar: remembers the term and restarts the list.
pub async fn search(ctx: &AppContext, query: &mut ListQuery, term: &str) -> Vec<Document> {
    ctx.dispatch(Action::SetSearchTerm(term.to_string())).await;
    query.set_filter(ListFilter::search(term));
    browse_public(ctx, query).await
}

/// The signed-in user's documents for the dashboard.
pub async fn my_documents(ctx: &AppContext, query: &mut ListQuery) -> Vec<Document> {
    let request = query.request();
    let result = ctx
        .with_loading("Loading...", ctx.api.list_documents(&request))
        .await;
    let mut documents = take_page(ctx, query, result.or_empty(), "Failed to fetch documents").await;
    // The server filters by column and value too; the page is filtered again here.
    documents.retain(|d| query.filter().matches(d));
    documents
}

async fn take_page<T>(
    ctx: &AppContext,
    query: &mut ListQuery,
    result: PortResult<Page<T>>,
    default: &str,
) -> Vec<T> {
    match result {
        Ok(page) => {
            query.apply_total_pages(page.total_pages);
            page.items
        }
        Err(e) => {
            ctx.report(&e, default).await;
            Vec::new()
        }
    }
}

//=========================================================================================
// Detail
//=========================================================================================

/// What the detail screen renders.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentView {
    pub document: Document,
    pub tags: Vec<String>,
    pub published: Option<String>,
    pub version: String,
    pub appliance: ApplianceStatus,
}

pub async fn open_document(ctx: &AppContext, id: i64) -> PortResult<DocumentView> {
    let result = ctx
        .with_loading("Memuat dokumen...", ctx.api.get_public_document(id))
        .await;
    let document = match result {
        Ok(document) => document,
        Err(e) => {
            ctx.report(&e, "Gagal memuat arsip.").await;
            return Err(e);
        }
    };
    let appliance = appliances::status(ctx, id).await;
    Ok(DocumentView {
        tags: dedup_names(document.tags().into_iter().map(|t| t.tag_name)),
        published: document
            .created_at
            .map(|created| format_published(created, Utc::now())),
        version: version_label(document.version, document.subversion),
        appliance,
        document,
    })
}

/// Sibling versions of `document`, oldest first. An empty chain opens an
/// info dialog.
pub async fn related_versions(ctx: &AppContext, document: &Document) -> Vec<Version> {
    let chain = document.reference_document_id.unwrap_or(document.id);
    let mut versions = match ctx.api.related_versions(chain).await.or_empty() {
        Ok(versions) => versions,
        Err(e) => {
            warn!("Failed to fetch related documents: {}", e);
            if e.is_session_expired() {
                ctx.session_expired().await;
            }
            return Vec::new();
        }
    };
    if versions.is_empty() {
        ctx.show(ModalKind::Info, NO_OTHER_VERSIONS).await;
    }
    versions.sort_by_key(|v| (v.version, v.subversion));
    versions
}

//=========================================================================================
// Publishing
//=========================================================================================

/// A new chain starts at version 0.0; a new version of `parent` joins the
/// parent's chain one major version up.
pub fn new_document(
    title: &str,
    content: &str,
    visibility: Visibility,
    parent: Option<&Document>,
) -> NewDocument {
    let (reference_document_id, version) = match parent {
        Some(parent) => (
            Some(parent.reference_document_id.unwrap_or(parent.id)),
            parent.version + 1,
        ),
        None => (None, 0),
    };
    NewDocument {
        title: title.trim().to_string(),
        content: content.to_string(),
        visibility,
        reference_document_id,
        version,
        subversion: 0,
    }
}

pub async fn publish(ctx: &AppContext, document: &NewDocument) -> bool {
    if document.title.is_empty() || document.content.trim().is_empty() {
        ctx.show(ModalKind::Error, "Judul dan isi arsip wajib diisi.")
            .await;
        return false;
    }
    let result = ctx
        .with_loading("Menyimpan arsip...", ctx.api.create_document(document))
        .await;
    match result {
        Ok(()) => {
            ctx.show_then(
                ModalKind::Success,
                "Arsip berhasil dibuat!",
                ModalAction::Navigate(Route::Dashboard.path()),
            )
            .await;
            true
        }
        Err(e) => {
            ctx.report(&e, "Gagal membuat arsip. Silakan coba lagi.").await;
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::MemoryTokenStore;
    use crate::app::testing::{document, StubApi};
    use arsipku_core::error_code::ErrorCode;
    use arsipku_core::store::LoadStatus;
    use std::sync::Arc;

    fn context(api: StubApi) -> AppContext {
        AppContext::new(
            Arc::new(api),
            Arc::new(MemoryTokenStore::with_token("t")),
            10,
        )
    }

    fn version(id: i64, version: i32, subversion: i32) -> Version {
        Version {
            id,
            version,
            subversion,
            title: None,
        }
    }

    #[tokio::test]
    async fn landing_posts_fill_the_slice() {
        let ctx = context(StubApi {
            documents: Ok(Page {
                items: (1..=4).map(|id| document(id, "isi")).collect(),
                total_pages: 1,
            }),
            ..StubApi::default()
        });
        load_landing_posts(&ctx).await;
        let posts = ctx.state().await.posts;
        assert_eq!(posts.status, LoadStatus::Succeeded);
        assert_eq!(posts.latest().len(), 3);
    }

    #[tokio::test]
    async fn dashboard_page_is_filtered_again_locally() {
        let mut verified = document(2, "isi");
        verified.verified_all = true;
        let ctx = context(StubApi {
            documents: Ok(Page {
                items: vec![document(1, "isi"), verified, document(3, "isi")],
                total_pages: 1,
            }),
            ..StubApi::default()
        });
        let mut query = ListQuery::new("createdAt", 10);
        query.set_filter(ListFilter::Verified(true));
        let shown = my_documents(&ctx, &mut query).await;
        assert_eq!(shown.iter().map(|d| d.id).collect::<Vec<_>>(), vec![2]);
    }

    #[tokio::test]
    async fn no_data_is_an_empty_archive() {
        let ctx = context(StubApi {
            documents: Err(PortError::Api {
                status: 400,
                code: Some(ErrorCode::DataNotFound),
                message: "DATA IS NOT FOUND".into(),
            }),
            ..StubApi::default()
        });
        let mut query = ListQuery::new("title", 10);
        assert!(search(&ctx, &mut query, "kopi").await.is_empty());
        let state = ctx.state().await;
        assert!(!state.modal.is_open);
        assert_eq!(state.search.term, "kopi");
    }

    #[tokio::test]
    async fn versions_are_sorted() {
        let ctx = context(StubApi {
            related: Ok(vec![version(3, 2, 0), version(1, 1, 1), version(2, 1, 0)]),
            ..StubApi::default()
        });
        let ids: Vec<i64> = related_versions(&ctx, &document(1, "x"))
            .await
            .iter()
            .map(|v| v.id)
            .collect();
        assert_eq!(ids, vec![2, 1, 3]);
    }

    #[tokio::test]
    async fn empty_chain_shows_info() {
        let ctx = context(StubApi {
            related: Ok(Vec::new()),
            ..StubApi::default()
        });
        assert!(related_versions(&ctx, &document(1, "x")).await.is_empty());
        let modal = ctx.state().await.modal;
        assert_eq!(modal.kind, ModalKind::Info);
        assert_eq!(modal.message, NO_OTHER_VERSIONS);
    }

    #[test]
    fn new_version_joins_the_parent_chain() {
        let mut parent = document(7, "isi");
        parent.reference_document_id = Some(3);
        parent.version = 2;
        let doc = new_document(" Revisi ", "isi baru", Visibility::Private, Some(&parent));
        assert_eq!(doc.title, "Revisi");
        assert_eq!(doc.reference_document_id, Some(3));
        assert_eq!((doc.version, doc.subversion), (3, 0));

        let first = new_document("Baru", "isi", Visibility::Public, None);
        assert_eq!(first.reference_document_id, None);
        assert_eq!(first.version, 0);
    }

    #[tokio::test]
    async fn publish_success_points_to_dashboard() {
        let ctx = context(StubApi::default());
        let doc = new_document("Judul", "isi", Visibility::Organization, None);
        assert!(publish(&ctx, &doc).await);
        assert_eq!(
            ctx.state().await.modal.on_confirm,
            Some(ModalAction::Navigate("/dashboard".into()))
        );
    }

    #[tokio::test]
    async fn blank_documents_are_not_sent() {
        let api = Arc::new(StubApi::default());
        let ctx = AppContext::new(api.clone(), Arc::new(MemoryTokenStore::default()), 10);
        assert!(!publish(&ctx, &new_document("  ", "isi", Visibility::Public, None)).await);
        assert_eq!(api.called("create_document"), 0);
    }
}
