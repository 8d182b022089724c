//! services/client/src/app/verifier.rs
//!
//! The verifier side: the queue of annotations awaiting review
//! (`/list-verifier`) and the review screen (`/verify-pengetahuan/:id`).

use super::state::AppContext;
use arsipku_core::display::highlight;
use arsipku_core::domain::{AnnotationDetail, Document, Version, VerifierAction};
use arsipku_core::ports::{OrEmpty, PortError};
use arsipku_core::routes::Route;
use arsipku_core::store::{Action, ModalKind};
use tracing::{error, warn};

pub const EMPTY_QUEUE: &str = "Belum ada pengetahuan untuk di verify";

/// The review queue and, when it is empty, the notice shown in its place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Queue {
    pub items: Vec<AnnotationDetail>,
    pub notice: Option<String>,
}

pub async fn queue(ctx: &AppContext) -> Queue {
    let result = ctx
        .with_loading("Memuat data...", ctx.api.verifier_queue())
        .await;
    let items = match result {
        Err(PortError::Api { status: 400, .. }) => Vec::new(),
        other => match other.or_empty() {
            Ok(items) => items,
            Err(e) => {
                ctx.report(&e, "Gagal memuat data verifikasi.").await;
                return Queue::default();
            }
        },
    };
    let notice = items.is_empty().then(|| EMPTY_QUEUE.to_string());
    Queue { items, notice }
}

/// The document content split around the annotated span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Excerpt {
    Highlighted {
        before: String,
        highlighted: String,
        after: String,
    },
    /// Offsets that do not fit the content are shown without a highlight.
    Plain(String),
}

impl Excerpt {
    pub fn new(content: &str, start: usize, end: usize) -> Self {
        match highlight(content, start, end) {
            Some(h) => Excerpt::Highlighted {
                before: h.before.to_string(),
                highlighted: h.highlighted.to_string(),
                after: h.after.to_string(),
            },
            None => Excerpt::Plain(content.to_string()),
        }
    }
}

/// Everything the review screen shows.
#[derive(Debug, Clone, PartialEq)]
pub struct Review {
    pub annotation: AnnotationDetail,
    pub document: Document,
    pub excerpt: Excerpt,
    pub versions: Vec<Version>,
}

pub async fn detail(ctx: &AppContext, annotation_id: i64) -> Option<Review> {
    let loaded = ctx
        .with_loading("Memuat data...", async {
            let annotation = ctx.api.annotation_detail(annotation_id).await?;
            let document = ctx.api.get_public_document(annotation.document_id).await?;
            Ok((annotation, document))
        })
        .await;
    let (annotation, document) = match loaded {
        Ok(pair) => pair,
        Err(e) => {
            ctx.report(&e, "Gagal memuat data.").await;
            return None;
        }
    };

    let chain = document.reference_document_id.unwrap_or(document.id);
    let mut versions = match ctx.api.related_versions(chain).await.or_empty() {
        Ok(versions) => versions,
        Err(e) => {
            warn!("Failed to fetch related documents: {}", e);
            Vec::new()
        }
    };
    versions.sort_by_key(|v| (v.version, v.subversion));

    Some(Review {
        excerpt: Excerpt::new(&document.content, annotation.start_no, annotation.end_no),
        annotation,
        document,
        versions,
    })
}

/// Accepts or rejects an annotation, then returns to the queue.
pub async fn review(ctx: &AppContext, annotation_id: i64, action: VerifierAction) -> bool {
    ctx.show(ModalKind::Loading, "Memproses...").await;
    match ctx.api.review_annotation(annotation_id, action).await {
        Ok(()) => {
            ctx.dispatch(Action::CloseModal).await;
            ctx.navigate(Route::ListVerifier).await;
            true
        }
        Err(PortError::SessionExpired) => {
            ctx.session_expired().await;
            false
        }
        Err(e @ PortError::Api { .. }) => {
            error!("Review of annotation {} failed: {}", annotation_id, e);
            ctx.show(ModalKind::Error, e.user_message("Aksi gagal")).await;
            false
        }
        Err(e) => {
            error!("Review of annotation {} failed: {}", annotation_id, e);
            ctx.show(ModalKind::Error, "Terjadi kesalahan saat memproses.")
                .await;
            false
        }
    }
}
