//! services/client/src/app/annotate.rs
//!
//! The "tambah pengetahuan" screen: a document rendered verbatim, the marking
//! workflow on top of it and the annotation lists.

use super::appliances;
use super::state::AppContext;
use arsipku_core::annotation::{AnnotationWorkflow, WorkflowError, WorkflowState};
use arsipku_core::domain::{Annotation, ApplianceStatus, Document, Page};
use arsipku_core::listing::ListQuery;
use arsipku_core::ports::{OrEmpty, PortError, PortResult};
use arsipku_core::selection::{selection_offsets, NodeId, RenderTree, TextSelection};
use arsipku_core::store::ModalKind;
use tracing::{debug, error};

pub const CREATE_FAILED: &str = "Gagal membuat anotasi. Silakan coba lagi.";
pub const AUTH_FAILED: &str = "Authentication error. Please log in again.";

/// Everything the annotation screen holds for one document.
#[derive(Debug, Clone)]
pub struct AnnotateSession {
    pub document: Document,
    pub appliance: ApplianceStatus,
    tree: RenderTree,
    container: NodeId,
    selection: Option<TextSelection>,
    workflow: AnnotationWorkflow,
}

impl AnnotateSession {
    pub fn new(document: Document, appliance: ApplianceStatus) -> Self {
        let (tree, container) = RenderTree::from_content(&document.content);
        Self {
            workflow: AnnotationWorkflow::new(document.id),
            document,
            appliance,
            tree,
            container,
            selection: None,
        }
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.document.annotations
    }

    pub fn workflow(&self) -> &AnnotationWorkflow {
        &self.workflow
    }

    pub fn state(&self) -> WorkflowState {
        self.workflow.state()
    }

    pub fn can_annotate(&self) -> bool {
        self.appliance.can_annotate() && self.document.is_annotable
    }

    pub fn start_marking(&mut self) -> bool {
        self.workflow.start_marking()
    }

    pub fn stop_marking(&mut self) -> bool {
        self.selection = None;
        self.workflow.cancel()
    }

    /// The user dragged over characters `start..end` of the rendered content.
    pub fn select(&mut self, start: usize, end: usize) -> bool {
        self.selection = self.tree.select(self.container, start, end);
        let offsets = selection_offsets(&self.tree, self.container, self.selection.as_ref());
        let text = self
            .selection
            .as_ref()
            .map(|s| s.text.clone())
            .unwrap_or_default();
        debug!("Selection {}..{} on document {}", offsets.start, offsets.end, self.document.id);
        self.workflow.selection_changed(&text, offsets)
    }

    /// "Tandai kalimat": open the panel with the current selection.
    pub fn mark_current(&mut self) {
        let offsets = selection_offsets(&self.tree, self.container, self.selection.as_ref());
        let text = self
            .selection
            .as_ref()
            .map(|s| s.text.clone())
            .unwrap_or_default();
        self.workflow.open_panel(&text, offsets);
    }

    pub fn set_description(&mut self, description: &str) -> Result<(), WorkflowError> {
        self.workflow.set_description(description)
    }

    pub fn set_tags(&mut self, tags: &str) -> Result<(), WorkflowError> {
        self.workflow.set_tags(tags)
    }
}

/// Loads the document and the user's verifier standing on it.
pub async fn open(ctx: &AppContext, document_id: i64) -> PortResult<AnnotateSession> {
    let result = ctx
        .with_loading(
            "Memuat dokumen...",
            ctx.api.get_public_document(document_id),
        )
        .await;
    match result {
        Ok(document) => {
            let appliance = appliances::status(ctx, document_id).await;
            Ok(AnnotateSession::new(document, appliance))
        }
        Err(e) => {
            ctx.report(&e, "Gagal memuat dokumen.").await;
            Err(e)
        }
    }
}

/// Sends the draft. On success the annotation list is fetched again in full;
/// on failure the panel stays open with the typed text.
pub async fn submit(ctx: &AppContext, session: &mut AnnotateSession) -> bool {
    let payload = match session.workflow.submit() {
        Ok(payload) => payload,
        Err(e) => {
            ctx.show(ModalKind::Error, e.to_string()).await;
            return false;
        }
    };

    match ctx.api.create_annotation(&payload).await {
        Ok(()) => {
            session.workflow.submit_succeeded();
            session.selection = None;
            refresh(ctx, session).await;
            true
        }
        Err(e) => {
            error!("Error creating annotation: {}", e);
            if e.is_session_expired() {
                session.workflow.submit_failed(AUTH_FAILED);
                ctx.session_expired().await;
                return false;
            }
            let message = submit_error_message(&e);
            session.workflow.submit_failed(&message);
            ctx.show(ModalKind::Error, message).await;
            false
        }
    }
}

fn submit_error_message(err: &PortError) -> String {
    match err {
        PortError::Validation(_) => err.user_message(CREATE_FAILED),
        PortError::Api { message, .. } if message.contains("Authentication") => {
            AUTH_FAILED.to_string()
        }
        other => other.user_message(CREATE_FAILED),
    }
}

/// Re-reads the document so the annotation list reflects the server.
async fn refresh(ctx: &AppContext, session: &mut AnnotateSession) {
    match ctx.api.get_public_document(session.document.id).await {
        Ok(document) => {
            let appliance = session.appliance;
            *session = AnnotateSession::new(document, appliance);
        }
        Err(e) => ctx.report(&e, "Gagal memuat dokumen.").await,
    }
}

/// The annotations list on the dashboard, paginated by the server.
pub async fn my_annotations(ctx: &AppContext, query: &mut ListQuery) -> Vec<Annotation> {
    let request = query.request();
    let result: PortResult<Page<Annotation>> = ctx
        .with_loading("Loading...", ctx.api.list_annotations(&request))
        .await
        .or_empty();
    match result {
        Ok(page) => {
            query.apply_total_pages(page.total_pages);
            page.items
        }
        Err(e) => {
            ctx.report(&e, "Gagal memuat pengetahuan.").await;
            Vec::new()
        }
    }
}
