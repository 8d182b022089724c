//! crates/arsipku_core/src/annotation.rs
//!
//! The "add knowledge" workflow: marking text in a document, filling in the
//! annotation panel and submitting it.
//!
//! ```text
//! Idle --start_marking--> Marking --selection--> Editing --submit--> Submitting
//!  ^                        |                      |  ^                 |  |
//!  +--------cancel----------+-------cancel---------+  +----failed-------+  |
//!  +------------------------------succeeded--------------------------------+
//! ```

use crate::domain::NewAnnotation;
use crate::selection::SelectionOffsets;
use crate::tags::parse_tag_input;
use serde::{Deserialize, Serialize};

pub const NO_SELECTION_MESSAGE: &str =
    "Tidak ada teks yang dipilih. Tandai teks dalam arsip dengan drag.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkflowState {
    Idle,
    /// Selection changes are being observed.
    Marking,
    /// The annotation panel is open.
    Editing,
    /// The annotation has been sent and the response is pending.
    Submitting,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorkflowError {
    #[error("the annotation panel is not open")]
    NotEditing,
    #[error("{}", NO_SELECTION_MESSAGE)]
    NoSelection,
}

/// The unsaved annotation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationDraft {
    pub selected_text: String,
    pub offsets: SelectionOffsets,
    pub description: String,
    pub tags_input: String,
    /// Last submission error, shown in the panel.
    pub error: Option<String>,
}

impl AnnotationDraft {
    pub fn has_selection(&self) -> bool {
        !self.offsets.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationWorkflow {
    document_id: i64,
    state: WorkflowState,
    draft: AnnotationDraft,
}

impl AnnotationWorkflow {
    pub fn new(document_id: i64) -> Self {
        Self {
            document_id,
            state: WorkflowState::Idle,
            draft: AnnotationDraft::default(),
        }
    }

    pub fn document_id(&self) -> i64 {
        self.document_id
    }

    pub fn state(&self) -> WorkflowState {
        self.state
    }

    pub fn draft(&self) -> &AnnotationDraft {
        &self.draft
    }

    /// "Tandai kalimat": begin observing selections.
    pub fn start_marking(&mut self) -> bool {
        if self.state != WorkflowState::Idle {
            return false;
        }
        self.state = WorkflowState::Marking;
        true
    }

    /// A selection-change event. Collapsed selections are ignored; any other
    /// selection opens the panel (or updates it, keeping typed text).
    pub fn selection_changed(&mut self, selected_text: &str, offsets: SelectionOffsets) -> bool {
        match self.state {
            WorkflowState::Marking | WorkflowState::Editing if !offsets.is_empty() => {
                self.draft.selected_text = selected_text.to_string();
                self.draft.offsets = offsets;
                self.draft.error = None;
                self.state = WorkflowState::Editing;
                true
            }
            _ => false,
        }
    }

    /// Opens the panel with whatever is selected right now, even nothing.
    pub fn open_panel(&mut self, selected_text: &str, offsets: SelectionOffsets) {
        if self.state == WorkflowState::Submitting {
            return;
        }
        if offsets.is_empty() {
            self.draft.selected_text.clear();
            self.draft.offsets = SelectionOffsets::NONE;
        } else {
            self.draft.selected_text = selected_text.to_string();
            self.draft.offsets = offsets;
        }
        self.state = WorkflowState::Editing;
    }

    pub fn set_description(&mut self, description: &str) -> Result<(), WorkflowError> {
        self.require_editing()?;
        self.draft.description = description.to_string();
        Ok(())
    }

    pub fn set_tags(&mut self, tags_input: &str) -> Result<(), WorkflowError> {
        self.require_editing()?;
        self.draft.tags_input = tags_input.to_string();
        Ok(())
    }

    /// Validates the draft and moves to `Submitting`, returning the payload to send.
    pub fn submit(&mut self) -> Result<NewAnnotation, WorkflowError> {
        self.require_editing()?;
        if !self.draft.has_selection() {
            self.draft.error = Some(NO_SELECTION_MESSAGE.to_string());
            return Err(WorkflowError::NoSelection);
        }
        self.draft.error = None;
        self.state = WorkflowState::Submitting;
        Ok(NewAnnotation {
            document_id: self.document_id,
            selected_text: self.draft.selected_text.clone(),
            start_no: self.draft.offsets.start,
            end_no: self.draft.offsets.end,
            description: self.draft.description.clone(),
            tags: parse_tag_input(&self.draft.tags_input),
        })
    }

    /// The server accepted the annotation: clear the draft and stop marking.
    pub fn submit_succeeded(&mut self) {
        if self.state == WorkflowState::Submitting {
            self.reset();
        }
    }

    /// The server rejected the annotation: reopen the panel with the text intact.
    pub fn submit_failed(&mut self, message: &str) {
        if self.state == WorkflowState::Submitting {
            self.draft.error = Some(message.to_string());
            self.state = WorkflowState::Editing;
        }
    }

    /// "Berhenti menandai kalimat": discard the draft. In-flight submissions
    /// cannot be cancelled.
    pub fn cancel(&mut self) -> bool {
        match self.state {
            WorkflowState::Marking | WorkflowState::Editing => {
                self.reset();
                true
            }
            _ => false,
        }
    }

    fn reset(&mut self) {
        self.state = WorkflowState::Idle;
        self.draft = AnnotationDraft::default();
    }

    fn require_editing(&self) -> Result<(), WorkflowError> {
        if self.state == WorkflowState::Editing {
            Ok(())
        } else {
            Err(WorkflowError::NotEditing)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(start: usize, end: usize) -> SelectionOffsets {
        SelectionOffsets { start, end }
    }

    fn editing() -> AnnotationWorkflow {
        let mut wf = AnnotationWorkflow::new(9);
        wf.start_marking();
        assert!(wf.selection_changed("arsip", span(4, 9)));
        wf
    }

    #[test]
    fn happy_path_returns_to_idle() {
        let mut wf = editing();
        assert_eq!(wf.state(), WorkflowState::Editing);
        wf.set_description("Catatan").unwrap();
        wf.set_tags("sejarah, Sejarah, budaya").unwrap();

        let payload = wf.submit().unwrap();
        assert_eq!(wf.state(), WorkflowState::Submitting);
        assert_eq!(payload.document_id, 9);
        assert_eq!((payload.start_no, payload.end_no), (4, 9));
        assert_eq!(payload.selected_text, "arsip");
        assert_eq!(payload.tags, vec!["sejarah", "budaya"]);

        wf.submit_succeeded();
        assert_eq!(wf.state(), WorkflowState::Idle);
        assert_eq!(wf.draft(), &AnnotationDraft::default());
    }

    #[test]
    fn failure_keeps_entered_text() {
        let mut wf = editing();
        wf.set_description("Catatan penting").unwrap();
        wf.submit().unwrap();
        wf.submit_failed("Gagal membuat anotasi. Silakan coba lagi.");
        assert_eq!(wf.state(), WorkflowState::Editing);
        assert_eq!(wf.draft().description, "Catatan penting");
        assert_eq!(wf.draft().selected_text, "arsip");
        assert!(wf.draft().error.is_some());
    }

    #[test]
    fn collapsed_selection_does_not_open_the_panel() {
        let mut wf = AnnotationWorkflow::new(1);
        wf.start_marking();
        assert!(!wf.selection_changed("", SelectionOffsets::NONE));
        assert_eq!(wf.state(), WorkflowState::Marking);
    }

    #[test]
    fn selections_are_ignored_while_idle() {
        let mut wf = AnnotationWorkflow::new(1);
        assert!(!wf.selection_changed("x", span(0, 1)));
        assert_eq!(wf.state(), WorkflowState::Idle);
    }

    #[test]
    fn reselecting_keeps_description() {
        let mut wf = editing();
        wf.set_description("tetap").unwrap();
        assert!(wf.selection_changed("negara", span(10, 16)));
        assert_eq!(wf.draft().description, "tetap");
        assert_eq!(wf.draft().offsets, span(10, 16));
    }

    #[test]
    fn empty_selection_cannot_be_submitted() {
        let mut wf = AnnotationWorkflow::new(1);
        wf.start_marking();
        wf.open_panel("", SelectionOffsets::NONE);
        assert_eq!(wf.state(), WorkflowState::Editing);
        assert_eq!(wf.submit(), Err(WorkflowError::NoSelection));
        assert_eq!(wf.state(), WorkflowState::Editing);
        assert_eq!(wf.draft().error.as_deref(), Some(NO_SELECTION_MESSAGE));
    }

    #[test]
    fn cancel_discards_the_draft() {
        let mut wf = editing();
        wf.set_description("buang").unwrap();
        assert!(wf.cancel());
        assert_eq!(wf.state(), WorkflowState::Idle);
        assert!(wf.draft().description.is_empty());
        assert_eq!(wf.set_description("x"), Err(WorkflowError::NotEditing));
    }

    #[test]
    fn submitting_cannot_be_cancelled() {
        let mut wf = editing();
        wf.submit().unwrap();
        assert!(!wf.cancel());
        assert!(!wf.selection_changed("lain", span(0, 4)));
        assert_eq!(wf.state(), WorkflowState::Submitting);
    }
}
