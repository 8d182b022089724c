//! Builders for unit tests.

use crate::domain::{Annotation, Document, Tag, Visibility};

pub(crate) fn document(id: i64, title: &str, content: &str) -> Document {
    Document {
        id,
        title: title.to_string(),
        content: content.to_string(),
        owner_name: "Alice".to_string(),
        owner_username: Some("alice".to_string()),
        created_at: None,
        updated_at: None,
        visibility: Visibility::Public,
        version: 1,
        subversion: 0,
        reference_document_id: None,
        is_annotable: true,
        verified_all: false,
        annotations: Vec::new(),
        annotation_count: 0,
        declared_tags: Vec::new(),
    }
}

pub(crate) fn annotation(document_id: i64, tags: &[&str]) -> Annotation {
    Annotation {
        id: None,
        document_id,
        owner_user_id: None,
        selected_text: String::new(),
        start_no: 0,
        end_no: 0,
        description: String::new(),
        tags: tags.iter().map(|t| Tag::named(*t)).collect(),
        verified: false,
        created_at: None,
    }
}
