//! crates/arsipku_core/src/domain.rs
//!
//! Defines the core data structures the client works with.
//! Wire formats live in the service crate; these types are what the rest of
//! the application reasons about once a response has been parsed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

//=========================================================================================
// Documents ("arsip")
//=========================================================================================

/// Who may read a document. The API encodes this as two booleans
/// (`publicVisibility`, `private`); the third state is both being false.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Visibility {
    Public,
    Private,
    Organization,
}

impl Visibility {
    /// Decodes the wire flag pair. A pair with both flags set is inconsistent;
    /// it is read as `Private` so nothing is exposed by accident.
    pub fn from_flags(public_visibility: bool, private: bool) -> Self {
        match (public_visibility, private) {
            (_, true) => Visibility::Private,
            (true, false) => Visibility::Public,
            (false, false) => Visibility::Organization,
        }
    }

    /// Returns `(publicVisibility, private)` as sent to the API.
    pub fn to_flags(self) -> (bool, bool) {
        match self {
            Visibility::Public => (true, false),
            Visibility::Private => (false, true),
            Visibility::Organization => (false, false),
        }
    }

    /// The label shown in visibility pickers.
    pub fn label(self) -> &'static str {
        match self {
            Visibility::Public => "Publik",
            Visibility::Private => "Pribadi",
            Visibility::Organization => "Organisasi",
        }
    }

    /// Parses either the picker label or the English name, case-insensitively.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "publik" | "public" => Some(Visibility::Public),
            "pribadi" | "private" => Some(Visibility::Private),
            "organisasi" | "organization" => Some(Visibility::Organization),
            _ => None,
        }
    }

    /// The value sent as a list filter.
    pub fn as_filter_value(self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Private => "private",
            Visibility::Organization => "organization",
        }
    }
}

/// A tag attached to an annotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: Option<i64>,
    pub tag_name: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Tag {
    /// A tag known only by name, e.g. when the API returns bare strings.
    pub fn named(tag_name: impl Into<String>) -> Self {
        Self {
            id: None,
            tag_name: tag_name.into(),
            created_at: None,
            updated_at: None,
        }
    }
}

/// A highlighted span of a document with a description ("pengetahuan").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub id: Option<i64>,
    pub document_id: i64,
    pub owner_user_id: Option<i64>,
    pub selected_text: String,
    pub start_no: usize,
    pub end_no: usize,
    pub description: String,
    pub tags: Vec<Tag>,
    pub verified: bool,
    pub created_at: Option<DateTime<Utc>>,
}

/// A published document as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: i64,
    pub title: String,
    pub content: String,
    /// Display name of the owner.
    pub owner_name: String,
    pub owner_username: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub visibility: Visibility,
    pub version: i32,
    pub subversion: i32,
    pub reference_document_id: Option<i64>,
    pub is_annotable: bool,
    pub verified_all: bool,
    pub annotations: Vec<Annotation>,
    pub annotation_count: usize,
    /// Tags reported directly on the document. Prefer [`Document::tags`].
    pub declared_tags: Vec<Tag>,
}

impl Document {
    /// Tags are derived from the document's annotations; tags the API reports
    /// on the document itself are appended. Duplicates are removed ignoring case.
    pub fn tags(&self) -> Vec<Tag> {
        let all = self
            .annotations
            .iter()
            .flat_map(|a| a.tags.iter())
            .chain(self.declared_tags.iter())
            .cloned();
        crate::tags::dedup_tags(all)
    }
}

/// The reduced document projection used by the "related versions" dropdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    pub id: i64,
    pub version: i32,
    pub subversion: i32,
    pub title: Option<String>,
}

/// A page of results as reported by a paginated endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_pages: u32,
}

impl<T> Page<T> {
    /// The page used when the server reports "no data" for a list.
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total_pages: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Page::empty()
    }
}

//=========================================================================================
// Users, Organizations and Verifier Workflow
//=========================================================================================

/// The signed-in user's profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub username: String,
    pub name: String,
    pub email: String,
    pub status_notification: bool,
    pub has_notification: bool,
    pub notification_counter: u32,
    pub notification_type: i32,
    pub photo_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub id: i64,
    pub organization_name: String,
    pub public_visibility: bool,
}

/// One user's membership record in an organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationMembership {
    pub user_id: Option<i64>,
    pub email: Option<String>,
    pub organization_owner: bool,
    pub organization: Organization,
}

/// A request by a user to become a verifier for a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appliance {
    pub document_id: i64,
    /// Title of the document the request is for.
    pub document_name: String,
    pub username: String,
    pub fullname: String,
    pub email: String,
    pub accepted: bool,
    pub created_at: Option<DateTime<Utc>>,
}

/// The current user's verifier standing on a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplianceStatus {
    /// No appliance record exists.
    NotApplied,
    /// Applied, waiting for the owner (`accepted: false`).
    Pending,
    /// Approved verifier (`accepted: true`).
    Accepted,
}

impl ApplianceStatus {
    pub fn from_record(accepted: Option<bool>) -> Self {
        match accepted {
            None => ApplianceStatus::NotApplied,
            Some(false) => ApplianceStatus::Pending,
            Some(true) => ApplianceStatus::Accepted,
        }
    }

    /// Only accepted verifiers may add knowledge to a document.
    pub fn can_annotate(self) -> bool {
        matches!(self, ApplianceStatus::Accepted)
    }
}

/// An annotation waiting in the verifier queue, or loaded for review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationDetail {
    pub annotation_id: i64,
    pub document_id: i64,
    pub document_name: String,
    pub username: String,
    pub full_name: String,
    pub selected_text: String,
    pub start_no: usize,
    pub end_no: usize,
    pub description: String,
    pub tags: Vec<Tag>,
    pub verified: bool,
    pub created_at: Option<DateTime<Utc>>,
}

/// The verdict a verifier gives on an annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerifierAction {
    Accept,
    Reject,
}

impl VerifierAction {
    pub fn as_query(self) -> &'static str {
        match self {
            VerifierAction::Accept => "accept",
            VerifierAction::Reject => "reject",
        }
    }
}

//=========================================================================================
// Errors and Request Payloads
//=========================================================================================

/// A field-level validation error returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// What a successful login hands back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginSession {
    pub token: String,
    pub username: String,
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub username: String,
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Carried from registration to the OTP verification screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationTicket {
    pub email: String,
    pub otp: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDocument {
    pub title: String,
    pub content: String,
    pub visibility: Visibility,
    pub reference_document_id: Option<i64>,
    pub version: i32,
    pub subversion: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAnnotation {
    pub document_id: i64,
    pub selected_text: String,
    pub start_no: usize,
    pub end_no: usize,
    pub description: String,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrganization {
    pub organization_name: String,
    pub members: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OrganizationUpdate {
    pub organization_name: String,
    pub add_member: Vec<String>,
    pub remove_member: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub name: String,
    /// Only sent when the user typed a new password.
    pub password: Option<String>,
    pub status_notification: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[test]
    fn visibility_flags_cover_all_three_states() {
        assert_eq!(Visibility::from_flags(true, false), Visibility::Public);
        assert_eq!(Visibility::from_flags(false, true), Visibility::Private);
        assert_eq!(Visibility::from_flags(false, false), Visibility::Organization);
        for v in [Visibility::Public, Visibility::Private, Visibility::Organization] {
            let (p, q) = v.to_flags();
            assert_eq!(Visibility::from_flags(p, q), v);
        }
    }

    #[test]
    fn inconsistent_flags_read_as_private() {
        assert_eq!(Visibility::from_flags(true, true), Visibility::Private);
    }

    #[test]
    fn visibility_parses_labels() {
        assert_eq!(Visibility::parse("Publik"), Some(Visibility::Public));
        assert_eq!(Visibility::parse(" pribadi "), Some(Visibility::Private));
        assert_eq!(Visibility::parse("organization"), Some(Visibility::Organization));
        assert_eq!(Visibility::parse("secret"), None);
    }

    #[test]
    fn appliance_status_from_record() {
        assert_eq!(ApplianceStatus::from_record(None), ApplianceStatus::NotApplied);
        assert_eq!(ApplianceStatus::from_record(Some(false)), ApplianceStatus::Pending);
        assert!(ApplianceStatus::from_record(Some(true)).can_annotate());
        assert!(!ApplianceStatus::Pending.can_annotate());
    }

    #[test]
    fn document_tags_come_from_annotations() {
        let mut doc = fixtures::document(1, "t", "c");
        doc.annotations = vec![
            fixtures::annotation(1, &["Foo", "bar"]),
            fixtures::annotation(1, &["foo", "baz"]),
        ];
        doc.declared_tags = vec![Tag::named("BAZ"), Tag::named("qux")];
        let names: Vec<String> = doc.tags().into_iter().map(|t| t.tag_name).collect();
        assert_eq!(names, vec!["Foo", "bar", "baz", "qux"]);
    }
}
