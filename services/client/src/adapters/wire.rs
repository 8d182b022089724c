//! services/client/src/adapters/wire.rs
//!
//! The JSON shapes the Arsipku REST API speaks. Every response is parsed into
//! one of these records at the HTTP boundary and converted with `to_domain`;
//! nothing past the adapter sees raw JSON.

use arsipku_core::domain::{
    Annotation, AnnotationDetail, Appliance, Document, FieldError, LoginSession, NewAnnotation,
    NewDocument, NewOrganization, Organization, OrganizationMembership, OrganizationUpdate, Page,
    Profile, ProfileUpdate, Registration, RegistrationTicket, Tag, Version, Visibility,
};
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

//=========================================================================================
// Envelope and Errors
//=========================================================================================

/// `{ success, message, data, timestamp, error_code }`, shared by all endpoints.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<T>,
    #[serde(default)]
    pub error_code: Option<String>,
}

/// A failure body. `data` is either a list of field errors or something we ignore.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
    #[serde(default)]
    pub error_code: Option<String>,
}

impl From<Envelope<serde_json::Value>> for ErrorBody {
    fn from(envelope: Envelope<serde_json::Value>) -> Self {
        Self {
            message: envelope.message,
            data: envelope.data,
            error_code: envelope.error_code,
        }
    }
}

impl ErrorBody {
    pub fn field_errors(&self) -> Option<Vec<FieldError>> {
        let items = self.data.as_ref()?.as_array()?;
        items
            .iter()
            .map(|item| serde_json::from_value::<FieldError>(item.clone()).ok())
            .collect()
    }
}

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct PageRecord<T> {
    #[serde(default)]
    pub content: Vec<T>,
    #[serde(default)]
    pub total_pages: u32,
}

impl<T> PageRecord<T> {
    pub fn to_domain<U>(self, convert: impl Fn(T) -> U) -> Page<U> {
        Page {
            items: self.content.into_iter().map(convert).collect(),
            total_pages: self.total_pages,
        }
    }
}

/// Endpoints that return either a single record or an array of them.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    pub fn into_first(self) -> Option<T> {
        match self {
            OneOrMany::Many(items) => items.into_iter().next(),
            OneOrMany::One(item) => Some(item),
        }
    }
}

/// Accepts RFC 3339 and the zone-less `2025-06-01T10:00:00.123` form, which
/// is read as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .map(|naive| Utc.from_utc_datetime(&naive))
}

fn timestamp(raw: Option<String>) -> Option<DateTime<Utc>> {
    raw.as_deref().and_then(parse_timestamp)
}

//=========================================================================================
// Documents, Annotations and Tags
//=========================================================================================

/// Tags arrive either as full records or as bare names.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum TagRecord {
    Full {
        #[serde(default)]
        id: Option<i64>,
        #[serde(rename = "tagName")]
        tag_name: String,
        #[serde(default, rename = "createdAt")]
        created_at: Option<String>,
        #[serde(default, rename = "updatedAt")]
        updated_at: Option<String>,
    },
    Name(String),
}

impl TagRecord {
    pub fn to_domain(self) -> Tag {
        match self {
            TagRecord::Full {
                id,
                tag_name,
                created_at,
                updated_at,
            } => Tag {
                id,
                tag_name,
                created_at: timestamp(created_at),
                updated_at: timestamp(updated_at),
            },
            TagRecord::Name(name) => Tag::named(name),
        }
    }
}

fn tags_to_domain(tags: Vec<TagRecord>) -> Vec<Tag> {
    tags.into_iter().map(TagRecord::to_domain).collect()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationRecord {
    #[serde(default)]
    id: Option<i64>,
    document_id: i64,
    #[serde(default)]
    owner_user_id: Option<i64>,
    #[serde(default)]
    selected_text: String,
    #[serde(default)]
    start_no: usize,
    #[serde(default)]
    end_no: usize,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    tags: Vec<TagRecord>,
    #[serde(default)]
    is_verified: Option<bool>,
    #[serde(default)]
    verified: Option<bool>,
    #[serde(default)]
    created_at: Option<String>,
}

impl AnnotationRecord {
    pub fn to_domain(self) -> Annotation {
        Annotation {
            id: self.id,
            document_id: self.document_id,
            owner_user_id: self.owner_user_id,
            selected_text: self.selected_text,
            start_no: self.start_no,
            end_no: self.end_no,
            description: self.description.unwrap_or_default(),
            tags: tags_to_domain(self.tags),
            verified: self.verified.or(self.is_verified).unwrap_or(false),
            created_at: timestamp(self.created_at),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRecord {
    id: i64,
    #[serde(default)]
    title: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    reference_document_id: Option<i64>,
    #[serde(default)]
    version: i32,
    #[serde(default)]
    subversion: i32,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    updated_at: Option<String>,
    #[serde(default)]
    public_visibility: bool,
    #[serde(default)]
    private: bool,
    #[serde(default)]
    annotations: Option<Vec<AnnotationRecord>>,
    #[serde(default)]
    tags: Vec<TagRecord>,
    #[serde(default)]
    verified_all: bool,
    /// Owner display name.
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    annotation_count: Option<usize>,
    #[serde(default)]
    is_annotable: Option<bool>,
}

impl DocumentRecord {
    pub fn to_domain(self) -> Document {
        let annotations: Vec<Annotation> = self
            .annotations
            .unwrap_or_default()
            .into_iter()
            .map(AnnotationRecord::to_domain)
            .collect();
        Document {
            id: self.id,
            title: self.title,
            content: self.content,
            owner_name: self.name.unwrap_or_default(),
            owner_username: self.username,
            created_at: timestamp(self.created_at),
            updated_at: timestamp(self.updated_at),
            visibility: Visibility::from_flags(self.public_visibility, self.private),
            version: self.version,
            subversion: self.subversion,
            reference_document_id: self.reference_document_id,
            is_annotable: self.is_annotable.unwrap_or(true),
            verified_all: self.verified_all,
            annotation_count: self.annotation_count.unwrap_or(annotations.len()),
            annotations,
            declared_tags: tags_to_domain(self.tags),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct VersionRecord {
    id: i64,
    #[serde(default)]
    version: i32,
    #[serde(default)]
    subversion: i32,
    #[serde(default)]
    title: Option<String>,
}

impl VersionRecord {
    pub fn to_domain(self) -> Version {
        Version {
            id: self.id,
            version: self.version,
            subversion: self.subversion,
            title: self.title,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationDetailRecord {
    #[serde(alias = "annotationId")]
    id: i64,
    document_id: i64,
    #[serde(default, alias = "title")]
    document_name: String,
    #[serde(default)]
    username: String,
    #[serde(default, alias = "name", alias = "fullname")]
    full_name: String,
    #[serde(default)]
    selected_text: String,
    #[serde(default)]
    start_no: usize,
    #[serde(default)]
    end_no: usize,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    tags: Vec<TagRecord>,
    #[serde(default)]
    is_verified: Option<bool>,
    #[serde(default)]
    verified: Option<bool>,
    #[serde(default)]
    created_at: Option<String>,
}

impl AnnotationDetailRecord {
    pub fn to_domain(self) -> AnnotationDetail {
        AnnotationDetail {
            annotation_id: self.id,
            document_id: self.document_id,
            document_name: self.document_name,
            username: self.username,
            full_name: self.full_name,
            selected_text: self.selected_text,
            start_no: self.start_no,
            end_no: self.end_no,
            description: self.description.unwrap_or_default(),
            tags: tags_to_domain(self.tags),
            verified: self.verified.or(self.is_verified).unwrap_or(false),
            created_at: timestamp(self.created_at),
        }
    }
}

//=========================================================================================
// Auth, Profile, Organizations and Appliances
//=========================================================================================

#[derive(Debug, Deserialize)]
pub struct LoginRecord {
    token: String,
    #[serde(default)]
    username: String,
}

impl LoginRecord {
    pub fn to_domain(self, message: Option<String>) -> LoginSession {
        LoginSession {
            token: self.token,
            username: self.username,
            message,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RegistrationRecord {
    email: String,
    #[serde(default)]
    otp: Option<String>,
}

impl RegistrationRecord {
    pub fn to_domain(self, message: Option<String>) -> RegistrationTicket {
        RegistrationTicket {
            email: self.email,
            otp: self.otp,
            message,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRecord {
    username: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    status_notification: bool,
    #[serde(default)]
    has_notification: bool,
    #[serde(default)]
    notification_counter: u32,
    #[serde(default)]
    notification_type: i32,
    #[serde(default)]
    path_foto: Option<String>,
}

impl ProfileRecord {
    pub fn to_domain(self) -> Profile {
        Profile {
            username: self.username,
            name: self.name,
            email: self.email,
            status_notification: self.status_notification,
            has_notification: self.has_notification,
            notification_counter: self.notification_counter,
            notification_type: self.notification_type,
            photo_path: self.path_foto,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationRecord {
    id: i64,
    #[serde(default)]
    organization_name: String,
    #[serde(default)]
    public_visibility: bool,
}

impl OrganizationRecord {
    pub fn to_domain(self) -> Organization {
        Organization {
            id: self.id,
            organization_name: self.organization_name,
            public_visibility: self.public_visibility,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipRecord {
    #[serde(default)]
    user_id: Option<i64>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    organization_owner: bool,
    organization: OrganizationRecord,
}

impl MembershipRecord {
    pub fn to_domain(self) -> OrganizationMembership {
        OrganizationMembership {
            user_id: self.user_id,
            email: self.email,
            organization_owner: self.organization_owner,
            organization: self.organization.to_domain(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplianceRecord {
    document_id: i64,
    #[serde(default, alias = "title")]
    document_name: String,
    #[serde(default)]
    username: String,
    #[serde(default, alias = "name", alias = "fullName")]
    fullname: String,
    #[serde(default)]
    email: String,
    #[serde(default, alias = "isAccepted")]
    accepted: bool,
    #[serde(default)]
    created_at: Option<String>,
}

impl ApplianceRecord {
    pub fn to_domain(self) -> Appliance {
        Appliance {
            document_id: self.document_id,
            document_name: self.document_name,
            username: self.username,
            fullname: self.fullname,
            email: self.email,
            accepted: self.accepted,
            created_at: timestamp(self.created_at),
        }
    }
}

/// `GET /appliance/{documentId}` only matters for its `accepted` flag.
#[derive(Debug, Deserialize)]
pub struct ApplianceStatusRecord {
    #[serde(default, alias = "isAccepted")]
    pub accepted: Option<bool>,
}

//=========================================================================================
// Request Bodies
//=========================================================================================

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub struct RegistrationRequest<'a> {
    pub username: &'a str,
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

impl<'a> From<&'a Registration> for RegistrationRequest<'a> {
    fn from(r: &'a Registration) -> Self {
        Self {
            username: &r.username,
            name: &r.name,
            email: &r.email,
            password: &r.password,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct VerifyRegistrationRequest<'a> {
    pub email: &'a str,
    pub token: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdateRequest<'a> {
    pub name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<&'a str>,
    pub status_notification: bool,
}

impl<'a> From<&'a ProfileUpdate> for ProfileUpdateRequest<'a> {
    fn from(u: &'a ProfileUpdate) -> Self {
        Self {
            name: &u.name,
            password: u.password.as_deref().filter(|p| !p.is_empty()),
            status_notification: u.status_notification,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDocumentRequest<'a> {
    pub title: &'a str,
    pub content: &'a str,
    pub public_visibility: bool,
    pub private: bool,
    pub reference_document_id: Option<i64>,
    pub version: i32,
    pub subversion: i32,
}

impl<'a> From<&'a NewDocument> for NewDocumentRequest<'a> {
    fn from(d: &'a NewDocument) -> Self {
        let (public_visibility, private) = d.visibility.to_flags();
        Self {
            title: &d.title,
            content: &d.content,
            public_visibility,
            private,
            reference_document_id: d.reference_document_id,
            version: d.version,
            subversion: d.subversion,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAnnotationRequest<'a> {
    pub document_id: i64,
    pub selected_text: &'a str,
    pub start_no: usize,
    pub end_no: usize,
    pub description: &'a str,
    pub tags: &'a [String],
}

impl<'a> From<&'a NewAnnotation> for NewAnnotationRequest<'a> {
    fn from(a: &'a NewAnnotation) -> Self {
        Self {
            document_id: a.document_id,
            selected_text: &a.selected_text,
            start_no: a.start_no,
            end_no: a.end_no,
            description: &a.description,
            tags: &a.tags,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrganizationRequest<'a> {
    pub organization_name: &'a str,
    pub members: &'a [String],
}

impl<'a> From<&'a NewOrganization> for NewOrganizationRequest<'a> {
    fn from(o: &'a NewOrganization) -> Self {
        Self {
            organization_name: &o.organization_name,
            members: &o.members,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationUpdateRequest<'a> {
    pub organization_name: &'a str,
    pub add_member: &'a [String],
    pub remove_member: &'a [String],
}

impl<'a> From<&'a OrganizationUpdate> for OrganizationUpdateRequest<'a> {
    fn from(u: &'a OrganizationUpdate) -> Self {
        Self {
            organization_name: &u.organization_name,
            add_member: &u.add_member,
            remove_member: &u.remove_member,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplianceDecisionRequest<'a> {
    pub is_accepted: bool,
    pub username: &'a str,
}
