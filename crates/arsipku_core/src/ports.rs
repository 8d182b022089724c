//! crates/arsipku_core/src/ports.rs
//!
//! Defines the service contracts (traits) the client logic depends on.
//! The REST backend and the local credential storage sit behind these traits so
//! the view controllers never touch HTTP or the filesystem directly.

use crate::domain::{
    Annotation, AnnotationDetail, Appliance, ApplianceStatus, Credentials, Document, FieldError,
    LoginSession, NewAnnotation, NewDocument, NewOrganization, OrganizationMembership,
    OrganizationUpdate, Page, Profile, ProfileUpdate, Registration, RegistrationTicket,
    VerifierAction, Version,
};
use crate::error_code::{ErrorCode, ErrorPolicy};
use crate::listing::ListRequest;
use async_trait::async_trait;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PortError {
    #[error("Data not found: {0}")]
    NotFound(String),
    /// An auth failure the caller asked to handle itself.
    #[error("Unauthorized")]
    Unauthorized,
    /// The session was rejected and the stored credential has been cleared.
    #[error("Session expired")]
    SessionExpired,
    #[error("Validation failed on {} field(s)", .0.len())]
    Validation(Vec<FieldError>),
    #[error("API error {status}: {message}")]
    Api {
        status: u16,
        code: Option<ErrorCode>,
        message: String,
    },
    #[error("Request failed: {0}")]
    Transport(String),
    #[error("Unexpected response shape: {0}")]
    Decode(String),
    #[error("Credential storage error: {0}")]
    Storage(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

impl PortError {
    /// How a view should react to this error.
    pub fn policy(&self) -> ErrorPolicy {
        match self {
            PortError::NotFound(_) => ErrorPolicy::TreatAsEmpty,
            PortError::Unauthorized | PortError::SessionExpired => ErrorPolicy::RedirectToLogin,
            PortError::Api {
                status,
                code,
                message,
            } => ErrorPolicy::classify(*status, code.as_ref(), Some(message)),
            _ => ErrorPolicy::ShowMessage,
        }
    }

    pub fn is_session_expired(&self) -> bool {
        matches!(self, PortError::SessionExpired)
    }

    /// The text shown in the error dialog, falling back to `default` when the
    /// server gave nothing readable.
    pub fn user_message(&self, default: &str) -> String {
        match self {
            PortError::Api { message, .. } | PortError::NotFound(message)
                if !message.trim().is_empty() =>
            {
                message.clone()
            }
            PortError::Validation(fields) if !fields.is_empty() => fields
                .iter()
                .map(|f| format!("Error in {}: {}", f.field, f.message))
                .collect::<Vec<_>>()
                .join("\n"),
            _ => default.to_string(),
        }
    }
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

/// Lets list views turn a "no data" failure into an empty result.
pub trait OrEmpty<T> {
    fn or_empty(self) -> PortResult<T>;
}

impl<T: Default> OrEmpty<T> for PortResult<T> {
    fn or_empty(self) -> PortResult<T> {
        match self {
            Err(e) if e.policy() == ErrorPolicy::TreatAsEmpty => Ok(T::default()),
            other => other,
        }
    }
}

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// The Arsipku REST API, one method per endpoint.
#[async_trait]
pub trait ArsipkuApi: Send + Sync {
    // --- Auth ---
    async fn login(&self, credentials: &Credentials) -> PortResult<LoginSession>;

    async fn register(&self, registration: &Registration) -> PortResult<RegistrationTicket>;

    async fn verify_registration(&self, email: &str, token: &str) -> PortResult<String>;

    // --- Profile ---
    /// The signed-in user's profile, or `None` if the server returned no record.
    async fn get_profile(&self) -> PortResult<Option<Profile>>;

    async fn update_profile(&self, update: &ProfileUpdate) -> PortResult<()>;

    async fn delete_profile(&self) -> PortResult<()>;

    // --- Documents ---
    async fn list_public_documents(
        &self,
        page: u32,
        keyword: Option<&str>,
    ) -> PortResult<Page<Document>>;

    async fn list_documents(&self, request: &ListRequest) -> PortResult<Page<Document>>;

    async fn get_public_document(&self, id: i64) -> PortResult<Document>;

    async fn create_document(&self, document: &NewDocument) -> PortResult<()>;

    async fn related_versions(&self, reference_document_id: i64) -> PortResult<Vec<Version>>;

    // --- Annotations ---
    async fn my_annotations(&self) -> PortResult<Vec<Annotation>>;

    async fn list_annotations(&self, request: &ListRequest) -> PortResult<Page<Annotation>>;

    async fn create_annotation(&self, annotation: &NewAnnotation) -> PortResult<()>;

    async fn verifier_queue(&self) -> PortResult<Vec<AnnotationDetail>>;

    async fn review_annotation(&self, id: i64, action: VerifierAction) -> PortResult<()>;

    async fn annotation_detail(&self, id: i64) -> PortResult<AnnotationDetail>;

    // --- Organizations ---
    async fn list_organizations(&self) -> PortResult<Vec<OrganizationMembership>>;

    async fn create_organization(&self, organization: &NewOrganization) -> PortResult<()>;

    async fn organization_members(&self, id: i64) -> PortResult<Vec<OrganizationMembership>>;

    async fn update_organization(&self, id: i64, update: &OrganizationUpdate) -> PortResult<()>;

    async fn delete_organization(&self, id: i64) -> PortResult<()>;

    // --- Verifier Appliances ---
    async fn list_appliances(&self, page: u32, size: u32) -> PortResult<Page<Appliance>>;

    /// Looked up without triggering the global login redirect.
    async fn appliance_status(&self, document_id: i64) -> PortResult<ApplianceStatus>;

    async fn apply_as_verifier(&self, document_id: i64) -> PortResult<()>;

    async fn decide_appliance(
        &self,
        document_id: i64,
        username: &str,
        accepted: bool,
    ) -> PortResult<()>;
}

/// Persistent storage for the bearer token (the browser's local storage).
pub trait TokenStore: Send + Sync {
    fn load(&self) -> PortResult<Option<String>>;

    fn save(&self, token: &str) -> PortResult<()>;

    fn clear(&self) -> PortResult<()>;

    /// A pure presence check; validity is only ever decided by the server.
    fn has_token(&self) -> bool {
        matches!(self.load(), Ok(Some(token)) if !token.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_follows_the_dispatch_table() {
        assert_eq!(PortError::NotFound("x".into()).policy(), ErrorPolicy::TreatAsEmpty);
        assert_eq!(PortError::SessionExpired.policy(), ErrorPolicy::RedirectToLogin);
        let api = PortError::Api {
            status: 400,
            code: Some(ErrorCode::DataNotFound),
            message: "DATA IS NOT FOUND".into(),
        };
        assert_eq!(api.policy(), ErrorPolicy::TreatAsEmpty);
        assert_eq!(PortError::Transport("down".into()).policy(), ErrorPolicy::ShowMessage);
    }

    #[test]
    fn or_empty_swallows_only_no_data_errors() {
        let missing: PortResult<Page<i32>> = Err(PortError::NotFound("none".into()));
        assert_eq!(missing.or_empty(), Ok(Page::empty()));

        let broken: PortResult<Page<i32>> = Err(PortError::Transport("down".into()));
        assert!(broken.or_empty().is_err());
    }

    #[test]
    fn user_message_prefers_server_text() {
        let api = PortError::Api {
            status: 400,
            code: None,
            message: "Judul sudah dipakai".into(),
        };
        assert_eq!(api.user_message("Gagal"), "Judul sudah dipakai");
        assert_eq!(PortError::Transport("x".into()).user_message("Gagal"), "Gagal");

        let fields = PortError::Validation(vec![FieldError {
            field: "description".into(),
            message: "wajib diisi".into(),
        }]);
        assert_eq!(fields.user_message("Gagal"), "Error in description: wajib diisi");
    }

    struct Fixed(Option<String>);

    impl TokenStore for Fixed {
        fn load(&self) -> PortResult<Option<String>> {
            Ok(self.0.clone())
        }
        fn save(&self, _token: &str) -> PortResult<()> {
            Ok(())
        }
        fn clear(&self) -> PortResult<()> {
            Ok(())
        }
    }

    #[test]
    fn has_token_is_a_presence_check() {
        assert!(!Fixed(None).has_token());
        assert!(!Fixed(Some(String::new())).has_token());
        assert!(Fixed(Some("expired-but-present".into())).has_token());
    }
}
