//! A canned `ArsipkuApi` for controller unit tests.

use arsipku_core::domain::{
    Annotation, AnnotationDetail, Appliance, ApplianceStatus, Credentials, Document, LoginSession,
    NewAnnotation, NewDocument, NewOrganization, OrganizationMembership, OrganizationUpdate, Page,
    Profile, ProfileUpdate, Registration, RegistrationTicket, VerifierAction, Version, Visibility,
};
use arsipku_core::listing::ListRequest;
use arsipku_core::ports::{ArsipkuApi, PortError, PortResult};
use async_trait::async_trait;
use std::sync::Mutex;

fn unset<T>() -> PortResult<T> {
    Err(PortError::Unexpected("not stubbed".to_string()))
}

/// Each field is the result the matching call returns. Calls are recorded by name.
pub struct StubApi {
    pub login: PortResult<LoginSession>,
    pub register: PortResult<RegistrationTicket>,
    pub profile: PortResult<Option<Profile>>,
    pub documents: PortResult<Page<Document>>,
    pub document: PortResult<Document>,
    pub related: PortResult<Vec<Version>>,
    pub annotations: PortResult<Page<Annotation>>,
    pub verifier_queue: PortResult<Vec<AnnotationDetail>>,
    pub annotation_detail: PortResult<AnnotationDetail>,
    pub memberships: PortResult<Vec<OrganizationMembership>>,
    pub appliances: PortResult<Page<Appliance>>,
    pub appliance_status: PortResult<ApplianceStatus>,
    /// Result of every call that only reports success or failure.
    pub write: PortResult<()>,
    pub calls: Mutex<Vec<String>>,
    pub sent_annotations: Mutex<Vec<NewAnnotation>>,
    pub sent_updates: Mutex<Vec<OrganizationUpdate>>,
}

impl Default for StubApi {
    fn default() -> Self {
        Self {
            login: unset(),
            register: unset(),
            profile: unset(),
            documents: unset(),
            document: unset(),
            related: unset(),
            annotations: unset(),
            verifier_queue: unset(),
            annotation_detail: unset(),
            memberships: unset(),
            appliances: unset(),
            appliance_status: unset(),
            write: Ok(()),
            calls: Mutex::new(Vec::new()),
            sent_annotations: Mutex::new(Vec::new()),
            sent_updates: Mutex::new(Vec::new()),
        }
    }
}

impl StubApi {
    fn record(&self, call: &str) {
        self.calls.lock().unwrap().push(call.to_string());
    }

    pub fn called(&self, call: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| *c == call).count()
    }
}

pub fn document(id: i64, content: &str) -> Document {
    Document {
        id,
        title: format!("Arsip {id}"),
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

pub fn profile(username: &str) -> Profile {
    Profile {
        username: username.to_string(),
        name: "Alice".to_string(),
        email: format!("{username}@arsipku.id"),
        status_notification: false,
        has_notification: false,
        notification_counter: 0,
        notification_type: 0,
        photo_path: None,
    }
}

#[async_trait]
impl ArsipkuApi for StubApi {
    async fn login(&self, _credentials: &Credentials) -> PortResult<LoginSession> {
        self.record("login");
        self.login.clone()
    }

    async fn register(&self, _registration: &Registration) -> PortResult<RegistrationTicket> {
        self.record("register");
        self.register.clone()
    }

    async fn verify_registration(&self, _email: &str, _token: &str) -> PortResult<String> {
        self.record("verify_registration");
        self.write.clone().map(|_| String::new())
    }

    async fn get_profile(&self) -> PortResult<Option<Profile>> {
        self.record("get_profile");
        self.profile.clone()
    }

    async fn update_profile(&self, _update: &ProfileUpdate) -> PortResult<()> {
        self.record("update_profile");
        self.write.clone()
    }

    async fn delete_profile(&self) -> PortResult<()> {
        self.record("delete_profile");
        self.write.clone()
    }

    async fn list_public_documents(
        &self,
        _page: u32,
        _keyword: Option<&str>,
    ) -> PortResult<Page<Document>> {
        self.record("list_public_documents");
        self.documents.clone()
    }

    async fn list_documents(&self, _request: &ListRequest) -> PortResult<Page<Document>> {
        self.record("list_documents");
        self.documents.clone()
    }

    async fn get_public_document(&self, _id: i64) -> PortResult<Document> {
        self.record("get_public_document");
        self.document.clone()
    }

    async fn create_document(&self, _document: &NewDocument) -> PortResult<()> {
        self.record("create_document");
        self.write.clone()
    }

    async fn related_versions(&self, _reference_document_id: i64) -> PortResult<Vec<Version>> {
        self.record("related_versions");
        self.related.clone()
    }

    async fn my_annotations(&self) -> PortResult<Vec<Annotation>> {
        self.record("my_annotations");
        self.annotations.clone().map(|page| page.items)
    }

    async fn list_annotations(&self, _request: &ListRequest) -> PortResult<Page<Annotation>> {
        self.record("list_annotations");
        self.annotations.clone()
    }

    async fn create_annotation(&self, annotation: &NewAnnotation) -> PortResult<()> {
        self.record("create_annotation");
        self.sent_annotations.lock().unwrap().push(annotation.clone());
        self.write.clone()
    }

    async fn verifier_queue(&self) -> PortResult<Vec<AnnotationDetail>> {
        self.record("verifier_queue");
        self.verifier_queue.clone()
    }

    async fn review_annotation(&self, _id: i64, action: VerifierAction) -> PortResult<()> {
        self.record(&format!("review_annotation:{}", action.as_query()));
        self.write.clone()
    }

    async fn annotation_detail(&self, _id: i64) -> PortResult<AnnotationDetail> {
        self.record("annotation_detail");
        self.annotation_detail.clone()
    }

    async fn list_organizations(&self) -> PortResult<Vec<OrganizationMembership>> {
        self.record("list_organizations");
        self.memberships.clone()
    }

    async fn create_organization(&self, _organization: &NewOrganization) -> PortResult<()> {
        self.record("create_organization");
        self.write.clone()
    }

    async fn organization_members(&self, _id: i64) -> PortResult<Vec<OrganizationMembership>> {
        self.record("organization_members");
        self.memberships.clone()
    }

    async fn update_organization(&self, _id: i64, update: &OrganizationUpdate) -> PortResult<()> {
        self.record("update_organization");
        self.sent_updates.lock().unwrap().push(update.clone());
        self.write.clone()
    }

    async fn delete_organization(&self, _id: i64) -> PortResult<()> {
        self.record("delete_organization");
        self.write.clone()
    }

    async fn list_appliances(&self, _page: u32, _size: u32) -> PortResult<Page<Appliance>> {
        self.record("list_appliances");
        self.appliances.clone()
    }

    async fn appliance_status(&self, _document_id: i64) -> PortResult<ApplianceStatus> {
        self.record("appliance_status");
        self.appliance_status.clone()
    }

    async fn apply_as_verifier(&self, _document_id: i64) -> PortResult<()> {
        self.record("apply_as_verifier");
        self.write.clone()
    }

    async fn decide_appliance(
        &self,
        _document_id: i64,
        _username: &str,
        _accepted: bool,
    ) -> PortResult<()> {
        self.record("decide_appliance");
        self.write.clone()
    }
}
