//! services/client/src/adapters/http.rs
//!
//! This module contains the REST adapter, which is the concrete implementation
//! of the `ArsipkuApi` port from the `core` crate. It uses `reqwest` for the
//! transport and runs every response through one interceptor that decides
//! between "session is gone, log in again" and an ordinary error.

use super::wire::{
    AnnotationDetailRecord, AnnotationRecord, ApplianceDecisionRequest, ApplianceRecord,
    ApplianceStatusRecord, DocumentRecord, Envelope, ErrorBody, LoginRecord, LoginRequest,
    MembershipRecord, NewAnnotationRequest, NewDocumentRequest, NewOrganizationRequest, OneOrMany,
    OrganizationUpdateRequest, PageRecord, ProfileRecord, ProfileUpdateRequest, RegistrationRecord,
    RegistrationRequest, VerifyRegistrationRequest, VersionRecord,
};
use arsipku_core::domain::{
    Annotation, AnnotationDetail, Appliance, ApplianceStatus, Credentials, Document, LoginSession,
    NewAnnotation, NewDocument, NewOrganization, OrganizationMembership, OrganizationUpdate, Page,
    Profile, ProfileUpdate, Registration, RegistrationTicket, VerifierAction, Version,
};
use arsipku_core::error_code::ErrorCode;
use arsipku_core::listing::ListRequest;
use arsipku_core::ports::{ArsipkuApi, PortError, PortResult, TokenStore};
use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

/// Requests carrying this header handle auth failures themselves.
pub const IGNORE_AUTH_ERROR_HEADER: &str = "X-Ignore-Auth-Error";

//=========================================================================================
// Request Description
//=========================================================================================

/// What to do when the server rejects the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AuthErrors {
    /// Clear the stored token and report `SessionExpired`.
    Redirect,
    /// Send the ignore header and report `Unauthorized`; the token is kept.
    Ignore,
    /// Auth screens: no token is sent and failures are ordinary API errors.
    Passthrough,
}

struct ApiRequest {
    method: Method,
    path: String,
    query: Vec<(&'static str, String)>,
    body: Option<Value>,
    auth: AuthErrors,
}

impl ApiRequest {
    fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            auth: AuthErrors::Redirect,
        }
    }

    fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    fn query(mut self, key: &'static str, value: impl ToString) -> Self {
        self.query.push((key, value.to_string()));
        self
    }

    fn json<B: Serialize>(mut self, body: &B) -> PortResult<Self> {
        let value = serde_json::to_value(body)
            .map_err(|e| PortError::Unexpected(format!("Failed to encode request: {}", e)))?;
        self.body = Some(value);
        Ok(self)
    }

    fn auth(mut self, auth: AuthErrors) -> Self {
        self.auth = auth;
        self
    }
}

/// A successful response, with the envelope already removed.
struct Reply {
    message: Option<String>,
    data: Value,
}

impl Reply {
    fn decode<T: DeserializeOwned>(self) -> PortResult<T> {
        serde_json::from_value(self.data)
            .map_err(|e| PortError::Decode(format!("Failed to parse response: {}", e)))
    }

    /// Lists: a missing or null `data` is an empty list.
    fn decode_list<R: DeserializeOwned>(self) -> PortResult<Vec<R>> {
        Ok(self.decode::<Option<Vec<R>>>()?.unwrap_or_default())
    }

    fn decode_page<R: DeserializeOwned, T>(self, convert: impl Fn(R) -> T) -> PortResult<Page<T>> {
        Ok(self
            .decode::<Option<PageRecord<R>>>()?
            .map(|page| page.to_domain(convert))
            .unwrap_or_default())
    }
}

/// `GET /public/document/{id}` and `GET /public/document/related/{id}` never
/// trigger the login redirect.
pub fn is_redirect_exempt(method: &Method, path: &str) -> bool {
    if method != Method::GET {
        return false;
    }
    let Some(rest) = path.strip_prefix("/public/document/") else {
        return false;
    };
    let id = rest.strip_prefix("related/").unwrap_or(rest);
    !id.is_empty() && id.chars().all(|c| c.is_ascii_digit())
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A REST adapter that implements the `ArsipkuApi` port.
#[derive(Clone)]
pub struct HttpApi {
    client: Client,
    base_url: Url,
    tokens: Arc<dyn TokenStore>,
}

impl HttpApi {
    /// Creates a new `HttpApi`. No timeout is configured.
    pub fn new(base_url: Url, tokens: Arc<dyn TokenStore>) -> Result<Self, reqwest::Error> {
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            base_url,
            tokens,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.as_str().trim_end_matches('/'), path)
    }

    async fn call(&self, request: ApiRequest) -> PortResult<Reply> {
        let ApiRequest {
            method,
            path,
            query,
            body,
            mut auth,
        } = request;
        if auth == AuthErrors::Redirect && is_redirect_exempt(&method, &path) {
            auth = AuthErrors::Ignore;
        }

        let mut builder = self.client.request(method.clone(), self.url(&path));
        if !query.is_empty() {
            builder = builder.query(&query);
        }
        if auth != AuthErrors::Passthrough {
            if let Ok(Some(token)) = self.tokens.load() {
                if !token.is_empty() {
                    builder = builder.bearer_auth(token);
                }
            }
        }
        if auth == AuthErrors::Ignore {
            builder = builder.header(IGNORE_AUTH_ERROR_HEADER, "true");
        }
        if let Some(body) = &body {
            builder = builder.json(body);
        }

        debug!("{} {}", method, path);
        let response = builder
            .send()
            .await
            .map_err(|e| PortError::Transport(format!("Request failed: {}", e)))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| PortError::Transport(format!("Failed to read response: {}", e)))?;

        let value = if text.trim().is_empty() {
            Value::Null
        } else {
            match serde_json::from_str::<Value>(&text) {
                Ok(value) => value,
                Err(_) if !status.is_success() => Value::Null,
                Err(e) => {
                    return Err(PortError::Decode(format!("Response is not JSON: {}", e)));
                }
            }
        };

        if !status.is_success() {
            let body: ErrorBody = serde_json::from_value(value).unwrap_or_default();
            return Err(self.intercept(status, body, auth, &path));
        }

        open_envelope(status, value)
    }

    /// The global response interceptor.
    fn intercept(&self, status: StatusCode, body: ErrorBody, auth: AuthErrors, path: &str) -> PortError {
        let session_rejected = status == StatusCode::UNAUTHORIZED
            || (status == StatusCode::BAD_REQUEST
                && body.error_code.as_deref() == Some(ErrorCode::INVALID_SESSION));
        if !session_rejected {
            return failure(status, body);
        }
        match auth {
            AuthErrors::Passthrough => failure(status, body),
            AuthErrors::Ignore => {
                debug!("Auth error on {} left to the caller", path);
                PortError::Unauthorized
            }
            AuthErrors::Redirect => {
                warn!("Session rejected on {}; clearing the stored token", path);
                if let Err(e) = self.tokens.clear() {
                    warn!("Failed to clear the stored token: {}", e);
                }
                PortError::SessionExpired
            }
        }
    }
}

/// Maps a non-auth failure body to a `PortError`.
/// Strips the `{success, message, data}` wrapper from a 2xx body. Bare bodies
/// pass through untouched.
fn open_envelope(status: StatusCode, value: Value) -> PortResult<Reply> {
    let wrapped = matches!(&value, Value::Object(map) if map.contains_key("success"));
    if !wrapped {
        return Ok(Reply {
            message: None,
            data: value,
        });
    }
    let envelope: Envelope<Value> = serde_json::from_value(value)
        .map_err(|e| PortError::Decode(format!("Malformed response envelope: {}", e)))?;
    if !envelope.success {
        return Err(failure(status, ErrorBody::from(envelope)));
    }
    Ok(Reply {
        message: envelope.message,
        data: envelope.data.unwrap_or(Value::Null),
    })
}

fn failure(status: StatusCode, body: ErrorBody) -> PortError {
    if let Some(fields) = body.field_errors().filter(|f| !f.is_empty()) {
        return PortError::Validation(fields);
    }
    let message = body
        .message
        .unwrap_or_else(|| format!("Request failed with status {}", status));
    if status == StatusCode::NOT_FOUND {
        return PortError::NotFound(message);
    }
    PortError::Api {
        status: status.as_u16(),
        code: body.error_code.as_deref().map(ErrorCode::from_wire),
        message,
    }
}

//=========================================================================================
// Port Implementation
//=========================================================================================

#[async_trait]
impl ArsipkuApi for HttpApi {
    async fn login(&self, credentials: &Credentials) -> PortResult<LoginSession> {
        let request = ApiRequest::new(Method::POST, "/auth/login")
            .json(&LoginRequest {
                username: &credentials.username,
                password: &credentials.password,
            })?
            .auth(AuthErrors::Passthrough);
        let reply = self.call(request).await?;
        let message = reply.message.clone();
        Ok(reply.decode::<LoginRecord>()?.to_domain(message))
    }

    async fn register(&self, registration: &Registration) -> PortResult<RegistrationTicket> {
        let request = ApiRequest::new(Method::POST, "/auth/registration")
            .json(&RegistrationRequest::from(registration))?
            .auth(AuthErrors::Passthrough);
        let reply = self.call(request).await?;
        let message = reply.message.clone();
        Ok(reply.decode::<RegistrationRecord>()?.to_domain(message))
    }

    async fn verify_registration(&self, email: &str, token: &str) -> PortResult<String> {
        let request = ApiRequest::new(Method::POST, "/auth/verify-registration")
            .json(&VerifyRegistrationRequest { email, token })?
            .auth(AuthErrors::Passthrough);
        let reply = self.call(request).await?;
        Ok(reply.message.unwrap_or_default())
    }

    async fn get_profile(&self) -> PortResult<Option<Profile>> {
        let reply = self.call(ApiRequest::get("/profile")).await?;
        Ok(reply
            .decode::<Option<OneOrMany<ProfileRecord>>>()?
            .and_then(OneOrMany::into_first)
            .map(ProfileRecord::to_domain))
    }

    async fn update_profile(&self, update: &ProfileUpdate) -> PortResult<()> {
        let request =
            ApiRequest::new(Method::PUT, "/profile").json(&ProfileUpdateRequest::from(update))?;
        self.call(request).await?;
        Ok(())
    }

    async fn delete_profile(&self) -> PortResult<()> {
        self.call(ApiRequest::new(Method::DELETE, "/profile")).await?;
        Ok(())
    }

    async fn list_public_documents(
        &self,
        page: u32,
        keyword: Option<&str>,
    ) -> PortResult<Page<Document>> {
        let mut request = ApiRequest::get("/public/document").query("page", page);
        if let Some(keyword) = keyword.map(str::trim).filter(|k| !k.is_empty()) {
            request = request.query("keyword", keyword);
        }
        self.call(request)
            .await?
            .decode_page(DocumentRecord::to_domain)
    }

    async fn list_documents(&self, list: &ListRequest) -> PortResult<Page<Document>> {
        let request = list_request("/document", list);
        self.call(request)
            .await?
            .decode_page(DocumentRecord::to_domain)
    }

    async fn get_public_document(&self, id: i64) -> PortResult<Document> {
        let reply = self
            .call(ApiRequest::get(format!("/public/document/{}", id)))
            .await?;
        Ok(reply.decode::<DocumentRecord>()?.to_domain())
    }

    async fn create_document(&self, document: &NewDocument) -> PortResult<()> {
        let request =
            ApiRequest::new(Method::POST, "/document").json(&NewDocumentRequest::from(document))?;
        self.call(request).await?;
        Ok(())
    }

    async fn related_versions(&self, reference_document_id: i64) -> PortResult<Vec<Version>> {
        let reply = self
            .call(ApiRequest::get(format!(
                "/public/document/related/{}",
                reference_document_id
            )))
            .await?;
        Ok(reply
            .decode_list::<VersionRecord>()?
            .into_iter()
            .map(VersionRecord::to_domain)
            .collect())
    }

    async fn my_annotations(&self) -> PortResult<Vec<Annotation>> {
        let reply = self.call(ApiRequest::get("/annotation")).await?;
        Ok(reply
            .decode_list::<AnnotationRecord>()?
            .into_iter()
            .map(AnnotationRecord::to_domain)
            .collect())
    }

    async fn list_annotations(&self, list: &ListRequest) -> PortResult<Page<Annotation>> {
        let request = list_request("/annotation", list);
        self.call(request)
            .await?
            .decode_page(AnnotationRecord::to_domain)
    }

    async fn create_annotation(&self, annotation: &NewAnnotation) -> PortResult<()> {
        let request = ApiRequest::new(Method::POST, "/annotation")
            .json(&NewAnnotationRequest::from(annotation))?;
        self.call(request).await?;
        Ok(())
    }

    async fn verifier_queue(&self) -> PortResult<Vec<AnnotationDetail>> {
        let reply = self.call(ApiRequest::get("/annotation/verifier")).await?;
        Ok(reply
            .decode_list::<AnnotationDetailRecord>()?
            .into_iter()
            .map(AnnotationDetailRecord::to_domain)
            .collect())
    }

    async fn review_annotation(&self, id: i64, action: VerifierAction) -> PortResult<()> {
        let request = ApiRequest::new(Method::PUT, format!("/annotation/verifier/{}", id))
            .query("action", action.as_query());
        self.call(request).await?;
        Ok(())
    }

    async fn annotation_detail(&self, id: i64) -> PortResult<AnnotationDetail> {
        let reply = self
            .call(ApiRequest::get(format!("/annotation/detail/{}", id)))
            .await?;
        Ok(reply.decode::<AnnotationDetailRecord>()?.to_domain())
    }

    async fn list_organizations(&self) -> PortResult<Vec<OrganizationMembership>> {
        let reply = self.call(ApiRequest::get("/organization")).await?;
        Ok(reply
            .decode_list::<MembershipRecord>()?
            .into_iter()
            .map(MembershipRecord::to_domain)
            .collect())
    }

    async fn create_organization(&self, organization: &NewOrganization) -> PortResult<()> {
        let request = ApiRequest::new(Method::POST, "/organization")
            .json(&NewOrganizationRequest::from(organization))?;
        self.call(request).await?;
        Ok(())
    }

    async fn organization_members(&self, id: i64) -> PortResult<Vec<OrganizationMembership>> {
        let reply = self
            .call(ApiRequest::get(format!("/organization/{}", id)))
            .await?;
        Ok(reply
            .decode_list::<MembershipRecord>()?
            .into_iter()
            .map(MembershipRecord::to_domain)
            .collect())
    }

    async fn update_organization(&self, id: i64, update: &OrganizationUpdate) -> PortResult<()> {
        let request = ApiRequest::new(Method::PUT, format!("/organization/{}", id))
            .json(&OrganizationUpdateRequest::from(update))?;
        self.call(request).await?;
        Ok(())
    }

    async fn delete_organization(&self, id: i64) -> PortResult<()> {
        self.call(ApiRequest::new(Method::DELETE, format!("/organization/{}", id)))
            .await?;
        Ok(())
    }

    async fn list_appliances(&self, page: u32, size: u32) -> PortResult<Page<Appliance>> {
        let request = ApiRequest::get("/appliance")
            .query("page", page)
            .query("size", size);
        self.call(request)
            .await?
            .decode_page(ApplianceRecord::to_domain)
    }

    async fn appliance_status(&self, document_id: i64) -> PortResult<ApplianceStatus> {
        let request =
            ApiRequest::get(format!("/appliance/{}", document_id)).auth(AuthErrors::Ignore);
        let record = self
            .call(request)
            .await?
            .decode::<Option<ApplianceStatusRecord>>()?;
        // A record without an explicit `accepted: false` counts as accepted.
        Ok(ApplianceStatus::from_record(
            record.map(|r| r.accepted.unwrap_or(true)),
        ))
    }

    async fn apply_as_verifier(&self, document_id: i64) -> PortResult<()> {
        self.call(ApiRequest::new(
            Method::POST,
            format!("/appliance/{}", document_id),
        ))
        .await?;
        Ok(())
    }

    async fn decide_appliance(
        &self,
        document_id: i64,
        username: &str,
        accepted: bool,
    ) -> PortResult<()> {
        let request = ApiRequest::new(Method::PUT, format!("/appliance/{}", document_id)).json(
            &ApplianceDecisionRequest {
                is_accepted: accepted,
                username,
            },
        )?;
        self.call(request).await?;
        Ok(())
    }
}

/// `GET {base}/{sort}/{sortBy}/{page}?size=&column=&value=`
fn list_request(base: &str, list: &ListRequest) -> ApiRequest {
    let mut request = ApiRequest::get(format!(
        "{}/{}/{}/{}",
        base,
        list.sort.as_path(),
        list.sort_by,
        list.page
    ))
    .query("size", list.size);
    if let Some((column, value)) = &list.filter {
        request = request.query("column", column).query("value", value);
    }
    request
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_exceptions_are_exempt_from_redirect() {
        assert!(is_redirect_exempt(&Method::GET, "/public/document/12"));
        assert!(is_redirect_exempt(&Method::GET, "/public/document/related/3"));
        assert!(!is_redirect_exempt(&Method::GET, "/public/document"));
        assert!(!is_redirect_exempt(&Method::GET, "/document/asc/title/0"));
        assert!(!is_redirect_exempt(&Method::POST, "/public/document/12"));
    }

    #[test]
    fn envelope_is_opened_and_bare_bodies_pass_through() {
        let reply = open_envelope(
            StatusCode::OK,
            serde_json::json!({ "success": true, "message": "OK", "data": [1, 2] }),
        )
        .unwrap();
        assert_eq!(reply.message.as_deref(), Some("OK"));
        assert_eq!(reply.data, serde_json::json!([1, 2]));

        let bare = open_envelope(StatusCode::OK, serde_json::json!({ "id": 4 })).unwrap();
        assert!(bare.message.is_none());
        assert_eq!(bare.data, serde_json::json!({ "id": 4 }));
    }

    #[test]
    fn unsuccessful_envelope_on_2xx_is_a_failure() {
        let err = open_envelope(
            StatusCode::OK,
            serde_json::json!({
                "success": false,
                "message": "DATA IS NOT FOUND",
                "error_code": "DOC05FV055"
            }),
        )
        .err()
        .unwrap();
        match err {
            PortError::Api { status, code, message } => {
                assert_eq!(status, 200);
                assert_eq!(code, Some(ErrorCode::DataNotFound));
                assert_eq!(message, "DATA IS NOT FOUND");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn failure_prefers_field_errors() {
        let body: ErrorBody = serde_json::from_value(serde_json::json!({
            "message": "Bad Request",
            "data": [{"field": "title", "message": "wajib diisi"}]
        }))
        .unwrap();
        assert!(matches!(
            failure(StatusCode::BAD_REQUEST, body),
            PortError::Validation(fields) if fields[0].field == "title"
        ));
    }

    #[test]
    fn failure_maps_error_codes() {
        let body: ErrorBody = serde_json::from_value(serde_json::json!({
            "message": "DATA IS NOT FOUND",
            "error_code": "DOC05FV055"
        }))
        .unwrap();
        match failure(StatusCode::BAD_REQUEST, body) {
            PortError::Api { status, code, .. } => {
                assert_eq!(status, 400);
                assert_eq!(code, Some(ErrorCode::DataNotFound));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(
            failure(StatusCode::NOT_FOUND, ErrorBody::default()),
            PortError::NotFound(_)
        ));
    }

    #[test]
    fn list_request_builds_path_and_filter() {
        let request = list_request(
            "/document",
            &ListRequest {
                page: 2,
                size: 10,
                sort: arsipku_core::listing::SortDirection::Desc,
                sort_by: "title".into(),
                filter: Some(("verified".into(), "true".into())),
            },
        );
        assert_eq!(request.path, "/document/desc/title/2");
        assert_eq!(
            request.query,
            vec![
                ("size", "10".to_string()),
                ("column", "verified".to_string()),
                ("value", "true".to_string())
            ]
        );
    }
}
