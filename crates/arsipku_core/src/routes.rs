//! crates/arsipku_core/src/routes.rs
//!
//! The client-side route table and the protected-route gate.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Every screen of the application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Route {
    Landing,
    Login,
    Register,
    VerifyRegistration,
    Dashboard,
    Home,
    ArsipList,
    ArsipDetail(i64),
    Profile,
    BuatArsip,
    /// Annotation screen; `documentId` travels as a query parameter.
    TambahPengetahuan(Option<i64>),
    BuatOrganisasi,
    PerbaruiOrganisasi,
    ListAppliance,
    ListVerifier,
    VerifyPengetahuan(i64),
    NotFound(String),
}

/// Outcome of passing a route through the auth gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    Render(Route),
    Redirect(Route),
}

impl Route {
    /// Parses a path with an optional query string, e.g.
    /// `/tambah-pengetahuan?documentId=4`. Unknown paths become `NotFound`.
    pub fn parse(path: &str) -> Self {
        let (path, query) = path.split_once('?').unwrap_or((path, ""));
        if path.is_empty() {
            return Route::Landing;
        }
        let Some(rest) = path.strip_prefix('/') else {
            return Route::NotFound(path.to_string());
        };
        let segments: Vec<&str> = rest.trim_end_matches('/').split('/').collect();

        match segments.as_slice() {
            [""] => Route::Landing,
            ["login"] => Route::Login,
            ["register"] => Route::Register,
            ["verify-registration"] => Route::VerifyRegistration,
            ["dashboard"] => Route::Dashboard,
            ["home"] => Route::Home,
            ["arsip"] => Route::ArsipList,
            ["arsip", id] => match id.parse() {
                Ok(id) => Route::ArsipDetail(id),
                Err(_) => Route::NotFound(path.to_string()),
            },
            ["profile"] => Route::Profile,
            ["buat-arsip"] => Route::BuatArsip,
            ["tambah-pengetahuan"] => {
                Route::TambahPengetahuan(query_param(query, "documentId").and_then(|v| v.parse().ok()))
            }
            ["buat-organisasi"] => Route::BuatOrganisasi,
            ["perbarui-organisasi"] => Route::PerbaruiOrganisasi,
            ["list-appliance"] => Route::ListAppliance,
            ["list-verifier"] => Route::ListVerifier,
            ["verify-pengetahuan", id] => match id.parse() {
                Ok(id) => Route::VerifyPengetahuan(id),
                Err(_) => Route::NotFound(path.to_string()),
            },
            _ => Route::NotFound(path.to_string()),
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Landing => "/".to_string(),
            Route::Login => "/login".to_string(),
            Route::Register => "/register".to_string(),
            Route::VerifyRegistration => "/verify-registration".to_string(),
            Route::Dashboard => "/dashboard".to_string(),
            Route::Home => "/home".to_string(),
            Route::ArsipList => "/arsip".to_string(),
            Route::ArsipDetail(id) => format!("/arsip/{id}"),
            Route::Profile => "/profile".to_string(),
            Route::BuatArsip => "/buat-arsip".to_string(),
            Route::TambahPengetahuan(Some(id)) => format!("/tambah-pengetahuan?documentId={id}"),
            Route::TambahPengetahuan(None) => "/tambah-pengetahuan".to_string(),
            Route::BuatOrganisasi => "/buat-organisasi".to_string(),
            Route::PerbaruiOrganisasi => "/perbarui-organisasi".to_string(),
            Route::ListAppliance => "/list-appliance".to_string(),
            Route::ListVerifier => "/list-verifier".to_string(),
            Route::VerifyPengetahuan(id) => format!("/verify-pengetahuan/{id}"),
            Route::NotFound(path) => path.clone(),
        }
    }

    /// Routes that require a stored bearer token.
    pub fn is_protected(&self) -> bool {
        matches!(
            self,
            Route::Dashboard
                | Route::Home
                | Route::Profile
                | Route::BuatArsip
                | Route::TambahPengetahuan(_)
                | Route::BuatOrganisasi
                | Route::PerbaruiOrganisasi
                | Route::ListAppliance
                | Route::ListVerifier
                | Route::VerifyPengetahuan(_)
        )
    }

    /// Login, registration and OTP screens render without the navbar.
    pub fn is_auth_screen(&self) -> bool {
        matches!(self, Route::Login | Route::Register | Route::VerifyRegistration)
    }

    pub fn shows_navbar(&self) -> bool {
        !self.is_auth_screen() && !matches!(self, Route::NotFound(_) | Route::Home)
    }

    /// The gate: protected routes need a token to be present. Whether the token
    /// is still valid is not checked here.
    pub fn guard(self, has_token: bool) -> RouteDecision {
        if self.is_protected() && !has_token {
            RouteDecision::Redirect(Route::Login)
        } else {
            RouteDecision::Render(self)
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

fn query_param<'a>(query: &'a str, key: &str) -> Option<&'a str> {
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| *k == key)
        .map(|(_, v)| v)
}
