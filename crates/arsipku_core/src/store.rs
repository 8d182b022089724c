//! crates/arsipku_core/src/store.rs
//!
//! The application state and its reducers. State is a plain serializable value;
//! every change goes through an [`Action`] and a pure reducer, one per slice.

use crate::domain::{Document, Profile};
use crate::routes::Route;
use serde::{Deserialize, Serialize};

/// How many landing-page documents are shown.
pub const LANDING_POST_COUNT: usize = 3;

//=========================================================================================
// Slices
//=========================================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub username: Option<String>,
    pub is_authenticated: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModalKind {
    #[default]
    Info,
    Success,
    Error,
    Loading,
    Confirm,
}

/// What happens when the user confirms a modal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModalAction {
    Navigate(String),
    ReloadAppliances,
    /// The "delete organization?" confirmation.
    DeleteOrganization(i64),
    Dismiss,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModalState {
    pub is_open: bool,
    pub kind: ModalKind,
    pub message: String,
    pub on_confirm: Option<ModalAction>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchState {
    pub term: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoadStatus {
    #[default]
    Idle,
    Loading,
    Succeeded,
    Failed,
}

/// Documents shown on the landing page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostsState {
    pub documents: Vec<Document>,
    pub status: LoadStatus,
    pub error: Option<String>,
}

impl PostsState {
    pub fn latest(&self) -> &[Document] {
        let n = self.documents.len().min(LANDING_POST_COUNT);
        &self.documents[..n]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppState {
    pub session: SessionState,
    pub modal: ModalState,
    pub search: SearchState,
    pub profile: Option<Profile>,
    pub posts: PostsState,
    pub location: Route,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            session: SessionState::default(),
            modal: ModalState::default(),
            search: SearchState::default(),
            profile: None,
            posts: PostsState::default(),
            location: Route::Landing,
        }
    }
}

//=========================================================================================
// Actions and Reducers
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Action {
    LoggedIn { username: String },
    /// The user from the profile loaded at start-up.
    UserLoaded(Profile),
    LoggedOut,
    OpenModal {
        kind: ModalKind,
        message: String,
        on_confirm: Option<ModalAction>,
    },
    CloseModal,
    SetSearchTerm(String),
    PostsRequested,
    PostsLoaded(Vec<Document>),
    PostsFailed(String),
    Navigate(Route),
}

impl Action {
    pub fn modal(kind: ModalKind, message: impl Into<String>) -> Self {
        Action::OpenModal {
            kind,
            message: message.into(),
            on_confirm: None,
        }
    }
}

pub fn reduce_session(state: SessionState, action: &Action) -> SessionState {
    match action {
        Action::LoggedIn { username } => SessionState {
            username: Some(username.clone()),
            is_authenticated: true,
        },
        Action::UserLoaded(profile) => SessionState {
            username: Some(profile.username.clone()),
            is_authenticated: true,
        },
        Action::LoggedOut => SessionState::default(),
        _ => state,
    }
}

pub fn reduce_modal(state: ModalState, action: &Action) -> ModalState {
    match action {
        Action::OpenModal {
            kind,
            message,
            on_confirm,
        } => ModalState {
            is_open: true,
            kind: *kind,
            message: message.clone(),
            on_confirm: on_confirm.clone(),
        },
        Action::CloseModal => ModalState::default(),
        _ => state,
    }
}

pub fn reduce_search(state: SearchState, action: &Action) -> SearchState {
    match action {
        Action::SetSearchTerm(term) => SearchState { term: term.clone() },
        _ => state,
    }
}

pub fn reduce_profile(state: Option<Profile>, action: &Action) -> Option<Profile> {
    match action {
        Action::UserLoaded(profile) => Some(profile.clone()),
        Action::LoggedOut => None,
        _ => state,
    }
}

pub fn reduce_posts(state: PostsState, action: &Action) -> PostsState {
    match action {
        Action::PostsRequested => PostsState {
            status: LoadStatus::Loading,
            error: None,
            ..state
        },
        Action::PostsLoaded(documents) => PostsState {
            documents: documents.clone(),
            status: LoadStatus::Succeeded,
            error: None,
        },
        Action::PostsFailed(error) => PostsState {
            status: LoadStatus::Failed,
            error: Some(error.clone()),
            ..state
        },
        _ => state,
    }
}

pub fn reduce_location(state: Route, action: &Action) -> Route {
    match action {
        Action::Navigate(route) => route.clone(),
        _ => state,
    }
}

/// Runs every slice reducer over `action`.
pub fn reduce(state: AppState, action: &Action) -> AppState {
    AppState {
        session: reduce_session(state.session, action),
        modal: reduce_modal(state.modal, action),
        search: reduce_search(state.search, action),
        profile: reduce_profile(state.profile, action),
        posts: reduce_posts(state.posts, action),
        location: reduce_location(state.location, action),
    }
}
