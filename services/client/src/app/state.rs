//! services/client/src/app/state.rs
//!
//! Defines the shared application context every view controller receives.

use arsipku_core::ports::{ArsipkuApi, PortError, PortResult, TokenStore};
use arsipku_core::routes::{Route, RouteDecision};
use arsipku_core::store::{self, Action, AppState, ModalAction, ModalKind};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info};

//=========================================================================================
// Store (the single state container)
//=========================================================================================

/// Holds the `AppState` and applies actions through the core reducers.
#[derive(Default)]
pub struct Store {
    state: RwLock<AppState>,
}

impl Store {
    pub fn new(state: AppState) -> Self {
        Self {
            state: RwLock::new(state),
        }
    }

    pub async fn dispatch(&self, action: Action) {
        let mut state = self.state.write().await;
        let current = std::mem::take(&mut *state);
        *state = store::reduce(current, &action);
    }

    pub async fn snapshot(&self) -> AppState {
        self.state.read().await.clone()
    }
}

//=========================================================================================
// AppContext (shared by all controllers)
//=========================================================================================

#[derive(Clone)]
pub struct AppContext {
    pub api: Arc<dyn ArsipkuApi>,
    pub tokens: Arc<dyn TokenStore>,
    pub store: Arc<Store>,
    pub page_size: u32,
}

impl AppContext {
    pub fn new(api: Arc<dyn ArsipkuApi>, tokens: Arc<dyn TokenStore>, page_size: u32) -> Self {
        Self {
            api,
            tokens,
            store: Arc::new(Store::default()),
            page_size,
        }
    }

    pub async fn dispatch(&self, action: Action) {
        self.store.dispatch(action).await;
    }

    pub async fn state(&self) -> AppState {
        self.store.snapshot().await
    }

    /// Moves to `route` through the auth gate and returns where we ended up.
    pub async fn navigate(&self, route: Route) -> Route {
        let target = match route.guard(self.tokens.has_token()) {
            RouteDecision::Render(route) => route,
            RouteDecision::Redirect(route) => {
                info!("No stored token; redirecting to {}", route);
                route
            }
        };
        self.dispatch(Action::Navigate(target.clone())).await;
        target
    }

    /// Runs `call` behind the loading overlay. The overlay is closed when the
    /// call finishes unless something else replaced it meanwhile.
    pub async fn with_loading<T, F>(&self, message: &str, call: F) -> PortResult<T>
    where
        F: Future<Output = PortResult<T>>,
    {
        self.dispatch(Action::modal(ModalKind::Loading, message)).await;
        let result = call.await;
        if self.state().await.modal.kind == ModalKind::Loading {
            self.dispatch(Action::CloseModal).await;
        }
        if let Err(PortError::SessionExpired) = &result {
            self.session_expired().await;
        }
        result
    }

    pub async fn show(&self, kind: ModalKind, message: impl Into<String>) {
        self.dispatch(Action::modal(kind, message)).await;
    }

    pub async fn show_then(
        &self,
        kind: ModalKind,
        message: impl Into<String>,
        on_confirm: ModalAction,
    ) {
        self.dispatch(Action::OpenModal {
            kind,
            message: message.into(),
            on_confirm: Some(on_confirm),
        })
        .await;
    }

    /// Reports a failed call: session loss redirects to login, anything else
    /// becomes an error dialog with the server's message or `default`.
    pub async fn report(&self, err: &PortError, default: &str) {
        if err.is_session_expired() {
            self.session_expired().await;
            return;
        }
        error!("{}: {}", default, err);
        self.show(ModalKind::Error, err.user_message(default)).await;
    }

    /// The global redirect: forget the user and show the login screen.
    pub async fn session_expired(&self) {
        self.dispatch(Action::LoggedOut).await;
        self.navigate(Route::Login).await;
    }

    /// The user pressed OK on the open modal. Navigation callbacks run here;
    /// the others are returned for the view that owns them.
    pub async fn confirm_modal(&self) -> Option<ModalAction> {
        let action = self.state().await.modal.on_confirm;
        self.dispatch(Action::CloseModal).await;
        match action {
            Some(ModalAction::Navigate(path)) => {
                self.navigate(Route::parse(&path)).await;
                None
            }
            Some(ModalAction::Dismiss) | None => None,
            other => other,
        }
    }
}
