//! services/client/src/app/profile.rs

use super::auth;
use super::state::AppContext;
use arsipku_core::domain::{Profile, ProfileUpdate};
use arsipku_core::store::{Action, ModalKind};
use tracing::error;

/// Loads the profile into the store and returns it for the form.
pub async fn load(ctx: &AppContext) -> Option<Profile> {
    let result = ctx
        .with_loading("Loading profile...", ctx.api.get_profile())
        .await;
    match result {
        Ok(Some(profile)) => {
            ctx.dispatch(Action::UserLoaded(profile.clone())).await;
            Some(profile)
        }
        Ok(None) => {
            ctx.show(ModalKind::Error, "Failed to fetch profile data.").await;
            None
        }
        Err(e) => {
            if e.is_session_expired() {
                return None;
            }
            error!("Failed to fetch profile: {}", e);
            ctx.show(ModalKind::Error, "Failed to fetch profile data.").await;
            None
        }
    }
}

/// A blank `password` leaves the current one unchanged.
pub async fn update(
    ctx: &AppContext,
    name: &str,
    password: &str,
    status_notification: bool,
) -> bool {
    let update = ProfileUpdate {
        name: name.trim().to_string(),
        password: Some(password.to_string()).filter(|p| !p.is_empty()),
        status_notification,
    };
    let result = ctx
        .with_loading("Updating profile...", ctx.api.update_profile(&update))
        .await;
    match result {
        Ok(()) => {
            ctx.show(ModalKind::Success, "Profile updated successfully!")
                .await;
            if let Ok(Some(profile)) = ctx.api.get_profile().await {
                ctx.dispatch(Action::UserLoaded(profile)).await;
            }
            true
        }
        Err(e) => {
            if !e.is_session_expired() {
                error!("Failed to update profile: {}", e);
                ctx.show(ModalKind::Error, "Failed to update profile.").await;
            }
            false
        }
    }
}

/// Deletes the account and signs out.
pub async fn delete(ctx: &AppContext) -> bool {
    let result = ctx
        .with_loading("Memproses...", ctx.api.delete_profile())
        .await;
    match result {
        Ok(()) => {
            auth::logout(ctx).await;
            true
        }
        Err(e) => {
            ctx.report(&e, "Gagal menghapus akun.").await;
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::MemoryTokenStore;
    use crate::app::testing::{profile, StubApi};
    use arsipku_core::ports::{PortError, TokenStore};
    use arsipku_core::routes::Route;
    use std::sync::Arc;

    #[tokio::test]
    async fn load_caches_the_profile() {
        let api = StubApi {
            profile: Ok(Some(profile("alice"))),
            ..StubApi::default()
        };
        let ctx = AppContext::new(Arc::new(api), Arc::new(MemoryTokenStore::with_token("t")), 10);
        let loaded = load(&ctx).await.unwrap();
        let state = ctx.state().await;
        assert_eq!(state.profile, Some(loaded));
        assert!(!state.modal.is_open);
    }

    #[tokio::test]
    async fn failed_update_shows_fixed_message() {
        let api = StubApi {
            write: Err(PortError::Api {
                status: 500,
                code: None,
                message: "boom".into(),
            }),
            ..StubApi::default()
        };
        let ctx = AppContext::new(Arc::new(api), Arc::new(MemoryTokenStore::with_token("t")), 10);
        assert!(!update(&ctx, "Alice", "", true).await);
        assert_eq!(ctx.state().await.modal.message, "Failed to update profile.");
    }

    #[tokio::test]
    async fn delete_signs_out() {
        let tokens = Arc::new(MemoryTokenStore::with_token("t"));
        let ctx = AppContext::new(Arc::new(StubApi::default()), tokens.clone(), 10);
        assert!(delete(&ctx).await);
        assert!(!tokens.has_token());
        assert_eq!(ctx.state().await.location, Route::Login);
    }
}
