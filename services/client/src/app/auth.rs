//! services/client/src/app/auth.rs
//!
//! Login, registration with OTP verification, logout and the start-up session check.

use super::state::AppContext;
use arsipku_core::domain::{Credentials, FieldError, Registration, RegistrationTicket};
use arsipku_core::ports::PortError;
use arsipku_core::routes::Route;
use arsipku_core::store::{Action, ModalAction, ModalKind};
use std::collections::BTreeMap;
use tracing::{error, info, warn};

/// Inline error text per form field, keyed by the API's field name.
pub type FieldErrors = BTreeMap<String, String>;

pub fn field_map(fields: &[FieldError]) -> FieldErrors {
    fields
        .iter()
        .map(|f| (f.field.clone(), f.message.clone()))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormOutcome<T> {
    Done(T),
    /// Shown next to the inputs; no dialog is opened.
    FieldErrors(FieldErrors),
    /// A dialog with this message has been opened.
    Failed(String),
}

//=========================================================================================
// Login / Logout
//=========================================================================================

pub async fn login(ctx: &AppContext, username: &str, password: &str) -> FormOutcome<String> {
    let credentials = Credentials {
        username: username.to_string(),
        password: password.to_string(),
    };
    match ctx.api.login(&credentials).await {
        Ok(session) => {
            if let Err(e) = ctx.tokens.save(&session.token) {
                error!("Failed to store the token: {}", e);
                let message = "Terjadi kesalahan saat login.".to_string();
                ctx.show(ModalKind::Error, message.clone()).await;
                return FormOutcome::Failed(message);
            }
            info!("Logged in as {}", session.username);
            ctx.show(
                ModalKind::Success,
                session.message.unwrap_or_else(|| "Login berhasil!".to_string()),
            )
            .await;
            ctx.dispatch(Action::LoggedIn {
                username: session.username.clone(),
            })
            .await;
            ctx.navigate(Route::Dashboard).await;
            FormOutcome::Done(session.username)
        }
        Err(e) => {
            form_failure(
                ctx,
                e,
                "Login gagal. Silakan coba lagi.",
                "Terjadi kesalahan saat login.",
            )
            .await
        }
    }
}

/// Clears the user and the stored token, then shows the login screen.
pub async fn logout(ctx: &AppContext) {
    ctx.dispatch(Action::LoggedOut).await;
    if let Err(e) = ctx.tokens.clear() {
        warn!("Failed to remove the stored token: {}", e);
    }
    ctx.navigate(Route::Login).await;
}

/// Start-up check: a stored token is only trusted if `/profile` answers.
pub async fn initialize(ctx: &AppContext) {
    if !ctx.tokens.has_token() {
        return;
    }
    match ctx.api.get_profile().await {
        Ok(Some(profile)) => {
            info!("Restored session for {}", profile.username);
            ctx.dispatch(Action::UserLoaded(profile)).await;
        }
        Ok(None) | Err(_) => {
            warn!("Stored token was not accepted; signing out");
            if let Err(e) = ctx.tokens.clear() {
                warn!("Failed to remove the stored token: {}", e);
            }
            ctx.dispatch(Action::LoggedOut).await;
        }
    }
}

//=========================================================================================
// Registration
//=========================================================================================

pub const MISSING_TICKET_MESSAGE: &str =
    "OTP tidak ditemukan. Silakan kembali ke halaman register dan coba lagi.";

/// On success the returned ticket carries the email (and OTP) to the
/// verification screen.
pub async fn register(
    ctx: &AppContext,
    registration: &Registration,
) -> FormOutcome<RegistrationTicket> {
    match ctx.api.register(registration).await {
        Ok(ticket) => {
            let message = ticket.message.clone().unwrap_or_else(|| {
                "Pendaftaran berhasil! Silakan verifikasi email Anda.".to_string()
            });
            ctx.show_then(
                ModalKind::Success,
                message,
                ModalAction::Navigate(Route::VerifyRegistration.path()),
            )
            .await;
            FormOutcome::Done(ticket)
        }
        Err(e) => {
            form_failure(
                ctx,
                e,
                "Pendaftaran gagal. Silakan coba lagi.",
                "Terjadi kesalahan saat pendaftaran.",
            )
            .await
        }
    }
}

pub async fn verify_registration(
    ctx: &AppContext,
    ticket: Option<&RegistrationTicket>,
    token: &str,
) -> FormOutcome<()> {
    let Some(ticket) = ticket else {
        return FormOutcome::Failed(MISSING_TICKET_MESSAGE.to_string());
    };
    match ctx.api.verify_registration(&ticket.email, token.trim()).await {
        Ok(message) => {
            let message = if message.is_empty() {
                "Verifikasi berhasil!".to_string()
            } else {
                message
            };
            ctx.show_then(
                ModalKind::Success,
                message,
                ModalAction::Navigate(Route::Login.path()),
            )
            .await;
            FormOutcome::Done(())
        }
        Err(e) => {
            form_failure(
                ctx,
                e,
                "Verifikasi gagal. Silakan coba lagi.",
                "Terjadi kesalahan saat verifikasi.",
            )
            .await
        }
    }
}

/// Field errors stay on the form; server messages and transport failures
/// open a dialog.
async fn form_failure<T>(
    ctx: &AppContext,
    err: PortError,
    rejected: &str,
    offline: &str,
) -> FormOutcome<T> {
    let message = match &err {
        PortError::Validation(fields) if !fields.is_empty() => {
            return FormOutcome::FieldErrors(field_map(fields));
        }
        PortError::Transport(_) | PortError::Decode(_) => {
            error!("{}: {}", offline, err);
            offline.to_string()
        }
        other => other.user_message(rejected),
    };
    ctx.show(ModalKind::Error, message.clone()).await;
    FormOutcome::Failed(message)
}
