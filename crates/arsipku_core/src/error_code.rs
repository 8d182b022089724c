//! crates/arsipku_core/src/error_code.rs
//!
//! Machine-readable error codes sent by the API and the single table that
//! decides how the client reacts to a failed response.

use serde::{Deserialize, Serialize};
use std::fmt;

/// HTTP status codes the dispatch table cares about.
const UNAUTHORIZED: u16 = 401;
const BAD_REQUEST: u16 = 400;
const NOT_FOUND: u16 = 404;

/// The `error_code` field of an error body, kept bit-exact.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    /// `X01001`: the bearer credential is invalid or expired.
    InvalidSession,
    /// `DOC05FV055`: "DATA IS NOT FOUND".
    DataNotFound,
    /// Any code the client has no special handling for.
    Other(String),
}

impl ErrorCode {
    pub const INVALID_SESSION: &'static str = "X01001";
    pub const DATA_NOT_FOUND: &'static str = "DOC05FV055";

    pub fn from_wire(code: &str) -> Self {
        match code {
            Self::INVALID_SESSION => ErrorCode::InvalidSession,
            Self::DATA_NOT_FOUND => ErrorCode::DataNotFound,
            other => ErrorCode::Other(other.to_string()),
        }
    }

    pub fn as_wire(&self) -> &str {
        match self {
            ErrorCode::InvalidSession => Self::INVALID_SESSION,
            ErrorCode::DataNotFound => Self::DATA_NOT_FOUND,
            ErrorCode::Other(code) => code,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire())
    }
}

/// What the client does with a failed response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorPolicy {
    /// Clear the stored token and send the user to `/login`.
    RedirectToLogin,
    /// Render the view as if the list/status were empty.
    TreatAsEmpty,
    /// Show the message in a blocking error dialog.
    ShowMessage,
}

impl ErrorPolicy {
    /// The dispatch table from (status, code, message) to handling policy.
    pub fn classify(status: u16, code: Option<&ErrorCode>, message: Option<&str>) -> Self {
        match (status, code) {
            (UNAUTHORIZED, _) => ErrorPolicy::RedirectToLogin,
            (BAD_REQUEST, Some(ErrorCode::InvalidSession)) => ErrorPolicy::RedirectToLogin,
            (NOT_FOUND, _) => ErrorPolicy::TreatAsEmpty,
            (BAD_REQUEST, Some(ErrorCode::DataNotFound)) => ErrorPolicy::TreatAsEmpty,
            _ if message.is_some_and(is_no_data_message) => ErrorPolicy::TreatAsEmpty,
            _ => ErrorPolicy::ShowMessage,
        }
    }
}

/// Messages the server uses for "nothing here" on list endpoints.
fn is_no_data_message(message: &str) -> bool {
    let lowered = message.to_lowercase();
    lowered.contains("not found") || lowered.contains("no content")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_codes_round_trip_exactly() {
        assert_eq!(ErrorCode::from_wire("X01001"), ErrorCode::InvalidSession);
        assert_eq!(ErrorCode::from_wire("DOC05FV055"), ErrorCode::DataNotFound);
        assert_eq!(ErrorCode::InvalidSession.as_wire(), "X01001");
        assert_eq!(ErrorCode::DataNotFound.to_string(), "DOC05FV055");
        let other = ErrorCode::from_wire("AUT01FV001");
        assert_eq!(other, ErrorCode::Other("AUT01FV001".to_string()));
        assert_eq!(other.as_wire(), "AUT01FV001");
        // Codes are case-sensitive.
        assert_eq!(ErrorCode::from_wire("x01001"), ErrorCode::Other("x01001".into()));
    }

    #[test]
    fn session_errors_redirect() {
        assert_eq!(ErrorPolicy::classify(401, None, None), ErrorPolicy::RedirectToLogin);
        assert_eq!(
            ErrorPolicy::classify(400, Some(&ErrorCode::InvalidSession), Some("Token expired")),
            ErrorPolicy::RedirectToLogin
        );
        // X01001 only redirects on a 400.
        assert_eq!(
            ErrorPolicy::classify(500, Some(&ErrorCode::InvalidSession), None),
            ErrorPolicy::ShowMessage
        );
    }

    #[test]
    fn not_found_is_treated_as_empty() {
        assert_eq!(ErrorPolicy::classify(404, None, None), ErrorPolicy::TreatAsEmpty);
        assert_eq!(
            ErrorPolicy::classify(400, Some(&ErrorCode::DataNotFound), Some("DATA IS NOT FOUND")),
            ErrorPolicy::TreatAsEmpty
        );
        assert_eq!(
            ErrorPolicy::classify(400, None, Some("No Content")),
            ErrorPolicy::TreatAsEmpty
        );
    }

    #[test]
    fn everything_else_shows_a_message() {
        assert_eq!(
            ErrorPolicy::classify(400, None, Some("Judul wajib diisi")),
            ErrorPolicy::ShowMessage
        );
        assert_eq!(ErrorPolicy::classify(500, None, None), ErrorPolicy::ShowMessage);
    }
}
