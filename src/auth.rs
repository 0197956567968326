//! Authentication provider for the engine connection.
//!
//! The statement protocol authenticates with HTTP Basic Auth; the provider
//! attaches the appropriate `Authorization` header to every request.

use base64::{engine::general_purpose, Engine as _};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};

use crate::error::{Result, TrinoLinkError};

/// Credentials applied to every engine request.
#[derive(Debug, Clone, Default)]
pub enum AuthProvider {
    /// HTTP Basic Auth (username, password), RFC 7617.
    Basic(String, String),

    /// No authentication.
    #[default]
    None,
}

impl AuthProvider {
    /// Create HTTP Basic Auth credentials.
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Basic(username.into(), password.into())
    }

    /// No authentication.
    pub fn none() -> Self {
        Self::None
    }

    /// `true` when credentials are configured.
    pub fn is_authenticated(&self) -> bool {
        !matches!(self, Self::None)
    }

    /// Attach the `Authorization` header for these credentials.
    pub(crate) fn apply_to_headers(&self, headers: &mut HeaderMap) -> Result<()> {
        match self {
            Self::Basic(username, password) => {
                let credentials = format!("{}:{}", username, password);
                let encoded = general_purpose::STANDARD.encode(credentials.as_bytes());
                let value = HeaderValue::from_str(&format!("Basic {}", encoded))
                    .map_err(|e| TrinoLinkError::Configuration(e.to_string()))?;
                headers.insert(AUTHORIZATION, value);
                Ok(())
            }
            Self::None => Ok(()),
        }
    }
}
