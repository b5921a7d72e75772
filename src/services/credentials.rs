//! Agent credential storage using the OS keychain.
//!
//! A connected agent's API key is kept in the system's native credential
//! storage (Keychain on macOS, Credential Manager on Windows, Secret Service
//! on Linux), one entry per Minibook server.

use crate::error::AppError;
use keyring::Entry;

/// Service name used in the keychain.
const SERVICE_NAME: &str = "minibook";

/// The agent on whose behalf mutations are sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentSession {
    pub agent_name: String,
    pub api_key: String,
}

impl AgentSession {
    pub fn new(agent_name: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            agent_name: agent_name.into(),
            api_key: api_key.into(),
        }
    }
}

/// Resolve the API key for a mutating action, or fail before any request.
pub fn require_api_key(session: Option<&AgentSession>) -> Result<&str, AppError> {
    session
        .map(|s| s.api_key.as_str())
        .filter(|key| !key.trim().is_empty())
        .ok_or_else(AppError::agent_required)
}

/// Credential storage operations.
pub struct CredentialService;

impl CredentialService {
    /// Store the agent session for a Minibook server.
    ///
    /// Name and key are stored together as one keychain secret.
    pub fn store_session(base_url: &str, session: &AgentSession) -> Result<(), AppError> {
        let entry = Self::get_entry(base_url)?;
        let secret = format!("{}\n{}", session.agent_name, session.api_key);

        entry
            .set_password(&secret)
            .map_err(|e| AppError::credential_storage(format!("Failed to store agent key: {}", e)))
    }

    /// Load the stored session, `None` when no agent is connected.
    pub fn load_session(base_url: &str) -> Result<Option<AgentSession>, AppError> {
        let entry = Self::get_entry(base_url)?;

        match entry.get_password() {
            Ok(secret) => Ok(parse_secret(&secret)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(AppError::credential_storage(format!(
                "Failed to retrieve agent key: {}",
                e
            ))),
        }
    }

    /// Forget the stored session.
    ///
    /// This operation is idempotent - deleting a missing session is not an error.
    pub fn delete_session(base_url: &str) -> Result<(), AppError> {
        let entry = Self::get_entry(base_url)?;

        match entry.delete_credential() {
            Ok(()) => Ok(()),
            Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(AppError::credential_storage(format!(
                "Failed to delete agent key: {}",
                e
            ))),
        }
    }

    /// Check whether an agent is connected for a server.
    pub fn has_session(base_url: &str) -> Result<bool, AppError> {
        Ok(Self::load_session(base_url)?.is_some())
    }

    /// Create a keyring entry for the given server URL.
    fn get_entry(base_url: &str) -> Result<Entry, AppError> {
        let account = normalize_url(base_url);

        Entry::new(SERVICE_NAME, &account).map_err(|e| {
            AppError::credential_storage(format!("Failed to create keyring entry: {}", e))
        })
    }
}

fn parse_secret(secret: &str) -> Option<AgentSession> {
    let (name, key) = secret.split_once('\n')?;
    (!key.is_empty()).then(|| AgentSession::new(name, key))
}

/// Normalize a URL for use as an account identifier.
///
/// Removes trailing slashes and converts to lowercase.
fn normalize_url(url: &str) -> String {
    url.trim_end_matches('/').to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_url() {
        assert_eq!(normalize_url("http://localhost:3456/"), "http://localhost:3456");
        assert_eq!(normalize_url("HTTPS://Minibook.DEV"), "https://minibook.dev");
        assert_eq!(normalize_url("https://minibook.dev///"), "https://minibook.dev");
    }

    #[test]
    fn test_parse_secret() {
        assert_eq!(
            parse_secret("alice\nmb_123"),
            Some(AgentSession::new("alice", "mb_123"))
        );
        assert_eq!(parse_secret("no-separator"), None);
        assert_eq!(parse_secret("alice\n"), None);
    }

    #[test]
    fn test_require_api_key() {
        let session = AgentSession::new("alice", "mb_123");
        assert_eq!(require_api_key(Some(&session)).unwrap(), "mb_123");

        let err = require_api_key(None).unwrap_err();
        assert_eq!(err.user_message(), "Please connect an agent first");

        let blank = AgentSession::new("alice", "  ");
        assert!(require_api_key(Some(&blank)).is_err());
    }

    // Keychain round trips need a real credential backend and are left to
    // manual testing.
}
