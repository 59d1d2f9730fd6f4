//! Access-token sources.
//!
//! The dispatcher reads the current token before every request and never
//! writes it; token acquisition and refresh belong to the host application.

use keyring::Entry;
use tracing::{debug, warn};

pub const DEFAULT_KEYCHAIN_SERVICE: &str = "MojioSDK";
pub const DEFAULT_KEYCHAIN_ACCOUNT: &str = "access_token";

/// Read-only view of the current access token.
pub trait TokenStore: Send + Sync {
    /// The token to send as `Authorization: Bearer`, if any.
    fn access_token(&self) -> Option<String>;
}

/// Token kept in the platform keychain (Keychain Access, Credential Manager,
/// Secret Service).
pub struct KeychainTokenStore {
    service: String,
    account: String,
    entry: Option<Entry>,
}

impl KeychainTokenStore {
    pub fn new(service: impl Into<String>, account: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            account: account.into(),
            entry: None,
        }
    }

    /// Read through `entry` instead of looking up service and account in
    /// the default credential store.
    pub fn with_entry(mut self, entry: Entry) -> Self {
        self.entry = Some(entry);
        self
    }

    fn read(&self, entry: &Entry) -> Option<String> {
        match entry.get_password() {
            Ok(token) if !token.is_empty() => Some(token),
            Ok(_) => None,
            Err(keyring::Error::NoEntry) => {
                debug!(service = %self.service, "no access token in keychain");
                None
            }
            Err(err) => {
                warn!(service = %self.service, error = %err, "failed to read access token");
                None
            }
        }
    }
}

impl Default for KeychainTokenStore {
    fn default() -> Self {
        Self::new(DEFAULT_KEYCHAIN_SERVICE, DEFAULT_KEYCHAIN_ACCOUNT)
    }
}

impl std::fmt::Debug for KeychainTokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeychainTokenStore")
            .field("service", &self.service)
            .field("account", &self.account)
            .finish_non_exhaustive()
    }
}

impl TokenStore for KeychainTokenStore {
    fn access_token(&self) -> Option<String> {
        if let Some(entry) = &self.entry {
            return self.read(entry);
        }
        match Entry::new(&self.service, &self.account) {
            Ok(entry) => self.read(&entry),
            Err(err) => {
                warn!(service = %self.service, error = %err, "keychain entry unavailable");
                None
            }
        }
    }
}

/// A fixed token, for tests and hosts that manage tokens themselves.
#[derive(Debug, Clone)]
pub struct StaticToken(pub String);

impl TokenStore for StaticToken {
    fn access_token(&self) -> Option<String> {
        Some(self.0.clone())
    }
}

/// Anonymous requests.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoToken;

impl TokenStore for NoToken {
    fn access_token(&self) -> Option<String> {
        None
    }
}
