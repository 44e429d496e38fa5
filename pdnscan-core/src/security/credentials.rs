//! Secure credential container with automatic memory zeroing.
//!
//! # Security
//! - Credentials are stored in `Zeroizing<T>` containers
//! - Memory is cleared when credentials go out of scope
//! - `Debug` output never shows the password

use zeroize::{Zeroize, Zeroizing};

/// Secure credential container that automatically zeros memory on drop.
///
/// # Example
///
/// ```rust
/// use pdnscan_core::security::Credentials;
///
/// let creds = Credentials::new("auditor".to_string(), Some("secret".to_string()));
/// assert_eq!(creds.username(), "auditor");
/// assert!(creds.has_password());
/// assert!(!format!("{creds:?}").contains("secret"));
/// ```
#[derive(Clone, Zeroize)]
#[zeroize(drop)]
pub struct Credentials {
    username: Zeroizing<String>,
    password: Zeroizing<Option<String>>,
}

impl Credentials {
    /// Creates new credentials with automatic memory zeroing.
    pub fn new(username: String, password: Option<String>) -> Self {
        Self {
            username: Zeroizing::new(username),
            password: Zeroizing::new(password),
        }
    }

    /// Credentials for engines that do not authenticate (SQLite).
    pub fn anonymous() -> Self {
        Self::new(String::new(), None)
    }

    /// Gets the username.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Gets the password for handing to a database driver.
    ///
    /// The returned slice must not be logged or copied into long-lived storage.
    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    /// Checks if password is present without exposing it.
    pub fn has_password(&self) -> bool {
        self.password.is_some()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username.as_str())
            .field("password", &self.password.as_ref().map(|_| "****"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_new() {
        let creds = Credentials::new("testuser".to_string(), Some("testpass".to_string()));
        assert_eq!(creds.username(), "testuser");
        assert_eq!(creds.password(), Some("testpass"));
        assert!(creds.has_password());
    }

    #[test]
    fn test_credentials_anonymous() {
        let creds = Credentials::anonymous();
        assert_eq!(creds.username(), "");
        assert!(!creds.has_password());
    }

    #[test]
    fn test_credentials_debug_hides_password() {
        let creds = Credentials::new("sa".to_string(), Some("hunter2".to_string()));
        let debug = format!("{creds:?}");
        assert!(debug.contains("sa"));
        assert!(debug.contains("****"));
        assert!(!debug.contains("hunter2"));
    }
}
