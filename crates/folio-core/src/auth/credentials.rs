use anyhow::{Context, Result};
use keyring::Entry;

const SERVICE_NAME: &str = "folio";

/// Remembered passwords, kept in the OS keychain.
///
/// Entries are keyed by account and API, so the same email can have
/// different passwords on a local dev server and on production.
pub struct CredentialStore;

impl CredentialStore {
    /// Keychain account name for `email` on the API at `api_url`.
    pub fn account(api_url: &str, email: &str) -> String {
        format!(
            "{}@{}",
            email.trim().to_lowercase(),
            api_url.trim().trim_end_matches('/')
        )
    }

    fn entry(api_url: &str, email: &str) -> Result<Entry> {
        Entry::new(SERVICE_NAME, &Self::account(api_url, email))
            .context("Failed to create keyring entry")
    }

    /// Store the password for an account in the OS keychain
    pub fn store(api_url: &str, email: &str, password: &str) -> Result<()> {
        Self::entry(api_url, email)?
            .set_password(password)
            .context("Failed to store password in keychain")
    }

    /// Retrieve the password for an account from the OS keychain
    pub fn get_password(api_url: &str, email: &str) -> Result<String> {
        Self::entry(api_url, email)?
            .get_password()
            .context("Failed to retrieve password from keychain")
    }

    /// Delete stored credentials for an account
    pub fn delete(api_url: &str, email: &str) -> Result<()> {
        Self::entry(api_url, email)?
            .delete_credential()
            .context("Failed to delete credential from keychain")
    }
}
