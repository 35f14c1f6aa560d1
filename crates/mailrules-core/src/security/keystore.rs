//! Encryption secret storage using the system keyring.
//!
//! Stores the password-encryption secret in the platform's native
//! credential storage:
//! - Linux: Secret Service (GNOME Keyring, `KWallet`)
//! - macOS: Keychain
//! - Windows: Credential Manager

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use keyring::Entry;
use ring::rand::{SecureRandom, SystemRandom};
use tracing::{debug, warn};

use super::EncryptionError;
use crate::Result;

/// Service name used for keyring entries.
const SERVICE_NAME: &str = "mailrules";

/// Keyring user under which the encryption secret is stored.
const ENCRYPTION_KEY_USER: &str = "encryption_key";

/// Size of a generated secret, in bytes.
const GENERATED_KEY_LEN: usize = 32;

fn entry() -> Result<Entry> {
    Ok(Entry::new(SERVICE_NAME, ENCRYPTION_KEY_USER)?)
}

/// Stores the encryption secret in the system keyring.
///
/// # Errors
///
/// Returns an error if the keyring operation fails.
pub fn store_encryption_key(secret: &str) -> Result<()> {
    entry()?.set_password(secret)?;
    debug!("Stored encryption key in keyring");
    Ok(())
}

/// Retrieves the encryption secret from the system keyring.
///
/// # Errors
///
/// Returns an error if the keyring operation fails.
pub fn get_encryption_key() -> Result<Option<String>> {
    match entry()?.get_password() {
        Ok(secret) => Ok(Some(secret)),
        Err(keyring::Error::NoEntry) => {
            debug!("No encryption key found in keyring");
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

/// Deletes the encryption secret from the system keyring.
///
/// # Errors
///
/// Returns an error if the keyring operation fails (except for a missing entry).
pub fn delete_encryption_key() -> Result<()> {
    match entry()?.delete_credential() {
        Ok(()) => {
            debug!("Deleted encryption key from keyring");
            Ok(())
        }
        Err(keyring::Error::NoEntry) => {
            debug!("No encryption key to delete");
            Ok(())
        }
        Err(e) => {
            warn!("Failed to delete encryption key: {e}");
            Err(e.into())
        }
    }
}

/// Generates a fresh random secret, base64 encoded.
///
/// # Errors
///
/// Returns an error if the system random generator fails.
pub fn generate_encryption_key() -> Result<String> {
    let mut bytes = [0u8; GENERATED_KEY_LEN];
    SystemRandom::new()
        .fill(&mut bytes)
        .map_err(|_| EncryptionError::Random)?;
    Ok(STANDARD.encode(bytes))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    // Note: keyring tests interact with the actual system keyring.
    // They are ignored by default. Run manually with `cargo test -- --ignored`

    use super::*;

    #[test]
    fn generated_keys_are_random() {
        let a = generate_encryption_key().unwrap();
        let b = generate_encryption_key().unwrap();
        assert_ne!(a, b);
        assert_eq!(STANDARD.decode(&a).unwrap().len(), GENERATED_KEY_LEN);
    }

    #[test]
    #[ignore = "Interacts with system keyring"]
    fn test_store_and_retrieve_key() {
        store_encryption_key("test-key-12345").unwrap();
        assert_eq!(get_encryption_key().unwrap(), Some("test-key-12345".to_string()));

        delete_encryption_key().unwrap();
        assert_eq!(get_encryption_key().unwrap(), None);
    }
}
