//! Password encryption.
//!
//! Passwords are encrypted with AES-256-GCM. The nonce is derived from the
//! plaintext with a keyed HMAC, which makes encryption deterministic: the
//! same password always yields the same cipher text under the same secret.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use ring::aead::{AES_256_GCM, Aad, LessSafeKey, NONCE_LEN, Nonce, UnboundKey};
use ring::{digest, hmac};

use crate::account::credentials::EncryptedPassword;
use crate::account::validation::ValidationError;

/// Domain separation between the encryption key and the nonce key.
const NONCE_CONTEXT: &[u8] = b"mailrules/password-nonce/";

/// Error type for cipher operations.
#[derive(Debug, thiserror::Error)]
pub enum EncryptionError {
    /// Plain or cipher text was empty.
    #[error("Input cannot be empty")]
    EmptyInput,

    /// The encryption secret was empty.
    #[error("Encryption secret cannot be empty")]
    EmptySecret,

    /// Cipher text is not valid base64.
    #[error("Invalid cipher text encoding: {0}")]
    Encoding(#[from] base64::DecodeError),

    /// Cipher text is shorter than nonce plus tag.
    #[error("Cipher text is too short")]
    Truncated,

    /// Sealing or opening failed (wrong key or tampered data).
    #[error("Cipher operation failed")]
    Cipher,

    /// Decrypted bytes are not UTF-8.
    #[error("Decrypted password is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// The system random generator failed.
    #[error("Failed to generate random key material")]
    Random,
}

/// Encrypts and decrypts account passwords.
pub trait PasswordCipher: Send + Sync {
    /// Encrypt a raw password.
    ///
    /// # Errors
    ///
    /// Returns an error if `raw` is empty or the cipher fails.
    fn encrypt(&self, raw: &str) -> Result<String, EncryptionError>;

    /// Decrypt a cipher text produced by [`PasswordCipher::encrypt`].
    ///
    /// # Errors
    ///
    /// Returns an error if `cipher_text` is empty, malformed, or was not
    /// produced with the same secret.
    fn decrypt(&self, cipher_text: &str) -> Result<String, EncryptionError>;
}

/// AES-256-GCM cipher keyed from a secret string.
pub struct AesGcmCipher {
    key: LessSafeKey,
    nonce_key: hmac::Key,
}

impl AesGcmCipher {
    /// Derive a cipher from a secret.
    ///
    /// # Errors
    ///
    /// Returns an error if the secret is empty.
    pub fn from_secret(secret: &str) -> Result<Self, EncryptionError> {
        if secret.is_empty() {
            return Err(EncryptionError::EmptySecret);
        }

        let key_bytes = digest::digest(&digest::SHA256, secret.as_bytes());
        let unbound =
            UnboundKey::new(&AES_256_GCM, key_bytes.as_ref()).map_err(|_| EncryptionError::Cipher)?;

        let nonce_seed = digest::digest(
            &digest::SHA256,
            &[NONCE_CONTEXT, secret.as_bytes()].concat(),
        );

        Ok(Self {
            key: LessSafeKey::new(unbound),
            nonce_key: hmac::Key::new(hmac::HMAC_SHA256, nonce_seed.as_ref()),
        })
    }

    fn nonce_for(&self, plaintext: &[u8]) -> [u8; NONCE_LEN] {
        let tag = hmac::sign(&self.nonce_key, plaintext);
        let mut nonce = [0u8; NONCE_LEN];
        nonce.copy_from_slice(&tag.as_ref()[..NONCE_LEN]);
        nonce
    }
}

impl std::fmt::Debug for AesGcmCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AesGcmCipher").finish_non_exhaustive()
    }
}

impl PasswordCipher for AesGcmCipher {
    fn encrypt(&self, raw: &str) -> Result<String, EncryptionError> {
        if raw.is_empty() {
            return Err(EncryptionError::EmptyInput);
        }

        let nonce = self.nonce_for(raw.as_bytes());
        let mut sealed = raw.as_bytes().to_vec();
        self.key
            .seal_in_place_append_tag(Nonce::assume_unique_for_key(nonce), Aad::empty(), &mut sealed)
            .map_err(|_| EncryptionError::Cipher)?;

        let mut output = Vec::with_capacity(NONCE_LEN + sealed.len());
        output.extend_from_slice(&nonce);
        output.extend_from_slice(&sealed);
        Ok(STANDARD.encode(output))
    }

    fn decrypt(&self, cipher_text: &str) -> Result<String, EncryptionError> {
        if cipher_text.is_empty() {
            return Err(EncryptionError::EmptyInput);
        }

        let mut nonce = STANDARD.decode(cipher_text)?;
        if nonce.len() < NONCE_LEN + AES_256_GCM.tag_len() {
            return Err(EncryptionError::Truncated);
        }
        let mut sealed = nonce.split_off(NONCE_LEN);
        let nonce = Nonce::try_assume_unique_for_key(&nonce).map_err(|_| EncryptionError::Cipher)?;

        let plain = self
            .key
            .open_in_place(nonce, Aad::empty(), &mut sealed)
            .map_err(|_| EncryptionError::Cipher)?;
        Ok(String::from_utf8(plain.to_vec())?)
    }
}

/// Encrypt a raw account password.
///
/// # Errors
///
/// Returns a validation error if `raw` is empty, or an encryption error if
/// the cipher fails.
pub fn encrypt_password<C: PasswordCipher + ?Sized>(
    cipher: &C,
    raw: &str,
) -> crate::Result<EncryptedPassword> {
    if raw.is_empty() {
        return Err(ValidationError::EmptyPassword.into());
    }
    let cipher_text = cipher.encrypt(raw)?;
    EncryptedPassword::new(cipher_text).ok_or(crate::Error::Encryption(EncryptionError::Cipher))
}

/// Recover the raw password behind an encrypted one.
///
/// # Errors
///
/// Returns an encryption error if the cipher fails.
pub fn decrypt_password<C: PasswordCipher + ?Sized>(
    cipher: &C,
    password: &EncryptedPassword,
) -> crate::Result<String> {
    Ok(cipher.decrypt(password.expose())?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn cipher() -> AesGcmCipher {
        AesGcmCipher::from_secret("test-secret").unwrap()
    }

    #[test]
    fn roundtrip() {
        let cipher = cipher();
        let encrypted = cipher.encrypt("password123").unwrap();
        assert_ne!(encrypted, "password123");
        assert_eq!(cipher.decrypt(&encrypted).unwrap(), "password123");
    }

    #[test]
    fn encryption_is_deterministic() {
        let cipher = cipher();
        assert_eq!(
            cipher.encrypt("password123").unwrap(),
            cipher.encrypt("password123").unwrap()
        );
        assert_ne!(
            cipher.encrypt("password123").unwrap(),
            cipher.encrypt("password124").unwrap()
        );
    }

    #[test]
    fn empty_input_rejected() {
        let cipher = cipher();
        assert!(matches!(cipher.encrypt(""), Err(EncryptionError::EmptyInput)));
        assert!(matches!(cipher.decrypt(""), Err(EncryptionError::EmptyInput)));
    }

    #[test]
    fn empty_secret_rejected() {
        assert!(matches!(
            AesGcmCipher::from_secret(""),
            Err(EncryptionError::EmptySecret)
        ));
    }

    #[test]
    fn wrong_secret_fails() {
        let encrypted = cipher().encrypt("password123").unwrap();
        let other = AesGcmCipher::from_secret("other-secret").unwrap();
        assert!(matches!(other.decrypt(&encrypted), Err(EncryptionError::Cipher)));
    }

    #[test]
    fn tampered_cipher_text_fails() {
        let cipher = cipher();
        let mut bytes = STANDARD.decode(cipher.encrypt("password123").unwrap()).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0x01;
        let tampered = STANDARD.encode(bytes);
        assert!(matches!(cipher.decrypt(&tampered), Err(EncryptionError::Cipher)));
    }

    #[test]
    fn malformed_cipher_text_fails() {
        let cipher = cipher();
        assert!(matches!(cipher.decrypt("not base64!"), Err(EncryptionError::Encoding(_))));
        assert!(matches!(
            cipher.decrypt(&STANDARD.encode([0u8; 8])),
            Err(EncryptionError::Truncated)
        ));
    }

    #[test]
    fn encrypt_password_wraps_cipher_text() {
        let cipher = cipher();
        let password = encrypt_password(&cipher, "password123").unwrap();
        assert_eq!(password.expose(), cipher.encrypt("password123").unwrap());
        assert_eq!(decrypt_password(&cipher, &password).unwrap(), "password123");
    }

    #[test]
    fn encrypt_password_rejects_empty() {
        let err = encrypt_password(&cipher(), "").unwrap_err();
        assert!(matches!(err, crate::Error::Validation(ref e) if e.contains(&ValidationError::EmptyPassword)));
    }

    #[test]
    fn debug_does_not_leak_key() {
        assert_eq!(format!("{:?}", cipher()), "AesGcmCipher { .. }");
    }
}
