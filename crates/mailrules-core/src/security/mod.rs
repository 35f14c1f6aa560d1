//! Password protection.
//!
//! Provides the password cipher used to encrypt account passwords before
//! they are stored, and keyring storage for the cipher's secret.

mod cipher;
pub mod keystore;

pub use cipher::{
    AesGcmCipher, EncryptionError, PasswordCipher, decrypt_password, encrypt_password,
};
