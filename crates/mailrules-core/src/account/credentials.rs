//! Account credentials.
//!
//! The password is only ever held in encrypted form, and neither the
//! encrypted value nor anything derived from it is rendered by `Debug` or
//! `Display`. Both print [`PROTECTED`] instead.

/// Placeholder rendered in place of a password.
pub const PROTECTED: &str = "[PROTECTED]";

/// An encrypted account password.
#[derive(Clone, PartialEq, Eq)]
pub struct EncryptedPassword(String);

impl EncryptedPassword {
    /// Wrap a cipher text. Returns `None` if it is empty.
    #[must_use]
    pub fn new(cipher_text: impl Into<String>) -> Option<Self> {
        let cipher_text = cipher_text.into();
        if cipher_text.is_empty() {
            None
        } else {
            Some(Self(cipher_text))
        }
    }

    /// The cipher text, for storage or decryption.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for EncryptedPassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(PROTECTED)
    }
}

impl std::fmt::Display for EncryptedPassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(PROTECTED)
    }
}

/// Login credentials for an account.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    email: String,
    password: EncryptedPassword,
}

impl Credentials {
    /// Create credentials from an email and an already encrypted password.
    #[must_use]
    pub fn new(email: impl Into<String>, password: EncryptedPassword) -> Self {
        Self {
            email: email.into(),
            password,
        }
    }

    /// Email address used to log in.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Encrypted password.
    #[must_use]
    pub const fn password(&self) -> &EncryptedPassword {
        &self.password
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &self.password)
            .finish()
    }
}

impl std::fmt::Display for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Credentials[email={}, password={PROTECTED}]", self.email)
    }
}
