//! Account management module.
//!
//! Provides the account aggregate, its credentials, storage, and
//! validation.

pub mod credentials;
mod model;
mod repository;
pub mod validation;

pub use credentials::{Credentials, EncryptedPassword, PROTECTED};
pub use model::{Account, AccountId, ConnectionDetails, Protocol};
pub use repository::{AccountRepository, AccountStore};
pub use validation::{ValidationError, ValidationErrors, ValidationResult};
