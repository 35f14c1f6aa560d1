//! # mailrules-core
//!
//! Core business logic for `MailRules`, a manager for email accounts and
//! their filtering rules.
//!
//! This crate provides:
//! - Account aggregate with encrypted credentials
//! - Archive, delete and move rules with matching criteria
//! - Rule update dispatch that preserves rule identity and variant
//! - Local storage (`SQLite`)
//! - Password encryption and keyring-backed secret storage
//! - Account and rule services

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod account;
pub mod config;
mod error;
pub mod rule;
pub mod security;
pub mod service;

pub use account::credentials;
pub use account::{
    Account, AccountId, AccountRepository, AccountStore, ConnectionDetails, Credentials,
    EncryptedPassword, Protocol, ValidationError, ValidationErrors, ValidationResult,
};
pub use config::Settings;
pub use error::{Entity, Error, ParseKindError, Result};
pub use rule::{
    ArchiveRule, Criterion, CriterionField, CriterionId, CriterionOperator, DeleteRule, MoveRule,
    Rule, RuleAction, RuleDetails, RuleId, RuleUpdate, RuleVisitor, update_move_rule, update_rule,
};
pub use security::{AesGcmCipher, EncryptionError, PasswordCipher};
pub use service::AccountService;
