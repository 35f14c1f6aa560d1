//! Account and rule orchestration.
//!
//! This module provides the service layer that validates caller input,
//! drives the account aggregate, and hands whole aggregates to storage.

mod account;
mod input;
mod output;

pub use account::AccountService;
pub use input::{
    ConnectionInput, CredentialsInput, CriterionInput, MoveFolders, MoveFoldersUpdate,
    NewAccountInput, NewRuleInput, UpdateRuleInput,
};
pub use output::{
    AccountOutput, CriterionOutput, DetailedAccountOutput, DetailedRuleOutput, NewAccountOutput,
    NewRuleOutput, UpdateRuleOutput,
};
