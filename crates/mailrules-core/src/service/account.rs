//! Account and rule operations.
//!
//! Every operation that changes an account loads the whole aggregate,
//! computes the new aggregate, and stores it back in one piece. Two
//! concurrent changes to the same account race: the later save wins and
//! the earlier change is lost.

use tracing::{debug, info};

use super::input::{NewAccountInput, NewRuleInput, UpdateRuleInput};
use super::output::{
    AccountOutput, DetailedAccountOutput, NewAccountOutput, NewRuleOutput, UpdateRuleOutput,
};
use crate::account::{
    Account, AccountId, AccountStore, ConnectionDetails, Credentials, ValidationError,
};
use crate::error::Entity;
use crate::rule::{
    ArchiveRule, DeleteRule, MoveRule, Rule, RuleAction, RuleId, update_move_rule, update_rule,
};
use crate::security::{PasswordCipher, encrypt_password};
use crate::{Error, Result};

/// Orchestrates account and rule changes over a store and a password
/// cipher.
pub struct AccountService<S, C> {
    store: S,
    cipher: C,
}

impl<S: AccountStore, C: PasswordCipher> AccountService<S, C> {
    /// Create a service.
    pub const fn new(store: S, cipher: C) -> Self {
        Self { store, cipher }
    }

    /// Create an account with no rules.
    ///
    /// # Errors
    ///
    /// Returns a validation error for bad input, an encryption error if the
    /// password cannot be encrypted, or a storage error.
    pub async fn create_account(&self, input: &NewAccountInput) -> Result<NewAccountOutput> {
        info!(?input, "Creating account");
        input.validate()?;

        let password = encrypt_password(&self.cipher, &input.credentials.password)?;
        let connection = ConnectionDetails::new(
            input.connection.host.clone(),
            input.connection.port().ok_or(ValidationError::InvalidPort)?,
            input
                .connection
                .protocol()
                .ok_or(ValidationError::InvalidProtocol)?,
        )?;
        let credentials = Credentials::new(input.credentials.email.clone(), password);
        let account = Account::new_account(input.name.clone(), credentials, connection)?;

        self.store.save(&account).await?;
        info!(account_id = %account.id(), "Account created");
        Ok(NewAccountOutput::from(&account))
    }

    /// Add a new rule to an account.
    ///
    /// # Errors
    ///
    /// Returns a validation error for bad input, [`Error::NotFound`] if the
    /// account does not exist, or a storage error.
    pub async fn create_rule(
        &self,
        account_id: AccountId,
        input: &NewRuleInput,
    ) -> Result<NewRuleOutput> {
        info!(%account_id, ?input, "Creating rule");
        input.validate()?;

        let account = self.load(account_id).await?;
        let rule = new_rule(input)?;

        self.store.save(&account.with_rule(rule.clone())).await?;
        info!(%account_id, rule_id = %rule.id(), action = %rule.action(), "Rule created");
        Ok(NewRuleOutput::from(&rule))
    }

    /// Change an existing rule. The rule keeps its ID, variant and creation
    /// time.
    ///
    /// # Errors
    ///
    /// Returns a validation error for bad input or input that does not fit
    /// the stored rule, [`Error::NotFound`] if the account or rule does not
    /// exist, or a storage error.
    pub async fn update_rule(
        &self,
        account_id: AccountId,
        rule_id: RuleId,
        input: &UpdateRuleInput,
    ) -> Result<UpdateRuleOutput> {
        info!(%account_id, %rule_id, ?input, "Updating rule");
        input.validate()?;

        let account = self.load(account_id).await?;
        let existing = account
            .rule(rule_id)
            .ok_or(Error::NotFound(Entity::Rule))?;
        input.validate_against(existing)?;

        let updated = match &input.move_folders {
            Some(folders) => update_move_rule(
                existing,
                input.name.clone(),
                input.description.clone(),
                input.criteria(),
                folders.source_folder.clone(),
                folders.target_folder.clone(),
            )?,
            None => update_rule(
                existing,
                input.name.clone(),
                input.description.clone(),
                input.criteria(),
            )?,
        };

        self.store.save(&account.with_rule(updated.clone())).await?;
        info!(%account_id, %rule_id, "Rule updated");
        Ok(UpdateRuleOutput::from(&updated))
    }

    /// Remove a rule from an account.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the account or rule does not exist, or
    /// a storage error.
    pub async fn delete_rule(&self, account_id: AccountId, rule_id: RuleId) -> Result<()> {
        info!(%account_id, %rule_id, "Deleting rule");

        let account = self.load(account_id).await?;
        if account.rule(rule_id).is_none() {
            return Err(Error::NotFound(Entity::Rule));
        }

        self.store.save(&account.without_rule(rule_id)).await?;
        info!(%account_id, %rule_id, "Rule deleted");
        Ok(())
    }

    /// Summaries of every account.
    ///
    /// # Errors
    ///
    /// Returns a storage error.
    pub async fn find_all(&self) -> Result<Vec<AccountOutput>> {
        let accounts = self.store.find_all().await?;
        debug!(count = accounts.len(), "Loaded accounts");
        Ok(accounts.iter().map(AccountOutput::from).collect())
    }

    /// One account with all of its rules.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the account does not exist, or a
    /// storage error.
    pub async fn find_by_id(&self, account_id: AccountId) -> Result<DetailedAccountOutput> {
        let account = self.load(account_id).await?;
        Ok(DetailedAccountOutput::from(&account))
    }

    async fn load(&self, account_id: AccountId) -> Result<Account> {
        self.store
            .find_by_id(account_id)
            .await?
            .ok_or(Error::NotFound(Entity::Account))
    }
}

fn new_rule(input: &NewRuleInput) -> Result<Rule> {
    let id = RuleId::new_random();
    let name = input.name.clone();
    let description = input.description.clone();
    let criteria = input.criteria();

    let rule = match input.action {
        RuleAction::Archive => ArchiveRule::new_rule(id, name, description, criteria).into(),
        RuleAction::Delete => DeleteRule::new_rule(id, name, description, criteria).into(),
        RuleAction::Move => {
            let folders = input
                .move_folders
                .as_ref()
                .ok_or(ValidationError::MissingMoveConfig)?;
            MoveRule::new_rule(
                id,
                name,
                description,
                folders.source_folder.clone(),
                folders.target_folder.clone(),
                criteria,
            )?
            .into()
        }
    };
    Ok(rule)
}
