//! Command-line definitions.

use std::io::BufRead;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use mailrules_core::service::{CriterionInput, MoveFolders, MoveFoldersUpdate};
use mailrules_core::{AccountId, CriterionField, CriterionOperator, RuleAction, RuleId};

/// Manage email accounts and their filtering rules.
#[derive(Debug, Parser)]
#[command(name = "mailrules", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Database file (overrides the settings file)
    #[arg(long, global = true)]
    pub database: Option<PathBuf>,

    /// Settings file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create and inspect accounts
    Account {
        #[command(subcommand)]
        command: AccountCommand,
    },
    /// Create, update and delete rules of an account
    Rule {
        #[command(subcommand)]
        command: RuleCommand,
    },
    /// Manage the password encryption key
    Key {
        #[command(subcommand)]
        command: KeyCommand,
    },
}

/// Environment variable holding the login password of a new account.
pub const PASSWORD_ENV: &str = "MAILRULES_PASSWORD";

#[derive(Debug, Subcommand)]
pub enum AccountCommand {
    /// Create an account
    Create(NewAccountArgs),
    /// List all accounts
    List,
    /// Show an account with its rules
    Show {
        /// Account ID
        id: AccountId,
    },
}

/// Options of `account create`.
///
/// The password is not an argument. It comes from `MAILRULES_PASSWORD` or,
/// with `--password-stdin`, the first line of standard input.
#[derive(Debug, Clone, clap::Args)]
pub struct NewAccountArgs {
    /// Display name
    #[arg(long)]
    pub name: String,
    /// Login email
    #[arg(long)]
    pub email: String,
    /// Read the login password from the first line of stdin instead of
    /// MAILRULES_PASSWORD
    #[arg(long)]
    pub password_stdin: bool,
    /// Server hostname
    #[arg(long)]
    pub host: String,
    /// Server port
    #[arg(long, default_value_t = 993)]
    pub port: u32,
    /// smtp, imap or pop3
    #[arg(long, default_value = "imap")]
    pub protocol: String,
}

impl NewAccountArgs {
    /// Pick the login password from stdin or the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if stdin cannot be read or no password is given.
    pub fn read_password(
        &self,
        from_env: Option<String>,
        stdin: impl BufRead,
    ) -> anyhow::Result<String> {
        if self.password_stdin {
            let line = stdin
                .lines()
                .next()
                .transpose()
                .context("Failed to read password from stdin")?
                .unwrap_or_default();
            return Ok(line.trim_end_matches('\r').to_string());
        }
        from_env
            .filter(|password| !password.is_empty())
            .with_context(|| format!("Set {PASSWORD_ENV} or pass --password-stdin"))
    }
}

#[derive(Debug, Subcommand)]
pub enum RuleCommand {
    /// Add a rule to an account
    Create {
        /// Account ID
        #[arg(long)]
        account: AccountId,
        /// Rule name
        #[arg(long)]
        name: String,
        /// Rule description
        #[arg(long)]
        description: String,
        /// ARCHIVE, DELETE or MOVE
        #[arg(long)]
        action: RuleAction,
        /// FIELD:OPERATOR:value, e.g. SUBJECT:CONTAINS:invoice (repeatable)
        #[arg(long = "criterion", value_parser = parse_criterion)]
        criteria: Vec<CriterionInput>,
        #[command(flatten)]
        folders: FolderArgs,
    },
    /// Change an existing rule
    Update {
        /// Account ID
        #[arg(long)]
        account: AccountId,
        /// Rule ID
        #[arg(long)]
        rule: RuleId,
        /// New rule name
        #[arg(long)]
        name: String,
        /// New rule description
        #[arg(long)]
        description: String,
        /// Expected action of the rule
        #[arg(long)]
        action: Option<RuleAction>,
        /// FIELD:OPERATOR:value, replaces all criteria (repeatable)
        #[arg(long = "criterion", value_parser = parse_criterion)]
        criteria: Vec<CriterionInput>,
        #[command(flatten)]
        folders: FolderArgs,
    },
    /// Delete a rule
    Delete {
        /// Account ID
        #[arg(long)]
        account: AccountId,
        /// Rule ID
        #[arg(long)]
        rule: RuleId,
    },
}

/// Folder options of move rules.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct FolderArgs {
    /// Folder to move messages out of
    #[arg(long)]
    pub source_folder: Option<String>,
    /// Folder to move messages into
    #[arg(long)]
    pub target_folder: Option<String>,
}

impl FolderArgs {
    const fn is_empty(&self) -> bool {
        self.source_folder.is_none() && self.target_folder.is_none()
    }

    /// Folder pair for a new rule. A missing half becomes blank so that
    /// validation reports it.
    pub fn into_new(self) -> Option<MoveFolders> {
        if self.is_empty() {
            return None;
        }
        Some(MoveFolders {
            source_folder: self.source_folder.unwrap_or_default(),
            target_folder: self.target_folder.unwrap_or_default(),
        })
    }

    /// Folder overrides for an existing rule.
    pub fn into_update(self) -> Option<MoveFoldersUpdate> {
        if self.is_empty() {
            return None;
        }
        Some(MoveFoldersUpdate {
            source_folder: self.source_folder,
            target_folder: self.target_folder,
        })
    }
}

#[derive(Debug, Subcommand)]
pub enum KeyCommand {
    /// Generate a new random key
    Generate {
        /// Store the key in the system keyring instead of printing it
        #[arg(long)]
        store: bool,
    },
    /// Store a key in the system keyring
    Store {
        /// The key
        secret: String,
    },
    /// Remove the key from the system keyring
    Forget,
}

/// Parse `FIELD:OPERATOR:value`. The value may itself contain colons.
fn parse_criterion(raw: &str) -> Result<CriterionInput, String> {
    let mut parts = raw.splitn(3, ':');
    let (Some(field), Some(operator), Some(value)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(format!("expected FIELD:OPERATOR:value, got {raw:?}"));
    };

    Ok(CriterionInput {
        value: value.to_string(),
        field: field.parse::<CriterionField>().map_err(|e| e.to_string())?,
        operator: operator
            .parse::<CriterionOperator>()
            .map_err(|e| e.to_string())?,
    })
}
