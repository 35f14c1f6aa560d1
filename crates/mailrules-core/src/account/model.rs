//! Account model types.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::credentials::Credentials;
use super::validation::{ValidationError, ValidationErrors, is_blank};
use crate::error::ParseKindError;
use crate::rule::{Rule, RuleId};

/// Unique identifier for an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(pub Uuid);

impl AccountId {
    /// Create a fresh random account ID.
    #[must_use]
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for AccountId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Mail protocol used to reach the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    /// SMTP.
    Smtp,
    /// IMAP.
    #[default]
    Imap,
    /// POP3.
    Pop3,
}

impl Protocol {
    /// Wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Smtp => "smtp",
            Self::Imap => "imap",
            Self::Pop3 => "pop3",
        }
    }
}

impl std::fmt::Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Protocol {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "smtp" => Ok(Self::Smtp),
            "imap" => Ok(Self::Imap),
            "pop3" => Ok(Self::Pop3),
            _ => Err(ParseKindError::new("protocol", s)),
        }
    }
}

/// Server connection details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionDetails {
    host: String,
    port: u16,
    protocol: Protocol,
}

impl ConnectionDetails {
    /// Create connection details.
    ///
    /// # Errors
    ///
    /// Returns an error if the host is blank or the port is zero.
    pub fn new(
        host: impl Into<String>,
        port: u16,
        protocol: Protocol,
    ) -> Result<Self, ValidationErrors> {
        let host = host.into();

        let mut errors = Vec::new();
        if is_blank(&host) {
            errors.push(ValidationError::EmptyHost);
        }
        if port == 0 {
            errors.push(ValidationError::InvalidPort);
        }
        ValidationErrors::check(errors)?;

        Ok(Self {
            host,
            port,
            protocol,
        })
    }

    /// Server hostname.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Server port.
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Protocol.
    #[must_use]
    pub const fn protocol(&self) -> Protocol {
        self.protocol
    }
}

/// Email account together with the rules it owns.
///
/// Accounts are immutable: adding, replacing or removing a rule returns a
/// new account value, which is then persisted as a whole.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    id: AccountId,
    name: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    credentials: Credentials,
    connection: ConnectionDetails,
    rules: BTreeMap<RuleId, Rule>,
}

impl Account {
    /// Create a new account with a fresh ID, no rules, and both timestamps
    /// set to now.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is blank.
    pub fn new_account(
        name: impl Into<String>,
        credentials: Credentials,
        connection: ConnectionDetails,
    ) -> Result<Self, ValidationErrors> {
        let now = Utc::now();
        Self::restore(
            AccountId::new_random(),
            name,
            now,
            now,
            credentials,
            connection,
            Vec::new(),
        )
    }

    /// Rebuild an account from its parts.
    ///
    /// Rules sharing an ID collapse to the last one given.
    ///
    /// # Errors
    ///
    /// Returns an error if the name or email is blank.
    pub fn restore(
        id: AccountId,
        name: impl Into<String>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
        credentials: Credentials,
        connection: ConnectionDetails,
        rules: impl IntoIterator<Item = Rule>,
    ) -> Result<Self, ValidationErrors> {
        let name = name.into();

        let mut errors = Vec::new();
        if is_blank(&name) {
            errors.push(ValidationError::EmptyName);
        }
        if is_blank(credentials.email()) {
            errors.push(ValidationError::EmptyEmail);
        }
        ValidationErrors::check(errors)?;

        Ok(Self {
            id,
            name,
            created_at,
            updated_at,
            credentials,
            connection,
            rules: rules.into_iter().map(|rule| (rule.id(), rule)).collect(),
        })
    }

    /// Account ID.
    #[must_use]
    pub const fn id(&self) -> AccountId {
        self.id
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// When the account was created.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// When the account was last updated.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Login credentials.
    #[must_use]
    pub const fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Server connection details.
    #[must_use]
    pub const fn connection(&self) -> &ConnectionDetails {
        &self.connection
    }

    /// Rules owned by this account, ordered by ID.
    pub fn rules(&self) -> impl ExactSizeIterator<Item = &Rule> {
        self.rules.values()
    }

    /// Number of rules.
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Look up a rule by ID.
    #[must_use]
    pub fn rule(&self, id: RuleId) -> Option<&Rule> {
        self.rules.get(&id)
    }

    /// Returns a copy of this account with `rule` inserted, replacing any
    /// rule with the same ID.
    #[must_use]
    pub fn with_rule(&self, rule: Rule) -> Self {
        let mut rules = self.rules.clone();
        rules.insert(rule.id(), rule);
        Self {
            rules,
            ..self.clone()
        }
    }

    /// Returns a copy of this account without the rule `id`. Unchanged if
    /// there is no such rule.
    #[must_use]
    pub fn without_rule(&self, id: RuleId) -> Self {
        let mut rules = self.rules.clone();
        rules.remove(&id);
        Self {
            rules,
            ..self.clone()
        }
    }
}
