//! Read models returned by the service. None of them carries a password.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::account::{Account, AccountId, Protocol};
use crate::rule::{Criterion, CriterionField, CriterionId, CriterionOperator, Rule, RuleAction, RuleId};

/// A rule criterion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CriterionOutput {
    /// Criterion ID.
    pub id: CriterionId,
    /// Compared value.
    pub value: String,
    /// Message field.
    #[serde(rename = "type")]
    pub field: CriterionField,
    /// Comparison operator.
    pub operator: CriterionOperator,
}

impl From<&Criterion> for CriterionOutput {
    fn from(criterion: &Criterion) -> Self {
        Self {
            id: criterion.id(),
            value: criterion.value().to_string(),
            field: criterion.field(),
            operator: criterion.operator(),
        }
    }
}

fn criteria_of(rule: &Rule) -> Vec<CriterionOutput> {
    rule.criteria().iter().map(CriterionOutput::from).collect()
}

/// Returned after creating an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewAccountOutput {
    /// Account ID.
    pub id: AccountId,
    /// Display name.
    pub name: String,
    /// Login email.
    pub email: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
    /// Number of rules.
    pub total_rules: usize,
}

impl From<&Account> for NewAccountOutput {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id(),
            name: account.name().to_string(),
            email: account.credentials().email().to_string(),
            created_at: account.created_at(),
            updated_at: account.updated_at(),
            total_rules: account.rule_count(),
        }
    }
}

/// Account summary for listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountOutput {
    /// Account ID.
    pub id: AccountId,
    /// Display name.
    pub name: String,
    /// Login email.
    pub email: String,
    /// Server hostname.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Protocol.
    pub protocol: Protocol,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
    /// Number of rules.
    pub total_rules: usize,
}

impl From<&Account> for AccountOutput {
    fn from(account: &Account) -> Self {
        let connection = account.connection();
        Self {
            id: account.id(),
            name: account.name().to_string(),
            email: account.credentials().email().to_string(),
            host: connection.host().to_string(),
            port: connection.port(),
            protocol: connection.protocol(),
            created_at: account.created_at(),
            updated_at: account.updated_at(),
            total_rules: account.rule_count(),
        }
    }
}

/// A rule with its criteria and, for move rules, its folders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailedRuleOutput {
    /// Rule ID.
    pub id: RuleId,
    /// Rule name.
    pub name: String,
    /// Rule description.
    pub description: String,
    /// Rule action.
    pub action: RuleAction,
    /// Criteria.
    pub criteria: Vec<CriterionOutput>,
    /// Source folder of a move rule.
    pub source_folder: Option<String>,
    /// Target folder of a move rule.
    pub target_folder: Option<String>,
}

impl From<&Rule> for DetailedRuleOutput {
    fn from(rule: &Rule) -> Self {
        let folders = rule.as_move();
        Self {
            id: rule.id(),
            name: rule.name().to_string(),
            description: rule.description().to_string(),
            action: rule.action(),
            criteria: criteria_of(rule),
            source_folder: folders.map(|m| m.source_folder().to_string()),
            target_folder: folders.map(|m| m.target_folder().to_string()),
        }
    }
}

/// An account with all of its rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailedAccountOutput {
    /// Account ID.
    pub id: AccountId,
    /// Display name.
    pub name: String,
    /// Login email.
    pub email: String,
    /// Server hostname.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Protocol.
    pub protocol: Protocol,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
    /// Rules.
    pub rules: Vec<DetailedRuleOutput>,
}

impl From<&Account> for DetailedAccountOutput {
    fn from(account: &Account) -> Self {
        let connection = account.connection();
        Self {
            id: account.id(),
            name: account.name().to_string(),
            email: account.credentials().email().to_string(),
            host: connection.host().to_string(),
            port: connection.port(),
            protocol: connection.protocol(),
            created_at: account.created_at(),
            updated_at: account.updated_at(),
            rules: account.rules().map(DetailedRuleOutput::from).collect(),
        }
    }
}

/// Returned after adding a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewRuleOutput {
    /// Rule ID.
    pub id: RuleId,
    /// Rule name.
    pub name: String,
    /// Rule description.
    pub description: String,
    /// Rule action.
    pub action: RuleAction,
    /// Criteria.
    pub criteria: Vec<CriterionOutput>,
}

impl From<&Rule> for NewRuleOutput {
    fn from(rule: &Rule) -> Self {
        Self {
            id: rule.id(),
            name: rule.name().to_string(),
            description: rule.description().to_string(),
            action: rule.action(),
            criteria: criteria_of(rule),
        }
    }
}

/// Returned after updating a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateRuleOutput {
    /// Rule ID.
    pub id: RuleId,
    /// Rule name.
    pub name: String,
    /// Rule description.
    pub description: String,
    /// Rule action.
    pub action: RuleAction,
    /// Criteria.
    pub criteria: Vec<CriterionOutput>,
    /// Creation time, unchanged by updates.
    pub created_at: DateTime<Utc>,
    /// Time of this update.
    pub updated_at: DateTime<Utc>,
}

impl From<&Rule> for UpdateRuleOutput {
    fn from(rule: &Rule) -> Self {
        Self {
            id: rule.id(),
            name: rule.name().to_string(),
            description: rule.description().to_string(),
            action: rule.action(),
            criteria: criteria_of(rule),
            created_at: rule.created_at(),
            updated_at: rule.updated_at(),
        }
    }
}
