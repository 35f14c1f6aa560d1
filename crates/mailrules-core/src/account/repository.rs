//! Account storage.
//!
//! Accounts are stored one row each, with their rules serialized as a JSON
//! array in the `rules` column. Saving always rewrites the whole row.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sqlx::Row;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow};
use tracing::debug;

use super::credentials::{Credentials, EncryptedPassword};
use super::model::{Account, AccountId, ConnectionDetails, Protocol};
use crate::rule::{
    ArchiveRule, Criterion, DeleteRule, MoveRule, Rule, RuleAction, RuleDetails, RuleId,
    RuleVisitor,
};
use crate::{Error, Result};

/// Storage for account aggregates.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Insert the account, or replace the stored one with the same ID.
    async fn save(&self, account: &Account) -> Result<()>;

    /// Load an account with all of its rules.
    async fn find_by_id(&self, id: AccountId) -> Result<Option<Account>>;

    /// Load every account, oldest first.
    async fn find_all(&self) -> Result<Vec<Account>>;
}

#[async_trait]
impl<T: AccountStore + ?Sized> AccountStore for &T {
    async fn save(&self, account: &Account) -> Result<()> {
        (**self).save(account).await
    }

    async fn find_by_id(&self, id: AccountId) -> Result<Option<Account>> {
        (**self).find_by_id(id).await
    }

    async fn find_all(&self) -> Result<Vec<Account>> {
        (**self).find_all().await
    }
}

/// `SQLite` backed account store.
pub struct AccountRepository {
    pool: SqlitePool,
}

impl AccountRepository {
    /// Open (or create) the database at `database_path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails or schema creation fails.
    pub async fn new(database_path: &str) -> Result<Self> {
        let url = format!("sqlite:{database_path}?mode=rwc");
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&url)
            .await?;

        let repo = Self { pool };
        repo.initialize().await?;
        Ok(repo)
    }

    /// Create an in-memory repository for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails or schema creation fails.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        let repo = Self { pool };
        repo.initialize().await?;
        Ok(repo)
    }

    async fn initialize(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS accounts (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT NOT NULL,
                password TEXT NOT NULL,
                host TEXT NOT NULL,
                port INTEGER NOT NULL,
                protocol TEXT NOT NULL,
                rules TEXT NOT NULL DEFAULT '[]',
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl AccountStore for AccountRepository {
    async fn save(&self, account: &Account) -> Result<()> {
        let records: Vec<RuleRecord> = account.rules().map(|rule| rule.accept(&ToRecord)).collect();
        let rules = serde_json::to_string(&records)?;

        sqlx::query(
            r"
            INSERT INTO accounts (
                id, name, email, password, host, port, protocol, rules, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                email = excluded.email,
                password = excluded.password,
                host = excluded.host,
                port = excluded.port,
                protocol = excluded.protocol,
                rules = excluded.rules,
                created_at = excluded.created_at,
                updated_at = excluded.updated_at
            ",
        )
        .bind(account.id().to_string())
        .bind(account.name())
        .bind(account.credentials().email())
        .bind(account.credentials().password().expose())
        .bind(account.connection().host())
        .bind(i64::from(account.connection().port()))
        .bind(account.connection().protocol().as_str())
        .bind(rules)
        .bind(timestamp(account.created_at()))
        .bind(timestamp(account.updated_at()))
        .execute(&self.pool)
        .await?;

        debug!(
            account_id = %account.id(),
            rules = account.rule_count(),
            "Saved account"
        );
        Ok(())
    }

    async fn find_by_id(&self, id: AccountId) -> Result<Option<Account>> {
        let row = sqlx::query(
            r"
            SELECT id, name, email, password, host, port, protocol, rules, created_at, updated_at
            FROM accounts
            WHERE id = ?
            ",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_account).transpose()
    }

    async fn find_all(&self) -> Result<Vec<Account>> {
        let rows = sqlx::query(
            r"
            SELECT id, name, email, password, host, port, protocol, rules, created_at, updated_at
            FROM accounts
            ORDER BY created_at ASC, name ASC
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_account).collect()
    }
}

/// Stored form of a rule.
#[derive(Debug, Serialize, Deserialize)]
struct RuleRecord {
    #[serde(rename = "type")]
    kind: RuleAction,
    rule_id: RuleId,
    name: String,
    description: String,
    action: RuleAction,
    criteria: Vec<Criterion>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    source_folder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    target_folder: Option<String>,
}

impl RuleRecord {
    fn from_details(kind: RuleAction, details: &RuleDetails) -> Self {
        Self {
            kind,
            rule_id: details.id(),
            name: details.name().to_string(),
            description: details.description().to_string(),
            action: kind,
            criteria: details.criteria().to_vec(),
            created_at: details.created_at(),
            updated_at: details.updated_at(),
            source_folder: None,
            target_folder: None,
        }
    }

    fn into_rule(self) -> Result<Rule> {
        if self.kind != self.action {
            return Err(Error::CorruptRecord(format!(
                "rule {} has type {} but action {}",
                self.rule_id, self.kind, self.action
            )));
        }

        let details = RuleDetails::restore(
            self.rule_id,
            self.name,
            self.description,
            self.criteria,
            self.created_at,
            self.updated_at,
        );

        match self.kind {
            RuleAction::Archive => Ok(ArchiveRule::from_details(details).into()),
            RuleAction::Delete => Ok(DeleteRule::from_details(details).into()),
            RuleAction::Move => MoveRule::from_details(
                details,
                self.source_folder.unwrap_or_default(),
                self.target_folder.unwrap_or_default(),
            )
            .map(Rule::from)
            .map_err(|e| Error::CorruptRecord(format!("rule {}: {e}", self.rule_id))),
        }
    }
}

/// Converts a rule into its stored form.
struct ToRecord;

impl RuleVisitor for ToRecord {
    type Output = RuleRecord;

    fn visit_archive(&self, rule: &ArchiveRule) -> RuleRecord {
        RuleRecord::from_details(RuleAction::Archive, rule.details())
    }

    fn visit_delete(&self, rule: &DeleteRule) -> RuleRecord {
        RuleRecord::from_details(RuleAction::Delete, rule.details())
    }

    fn visit_move(&self, rule: &MoveRule) -> RuleRecord {
        RuleRecord {
            source_folder: Some(rule.source_folder().to_string()),
            target_folder: Some(rule.target_folder().to_string()),
            ..RuleRecord::from_details(RuleAction::Move, rule.details())
        }
    }
}

fn corrupt(id: &str, what: impl std::fmt::Display) -> Error {
    Error::CorruptRecord(format!("account {id}: {what}"))
}

/// Fixed-width RFC 3339 so that text ordering matches time ordering.
fn timestamp(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn parse_timestamp(id: &str, value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| corrupt(id, e))
}

fn row_to_account(row: &SqliteRow) -> Result<Account> {
    let raw_id: String = row.try_get("id")?;
    let id = raw_id.parse::<AccountId>().map_err(|e| corrupt(&raw_id, e))?;

    let password = EncryptedPassword::new(row.try_get::<String, _>("password")?)
        .ok_or_else(|| corrupt(&raw_id, "empty password"))?;
    let credentials = Credentials::new(row.try_get::<String, _>("email")?, password);

    let port = u16::try_from(row.try_get::<i64, _>("port")?).map_err(|e| corrupt(&raw_id, e))?;
    let protocol = row
        .try_get::<String, _>("protocol")?
        .parse::<Protocol>()
        .map_err(|e| corrupt(&raw_id, e))?;
    let connection = ConnectionDetails::new(row.try_get::<String, _>("host")?, port, protocol)
        .map_err(|e| corrupt(&raw_id, e))?;

    let records: Vec<RuleRecord> =
        serde_json::from_str(&row.try_get::<String, _>("rules")?).map_err(|e| corrupt(&raw_id, e))?;
    let rules = records
        .into_iter()
        .map(RuleRecord::into_rule)
        .collect::<Result<Vec<_>>>()?;

    Account::restore(
        id,
        row.try_get::<String, _>("name")?,
        parse_timestamp(&raw_id, &row.try_get::<String, _>("created_at")?)?,
        parse_timestamp(&raw_id, &row.try_get::<String, _>("updated_at")?)?,
        credentials,
        connection,
        rules,
    )
    .map_err(|e| corrupt(&raw_id, e))
}
