//! Service inputs and their validation.
//!
//! Each input collects every violation at once through `validate()`.

use serde::Deserialize;

use crate::account::validation::{
    MAX_CRITERIA, MAX_DESCRIPTION_LEN, MIN_PASSWORD_LEN, RULE_NAME_LEN, ValidationError,
    ValidationErrors, ValidationResult, is_blank, is_valid_email,
};
use crate::account::{PROTECTED, Protocol};
use crate::rule::{Criterion, CriterionField, CriterionOperator, Rule, RuleAction};

/// Request to create an account.
#[derive(Debug, Clone, Deserialize)]
pub struct NewAccountInput {
    /// Display name.
    pub name: String,
    /// Login credentials.
    pub credentials: CredentialsInput,
    /// Server connection.
    pub connection: ConnectionInput,
}

/// Raw login credentials.
#[derive(Clone, Deserialize)]
pub struct CredentialsInput {
    /// Login email.
    pub email: String,
    /// Raw password, encrypted before it is stored.
    pub password: String,
}

impl std::fmt::Debug for CredentialsInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsInput")
            .field("email", &self.email)
            .field("password", &PROTECTED)
            .finish()
    }
}

/// Server connection settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ConnectionInput {
    /// Server hostname.
    pub host: String,
    /// Server port, 1-65535.
    pub port: u32,
    /// One of `smtp`, `imap`, `pop3`.
    pub protocol: String,
}

impl ConnectionInput {
    /// Port as `u16`, if in range.
    #[must_use]
    pub fn port(&self) -> Option<u16> {
        u16::try_from(self.port).ok().filter(|port| *port != 0)
    }

    /// Parsed protocol, if known.
    #[must_use]
    pub fn protocol(&self) -> Option<Protocol> {
        self.protocol.parse().ok()
    }
}

impl NewAccountInput {
    /// Check every field.
    ///
    /// # Errors
    ///
    /// Returns all violations found.
    pub fn validate(&self) -> ValidationResult {
        let mut errors = Vec::new();

        if is_blank(&self.name) {
            errors.push(ValidationError::EmptyName);
        }

        let credentials = &self.credentials;
        if is_blank(&credentials.email) {
            errors.push(ValidationError::EmptyEmail);
        } else if !is_valid_email(&credentials.email) {
            errors.push(ValidationError::InvalidEmail);
        }
        if is_blank(&credentials.password) {
            errors.push(ValidationError::EmptyPassword);
        } else if credentials.password.chars().count() < MIN_PASSWORD_LEN {
            errors.push(ValidationError::PasswordTooShort);
        }

        let connection = &self.connection;
        if is_blank(&connection.host) {
            errors.push(ValidationError::EmptyHost);
        }
        if connection.port().is_none() {
            errors.push(ValidationError::InvalidPort);
        }
        if connection.protocol().is_none() {
            errors.push(ValidationError::InvalidProtocol);
        }

        ValidationErrors::check(errors)
    }
}

/// A criterion to attach to a rule.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CriterionInput {
    /// Value compared against the message field.
    pub value: String,
    /// Message field.
    #[serde(rename = "type")]
    pub field: CriterionField,
    /// Comparison operator.
    pub operator: CriterionOperator,
}

impl CriterionInput {
    /// Build a criterion with a fresh ID.
    #[must_use]
    pub fn to_criterion(&self) -> Criterion {
        Criterion::fresh(self.value.clone(), self.field, self.operator)
    }
}

/// Folder pair for a new move rule.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MoveFolders {
    /// Folder to move messages out of.
    pub source_folder: String,
    /// Folder to move messages into.
    pub target_folder: String,
}

/// Folder overrides for an existing move rule. `None` keeps the current
/// folder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MoveFoldersUpdate {
    /// New source folder.
    #[serde(default)]
    pub source_folder: Option<String>,
    /// New target folder.
    #[serde(default)]
    pub target_folder: Option<String>,
}

/// Request to add a rule to an account.
#[derive(Debug, Clone, Deserialize)]
pub struct NewRuleInput {
    /// Rule name, 3 to 50 characters.
    pub name: String,
    /// Description, at most 255 characters.
    pub description: String,
    /// What the rule does.
    pub action: RuleAction,
    /// Between 1 and 10 criteria.
    pub criteria: Vec<CriterionInput>,
    /// Required for, and only allowed with, [`RuleAction::Move`].
    #[serde(default)]
    pub move_folders: Option<MoveFolders>,
}

impl NewRuleInput {
    /// Check every field, including that folders are given exactly when
    /// the action is a move.
    ///
    /// # Errors
    ///
    /// Returns all violations found.
    pub fn validate(&self) -> ValidationResult {
        let mut errors = Vec::new();
        check_rule_fields(&self.name, &self.description, &self.criteria, &mut errors);

        match (self.action, &self.move_folders) {
            (RuleAction::Move, None) => errors.push(ValidationError::MissingMoveConfig),
            (RuleAction::Move, Some(folders)) => {
                if is_blank(&folders.source_folder) {
                    errors.push(ValidationError::EmptySourceFolder);
                }
                if is_blank(&folders.target_folder) {
                    errors.push(ValidationError::EmptyTargetFolder);
                }
            }
            (RuleAction::Archive | RuleAction::Delete, Some(_)) => {
                errors.push(ValidationError::UnexpectedMoveConfig);
            }
            (RuleAction::Archive | RuleAction::Delete, None) => {}
        }

        ValidationErrors::check(errors)
    }

    /// Criteria with fresh IDs.
    #[must_use]
    pub fn criteria(&self) -> Vec<Criterion> {
        self.criteria.iter().map(CriterionInput::to_criterion).collect()
    }
}

/// Request to change an existing rule.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateRuleInput {
    /// New name, 3 to 50 characters.
    pub name: String,
    /// New description, at most 255 characters.
    pub description: String,
    /// Expected action of the stored rule. The action itself never changes.
    #[serde(default)]
    pub action: Option<RuleAction>,
    /// Replacement criteria, between 1 and 10.
    pub criteria: Vec<CriterionInput>,
    /// Folder overrides; only allowed for move rules.
    #[serde(default)]
    pub move_folders: Option<MoveFoldersUpdate>,
}

impl UpdateRuleInput {
    /// Check every field on its own.
    ///
    /// # Errors
    ///
    /// Returns all violations found.
    pub fn validate(&self) -> ValidationResult {
        let mut errors = Vec::new();
        check_rule_fields(&self.name, &self.description, &self.criteria, &mut errors);

        if let Some(folders) = &self.move_folders {
            if folders.source_folder.as_deref().is_some_and(is_blank) {
                errors.push(ValidationError::EmptySourceFolder);
            }
            if folders.target_folder.as_deref().is_some_and(is_blank) {
                errors.push(ValidationError::EmptyTargetFolder);
            }
        }

        ValidationErrors::check(errors)
    }

    /// Check that this update fits the stored `rule`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::ActionMismatch`] if an action is given
    /// and differs from the rule's, and
    /// [`ValidationError::UnexpectedMoveConfig`] if folders are given for a
    /// rule that is not a move rule.
    pub fn validate_against(&self, rule: &Rule) -> ValidationResult {
        let mut errors = Vec::new();

        if self.action.is_some_and(|action| action != rule.action()) {
            errors.push(ValidationError::ActionMismatch);
        }
        if self.move_folders.is_some() && rule.as_move().is_none() {
            errors.push(ValidationError::UnexpectedMoveConfig);
        }

        ValidationErrors::check(errors)
    }

    /// Criteria with fresh IDs.
    #[must_use]
    pub fn criteria(&self) -> Vec<Criterion> {
        self.criteria.iter().map(CriterionInput::to_criterion).collect()
    }
}

fn check_rule_fields(
    name: &str,
    description: &str,
    criteria: &[CriterionInput],
    errors: &mut Vec<ValidationError>,
) {
    if is_blank(name) {
        errors.push(ValidationError::EmptyRuleName);
    } else if !RULE_NAME_LEN.contains(&name.chars().count()) {
        errors.push(ValidationError::RuleNameLength);
    }

    if is_blank(description) {
        errors.push(ValidationError::EmptyDescription);
    } else if description.chars().count() > MAX_DESCRIPTION_LEN {
        errors.push(ValidationError::DescriptionTooLong);
    }

    if criteria.is_empty() {
        errors.push(ValidationError::MissingCriteria);
    } else if criteria.len() > MAX_CRITERIA {
        errors.push(ValidationError::TooManyCriteria);
    }
    if criteria.iter().any(|c| is_blank(&c.value)) {
        errors.push(ValidationError::EmptyCriterionValue);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::rule::{ArchiveRule, MoveRule, RuleId};

    fn account_input() -> NewAccountInput {
        NewAccountInput {
            name: "John Doe".into(),
            credentials: CredentialsInput {
                email: "john@example.com".into(),
                password: "password123".into(),
            },
            connection: ConnectionInput {
                host: "imap.example.com".into(),
                port: 993,
                protocol: "imap".into(),
            },
        }
    }

    fn criterion(value: &str) -> CriterionInput {
        CriterionInput {
            value: value.into(),
            field: CriterionField::Subject,
            operator: CriterionOperator::Contains,
        }
    }

    fn rule_input(action: RuleAction, move_folders: Option<MoveFolders>) -> NewRuleInput {
        NewRuleInput {
            name: "Receipts".into(),
            description: "File receipts".into(),
            action,
            criteria: vec![criterion("receipt")],
            move_folders,
        }
    }

    fn folders() -> MoveFolders {
        MoveFolders {
            source_folder: "INBOX".into(),
            target_folder: "ARCHIVE".into(),
        }
    }

    fn errors_of(result: ValidationResult) -> Vec<ValidationError> {
        result.unwrap_err().iter().copied().collect()
    }

    mod account_input_tests {
        use super::*;

        #[test]
        fn valid_input_passes() {
            assert!(account_input().validate().is_ok());
        }

        #[test]
        fn every_violation_is_reported() {
            let input = NewAccountInput {
                name: " ".into(),
                credentials: CredentialsInput {
                    email: "not-an-email".into(),
                    password: "short".into(),
                },
                connection: ConnectionInput {
                    host: String::new(),
                    port: 70_000,
                    protocol: "ftp".into(),
                },
            };
            assert_eq!(
                errors_of(input.validate()),
                vec![
                    ValidationError::EmptyName,
                    ValidationError::InvalidEmail,
                    ValidationError::PasswordTooShort,
                    ValidationError::EmptyHost,
                    ValidationError::InvalidPort,
                    ValidationError::InvalidProtocol,
                ]
            );
        }

        #[test]
        fn empty_email_and_password() {
            let mut input = account_input();
            input.credentials.email = String::new();
            input.credentials.password = String::new();
            assert_eq!(
                errors_of(input.validate()),
                vec![ValidationError::EmptyEmail, ValidationError::EmptyPassword]
            );
        }

        #[test]
        fn port_zero_rejected() {
            let mut input = account_input();
            input.connection.port = 0;
            assert_eq!(errors_of(input.validate()), vec![ValidationError::InvalidPort]);
        }

        #[test]
        fn protocol_is_case_sensitive() {
            let mut input = account_input();
            input.connection.protocol = "IMAP".into();
            assert_eq!(errors_of(input.validate()), vec![ValidationError::InvalidProtocol]);
        }

        #[test]
        fn debug_masks_password() {
            let rendered = format!("{:?}", account_input());
            assert!(!rendered.contains("password123"));
            assert!(rendered.contains(PROTECTED));
        }
    }

    mod rule_input_tests {
        use super::*;

        #[test]
        fn archive_without_folders_passes() {
            assert!(rule_input(RuleAction::Archive, None).validate().is_ok());
        }

        #[test]
        fn move_requires_folders() {
            assert_eq!(
                errors_of(rule_input(RuleAction::Move, None).validate()),
                vec![ValidationError::MissingMoveConfig]
            );
            assert!(rule_input(RuleAction::Move, Some(folders())).validate().is_ok());
        }

        #[test]
        fn folders_only_for_move() {
            assert_eq!(
                errors_of(rule_input(RuleAction::Delete, Some(folders())).validate()),
                vec![ValidationError::UnexpectedMoveConfig]
            );
        }

        #[test]
        fn blank_folders_rejected() {
            let input = rule_input(
                RuleAction::Move,
                Some(MoveFolders {
                    source_folder: " ".into(),
                    target_folder: String::new(),
                }),
            );
            assert_eq!(
                errors_of(input.validate()),
                vec![ValidationError::EmptySourceFolder, ValidationError::EmptyTargetFolder]
            );
        }

        #[test]
        fn name_length_bounds() {
            let mut input = rule_input(RuleAction::Archive, None);
            input.name = "ab".into();
            assert_eq!(errors_of(input.validate()), vec![ValidationError::RuleNameLength]);

            input.name = "abc".into();
            assert!(input.validate().is_ok());

            input.name = "x".repeat(50);
            assert!(input.validate().is_ok());

            input.name = "x".repeat(51);
            assert_eq!(errors_of(input.validate()), vec![ValidationError::RuleNameLength]);
        }

        #[test]
        fn description_limits() {
            let mut input = rule_input(RuleAction::Archive, None);
            input.description = "x".repeat(256);
            assert_eq!(errors_of(input.validate()), vec![ValidationError::DescriptionTooLong]);

            input.description = "  ".into();
            assert_eq!(errors_of(input.validate()), vec![ValidationError::EmptyDescription]);
        }

        #[test]
        fn criteria_count_and_values() {
            let mut input = rule_input(RuleAction::Archive, None);
            input.criteria.clear();
            assert_eq!(errors_of(input.validate()), vec![ValidationError::MissingCriteria]);

            input.criteria = vec![criterion("x"); 11];
            assert_eq!(errors_of(input.validate()), vec![ValidationError::TooManyCriteria]);

            input.criteria = vec![criterion("x"), criterion(" ")];
            assert_eq!(errors_of(input.validate()), vec![ValidationError::EmptyCriterionValue]);
        }

        #[test]
        fn criteria_get_fresh_ids() {
            let input = rule_input(RuleAction::Archive, None);
            let first = input.criteria();
            let second = input.criteria();
            assert_ne!(first[0].id(), second[0].id());
            assert_eq!(first[0].value(), "receipt");
        }

        #[test]
        fn deserializes_from_json() {
            let input: NewRuleInput = serde_json::from_str(
                r#"{
                    "name": "Receipts",
                    "description": "File receipts",
                    "action": "MOVE",
                    "criteria": [{"value": "receipt", "type": "SUBJECT", "operator": "CONTAINS"}],
                    "move_folders": {"source_folder": "INBOX", "target_folder": "ARCHIVE"}
                }"#,
            )
            .unwrap();
            assert_eq!(input.action, RuleAction::Move);
            assert_eq!(input.move_folders, Some(folders()));
            assert!(input.validate().is_ok());
        }
    }

    mod update_input_tests {
        use super::*;

        fn update(action: Option<RuleAction>, move_folders: Option<MoveFoldersUpdate>) -> UpdateRuleInput {
            UpdateRuleInput {
                name: "Renamed".into(),
                description: "Changed".into(),
                action,
                criteria: vec![criterion("invoice")],
                move_folders,
            }
        }

        fn archive() -> Rule {
            ArchiveRule::new_rule(RuleId::new_random(), "Arc", "d", Vec::new()).into()
        }

        fn moving() -> Rule {
            MoveRule::new_rule(RuleId::new_random(), "Mov", "d", "INBOX", "ARCHIVE", Vec::new())
                .unwrap()
                .into()
        }

        #[test]
        fn blank_override_rejected() {
            let input = update(
                None,
                Some(MoveFoldersUpdate {
                    source_folder: Some(" ".into()),
                    target_folder: None,
                }),
            );
            assert_eq!(errors_of(input.validate()), vec![ValidationError::EmptySourceFolder]);
        }

        #[test]
        fn omitted_overrides_pass() {
            assert!(update(None, Some(MoveFoldersUpdate::default())).validate().is_ok());
        }

        #[test]
        fn action_must_match_stored_rule() {
            let input = update(Some(RuleAction::Move), None);
            assert_eq!(
                errors_of(input.validate_against(&archive())),
                vec![ValidationError::ActionMismatch]
            );
            assert!(input.validate_against(&moving()).is_ok());
        }

        #[test]
        fn folders_rejected_for_non_move_rule() {
            let input = update(None, Some(MoveFoldersUpdate::default()));
            assert_eq!(
                errors_of(input.validate_against(&archive())),
                vec![ValidationError::UnexpectedMoveConfig]
            );
            assert!(input.validate_against(&moving()).is_ok());
        }

        #[test]
        fn absent_action_matches_anything() {
            assert!(update(None, None).validate_against(&archive()).is_ok());
            assert!(update(None, None).validate_against(&moving()).is_ok());
        }
    }
}
