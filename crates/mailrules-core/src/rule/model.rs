//! Rule model types.
//!
//! Rules form a closed set of three variants. Behavior that differs per
//! variant is added through [`RuleVisitor`] instead of matching on the
//! variant at every call site.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::criterion::{Criterion, unique_by_id};
use crate::account::validation::{ValidationError, ValidationErrors, is_blank};
use crate::error::ParseKindError;

/// Unique identifier for a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleId(pub Uuid);

impl RuleId {
    /// Create a fresh random rule ID.
    #[must_use]
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for RuleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for RuleId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// What a rule does with matching messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleAction {
    /// Archive matching messages.
    Archive,
    /// Delete matching messages.
    Delete,
    /// Move matching messages between folders.
    Move,
}

impl RuleAction {
    /// Wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Archive => "ARCHIVE",
            Self::Delete => "DELETE",
            Self::Move => "MOVE",
        }
    }
}

impl std::fmt::Display for RuleAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RuleAction {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ARCHIVE" => Ok(Self::Archive),
            "DELETE" => Ok(Self::Delete),
            "MOVE" => Ok(Self::Move),
            _ => Err(ParseKindError::new("rule action", s)),
        }
    }
}

/// Fields shared by every rule variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleDetails {
    id: RuleId,
    name: String,
    description: String,
    criteria: Vec<Criterion>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl RuleDetails {
    /// Details for a rule created now.
    fn created(
        id: RuleId,
        name: String,
        description: String,
        criteria: Vec<Criterion>,
    ) -> Self {
        let now = Utc::now();
        Self::restore(id, name, description, criteria, now, now)
    }

    /// Rebuild details with explicit timestamps.
    ///
    /// Criteria sharing an ID with an earlier criterion are dropped.
    #[must_use]
    pub fn restore(
        id: RuleId,
        name: impl Into<String>,
        description: impl Into<String>,
        criteria: Vec<Criterion>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            description: description.into(),
            criteria: unique_by_id(criteria),
            created_at,
            updated_at,
        }
    }

    /// Rule ID.
    #[must_use]
    pub const fn id(&self) -> RuleId {
        self.id
    }

    /// Rule name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rule description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Matching criteria.
    #[must_use]
    pub fn criteria(&self) -> &[Criterion] {
        &self.criteria
    }

    /// When the rule was created.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// When the rule was last updated.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Same identity and creation time, new content, `updated_at` refreshed.
    pub(crate) fn updated(
        &self,
        name: String,
        description: String,
        criteria: Vec<Criterion>,
    ) -> Self {
        Self::restore(
            self.id,
            name,
            description,
            criteria,
            self.created_at,
            next_update_time(self.updated_at),
        )
    }
}

/// Current time, forced strictly past `previous`.
fn next_update_time(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    if now > previous {
        now
    } else {
        previous + Duration::nanoseconds(1)
    }
}

/// Rule that archives matching messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveRule {
    details: RuleDetails,
}

impl ArchiveRule {
    /// Create a new archive rule stamped with the current time.
    #[must_use]
    pub fn new_rule(
        id: RuleId,
        name: impl Into<String>,
        description: impl Into<String>,
        criteria: Vec<Criterion>,
    ) -> Self {
        Self::from_details(RuleDetails::created(id, name.into(), description.into(), criteria))
    }

    /// Wrap existing details.
    #[must_use]
    pub const fn from_details(details: RuleDetails) -> Self {
        Self { details }
    }

    /// Shared rule fields.
    #[must_use]
    pub const fn details(&self) -> &RuleDetails {
        &self.details
    }
}

/// Rule that deletes matching messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteRule {
    details: RuleDetails,
}

impl DeleteRule {
    /// Create a new delete rule stamped with the current time.
    #[must_use]
    pub fn new_rule(
        id: RuleId,
        name: impl Into<String>,
        description: impl Into<String>,
        criteria: Vec<Criterion>,
    ) -> Self {
        Self::from_details(RuleDetails::created(id, name.into(), description.into(), criteria))
    }

    /// Wrap existing details.
    #[must_use]
    pub const fn from_details(details: RuleDetails) -> Self {
        Self { details }
    }

    /// Shared rule fields.
    #[must_use]
    pub const fn details(&self) -> &RuleDetails {
        &self.details
    }
}

/// Rule that moves matching messages from one folder to another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveRule {
    details: RuleDetails,
    source_folder: String,
    target_folder: String,
}

impl MoveRule {
    /// Create a new move rule stamped with the current time.
    ///
    /// # Errors
    ///
    /// Returns an error if either folder is blank.
    pub fn new_rule(
        id: RuleId,
        name: impl Into<String>,
        description: impl Into<String>,
        source_folder: impl Into<String>,
        target_folder: impl Into<String>,
        criteria: Vec<Criterion>,
    ) -> Result<Self, ValidationErrors> {
        Self::from_details(
            RuleDetails::created(id, name.into(), description.into(), criteria),
            source_folder,
            target_folder,
        )
    }

    /// Wrap existing details together with the folder pair.
    ///
    /// # Errors
    ///
    /// Returns an error if either folder is blank.
    pub fn from_details(
        details: RuleDetails,
        source_folder: impl Into<String>,
        target_folder: impl Into<String>,
    ) -> Result<Self, ValidationErrors> {
        let source_folder = source_folder.into();
        let target_folder = target_folder.into();

        let mut errors = Vec::new();
        if is_blank(&source_folder) {
            errors.push(ValidationError::EmptySourceFolder);
        }
        if is_blank(&target_folder) {
            errors.push(ValidationError::EmptyTargetFolder);
        }
        ValidationErrors::check(errors)?;

        Ok(Self {
            details,
            source_folder,
            target_folder,
        })
    }

    /// Shared rule fields.
    #[must_use]
    pub const fn details(&self) -> &RuleDetails {
        &self.details
    }

    /// Folder messages are moved out of.
    #[must_use]
    pub fn source_folder(&self) -> &str {
        &self.source_folder
    }

    /// Folder messages are moved into.
    #[must_use]
    pub fn target_folder(&self) -> &str {
        &self.target_folder
    }
}

/// Operation implemented once per rule variant.
pub trait RuleVisitor {
    /// Result of visiting a rule.
    type Output;

    /// Visit an archive rule.
    fn visit_archive(&self, rule: &ArchiveRule) -> Self::Output;

    /// Visit a delete rule.
    fn visit_delete(&self, rule: &DeleteRule) -> Self::Output;

    /// Visit a move rule.
    fn visit_move(&self, rule: &MoveRule) -> Self::Output;
}

/// A mail filtering rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    /// Archive matching messages.
    Archive(ArchiveRule),
    /// Delete matching messages.
    Delete(DeleteRule),
    /// Move matching messages.
    Move(MoveRule),
}

impl Rule {
    /// Dispatch to the visitor method for this rule's variant.
    pub fn accept<V: RuleVisitor + ?Sized>(&self, visitor: &V) -> V::Output {
        match self {
            Self::Archive(rule) => visitor.visit_archive(rule),
            Self::Delete(rule) => visitor.visit_delete(rule),
            Self::Move(rule) => visitor.visit_move(rule),
        }
    }

    /// Shared rule fields.
    #[must_use]
    pub const fn details(&self) -> &RuleDetails {
        match self {
            Self::Archive(rule) => rule.details(),
            Self::Delete(rule) => rule.details(),
            Self::Move(rule) => rule.details(),
        }
    }

    /// Action tag, always in agreement with the variant.
    #[must_use]
    pub const fn action(&self) -> RuleAction {
        match self {
            Self::Archive(_) => RuleAction::Archive,
            Self::Delete(_) => RuleAction::Delete,
            Self::Move(_) => RuleAction::Move,
        }
    }

    /// Rule ID.
    #[must_use]
    pub const fn id(&self) -> RuleId {
        self.details().id()
    }

    /// Rule name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.details().name()
    }

    /// Rule description.
    #[must_use]
    pub fn description(&self) -> &str {
        self.details().description()
    }

    /// Matching criteria.
    #[must_use]
    pub fn criteria(&self) -> &[Criterion] {
        self.details().criteria()
    }

    /// When the rule was created.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.details().created_at()
    }

    /// When the rule was last updated.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.details().updated_at()
    }

    /// The move variant, if this is one.
    #[must_use]
    pub const fn as_move(&self) -> Option<&MoveRule> {
        match self {
            Self::Move(rule) => Some(rule),
            Self::Archive(_) | Self::Delete(_) => None,
        }
    }
}

impl From<ArchiveRule> for Rule {
    fn from(rule: ArchiveRule) -> Self {
        Self::Archive(rule)
    }
}

impl From<DeleteRule> for Rule {
    fn from(rule: DeleteRule) -> Self {
        Self::Delete(rule)
    }
}

impl From<MoveRule> for Rule {
    fn from(rule: MoveRule) -> Self {
        Self::Move(rule)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::rule::{CriterionField, CriterionOperator};

    fn criteria() -> Vec<Criterion> {
        vec![Criterion::fresh(
            "newsletter",
            CriterionField::Subject,
            CriterionOperator::Contains,
        )]
    }

    mod rule_action_tests {
        use super::*;

        #[test]
        fn parse_is_case_insensitive() {
            assert_eq!("move".parse::<RuleAction>().unwrap(), RuleAction::Move);
            assert_eq!(" Archive ".parse::<RuleAction>().unwrap(), RuleAction::Archive);
            assert!("forward".parse::<RuleAction>().is_err());
        }

        #[test]
        fn display() {
            assert_eq!(RuleAction::Delete.to_string(), "DELETE");
        }
    }

    mod factory_tests {
        use super::*;

        #[test]
        fn new_rule_stamps_equal_timestamps() {
            let rule = ArchiveRule::new_rule(RuleId::new_random(), "Old", "Archive old", criteria());
            let rule = Rule::from(rule);
            assert_eq!(rule.created_at(), rule.updated_at());
            assert_eq!(rule.action(), RuleAction::Archive);
        }

        #[test]
        fn move_rule_keeps_folders() {
            let rule = MoveRule::new_rule(
                RuleId::new_random(),
                "Move",
                "Move receipts",
                "INBOX",
                "ARCHIVE",
                criteria(),
            )
            .unwrap();
            assert_eq!(rule.source_folder(), "INBOX");
            assert_eq!(rule.target_folder(), "ARCHIVE");
            assert_eq!(Rule::from(rule).action(), RuleAction::Move);
        }

        #[test]
        fn move_rule_rejects_blank_folders() {
            let errors = MoveRule::new_rule(RuleId::new_random(), "Move", "d", " ", "", criteria())
                .unwrap_err();
            assert!(errors.contains(&ValidationError::EmptySourceFolder));
            assert!(errors.contains(&ValidationError::EmptyTargetFolder));
        }

        #[test]
        fn duplicate_criteria_ids_collapse() {
            let c = criteria().remove(0);
            let rule = DeleteRule::new_rule(RuleId::new_random(), "Del", "d", vec![c.clone(), c]);
            assert_eq!(Rule::from(rule).criteria().len(), 1);
        }

        #[test]
        fn empty_criteria_permitted() {
            let rule = DeleteRule::new_rule(RuleId::new_random(), "Del", "d", Vec::new());
            assert!(Rule::from(rule).criteria().is_empty());
        }
    }

    mod visitor_tests {
        use super::*;

        struct Tag;

        impl RuleVisitor for Tag {
            type Output = &'static str;

            fn visit_archive(&self, _: &ArchiveRule) -> Self::Output {
                "archive"
            }

            fn visit_delete(&self, _: &DeleteRule) -> Self::Output {
                "delete"
            }

            fn visit_move(&self, _: &MoveRule) -> Self::Output {
                "move"
            }
        }

        #[test]
        fn accept_dispatches_on_variant() {
            let id = RuleId::new_random();
            let archive: Rule = ArchiveRule::new_rule(id, "a", "a", criteria()).into();
            let delete: Rule = DeleteRule::new_rule(id, "d", "d", criteria()).into();
            let moved: Rule = MoveRule::new_rule(id, "m", "m", "INBOX", "Old", criteria())
                .unwrap()
                .into();

            assert_eq!(archive.accept(&Tag), "archive");
            assert_eq!(delete.accept(&Tag), "delete");
            assert_eq!(moved.accept(&Tag), "move");
        }

        #[test]
        fn as_move_only_for_move_variant() {
            let id = RuleId::new_random();
            let archive: Rule = ArchiveRule::new_rule(id, "a", "a", criteria()).into();
            assert!(archive.as_move().is_none());
        }
    }

    #[test]
    fn next_update_time_is_strictly_later() {
        let future = Utc::now() + Duration::seconds(60);
        assert!(next_update_time(future) > future);

        let past = Utc::now() - Duration::seconds(60);
        assert!(next_update_time(past) > past);
    }
}
