//! Rule update dispatch.
//!
//! An update always yields a rule of the same variant as the one it was
//! applied to. Name, description and criteria are replaced outright; the
//! folder fields are optional overrides that only move rules look at.

use super::criterion::Criterion;
use super::model::{ArchiveRule, DeleteRule, MoveRule, Rule, RuleVisitor};
use crate::account::validation::ValidationErrors;

/// Partial update payload for an existing rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleUpdate {
    /// New name.
    pub name: String,
    /// New description.
    pub description: String,
    /// New criteria.
    pub criteria: Vec<Criterion>,
    /// New source folder; `None` keeps the current one.
    pub source_folder: Option<String>,
    /// New target folder; `None` keeps the current one.
    pub target_folder: Option<String>,
}

impl RuleUpdate {
    /// Update without folder overrides.
    #[must_use]
    pub fn simple(
        name: impl Into<String>,
        description: impl Into<String>,
        criteria: Vec<Criterion>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            criteria,
            source_folder: None,
            target_folder: None,
        }
    }

    /// Update carrying folder overrides.
    #[must_use]
    pub fn with_folders(
        name: impl Into<String>,
        description: impl Into<String>,
        criteria: Vec<Criterion>,
        source_folder: Option<String>,
        target_folder: Option<String>,
    ) -> Self {
        Self {
            source_folder,
            target_folder,
            ..Self::simple(name, description, criteria)
        }
    }

    /// Apply this update to `rule`.
    ///
    /// # Errors
    ///
    /// Returns an error if a folder override for a move rule is blank.
    pub fn apply(&self, rule: &Rule) -> Result<Rule, ValidationErrors> {
        rule.accept(self)
    }
}

impl RuleVisitor for RuleUpdate {
    type Output = Result<Rule, ValidationErrors>;

    fn visit_archive(&self, rule: &ArchiveRule) -> Self::Output {
        let details = rule.details().updated(
            self.name.clone(),
            self.description.clone(),
            self.criteria.clone(),
        );
        Ok(ArchiveRule::from_details(details).into())
    }

    fn visit_delete(&self, rule: &DeleteRule) -> Self::Output {
        let details = rule.details().updated(
            self.name.clone(),
            self.description.clone(),
            self.criteria.clone(),
        );
        Ok(DeleteRule::from_details(details).into())
    }

    fn visit_move(&self, rule: &MoveRule) -> Self::Output {
        let details = rule.details().updated(
            self.name.clone(),
            self.description.clone(),
            self.criteria.clone(),
        );
        let source = self
            .source_folder
            .as_deref()
            .unwrap_or_else(|| rule.source_folder());
        let target = self
            .target_folder
            .as_deref()
            .unwrap_or_else(|| rule.target_folder());
        Ok(MoveRule::from_details(details, source, target)?.into())
    }
}

/// Replace name, description and criteria of `rule`, keeping any folders.
///
/// # Errors
///
/// Never fails for a valid `rule`; the `Result` mirrors [`update_move_rule`].
pub fn update_rule(
    rule: &Rule,
    name: impl Into<String>,
    description: impl Into<String>,
    criteria: Vec<Criterion>,
) -> Result<Rule, ValidationErrors> {
    RuleUpdate::simple(name, description, criteria).apply(rule)
}

/// Replace name, description and criteria of `rule` and override folders
/// that are given. Folder overrides are ignored for non-move rules.
///
/// # Errors
///
/// Returns an error if a given folder override is blank for a move rule.
pub fn update_move_rule(
    rule: &Rule,
    name: impl Into<String>,
    description: impl Into<String>,
    criteria: Vec<Criterion>,
    source_folder: Option<String>,
    target_folder: Option<String>,
) -> Result<Rule, ValidationErrors> {
    RuleUpdate::with_folders(name, description, criteria, source_folder, target_folder).apply(rule)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{Duration, Utc};
    use proptest::prelude::*;

    use super::*;
    use crate::account::validation::ValidationError;
    use crate::rule::{CriterionField, CriterionOperator, RuleAction, RuleDetails, RuleId};

    fn criteria(value: &str) -> Vec<Criterion> {
        vec![Criterion::fresh(
            value,
            CriterionField::Subject,
            CriterionOperator::Contains,
        )]
    }

    fn details(id: RuleId) -> RuleDetails {
        let then = Utc::now() - Duration::minutes(5);
        RuleDetails::restore(id, "Original Name", "Original Description", criteria("value"), then, then)
    }

    fn move_rule(id: RuleId) -> Rule {
        MoveRule::from_details(details(id), "original/source", "original/target")
            .unwrap()
            .into()
    }

    #[test]
    fn updates_move_rule_with_new_folders() {
        let id = RuleId::new_random();
        let original = move_rule(id);

        let updated = update_move_rule(
            &original,
            "Updated Name",
            "Updated Description",
            criteria("new value"),
            Some("new/source".into()),
            Some("new/target".into()),
        )
        .unwrap();

        let moved = updated.as_move().unwrap();
        assert_eq!(updated.id(), id);
        assert_eq!(updated.name(), "Updated Name");
        assert_eq!(updated.description(), "Updated Description");
        assert_eq!(moved.source_folder(), "new/source");
        assert_eq!(moved.target_folder(), "new/target");
        assert_eq!(updated.created_at(), original.created_at());
        assert!(updated.updated_at() > original.updated_at());
    }

    #[test]
    fn updates_move_rule_keeping_original_folders() {
        let original = move_rule(RuleId::new_random());

        let updated =
            update_rule(&original, "Updated Name", "Updated Description", criteria("new")).unwrap();

        let moved = updated.as_move().unwrap();
        assert_eq!(moved.source_folder(), "original/source");
        assert_eq!(moved.target_folder(), "original/target");
        assert_eq!(updated.criteria()[0].value(), "new");
    }

    #[test]
    fn partial_folder_override_falls_back() {
        let original = move_rule(RuleId::new_random());

        let updated = update_move_rule(
            &original,
            "n",
            "d",
            criteria("v"),
            Some("S2".into()),
            None,
        )
        .unwrap();

        let moved = updated.as_move().unwrap();
        assert_eq!(moved.source_folder(), "S2");
        assert_eq!(moved.target_folder(), "original/target");
    }

    #[test]
    fn blank_folder_override_is_rejected() {
        let original = move_rule(RuleId::new_random());
        let errors =
            update_move_rule(&original, "n", "d", criteria("v"), None, Some("  ".into()))
                .unwrap_err();
        assert!(errors.contains(&ValidationError::EmptyTargetFolder));
    }

    #[test]
    fn updates_archive_rule() {
        let id = RuleId::new_random();
        let original: Rule = ArchiveRule::from_details(details(id)).into();

        let updated =
            update_rule(&original, "Updated Name", "Updated Description", criteria("new")).unwrap();

        assert_eq!(updated.action(), RuleAction::Archive);
        assert_eq!(updated.id(), id);
        assert_eq!(updated.name(), "Updated Name");
        assert_eq!(updated.created_at(), original.created_at());
        assert!(updated.updated_at() > original.updated_at());
    }

    #[test]
    fn updates_delete_rule_ignoring_folders() {
        let id = RuleId::new_random();
        let original: Rule = DeleteRule::from_details(details(id)).into();

        let updated = update_move_rule(
            &original,
            "Updated Name",
            "Updated Description",
            criteria("new"),
            Some("INBOX".into()),
            Some("Trash".into()),
        )
        .unwrap();

        assert_eq!(updated.action(), RuleAction::Delete);
        assert!(updated.as_move().is_none());
        assert_eq!(updated.description(), "Updated Description");
    }

    fn any_rule() -> impl Strategy<Value = Rule> {
        (0..3u8, "[A-Za-z]{1,12}", "[A-Za-z]{1,12}").prop_map(|(kind, source, target)| {
            let details = details(RuleId::new_random());
            match kind {
                0 => ArchiveRule::from_details(details).into(),
                1 => DeleteRule::from_details(details).into(),
                _ => MoveRule::from_details(details, source, target).unwrap().into(),
            }
        })
    }

    proptest! {
        #[test]
        fn update_preserves_variant_identity_and_creation(
            rule in any_rule(),
            name in "[a-z ]{3,20}",
            source in proptest::option::of("[A-Za-z/]{1,16}"),
            target in proptest::option::of("[A-Za-z/]{1,16}"),
        ) {
            let updated = update_move_rule(&rule, name.clone(), "desc", criteria("x"), source.clone(), target.clone()).unwrap();

            prop_assert_eq!(updated.action(), rule.action());
            prop_assert_eq!(updated.id(), rule.id());
            prop_assert_eq!(updated.created_at(), rule.created_at());
            prop_assert!(updated.updated_at() >= rule.updated_at());
            prop_assert_eq!(updated.name(), name.as_str());

            if let (Some(before), Some(after)) = (rule.as_move(), updated.as_move()) {
                let expected_source = source.as_deref().unwrap_or(before.source_folder());
                let expected_target = target.as_deref().unwrap_or(before.target_folder());
                prop_assert_eq!(after.source_folder(), expected_source);
                prop_assert_eq!(after.target_folder(), expected_target);
            }
        }
    }
}
