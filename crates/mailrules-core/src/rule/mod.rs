//! Mail filtering rules.
//!
//! A rule pairs an action (archive, delete, move) with the criteria that
//! select the messages it applies to. Rules are immutable values: updating
//! one produces a new rule of the same variant with the same identity.

mod criterion;
mod model;
mod update;

pub use criterion::{Criterion, CriterionField, CriterionId, CriterionOperator};
pub use model::{
    ArchiveRule, DeleteRule, MoveRule, Rule, RuleAction, RuleDetails, RuleId, RuleVisitor,
};
pub use update::{RuleUpdate, update_move_rule, update_rule};
