//! Matching criteria attached to rules.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ParseKindError;

/// Unique identifier for a criterion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CriterionId(pub Uuid);

impl CriterionId {
    /// Create a fresh random criterion ID.
    #[must_use]
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for CriterionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Message field a criterion is evaluated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CriterionField {
    /// Sender address.
    From,
    /// Recipient address.
    To,
    /// Subject line.
    Subject,
    /// Message body.
    Body,
    /// Date the message was received.
    ReceivedAt,
}

impl CriterionField {
    /// All field kinds.
    pub const ALL: [Self; 5] = [
        Self::From,
        Self::To,
        Self::Subject,
        Self::Body,
        Self::ReceivedAt,
    ];

    /// Wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::From => "FROM",
            Self::To => "TO",
            Self::Subject => "SUBJECT",
            Self::Body => "BODY",
            Self::ReceivedAt => "RECEIVED_AT",
        }
    }
}

impl std::str::FromStr for CriterionField {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseKindError::new("criteria type", s))
    }
}

/// Comparison applied between the message field and the criterion value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CriterionOperator {
    /// Exact match.
    Equals,
    /// Substring match.
    Contains,
    /// Prefix match.
    StartsWith,
    /// Suffix match.
    EndsWith,
    /// Strictly greater.
    GreaterThan,
    /// Strictly less.
    LessThan,
    /// Greater or equal.
    GreaterThanOrEquals,
    /// Less or equal.
    LessThanOrEquals,
}

impl CriterionOperator {
    /// All operators.
    pub const ALL: [Self; 8] = [
        Self::Equals,
        Self::Contains,
        Self::StartsWith,
        Self::EndsWith,
        Self::GreaterThan,
        Self::LessThan,
        Self::GreaterThanOrEquals,
        Self::LessThanOrEquals,
    ];

    /// Wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Equals => "EQUALS",
            Self::Contains => "CONTAINS",
            Self::StartsWith => "STARTS_WITH",
            Self::EndsWith => "ENDS_WITH",
            Self::GreaterThan => "GREATER_THAN",
            Self::LessThan => "LESS_THAN",
            Self::GreaterThanOrEquals => "GREATER_THAN_OR_EQUALS",
            Self::LessThanOrEquals => "LESS_THAN_OR_EQUALS",
        }
    }
}

impl std::str::FromStr for CriterionOperator {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|op| op.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseKindError::new("criteria operator", s))
    }
}

/// A single matching predicate.
///
/// Pure data: evaluating criteria against messages happens elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Criterion {
    #[serde(rename = "criteria_id")]
    id: CriterionId,
    value: String,
    #[serde(rename = "type")]
    field: CriterionField,
    operator: CriterionOperator,
}

impl Criterion {
    /// Create a criterion with a known ID.
    #[must_use]
    pub fn new(
        id: CriterionId,
        value: impl Into<String>,
        field: CriterionField,
        operator: CriterionOperator,
    ) -> Self {
        Self {
            id,
            value: value.into(),
            field,
            operator,
        }
    }

    /// Create a criterion with a fresh random ID.
    #[must_use]
    pub fn fresh(value: impl Into<String>, field: CriterionField, operator: CriterionOperator) -> Self {
        Self::new(CriterionId::new_random(), value, field, operator)
    }

    /// Criterion ID.
    #[must_use]
    pub const fn id(&self) -> CriterionId {
        self.id
    }

    /// Value compared against the message field.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Message field.
    #[must_use]
    pub const fn field(&self) -> CriterionField {
        self.field
    }

    /// Comparison operator.
    #[must_use]
    pub const fn operator(&self) -> CriterionOperator {
        self.operator
    }
}

/// Drop criteria whose ID already appeared earlier in the list.
pub(crate) fn unique_by_id(criteria: Vec<Criterion>) -> Vec<Criterion> {
    let mut seen = std::collections::HashSet::with_capacity(criteria.len());
    criteria
        .into_iter()
        .filter(|criterion| seen.insert(criterion.id))
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn field_parse_roundtrip() {
        for field in CriterionField::ALL {
            assert_eq!(field.as_str().parse::<CriterionField>().unwrap(), field);
        }
        assert_eq!("received_at".parse::<CriterionField>().unwrap(), CriterionField::ReceivedAt);
        assert!("cc".parse::<CriterionField>().is_err());
    }

    #[test]
    fn operator_parse_roundtrip() {
        for op in CriterionOperator::ALL {
            assert_eq!(op.as_str().parse::<CriterionOperator>().unwrap(), op);
        }
        assert!("LIKE".parse::<CriterionOperator>().is_err());
    }

    #[test]
    fn serializes_with_stored_field_names() {
        let criterion = Criterion::fresh("invoice", CriterionField::Subject, CriterionOperator::Contains);
        let json = serde_json::to_value(&criterion).unwrap();
        assert_eq!(json["criteria_id"], criterion.id().to_string());
        assert_eq!(json["type"], "SUBJECT");
        assert_eq!(json["operator"], "CONTAINS");
        assert_eq!(json["value"], "invoice");
    }

    #[test]
    fn unique_by_id_keeps_first() {
        let id = CriterionId::new_random();
        let first = Criterion::new(id, "a", CriterionField::From, CriterionOperator::Equals);
        let dup = Criterion::new(id, "b", CriterionField::To, CriterionOperator::Equals);
        let other = Criterion::fresh("c", CriterionField::Body, CriterionOperator::Contains);

        let unique = unique_by_id(vec![first.clone(), dup, other.clone()]);
        assert_eq!(unique, vec![first, other]);
    }
}
