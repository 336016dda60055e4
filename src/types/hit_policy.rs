use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use super::error::BuildError;

/// DMN 1.3 hit policy: how the outputs of several matching rules are
/// reduced to the table's result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HitPolicy {
    /// At most one rule may match.
    #[default]
    Unique,
    /// The first matching rule in declaration order wins.
    First,
    /// The matching rule with the highest priority wins.
    Priority,
    /// Any number of rules may match as long as their outputs agree.
    Any,
    /// All matches, optionally reduced by an [`Aggregation`].
    Collect,
    /// All matches in declaration order.
    RuleOrder,
    /// All matches ordered by their serialized outputs.
    OutputOrder,
}

impl HitPolicy {
    pub const ALL: [HitPolicy; 7] = [
        HitPolicy::Unique,
        HitPolicy::First,
        HitPolicy::Priority,
        HitPolicy::Any,
        HitPolicy::Collect,
        HitPolicy::RuleOrder,
        HitPolicy::OutputOrder,
    ];

    /// The DMN name, e.g. `RULE_ORDER`.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            HitPolicy::Unique => "UNIQUE",
            HitPolicy::First => "FIRST",
            HitPolicy::Priority => "PRIORITY",
            HitPolicy::Any => "ANY",
            HitPolicy::Collect => "COLLECT",
            HitPolicy::RuleOrder => "RULE_ORDER",
            HitPolicy::OutputOrder => "OUTPUT_ORDER",
        }
    }

    /// Whether the policy returns a list of outputs rather than one.
    #[must_use]
    pub fn is_multi_hit(&self) -> bool {
        matches!(
            self,
            HitPolicy::Collect | HitPolicy::RuleOrder | HitPolicy::OutputOrder
        )
    }
}

impl FromStr for HitPolicy {
    type Err = BuildError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HitPolicy::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| BuildError::UnknownHitPolicy { name: s.to_owned() })
    }
}

impl fmt::Display for HitPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Reduction applied to the matches of a `COLLECT` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Aggregation {
    #[default]
    None,
    Count,
    Sum,
    Min,
    Max,
}

impl Aggregation {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Aggregation::None => "NONE",
            Aggregation::Count => "COUNT",
            Aggregation::Sum => "SUM",
            Aggregation::Min => "MIN",
            Aggregation::Max => "MAX",
        }
    }
}

impl FromStr for Aggregation {
    type Err = BuildError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NONE" => Ok(Aggregation::None),
            "COUNT" => Ok(Aggregation::Count),
            "SUM" => Ok(Aggregation::Sum),
            "MIN" => Ok(Aggregation::Min),
            "MAX" => Ok(Aggregation::Max),
            _ => Err(BuildError::UnknownAggregation { name: s.to_owned() }),
        }
    }
}

impl fmt::Display for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}
