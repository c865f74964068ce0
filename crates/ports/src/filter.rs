//! Listing filters, passed through to the remote service unmodified.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Comparison applied by the remote service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparator {
    /// Equal.
    Eq,
    /// Not equal.
    Neq,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    Gte,
    /// Less than.
    Lt,
    /// Less than or equal.
    Lte,
    /// Substring match.
    Contains,
    /// Member of a `;`-separated list.
    ValueIn,
}

impl Comparator {
    /// Wire name of the comparator.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Neq => "ne",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::Contains => "contains",
            Self::ValueIn => "value_in",
        }
    }
}

/// A `(field, comparator, value)` triple.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Filter {
    /// Field name, as understood by the remote service.
    pub field: String,
    /// Comparison.
    pub comparator: Comparator,
    /// Right-hand side, as a string.
    pub value: String,
}

impl Filter {
    /// Create a filter.
    pub fn new(field: impl Into<String>, comparator: Comparator, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            comparator,
            value: value.into(),
        }
    }

    /// `field == value`.
    pub fn equals(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(field, Comparator::Eq, value)
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({},{})", self.comparator.as_str(), self.field, self.value)
    }
}
