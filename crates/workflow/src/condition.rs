//! Conditions guarding branch cases.
//!
//! Conditions are evaluated by the remote service; the client only carries
//! them so a promoted branch node mirrors its template.

use serde::{Deserialize, Serialize};

/// A literal scalar usable as a comparison operand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Primitive {
    /// Integer literal.
    Integer(i64),
    /// Float literal.
    Float(f64),
    /// String literal.
    String(String),
    /// Boolean literal.
    Boolean(bool),
}

/// One side of a comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operand {
    /// A literal.
    Primitive(Primitive),
    /// A variable bound on the branch node's inputs.
    Var(String),
}

/// Binary comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonOperator {
    /// `==`
    Eq,
    /// `!=`
    Neq,
    /// `>`
    Gt,
    /// `>=`
    Gte,
    /// `<`
    Lt,
    /// `<=`
    Lte,
}

/// Logical connective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConjunctionOperator {
    /// Both sides hold.
    And,
    /// Either side holds.
    Or,
}

/// A boolean condition over branch inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BooleanExpression {
    /// `left <op> right`
    Comparison {
        /// Operator.
        operator: ComparisonOperator,
        /// Left operand.
        left: Operand,
        /// Right operand.
        right: Operand,
    },
    /// `left AND|OR right`
    Conjunction {
        /// Connective.
        operator: ConjunctionOperator,
        /// Left expression.
        left: Box<BooleanExpression>,
        /// Right expression.
        right: Box<BooleanExpression>,
    },
}

impl BooleanExpression {
    /// Compare a bound variable against a literal.
    #[must_use]
    pub fn compare(operator: ComparisonOperator, var: impl Into<String>, value: Primitive) -> Self {
        Self::Comparison {
            operator,
            left: Operand::Var(var.into()),
            right: Operand::Primitive(value),
        }
    }

    /// Join two expressions.
    #[must_use]
    pub fn join(operator: ConjunctionOperator, left: Self, right: Self) -> Self {
        Self::Conjunction {
            operator,
            left: Box::new(left),
            right: Box::new(right),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_expression_serde_roundtrip() {
        let expr = BooleanExpression::join(
            ConjunctionOperator::And,
            BooleanExpression::compare(ComparisonOperator::Gt, "x", Primitive::Integer(3)),
            BooleanExpression::compare(
                ComparisonOperator::Eq,
                "mode",
                Primitive::String("fast".into()),
            ),
        );
        let json = serde_json::to_string(&expr).unwrap();
        let back: BooleanExpression = serde_json::from_str(&json).unwrap();
        assert_eq!(back, expr);
    }
}
