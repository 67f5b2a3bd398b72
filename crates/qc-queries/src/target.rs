//! Query Targets
//!
//! The composer never builds SQL itself. It talks to an externally owned
//! query object through [`QueryTarget`], which exposes the handful of
//! predicate and ordering primitives the filters need.

use qc_core::SortDirection;
use serde_json::Value;

/// A query object filters and sorts can be applied to
pub trait QueryTarget {
    /// `column = value`
    fn where_equals(&mut self, column: &str, value: &Value);

    /// `column <operator> value`, operator passed through verbatim
    fn where_compare(&mut self, column: &str, operator: &str, value: &Value);

    /// `column BETWEEN low AND high`, inclusive on both ends
    fn where_between(&mut self, column: &str, low: &Value, high: &Value);

    /// `column LIKE pattern`; the pattern already carries its `%` wildcards
    fn where_like(&mut self, column: &str, pattern: &str);

    /// `column IN (values...)`
    fn where_in(&mut self, column: &str, values: &[Value]);

    /// `ORDER BY column direction`
    fn order_by(&mut self, column: &str, direction: SortDirection);
}

/// One call against a [`QueryTarget`], kept as plain data
#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    Equals {
        column: String,
        value: Value,
    },
    Compare {
        column: String,
        operator: String,
        value: Value,
    },
    Between {
        column: String,
        low: Value,
        high: Value,
    },
    Like {
        column: String,
        pattern: String,
    },
    In {
        column: String,
        values: Vec<Value>,
    },
    OrderBy {
        column: String,
        direction: SortDirection,
    },
}

impl Clause {
    /// The column this clause touches
    pub fn column(&self) -> &str {
        match self {
            Self::Equals { column, .. }
            | Self::Compare { column, .. }
            | Self::Between { column, .. }
            | Self::Like { column, .. }
            | Self::In { column, .. }
            | Self::OrderBy { column, .. } => column,
        }
    }

    /// Replay this clause against a query target
    pub fn apply_to<Q: QueryTarget + ?Sized>(&self, query: &mut Q) {
        match self {
            Self::Equals { column, value } => query.where_equals(column, value),
            Self::Compare {
                column,
                operator,
                value,
            } => query.where_compare(column, operator, value),
            Self::Between { column, low, high } => query.where_between(column, low, high),
            Self::Like { column, pattern } => query.where_like(column, pattern),
            Self::In { column, values } => query.where_in(column, values),
            Self::OrderBy { column, direction } => query.order_by(column, *direction),
        }
    }
}

/// Recording target: every call is appended as a [`Clause`]
impl QueryTarget for Vec<Clause> {
    fn where_equals(&mut self, column: &str, value: &Value) {
        self.push(Clause::Equals {
            column: column.to_string(),
            value: value.clone(),
        });
    }

    fn where_compare(&mut self, column: &str, operator: &str, value: &Value) {
        self.push(Clause::Compare {
            column: column.to_string(),
            operator: operator.to_string(),
            value: value.clone(),
        });
    }

    fn where_between(&mut self, column: &str, low: &Value, high: &Value) {
        self.push(Clause::Between {
            column: column.to_string(),
            low: low.clone(),
            high: high.clone(),
        });
    }

    fn where_like(&mut self, column: &str, pattern: &str) {
        self.push(Clause::Like {
            column: column.to_string(),
            pattern: pattern.to_string(),
        });
    }

    fn where_in(&mut self, column: &str, values: &[Value]) {
        self.push(Clause::In {
            column: column.to_string(),
            values: values.to_vec(),
        });
    }

    fn order_by(&mut self, column: &str, direction: SortDirection) {
        self.push(Clause::OrderBy {
            column: column.to_string(),
            direction,
        });
    }
}
