//! A structured, backend-independent description of a single SELECT.
//!
//! The window builder, coverage resolver and retriever produce [`QuerySpec`]
//! values; a [`crate::QueryBackend`] renders them into whatever the remote
//! engine speaks (see [`crate::render_sql`] for the CMAP dialect).

use chrono::NaiveDateTime;
use std::fmt;

/// Aggregation functions understood by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Aggregate {
    Avg,
    Min,
    Max,
}

impl fmt::Display for Aggregate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Aggregate::Avg => "AVG",
            Aggregate::Min => "MIN",
            Aggregate::Max => "MAX",
        };
        f.write_str(name)
    }
}

/// One entry of the SELECT list.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    Column(String),
    Aggregate {
        function: Aggregate,
        column: String,
        alias: String,
    },
}

/// A literal value on the right-hand side of a predicate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Literal {
    Number(f64),
    Integer(i64),
    Timestamp(NaiveDateTime),
}

/// A single WHERE-clause predicate. Predicates of a spec are AND-ed.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// `column BETWEEN low AND high`, inclusive on both ends.
    Between {
        column: String,
        low: Literal,
        high: Literal,
    },
    /// `column = value`.
    Equals { column: String, value: Literal },
}

impl Predicate {
    pub fn between(column: &str, low: Literal, high: Literal) -> Self {
        Predicate::Between {
            column: column.to_string(),
            low,
            high,
        }
    }

    pub fn equals(column: &str, value: Literal) -> Self {
        Predicate::Equals {
            column: column.to_string(),
            value,
        }
    }

    pub fn column(&self) -> &str {
        match self {
            Predicate::Between { column, .. } | Predicate::Equals { column, .. } => column,
        }
    }
}

/// A SELECT over one table: selection list plus conjunctive filters, no grouping.
///
/// # Examples
///
/// ```
/// use cyano_colocalize::{Aggregate, Literal, Predicate, QuerySpec};
///
/// let spec = QuerySpec::new("tblSST_AVHRR_OI_NRT")
///     .aggregate(Aggregate::Avg, "sst", "sst")
///     .filter(Predicate::between("lat", Literal::Number(20.0), Literal::Number(21.0)));
/// assert!(spec.filter_on("lat").is_some());
/// assert!(spec.filter_on("depth").is_none());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct QuerySpec {
    pub table: String,
    pub selection: Vec<Selection>,
    pub filters: Vec<Predicate>,
}

impl QuerySpec {
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            selection: Vec::new(),
            filters: Vec::new(),
        }
    }

    pub fn column(mut self, column: &str) -> Self {
        self.selection.push(Selection::Column(column.to_string()));
        self
    }

    pub fn aggregate(mut self, function: Aggregate, column: &str, alias: &str) -> Self {
        self.selection.push(Selection::Aggregate {
            function,
            column: column.to_string(),
            alias: alias.to_string(),
        });
        self
    }

    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.filters.push(predicate);
        self
    }

    /// The first predicate on `column`, if any.
    pub fn filter_on(&self, column: &str) -> Option<&Predicate> {
        self.filters.iter().find(|p| p.column() == column)
    }

    /// Names of the result columns, in selection order.
    pub fn output_columns(&self) -> Vec<&str> {
        self.selection
            .iter()
            .map(|s| match s {
                Selection::Column(c) => c.as_str(),
                Selection::Aggregate { alias, .. } => alias.as_str(),
            })
            .collect()
    }
}
