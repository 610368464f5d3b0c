//! Renders a [`QuerySpec`] into the T-SQL dialect served by the CMAP API.

use crate::query::query_spec::{Literal, Predicate, QuerySpec, Selection};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Renders `spec` as a CMAP SQL statement.
///
/// Identifiers are bracket-quoted since `time` and `month` are reserved words
/// in T-SQL; an empty selection renders as `*`.
///
/// ```
/// use cyano_colocalize::{render_sql, Aggregate, Literal, Predicate, QuerySpec};
///
/// let spec = QuerySpec::new("tblModis_PAR")
///     .aggregate(Aggregate::Avg, "PAR", "PAR")
///     .filter(Predicate::equals("month", Literal::Integer(7)));
/// assert_eq!(
///     render_sql(&spec),
///     "SELECT AVG([PAR]) AS [PAR] FROM tblModis_PAR WHERE [month] = 7"
/// );
/// ```
pub fn render_sql(spec: &QuerySpec) -> String {
    let mut sql = String::from("SELECT ");
    if spec.selection.is_empty() {
        sql.push('*');
    } else {
        let items: Vec<String> = spec.selection.iter().map(render_selection).collect();
        sql.push_str(&items.join(", "));
    }
    sql.push_str(&format!(" FROM {}", spec.table));

    if !spec.filters.is_empty() {
        let predicates: Vec<String> = spec.filters.iter().map(render_predicate).collect();
        sql.push_str(&format!(" WHERE {}", predicates.join(" AND ")));
    }
    sql
}

fn quote(identifier: &str) -> String {
    format!("[{}]", identifier)
}

fn render_selection(selection: &Selection) -> String {
    match selection {
        Selection::Column(column) => quote(column),
        Selection::Aggregate {
            function,
            column,
            alias,
        } => format!("{}({}) AS {}", function, quote(column), quote(alias)),
    }
}

fn render_predicate(predicate: &Predicate) -> String {
    match predicate {
        Predicate::Between { column, low, high } => format!(
            "{} BETWEEN {} AND {}",
            quote(column),
            render_literal(low),
            render_literal(high)
        ),
        Predicate::Equals { column, value } => {
            format!("{} = {}", quote(column), render_literal(value))
        }
    }
}

fn render_literal(literal: &Literal) -> String {
    match literal {
        Literal::Number(n) => n.to_string(),
        Literal::Integer(i) => i.to_string(),
        Literal::Timestamp(t) => format!("'{}'", t.format(TIMESTAMP_FORMAT)),
    }
}
