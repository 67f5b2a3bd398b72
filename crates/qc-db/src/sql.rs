//! SQL Query
//!
//! A PostgreSQL `SELECT` over one table that filters and sorts can be
//! applied to. Values are always bound as `$n` parameters; identifiers are
//! double-quoted.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use qc_core::{PaginationParams, SortDirection};
use qc_queries::QueryTarget;
use serde_json::Value;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::QueryAs;
use sqlx::{FromRow, PgPool, Postgres};

use crate::error::ExecutorResult;

/// Comparison operators accepted by [`SqlQuery::where_compare`]
const COMPARISON_OPERATORS: &[&str] = &[
    "=", "!=", "<>", "<", "<=", ">", ">=", "like", "ilike", "not like",
];

/// Parameter for prepared statements
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Int(i64),
    Float(f64),
    String(String),
    Bool(bool),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Null,
}

impl SqlParam {
    /// Like [`From<&Value>`], but ISO date and datetime strings become
    /// temporal parameters so they compare against `date`/`timestamp` columns
    pub fn temporal(value: &Value) -> Self {
        match value {
            Value::String(s) => parse_temporal(s).unwrap_or_else(|| Self::String(s.clone())),
            other => Self::from(other),
        }
    }
}

impl From<&Value> for SqlParam {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Int(i),
                None => Self::Float(n.as_f64().unwrap_or_default()),
            },
            Value::String(s) => Self::String(s.clone()),
            Value::Array(_) | Value::Object(_) => Self::String(value.to_string()),
        }
    }
}

/// A parameterised `SELECT * FROM table` statement
#[derive(Debug, Clone, PartialEq)]
pub struct SqlQuery {
    table: String,
    conditions: Vec<String>,
    params: Vec<SqlParam>,
    order: Vec<String>,
    limit: Option<i64>,
    offset: Option<i64>,
}

impl SqlQuery {
    /// Start a query over `table`
    pub fn table(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            conditions: Vec::new(),
            params: Vec::new(),
            order: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    /// `column IS NOT NULL`
    pub fn where_not_null(&mut self, column: &str) -> &mut Self {
        self.conditions.push(format!("{} IS NOT NULL", quote_ident(column)));
        self
    }

    /// `column IS NULL`
    pub fn where_null(&mut self, column: &str) -> &mut Self {
        self.conditions.push(format!("{} IS NULL", quote_ident(column)));
        self
    }

    /// Limit the number of rows returned
    pub fn limit(&mut self, limit: i64) -> &mut Self {
        self.limit = Some(limit.max(0));
        self
    }

    /// Skip the first `offset` rows
    pub fn offset(&mut self, offset: i64) -> &mut Self {
        self.offset = Some(offset.max(0));
        self
    }

    /// Apply limit and offset for a page
    pub fn paginate(&mut self, pagination: &PaginationParams) -> &mut Self {
        self.limit(pagination.limit()).offset(pagination.offset())
    }

    /// Bound parameters, in placeholder order
    pub fn params(&self) -> &[SqlParam] {
        &self.params
    }

    /// Rendered `WHERE` predicates, in the order they were added
    pub fn conditions(&self) -> &[String] {
        &self.conditions
    }

    /// Render the full statement
    pub fn to_sql(&self) -> String {
        let mut sql = format!("SELECT * FROM {}", quote_ident(&self.table));
        sql.push_str(&self.where_clause());

        if !self.order.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&self.order.join(", "));
        }
        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }
        if let Some(offset) = self.offset {
            sql.push_str(&format!(" OFFSET {}", offset));
        }

        sql
    }

    /// Render the matching `COUNT(*)` statement, ignoring order and limits
    pub fn to_count_sql(&self) -> String {
        format!(
            "SELECT COUNT(*) FROM {}{}",
            quote_ident(&self.table),
            self.where_clause()
        )
    }

    /// Execute the statement and decode every row
    pub async fn fetch_all<T>(&self, pool: &PgPool) -> ExecutorResult<Vec<T>>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let sql = self.to_sql();
        tracing::debug!(sql = %sql, params = self.params.len(), "Executing composed query");

        let rows = bind_params(sqlx::query_as::<_, T>(&sql), &self.params)
            .fetch_all(pool)
            .await?;

        Ok(rows)
    }

    /// Count the rows matching the predicates
    pub async fn count(&self, pool: &PgPool) -> ExecutorResult<i64> {
        let sql = self.to_count_sql();
        tracing::debug!(sql = %sql, "Counting composed query");

        let row: (i64,) = bind_params(sqlx::query_as(&sql), &self.params)
            .fetch_one(pool)
            .await?;

        Ok(row.0)
    }

    fn where_clause(&self) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.conditions.join(" AND "))
        }
    }

    /// Register a parameter and return its placeholder
    fn bind(&mut self, value: &Value) -> String {
        self.push_param(SqlParam::from(value))
    }

    /// Register a parameter for an ordering comparison
    fn bind_temporal(&mut self, value: &Value) -> String {
        self.push_param(SqlParam::temporal(value))
    }

    fn push_param(&mut self, param: SqlParam) -> String {
        self.params.push(param);
        format!("${}", self.params.len())
    }
}

impl QueryTarget for SqlQuery {
    fn where_equals(&mut self, column: &str, value: &Value) {
        if value.is_null() {
            self.where_null(column);
            return;
        }
        let placeholder = self.bind(value);
        self.conditions
            .push(format!("{} = {}", quote_ident(column), placeholder));
    }

    fn where_compare(&mut self, column: &str, operator: &str, value: &Value) {
        let normalized = operator.trim().to_lowercase();
        if !COMPARISON_OPERATORS.contains(&normalized.as_str()) {
            tracing::warn!(column, operator, "Unsupported operator matches no rows");
            self.conditions.push("1 = 0".to_string());
            return;
        }
        let placeholder = match normalized.as_str() {
            "like" | "ilike" | "not like" => self.bind(value),
            _ => self.bind_temporal(value),
        };
        self.conditions.push(format!(
            "{} {} {}",
            quote_ident(column),
            normalized.to_uppercase(),
            placeholder
        ));
    }

    fn where_between(&mut self, column: &str, low: &Value, high: &Value) {
        let low = self.bind_temporal(low);
        let high = self.bind_temporal(high);
        self.conditions
            .push(format!("{} BETWEEN {} AND {}", quote_ident(column), low, high));
    }

    fn where_like(&mut self, column: &str, pattern: &str) {
        let placeholder = self.bind(&Value::String(pattern.to_string()));
        self.conditions
            .push(format!("{} LIKE {}", quote_ident(column), placeholder));
    }

    fn where_in(&mut self, column: &str, values: &[Value]) {
        if values.is_empty() {
            // Empty set, no match
            self.conditions.push("1 = 0".to_string());
            return;
        }
        let placeholders: Vec<String> = values.iter().map(|v| self.bind(v)).collect();
        self.conditions.push(format!(
            "{} IN ({})",
            quote_ident(column),
            placeholders.join(", ")
        ));
    }

    fn order_by(&mut self, column: &str, direction: SortDirection) {
        let direction = match direction {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        };
        self.order.push(format!("{} {}", quote_ident(column), direction));
    }
}

/// Bind parameters onto a prepared statement
fn bind_params<'q, O>(
    mut query: QueryAs<'q, Postgres, O, PgArguments>,
    params: &[SqlParam],
) -> QueryAs<'q, Postgres, O, PgArguments> {
    for param in params {
        query = match param {
            SqlParam::Int(i) => query.bind(*i),
            SqlParam::Float(f) => query.bind(*f),
            SqlParam::String(s) => query.bind(s.clone()),
            SqlParam::Bool(b) => query.bind(*b),
            SqlParam::Date(d) => query.bind(*d),
            SqlParam::DateTime(dt) => query.bind(*dt),
            SqlParam::Null => query.bind(None::<String>),
        };
    }
    query
}

/// ISO `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS` (or `T`-separated), or RFC 3339
fn parse_temporal(value: &str) -> Option<SqlParam> {
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(SqlParam::Date(date));
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(SqlParam::DateTime(dt));
        }
    }
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| SqlParam::DateTime(dt.naive_utc()))
}

/// Quote an identifier, splitting on `.` for qualified names
pub fn quote_ident(identifier: &str) -> String {
    identifier
        .split('.')
        .map(|part| format!("\"{}\"", part.replace('"', "\"\"")))
        .collect::<Vec<_>>()
        .join(".")
}
