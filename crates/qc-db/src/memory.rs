//! In-memory Query
//!
//! Evaluates the same predicates as [`SqlQuery`](crate::sql::SqlQuery)
//! against a set of JSON rows. Comparison rules follow a permissive SQL
//! engine: booleans equal 0/1, numeric strings compare as numbers, ISO dates
//! compare chronologically, `LIKE` ignores ASCII case, and `NULL` never
//! satisfies a predicate.

use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use qc_core::{PaginationParams, SortDirection};
use qc_queries::QueryTarget;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::ExecutorResult;

/// A row: column name to value
pub type Row = Map<String, Value>;

type Predicate = Box<dyn Fn(&Row) -> bool + Send + Sync>;

/// A query over rows held in memory
pub struct MemoryQuery {
    rows: Vec<Row>,
    predicates: Vec<Predicate>,
    order: Vec<(String, SortDirection)>,
    limit: Option<usize>,
    offset: usize,
}

impl MemoryQuery {
    /// Query over `rows`, kept in the given order
    pub fn new(rows: Vec<Row>) -> Self {
        Self {
            rows,
            predicates: Vec::new(),
            order: Vec::new(),
            limit: None,
            offset: 0,
        }
    }

    /// Query over JSON values; entries that are not objects are skipped
    pub fn from_values(values: impl IntoIterator<Item = Value>) -> Self {
        let rows = values
            .into_iter()
            .filter_map(|value| match value {
                Value::Object(row) => Some(row),
                other => {
                    tracing::warn!(row = %other, "Skipping row that is not a JSON object");
                    None
                }
            })
            .collect();
        Self::new(rows)
    }

    /// `column IS NOT NULL`
    pub fn where_not_null(&mut self, column: &str) -> &mut Self {
        let column = column.to_string();
        self.push(move |row| !field(row, &column).is_null())
    }

    /// `column IS NULL`
    pub fn where_null(&mut self, column: &str) -> &mut Self {
        let column = column.to_string();
        self.push(move |row| field(row, &column).is_null())
    }

    /// Limit the number of rows returned
    pub fn limit(&mut self, limit: i64) -> &mut Self {
        self.limit = Some(usize::try_from(limit).unwrap_or(0));
        self
    }

    /// Skip the first `offset` rows
    pub fn offset(&mut self, offset: i64) -> &mut Self {
        self.offset = usize::try_from(offset).unwrap_or(0);
        self
    }

    /// Apply limit and offset for a page
    pub fn paginate(&mut self, pagination: &PaginationParams) -> &mut Self {
        self.limit(pagination.limit()).offset(pagination.offset())
    }

    /// Evaluate: filter, order, then slice
    pub fn get(&self) -> Vec<Row> {
        let mut matched: Vec<&Row> = self.matching().collect();

        if !self.order.is_empty() {
            matched.sort_by(|a, b| self.compare_rows(a, b));
        }

        let rows = matched.into_iter().skip(self.offset).cloned();
        match self.limit {
            Some(limit) => rows.take(limit).collect(),
            None => rows.collect(),
        }
    }

    /// Evaluate and decode each row into `T`
    pub fn get_as<T: DeserializeOwned>(&self) -> ExecutorResult<Vec<T>> {
        let rows = self
            .get()
            .into_iter()
            .map(|row| serde_json::from_value(Value::Object(row)))
            .collect::<Result<Vec<T>, _>>()?;
        Ok(rows)
    }

    /// The values of one column across the result
    pub fn pluck(&self, column: &str) -> Vec<Value> {
        self.get()
            .iter()
            .map(|row| field(row, column).clone())
            .collect()
    }

    /// The first row of the result
    pub fn first(&self) -> Option<Row> {
        self.get().into_iter().next()
    }

    /// Number of rows matching the predicates, ignoring limit and offset
    pub fn count(&self) -> usize {
        self.matching().count()
    }

    fn matching(&self) -> impl Iterator<Item = &Row> + '_ {
        self.rows
            .iter()
            .filter(|row| self.predicates.iter().all(|predicate| predicate(row)))
    }

    fn compare_rows(&self, a: &Row, b: &Row) -> Ordering {
        for (column, direction) in &self.order {
            let ordering = sort_order(field(a, column), field(b, column));
            let ordering = match direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }

    fn push<F>(&mut self, predicate: F) -> &mut Self
    where
        F: Fn(&Row) -> bool + Send + Sync + 'static,
    {
        self.predicates.push(Box::new(predicate));
        self
    }
}

impl QueryTarget for MemoryQuery {
    fn where_equals(&mut self, column: &str, value: &Value) {
        let column = column.to_string();
        let value = value.clone();
        self.push(move |row| loose_eq(field(row, &column), &value));
    }

    fn where_compare(&mut self, column: &str, operator: &str, value: &Value) {
        let column = column.to_string();
        let value = value.clone();
        let predicate: fn(&Value, &Value) -> bool = match operator.trim().to_lowercase().as_str() {
            "=" => loose_eq,
            "!=" | "<>" => |a: &Value, b: &Value| !a.is_null() && !b.is_null() && !loose_eq(a, b),
            "<" => |a: &Value, b: &Value| compare(a, b) == Some(Ordering::Less),
            "<=" => |a: &Value, b: &Value| {
                matches!(compare(a, b), Some(Ordering::Less | Ordering::Equal))
            },
            ">" => |a: &Value, b: &Value| compare(a, b) == Some(Ordering::Greater),
            ">=" => |a: &Value, b: &Value| {
                matches!(compare(a, b), Some(Ordering::Greater | Ordering::Equal))
            },
            "like" => like_value,
            "not like" => |a: &Value, b: &Value| !a.is_null() && !like_value(a, b),
            _ => {
                tracing::warn!(column = %column, operator, "Unknown operator matches no rows");
                |_: &Value, _: &Value| false
            }
        };
        self.push(move |row| predicate(field(row, &column), &value));
    }

    fn where_between(&mut self, column: &str, low: &Value, high: &Value) {
        let column = column.to_string();
        let (low, high) = (low.clone(), high.clone());
        self.push(move |row| {
            let value = field(row, &column);
            matches!(compare(value, &low), Some(Ordering::Greater | Ordering::Equal))
                && matches!(compare(value, &high), Some(Ordering::Less | Ordering::Equal))
        });
    }

    fn where_like(&mut self, column: &str, pattern: &str) {
        let column = column.to_string();
        let pattern = pattern.to_string();
        self.push(move |row| match text(field(row, &column)) {
            Some(value) => like(&value, &pattern),
            None => false,
        });
    }

    fn where_in(&mut self, column: &str, values: &[Value]) {
        let column = column.to_string();
        let values = values.to_vec();
        self.push(move |row| {
            let value = field(row, &column);
            values.iter().any(|candidate| loose_eq(value, candidate))
        });
    }

    fn order_by(&mut self, column: &str, direction: SortDirection) {
        self.order.push((column.to_string(), direction));
    }
}

impl std::fmt::Debug for MemoryQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryQuery")
            .field("rows", &self.rows.len())
            .field("predicates", &self.predicates.len())
            .field("order", &self.order)
            .field("limit", &self.limit)
            .field("offset", &self.offset)
            .finish()
    }
}

/// Missing columns read as null
fn field<'a>(row: &'a Row, column: &str) -> &'a Value {
    row.get(column).unwrap_or(&Value::Null)
}

/// Numeric view of a value: numbers, booleans as 0/1, numeric strings
fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Chronological view of an ISO date or datetime string
fn timestamp(value: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        return Some(dt);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_utc());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

fn text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(if *b { "1" } else { "0" }.to_string()),
        other => Some(other.to_string()),
    }
}

/// SQL-style equality; null equals nothing
fn loose_eq(a: &Value, b: &Value) -> bool {
    if a.is_null() || b.is_null() {
        return false;
    }
    compare(a, b) == Some(Ordering::Equal)
}

/// Order two non-null values, or `None` when they are not comparable
fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Null, _) | (_, Value::Null) => None,
        (Value::String(x), Value::String(y)) => match (timestamp(x), timestamp(y)) {
            (Some(x), Some(y)) => Some(x.cmp(&y)),
            _ => Some(x.cmp(y)),
        },
        (Value::Array(_) | Value::Object(_), _) | (_, Value::Array(_) | Value::Object(_)) => {
            (a == b).then_some(Ordering::Equal)
        }
        _ => number(a)?.partial_cmp(&number(b)?),
    }
}

/// Total order used for sorting: nulls first, then comparable values,
/// then by type
fn sort_order(a: &Value, b: &Value) -> Ordering {
    match (a.is_null(), b.is_null()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => compare(a, b).unwrap_or_else(|| type_rank(a).cmp(&type_rank(b))),
    }
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) | Value::Number(_) => 1,
        Value::String(_) => 2,
        Value::Array(_) => 3,
        Value::Object(_) => 4,
    }
}

fn like_value(value: &Value, pattern: &Value) -> bool {
    match (text(value), text(pattern)) {
        (Some(value), Some(pattern)) => like(&value, &pattern),
        _ => false,
    }
}

/// `LIKE` matching: `%` any run, `_` one character, ASCII case-insensitive
pub fn like(value: &str, pattern: &str) -> bool {
    let value: Vec<char> = value.chars().map(|c| c.to_ascii_lowercase()).collect();
    let pattern: Vec<char> = pattern.chars().map(|c| c.to_ascii_lowercase()).collect();

    // matched[j]: pattern[..j] matches the value prefix consumed so far
    let mut matched = vec![false; pattern.len() + 1];
    matched[0] = true;
    for j in 1..=pattern.len() {
        matched[j] = matched[j - 1] && pattern[j - 1] == '%';
    }

    for c in &value {
        let mut next = vec![false; pattern.len() + 1];
        for j in 1..=pattern.len() {
            next[j] = match pattern[j - 1] {
                '%' => next[j - 1] || matched[j],
                '_' => matched[j - 1],
                p => matched[j - 1] && p == *c,
            };
        }
        matched = next;
    }

    matched[pattern.len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn products() -> MemoryQuery {
        MemoryQuery::from_values(vec![
            json!({"id": 1, "name": "iPhone 15", "price": 999, "active": true, "released": "2023-09-22"}),
            json!({"id": 2, "name": "Galaxy S24", "price": 899, "active": false, "released": "2024-01-31"}),
            json!({"id": 3, "name": "iPhone 14", "price": 799, "active": true, "released": null}),
            json!({"id": 4, "name": "Pixel_8", "price": "699", "active": 1}),
        ])
    }

    fn ids(query: &MemoryQuery) -> Vec<Value> {
        query.pluck("id")
    }

    #[test]
    fn test_like() {
        assert!(like("iPhone 15", "%iphone%"));
        assert!(like("iPhone 15", "iPhone%"));
        assert!(like("iPhone 15", "%15"));
        assert!(like("abc", "a_c"));
        assert!(like("", "%"));
        assert!(!like("iPhone 15", "iPhone"));
        assert!(!like("abc", "a_"));
        assert!(!like("Galaxy", "%iPhone%"));
    }

    #[test]
    fn test_compare_rules() {
        assert!(loose_eq(&json!(true), &json!(1)));
        assert!(loose_eq(&json!(false), &json!(0)));
        assert!(loose_eq(&json!("699"), &json!(699)));
        assert!(!loose_eq(&Value::Null, &Value::Null));
        assert_eq!(compare(&json!("2024-02-01"), &json!("2024-01-31")), Some(Ordering::Greater));
        assert_eq!(
            compare(&json!("2024-02-01"), &json!("2024-02-01 00:00:00")),
            Some(Ordering::Equal)
        );
        assert_eq!(compare(&json!("apple"), &json!("banana")), Some(Ordering::Less));
        assert_eq!(compare(&json!("abc"), &json!(3)), None);
    }

    #[test]
    fn test_equals_with_bool_columns() {
        let mut query = products();
        query.where_equals("active", &json!(true));
        assert_eq!(ids(&query), vec![json!(1), json!(3), json!(4)]);
    }

    #[test]
    fn test_compare_and_between() {
        let mut query = products();
        query.where_compare("price", ">=", &json!(799));
        assert_eq!(ids(&query), vec![json!(1), json!(2), json!(3)]);

        let mut query = products();
        query.where_between("released", &json!("2023-01-01"), &json!("2023-12-31"));
        assert_eq!(ids(&query), vec![json!(1)]);
    }

    #[test]
    fn test_unknown_operator_matches_nothing() {
        let mut query = products();
        query.where_compare("price", "between", &json!(799));
        assert_eq!(query.count(), 0);
    }

    #[test]
    fn test_nulls_never_match() {
        let mut query = products();
        query.where_compare("released", "<", &json!("2030-01-01"));
        assert_eq!(ids(&query), vec![json!(1), json!(2)]);

        let mut query = products();
        query.where_compare("released", "!=", &json!("2023-09-22"));
        assert_eq!(ids(&query), vec![json!(2)]);
    }

    #[test]
    fn test_like_and_in() {
        let mut query = products();
        query.where_like("name", "%iphone%");
        assert_eq!(ids(&query), vec![json!(1), json!(3)]);

        let mut query = products();
        query.where_in("id", &[json!(2), json!("4")]);
        assert_eq!(ids(&query), vec![json!(2), json!(4)]);

        let mut query = products();
        query.where_in("id", &[]);
        assert!(query.get().is_empty());
    }

    #[test]
    fn test_null_checks() {
        let mut query = products();
        query.where_not_null("released");
        assert_eq!(ids(&query), vec![json!(1), json!(2)]);

        let mut query = products();
        query.where_null("released");
        assert_eq!(ids(&query), vec![json!(3), json!(4)]);
    }

    #[test]
    fn test_order_by() {
        let mut query = products();
        query.order_by("price", SortDirection::Asc);
        assert_eq!(ids(&query), vec![json!(4), json!(3), json!(2), json!(1)]);

        let mut query = products();
        query.order_by("released", SortDirection::Asc);
        assert_eq!(ids(&query), vec![json!(3), json!(4), json!(1), json!(2)]);

        let mut query = products();
        query.order_by("active", SortDirection::Desc);
        query.order_by("price", SortDirection::Desc);
        assert_eq!(ids(&query), vec![json!(1), json!(3), json!(4), json!(2)]);
    }

    #[test]
    fn test_pagination() {
        let mut query = products();
        query.order_by("id", SortDirection::Asc);
        query.paginate(&PaginationParams::new(2, 3));
        assert_eq!(ids(&query), vec![json!(4)]);
        assert_eq!(query.count(), 4);
    }

    #[test]
    fn test_skips_non_object_rows() {
        let query = MemoryQuery::from_values(vec![json!({"id": 1}), json!([1, 2]), json!("x")]);
        assert_eq!(query.count(), 1);
    }
}
