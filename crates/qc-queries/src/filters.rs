//! Query Filters
//!
//! A filter is a named rule that turns one submitted value into a query
//! predicate. Every filter shares the same base configuration (label,
//! column, default, visibility, placeholder) and carries one of four kinds,
//! each with its own operator vocabulary and default rule:
//!
//! | Kind    | Default rule                                                   |
//! |---------|----------------------------------------------------------------|
//! | Boolean | `column = coerce_bool(value)`                                  |
//! | Date    | `between` + 2-element array: range; otherwise `column op value` |
//! | Text    | `like`/`starts_with`/`ends_with`: pattern; otherwise `column op value` |
//! | Select  | `multiple` + array: `column IN value`; otherwise `column = value` |
//!
//! A custom predicate replaces the default rule entirely.

use std::fmt;

use qc_core::{require_name, ConfigResult};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::headline::headline;
use crate::target::{Clause, QueryTarget};
use crate::values::{coerce_bool, value_to_text};

/// Caller-supplied predicate that takes over from a filter's default rule
pub type CustomPredicate<Q> = Box<dyn Fn(&mut Q, &Value) + Send + Sync>;

/// Operators understood by date and text filters
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operator {
    /// Equals (=)
    Equals,
    /// Not equals (!=)
    NotEquals,
    /// Less than (<)
    LessThan,
    /// Less than or equal (<=)
    LessThanOrEqual,
    /// Greater than (>)
    GreaterThan,
    /// Greater than or equal (>=)
    GreaterThanOrEqual,
    /// Inclusive range over a two-element value (between)
    Between,
    /// Substring match (like)
    Like,
    /// Prefix match (starts_with)
    StartsWith,
    /// Suffix match (ends_with)
    EndsWith,
    /// Anything else, passed to the query layer verbatim
    Other(String),
}

impl Operator {
    /// Parse operator from string representation. Never fails.
    pub fn parse(s: &str) -> Self {
        match s {
            "=" => Self::Equals,
            "!=" => Self::NotEquals,
            "<" => Self::LessThan,
            "<=" => Self::LessThanOrEqual,
            ">" => Self::GreaterThan,
            ">=" => Self::GreaterThanOrEqual,
            "between" => Self::Between,
            "like" => Self::Like,
            "starts_with" => Self::StartsWith,
            "ends_with" => Self::EndsWith,
            other => Self::Other(other.to_string()),
        }
    }

    /// String representation, identical to what was parsed
    pub fn as_str(&self) -> &str {
        match self {
            Self::Equals => "=",
            Self::NotEquals => "!=",
            Self::LessThan => "<",
            Self::LessThanOrEqual => "<=",
            Self::GreaterThan => ">",
            Self::GreaterThanOrEqual => ">=",
            Self::Between => "between",
            Self::Like => "like",
            Self::StartsWith => "starts_with",
            Self::EndsWith => "ends_with",
            Self::Other(s) => s,
        }
    }
}

impl From<&str> for Operator {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Operator {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BooleanFields {
    pub true_label: Option<String>,
    pub false_label: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DateFields {
    pub operator: Operator,
    pub min_date: Option<String>,
    pub max_date: Option<String>,
    pub with_time: bool,
}

impl Default for DateFields {
    fn default() -> Self {
        Self {
            operator: Operator::Equals,
            min_date: None,
            max_date: None,
            with_time: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextFields {
    pub operator: Operator,
    /// Advisory only: carried to the client and to custom predicates,
    /// never consulted by the default rule
    pub case_sensitive: bool,
}

impl Default for TextFields {
    fn default() -> Self {
        Self {
            operator: Operator::Like,
            case_sensitive: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectFields {
    /// Option value -> display text, in display order
    pub options: Vec<(String, String)>,
    pub multiple: bool,
    pub searchable: bool,
}

/// The kind of a filter and its kind-specific configuration
#[derive(Debug, Clone, PartialEq)]
pub enum FilterKind {
    Boolean(BooleanFields),
    Date(DateFields),
    Text(TextFields),
    Select(SelectFields),
}

impl FilterKind {
    /// Type tag used when describing the filter to a client
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Boolean(_) => "BooleanFilter",
            Self::Date(_) => "DateFilter",
            Self::Text(_) => "TextFilter",
            Self::Select(_) => "SelectFilter",
        }
    }

    /// The predicate the default rule produces for `value` on `column`
    pub fn clause(&self, column: &str, value: &Value) -> Clause {
        let column = column.to_string();
        match self {
            Self::Boolean(_) => Clause::Equals {
                column,
                value: Value::Bool(coerce_bool(value)),
            },
            Self::Date(fields) => match (&fields.operator, value) {
                (Operator::Between, Value::Array(range)) if range.len() == 2 => Clause::Between {
                    column,
                    low: range[0].clone(),
                    high: range[1].clone(),
                },
                (operator, _) => Clause::Compare {
                    column,
                    operator: operator.as_str().to_string(),
                    value: value.clone(),
                },
            },
            Self::Text(fields) => {
                let pattern = match fields.operator {
                    Operator::Like => format!("%{}%", value_to_text(value)),
                    Operator::StartsWith => format!("{}%", value_to_text(value)),
                    Operator::EndsWith => format!("%{}", value_to_text(value)),
                    ref operator => {
                        return Clause::Compare {
                            column,
                            operator: operator.as_str().to_string(),
                            value: value.clone(),
                        }
                    }
                };
                Clause::Like { column, pattern }
            }
            Self::Select(fields) => match value {
                Value::Array(values) if fields.multiple => Clause::In {
                    column,
                    values: values.clone(),
                },
                _ => Clause::Equals {
                    column,
                    value: value.clone(),
                },
            },
        }
    }

    fn describe(&self) -> KindDescription {
        match self {
            Self::Boolean(fields) => KindDescription::Boolean(BooleanDescription {
                true_label: fields.true_label.clone().unwrap_or_else(|| "Yes".to_string()),
                false_label: fields.false_label.clone().unwrap_or_else(|| "No".to_string()),
            }),
            Self::Date(fields) => KindDescription::Date(DateDescription {
                operator: fields.operator.clone(),
                min_date: fields.min_date.clone(),
                max_date: fields.max_date.clone(),
                with_time: fields.with_time,
            }),
            Self::Text(fields) => KindDescription::Text(TextDescription {
                operator: fields.operator.clone(),
                case_sensitive: fields.case_sensitive,
            }),
            Self::Select(fields) => KindDescription::Select(SelectDescription {
                options: fields
                    .options
                    .iter()
                    .map(|(value, display)| (value.clone(), Value::String(display.clone())))
                    .collect(),
                multiple: fields.multiple,
                searchable: fields.searchable,
            }),
        }
    }
}

/// A named, typed filter definition
pub struct Filter<Q> {
    name: String,
    label: Option<String>,
    column: Option<String>,
    custom: Option<CustomPredicate<Q>>,
    default: Value,
    visible: bool,
    placeholder: Option<String>,
    kind: FilterKind,
}

impl<Q> Filter<Q> {
    /// Create a filter of the given kind. The name must not be blank.
    pub fn new(name: impl Into<String>, kind: FilterKind) -> ConfigResult<Self> {
        Ok(Self {
            name: require_name("Filter", name)?,
            label: None,
            column: None,
            custom: None,
            default: Value::Null,
            visible: true,
            placeholder: None,
            kind,
        })
    }

    /// Create a boolean filter
    pub fn boolean(name: impl Into<String>) -> ConfigResult<Self> {
        Self::new(name, FilterKind::Boolean(BooleanFields::default()))
    }

    /// Create a date filter (operator `=`)
    pub fn date(name: impl Into<String>) -> ConfigResult<Self> {
        Self::new(name, FilterKind::Date(DateFields::default()))
    }

    /// Create a text filter (operator `like`)
    pub fn text(name: impl Into<String>) -> ConfigResult<Self> {
        Self::new(name, FilterKind::Text(TextFields::default()))
    }

    /// Create a select filter (single value)
    pub fn select(name: impl Into<String>) -> ConfigResult<Self> {
        Self::new(name, FilterKind::Select(SelectFields::default()))
    }

    // Base configuration

    /// Set the display label
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set the query column, when it differs from the name
    pub fn column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }

    /// Replace the default rule with a custom predicate
    pub fn custom_predicate<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&mut Q, &Value) + Send + Sync + 'static,
    {
        self.custom = Some(Box::new(predicate));
        self
    }

    /// Set the advisory default value (described, never applied)
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = value.into();
        self
    }

    /// Set visibility
    pub fn visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Hide the filter in the client
    pub fn hidden(self) -> Self {
        self.visible(false)
    }

    /// Set the input placeholder
    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    // Boolean configuration

    /// Label for the true option (boolean filters)
    pub fn true_label(self, label: impl Into<String>) -> Self {
        let label = label.into();
        self.configure("true_label", |kind| match kind {
            FilterKind::Boolean(fields) => {
                fields.true_label = Some(label);
                true
            }
            _ => false,
        })
    }

    /// Label for the false option (boolean filters)
    pub fn false_label(self, label: impl Into<String>) -> Self {
        let label = label.into();
        self.configure("false_label", |kind| match kind {
            FilterKind::Boolean(fields) => {
                fields.false_label = Some(label);
                true
            }
            _ => false,
        })
    }

    // Date and text configuration

    /// Set the operator (date and text filters)
    pub fn operator(self, operator: impl Into<Operator>) -> Self {
        let operator = operator.into();
        self.configure("operator", |kind| match kind {
            FilterKind::Date(fields) => {
                fields.operator = operator;
                true
            }
            FilterKind::Text(fields) => {
                fields.operator = operator;
                true
            }
            _ => false,
        })
    }

    /// Match dates before the value
    pub fn before(self) -> Self {
        self.date_operator("before", Operator::LessThan)
    }

    /// Match dates after the value
    pub fn after(self) -> Self {
        self.date_operator("after", Operator::GreaterThan)
    }

    /// Match dates inside a `[from, to]` range
    pub fn between(self) -> Self {
        self.date_operator("between", Operator::Between)
    }

    /// Earliest selectable date (date filters)
    pub fn min_date(self, date: impl Into<String>) -> Self {
        let date = date.into();
        self.configure("min_date", |kind| match kind {
            FilterKind::Date(fields) => {
                fields.min_date = Some(date);
                true
            }
            _ => false,
        })
    }

    /// Latest selectable date (date filters)
    pub fn max_date(self, date: impl Into<String>) -> Self {
        let date = date.into();
        self.configure("max_date", |kind| match kind {
            FilterKind::Date(fields) => {
                fields.max_date = Some(date);
                true
            }
            _ => false,
        })
    }

    /// Include a time picker (date filters)
    pub fn with_time(self, with_time: bool) -> Self {
        self.configure("with_time", |kind| match kind {
            FilterKind::Date(fields) => {
                fields.with_time = with_time;
                true
            }
            _ => false,
        })
    }

    /// Exact match
    pub fn exact(self) -> Self {
        self.text_operator("exact", Operator::Equals)
    }

    /// Substring match
    pub fn contains(self) -> Self {
        self.text_operator("contains", Operator::Like)
    }

    /// Prefix match
    pub fn starts_with(self) -> Self {
        self.text_operator("starts_with", Operator::StartsWith)
    }

    /// Suffix match
    pub fn ends_with(self) -> Self {
        self.text_operator("ends_with", Operator::EndsWith)
    }

    /// Flag the filter as case sensitive (text filters)
    pub fn case_sensitive(self, case_sensitive: bool) -> Self {
        self.configure("case_sensitive", |kind| match kind {
            FilterKind::Text(fields) => {
                fields.case_sensitive = case_sensitive;
                true
            }
            _ => false,
        })
    }

    // Select configuration

    /// Set the selectable options as `(value, display)` pairs
    pub fn options<I, V, D>(self, options: I) -> Self
    where
        I: IntoIterator<Item = (V, D)>,
        V: Into<String>,
        D: Into<String>,
    {
        let options: Vec<(String, String)> = options
            .into_iter()
            .map(|(value, display)| (value.into(), display.into()))
            .collect();
        self.configure("options", |kind| match kind {
            FilterKind::Select(fields) => {
                fields.options = options;
                true
            }
            _ => false,
        })
    }

    /// Allow several values at once (select filters)
    pub fn multiple(self, multiple: bool) -> Self {
        self.configure("multiple", |kind| match kind {
            FilterKind::Select(fields) => {
                fields.multiple = multiple;
                true
            }
            _ => false,
        })
    }

    /// Allow searching the options (select filters)
    pub fn searchable(self, searchable: bool) -> Self {
        self.configure("searchable", |kind| match kind {
            FilterKind::Select(fields) => {
                fields.searchable = searchable;
                true
            }
            _ => false,
        })
    }

    fn date_operator(self, setting: &'static str, operator: Operator) -> Self {
        self.configure(setting, |kind| match kind {
            FilterKind::Date(fields) => {
                fields.operator = operator;
                true
            }
            _ => false,
        })
    }

    fn text_operator(self, setting: &'static str, operator: Operator) -> Self {
        self.configure(setting, |kind| match kind {
            FilterKind::Text(fields) => {
                fields.operator = operator;
                true
            }
            _ => false,
        })
    }

    /// Run a kind-specific setter; settings that do not fit the kind are ignored
    fn configure<F>(mut self, setting: &'static str, update: F) -> Self
    where
        F: FnOnce(&mut FilterKind) -> bool,
    {
        if !update(&mut self.kind) {
            tracing::warn!(
                filter = %self.name,
                kind = self.kind.type_name(),
                setting,
                "Ignoring setting that does not apply to this filter kind"
            );
        }
        self
    }

    // Accessors

    /// The identifier submitted values are looked up by
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Explicit label, or the headline form of the name
    pub fn get_label(&self) -> String {
        match &self.label {
            Some(label) if !label.is_empty() => label.clone(),
            _ => headline(&self.name),
        }
    }

    /// Explicit column, or the name
    pub fn get_column(&self) -> &str {
        match &self.column {
            Some(column) if !column.is_empty() => column,
            _ => &self.name,
        }
    }

    pub fn default_value(&self) -> &Value {
        &self.default
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn get_placeholder(&self) -> Option<&str> {
        self.placeholder.as_deref()
    }

    pub fn kind(&self) -> &FilterKind {
        &self.kind
    }

    pub fn has_custom_predicate(&self) -> bool {
        self.custom.is_some()
    }

    /// The clause the default rule would add for `value`
    pub fn default_clause(&self, value: &Value) -> Clause {
        self.kind.clause(self.get_column(), value)
    }

    /// Describe the filter for a client
    pub fn describe(&self) -> FilterDescription {
        FilterDescription {
            filter_type: self.kind.type_name(),
            name: self.name.clone(),
            label: self.get_label(),
            column: self.get_column().to_string(),
            default: self.default.clone(),
            visible: self.visible,
            placeholder: self.placeholder.clone(),
            kind: self.kind.describe(),
        }
    }
}

impl<Q: QueryTarget> Filter<Q> {
    /// Apply the filter for `value`: the custom predicate if one is set,
    /// otherwise the kind's default rule
    pub fn apply(&self, query: &mut Q, value: &Value) {
        match &self.custom {
            Some(predicate) => predicate(query, value),
            None => self.default_clause(value).apply_to(query),
        }
    }
}

impl<Q> fmt::Debug for Filter<Q> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Filter")
            .field("name", &self.name)
            .field("label", &self.label)
            .field("column", &self.column)
            .field("custom", &self.custom.is_some())
            .field("default", &self.default)
            .field("visible", &self.visible)
            .field("placeholder", &self.placeholder)
            .field("kind", &self.kind)
            .finish()
    }
}

/// Client-facing description of a filter
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterDescription {
    #[serde(rename = "type")]
    pub filter_type: &'static str,
    pub name: String,
    pub label: String,
    pub column: String,
    pub default: Value,
    pub visible: bool,
    pub placeholder: Option<String>,
    #[serde(flatten)]
    pub kind: KindDescription,
}

/// Kind-specific part of a [`FilterDescription`]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum KindDescription {
    Boolean(BooleanDescription),
    Date(DateDescription),
    Text(TextDescription),
    Select(SelectDescription),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BooleanDescription {
    pub true_label: String,
    pub false_label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateDescription {
    pub operator: Operator,
    pub min_date: Option<String>,
    pub max_date: Option<String>,
    pub with_time: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextDescription {
    pub operator: Operator,
    pub case_sensitive: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectDescription {
    pub options: Map<String, Value>,
    pub multiple: bool,
    pub searchable: bool,
}
