//! Query Sorts
//!
//! A sort is a named, orderable column offered to the client. It carries no
//! query logic of its own: the composer applies the selected ordering.

use qc_core::{require_name, ConfigResult};
use serde::Serialize;

pub use qc_core::SortDirection;

use crate::headline::headline;

/// A sortable column definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
    name: String,
    label: Option<String>,
    column: Option<String>,
    default_direction: SortDirection,
    visible: bool,
}

impl Sort {
    /// Create a new sort. The name must not be blank.
    pub fn new(name: impl Into<String>) -> ConfigResult<Self> {
        Ok(Self {
            name: require_name("Sort", name)?,
            label: None,
            column: None,
            default_direction: SortDirection::Asc,
            visible: true,
        })
    }

    /// Create a sort whose column differs from its name
    pub fn with_column(name: impl Into<String>, column: impl Into<String>) -> ConfigResult<Self> {
        Ok(Self::new(name)?.column(column))
    }

    /// Set the display label
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set the column
    pub fn column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }

    /// Set the direction the client starts with
    pub fn default_direction(mut self, direction: SortDirection) -> Self {
        self.default_direction = direction;
        self
    }

    /// Start descending
    pub fn descending(self) -> Self {
        self.default_direction(SortDirection::Desc)
    }

    /// Set visibility
    pub fn visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

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

    pub fn get_default_direction(&self) -> SortDirection {
        self.default_direction
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Describe the sort for a client
    pub fn describe(&self) -> SortDescription {
        SortDescription {
            name: self.name.clone(),
            label: self.get_label(),
            column: self.get_column().to_string(),
            default_direction: self.default_direction,
            visible: self.visible,
        }
    }
}

/// Client-facing description of a sort
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SortDescription {
    pub name: String,
    pub label: String,
    pub column: String,
    pub default_direction: SortDirection,
    pub visible: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sort_defaults() {
        let sort = Sort::new("created_at").unwrap();
        assert_eq!(sort.name(), "created_at");
        assert_eq!(sort.get_label(), "Created At");
        assert_eq!(sort.get_column(), "created_at");
        assert_eq!(sort.get_default_direction(), SortDirection::Asc);
        assert!(sort.is_visible());
    }

    #[test]
    fn test_sort_configuration() {
        let sort = Sort::with_column("newest", "published_at")
            .unwrap()
            .label("Published Date")
            .descending()
            .visible(false);

        assert_eq!(sort.get_column(), "published_at");
        assert_eq!(sort.get_label(), "Published Date");
        assert_eq!(sort.get_default_direction(), SortDirection::Desc);
        assert!(!sort.is_visible());
    }

    #[test]
    fn test_blank_name_is_rejected() {
        assert!(Sort::new("").is_err());
        assert!(Sort::with_column(" ", "views").is_err());
    }

    #[test]
    fn test_describe() {
        let sort = Sort::new("views")
            .unwrap()
            .label("Views")
            .default_direction(SortDirection::Desc);

        let described = serde_json::to_value(sort.describe()).unwrap();
        assert_eq!(
            described,
            json!({
                "name": "views",
                "label": "Views",
                "column": "views",
                "defaultDirection": "desc",
                "visible": true,
            })
        );

        let keys: Vec<&String> = described.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["name", "label", "column", "defaultDirection", "visible"]);
    }
}
