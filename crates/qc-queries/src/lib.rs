//! # qc-queries
//!
//! Declarative filtering and sorting for list queries.
//!
//! Filters and sorts are configured once, then a [`QueryComposer`] applies
//! the values a client submitted to any query object implementing
//! [`QueryTarget`], and describes its configuration for the client.
//!
//! ## Structure
//!
//! - `target` - The query capability contract and a recording implementation
//! - `values` - Submitted filter values and their coercion rules
//! - `filters` - Boolean, date, text, and select filters
//! - `sorts` - Sortable column definitions
//! - `composer` - Applies submitted state to a query
//!
//! ## Example
//!
//! ```
//! use qc_queries::{Clause, Filter, QueryComposer, Sort, SortDirection};
//! use serde_json::json;
//!
//! let composer = QueryComposer::<Vec<Clause>>::new()
//!     .filters(vec![
//!         Filter::select("status").unwrap(),
//!         Filter::boolean("is_featured").unwrap(),
//!     ])
//!     .sorts(vec![Sort::new("views").unwrap()])
//!     .apply_filters(json!({"status": "published", "is_featured": "1"}))
//!     .sort_by("views", SortDirection::Desc);
//!
//! let mut clauses = Vec::new();
//! composer.apply(&mut clauses);
//! assert_eq!(clauses.len(), 3);
//! ```

pub mod composer;
pub mod filters;
pub mod headline;
pub mod sorts;
pub mod target;
pub mod values;

pub use composer::{ComposerDescription, QueryComposer, SearchHook};
pub use filters::{
    CustomPredicate, Filter, FilterDescription, FilterKind, KindDescription, Operator,
};
pub use headline::headline;
pub use sorts::{Sort, SortDescription, SortDirection};
pub use target::{Clause, QueryTarget};
pub use values::FilterValues;

pub use qc_core::{ComposerConfig, ConfigResult, ConfigurationError, PaginationParams};
pub use serde_json::Value;
