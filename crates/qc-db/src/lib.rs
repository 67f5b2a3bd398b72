//! # qc-db
//!
//! Query backends for the query composer.
//!
//! - `sql` - [`SqlQuery`], a parameterised PostgreSQL statement executed with SQLx
//! - `memory` - [`MemoryQuery`], the same predicates evaluated over JSON rows
//! - `pool` - Connection pool management
//!
//! ## Example
//!
//! ```ignore
//! use qc_db::{Database, DatabaseConfig, SqlQuery};
//! use qc_queries::{Filter, QueryComposer};
//!
//! let composer = QueryComposer::<SqlQuery>::new()
//!     .add_filter(Filter::select("status")?)
//!     .apply_filters(serde_json::json!({"status": "published"}));
//!
//! let mut query = SqlQuery::table("articles");
//! composer.apply(&mut query);
//!
//! let db = Database::connect(&DatabaseConfig::from_env()).await?;
//! let rows: Vec<ArticleRow> = db.fetch(&query).await?;
//! ```

pub mod error;
pub mod memory;
pub mod pool;
pub mod sql;

pub use error::{ExecutorError, ExecutorResult};
pub use memory::{MemoryQuery, Row};
pub use pool::{Database, DatabaseConfig};
pub use sql::{SqlParam, SqlQuery};
