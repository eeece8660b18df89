//! Storage consumers of scopes

pub mod in_memory;
pub mod sql;

pub use in_memory::InMemoryRecordStore;
pub use sql::{Column, ColumnMap, SqlWhere, render_where};
