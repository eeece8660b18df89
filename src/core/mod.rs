//! Core module containing the filter engine: values, predicates, registries
//! and the accumulator that ties them together

pub mod dates;
pub mod error;
pub mod field;
pub mod filter_set;
pub mod operators;
pub mod predicate;
pub mod query;
pub mod registry;
pub mod scope;
pub mod store;

pub use dates::{DateRange, parse_date, parse_date_range};
pub use error::ConfigError;
pub use field::{FieldKind, FieldValue};
pub use filter_set::{FilterKey, FilterSet};
pub use predicate::{Case, Scope};
pub use query::{Direction, Page, PageRequest};
pub use registry::{Operator, TopicRegistry, TopicRegistryBuilder};
pub use scope::{ScopeContext, ScopeOptions, ValidTopics, filters_to_scopes};
pub use store::ScopedStore;
