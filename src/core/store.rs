//! Store trait for scoped record queries

use crate::core::predicate::Scope;
use crate::core::query::{Page, PageRequest};
use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

/// A record store that accepts a [`Scope`] as its `where` predicate
///
/// The filter engine hands its composite scope to an implementation of this
/// trait; how the scope is executed (in memory, as SQL) is up to the store.
#[async_trait]
pub trait ScopedStore: Send + Sync {
    /// Add a record
    async fn insert(&self, record: Value) -> Result<()>;

    /// Every record matching `scope`, in insertion order
    async fn find_all(&self, scope: &Scope) -> Result<Vec<Value>>;

    /// One sorted page of matching records plus the total count
    async fn find_page(&self, scope: &Scope, request: &PageRequest) -> Result<Page>;

    /// Number of records matching `scope`
    async fn count(&self, scope: &Scope) -> Result<usize> {
        Ok(self.find_all(scope).await?.len())
    }
}
