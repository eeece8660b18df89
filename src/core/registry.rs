//! Topic registries: topic name → operator name → transform

use crate::core::predicate::Scope;
use crate::core::scope::ScopeContext;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Transform signature shared by every operator
pub type OperatorFn = dyn Fn(&[String], &ScopeContext) -> Scope + Send + Sync;

/// One operator bound to a topic
#[derive(Clone)]
pub struct Operator {
    name: &'static str,
    apply: Arc<OperatorFn>,
}

impl Operator {
    pub fn new<F>(name: &'static str, apply: F) -> Self
    where
        F: Fn(&[String], &ScopeContext) -> Scope + Send + Sync + 'static,
    {
        Self {
            name,
            apply: Arc::new(apply),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Run the transform
    pub fn apply(&self, args: &[String], context: &ScopeContext) -> Scope {
        (self.apply)(args, context)
    }
}

impl fmt::Debug for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operator").field("name", &self.name).finish()
    }
}

/// Immutable lookup table for one filter domain
///
/// Built once per process (see the `LazyLock`/`OnceLock` statics in
/// [`crate::domains`]) and shared read-only afterwards.
#[derive(Debug, Clone)]
pub struct TopicRegistry {
    name: &'static str,
    topics: HashMap<&'static str, HashMap<&'static str, Operator>>,
}

impl TopicRegistry {
    pub fn builder(name: &'static str) -> TopicRegistryBuilder {
        TopicRegistryBuilder {
            name,
            topics: HashMap::new(),
        }
    }

    /// Domain name, used in log events
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Exact, case-sensitive lookup
    pub fn lookup(&self, topic: &str, operator: &str) -> Option<&Operator> {
        self.topics.get(topic)?.get(operator)
    }

    pub fn has_topic(&self, topic: &str) -> bool {
        self.topics.contains_key(topic)
    }

    /// Registered topic names, sorted
    pub fn topics(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.topics.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Operators registered for `topic`, sorted
    pub fn operators(&self, topic: &str) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self
            .topics
            .get(topic)
            .map(|ops| ops.keys().copied().collect())
            .unwrap_or_default();
        names.sort_unstable();
        names
    }
}

/// Builder for [`TopicRegistry`]
pub struct TopicRegistryBuilder {
    name: &'static str,
    topics: HashMap<&'static str, HashMap<&'static str, Operator>>,
}

impl TopicRegistryBuilder {
    /// Register `topic.operator`; a later registration of the same pair wins
    pub fn operator<F>(mut self, topic: &'static str, operator: &'static str, apply: F) -> Self
    where
        F: Fn(&[String], &ScopeContext) -> Scope + Send + Sync + 'static,
    {
        self.topics
            .entry(topic)
            .or_default()
            .insert(operator, Operator::new(operator, apply));
        self
    }

    /// Register the same transform under several operator names (`win` / `in`)
    pub fn aliases<F>(mut self, topic: &'static str, operators: &[&'static str], apply: F) -> Self
    where
        F: Fn(&[String], &ScopeContext) -> Scope + Send + Sync + 'static,
    {
        let shared: Arc<OperatorFn> = Arc::new(apply);
        let entry = self.topics.entry(topic).or_default();
        for &operator in operators {
            entry.insert(
                operator,
                Operator {
                    name: operator,
                    apply: Arc::clone(&shared),
                },
            );
        }
        self
    }

    pub fn build(self) -> TopicRegistry {
        TopicRegistry {
            name: self.name,
            topics: self.topics,
        }
    }
}
