//! The filter-to-scope accumulator
//!
//! [`filters_to_scopes`] is the entry point every list endpoint shares: it
//! parses each `topic.operator` key, discards anything the registry or the
//! caller's allow-list does not know, runs the matching operators and ANDs
//! the fragments together.
//!
//! Bad filters never fail a request. An unknown key, an operator with
//! unusable arguments or a non-mapping filter input all contribute the
//! neutral [`Scope::All`].

use crate::core::filter_set::{FilterKey, FilterSet};
use crate::core::predicate::Scope;
use crate::core::registry::TopicRegistry;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, trace};

/// Topic every domain uses for region narrowing
pub const REGION_TOPIC: &str = "region";

/// Per-request options forwarded to operators
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScopeOptions {
    /// Regions the caller may see
    ///
    /// Results never leave these regions: an explicit `region.in` is
    /// intersected with them, otherwise they are applied as `region.in`.
    pub user_regions: Option<Vec<i64>>,
}

/// Ambient values some operators need
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeContext {
    /// Current actor, for "my records" style filters
    pub user_id: Option<i64>,
    pub options: ScopeOptions,
}

impl ScopeContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_user(user_id: i64) -> Self {
        Self {
            user_id: Some(user_id),
            ..Self::default()
        }
    }

    pub fn with_options(mut self, options: ScopeOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_user_regions(mut self, regions: Vec<i64>) -> Self {
        self.options.user_regions = Some(regions);
        self
    }
}

/// Allow-list restricting which topics a call site honours
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidTopics(HashSet<String>);

impl ValidTopics {
    pub fn contains(&self, topic: &str) -> bool {
        self.0.contains(topic)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for ValidTopics {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Translate a filter set into a single composite scope
///
/// Fragments are combined with [`Scope::and`], so the result is the same
/// whatever order the keys arrive in, and repeating a fragment changes
/// nothing. An empty or entirely unrecognised filter set yields
/// [`Scope::All`] (plus the default region constraint, when one applies).
pub fn filters_to_scopes(
    filters: &FilterSet,
    registry: &TopicRegistry,
    context: &ScopeContext,
    valid_topics: Option<&ValidTopics>,
) -> Scope {
    let mut fragments = Vec::with_capacity(filters.len() + 1);
    let mut explicit_regions = false;

    for (key, args) in filters.iter() {
        let Some(FilterKey { topic, operator }) = FilterKey::parse(key) else {
            debug!(registry = registry.name(), key, "skipping malformed filter key");
            continue;
        };

        if valid_topics.is_some_and(|valid| !valid.contains(topic)) {
            debug!(registry = registry.name(), key, topic, "skipping filter topic not allowed here");
            continue;
        }

        let Some(op) = registry.lookup(topic, operator) else {
            debug!(registry = registry.name(), key, topic, operator, "skipping unknown filter");
            continue;
        };

        let fragment = if topic == REGION_TOPIC && operator == "in" {
            let fragment = match readable_regions(args, context) {
                Some(readable) if readable.is_empty() => Scope::none(),
                Some(readable) => op.apply(&readable, context),
                None => op.apply(args, context),
            };
            explicit_regions |= !fragment.is_all();
            fragment
        } else {
            op.apply(args, context)
        };
        trace!(
            registry = registry.name(),
            key,
            neutral = fragment.is_all(),
            "applied filter"
        );
        fragments.push(fragment);
    }

    if !explicit_regions {
        if let Some(fragment) = default_region_scope(registry, context, valid_topics) {
            fragments.push(fragment);
        }
    }

    Scope::and(fragments)
}

/// Requested `region.in` values the caller may read
///
/// `None` when there is nothing to intersect: no readable regions are
/// configured, or no requested value is a region id. Empty when every
/// requested region is unreadable.
fn readable_regions(args: &[String], context: &ScopeContext) -> Option<Vec<String>> {
    let readable = context.options.user_regions.as_ref().filter(|r| !r.is_empty())?;
    let requested: Vec<i64> = args.iter().filter_map(|a| a.trim().parse().ok()).collect();
    if requested.is_empty() {
        return None;
    }
    Some(
        requested
            .into_iter()
            .filter(|region| readable.contains(region))
            .map(|region| region.to_string())
            .collect(),
    )
}

/// `region.in` with the caller's own regions
///
/// Applied unless an explicit `region.in` was already narrowed to them, so
/// unknown region operators and `region.nin` stay inside the caller's regions.
fn default_region_scope(
    registry: &TopicRegistry,
    context: &ScopeContext,
    valid_topics: Option<&ValidTopics>,
) -> Option<Scope> {
    let regions = context.options.user_regions.as_ref()?;
    if valid_topics.is_some_and(|valid| !valid.contains(REGION_TOPIC)) {
        return None;
    }

    let op = registry.lookup(REGION_TOPIC, "in")?;
    let args: Vec<String> = regions.iter().map(i64::to_string).collect();
    debug!(registry = registry.name(), ?regions, "applying default region scope");
    Some(op.apply(&args, context))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::field::{FieldKind, FieldValue};
    use crate::core::operators::{with_membership, without_membership};
    use serde_json::json;

    fn registry() -> TopicRegistry {
        TopicRegistry::builder("test")
            .operator("result", "in", with_membership("result", FieldKind::Text))
            .operator("result", "nin", without_membership("result", FieldKind::Text))
            .operator("region", "in", with_membership("regionId", FieldKind::Integer))
            .operator("region", "nin", without_membership("regionId", FieldKind::Integer))
            .build()
    }

    fn filters(value: serde_json::Value) -> FilterSet {
        FilterSet::from_value(&value)
    }

    #[test]
    fn test_empty_and_array_inputs_are_neutral() {
        let registry = registry();
        let ctx = ScopeContext::default();
        assert_eq!(filters_to_scopes(&filters(json!({})), &registry, &ctx, None), Scope::All);
        assert_eq!(filters_to_scopes(&filters(json!([])), &registry, &ctx, None), Scope::All);
        assert_eq!(filters_to_scopes(&filters(json!(null)), &registry, &ctx, None), Scope::All);
    }

    #[test]
    fn test_unknown_and_malformed_keys_are_ignored() {
        let registry = registry();
        let ctx = ScopeContext::default();
        let set = filters(json!({
            "bogus.op": ["x"],
            "result.bef": ["x"],
            "result": ["x"],
            "result.in.extra": ["x"],
        }));
        assert_eq!(filters_to_scopes(&set, &registry, &ctx, None), Scope::All);
    }

    #[test]
    fn test_single_fragment_is_unwrapped() {
        let registry = registry();
        let scope = filters_to_scopes(
            &filters(json!({"result.in": ["X"]})),
            &registry,
            &ScopeContext::default(),
            None,
        );
        assert_eq!(scope, Scope::is_in("result", vec![FieldValue::from("X")]));
    }

    #[test]
    fn test_same_topic_accumulates_across_operators() {
        let registry = registry();
        let scope = filters_to_scopes(
            &filters(json!({"result.in": ["X", "Y"], "result.nin": ["Y"]})),
            &registry,
            &ScopeContext::default(),
            None,
        );
        assert!(matches!(&scope, Scope::And { scopes } if scopes.len() == 2));
        assert!(scope.matches(&json!({"result": "X"})));
        assert!(!scope.matches(&json!({"result": "Y"})));
    }

    #[test]
    fn test_valid_topics_restrict() {
        let registry = registry();
        let valid: ValidTopics = ["region"].into_iter().collect();
        let scope = filters_to_scopes(
            &filters(json!({"result.in": ["X"]})),
            &registry,
            &ScopeContext::default(),
            Some(&valid),
        );
        assert_eq!(scope, Scope::All);
    }

    #[test]
    fn test_default_region_applies_without_region_filter() {
        let registry = registry();
        let ctx = ScopeContext::for_user(1).with_user_regions(vec![1, 2]);
        let scope = filters_to_scopes(&filters(json!({})), &registry, &ctx, None);
        assert_eq!(
            scope,
            Scope::is_in("regionId", vec![FieldValue::Integer(1), FieldValue::Integer(2)])
        );

        // an explicit region.in is narrowed to the readable regions
        let scope = filters_to_scopes(&filters(json!({"region.in": [2, 9]})), &registry, &ctx, None);
        assert_eq!(scope, Scope::is_in("regionId", vec![FieldValue::Integer(2)]));

        // not applied where region is not an allowed topic
        let valid: ValidTopics = ["result"].into_iter().collect();
        let scope = filters_to_scopes(&filters(json!({})), &registry, &ctx, Some(&valid));
        assert_eq!(scope, Scope::All);
    }

    #[test]
    fn test_unknown_region_operator_keeps_default_region() {
        let registry = registry();
        let ctx = ScopeContext::default().with_user_regions(vec![14]);
        let baseline = filters_to_scopes(&filters(json!({})), &registry, &ctx, None);

        for set in [
            json!({"region.bogus": ["x"]}),
            json!({"region": ["99"]}),
            json!({"region.in": ["x"]}),
        ] {
            assert_eq!(filters_to_scopes(&filters(set.clone()), &registry, &ctx, None), baseline, "{set}");
        }
        assert!(!baseline.matches(&json!({"regionId": 99})));
    }

    #[test]
    fn test_region_nin_stays_inside_readable_regions() {
        let registry = registry();
        let ctx = ScopeContext::default().with_user_regions(vec![1, 2]);
        let scope = filters_to_scopes(&filters(json!({"region.nin": [2]})), &registry, &ctx, None);

        assert!(scope.matches(&json!({"regionId": 1})));
        assert!(!scope.matches(&json!({"regionId": 2})));
        assert!(!scope.matches(&json!({"regionId": 99})));
    }

    #[test]
    fn test_unreadable_region_in_matches_nothing() {
        let registry = registry();
        let ctx = ScopeContext::default().with_user_regions(vec![1]);
        let scope = filters_to_scopes(&filters(json!({"region.in": [99]})), &registry, &ctx, None);

        assert!(!scope.matches(&json!({"regionId": 99})));
        assert!(!scope.matches(&json!({"regionId": 1})));
    }

    #[test]
    fn test_region_in_without_user_regions_is_untouched() {
        let registry = registry();
        let scope = filters_to_scopes(
            &filters(json!({"region.in": [99]})),
            &registry,
            &ScopeContext::default(),
            None,
        );
        assert_eq!(scope, Scope::is_in("regionId", vec![FieldValue::Integer(99)]));
    }

    #[test]
    fn test_options_deserialize_camel_case() {
        let options: ScopeOptions = serde_json::from_value(json!({"userRegions": [1, 5]})).unwrap();
        assert_eq!(options.user_regions, Some(vec![1, 5]));
        let options: ScopeOptions = serde_json::from_value(json!({})).unwrap();
        assert_eq!(options.user_regions, None);
    }
}
