//! Filter surface configuration
//!
//! A surface is one list endpoint: it names the domain whose registry
//! translates its filters and, optionally, the topics it accepts.
//!
//! ```yaml
//! surfaces:
//!   - name: recipient-communication-logs
//!     domain: communicationLog
//!     valid_topics: [communicationDate, result, method, purpose, creator]
//!   - name: regional-dashboard
//!     domain: activityReport
//! ```

use crate::core::error::ConfigError;
use crate::core::filter_set::FilterSet;
use crate::core::predicate::Scope;
use crate::core::scope::{ScopeContext, ValidTopics};
use crate::domains::Domain;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// One filterable list endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceConfig {
    /// Unique surface name
    pub name: String,

    /// Domain whose registry translates this surface's filters
    pub domain: Domain,

    /// Topics this surface honours; every registered topic when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_topics: Option<Vec<String>>,
}

impl SurfaceConfig {
    /// The allow-list, or `None` when every topic of the domain is accepted
    pub fn allowed_topics(&self) -> Option<ValidTopics> {
        self.valid_topics
            .as_ref()
            .map(|topics| topics.iter().cloned().collect())
    }
}

/// Complete configuration for the filter surfaces
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterSurfacesConfig {
    #[serde(default)]
    pub surfaces: Vec<SurfaceConfig>,
}

impl FilterSurfacesConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Merge several configurations into one
    ///
    /// Surfaces keep first-seen order; a later surface with the same name
    /// replaces the earlier one.
    pub fn merge(configs: Vec<FilterSurfacesConfig>) -> Self {
        let mut merged = Self::default();

        for surface in configs.into_iter().flat_map(|c| c.surfaces) {
            match merged.surfaces.iter_mut().find(|s| s.name == surface.name) {
                Some(existing) => {
                    if *existing != surface {
                        warn!(
                            surface = %surface.name,
                            old_domain = %existing.domain,
                            new_domain = %surface.domain,
                            "filter surface redefined, later definition wins"
                        );
                    }
                    *existing = surface;
                }
                None => merged.surfaces.push(surface),
            }
        }

        merged
    }

    /// Find a surface by name
    pub fn find_surface(&self, name: &str) -> Option<&SurfaceConfig> {
        self.surfaces.iter().find(|s| s.name == name)
    }

    /// The allow-list for `name`
    ///
    /// `Ok(None)` when the surface accepts every topic of its domain.
    pub fn valid_topics_for(&self, name: &str) -> Result<Option<ValidTopics>, ConfigError> {
        let surface = self
            .find_surface(name)
            .ok_or_else(|| ConfigError::UnknownSurface(name.to_string()))?;

        Ok(surface.allowed_topics())
    }

    /// Check every allowed topic against its domain's registry
    pub fn validate(&self) -> Result<(), ConfigError> {
        for surface in &self.surfaces {
            let registry = surface.domain.registry();
            for topic in surface.valid_topics.iter().flatten() {
                if !registry.has_topic(topic) {
                    return Err(ConfigError::UnknownTopic {
                        surface: surface.name.clone(),
                        domain: surface.domain.to_string(),
                        topic: topic.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Translate `filters` for the named surface
    pub fn filters_to_surface_scope(
        &self,
        name: &str,
        filters: &FilterSet,
        context: &ScopeContext,
    ) -> Result<Scope, ConfigError> {
        let surface = self
            .find_surface(name)
            .ok_or_else(|| ConfigError::UnknownSurface(name.to_string()))?;
        let valid_topics = surface.allowed_topics();

        Ok(surface
            .domain
            .filters_to_scopes(filters, context, valid_topics.as_ref()))
    }

    /// The surfaces the hub ships with
    pub fn default_config() -> Self {
        // an empty topic list means every topic of the domain
        let surface = |name: &str, domain: Domain, topics: &[&str]| SurfaceConfig {
            name: name.to_string(),
            domain,
            valid_topics: (!topics.is_empty())
                .then(|| topics.iter().map(|t| t.to_string()).collect()),
        };

        Self {
            surfaces: vec![
                surface(
                    "recipient-communication-logs",
                    Domain::CommunicationLog,
                    &["communicationDate", "result", "method", "purpose", "creator"],
                ),
                surface("activity-reports", Domain::ActivityReport, &[]),
                surface("recipient-goals", Domain::Goal, &[]),
                surface("recipient-search", Domain::Grant, &[]),
                surface("training-reports", Domain::TrainingReport, &[]),
            ],
        }
    }
}
