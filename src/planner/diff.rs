//! Diff engine for comparing the manifest against recorded state.
//!
//! Only attributes the manifest sets are compared; an unset optional
//! attribute is left to whatever the server holds.

use serde::Serialize;
use std::collections::BTreeSet;
use tracing::debug;

use crate::config::{Manifest, PlanetConfig};
use crate::provider::{PlanetResource, PlanetResourceModel, Schema};
use crate::state::ProviderState;

/// Engine for computing diffs between desired and recorded state.
#[derive(Debug)]
pub struct DiffEngine {
    /// Resource schema, consulted for plan modifiers.
    schema: Schema,
}

/// Difference for a single resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceDiff {
    /// Manifest label.
    pub label: String,
    /// Type of difference.
    pub diff_type: DiffType,
    /// Attribute-level details.
    pub details: Vec<DiffDetail>,
}

/// Type of difference detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffType {
    /// In the manifest only.
    Create,
    /// Changed attributes that can be updated in place.
    Update,
    /// A changed attribute forces replacement.
    Replace,
    /// In state only.
    Delete,
    /// Unchanged.
    NoChange,
}

/// One changed attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiffDetail {
    /// Attribute name.
    pub field: &'static str,
    /// Recorded value.
    pub old_value: Option<String>,
    /// Desired value.
    pub new_value: Option<String>,
    /// Whether the change forces replacement.
    pub forces_replacement: bool,
}

/// Complete diff result, in label order.
#[derive(Debug, Default)]
pub struct DiffResult {
    /// All resource diffs.
    pub diffs: Vec<ResourceDiff>,
}

impl DiffEngine {
    /// Creates a diff engine for the planet resource.
    #[must_use]
    pub fn new() -> Self {
        Self {
            schema: PlanetResource::schema(),
        }
    }

    /// Computes the diff for every label in the manifest or the state.
    #[must_use]
    pub fn compute_diff(&self, manifest: &Manifest, state: &ProviderState) -> DiffResult {
        let labels: BTreeSet<&str> = manifest
            .planets
            .keys()
            .map(String::as_str)
            .chain(state.labels())
            .collect();

        let diffs = labels
            .into_iter()
            .map(|label| {
                let desired = manifest.planets.get(label);
                let recorded = state.get(label).map(|r| &r.attributes);
                self.compute_resource_diff(label, desired, recorded)
            })
            .collect();

        DiffResult { diffs }
    }

    fn compute_resource_diff(
        &self,
        label: &str,
        desired: Option<&PlanetConfig>,
        recorded: Option<&PlanetResourceModel>,
    ) -> ResourceDiff {
        let (diff_type, details) = match (desired, recorded) {
            (Some(_), None) => (DiffType::Create, Vec::new()),
            (None, Some(_)) => (DiffType::Delete, Vec::new()),
            (Some(desired), Some(recorded)) => {
                let details = self.compare(desired, recorded);
                let diff_type = if details.is_empty() {
                    DiffType::NoChange
                } else if details.iter().any(|d| d.forces_replacement) {
                    DiffType::Replace
                } else {
                    DiffType::Update
                };
                (diff_type, details)
            }
            (None, None) => (DiffType::NoChange, Vec::new()),
        };

        if diff_type != DiffType::NoChange {
            debug!("{label}: {diff_type:?} ({} attribute changes)", details.len());
        }

        ResourceDiff {
            label: label.to_string(),
            diff_type,
            details,
        }
    }

    fn compare(&self, desired: &PlanetConfig, recorded: &PlanetResourceModel) -> Vec<DiffDetail> {
        let mut details = Vec::new();

        if desired.name != recorded.name {
            details.push(self.detail(
                "name",
                Some(recorded.name.clone()),
                Some(desired.name.clone()),
            ));
        }

        let managed = [
            ("diameter", desired.diameter, recorded.diameter),
            ("population", desired.population, recorded.population),
        ];
        for (field, want, have) in managed {
            if want.is_some() && want != have {
                details.push(self.detail(
                    field,
                    have.map(|v| v.to_string()),
                    want.map(|v| v.to_string()),
                ));
            }
        }

        details
    }

    fn detail(
        &self,
        field: &'static str,
        old_value: Option<String>,
        new_value: Option<String>,
    ) -> DiffDetail {
        DiffDetail {
            field,
            old_value,
            new_value,
            forces_replacement: self.schema.requires_replace(field),
        }
    }
}

impl Default for DiffEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl DiffResult {
    /// Counts diffs of a given type.
    #[must_use]
    pub fn count(&self, diff_type: DiffType) -> usize {
        self.diffs.iter().filter(|d| d.diff_type == diff_type).count()
    }

    /// Returns true if anything differs.
    #[must_use]
    pub fn has_changes(&self) -> bool {
        self.diffs.iter().any(|d| d.diff_type != DiffType::NoChange)
    }
}

impl std::fmt::Display for DiffType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Replace => "replace",
            Self::Delete => "delete",
            Self::NoChange => "no change",
        };
        write!(f, "{s}")
    }
}
