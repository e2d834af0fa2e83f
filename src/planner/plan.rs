//! Plan types and construction.
//!
//! A plan is a flat list of per-resource actions in execution order:
//! deletes, then replacements, then updates, then creates.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::Manifest;
use crate::provider::PlanetResourceModel;
use crate::state::{resource_address, ProviderState};

use super::diff::{DiffDetail, DiffResult, DiffType};

/// A complete plan.
#[derive(Debug, Clone, Serialize)]
pub struct Plan {
    /// When the plan was created.
    pub created_at: DateTime<Utc>,
    /// Planned actions in execution order, no-ops last.
    pub actions: Vec<PlannedAction>,
}

/// A single planned action.
#[derive(Debug, Clone, Serialize)]
pub struct PlannedAction {
    /// Action type.
    pub action_type: ActionType,
    /// Manifest label.
    pub label: String,
    /// Resource address.
    pub address: String,
    /// Recorded state before the action.
    pub prior: Option<PlanetResourceModel>,
    /// Desired state after the action.
    pub desired: Option<PlanetResourceModel>,
    /// Changed attributes.
    pub changed_attributes: Vec<DiffDetail>,
    /// Reason for this action.
    pub reason: String,
}

/// Types of actions in a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    /// Delete a planet.
    Delete,
    /// Delete a planet and create it again.
    Replace,
    /// Update a planet in place.
    Update,
    /// Create a planet.
    Create,
    /// Nothing to do.
    NoOp,
}

impl Plan {
    /// Builds a plan from a diff.
    #[must_use]
    pub fn from_diff(diff: &DiffResult, manifest: &Manifest, state: &ProviderState) -> Self {
        let mut actions: Vec<PlannedAction> = diff
            .diffs
            .iter()
            .map(|resource_diff| {
                let label = resource_diff.label.as_str();
                let prior = state.get(label).map(|r| r.attributes.clone());
                let config = manifest.planets.get(label);

                let (action_type, desired, reason) = match resource_diff.diff_type {
                    DiffType::Create => (
                        ActionType::Create,
                        config.map(|c| c.to_model()),
                        String::from("planet defined in manifest"),
                    ),
                    DiffType::Delete => (
                        ActionType::Delete,
                        None,
                        String::from("planet removed from manifest"),
                    ),
                    DiffType::Replace => (
                        ActionType::Replace,
                        config.map(|c| c.to_model()),
                        format!("{} forces replacement", forcing_fields(&resource_diff.details)),
                    ),
                    DiffType::Update => (
                        ActionType::Update,
                        config.zip(prior.as_ref()).map(|(c, p)| {
                            let planned = c.to_model();
                            PlanetResourceModel {
                                id: p.id.clone(),
                                diameter: planned.diameter.or(p.diameter),
                                population: planned.population.or(p.population),
                                ..planned
                            }
                        }),
                        String::from("attributes changed"),
                    ),
                    DiffType::NoChange => (ActionType::NoOp, prior.clone(), String::new()),
                };

                PlannedAction {
                    action_type,
                    label: label.to_string(),
                    address: resource_address(label),
                    prior,
                    desired,
                    changed_attributes: resource_diff.details.clone(),
                    reason,
                }
            })
            .collect();

        // Stable sort keeps label order inside each group.
        actions.sort_by_key(|a| a.action_type);

        Self {
            created_at: Utc::now(),
            actions,
        }
    }

    /// Builds a plan that deletes everything in state.
    #[must_use]
    pub fn destroy(state: &ProviderState) -> Self {
        let actions = state
            .resources
            .iter()
            .map(|(label, resource)| PlannedAction {
                action_type: ActionType::Delete,
                label: label.clone(),
                address: resource.address.clone(),
                prior: Some(resource.attributes.clone()),
                desired: None,
                changed_attributes: Vec::new(),
                reason: String::from("destroy requested"),
            })
            .collect();

        Self {
            created_at: Utc::now(),
            actions,
        }
    }

    /// Returns true if the plan changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count(ActionType::NoOp) == self.actions.len()
    }

    /// Returns the actions that change something.
    pub fn changes(&self) -> impl Iterator<Item = &PlannedAction> {
        self.actions
            .iter()
            .filter(|a| a.action_type != ActionType::NoOp)
    }

    /// Returns the number of actions of a given type.
    #[must_use]
    pub fn count(&self, action_type: ActionType) -> usize {
        self.actions
            .iter()
            .filter(|a| a.action_type == action_type)
            .count()
    }
}

fn forcing_fields(details: &[DiffDetail]) -> String {
    details
        .iter()
        .filter(|d| d.forces_replacement)
        .map(|d| d.field)
        .collect::<Vec<_>>()
        .join(", ")
}

impl PlannedAction {
    /// Returns a human-readable description of the action.
    #[must_use]
    pub fn description(&self) -> String {
        match self.action_type {
            ActionType::Create => format!("{} will be created", self.address),
            ActionType::Update => format!("{} will be updated in-place", self.address),
            ActionType::Replace => format!("{} must be replaced", self.address),
            ActionType::Delete => format!("{} will be destroyed", self.address),
            ActionType::NoOp => format!("{} is up to date", self.address),
        }
    }
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Replace => "replace",
            Self::Delete => "delete",
            Self::NoOp => "no-op",
        };
        write!(f, "{s}")
    }
}

impl std::fmt::Display for PlannedAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.action_type, self.address)?;
        if !self.reason.is_empty() {
            write!(f, " ({})", self.reason)?;
        }
        Ok(())
    }
}

impl std::fmt::Display for Plan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return write!(f, "No changes. Infrastructure matches the manifest.");
        }

        writeln!(f, "Plan:")?;
        for action in self.changes() {
            writeln!(f, "  {action}")?;
        }
        write!(
            f,
            "{} to add, {} to change, {} to replace, {} to destroy.",
            self.count(ActionType::Create),
            self.count(ActionType::Update),
            self.count(ActionType::Replace),
            self.count(ActionType::Delete)
        )
    }
}
