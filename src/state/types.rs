//! State types for tracking managed planets.
//!
//! These types record what the provider last reported for each managed
//! planet, so later runs can plan against it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::provider::{PlanetResource, PlanetResourceModel, SwapiProvider};

/// Current version of the state format.
pub const STATE_VERSION: &str = "1.0";

/// Maximum number of history entries kept.
const MAX_HISTORY: usize = 100;

/// The complete provider state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProviderState {
    /// State format version.
    pub version: String,
    /// Managed resources by label.
    pub resources: BTreeMap<String, ResourceState>,
    /// When the state was last updated.
    pub last_updated: DateTime<Utc>,
    /// Operation history (recent entries).
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

/// State of a single managed planet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResourceState {
    /// Resource address, e.g. `swapi_planet.hoth`.
    pub address: String,
    /// Attributes as last reported by the provider.
    pub attributes: PlanetResourceModel,
    /// When the resource was first recorded.
    pub created_at: DateTime<Utc>,
    /// When the resource was last written.
    pub updated_at: DateTime<Utc>,
}

/// A single entry in the operation history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HistoryEntry {
    /// When the operation ran.
    pub timestamp: DateTime<Utc>,
    /// Type of operation.
    pub operation: Operation,
    /// Resource address.
    pub address: String,
    /// Whether the operation succeeded.
    pub success: bool,
    /// Optional error message.
    #[serde(default)]
    pub error: Option<String>,
}

/// Types of recorded operations.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Planet created.
    Create,
    /// Planet updated in place.
    Update,
    /// Planet deleted and recreated.
    Replace,
    /// Planet deleted.
    Delete,
    /// Existing planet imported.
    Import,
    /// State refreshed from the server.
    Refresh,
}

/// Address of a managed planet.
#[must_use]
pub fn resource_address(label: &str) -> String {
    format!("{}.{label}", PlanetResource::type_name(SwapiProvider::TYPE_NAME))
}

/// Address of a planet lookup.
#[must_use]
pub fn data_address(label: &str) -> String {
    format!("data.{}", resource_address(label))
}

/// Extracts the label from a resource address, accepting a bare label too.
#[must_use]
pub fn label_from_address(address: &str) -> &str {
    address.rsplit_once('.').map_or(address, |(_, label)| label)
}

impl ProviderState {
    /// Creates a new empty state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            version: STATE_VERSION.to_string(),
            resources: BTreeMap::new(),
            last_updated: Utc::now(),
            history: Vec::new(),
        }
    }

    /// Gets a resource by label.
    #[must_use]
    pub fn get(&self, label: &str) -> Option<&ResourceState> {
        self.resources.get(label)
    }

    /// Records the attributes of a resource, keeping its creation time.
    pub fn set(&mut self, label: &str, attributes: PlanetResourceModel) {
        let now = Utc::now();
        self.resources
            .entry(label.to_string())
            .and_modify(|r| {
                r.attributes.clone_from(&attributes);
                r.updated_at = now;
            })
            .or_insert_with(|| ResourceState {
                address: resource_address(label),
                attributes: attributes.clone(),
                created_at: now,
                updated_at: now,
            });
        self.last_updated = now;
    }

    /// Removes a resource by label.
    pub fn remove(&mut self, label: &str) -> Option<ResourceState> {
        let result = self.resources.remove(label);
        if result.is_some() {
            self.last_updated = Utc::now();
        }
        result
    }

    /// Returns all labels in order.
    #[must_use]
    pub fn labels(&self) -> Vec<&str> {
        self.resources.keys().map(String::as_str).collect()
    }

    /// Returns true if nothing is managed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Adds a history entry.
    pub fn add_history(&mut self, entry: HistoryEntry) {
        if self.history.len() >= MAX_HISTORY {
            self.history.remove(0);
        }
        self.history.push(entry);
    }
}

impl Default for ProviderState {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryEntry {
    /// Creates a successful history entry.
    #[must_use]
    pub fn new(operation: Operation, address: &str) -> Self {
        Self {
            timestamp: Utc::now(),
            operation,
            address: address.to_string(),
            success: true,
            error: None,
        }
    }

    /// Creates a failed history entry.
    #[must_use]
    pub fn failed(operation: Operation, address: &str, error: &str) -> Self {
        Self {
            timestamp: Utc::now(),
            operation,
            address: address.to_string(),
            success: false,
            error: Some(error.to_string()),
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let op = match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Replace => "replace",
            Self::Delete => "delete",
            Self::Import => "import",
            Self::Refresh => "refresh",
        };
        write!(f, "{op}")
    }
}
