//! Manifest types.
//!
//! This module defines the structs that map to the `swapi.yaml` manifest.
//! The manifest is declarative: it lists the planets that should exist and
//! the lookups to evaluate, keyed by a local label.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::provider::{PlanetDataSourceModel, PlanetResourceModel, ProviderConfig};

/// The root manifest structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    /// Provider configuration.
    #[serde(default)]
    pub provider: ProviderConfig,
    /// Managed planets by label.
    #[serde(default)]
    pub planets: BTreeMap<String, PlanetConfig>,
    /// Planet lookups by label.
    #[serde(default)]
    pub data: BTreeMap<String, PlanetLookupConfig>,
}

/// Desired state of a managed planet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PlanetConfig {
    /// Planet name. Changing it replaces the planet.
    pub name: String,
    /// Diameter. Left unmanaged when unset.
    #[serde(default)]
    pub diameter: Option<i64>,
    /// Population. Left unmanaged when unset.
    #[serde(default)]
    pub population: Option<i64>,
}

/// A planet lookup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PlanetLookupConfig {
    /// Name to look up.
    pub name: String,
}

impl Manifest {
    /// Returns true if the manifest neither manages nor looks up anything.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.planets.is_empty() && self.data.is_empty()
    }
}

impl PlanetConfig {
    /// Planned resource state for this planet.
    #[must_use]
    pub fn to_model(&self) -> PlanetResourceModel {
        PlanetResourceModel::planned(self.name.clone(), self.diameter, self.population)
    }
}

impl PlanetLookupConfig {
    /// Data source configuration for this lookup.
    #[must_use]
    pub fn to_model(&self) -> PlanetDataSourceModel {
        PlanetDataSourceModel::lookup(self.name.clone())
    }
}
