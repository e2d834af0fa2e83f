//! Declarative state models and their mapping to the wire record.
//!
//! Every conversion is spelled out field by field so a new wire field never
//! leaks into state (or out of it) by accident.

use serde::{Deserialize, Serialize};

use crate::swapi::Planet;

/// State of a managed planet resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanetResourceModel {
    /// Server-assigned id; unknown until created.
    #[serde(default)]
    pub id: Option<String>,
    /// Planet name.
    pub name: String,
    /// Diameter.
    #[serde(default)]
    pub diameter: Option<i64>,
    /// Population.
    #[serde(default)]
    pub population: Option<i64>,
}

/// State of a planet data source lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanetDataSourceModel {
    /// Planet id.
    #[serde(default)]
    pub id: Option<String>,
    /// Lookup key.
    pub name: String,
    /// Diameter.
    #[serde(default)]
    pub diameter: Option<i64>,
    /// Population.
    #[serde(default)]
    pub population: Option<i64>,
}

/// Returns `None` for an empty id.
fn known_id(id: &str) -> Option<String> {
    (!id.is_empty()).then(|| id.to_string())
}

impl PlanetResourceModel {
    /// Desired state for a planet that does not exist yet.
    #[must_use]
    pub fn planned(name: impl Into<String>, diameter: Option<i64>, population: Option<i64>) -> Self {
        Self {
            id: None,
            name: name.into(),
            diameter,
            population,
        }
    }

    /// State produced by an import: only the id is known.
    #[must_use]
    pub fn imported(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }

    /// Returns the id if it is known and non-empty.
    #[must_use]
    pub fn known_id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }

    /// Builds the wire record.
    #[must_use]
    pub fn to_planet(&self) -> Planet {
        Planet {
            id: self.id.clone().unwrap_or_default(),
            name: self.name.clone(),
            diameter: self.diameter,
            population: self.population,
        }
    }

    /// Builds state from the wire record.
    #[must_use]
    pub fn from_planet(planet: &Planet) -> Self {
        Self {
            id: known_id(&planet.id),
            name: planet.name.clone(),
            diameter: planet.diameter,
            population: planet.population,
        }
    }
}

impl PlanetDataSourceModel {
    /// Configuration for a lookup by name.
    #[must_use]
    pub fn lookup(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Builds state from the wire record.
    #[must_use]
    pub fn from_planet(planet: &Planet) -> Self {
        Self {
            id: known_id(&planet.id),
            name: planet.name.clone(),
            diameter: planet.diameter,
            population: planet.population,
        }
    }
}
