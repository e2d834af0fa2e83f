//! SWAPI wire types.
//!
//! This module defines the JSON records exchanged with the SWAPI planet
//! endpoints.

use serde::{Deserialize, Serialize};

/// A planet as returned by the SWAPI service.
///
/// `id` and `name` must be present in every response; `diameter` and
/// `population` may be missing or `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Planet {
    /// Server-assigned identifier. Empty until the planet has been created.
    pub id: String,
    /// Planet name.
    pub name: String,
    /// Diameter, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diameter: Option<i64>,
    /// Population, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub population: Option<i64>,
}

/// Request body for the upsert endpoint.
///
/// An empty `id` is omitted so the server treats the call as a create.
#[derive(Debug, Serialize)]
pub(super) struct PlanetRequest<'a> {
    #[serde(skip_serializing_if = "str::is_empty")]
    pub id: &'a str,
    pub name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diameter: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub population: Option<i64>,
}

/// Body of a name lookup: either a single planet or a list of matches.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(super) enum PlanetLookup {
    One(Planet),
    Many(Vec<Planet>),
}

impl Planet {
    /// Creates a planet record that has not been assigned an id yet.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            diameter: None,
            population: None,
        }
    }

    /// Sets the diameter.
    #[must_use]
    pub const fn with_diameter(mut self, diameter: i64) -> Self {
        self.diameter = Some(diameter);
        self
    }

    /// Sets the population.
    #[must_use]
    pub const fn with_population(mut self, population: i64) -> Self {
        self.population = Some(population);
        self
    }

    /// Returns true once the server has assigned an id.
    #[must_use]
    pub fn has_id(&self) -> bool {
        !self.id.is_empty()
    }
}

impl<'a> From<&'a Planet> for PlanetRequest<'a> {
    fn from(planet: &'a Planet) -> Self {
        Self {
            id: &planet.id,
            name: &planet.name,
            diameter: planet.diameter,
            population: planet.population,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_omits_empty_id_and_unset_numbers() {
        let planet = Planet::new("Hoth");
        let body = serde_json::to_value(PlanetRequest::from(&planet)).unwrap();
        assert_eq!(body, serde_json::json!({ "name": "Hoth" }));
    }

    #[test]
    fn test_request_keeps_id_for_updates() {
        let mut planet = Planet::new("Hoth").with_diameter(7200).with_population(0);
        planet.id = String::from("1");
        let body = serde_json::to_value(PlanetRequest::from(&planet)).unwrap();
        assert_eq!(
            body,
            serde_json::json!({ "id": "1", "name": "Hoth", "diameter": 7200, "population": 0 })
        );
    }

    #[test]
    fn test_null_numbers_decode_as_unset() {
        let planet: Planet =
            serde_json::from_str(r#"{"id":"7","name":"Yavin IV","diameter":null}"#).unwrap();
        assert_eq!(planet.diameter, None);
        assert_eq!(planet.population, None);
    }

    #[test]
    fn test_missing_id_is_rejected() {
        let result: Result<Planet, _> = serde_json::from_str(r#"{"name":"Hoth"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_lookup_accepts_object_or_array() {
        let one: PlanetLookup = serde_json::from_str(r#"{"id":"1","name":"Hoth"}"#).unwrap();
        assert!(matches!(one, PlanetLookup::One(p) if p.id == "1"));

        let many: PlanetLookup = serde_json::from_str(r#"[{"id":"1","name":"Hoth"}]"#).unwrap();
        assert!(matches!(many, PlanetLookup::Many(v) if v.len() == 1));
    }
}
