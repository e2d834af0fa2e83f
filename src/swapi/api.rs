//! Planet API trait definition.
//!
//! The provider adapters only depend on this trait, which keeps them
//! testable without a network and lets one client instance be shared
//! behind an `Arc`.

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::error::Result;

use super::types::Planet;

/// Operations the SWAPI service offers on planets.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait PlanetApi: Send + Sync {
    /// Reads a planet by its server-assigned id.
    async fn read_planet_by_id(&self, id: &str) -> Result<Planet>;

    /// Reads a planet by name.
    async fn read_planet_by_name(&self, name: &str) -> Result<Planet>;

    /// Creates the planet, or updates it when `planet.id` is set, and
    /// returns the server's canonical record.
    async fn create_or_update_planet(&self, planet: &Planet) -> Result<Planet>;

    /// Deletes a planet by id.
    async fn delete_planet(&self, id: &str) -> Result<()>;
}
