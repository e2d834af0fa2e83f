//! SWAPI REST API integration module.
//!
//! This module provides the HTTP client for the planet endpoints of the
//! SWAPI service, the wire record it exchanges, and the [`PlanetApi`] seam
//! the provider adapters are written against.

mod api;
mod client;
mod types;

pub use api::PlanetApi;
#[cfg(test)]
pub use api::MockPlanetApi;
pub use client::SwapiClient;
pub use types::Planet;
