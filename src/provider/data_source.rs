//! Planet data source.
//!
//! Read-only lookup of a planet by name.

use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::swapi::PlanetApi;

use super::diagnostics::{Diagnostic, Diagnostics};
use super::model::PlanetDataSourceModel;
use super::schema::{Attribute, Schema};
use super::settings::ProviderContext;

/// The planet data source.
#[derive(Clone)]
pub struct PlanetDataSource {
    /// Shared client handle from the provider context.
    api: Arc<dyn PlanetApi>,
}

impl fmt::Debug for PlanetDataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlanetDataSource").finish_non_exhaustive()
    }
}

impl PlanetDataSource {
    /// Creates the data source from a configured provider.
    #[must_use]
    pub fn new(context: &ProviderContext) -> Self {
        Self {
            api: context.api(),
        }
    }

    /// Data source type name for a provider type name.
    #[must_use]
    pub fn type_name(provider_type_name: &str) -> String {
        format!("{provider_type_name}_planet")
    }

    /// Data source schema.
    #[must_use]
    pub fn schema() -> Schema {
        Schema::new("Planet data source")
            .with_attribute("id", Attribute::computed_string("Planet Id"))
            .with_attribute("name", Attribute::required_string("Planet Name"))
            .with_attribute("diameter", Attribute::computed_int64("Planet diameter"))
            .with_attribute("population", Attribute::computed_int64("Planet population"))
    }

    /// Looks the planet up by name.
    ///
    /// # Errors
    ///
    /// Returns an error diagnostic if the name is empty or the lookup fails.
    pub async fn read(
        &self,
        config: &PlanetDataSourceModel,
    ) -> Result<PlanetDataSourceModel, Diagnostics> {
        let name = config.name.as_str();
        if name.trim().is_empty() {
            return Err(Diagnostic::error(
                "Missing planet name",
                "The planet data source needs a name to look up.",
            )
            .with_attribute("name")
            .into());
        }

        let planet = self.api.read_planet_by_name(name).await.map_err(|e| {
            Diagnostic::error(
                "Error reading planet",
                format!("Error reading planet {name}, got error {e}"),
            )
        })?;

        debug!("Read data source planet {name} (ID: {})", planet.id);
        Ok(PlanetDataSourceModel::from_planet(&planet))
    }
}
