//! Planet resource lifecycle.
//!
//! Maps Create/Read/Update/Delete/Import onto the SWAPI client and
//! translates between the wire record and [`PlanetResourceModel`].

use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

use crate::swapi::PlanetApi;

use super::diagnostics::{Diagnostic, Diagnostics};
use super::model::PlanetResourceModel;
use super::schema::{Attribute, PlanModifier, Schema};
use super::settings::ProviderContext;

/// Suffix appended to the provider type name.
const TYPE_SUFFIX: &str = "_planet";

/// The planet resource.
#[derive(Clone)]
pub struct PlanetResource {
    /// Shared client handle from the provider context.
    api: Arc<dyn PlanetApi>,
}

impl fmt::Debug for PlanetResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlanetResource").finish_non_exhaustive()
    }
}

impl PlanetResource {
    /// Creates the resource from a configured provider.
    #[must_use]
    pub fn new(context: &ProviderContext) -> Self {
        Self {
            api: context.api(),
        }
    }

    /// Resource type name for a provider type name.
    #[must_use]
    pub fn type_name(provider_type_name: &str) -> String {
        format!("{provider_type_name}{TYPE_SUFFIX}")
    }

    /// Resource schema.
    #[must_use]
    pub fn schema() -> Schema {
        Schema::new("Planet resource")
            .with_attribute(
                "id",
                Attribute::computed_string("Planet id")
                    .with_plan_modifier(PlanModifier::UseStateForUnknown),
            )
            .with_attribute(
                "name",
                Attribute::required_string("Planet Name")
                    .with_plan_modifier(PlanModifier::RequiresReplace),
            )
            .with_attribute("diameter", Attribute::optional_int64("Planet diameter"))
            .with_attribute("population", Attribute::optional_int64("Planet population"))
    }

    /// Creates the planet and returns its full state.
    ///
    /// # Errors
    ///
    /// Returns an error diagnostic if the API call fails.
    pub async fn create(
        &self,
        plan: &PlanetResourceModel,
    ) -> Result<PlanetResourceModel, Diagnostics> {
        let mut planet = plan.to_planet();
        planet.id.clear();

        let saved = self.api.create_or_update_planet(&planet).await.map_err(|e| {
            Diagnostic::error(
                "Error creating planet",
                format!("Error creating planet {}, got error {e}", plan.name),
            )
        })?;

        info!("Created planet {} (ID: {})", saved.name, saved.id);
        Ok(PlanetResourceModel::from_planet(&saved))
    }

    /// Refreshes state from the server.
    ///
    /// # Errors
    ///
    /// Returns an error diagnostic if the state has no id or the API call fails.
    pub async fn read(
        &self,
        state: &PlanetResourceModel,
    ) -> Result<PlanetResourceModel, Diagnostics> {
        let id = Self::require_id(state, "Error reading planet")?;

        let planet = self.api.read_planet_by_id(id).await.map_err(|e| {
            Diagnostic::error(
                "Error reading planet",
                format!("Error reading planet {id}, got error {e}"),
            )
        })?;

        debug!("Read planet {id}");
        Ok(PlanetResourceModel::from_planet(&planet))
    }

    /// Updates the planet in place.
    ///
    /// The id comes from the plan, or from prior state when the plan does
    /// not know it. Every attribute is resubmitted.
    ///
    /// # Errors
    ///
    /// Returns an error diagnostic if no id is known or the API call fails.
    pub async fn update(
        &self,
        plan: &PlanetResourceModel,
        prior: &PlanetResourceModel,
    ) -> Result<PlanetResourceModel, Diagnostics> {
        let id = plan
            .known_id()
            .or_else(|| prior.known_id())
            .ok_or_else(|| Self::missing_id("Error updating planet"))?;

        let mut planet = plan.to_planet();
        planet.id = id.to_string();

        let saved = self.api.create_or_update_planet(&planet).await.map_err(|e| {
            Diagnostic::error(
                "Error updating planet",
                format!("Error updating planet {} ({id}), got error {e}", plan.name),
            )
        })?;

        info!("Updated planet {} (ID: {})", saved.name, saved.id);
        Ok(PlanetResourceModel::from_planet(&saved))
    }

    /// Deletes the planet.
    ///
    /// # Errors
    ///
    /// Returns an error diagnostic if the state has no id or the API call fails.
    pub async fn delete(&self, state: &PlanetResourceModel) -> Result<(), Diagnostics> {
        let id = Self::require_id(state, "Error deleting planet")?;

        self.api.delete_planet(id).await.map_err(|e| {
            Diagnostic::error(
                "Error deleting planet",
                format!("Error deleting planet {id}, got error {e}"),
            )
        })?;

        info!("Deleted planet {id}");
        Ok(())
    }

    /// Passthrough import: the identifier becomes the `id` attribute.
    ///
    /// # Errors
    ///
    /// Returns an error diagnostic if the identifier is empty.
    pub fn import_state(id: &str) -> Result<PlanetResourceModel, Diagnostics> {
        let id = id.trim();
        if id.is_empty() {
            return Err(Diagnostic::error(
                "Missing import identifier",
                "Import requires the id of an existing planet.",
            )
            .with_attribute("id")
            .into());
        }
        Ok(PlanetResourceModel::imported(id))
    }

    /// Imports an existing planet and reads the rest of its attributes.
    ///
    /// # Errors
    ///
    /// Returns an error diagnostic if the identifier is empty or the read fails.
    pub async fn import(&self, id: &str) -> Result<PlanetResourceModel, Diagnostics> {
        let state = Self::import_state(id)?;
        self.read(&state).await
    }

    fn require_id<'a>(
        state: &'a PlanetResourceModel,
        summary: &str,
    ) -> Result<&'a str, Diagnostics> {
        state.known_id().ok_or_else(|| Self::missing_id(summary))
    }

    fn missing_id(summary: &str) -> Diagnostics {
        Diagnostic::error(summary, "The planet has no id in state.")
            .with_attribute("id")
            .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ApiError, SwapiError};
    use crate::swapi::{MockPlanetApi, Planet};

    fn hoth(id: &str) -> Planet {
        let mut planet = Planet::new("Hoth").with_diameter(7200).with_population(0);
        planet.id = id.to_string();
        planet
    }

    fn resource(api: MockPlanetApi) -> PlanetResource {
        PlanetResource::new(&ProviderContext::new(Arc::new(api)))
    }

    #[test]
    fn test_schema_modifiers() {
        let schema = PlanetResource::schema();
        assert!(schema.requires_replace("name"));
        assert!(!schema.requires_replace("diameter"));
        assert!(
            schema
                .attribute("id")
                .is_some_and(|a| a.computed && a.has_plan_modifier(PlanModifier::UseStateForUnknown))
        );
        assert_eq!(PlanetResource::type_name("swapi"), "swapi_planet");
    }

    #[tokio::test]
    async fn test_create_writes_server_record() {
        let mut api = MockPlanetApi::new();
        api.expect_create_or_update_planet()
            .withf(|p| p.id.is_empty() && p.name == "Hoth" && p.diameter == Some(7200))
            .times(1)
            .returning(|_| Ok(hoth("1")));

        let plan = PlanetResourceModel::planned("Hoth", Some(7200), Some(0));
        let state = resource(api).create(&plan).await.expect("created");

        assert_eq!(state.id.as_deref(), Some("1"));
        assert_eq!(state.name, "Hoth");
        assert_eq!(state.population, Some(0));
    }

    #[tokio::test]
    async fn test_create_failure_names_planet() {
        let mut api = MockPlanetApi::new();
        api.expect_create_or_update_planet().returning(|_| {
            Err(SwapiError::Api(ApiError::remote(reqwest::StatusCode::BAD_REQUEST)))
        });

        let plan = PlanetResourceModel::planned("Hoth", None, None);
        let diags = resource(api).create(&plan).await.unwrap_err();

        assert!(diags.has_error());
        let text = diags.to_string();
        assert!(text.contains("Error creating planet Hoth"));
        assert!(text.contains("400"));
    }

    #[tokio::test]
    async fn test_read_overwrites_state() {
        let mut api = MockPlanetApi::new();
        api.expect_read_planet_by_id()
            .withf(|id| id == "1")
            .times(1)
            .returning(|_| {
                let mut planet = hoth("1");
                planet.population = Some(12);
                Ok(planet)
            });

        let prior = PlanetResourceModel {
            id: Some(String::from("1")),
            name: String::from("Hoth"),
            diameter: Some(1),
            population: None,
        };
        let state = resource(api).read(&prior).await.expect("read");

        assert_eq!(state.diameter, Some(7200));
        assert_eq!(state.population, Some(12));
    }

    #[tokio::test]
    async fn test_read_without_id_is_rejected_before_any_call() {
        let api = MockPlanetApi::new();
        let diags = resource(api)
            .read(&PlanetResourceModel::planned("Hoth", None, None))
            .await
            .unwrap_err();

        assert!(diags.iter().any(|d| d.attribute.as_deref() == Some("id")));
    }

    #[tokio::test]
    async fn test_update_resubmits_every_attribute() {
        let mut api = MockPlanetApi::new();
        api.expect_create_or_update_planet()
            .withf(|p| {
                p.id == "1"
                    && p.name == "Hoth"
                    && p.diameter == Some(7300)
                    && p.population == Some(5)
            })
            .times(1)
            .returning(|p| Ok(p.clone()));

        let prior = PlanetResourceModel::from_planet(&hoth("1"));
        let plan = PlanetResourceModel::planned("Hoth", Some(7300), Some(5));
        let state = resource(api).update(&plan, &prior).await.expect("updated");

        assert_eq!(state.id.as_deref(), Some("1"));
        assert_eq!(state.diameter, Some(7300));
        assert_eq!(state.population, Some(5));
    }

    #[tokio::test]
    async fn test_delete_calls_api_with_id() {
        let mut api = MockPlanetApi::new();
        api.expect_delete_planet()
            .withf(|id| id == "1")
            .times(1)
            .returning(|_| Ok(()));

        let state = PlanetResourceModel::from_planet(&hoth("1"));
        resource(api).delete(&state).await.expect("deleted");
    }

    #[tokio::test]
    async fn test_delete_failure_surfaces_status() {
        let mut api = MockPlanetApi::new();
        api.expect_delete_planet().returning(|_| {
            Err(SwapiError::Api(ApiError::remote(reqwest::StatusCode::NOT_FOUND)))
        });

        let state = PlanetResourceModel::from_planet(&hoth("9"));
        let diags = resource(api).delete(&state).await.unwrap_err();
        assert!(diags.to_string().contains("Error deleting planet 9"));
    }

    #[tokio::test]
    async fn test_import_reads_everything_else() {
        let mut api = MockPlanetApi::new();
        api.expect_read_planet_by_id()
            .withf(|id| id == "1")
            .times(1)
            .returning(|_| Ok(hoth("1")));

        let state = resource(api).import(" 1 ").await.expect("imported");
        assert_eq!(state, PlanetResourceModel::from_planet(&hoth("1")));
    }

    #[test]
    fn test_import_requires_identifier() {
        assert!(PlanetResource::import_state("  ").is_err());
        assert_eq!(
            PlanetResource::import_state("7").expect("state").known_id(),
            Some("7")
        );
    }
}
