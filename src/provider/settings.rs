//! Provider metadata, schema and configuration.
//!
//! `endpoint` and `api_key` resolve from explicit configuration first and
//! fall back to `SWAPI_ENDPOINT` / `SWAPI_APIKEY`. A successful configure
//! yields a [`ProviderContext`] that owns the one client shared by every
//! adapter.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::ConfigError;
use crate::swapi::{PlanetApi, SwapiClient};

use super::data_source::PlanetDataSource;
use super::diagnostics::Diagnostics;
use super::resource::PlanetResource;
use super::schema::{Attribute, ProviderSchema, Schema};

/// Environment variable consulted for the endpoint.
pub const ENDPOINT_ENV: &str = "SWAPI_ENDPOINT";

/// Environment variable consulted for the API key.
pub const API_KEY_ENV: &str = "SWAPI_APIKEY";

/// Explicit provider configuration. Unset or empty values fall back to the
/// environment.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderConfig {
    /// SWAPI endpoint, e.g. `https://api.example.com/v1`.
    #[serde(default)]
    pub endpoint: Option<String>,
    /// API key sent in the `api-key` header.
    #[serde(default)]
    pub api_key: Option<String>,
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl ProviderConfig {
    /// Layers `overrides` on top of `self`; non-empty override values win.
    #[must_use]
    pub fn overridden_by(self, overrides: Self) -> Self {
        Self {
            endpoint: non_empty(overrides.endpoint).or(self.endpoint),
            api_key: non_empty(overrides.api_key).or(self.api_key),
        }
    }
}

/// Provider identification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderMetadata {
    /// Provider type name, used as resource prefix.
    pub type_name: &'static str,
    /// Provider version.
    pub version: String,
}

/// The SWAPI provider.
#[derive(Debug, Clone)]
pub struct SwapiProvider {
    /// Provider version: the crate version on release, `dev` or `test` otherwise.
    version: String,
}

/// Handle produced by a successful configure.
///
/// Cloning is cheap; all clones share the same client, which is released
/// when the last one is dropped.
#[derive(Clone)]
pub struct ProviderContext {
    /// Shared API client.
    api: Arc<dyn PlanetApi>,
}

impl fmt::Debug for ProviderContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderContext").finish_non_exhaustive()
    }
}

impl ProviderContext {
    /// Wraps an API implementation.
    #[must_use]
    pub fn new(api: Arc<dyn PlanetApi>) -> Self {
        Self { api }
    }

    /// Returns the shared client handle.
    #[must_use]
    pub fn api(&self) -> Arc<dyn PlanetApi> {
        Arc::clone(&self.api)
    }

    /// Builds the planet resource.
    #[must_use]
    pub fn planet_resource(&self) -> PlanetResource {
        PlanetResource::new(self)
    }

    /// Builds the planet data source.
    #[must_use]
    pub fn planet_data_source(&self) -> PlanetDataSource {
        PlanetDataSource::new(self)
    }
}

impl SwapiProvider {
    /// Provider type name.
    pub const TYPE_NAME: &'static str = "swapi";

    /// Creates the provider.
    #[must_use]
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
        }
    }

    /// Provider metadata.
    #[must_use]
    pub fn metadata(&self) -> ProviderMetadata {
        ProviderMetadata {
            type_name: Self::TYPE_NAME,
            version: self.version.clone(),
        }
    }

    /// Provider configuration schema.
    #[must_use]
    pub fn schema() -> Schema {
        Schema::new("SWAPI provider")
            .with_attribute(
                "endpoint",
                Attribute::optional_string(
                    "Endpoint to connect SWAPI. Can be set by environment variable SWAPI_ENDPOINT.",
                ),
            )
            .with_attribute(
                "api_key",
                Attribute::optional_string(
                    "APIKey. Can be set by environment variable SWAPI_APIKEY.",
                )
                .sensitive(),
            )
    }

    /// Every schema the provider exposes.
    #[must_use]
    pub fn full_schema(&self) -> ProviderSchema {
        ProviderSchema {
            provider: Self::schema(),
            resources: BTreeMap::from([(
                PlanetResource::type_name(Self::TYPE_NAME),
                PlanetResource::schema(),
            )]),
            data_sources: BTreeMap::from([(
                PlanetDataSource::type_name(Self::TYPE_NAME),
                PlanetDataSource::schema(),
            )]),
        }
    }

    /// Configures the provider from explicit values and the process
    /// environment.
    ///
    /// # Errors
    ///
    /// Returns attribute error diagnostics for every missing or invalid
    /// setting.
    pub fn configure(&self, config: &ProviderConfig) -> Result<ProviderContext, Diagnostics> {
        self.configure_with(config, |name| std::env::var(name).ok())
    }

    /// Configures the provider, reading fallbacks through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns attribute error diagnostics for every missing or invalid
    /// setting.
    pub fn configure_with<F>(
        &self,
        config: &ProviderConfig,
        lookup: F,
    ) -> Result<ProviderContext, Diagnostics>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut diags = Diagnostics::new();

        let endpoint = resolve(config.endpoint.as_deref(), ENDPOINT_ENV, &lookup);
        let api_key = resolve(config.api_key.as_deref(), API_KEY_ENV, &lookup);

        if endpoint.is_none() {
            diags.add_attribute_error(
                "endpoint",
                "Unknown SWAPI Endpoint",
                format!(
                    "The provider cannot create the SWAPI client as there is no value for the SWAPI host. {}",
                    missing("endpoint", ENDPOINT_ENV)
                ),
            );
        }

        if api_key.is_none() {
            diags.add_attribute_error(
                "api_key",
                "Unknown SWAPI API key",
                format!(
                    "The provider cannot create the SWAPI client as there is no value for the SWAPI key. {}",
                    missing("api_key", API_KEY_ENV)
                ),
            );
        }

        let (Some(endpoint), Some(api_key)) = (endpoint, api_key) else {
            return Err(diags);
        };

        let client = SwapiClient::new(&endpoint, &api_key).map_err(|e| {
            let mut diags = Diagnostics::new();
            diags.add_attribute_error("endpoint", "Invalid SWAPI Endpoint", e.to_string());
            diags
        })?;

        info!("Configured SWAPI client for {}", client.endpoint());
        Ok(ProviderContext::new(Arc::new(client)))
    }
}

/// Explicit non-empty value, else non-empty environment value.
fn resolve<F>(explicit: Option<&str>, env_var: &str, lookup: &F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = non_empty(explicit.map(str::to_string)) {
        return Some(value);
    }

    let value = non_empty(lookup(env_var));
    if value.is_some() {
        debug!("Using {env_var} from environment");
    }
    value
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn missing(field: &str, env_var: &str) -> String {
    ConfigError::MissingSetting {
        field: field.to_string(),
        env_var: env_var.to_string(),
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    fn provider() -> SwapiProvider {
        SwapiProvider::new("test")
    }

    #[test]
    fn test_metadata_and_schema() {
        let metadata = provider().metadata();
        assert_eq!(metadata.type_name, "swapi");
        assert_eq!(metadata.version, "test");

        let schema = provider().full_schema();
        assert!(schema.provider.attribute("api_key").is_some_and(|a| a.sensitive));
        assert!(schema.resources.contains_key("swapi_planet"));
        assert!(schema.data_sources.contains_key("swapi_planet"));
    }

    #[test]
    fn test_environment_fallback() {
        let result = provider().configure_with(
            &ProviderConfig::default(),
            env(&[(ENDPOINT_ENV, "https://api.test/v1"), (API_KEY_ENV, "secret")]),
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_explicit_overrides_environment() {
        let config = ProviderConfig {
            endpoint: Some(String::from("https://explicit.test/v1")),
            api_key: Some(String::from("explicit")),
        };
        let lookup = env(&[(ENDPOINT_ENV, "not a url"), (API_KEY_ENV, "env")]);

        assert_eq!(
            resolve(config.endpoint.as_deref(), ENDPOINT_ENV, &lookup).as_deref(),
            Some("https://explicit.test/v1")
        );
        assert!(provider().configure_with(&config, lookup).is_ok());
    }

    #[test]
    fn test_empty_explicit_value_falls_back() {
        let lookup = env(&[(API_KEY_ENV, "env")]);
        assert_eq!(resolve(Some(""), API_KEY_ENV, &lookup).as_deref(), Some("env"));
        assert_eq!(resolve(Some("  "), ENDPOINT_ENV, &lookup), None);
    }

    #[test]
    fn test_reports_every_missing_field() {
        let diags = provider()
            .configure_with(&ProviderConfig::default(), env(&[(API_KEY_ENV, "")]))
            .unwrap_err();

        let attributes: Vec<_> = diags.iter().filter_map(|d| d.attribute.as_deref()).collect();
        assert_eq!(attributes, vec!["endpoint", "api_key"]);
        assert!(diags.to_string().contains(API_KEY_ENV));
    }

    #[test]
    fn test_invalid_endpoint_is_attribute_error() {
        let config = ProviderConfig {
            endpoint: Some(String::from("ftp://api.test")),
            api_key: Some(String::from("secret")),
        };
        let diags = provider().configure_with(&config, env(&[])).unwrap_err();
        assert_eq!(diags.len(), 1);
        assert!(diags.iter().all(|d| d.attribute.as_deref() == Some("endpoint")));
    }

    #[test]
    fn test_overrides_layering() {
        let manifest = ProviderConfig {
            endpoint: Some(String::from("https://manifest.test")),
            api_key: Some(String::from("manifest")),
        };
        let flags = ProviderConfig {
            endpoint: Some(String::from("https://flag.test")),
            api_key: Some(String::new()),
        };
        let merged = manifest.overridden_by(flags);
        assert_eq!(merged.endpoint.as_deref(), Some("https://flag.test"));
        assert_eq!(merged.api_key.as_deref(), Some("manifest"));
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = ProviderConfig {
            endpoint: None,
            api_key: Some(String::from("secret")),
        };
        assert!(!format!("{config:?}").contains("secret"));
    }
}
