//! Provider module.
//!
//! This module wires the SWAPI client into a declarative lifecycle:
//! provider configuration, the `swapi_planet` resource, the `swapi_planet`
//! data source, their schemas, and the diagnostics they report.

mod data_source;
mod diagnostics;
mod model;
mod resource;
mod schema;
mod settings;

pub use data_source::PlanetDataSource;
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use model::{PlanetDataSourceModel, PlanetResourceModel};
pub use resource::PlanetResource;
pub use schema::{Attribute, AttributeType, PlanModifier, ProviderSchema, Schema};
pub use settings::{
    ProviderConfig, ProviderContext, ProviderMetadata, SwapiProvider, API_KEY_ENV, ENDPOINT_ENV,
};
