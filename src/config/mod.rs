//! Manifest module.
//!
//! This module handles the `swapi.yaml` manifest:
//! - Parsing and deserializing the manifest
//! - Loading `.env` files
//! - Validating labels and planet attributes

mod parser;
mod spec;
mod validator;

pub use crate::provider::ProviderConfig;
pub use parser::{find_config_file, ConfigParser, DEFAULT_CONFIG_FILES};
pub use spec::{Manifest, PlanetConfig, PlanetLookupConfig};
pub use validator::{ConfigValidator, ValidationError, ValidationResult};
