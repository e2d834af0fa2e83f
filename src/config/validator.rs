//! Manifest validation.
//!
//! Checks labels and planet attributes before anything talks to the API.
//! Problems the server may legitimately accept are reported as warnings.

use crate::error::{ConfigError, Result, SwapiError};
use std::collections::HashMap;
use tracing::debug;

use super::spec::{Manifest, PlanetConfig};

/// Validator for manifests.
#[derive(Debug, Default)]
pub struct ConfigValidator;

/// Validation result containing all problems found.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// List of validation errors.
    pub errors: Vec<ValidationError>,
    /// List of warnings (non-fatal issues).
    pub warnings: Vec<String>,
}

/// A single validation error.
#[derive(Debug)]
pub struct ValidationError {
    /// The field path that failed validation.
    pub field: String,
    /// The error message.
    pub message: String,
}

impl ConfigValidator {
    /// Creates a new validator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Validates a manifest.
    ///
    /// # Errors
    ///
    /// Returns the first validation error, if any.
    pub fn validate(&self, manifest: &Manifest) -> Result<ValidationResult> {
        let result = self.check(manifest);

        if let Some(first_error) = result.errors.first() {
            return Err(SwapiError::Config(ConfigError::validation(
                first_error.message.clone(),
                first_error.field.clone(),
            )));
        }

        debug!("Manifest validation passed");
        Ok(result)
    }

    /// Collects every problem without failing.
    #[must_use]
    pub fn check(&self, manifest: &Manifest) -> ValidationResult {
        let mut result = ValidationResult::default();

        if manifest.is_empty() {
            result
                .warnings
                .push(String::from("No planets or lookups defined in manifest"));
        }

        if manifest
            .provider
            .api_key
            .as_deref()
            .is_some_and(|k| !k.is_empty())
        {
            result.warnings.push(String::from(
                "provider.api_key is set in the manifest; prefer the SWAPI_APIKEY environment variable",
            ));
        }

        Self::validate_planets(manifest, &mut result);
        Self::validate_lookups(manifest, &mut result);

        result
    }

    /// Validates managed planets.
    fn validate_planets(manifest: &Manifest, result: &mut ValidationResult) {
        let mut labels_by_name: HashMap<&str, &str> = HashMap::new();

        for (label, planet) in &manifest.planets {
            let prefix = format!("planets.{label}");

            if !is_valid_label(label) {
                result.errors.push(ValidationError {
                    field: prefix.clone(),
                    message: format!(
                        "Label '{label}' is invalid. Use letters, digits, '_' or '-'."
                    ),
                });
            }

            Self::validate_planet(planet, &prefix, result);

            if let Some(other) = labels_by_name.insert(planet.name.as_str(), label.as_str()) {
                result.warnings.push(format!(
                    "planets.{other} and {prefix} both manage a planet named '{}'",
                    planet.name
                ));
            }
        }
    }

    /// Validates a single planet.
    fn validate_planet(planet: &PlanetConfig, prefix: &str, result: &mut ValidationResult) {
        if planet.name.trim().is_empty() {
            result.errors.push(ValidationError {
                field: format!("{prefix}.name"),
                message: String::from("Planet name cannot be empty"),
            });
        }

        for (field, value) in [("diameter", planet.diameter), ("population", planet.population)] {
            if value.is_some_and(|v| v < 0) {
                result
                    .warnings
                    .push(format!("{prefix}.{field} is negative"));
            }
        }
    }

    /// Validates lookups.
    fn validate_lookups(manifest: &Manifest, result: &mut ValidationResult) {
        for (label, lookup) in &manifest.data {
            let prefix = format!("data.{label}");

            if !is_valid_label(label) {
                result.errors.push(ValidationError {
                    field: prefix.clone(),
                    message: format!(
                        "Label '{label}' is invalid. Use letters, digits, '_' or '-'."
                    ),
                });
            }

            if lookup.name.trim().is_empty() {
                result.errors.push(ValidationError {
                    field: format!("{prefix}.name"),
                    message: String::from("Lookup name cannot be empty"),
                });
            }
        }
    }
}

impl ValidationResult {
    /// Returns true if no errors were found.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Checks a manifest label.
fn is_valid_label(label: &str) -> bool {
    !label.is_empty()
        && label
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PlanetLookupConfig, ProviderConfig};

    fn planet(name: &str) -> PlanetConfig {
        PlanetConfig {
            name: name.to_string(),
            diameter: None,
            population: None,
        }
    }

    #[test]
    fn test_valid_label() {
        assert!(is_valid_label("hoth"));
        assert!(is_valid_label("echo_base-2"));
        assert!(!is_valid_label(""));
        assert!(!is_valid_label("echo base"));
        assert!(!is_valid_label("hoth.base"));
    }

    #[test]
    fn test_empty_name_is_error() {
        let mut manifest = Manifest::default();
        manifest.planets.insert(String::from("hoth"), planet(""));

        let err = ConfigValidator::new().validate(&manifest).unwrap_err();
        assert!(err.to_string().contains("Planet name cannot be empty"));
    }

    #[test]
    fn test_warnings_do_not_fail() {
        let mut manifest = Manifest {
            provider: ProviderConfig {
                endpoint: None,
                api_key: Some(String::from("secret")),
            },
            ..Manifest::default()
        };
        let mut negative = planet("Hoth");
        negative.diameter = Some(-1);
        manifest.planets.insert(String::from("a"), negative);
        manifest.planets.insert(String::from("b"), planet("Hoth"));
        manifest.data.insert(
            String::from("t"),
            PlanetLookupConfig {
                name: String::from("Tatooine"),
            },
        );

        let result = ConfigValidator::new().validate(&manifest).unwrap();
        assert!(result.is_valid());
        assert_eq!(result.warnings.len(), 3);
    }

    #[test]
    fn test_bad_lookup() {
        let mut manifest = Manifest::default();
        manifest.data.insert(
            String::from("bad label"),
            PlanetLookupConfig {
                name: String::new(),
            },
        );

        let result = ConfigValidator::new().check(&manifest);
        assert_eq!(result.errors.len(), 2);
    }
}
