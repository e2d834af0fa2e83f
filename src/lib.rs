// ============================================================================
// Strict linting - Dangerous or non-idiomatic practices are forbidden
// ============================================================================

#![deny(warnings)]                    // All warnings are treated as errors
#![deny(unsafe_code)]                 // Unsafe code is forbidden
#![deny(missing_docs)]                // All public items must be documented
#![deny(dead_code)]                   // Unused code is forbidden
#![deny(non_camel_case_types)]        // Types must follow CamelCase convention

// Additional strictness - Leave nothing unchecked
#![deny(unused_imports)]              // Unused imports are forbidden
#![deny(unused_variables)]            // Unused variables are forbidden
#![deny(unused_must_use)]             // Must handle Result and Option explicitly
#![deny(non_snake_case)]              // Variables and functions must be snake_case
#![deny(non_upper_case_globals)]      // Constants must be UPPER_CASE
#![deny(nonstandard_style)]           // Non-standard code style is forbidden
#![forbid(unsafe_op_in_unsafe_fn)]    // Unsafe ops in unsafe fns are forbidden

// Clippy lints (warnings only)
#![warn(clippy::all)]                 // All standard Clippy lints
#![warn(clippy::pedantic)]            // Very strict Clippy lints
#![warn(clippy::nursery)]             // Experimental lints
#![warn(clippy::unwrap_used)]         // unwrap() warning
#![warn(clippy::expect_used)]         // expect() warning
#![warn(clippy::panic)]               // panic!() warning
#![warn(clippy::print_stdout)]        // println!() warning
#![warn(clippy::todo)]                // TODO warning
#![warn(clippy::unimplemented)]       // unimplemented!() warning
#![warn(clippy::unwrap_in_result)]    // unwrap() in Result warning
#![warn(clippy::redundant_clone)]     // Useless clones warning
#![warn(clippy::too_many_arguments)]  // Limit function arguments
#![warn(clippy::cognitive_complexity)] // Limit cognitive complexity

// Safety and robustness lints
#![deny(overflowing_literals)]        // Overflowing literals are forbidden
#![deny(arithmetic_overflow)]         // Arithmetic overflow is forbidden

// ============================================================================
// Crate Documentation
// ============================================================================

//! # SWAPI Provider
//!
//! Declarative management of SWAPI planets through a small REST API.
//!
//! ## Overview
//!
//! The crate exposes one managed resource, `swapi_planet`, and one data
//! source of the same name:
//!
//! - A REST client that reads planets by id or name, upserts and deletes them
//! - A resource adapter mapping Create/Read/Update/Delete/Import onto the client
//! - A data source looking planets up by name
//! - Provider configuration from explicit values or `SWAPI_ENDPOINT` /
//!   `SWAPI_APIKEY`
//!
//! The `swapi` binary drives these from a YAML manifest, planning changes
//! against recorded state and applying them.
//!
//! ## Modules
//!
//! - [`swapi`]: REST client and wire types
//! - [`provider`]: Provider configuration, schemas, resource and data source
//! - [`config`]: Manifest parsing and validation
//! - [`state`]: Recorded state and locking
//! - [`planner`]: Diff computation, plans and execution
//! - [`cli`]: Command-line interface
//!
//! ## Example
//!
//! ```yaml
//! provider:
//!   endpoint: https://api.example.com/v1
//!
//! planets:
//!   hoth:
//!     name: Hoth
//!     diameter: 7200
//!     population: 0
//!
//! data:
//!   tatooine:
//!     name: Tatooine
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod cli;
pub mod config;
pub mod error;
pub mod planner;
pub mod provider;
pub mod state;
pub mod swapi;

// ============================================================================
// Re-exports
// ============================================================================

pub use cli::{Cli, Commands, OutputFormatter};
pub use config::{ConfigParser, ConfigValidator, Manifest};
pub use error::{Result, SwapiError};
pub use planner::{DiffEngine, Plan, PlanExecutor};
pub use provider::{
    Diagnostics, PlanetDataSource, PlanetResource, ProviderConfig, ProviderContext, SwapiProvider,
};
pub use state::{LocalStateStore, ProviderState, StateStore};
pub use swapi::{Planet, PlanetApi, SwapiClient};
