//! Planning module.
//!
//! Compares the manifest with recorded state and turns the difference into
//! an ordered plan, then applies it through the planet resource.

mod diff;
mod executor;
mod plan;

pub use diff::{DiffDetail, DiffEngine, DiffResult, DiffType, ResourceDiff};
pub use executor::{ActionResult, ExecutionResult, PlanExecutor, RefreshResult};
pub use plan::{ActionType, Plan, PlannedAction};
