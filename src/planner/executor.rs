//! Plan executor.
//!
//! Runs planned actions one at a time through [`PlanetResource`], recording
//! every outcome in the provider state and its history.

use serde::Serialize;
use tracing::{error, info, warn};

use crate::error::{PlanError, Result};
use crate::provider::{Diagnostic, Diagnostics, PlanetResource, PlanetResourceModel};
use crate::state::{resource_address, HistoryEntry, Operation, ProviderState};

use super::plan::{ActionType, Plan, PlannedAction};

/// Executor for plans.
#[derive(Debug)]
pub struct PlanExecutor<'a> {
    /// The planet resource.
    resource: &'a PlanetResource,
    /// Whether to keep going after a failed action.
    continue_on_error: bool,
    /// Whether to re-read a planet after writing it.
    verify: bool,
}

/// Result of executing a single action.
#[derive(Debug, Clone, Serialize)]
pub struct ActionResult {
    /// Action that was executed.
    pub action: PlannedAction,
    /// Whether the action succeeded.
    pub success: bool,
    /// Planet id after the action, if one exists.
    pub id: Option<String>,
    /// Error message, if failed.
    pub error: Option<String>,
}

/// Result of executing a plan.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionResult {
    /// Individual action results.
    pub results: Vec<ActionResult>,
    /// Number of successful actions.
    pub successful: usize,
    /// Number of failed actions.
    pub failed: usize,
    /// Number of actions not attempted after a failure.
    pub skipped: usize,
    /// Whether the whole plan succeeded.
    pub success: bool,
}

/// Outcome of refreshing one resource.
#[derive(Debug, Clone, Serialize)]
pub struct RefreshResult {
    /// Resource address.
    pub address: String,
    /// Whether the server values differ from the recorded ones.
    pub drifted: bool,
    /// Error message, if the read failed.
    pub error: Option<String>,
}

impl<'a> PlanExecutor<'a> {
    /// Creates a new plan executor.
    #[must_use]
    pub const fn new(resource: &'a PlanetResource) -> Self {
        Self {
            resource,
            continue_on_error: false,
            verify: true,
        }
    }

    /// Sets whether to continue on errors.
    #[must_use]
    pub const fn with_continue_on_error(mut self, continue_on_error: bool) -> Self {
        self.continue_on_error = continue_on_error;
        self
    }

    /// Sets whether to re-read planets after create and update.
    #[must_use]
    pub const fn with_verify(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }

    /// Executes a plan, updating `state` after every successful action.
    ///
    /// Callers must save `state` afterwards whatever the outcome.
    pub async fn execute(&self, plan: &Plan, state: &mut ProviderState) -> ExecutionResult {
        let pending: Vec<&PlannedAction> = plan.changes().collect();
        info!("Executing plan with {} actions", pending.len());

        let mut results = Vec::with_capacity(pending.len());

        for action in &pending {
            info!("{}", action.description());
            let result = self.execute_action(action, state).await;
            let failed = !result.success;
            results.push(result);

            if failed && !self.continue_on_error {
                warn!("Stopping after failed action on {}", action.address);
                break;
            }
        }

        let successful = results.iter().filter(|r| r.success).count();
        let failed = results.len() - successful;
        let skipped = pending.len() - results.len();

        ExecutionResult {
            results,
            successful,
            failed,
            skipped,
            success: failed == 0,
        }
    }

    /// Imports an existing planet under `label`.
    ///
    /// # Errors
    ///
    /// Returns an error if the label is already managed or the planet
    /// cannot be read.
    pub async fn import(
        &self,
        label: &str,
        id: &str,
        state: &mut ProviderState,
    ) -> Result<PlanetResourceModel> {
        let address = resource_address(label);
        if state.get(label).is_some() {
            return Err(PlanError::AlreadyManaged { address }.into());
        }

        match self.resource.import(id).await {
            Ok(model) => {
                state.set(label, model.clone());
                state.add_history(HistoryEntry::new(Operation::Import, &address));
                info!("Imported {address} (ID: {})", id.trim());
                Ok(model)
            }
            Err(diags) => {
                state.add_history(HistoryEntry::failed(
                    Operation::Import,
                    &address,
                    &diags.to_string(),
                ));
                Err(diags.into())
            }
        }
    }

    /// Re-reads every recorded planet and stores the server's values.
    pub async fn refresh(&self, state: &mut ProviderState) -> Vec<RefreshResult> {
        let recorded: Vec<(String, PlanetResourceModel)> = state
            .resources
            .iter()
            .map(|(label, r)| (label.clone(), r.attributes.clone()))
            .collect();

        let mut results = Vec::with_capacity(recorded.len());
        for (label, prior) in recorded {
            let address = resource_address(&label);
            match self.resource.read(&prior).await {
                Ok(fresh) => {
                    let drifted = fresh != prior;
                    if drifted {
                        info!("{address} changed outside the manifest");
                    }
                    state.set(&label, fresh);
                    state.add_history(HistoryEntry::new(Operation::Refresh, &address));
                    results.push(RefreshResult {
                        address,
                        drifted,
                        error: None,
                    });
                }
                Err(diags) => {
                    error!("Failed to refresh {address}: {diags}");
                    let message = diags.to_string();
                    state.add_history(HistoryEntry::failed(Operation::Refresh, &address, &message));
                    results.push(RefreshResult {
                        address,
                        drifted: false,
                        error: Some(message),
                    });
                }
            }
        }
        results
    }

    async fn execute_action(
        &self,
        action: &PlannedAction,
        state: &mut ProviderState,
    ) -> ActionResult {
        let (operation, outcome) = match action.action_type {
            ActionType::Create => (Operation::Create, self.execute_create(action, state).await),
            ActionType::Update => (Operation::Update, self.execute_update(action, state).await),
            ActionType::Replace => (Operation::Replace, self.execute_replace(action, state).await),
            ActionType::Delete => (Operation::Delete, self.execute_delete(action, state).await),
            ActionType::NoOp => {
                return ActionResult {
                    action: action.clone(),
                    success: true,
                    id: action.prior.as_ref().and_then(|p| p.id.clone()),
                    error: None,
                };
            }
        };

        match outcome {
            Ok(id) => {
                state.add_history(HistoryEntry::new(operation, &action.address));
                ActionResult {
                    action: action.clone(),
                    success: true,
                    id,
                    error: None,
                }
            }
            Err(diags) => {
                error!("Failed to {} {}: {diags}", action.action_type, action.address);
                let message = diags.to_string();
                state.add_history(HistoryEntry::failed(operation, &action.address, &message));
                ActionResult {
                    action: action.clone(),
                    success: false,
                    id: state
                        .get(&action.label)
                        .and_then(|r| r.attributes.known_id())
                        .map(str::to_string),
                    error: Some(message),
                }
            }
        }
    }

    async fn execute_create(
        &self,
        action: &PlannedAction,
        state: &mut ProviderState,
    ) -> std::result::Result<Option<String>, Diagnostics> {
        let desired = Self::desired(action)?;
        let created = self.resource.create(desired).await?;
        let id = created.known_id().map(str::to_string);
        state.set(&action.label, created.clone());

        self.verify_write(&action.label, &created, state).await?;
        Ok(id)
    }

    async fn execute_update(
        &self,
        action: &PlannedAction,
        state: &mut ProviderState,
    ) -> std::result::Result<Option<String>, Diagnostics> {
        let desired = Self::desired(action)?;
        let prior = action.prior.clone().unwrap_or_default();
        let updated = self.resource.update(desired, &prior).await?;
        let id = updated.known_id().map(str::to_string);
        state.set(&action.label, updated.clone());

        self.verify_write(&action.label, &updated, state).await?;
        Ok(id)
    }

    async fn execute_replace(
        &self,
        action: &PlannedAction,
        state: &mut ProviderState,
    ) -> std::result::Result<Option<String>, Diagnostics> {
        if let Some(prior) = &action.prior {
            self.resource.delete(prior).await?;
            state.remove(&action.label);
        }
        self.execute_create(action, state).await
    }

    async fn execute_delete(
        &self,
        action: &PlannedAction,
        state: &mut ProviderState,
    ) -> std::result::Result<Option<String>, Diagnostics> {
        let prior = action.prior.clone().unwrap_or_default();
        self.resource.delete(&prior).await?;
        state.remove(&action.label);
        Ok(prior.id)
    }

    /// Reads the planet back and records what the server holds.
    async fn verify_write(
        &self,
        label: &str,
        written: &PlanetResourceModel,
        state: &mut ProviderState,
    ) -> std::result::Result<(), Diagnostics> {
        if !self.verify {
            return Ok(());
        }

        let read = self.resource.read(written).await?;
        if &read != written {
            warn!("{} reads back differently than written", resource_address(label));
        }
        state.set(label, read);
        Ok(())
    }

    fn desired(action: &PlannedAction) -> std::result::Result<&PlanetResourceModel, Diagnostics> {
        action.desired.as_ref().ok_or_else(|| {
            Diagnostic::error(
                "Missing planned state",
                format!("No desired state was planned for {}", action.address),
            )
            .into()
        })
    }
}

impl ExecutionResult {
    /// Returns true if all actions succeeded and none were skipped.
    #[must_use]
    pub const fn all_successful(&self) -> bool {
        self.success && self.skipped == 0
    }
}

impl std::fmt::Display for ExecutionResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Apply complete: {} succeeded, {} failed, {} skipped",
            self.successful, self.failed, self.skipped
        )
    }
}
