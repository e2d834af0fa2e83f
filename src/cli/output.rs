//! Output formatting for CLI commands.
//!
//! Every formatter returns a string; the binary decides where it goes.

use colored::Colorize;
use serde::Serialize;
use std::fmt::Write;
use tabled::{Table, Tabled};

use crate::config::{Manifest, ValidationResult};
use crate::planner::{ActionType, ExecutionResult, Plan, PlannedAction, RefreshResult};
use crate::provider::{Diagnostics, PlanetDataSourceModel, PlanetResourceModel, ProviderSchema, Schema, Severity};
use crate::state::{data_address, LockInfo, ProviderState};

use super::commands::OutputFormat;

/// Output formatter for CLI.
#[derive(Debug)]
pub struct OutputFormatter {
    /// Output format.
    format: OutputFormat,
}

/// Outcome of one data source lookup.
#[derive(Debug, Clone, Serialize)]
pub struct LookupOutcome {
    /// Data source address.
    pub address: String,
    /// Looked-up planet, when the lookup succeeded.
    pub planet: Option<PlanetDataSourceModel>,
    /// Diagnostics, when it failed.
    pub error: Option<String>,
}

/// Plan action row for table display.
#[derive(Tabled)]
struct PlanActionRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Action")]
    action: String,
    #[tabled(rename = "Resource")]
    resource: String,
    #[tabled(rename = "Changes")]
    changes: String,
}

/// Planet row for table display.
#[derive(Tabled)]
struct PlanetRow {
    #[tabled(rename = "Address")]
    address: String,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Diameter")]
    diameter: String,
    #[tabled(rename = "Population")]
    population: String,
}

/// Attribute row for schema display.
#[derive(Tabled)]
struct AttributeRow {
    #[tabled(rename = "Attribute")]
    name: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Mode")]
    mode: String,
    #[tabled(rename = "Description")]
    description: String,
}

impl OutputFormatter {
    /// Creates a new output formatter.
    #[must_use]
    pub const fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Returns true when emitting JSON.
    #[must_use]
    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    /// Formats the outcome of manifest validation.
    #[must_use]
    pub fn format_validation(&self, manifest: &Manifest, result: &ValidationResult) -> String {
        if self.is_json() {
            return Self::json(&serde_json::json!({
                "valid": result.is_valid(),
                "planets": manifest.planets.len(),
                "lookups": manifest.data.len(),
                "errors": result.errors.iter().map(ToString::to_string).collect::<Vec<_>>(),
                "warnings": result.warnings,
            }));
        }

        let mut output = String::new();
        if result.is_valid() {
            let _ = writeln!(output, "{} Manifest is valid.", "✓".green());
        } else {
            let _ = writeln!(output, "{} Manifest is invalid:", "✗".red());
            for error in &result.errors {
                let _ = writeln!(output, "   - {error}");
            }
        }

        if !result.warnings.is_empty() {
            let _ = writeln!(output, "\n{} Warnings:", "⚠".yellow());
            for warning in &result.warnings {
                let _ = writeln!(output, "   - {warning}");
            }
        }

        let _ = writeln!(output, "\nManifest summary:");
        let _ = writeln!(output, "   Planets: {}", manifest.planets.len());
        let _ = writeln!(output, "   Lookups: {}", manifest.data.len());
        output
    }

    /// Formats every schema the provider exposes.
    #[must_use]
    pub fn format_schema(&self, schema: &ProviderSchema) -> String {
        if self.is_json() {
            return Self::json(schema);
        }

        let mut output = String::new();
        Self::write_schema(&mut output, "provider", &schema.provider);
        for (name, resource) in &schema.resources {
            Self::write_schema(&mut output, &format!("resource {name}"), resource);
        }
        for (name, data_source) in &schema.data_sources {
            Self::write_schema(&mut output, &format!("data source {name}"), data_source);
        }
        output
    }

    fn write_schema(output: &mut String, title: &str, schema: &Schema) {
        let _ = writeln!(output, "\n{} - {}", title.bold(), schema.description);

        let rows: Vec<AttributeRow> = schema
            .attributes
            .iter()
            .map(|(name, attribute)| {
                let mut mode = Vec::new();
                if attribute.required {
                    mode.push(String::from("required"));
                }
                if attribute.optional {
                    mode.push(String::from("optional"));
                }
                if attribute.computed {
                    mode.push(String::from("computed"));
                }
                if attribute.sensitive {
                    mode.push(String::from("sensitive"));
                }
                mode.extend(attribute.plan_modifiers.iter().map(|m| format!("{m:?}")));

                AttributeRow {
                    name: (*name).to_string(),
                    kind: format!("{:?}", attribute.kind).to_lowercase(),
                    mode: mode.join(", "),
                    description: attribute.description.to_string(),
                }
            })
            .collect();

        output.push_str(&Table::new(rows).to_string());
        output.push('\n');
    }

    /// Formats a plan for display.
    #[must_use]
    pub fn format_plan(&self, plan: &Plan) -> String {
        match self.format {
            OutputFormat::Json => Self::json(plan),
            OutputFormat::Text => Self::format_plan_text(plan),
        }
    }

    fn format_plan_text(plan: &Plan) -> String {
        if plan.is_empty() {
            return format!(
                "{} No changes. Planets match the manifest.\n",
                "✓".green()
            );
        }

        let rows: Vec<PlanActionRow> = plan
            .changes()
            .enumerate()
            .map(|(i, a)| PlanActionRow {
                index: i + 1,
                action: Self::format_action_type(a.action_type),
                resource: a.address.clone(),
                changes: Self::describe_changes(a),
            })
            .collect();

        let mut output = String::from("\nPlan\n\n");
        output.push_str(&Table::new(rows).to_string());
        output.push('\n');

        let _ = write!(
            output,
            "\nPlan: {} to add, {} to change, {} to replace, {} to destroy.\n",
            plan.count(ActionType::Create).to_string().green(),
            plan.count(ActionType::Update).to_string().yellow(),
            plan.count(ActionType::Replace).to_string().yellow(),
            plan.count(ActionType::Delete).to_string().red()
        );
        output
    }

    fn describe_changes(action: &PlannedAction) -> String {
        if action.changed_attributes.is_empty() {
            return action.reason.clone();
        }

        action
            .changed_attributes
            .iter()
            .map(|d| {
                let marker = if d.forces_replacement { " (forces replacement)" } else { "" };
                format!(
                    "{}: {} -> {}{marker}",
                    d.field,
                    d.old_value.as_deref().unwrap_or("null"),
                    d.new_value.as_deref().unwrap_or("null")
                )
            })
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// Formats the result of an apply or destroy.
    #[must_use]
    pub fn format_execution(&self, result: &ExecutionResult) -> String {
        if self.is_json() {
            return Self::json(result);
        }

        let mut output = String::new();
        for action in &result.results {
            if action.success {
                let id = action.id.as_deref().map(|id| format!(" [id={id}]")).unwrap_or_default();
                let _ = writeln!(output, "{} {}: {} complete{id}", "✓".green(), action.action.address, action.action.action_type);
            } else {
                let _ = writeln!(
                    output,
                    "{} {}: {} failed\n   {}",
                    "✗".red(),
                    action.action.address,
                    action.action.action_type,
                    action.error.as_deref().unwrap_or("unknown error").replace('\n', "\n   ")
                );
            }
        }

        let summary = result.to_string();
        let summary = if result.success {
            summary.as_str().green()
        } else {
            summary.as_str().red()
        };
        let _ = writeln!(output, "\n{summary}");
        output
    }

    /// Formats refresh outcomes.
    #[must_use]
    pub fn format_refresh(&self, results: &[RefreshResult]) -> String {
        if self.is_json() {
            return Self::json(&results);
        }
        if results.is_empty() {
            return String::from("Nothing to refresh.\n");
        }

        let mut output = String::new();
        for result in results {
            match &result.error {
                None if result.drifted => {
                    let _ = writeln!(output, "{} {}: changed outside the manifest", "⚠".yellow(), result.address);
                }
                None => {
                    let _ = writeln!(output, "{} {}: up to date", "✓".green(), result.address);
                }
                Some(error) => {
                    let _ = writeln!(output, "{} {}: {error}", "✗".red(), result.address);
                }
            }
        }
        output
    }

    /// Formats an imported planet.
    #[must_use]
    pub fn format_import(&self, address: &str, model: &PlanetResourceModel) -> String {
        if self.is_json() {
            return Self::json(&serde_json::json!({ "address": address, "attributes": model }));
        }

        let mut output = format!("{} Imported {address}\n", "✓".green());
        output.push_str(&Table::new([Self::planet_row(address, model)]).to_string());
        output.push('\n');
        output
    }

    /// Formats data source lookups.
    #[must_use]
    pub fn format_data(&self, lookups: &[LookupOutcome]) -> String {
        if self.is_json() {
            return Self::json(&lookups);
        }
        if lookups.is_empty() {
            return String::from("No lookups defined.\n");
        }

        let rows: Vec<PlanetRow> = lookups
            .iter()
            .filter_map(|l| {
                l.planet.as_ref().map(|p| PlanetRow {
                    address: l.address.clone(),
                    id: p.id.clone().unwrap_or_default(),
                    name: p.name.clone(),
                    diameter: Self::number(p.diameter),
                    population: Self::number(p.population),
                })
            })
            .collect();

        let mut output = String::new();
        if !rows.is_empty() {
            output.push_str(&Table::new(rows).to_string());
            output.push('\n');
        }
        for failed in lookups.iter().filter(|l| l.error.is_some()) {
            let _ = writeln!(
                output,
                "{} {}: {}",
                "✗".red(),
                failed.address,
                failed.error.as_deref().unwrap_or_default()
            );
        }
        output
    }

    /// Formats recorded state.
    #[must_use]
    pub fn format_state(&self, state: &ProviderState, lock: Option<&LockInfo>) -> String {
        if self.is_json() {
            return Self::json(&serde_json::json!({ "state": state, "lock": lock }));
        }

        let mut output = String::new();
        let _ = writeln!(output, "\nState (version {})", state.version);
        let _ = writeln!(output, "   Last updated: {}", state.last_updated);
        if let Some(lock) = lock.filter(|l| !l.is_expired()) {
            let _ = writeln!(
                output,
                "   Locked by {} for {} ({}s left, id {})",
                lock.holder,
                if lock.operation.is_empty() { "unknown" } else { lock.operation.as_str() },
                lock.remaining_secs(),
                lock.lock_id
            );
        }

        if state.is_empty() {
            output.push_str("\n   No managed planets.\n");
        } else {
            let rows: Vec<PlanetRow> = state
                .resources
                .values()
                .map(|r| Self::planet_row(&r.address, &r.attributes))
                .collect();
            output.push('\n');
            output.push_str(&Table::new(rows).to_string());
            output.push('\n');
        }

        if !state.history.is_empty() {
            let _ = writeln!(output, "\n   Recent history ({}):", state.history.len());
            for entry in state.history.iter().rev().take(5) {
                let status = if entry.success { "✓".green() } else { "✗".red() };
                let _ = writeln!(
                    output,
                    "     {status} {} - {} {}",
                    entry.timestamp.format("%Y-%m-%d %H:%M"),
                    entry.operation,
                    entry.address
                );
            }
        }

        output
    }

    /// Formats the list of managed addresses.
    #[must_use]
    pub fn format_state_list(&self, state: &ProviderState) -> String {
        let addresses: Vec<&str> = state.resources.values().map(|r| r.address.as_str()).collect();
        if self.is_json() {
            return Self::json(&addresses);
        }

        addresses.iter().fold(String::new(), |mut output, address| {
            let _ = writeln!(output, "{address}");
            output
        })
    }

    /// Formats provider diagnostics.
    #[must_use]
    pub fn format_diagnostics(&self, diagnostics: &Diagnostics) -> String {
        if self.is_json() {
            return Self::json(diagnostics);
        }

        diagnostics.iter().fold(String::new(), |mut output, d| {
            let marker = match d.severity {
                Severity::Error => "✗".red(),
                Severity::Warning => "⚠".yellow(),
            };
            let _ = writeln!(output, "{marker} {d}");
            output
        })
    }

    /// Formats a success message.
    #[must_use]
    pub fn success(&self, message: &str) -> String {
        self.message("success", "✓".green().to_string(), message)
    }

    /// Formats an error message.
    #[must_use]
    pub fn error(&self, message: &str) -> String {
        self.message("error", "✗".red().to_string(), message)
    }

    /// Formats a warning message.
    #[must_use]
    pub fn warning(&self, message: &str) -> String {
        self.message("warning", "⚠".yellow().to_string(), message)
    }

    fn message(&self, status: &str, marker: String, message: &str) -> String {
        if self.is_json() {
            Self::json(&serde_json::json!({ "status": status, "message": message }))
        } else {
            format!("{marker} {message}")
        }
    }

    /// Builds a lookup outcome for `label`.
    #[must_use]
    pub fn lookup_outcome(
        label: &str,
        result: std::result::Result<PlanetDataSourceModel, Diagnostics>,
    ) -> LookupOutcome {
        let address = data_address(label);
        match result {
            Ok(planet) => LookupOutcome {
                address,
                planet: Some(planet),
                error: None,
            },
            Err(diags) => LookupOutcome {
                address,
                planet: None,
                error: Some(diags.to_string()),
            },
        }
    }

    fn planet_row(address: &str, model: &PlanetResourceModel) -> PlanetRow {
        PlanetRow {
            address: address.to_string(),
            id: model.id.clone().unwrap_or_default(),
            name: model.name.clone(),
            diameter: Self::number(model.diameter),
            population: Self::number(model.population),
        }
    }

    fn number(value: Option<i64>) -> String {
        value.map_or_else(|| String::from("-"), |v| v.to_string())
    }

    /// Formats an action type with color.
    fn format_action_type(action_type: ActionType) -> String {
        match action_type {
            ActionType::Create => "+create".green().to_string(),
            ActionType::Update => "~update".yellow().to_string(),
            ActionType::Replace => "-/+replace".yellow().to_string(),
            ActionType::Delete => "-delete".red().to_string(),
            ActionType::NoOp => "no-op".dimmed().to_string(),
        }
    }

    fn json<T: Serialize + ?Sized>(value: &T) -> String {
        serde_json::to_string_pretty(value).unwrap_or_default()
    }
}
