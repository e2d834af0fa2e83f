//! swapi CLI entrypoint.
//!
//! This is the main entrypoint for the swapi command-line tool.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use swapi_provider::cli::{Cli, Commands, LookupOutcome, OutputFormatter, StateCommands};
use swapi_provider::config::{
    find_config_file, ConfigParser, ConfigValidator, Manifest, ProviderConfig,
};
use swapi_provider::error::{ConfigError, PlanError, Result, StateError, SwapiError};
use swapi_provider::planner::{DiffEngine, Plan, PlanExecutor};
use swapi_provider::provider::{ProviderContext, SwapiProvider};
use swapi_provider::state::{
    generate_holder_id, label_from_address, resource_address, LocalStateStore, LockInfo,
    ProviderState, StateStore,
};

use clap::Parser;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// Main entrypoint.
fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Initializes the logging system.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Main async entry point.
async fn run(cli: Cli) -> Result<()> {
    let formatter = OutputFormatter::new(cli.output);

    match &cli.command {
        Commands::Validate => cmd_validate(&cli, &formatter),
        Commands::Schema => {
            cmd_schema(&formatter);
            Ok(())
        }
        Commands::Plan => cmd_plan(&cli, &formatter).await,
        Commands::Apply {
            yes,
            continue_on_error,
            no_verify,
        } => cmd_apply(&cli, *yes, *continue_on_error, *no_verify, &formatter).await,
        Commands::Refresh => cmd_refresh(&cli, &formatter).await,
        Commands::Destroy { yes } => cmd_destroy(&cli, *yes, &formatter).await,
        Commands::Import { label, id } => cmd_import(&cli, label, id, &formatter).await,
        Commands::Data { label } => cmd_data(&cli, label.as_deref(), &formatter).await,
        Commands::State { command } => cmd_state(&cli, command, &formatter).await,
    }
}

/// Validated manifest and the state store that goes with it.
struct Workspace {
    manifest: Manifest,
    store: LocalStateStore,
}

/// Validate the manifest.
fn cmd_validate(cli: &Cli, formatter: &OutputFormatter) -> Result<()> {
    let config_file = resolve_config_path(cli.config.as_ref())?;
    info!("Validating manifest: {}", config_file.display());

    let manifest = parse_manifest(&config_file)?;
    let validator = ConfigValidator::new();
    let result = validator.check(&manifest);

    println!("{}", formatter.format_validation(&manifest, &result));

    validator.validate(&manifest).map(|_| ())
}

/// Print schemas.
fn cmd_schema(formatter: &OutputFormatter) {
    let provider = SwapiProvider::new(env!("CARGO_PKG_VERSION"));
    println!("{}", formatter.format_schema(&provider.full_schema()));
}

/// Show what apply would change.
async fn cmd_plan(cli: &Cli, formatter: &OutputFormatter) -> Result<()> {
    let workspace = load_workspace(cli)?;
    let state = workspace.store.load_or_default().await?;

    let plan = build_plan(&workspace.manifest, &state);
    println!("{}", formatter.format_plan(&plan));

    Ok(())
}

/// Apply the plan.
async fn cmd_apply(
    cli: &Cli,
    auto_approve: bool,
    continue_on_error: bool,
    no_verify: bool,
    formatter: &OutputFormatter,
) -> Result<()> {
    let workspace = load_workspace(cli)?;
    let context = configure(cli, &workspace.manifest)?;

    let lock = lock_state(&workspace.store, "apply").await?;
    let outcome = apply_locked(
        &workspace,
        &context,
        auto_approve,
        continue_on_error,
        no_verify,
        formatter,
    )
    .await;
    release_state(&workspace.store, &lock).await;
    outcome
}

async fn apply_locked(
    workspace: &Workspace,
    context: &ProviderContext,
    auto_approve: bool,
    continue_on_error: bool,
    no_verify: bool,
    formatter: &OutputFormatter,
) -> Result<()> {
    let mut state = workspace.store.load_or_default().await?;
    let plan = build_plan(&workspace.manifest, &state);

    if plan.is_empty() {
        println!("{}", formatter.success("No changes to apply."));
        return Ok(());
    }

    println!("{}", formatter.format_plan(&plan));

    if !auto_approve && !confirm("Do you want to apply this plan? [y/N]: ", "y")? {
        eprintln!("Apply cancelled.");
        return Ok(());
    }

    let resource = context.planet_resource();
    let executor = PlanExecutor::new(&resource)
        .with_continue_on_error(continue_on_error)
        .with_verify(!no_verify);

    let result = executor.execute(&plan, &mut state).await;

    // Completed actions are kept even when the run failed.
    workspace.store.save(&state).await?;

    println!("{}", formatter.format_execution(&result));

    if result.success {
        Ok(())
    } else {
        Err(PlanError::Aborted {
            reason: format!("{} of {} actions failed", result.failed, result.results.len()),
        }
        .into())
    }
}

/// Re-read every managed planet.
async fn cmd_refresh(cli: &Cli, formatter: &OutputFormatter) -> Result<()> {
    let workspace = load_workspace(cli)?;
    let context = configure(cli, &workspace.manifest)?;

    let lock = lock_state(&workspace.store, "refresh").await?;
    let outcome = refresh_locked(&workspace, &context, formatter).await;
    release_state(&workspace.store, &lock).await;
    outcome
}

async fn refresh_locked(
    workspace: &Workspace,
    context: &ProviderContext,
    formatter: &OutputFormatter,
) -> Result<()> {
    let mut state = workspace.store.load_or_default().await?;
    let resource = context.planet_resource();

    let results = PlanExecutor::new(&resource).refresh(&mut state).await;
    workspace.store.save(&state).await?;

    println!("{}", formatter.format_refresh(&results));

    let failed = results.iter().filter(|r| r.error.is_some()).count();
    if failed == 0 {
        Ok(())
    } else {
        Err(SwapiError::internal(format!("{failed} planets could not be refreshed")))
    }
}

/// Delete every managed planet.
async fn cmd_destroy(cli: &Cli, auto_approve: bool, formatter: &OutputFormatter) -> Result<()> {
    let workspace = load_workspace(cli)?;
    let context = configure(cli, &workspace.manifest)?;

    let lock = lock_state(&workspace.store, "destroy").await?;
    let outcome = destroy_locked(&workspace, &context, auto_approve, formatter).await;
    release_state(&workspace.store, &lock).await;
    outcome
}

async fn destroy_locked(
    workspace: &Workspace,
    context: &ProviderContext,
    auto_approve: bool,
    formatter: &OutputFormatter,
) -> Result<()> {
    let mut state = workspace.store.load_or_default().await?;
    let plan = Plan::destroy(&state);

    if plan.is_empty() {
        println!("{}", formatter.success("No planets to destroy."));
        return Ok(());
    }

    println!("{}", formatter.format_plan(&plan));

    if !auto_approve
        && !confirm("\nThis action is IRREVERSIBLE. Type 'destroy' to confirm: ", "destroy")?
    {
        eprintln!("Destruction cancelled.");
        return Ok(());
    }

    let resource = context.planet_resource();
    let result = PlanExecutor::new(&resource)
        .with_continue_on_error(true)
        .execute(&plan, &mut state)
        .await;

    workspace.store.save(&state).await?;
    println!("{}", formatter.format_execution(&result));

    if result.success {
        Ok(())
    } else {
        Err(PlanError::Aborted {
            reason: format!("{} planets could not be destroyed", result.failed),
        }
        .into())
    }
}

/// Import an existing planet.
async fn cmd_import(cli: &Cli, label: &str, id: &str, formatter: &OutputFormatter) -> Result<()> {
    let workspace = load_workspace(cli)?;
    let context = configure(cli, &workspace.manifest)?;

    if !workspace.manifest.planets.contains_key(label) {
        warn!("{label} is not in the manifest; the next apply will delete it");
    }

    let lock = lock_state(&workspace.store, "import").await?;
    let outcome = import_locked(&workspace, &context, label, id, formatter).await;
    release_state(&workspace.store, &lock).await;
    outcome
}

async fn import_locked(
    workspace: &Workspace,
    context: &ProviderContext,
    label: &str,
    id: &str,
    formatter: &OutputFormatter,
) -> Result<()> {
    let mut state = workspace.store.load_or_default().await?;
    let resource = context.planet_resource();

    let imported = PlanExecutor::new(&resource).import(label, id, &mut state).await;
    // The failed attempt is recorded in history as well.
    workspace.store.save(&state).await?;

    let model = imported?;
    println!("{}", formatter.format_import(&resource_address(label), &model));
    Ok(())
}

/// Evaluate planet lookups.
async fn cmd_data(cli: &Cli, only: Option<&str>, formatter: &OutputFormatter) -> Result<()> {
    let workspace = load_workspace(cli)?;

    if let Some(label) = only
        && !workspace.manifest.data.contains_key(label)
    {
        return Err(ConfigError::validation(format!("No lookup named '{label}'"), "data").into());
    }

    let context = configure(cli, &workspace.manifest)?;
    let data_source = context.planet_data_source();

    let mut outcomes: Vec<LookupOutcome> = Vec::new();
    for (label, lookup) in &workspace.manifest.data {
        if only.is_some_and(|o| o != label) {
            continue;
        }
        let result = data_source.read(&lookup.to_model()).await;
        outcomes.push(OutputFormatter::lookup_outcome(label, result));
    }

    println!("{}", formatter.format_data(&outcomes));

    let failed = outcomes.iter().filter(|o| o.error.is_some()).count();
    if failed == 0 {
        Ok(())
    } else {
        Err(SwapiError::internal(format!("{failed} lookups failed")))
    }
}

/// State management commands.
async fn cmd_state(cli: &Cli, command: &StateCommands, formatter: &OutputFormatter) -> Result<()> {
    let store = state_store(cli)?;

    match command {
        StateCommands::Show => {
            let lock = store.get_lock_info().await?;
            if let Some(state) = store.load().await? {
                println!("{}", formatter.format_state(&state, lock.as_ref()));
            } else {
                println!("{}", formatter.warning("No state found."));
            }
        }
        StateCommands::List => {
            let state = store.load_or_default().await?;
            print!("{}", formatter.format_state_list(&state));
        }
        StateCommands::Rm { address } => {
            let lock = lock_state(&store, "state rm").await?;
            let outcome = remove_from_state(&store, address, formatter).await;
            release_state(&store, &lock).await;
            outcome?;
        }
        StateCommands::Unlock { lock_id, force } => {
            if *force {
                if let Some(lock_info) = store.get_lock_info().await? {
                    store.release_lock(&lock_info.lock_id).await?;
                    println!("{}", formatter.success("State forcefully unlocked."));
                } else {
                    println!("{}", formatter.warning("State is not locked."));
                }
            } else if let Some(id) = lock_id {
                store.release_lock(id).await?;
                println!("{}", formatter.success("State unlocked."));
            } else {
                return Err(ConfigError::validation(
                    "Please provide --lock-id or use --force",
                    "lock_id",
                )
                .into());
            }
        }
    }

    Ok(())
}

/// Forgets a resource without touching the planet.
async fn remove_from_state(
    store: &LocalStateStore,
    address: &str,
    formatter: &OutputFormatter,
) -> Result<()> {
    let mut state = store.load_or_default().await?;
    let label = label_from_address(address);
    let removed = state.remove(label).ok_or_else(|| StateError::ResourceNotFound {
        address: resource_address(label),
    })?;
    store.save(&state).await?;

    println!(
        "{}",
        formatter.success(&format!(
            "Removed {} from state; the planet itself was not deleted.",
            removed.address
        ))
    );
    Ok(())
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Resolves the manifest path.
fn resolve_config_path(config_path: Option<&PathBuf>) -> Result<PathBuf> {
    config_path.map_or_else(|| find_config_file("."), |path| Ok(path.clone()))
}

/// Directory holding the manifest.
fn manifest_dir(config_file: &Path) -> &Path {
    config_file.parent().unwrap_or_else(|| Path::new("."))
}

/// Loads `.env` beside the manifest, then parses the manifest.
fn parse_manifest(config_file: &Path) -> Result<Manifest> {
    let parser = ConfigParser::new().with_base_path(manifest_dir(config_file));
    parser.load_dotenv()?;
    parser.load_file(config_file)
}

/// Loads and validates the manifest and opens the state store.
fn load_workspace(cli: &Cli) -> Result<Workspace> {
    let config_file = resolve_config_path(cli.config.as_ref())?;
    debug!("Loading manifest from: {}", config_file.display());

    let manifest = parse_manifest(&config_file)?;

    let result = ConfigValidator::new().validate(&manifest)?;
    for warning in &result.warnings {
        warn!("{warning}");
    }

    let store = cli.state_dir.as_ref().map_or_else(
        || LocalStateStore::beside(manifest_dir(&config_file)),
        |dir| LocalStateStore::with_base_dir(dir),
    );

    Ok(Workspace { manifest, store })
}

/// Opens the state store without requiring a valid manifest.
fn state_store(cli: &Cli) -> Result<LocalStateStore> {
    if let Some(dir) = &cli.state_dir {
        return Ok(LocalStateStore::with_base_dir(dir));
    }
    let config_file = resolve_config_path(cli.config.as_ref())?;
    Ok(LocalStateStore::beside(manifest_dir(&config_file)))
}

/// Configures the provider; CLI flags win over the manifest.
fn configure(cli: &Cli, manifest: &Manifest) -> Result<ProviderContext> {
    let config = manifest.provider.clone().overridden_by(ProviderConfig {
        endpoint: cli.endpoint.clone(),
        api_key: cli.api_key.clone(),
    });

    let provider = SwapiProvider::new(env!("CARGO_PKG_VERSION"));
    Ok(provider.configure(&config)?)
}

/// Builds a plan from the manifest and recorded state.
fn build_plan(manifest: &Manifest, state: &ProviderState) -> Plan {
    let diff = DiffEngine::new().compute_diff(manifest, state);
    Plan::from_diff(&diff, manifest, state)
}

/// Takes the state lock for `operation`.
async fn lock_state(store: &LocalStateStore, operation: &str) -> Result<LockInfo> {
    store.acquire_lock(&generate_holder_id(), operation).await
}

/// Releases the state lock, logging failures.
async fn release_state(store: &LocalStateStore, lock: &LockInfo) {
    if let Err(e) = store.release_lock(&lock.lock_id).await {
        warn!("Failed to release state lock {}: {e}", lock.lock_id);
    }
}

/// Asks for confirmation on stderr.
fn confirm(prompt: &str, expected: &str) -> Result<bool> {
    eprint!("{prompt}");
    std::io::stderr().flush()?;

    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;

    Ok(input.trim().eq_ignore_ascii_case(expected))
}
