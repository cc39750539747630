//! shift-verify - planned vs. actual attendance reconciliation.

use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde::de::DeserializeOwned;
use shift_verify as app;

use app::config::{AppConfig, ConfigLoadResult};
use app::export;
use app::models::{AttendanceDataset, PlanSnapshot, Registry};
use app::plan::assign_home_lines;
use app::reconcile::DepartmentIndex;
use app::worker::{ComputeWorker, Job, JobOutput, import_with_timeout};

/// Reconcile shift plans with badge-system attendance.
#[derive(Parser)]
#[command(name = "shift-verify")]
struct Cli {
    /// Use config.toml from current directory (dev mode)
    #[arg(long)]
    dev: bool,

    /// Explicit config file path
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

/// Common inputs of the reconciliation commands.
#[derive(clap::Args)]
struct Inputs {
    /// Plan snapshot (JSON)
    #[arg(long)]
    plan: Option<PathBuf>,

    /// Worker registry (JSON array)
    #[arg(long)]
    registry: Option<PathBuf>,

    /// Badge export (CSV)
    #[arg(long)]
    badges: PathBuf,

    /// Name → department map (JSON object)
    #[arg(long)]
    departments: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Verify one date of the plan against badge data
    Verify {
        /// Date as DD.MM.YYYY
        #[arg(long)]
        date: String,
        #[command(flatten)]
        inputs: Inputs,
        /// Write an Excel workbook (file or directory) instead of JSON
        #[arg(long)]
        xlsx: Option<PathBuf>,
    },
    /// Summarize every employee across the schedule
    Employees {
        #[command(flatten)]
        inputs: Inputs,
        /// Write an Excel workbook (file or directory) instead of JSON
        #[arg(long)]
        xlsx: Option<PathBuf>,
    },
    /// Compare the master plan with the operational plan
    Diff {
        #[arg(long)]
        master: PathBuf,
        #[arg(long)]
        operational: PathBuf,
        /// Worker registry (JSON array)
        #[arg(long)]
        registry: Option<PathBuf>,
        /// Write an Excel workbook (file or directory) instead of JSON
        #[arg(long)]
        xlsx: Option<PathBuf>,
    },
    /// Import a badge export and print the attendance records
    Import {
        /// Badge export (CSV)
        #[arg(long)]
        badges: PathBuf,
        /// Worker registry used to resolve names (JSON array)
        #[arg(long)]
        registry: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Determine config path based on mode
    let config_path = match (&cli.config, cli.dev) {
        (Some(path), _) => path.clone(),
        (None, true) => PathBuf::from("config.toml"),
        (None, false) => AppConfig::default_path(),
    };
    let (config, config_error) = match AppConfig::try_load(&config_path) {
        ConfigLoadResult::Loaded(config) => (config, None),
        ConfigLoadResult::Missing => (AppConfig::default(), None),
        ConfigLoadResult::Invalid(e) => (AppConfig::default(), Some(e)),
    };

    let _log_guard = app::logging::init(&config.logging);
    tracing::info!("shift-verify starting, config path: {:?}", config_path);
    if let Some(e) = config_error {
        tracing::warn!("Config invalid, using defaults: {}", e);
    }

    let rt = tokio::runtime::Runtime::new().context("Failed to create tokio runtime")?;
    rt.block_on(run(cli.command, config))
}

async fn run(command: Command, config: AppConfig) -> anyhow::Result<()> {
    let mut worker = ComputeWorker::spawn();

    match command {
        Command::Verify { date, inputs, xlsx } => {
            if app::time::parse_date(&date).is_none() {
                bail!("Date must be DD.MM.YYYY, got {date:?}");
            }
            let loaded = load_inputs(&inputs, &config).await?;
            worker.submit(Job::Verify {
                date: date.clone(),
                plan: loaded.plan,
                attendance: loaded.attendance,
                registry: loaded.registry,
                departments: loaded.departments,
            })?;
            let JobOutput::Verification(records) = worker.latest().await? else {
                bail!("Unexpected verification output");
            };
            tracing::info!("{}: {} verification records", date, records.len());
            match xlsx {
                Some(path) => {
                    let path = export_path(path, "verify");
                    export::export_verification_to_excel(&date, &records, &path)
                        .with_context(|| format!("Failed to write {path:?}"))?;
                }
                None => print_json(&records, &config)?,
            }
        }
        Command::Employees { inputs, xlsx } => {
            let loaded = load_inputs(&inputs, &config).await?;
            worker.submit(Job::Employees {
                plan: loaded.plan,
                attendance: loaded.attendance,
                registry: loaded.registry,
                departments: loaded.departments,
            })?;
            let JobOutput::Employees(summaries) = worker.latest().await? else {
                bail!("Unexpected employees output");
            };
            tracing::info!("{} employee summaries", summaries.len());
            match xlsx {
                Some(path) => {
                    let path = export_path(path, "employees");
                    export::export_employees_to_excel(&summaries, &path)
                        .with_context(|| format!("Failed to write {path:?}"))?;
                }
                None => print_json(&summaries, &config)?,
            }
        }
        Command::Diff {
            master,
            operational,
            registry,
            xlsx,
        } => {
            let registry = load_registry(registry.as_deref())?;
            worker.submit(Job::Diff {
                master: read_json(&master)?,
                operational: read_json(&operational)?,
                registry,
            })?;
            let JobOutput::Diff(entries) = worker.latest().await? else {
                bail!("Unexpected diff output");
            };
            tracing::info!("{} plan differences", entries.len());
            match xlsx {
                Some(path) => {
                    let path = export_path(path, "diff");
                    export::export_diff_to_excel(&entries, &path).with_context(|| format!("Failed to write {path:?}"))?;
                }
                None => print_json(&entries, &config)?,
            }
        }
        Command::Import { badges, registry } => {
            let registry = load_registry(registry.as_deref())?;
            let attendance = import_attendance(&badges, &registry, &config).await?;
            print_json(&attendance, &config)?;
        }
    }

    worker.shutdown().await;
    Ok(())
}

/// Everything a reconciliation job needs.
struct LoadedInputs {
    plan: Option<PlanSnapshot>,
    registry: Registry,
    attendance: AttendanceDataset,
    departments: DepartmentIndex,
}

async fn load_inputs(inputs: &Inputs, config: &AppConfig) -> anyhow::Result<LoadedInputs> {
    let plan: Option<PlanSnapshot> = inputs.plan.as_deref().map(read_json).transpose()?;
    let mut registry = load_registry(inputs.registry.as_deref())?;
    if let Some(plan) = &plan {
        assign_home_lines(&mut registry, plan);
    }
    let departments = match inputs.departments.as_deref() {
        Some(path) => read_json(path)?,
        None => DepartmentIndex::new(),
    };
    let attendance = import_attendance(&inputs.badges, &registry, config).await?;
    Ok(LoadedInputs {
        plan,
        registry,
        attendance,
        departments,
    })
}

async fn import_attendance(path: &Path, registry: &Registry, config: &AppConfig) -> anyhow::Result<AttendanceDataset> {
    let export = import_with_timeout(
        path.to_path_buf(),
        config.import.skip_value.clone(),
        config.import.timeout(),
    )
    .await
    .with_context(|| format!("Failed to import badge export {path:?}"))?;
    let attendance = export.into_dataset(registry);
    tracing::info!(
        "Attendance: {} records over {} dates",
        attendance.len(),
        attendance.dates().len()
    );
    Ok(attendance)
}

/// A directory gets a timestamped workbook name.
fn export_path(path: PathBuf, prefix: &str) -> PathBuf {
    if path.is_dir() {
        path.join(export::generate_export_filename(prefix))
    } else {
        path
    }
}

fn load_registry(path: Option<&Path>) -> anyhow::Result<Registry> {
    match path {
        Some(path) => read_json(path),
        None => Ok(Registry::new()),
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let content = std::fs::read_to_string(path).with_context(|| format!("Failed to read {path:?}"))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {path:?}"))
}

fn print_json<T: Serialize + ?Sized>(value: &T, config: &AppConfig) -> anyhow::Result<()> {
    let text = if config.output.pretty_json {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{text}");
    Ok(())
}
