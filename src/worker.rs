//! Off-thread computation with last-request-wins delivery.
//!
//! Every submitted job gets a new sequence number. Jobs run one after
//! another on the blocking pool and are never cancelled; a result is handed
//! back only if its sequence number is still the latest issued, so a slow
//! stale computation can't overwrite a newer one.

use std::path::PathBuf;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::aggregate::aggregate;
use crate::attendance::{BadgeExport, load_csv, scan_badge_grid};
use crate::error::{AppError, Result};
use crate::models::{AttendanceDataset, DiffEntry, EmployeeSummary, PlanSnapshot, Registry, VerificationRecord};
use crate::plan::diff_plans;
use crate::reconcile::{DepartmentIndex, verify_date};

/// A self-contained computation; the payload is owned, never shared.
#[derive(Debug, Clone)]
pub enum Job {
    Verify {
        date: String,
        plan: Option<PlanSnapshot>,
        attendance: AttendanceDataset,
        registry: Registry,
        departments: DepartmentIndex,
    },
    Employees {
        plan: Option<PlanSnapshot>,
        attendance: AttendanceDataset,
        registry: Registry,
        departments: DepartmentIndex,
    },
    Diff {
        master: PlanSnapshot,
        operational: PlanSnapshot,
        registry: Registry,
    },
}

/// Result of a job.
#[derive(Debug, Clone)]
pub enum JobOutput {
    Verification(Vec<VerificationRecord>),
    Employees(Vec<EmployeeSummary>),
    Diff(Vec<DiffEntry>),
}

impl Job {
    /// Run the job on the current thread.
    pub fn run(self) -> JobOutput {
        match self {
            Job::Verify {
                date,
                plan,
                attendance,
                registry,
                mut departments,
            } => JobOutput::Verification(verify_date(
                &date,
                plan.as_ref(),
                &attendance,
                &registry,
                &mut departments,
            )),
            Job::Employees {
                plan,
                attendance,
                registry,
                mut departments,
            } => JobOutput::Employees(aggregate(plan.as_ref(), &attendance, &registry, &mut departments)),
            Job::Diff {
                master,
                operational,
                registry,
            } => JobOutput::Diff(diff_plans(&master, &operational, &registry)),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Job::Verify { .. } => "verify",
            Job::Employees { .. } => "employees",
            Job::Diff { .. } => "diff",
        }
    }
}

struct Request {
    seq: u64,
    job: Job,
}

struct Response {
    seq: u64,
    output: std::result::Result<JobOutput, String>,
}

/// Handle to the background computation task.
pub struct ComputeWorker {
    tx: mpsc::UnboundedSender<Request>,
    rx: mpsc::UnboundedReceiver<Response>,
    latest: u64,
    /// Sequence number and output of the last result handed out.
    delivered: Option<(u64, Option<JobOutput>)>,
    handle: JoinHandle<()>,
}

impl ComputeWorker {
    /// Start the worker task. Must be called inside a Tokio runtime.
    pub fn spawn() -> Self {
        let (tx, requests) = mpsc::unbounded_channel();
        let (responses, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(run_worker(requests, responses));
        Self {
            tx,
            rx,
            latest: 0,
            delivered: None,
            handle,
        }
    }

    /// Queue a job and make it the latest request.
    pub fn submit(&mut self, job: Job) -> Result<u64> {
        self.latest += 1;
        debug!("Submitting {} job #{}", job.name(), self.latest);
        self.tx
            .send(Request { seq: self.latest, job })
            .map_err(|_| AppError::WorkerClosed)?;
        Ok(self.latest)
    }

    /// Sequence number of the latest request (0 before the first).
    pub fn latest_seq(&self) -> u64 {
        self.latest
    }

    fn accept(&mut self, response: Response) -> Option<Result<JobOutput>> {
        if response.seq != self.latest {
            debug!("Dropping stale result #{} (latest #{})", response.seq, self.latest);
            return None;
        }
        self.delivered = Some((response.seq, response.output.as_ref().ok().cloned()));
        Some(response.output.map_err(AppError::Computation))
    }

    /// Non-blocking check for the latest result; stale results are dropped.
    pub fn poll(&mut self) -> Option<Result<JobOutput>> {
        while let Ok(response) = self.rx.try_recv() {
            if let Some(result) = self.accept(response) {
                return Some(result);
            }
        }
        None
    }

    /// Wait for the result of the latest request.
    ///
    /// A result already handed out by `poll` is returned again; a failed
    /// one gives `NotFound`.
    pub async fn latest(&mut self) -> Result<JobOutput> {
        if self.latest == 0 {
            return Err(AppError::not_found("no computation requested"));
        }
        if let Some((seq, output)) = &self.delivered
            && *seq == self.latest
        {
            return output
                .clone()
                .ok_or_else(|| AppError::not_found(format!("job #{seq} failed and was already reported")));
        }
        loop {
            let response = self.rx.recv().await.ok_or(AppError::WorkerClosed)?;
            if let Some(result) = self.accept(response) {
                return result;
            }
        }
    }

    /// Stop accepting jobs and wait for the task to finish.
    pub async fn shutdown(self) {
        let Self { tx, handle, .. } = self;
        drop(tx);
        if let Err(e) = handle.await {
            error!("Computation worker ended abnormally: {}", e);
        }
    }
}

async fn run_worker(mut requests: mpsc::UnboundedReceiver<Request>, responses: mpsc::UnboundedSender<Response>) {
    while let Some(Request { seq, job }) = requests.recv().await {
        let name = job.name();
        let output = tokio::task::spawn_blocking(move || job.run())
            .await
            .map_err(|e| {
                error!("{} job #{} failed: {}", name, seq, e);
                e.to_string()
            });
        if responses.send(Response { seq, output }).is_err() {
            break;
        }
    }
    debug!("Computation worker stopped");
}

/// Load and scan a CSV badge export on the blocking pool under a time limit.
///
/// On expiry the parse is abandoned and `AppError::Timeout` returned.
pub async fn import_with_timeout(path: PathBuf, skip_value: String, timeout: Duration) -> Result<BadgeExport> {
    info!("Importing badge export {:?}", path);
    let task = tokio::task::spawn_blocking(move || {
        let grid = load_csv(&path)?;
        scan_badge_grid(&grid, &skip_value)
    });
    match tokio::time::timeout(timeout, task).await {
        Ok(joined) => joined.map_err(|e| AppError::Computation(e.to_string()))?,
        Err(_) => {
            warn!("Badge import timed out after {:?}", timeout);
            Err(AppError::Timeout(timeout.as_secs()))
        }
    }
}
