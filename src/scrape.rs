//! Two-stage scrape: list every bus, then fetch each one's full record.
//!
//! Fetching is strictly sequential with a pause between successful requests.
//! A failed bus is logged and skipped; only a failed bus list aborts the run.
//! A shutdown signal stops the loop between (or during) requests and hands
//! back everything collected so far.

use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::config::ScrapeConfig;
use crate::error::{FetchError, PersistError};
use crate::model::{EntityStub, ResultCollection};
use crate::services::bus_api::BusApi;
use crate::stats::{RunOutcome, RunStats};
use crate::{output, persist, validate};

/// A bus whose detail fetch failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityFailure {
    pub id: i64,
    pub label: String,
    pub message: String,
}

/// Everything a run produced, complete or not.
#[derive(Debug, Default)]
pub struct ScrapeReport {
    /// Fetched records in listing order.
    pub collection: ResultCollection,
    /// Number of buses in the list.
    pub listed: usize,
    pub failures: Vec<EntityFailure>,
    /// Validation warnings across all fetched records.
    pub warnings: usize,
    /// Records that went through validation.
    pub validated: usize,
}

impl ScrapeReport {
    fn new(listed: usize) -> Self {
        Self {
            collection: Vec::with_capacity(listed),
            listed,
            ..Default::default()
        }
    }

    pub fn succeeded(&self) -> usize {
        self.collection.len()
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }
}

#[derive(Debug)]
pub enum ScrapeOutcome {
    /// The bus list was empty; nothing was fetched.
    NothingToDo,
    /// Every listed bus was attempted.
    Completed(ScrapeReport),
    /// Shutdown was requested before all buses were attempted.
    Interrupted(ScrapeReport),
}

impl ScrapeOutcome {
    pub fn report(&self) -> Option<&ScrapeReport> {
        match self {
            ScrapeOutcome::NothingToDo => None,
            ScrapeOutcome::Completed(report) | ScrapeOutcome::Interrupted(report) => Some(report),
        }
    }

    pub fn into_collection(self) -> ResultCollection {
        match self {
            ScrapeOutcome::NothingToDo => Vec::new(),
            ScrapeOutcome::Completed(report) | ScrapeOutcome::Interrupted(report) => {
                report.collection
            }
        }
    }
}

/// Drives a [`BusApi`] through both stages.
pub struct Scraper<'a, A: ?Sized> {
    api: &'a A,
}

impl<'a, A: BusApi + ?Sized> Scraper<'a, A> {
    pub fn new(api: &'a A) -> Self {
        Self { api }
    }

    /// Stage one only.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::List`] when the bus list cannot be fetched.
    pub async fn list_only(&self) -> Result<Vec<EntityStub>, FetchError> {
        self.api.list_entities().await
    }

    /// Runs the full pipeline.
    ///
    /// `pacing_delay` is slept after every successful fetch except the last
    /// listed bus. `shutdown` flipping to `true` ends the run with
    /// [`ScrapeOutcome::Interrupted`]; a detail request in flight at that
    /// moment is abandoned.
    ///
    /// # Errors
    ///
    /// Only a failed bus list is an error. Per-bus failures end up in
    /// [`ScrapeReport::failures`].
    pub async fn run_pipeline(
        &self,
        pacing_delay: Duration,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<ScrapeOutcome, FetchError> {
        if *shutdown.borrow() {
            warn!("Shutdown requested before the bus list was fetched");
            return Ok(ScrapeOutcome::Interrupted(ScrapeReport::default()));
        }

        info!("Stage 1: fetching bus list");
        let stubs = tokio::select! {
            biased;
            () = shutdown_requested(&mut shutdown) => {
                warn!("Shutdown requested while fetching the bus list");
                return Ok(ScrapeOutcome::Interrupted(ScrapeReport::default()));
            }
            stubs = self.api.list_entities() => stubs?,
        };

        if stubs.is_empty() {
            warn!("Bus list is empty, nothing to do");
            return Ok(ScrapeOutcome::NothingToDo);
        }

        let total = stubs.len();
        info!(total, "Stage 2: fetching detailed data");
        let mut report = ScrapeReport::new(total);

        for (idx, stub) in stubs.iter().enumerate() {
            if *shutdown.borrow() {
                return Ok(interrupted(report));
            }

            let position = idx + 1;
            let fetched = tokio::select! {
                biased;
                () = shutdown_requested(&mut shutdown) => return Ok(interrupted(report)),
                fetched = self.api.get_detail(stub.id) => fetched,
            };

            match fetched {
                Ok(detail) => {
                    info!(position, total, id = stub.id, label = %stub.label, "Bus fetched");

                    let warnings = validate::check(&detail, stub.id, &stub.label);
                    for warning in &warnings {
                        warn!(id = stub.id, label = %stub.label, %warning, "Bus data incomplete");
                    }
                    report.validated += 1;
                    report.warnings += warnings.len();
                    report.collection.push(detail);

                    if position < total {
                        tokio::select! {
                            biased;
                            () = shutdown_requested(&mut shutdown) => return Ok(interrupted(report)),
                            () = tokio::time::sleep(pacing_delay) => {}
                        }
                    }
                }
                Err(e) => {
                    error!(
                        position,
                        total,
                        id = stub.id,
                        label = %stub.label,
                        error = %e,
                        cause = %e.request_error(),
                        "Bus fetch failed, skipping"
                    );
                    report.failures.push(EntityFailure {
                        id: stub.id,
                        label: stub.label.clone(),
                        message: e.request_error().to_string(),
                    });
                }
            }
        }

        info!(
            succeeded = report.succeeded(),
            listed = report.listed,
            warnings = report.warnings,
            "Finished fetching buses"
        );
        if report.succeeded() != report.listed {
            warn!(
                failed = report.listed - report.succeeded(),
                "Some buses failed to scrape"
            );
        }

        Ok(ScrapeOutcome::Completed(report))
    }
}

fn interrupted(report: ScrapeReport) -> ScrapeOutcome {
    warn!(
        collected = report.succeeded(),
        listed = report.listed,
        "Scraping interrupted"
    );
    ScrapeOutcome::Interrupted(report)
}

/// Decides what happens to a run's result and writes it.
///
/// A completed run with at least one bus goes to `config.output`. An
/// interrupted run with at least one bus goes to
/// [`persist::partial_path`]. Nothing is written when the list was empty or
/// no bus was collected.
///
/// # Errors
///
/// Returns a [`PersistError`] when the document cannot be written.
pub fn finish(outcome: ScrapeOutcome, config: &ScrapeConfig) -> Result<RunStats, PersistError> {
    let stats = match outcome {
        ScrapeOutcome::NothingToDo => {
            warn!("No buses listed, nothing saved");
            RunStats::nothing_to_do()
        }
        ScrapeOutcome::Completed(report) if report.collection.is_empty() => {
            error!(listed = report.listed, "No data collected, nothing saved");
            RunStats::from_report(RunOutcome::NoData, &report)
        }
        ScrapeOutcome::Completed(report) => {
            let summary = persist::save(&report.collection, &config.output)?;
            output::log_summary(&summary);
            info!("Scraping completed successfully");
            RunStats::from_report(RunOutcome::Completed, &report).with_save(&summary)
        }
        ScrapeOutcome::Interrupted(report) if report.collection.is_empty() => {
            warn!("Interrupted before any bus was collected, nothing saved");
            RunStats::from_report(RunOutcome::Interrupted, &report)
        }
        ScrapeOutcome::Interrupted(report) => {
            let path = persist::partial_path(&config.output);
            info!(path = %path.display(), collected = report.succeeded(), "Saving partial data");
            let summary = persist::save(&report.collection, &path)?;
            output::log_summary(&summary);
            RunStats::from_report(RunOutcome::Interrupted, &report).with_save(&summary)
        }
    };

    info!(
        outcome = ?stats.outcome,
        success_pct = %format!("{:.1}", stats.success_pct()),
        "Run finished"
    );
    Ok(stats)
}

/// Relays operator interrupts into `shutdown`.
///
/// The first signal requests a graceful stop. Returns `true` on a second
/// signal, meaning the caller should abort without waiting, and `false` if
/// the signal source itself fails.
pub async fn forward_interrupts<S, F>(mut next_signal: S, shutdown: watch::Sender<bool>) -> bool
where
    S: FnMut() -> F,
    F: Future<Output = std::io::Result<()>>,
{
    if let Err(e) = next_signal().await {
        error!(error = %e, "Failed to listen for interrupts");
        return false;
    }
    warn!("Interrupt received, stopping after the current request (interrupt again to abort)");
    let _ = shutdown.send(true);

    match next_signal().await {
        Ok(()) => {
            warn!("Second interrupt received, aborting");
            true
        }
        Err(e) => {
            error!(error = %e, "Failed to listen for interrupts");
            false
        }
    }
}

// Resolves once the flag is set; never resolves if the sender is gone.
async fn shutdown_requested(shutdown: &mut watch::Receiver<bool>) {
    if shutdown.wait_for(|stop| *stop).await.is_err() {
        std::future::pending::<()>().await;
    }
}
