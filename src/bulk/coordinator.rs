//! Fan-out task coordinator
//!
//! Runs one unit of work per item, all scheduled at once on the current task,
//! and waits for every unit to finish. The executor's concurrency ceiling is
//! the only throttle. A failing unit never cancels its siblings.

use futures::future::join_all;
use log::{error, info};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Anything a bulk operation can be applied to
pub trait BulkTarget {
    /// Human-facing name used in reports
    fn label(&self) -> String;
}

/// Step of a unit that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Delete,
    Export,
    Write,
    Read,
    Import,
    Publish,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Delete => "delete",
            Stage::Export => "export",
            Stage::Write => "write",
            Stage::Read => "read",
            Stage::Import => "import",
            Stage::Publish => "publish",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitFailure {
    pub stage: Stage,
    pub error: String,
}

impl UnitFailure {
    pub fn new(stage: Stage, error: impl fmt::Display) -> Self {
        Self {
            stage,
            error: error.to_string(),
        }
    }
}

impl fmt::Display for UnitFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed: {}", self.stage, self.error)
    }
}

/// Lifecycle of one unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitState {
    Pending,
    InFlight,
    Succeeded,
    Failed,
}

/// Terminal result of one unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitOutcome {
    pub label: String,
    pub result: Result<String, UnitFailure>,
}

impl UnitOutcome {
    pub fn state(&self) -> UnitState {
        match self.result {
            Ok(_) => UnitState::Succeeded,
            Err(_) => UnitState::Failed,
        }
    }

    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Outcome of a whole bulk run
#[derive(Debug, Clone)]
pub struct BulkReport {
    pub operation: String,
    pub outcomes: Vec<UnitOutcome>,
}

impl BulkReport {
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.total() - self.succeeded()
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &UnitFailure)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|failure| (o.label.as_str(), failure)))
    }
}

/// Live counters of units per state
#[derive(Debug, Clone, Default)]
pub struct BulkProgress {
    pending: Arc<AtomicUsize>,
    in_flight: Arc<AtomicUsize>,
    succeeded: Arc<AtomicUsize>,
    failed: Arc<AtomicUsize>,
}

impl BulkProgress {
    pub fn count(&self, state: UnitState) -> usize {
        self.counter(state).load(Ordering::SeqCst)
    }

    fn transition(&self, from: UnitState, to: UnitState) {
        self.counter(from).fetch_sub(1, Ordering::SeqCst);
        self.counter(to).fetch_add(1, Ordering::SeqCst);
    }

    fn counter(&self, state: UnitState) -> &AtomicUsize {
        match state {
            UnitState::Pending => &self.pending,
            UnitState::InFlight => &self.in_flight,
            UnitState::Succeeded => &self.succeeded,
            UnitState::Failed => &self.failed,
        }
    }
}

/// Apply `unit` to every item and wait for all of them.
///
/// Outcomes are returned in input order; completion order is not observable.
pub async fn run_bulk<T, F, Fut>(operation: &str, items: Vec<T>, unit: F) -> BulkReport
where
    T: BulkTarget,
    F: Fn(T) -> Fut,
    Fut: Future<Output = Result<String, UnitFailure>>,
{
    run_bulk_with_progress(operation, items, unit, &BulkProgress::default()).await
}

/// Same as [`run_bulk`], reporting state transitions into `progress`
pub async fn run_bulk_with_progress<T, F, Fut>(
    operation: &str,
    items: Vec<T>,
    unit: F,
    progress: &BulkProgress,
) -> BulkReport
where
    T: BulkTarget,
    F: Fn(T) -> Fut,
    Fut: Future<Output = Result<String, UnitFailure>>,
{
    info!("Starting bulk {} over {} item(s)", operation, items.len());
    progress.pending.fetch_add(items.len(), Ordering::SeqCst);

    let units = items.into_iter().map(|item| {
        let label = item.label();
        let work = unit(item);
        async move {
            progress.transition(UnitState::Pending, UnitState::InFlight);
            let result = work.await;
            match &result {
                Ok(detail) => {
                    progress.transition(UnitState::InFlight, UnitState::Succeeded);
                    info!("{}: {}", operation, detail);
                }
                Err(failure) => {
                    progress.transition(UnitState::InFlight, UnitState::Failed);
                    error!("{} {}: {}", operation, label, failure);
                }
            }
            UnitOutcome { label, result }
        }
    });

    let outcomes = join_all(units).await;
    let report = BulkReport {
        operation: operation.to_string(),
        outcomes,
    };
    info!(
        "Bulk {} finished: {} succeeded, {} failed",
        operation,
        report.succeeded(),
        report.failed()
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    struct Item(u32);

    impl BulkTarget for Item {
        fn label(&self) -> String {
            format!("item-{}", self.0)
        }
    }

    #[tokio::test]
    async fn test_failures_are_isolated() {
        let items: Vec<Item> = (1..=5).map(Item).collect();

        let report = run_bulk("delete", items, |item| async move {
            tokio::time::sleep(Duration::from_millis(u64::from(5 - item.0))).await;
            if item.0 == 3 {
                Err(UnitFailure::new(Stage::Delete, "exhausted"))
            } else {
                Ok(format!("deleted {}", item.0))
            }
        })
        .await;

        assert_eq!(report.total(), 5);
        assert_eq!(report.succeeded(), 4);
        assert_eq!(report.failed(), 1);
        assert!(!report.is_success());

        let failures: Vec<_> = report.failures().collect();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0, "item-3");
        assert_eq!(failures[0].1.stage, Stage::Delete);
    }

    #[tokio::test]
    async fn test_outcomes_keep_input_order() {
        let items: Vec<Item> = (1..=4).map(Item).collect();

        let report = run_bulk("export", items, |item| async move {
            // later items finish first
            tokio::time::sleep(Duration::from_millis(u64::from(20 - item.0 * 5))).await;
            Ok::<_, UnitFailure>(item.0.to_string())
        })
        .await;

        let labels: Vec<_> = report.outcomes.iter().map(|o| o.label.as_str()).collect();
        assert_eq!(labels, vec!["item-1", "item-2", "item-3", "item-4"]);
        assert!(report.outcomes.iter().all(|o| o.state() == UnitState::Succeeded));
    }

    #[tokio::test]
    async fn test_progress_reaches_terminal_states() {
        let progress = BulkProgress::default();
        let items: Vec<Item> = (0..6).map(Item).collect();

        let report = run_bulk_with_progress(
            "import",
            items,
            |item| async move {
                if item.0 % 2 == 0 {
                    Ok("ok".to_string())
                } else {
                    Err(UnitFailure::new(Stage::Publish, "500"))
                }
            },
            &progress,
        )
        .await;

        assert_eq!(report.total(), 6);
        assert_eq!(progress.count(UnitState::Pending), 0);
        assert_eq!(progress.count(UnitState::InFlight), 0);
        assert_eq!(progress.count(UnitState::Succeeded), 3);
        assert_eq!(progress.count(UnitState::Failed), 3);
    }

    #[tokio::test]
    async fn test_empty_input_yields_empty_report() {
        let report = run_bulk("delete", Vec::<Item>::new(), |_| async { Ok(String::new()) }).await;
        assert_eq!(report.total(), 0);
        assert!(report.is_success());
    }

    #[test]
    fn test_failure_display() {
        let failure = UnitFailure::new(Stage::Publish, "API call failed after 3 attempts: x");
        assert_eq!(failure.to_string(), "publish failed: API call failed after 3 attempts: x");
    }
}
