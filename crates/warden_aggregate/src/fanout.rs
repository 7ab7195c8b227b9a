//! Structured fan-out shared by the aggregators.

use std::collections::HashMap;
use std::future::Future;
use tokio::task::{Id, JoinSet};
use tokio_util::sync::CancellationToken;
use warden_error::{AggregateError, AggregateErrorKind};

/// Outcome of one upstream unit.
pub(crate) type UnitOutcome<T> = Result<T, AggregateError>;

/// Error for a unit that failed while working on `target`.
#[track_caller]
pub(crate) fn unit_error(target: &str, message: impl Into<String>) -> AggregateError {
    AggregateError::new(AggregateErrorKind::Unit {
        target: target.to_string(),
        message: message.into(),
    })
}

/// A group of concurrent units, one per target.
///
/// Dropping the group aborts every unit still running.
pub(crate) struct FanOut<T> {
    set: JoinSet<UnitOutcome<T>>,
    index: HashMap<Id, usize>,
    targets: Vec<String>,
}

impl<T: Send + 'static> FanOut<T> {
    pub(crate) fn new() -> Self {
        Self {
            set: JoinSet::new(),
            index: HashMap::new(),
            targets: Vec::new(),
        }
    }

    /// Dispatch a unit working on `target`.
    pub(crate) fn spawn<F>(&mut self, target: impl Into<String>, unit: F)
    where
        F: Future<Output = UnitOutcome<T>> + Send + 'static,
    {
        let handle = self.set.spawn(unit);
        self.index.insert(handle.id(), self.targets.len());
        self.targets.push(target.into());
    }

    /// Wait for every unit and return their outcomes in dispatch order.
    ///
    /// Arrival order is irrelevant: each outcome lands in the slot of the unit
    /// that produced it. Fails only when `cancel` fires first.
    pub(crate) async fn collect(
        mut self,
        cancel: &CancellationToken,
    ) -> Result<Vec<UnitOutcome<T>>, AggregateError> {
        let mut slots: Vec<Option<UnitOutcome<T>>> =
            std::iter::repeat_with(|| None).take(self.targets.len()).collect();

        loop {
            let joined = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::debug!(pending = self.set.len(), "Aggregation cancelled");
                    return Err(AggregateError::new(AggregateErrorKind::Cancelled));
                }
                joined = self.set.join_next_with_id() => joined,
            };

            match joined {
                None => break,
                Some(Ok((id, outcome))) => {
                    if let Some(&slot) = self.index.get(&id) {
                        slots[slot] = Some(outcome);
                    }
                }
                Some(Err(join_error)) => {
                    if let Some(&slot) = self.index.get(&join_error.id()) {
                        tracing::error!(unit = %self.targets[slot], error = %join_error, "Unit task failed");
                        slots[slot] = Some(Err(AggregateError::new(AggregateErrorKind::Join(
                            join_error.to_string(),
                        ))));
                    }
                }
            }
        }

        Ok(slots
            .into_iter()
            .zip(self.targets.iter())
            .map(|(slot, target)| {
                slot.unwrap_or_else(|| Err(unit_error(target, "unit did not report")))
            })
            .collect())
    }
}
