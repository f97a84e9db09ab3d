use std::time::Duration;

/// Bounds for one drain pass over a queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrainBudget {
	/// Wall-clock time the pass may spend.
	pub duration: Duration,
	/// Maximum number of jobs to complete.
	pub max_completions: usize,
}

impl DrainBudget {
	/// A budget that stops only when the queue is empty.
	pub const fn unbounded() -> Self {
		Self {
			duration: Duration::MAX,
			max_completions: usize::MAX,
		}
	}
}

/// Outcome of one drain pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainReport {
	/// Jobs run to completion, including ones that panicked.
	pub completed: u64,
	/// Jobs still queued when the pass ended.
	pub pending: usize,
	/// True when the pass stopped because of the budget rather than an empty queue.
	pub budget_exhausted: bool,
}
