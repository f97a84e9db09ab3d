use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::{TaskClass, spawn};

/// Handle to a task started by [`spawn_periodic`]. Dropping it cancels the task.
#[derive(Debug)]
pub struct PeriodicHandle {
	cancel: CancellationToken,
	task: Option<JoinHandle<()>>,
}

impl PeriodicHandle {
	/// Requests cancellation. The current tick, if any, finishes first.
	pub fn cancel(&self) {
		self.cancel.cancel();
	}

	/// Cancels and waits for the task to exit.
	pub async fn shutdown(mut self) {
		self.cancel.cancel();
		if let Some(task) = self.task.take()
			&& let Err(err) = task.await
			&& err.is_panic()
		{
			tracing::error!("periodic task panicked");
		}
	}

	pub fn is_cancelled(&self) -> bool {
		self.cancel.is_cancelled()
	}
}

impl Drop for PeriodicHandle {
	fn drop(&mut self) {
		self.cancel.cancel();
	}
}

/// Runs `tick` every `period`, starting one period from now.
///
/// Missed ticks are delayed rather than bursted.
pub fn spawn_periodic<F>(class: TaskClass, name: &'static str, period: Duration, mut tick: F) -> PeriodicHandle
where
	F: FnMut() + Send + 'static,
{
	let cancel = CancellationToken::new();
	let task_cancel = cancel.clone();
	let task = spawn(class, async move {
		let start = tokio::time::Instant::now() + period;
		let mut interval = tokio::time::interval_at(start, period.max(Duration::from_millis(1)));
		interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
		loop {
			tokio::select! {
				biased;
				_ = task_cancel.cancelled() => break,
				_ = interval.tick() => {
					tracing::trace!(worker_class = class.as_str(), task = name, "worker.periodic.tick");
					tick();
				}
			}
		}
		tracing::debug!(task = name, "periodic task stopped");
	});

	PeriodicHandle {
		cancel,
		task: Some(task),
	}
}
