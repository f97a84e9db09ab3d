//! Preparation and hand-off of command batches.
//!
//! Preparing a batch (truncation, placeholder substitution) has no side
//! effects and runs on the caller. The prepared batch then goes to the
//! serialized execution context, or runs inline when async execution is off.
//! Inline batches still take the runner's execution lock, so they never
//! overlap with each other or with the queue consumer.

use std::sync::Arc;

use crafthook_primitives::{ActorContext, ActorId};
use crafthook_rules::{CommandEntry, RuleSnapshot};
use crafthook_worker::{DrainBudget, DrainReport, SerialPort, SerialQueue, SerialSendError, SerialThread};

use crate::placeholder::{IdentityCache, substitute};
use crate::runner::{ActionRunner, BatchOutcome, PreparedAction, PreparedBatch};

/// Non-fatal issue met while dispatching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchWarning {
	/// The entry had more commands than allowed per click; the tail was dropped.
	Truncated { configured: usize, limit: usize },
	/// The serialized queue was full; the whole batch was dropped.
	QueueFull { dropped: usize },
	/// The serialized context is gone; the whole batch was dropped.
	QueueClosed { dropped: usize },
}

/// Where a batch went.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchMode {
	/// Nothing to run.
	Empty,
	/// Handed to the serialized context.
	Queued,
	/// Run on the caller; carries the outcome.
	Inline(BatchOutcome),
	/// Could not be handed off.
	Dropped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchReport {
	pub mode: DispatchMode,
	/// Commands prepared for execution after truncation.
	pub prepared: usize,
	pub warnings: Vec<DispatchWarning>,
}

/// Turns command entries into prepared batches and hands them off.
#[derive(Debug)]
pub struct ActionDispatcher {
	port: SerialPort<PreparedBatch>,
	runner: ActionRunner,
	pub(crate) identities: IdentityCache,
}

impl ActionDispatcher {
	pub fn new(port: SerialPort<PreparedBatch>, runner: ActionRunner) -> Self {
		Self {
			port,
			runner,
			identities: IdentityCache::default(),
		}
	}

	/// Applies the per-click limit and fills placeholders from `actor`'s
	/// current state.
	pub fn prepare(&self, actor: &ActorContext, commands: &CommandEntry, rules: &RuleSnapshot) -> (PreparedBatch, Vec<DispatchWarning>) {
		let settings = &rules.settings().dispatch;
		let limit = settings.max_commands_per_click;
		let mut warnings = Vec::new();

		let take = if limit > 0 && commands.len() > limit {
			tracing::warn!(
				actor = %actor.name,
				configured = commands.len(),
				limit,
				"command entry exceeds max-commands-per-click; extra commands dropped"
			);
			warnings.push(DispatchWarning::Truncated {
				configured: commands.len(),
				limit,
			});
			limit
		} else {
			commands.len()
		};

		let identity = self.identities.get(actor, rules.generation());
		let actions = commands
			.iter()
			.take(take)
			.map(|template| PreparedAction {
				class: template.class(),
				command: if template.has_placeholders() {
					substitute(template.body(), &identity, actor)
				} else {
					template.body().to_string()
				},
			})
			.collect();

		let batch = PreparedBatch {
			actor: actor.id,
			actor_name: Arc::clone(&actor.name),
			actions,
			errors: settings.error_handling.clone(),
		};
		(batch, warnings)
	}

	/// Prepares `commands` for `actor` and runs them per the snapshot's
	/// dispatch settings.
	pub fn execute(&self, actor: &ActorContext, commands: &CommandEntry, rules: &RuleSnapshot) -> DispatchReport {
		if commands.is_empty() {
			return DispatchReport {
				mode: DispatchMode::Empty,
				prepared: 0,
				warnings: Vec::new(),
			};
		}

		let (batch, mut warnings) = self.prepare(actor, commands, rules);
		let prepared = batch.actions.len();

		let mode = if rules.settings().dispatch.async_execution {
			match self.port.send(batch) {
				Ok(()) => DispatchMode::Queued,
				Err(SerialSendError::Full(_)) => {
					warnings.push(DispatchWarning::QueueFull { dropped: prepared });
					DispatchMode::Dropped
				}
				Err(SerialSendError::Closed(_)) => {
					tracing::error!(actor = %actor.name, dropped = prepared, "serialized execution context is gone");
					warnings.push(DispatchWarning::QueueClosed { dropped: prepared });
					DispatchMode::Dropped
				}
			}
		} else {
			DispatchMode::Inline(self.runner.run_batch(batch))
		};

		DispatchReport { mode, prepared, warnings }
	}

	/// Drops cached identity values for an actor that left.
	pub fn forget_actor(&self, actor: ActorId) {
		self.identities.forget(actor);
	}

	/// Batches rejected because the queue was full.
	pub fn dropped_batches(&self) -> u64 {
		self.port.dropped()
	}
}

/// Consumer end of the serialized execution context.
///
/// The host either calls [`ActionQueue::run_pending`] from its main tick or
/// moves the queue onto its own thread with [`ActionQueue::spawn_dedicated`].
#[derive(Debug)]
pub struct ActionQueue {
	queue: SerialQueue<PreparedBatch>,
	runner: ActionRunner,
}

impl ActionQueue {
	pub(crate) fn new(queue: SerialQueue<PreparedBatch>, runner: ActionRunner) -> Self {
		Self { queue, runner }
	}

	/// Runs queued batches on the calling thread within `budget`.
	pub fn run_pending(&mut self, budget: DrainBudget) -> DrainReport {
		let runner = &self.runner;
		self.queue.drain(budget, |batch| {
			runner.run_batch(batch);
		})
	}

	/// Batches waiting to run.
	pub fn pending(&self) -> usize {
		self.queue.pending()
	}

	/// Runs batches on a dedicated named thread as they arrive.
	pub fn spawn_dedicated(self, name: impl Into<String>) -> std::io::Result<SerialThread<PreparedBatch>> {
		let runner = self.runner;
		self.queue.spawn_dedicated(name, move |batch| {
			runner.run_batch(batch);
		})
	}
}
