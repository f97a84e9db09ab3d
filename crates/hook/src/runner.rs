//! Execution of prepared batches on the serialized context.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use crafthook_config::ErrorHandling;
use crafthook_primitives::ActorId;
use crafthook_primitives::text::translate_color_codes;
use crafthook_rules::ExecutorClass;
use crafthook_worker::panic_message;
use parking_lot::Mutex;

use crate::{EnvError, Environment};

/// One command ready to run: placeholders filled, tag removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedAction {
	pub class: ExecutorClass,
	pub command: String,
}

/// Everything one trigger asked for, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedBatch {
	pub actor: ActorId,
	pub actor_name: Arc<str>,
	pub actions: Vec<PreparedAction>,
	pub errors: ErrorHandling,
}

/// Why one action failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
	#[error(transparent)]
	Env(#[from] EnvError),
	#[error("command panicked: {0}")]
	Panicked(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionFailure {
	/// Index within the batch.
	pub index: usize,
	pub class: ExecutorClass,
	pub command: String,
	pub error: ActionError,
}

/// Result of running one batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchOutcome {
	pub succeeded: usize,
	pub failures: Vec<ActionFailure>,
	/// Elevated calls after which authority could not be taken back.
	pub restore_failures: usize,
	/// True when the fallback message was sent to the actor.
	pub notified: bool,
}

/// Runs prepared batches against an [`Environment`].
///
/// Clones share one execution lock: a batch runs start to finish before any
/// other batch from any clone touches the environment, whether it came off
/// the serialized queue or was run inline by a caller.
#[derive(Clone)]
pub struct ActionRunner {
	env: Arc<dyn Environment>,
	exclusive: Arc<Mutex<()>>,
}

impl std::fmt::Debug for ActionRunner {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ActionRunner").finish_non_exhaustive()
	}
}

impl ActionRunner {
	pub fn new(env: Arc<dyn Environment>) -> Self {
		Self {
			env,
			exclusive: Arc::new(Mutex::new(())),
		}
	}

	/// Runs every action of `batch` in order. A failing or panicking action
	/// is recorded and the rest still run.
	pub fn run_batch(&self, batch: PreparedBatch) -> BatchOutcome {
		let _exclusive = self.exclusive.lock();
		let mut outcome = BatchOutcome::default();

		for (index, action) in batch.actions.into_iter().enumerate() {
			let mut restore_failed = false;
			let result = catch_unwind(AssertUnwindSafe(|| self.run_one(batch.actor, &action, &mut restore_failed)))
				.unwrap_or_else(|payload| Err(ActionError::Panicked(panic_message(payload.as_ref()))));
			if restore_failed {
				outcome.restore_failures += 1;
			}

			match result {
				Ok(()) => {
					tracing::info!(actor = %batch.actor_name, class = %action.class, command = %action.command, "command executed");
					outcome.succeeded += 1;
				}
				Err(error) => {
					if batch.errors.log_errors {
						tracing::warn!(
							actor = %batch.actor_name,
							class = %action.class,
							command = %action.command,
							%error,
							"command failed"
						);
					}
					outcome.failures.push(ActionFailure {
						index,
						class: action.class,
						command: action.command,
						error,
					});
				}
			}
		}

		if !outcome.failures.is_empty() && batch.errors.notify_player {
			let message = translate_color_codes('&', &batch.errors.fallback_message);
			match self.env.send_message(batch.actor, &message) {
				Ok(()) => outcome.notified = true,
				Err(err) => tracing::warn!(actor = %batch.actor_name, error = %err, "failed to send fallback message"),
			}
		}
		outcome
	}

	fn run_one(&self, actor: ActorId, action: &PreparedAction, restore_failed: &mut bool) -> Result<(), ActionError> {
		let env = &*self.env;
		match action.class {
			ExecutorClass::Console => env.run_console(&action.command)?,
			ExecutorClass::AsActor => env.run_as_actor(actor, &action.command)?,
			ExecutorClass::Notify => env.send_message(actor, &translate_color_codes('&', &action.command))?,
			ExecutorClass::ElevatedAsActor => {
				let guard = ElevationGuard::acquire(env, actor, restore_failed)?;
				let result = env.run_as_actor(actor, &action.command);
				drop(guard);
				result?;
			}
		}
		Ok(())
	}
}

/// Grants elevated authority for its lifetime and puts the prior state back
/// on drop, including during unwinding.
struct ElevationGuard<'a> {
	env: &'a dyn Environment,
	actor: ActorId,
	restore: bool,
	restore_failed: &'a mut bool,
}

impl<'a> ElevationGuard<'a> {
	fn acquire(env: &'a dyn Environment, actor: ActorId, restore_failed: &'a mut bool) -> Result<Self, EnvError> {
		let was_elevated = env.is_elevated(actor)?;
		let guard = Self {
			env,
			actor,
			restore: !was_elevated,
			restore_failed,
		};
		if !was_elevated {
			env.set_elevated(actor, true)?;
		}
		Ok(guard)
	}
}

impl Drop for ElevationGuard<'_> {
	fn drop(&mut self) {
		if !self.restore {
			return;
		}
		if let Err(err) = self.env.set_elevated(self.actor, false) {
			*self.restore_failed = true;
			tracing::error!(actor = %self.actor, error = %err, "failed to restore authority after elevated command");
		}
	}
}
