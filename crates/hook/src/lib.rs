//! Menu-triggered command hook.
//!
//! [`CraftHook`] wires the pieces together:
//!
//! * [`RuleStore`] holds the published rules,
//! * [`EventMatcher`] decides whether a click fires and for which recipe,
//! * [`CooldownGate`] limits how often one actor can fire,
//! * [`ActionDispatcher`] prepares commands and hands them to the
//!   serialized execution context drained through [`ActionQueue`].
//!
//! All side effects reach the host through the [`Environment`] trait.
//!
//! # Example
//!
//! ```no_run
//! # use std::sync::Arc;
//! # use crafthook_hook::{CraftHook, DrainBudget, Environment};
//! # fn host_env() -> Arc<dyn Environment> { unimplemented!() }
//! let (hook, mut queue) = CraftHook::new(host_env());
//! hook.reload_from_path("plugins/crafthook/config.toml")?;
//! // host tick:
//! queue.run_pending(DrainBudget::unbounded());
//! # Ok::<(), crafthook_config::ConfigError>(())
//! ```

mod cooldown;
mod detect;
mod dispatch;
mod environment;
mod matcher;
mod placeholder;
mod runner;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crafthook_config::{ConfigDocument, ConfigError, HookConfig};
pub use crafthook_rules::{LoadReport, RuleSnapshot, RuleStore};
pub use crafthook_worker::{DrainBudget, DrainReport, PeriodicHandle};
use crafthook_worker::{TaskClass, serial_channel, spawn_periodic};

pub use cooldown::CooldownGate;
pub use detect::{CatalogRecipe, DetectError, Detection, DetectionSource, RecipeCatalog, detect_recipe, indicator_valid};
pub use dispatch::{ActionDispatcher, ActionQueue, DispatchMode, DispatchReport, DispatchWarning};
pub use environment::{EnvError, Environment};
pub use matcher::{EventMatcher, IgnoreReason, Interaction, InteractionOutcome, SessionPhase};
pub use placeholder::{ActorIdentity, IdentityCache, substitute};
pub use runner::{ActionError, ActionFailure, ActionRunner, BatchOutcome, PreparedAction, PreparedBatch};

/// Batches the serialized queue holds before new ones are dropped.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// The assembled hook.
#[derive(Debug)]
pub struct CraftHook {
	rules: Arc<RuleStore>,
	cooldowns: Arc<CooldownGate>,
	matcher: Arc<EventMatcher>,
}

impl CraftHook {
	/// Builds a hook serving the default rules, plus the consumer end of its
	/// execution queue.
	pub fn new(env: Arc<dyn Environment>) -> (Self, ActionQueue) {
		Self::with_capacity(env, DEFAULT_QUEUE_CAPACITY)
	}

	pub fn with_capacity(env: Arc<dyn Environment>, capacity: usize) -> (Self, ActionQueue) {
		let rules = Arc::new(RuleStore::new());
		let cooldowns = Arc::new(CooldownGate::new(rules.snapshot().settings().cooldown.enabled));
		let runner = ActionRunner::new(env);
		let (port, queue) = serial_channel(capacity);
		let dispatcher = ActionDispatcher::new(port, runner.clone());
		let matcher = Arc::new(EventMatcher::new(Arc::clone(&rules), Arc::clone(&cooldowns), dispatcher));

		let hook = Self {
			rules,
			cooldowns,
			matcher,
		};
		(hook, ActionQueue::new(queue, runner))
	}

	/// Publishes rules from `document`. On error the current rules stay.
	pub fn reload(&self, document: &ConfigDocument) -> Result<LoadReport, ConfigError> {
		let report = self.rules.load(document)?;
		self.apply_settings();
		Ok(report)
	}

	/// Reads and publishes the file at `path`. On error the current rules stay.
	pub fn reload_from_path(&self, path: impl AsRef<Path>) -> Result<LoadReport, ConfigError> {
		let report = self.rules.reload_from_path(path)?;
		self.apply_settings();
		Ok(report)
	}

	/// Publishes an already validated configuration.
	pub fn load_config(&self, config: HookConfig) -> LoadReport {
		let report = self.rules.load_config(config);
		self.apply_settings();
		report
	}

	fn apply_settings(&self) {
		let snapshot = self.rules.snapshot();
		self.cooldowns.set_enabled(snapshot.settings().cooldown.enabled);
	}

	pub fn matcher(&self) -> &Arc<EventMatcher> {
		&self.matcher
	}

	pub fn rules(&self) -> &Arc<RuleStore> {
		&self.rules
	}

	/// Current snapshot, for the admin read API.
	pub fn admin(&self) -> Arc<RuleSnapshot> {
		self.rules.snapshot()
	}

	pub fn cooldowns(&self) -> &Arc<CooldownGate> {
		&self.cooldowns
	}

	pub fn set_catalog(&self, catalog: RecipeCatalog) {
		self.matcher.set_catalog(catalog);
	}

	/// Sweeps expired cooldowns every `period` until the handle is dropped.
	pub fn spawn_maintenance(&self, period: Duration) -> PeriodicHandle {
		let cooldowns = Arc::clone(&self.cooldowns);
		spawn_periodic(TaskClass::Background, "cooldown-sweep", period, move || {
			cooldowns.sweep();
		})
	}
}
