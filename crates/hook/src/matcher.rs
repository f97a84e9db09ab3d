//! Menu interaction matching.
//!
//! # Purpose
//!
//! Decides, for each click inside a host menu, whether it should fire
//! configured commands and which recipe they belong to.
//!
//! # Session lifecycle
//!
//! A session with no entry in the table is `NONE`. Opening a recognized menu
//! inserts [`SessionPhase::PendingDetection`]; once the menu has had time to
//! populate, detection moves it to [`SessionPhase::Active`], which holds the
//! fallback key if nothing better was found. Closing removes the entry.
//!
//! # Ordering of checks
//!
//! Cheap rejections run first and never touch menu contents: actor kind, the
//! gated-slot set, the title. Indicator and recipe reads follow. The cooldown
//! is consumed before the rule lookup, so a recognized click with no
//! configured commands still starts a cooldown.

use std::sync::Arc;

use arc_swap::ArcSwap;
use crafthook_primitives::{ActorContext, ActorId, MenuView, RecipeKey, SessionId, Slot};
use crafthook_rules::{RuleSnapshot, RuleStore};
use crafthook_worker::TaskClass;
use dashmap::DashMap;
use tokio::task::JoinHandle;

use crate::detect::{Detection, DetectionSource, RecipeCatalog, detect_recipe, indicator_valid};
use crate::{ActionDispatcher, CooldownGate, DispatchReport};

/// Logs a matcher decision at `info` in debug mode, `debug` otherwise.
macro_rules! decision {
	($debug:expr, $($arg:tt)+) => {
		if $debug {
			tracing::info!($($arg)+);
		} else {
			tracing::debug!($($arg)+);
		}
	};
}

/// Detection state of one open menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionPhase {
	PendingDetection,
	Active(Detection),
}

/// One click as reported by the host.
#[derive(Clone, Copy)]
pub struct Interaction<'a> {
	pub session: SessionId,
	pub actor: &'a ActorContext,
	pub slot: Slot,
	pub view: &'a dyn MenuView,
}

/// Why an interaction was left to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
	NotAPlayer,
	SlotNotGated,
	TitleMismatch,
	MissingIndicator,
}

/// Decision for one interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InteractionOutcome {
	/// Not ours; the host proceeds as usual.
	Ignored(IgnoreReason),
	/// Recognized, but the actor's cooldown is running.
	CoolingDown { recipe: RecipeKey },
	/// Recognized; nothing is configured for this recipe and slot.
	NoCommands { recipe: RecipeKey },
	/// Commands were handed to the dispatcher.
	Dispatched {
		recipe: RecipeKey,
		source: DetectionSource,
		report: DispatchReport,
	},
}

impl InteractionOutcome {
	/// True when the host should treat the click as consumed.
	pub fn is_handled(&self) -> bool {
		!matches!(self, Self::Ignored(_))
	}
}

/// Routes menu events to rules, cooldowns and the dispatcher.
pub struct EventMatcher {
	rules: Arc<RuleStore>,
	cooldowns: Arc<CooldownGate>,
	dispatcher: ActionDispatcher,
	catalog: ArcSwap<RecipeCatalog>,
	sessions: DashMap<SessionId, SessionPhase>,
}

impl std::fmt::Debug for EventMatcher {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("EventMatcher")
			.field("generation", &self.rules.generation())
			.field("sessions", &self.sessions.len())
			.field("cooldowns", &self.cooldowns.len())
			.finish_non_exhaustive()
	}
}

impl EventMatcher {
	pub fn new(rules: Arc<RuleStore>, cooldowns: Arc<CooldownGate>, dispatcher: ActionDispatcher) -> Self {
		Self {
			rules,
			cooldowns,
			dispatcher,
			catalog: ArcSwap::from_pointee(RecipeCatalog::default()),
			sessions: DashMap::new(),
		}
	}

	/// Replaces the recipe catalog used by the last detection stage.
	pub fn set_catalog(&self, catalog: RecipeCatalog) {
		tracing::debug!(recipes = catalog.len(), "recipe catalog replaced");
		self.catalog.store(Arc::new(catalog));
	}

	/// Starts tracking `session` if its title is recognized. Returns whether
	/// it is tracked.
	pub fn on_session_open(&self, session: SessionId, view: &dyn MenuView) -> bool {
		let rules = self.rules.snapshot();
		let settings = rules.settings();
		if !settings.menu.titles.matches(view.title()) {
			decision!(settings.debug, %session, title = view.title(), "session ignored: title mismatch");
			return false;
		}
		self.sessions.insert(session, SessionPhase::PendingDetection);
		decision!(settings.debug, %session, "session pending detection");
		true
	}

	/// Runs detection for a tracked session and marks it active.
	///
	/// Returns `None` when the session was closed or never tracked.
	pub fn detect_session(&self, session: SessionId, view: &dyn MenuView) -> Option<Detection> {
		let rules = self.rules.snapshot();
		let detection = detect_recipe(view, &rules, &self.catalog.load());
		let mut phase = self.sessions.get_mut(&session)?;
		*phase = SessionPhase::Active(detection.clone());
		decision!(
			rules.settings().debug,
			%session,
			recipe = %detection.key,
			source = %detection.source,
			"session active"
		);
		Some(detection)
	}

	/// Runs [`Self::detect_session`] after the configured detection delay so
	/// the host can finish filling the menu.
	pub fn schedule_detection(self: &Arc<Self>, session: SessionId, view: Arc<dyn MenuView>) -> JoinHandle<Option<Detection>> {
		let delay = self.rules.snapshot().settings().menu.detection_delay;
		let matcher = Arc::clone(self);
		crafthook_worker::spawn(TaskClass::Interactive, async move {
			tokio::time::sleep(delay).await;
			matcher.detect_session(session, &*view)
		})
	}

	/// Forgets `session`. Batches already queued for it still run.
	pub fn on_session_close(&self, session: SessionId) {
		if self.sessions.remove(&session).is_some() {
			tracing::trace!(%session, "session closed");
		}
	}

	/// Releases per-actor state when `actor` disconnects. Their cooldown is
	/// kept so reconnecting does not skip it.
	pub fn on_actor_quit(&self, actor: ActorId) {
		self.dispatcher.forget_actor(actor);
		tracing::trace!(%actor, "actor state released");
	}

	pub fn session_phase(&self, session: SessionId) -> Option<SessionPhase> {
		self.sessions.get(&session).map(|phase| phase.clone())
	}

	pub fn active_sessions(&self) -> usize {
		self.sessions.len()
	}

	/// Decides what `interaction` does and dispatches its commands.
	pub fn on_interaction(&self, interaction: Interaction<'_>) -> InteractionOutcome {
		let Interaction {
			session,
			actor,
			slot,
			view,
		} = interaction;
		let rules = self.rules.snapshot();
		let settings = rules.settings();
		let debug = settings.debug;

		if !actor.is_player() {
			return InteractionOutcome::Ignored(IgnoreReason::NotAPlayer);
		}
		if !rules.is_gated_slot(slot) {
			return InteractionOutcome::Ignored(IgnoreReason::SlotNotGated);
		}
		if !settings.menu.titles.matches(view.title()) {
			decision!(debug, %session, %slot, title = view.title(), "interaction ignored: title mismatch");
			return InteractionOutcome::Ignored(IgnoreReason::TitleMismatch);
		}
		if settings.menu.require_indicator && !indicator_valid(view, &settings.menu) {
			decision!(debug, %session, %slot, "interaction ignored: indicator missing");
			return InteractionOutcome::Ignored(IgnoreReason::MissingIndicator);
		}

		let detection = self.session_detection(session, view, &rules);

		if !self.cooldowns.try_acquire(actor.id, settings.cooldown.duration) {
			decision!(debug, actor = %actor.name, recipe = %detection.key, "interaction blocked by cooldown");
			return InteractionOutcome::CoolingDown { recipe: detection.key };
		}

		let commands = rules.lookup(&detection.key, slot);
		if commands.is_empty() {
			decision!(debug, actor = %actor.name, recipe = %detection.key, %slot, "no commands configured");
			return InteractionOutcome::NoCommands { recipe: detection.key };
		}

		let report = self.dispatcher.execute(actor, &commands, &rules);
		decision!(
			debug,
			actor = %actor.name,
			recipe = %detection.key,
			source = %detection.source,
			%slot,
			prepared = report.prepared,
			"commands dispatched"
		);
		InteractionOutcome::Dispatched {
			recipe: detection.key,
			source: detection.source,
			report,
		}
	}

	/// Detection cached for the session, or a fresh one stored if the session
	/// is tracked but not yet active.
	fn session_detection(&self, session: SessionId, view: &dyn MenuView, rules: &RuleSnapshot) -> Detection {
		if let Some(phase) = self.sessions.get(&session)
			&& let SessionPhase::Active(detection) = &*phase
		{
			return detection.clone();
		}

		let detection = detect_recipe(view, rules, &self.catalog.load());
		if let Some(mut phase) = self.sessions.get_mut(&session) {
			*phase = SessionPhase::Active(detection.clone());
		}
		detection
	}
}
