//! Rule store with atomic snapshot publication.
//!
//! # Concurrency
//!
//! Readers call [`RuleStore::snapshot`] or the lookup shortcuts and never
//! block. Loads are serialized by a writer lock that readers never touch; each
//! load builds its snapshot aside and publishes it with a single `ArcSwap`
//! store, so generations are published in increasing order.
//!
//! # Failure
//!
//! A load that fails (unreadable file, root not a table) publishes nothing;
//! the previous snapshot stays in effect.

use std::path::Path;
use std::sync::Arc;

use arc_swap::ArcSwap;
use crafthook_config::{ConfigDocument, ConfigError, ConfigWarning, HookConfig};
use crafthook_primitives::{RecipeKey, Slot};
use parking_lot::Mutex;

use crate::{CommandEntry, RuleSnapshot};

/// Summary of one successful load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
	pub generation: u64,
	pub version: Option<String>,
	/// Recipes with at least one stored entry.
	pub recipes: usize,
	/// Stored `(recipe, position)` entries.
	pub entries: usize,
	pub gated_slots: usize,
	/// True when the built-in slot table is in effect.
	pub default_mapping: bool,
	pub warnings: Vec<ConfigWarning>,
}

/// Holds the current [`RuleSnapshot`].
///
/// Never uninitialized: a new store publishes the default snapshot.
#[derive(Debug)]
pub struct RuleStore {
	snap: ArcSwap<RuleSnapshot>,
	writer: Mutex<u64>,
}

impl Default for RuleStore {
	fn default() -> Self {
		Self::new()
	}
}

impl RuleStore {
	pub fn new() -> Self {
		Self {
			snap: ArcSwap::from_pointee(RuleSnapshot::default()),
			writer: Mutex::new(0),
		}
	}

	/// Validates `document` and publishes the result.
	pub fn load(&self, document: &ConfigDocument) -> Result<LoadReport, ConfigError> {
		let config = HookConfig::from_document(document)?;
		Ok(self.load_config(config))
	}

	/// Reads, validates and publishes the file at `path`.
	pub fn reload_from_path(&self, path: impl AsRef<Path>) -> Result<LoadReport, ConfigError> {
		let path = path.as_ref();
		let document = ConfigDocument::load(path).inspect_err(|err| {
			tracing::error!(path = %path.display(), error = %err, "config reload failed; keeping previous rules");
		})?;
		self.load(&document)
	}

	/// Publishes an already validated configuration.
	pub fn load_config(&self, config: HookConfig) -> LoadReport {
		let mut generation = self.writer.lock();
		*generation += 1;

		let mut warnings = config.warnings.clone();
		let snapshot = RuleSnapshot::build(*generation, &config, &mut warnings);

		for warning in &warnings {
			tracing::warn!(generation = *generation, "{warning}");
		}

		let report = LoadReport {
			generation: *generation,
			version: snapshot.settings().version.clone(),
			recipes: snapshot.recipes().count(),
			entries: snapshot.recipes().filter_map(|key| snapshot.recipe_entries(key)).map(|e| e.len()).sum(),
			gated_slots: snapshot.mapping().len(),
			default_mapping: snapshot.mapping().is_default(),
			warnings,
		};

		self.snap.store(Arc::new(snapshot));
		drop(generation);

		tracing::info!(
			generation = report.generation,
			recipes = report.recipes,
			entries = report.entries,
			warnings = report.warnings.len(),
			"rules published"
		);
		report
	}

	/// Current snapshot. Holding it does not block reloads.
	#[inline]
	pub fn snapshot(&self) -> Arc<RuleSnapshot> {
		self.snap.load_full()
	}

	#[inline]
	pub fn lookup(&self, key: &RecipeKey, slot: Slot) -> CommandEntry {
		self.snap.load().lookup(key, slot)
	}

	#[inline]
	pub fn is_gated_slot(&self, slot: Slot) -> bool {
		self.snap.load().is_gated_slot(slot)
	}

	/// Generation of the published snapshot.
	pub fn generation(&self) -> u64 {
		self.snap.load().generation()
	}
}
