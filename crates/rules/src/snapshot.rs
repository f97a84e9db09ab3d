//! Immutable rule snapshot.
//!
//! # Purpose
//!
//! One snapshot is everything a lookup needs: mapping, rule table, derived
//! caches and runtime settings, all built from the same [`HookConfig`].
//!
//! # Invariants
//!
//! - Every stored [`CommandEntry`] is non-empty.
//! - `slot_to_position` is the exact inverse of the slot mapping.
//! - `gated` holds exactly the mapped slots.
//! - `resolved[key][slot]` is the table entry for `(key, position_for(slot))`.
//!
//! [`RuleSnapshot::assert_consistent`] checks all of these.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use crafthook_config::{ConfigWarning, CooldownSettings, ErrorHandling, HookConfig, MenuDetection};
use crafthook_primitives::{Position, RecipeKey, Slot};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::{CommandEntry, CommandTemplate, SlotMapping, TitleMatcher};

/// Settings consumed by the action dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchSettings {
	/// `0` disables truncation.
	pub max_commands_per_click: usize,
	pub async_execution: bool,
	pub error_handling: ErrorHandling,
}

/// Compiled menu recognition settings.
#[derive(Debug, Clone)]
pub struct MenuSettings {
	pub titles: TitleMatcher,
	pub indicator_slot: Slot,
	pub indicator_model_data: i32,
	pub require_indicator: bool,
	pub result_slot: Slot,
	pub item_id_tag: Arc<str>,
	pub detection_delay: Duration,
}

impl MenuSettings {
	fn compile(menu: &MenuDetection, warnings: &mut Vec<ConfigWarning>) -> Self {
		Self {
			titles: TitleMatcher::compile(&menu.title_patterns, warnings),
			indicator_slot: menu.indicator_slot,
			indicator_model_data: menu.indicator_model_data,
			require_indicator: menu.require_indicator,
			result_slot: menu.result_slot,
			item_id_tag: Arc::from(menu.item_id_tag.as_str()),
			detection_delay: menu.detection_delay,
		}
	}
}

/// Non-rule settings published alongside the rules.
#[derive(Debug, Clone)]
pub struct RuntimeSettings {
	pub version: Option<String>,
	pub debug: bool,
	pub cooldown: CooldownSettings,
	pub dispatch: DispatchSettings,
	pub menu: MenuSettings,
}

type RuleTable = FxHashMap<RecipeKey, BTreeMap<Position, CommandEntry>>;

#[derive(Debug, Default)]
struct DerivedCaches {
	slot_to_position: FxHashMap<Slot, Position>,
	gated: FxHashSet<Slot>,
	resolved: FxHashMap<RecipeKey, FxHashMap<Slot, CommandEntry>>,
}

impl DerivedCaches {
	fn derive(mapping: &SlotMapping, table: &RuleTable) -> Self {
		let slot_to_position: FxHashMap<Slot, Position> = mapping.iter().map(|(p, s)| (s, p)).collect();
		let gated = slot_to_position.keys().copied().collect();
		let resolved = table
			.iter()
			.map(|(key, entries)| {
				let by_slot = entries
					.iter()
					.filter_map(|(&position, entry)| Some((mapping.slot_for(position)?, entry.clone())))
					.collect();
				(key.clone(), by_slot)
			})
			.collect();
		Self {
			slot_to_position,
			gated,
			resolved,
		}
	}
}

/// One published configuration generation.
#[derive(Debug)]
pub struct RuleSnapshot {
	generation: u64,
	mapping: SlotMapping,
	table: RuleTable,
	caches: DerivedCaches,
	settings: RuntimeSettings,
}

impl Default for RuleSnapshot {
	fn default() -> Self {
		Self::build(0, &HookConfig::default(), &mut Vec::new())
	}
}

impl RuleSnapshot {
	/// Builds a snapshot, appending any defects found on top of the ones the
	/// config already carries.
	pub fn build(generation: u64, config: &HookConfig, warnings: &mut Vec<ConfigWarning>) -> Self {
		let mapping = SlotMapping::build(&config.slot_positions, warnings);

		let mut table = RuleTable::default();
		for recipe in &config.recipes {
			let mut entries = BTreeMap::new();
			for (position, raws) in &recipe.entries {
				let mut templates = Vec::with_capacity(raws.len());
				for raw in raws {
					match CommandTemplate::parse(raw) {
						Some(template) => templates.push(template),
						None => warnings.push(ConfigWarning::EmptyTemplate {
							recipe: recipe.key.clone(),
							position: *position,
							raw: raw.clone(),
						}),
					}
				}
				let entry = CommandEntry::new(templates);
				if entry.is_empty() {
					warnings.push(ConfigWarning::EmptyCommands {
						recipe: recipe.key.clone(),
						position: *position,
					});
					continue;
				}
				if mapping.slot_for(*position).is_none() {
					tracing::debug!(recipe = %recipe.key, %position, "commands bound to an unmapped position");
				}
				entries.insert(*position, entry);
			}
			if !entries.is_empty() {
				table.insert(recipe.key.clone(), entries);
			}
		}

		let caches = DerivedCaches::derive(&mapping, &table);
		let settings = RuntimeSettings {
			version: config.version.clone(),
			debug: config.debug,
			cooldown: config.commands.cooldown,
			dispatch: DispatchSettings {
				max_commands_per_click: config.commands.max_commands_per_click,
				async_execution: config.commands.async_execution,
				error_handling: config.commands.error_handling.clone(),
			},
			menu: MenuSettings::compile(&config.menu, warnings),
		};

		let snapshot = Self {
			generation,
			mapping,
			table,
			caches,
			settings,
		};
		#[cfg(debug_assertions)]
		snapshot.assert_consistent();
		snapshot
	}

	/// Commands for an interaction at `slot` while `key` is the active recipe.
	///
	/// Unmapped slots and unbound pairs give the empty entry.
	#[inline]
	pub fn lookup(&self, key: &RecipeKey, slot: Slot) -> CommandEntry {
		self.caches
			.resolved
			.get(key)
			.and_then(|by_slot| by_slot.get(&slot))
			.cloned()
			.unwrap_or_default()
	}

	#[inline]
	pub fn is_gated_slot(&self, slot: Slot) -> bool {
		self.caches.gated.contains(&slot)
	}

	/// Stored entry for `(key, position)`, mapped or not.
	pub fn commands_for(&self, key: &RecipeKey, position: Position) -> Option<&CommandEntry> {
		self.table.get(key)?.get(&position)
	}

	pub fn slot_for(&self, position: Position) -> Option<Slot> {
		self.mapping.slot_for(position)
	}

	pub fn position_for(&self, slot: Slot) -> Option<Position> {
		self.caches.slot_to_position.get(&slot).copied()
	}

	/// Configured positions of one recipe, ascending.
	pub fn recipe_entries(&self, key: &RecipeKey) -> Option<&BTreeMap<Position, CommandEntry>> {
		self.table.get(key)
	}

	/// Configured recipe keys in no particular order.
	pub fn recipes(&self) -> impl Iterator<Item = &RecipeKey> {
		self.table.keys()
	}

	pub fn has_recipe(&self, key: &RecipeKey) -> bool {
		self.table.contains_key(key)
	}

	pub fn mapping(&self) -> &SlotMapping {
		&self.mapping
	}

	pub fn settings(&self) -> &RuntimeSettings {
		&self.settings
	}

	/// Load counter; the default snapshot is generation 0.
	pub fn generation(&self) -> u64 {
		self.generation
	}

	/// Panics if a derived cache disagrees with its sources.
	pub fn assert_consistent(&self) {
		for (key, entries) in &self.table {
			assert!(!entries.is_empty(), "recipe {key} stored without entries");
			for (position, entry) in entries {
				assert!(!entry.is_empty(), "empty entry stored for {key} position {position}");
			}
		}

		assert_eq!(
			self.caches.slot_to_position.len(),
			self.mapping.len(),
			"slot inverse size differs from mapping"
		);
		assert_eq!(self.caches.gated.len(), self.mapping.len(), "gated set size differs from mapping");
		for (position, slot) in self.mapping.iter() {
			assert_eq!(
				self.caches.slot_to_position.get(&slot),
				Some(&position),
				"slot {slot} does not invert to position {position}"
			);
			assert!(self.caches.gated.contains(&slot), "mapped slot {slot} not gated");
		}

		for (key, by_slot) in &self.caches.resolved {
			for (slot, entry) in by_slot {
				let position = self.caches.slot_to_position.get(slot);
				let source = position.and_then(|&p| self.commands_for(key, p));
				assert!(
					source.is_some_and(|s| s.ptr_eq(entry)),
					"resolved cache for {key} slot {slot} does not match the rule table"
				);
			}
		}
		for (key, entries) in &self.table {
			for position in entries.keys() {
				if let Some(slot) = self.mapping.slot_for(*position) {
					assert!(
						self.caches.resolved.get(key).is_some_and(|m| m.contains_key(&slot)),
						"resolved cache misses {key} position {position}"
					);
				}
			}
		}
	}
}
