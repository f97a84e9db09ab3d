//! Read-only views for administrative tooling.

use crafthook_primitives::{Position, RecipeKey, Slot};

use crate::RuleSnapshot;

/// Sizes of the snapshot's tables and caches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
	pub generation: u64,
	pub recipes: usize,
	pub entries: usize,
	pub gated_slots: usize,
	/// `(recipe, slot)` pairs resolvable in one lookup.
	pub resolved: usize,
}

/// One configured position of a recipe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionDescription {
	pub position: Position,
	/// `None` when the mapping has no slot for this position.
	pub slot: Option<Slot>,
	pub command_count: usize,
	/// First command, tag included.
	pub example: String,
}

/// Configured positions of one recipe, ascending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeDescription {
	pub key: RecipeKey,
	pub positions: Vec<PositionDescription>,
}

impl RuleSnapshot {
	/// Configured recipe keys, sorted.
	pub fn configured_recipes(&self) -> Vec<RecipeKey> {
		let mut keys: Vec<_> = self.recipes().cloned().collect();
		keys.sort();
		keys
	}

	/// Commands for `(recipe, position)` as configured, tags included.
	///
	/// `recipe` is normalized; unknown pairs give an empty list.
	pub fn commands_as_text(&self, recipe: &str, position: u32) -> Vec<String> {
		let (Some(key), Some(position)) = (RecipeKey::new(recipe), Position::new(position)) else {
			return Vec::new();
		};
		self.commands_for(&key, position)
			.map(|entry| entry.iter().map(ToString::to_string).collect())
			.unwrap_or_default()
	}

	/// Per-position summary of one recipe.
	pub fn describe_recipe(&self, recipe: &str) -> Option<RecipeDescription> {
		let key = RecipeKey::new(recipe)?;
		let entries = self.recipe_entries(&key)?;
		let positions = entries
			.iter()
			.map(|(&position, entry)| PositionDescription {
				position,
				slot: self.slot_for(position),
				command_count: entry.len(),
				example: entry.iter().next().map(ToString::to_string).unwrap_or_default(),
			})
			.collect();
		Some(RecipeDescription { key, positions })
	}

	pub fn cache_stats(&self) -> CacheStats {
		let mut entries = 0;
		let mut resolved = 0;
		for key in self.recipes() {
			if let Some(by_position) = self.recipe_entries(key) {
				entries += by_position.len();
				resolved += by_position.keys().filter(|&&p| self.slot_for(p).is_some()).count();
			}
		}
		CacheStats {
			generation: self.generation(),
			recipes: self.recipes().count(),
			entries,
			gated_slots: self.mapping().len(),
			resolved,
		}
	}

	/// Version string from the loaded document.
	pub fn config_version(&self) -> Option<&str> {
		self.settings().version.as_deref()
	}

	/// Emits the snapshot's state through tracing at info level.
	pub fn debug_dump(&self) {
		let settings = self.settings();
		let stats = self.cache_stats();
		tracing::info!(
			generation = stats.generation,
			version = settings.version.as_deref().unwrap_or("unknown"),
			debug = settings.debug,
			recipes = stats.recipes,
			entries = stats.entries,
			gated_slots = stats.gated_slots,
			"rules dump"
		);
		tracing::info!(
			enabled = settings.cooldown.enabled,
			duration_secs = settings.cooldown.duration.as_secs(),
			max_commands = settings.dispatch.max_commands_per_click,
			async_execution = settings.dispatch.async_execution,
			"dispatch settings"
		);
		let mapping: Vec<String> = self.mapping().iter().map(|(p, s)| format!("{p}->{s}")).collect();
		tracing::info!(default = self.mapping().is_default(), mapping = %mapping.join(", "), "slot mapping");
		for key in self.configured_recipes() {
			let positions = self.recipe_entries(&key).map_or(0, |e| e.len());
			tracing::info!(recipe = %key, positions, "recipe");
		}
	}
}

#[cfg(test)]
mod tests {
	use crafthook_config::{ConfigDocument, HookConfig};
	use pretty_assertions::assert_eq;

	use super::*;

	fn snapshot(toml: &str) -> RuleSnapshot {
		let config = HookConfig::from_document(&ConfigDocument::from_toml_str(toml).unwrap()).unwrap();
		RuleSnapshot::build(1, &config, &mut Vec::new())
	}

	#[test]
	fn describe_lists_positions_with_slots_and_examples() {
		let snap = snapshot(
			r#"
			[items-command.sword01]
			"3" = ["give %actor% diamond 1", "[message] &aok"]
			"40" = "[op] heal"
			"#,
		);

		let description = snap.describe_recipe("Sword01").unwrap();
		assert_eq!(
			description,
			RecipeDescription {
				key: RecipeKey::new("SWORD01").unwrap(),
				positions: vec![
					PositionDescription {
						position: Position::new(3).unwrap(),
						slot: Some(Slot(12)),
						command_count: 2,
						example: "[console] give %actor% diamond 1".to_string(),
					},
					PositionDescription {
						position: Position::new(40).unwrap(),
						slot: None,
						command_count: 1,
						example: "[op] heal".to_string(),
					},
				],
			}
		);
		assert!(snap.describe_recipe("AXE").is_none());
	}

	#[test]
	fn stats_and_text_views() {
		let snap = snapshot(
			r#"
			version = "1.4"
			[items-command.b]
			"1" = "x"
			[items-command.a]
			"2" = ["y", "[player] z"]
			"99" = "unmapped"
			"#,
		);

		assert_eq!(snap.configured_recipes(), vec![RecipeKey::new("A").unwrap(), RecipeKey::new("B").unwrap()]);
		assert_eq!(snap.commands_as_text("a", 2), vec!["[console] y".to_string(), "[player] z".to_string()]);
		assert!(snap.commands_as_text("a", 0).is_empty());
		assert!(snap.commands_as_text("missing", 1).is_empty());
		assert_eq!(snap.config_version(), Some("1.4"));
		assert_eq!(
			snap.cache_stats(),
			CacheStats {
				generation: 1,
				recipes: 2,
				entries: 3,
				gated_slots: 12,
				resolved: 2,
			}
		);
		snap.debug_dump();
	}
}
