//! Document validation.
//!
//! Every reader takes the dotted field path it is validating so warnings can
//! name the exact offending entry. Readers never fail: they record a warning
//! and hand back the default.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::ops::RangeInclusive;
use std::time::Duration;

use crafthook_primitives::{Position, RecipeKey, Slot};
use serde_json::{Map, Value};

use crate::model::{
	CommandSettings, CooldownSettings, ErrorHandling, HookConfig, MenuDetection, RecipeCommands, SlotPositions,
};
use crate::{ConfigDocument, ConfigError, ConfigWarning, Result};

const ROOT_FIELDS: &[&str] = &["version", "settings", "slot-mapping", "items-command", "commands", "menu-detection"];
const SETTINGS_FIELDS: &[&str] = &["debug"];
const SLOT_MAPPING_FIELDS: &[&str] = &["positions"];
const COMMANDS_FIELDS: &[&str] = &["cooldown", "max-commands-per-click", "async-execution", "error-handling"];
const COOLDOWN_FIELDS: &[&str] = &["enabled", "duration"];
const ERROR_HANDLING_FIELDS: &[&str] = &["log-errors", "notify-player", "fallback-message"];
const MENU_FIELDS: &[&str] = &[
	"title-patterns",
	"indicator-slot",
	"indicator-model-data",
	"require-indicator",
	"result-slot",
	"item-id-tag",
	"detection-delay-ms",
];

const SLOT_RANGE: RangeInclusive<i64> = i32::MIN as i64..=i32::MAX as i64;

pub(crate) fn parse_document(document: &ConfigDocument) -> Result<HookConfig> {
	let root = document.root().as_object().ok_or_else(|| ConfigError::InvalidType {
		field: "<root>".to_string(),
		expected: "table",
		got: type_name(document.root()),
	})?;

	let mut cx = Validator::default();
	cx.check_fields(root, ROOT_FIELDS, None);

	let version = root.get("version").and_then(|value| match value {
		Value::String(s) => Some(s.clone()),
		Value::Number(n) => Some(n.to_string()),
		other => {
			cx.invalid_type("version", "string", other);
			None
		}
	});

	let settings = cx.section(root, "settings", "settings", SETTINGS_FIELDS);
	let debug = cx.bool_or(settings, "debug", "settings.debug", false);

	let slot_positions = cx.slot_positions(root);
	let recipes = cx.recipes(root);
	let commands = cx.commands(root);
	let menu = cx.menu(root);

	tracing::debug!(
		recipes = recipes.len(),
		positions = slot_positions.entries.len(),
		warnings = cx.warnings.len(),
		"validated configuration document"
	);

	Ok(HookConfig {
		version,
		debug,
		slot_positions,
		recipes,
		commands,
		menu,
		warnings: cx.warnings,
	})
}

#[derive(Default)]
struct Validator {
	warnings: Vec<ConfigWarning>,
}

impl Validator {
	fn warn(&mut self, warning: ConfigWarning) {
		self.warnings.push(warning);
	}

	fn invalid_type(&mut self, field: &str, expected: &'static str, got: &Value) {
		self.warn(ConfigWarning::InvalidType {
			field: field.to_string(),
			expected,
			got: type_name(got),
		});
	}

	fn check_fields(&mut self, map: &Map<String, Value>, allowed: &[&str], parent: Option<&str>) {
		for key in map.keys() {
			if allowed.contains(&key.as_str()) {
				continue;
			}
			let field = match parent {
				Some(parent) => format!("{parent}.{key}"),
				None => key.clone(),
			};
			self.warn(ConfigWarning::UnknownField {
				field,
				suggestion: suggest(key, allowed),
			});
		}
	}

	/// Returns the table at `parent[key]`, checking its field names.
	fn section<'a>(
		&mut self,
		parent: &'a Map<String, Value>,
		key: &str,
		field: &str,
		allowed: &[&str],
	) -> Option<&'a Map<String, Value>> {
		let table = self.table(parent.get(key)?, field)?;
		self.check_fields(table, allowed, Some(field));
		Some(table)
	}

	fn table<'a>(&mut self, value: &'a Value, field: &str) -> Option<&'a Map<String, Value>> {
		match value {
			Value::Object(map) => Some(map),
			other => {
				self.invalid_type(field, "table", other);
				None
			}
		}
	}

	fn bool_or(&mut self, map: Option<&Map<String, Value>>, key: &str, field: &str, default: bool) -> bool {
		match map.and_then(|m| m.get(key)) {
			None => default,
			Some(Value::Bool(b)) => *b,
			Some(other) => {
				self.invalid_type(field, "bool", other);
				default
			}
		}
	}

	fn int_in(
		&mut self,
		map: Option<&Map<String, Value>>,
		key: &str,
		field: &str,
		default: i64,
		range: RangeInclusive<i64>,
	) -> i64 {
		let Some(value) = map.and_then(|m| m.get(key)) else {
			return default;
		};
		let Some(n) = value.as_i64() else {
			self.invalid_type(field, "int", value);
			return default;
		};
		if !range.contains(&n) {
			self.warn(ConfigWarning::OutOfRange {
				field: field.to_string(),
				value: n,
			});
			return default;
		}
		n
	}

	fn string_or(&mut self, map: Option<&Map<String, Value>>, key: &str, field: &str, default: String) -> String {
		match map.and_then(|m| m.get(key)) {
			None => default,
			Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
			Some(other) => {
				self.invalid_type(field, "non-empty string", other);
				default
			}
		}
	}

	fn slot_positions(&mut self, root: &Map<String, Value>) -> SlotPositions {
		let Some(mapping) = self.section(root, "slot-mapping", "slot-mapping", SLOT_MAPPING_FIELDS) else {
			return SlotPositions::default();
		};
		let Some(positions) = mapping.get("positions") else {
			return SlotPositions::default();
		};
		let Some(positions) = self.table(positions, "slot-mapping.positions") else {
			self.warn(ConfigWarning::DefaultSlotMapping);
			return SlotPositions::default();
		};

		let mut entries = BTreeMap::new();
		for (key, value) in positions {
			let Some(position) = Position::parse_key(key) else {
				self.warn(ConfigWarning::InvalidPositionKey {
					field: "slot-mapping.positions".to_string(),
					key: key.clone(),
				});
				continue;
			};
			let slot = value.as_i64().filter(|n| SLOT_RANGE.contains(n)).and_then(|n| i32::try_from(n).ok());
			let Some(slot) = slot else {
				self.warn(ConfigWarning::InvalidSlot {
					position,
					value: value.to_string(),
				});
				continue;
			};
			entries.insert(position, Slot(slot));
		}

		if entries.is_empty() {
			self.warn(ConfigWarning::DefaultSlotMapping);
			return SlotPositions::default();
		}

		SlotPositions {
			entries: entries.into_iter().collect(),
			defaulted: false,
		}
	}

	fn recipes(&mut self, root: &Map<String, Value>) -> Vec<RecipeCommands> {
		let Some(items) = root.get("items-command") else {
			return Vec::new();
		};
		let Some(items) = self.table(items, "items-command") else {
			return Vec::new();
		};

		let mut merged: BTreeMap<RecipeKey, BTreeMap<Position, Vec<String>>> = BTreeMap::new();
		for (raw_key, value) in items {
			let field = format!("items-command.{raw_key}");
			let Some(key) = RecipeKey::new(raw_key) else {
				self.warn(ConfigWarning::InvalidRecipeKey { key: raw_key.clone() });
				continue;
			};
			let Some(section) = self.table(value, &field) else {
				continue;
			};

			let recipe = match merged.entry(key.clone()) {
				Entry::Vacant(vacant) => vacant.insert(BTreeMap::new()),
				Entry::Occupied(occupied) => {
					self.warn(ConfigWarning::MergedRecipe { key: key.clone() });
					occupied.into_mut()
				}
			};

			for (position_key, commands) in section {
				let Some(position) = Position::parse_key(position_key) else {
					self.warn(ConfigWarning::InvalidPositionKey {
						field: field.clone(),
						key: position_key.clone(),
					});
					continue;
				};
				let commands = self.command_list(commands, &format!("{field}.{position_key}"));
				if commands.is_empty() {
					self.warn(ConfigWarning::EmptyCommands {
						recipe: key.clone(),
						position,
					});
					continue;
				}
				recipe.insert(position, commands);
			}
		}

		merged
			.into_iter()
			.filter(|(_, entries)| !entries.is_empty())
			.map(|(key, entries)| RecipeCommands {
				key,
				entries: entries.into_iter().collect(),
			})
			.collect()
	}

	fn command_list(&mut self, value: &Value, field: &str) -> Vec<String> {
		let mut out = Vec::new();
		match value {
			Value::Null => {}
			Value::String(s) => push_command(&mut out, s),
			Value::Array(items) => {
				for item in items {
					match item {
						Value::Null => {}
						Value::String(s) => push_command(&mut out, s),
						Value::Number(n) => push_command(&mut out, &n.to_string()),
						Value::Bool(b) => push_command(&mut out, &b.to_string()),
						other => self.warn(ConfigWarning::SkippedCommand {
							field: field.to_string(),
							got: type_name(other),
						}),
					}
				}
			}
			other => self.invalid_type(field, "string or list", other),
		}
		out
	}

	fn commands(&mut self, root: &Map<String, Value>) -> CommandSettings {
		let defaults = CommandSettings::default();
		let section = self.section(root, "commands", "commands", COMMANDS_FIELDS);

		let cooldown = section.and_then(|s| self.section(s, "cooldown", "commands.cooldown", COOLDOWN_FIELDS));
		let cooldown = CooldownSettings {
			enabled: self.bool_or(cooldown, "enabled", "commands.cooldown.enabled", defaults.cooldown.enabled),
			duration: Duration::from_secs(self.int_in(
				cooldown,
				"duration",
				"commands.cooldown.duration",
				defaults.cooldown.duration.as_secs() as i64,
				0..=86_400,
			) as u64),
		};

		let max_commands_per_click = self.int_in(
			section,
			"max-commands-per-click",
			"commands.max-commands-per-click",
			defaults.max_commands_per_click as i64,
			0..=i64::from(u32::MAX),
		) as usize;
		let async_execution = self.bool_or(
			section,
			"async-execution",
			"commands.async-execution",
			defaults.async_execution,
		);

		let errors = section.and_then(|s| self.section(s, "error-handling", "commands.error-handling", ERROR_HANDLING_FIELDS));
		let error_defaults = defaults.error_handling;
		let error_handling = ErrorHandling {
			log_errors: self.bool_or(errors, "log-errors", "commands.error-handling.log-errors", error_defaults.log_errors),
			notify_player: self.bool_or(
				errors,
				"notify-player",
				"commands.error-handling.notify-player",
				error_defaults.notify_player,
			),
			fallback_message: self.string_or(
				errors,
				"fallback-message",
				"commands.error-handling.fallback-message",
				error_defaults.fallback_message,
			),
		};

		CommandSettings {
			cooldown,
			max_commands_per_click,
			async_execution,
			error_handling,
		}
	}

	fn menu(&mut self, root: &Map<String, Value>) -> MenuDetection {
		let defaults = MenuDetection::default();
		let section = self.section(root, "menu-detection", "menu-detection", MENU_FIELDS);

		let title_patterns = match section.and_then(|s| s.get("title-patterns")) {
			None => defaults.title_patterns,
			Some(Value::Array(items)) => {
				let mut patterns = Vec::with_capacity(items.len());
				for (idx, item) in items.iter().enumerate() {
					match item {
						Value::String(s) if !s.trim().is_empty() => patterns.push(s.clone()),
						other => self.invalid_type(&format!("menu-detection.title-patterns[{idx}]"), "non-empty string", other),
					}
				}
				if patterns.is_empty() {
					self.warn(ConfigWarning::InvalidType {
						field: "menu-detection.title-patterns".to_string(),
						expected: "non-empty list",
						got: "empty list",
					});
					defaults.title_patterns
				} else {
					patterns
				}
			}
			Some(other) => {
				self.invalid_type("menu-detection.title-patterns", "list", other);
				defaults.title_patterns
			}
		};

		let indicator_slot = self.int_in(
			section,
			"indicator-slot",
			"menu-detection.indicator-slot",
			i64::from(defaults.indicator_slot.get()),
			SLOT_RANGE,
		);
		let indicator_model_data = self.int_in(
			section,
			"indicator-model-data",
			"menu-detection.indicator-model-data",
			i64::from(defaults.indicator_model_data),
			SLOT_RANGE,
		);
		let result_slot = self.int_in(
			section,
			"result-slot",
			"menu-detection.result-slot",
			i64::from(defaults.result_slot.get()),
			SLOT_RANGE,
		);
		let detection_delay_ms = self.int_in(
			section,
			"detection-delay-ms",
			"menu-detection.detection-delay-ms",
			defaults.detection_delay.as_millis() as i64,
			0..=60_000,
		);

		MenuDetection {
			title_patterns,
			indicator_slot: Slot(indicator_slot as i32),
			indicator_model_data: indicator_model_data as i32,
			require_indicator: self.bool_or(
				section,
				"require-indicator",
				"menu-detection.require-indicator",
				defaults.require_indicator,
			),
			result_slot: Slot(result_slot as i32),
			item_id_tag: self.string_or(section, "item-id-tag", "menu-detection.item-id-tag", defaults.item_id_tag),
			detection_delay: Duration::from_millis(detection_delay_ms as u64),
		}
	}
}

fn push_command(out: &mut Vec<String>, raw: &str) {
	let trimmed = raw.trim();
	if !trimmed.is_empty() {
		out.push(trimmed.to_string());
	}
}

/// Suggests the closest allowed key for a misspelled one.
fn suggest(key: &str, allowed: &[&str]) -> Option<String> {
	allowed
		.iter()
		.min_by_key(|candidate| strsim::levenshtein(key, candidate))
		.filter(|candidate| strsim::levenshtein(key, candidate) <= 3)
		.map(|candidate| candidate.to_string())
}

fn type_name(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "bool",
		Value::Number(n) if n.is_f64() => "float",
		Value::Number(_) => "int",
		Value::String(_) => "string",
		Value::Array(_) => "list",
		Value::Object(_) => "table",
	}
}
