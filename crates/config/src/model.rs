//! Typed configuration produced by validating a [`crate::ConfigDocument`].

use std::time::Duration;

use crafthook_primitives::{Position, RecipeKey, Slot};

use crate::{ConfigDocument, ConfigWarning, Result};

/// Built-in position to slot table: a 4x3 grid inside a 9-wide chest menu.
pub const DEFAULT_SLOT_MAPPING: [(u32, i32); 12] = [
	(1, 10),
	(2, 11),
	(3, 12),
	(4, 13),
	(5, 19),
	(6, 20),
	(7, 21),
	(8, 22),
	(9, 28),
	(10, 29),
	(11, 30),
	(12, 31),
];

/// Fully validated hook configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookConfig {
	/// Free-form version string reported by admin tooling.
	pub version: Option<String>,
	/// Verbose matcher diagnostics.
	pub debug: bool,
	pub slot_positions: SlotPositions,
	/// Command sections, sorted by recipe key.
	pub recipes: Vec<RecipeCommands>,
	pub commands: CommandSettings,
	pub menu: MenuDetection,
	/// Defects found while validating. Each one has already been recovered from.
	pub warnings: Vec<ConfigWarning>,
}

impl Default for HookConfig {
	fn default() -> Self {
		Self {
			version: None,
			debug: false,
			slot_positions: SlotPositions::default(),
			recipes: Vec::new(),
			commands: CommandSettings::default(),
			menu: MenuDetection::default(),
			warnings: Vec::new(),
		}
	}
}

impl HookConfig {
	/// Validates a document.
	///
	/// Fails only when the document root is not a table.
	pub fn from_document(document: &ConfigDocument) -> Result<Self> {
		crate::parse::parse_document(document)
	}
}

/// Configured `position -> slot` pairs in ascending position order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotPositions {
	pub entries: Vec<(Position, Slot)>,
	/// True when [`DEFAULT_SLOT_MAPPING`] was substituted for an empty section.
	pub defaulted: bool,
}

impl Default for SlotPositions {
	fn default() -> Self {
		Self {
			entries: DEFAULT_SLOT_MAPPING
				.iter()
				.filter_map(|&(pos, slot)| Some((Position::new(pos)?, Slot(slot))))
				.collect(),
			defaulted: true,
		}
	}
}

/// Raw command templates configured for one recipe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeCommands {
	pub key: RecipeKey,
	/// Non-empty command lists in ascending position order.
	pub entries: Vec<(Position, Vec<String>)>,
}

/// The `commands` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSettings {
	pub cooldown: CooldownSettings,
	/// Maximum commands run per trigger; `0` disables truncation.
	pub max_commands_per_click: usize,
	/// Queue side effects onto the serialized executor instead of running
	/// them on the calling context.
	pub async_execution: bool,
	pub error_handling: ErrorHandling,
}

impl Default for CommandSettings {
	fn default() -> Self {
		Self {
			cooldown: CooldownSettings::default(),
			max_commands_per_click: 10,
			async_execution: true,
			error_handling: ErrorHandling::default(),
		}
	}
}

/// Per-actor trigger cooldown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CooldownSettings {
	pub enabled: bool,
	pub duration: Duration,
}

impl Default for CooldownSettings {
	fn default() -> Self {
		Self {
			enabled: true,
			duration: Duration::from_secs(1),
		}
	}
}

/// How dispatch failures are surfaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorHandling {
	pub log_errors: bool,
	pub notify_player: bool,
	/// Message sent to the actor when `notify_player` is set. `&` codes allowed.
	pub fallback_message: String,
}

impl Default for ErrorHandling {
	fn default() -> Self {
		Self {
			log_errors: true,
			notify_player: false,
			fallback_message: "&cAn error occurred while processing your request.".to_string(),
		}
	}
}

/// The `menu-detection` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuDetection {
	/// Case-insensitive patterns matched against the colour-stripped title.
	pub title_patterns: Vec<String>,
	/// Slot holding the marker item that identifies the host menu.
	pub indicator_slot: Slot,
	/// Custom model data carried by the marker item.
	pub indicator_model_data: i32,
	/// When false, menus without the marker are still accepted.
	pub require_indicator: bool,
	/// Slot holding the crafting result whose identifier selects the recipe.
	pub result_slot: Slot,
	/// Tag name holding the item identifier.
	pub item_id_tag: String,
	/// Delay between a session opening and recipe detection.
	pub detection_delay: Duration,
}

impl Default for MenuDetection {
	fn default() -> Self {
		Self {
			title_patterns: vec!["chế tạo".to_string()],
			indicator_slot: Slot(34),
			indicator_model_data: 10004,
			require_indicator: true,
			result_slot: Slot(25),
			item_id_tag: "MMOITEMS_ITEM_ID".to_string(),
			detection_delay: Duration::from_millis(100),
		}
	}
}
