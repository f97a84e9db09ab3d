//! Configuration for crafthook.
//!
//! A configuration arrives as a loosely typed [`ConfigDocument`] (a JSON-like
//! value tree produced by whatever file format the host prefers). It is
//! validated exactly once into a typed [`HookConfig`]; malformed entries are
//! skipped or defaulted and reported as [`ConfigWarning`]s instead of failing
//! the load.
//!
//! # Document Shape
//!
//! ```toml
//! version = "2.1"
//!
//! [settings]
//! debug = false
//!
//! [slot-mapping.positions]
//! "1" = 10
//! "2" = 11
//!
//! [items-command.SWORD01]
//! "1" = "[console] give %actor% diamond 1"
//! "2" = ["[message] &aThanks!", "[op] gamemode creative %actor%"]
//!
//! [commands]
//! max-commands-per-click = 10
//! async-execution = true
//! cooldown = { enabled = true, duration = 1 }
//! error-handling = { log-errors = true, notify-player = false, fallback-message = "&cSomething went wrong." }
//!
//! [menu-detection]
//! title-patterns = ["chế tạo"]
//! ```
//!
//! Only a document whose root is not a table is a hard error; everything
//! below the root degrades to defaults.

pub mod document;
pub mod error;
pub mod model;
mod parse;

pub use document::ConfigDocument;
pub use error::{ConfigError, ConfigWarning, Result};
pub use model::{
	CommandSettings, CooldownSettings, DEFAULT_SLOT_MAPPING, ErrorHandling, HookConfig, MenuDetection, RecipeCommands,
	SlotPositions,
};
