//! Error and warning types for configuration loading.

use std::fmt;
use std::path::PathBuf;

use crafthook_primitives::{Position, RecipeKey, Slot};

/// Fatal configuration errors. A load that hits one keeps the previous
/// configuration in effect.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	/// Reading the config file failed.
	#[error("failed to read {}: {error}", path.display())]
	Io {
		path: PathBuf,
		#[source]
		error: std::io::Error,
	},

	/// TOML syntax error.
	#[error("TOML parse error: {0}")]
	Toml(#[from] toml::de::Error),

	/// JSON syntax error.
	#[error("JSON parse error: {0}")]
	Json(#[from] serde_json::Error),

	/// File extension does not name a supported format.
	#[error("unsupported config format: {}", .0.display())]
	UnsupportedFormat(PathBuf),

	/// A value that must be structured has the wrong type.
	#[error("invalid type for field '{field}': expected {expected}, got {got}")]
	InvalidType {
		field: String,
		expected: &'static str,
		got: &'static str,
	},
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Non-fatal defect found while validating a document.
///
/// The offending entry has already been skipped or replaced by its default
/// when one of these is produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
	/// A key is not recognized in its section.
	UnknownField { field: String, suggestion: Option<String> },
	/// A value has the wrong type; the default was used.
	InvalidType {
		field: String,
		expected: &'static str,
		got: &'static str,
	},
	/// A numeric value is outside its allowed range; the default was used.
	OutOfRange { field: String, value: i64 },
	/// A position key is not a positive integer.
	InvalidPositionKey { field: String, key: String },
	/// A slot value is not a 32-bit integer.
	InvalidSlot { position: Position, value: String },
	/// Two positions map to the same slot; the higher position was dropped.
	DuplicateSlot { position: Position, slot: Slot, claimed_by: Position },
	/// No usable slot mapping was configured; the built-in table is in effect.
	DefaultSlotMapping,
	/// A recipe section name is blank.
	InvalidRecipeKey { key: String },
	/// Two recipe sections normalize to the same key and were merged.
	MergedRecipe { key: RecipeKey },
	/// A command entry had no usable commands and was omitted.
	EmptyCommands { recipe: RecipeKey, position: Position },
	/// A command has an executor tag but nothing to run; it was dropped.
	EmptyTemplate { recipe: RecipeKey, position: Position, raw: String },
	/// One element of a command list was not a command and was skipped.
	SkippedCommand { field: String, got: &'static str },
	/// A title pattern failed to compile and is matched literally instead.
	InvalidTitlePattern { pattern: String, error: String },
}

impl fmt::Display for ConfigWarning {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::UnknownField { field, suggestion } => {
				write!(f, "unknown field '{field}'")?;
				if let Some(s) = suggestion {
					write!(f, " (did you mean '{s}'?)")?;
				}
				Ok(())
			}
			Self::InvalidType { field, expected, got } => {
				write!(f, "invalid type for '{field}': expected {expected}, got {got}; using default")
			}
			Self::OutOfRange { field, value } => write!(f, "'{field}' is out of range ({value}); using default"),
			Self::InvalidPositionKey { field, key } => write!(f, "invalid position '{key}' in {field}"),
			Self::InvalidSlot { position, value } => write!(f, "invalid slot '{value}' for position {position}"),
			Self::DuplicateSlot {
				position,
				slot,
				claimed_by,
			} => write!(f, "position {position} maps to slot {slot} already used by position {claimed_by}; skipped"),
			Self::DefaultSlotMapping => f.write_str("no slot mapping configured; using the default 12-position table"),
			Self::InvalidRecipeKey { key } => write!(f, "invalid recipe key '{key}'"),
			Self::MergedRecipe { key } => write!(f, "recipe '{key}' is configured more than once; sections merged"),
			Self::EmptyCommands { recipe, position } => {
				write!(f, "recipe '{recipe}' position {position} has no valid commands; omitted")
			}
			Self::EmptyTemplate { recipe, position, raw } => {
				write!(f, "recipe '{recipe}' position {position}: command '{raw}' has no body; dropped")
			}
			Self::SkippedCommand { field, got } => write!(f, "skipped non-command {got} in {field}"),
			Self::InvalidTitlePattern { pattern, error } => {
				write!(f, "title pattern '{pattern}' is not a valid regex ({error}); matching literally")
			}
		}
	}
}
