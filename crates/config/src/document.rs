use std::path::Path;

use serde_json::Value;

use crate::{ConfigError, Result};

/// Loosely typed configuration tree.
///
/// This is the hand-off point between file-format parsing (owned by the host
/// or by the thin adapters below) and typed validation in
/// [`crate::HookConfig::from_document`].
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigDocument {
	root: Value,
}

impl Default for ConfigDocument {
	fn default() -> Self {
		Self::empty()
	}
}

impl ConfigDocument {
	/// Wraps an already-built value tree.
	pub fn from_value(root: Value) -> Self {
		Self { root }
	}

	/// A document with an empty root table. Validates to all defaults.
	pub fn empty() -> Self {
		Self {
			root: Value::Object(serde_json::Map::new()),
		}
	}

	/// Parses a JSON document.
	pub fn from_json_str(input: &str) -> Result<Self> {
		Ok(Self {
			root: serde_json::from_str(input)?,
		})
	}

	/// Parses a TOML document.
	pub fn from_toml_str(input: &str) -> Result<Self> {
		Ok(Self {
			root: toml::from_str(input)?,
		})
	}

	/// Reads a document from disk, choosing the parser by file extension.
	pub fn load(path: impl AsRef<Path>) -> Result<Self> {
		let path = path.as_ref();
		let content = std::fs::read_to_string(path).map_err(|error| ConfigError::Io {
			path: path.to_path_buf(),
			error,
		})?;
		match path.extension().and_then(|ext| ext.to_str()) {
			Some("toml") => Self::from_toml_str(&content),
			Some("json") => Self::from_json_str(&content),
			_ => Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
		}
	}

	/// Returns the root value.
	pub fn root(&self) -> &Value {
		&self.root
	}
}

#[cfg(test)]
mod tests {
	use std::io::Write;

	use super::*;

	#[test]
	fn toml_and_json_produce_the_same_tree() {
		let toml = ConfigDocument::from_toml_str(
			r#"
			[slot-mapping.positions]
			"1" = 10
			"#,
		)
		.unwrap();
		let json = ConfigDocument::from_json_str(r#"{"slot-mapping": {"positions": {"1": 10}}}"#).unwrap();
		assert_eq!(toml, json);
	}

	#[test]
	fn load_dispatches_on_extension() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("hook.toml");
		let mut file = std::fs::File::create(&path).unwrap();
		writeln!(file, "version = \"3\"").unwrap();

		let doc = ConfigDocument::load(&path).unwrap();
		assert_eq!(doc.root()["version"], "3");

		let yaml = dir.path().join("hook.yml");
		std::fs::write(&yaml, "version: 3").unwrap();
		assert!(matches!(ConfigDocument::load(&yaml), Err(ConfigError::UnsupportedFormat(_))));
	}

	#[test]
	fn missing_file_reports_path() {
		let err = ConfigDocument::load("/nonexistent/crafthook.toml").unwrap_err();
		assert!(err.to_string().contains("/nonexistent/crafthook.toml"));
	}
}
