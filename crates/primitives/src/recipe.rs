use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

/// Normalized identifier of the recipe or item a menu session concerns.
///
/// Keys are trimmed and upper-cased on construction, so `" sword01"` and
/// `"SWORD01"` are the same key. Cloning is cheap.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecipeKey(Arc<str>);

impl RecipeKey {
	/// Raw spelling of the sentinel used when detection finds nothing.
	pub const FALLBACK: &'static str = "default_crafting";

	/// Normalizes `raw` into a key. Returns `None` when nothing is left after trimming.
	pub fn new(raw: &str) -> Option<Self> {
		let trimmed = raw.trim();
		if trimmed.is_empty() {
			return None;
		}
		Some(Self(Arc::from(trimmed.to_uppercase())))
	}

	/// The shared fallback key.
	pub fn fallback() -> Self {
		Self(Arc::from(Self::FALLBACK.to_uppercase()))
	}

	/// Returns true for the fallback sentinel.
	pub fn is_fallback(&self) -> bool {
		self.0.eq_ignore_ascii_case(Self::FALLBACK)
	}

	/// Returns the normalized spelling.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Debug for RecipeKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "RecipeKey({:?})", &*self.0)
	}
}

impl fmt::Display for RecipeKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl Borrow<str> for RecipeKey {
	fn borrow(&self) -> &str {
		&self.0
	}
}

impl AsRef<str> for RecipeKey {
	fn as_ref(&self) -> &str {
		&self.0
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn keys_are_trimmed_and_uppercased() {
		let key = RecipeKey::new("  sword01 ").unwrap();
		assert_eq!(key.as_str(), "SWORD01");
		assert_eq!(key, RecipeKey::new("SWORD01").unwrap());
	}

	#[test]
	fn blank_input_is_not_a_key() {
		assert!(RecipeKey::new("   ").is_none());
	}

	#[test]
	fn fallback_matches_configured_section_name() {
		let from_config = RecipeKey::new("default_crafting").unwrap();
		assert_eq!(from_config, RecipeKey::fallback());
		assert!(from_config.is_fallback());
		assert!(!RecipeKey::new("SWORD01").unwrap().is_fallback());
	}
}
