use std::fmt;
use std::num::NonZeroU32;

/// Logical 1-based index of a "require-item" role in the crafting grid.
///
/// Positions are independent of the physical slot layout of the container;
/// the slot mapping translates between the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position(NonZeroU32);

impl Position {
	/// Creates a position, rejecting zero.
	pub const fn new(index: u32) -> Option<Self> {
		match NonZeroU32::new(index) {
			Some(n) => Some(Self(n)),
			None => None,
		}
	}

	/// Parses a configuration key such as `"3"` or `" 12 "`.
	///
	/// Returns `None` for anything that is not a positive integer.
	pub fn parse_key(key: &str) -> Option<Self> {
		key.trim().parse::<u32>().ok().and_then(Self::new)
	}

	/// Returns the raw 1-based index.
	pub const fn get(self) -> u32 {
		self.0.get()
	}
}

impl fmt::Display for Position {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		self.0.fmt(f)
	}
}

/// Physical index within an observed container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Slot(pub i32);

impl Slot {
	/// Returns the raw slot index.
	pub const fn get(self) -> i32 {
		self.0
	}
}

impl fmt::Display for Slot {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		self.0.fmt(f)
	}
}

impl From<i32> for Slot {
	fn from(raw: i32) -> Self {
		Self(raw)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parse_key_accepts_padded_positive_integers() {
		assert_eq!(Position::parse_key(" 12 ").map(Position::get), Some(12));
		assert_eq!(Position::parse_key("1").map(Position::get), Some(1));
	}

	#[test]
	fn parse_key_rejects_zero_negative_and_garbage() {
		assert!(Position::parse_key("0").is_none());
		assert!(Position::parse_key("-3").is_none());
		assert!(Position::parse_key("three").is_none());
		assert!(Position::parse_key("").is_none());
	}
}
