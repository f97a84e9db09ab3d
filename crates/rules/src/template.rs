//! Command templates and their executor classes.

use std::fmt;
use std::sync::Arc;

/// Authority a command runs with, selected by its leading tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExecutorClass {
	/// `[console]`, or no recognized tag: system authority.
	Console,
	/// `[op]`: as the actor, with elevated authority granted for the call.
	ElevatedAsActor,
	/// `[player]`: as the actor, with its own authority.
	AsActor,
	/// `[message]`: sent to the actor after `&` colour translation.
	Notify,
}

impl ExecutorClass {
	const TAGS: [(&'static str, Self); 4] = [
		("[console]", Self::Console),
		("[op]", Self::ElevatedAsActor),
		("[player]", Self::AsActor),
		("[message]", Self::Notify),
	];

	/// Leading tag spelling.
	pub const fn tag(self) -> &'static str {
		match self {
			Self::Console => "[console]",
			Self::ElevatedAsActor => "[op]",
			Self::AsActor => "[player]",
			Self::Notify => "[message]",
		}
	}

	/// Splits a raw command into its class and trimmed body.
	///
	/// Tags are case-sensitive. An unrecognized bracket prefix is part of the
	/// body and the command runs on the console.
	pub fn split(raw: &str) -> (Self, &str) {
		let raw = raw.trim();
		for (tag, class) in Self::TAGS {
			if let Some(rest) = raw.strip_prefix(tag) {
				return (class, rest.trim());
			}
		}
		(Self::Console, raw)
	}
}

impl fmt::Display for ExecutorClass {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			Self::Console => "console",
			Self::ElevatedAsActor => "elevated",
			Self::AsActor => "actor",
			Self::Notify => "message",
		};
		f.write_str(name)
	}
}

/// One classified command.
///
/// The body still contains its `%placeholder%` tokens; they are filled in
/// per dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTemplate {
	class: ExecutorClass,
	body: Arc<str>,
	has_placeholders: bool,
}

impl CommandTemplate {
	/// Classifies a raw command. Returns `None` when nothing is left to run
	/// after removing the tag.
	pub fn parse(raw: &str) -> Option<Self> {
		let (class, body) = ExecutorClass::split(raw);
		if body.is_empty() {
			return None;
		}
		Some(Self {
			class,
			has_placeholders: body.contains('%'),
			body: Arc::from(body),
		})
	}

	pub fn class(&self) -> ExecutorClass {
		self.class
	}

	/// Command text without its tag.
	pub fn body(&self) -> &str {
		&self.body
	}

	/// False when the body can be used verbatim.
	pub fn has_placeholders(&self) -> bool {
		self.has_placeholders
	}
}

impl fmt::Display for CommandTemplate {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} {}", self.class.tag(), self.body)
	}
}

/// Ordered commands bound to one `(recipe, position)`.
///
/// Entries stored in a rule table are never empty; the empty entry is what
/// lookups return for unbound pairs. Cloning is cheap.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandEntry(Option<Arc<[CommandTemplate]>>);

impl CommandEntry {
	/// Wraps templates. An empty list yields the empty entry.
	pub fn new(templates: Vec<CommandTemplate>) -> Self {
		if templates.is_empty() {
			Self(None)
		} else {
			Self(Some(Arc::from(templates)))
		}
	}

	/// The entry returned for pairs with no commands.
	pub const fn empty() -> Self {
		Self(None)
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_none()
	}

	pub fn len(&self) -> usize {
		self.as_slice().len()
	}

	pub fn as_slice(&self) -> &[CommandTemplate] {
		self.0.as_deref().unwrap_or_default()
	}

	pub fn iter(&self) -> std::slice::Iter<'_, CommandTemplate> {
		self.as_slice().iter()
	}

	/// True when both handles point at the same stored entry.
	pub fn ptr_eq(&self, other: &Self) -> bool {
		match (&self.0, &other.0) {
			(Some(a), Some(b)) => Arc::ptr_eq(a, b),
			(None, None) => true,
			_ => false,
		}
	}
}

impl<'a> IntoIterator for &'a CommandEntry {
	type Item = &'a CommandTemplate;
	type IntoIter = std::slice::Iter<'a, CommandTemplate>;

	fn into_iter(self) -> Self::IntoIter {
		self.iter()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn tags_select_class_and_are_stripped() {
		let cases = [
			("[console] say hi", ExecutorClass::Console, "say hi"),
			("[op] gamemode creative %actor%", ExecutorClass::ElevatedAsActor, "gamemode creative %actor%"),
			("[player]spawn", ExecutorClass::AsActor, "spawn"),
			("  [message]   &aDone ", ExecutorClass::Notify, "&aDone"),
			("give %actor% diamond 1", ExecutorClass::Console, "give %actor% diamond 1"),
		];
		for (raw, class, body) in cases {
			let template = CommandTemplate::parse(raw).unwrap();
			assert_eq!(template.class(), class, "{raw}");
			assert_eq!(template.body(), body, "{raw}");
		}
	}

	#[test]
	fn unknown_or_differently_cased_tags_run_on_console_verbatim() {
		let template = CommandTemplate::parse("[OP] kill").unwrap();
		assert_eq!(template.class(), ExecutorClass::Console);
		assert_eq!(template.body(), "[OP] kill");

		let template = CommandTemplate::parse("[admin] kill").unwrap();
		assert_eq!(template.body(), "[admin] kill");
	}

	#[test]
	fn tag_without_body_is_rejected() {
		assert!(CommandTemplate::parse("[message]   ").is_none());
		assert!(CommandTemplate::parse("   ").is_none());
	}

	#[test]
	fn placeholder_flag() {
		assert!(CommandTemplate::parse("give %actor% x").unwrap().has_placeholders());
		assert!(!CommandTemplate::parse("say hi").unwrap().has_placeholders());
	}

	#[test]
	fn display_restores_tag() {
		let template = CommandTemplate::parse("heal").unwrap();
		assert_eq!(template.to_string(), "[console] heal");
	}

	#[test]
	fn empty_entry() {
		let entry = CommandEntry::new(Vec::new());
		assert!(entry.is_empty());
		assert_eq!(entry, CommandEntry::empty());
		assert_eq!(entry.len(), 0);
		assert!(entry.iter().next().is_none());
	}
}
