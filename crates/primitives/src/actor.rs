use std::sync::Arc;

use crate::ActorId;

/// Kind of agent behind an interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActorKind {
	/// A connected player; the only kind that triggers rules.
	Player,
	/// Anything else the host reports (NPCs, automation, console proxies).
	Other,
}

/// Block coordinates of an actor's location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BlockPos {
	pub x: i32,
	pub y: i32,
	pub z: i32,
}

impl BlockPos {
	pub const fn new(x: i32, y: i32, z: i32) -> Self {
		Self { x, y, z }
	}
}

/// Live actor state captured by the host when an event is raised.
///
/// Identity fields (`id`, `name`, `display_name`) are stable for the lifetime
/// of a connection. `world` and `location` change every tick and must be read
/// fresh for every dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActorContext {
	pub id: ActorId,
	pub kind: ActorKind,
	pub name: Arc<str>,
	pub display_name: Arc<str>,
	pub world: Arc<str>,
	pub location: BlockPos,
}

impl ActorContext {
	/// Creates a player context whose display name equals its name.
	pub fn player(id: ActorId, name: &str, world: &str, location: BlockPos) -> Self {
		let name: Arc<str> = Arc::from(name);
		Self {
			id,
			kind: ActorKind::Player,
			display_name: Arc::clone(&name),
			name,
			world: Arc::from(world),
			location,
		}
	}

	/// Overrides the display name.
	#[must_use]
	pub fn with_display_name(mut self, display_name: &str) -> Self {
		self.display_name = Arc::from(display_name);
		self
	}

	/// Overrides the actor kind.
	#[must_use]
	pub fn with_kind(mut self, kind: ActorKind) -> Self {
		self.kind = kind;
		self
	}

	/// Returns true when this actor may trigger rules.
	pub fn is_player(&self) -> bool {
		self.kind == ActorKind::Player
	}
}
