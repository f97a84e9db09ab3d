use std::fmt;

use uuid::Uuid;

/// Stable identity of an acting agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActorId(Uuid);

impl ActorId {
	/// Wraps a host-provided UUID.
	pub const fn from_uuid(uuid: Uuid) -> Self {
		Self(uuid)
	}

	/// Generates a random identity. Mostly useful for tests and fakes.
	pub fn random() -> Self {
		Self(Uuid::new_v4())
	}

	/// Returns the underlying UUID.
	pub const fn as_uuid(&self) -> &Uuid {
		&self.0
	}
}

impl fmt::Display for ActorId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		self.0.hyphenated().fmt(f)
	}
}

impl From<Uuid> for ActorId {
	fn from(uuid: Uuid) -> Self {
		Self(uuid)
	}
}

/// Host-assigned identifier of one open menu instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "session#{}", self.0)
	}
}
