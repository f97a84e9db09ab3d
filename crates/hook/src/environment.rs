//! Host side-effect seam.

use crafthook_primitives::ActorId;

/// Failure reported by the host for one side effect.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EnvError {
	#[error("actor {0} is not online")]
	ActorOffline(ActorId),
	#[error("command rejected: {0}")]
	Rejected(String),
	#[error("host error: {0}")]
	Host(String),
}

/// Side effects the dispatcher needs from the host.
///
/// Calls are made by [`crate::ActionRunner`] while it holds its execution
/// lock, so no two calls ever overlap, even when inline dispatch runs on
/// several caller threads.
pub trait Environment: Send + Sync + 'static {
	/// Runs `command` with system authority.
	fn run_console(&self, command: &str) -> Result<(), EnvError>;

	/// Runs `command` as `actor` with the actor's current authority.
	fn run_as_actor(&self, actor: ActorId, command: &str) -> Result<(), EnvError>;

	fn is_elevated(&self, actor: ActorId) -> Result<bool, EnvError>;

	fn set_elevated(&self, actor: ActorId, elevated: bool) -> Result<(), EnvError>;

	/// Sends an already colour-translated chat message.
	fn send_message(&self, actor: ActorId, message: &str) -> Result<(), EnvError>;
}
