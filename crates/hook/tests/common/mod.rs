#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crafthook_config::ConfigDocument;
use crafthook_hook::{EnvError, Environment};
use crafthook_primitives::{ActorContext, ActorId, BlockPos, ItemSnapshot, MenuSnapshot};
use parking_lot::Mutex;
use rustc_hash::FxHashSet;

/// Side effect observed by [`RecordingEnv`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
	Console(String),
	AsActor { command: String, elevated: bool },
	SetElevated(bool),
	Message(String),
}

/// Host fake that records every call.
///
/// Commands containing `fail` are rejected and commands containing `panic`
/// panic.
#[derive(Debug, Default)]
pub struct RecordingEnv {
	calls: Mutex<Vec<Call>>,
	elevated: Mutex<FxHashSet<ActorId>>,
	pub fail_restore: AtomicBool,
}

impl RecordingEnv {
	pub fn new() -> Arc<Self> {
		Arc::new(Self::default())
	}

	pub fn calls(&self) -> Vec<Call> {
		self.calls.lock().clone()
	}

	pub fn elevate(&self, actor: ActorId) {
		self.elevated.lock().insert(actor);
	}

	pub fn elevated(&self, actor: ActorId) -> bool {
		self.elevated.lock().contains(&actor)
	}

	fn check(command: &str) -> Result<(), EnvError> {
		if command.contains("panic") {
			panic!("host exploded on '{command}'");
		}
		if command.contains("fail") {
			return Err(EnvError::Rejected(command.to_string()));
		}
		Ok(())
	}
}

impl Environment for RecordingEnv {
	fn run_console(&self, command: &str) -> Result<(), EnvError> {
		self.calls.lock().push(Call::Console(command.to_string()));
		Self::check(command)
	}

	fn run_as_actor(&self, actor: ActorId, command: &str) -> Result<(), EnvError> {
		let elevated = self.elevated(actor);
		self.calls.lock().push(Call::AsActor {
			command: command.to_string(),
			elevated,
		});
		Self::check(command)
	}

	fn is_elevated(&self, actor: ActorId) -> Result<bool, EnvError> {
		Ok(self.elevated(actor))
	}

	fn set_elevated(&self, actor: ActorId, elevated: bool) -> Result<(), EnvError> {
		self.calls.lock().push(Call::SetElevated(elevated));
		if !elevated && self.fail_restore.load(Ordering::Relaxed) {
			return Err(EnvError::Host("permission backend unavailable".to_string()));
		}
		let mut set = self.elevated.lock();
		if elevated {
			set.insert(actor);
		} else {
			set.remove(&actor);
		}
		Ok(())
	}

	fn send_message(&self, _actor: ActorId, message: &str) -> Result<(), EnvError> {
		self.calls.lock().push(Call::Message(message.to_string()));
		Ok(())
	}
}

pub fn init_tracing() {
	let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

pub fn doc(toml: &str) -> ConfigDocument {
	ConfigDocument::from_toml_str(toml).unwrap()
}

pub fn alice() -> ActorContext {
	ActorContext::player(ActorId::random(), "Alice", "world", BlockPos::new(1, 64, -7))
}

/// A crafting menu with the marker item and `recipe` tagged on the result.
pub fn crafting_menu(recipe: &str) -> MenuSnapshot {
	MenuSnapshot::new("§8Chế tạo")
		.with_item(34, ItemSnapshot::new("PAPER").with_model_data(10004))
		.with_item(25, ItemSnapshot::new("DIAMOND_SWORD").with_raw_tag("MMOITEMS_ITEM_ID", recipe))
}
