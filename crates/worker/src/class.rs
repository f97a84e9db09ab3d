/// Shared execution classes used for worker scheduling and observability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskClass {
	/// Work on the serialized execution context that runs host side effects.
	Serial,
	/// Delayed work tied to a player interaction, such as recipe detection.
	Interactive,
	/// Maintenance that can be delayed under pressure.
	Background,
}

impl TaskClass {
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Serial => "serial",
			Self::Interactive => "interactive",
			Self::Background => "background",
		}
	}
}
