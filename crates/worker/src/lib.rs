//! Worker primitives shared by the hook runtime.
//!
//! * [`TaskClass`] tags every spawned unit of work for tracing.
//! * [`serial_channel`] builds the bounded queue that feeds the single
//!   serialized execution context all side effects run on.
//! * [`spawn_periodic`] runs maintenance work on a fixed interval until
//!   cancelled.

mod budget;
mod class;
mod panic;
mod periodic;
mod serial;
mod spawn;

pub use budget::{DrainBudget, DrainReport};
pub use class::TaskClass;
pub use panic::panic_message;
pub use periodic::{PeriodicHandle, spawn_periodic};
pub use serial::{SerialPort, SerialQueue, SerialSendError, SerialThread, serial_channel};
pub use spawn::{spawn, spawn_named_thread};
