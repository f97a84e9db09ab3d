//! Serialized job execution.
//!
//! Producers on any thread enqueue jobs through a cloneable [`SerialPort`];
//! exactly one consumer runs them in enqueue order. The consumer is either the
//! host's own tick loop calling [`SerialQueue::drain`], or a dedicated thread
//! started with [`SerialQueue::spawn_dedicated`].
//!
//! # Invariants
//!
//! * Jobs from one producer run in the order they were sent.
//! * At most one job runs at a time.
//! * A job that panics is logged and counted as completed; the queue keeps
//!   running.
//! * Enqueueing never blocks. A full or closed queue hands the job back.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Instant;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::{TryRecvError, TrySendError};

use crate::{DrainBudget, DrainReport, TaskClass, panic_message, spawn_named_thread};

enum Message<J> {
	Job(J),
	Stop,
}

/// Why a job was not enqueued. The job is handed back.
#[derive(Debug, thiserror::Error)]
pub enum SerialSendError<J> {
	#[error("serial queue is full")]
	Full(J),
	#[error("serial queue is closed")]
	Closed(J),
}

impl<J> SerialSendError<J> {
	/// Recovers the job that was not enqueued.
	pub fn into_inner(self) -> J {
		match self {
			Self::Full(job) | Self::Closed(job) => job,
		}
	}
}

/// Creates a bounded serial queue.
pub fn serial_channel<J>(capacity: usize) -> (SerialPort<J>, SerialQueue<J>)
where
	J: Send + 'static,
{
	let (tx, rx) = mpsc::channel(capacity.max(1));
	let drops = Arc::new(AtomicU64::new(0));
	let weak = tx.downgrade();
	(
		SerialPort {
			tx,
			drops: Arc::clone(&drops),
		},
		SerialQueue {
			rx,
			drops,
			wake: weak,
		},
	)
}

/// Cloneable enqueue side of a serial queue.
pub struct SerialPort<J> {
	tx: mpsc::Sender<Message<J>>,
	drops: Arc<AtomicU64>,
}

impl<J> Clone for SerialPort<J> {
	fn clone(&self) -> Self {
		Self {
			tx: self.tx.clone(),
			drops: Arc::clone(&self.drops),
		}
	}
}

impl<J> std::fmt::Debug for SerialPort<J> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("SerialPort")
			.field("capacity", &self.tx.max_capacity())
			.field("drops", &self.drops.load(Ordering::Relaxed))
			.finish()
	}
}

impl<J> SerialPort<J>
where
	J: Send + 'static,
{
	/// Non-blocking enqueue.
	pub fn send(&self, job: J) -> Result<(), SerialSendError<J>> {
		match self.tx.try_send(Message::Job(job)) {
			Ok(()) => Ok(()),
			Err(TrySendError::Full(Message::Job(job))) => {
				let count = self.drops.fetch_add(1, Ordering::Relaxed);
				if count % 1024 == 0 {
					tracing::warn!(drops = count + 1, "serial queue full, dropping job");
				}
				Err(SerialSendError::Full(job))
			}
			Err(TrySendError::Closed(Message::Job(job))) => Err(SerialSendError::Closed(job)),
			// Ports never send stop markers.
			Err(TrySendError::Full(Message::Stop) | TrySendError::Closed(Message::Stop)) => Ok(()),
		}
	}

	/// Number of jobs rejected because the queue was full.
	pub fn dropped(&self) -> u64 {
		self.drops.load(Ordering::Relaxed)
	}

	/// Returns true once the consumer is gone.
	pub fn is_closed(&self) -> bool {
		self.tx.is_closed()
	}
}

/// Consumer side of a serial queue.
pub struct SerialQueue<J> {
	rx: mpsc::Receiver<Message<J>>,
	drops: Arc<AtomicU64>,
	wake: mpsc::WeakSender<Message<J>>,
}

impl<J> std::fmt::Debug for SerialQueue<J> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("SerialQueue")
			.field("pending", &self.rx.len())
			.field("drops", &self.drops.load(Ordering::Relaxed))
			.finish()
	}
}

impl<J> SerialQueue<J>
where
	J: Send + 'static,
{
	/// Runs queued jobs on the calling thread until the queue is empty or the
	/// budget runs out.
	pub fn drain(&mut self, budget: DrainBudget, mut run: impl FnMut(J)) -> DrainReport {
		if budget.max_completions == 0 {
			return DrainReport {
				pending: self.rx.len(),
				budget_exhausted: !self.rx.is_empty(),
				..DrainReport::default()
			};
		}

		let deadline = Instant::now().checked_add(budget.duration);
		let mut completed = 0u64;
		let mut exhausted = false;

		loop {
			if completed as usize >= budget.max_completions || deadline.is_some_and(|d| Instant::now() >= d) {
				exhausted = true;
				break;
			}
			match self.rx.try_recv() {
				Ok(Message::Job(job)) => {
					run_guarded(&mut run, job);
					completed += 1;
				}
				Ok(Message::Stop) => {}
				Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
			}
		}

		let pending = self.rx.len();
		tracing::trace!(worker_class = TaskClass::Serial.as_str(), completed, pending, "worker.serial.drain");
		DrainReport {
			completed,
			pending,
			budget_exhausted: exhausted && pending > 0,
		}
	}

	/// Jobs currently queued.
	pub fn pending(&self) -> usize {
		self.rx.len()
	}

	/// Number of jobs rejected because the queue was full.
	pub fn dropped(&self) -> u64 {
		self.drops.load(Ordering::Relaxed)
	}

	/// Moves the queue onto a dedicated named thread that runs each job as it
	/// arrives.
	pub fn spawn_dedicated(self, name: impl Into<String>, mut run: impl FnMut(J) + Send + 'static) -> std::io::Result<SerialThread<J>> {
		let Self { mut rx, wake, .. } = self;
		let stop = Arc::new(AtomicBool::new(false));
		let thread_stop = Arc::clone(&stop);
		let handle = spawn_named_thread(TaskClass::Serial, name, move || {
			while let Some(msg) = rx.blocking_recv() {
				match msg {
					Message::Job(job) => run_guarded(&mut run, job),
					Message::Stop => break,
				}
				if thread_stop.load(Ordering::Acquire) {
					break;
				}
			}
			tracing::debug!(worker_class = TaskClass::Serial.as_str(), "serial consumer exited");
		})?;
		Ok(SerialThread {
			wake: wake.upgrade(),
			stop,
			handle: Some(handle),
		})
	}
}

fn run_guarded<J>(run: &mut impl FnMut(J), job: J) {
	if let Err(payload) = catch_unwind(AssertUnwindSafe(|| run(job))) {
		tracing::error!(
			worker_class = TaskClass::Serial.as_str(),
			panic = %panic_message(payload.as_ref()),
			"serial job panicked"
		);
	}
}

/// Handle to a dedicated serial consumer thread.
pub struct SerialThread<J> {
	wake: Option<mpsc::Sender<Message<J>>>,
	stop: Arc<AtomicBool>,
	handle: Option<std::thread::JoinHandle<()>>,
}

impl<J> SerialThread<J> {
	/// Stops the consumer and joins its thread.
	///
	/// Jobs already queued run first when the stop marker fits in the queue.
	/// On a full queue the thread exits after its current job and the rest
	/// are discarded. Blocks the calling thread until the consumer exits.
	pub fn shutdown(mut self) {
		let queued = self.wake.take().is_some_and(|tx| tx.try_send(Message::Stop).is_ok());
		if !queued {
			self.stop.store(true, Ordering::Release);
		}
		if let Some(handle) = self.handle.take()
			&& handle.join().is_err()
		{
			tracing::error!("serial consumer thread panicked");
		}
	}

	/// Returns true once the consumer thread has exited.
	pub fn is_finished(&self) -> bool {
		self.handle.as_ref().is_none_or(|h| h.is_finished())
	}
}

impl<J> std::fmt::Debug for SerialThread<J> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("SerialThread").field("finished", &self.is_finished()).finish()
	}
}

#[cfg(test)]
mod tests;
