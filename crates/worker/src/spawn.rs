use std::future::Future;
use std::sync::OnceLock;

use tokio::task::JoinHandle;

use crate::TaskClass;

fn runtime_handle() -> tokio::runtime::Handle {
	if let Ok(handle) = tokio::runtime::Handle::try_current() {
		return handle;
	}

	static GLOBAL_RT: OnceLock<tokio::runtime::Runtime> = OnceLock::new();
	let runtime = GLOBAL_RT.get_or_init(|| {
		tokio::runtime::Builder::new_multi_thread()
			.enable_all()
			.worker_threads(1)
			.thread_name("crafthook-worker-global")
			.build()
			.expect("failed to build crafthook-worker global tokio runtime")
	});
	runtime.handle().clone()
}

/// Spawns an async task with shared worker classification metadata.
///
/// Uses the ambient tokio runtime when there is one, otherwise a small
/// process-wide fallback runtime.
pub fn spawn<F>(class: TaskClass, fut: F) -> JoinHandle<F::Output>
where
	F: Future + Send + 'static,
	F::Output: Send + 'static,
{
	tracing::trace!(worker_class = class.as_str(), "worker.spawn");
	runtime_handle().spawn(fut)
}

/// Spawns a dedicated named OS thread with shared worker classification metadata.
pub fn spawn_named_thread<F, R>(class: TaskClass, name: impl Into<String>, f: F) -> std::io::Result<std::thread::JoinHandle<R>>
where
	F: FnOnce() -> R + Send + 'static,
	R: Send + 'static,
{
	tracing::trace!(worker_class = class.as_str(), "worker.spawn_named_thread");
	std::thread::Builder::new().name(name.into()).spawn(f)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn spawn_without_ambient_runtime_uses_fallback() {
		let (tx, rx) = std::sync::mpsc::channel();
		let _task = spawn(TaskClass::Background, async move {
			let _ = tx.send(7);
		});
		assert_eq!(rx.recv_timeout(std::time::Duration::from_secs(5)).ok(), Some(7));
	}

	#[test]
	fn named_thread_carries_name() {
		let handle = spawn_named_thread(TaskClass::Serial, "crafthook-test", || {
			std::thread::current().name().map(str::to_string)
		})
		.unwrap();
		assert_eq!(handle.join().unwrap().as_deref(), Some("crafthook-test"));
	}
}
