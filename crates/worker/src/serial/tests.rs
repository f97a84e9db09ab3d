use std::sync::mpsc as std_mpsc;
use std::time::Duration;

use super::*;

#[test]
fn drain_runs_jobs_in_order() {
	let (port, mut queue) = serial_channel::<u32>(8);
	for i in 0..5 {
		port.send(i).unwrap();
	}

	let mut seen = Vec::new();
	let report = queue.drain(DrainBudget::unbounded(), |job| seen.push(job));

	assert_eq!(seen, vec![0, 1, 2, 3, 4]);
	assert_eq!(
		report,
		DrainReport {
			completed: 5,
			pending: 0,
			budget_exhausted: false,
		}
	);
}

#[test]
fn drain_respects_completion_budget() {
	let (port, mut queue) = serial_channel::<u32>(8);
	for i in 0..5 {
		port.send(i).unwrap();
	}

	let budget = DrainBudget {
		duration: Duration::from_secs(60),
		max_completions: 3,
	};
	let mut seen = Vec::new();
	let report = queue.drain(budget, |job| seen.push(job));
	assert_eq!(seen, vec![0, 1, 2]);
	assert_eq!(report.pending, 2);
	assert!(report.budget_exhausted);

	let report = queue.drain(budget, |job| seen.push(job));
	assert_eq!(seen, vec![0, 1, 2, 3, 4]);
	assert!(!report.budget_exhausted);
}

#[test]
fn zero_budget_only_reports() {
	let (port, mut queue) = serial_channel::<u32>(4);
	port.send(1).unwrap();
	let report = queue.drain(
		DrainBudget {
			duration: Duration::from_secs(1),
			max_completions: 0,
		},
		|_| panic!("must not run"),
	);
	assert_eq!(report.completed, 0);
	assert_eq!(report.pending, 1);
}

#[test]
fn full_queue_hands_job_back_and_counts_drop() {
	let (port, queue) = serial_channel::<&'static str>(1);
	port.send("first").unwrap();

	let err = port.send("second").unwrap_err();
	assert!(matches!(err, SerialSendError::Full(_)));
	assert_eq!(err.into_inner(), "second");
	assert_eq!(port.dropped(), 1);
	assert_eq!(queue.dropped(), 1);
}

#[test]
fn closed_queue_rejects_jobs() {
	let (port, queue) = serial_channel::<u8>(1);
	drop(queue);
	assert!(port.is_closed());
	assert!(matches!(port.send(3), Err(SerialSendError::Closed(3))));
	assert_eq!(port.dropped(), 0);
}

#[test]
fn panicking_job_does_not_stop_drain() {
	let (port, mut queue) = serial_channel::<u32>(4);
	for i in 0..3 {
		port.send(i).unwrap();
	}

	let mut seen = Vec::new();
	let report = queue.drain(DrainBudget::unbounded(), |job| {
		if job == 1 {
			panic!("job one fails");
		}
		seen.push(job);
	});
	assert_eq!(seen, vec![0, 2]);
	assert_eq!(report.completed, 3);
}

#[test]
fn dedicated_thread_runs_queued_jobs_before_stopping() {
	let (port, queue) = serial_channel::<u32>(16);
	let (tx, rx) = std_mpsc::channel();
	let thread = queue
		.spawn_dedicated("crafthook-serial-test", move |job| {
			if job == 2 {
				panic!("boom");
			}
			let _ = tx.send((job, std::thread::current().name().map(str::to_string)));
		})
		.unwrap();

	for i in 0..4 {
		port.send(i).unwrap();
	}
	thread.shutdown();

	let got: Vec<_> = rx.try_iter().collect();
	let name = Some("crafthook-serial-test".to_string());
	assert_eq!(got, vec![(0, name.clone()), (1, name.clone()), (3, name)]);
	assert!(port.is_closed());
}
