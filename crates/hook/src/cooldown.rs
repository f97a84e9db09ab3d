//! Per-actor trigger cooldown.
//!
//! # Concurrency
//!
//! Records live in a sharded [`DashMap`]. [`CooldownGate::try_acquire`] does
//! its check-and-set under the entry's shard lock, so two racing triggers from
//! one actor cannot both pass. [`CooldownGate::sweep`] locks one shard at a
//! time and may run alongside acquisitions for other actors.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crafthook_primitives::ActorId;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::time::Instant;

#[derive(Debug)]
pub struct CooldownGate {
	expiries: DashMap<ActorId, Instant>,
	enabled: AtomicBool,
}

impl Default for CooldownGate {
	fn default() -> Self {
		Self::new(true)
	}
}

impl CooldownGate {
	pub fn new(enabled: bool) -> Self {
		Self {
			expiries: DashMap::new(),
			enabled: AtomicBool::new(enabled),
		}
	}

	/// Starts a cooldown for `actor` unless one is running.
	///
	/// Returns false while blocked. Always true when the gate is disabled.
	pub fn try_acquire(&self, actor: ActorId, duration: Duration) -> bool {
		if !self.is_enabled() {
			return true;
		}
		let now = Instant::now();
		match self.expiries.entry(actor) {
			Entry::Occupied(mut entry) => {
				if now < *entry.get() {
					return false;
				}
				*entry.get_mut() = now + duration;
				true
			}
			Entry::Vacant(entry) => {
				entry.insert(now + duration);
				true
			}
		}
	}

	/// Checks without acquiring. Drops the record if it has expired.
	pub fn is_blocked(&self, actor: ActorId) -> bool {
		if !self.is_enabled() {
			return false;
		}
		let now = Instant::now();
		if self.expiries.remove_if(&actor, |_, expiry| now >= *expiry).is_some() {
			return false;
		}
		self.expiries.get(&actor).is_some_and(|expiry| now < *expiry)
	}

	/// Time left on `actor`'s cooldown.
	pub fn remaining(&self, actor: ActorId) -> Option<Duration> {
		let now = Instant::now();
		self.expiries
			.get(&actor)
			.map(|expiry| expiry.saturating_duration_since(now))
			.filter(|left| !left.is_zero())
	}

	/// Removes every expired record. Returns how many were removed.
	pub fn sweep(&self) -> usize {
		let now = Instant::now();
		let mut removed = 0;
		self.expiries.retain(|_, expiry| {
			let keep = now < *expiry;
			removed += usize::from(!keep);
			keep
		});
		if removed > 0 {
			tracing::debug!(removed, remaining = self.expiries.len(), "cooldown sweep");
		}
		removed
	}

	pub fn set_enabled(&self, enabled: bool) {
		let was = self.enabled.swap(enabled, Ordering::AcqRel);
		if was && !enabled {
			self.expiries.clear();
		}
	}

	pub fn is_enabled(&self) -> bool {
		self.enabled.load(Ordering::Acquire)
	}

	/// Records currently held, expired ones included until swept.
	pub fn len(&self) -> usize {
		self.expiries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.expiries.is_empty()
	}
}
