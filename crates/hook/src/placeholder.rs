//! `%token%` substitution.
//!
//! Substitution is a single left-to-right pass: text produced by a
//! replacement is never scanned again, so an actor named `%world%` stays
//! literal. Unknown tokens are left untouched.

use std::sync::Arc;

use crafthook_primitives::{ActorContext, ActorId};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

/// Identity values that stay stable for a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActorIdentity {
	pub name: Arc<str>,
	pub id: Arc<str>,
	pub display_name: Arc<str>,
}

impl ActorIdentity {
	fn of(actor: &ActorContext) -> Self {
		Self {
			name: Arc::clone(&actor.name),
			id: Arc::from(actor.id.to_string()),
			display_name: Arc::clone(&actor.display_name),
		}
	}
}

/// Identity entries kept before the cache starts over.
pub const IDENTITY_CACHE_CAPACITY: usize = 4096;

/// Identity values per actor, valid for one rules generation.
///
/// Entries leave on a generation bump, on [`IdentityCache::forget`], or all
/// at once when the cache is full.
#[derive(Debug)]
pub struct IdentityCache {
	inner: RwLock<CacheGeneration>,
	capacity: usize,
}

impl Default for IdentityCache {
	fn default() -> Self {
		Self::with_capacity(IDENTITY_CACHE_CAPACITY)
	}
}

#[derive(Debug, Default)]
struct CacheGeneration {
	generation: u64,
	entries: FxHashMap<ActorId, Arc<ActorIdentity>>,
}

impl IdentityCache {
	pub fn with_capacity(capacity: usize) -> Self {
		Self {
			inner: RwLock::default(),
			capacity: capacity.max(1),
		}
	}

	/// Cached identity of `actor`, filled from `actor` on a miss. A newer
	/// `generation` empties the cache first.
	pub fn get(&self, actor: &ActorContext, generation: u64) -> Arc<ActorIdentity> {
		{
			let inner = self.inner.read();
			if inner.generation == generation
				&& let Some(identity) = inner.entries.get(&actor.id)
			{
				return Arc::clone(identity);
			}
		}

		let mut inner = self.inner.write();
		if inner.generation < generation {
			inner.generation = generation;
			inner.entries.clear();
		}
		if inner.generation > generation {
			return Arc::new(ActorIdentity::of(actor));
		}
		if inner.entries.len() >= self.capacity && !inner.entries.contains_key(&actor.id) {
			tracing::debug!(entries = inner.entries.len(), "identity cache full; starting over");
			inner.entries.clear();
		}
		Arc::clone(inner.entries.entry(actor.id).or_insert_with(|| Arc::new(ActorIdentity::of(actor))))
	}

	/// Drops the entry for an actor that left.
	pub fn forget(&self, actor: ActorId) -> bool {
		self.inner.write().entries.remove(&actor).is_some()
	}

	pub fn len(&self) -> usize {
		self.inner.read().entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

/// Fills placeholders in `template`.
///
/// Identity tokens come from `identity`; `%world%`, `%x%`, `%y%` and `%z%`
/// are read from `actor` every time.
pub fn substitute(template: &str, identity: &ActorIdentity, actor: &ActorContext) -> String {
	let mut out = String::with_capacity(template.len() + 16);
	let mut rest = template;

	while let Some(open) = rest.find('%') {
		out.push_str(&rest[..open]);
		let after = &rest[open + 1..];
		let Some(close) = after.find('%') else {
			out.push_str(&rest[open..]);
			return out;
		};
		let name = &after[..close];
		if push_value(&mut out, name, identity, actor) {
			rest = &after[close + 1..];
		} else {
			// Not a token: keep the first '%' and rescan from the second.
			out.push('%');
			out.push_str(name);
			rest = &after[close..];
		}
	}
	out.push_str(rest);
	out
}

fn push_value(out: &mut String, name: &str, identity: &ActorIdentity, actor: &ActorContext) -> bool {
	use std::fmt::Write;

	match name {
		"actor" | "actor_name" | "player" | "player_name" => out.push_str(&identity.name),
		"actor_id" | "player_uuid" => out.push_str(&identity.id),
		"actor_display_name" | "player_displayname" => out.push_str(&identity.display_name),
		"world" => out.push_str(&actor.world),
		"x" => {
			let _ = write!(out, "{}", actor.location.x);
		}
		"y" => {
			let _ = write!(out, "{}", actor.location.y);
		}
		"z" => {
			let _ = write!(out, "{}", actor.location.z);
		}
		_ => return false,
	}
	true
}

#[cfg(test)]
mod tests {
	use crafthook_primitives::BlockPos;
	use proptest::prelude::*;

	use super::*;

	fn alice() -> ActorContext {
		ActorContext::player(ActorId::random(), "Alice", "world_nether", BlockPos::new(12, 64, -3))
			.with_display_name("§bAlice the Brave")
	}

	fn fill(template: &str, actor: &ActorContext) -> String {
		substitute(template, &ActorIdentity::of(actor), actor)
	}

	#[test]
	fn all_tokens_are_replaced() {
		let actor = alice();
		assert_eq!(fill("gamemode creative %actor%", &actor), "gamemode creative Alice");
		assert_eq!(
			fill("tp %actor_name% %x% %y% %z% in %world%", &actor),
			"tp Alice 12 64 -3 in world_nether"
		);
		assert_eq!(fill("%actor_id%", &actor), actor.id.to_string());
		assert_eq!(fill("hi %actor_display_name%", &actor), "hi §bAlice the Brave");
	}

	#[test]
	fn legacy_aliases_are_replaced() {
		let actor = alice();
		assert_eq!(
			fill("%player% %player_name% %player_displayname%", &actor),
			"Alice Alice §bAlice the Brave"
		);
		assert_eq!(fill("%player_uuid%", &actor), actor.id.to_string());
	}

	#[test]
	fn unknown_tokens_and_stray_percent_signs_survive() {
		let actor = alice();
		assert_eq!(fill("100% of %actor%", &actor), "100% of Alice");
		assert_eq!(fill("%unknown% %actor%", &actor), "%unknown% Alice");
		assert_eq!(fill("50%", &actor), "50%");
		assert_eq!(fill("%%actor%%", &actor), "%Alice%");
	}

	#[test]
	fn replacement_text_is_not_rescanned() {
		let actor = ActorContext::player(ActorId::random(), "%world%", "overworld", BlockPos::default());
		assert_eq!(fill("%actor% in %world%", &actor), "%world% in overworld");
	}

	#[test]
	fn identity_cache_holds_until_generation_changes() {
		let cache = IdentityCache::default();
		let actor = alice();
		let first = cache.get(&actor, 1);

		let renamed = actor.clone().with_display_name("Renamed");
		assert_eq!(cache.get(&renamed, 1).display_name, first.display_name);
		assert_eq!(cache.len(), 1);

		assert_eq!(&*cache.get(&renamed, 2).display_name, "Renamed");
		assert_eq!(cache.len(), 1);
	}

	#[test]
	fn forgotten_actor_is_reloaded_from_live_state() {
		let cache = IdentityCache::default();
		let actor = alice();
		cache.get(&actor, 1);
		assert!(cache.forget(actor.id));
		assert!(!cache.forget(actor.id));
		assert!(cache.is_empty());

		let renamed = actor.with_display_name("Renamed");
		assert_eq!(&*cache.get(&renamed, 1).display_name, "Renamed");
	}

	#[test]
	fn full_cache_starts_over() {
		let cache = IdentityCache::with_capacity(2);
		let first = alice();
		cache.get(&first, 1);
		cache.get(&ActorContext::player(ActorId::random(), "Bob", "world", BlockPos::default()), 1);
		assert_eq!(cache.len(), 2);

		// Known actors never trigger a reset.
		cache.get(&first, 1);
		assert_eq!(cache.len(), 2);

		cache.get(&ActorContext::player(ActorId::random(), "Cara", "world", BlockPos::default()), 1);
		assert_eq!(cache.len(), 1);
	}

	#[test]
	fn location_is_never_cached() {
		let cache = IdentityCache::default();
		let mut actor = alice();
		let identity = cache.get(&actor, 1);
		assert_eq!(substitute("%x%", &identity, &actor), "12");

		actor.location = BlockPos::new(99, 1, 1);
		let identity = cache.get(&actor, 1);
		assert_eq!(substitute("%x%", &identity, &actor), "99");
	}

	proptest! {
		#[test]
		fn text_without_percent_is_untouched(text in "[^%]*") {
			let actor = alice();
			prop_assert_eq!(fill(&text, &actor), text);
		}
	}
}
