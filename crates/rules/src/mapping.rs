use std::collections::BTreeMap;

use crafthook_config::{ConfigWarning, SlotPositions};
use crafthook_primitives::{Position, Slot};
use rustc_hash::FxHashMap;

/// Bijective `position <-> slot` mapping.
///
/// Built from validated [`SlotPositions`] in ascending position order; a
/// position whose slot is already claimed by a lower position is dropped, so
/// the inverse is always a function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotMapping {
	by_position: BTreeMap<Position, Slot>,
	by_slot: FxHashMap<Slot, Position>,
	defaulted: bool,
}

impl Default for SlotMapping {
	fn default() -> Self {
		Self::build(&SlotPositions::default(), &mut Vec::new())
	}
}

impl SlotMapping {
	pub fn build(positions: &SlotPositions, warnings: &mut Vec<ConfigWarning>) -> Self {
		let mut by_position = BTreeMap::new();
		let mut by_slot = FxHashMap::default();

		let mut sorted = positions.entries.clone();
		sorted.sort_by_key(|&(position, _)| position);

		for (position, slot) in sorted {
			if let Some(&claimed_by) = by_slot.get(&slot) {
				warnings.push(ConfigWarning::DuplicateSlot {
					position,
					slot,
					claimed_by,
				});
				continue;
			}
			by_slot.insert(slot, position);
			by_position.insert(position, slot);
		}

		Self {
			by_position,
			by_slot,
			defaulted: positions.defaulted,
		}
	}

	pub fn slot_for(&self, position: Position) -> Option<Slot> {
		self.by_position.get(&position).copied()
	}

	pub fn position_for(&self, slot: Slot) -> Option<Position> {
		self.by_slot.get(&slot).copied()
	}

	/// Pairs in ascending position order.
	pub fn iter(&self) -> impl Iterator<Item = (Position, Slot)> + '_ {
		self.by_position.iter().map(|(&p, &s)| (p, s))
	}

	pub fn len(&self) -> usize {
		self.by_position.len()
	}

	pub fn is_empty(&self) -> bool {
		self.by_position.is_empty()
	}

	/// True when the built-in table is in effect.
	pub fn is_default(&self) -> bool {
		self.defaulted
	}
}
