//! Read-only model of a host container.
//!
//! The host translates its native inventory into these types once per event.
//! Item metadata reads may fail on the host side (corrupted tag blobs); such
//! failures are carried as [`TagRead::Corrupt`] so detection can fall through
//! to the next strategy instead of aborting.

use rustc_hash::FxHashMap;

use crate::Slot;

/// Outcome of reading one metadata layer from an item.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TagRead<T> {
	/// The layer is not present on the item.
	#[default]
	Missing,
	/// The layer was read successfully.
	Present(T),
	/// The host failed to decode the layer.
	Corrupt(String),
}

impl<T> TagRead<T> {
	/// Returns the decoded value, if any.
	pub fn present(&self) -> Option<&T> {
		match self {
			Self::Present(value) => Some(value),
			_ => None,
		}
	}
}

/// Structured item metadata as exposed by the item plugin's typed API.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StructuredMeta {
	/// Item type, present only for items managed by the item plugin.
	pub item_type: Option<String>,
	/// String fields keyed by tag name.
	pub fields: FxHashMap<String, String>,
}

/// One item stack as observed in a menu slot.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ItemSnapshot {
	pub material: String,
	pub display_name: Option<String>,
	pub custom_model_data: Option<i32>,
	pub structured: TagRead<StructuredMeta>,
	pub raw_tags: TagRead<FxHashMap<String, String>>,
}

impl ItemSnapshot {
	/// Creates a plain item of the given material.
	pub fn new(material: impl Into<String>) -> Self {
		Self {
			material: material.into(),
			..Self::default()
		}
	}

	#[must_use]
	pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
		self.display_name = Some(name.into());
		self
	}

	#[must_use]
	pub fn with_model_data(mut self, data: i32) -> Self {
		self.custom_model_data = Some(data);
		self
	}

	/// Attaches typed metadata with the given item type and string fields.
	#[must_use]
	pub fn with_structured<'a>(mut self, item_type: &str, fields: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
		self.structured = TagRead::Present(StructuredMeta {
			item_type: Some(item_type.to_string()),
			fields: fields.into_iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
		});
		self
	}

	/// Marks the typed metadata layer as unreadable.
	#[must_use]
	pub fn with_corrupt_structured(mut self, reason: impl Into<String>) -> Self {
		self.structured = TagRead::Corrupt(reason.into());
		self
	}

	/// Adds one raw tag, creating the raw layer if needed.
	#[must_use]
	pub fn with_raw_tag(mut self, key: &str, value: &str) -> Self {
		match &mut self.raw_tags {
			TagRead::Present(tags) => {
				tags.insert(key.to_string(), value.to_string());
			}
			other => {
				let mut tags = FxHashMap::default();
				tags.insert(key.to_string(), value.to_string());
				*other = TagRead::Present(tags);
			}
		}
		self
	}
}

/// Read access to the current contents of an open menu.
pub trait MenuView: Send + Sync {
	/// Raw container title, formatting codes included.
	fn title(&self) -> &str;

	/// Item in the given top-inventory slot.
	fn item(&self, slot: Slot) -> Option<&ItemSnapshot>;
}

/// Owned [`MenuView`] built by hosts and tests.
#[derive(Debug, Clone, Default)]
pub struct MenuSnapshot {
	title: String,
	items: FxHashMap<Slot, ItemSnapshot>,
}

impl MenuSnapshot {
	pub fn new(title: impl Into<String>) -> Self {
		Self {
			title: title.into(),
			items: FxHashMap::default(),
		}
	}

	#[must_use]
	pub fn with_item(mut self, slot: impl Into<Slot>, item: ItemSnapshot) -> Self {
		self.items.insert(slot.into(), item);
		self
	}

	/// Replaces or inserts the item in `slot`.
	pub fn set_item(&mut self, slot: impl Into<Slot>, item: ItemSnapshot) {
		self.items.insert(slot.into(), item);
	}

	/// Number of occupied slots.
	pub fn len(&self) -> usize {
		self.items.len()
	}

	pub fn is_empty(&self) -> bool {
		self.items.is_empty()
	}
}

impl MenuView for MenuSnapshot {
	fn title(&self) -> &str {
		&self.title
	}

	fn item(&self, slot: Slot) -> Option<&ItemSnapshot> {
		self.items.get(&slot)
	}
}
