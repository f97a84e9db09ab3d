//! Recipe rule storage.
//!
//! A [`RuleStore`] publishes immutable [`RuleSnapshot`]s. Each snapshot holds
//! the slot mapping, the `recipe -> position -> commands` table, the compiled
//! runtime settings, and lookup caches derived from them. Reloading builds a
//! complete new snapshot aside and swaps it in with one atomic store, so a
//! reader holding a snapshot never sees a mix of two configurations.

mod admin;
mod mapping;
mod snapshot;
mod store;
mod template;
mod title;

pub use admin::{CacheStats, PositionDescription, RecipeDescription};
pub use mapping::SlotMapping;
pub use snapshot::{DispatchSettings, MenuSettings, RuleSnapshot, RuntimeSettings};
pub use store::{LoadReport, RuleStore};
pub use template::{CommandEntry, CommandTemplate, ExecutorClass};
pub use title::TitleMatcher;
