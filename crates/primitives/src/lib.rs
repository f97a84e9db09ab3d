//! Core types shared by the crafthook crates: slot coordinates, recipe keys,
//! actor identity and the read-only menu model observed from the host.

/// Actor identity and live state.
pub mod actor;
/// Identifier types for actors and menu sessions.
pub mod ids;
/// Item and menu views read from the host container.
pub mod menu;
/// Normalized recipe identifiers.
pub mod recipe;
/// Logical positions and physical slots.
pub mod slot;
/// Legacy colour-code helpers.
pub mod text;

pub use actor::{ActorContext, ActorKind, BlockPos};
pub use ids::{ActorId, SessionId};
pub use menu::{ItemSnapshot, MenuSnapshot, MenuView, StructuredMeta, TagRead};
pub use recipe::RecipeKey;
pub use slot::{Position, Slot};
