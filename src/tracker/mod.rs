//! In-game half: turns host server events into per-round statistics and
//! ships them to the backend when the round ends.

pub mod client;
pub mod events;
pub mod experience;
pub mod plugin;
pub mod round;

pub use client::{BackendClient, UploadReport};
pub use events::{GameEvent, ItemKind, Player, PlayerPermissions};
pub use experience::ExperienceCache;
pub use plugin::StatsPlugin;
pub use round::{Category, RoundSnapshot, RoundTracker};
