//! Test helpers shared across Nudge crates.

pub mod clock;
pub mod platform;
pub mod store;

pub use clock::FixedClock;
pub use platform::{PlatformCall, RecordingPlatform};
pub use store::MemoryKeyValueStore;
