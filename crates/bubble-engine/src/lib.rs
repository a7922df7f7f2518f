pub mod api;
pub mod core;
pub mod components;
pub mod systems;
pub mod bridge;
pub mod input;
pub mod config;
pub mod content;
pub mod error;
pub mod session;

// Re-export key types at crate root for convenience
pub use api::stage::{Stage, RESTRICTED_PATH};
pub use api::types::{BubbleId, ElementKey, HotspotId, ScriptName};
pub use bridge::surface::{classes, Outbox, SurfaceOp};
pub use components::bubble::{Bubble, Linger, DEFAULT_LINGER_MS};
pub use config::manifest::{BubbleDescriptor, StageConfig, Timings};
pub use crate::core::bubbles::BubbleStore;
pub use crate::core::time::Clock;
pub use crate::core::timers::{TimerHandle, TimerRegistry};
pub use error::{ConfigError, StorageError};
pub use input::binder::{Binding, Command, HotspotBinder, HotspotBinding};
pub use input::queue::{Gesture, InputQueue, StageInput};
pub use session::{EjectionRecord, MemoryStore, SessionFlags, SessionStore, StorageArea};
pub use systems::ambient::AmbientToggle;
pub use systems::dialogue::{DialogueScript, DialogueSequencer, DialogueState, ScriptBook, StartOutcome};
pub use systems::reveal::{Playback, Reveal, Scope};
pub use systems::sequence::SequencePlayer;
pub use systems::waterfall::{WaterfallElements, WaterfallReveal};
