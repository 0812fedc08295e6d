//! Audio mix planning: narration lanes aligned to the timeline and a ducked music bed.

pub(crate) mod envelope;
pub(crate) mod lanes;
pub(crate) mod music;

pub use envelope::{Breakpoint, GainSpan, VolumeEnvelope, merge_intervals};
pub use lanes::{AudioLane, LaneRole, NarrationSet, dump_lanes, plan_lanes, verify_lanes};
pub use music::{MUSIC_EXTENSIONS, MusicLibrary, select_music};

