//! Asset probing: image dimensions and dominant color, audio durations.

pub(crate) mod imaging;
pub(crate) mod media;
pub(crate) mod model;
pub(crate) mod prober;

pub use imaging::{dominant_color, probe_image_file};
pub use media::{FfprobeSettings, probe_audio_file};
pub use model::{MediaAsset, MediaKind};
pub use prober::{Prober, SystemProber, probe_images};

#[cfg(test)]
#[path = "../../tests/unit/assets/model.rs"]
mod tests;
