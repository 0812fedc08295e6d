use crate::foundation::math::Rng64;
use smallvec::SmallVec;

/// Cross-fade effect palette.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    Fade,
    FadeBlack,
    FadeWhite,
    Dissolve,
    Pixelize,
    WipeLeft,
    WipeRight,
    WipeUp,
    WipeDown,
    SlideLeft,
    SlideRight,
    SlideUp,
    SlideDown,
    CircleOpen,
    CircleClose,
    HorzOpen,
    HorzClose,
    VertOpen,
    VertClose,
}

impl EffectKind {
    /// Every effect, in palette order.
    pub const ALL: [Self; 19] = [
        Self::Fade,
        Self::FadeBlack,
        Self::FadeWhite,
        Self::Dissolve,
        Self::Pixelize,
        Self::WipeLeft,
        Self::WipeRight,
        Self::WipeUp,
        Self::WipeDown,
        Self::SlideLeft,
        Self::SlideRight,
        Self::SlideUp,
        Self::SlideDown,
        Self::CircleOpen,
        Self::CircleClose,
        Self::HorzOpen,
        Self::HorzClose,
        Self::VertOpen,
        Self::VertClose,
    ];

    /// Stable snake_case name (matches the serialized form).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fade => "fade",
            Self::FadeBlack => "fade_black",
            Self::FadeWhite => "fade_white",
            Self::Dissolve => "dissolve",
            Self::Pixelize => "pixelize",
            Self::WipeLeft => "wipe_left",
            Self::WipeRight => "wipe_right",
            Self::WipeUp => "wipe_up",
            Self::WipeDown => "wipe_down",
            Self::SlideLeft => "slide_left",
            Self::SlideRight => "slide_right",
            Self::SlideUp => "slide_up",
            Self::SlideDown => "slide_down",
            Self::CircleOpen => "circle_open",
            Self::CircleClose => "circle_close",
            Self::HorzOpen => "horz_open",
            Self::HorzClose => "horz_close",
            Self::VertOpen => "vert_open",
            Self::VertClose => "vert_close",
        }
    }
}

/// Source of choices for effect (and music) selection.
///
/// Injected so tests can force a fixed sequence while production draws from real entropy.
pub trait EffectSelector {
    /// Return an index in `0..len`. `len` is always at least 1.
    fn pick_index(&mut self, len: usize) -> usize;
}

/// Deterministic selector driven by a SplitMix64 stream.
#[derive(Clone, Debug)]
pub struct SeededSelector {
    seed: u64,
    rng: Rng64,
}

impl SeededSelector {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: Rng64::new(seed),
        }
    }

    /// Seed drawn from system entropy; the seed is kept so a run can be reproduced.
    pub fn from_entropy() -> Self {
        Self::new(rand::random::<u64>())
    }

    /// `seed` when given, system entropy otherwise.
    pub fn from_seed_or_entropy(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::from_entropy, Self::new)
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl EffectSelector for SeededSelector {
    fn pick_index(&mut self, len: usize) -> usize {
        self.rng.next_below(len)
    }
}

/// Pick an effect from `palette`, never repeating `previous` when an alternative exists.
pub fn choose_effect(
    selector: &mut dyn EffectSelector,
    palette: &[EffectKind],
    previous: Option<EffectKind>,
) -> Option<EffectKind> {
    let mut distinct: SmallVec<[EffectKind; 24]> = SmallVec::new();
    for e in palette {
        if !distinct.contains(e) {
            distinct.push(*e);
        }
    }
    let candidates: SmallVec<[EffectKind; 24]> = distinct
        .iter()
        .copied()
        .filter(|e| Some(*e) != previous)
        .collect();
    let pool = if candidates.is_empty() {
        &distinct
    } else {
        &candidates
    };
    if pool.is_empty() {
        return None;
    }
    pool.get(selector.pick_index(pool.len()).min(pool.len() - 1))
        .copied()
}
