use crate::foundation::core::TimeMs;
use crate::foundation::error::{ReelError, ReelResult, Stage};
use crate::timeline::{SegmentRole, Timeline};
use crate::transitions::Transition;
use std::fmt::Write as _;

impl Timeline {
    /// Check presentation-time invariants: contiguity, exact totals, and that overlap extensions
    /// stay out of presentation time.
    ///
    /// Any violation is a defect and fails with the full timing dump.
    pub fn verify_presentation(&self, transitions: &[Transition]) -> ReelResult<()> {
        let fail = |message: String| {
            Err(ReelError::invariant(
                Stage::Timeline,
                message,
                self.dump(transitions),
            ))
        };

        let mut cursor = TimeMs::ZERO;
        for (i, s) in self.segments().iter().enumerate() {
            if s.index != i {
                return fail(format!("segment at position {i} has index {}", s.index));
            }
            if s.start_offset != cursor {
                return fail(format!(
                    "segment {i} starts at {} but previous segment ends at {cursor}",
                    s.start_offset
                ));
            }
            if s.duration.is_zero() {
                return fail(format!("segment {i} has zero duration"));
            }
            cursor = s.end();
        }
        if cursor != self.total_duration() {
            return fail(format!(
                "segments end at {cursor}, expected intro + main + outro = {}",
                self.total_duration()
            ));
        }

        for (role, expected) in [
            (SegmentRole::Intro, self.intro_duration()),
            (SegmentRole::Main, self.main_duration()),
            (SegmentRole::Outro, self.outro_duration()),
        ] {
            let sum: TimeMs = self
                .segments()
                .iter()
                .filter(|s| s.role == role)
                .map(|s| s.duration)
                .sum();
            if sum != expected {
                return fail(format!(
                    "{} segments sum to {sum}, expected {expected}",
                    role.as_str()
                ));
            }
        }

        let (main_start, main_end) = self.main_window();
        let main_segments: Vec<_> = self
            .segments()
            .iter()
            .filter(|s| s.role == SegmentRole::Main)
            .collect();
        match (main_segments.first(), main_segments.last()) {
            (Some(first), Some(last))
                if first.start_offset == main_start && last.end() == main_end => {}
            _ => return fail("main block does not span the main window".to_string()),
        }

        // Every source clip minus the cross-faded overlaps must equal the presentation length.
        let source: TimeMs = self.segments().iter().map(|s| s.source_duration()).sum();
        let overlap: TimeMs = transitions.iter().map(|t| t.duration).sum();
        if source.checked_sub(overlap) != Some(self.total_duration()) {
            return fail(format!(
                "source clips ({source}) minus overlaps ({overlap}) != total {}",
                self.total_duration()
            ));
        }
        Ok(())
    }

    /// Deterministic, human-readable timing dump.
    pub fn dump(&self, transitions: &[Transition]) -> String {
        let mut s = String::new();
        let _ = writeln!(
            s,
            "timeline total={} intro={} main={} outro={}",
            self.total_duration(),
            self.intro_duration(),
            self.main_duration(),
            self.outro_duration()
        );
        for seg in self.segments() {
            let _ = writeln!(
                s,
                "  seg#{:<3} {:<5} start={} dur={} end={} lead_in={} lead_out={} src={}",
                seg.index,
                seg.role.as_str(),
                seg.start_offset,
                seg.duration,
                seg.end(),
                seg.lead_in,
                seg.lead_out,
                seg.asset.path.display()
            );
        }
        for t in transitions {
            let _ = writeln!(
                s,
                "  xfade {}->{} effect={} dur={} offset={}",
                t.between_segment,
                t.between_segment + 1,
                t.effect.as_str(),
                t.duration,
                t.offset
            );
        }
        s
    }
}
