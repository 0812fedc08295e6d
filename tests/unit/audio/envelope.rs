use super::*;

fn ms(v: u64) -> TimeMs {
    TimeMs::from_millis(v)
}

#[test]
fn narration_from_zero_has_a_single_breakpoint_at_its_end() {
    let env = VolumeEnvelope::ducking(&[(ms(0), ms(8_000))], 0.18, 0.55);
    assert_eq!(env.initial_gain, 0.18);
    assert_eq!(
        env.breakpoints,
        vec![Breakpoint {
            at: ms(8_000),
            gain: 0.55
        }]
    );
    assert_eq!(env.gain_at(ms(7_999)), 0.18);
    assert_eq!(env.gain_at(ms(8_000)), 0.55);
}

#[test]
fn adjacent_narration_merges_into_one_low_region() {
    let env = VolumeEnvelope::ducking(
        &[(ms(5_000), ms(17_000)), (ms(0), ms(5_000)), (ms(17_000), ms(21_000))],
        0.2,
        0.6,
    );
    assert_eq!(env.initial_gain, 0.2);
    assert_eq!(env.breakpoints.len(), 1);
    assert_eq!(env.breakpoints[0].at, ms(21_000));
}

#[test]
fn gaps_between_narration_rise_to_ambient() {
    let env = VolumeEnvelope::ducking(&[(ms(0), ms(3_000)), (ms(5_000), ms(17_000))], 0.2, 0.6);
    assert_eq!(env.gain_at(ms(0)), 0.2);
    assert_eq!(env.gain_at(ms(4_000)), 0.6);
    assert_eq!(env.gain_at(ms(5_000)), 0.2);
    assert_eq!(env.gain_at(ms(20_000)), 0.6);

    let spans = env.spans(ms(22_000));
    let shape: Vec<_> = spans
        .iter()
        .map(|s| (s.start.as_millis(), s.end.as_millis(), s.gain))
        .collect();
    assert_eq!(
        shape,
        vec![
            (0, 3_000, 0.2),
            (3_000, 5_000, 0.6),
            (5_000, 17_000, 0.2),
            (17_000, 22_000, 0.6)
        ]
    );
}

#[test]
fn late_narration_starts_ambient() {
    let env = VolumeEnvelope::ducking(&[(ms(1_000), ms(2_000))], 0.1, 0.5);
    assert_eq!(env.initial_gain, 0.5);
    assert_eq!(env.breakpoints.len(), 2);
}

#[test]
fn spans_are_clipped_and_cover_the_range() {
    let env = VolumeEnvelope::ducking(&[(ms(0), ms(8_000))], 0.18, 0.55);
    let spans = env.spans(ms(8_000));
    assert_eq!(spans.len(), 1);
    assert_eq!(spans[0].end, ms(8_000));
    assert!(VolumeEnvelope::constant(1.0).is_constant());
    assert_eq!(VolumeEnvelope::constant(0.3).spans(ms(10)).len(), 1);
}

#[test]
fn merge_drops_empty_and_joins_overlaps() {
    let merged = merge_intervals(&[
        (ms(10), ms(10)),
        (ms(50), ms(60)),
        (ms(0), ms(20)),
        (ms(15), ms(30)),
    ]);
    assert_eq!(merged, vec![(ms(0), ms(30)), (ms(50), ms(60))]);
}
