//! Stage clock properties under arbitrary tick sequences.

use std::time::Duration;

use proptest::prelude::*;
use scrollviz_core::animation::{Animation, Phase, StageClock, ease_in_out_cubic, lerp};

#[test]
fn many_small_ticks_finish_a_long_run() {
    let mut clock = StageClock::new(Duration::from_millis(250), Duration::from_millis(750));
    for _ in 0..1000 {
        clock.tick(Duration::from_millis(1));
    }
    assert!(clock.is_complete());
}

#[test]
fn cubic_is_monotonic() {
    let values: Vec<f32> = (0..=200).map(|i| ease_in_out_cubic(i as f32 / 200.0)).collect();
    assert!(values.windows(2).all(|w| w[1] >= w[0] - 1e-6));
}

proptest! {
    #[test]
    fn value_stays_in_unit_range(
        delay in 0u64..1_000,
        duration in 0u64..2_000,
        ticks in prop::collection::vec(0u64..500, 0..24),
    ) {
        let mut clock = StageClock::new(Duration::from_millis(delay), Duration::from_millis(duration))
            .easing(ease_in_out_cubic);
        for dt in ticks {
            clock.tick(Duration::from_millis(dt));
            prop_assert!((0.0..=1.0).contains(&clock.value()));
        }
    }

    #[test]
    fn split_ticks_match_one_tick(delay in 0u64..500, duration in 0u64..500, a in 0u64..700, b in 0u64..700) {
        let new = || StageClock::new(Duration::from_millis(delay), Duration::from_millis(duration));
        let mut split = new();
        split.tick(Duration::from_millis(a));
        split.tick(Duration::from_millis(b));
        let mut whole = new();
        whole.tick(Duration::from_millis(a + b));
        prop_assert_eq!(split.phase(), whole.phase());
        prop_assert_eq!(split.overshoot(), whole.overshoot());
        prop_assert!((split.value() - whole.value()).abs() < 1e-4);
    }

    #[test]
    fn done_exactly_when_delay_and_duration_elapsed(delay in 0u64..500, duration in 0u64..500, t in 0u64..1_200) {
        let mut clock = StageClock::new(Duration::from_millis(delay), Duration::from_millis(duration));
        clock.tick(Duration::from_millis(t));
        prop_assert_eq!(clock.phase() == Phase::Done, t >= delay + duration);
    }

    #[test]
    fn lerp_stays_between_endpoints(from in -1e4f64..1e4, to in -1e4f64..1e4, t in 0.0f32..=1.0) {
        let v = lerp(from, to, t);
        prop_assert!(v >= from.min(to) - 1e-6 && v <= from.max(to) + 1e-6);
    }
}
