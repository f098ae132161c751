#![forbid(unsafe_code)]

//! Linear domain→pixel scales with nice rounding and tick generation.
//!
//! Nice rounding and ticks use the usual 1-2-5 step ladder: a raw step of
//! `span / count` is rounded to the nearest power of ten times 1, 2, 5 or 10,
//! with the factor chosen by comparing the mantissa against √2, √10 and √50.
//!
//! Degenerate input never fails:
//! - an empty or all-non-finite sample has extent `[0, 0]`;
//! - a zero-width domain maps every value to the middle of the range;
//! - a non-finite value maps to [`FALLBACK_PIXEL`].

use scrollviz_core::geometry::Point;
use scrollviz_scene::{AxisOrient, AxisSpec, Tick};

/// Pixel used for values that cannot be mapped.
pub const FALLBACK_PIXEL: f64 = 0.0;

/// Tick count used by [`LinearScale::nice`].
pub const DEFAULT_TICK_COUNT: usize = 10;

const MAX_NICE_PASSES: usize = 10;

const E10: f64 = 7.0710678118654755; // √50
const E5: f64 = 3.1622776601683795; // √10
const E2: f64 = std::f64::consts::SQRT_2;

/// `[min, max]` of the finite values, or `[0, 0]` when there are none.
pub fn extent<I>(values: I) -> [f64; 2]
where
    I: IntoIterator<Item = f64>,
{
    values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc: Option<[f64; 2]>, v| match acc {
            None => Some([v, v]),
            Some([lo, hi]) => Some([lo.min(v), hi.max(v)]),
        })
        .unwrap_or([0.0, 0.0])
}

/// A continuous linear mapping from a data domain to a pixel range.
///
/// Values outside the domain extrapolate; there is no clamping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain: [f64; 2],
    range: [f64; 2],
}

impl LinearScale {
    /// Create a scale. Non-finite endpoints are replaced by zero.
    pub fn new(domain: [f64; 2], range: [f64; 2]) -> Self {
        Self {
            domain: domain.map(finite_or_zero),
            range: range.map(finite_or_zero),
        }
    }

    #[inline]
    pub fn domain(&self) -> [f64; 2] {
        self.domain
    }

    #[inline]
    pub fn range(&self) -> [f64; 2] {
        self.range
    }

    /// Extend the domain to round values for [`DEFAULT_TICK_COUNT`] ticks.
    #[must_use]
    pub fn nice(self) -> Self {
        self.nice_with(DEFAULT_TICK_COUNT)
    }

    /// Extend the domain to round values for roughly `count` ticks.
    ///
    /// Repeats until the step stops changing, at most ten passes. Degenerate
    /// domains are returned unchanged.
    #[must_use]
    pub fn nice_with(mut self, count: usize) -> Self {
        let [d0, d1] = self.domain;
        let reversed = d1 < d0;
        let (mut start, mut stop) = if reversed { (d1, d0) } else { (d0, d1) };
        if count == 0 || start >= stop {
            return self;
        }
        let mut previous = None;
        for _ in 0..MAX_NICE_PASSES {
            let step = tick_increment(start, stop, count as f64);
            if previous == Some(step) {
                break;
            }
            if step > 0.0 {
                start = (start / step).floor() * step;
                stop = (stop / step).ceil() * step;
            } else if step < 0.0 {
                start = (start * step).ceil() / step;
                stop = (stop * step).floor() / step;
            } else {
                break;
            }
            previous = Some(step);
        }
        self.domain = if reversed { [stop, start] } else { [start, stop] };
        self
    }

    /// Pixel position of `value`.
    pub fn map(&self, value: f64) -> f64 {
        if !value.is_finite() {
            return FALLBACK_PIXEL;
        }
        let [d0, d1] = self.domain;
        let [r0, r1] = self.range;
        let span = d1 - d0;
        let t = if span == 0.0 { 0.5 } else { (value - d0) / span };
        let px = r0 * (1.0 - t) + r1 * t;
        if px.is_finite() { px } else { FALLBACK_PIXEL }
    }

    /// Round tick values inside the domain, roughly `count` of them.
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        let [d0, d1] = self.domain;
        if count == 0 {
            return Vec::new();
        }
        if d0 == d1 {
            return vec![d0];
        }
        let reversed = d1 < d0;
        let (lo, hi) = if reversed { (d1, d0) } else { (d0, d1) };
        let Some((i1, i2, inc)) = tick_spec(lo, hi, count as f64) else {
            return Vec::new();
        };
        if i2 < i1 {
            return Vec::new();
        }
        let n = (i2 - i1) as usize + 1;
        let at = |i: f64| if inc < 0.0 { i / -inc } else { i * inc };
        if reversed {
            (0..n).map(|k| at(i2 - k as f64)).collect()
        } else {
            (0..n).map(|k| at(i1 + k as f64)).collect()
        }
    }

    /// Format `value` with just enough decimals for `count` ticks.
    pub fn tick_format(&self, count: usize, value: f64) -> String {
        let [d0, d1] = self.domain;
        let step = tick_step(d0, d1, count as f64).abs();
        let decimals = if step.is_finite() && step > 0.0 {
            (-step.log10().floor()).max(0.0) as usize
        } else {
            0
        };
        let text = format!("{value:.decimals$}");
        // "-0" and "-0.0" read as noise on an axis.
        if text.starts_with('-') && text[1..].chars().all(|c| c == '0' || c == '.') {
            text[1..].to_string()
        } else {
            text
        }
    }

    /// Axis content: tick positions in pixels and their labels.
    pub fn axis(&self, orient: AxisOrient, count: usize) -> AxisSpec {
        let ticks = self
            .ticks(count)
            .into_iter()
            .map(|v| Tick {
                offset: self.map(v),
                label: self.tick_format(count, v),
            })
            .collect();
        AxisSpec {
            orient,
            range: self.range,
            ticks,
        }
    }
}

/// The x/y scale pair of one plot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scales {
    pub x: LinearScale,
    pub y: LinearScale,
}

impl Scales {
    /// Pixel position of domain point `(x, y)`.
    #[inline]
    pub fn point(&self, x: f64, y: f64) -> Point {
        Point::new(self.x.map(x), self.y.map(y))
    }
}

fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() { v } else { 0.0 }
}

/// Integer tick bounds and increment for `[start, stop]` (`start <= stop`).
///
/// A negative increment `-k` means "divide by k", which keeps sub-unit steps
/// exact.
fn tick_spec(start: f64, stop: f64, count: f64) -> Option<(f64, f64, f64)> {
    let step = (stop - start) / count.max(0.0);
    if !(step.is_finite() && step > 0.0) {
        return None;
    }
    let power = step.log10().floor();
    let error = step / 10f64.powf(power);
    let factor = if error >= E10 {
        10.0
    } else if error >= E5 {
        5.0
    } else if error >= E2 {
        2.0
    } else {
        1.0
    };
    let (mut i1, mut i2, inc);
    if power < 0.0 {
        let k = 10f64.powf(-power) / factor;
        i1 = (start * k).round();
        i2 = (stop * k).round();
        if i1 / k < start {
            i1 += 1.0;
        }
        if i2 / k > stop {
            i2 -= 1.0;
        }
        inc = -k;
    } else {
        let k = 10f64.powf(power) * factor;
        i1 = (start / k).round();
        i2 = (stop / k).round();
        if i1 * k < start {
            i1 += 1.0;
        }
        if i2 * k > stop {
            i2 -= 1.0;
        }
        inc = k;
    }
    if i2 < i1 && (0.5..2.0).contains(&count) {
        return tick_spec(start, stop, count * 2.0);
    }
    Some((i1, i2, inc))
}

fn tick_increment(start: f64, stop: f64, count: f64) -> f64 {
    tick_spec(start, stop, count).map_or(0.0, |(_, _, inc)| inc)
}

fn tick_step(start: f64, stop: f64, count: f64) -> f64 {
    let reversed = stop < start;
    let inc = if reversed {
        tick_increment(stop, start, count)
    } else {
        tick_increment(start, stop, count)
    };
    let step = if inc < 0.0 { 1.0 / -inc } else { inc };
    if reversed { -step } else { step }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn maps_domain_onto_range() {
        let s = LinearScale::new([0.0, 100.0], [0.0, 300.0]).nice();
        assert_eq!(s.domain(), [0.0, 100.0]);
        assert_eq!(s.map(0.0), 0.0);
        assert_eq!(s.map(50.0), 150.0);
        assert_eq!(s.map(100.0), 300.0);
    }

    #[test]
    fn inverted_range_for_vertical_axes() {
        let s = LinearScale::new([0.0, 30.0], [480.0, 0.0]);
        assert_eq!(s.map(0.0), 480.0);
        assert_eq!(s.map(30.0), 0.0);
        assert_eq!(s.map(15.0), 240.0);
    }

    #[test]
    fn nice_extends_to_round_values() {
        let s = LinearScale::new([0.3, 9.7], [0.0, 1.0]).nice();
        assert_eq!(s.domain(), [0.0, 10.0]);
        let s = LinearScale::new([11.0, 16.0], [0.0, 1.0]).nice();
        assert_eq!(s.domain(), [11.0, 16.0]);
        let s = LinearScale::new([1.2, 28.9], [0.0, 1.0]).nice();
        assert_eq!(s.domain(), [0.0, 30.0]);
    }

    #[test]
    fn nice_keeps_sub_unit_domains_exact() {
        let s = LinearScale::new([5.03, 5.97], [0.0, 1.0]).nice();
        assert_eq!(s.domain(), [5.0, 6.0]);
    }

    #[test]
    fn degenerate_domain_maps_to_middle() {
        let s = LinearScale::new([4.0, 4.0], [0.0, 200.0]).nice();
        assert_eq!(s.domain(), [4.0, 4.0]);
        assert_eq!(s.map(4.0), 100.0);
        assert_eq!(s.map(-7.0), 100.0);
        assert_eq!(s.ticks(10), vec![4.0]);
    }

    #[test]
    fn non_finite_input_uses_fallback() {
        let s = LinearScale::new([0.0, 10.0], [0.0, 100.0]);
        assert_eq!(s.map(f64::NAN), FALLBACK_PIXEL);
        assert_eq!(s.map(f64::INFINITY), FALLBACK_PIXEL);
        let s = LinearScale::new([f64::NAN, 10.0], [0.0, 100.0]);
        assert_eq!(s.domain(), [0.0, 10.0]);
    }

    #[test]
    fn extent_ignores_non_finite() {
        assert_eq!(extent([3.0, f64::NAN, -1.0, 8.0]), [-1.0, 8.0]);
        assert_eq!(extent(std::iter::empty()), [0.0, 0.0]);
        assert_eq!(extent([f64::NAN]), [0.0, 0.0]);
    }

    #[test]
    fn ticks_on_round_steps() {
        let s = LinearScale::new([0.0, 30.0], [0.0, 1.0]);
        assert_eq!(s.ticks(6), vec![0.0, 5.0, 10.0, 15.0, 20.0, 25.0, 30.0]);
        let s = LinearScale::new([0.0, 1.0], [0.0, 1.0]);
        assert_eq!(s.ticks(5), vec![0.0, 0.2, 0.4, 0.6, 0.8, 1.0]);
        let s = LinearScale::new([10.0, 0.0], [0.0, 1.0]);
        assert_eq!(s.ticks(5), vec![10.0, 8.0, 6.0, 4.0, 2.0, 0.0]);
    }

    #[test]
    fn tick_labels_use_step_precision() {
        let s = LinearScale::new([0.0, 1.0], [0.0, 1.0]);
        assert_eq!(s.tick_format(5, 0.4), "0.4");
        let s = LinearScale::new([0.0, 100.0], [0.0, 1.0]);
        assert_eq!(s.tick_format(6, 40.0), "40");
        let s = LinearScale::new([-1.0, 1.0], [0.0, 1.0]);
        assert_eq!(s.tick_format(4, -0.0), "0.0");
    }

    #[test]
    fn axis_spec_places_ticks_in_pixels() {
        let s = LinearScale::new([0.0, 10.0], [0.0, 500.0]);
        let axis = s.axis(AxisOrient::Bottom, 5);
        assert_eq!(axis.range, [0.0, 500.0]);
        let offsets: Vec<f64> = axis.ticks.iter().map(|t| t.offset).collect();
        assert_eq!(offsets, vec![0.0, 100.0, 200.0, 300.0, 400.0, 500.0]);
        assert_eq!(axis.ticks[3].label, "6");
    }

    fn any_range() -> impl Strategy<Value = [f64; 2]> {
        (0.0f64..600.0, 1.0f64..900.0, any::<bool>())
            .prop_map(|(start, len, inverted)| if inverted { [start + len, start] } else { [start, start + len] })
    }

    proptest! {
        #[test]
        fn map_preserves_order(
            lo in -1e4f64..1e4,
            width in 1e-3f64..1e4,
            range in any_range(),
            a in 0.0f64..=1.0,
            b in 0.0f64..=1.0,
        ) {
            let s = LinearScale::new([lo, lo + width], range);
            let (a, b) = (lo + width * a.min(b), lo + width * a.max(b));
            let direction = (range[1] - range[0]).signum();
            prop_assert!((s.map(b) - s.map(a)) * direction >= -1e-9);
        }

        #[test]
        fn nice_covers_the_input_and_keeps_the_range(
            lo in -1e4f64..1e4,
            width in 1e-3f64..1e4,
            range in any_range(),
        ) {
            let hi = lo + width;
            let s = LinearScale::new([lo, hi], range).nice();
            let [d0, d1] = s.domain();
            let slack = (width + lo.abs()) * 1e-12;
            prop_assert!(d0 <= lo + slack && d1 >= hi - slack, "{:?} does not cover [{}, {}]", s.domain(), lo, hi);
            prop_assert_eq!(s.range(), range);
            prop_assert_eq!(s.map(d0), range[0]);
            prop_assert_eq!(s.map(d1), range[1]);
        }
    }
}
