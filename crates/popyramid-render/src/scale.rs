//! Numeric and categorical scales with d3-compatible ticks.

use crate::format::SiPrefixFormat;
use popyramid_core::{Dataset, LayoutConfig};
use serde::Serialize;

/// Affine mapping from a numeric domain to a pixel range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    /// Maps `v` into the range. A zero-length domain maps everything to the range start.
    pub fn apply(&self, v: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let span = d1 - d0;
        if v.is_nan() || span.is_nan() {
            return f64::NAN;
        }
        if span == 0.0 {
            return r0;
        }
        let t = (v - d0) / span;
        r0 * (1.0 - t) + r1 * t
    }

    pub fn ticks(&self, count: f64) -> Vec<f64> {
        ticks(self.domain.0, self.domain.1, count)
    }

    pub fn tick_format(&self, count: f64) -> SiPrefixFormat {
        let (d0, d1) = self.domain;
        SiPrefixFormat::for_ticks(d0, d1, count)
    }
}

/// Ordered categories mapped to evenly sized, padded slots.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BandScale {
    domain: Vec<String>,
    range: (f64, f64),
    padding_inner: f64,
    padding_outer: f64,
    align: f64,
    step: f64,
    bandwidth: f64,
    positions: Vec<f64>,
}

impl BandScale {
    /// Builds a band scale with no padding. Repeated labels keep their first slot.
    pub fn new<I, S>(domain: I, range: (f64, f64)) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut labels: Vec<String> = Vec::new();
        for s in domain {
            let s = s.into();
            if !labels.contains(&s) {
                labels.push(s);
            }
        }
        let mut out = Self {
            domain: labels,
            range,
            padding_inner: 0.0,
            padding_outer: 0.0,
            align: 0.5,
            step: 0.0,
            bandwidth: 0.0,
            positions: Vec::new(),
        };
        out.rescale();
        out
    }

    /// Sets inner and outer padding to the same ratio.
    pub fn with_padding(mut self, padding: f64) -> Self {
        self.padding_inner = padding.clamp(0.0, 1.0);
        self.padding_outer = padding;
        self.rescale();
        self
    }

    pub fn with_align(mut self, align: f64) -> Self {
        self.align = align.clamp(0.0, 1.0);
        self.rescale();
        self
    }

    fn rescale(&mut self) {
        let n = self.domain.len() as f64;
        let (r0, r1) = self.range;
        let reverse = r1 < r0;
        let (start, stop) = if reverse { (r1, r0) } else { (r0, r1) };
        let step = (stop - start) / (n - self.padding_inner + self.padding_outer * 2.0).max(1.0);
        let start = start + (stop - start - step * (n - self.padding_inner)) * self.align;
        self.step = step;
        self.bandwidth = step * (1.0 - self.padding_inner);
        self.positions = (0..self.domain.len())
            .map(|i| start + step * i as f64)
            .collect();
        if reverse {
            self.positions.reverse();
        }
    }

    pub fn domain(&self) -> &[String] {
        &self.domain
    }

    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    /// Start of the slot for `label`, or `None` for labels outside the domain.
    pub fn apply(&self, label: &str) -> Option<f64> {
        let idx = self.domain.iter().position(|c| c == label)?;
        self.positions.get(idx).copied()
    }
}

/// All scales of one chart, computed once from the config and the data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScalePair {
    pub max_count: Option<f64>,
    pub half_width: f64,
    pub male_scale: LinearScale,
    pub female_scale: LinearScale,
    /// Same range as `male_scale` with the domain flipped, so the male axis grows outward.
    pub male_scale_reversed: LinearScale,
    pub age_scale: BandScale,
}

impl ScalePair {
    pub fn compute(config: &LayoutConfig, dataset: &Dataset) -> Self {
        let max_count = dataset.max_count();
        let half_width = config.half_width();
        let max = max_count.unwrap_or(0.0);

        let range = (0.0, half_width);
        let male_scale = LinearScale::new((0.0, max), range);
        let female_scale = LinearScale::new((0.0, max), range);
        let male_scale_reversed = LinearScale::new((max, 0.0), range);

        // `[h, 0]`: the first record lands in the bottom slot.
        let age_scale = BandScale::new(dataset.distinct_ages(), (config.plot_height(), 0.0))
            .with_padding(config.band_padding);

        Self {
            max_count,
            half_width,
            male_scale,
            female_scale,
            male_scale_reversed,
            age_scale,
        }
    }
}

fn js_round(x: f64) -> f64 {
    let f = x.floor();
    if x - f >= 0.5 { f + 1.0 } else { f }
}

/// Upper bound on the number of ticks one call to [`ticks`] produces.
pub const MAX_TICKS: usize = 10_000;

// Tick indices stay within the range where `f64` holds every integer exactly.
const MAX_TICK_INDEX: f64 = 9_007_199_254_740_992.0;

fn tick_index(v: f64) -> Option<i64> {
    (v.is_finite() && v.abs() <= MAX_TICK_INDEX).then_some(v as i64)
}

fn tick_spec(start: f64, stop: f64, count: f64) -> Option<(i64, i64, f64)> {
    if !(count > 0.0) {
        return None;
    }

    let step = (stop - start) / count.max(0.0);
    if !step.is_finite() || step == 0.0 {
        return None;
    }
    let power = step.log10().floor();
    let error = step / 10f64.powf(power);
    let e10 = 50f64.sqrt();
    let e5 = 10f64.sqrt();
    let e2 = 2f64.sqrt();
    let factor = if error >= e10 {
        10.0
    } else if error >= e5 {
        5.0
    } else if error >= e2 {
        2.0
    } else {
        1.0
    };

    let (i1, i2, inc) = if power < 0.0 {
        let inc = 10f64.powf(-power) / factor;
        let mut i1 = tick_index(js_round(start * inc))?;
        let mut i2 = tick_index(js_round(stop * inc))?;
        if (i1 as f64) / inc < start {
            i1 += 1;
        }
        if (i2 as f64) / inc > stop {
            i2 -= 1;
        }
        (i1, i2, -inc)
    } else {
        let inc = 10f64.powf(power) * factor;
        let mut i1 = tick_index(js_round(start / inc))?;
        let mut i2 = tick_index(js_round(stop / inc))?;
        if (i1 as f64) * inc < start {
            i1 += 1;
        }
        if (i2 as f64) * inc > stop {
            i2 -= 1;
        }
        (i1, i2, inc)
    };

    if i2 < i1 && (0.5..2.0).contains(&count) {
        return tick_spec(start, stop, count * 2.0);
    }

    if !inc.is_finite() || inc == 0.0 {
        return None;
    }

    Some((i1, i2, inc))
}

/// Nicely rounded values between `start` and `stop`, about `count` of them.
///
/// Follows d3-array `ticks`: the order follows the direction of `start..stop` and `count` is a
/// density hint, not an exact count. Requests that would produce more than [`MAX_TICKS`]
/// values yield no ticks.
pub fn ticks(start: f64, stop: f64, count: f64) -> Vec<f64> {
    if !start.is_finite() || !stop.is_finite() {
        return Vec::new();
    }
    if !(count > 0.0) {
        return Vec::new();
    }
    if start == stop {
        return vec![start];
    }

    let reverse = stop < start;
    let (a, b) = if reverse {
        (stop, start)
    } else {
        (start, stop)
    };
    let Some((i1, i2, inc)) = tick_spec(a, b, count) else {
        return Vec::new();
    };
    let Some(n) = i2
        .checked_sub(i1)
        .and_then(|d| d.checked_add(1))
        .and_then(|n| usize::try_from(n).ok())
        .filter(|&n| n <= MAX_TICKS)
    else {
        return Vec::new();
    };

    (0..n as i64)
        .map(|i| {
            let k = if reverse { i2 - i } else { i1 + i };
            let k = k as f64;
            if inc < 0.0 { k / -inc } else { k * inc }
        })
        .collect()
}

/// Signed distance between adjacent ticks (d3-array `tickStep`).
///
/// A zero-length span has step `0`.
pub fn tick_step(start: f64, stop: f64, count: f64) -> f64 {
    if start == stop && start.is_finite() && count > 0.0 {
        return 0.0;
    }
    let reverse = stop < start;
    let spec = if reverse {
        tick_spec(stop, start, count)
    } else {
        tick_spec(start, stop, count)
    };
    let Some((_, _, inc)) = spec else {
        return f64::NAN;
    };
    let step = if inc < 0.0 { 1.0 / -inc } else { inc };
    if reverse { -step } else { step }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_maps_endpoints() {
        let s = LinearScale::new((0.0, 100.0), (0.0, 657.5));
        assert_eq!(s.apply(0.0), 0.0);
        assert_eq!(s.apply(100.0), 657.5);
        assert_eq!(s.apply(50.0), 328.75);
        assert!(s.apply(f64::NAN).is_nan());
    }

    #[test]
    fn reversed_linear_grows_toward_zero() {
        let s = LinearScale::new((100.0, 0.0), (0.0, 500.0));
        assert_eq!(s.apply(100.0), 0.0);
        assert_eq!(s.apply(0.0), 500.0);
        assert_eq!(s.apply(25.0), 375.0);
    }

    #[test]
    fn degenerate_domain_maps_to_range_start() {
        let s = LinearScale::new((0.0, 0.0), (0.0, 500.0));
        assert_eq!(s.apply(0.0), 0.0);
        assert_eq!(s.apply(10.0), 0.0);
    }

    #[test]
    fn band_scale_matches_d3_padding() {
        // d3.scaleBand().domain(["a","b","c"]).range([0, 310]).padding(0.1)
        let s = BandScale::new(["a", "b", "c"], (0.0, 310.0)).with_padding(0.1);
        assert!((s.step() - 100.0).abs() < 1e-9);
        assert!((s.bandwidth() - 90.0).abs() < 1e-9);
        assert!((s.apply("a").unwrap() - 10.0).abs() < 1e-9);
        assert!((s.apply("c").unwrap() - 210.0).abs() < 1e-9);
        assert_eq!(s.apply("zzz"), None);
    }

    #[test]
    fn reversed_band_scale_puts_first_label_at_bottom() {
        let s = BandScale::new(["a", "b", "c"], (310.0, 0.0)).with_padding(0.1);
        assert!((s.apply("a").unwrap() - 210.0).abs() < 1e-9);
        assert!((s.apply("c").unwrap() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn empty_band_scale_does_not_panic() {
        let s = BandScale::new(Vec::<String>::new(), (625.0, 0.0)).with_padding(0.1);
        assert!(s.domain().is_empty());
        assert!(s.bandwidth().is_finite());
        assert_eq!(s.apply("0"), None);
    }

    #[test]
    fn ticks_follow_d3() {
        assert_eq!(
            ticks(0.0, 10.0, 10.0),
            vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0]
        );
        assert_eq!(ticks(0.0, 1.0, 5.0), vec![0.0, 0.2, 0.4, 0.6, 0.8, 1.0]);
        assert_eq!(ticks(1.0, 0.0, 2.0), vec![1.0, 0.5, 0.0]);
        assert_eq!(ticks(5.0, 5.0, 10.0), vec![5.0]);
        assert!(ticks(0.0, 1.0, 0.0).is_empty());
        assert!(ticks(0.0, f64::NAN, 10.0).is_empty());
    }

    #[test]
    fn fractional_count_hint() {
        // 1380px / 80px per tick = 17.25 ticks requested for a 35_700 maximum.
        let t = ticks(0.0, 35_700.0, 17.25);
        assert_eq!(t.first(), Some(&0.0));
        assert_eq!(t.last(), Some(&34_000.0));
        assert_eq!(t.len(), 18);
        assert_eq!(tick_step(0.0, 35_700.0, 17.25), 2000.0);
        assert_eq!(tick_step(35_700.0, 0.0, 17.25), -2000.0);
    }

    #[test]
    fn zero_span_has_zero_step() {
        assert_eq!(tick_step(0.0, 0.0, 17.25), 0.0);
        assert_eq!(ticks(0.0, 0.0, 17.25), vec![0.0]);
    }

    #[test]
    fn huge_counts_yield_no_ticks_instead_of_panicking() {
        assert!(ticks(0.0, 35_700.0, 1380.0 / 1e-300).is_empty());
        assert!(ticks(0.0, 35_700.0, f64::MAX).is_empty());
        assert!(ticks(35_700.0, 0.0, 1e12).is_empty());
        assert!(ticks(-f64::MAX, f64::MAX, 10.0).is_empty());
        assert_eq!(ticks(0.0, 9_999.0, 9_999.0).len(), MAX_TICKS);
        assert!(ticks(0.0, 10_000.0, 10_000.0).is_empty());
    }
}
