//! Tick generation and label formatting.
//!
//! Numeric ticks follow the usual 1/2/5 × 10^k stepping. Steps below one are
//! expressed as integer divisors so long tick runs do not accumulate floating
//! error.

use chrono::{DateTime, Datelike, Months, TimeZone, Utc};
use smallvec::SmallVec;

use crate::core::domain::DomainValue;
use crate::core::primitives::unix_millis_to_datetime;

const E10: f64 = 7.071_067_811_865_476; // sqrt(50)
const E5: f64 = 3.162_277_660_168_379_5; // sqrt(10)
const E2: f64 = std::f64::consts::SQRT_2;

/// Upper bound on ticks produced for one request.
const MAX_TICKS: f64 = 10_000.0;

/// Integer tick run: tick `i` lives at `i * increment` (positive increment)
/// or `i / -increment` (negative increment).
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct TickSpec {
    pub first: f64,
    pub last: f64,
    pub increment: f64,
}

pub(crate) fn tick_spec(start: f64, stop: f64, count: f64) -> Option<TickSpec> {
    let step = (stop - start) / count.max(0.0);
    if !step.is_finite() || step <= 0.0 {
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

    let (mut first, mut last, increment);
    if power < 0.0 {
        let inc = 10f64.powf(-power) / factor;
        first = (start * inc).round();
        last = (stop * inc).round();
        if first / inc < start {
            first += 1.0;
        }
        if last / inc > stop {
            last -= 1.0;
        }
        increment = -inc;
    } else {
        let inc = 10f64.powf(power) * factor;
        first = (start / inc).round();
        last = (stop / inc).round();
        if first * inc < start {
            first += 1.0;
        }
        if last * inc > stop {
            last -= 1.0;
        }
        increment = inc;
    }

    if last < first && (0.5..2.0).contains(&count) {
        return tick_spec(start, stop, count * 2.0);
    }
    Some(TickSpec {
        first,
        last,
        increment,
    })
}

/// Signed tick step for `count` ticks over `[start, stop]`.
#[must_use]
pub fn tick_step(start: f64, stop: f64, count: usize) -> f64 {
    let reverse = stop < start;
    let (lo, hi) = if reverse { (stop, start) } else { (start, stop) };
    let Some(spec) = tick_spec(lo, hi, count as f64) else {
        return 0.0;
    };
    let step = if spec.increment < 0.0 {
        1.0 / -spec.increment
    } else {
        spec.increment
    };
    if reverse { -step } else { step }
}

/// Number of fraction digits needed to tell ticks `step` apart.
#[must_use]
pub fn precision_fixed(step: f64) -> usize {
    let step = step.abs();
    if !step.is_finite() || step == 0.0 {
        return 0;
    }
    (-step.log10().floor()).max(0.0) as usize
}

/// Extends `[start, stop]` outward to whole multiples of its tick step.
#[must_use]
pub fn nice_linear(start: f64, stop: f64, count: usize) -> (f64, f64) {
    let reverse = stop < start;
    let (mut lo, mut hi) = if reverse { (stop, start) } else { (start, stop) };
    let mut previous: Option<f64> = None;

    for _ in 0..10 {
        let Some(spec) = tick_spec(lo, hi, count as f64) else {
            break;
        };
        let step = spec.increment;
        if previous == Some(step) {
            break;
        }
        if step > 0.0 {
            lo = (lo / step).floor() * step;
            hi = (hi / step).ceil() * step;
        } else {
            lo = (lo * step).ceil() / step;
            hi = (hi * step).floor() / step;
        }
        previous = Some(step);
    }

    if reverse { (hi, lo) } else { (lo, hi) }
}

/// Lazy, finite and restartable sequence of tick values.
///
/// Cloning yields an independent cursor; [`TickIter::restart`] rewinds this
/// one.
#[derive(Debug, Clone)]
pub struct TickIter {
    source: TickSource,
    cursor: usize,
}

#[derive(Debug, Clone)]
enum TickSource {
    Empty,
    Single {
        value: f64,
        time: bool,
    },
    Stepped {
        spec: TickSpec,
        len: usize,
        descending: bool,
        time: bool,
    },
    Listed {
        values: SmallVec<[f64; 16]>,
        time: bool,
    },
}

impl TickIter {
    #[must_use]
    pub fn empty() -> Self {
        Self::from_source(TickSource::Empty)
    }

    fn from_source(source: TickSource) -> Self {
        Self { source, cursor: 0 }
    }

    pub(crate) fn linear(start: f64, stop: f64, count: usize, time: bool) -> Self {
        if count == 0 || !start.is_finite() || !stop.is_finite() {
            return Self::empty();
        }
        if start == stop {
            return Self::from_source(TickSource::Single { value: start, time });
        }
        let descending = stop < start;
        let (lo, hi) = if descending { (stop, start) } else { (start, stop) };
        let Some(spec) = tick_spec(lo, hi, count as f64) else {
            return Self::empty();
        };
        if spec.last < spec.first {
            return Self::empty();
        }
        let len = (spec.last - spec.first + 1.0).min(MAX_TICKS) as usize;
        Self::from_source(TickSource::Stepped {
            spec,
            len,
            descending,
            time,
        })
    }

    pub(crate) fn listed(values: impl IntoIterator<Item = f64>, time: bool) -> Self {
        Self::from_source(TickSource::Listed {
            values: values.into_iter().collect(),
            time,
        })
    }

    /// Rewinds the sequence to its first tick.
    pub fn restart(&mut self) {
        self.cursor = 0;
    }

    fn len_total(&self) -> usize {
        match &self.source {
            TickSource::Empty => 0,
            TickSource::Single { .. } => 1,
            TickSource::Stepped { len, .. } => *len,
            TickSource::Listed { values, .. } => values.len(),
        }
    }

    fn raw_at(&self, index: usize) -> Option<(f64, bool)> {
        match &self.source {
            TickSource::Empty => None,
            TickSource::Single { value, time } => (index == 0).then_some((*value, *time)),
            TickSource::Stepped {
                spec,
                len,
                descending,
                time,
            } => {
                if index >= *len {
                    return None;
                }
                let i = if *descending {
                    spec.last - index as f64
                } else {
                    spec.first + index as f64
                };
                let value = if spec.increment < 0.0 {
                    i / -spec.increment
                } else {
                    i * spec.increment
                };
                Some((value, *time))
            }
            TickSource::Listed { values, time } => values.get(index).map(|v| (*v, *time)),
        }
    }
}

impl Iterator for TickIter {
    type Item = DomainValue;

    fn next(&mut self) -> Option<Self::Item> {
        let (value, time) = self.raw_at(self.cursor)?;
        self.cursor += 1;
        if time {
            Some(
                unix_millis_to_datetime(value)
                    .map_or_else(|| DomainValue::number(value), DomainValue::Time),
            )
        } else {
            Some(DomainValue::number(value))
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.len_total().saturating_sub(self.cursor);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for TickIter {}

/// Log ticks over a strictly positive `[lo, hi]` (ascending).
pub(crate) fn log_tick_values(lo: f64, hi: f64, base: f64, count: usize) -> Vec<f64> {
    if count == 0 || !(lo > 0.0) || !hi.is_finite() {
        return Vec::new();
    }
    let log = |x: f64| x.ln() / base.ln();
    let (i, j) = (log(lo), log(hi));
    let k = count as f64;

    let integer_base = base.fract() == 0.0;
    let multiples = (j.ceil() - i.floor() + 1.0) * (base - 1.0);
    if integer_base && j - i < k && multiples <= MAX_TICKS {
        let mut ticks = Vec::new();
        let base_int = base as u32;
        let mut exponent = i.floor();
        while exponent <= j.ceil() {
            for multiple in 1..base_int {
                let t = f64::from(multiple) * base.powf(exponent);
                if t < lo {
                    continue;
                }
                if t > hi {
                    break;
                }
                ticks.push(t);
            }
            exponent += 1.0;
        }
        if (ticks.len() * 2) < count {
            return TickIter::linear(lo, hi, count, false)
                .filter_map(|value| value.as_number())
                .collect();
        }
        ticks
    } else {
        let span_count = ((j - i).floor() as usize).min(count).max(1);
        TickIter::linear(i, j, span_count, false)
            .filter_map(|value| value.as_number())
            .map(|exponent| base.powf(exponent))
            .collect()
    }
}

/// Calendar-aware interval used for time ticks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimeInterval {
    /// Sub-second stepping in whole milliseconds.
    Millis(f64),
    /// Fixed-duration stepping aligned to the unix epoch.
    Fixed { millis: i64 },
    Months(u32),
    Years(i32),
}

const SECOND: i64 = 1_000;
const MINUTE: i64 = 60 * SECOND;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;
const WEEK: i64 = 7 * DAY;
const MONTH_APPROX: i64 = 30 * DAY;
const YEAR_APPROX: i64 = 365 * DAY;

const TIME_INTERVALS: [(TimeInterval, i64); 17] = [
    (TimeInterval::Fixed { millis: SECOND }, SECOND),
    (TimeInterval::Fixed { millis: 5 * SECOND }, 5 * SECOND),
    (TimeInterval::Fixed { millis: 15 * SECOND }, 15 * SECOND),
    (TimeInterval::Fixed { millis: 30 * SECOND }, 30 * SECOND),
    (TimeInterval::Fixed { millis: MINUTE }, MINUTE),
    (TimeInterval::Fixed { millis: 5 * MINUTE }, 5 * MINUTE),
    (TimeInterval::Fixed { millis: 15 * MINUTE }, 15 * MINUTE),
    (TimeInterval::Fixed { millis: 30 * MINUTE }, 30 * MINUTE),
    (TimeInterval::Fixed { millis: HOUR }, HOUR),
    (TimeInterval::Fixed { millis: 3 * HOUR }, 3 * HOUR),
    (TimeInterval::Fixed { millis: 6 * HOUR }, 6 * HOUR),
    (TimeInterval::Fixed { millis: 12 * HOUR }, 12 * HOUR),
    (TimeInterval::Fixed { millis: DAY }, DAY),
    (TimeInterval::Fixed { millis: 2 * DAY }, 2 * DAY),
    (TimeInterval::Fixed { millis: WEEK }, WEEK),
    (TimeInterval::Months(1), MONTH_APPROX),
    (TimeInterval::Months(3), 3 * MONTH_APPROX),
];

/// Picks the tick interval whose duration is closest to `span / count`.
#[must_use]
pub fn time_interval(start_ms: f64, stop_ms: f64, count: usize) -> Option<TimeInterval> {
    if count == 0 {
        return None;
    }
    let span = (stop_ms - start_ms).abs();
    if !span.is_finite() || span == 0.0 {
        return None;
    }
    let target = span / count as f64;

    if target > YEAR_APPROX as f64 {
        let years = tick_step(
            start_ms / YEAR_APPROX as f64,
            stop_ms / YEAR_APPROX as f64,
            count,
        )
        .abs()
        .max(1.0);
        return Some(TimeInterval::Years(years as i32));
    }
    if target < SECOND as f64 {
        let step = tick_step(start_ms, stop_ms, count).abs().max(1.0);
        return Some(TimeInterval::Millis(step));
    }

    let index = TIME_INTERVALS
        .iter()
        .position(|(_, millis)| *millis as f64 >= target)
        .unwrap_or(TIME_INTERVALS.len());
    if index == TIME_INTERVALS.len() {
        return Some(TimeInterval::Years(1));
    }
    if index == 0 {
        return Some(TIME_INTERVALS[0].0);
    }
    let (below, below_ms) = TIME_INTERVALS[index - 1];
    let (above, above_ms) = TIME_INTERVALS[index];
    if target / (below_ms as f64) < (above_ms as f64) / target {
        Some(below)
    } else {
        Some(above)
    }
}

impl TimeInterval {
    /// Largest interval boundary at or before `millis`.
    #[must_use]
    pub fn floor(self, millis: f64) -> f64 {
        match self {
            Self::Millis(step) => (millis / step).floor() * step,
            Self::Fixed { millis: step } => (millis / step as f64).floor() * step as f64,
            Self::Months(step) => {
                let Some(time) = unix_millis_to_datetime(millis) else {
                    return millis;
                };
                let month_index = time.year() * 12 + time.month0() as i32;
                let aligned = month_index - month_index.rem_euclid(step as i32);
                month_start(aligned.div_euclid(12), aligned.rem_euclid(12) as u32 + 1)
                    .map_or(millis, |t| t.timestamp_millis() as f64)
            }
            Self::Years(step) => {
                let Some(time) = unix_millis_to_datetime(millis) else {
                    return millis;
                };
                let year = time.year() - time.year().rem_euclid(step.max(1));
                month_start(year, 1).map_or(millis, |t| t.timestamp_millis() as f64)
            }
        }
    }

    /// Smallest interval boundary at or after `millis`.
    #[must_use]
    pub fn ceil(self, millis: f64) -> f64 {
        let floor = self.floor(millis);
        if floor >= millis {
            floor
        } else {
            self.offset(floor)
        }
    }

    /// The boundary one interval after `millis` (which must be aligned).
    #[must_use]
    pub fn offset(self, millis: f64) -> f64 {
        match self {
            Self::Millis(step) => millis + step,
            Self::Fixed { millis: step } => millis + step as f64,
            Self::Months(step) => unix_millis_to_datetime(millis)
                .and_then(|t| t.checked_add_months(Months::new(step)))
                .map_or(f64::INFINITY, |t| t.timestamp_millis() as f64),
            Self::Years(step) => unix_millis_to_datetime(millis)
                .and_then(|t| t.checked_add_months(Months::new(12 * step.max(1) as u32)))
                .map_or(f64::INFINITY, |t| t.timestamp_millis() as f64),
        }
    }

    /// chrono format pattern suited to labels at this interval.
    #[must_use]
    pub fn label_pattern(self) -> &'static str {
        match self {
            Self::Millis(_) => "%H:%M:%S%.3f",
            Self::Fixed { millis } if millis < MINUTE => "%H:%M:%S",
            Self::Fixed { millis } if millis < DAY => "%H:%M",
            Self::Fixed { .. } => "%b %d",
            Self::Months(_) => "%b %Y",
            Self::Years(_) => "%Y",
        }
    }
}

fn month_start(year: i32, month: u32) -> Option<DateTime<Utc>> {
    Utc.with_ymd_and_hms(year, month, 1, 0, 0, 0).single()
}

/// Time ticks between two unix-millisecond bounds, in domain order.
pub(crate) fn time_tick_values(start_ms: f64, stop_ms: f64, count: usize) -> Vec<f64> {
    let Some(interval) = time_interval(start_ms, stop_ms, count) else {
        return if count > 0 && start_ms == stop_ms && start_ms.is_finite() {
            vec![start_ms]
        } else {
            Vec::new()
        };
    };
    let descending = stop_ms < start_ms;
    let (lo, hi) = if descending {
        (stop_ms, start_ms)
    } else {
        (start_ms, stop_ms)
    };

    let mut ticks = Vec::new();
    let mut tick = interval.ceil(lo);
    while tick <= hi && (ticks.len() as f64) < MAX_TICKS {
        ticks.push(tick);
        let next = interval.offset(tick);
        if !(next > tick) {
            break;
        }
        tick = next;
    }
    if descending {
        ticks.reverse();
    }
    ticks
}

/// Value-to-label function for one scale.
#[derive(Debug, Clone, PartialEq)]
pub enum TickFormat {
    /// Fixed-point numbers with the given fraction digits.
    Fixed { precision: usize },
    /// Plain decimals near unity, exponent notation elsewhere.
    Exponent,
    /// chrono pattern applied to timestamps.
    Time { pattern: &'static str },
    /// Default stringification.
    Plain,
}

impl TickFormat {
    #[must_use]
    pub fn format(&self, value: &DomainValue) -> String {
        match (self, value) {
            (Self::Fixed { precision }, DomainValue::Number(number)) => {
                let number = number.into_inner();
                // Avoid "-0.0" labels for values that round to zero.
                let formatted = format!("{number:.precision$}");
                if formatted.trim_start_matches('-').chars().all(|c| c == '0' || c == '.') {
                    formatted.trim_start_matches('-').to_owned()
                } else {
                    formatted
                }
            }
            (Self::Exponent, DomainValue::Number(number)) => {
                let number = number.into_inner();
                let magnitude = number.abs();
                if magnitude == 0.0 || (1e-3..1e6).contains(&magnitude) {
                    format!("{number}")
                } else {
                    format!("{number:e}")
                }
            }
            (Self::Time { pattern }, DomainValue::Time(time)) => time.format(pattern).to_string(),
            _ => value.to_string(),
        }
    }
}
