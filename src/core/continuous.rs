use serde::{Deserialize, Serialize};

use crate::core::domain::DomainValue;
use crate::core::primitives::unix_millis_to_datetime;
use crate::core::scale::ScaleKind;
use crate::core::ticks::{
    TickFormat, TickIter, log_tick_values, nice_linear, precision_fixed, tick_step,
    time_interval, time_tick_values,
};
use crate::error::{ChartError, ChartResult};

/// Tick count used when `nice` extends a domain.
const NICE_TICK_COUNT: usize = 10;

/// Value transform applied before linear interpolation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Transform {
    Identity,
    /// Logarithm in `base`; `negative` mirrors the transform for all-negative
    /// domains.
    Log { base: f64, negative: bool },
    /// Sign-preserving power.
    Pow { exponent: f64 },
}

impl Transform {
    fn forward(self, value: f64) -> f64 {
        match self {
            Self::Identity => value,
            Self::Log { base, negative } => {
                if negative {
                    -(-value).ln() / base.ln()
                } else {
                    value.ln() / base.ln()
                }
            }
            Self::Pow { exponent } => value.signum() * value.abs().powf(exponent),
        }
    }

    fn inverse(self, value: f64) -> f64 {
        match self {
            Self::Identity => value,
            Self::Log { base, negative } => {
                if negative {
                    -base.powf(-value)
                } else {
                    base.powf(value)
                }
            }
            Self::Pow { exponent } => value.signum() * value.abs().powf(exponent.recip()),
        }
    }
}

/// Continuous mapping (linear, log, pow, sqrt or time) from a numeric domain
/// onto a pixel range.
///
/// Time domains are stored as unix milliseconds. The mapping is fixed at
/// construction; `with_domain`/`with_range` build a new scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContinuousScale {
    kind: ScaleKind,
    transform: Transform,
    domain: (f64, f64),
    range: (f64, f64),
    clamp: bool,
    nice: bool,
    transformed: (f64, f64),
}

impl ContinuousScale {
    pub(crate) fn new(
        kind: ScaleKind,
        transform: Transform,
        domain: (f64, f64),
        range: (f64, f64),
        clamp: bool,
        nice: bool,
    ) -> ChartResult<Self> {
        if !domain.0.is_finite() || !domain.1.is_finite() {
            return Err(ChartError::config("continuous domain must be finite"));
        }
        let transform = match transform {
            Transform::Log { base, .. } => {
                if domain.0 * domain.1 <= 0.0 {
                    return Err(ChartError::domain(format!(
                        "log domain [{}, {}] must not include or cross zero",
                        domain.0, domain.1
                    )));
                }
                Transform::Log {
                    base,
                    negative: domain.0 < 0.0,
                }
            }
            other => other,
        };

        let domain = if nice {
            nice_domain(kind, transform, domain)
        } else {
            domain
        };
        let transformed = (transform.forward(domain.0), transform.forward(domain.1));
        Ok(Self {
            kind,
            transform,
            domain,
            range,
            clamp,
            nice,
            transformed,
        })
    }

    #[must_use]
    pub fn kind(&self) -> ScaleKind {
        self.kind
    }

    #[must_use]
    pub fn transform(&self) -> Transform {
        self.transform
    }

    /// Effective numeric domain (after `nice`).
    #[must_use]
    pub fn numeric_domain(&self) -> (f64, f64) {
        self.domain
    }

    #[must_use]
    pub fn domain(&self) -> (DomainValue, DomainValue) {
        (self.domain_value(self.domain.0), self.domain_value(self.domain.1))
    }

    #[must_use]
    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    #[must_use]
    pub fn is_clamped(&self) -> bool {
        self.clamp
    }

    #[must_use]
    pub fn is_nice(&self) -> bool {
        self.nice
    }

    pub fn with_range(&self, range: (f64, f64)) -> ChartResult<Self> {
        Self::new(
            self.kind,
            self.transform,
            self.domain,
            range,
            self.clamp,
            false,
        )
        .map(|scale| Self {
            nice: self.nice,
            ..scale
        })
    }

    pub fn with_domain(&self, domain: (f64, f64)) -> ChartResult<Self> {
        Self::new(
            self.kind,
            self.transform,
            domain,
            self.range,
            self.clamp,
            self.nice,
        )
    }

    /// Maps a domain number to a pixel offset.
    ///
    /// A degenerate domain maps every input to the middle of the range.
    pub fn map(&self, value: f64) -> ChartResult<f64> {
        if !value.is_finite() {
            return Err(ChartError::domain("value must be finite"));
        }
        if let Transform::Log { negative, .. } = self.transform {
            if (negative && value >= 0.0) || (!negative && value <= 0.0) {
                return Err(ChartError::domain(format!(
                    "value {value} is outside the log domain sign"
                )));
            }
        }

        let (r0, r1) = self.range;
        let (t0, t1) = self.transformed;
        let span = t1 - t0;
        if span == 0.0 || !span.is_finite() {
            return Ok((r0 + r1) * 0.5);
        }

        let mut t = (self.transform.forward(value) - t0) / span;
        if self.clamp {
            t = t.clamp(0.0, 1.0);
        }
        Ok(r0 + t * (r1 - r0))
    }

    /// Maps a pixel offset back to the domain.
    #[must_use]
    pub fn invert(&self, pixel: f64) -> f64 {
        let (r0, r1) = self.range;
        let (t0, t1) = self.transformed;
        if r1 == r0 || t1 == t0 {
            return self.domain.0;
        }
        let mut t = (pixel - r0) / (r1 - r0);
        if self.clamp {
            t = t.clamp(0.0, 1.0);
        }
        self.transform.inverse(t0 + t * (t1 - t0))
    }

    /// Converts a domain value into this scale's numeric space.
    pub fn numeric_input(&self, value: &DomainValue) -> ChartResult<f64> {
        match (self.kind, value) {
            (_, DomainValue::Number(number)) => Ok(number.into_inner()),
            (ScaleKind::Time, DomainValue::Time(_)) => value
                .continuous_value()
                .ok_or_else(|| ChartError::domain("invalid timestamp")),
            (kind, other) => Err(ChartError::domain(format!(
                "{kind} scale cannot map {} value `{other}`",
                other.type_name()
            ))),
        }
    }

    #[must_use]
    pub fn ticks(&self, count: usize) -> TickIter {
        let (d0, d1) = self.domain;
        match self.transform {
            _ if self.kind == ScaleKind::Time => {
                TickIter::listed(time_tick_values(d0, d1, count), true)
            }
            Transform::Log { base, negative } => {
                let (lo, hi) = if negative {
                    (-d0.max(d1), -d0.min(d1))
                } else {
                    (d0.min(d1), d0.max(d1))
                };
                let mut values = log_tick_values(lo, hi, base, count);
                if negative {
                    values.iter_mut().for_each(|v| *v = -*v);
                    values.reverse();
                }
                if d1 < d0 {
                    values.reverse();
                }
                TickIter::listed(values, false)
            }
            Transform::Identity | Transform::Pow { .. } => TickIter::linear(d0, d1, count, false),
        }
    }

    #[must_use]
    pub fn tick_format(&self, count: usize) -> TickFormat {
        let (d0, d1) = self.domain;
        match self.transform {
            _ if self.kind == ScaleKind::Time => time_interval(d0, d1, count).map_or(
                TickFormat::Time {
                    pattern: "%Y-%m-%d %H:%M:%S",
                },
                |interval| TickFormat::Time {
                    pattern: interval.label_pattern(),
                },
            ),
            Transform::Log { .. } => TickFormat::Exponent,
            Transform::Identity | Transform::Pow { .. } => TickFormat::Fixed {
                precision: precision_fixed(tick_step(d0, d1, count.max(1))),
            },
        }
    }

    fn domain_value(&self, value: f64) -> DomainValue {
        if self.kind == ScaleKind::Time {
            unix_millis_to_datetime(value).map_or_else(|| DomainValue::number(value), DomainValue::Time)
        } else {
            DomainValue::number(value)
        }
    }
}

fn nice_domain(kind: ScaleKind, transform: Transform, domain: (f64, f64)) -> (f64, f64) {
    let (d0, d1) = domain;
    if d0 == d1 {
        return domain;
    }
    if kind == ScaleKind::Time {
        let Some(interval) = time_interval(d0, d1, NICE_TICK_COUNT) else {
            return domain;
        };
        return if d0 <= d1 {
            (interval.floor(d0), interval.ceil(d1))
        } else {
            (interval.ceil(d0), interval.floor(d1))
        };
    }
    match transform {
        Transform::Log { base, negative } => {
            let log = |x: f64| x.abs().ln() / base.ln();
            let outward = |x: f64, up: bool| {
                let exponent = if up { log(x).ceil() } else { log(x).floor() };
                let magnitude = base.powf(exponent);
                if negative { -magnitude } else { magnitude }
            };
            // Larger magnitude rounds up, smaller rounds down.
            let grows = |x: f64, other: f64| x.abs() >= other.abs();
            (outward(d0, grows(d0, d1)), outward(d1, grows(d1, d0)))
        }
        Transform::Identity | Transform::Pow { .. } => nice_linear(d0, d1, NICE_TICK_COUNT),
    }
}
