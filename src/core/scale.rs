use std::fmt;
use std::str::FromStr;

use chrono::{TimeZone, Utc};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::core::band::{BandScale, PointScale};
use crate::core::continuous::{ContinuousScale, Transform};
use crate::core::domain::DomainValue;
use crate::core::ordinal::{OrdinalOutput, OrdinalScale};
use crate::core::ticks::{TickFormat, TickIter};
use crate::error::{ChartError, ChartResult};

/// The eight scale variants accepted by [`create_scale`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleKind {
    Linear,
    Log,
    Pow,
    Sqrt,
    Time,
    Band,
    Point,
    Ordinal,
}

impl ScaleKind {
    pub const ALL: [Self; 8] = [
        Self::Linear,
        Self::Log,
        Self::Pow,
        Self::Sqrt,
        Self::Time,
        Self::Band,
        Self::Point,
        Self::Ordinal,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::Log => "log",
            Self::Pow => "pow",
            Self::Sqrt => "sqrt",
            Self::Time => "time",
            Self::Band => "band",
            Self::Point => "point",
            Self::Ordinal => "ordinal",
        }
    }

    #[must_use]
    pub const fn is_continuous(self) -> bool {
        matches!(
            self,
            Self::Linear | Self::Log | Self::Pow | Self::Sqrt | Self::Time
        )
    }
}

impl fmt::Display for ScaleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScaleKind {
    type Err = ChartError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == tag)
            .ok_or_else(|| ChartError::config(format!("unknown scale variant `{tag}`")))
    }
}

/// Declarative scale description.
///
/// Serializable so scale setups can be loaded from JSON alongside the chart
/// configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScaleConfig {
    pub kind: ScaleKind,
    #[serde(default)]
    pub domain: Option<Vec<DomainValue>>,
    #[serde(default)]
    pub range: Option<Vec<f64>>,
    #[serde(default)]
    pub nice: bool,
    #[serde(default)]
    pub clamp: bool,
    /// Band/point padding fraction.
    #[serde(default)]
    pub padding: Option<f64>,
    /// Pow exponent.
    #[serde(default)]
    pub exponent: Option<f64>,
    /// Log base.
    #[serde(default)]
    pub base: Option<f64>,
    /// Ordinal output set; defaults to `range` values.
    #[serde(default)]
    pub outputs: Option<Vec<OrdinalOutput>>,
}

impl ScaleConfig {
    #[must_use]
    pub fn new(kind: ScaleKind) -> Self {
        Self {
            kind,
            domain: None,
            range: None,
            nice: false,
            clamp: false,
            padding: None,
            exponent: None,
            base: None,
            outputs: None,
        }
    }

    /// Parses a JSON config; an unknown `kind` is a configuration error.
    pub fn from_json(json: &str) -> ChartResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    #[must_use]
    pub fn with_domain<V: Into<DomainValue>>(mut self, domain: impl IntoIterator<Item = V>) -> Self {
        self.domain = Some(domain.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn with_range(mut self, start: f64, end: f64) -> Self {
        self.range = Some(vec![start, end]);
        self
    }

    #[must_use]
    pub fn with_nice(mut self, nice: bool) -> Self {
        self.nice = nice;
        self
    }

    #[must_use]
    pub fn with_clamp(mut self, clamp: bool) -> Self {
        self.clamp = clamp;
        self
    }

    #[must_use]
    pub fn with_padding(mut self, padding: f64) -> Self {
        self.padding = Some(padding);
        self
    }

    #[must_use]
    pub fn with_exponent(mut self, exponent: f64) -> Self {
        self.exponent = Some(exponent);
        self
    }

    #[must_use]
    pub fn with_base(mut self, base: f64) -> Self {
        self.base = Some(base);
        self
    }

    #[must_use]
    pub fn with_outputs<O: Into<OrdinalOutput>>(mut self, outputs: impl IntoIterator<Item = O>) -> Self {
        self.outputs = Some(outputs.into_iter().map(Into::into).collect());
        self
    }

    fn resolved_range(&self) -> ChartResult<(f64, f64)> {
        match self.range.as_deref() {
            None => Ok((0.0, 1.0)),
            Some([start, end]) if start.is_finite() && end.is_finite() => Ok((*start, *end)),
            Some([_, _]) => Err(ChartError::config("range bounds must be finite")),
            Some(other) => Err(ChartError::config(format!(
                "range must have exactly two numbers, got {}",
                other.len()
            ))),
        }
    }

    fn resolved_continuous_domain(&self) -> ChartResult<(f64, f64)> {
        let Some(domain) = self.domain.as_deref() else {
            return Ok(match self.kind {
                ScaleKind::Log => (1.0, 10.0),
                ScaleKind::Time => {
                    let start = Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).single();
                    let end = Utc.with_ymd_and_hms(2000, 1, 2, 0, 0, 0).single();
                    match (start, end) {
                        (Some(start), Some(end)) => (
                            start.timestamp_millis() as f64,
                            end.timestamp_millis() as f64,
                        ),
                        _ => (0.0, 86_400_000.0),
                    }
                }
                _ => (0.0, 1.0),
            });
        };
        let [start, end] = domain else {
            return Err(ChartError::config(format!(
                "{} domain must have exactly two values, got {}",
                self.kind,
                domain.len()
            )));
        };
        let position = |value: &DomainValue| -> ChartResult<f64> {
            let matches_kind = match value {
                DomainValue::Number(_) => self.kind != ScaleKind::Time,
                DomainValue::Time(_) => self.kind == ScaleKind::Time,
                DomainValue::Text(_) => false,
            };
            if !matches_kind {
                return Err(ChartError::config(format!(
                    "{} domain cannot hold {} value `{value}`",
                    self.kind,
                    value.type_name()
                )));
            }
            value
                .continuous_value()
                .ok_or_else(|| ChartError::config("invalid continuous domain value"))
        };
        Ok((position(start)?, position(end)?))
    }

    fn resolved_transform(&self) -> ChartResult<Transform> {
        match self.kind {
            ScaleKind::Log => {
                let base = self.base.unwrap_or(10.0);
                if !base.is_finite() || base <= 0.0 || base == 1.0 {
                    return Err(ChartError::config(format!(
                        "log base must be finite, > 0 and != 1, got {base}"
                    )));
                }
                Ok(Transform::Log {
                    base,
                    negative: false,
                })
            }
            ScaleKind::Pow | ScaleKind::Sqrt => {
                let default = if self.kind == ScaleKind::Sqrt { 0.5 } else { 1.0 };
                let exponent = self.exponent.unwrap_or(default);
                if !exponent.is_finite() || exponent == 0.0 {
                    return Err(ChartError::config(format!(
                        "pow exponent must be finite and non-zero, got {exponent}"
                    )));
                }
                Ok(Transform::Pow { exponent })
            }
            _ => Ok(Transform::Identity),
        }
    }

    fn reject_padding(&self) -> ChartResult<()> {
        if self.padding.is_some() {
            return Err(ChartError::config(format!(
                "padding only applies to band and point scales, not {}",
                self.kind
            )));
        }
        Ok(())
    }
}

/// A constructed scale: a closed set of variants, each with its own
/// capability set.
#[derive(Debug, Clone, PartialEq)]
pub enum Scale {
    Continuous(ContinuousScale),
    Band(BandScale),
    Point(PointScale),
    Ordinal(OrdinalScale),
}

/// Builds a scale from its declarative configuration.
pub fn create_scale(config: &ScaleConfig) -> ChartResult<Scale> {
    let scale = match config.kind {
        ScaleKind::Linear | ScaleKind::Log | ScaleKind::Pow | ScaleKind::Sqrt | ScaleKind::Time => {
            config.reject_padding()?;
            Scale::Continuous(ContinuousScale::new(
                config.kind,
                config.resolved_transform()?,
                config.resolved_continuous_domain()?,
                config.resolved_range()?,
                config.clamp,
                config.nice,
            )?)
        }
        ScaleKind::Band => Scale::Band(BandScale::new(
            config.domain.iter().flatten().cloned(),
            config.resolved_range()?,
            config.padding.unwrap_or(0.0),
        )?),
        ScaleKind::Point => Scale::Point(PointScale::new(
            config.domain.iter().flatten().cloned(),
            config.resolved_range()?,
            config.padding.unwrap_or(0.0),
        )?),
        ScaleKind::Ordinal => {
            config.reject_padding()?;
            let outputs = match (&config.outputs, &config.range) {
                (Some(outputs), _) => outputs.clone(),
                (None, Some(range)) => range.iter().copied().map(OrdinalOutput::Number).collect(),
                (None, None) => Vec::new(),
            };
            Scale::Ordinal(OrdinalScale::new(
                config.domain.iter().flatten().cloned(),
                outputs,
            ))
        }
    };
    trace!(kind = %config.kind, "created scale");
    Ok(scale)
}

impl Scale {
    pub fn from_config(config: &ScaleConfig) -> ChartResult<Self> {
        create_scale(config)
    }

    #[must_use]
    pub fn kind(&self) -> ScaleKind {
        match self {
            Self::Continuous(scale) => scale.kind(),
            Self::Band(_) => ScaleKind::Band,
            Self::Point(_) => ScaleKind::Point,
            Self::Ordinal(_) => ScaleKind::Ordinal,
        }
    }

    /// Maps a domain value to a pixel offset.
    ///
    /// Ordinal scales only map when the chosen output is numeric; use
    /// [`OrdinalScale::output`] for other outputs.
    pub fn apply(&self, value: &DomainValue) -> ChartResult<f64> {
        match self {
            Self::Continuous(scale) => scale.map(scale.numeric_input(value)?),
            Self::Band(scale) => scale.map(value),
            Self::Point(scale) => scale.map(value),
            Self::Ordinal(scale) => match scale.output(value) {
                Some(OrdinalOutput::Number(number)) => Ok(*number),
                Some(_) => Err(ChartError::config(
                    "ordinal output is not numeric; use OrdinalScale::output",
                )),
                None => Err(ChartError::domain(format!(
                    "key `{value}` has no ordinal output"
                ))),
            },
        }
    }

    /// Convenience for numeric inputs.
    pub fn apply_number(&self, value: f64) -> ChartResult<f64> {
        self.apply(&DomainValue::number(value))
    }

    /// Maps a pixel offset back to the domain value it represents.
    #[must_use]
    pub fn invert(&self, pixel: f64) -> Option<DomainValue> {
        match self {
            Self::Continuous(scale) => {
                let value = scale.invert(pixel);
                if scale.kind() == ScaleKind::Time {
                    crate::core::primitives::unix_millis_to_datetime(value).map(DomainValue::Time)
                } else {
                    Some(DomainValue::number(value))
                }
            }
            Self::Band(scale) => scale.key_at(pixel).cloned(),
            Self::Point(scale) => scale.key_at(pixel).cloned(),
            Self::Ordinal(_) => None,
        }
    }

    /// Per-key width for band (and zero-width point) scales.
    #[must_use]
    pub fn bandwidth(&self) -> Option<f64> {
        match self {
            Self::Band(scale) => Some(scale.bandwidth()),
            Self::Point(_) => Some(0.0),
            Self::Continuous(_) | Self::Ordinal(_) => None,
        }
    }

    /// Keys of a categorical scale in domain order.
    #[must_use]
    pub fn categories(&self) -> Option<&IndexSet<DomainValue>> {
        match self {
            Self::Band(scale) => Some(scale.domain()),
            Self::Point(scale) => Some(scale.domain()),
            Self::Ordinal(scale) => Some(scale.domain()),
            Self::Continuous(_) => None,
        }
    }

    #[must_use]
    pub fn range(&self) -> Option<(f64, f64)> {
        match self {
            Self::Continuous(scale) => Some(scale.range()),
            Self::Band(scale) => Some(scale.range()),
            Self::Point(scale) => Some(scale.range()),
            Self::Ordinal(_) => None,
        }
    }

    /// Approximately `count` representative domain values; empty for scales
    /// without a tick concept.
    #[must_use]
    pub fn ticks(&self, count: usize) -> TickIter {
        match self {
            Self::Continuous(scale) => scale.ticks(count),
            Self::Band(_) | Self::Point(_) | Self::Ordinal(_) => TickIter::empty(),
        }
    }

    #[must_use]
    pub fn tick_format(&self, count: usize) -> TickFormat {
        match self {
            Self::Continuous(scale) => scale.tick_format(count),
            Self::Band(_) | Self::Point(_) | Self::Ordinal(_) => TickFormat::Plain,
        }
    }

    /// New scale with the same domain and options over another range.
    pub fn with_range(&self, start: f64, end: f64) -> ChartResult<Self> {
        if !start.is_finite() || !end.is_finite() {
            return Err(ChartError::config("range bounds must be finite"));
        }
        match self {
            Self::Continuous(scale) => scale.with_range((start, end)).map(Self::Continuous),
            Self::Band(scale) => scale.with_range((start, end)).map(Self::Band),
            Self::Point(scale) => scale.with_range((start, end)).map(Self::Point),
            Self::Ordinal(_) => Err(ChartError::config(
                "ordinal scales map to outputs, not a numeric range",
            )),
        }
    }

    /// New scale with the same range and options over another domain.
    pub fn with_domain(&self, domain: Vec<DomainValue>) -> ChartResult<Self> {
        match self {
            Self::Continuous(scale) => {
                let config = ScaleConfig::new(scale.kind()).with_domain(domain);
                let (start, end) = config.resolved_continuous_domain()?;
                scale.with_domain((start, end)).map(Self::Continuous)
            }
            Self::Band(scale) => scale.with_domain(domain).map(Self::Band),
            Self::Point(scale) => scale.with_domain(domain).map(Self::Point),
            Self::Ordinal(scale) => Ok(Self::Ordinal(scale.with_domain(domain))),
        }
    }

    #[must_use]
    pub fn as_continuous(&self) -> Option<&ContinuousScale> {
        match self {
            Self::Continuous(scale) => Some(scale),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_band(&self) -> Option<&BandScale> {
        match self {
            Self::Band(scale) => Some(scale),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_ordinal(&self) -> Option<&OrdinalScale> {
        match self {
            Self::Ordinal(scale) => Some(scale),
            _ => None,
        }
    }
}
