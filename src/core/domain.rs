use std::fmt;

use chrono::{DateTime, Utc};
use indexmap::IndexSet;
use ordered_float::OrderedFloat;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::core::primitives::{datetime_to_unix_millis, decimal_to_f64};
use crate::core::scale::ScaleKind;
use crate::error::{ChartError, ChartResult};

/// One data-space value accepted by a scale.
///
/// Numbers are wrapped in `OrderedFloat` so values can key categorical
/// domains.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DomainValue {
    Number(OrderedFloat<f64>),
    Time(DateTime<Utc>),
    Text(String),
}

impl DomainValue {
    #[must_use]
    pub fn number(value: f64) -> Self {
        Self::Number(OrderedFloat(value))
    }

    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn from_decimal(value: Decimal) -> ChartResult<Self> {
        Ok(Self::number(decimal_to_f64(value, "domain value")?))
    }

    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(value.into_inner()),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_time(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Time(time) => Some(*time),
            _ => None,
        }
    }

    /// Position on the continuous number line: the number itself or unix
    /// milliseconds for timestamps.
    #[must_use]
    pub fn continuous_value(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(value.into_inner()),
            Self::Time(time) => Some(datetime_to_unix_millis(*time)),
            Self::Text(_) => None,
        }
    }

    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Number(_) => "number",
            Self::Time(_) => "time",
            Self::Text(_) => "text",
        }
    }
}

impl fmt::Display for DomainValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{}", value.into_inner()),
            Self::Time(time) => write!(f, "{}", time.to_rfc3339()),
            Self::Text(text) => f.write_str(text),
        }
    }
}

impl From<f64> for DomainValue {
    fn from(value: f64) -> Self {
        Self::number(value)
    }
}

impl From<i32> for DomainValue {
    fn from(value: i32) -> Self {
        Self::number(f64::from(value))
    }
}

impl From<&str> for DomainValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for DomainValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<DateTime<Utc>> for DomainValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Time(value)
    }
}

/// Derives a scale domain from a dataset.
///
/// Continuous kinds return `[min, max]` over the accessor results; the values
/// must all be numbers (or all timestamps for [`ScaleKind::Time`]) and
/// non-finite numbers are skipped. Categorical kinds return the distinct
/// values in first-seen order.
pub fn compute_domain<T, F>(data: &[T], accessor: F, kind: ScaleKind) -> ChartResult<Vec<DomainValue>>
where
    F: Fn(&T) -> DomainValue,
{
    if kind.is_continuous() {
        continuous_extent(data, accessor, kind)
    } else {
        let distinct: IndexSet<DomainValue> = data.iter().map(accessor).collect();
        trace!(kind = ?kind, keys = distinct.len(), "computed categorical domain");
        Ok(distinct.into_iter().collect())
    }
}

fn continuous_extent<T, F>(data: &[T], accessor: F, kind: ScaleKind) -> ChartResult<Vec<DomainValue>>
where
    F: Fn(&T) -> DomainValue,
{
    if data.is_empty() {
        return Err(ChartError::EmptyDomain);
    }

    let expected = if kind == ScaleKind::Time { "time" } else { "number" };
    let mut extent: Option<(DomainValue, f64, DomainValue, f64)> = None;
    for datum in data {
        let value = accessor(datum);
        if value.type_name() != expected {
            return Err(ChartError::config(format!(
                "{kind} domain requires {expected} values, found {}",
                value.type_name()
            )));
        }
        let Some(position) = value.continuous_value().filter(|v| v.is_finite()) else {
            continue;
        };
        extent = Some(match extent {
            None => (value.clone(), position, value, position),
            Some((min, min_pos, max, max_pos)) => {
                let (min, min_pos) = if position < min_pos {
                    (value.clone(), position)
                } else {
                    (min, min_pos)
                };
                let (max, max_pos) = if position > max_pos {
                    (value, position)
                } else {
                    (max, max_pos)
                };
                (min, min_pos, max, max_pos)
            }
        });
    }

    let (min, _, max, _) = extent.ok_or(ChartError::EmptyDomain)?;
    Ok(vec![min, max])
}
