use indexmap::IndexSet;

use crate::core::domain::DomainValue;
use crate::error::{ChartError, ChartResult};

/// Shared slot geometry for band and point scales.
///
/// The range is split into `n` equal steps; `padding_inner` narrows each slot
/// and `padding_outer` insets the first and last step from the range ends.
/// Leftover space is distributed evenly on both sides.
#[derive(Debug, Clone, PartialEq)]
struct SlotLayout {
    domain: IndexSet<DomainValue>,
    range: (f64, f64),
    step: f64,
    bandwidth: f64,
    start: f64,
    reversed: bool,
}

impl SlotLayout {
    fn new(
        domain: IndexSet<DomainValue>,
        range: (f64, f64),
        padding_inner: f64,
        padding_outer: f64,
    ) -> Self {
        let n = domain.len() as f64;
        let reversed = range.1 < range.0;
        let (lo, hi) = if reversed {
            (range.1, range.0)
        } else {
            range
        };
        let width = hi - lo;
        let step = width / (n - padding_inner + padding_outer * 2.0).max(1.0);
        let start = lo + (width - step * (n - padding_inner)) * 0.5;
        Self {
            domain,
            range,
            step,
            bandwidth: step * (1.0 - padding_inner),
            start,
            reversed,
        }
    }

    fn position_at(&self, index: usize) -> f64 {
        let slot = if self.reversed {
            self.domain.len() - 1 - index
        } else {
            index
        };
        self.start + self.step * slot as f64
    }

    fn position(&self, key: &DomainValue) -> ChartResult<f64> {
        self.domain
            .get_index_of(key)
            .map(|index| self.position_at(index))
            .ok_or_else(|| ChartError::domain(format!("key `{key}` is not in the scale domain")))
    }

    fn slot_at(&self, pixel: f64, nearest: bool) -> Option<&DomainValue> {
        if self.domain.is_empty() || !pixel.is_finite() || self.step <= 0.0 {
            return None;
        }
        let offset = (pixel - self.start) / self.step;
        let slot = if nearest { offset.round() } else { offset.floor() };
        if slot < 0.0 || slot >= self.domain.len() as f64 {
            return None;
        }
        let slot = slot as usize;
        let index = if self.reversed {
            self.domain.len() - 1 - slot
        } else {
            slot
        };
        self.domain.get_index(index)
    }
}

fn validate_padding(padding: f64) -> ChartResult<f64> {
    if !padding.is_finite() || !(0.0..=1.0).contains(&padding) {
        return Err(ChartError::config(format!(
            "padding must be a fraction in [0, 1], got {padding}"
        )));
    }
    Ok(padding)
}

/// Discrete scale assigning each key an equal-width band.
#[derive(Debug, Clone, PartialEq)]
pub struct BandScale {
    layout: SlotLayout,
    padding: f64,
}

impl BandScale {
    pub fn new(
        domain: impl IntoIterator<Item = DomainValue>,
        range: (f64, f64),
        padding: f64,
    ) -> ChartResult<Self> {
        let padding = validate_padding(padding)?;
        Ok(Self {
            layout: SlotLayout::new(domain.into_iter().collect(), range, padding, padding),
            padding,
        })
    }

    /// Start offset of the band for `key`.
    pub fn map(&self, key: &DomainValue) -> ChartResult<f64> {
        self.layout.position(key)
    }

    #[must_use]
    pub fn bandwidth(&self) -> f64 {
        self.layout.bandwidth
    }

    #[must_use]
    pub fn step(&self) -> f64 {
        self.layout.step
    }

    #[must_use]
    pub fn padding(&self) -> f64 {
        self.padding
    }

    #[must_use]
    pub fn domain(&self) -> &IndexSet<DomainValue> {
        &self.layout.domain
    }

    #[must_use]
    pub fn range(&self) -> (f64, f64) {
        self.layout.range
    }

    /// Key whose step contains `pixel`.
    #[must_use]
    pub fn key_at(&self, pixel: f64) -> Option<&DomainValue> {
        self.layout.slot_at(pixel, false)
    }

    pub fn with_range(&self, range: (f64, f64)) -> ChartResult<Self> {
        Self::new(self.layout.domain.iter().cloned(), range, self.padding)
    }

    pub fn with_domain(&self, domain: impl IntoIterator<Item = DomainValue>) -> ChartResult<Self> {
        Self::new(domain, self.layout.range, self.padding)
    }
}

/// Discrete scale placing keys at evenly spaced points with no width.
#[derive(Debug, Clone, PartialEq)]
pub struct PointScale {
    layout: SlotLayout,
    padding: f64,
}

impl PointScale {
    pub fn new(
        domain: impl IntoIterator<Item = DomainValue>,
        range: (f64, f64),
        padding: f64,
    ) -> ChartResult<Self> {
        let padding = validate_padding(padding)?;
        Ok(Self {
            layout: SlotLayout::new(domain.into_iter().collect(), range, 1.0, padding),
            padding,
        })
    }

    pub fn map(&self, key: &DomainValue) -> ChartResult<f64> {
        self.layout.position(key)
    }

    #[must_use]
    pub fn step(&self) -> f64 {
        self.layout.step
    }

    #[must_use]
    pub fn padding(&self) -> f64 {
        self.padding
    }

    #[must_use]
    pub fn domain(&self) -> &IndexSet<DomainValue> {
        &self.layout.domain
    }

    #[must_use]
    pub fn range(&self) -> (f64, f64) {
        self.layout.range
    }

    /// Key whose point lies nearest to `pixel`.
    #[must_use]
    pub fn key_at(&self, pixel: f64) -> Option<&DomainValue> {
        self.layout.slot_at(pixel, true)
    }

    pub fn with_range(&self, range: (f64, f64)) -> ChartResult<Self> {
        Self::new(self.layout.domain.iter().cloned(), range, self.padding)
    }

    pub fn with_domain(&self, domain: impl IntoIterator<Item = DomainValue>) -> ChartResult<Self> {
        Self::new(domain, self.layout.range, self.padding)
    }
}
