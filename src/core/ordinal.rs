use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::core::domain::DomainValue;
use crate::render::Color;

/// Output value of an ordinal scale. Not necessarily a pixel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OrdinalOutput {
    Number(f64),
    Color(Color),
    Text(String),
}

impl From<f64> for OrdinalOutput {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<Color> for OrdinalOutput {
    fn from(value: Color) -> Self {
        Self::Color(value)
    }
}

impl From<&str> for OrdinalOutput {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

/// Maps keys to outputs round-robin by key position.
#[derive(Debug, Clone, PartialEq)]
pub struct OrdinalScale {
    domain: IndexSet<DomainValue>,
    outputs: Vec<OrdinalOutput>,
}

impl OrdinalScale {
    #[must_use]
    pub fn new(
        domain: impl IntoIterator<Item = DomainValue>,
        outputs: impl IntoIterator<Item = OrdinalOutput>,
    ) -> Self {
        Self {
            domain: domain.into_iter().collect(),
            outputs: outputs.into_iter().collect(),
        }
    }

    /// Output for `key`, or `None` for keys outside the domain or an empty
    /// output set.
    #[must_use]
    pub fn output(&self, key: &DomainValue) -> Option<&OrdinalOutput> {
        if self.outputs.is_empty() {
            return None;
        }
        let index = self.domain.get_index_of(key)?;
        self.outputs.get(index % self.outputs.len())
    }

    #[must_use]
    pub fn domain(&self) -> &IndexSet<DomainValue> {
        &self.domain
    }

    #[must_use]
    pub fn outputs(&self) -> &[OrdinalOutput] {
        &self.outputs
    }

    #[must_use]
    pub fn with_domain(&self, domain: impl IntoIterator<Item = DomainValue>) -> Self {
        Self::new(domain, self.outputs.iter().cloned())
    }
}
