use std::fmt;

use serde::{Deserialize, Serialize};

/// Stacked drawing layers, bottom to top.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum LayerKind {
    Background,
    Grid,
    #[default]
    Data,
    Interaction,
    Overlay,
}

impl LayerKind {
    /// Paint order.
    pub const ALL: [Self; 5] = [
        Self::Background,
        Self::Grid,
        Self::Data,
        Self::Interaction,
        Self::Overlay,
    ];

    pub const COUNT: usize = Self::ALL.len();

    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Background => 0,
            Self::Grid => 1,
            Self::Data => 2,
            Self::Interaction => 3,
            Self::Overlay => 4,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Background => "background",
            Self::Grid => "grid",
            Self::Data => "data",
            Self::Interaction => "interaction",
            Self::Overlay => "overlay",
        }
    }
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
