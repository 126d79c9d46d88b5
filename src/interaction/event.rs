use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::Point;

/// Pointer and touch event kinds the normalizer subscribes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Click,
    Move,
    Enter,
    Leave,
    Down,
    Up,
    TouchStart,
    TouchMove,
    TouchEnd,
}

impl EventKind {
    pub const ALL: [Self; 9] = [
        Self::Click,
        Self::Move,
        Self::Enter,
        Self::Leave,
        Self::Down,
        Self::Up,
        Self::TouchStart,
        Self::TouchMove,
        Self::TouchEnd,
    ];

    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub const fn is_touch(self) -> bool {
        matches!(self, Self::TouchStart | Self::TouchMove | Self::TouchEnd)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Click => "click",
            Self::Move => "move",
            Self::Enter => "enter",
            Self::Leave => "leave",
            Self::Down => "down",
            Self::Up => "up",
            Self::TouchStart => "touch_start",
            Self::TouchMove => "touch_move",
            Self::TouchEnd => "touch_end",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Device event as delivered by the host, in client (viewport) coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum RawInput {
    Pointer {
        kind: EventKind,
        client: Point,
    },
    /// Active touch points, first contact first. May be empty.
    Touch {
        kind: EventKind,
        touches: SmallVec<[Point; 4]>,
    },
}

impl RawInput {
    #[must_use]
    pub fn pointer(kind: EventKind, client_x: f64, client_y: f64) -> Self {
        Self::Pointer {
            kind,
            client: Point::new(client_x, client_y),
        }
    }

    #[must_use]
    pub fn touch(kind: EventKind, touches: impl IntoIterator<Item = Point>) -> Self {
        Self::Touch {
            kind,
            touches: touches.into_iter().collect(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Pointer { kind, .. } | Self::Touch { kind, .. } => *kind,
        }
    }

    /// Client point that drives normalization: the pointer position, or the
    /// first touch.
    #[must_use]
    pub fn primary_client_point(&self) -> Option<Point> {
        match self {
            Self::Pointer { client, .. } => Some(*client),
            Self::Touch { touches, .. } => touches.first().copied(),
        }
    }
}

/// Event translated into surface-local logical coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedEvent<'a> {
    pub kind: EventKind,
    pub point: Point,
    pub source: &'a RawInput,
}
