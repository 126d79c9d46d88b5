mod event;
mod normalizer;

pub use event::{EventKind, NormalizedEvent, RawInput};
pub use hit_test::{MarkHit, Tooltip};
pub use normalizer::{EventNormalizer, InputTarget, InteractionTarget, Listener, listener};
