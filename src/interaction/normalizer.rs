use std::fmt;
use std::rc::Rc;

use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::core::Point;
use crate::error::ChartResult;
use crate::interaction::{EventKind, NormalizedEvent, RawInput};

pub type Listener = Rc<dyn Fn(&NormalizedEvent<'_>) -> ChartResult<()>>;

/// Wraps a closure as a [`Listener`]. Keep the returned `Rc` to call
/// [`EventNormalizer::off`] later.
pub fn listener<F>(callback: F) -> Listener
where
    F: Fn(&NormalizedEvent<'_>) -> ChartResult<()> + 'static,
{
    Rc::new(callback)
}

/// Host-side input source of the interaction surface.
pub trait InputTarget {
    /// Client-space position of the surface's top-left corner.
    fn bounding_origin(&self) -> Point;

    fn add_raw_listener(&mut self, kind: EventKind);

    fn remove_raw_listener(&mut self, kind: EventKind);
}

/// Headless [`InputTarget`] that only tracks its origin and subscriptions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InteractionTarget {
    origin: Point,
    subscribed: [bool; 9],
}

impl InteractionTarget {
    #[must_use]
    pub fn new(origin: Point) -> Self {
        Self {
            origin,
            subscribed: [false; 9],
        }
    }

    pub fn set_origin(&mut self, origin: Point) {
        self.origin = origin;
    }

    #[must_use]
    pub fn is_subscribed(&self, kind: EventKind) -> bool {
        self.subscribed[kind.index()]
    }

    #[must_use]
    pub fn subscription_count(&self) -> usize {
        self.subscribed.iter().filter(|subscribed| **subscribed).count()
    }
}

impl InputTarget for InteractionTarget {
    fn bounding_origin(&self) -> Point {
        self.origin
    }

    fn add_raw_listener(&mut self, kind: EventKind) {
        self.subscribed[kind.index()] = true;
    }

    fn remove_raw_listener(&mut self, kind: EventKind) {
        self.subscribed[kind.index()] = false;
    }
}

/// Turns raw pointer/touch input on one target into surface-local
/// [`NormalizedEvent`]s and fans them out to per-kind listeners.
pub struct EventNormalizer<T: InputTarget> {
    target: T,
    attached: [bool; 9],
    listeners: [SmallVec<[Listener; 2]>; 9],
}

impl<T: InputTarget> EventNormalizer<T> {
    /// Subscribes to every [`EventKind`] on `target`.
    pub fn attach(mut target: T) -> Self {
        for kind in EventKind::ALL {
            target.add_raw_listener(kind);
        }
        debug!("event normalizer attached");
        Self {
            target,
            attached: [true; 9],
            listeners: Default::default(),
        }
    }

    #[must_use]
    pub fn target(&self) -> &T {
        &self.target
    }

    pub fn target_mut(&mut self) -> &mut T {
        &mut self.target
    }

    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.attached.iter().any(|attached| *attached)
    }

    /// Registers `listener` for `kind`. Returns `false` when it was already
    /// registered.
    pub fn on(&mut self, kind: EventKind, listener: Listener) -> bool {
        let bucket = &mut self.listeners[kind.index()];
        if bucket.iter().any(|existing| Rc::ptr_eq(existing, &listener)) {
            return false;
        }
        bucket.push(listener);
        true
    }

    pub fn off(&mut self, kind: EventKind, listener: &Listener) -> bool {
        let bucket = &mut self.listeners[kind.index()];
        let before = bucket.len();
        bucket.retain(|existing| !Rc::ptr_eq(existing, listener));
        bucket.len() != before
    }

    #[must_use]
    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.listeners[kind.index()].len()
    }

    /// Dispatches `raw` to the listeners of its kind in registration order.
    ///
    /// Returns how many listeners ran. The first listener error stops the
    /// dispatch and is returned as is.
    pub fn handle_raw(&self, raw: &RawInput) -> ChartResult<usize> {
        let kind = raw.kind();
        if !self.attached[kind.index()] {
            return Ok(0);
        }
        let Some(client) = raw.primary_client_point() else {
            trace!(%kind, "dropping touch event without contacts");
            return Ok(0);
        };

        let origin = self.target.bounding_origin();
        let event = NormalizedEvent {
            kind,
            point: Point::new(client.x - origin.x, client.y - origin.y),
            source: raw,
        };

        let mut invoked = 0;
        for listener in &self.listeners[kind.index()] {
            listener(&event)?;
            invoked += 1;
        }
        Ok(invoked)
    }

    /// Unsubscribes from the target and drops every registration. Listeners
    /// added afterwards are stored but never fire.
    pub fn destroy(&mut self) {
        for kind in EventKind::ALL {
            if std::mem::replace(&mut self.attached[kind.index()], false) {
                self.target.remove_raw_listener(kind);
            }
        }
        for bucket in &mut self.listeners {
            bucket.clear();
        }
        debug!("event normalizer destroyed");
    }
}

impl<T: InputTarget + fmt::Debug> fmt::Debug for EventNormalizer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: SmallVec<[usize; 9]> = self.listeners.iter().map(SmallVec::len).collect();
        f.debug_struct("EventNormalizer")
            .field("target", &self.target)
            .field("attached", &self.attached)
            .field("listener_counts", &counts)
            .finish()
    }
}
