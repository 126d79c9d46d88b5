use std::fmt;

use tracing::{trace, warn};

use crate::error::ChartResult;

pub type FrameCallback<T> = Box<dyn FnOnce(&mut T) -> ChartResult<()>>;

/// Identifies one scheduled callback. Handles are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(u64);

impl FrameHandle {
    #[must_use]
    pub fn id(self) -> u64 {
        self.0
    }
}

/// Depth-1 frame queue.
///
/// At most one callback is pending. Scheduling again before the frame fires
/// cancels the pending callback and replaces it, so any number of requests
/// within one frame collapse to one execution of the latest callback.
pub struct FrameScheduler<T> {
    next_id: u64,
    pending: Option<(FrameHandle, FrameCallback<T>)>,
}

impl<T> FrameScheduler<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: 1,
            pending: None,
        }
    }

    pub fn schedule<F>(&mut self, callback: F) -> FrameHandle
    where
        F: FnOnce(&mut T) -> ChartResult<()> + 'static,
    {
        let handle = FrameHandle(self.next_id);
        self.next_id += 1;
        if let Some((replaced, _)) = self.pending.replace((handle, Box::new(callback))) {
            trace!(replaced = replaced.0, by = handle.0, "coalesced frame request");
        }
        handle
    }

    /// Cancels whatever is pending. Returns whether anything was.
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }

    /// Cancels `handle` only if it is still the pending request.
    pub fn cancel_handle(&mut self, handle: FrameHandle) -> bool {
        match &self.pending {
            Some((pending, _)) if *pending == handle => {
                self.pending = None;
                true
            }
            _ => {
                warn!(handle = handle.0, "cancel of stale frame handle ignored");
                false
            }
        }
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    #[must_use]
    pub fn pending_handle(&self) -> Option<FrameHandle> {
        self.pending.as_ref().map(|(handle, _)| *handle)
    }

    /// Removes the pending callback without running it.
    ///
    /// Owners that schedule callbacks against themselves take the callback
    /// out first and then invoke it with `&mut self`.
    pub fn take_pending(&mut self) -> Option<FrameCallback<T>> {
        self.pending.take().map(|(_, callback)| callback)
    }

    /// Fires the pending callback, if any, against `target`.
    pub fn run_frame(&mut self, target: &mut T) -> ChartResult<bool> {
        match self.take_pending() {
            Some(callback) => {
                callback(target)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

impl<T> Default for FrameScheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for FrameScheduler<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameScheduler")
            .field("next_id", &self.next_id)
            .field("pending", &self.pending_handle())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::FrameScheduler;
    use crate::error::ChartError;

    #[test]
    fn latest_request_wins() {
        let mut scheduler = FrameScheduler::<Vec<u8>>::new();
        scheduler.schedule(|log| {
            log.push(1);
            Ok(())
        });
        scheduler.schedule(|log| {
            log.push(2);
            Ok(())
        });

        let mut log = Vec::new();
        assert!(scheduler.run_frame(&mut log).expect("frame"));
        assert!(!scheduler.run_frame(&mut log).expect("idle frame"));
        assert_eq!(log, vec![2]);
    }

    #[test]
    fn cancelled_handle_never_fires() {
        let mut scheduler = FrameScheduler::<u32>::new();
        let handle = scheduler.schedule(|count| {
            *count += 1;
            Ok(())
        });
        assert!(scheduler.cancel_handle(handle));

        let mut count = 0;
        assert!(!scheduler.run_frame(&mut count).expect("frame"));
        assert_eq!(count, 0);
    }

    #[test]
    fn stale_handle_does_not_cancel_replacement() {
        let mut scheduler = FrameScheduler::<u32>::new();
        let first = scheduler.schedule(|_| Ok(()));
        let second = scheduler.schedule(|_| Ok(()));
        assert!(!scheduler.cancel_handle(first));
        assert_eq!(scheduler.pending_handle(), Some(second));
    }

    #[test]
    fn callback_errors_propagate_and_clear_the_slot() {
        let mut scheduler = FrameScheduler::<()>::new();
        scheduler.schedule(|_| Err(ChartError::Handler("boom".to_owned())));
        assert!(scheduler.run_frame(&mut ()).is_err());
        assert!(!scheduler.is_pending());
    }
}
