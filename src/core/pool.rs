use tracing::warn;

use crate::core::types::{Point, Rect};

/// Object that can be recycled through an [`ObjectPool`].
pub trait Poolable {
    /// Freshly constructed value in its canonical clean state.
    fn canonical() -> Self;

    /// Returns `self` to the canonical state. Called on release.
    fn reset(&mut self);
}

impl Poolable for Point {
    fn canonical() -> Self {
        Self::ZERO
    }

    fn reset(&mut self) {
        *self = Self::ZERO;
    }
}

impl Poolable for Rect {
    fn canonical() -> Self {
        Self::ZERO
    }

    fn reset(&mut self) {
        *self = Self::ZERO;
    }
}

/// Buffers keep their capacity across reuse.
impl<T> Poolable for Vec<T> {
    fn canonical() -> Self {
        Vec::new()
    }

    fn reset(&mut self) {
        self.clear();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PoolStats {
    /// Acquisitions served from the free list.
    pub reused: u64,
    /// Acquisitions that had to construct a new value.
    pub created: u64,
    /// Releases dropped because the pool was full.
    pub discarded: u64,
}

/// Single-threaded free list of reusable values.
///
/// Values are reset when released, so whatever `acquire` hands out is always
/// canonical.
#[derive(Debug)]
pub struct ObjectPool<T: Poolable> {
    free: Vec<T>,
    capacity: usize,
    stats: PoolStats,
}

impl<T: Poolable> ObjectPool<T> {
    pub const DEFAULT_CAPACITY: usize = 256;

    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            free: Vec::new(),
            capacity,
            stats: PoolStats::default(),
        }
    }

    pub fn acquire(&mut self) -> T {
        match self.free.pop() {
            Some(value) => {
                self.stats.reused += 1;
                value
            }
            None => {
                self.stats.created += 1;
                T::canonical()
            }
        }
    }

    pub fn release(&mut self, mut value: T) {
        if self.free.len() >= self.capacity {
            self.stats.discarded += 1;
            warn!(capacity = self.capacity, "object pool full; dropping released value");
            return;
        }
        value.reset();
        self.free.push(value);
    }

    /// Number of values waiting for reuse.
    #[must_use]
    pub fn len(&self) -> usize {
        self.free.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.free.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn stats(&self) -> PoolStats {
        self.stats
    }

    pub fn clear(&mut self) {
        self.free.clear();
    }
}

impl<T: Poolable> Default for ObjectPool<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Pools owned by one chart for per-frame geometry buffers.
#[derive(Debug, Default)]
pub struct FramePools {
    pub points: ObjectPool<Vec<Point>>,
    pub rects: ObjectPool<Vec<Rect>>,
}

impl FramePools {
    pub fn clear(&mut self) {
        self.points.clear();
        self.rects.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::{ObjectPool, Poolable};
    use crate::core::types::Point;

    #[test]
    fn released_point_comes_back_reset() {
        let mut pool = ObjectPool::<Point>::new();
        let mut point = pool.acquire();
        point.x = 4.0;
        point.y = -2.0;
        pool.release(point);

        assert_eq!(pool.acquire(), Point::ZERO);
        assert_eq!(pool.stats().reused, 1);
    }

    #[test]
    fn empty_pool_constructs_canonical_values() {
        let mut pool = ObjectPool::<Vec<Point>>::new();
        let buffer = pool.acquire();
        assert!(buffer.is_empty());
        assert_eq!(pool.stats().created, 1);
    }

    #[test]
    fn buffers_keep_capacity_but_lose_contents() {
        let mut pool = ObjectPool::<Vec<Point>>::new();
        let mut buffer = pool.acquire();
        buffer.extend([Point::new(1.0, 1.0); 32]);
        pool.release(buffer);

        let reused = pool.acquire();
        assert!(reused.is_empty());
        assert!(reused.capacity() >= 32);
    }

    #[test]
    fn full_pool_discards_releases() {
        let mut pool = ObjectPool::<Point>::with_capacity(1);
        pool.release(Point::canonical());
        pool.release(Point::new(3.0, 3.0));
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.stats().discarded, 1);
    }
}
