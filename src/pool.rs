use crate::math::Vec2;

/// Bounded free-list of scratch vectors reused across force computations.
///
/// One vector is held per neighbor-pair evaluation and released before the
/// next, so the high-water mark stays tiny; the capacity bound only guards
/// against a caller leaking acquisitions. `&mut self` on both operations
/// keeps this single-threaded by construction.
pub struct ScratchPool {
    free: Vec<Vec2>,
    capacity: usize,
}

impl ScratchPool {
    pub const DEFAULT_CAPACITY: usize = 256;

    pub fn new(capacity: usize) -> Self {
        Self {
            free: Vec::with_capacity(capacity.min(Self::DEFAULT_CAPACITY)),
            capacity,
        }
    }

    /// Hands out a zeroed scratch vector, reusing a released one when possible.
    pub fn acquire(&mut self) -> Vec2 {
        match self.free.pop() {
            Some(mut v) => {
                v.fill(0.0);
                v
            }
            None => Vec2::zeros(),
        }
    }

    /// Returns a vector to the pool; discarded silently once at capacity.
    pub fn release(&mut self, v: Vec2) {
        if self.free.len() < self.capacity {
            self.free.push(v);
        }
    }

    pub fn available(&self) -> usize {
        self.free.len()
    }
}

impl Default for ScratchPool {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}
