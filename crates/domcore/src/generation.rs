//! Generation counters
//!
//! Two uses in the tree:
//! - every arena slot carries a generation, bumped when the slot is freed, so
//!   a stale [`NodeId`](crate::NodeId) never resolves to a recycled node
//! - every document carries a mutation generation, bumped on any structural
//!   or attribute change, so live node lists can skip recomputation when
//!   nothing moved since their last access

/// Generation counter
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct Generation(u32);

impl Generation {
    /// Initial generation (never mutated)
    pub const INITIAL: Self = Generation(0);

    /// Get the raw value
    #[inline]
    pub const fn value(self) -> u32 {
        self.0
    }

    /// Get the next generation
    #[inline]
    pub const fn next(self) -> Self {
        Generation(self.0.wrapping_add(1))
    }

    /// Advance in place, returning the new value
    #[inline]
    pub fn bump(&mut self) -> Self {
        *self = self.next();
        *self
    }

    /// Check if this generation is newer than another
    #[inline]
    pub fn is_newer_than(self, other: Self) -> bool {
        // Handle wraparound
        let diff = self.0.wrapping_sub(other.0);
        diff > 0 && diff < u32::MAX / 2
    }
}

/// Value computed at a given generation
#[derive(Debug, Clone)]
pub struct Cached<T> {
    value: T,
    generation: Generation,
}

impl<T> Cached<T> {
    /// Create a new cached value
    pub fn new(value: T, generation: Generation) -> Self {
        Self { value, generation }
    }

    /// Get the value if still valid
    pub fn get_if_valid(&self, current: Generation) -> Option<&T> {
        (self.generation == current).then_some(&self.value)
    }
}
