use bevy_math::DVec3;
use std::sync::atomic::{AtomicU32, Ordering};

/// A located vector: a 3D position bundled with a 3-component value
/// payload. Only the `x`/`y` components of `location` participate in
/// nearest-neighbour search; `z` is opaque payload carried through to the
/// caller.
#[derive(Debug)]
pub struct PointEntry {
    location: DVec3,
    value: DVec3,
    select_count: AtomicU32,
}

impl PointEntry {
    #[inline]
    #[must_use]
    pub(crate) fn new(location: DVec3, value: DVec3) -> Self {
        Self {
            location,
            value,
            select_count: AtomicU32::new(0),
        }
    }

    #[inline]
    #[must_use]
    pub fn location(&self) -> DVec3 {
        self.location
    }

    #[inline]
    #[must_use]
    pub fn value(&self) -> DVec3 {
        self.value
    }

    #[inline]
    pub(crate) fn set_value(&mut self, value: DVec3) {
        self.value = value;
    }

    #[inline]
    #[must_use]
    pub fn select_count(&self) -> u32 {
        self.select_count.load(Ordering::Relaxed)
    }

    #[inline]
    pub(crate) fn clear_select_count(&self) {
        self.select_count.store(0, Ordering::Relaxed);
    }

    /// Increment `select_count` and return its new value.
    #[inline]
    pub(crate) fn bump_select_count(&self) -> u32 {
        self.select_count.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Squared 2D XY Euclidean distance from this entry's location to `(x, y)`.
    #[inline]
    #[must_use]
    pub fn dist_sq_2d(&self, x: f64, y: f64) -> f64 {
        let dx = self.location.x - x;
        let dy = self.location.y - y;
        dx * dx + dy * dy
    }
}

impl Clone for PointEntry {
    #[inline]
    fn clone(&self) -> Self {
        Self {
            location: self.location,
            value: self.value,
            select_count: AtomicU32::new(self.select_count()),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_dist_sq_2d_ignores_z() {
        let e = PointEntry::new(DVec3::new(1.0, 2.0, 100.0), DVec3::ZERO);
        assert_eq!(e.dist_sq_2d(1.0, 2.0), 0.0);
        assert_eq!(e.dist_sq_2d(4.0, 6.0), 9.0 + 16.0);
    }

    #[test]
    fn test_select_count_roundtrip() {
        let e = PointEntry::new(DVec3::ZERO, DVec3::ZERO);
        assert_eq!(e.select_count(), 0);
        assert_eq!(e.bump_select_count(), 1);
        assert_eq!(e.bump_select_count(), 2);
        e.clear_select_count();
        assert_eq!(e.select_count(), 0);
    }
}
