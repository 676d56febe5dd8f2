use crate::error::SearchResult;
use crate::point_entry::PointEntry;
use crate::rect::Rect;
use crate::point_store::PointStore;
use crate::search_index::{SearchIndex, SearchStats};
use bevy_math::DVec3;

/// Adaptive-grid nearest-XY-point search over an unstructured cloud of
/// located vectors.
///
/// A [`PointSearch`] owns both the point cloud (a [`PointStore`]) and the
/// grid built over it (a [`SearchIndex`]), and keeps the two in sync:
/// adding a point or widening the region marks the grid stale, and the
/// next mutating query rebuilds it at [`crate::search_index::DEFAULT_REFINE_LEVEL`]
/// if the caller hasn't refined explicitly since.
#[derive(Debug, Default)]
pub struct PointSearch {
    store: PointStore,
    index: SearchIndex,
}

impl PointSearch {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            store: PointStore::new(),
            index: SearchIndex::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.store.size()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn region(&self) -> Rect {
        self.store.region()
    }

    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> SearchResult<&PointEntry> {
        self.store.get(index)
    }

    #[inline]
    #[must_use]
    pub fn entries(&self) -> &[PointEntry] {
        self.store.entries()
    }

    /// Append a point to the cloud. Marks the grid stale: the next call to
    /// [`Self::closest_xy`] rebuilds it implicitly if no explicit
    /// `refine_*` call happens first.
    pub fn add_point(&mut self, location: DVec3, value: DVec3) -> SearchResult<usize> {
        let index = self.store.add_point(location, value)?;
        self.index.invalidate();
        Ok(index)
    }

    /// Replace the value payload at `index`. Locations are immutable once
    /// added, so this never disturbs the grid.
    #[inline]
    pub fn set_value(&mut self, index: usize, new_value: DVec3) -> SearchResult<()> {
        self.store.set_value(index, new_value)
    }

    pub fn set_region(&mut self, xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> SearchResult<()> {
        self.store.set_region(xmin, ymin, xmax, ymax)?;
        self.index.invalidate();
        Ok(())
    }

    pub fn expand_region(&mut self, xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> SearchResult<()> {
        self.store.expand_region(xmin, ymin, xmax, ymax)?;
        self.index.invalidate();
        Ok(())
    }

    pub fn inflate_region(&mut self, xscale: f64, yscale: f64) {
        self.store.inflate_region(xscale, yscale);
        self.index.invalidate();
    }

    pub fn add_margin(&mut self, xmargin: f64, ymargin: f64) {
        self.store.add_margin(xmargin, ymargin);
        self.index.invalidate();
    }

    /// Discard every point and the grid built over them.
    pub fn clear(&mut self) {
        self.store.clear();
        self.index.clear();
    }

    /// Reset every entry's `select_count` to zero without discarding the
    /// entries themselves or the grid.
    pub fn clear_select_counts(&self) {
        self.store.clear_select_counts();
    }

    /// Apply a single refinement step: halve the axis (or both axes) whose
    /// cell extent most exceeds the other, rebuilding from a single root
    /// cell first if the grid is stale. Returns the resulting cell count.
    pub fn refine_once(&mut self) -> SearchResult<usize> {
        Ok(self.index.step(&self.store))
    }

    /// Apply `level` refinement steps. Rebuilds from a single root cell
    /// first if the grid is stale.
    pub fn refine_times(&mut self, level: i64) -> SearchResult<usize> {
        self.index.refine_times(level, &self.store)
    }

    /// Apply refinement steps until the cell count reaches `max_cells`
    /// (when positive), or the average in-count drops below
    /// `min_avg_in_count` (when positive), or the average list length
    /// drops below `min_avg_list_len` (when positive). At least one
    /// threshold must be positive.
    pub fn refine_until(
        &mut self,
        max_cells: usize,
        min_avg_in_count: f64,
        min_avg_list_len: f64,
    ) -> SearchResult<usize> {
        self.index
            .refine_until(max_cells, min_avg_in_count, min_avg_list_len, &self.store)
    }

    /// Find the entry closest (by 2D XY distance) to `(x, y)`, rebuilding
    /// the grid at the default refinement level first if it is stale.
    /// Bumps and returns the winning entry's `select_count`.
    ///
    /// Returns [`crate::SearchError::OutOfRegion`] if `(x, y)` lies outside
    /// the current search region, or [`crate::SearchError::EmptyStore`] if
    /// no point has ever been added.
    pub fn closest_xy(&mut self, x: f64, y: f64) -> SearchResult<(u32, u32)> {
        if !self.index.is_valid() {
            log::debug!("closest_xy: rebuilding stale index at the default refinement level");
            self.index.refine_default(&self.store)?;
        }
        let idx = self.index.closest(x, y, &self.store)?;
        let entry = self.store.get(idx as usize)?;
        let count = entry.bump_select_count();
        Ok((idx, count))
    }

    /// Find the entry closest to `(x, y)` without mutating anything: does
    /// not bump `select_count` and does not rebuild a stale grid. Safe to
    /// call concurrently with other readers.
    ///
    /// If points have been added since the grid was last refined, this may
    /// miss them; callers needing up-to-date results across concurrent
    /// mutation should refine explicitly before fanning out readers.
    pub fn closest_xy_readonly(&self, x: f64, y: f64) -> SearchResult<u32> {
        self.index.closest(x, y, &self.store)
    }

    /// Snapshot statistics over the current grid.
    #[must_use]
    pub fn stats(&self) -> SearchStats {
        let mut stats = self.index.stats();
        stats.wasted_space_bytes += self.store.wasted_space_bytes();
        stats
    }

    /// Iterate every entry in insertion order, bumping each entry's
    /// `select_count` as it is yielded.
    #[inline]
    pub fn iter_whole(&self) -> IterWhole<'_> {
        IterWhole { search: self, next: 0 }
    }

    /// The first opaque iteration key, or `None` if the store is empty.
    /// Keys are usable with [`Self::set_value`] and [`Self::get`].
    #[inline]
    #[must_use]
    pub fn index_first(&self) -> Option<usize> {
        if self.store.is_empty() {
            None
        } else {
            Some(0)
        }
    }

    /// The key following `index`, or `None` if `index` was the last one.
    #[inline]
    #[must_use]
    pub fn index_next(&self, index: usize) -> Option<usize> {
        let next = index + 1;
        if next < self.store.size() {
            Some(next)
        } else {
            None
        }
    }
}

/// Iterator returned by [`PointSearch::iter_whole`]. Each yielded entry has
/// already had its `select_count` incremented.
pub struct IterWhole<'a> {
    search: &'a PointSearch,
    next: usize,
}

impl<'a> Iterator for IterWhole<'a> {
    type Item = &'a PointEntry;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.search.store.get(self.next).ok()?;
        self.next += 1;
        entry.bump_select_count();
        Some(entry)
    }
}
