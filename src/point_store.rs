use crate::error::{SearchError, SearchResult};
use crate::point_entry::PointEntry;
use crate::rect::Rect;
use bevy_math::DVec3;

/// Owns the append-only collection of [`PointEntry`] values and tracks the
/// current bounding rectangle of their XY locations.
///
/// Indices are stable for the lifetime of the store: entries are never
/// removed individually, only the whole collection is discarded, by
/// [`PointStore::clear`].
#[derive(Debug, Default)]
pub struct PointStore {
    entries: Vec<PointEntry>,
    region: Rect,
    region_set: bool,
}

impl PointStore {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            region: Rect::ZERO,
            region_set: false,
        }
    }

    #[inline]
    #[must_use]
    pub fn size(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn region(&self) -> Rect {
        self.region
    }

    /// Append one point, expanding the bounding rectangle to contain
    /// `location.x, location.y`. Runs in amortised O(1).
    pub fn add_point(&mut self, location: DVec3, value: DVec3) -> SearchResult<usize> {
        if self.region_set {
            self.region.expand_to_include_xy(location.x, location.y);
        } else {
            self.region = Rect::new(location.x, location.y, location.x, location.y);
            self.region_set = true;
        }
        let index = self.entries.len();
        self.entries.push(PointEntry::new(location, value));
        Ok(index)
    }

    #[inline]
    #[must_use]
    pub fn entries(&self) -> &[PointEntry] {
        &self.entries
    }

    #[inline]
    pub fn get(&self, index: usize) -> SearchResult<&PointEntry> {
        self.entries.get(index).ok_or(SearchError::InvalidIndex {
            index,
            len: self.entries.len(),
        })
    }

    /// Replace the value payload at `index`. Does not affect `location`
    /// and so never invalidates any derived search index.
    pub fn set_value(&mut self, index: usize, new_value: DVec3) -> SearchResult<()> {
        let len = self.entries.len();
        let entry = self
            .entries
            .get_mut(index)
            .ok_or(SearchError::InvalidIndex { index, len })?;
        entry.set_value(new_value);
        Ok(())
    }

    /// Set the bounding rectangle explicitly, overriding the accumulated one.
    pub fn set_region(&mut self, xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> SearchResult<()> {
        if xmin > xmax || ymin > ymax {
            return Err(SearchError::InvalidRegion {
                xmin,
                ymin,
                xmax,
                ymax,
            });
        }
        self.region = Rect::new(xmin, ymin, xmax, ymax);
        self.region_set = true;
        Ok(())
    }

    /// Union the given rectangle into the current one. Widens only, never
    /// shrinks.
    pub fn expand_region(&mut self, xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> SearchResult<()> {
        if xmin > xmax || ymin > ymax {
            return Err(SearchError::InvalidRegion {
                xmin,
                ymin,
                xmax,
                ymax,
            });
        }
        if self.region_set {
            self.region.expand_to_include_rect(&Rect::new(xmin, ymin, xmax, ymax));
        } else {
            self.region = Rect::new(xmin, ymin, xmax, ymax);
            self.region_set = true;
        }
        Ok(())
    }

    /// Scale the bounding rectangle about its centre by the given factors.
    #[inline]
    pub fn inflate_region(&mut self, xscale: f64, yscale: f64) {
        self.region = self.region.inflated(xscale, yscale);
    }

    /// Add absolute padding to the bounding rectangle on all sides.
    #[inline]
    pub fn add_margin(&mut self, xmargin: f64, ymargin: f64) {
        self.region = self.region.with_margin(xmargin, ymargin);
    }

    /// Discard all entries and reset the region to `(0,0,0,0)`.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.region = Rect::ZERO;
        self.region_set = false;
    }

    pub(crate) fn clear_select_counts(&self) {
        for e in &self.entries {
            e.clear_select_count();
        }
    }

    /// Bytes of backing `Vec` capacity not used by live entries.
    pub(crate) fn wasted_space_bytes(&self) -> usize {
        (self.entries.capacity() - self.entries.len()) * std::mem::size_of::<PointEntry>()
    }
}
