use crate::cell::Cell;
use crate::error::{SearchError, SearchResult};
use crate::point_store::PointStore;
use crate::rect::Rect;

/// Default refinement level used when a caller triggers an implicit
/// rebuild (via [`crate::PointSearch::closest_xy`] on a stale index) rather
/// than calling `refine_*` explicitly. `4.pow(DEFAULT_REFINE_LEVEL)` is the
/// resulting cell count when every refinement step splits both axes.
pub const DEFAULT_REFINE_LEVEL: i64 = 5;

/// A cell dimension more than this factor larger than the other axis
/// triggers a single-axis split in [`SearchIndex::refine_once`] instead of
/// halving both axes.
pub const ASPECT_SPLIT_RATIO: f64 = 1.5;

/// Aggregate statistics over the current grid, as surfaced by
/// [`crate::PointSearch::stats`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchStats {
    pub cell_count: usize,
    pub avg_in_count: f64,
    pub avg_list_len: f64,
    pub wasted_space_bytes: usize,
}

/// The `Nx x Ny` uniform grid of [`Cell`]s tiling a [`PointStore`]'s
/// bounding region, built by successive halving refinement from a single
/// root cell. Crate-private: clients only ever see it through
/// [`crate::PointSearch`].
#[derive(Debug)]
pub(crate) struct SearchIndex {
    region: Rect,
    nx: usize,
    ny: usize,
    xdelta: f64,
    ydelta: f64,
    cells: Vec<Cell>,
    valid: bool,
    avg_in_count: f64,
    avg_list_len: f64,
}

impl Default for SearchIndex {
    fn default() -> Self {
        Self {
            region: Rect::ZERO,
            nx: 0,
            ny: 0,
            xdelta: 0.0,
            ydelta: 0.0,
            cells: Vec::new(),
            valid: true,
            avg_in_count: 0.0,
            avg_list_len: 0.0,
        }
    }
}

impl SearchIndex {
    #[inline]
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Mark the grid stale. Called by the owning facade whenever the
    /// underlying [`PointStore`] gains an entry or its region changes.
    #[inline]
    pub(crate) fn invalidate(&mut self) {
        self.valid = false;
    }

    #[inline]
    pub(crate) fn is_valid(&self) -> bool {
        self.valid
    }

    /// Discard the grid entirely, as if nothing had ever been built.
    pub(crate) fn clear(&mut self) {
        self.region = Rect::ZERO;
        self.nx = 0;
        self.ny = 0;
        self.xdelta = 0.0;
        self.ydelta = 0.0;
        self.cells.clear();
        self.valid = true;
        self.avg_in_count = 0.0;
        self.avg_list_len = 0.0;
    }

    #[inline]
    pub(crate) fn cell_count(&self) -> usize {
        self.nx * self.ny
    }

    #[inline]
    pub(crate) fn avg_in_count(&self) -> f64 {
        self.avg_in_count
    }

    #[inline]
    pub(crate) fn avg_list_len(&self) -> f64 {
        self.avg_list_len
    }

    pub(crate) fn wasted_space_bytes(&self) -> usize {
        self.cells.iter().map(Cell::wasted_space_bytes).sum()
    }

    /// (Re)build a single root cell spanning `store`'s current region,
    /// discarding any existing grid. Called whenever a stale grid must be
    /// rebuilt from scratch, since a stale grid may reflect a region or
    /// point set that no longer exists.
    fn init_root(&mut self, store: &PointStore) {
        let region = store.region();
        let root = Cell::build_root(region, store);
        self.avg_in_count = root.in_count() as f64;
        self.avg_list_len = root.list_len() as f64;
        self.region = region;
        self.nx = 1;
        self.ny = 1;
        self.xdelta = region.width();
        self.ydelta = region.height();
        self.cells = vec![root];
        self.valid = true;
    }

    /// If the grid is stale, pitch it and rebuild a fresh root cell from
    /// the current state of `store`. A no-op when already valid.
    fn ensure_root(&mut self, store: &PointStore) {
        if !self.valid {
            self.clear();
            self.init_root(store);
        } else if self.cells.is_empty() {
            self.init_root(store);
        }
    }

    /// Halve one or both axes of every cell, applying the refinement
    /// operator to each parent.
    fn refine_once(&mut self, store: &PointStore) {
        let split_x;
        let split_y;
        if self.xdelta > ASPECT_SPLIT_RATIO * self.ydelta {
            split_x = true;
            split_y = false;
        } else if self.ydelta > ASPECT_SPLIT_RATIO * self.xdelta {
            split_x = false;
            split_y = true;
        } else {
            split_x = true;
            split_y = true;
        }

        let new_nx = if split_x { self.nx * 2 } else { self.nx };
        let new_ny = if split_y { self.ny * 2 } else { self.ny };
        let new_dx = if split_x { self.xdelta / 2.0 } else { self.xdelta };
        let new_dy = if split_y { self.ydelta / 2.0 } else { self.ydelta };

        let mut new_cells = Vec::with_capacity(new_nx * new_ny);
        let mut in_total: u64 = 0;
        let mut list_total: u64 = 0;
        for i in 0..new_nx {
            let parent_i = if split_x { i / 2 } else { i };
            let x1 = self.region.xmin() + i as f64 * new_dx;
            let x2 = self.region.xmin() + (i + 1) as f64 * new_dx;
            for j in 0..new_ny {
                let parent_j = if split_y { j / 2 } else { j };
                let y1 = self.region.ymin() + j as f64 * new_dy;
                let y2 = self.region.ymin() + (j + 1) as f64 * new_dy;
                let rect = Rect::new(x1, y1, x2, y2).with_boundary_epsilon();
                let parent = &self.cells[parent_i * self.ny + parent_j];
                let child = Cell::build_child(rect, parent, store);
                in_total += child.in_count() as u64;
                list_total += child.list_len() as u64;
                new_cells.push(child);
            }
        }

        self.cells = new_cells;
        self.nx = new_nx;
        self.ny = new_ny;
        self.xdelta = new_dx;
        self.ydelta = new_dy;
        let count = (new_nx * new_ny) as f64;
        self.avg_in_count = in_total as f64 / count;
        self.avg_list_len = list_total as f64 / count;
    }

    /// Rebuild (if stale) and apply a single refinement step.
    pub(crate) fn step(&mut self, store: &PointStore) -> usize {
        self.ensure_root(store);
        self.refine_once(store);
        self.cell_count()
    }

    /// Rebuild (if stale) and refine `level` times.
    pub(crate) fn refine_times(&mut self, level: i64, store: &PointStore) -> SearchResult<usize> {
        if level < 0 {
            return Err(SearchError::InvalidArgument {
                reason: "refinement level must be non-negative",
            });
        }
        self.ensure_root(store);
        for _ in 0..level {
            self.refine_once(store);
        }
        Ok(self.cell_count())
    }

    /// Rebuild (if stale) and refine until any of the three thresholds is
    /// reached. At least one threshold must be positive.
    pub(crate) fn refine_until(
        &mut self,
        max_cells: usize,
        min_avg_in_count: f64,
        min_avg_list_len: f64,
        store: &PointStore,
    ) -> SearchResult<usize> {
        if max_cells == 0 && min_avg_in_count <= 0.0 && min_avg_list_len <= 0.0 {
            return Err(SearchError::InvalidArgument {
                reason: "at least one termination threshold must be positive",
            });
        }
        self.ensure_root(store);
        loop {
            if max_cells > 0 && self.cell_count() >= max_cells {
                break;
            }
            if min_avg_in_count > 0.0 && self.avg_in_count < min_avg_in_count {
                break;
            }
            if min_avg_list_len > 0.0 && self.avg_list_len < min_avg_list_len {
                break;
            }
            self.refine_once(store);
        }
        log::debug!(
            "refine_until converged at {} cells (avg_in_count={:.3}, avg_list_len={:.3})",
            self.cell_count(),
            self.avg_in_count,
            self.avg_list_len
        );
        Ok(self.cell_count())
    }

    /// Rebuild using the default refinement level, as performed implicitly
    /// by a query against a stale grid.
    pub(crate) fn refine_default(&mut self, store: &PointStore) -> SearchResult<usize> {
        self.refine_times(DEFAULT_REFINE_LEVEL, store)
    }

    /// Locate the cell containing `(x, y)`, returning its index into
    /// `self.cells`. Requires the grid to be valid and non-empty.
    fn cell_index_for(&self, x: f64, y: f64) -> SearchResult<usize> {
        if self.nx == 0 || self.ny == 0 {
            return Err(SearchError::EmptyStore);
        }
        let i = ((x - self.region.xmin()) / self.xdelta).floor();
        let j = ((y - self.region.ymin()) / self.ydelta).floor();
        if i < 0.0 || j < 0.0 || i >= self.nx as f64 || j >= self.ny as f64 {
            return Err(SearchError::OutOfRegion {
                x,
                y,
                xmin: self.region.xmin(),
                ymin: self.region.ymin(),
                xmax: self.region.xmax(),
                ymax: self.region.ymax(),
            });
        }
        Ok(i as usize * self.ny + j as usize)
    }

    /// Scan the cell containing `(x, y)` for the nearest entry.
    pub(crate) fn closest(&self, x: f64, y: f64, store: &PointStore) -> SearchResult<u32> {
        let cell_idx = self.cell_index_for(x, y)?;
        self.cells[cell_idx]
            .closest(x, y, store)
            .ok_or(SearchError::EmptyStore)
    }

    pub(crate) fn stats(&self) -> SearchStats {
        SearchStats {
            cell_count: self.cell_count(),
            avg_in_count: self.avg_in_count,
            avg_list_len: self.avg_list_len,
            wasted_space_bytes: self.wasted_space_bytes(),
        }
    }
}
