//! ptsearch
//! ========
//!
//! Adaptive-grid nearest-XY-point search over an unstructured cloud of
//! located 3D vectors. Points are added once and never relocated; a
//! uniform `Nx x Ny` grid of cells is refined on top of them by
//! successive axis-aware halving, each refinement step narrowing every
//! cell's candidate list while preserving the guarantee that the true
//! nearest point to any query inside a cell is still a member of that
//! cell's list.

mod cell;
mod error;
mod point_entry;
mod point_search;
mod point_store;
mod rect;
mod search_index;

pub use self::{
    error::{SearchError, SearchResult},
    point_entry::PointEntry,
    point_search::{IterWhole, PointSearch},
    point_store::PointStore,
    rect::Rect,
    search_index::{SearchStats, ASPECT_SPLIT_RATIO, DEFAULT_REFINE_LEVEL},
};
