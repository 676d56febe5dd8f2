use thiserror::Error;

/// Error type for the fallible operations of [`PointStore`](crate::PointStore)
/// and [`PointSearch`](crate::PointSearch).
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum SearchError {
    /// A `set_region` call supplied inverted bounds (`xmin > xmax` or `ymin > ymax`).
    #[error("invalid region: ({xmin}, {ymin}) is not <= ({xmax}, {ymax})")]
    InvalidRegion {
        xmin: f64,
        ymin: f64,
        xmax: f64,
        ymax: f64,
    },

    /// `get` / `set_value` was called with an index outside `0..len`.
    #[error("index {index} out of range for point store of length {len}")]
    InvalidIndex { index: usize, len: usize },

    /// `refine_until` was called with all three thresholds disabled, or a
    /// negative refinement level was supplied to `refine_times`.
    #[error("invalid argument: {reason}")]
    InvalidArgument { reason: &'static str },

    /// `closest_xy` was called with a point outside the current bounding region.
    #[error("query point ({x}, {y}) is outside the search region ({xmin}, {ymin})-({xmax}, {ymax})")]
    OutOfRegion {
        x: f64,
        y: f64,
        xmin: f64,
        ymin: f64,
        xmax: f64,
        ymax: f64,
    },

    /// `closest_xy` was called before any point was added.
    #[error("closest_xy called on an empty point store")]
    EmptyStore,

    /// Reserved for allocation failure. No code path in this crate
    /// constructs this variant: the safe `Vec` growth paths used by
    /// `PointStore` and `CellList` abort the process on allocation
    /// failure rather than returning an error. The variant is kept so
    /// that callers matching exhaustively on `SearchError` compile
    /// against the documented error surface.
    #[error("out of memory")]
    OutOfMemory,
}

pub type SearchResult<T> = Result<T, SearchError>;
