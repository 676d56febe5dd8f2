use crate::point_store::PointStore;
use crate::rect::Rect;

/// The ordered sequence of [`PointStore`] indices owned by a [`Cell`].
/// A superset of the entries whose locations lie inside the cell: it must
/// additionally include every entry that could be the XY-nearest entry to
/// some point inside the cell's rectangle. See [`refine_list`] for how that
/// invariant is maintained across refinement.
pub(crate) type CellList = Vec<u32>;

/// One rectangular subdivision of the search region, holding the subset of
/// cloud entries ([`CellList`]) that could be nearest to some query point
/// inside its rectangle.
#[derive(Debug, Clone)]
pub(crate) struct Cell {
    rect: Rect,
    list: CellList,
    in_count: u32,
}

impl Cell {
    /// Build the root cell: its list enumerates every entry in `store`,
    /// unfiltered.
    pub(crate) fn build_root(region: Rect, store: &PointStore) -> Self {
        let list: CellList = (0..store.size() as u32).collect();
        let in_count = count_in_rect(&region, &list, store);
        Self {
            rect: region,
            list,
            in_count,
        }
    }

    /// Build a child cell covering `rect`, whose list is the refined subset
    /// of `parent`'s list that satisfies the nearest-neighbour correctness
    /// invariant for every point inside `rect` (see [`refine_list`]).
    pub(crate) fn build_child(rect: Rect, parent: &Cell, store: &PointStore) -> Self {
        let list = refine_list(&rect, &parent.list, store);
        let in_count = count_in_rect(&rect, &list, store);
        Self {
            rect,
            list,
            in_count,
        }
    }

    #[inline]
    #[must_use]
    pub(crate) fn rect(&self) -> Rect {
        self.rect
    }

    #[inline]
    #[must_use]
    pub(crate) fn list(&self) -> &[u32] {
        &self.list
    }

    #[inline]
    #[must_use]
    pub(crate) fn in_count(&self) -> u32 {
        self.in_count
    }

    #[inline]
    #[must_use]
    pub(crate) fn list_len(&self) -> usize {
        self.list.len()
    }

    /// Bytes of `Vec` capacity not used by the live list.
    pub(crate) fn wasted_space_bytes(&self) -> usize {
        (self.list.capacity() - self.list.len()) * std::mem::size_of::<u32>()
    }

    /// Scan this cell's list for the entry with smallest 2D squared
    /// distance to `(x, y)`. Returns `None` only if the list is empty,
    /// which never happens for a cell produced by [`Cell::build_root`] or
    /// [`Cell::build_child`] over a non-empty store.
    pub(crate) fn closest(&self, x: f64, y: f64, store: &PointStore) -> Option<u32> {
        let mut best: Option<(u32, f64)> = None;
        for &idx in &self.list {
            let e = store.get(idx as usize).expect("cell list index out of range");
            let d2 = e.dist_sq_2d(x, y);
            match best {
                Some((_, best_d2)) if d2 >= best_d2 => {}
                _ => best = Some((idx, d2)),
            }
        }
        best.map(|(idx, _)| idx)
    }
}

fn count_in_rect(rect: &Rect, list: &[u32], store: &PointStore) -> u32 {
    list.iter()
        .filter(|&&idx| {
            let e = store.get(idx as usize).expect("cell list index out of range");
            let loc = e.location();
            rect.contains_xy(loc.x, loc.y)
        })
        .count() as u32
}

/// The three-phase correctness filter used to build a child cell's list
/// from its parent's list:
///
/// 1. **Anchor scan** — find the parent-list entry `q` closest to `rect`'s
///    centre `C`.
/// 2. **Slack bound** — derive an upper bound (`slack`) on the distance
///    from any point in `rect` to `q`, using `q`'s offset from `C` and
///    `rect`'s extents.
/// 3. **Two-stage pruning** — keep a parent entry `e` iff it passes both a
///    cheap Sup-norm gate and a tighter L2 bound reusing the distances
///    computed in the anchor scan.
///
/// The slack bound is intentionally loose (it uses the anchor's distance
/// to the rect's farthest corner, not to the query point) so that it can
/// be computed once per rect instead of once per query point.
fn refine_list(rect: &Rect, parent_list: &[u32], store: &PointStore) -> CellList {
    if parent_list.is_empty() {
        return CellList::new();
    }

    let center = rect.center();
    let mut dist_sq = Vec::with_capacity(parent_list.len());
    let mut anchor_pos = 0usize;
    let mut anchor_dist_sq = f64::INFINITY;
    for (pos, &idx) in parent_list.iter().enumerate() {
        let e = store.get(idx as usize).expect("cell list index out of range");
        let d2 = e.dist_sq_2d(center.x, center.y);
        dist_sq.push(d2);
        if d2 < anchor_dist_sq {
            anchor_dist_sq = d2;
            anchor_pos = pos;
        }
    }

    let anchor = store
        .get(parent_list[anchor_pos] as usize)
        .expect("cell list index out of range");
    let anchor_loc = anchor.location();

    let dx = rect.width();
    let dy = rect.height();
    let box_rad = (dx * dx + dy * dy).sqrt() / 2.0;

    let xtemp = (anchor_loc.x - center.x).abs() + dx;
    let ytemp = (anchor_loc.y - center.y).abs() + dy;
    let slack = (xtemp * xtemp + ytemp * ytemp).sqrt();

    let sup_xmin = rect.xmin() - slack;
    let sup_xmax = rect.xmax() + slack;
    let sup_ymin = rect.ymin() - slack;
    let sup_ymax = rect.ymax() + slack;

    let l2_rad = slack + box_rad;
    let l2_rad_sq = l2_rad * l2_rad;

    let mut out = CellList::new();
    for (pos, &idx) in parent_list.iter().enumerate() {
        let e = store.get(idx as usize).expect("cell list index out of range");
        let loc = e.location();
        if loc.x < sup_xmin || loc.x > sup_xmax {
            continue;
        }
        if loc.y < sup_ymin || loc.y > sup_ymax {
            continue;
        }
        if dist_sq[pos] > l2_rad_sq {
            continue;
        }
        out.push(idx);
    }
    out
}
