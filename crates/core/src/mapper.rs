//! Periodic folding and stencil placement shared by spreading and gathering.
//!
//! A point and its window are placed by one deterministic rule. Spreading and
//! gathering both go through [`GridMapper::place`], which is what makes a source
//! and a target at the same coordinate land on exactly the same stencil.

use crate::grid::Grid2D;

/// Distance to the nearest integer below which a grid fraction counts as lying
/// on a grid line.
pub const SNAP_TOLERANCE: f64 = 1e-13;

/// Threshold for treating a folded offset as zero, or as a full spacing.
pub const OFFSET_TOLERANCE: f64 = 1e-12;

/// Placement of a point along one axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisPlacement {
    /// First stencil index, before periodic wrapping of the window.
    pub base: isize,
    /// Folded position `p − h·⌊p/h⌋`, in `[0, h)`.
    pub offset: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub x: AxisPlacement,
    pub y: AxisPlacement,
}

impl Placement {
    pub fn base(&self) -> [isize; 2] {
        [self.x.base, self.y.base]
    }

    pub fn offset(&self) -> [f64; 2] {
        [self.x.offset, self.y.offset]
    }
}

/// Number of spacings from the origin beyond which `p − h·⌊p/h⌋` no longer
/// resolves the offset and [`fold`] takes the exact remainder instead.
const FOLD_EXACT_CELLS: f64 = (1u64 << 40) as f64;

/// `p` folded into `[0, h)` along a grid of spacing `h`.
#[inline]
pub fn fold(p: f64, spacing: f64) -> f64 {
    let cells = p / spacing;
    if cells.abs() < FOLD_EXACT_CELLS {
        p - spacing * cells.floor()
    } else {
        p.rem_euclid(spacing)
    }
}

/// Place `p` on an axis of `nodes` nodes over length `length`, for a window of
/// half-width `half_window` nodes.
///
/// The anchor node is reduced modulo `nodes` before it becomes an index, so the
/// returned base lies in `−half_window..nodes − half_window` for every finite `p`.
pub fn place_axis(p: f64, length: f64, nodes: usize, half_window: isize) -> AxisPlacement {
    let spacing = length / nodes as f64;
    let mut offset = fold(p, spacing);
    let t = (p + 0.5 * length) / spacing;
    let nearest = t.round();
    let anchor = if (t - nearest).abs() < SNAP_TOLERANCE {
        nearest
    } else if offset.abs() > OFFSET_TOLERANCE {
        (t - 1.0).ceil()
    } else {
        t.floor()
    };
    if (offset - spacing).abs() < OFFSET_TOLERANCE {
        offset = 0.0;
    }
    AxisPlacement {
        base: anchor.rem_euclid(nodes as f64) as isize - half_window,
        offset,
    }
}

#[derive(Debug, Clone, Copy)]
pub struct GridMapper {
    grid: Grid2D,
    window: usize,
}

impl GridMapper {
    pub fn new(grid: Grid2D, window: usize) -> Self {
        Self { grid, window }
    }

    pub fn grid(&self) -> Grid2D {
        self.grid
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn place(&self, point: [f64; 2]) -> Placement {
        let half = (self.window / 2) as isize;
        Placement {
            x: place_axis(point[0], self.grid.lx, self.grid.nx, half),
            y: place_axis(point[1], self.grid.ly, self.grid.ny, half),
        }
    }

    /// True when a window starting at `base` along x needs no wraparound.
    #[inline]
    pub fn interior_x(&self, base: isize) -> bool {
        interior(base, self.grid.nx, self.window)
    }

    /// True when a window starting at `base` along y needs no wraparound.
    #[inline]
    pub fn interior_y(&self, base: isize) -> bool {
        interior(base, self.grid.ny, self.window)
    }
}

#[inline]
fn interior(base: isize, n: usize, window: usize) -> bool {
    base >= 0 && base < n as isize - window as isize - 1
}
