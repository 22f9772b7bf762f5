//! Work-group shape selection.
//!
//! Every pipeline runs `WORK_GROUP_SIZE` invocations per group. For 2D and 3D
//! grids the split of that budget across axes is chosen to minimise the
//! number of groups needed to cover the grid. Only power-of-two splits are
//! searched.

use crate::error::{Result, VulkanError};

/// Invocations per work-group, for every shader.
pub const WORK_GROUP_SIZE: u32 = 64;
/// Exclusive upper bound on the depth split for 3D grids.
pub const MAX_GROUP_DEPTH: u32 = 32;

/// Thread-group dimensions baked into a pipeline variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WorkGroup {
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

impl Default for WorkGroup {
    fn default() -> Self {
        Self {
            x: WORK_GROUP_SIZE,
            y: 1,
            z: 1,
        }
    }
}

impl WorkGroup {
    pub const fn new(x: u32, y: u32, z: u32) -> Self {
        Self { x, y, z }
    }

    pub const fn volume(&self) -> u32 {
        self.x.saturating_mul(self.y).saturating_mul(self.z)
    }

    pub const fn as_array(&self) -> [u32; 3] {
        [self.x, self.y, self.z]
    }

    /// Number of groups along each axis needed to cover `grid`.
    pub fn dispatch_size(&self, grid: GridShape) -> [u32; 3] {
        [
            dispatch_axis(grid.width, self.x),
            dispatch_axis(grid.height, self.y),
            dispatch_axis(grid.depth, self.z),
        ]
    }
}

/// Iteration space of one dispatch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GridShape {
    pub width: u32,
    pub height: u32,
    pub depth: u32,
}

impl GridShape {
    pub const fn new(width: u32, height: u32, depth: u32) -> Self {
        Self {
            width,
            height,
            depth,
        }
    }

    pub const fn new_1d(width: u32) -> Self {
        Self::new(width, 1, 1)
    }

    pub const fn new_2d(width: u32, height: u32) -> Self {
        Self::new(width, height, 1)
    }

    pub const fn new_3d(width: u32, height: u32, depth: u32) -> Self {
        Self::new(width, height, depth)
    }
}

fn dispatch_axis(elements: u32, group: u32) -> u32 {
    if elements == 0 {
        0
    } else {
        ceil_div(elements, group) as u32
    }
}

fn ceil_div(value: u32, divisor: u32) -> u64 {
    (value as u64 + divisor as u64 - 1) / divisor as u64
}

/// Best `(width, height)` split of `budget` for a `grid_width x grid_height`
/// grid. Returns `(group_count, width, height)`.
///
/// Candidates run from `(budget, 1)` to `(1, budget)` by halving the width and
/// doubling the height. Ties keep the candidate closer to square.
pub fn split_2d(grid_width: u32, grid_height: u32, budget: u32) -> (u64, u32, u32) {
    let grid_width = grid_width.max(1);
    let grid_height = grid_height.max(1);
    let mut best: Option<(u64, u32, u32)> = None;
    let (mut w, mut h) = (budget, 1u32);
    while h <= budget && w > 0 {
        let count = ceil_div(grid_width, w).saturating_mul(ceil_div(grid_height, h));
        let better = match best {
            None => true,
            Some((best_count, bw, bh)) => {
                count < best_count || (count == best_count && w.abs_diff(h) < bw.abs_diff(bh))
            }
        };
        if better {
            best = Some((count, w, h));
        }
        h <<= 1;
        w >>= 1;
    }
    best.unwrap_or((
        ceil_div(grid_width, budget.max(1)).saturating_mul(grid_height as u64),
        budget,
        1,
    ))
}

/// Best `(width, height, depth)` split of `WORK_GROUP_SIZE` for a 3D grid.
/// Returns `(group_count, work_group)`. Ties on the group count keep the
/// smaller depth.
pub fn split_3d(grid: GridShape) -> (u64, WorkGroup) {
    let grid_depth = grid.depth.max(1);
    let mut best: Option<(u64, WorkGroup)> = None;
    let mut d = 1u32;
    while d <= grid_depth && d < MAX_GROUP_DEPTH {
        let (plane, w, h) = split_2d(grid.width, grid.height, WORK_GROUP_SIZE / d);
        let count = ceil_div(grid_depth, d).saturating_mul(plane);
        if best.map_or(true, |(best_count, _)| count < best_count) {
            best = Some((count, WorkGroup::new(w, h, d)));
        }
        d <<= 1;
    }
    // grid_depth >= 1, so d = 1 always runs.
    best.unwrap_or_else(|| {
        let (count, w, h) = split_2d(grid.width, grid.height, WORK_GROUP_SIZE);
        (count.saturating_mul(grid_depth as u64), WorkGroup::new(w, h, 1))
    })
}

/// Work-group shape for a `dimensions`-D dispatch over `grid`.
pub fn optimal_work_group(dimensions: u32, grid: GridShape) -> Result<WorkGroup> {
    match dimensions {
        1 => Ok(WorkGroup::default()),
        2 => {
            let (_, w, h) = split_2d(grid.width, grid.height, WORK_GROUP_SIZE);
            Ok(WorkGroup::new(w, h, 1))
        }
        3 => Ok(split_3d(grid).1),
        other => Err(VulkanError::InvalidArgument(format!(
            "dispatch dimensions must be 1, 2 or 3 (got {other})"
        ))),
    }
}
