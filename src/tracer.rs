//! Voxel ray tracer used for collision response.
//!
//! Walks the grid cell by cell along the ray (Amanatides–Woo traversal) and
//! stops at the first solid block, reporting where the ray entered it and
//! the normal of the face it crossed. The starting cell is never reported:
//! entities embedded in a block are pushed out by the integrator instead.

use glam::DVec3;

use crate::block::BlockPos;
use crate::numeric::floor_to_i32;
use crate::spatial::{SpatialQuery, TraceHit};

/// Per-axis traversal state.
#[derive(Debug, Clone, Copy)]
struct AxisWalk {
    step: i32,
    /// Ray distance at which the next boundary on this axis is crossed.
    next: f64,
    /// Ray distance between two boundaries on this axis.
    delta: f64,
}

impl AxisWalk {
    fn new(origin: f64, direction: f64) -> Self {
        let cell = f64::from(floor_to_i32(origin));
        if direction > 0.0 {
            Self {
                step: 1,
                next: (cell + 1.0 - origin) / direction,
                delta: 1.0 / direction,
            }
        } else if direction < 0.0 {
            Self {
                step: -1,
                next: (origin - cell) / -direction,
                delta: -1.0 / direction,
            }
        } else {
            Self {
                step: 0,
                next: f64::INFINITY,
                delta: f64::INFINITY,
            }
        }
    }

    const fn advance(&mut self) {
        self.next += self.delta;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    X,
    Y,
    Z,
}

/// Traces from `start` along `direction` for at most `max_distance` blocks.
///
/// Returns `None` when nothing solid is crossed, when the direction is zero
/// or not finite, or when the ray reaches an unloaded chunk first.
///
/// # Examples
/// ```
/// use glam::DVec3;
/// use voxsim::block::{BlockPos, BlockType, ChunkCoord};
/// use voxsim::grid::BlockGrid;
/// use voxsim::tracer::trace;
///
/// let mut grid = BlockGrid::new();
/// grid.load_chunk(ChunkCoord::new(0, 0));
/// grid.set_block(BlockPos::new(2, 4, 2), BlockType::Stone);
/// let hit = trace(&grid, DVec3::new(2.5, 5.5, 2.5), DVec3::NEG_Y, 2.0).unwrap();
/// assert_eq!(hit.normal, DVec3::Y);
/// assert!((hit.position.y - 5.0).abs() < 1e-9);
/// ```
pub fn trace<Q: SpatialQuery + ?Sized>(
    query: &Q,
    start: DVec3,
    direction: DVec3,
    max_distance: f64,
) -> Option<TraceHit> {
    if !start.is_finite() || max_distance.is_nan() || max_distance <= 0.0 {
        return None;
    }
    let dir = direction.try_normalize()?;

    let mut cell = BlockPos::containing(start);
    let mut walk_x = AxisWalk::new(start.x, dir.x);
    let mut walk_y = AxisWalk::new(start.y, dir.y);
    let mut walk_z = AxisWalk::new(start.z, dir.z);

    loop {
        let axis = if walk_x.next <= walk_y.next && walk_x.next <= walk_z.next {
            Axis::X
        } else if walk_y.next <= walk_z.next {
            Axis::Y
        } else {
            Axis::Z
        };
        let (distance, normal) = match axis {
            Axis::X => {
                let distance = walk_x.next;
                cell = cell.offset(walk_x.step, 0, 0);
                walk_x.advance();
                (distance, DVec3::new(-f64::from(walk_x.step), 0.0, 0.0))
            }
            Axis::Y => {
                let distance = walk_y.next;
                cell = cell.offset(0, walk_y.step, 0);
                walk_y.advance();
                (distance, DVec3::new(0.0, -f64::from(walk_y.step), 0.0))
            }
            Axis::Z => {
                let distance = walk_z.next;
                cell = cell.offset(0, 0, walk_z.step);
                walk_z.advance();
                (distance, DVec3::new(0.0, 0.0, -f64::from(walk_z.step)))
            }
        };

        if distance > max_distance {
            return None;
        }
        match query.block_at(cell) {
            None => return None,
            Some(block) if block.is_solid() => {
                return Some(TraceHit {
                    position: start + dir * distance,
                    normal,
                    block: cell,
                });
            }
            Some(_) => {}
        }
    }
}
