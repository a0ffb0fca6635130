use crate::errors::{NavError, NavResult};
use bevy::prelude::*;

/// A single cell coordinate in the navigation grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellCoord {
    pub x: u32,
    pub z: u32,
}

impl CellCoord {
    pub fn new(x: u32, z: u32) -> Self {
        Self { x, z }
    }
}

/// The 8 neighbor offsets: axis-aligned first, then diagonals
const NEIGHBOR_OFFSETS: [(i32, i32); 8] = [
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];

/// Walkability grid baked once per level from world geometry.
///
/// The grid discretizes a rectangular region of the ground plane (X/Z, Y up)
/// into uniform cells stored row-major. Shape is fixed after bake; individual
/// cell walkability may still be toggled for dynamic obstacles.
#[derive(Debug, Clone, Resource)]
pub struct NavGrid {
    /// World position of the grid's minimum corner
    origin: Vec3,
    /// World units per grid cell
    cell_size: f32,
    width: u32,
    height: u32,
    /// Walkability arena - true if the cell is walkable
    walkable: Vec<bool>,
}

impl NavGrid {
    /// Bake a grid by sampling the external walkability predicate at every
    /// cell center. Deterministic given identical geometry and predicate.
    pub fn bake(
        origin: Vec3,
        cell_size: f32,
        width: u32,
        height: u32,
        is_walkable: impl Fn(Vec3) -> bool,
    ) -> NavResult<Self> {
        if width == 0 || height == 0 || cell_size <= 0.0 {
            return Err(NavError::InvalidGridDimensions {
                width,
                height,
                cell_size,
            });
        }

        let total_cells = (width as usize) * (height as usize);
        let mut walkable = Vec::with_capacity(total_cells);

        for z in 0..height {
            for x in 0..width {
                let center = origin
                    + Vec3::new(
                        (x as f32 + 0.5) * cell_size,
                        0.0,
                        (z as f32 + 0.5) * cell_size,
                    );
                walkable.push(is_walkable(center));
            }
        }

        let grid = NavGrid {
            origin,
            cell_size,
            width,
            height,
            walkable,
        };

        let blocked_count = grid.walkable.iter().filter(|&&w| !w).count();
        info!(
            "Baked navigation grid {}x{}: {}/{} cells blocked ({:.1}%)",
            width,
            height,
            blocked_count,
            total_cells,
            (blocked_count as f32 / total_cells as f32) * 100.0
        );

        Ok(grid)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn cell_count(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    #[inline]
    pub fn cell_index(&self, cell: CellCoord) -> usize {
        (cell.z as usize) * (self.width as usize) + (cell.x as usize)
    }

    /// Convert a world position to the containing cell, clamped to grid
    /// bounds. Never fails: off-grid queries (including degenerate tactic
    /// destinations) snap to the nearest edge cell.
    pub fn world_to_cell(&self, world_pos: Vec3) -> CellCoord {
        let fx = (world_pos.x - self.origin.x) / self.cell_size;
        let fz = (world_pos.z - self.origin.z) / self.cell_size;

        let x = (fx.floor() as i64).clamp(0, self.width as i64 - 1) as u32;
        let z = (fz.floor() as i64).clamp(0, self.height as i64 - 1) as u32;
        CellCoord::new(x, z)
    }

    /// World position of a cell's center, at the grid's ground height
    pub fn cell_to_world(&self, cell: CellCoord) -> Vec3 {
        self.origin
            + Vec3::new(
                (cell.x as f32 + 0.5) * self.cell_size,
                0.0,
                (cell.z as f32 + 0.5) * self.cell_size,
            )
    }

    /// Up to 8 in-bounds neighbors of a cell. Does not filter by
    /// walkability - callers filter.
    pub fn neighbors(&self, cell: CellCoord) -> Vec<CellCoord> {
        let mut neighbors = Vec::with_capacity(8);
        for (dx, dz) in NEIGHBOR_OFFSETS {
            let nx = cell.x as i32 + dx;
            let nz = cell.z as i32 + dz;
            if nx >= 0 && nz >= 0 && nx < self.width as i32 && nz < self.height as i32 {
                neighbors.push(CellCoord::new(nx as u32, nz as u32));
            }
        }
        neighbors
    }

    pub fn is_walkable(&self, cell: CellCoord) -> bool {
        if cell.x >= self.width || cell.z >= self.height {
            return false;
        }
        self.walkable[self.cell_index(cell)]
    }

    /// Check walkability at a world position (clamped to bounds)
    pub fn is_walkable_at(&self, world_pos: Vec3) -> bool {
        self.is_walkable(self.world_to_cell(world_pos))
    }

    /// Single dynamic-obstacle update. Does not invalidate any cached paths;
    /// agents pick the change up on their next replan.
    pub fn set_walkable(&mut self, world_pos: Vec3, walkable: bool) {
        let cell = self.world_to_cell(world_pos);
        let index = self.cell_index(cell);
        self.walkable[index] = walkable;
    }

    /// Line-of-sight test between two world positions against the static
    /// walkability arena, by sampling the segment at sub-cell steps.
    ///
    /// This is the crate's default implementation of the external LOS
    /// predicate used by path smoothing. Diagonal corner cutting at cell
    /// boundaries is a known trade-off for agent smoothness.
    pub fn has_line_of_sight(&self, from: Vec3, to: Vec3) -> bool {
        let from_2d = Vec3::new(from.x, 0.0, from.z);
        let to_2d = Vec3::new(to.x, 0.0, to.z);
        let length = from_2d.distance(to_2d);

        if length < f32::EPSILON {
            return self.is_walkable_at(from);
        }

        // Quarter-cell steps so thin blocked cells cannot be stepped over
        let step = self.cell_size * 0.25;
        let steps = (length / step).ceil() as u32;

        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            let sample = from_2d.lerp(to_2d, t);
            if !self.is_walkable_at(sample) {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_grid(width: u32, height: u32) -> NavGrid {
        NavGrid::bake(Vec3::ZERO, 1.0, width, height, |_| true).unwrap()
    }

    #[test]
    fn test_bake_rejects_degenerate_dimensions() {
        assert!(NavGrid::bake(Vec3::ZERO, 1.0, 0, 4, |_| true).is_err());
        assert!(NavGrid::bake(Vec3::ZERO, 1.0, 4, 0, |_| true).is_err());
        assert!(NavGrid::bake(Vec3::ZERO, 0.0, 4, 4, |_| true).is_err());
        assert!(NavGrid::bake(Vec3::ZERO, -1.0, 4, 4, |_| true).is_err());
    }

    #[test]
    fn test_bake_samples_predicate_at_cell_centers() {
        // Block everything left of x = 2.0 in world space
        let grid = NavGrid::bake(Vec3::ZERO, 1.0, 4, 4, |p| p.x > 2.0).unwrap();

        assert!(!grid.is_walkable(CellCoord::new(0, 0)));
        assert!(!grid.is_walkable(CellCoord::new(1, 3)));
        assert!(grid.is_walkable(CellCoord::new(2, 0))); // center at x=2.5
        assert!(grid.is_walkable(CellCoord::new(3, 3)));
    }

    #[test]
    fn test_world_to_cell_clamps_out_of_bounds() {
        let grid = open_grid(8, 8);

        assert_eq!(
            grid.world_to_cell(Vec3::new(-100.0, 0.0, -100.0)),
            CellCoord::new(0, 0)
        );
        assert_eq!(
            grid.world_to_cell(Vec3::new(100.0, 0.0, 100.0)),
            CellCoord::new(7, 7)
        );
    }

    #[test]
    fn test_coordinate_round_trip_is_idempotent() {
        let grid = NavGrid::bake(Vec3::new(-5.0, 0.0, 3.0), 0.75, 16, 12, |_| true).unwrap();

        // After the first snap, world<->cell conversion must be stable
        for (x, z) in [(-4.9, 3.1), (0.0, 5.0), (3.3, 9.9), (100.0, -100.0)] {
            let world = Vec3::new(x, 0.0, z);
            let cell = grid.world_to_cell(world);
            let snapped = grid.cell_to_world(cell);
            assert_eq!(grid.world_to_cell(snapped), cell);
            assert_eq!(grid.cell_to_world(grid.world_to_cell(snapped)), snapped);
        }
    }

    #[test]
    fn test_neighbors_interior_and_corner() {
        let grid = open_grid(3, 3);

        let center = grid.neighbors(CellCoord::new(1, 1));
        assert_eq!(center.len(), 8);

        let corner = grid.neighbors(CellCoord::new(0, 0));
        assert_eq!(corner.len(), 3);
        assert!(corner.contains(&CellCoord::new(1, 0)));
        assert!(corner.contains(&CellCoord::new(0, 1)));
        assert!(corner.contains(&CellCoord::new(1, 1)));
    }

    #[test]
    fn test_neighbors_do_not_filter_walkability() {
        let mut grid = open_grid(3, 3);
        grid.set_walkable(Vec3::new(1.5, 0.0, 0.5), false);

        let neighbors = grid.neighbors(CellCoord::new(1, 1));
        assert!(neighbors.contains(&CellCoord::new(1, 0)));
    }

    #[test]
    fn test_set_walkable_dynamic_update() {
        let mut grid = open_grid(4, 4);
        let pos = Vec3::new(2.5, 0.0, 2.5);

        assert!(grid.is_walkable_at(pos));
        grid.set_walkable(pos, false);
        assert!(!grid.is_walkable_at(pos));
        grid.set_walkable(pos, true);
        assert!(grid.is_walkable_at(pos));
    }

    #[test]
    fn test_line_of_sight_open_grid() {
        let grid = open_grid(10, 10);
        assert!(grid.has_line_of_sight(Vec3::new(0.5, 0.0, 0.5), Vec3::new(9.5, 0.0, 9.5)));
    }

    #[test]
    fn test_line_of_sight_blocked_by_wall() {
        // Wall across the middle column
        let grid = NavGrid::bake(Vec3::ZERO, 1.0, 10, 10, |p| {
            !(4.0..5.0).contains(&p.x)
        })
        .unwrap();

        assert!(!grid.has_line_of_sight(Vec3::new(0.5, 0.0, 5.0), Vec3::new(9.5, 0.0, 5.0)));
        // Segments on one side of the wall are clear
        assert!(grid.has_line_of_sight(Vec3::new(0.5, 0.0, 0.5), Vec3::new(3.5, 0.0, 9.5)));
    }

    #[test]
    fn test_line_of_sight_degenerate_segment() {
        let mut grid = open_grid(4, 4);
        let pos = Vec3::new(1.5, 0.0, 1.5);

        assert!(grid.has_line_of_sight(pos, pos));
        grid.set_walkable(pos, false);
        assert!(!grid.has_line_of_sight(pos, pos));
    }
}
