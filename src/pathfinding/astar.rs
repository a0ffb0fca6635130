use bevy::prelude::*;

use super::frontier::PriorityFrontier;
use super::grid::{CellCoord, NavGrid};
use super::smoothing::smooth_path;

/// Cost of one axis-aligned step, x10 integer scale
pub const STEP_COST_AXIS: u32 = 10;
/// Cost of one diagonal step: 14/10 approximates sqrt(2)
pub const STEP_COST_DIAGONAL: u32 = 14;

const NO_PARENT: u32 = u32::MAX;

/// Per-cell search scratch stored as parallel arrays addressed by cell
/// index. Reset per run by a generation counter instead of clearing, so a
/// search never allocates once the arrays have grown to the grid size.
///
/// g/h/parent values are only meaningful for cells stamped open or closed in
/// the current run; f is always recomputed as g + h, never stored.
#[derive(Debug, Default)]
pub struct SearchScratch {
    g: Vec<u32>,
    h: Vec<u32>,
    parent: Vec<u32>,
    slot: Vec<usize>,
    open_run: Vec<u32>,
    closed_run: Vec<u32>,
    run: u32,
}

impl SearchScratch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new search over `cell_count` cells, invalidating all stamps
    /// from previous runs.
    pub fn begin_run(&mut self, cell_count: usize) {
        if self.g.len() < cell_count {
            self.g.resize(cell_count, 0);
            self.h.resize(cell_count, 0);
            self.parent.resize(cell_count, NO_PARENT);
            self.slot.resize(cell_count, 0);
            self.open_run.resize(cell_count, 0);
            self.closed_run.resize(cell_count, 0);
        }
        self.run = self.run.wrapping_add(1);
        if self.run == 0 {
            // Stamp wrap-around: old stamps would alias the new run
            self.open_run.fill(0);
            self.closed_run.fill(0);
            self.run = 1;
        }
    }

    pub fn init_cell(&mut self, cell: u32, g: u32, h: u32, parent: u32) {
        let i = cell as usize;
        self.g[i] = g;
        self.h[i] = h;
        self.parent[i] = parent;
    }

    pub fn g(&self, cell: u32) -> u32 {
        self.g[cell as usize]
    }

    pub fn set_g(&mut self, cell: u32, g: u32) {
        self.g[cell as usize] = g;
    }

    pub fn h(&self, cell: u32) -> u32 {
        self.h[cell as usize]
    }

    /// Total cost, recomputed from its inputs
    pub fn f(&self, cell: u32) -> u32 {
        self.g[cell as usize] + self.h[cell as usize]
    }

    pub fn parent(&self, cell: u32) -> u32 {
        self.parent[cell as usize]
    }

    pub fn set_parent(&mut self, cell: u32, parent: u32) {
        self.parent[cell as usize] = parent;
    }

    pub fn slot(&self, cell: u32) -> usize {
        self.slot[cell as usize]
    }

    pub fn set_slot(&mut self, cell: u32, slot: usize) {
        self.slot[cell as usize] = slot;
    }

    pub fn is_open(&self, cell: u32) -> bool {
        self.open_run[cell as usize] == self.run
    }

    pub fn mark_open(&mut self, cell: u32, slot: usize) {
        self.open_run[cell as usize] = self.run;
        self.slot[cell as usize] = slot;
    }

    pub fn clear_open(&mut self, cell: u32) {
        self.open_run[cell as usize] = 0;
    }

    pub fn is_closed(&self, cell: u32) -> bool {
        self.closed_run[cell as usize] == self.run
    }

    pub fn mark_closed(&mut self, cell: u32) {
        self.closed_run[cell as usize] = self.run;
    }
}

/// Diagonal-distance heuristic with the same 10/14 step weights, admissible
/// and consistent for 8-directional movement.
pub fn heuristic(a: CellCoord, b: CellCoord) -> u32 {
    let dx = a.x.abs_diff(b.x);
    let dz = a.z.abs_diff(b.z);
    let diagonal = dx.min(dz);
    let straight = dx.max(dz) - diagonal;
    diagonal * STEP_COST_DIAGONAL + straight * STEP_COST_AXIS
}

/// A* planner over a [`NavGrid`]. Owns the reusable search scratch and
/// frontier; one planner serves any number of sequential searches.
#[derive(Debug, Default, Resource)]
pub struct PathPlanner {
    scratch: SearchScratch,
    frontier: PriorityFrontier,
}

impl PathPlanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// A* over grid cells. Returns the cell path (start and goal inclusive)
    /// and its total step cost, or `None` when no route exists. "No path"
    /// is a normal outcome, never a fault.
    pub fn find_cell_path(
        &mut self,
        grid: &NavGrid,
        start: CellCoord,
        goal: CellCoord,
    ) -> Option<(Vec<CellCoord>, u32)> {
        if !grid.is_walkable(start) || !grid.is_walkable(goal) {
            return None;
        }
        if start == goal {
            return Some((vec![start], 0));
        }

        self.scratch.begin_run(grid.cell_count());
        self.frontier.clear();

        let start_index = grid.cell_index(start) as u32;
        let goal_index = grid.cell_index(goal) as u32;

        self.scratch
            .init_cell(start_index, 0, heuristic(start, goal), NO_PARENT);
        self.frontier.push(&mut self.scratch, start_index);

        while let Some(current) = self.frontier.pop(&mut self.scratch) {
            if current == goal_index {
                return Some(self.reconstruct(grid, current));
            }
            self.scratch.mark_closed(current);

            let current_cell = index_to_cell(grid, current);
            for neighbor in grid.neighbors(current_cell) {
                if !grid.is_walkable(neighbor) {
                    continue;
                }
                let neighbor_index = grid.cell_index(neighbor) as u32;
                if self.scratch.is_closed(neighbor_index) {
                    continue;
                }

                let candidate_g = self.scratch.g(current) + step_cost(current_cell, neighbor);

                if self.frontier.contains(&self.scratch, neighbor_index) {
                    if candidate_g < self.scratch.g(neighbor_index) {
                        self.scratch.set_g(neighbor_index, candidate_g);
                        self.scratch.set_parent(neighbor_index, current);
                        self.frontier.decrease_key(&mut self.scratch, neighbor_index);
                    }
                } else {
                    self.scratch.init_cell(
                        neighbor_index,
                        candidate_g,
                        heuristic(neighbor, goal),
                        current,
                    );
                    self.frontier.push(&mut self.scratch, neighbor_index);
                }
            }
        }

        // Frontier exhausted: the goal is unreachable
        None
    }

    /// Find a route between two world positions.
    ///
    /// Waypoints are cell centers: the first approximates `start_world`, the
    /// last approximates `dest_world`. When `smooth` is set the raw cell
    /// path is collapsed with the grid's line-of-sight test immediately
    /// after the search.
    pub fn request_path(
        &mut self,
        grid: &NavGrid,
        start_world: Vec3,
        dest_world: Vec3,
        smooth: bool,
    ) -> Option<Vec<Vec3>> {
        let start = grid.world_to_cell(start_world);
        let dest = grid.world_to_cell(dest_world);

        if start == dest {
            // Already in the destination cell, nothing to search
            if !grid.is_walkable(start) {
                return None;
            }
            return Some(vec![grid.cell_to_world(dest)]);
        }

        let Some((cells, cost)) = self.find_cell_path(grid, start, dest) else {
            debug!(
                "No path from ({:.1}, {:.1}) to ({:.1}, {:.1}): start_walkable={} dest_walkable={}",
                start_world.x,
                start_world.z,
                dest_world.x,
                dest_world.z,
                grid.is_walkable(start),
                grid.is_walkable(dest)
            );
            return None;
        };

        let waypoints: Vec<Vec3> = cells.iter().map(|&c| grid.cell_to_world(c)).collect();
        let waypoints = if smooth {
            smooth_path(&waypoints, |a, b| grid.has_line_of_sight(a, b))
        } else {
            waypoints
        };

        debug!(
            "Planned path with {} waypoints, cost {}",
            waypoints.len(),
            cost
        );
        Some(waypoints)
    }

    fn reconstruct(&self, grid: &NavGrid, goal_index: u32) -> (Vec<CellCoord>, u32) {
        let cost = self.scratch.g(goal_index);
        let mut cells = Vec::new();
        let mut current = goal_index;
        loop {
            cells.push(index_to_cell(grid, current));
            let parent = self.scratch.parent(current);
            if parent == NO_PARENT {
                break;
            }
            current = parent;
        }
        cells.reverse();
        (cells, cost)
    }
}

fn index_to_cell(grid: &NavGrid, index: u32) -> CellCoord {
    CellCoord::new(index % grid.width(), index / grid.width())
}

fn step_cost(from: CellCoord, to: CellCoord) -> u32 {
    if from.x != to.x && from.z != to.z {
        STEP_COST_DIAGONAL
    } else {
        STEP_COST_AXIS
    }
}
