//! Grid navigation for walled villages.
//!
//! Each path query floods an integration field outward from the goal cell
//! (Dijkstra-style BFS over 8 neighbours), then walks downhill from the start
//! cell. One flood serves one agent, which is plenty for a village of zombies.

use glam::{IVec2, Vec2, Vec3};
use std::collections::VecDeque;

use crate::NavMesh;

const BLOCKED: u8 = 255;
const MAX_INTEGRATION: u32 = u32::MAX;

/// Cardinal and diagonal neighbours with their step cost (diagonal ≈ √2 * 10).
const NEIGHBORS: [(i32, i32, u32); 8] = [
    (-1, 0, 10),
    (1, 0, 10),
    (0, -1, 10),
    (0, 1, 10),
    (-1, -1, 14),
    (1, -1, 14),
    (-1, 1, 14),
    (1, 1, 14),
];

/// A walkability grid over the XZ plane.
#[derive(Debug, Clone)]
pub struct NavGrid {
    /// Width of the grid.
    pub width: usize,
    /// Height of the grid.
    pub height: usize,
    /// Cell size in world units.
    pub cell_size: f32,
    /// Origin of the grid (min corner) in world XZ.
    pub origin: Vec2,
    /// World Y of the walkable surface.
    pub ground_height: f32,
    /// Cost field (1-254 walkable, 255 = blocked).
    costs: Vec<u8>,
}

impl NavGrid {
    /// Create a new, fully walkable grid with the given dimensions.
    pub fn new(width: usize, height: usize, cell_size: f32, origin: Vec2) -> Self {
        Self {
            width,
            height,
            cell_size,
            origin,
            ground_height: 0.0,
            costs: vec![1; width * height],
        }
    }

    /// Grid covering the square `[-half_size, half_size]` on X and Z.
    pub fn centered(half_size: f32, cell_size: f32) -> Self {
        let cells = ((half_size * 2.0) / cell_size).ceil().max(1.0) as usize;
        Self::new(cells, cells, cell_size, Vec2::splat(-half_size))
    }

    /// Set a cell as blocked (obstacle).
    pub fn set_blocked(&mut self, x: usize, y: usize) {
        if x < self.width && y < self.height {
            self.costs[y * self.width + x] = BLOCKED;
        }
    }

    /// Block every cell whose center lies inside an axis-aligned rectangle.
    pub fn block_rect(&mut self, center: Vec3, half_extents: Vec2) {
        let min = self.world_to_grid(center - Vec3::new(half_extents.x, 0.0, half_extents.y));
        let max = self.world_to_grid(center + Vec3::new(half_extents.x, 0.0, half_extents.y));
        for y in min.y.max(0)..=max.y.min(self.height as i32 - 1) {
            for x in min.x.max(0)..=max.x.min(self.width as i32 - 1) {
                let c = self.grid_to_world(IVec2::new(x, y));
                if (c.x - center.x).abs() <= half_extents.x && (c.z - center.z).abs() <= half_extents.y {
                    self.set_blocked(x as usize, y as usize);
                }
            }
        }
    }

    /// Convert world position to grid coordinates.
    pub fn world_to_grid(&self, world_pos: Vec3) -> IVec2 {
        let local = Vec2::new(world_pos.x, world_pos.z) - self.origin;
        IVec2::new(
            (local.x / self.cell_size).floor() as i32,
            (local.y / self.cell_size).floor() as i32,
        )
    }

    /// Convert grid coordinates to world position (center of cell).
    pub fn grid_to_world(&self, grid_pos: IVec2) -> Vec3 {
        let x = self.origin.x + (grid_pos.x as f32 + 0.5) * self.cell_size;
        let z = self.origin.y + (grid_pos.y as f32 + 0.5) * self.cell_size;
        Vec3::new(x, self.ground_height, z)
    }

    fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.width as i32 && y < self.height as i32
    }

    fn index(&self, cell: IVec2) -> usize {
        cell.y as usize * self.width + cell.x as usize
    }

    /// Check if a grid cell is walkable.
    pub fn is_walkable(&self, x: i32, y: i32) -> bool {
        self.in_bounds(x, y) && self.costs[y as usize * self.width + x as usize] != BLOCKED
    }

    /// Diagonal steps may not clip the corner of a blocked cell.
    fn can_step(&self, from: IVec2, dx: i32, dy: i32) -> bool {
        let (nx, ny) = (from.x + dx, from.y + dy);
        if !self.is_walkable(nx, ny) {
            return false;
        }
        dx == 0 || dy == 0 || (self.is_walkable(from.x + dx, from.y) && self.is_walkable(from.x, from.y + dy))
    }

    /// Calculate integration field (distance to goal) using Dijkstra-style BFS.
    fn integration_from(&self, goal: IVec2) -> Vec<u32> {
        let mut integration = vec![MAX_INTEGRATION; self.width * self.height];
        if !self.is_walkable(goal.x, goal.y) {
            return integration;
        }

        integration[self.index(goal)] = 0;
        let mut open = VecDeque::new();
        open.push_back(goal);

        while let Some(cell) = open.pop_front() {
            let current_cost = integration[self.index(cell)];

            for (dx, dy, base_cost) in NEIGHBORS {
                if !self.can_step(cell, dx, dy) {
                    continue;
                }
                let neighbor = IVec2::new(cell.x + dx, cell.y + dy);
                let neighbor_idx = self.index(neighbor);

                let new_cost = current_cost
                    .saturating_add(base_cost)
                    .saturating_add(self.costs[neighbor_idx] as u32 * 10);

                if new_cost < integration[neighbor_idx] {
                    integration[neighbor_idx] = new_cost;
                    open.push_back(neighbor);
                }
            }
        }
        integration
    }

    /// Nearest walkable cell to `cell` within `radius` cells (ring search).
    fn nearest_walkable(&self, cell: IVec2, radius: i32) -> Option<IVec2> {
        if self.is_walkable(cell.x, cell.y) {
            return Some(cell);
        }
        let mut best: Option<(i32, IVec2)> = None;
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                let candidate = IVec2::new(cell.x + dx, cell.y + dy);
                if !self.is_walkable(candidate.x, candidate.y) {
                    continue;
                }
                let d = dx * dx + dy * dy;
                if d <= radius * radius && best.map_or(true, |(bd, _)| d < bd) {
                    best = Some((d, candidate));
                }
            }
        }
        best.map(|(_, c)| c)
    }
}

impl NavMesh for NavGrid {
    fn sample_valid_point(&self, near: Vec3, max_distance: f32) -> Option<Vec3> {
        let cell = self.world_to_grid(near);
        if self.is_walkable(cell.x, cell.y) {
            return Some(Vec3::new(near.x, self.ground_height, near.z));
        }
        let radius = (max_distance / self.cell_size).ceil() as i32;
        let found = self.nearest_walkable(cell, radius)?;
        let point = self.grid_to_world(found);
        (point.distance(Vec3::new(near.x, self.ground_height, near.z)) <= max_distance + self.cell_size * 0.5)
            .then_some(point)
    }

    fn find_path(&self, from: Vec3, to: Vec3) -> Option<Vec<Vec3>> {
        let start = self.nearest_walkable(self.world_to_grid(from), 1)?;
        let goal_cell = self.world_to_grid(to);
        let goal = self.nearest_walkable(goal_cell, 2)?;
        let destination = if goal == goal_cell {
            Vec3::new(to.x, self.ground_height, to.z)
        } else {
            self.grid_to_world(goal)
        };

        let integration = self.integration_from(goal);
        if integration[self.index(start)] == MAX_INTEGRATION {
            return None;
        }

        let mut waypoints = Vec::new();
        let mut cell = start;
        while cell != goal {
            let mut best = cell;
            let mut best_cost = integration[self.index(cell)];
            for (dx, dy, _) in NEIGHBORS {
                if !self.can_step(cell, dx, dy) {
                    continue;
                }
                let neighbor = IVec2::new(cell.x + dx, cell.y + dy);
                let cost = integration[self.index(neighbor)];
                if cost < best_cost {
                    best_cost = cost;
                    best = neighbor;
                }
            }
            if best == cell {
                // Integration field is strictly decreasing toward the goal; a
                // local minimum means the field is stale.
                log::warn!("NavGrid path stalled at {:?}", cell);
                return None;
            }
            cell = best;
            if cell != goal {
                waypoints.push(self.grid_to_world(cell));
            }
        }
        waypoints.push(destination);
        Some(waypoints)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 20x20 m grid with a wall across z = 0 leaving a gap at the east end.
    fn walled() -> NavGrid {
        let mut grid = NavGrid::centered(10.0, 1.0);
        grid.block_rect(Vec3::new(-2.0, 0.0, 0.0), Vec2::new(8.0, 0.5));
        grid
    }

    #[test]
    fn centered_grid_dimensions() {
        let g = NavGrid::centered(10.0, 2.0);
        assert_eq!(g.width, 10);
        assert_eq!(g.height, 10);
        assert_eq!(g.origin, Vec2::new(-10.0, -10.0));
    }

    #[test]
    fn world_to_grid_roundtrip() {
        let g = NavGrid::new(10, 10, 2.0, Vec2::ZERO);
        let world = Vec3::new(5.0, 0.0, 7.0);
        let back = g.grid_to_world(g.world_to_grid(world));
        assert!((back.x - 5.0).abs() < 2.0);
        assert!((back.z - 7.0).abs() < 2.0);
    }

    #[test]
    fn set_blocked_is_walkable() {
        let mut g = NavGrid::new(8, 8, 1.0, Vec2::ZERO);
        assert!(g.is_walkable(4, 4));
        g.set_blocked(4, 4);
        assert!(!g.is_walkable(4, 4));
        assert!(!g.is_walkable(-1, 0));
    }

    #[test]
    fn path_routes_around_wall() {
        let grid = walled();
        let from = Vec3::new(-5.0, 0.0, -5.0);
        let to = Vec3::new(-5.0, 0.0, 5.0);
        let path = grid.find_path(from, to).expect("route through the gap");

        assert_eq!(*path.last().unwrap(), to);
        // The gap is east of x = 6
        assert!(path.iter().any(|p| p.x > 6.0));
        for p in &path {
            let c = grid.world_to_grid(*p);
            assert!(grid.is_walkable(c.x, c.y), "waypoint {p:?} inside wall");
        }
    }

    #[test]
    fn sealed_goal_has_no_path() {
        let mut grid = NavGrid::centered(5.0, 1.0);
        grid.block_rect(Vec3::ZERO, Vec2::new(10.0, 0.5));
        assert!(grid.find_path(Vec3::new(0.0, 0.0, -3.0), Vec3::new(0.0, 0.0, 3.0)).is_none());
    }

    #[test]
    fn sample_snaps_out_of_blocked_cells() {
        let grid = walled();
        let inside_wall = Vec3::new(0.0, 3.0, 0.2);
        let p = grid.sample_valid_point(inside_wall, 2.0).expect("nearby floor");
        let c = grid.world_to_grid(p);
        assert!(grid.is_walkable(c.x, c.y));
        assert_eq!(p.y, 0.0);

        let open = Vec3::new(3.0, 1.0, 4.0);
        assert_eq!(grid.sample_valid_point(open, 2.0), Some(Vec3::new(3.0, 0.0, 4.0)));
        assert!(grid.sample_valid_point(Vec3::new(100.0, 0.0, 0.0), 2.0).is_none());
    }
}
