//! The spatial index: positions of live agents in the square `[0, size] x [0, size]`, bucketed
//! into a uniform grid so radius queries only visit nearby cells. Query results are exact and
//! match a brute-force scan.
use crate::agent::AgentId;
use crate::geometry::{distance, Vec2};
use crate::hashing::{HashMap, HashMapExt};

type Cell = (usize, usize);

#[derive(Debug, Clone)]
pub struct SpatialIndex {
    size: f64,
    cell_size: f64,
    cells_per_axis: usize,
    cells: HashMap<Cell, Vec<AgentId>>,
    positions: HashMap<AgentId, Vec2>,
}

impl SpatialIndex {
    /// Creates an empty index over a space of edge length `size`, with grid cells of edge
    /// length `cell_size`. Queries are cheapest when `cell_size` is close to the usual radius.
    ///
    /// # Panics
    ///
    /// Panics if `size` or `cell_size` is not positive.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn new(size: f64, cell_size: f64) -> SpatialIndex {
        assert!(size > 0.0, "Space size must be positive, got {size}");
        assert!(cell_size > 0.0, "Cell size must be positive, got {cell_size}");
        let cells_per_axis = ((size / cell_size).ceil() as usize).max(1);
        SpatialIndex {
            size,
            cell_size,
            cells_per_axis,
            cells: HashMap::new(),
            positions: HashMap::new(),
        }
    }

    #[must_use]
    pub fn size(&self) -> f64 {
        self.size
    }

    #[must_use]
    pub fn contains_point(&self, position: Vec2) -> bool {
        (0.0..=self.size).contains(&position.x) && (0.0..=self.size).contains(&position.y)
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn axis_cell(&self, coordinate: f64) -> usize {
        let cell = (coordinate / self.cell_size).floor();
        if cell <= 0.0 {
            0
        } else {
            (cell as usize).min(self.cells_per_axis - 1)
        }
    }

    fn cell_of(&self, position: Vec2) -> Cell {
        (self.axis_cell(position.x), self.axis_cell(position.y))
    }

    /// Inserts `id` at `position`, or moves it there if it is already present.
    ///
    /// # Panics
    ///
    /// Panics if `position` is outside the space.
    pub fn place(&mut self, id: AgentId, position: Vec2) {
        assert!(
            self.contains_point(position),
            "Agent {id} placed at ({}, {}), outside the space [0, {}]",
            position.x,
            position.y,
            self.size
        );
        let new_cell = self.cell_of(position);
        if let Some(old_position) = self.positions.insert(id, position) {
            let old_cell = self.cell_of(old_position);
            if old_cell == new_cell {
                return;
            }
            self.remove_from_cell(old_cell, id);
        }
        self.cells.entry(new_cell).or_default().push(id);
    }

    /// Removes `id` from the index.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not in the index.
    pub fn remove(&mut self, id: AgentId) {
        let Some(position) = self.positions.remove(&id) else {
            panic!("Agent {id} is not in the spatial index");
        };
        let cell = self.cell_of(position);
        self.remove_from_cell(cell, id);
    }

    fn remove_from_cell(&mut self, cell: Cell, id: AgentId) {
        let members = self
            .cells
            .get_mut(&cell)
            .expect("Indexed agent has no grid cell");
        let index = members
            .iter()
            .position(|member| *member == id)
            .expect("Indexed agent is missing from its grid cell");
        members.swap_remove(index);
        if members.is_empty() {
            self.cells.remove(&cell);
        }
    }

    #[must_use]
    pub fn position(&self, id: AgentId) -> Option<Vec2> {
        self.positions.get(&id).copied()
    }

    #[must_use]
    pub fn contains(&self, id: AgentId) -> bool {
        self.positions.contains_key(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Every agent whose distance to `position` is strictly less than `radius`, sorted by id.
    /// An agent sitting at `position` is included; callers filter themselves out.
    #[must_use]
    pub fn neighbors_within(&self, position: Vec2, radius: f64) -> Vec<AgentId> {
        if radius <= 0.0 || self.positions.is_empty() {
            return Vec::new();
        }
        let (min_x, min_y) = self.cell_of(position - Vec2::new(radius, radius));
        let (max_x, max_y) = self.cell_of(position + Vec2::new(radius, radius));

        let mut found = Vec::new();
        for cell_x in min_x..=max_x {
            for cell_y in min_y..=max_y {
                let Some(members) = self.cells.get(&(cell_x, cell_y)) else {
                    continue;
                };
                found.extend(
                    members
                        .iter()
                        .filter(|id| distance(self.positions[*id], position) < radius),
                );
            }
        }
        found.sort_unstable();
        found
    }

    /// Ids of every indexed agent, sorted.
    #[must_use]
    pub fn ids(&self) -> Vec<AgentId> {
        let mut ids: Vec<AgentId> = self.positions.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn query_finds_agents_within_radius() {
        let mut index = SpatialIndex::new(100.0, 10.0);
        index.place(AgentId(0), Vec2::new(5.0, 5.0));
        index.place(AgentId(1), Vec2::new(6.0, 5.0));
        index.place(AgentId(2), Vec2::new(50.0, 50.0));

        assert_eq!(
            index.neighbors_within(Vec2::new(5.0, 5.0), 2.0),
            vec![AgentId(0), AgentId(1)]
        );
    }

    #[test]
    fn membership_is_strict() {
        let mut index = SpatialIndex::new(100.0, 10.0);
        index.place(AgentId(0), Vec2::new(10.0, 10.0));
        index.place(AgentId(1), Vec2::new(13.0, 14.0));

        // Exactly 5 apart
        assert_eq!(
            index.neighbors_within(Vec2::new(10.0, 10.0), 5.0),
            vec![AgentId(0)]
        );
        assert_eq!(
            index.neighbors_within(Vec2::new(10.0, 10.0), 5.000_001),
            vec![AgentId(0), AgentId(1)]
        );
        assert!(index.neighbors_within(Vec2::new(10.0, 10.0), 0.0).is_empty());
    }

    #[test]
    fn move_and_remove() {
        let mut index = SpatialIndex::new(100.0, 10.0);
        index.place(AgentId(7), Vec2::new(1.0, 1.0));
        index.place(AgentId(7), Vec2::new(99.0, 99.0));
        assert_eq!(index.len(), 1);
        assert_eq!(index.position(AgentId(7)), Some(Vec2::new(99.0, 99.0)));
        assert!(index.neighbors_within(Vec2::new(1.0, 1.0), 5.0).is_empty());
        assert_eq!(
            index.neighbors_within(Vec2::new(100.0, 100.0), 5.0),
            vec![AgentId(7)]
        );

        index.remove(AgentId(7));
        assert!(index.is_empty());
        assert!(!index.contains(AgentId(7)));
        assert!(index.neighbors_within(Vec2::new(99.0, 99.0), 5.0).is_empty());
    }

    #[test]
    fn edges_of_the_space_are_inside() {
        let mut index = SpatialIndex::new(100.0, 30.0);
        index.place(AgentId(0), Vec2::new(0.0, 0.0));
        index.place(AgentId(1), Vec2::new(100.0, 100.0));
        index.place(AgentId(2), Vec2::new(100.0, 0.0));
        assert_eq!(index.ids(), vec![AgentId(0), AgentId(1), AgentId(2)]);
        assert_eq!(
            index.neighbors_within(Vec2::new(50.0, 50.0), 1000.0),
            vec![AgentId(0), AgentId(1), AgentId(2)]
        );
    }

    #[test]
    #[should_panic(expected = "outside the space")]
    fn place_outside_panics() {
        let mut index = SpatialIndex::new(100.0, 10.0);
        index.place(AgentId(0), Vec2::new(100.5, 3.0));
    }

    #[test]
    #[should_panic(expected = "is not in the spatial index")]
    fn double_remove_panics() {
        let mut index = SpatialIndex::new(100.0, 10.0);
        index.place(AgentId(0), Vec2::new(1.0, 3.0));
        index.remove(AgentId(0));
        index.remove(AgentId(0));
    }

    #[test]
    fn matches_brute_force() {
        let mut rng = SmallRng::seed_from_u64(8675309);
        let mut index = SpatialIndex::new(200.0, 13.0);
        let mut points = Vec::new();
        for id in 0..400 {
            let p = Vec2::new(rng.random_range(0.0..=200.0), rng.random_range(0.0..=200.0));
            index.place(AgentId(id), p);
            points.push((AgentId(id), p));
        }
        // Move some around and drop a few
        for id in (0..400).step_by(7) {
            let p = Vec2::new(rng.random_range(0.0..=200.0), rng.random_range(0.0..=200.0));
            index.place(AgentId(id), p);
            points[id as usize].1 = p;
        }
        for id in (0..400).step_by(11) {
            index.remove(AgentId(id));
        }
        points.retain(|(id, _)| id.0 % 11 != 0);

        for _ in 0..50 {
            let centre = Vec2::new(rng.random_range(0.0..=200.0), rng.random_range(0.0..=200.0));
            let radius = rng.random_range(0.0..60.0);
            let expected: Vec<AgentId> = points
                .iter()
                .filter(|(_, p)| distance(*p, centre) < radius)
                .map(|(id, _)| *id)
                .collect();
            assert_eq!(index.neighbors_within(centre, radius), expected);
        }
    }
}
