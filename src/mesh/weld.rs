//! Vertex welding: maps nearly-equal positions onto shared integer ids.

use rustc_hash::FxHashMap;

use crate::math::Point3;

/// Spatial hash that assigns one id to every cluster of positions lying
/// within `tolerance` of each other (per-axis distance).
///
/// The grid cell size equals the tolerance, so a match is always found in
/// the position's own cell or one of its 26 neighbours. The first position
/// inserted for a cluster becomes its representative; welding is not
/// transitive beyond that representative.
#[derive(Debug, Clone)]
pub struct VertexTable {
    tolerance: f64,
    positions: Vec<Point3>,
    cells: FxHashMap<[i64; 3], Vec<u32>>,
}

impl VertexTable {
    /// Creates an empty table. `tolerance` must be positive.
    #[must_use]
    pub fn new(tolerance: f64) -> Self {
        Self {
            tolerance,
            positions: Vec::new(),
            cells: FxHashMap::default(),
        }
    }

    /// Returns the id of an existing vertex within tolerance of `position`,
    /// or registers `position` as a new vertex.
    #[allow(clippy::cast_possible_truncation)]
    pub fn insert(&mut self, position: Point3) -> u32 {
        let cell = self.cell_of(&position);

        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    // Far coordinates saturate the cell index; the distance
                    // check below still decides the match.
                    let key = [
                        cell[0].saturating_add(dx),
                        cell[1].saturating_add(dy),
                        cell[2].saturating_add(dz),
                    ];
                    let Some(ids) = self.cells.get(&key) else {
                        continue;
                    };
                    for &id in ids {
                        if self.within_tolerance(&self.positions[id as usize], &position) {
                            return id;
                        }
                    }
                }
            }
        }

        // Callers bound the number of positions to the u32 range.
        let id = self.positions.len() as u32;
        self.positions.push(position);
        self.cells.entry(cell).or_default().push(id);
        id
    }

    /// Number of distinct vertices registered so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Returns `true` if no vertex has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Consumes the table, returning representative positions by id.
    #[must_use]
    pub fn into_positions(self) -> Vec<Point3> {
        self.positions
    }

    #[allow(clippy::cast_possible_truncation)]
    fn cell_of(&self, p: &Point3) -> [i64; 3] {
        [
            (p.x / self.tolerance).floor() as i64,
            (p.y / self.tolerance).floor() as i64,
            (p.z / self.tolerance).floor() as i64,
        ]
    }

    fn within_tolerance(&self, a: &Point3, b: &Point3) -> bool {
        (a - b).amax() <= self.tolerance
    }
}
