use crate::vec2::Vec2;
use std::collections::HashMap;

/// Uniform-cell spatial index over fish positions. Buckets hold indices into
/// the world's fish vector, keyed by integer cell coordinates so positions
/// slightly outside the play area still land in a well-defined cell.
///
/// The grid is rebuilt wholesale on a caller-chosen cadence; between rebuilds
/// neighbor lists may be one interval stale, which the flocking rules
/// tolerate.
pub struct SpatialGrid {
    cell_size: f32,
    buckets: HashMap<(i32, i32), Vec<usize>>,
}

impl SpatialGrid {
    pub fn new(cell_size: f32) -> Self {
        SpatialGrid {
            cell_size,
            buckets: HashMap::new(),
        }
    }

    #[inline]
    pub fn cell_index(&self, position: Vec2) -> (i32, i32) {
        (
            (position.x / self.cell_size).floor() as i32,
            (position.y / self.cell_size).floor() as i32,
        )
    }

    /// Clears all buckets and reinserts every position. After this, each fish
    /// index appears in exactly one bucket.
    pub fn rebuild<'a, I>(&mut self, positions: I)
    where
        I: IntoIterator<Item = (usize, &'a Vec2)>,
    {
        for bucket in self.buckets.values_mut() {
            bucket.clear();
        }
        for (index, &position) in positions {
            let key = self.cell_index(position);
            self.buckets.entry(key).or_default().push(index);
        }
    }

    /// Indices in the 3x3 block of cells around `position`, the querying
    /// fish's own cell included. Callers exclude self by index.
    pub fn neighbors(&self, position: Vec2) -> Vec<usize> {
        let (cx, cy) = self.cell_index(position);
        let mut out = Vec::with_capacity(32);
        for x in cx - 1..=cx + 1 {
            for y in cy - 1..=cy + 1 {
                if let Some(bucket) = self.buckets.get(&(x, y)) {
                    out.extend_from_slice(bucket);
                }
            }
        }
        out
    }
}
