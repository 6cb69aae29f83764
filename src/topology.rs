//! Proximity topology — the frame-transient edge set.
//!
//! Every frame the edge set is rebuilt from scratch out of the current node
//! positions: a pair `(a, b)` with `a < b` is connected iff their distance is
//! strictly below the connection distance. Nothing carries over between
//! frames.
//!
//! Two builders produce identical output:
//!
//! | Strategy    | Cost        | Notes                                  |
//! |-------------|-------------|----------------------------------------|
//! | BruteForce  | O(n²)       | default, node count is capped          |
//! | Bucketed    | ~O(n·k)     | uniform grid with cell = distance      |
//!
//! Both emit connections sorted by `(a, b)` and ascending neighbor lists.

use std::collections::HashMap;

use serde::Deserialize;

use crate::node::Node;

/// Node count above which [`TopologyStrategy::Auto`] switches to bucketing.
pub const AUTO_BUCKET_THRESHOLD: usize = 256;

/// One proximity edge. `a < b` always.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Connection {
    pub a: usize,
    pub b: usize,
    pub distance: f64,
}

/// Edge build strategy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopologyStrategy {
    #[default]
    BruteForce,
    Bucketed,
    /// Brute force below [`AUTO_BUCKET_THRESHOLD`] nodes, bucketed above.
    Auto,
}

/// Edge list plus the per-node neighbor view derived from it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Topology {
    pub connections: Vec<Connection>,
    /// `neighbors[i]` lists every node connected to `i`, ascending.
    pub neighbors: Vec<Vec<usize>>,
}

impl Topology {
    /// Build with the chosen strategy.
    pub fn build_with(
        nodes: &[Node],
        connection_distance: f64,
        strategy: TopologyStrategy,
    ) -> Self {
        match strategy {
            TopologyStrategy::BruteForce => Self::build(nodes, connection_distance),
            TopologyStrategy::Bucketed => Self::build_bucketed(nodes, connection_distance),
            TopologyStrategy::Auto if nodes.len() > AUTO_BUCKET_THRESHOLD => {
                Self::build_bucketed(nodes, connection_distance)
            }
            TopologyStrategy::Auto => Self::build(nodes, connection_distance),
        }
    }

    /// Brute-force all-pairs build.
    pub fn build(nodes: &[Node], connection_distance: f64) -> Self {
        let n = nodes.len();
        let mut connections = Vec::new();
        for i in 0..n {
            for j in (i + 1)..n {
                let distance = nodes[i].distance(&nodes[j]);
                if distance < connection_distance {
                    connections.push(Connection { a: i, b: j, distance });
                }
            }
        }
        Self::from_connections(n, connections)
    }

    /// Spatial-hash build. Observably identical to [`Topology::build`].
    pub fn build_bucketed(nodes: &[Node], connection_distance: f64) -> Self {
        let n = nodes.len();
        if !(connection_distance > 0.0) {
            return Self::from_connections(n, Vec::new());
        }

        let mut grid = SpatialGrid::new(connection_distance);
        grid.rebuild(nodes);

        let mut connections = Vec::new();
        for (i, node) in nodes.iter().enumerate() {
            for j in grid.candidates(node.x, node.y) {
                if j <= i {
                    continue;
                }
                let distance = node.distance(&nodes[j]);
                if distance < connection_distance {
                    connections.push(Connection { a: i, b: j, distance });
                }
            }
        }
        connections.sort_by(|l, r| (l.a, l.b).cmp(&(r.a, r.b)));
        Self::from_connections(n, connections)
    }

    /// Derive neighbor lists from connections sorted by `(a, b)`.
    fn from_connections(n: usize, connections: Vec<Connection>) -> Self {
        let mut neighbors = vec![Vec::new(); n];
        for c in &connections {
            neighbors[c.a].push(c.b);
            neighbors[c.b].push(c.a);
        }
        Self { connections, neighbors }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Neighbors of node `i` (empty for out-of-range indices).
    #[inline]
    pub fn neighbors_of(&self, i: usize) -> &[usize] {
        self.neighbors.get(i).map(|v| v.as_slice()).unwrap_or(&[])
    }
}

// ============================================================================
// Spatial grid
// ============================================================================

/// Grid cell coordinate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct CellKey {
    x: i64,
    y: i64,
}

impl CellKey {
    #[inline]
    fn from_pos(x: f64, y: f64, cell_size: f64) -> Self {
        Self {
            x: (x / cell_size).floor() as i64,
            y: (y / cell_size).floor() as i64,
        }
    }

    /// The 3×3 block centred on this cell.
    fn block(self) -> impl Iterator<Item = CellKey> {
        (-1..=1).flat_map(move |dx| {
            (-1..=1).map(move |dy| CellKey {
                x: self.x + dx,
                y: self.y + dy,
            })
        })
    }
}

/// Uniform hash grid over node positions. With cell size equal to the
/// connection distance, every partner of a node lies in its 3×3 block.
#[derive(Clone, Debug)]
struct SpatialGrid {
    cells: HashMap<CellKey, Vec<usize>>,
    cell_size: f64,
}

impl SpatialGrid {
    fn new(cell_size: f64) -> Self {
        Self {
            cells: HashMap::new(),
            cell_size,
        }
    }

    fn rebuild(&mut self, nodes: &[Node]) {
        self.cells.clear();
        for (idx, node) in nodes.iter().enumerate() {
            let key = CellKey::from_pos(node.x, node.y, self.cell_size);
            self.cells.entry(key).or_default().push(idx);
        }
    }

    fn candidates(&self, x: f64, y: f64) -> impl Iterator<Item = usize> + '_ {
        CellKey::from_pos(x, y, self.cell_size)
            .block()
            .filter_map(move |k| self.cells.get(&k))
            .flat_map(|v| v.iter().copied())
    }
}
