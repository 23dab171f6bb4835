//! Depression (lake) mapping.
//!
//! A priority flood is grown inward from every open boundary node, the way whitebox's
//! `fill_depressions` grows its outlet search: each node ends up with the lowest level at which
//! water sitting on it could escape the grid. Core nodes whose escape level is strictly above
//! their own elevation are under water; connected groups of them are lakes.
//!
//! A core node sitting exactly at a lake's spill level whose only way down is into that lake
//! belongs to the lake as well. Left out, it would be stranded on a flat once the lake is
//! filled.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, VecDeque};

use ndarray::Array1;

use crate::error::Result;
use crate::grid::{Grid, NodeStatus, RoutingMode, check_node_values};
use crate::margins::exterior_margin;

#[derive(PartialEq, Debug)]
pub(crate) struct GridCell {
    pub(crate) node: usize,
    pub(crate) priority: f64,
}

impl Eq for GridCell {}

impl PartialOrd for GridCell {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for GridCell {
    // reversed so BinaryHeap pops the lowest priority, then the lowest node id
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .priority
            .total_cmp(&self.priority)
            .then_with(|| other.node.cmp(&self.node))
    }
}

/// One depression.
#[derive(Clone, Debug, PartialEq)]
pub struct Lake {
    /// Id of the lowest member node, lowest id on ties.
    pub code: usize,
    /// Member nodes, sorted. Includes spill-level nodes that only drain into the lake.
    pub nodes: Vec<usize>,
    /// Lowest non-closed node on the exterior margin, lowest id on ties. It is either an open
    /// boundary node or has a way down that does not pass through the lake.
    pub outlet: Option<usize>,
    /// Elevation of the outlet, infinite when there is none.
    pub spill_elevation: f64,
}

/// Node to lake code labelling for one pass, plus the lakes themselves.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LakeMap {
    labels: Vec<Option<usize>>,
    lakes: Vec<Lake>,
}

impl LakeMap {
    /// A map of `number_of_nodes` nodes with nothing in a lake.
    pub fn empty(number_of_nodes: usize) -> Self {
        LakeMap {
            labels: vec![None; number_of_nodes],
            lakes: Vec::new(),
        }
    }

    /// Labels `nodes` with `code` and records them as a lake draining through `outlet`.
    ///
    /// Meant for building a map by hand; [`map_depressions`] is the normal way to get one.
    pub fn insert_lake(&mut self, code: usize, nodes: &[usize], outlet: Option<usize>, spill_elevation: f64) {
        let mut nodes = nodes.to_vec();
        nodes.sort_unstable();
        nodes.dedup();
        for &node in &nodes {
            self.labels[node] = Some(code);
        }
        self.lakes.push(Lake {
            code,
            nodes,
            outlet,
            spill_elevation,
        });
    }

    pub fn code_at(&self, node: usize) -> Option<usize> {
        self.labels.get(node).copied().flatten()
    }

    /// Every node labelled `code`, sorted.
    pub fn nodes_with_code(&self, code: usize) -> Vec<usize> {
        self.labels
            .iter()
            .enumerate()
            .filter_map(|(node, label)| (*label == Some(code)).then_some(node))
            .collect()
    }

    pub fn lakes(&self) -> &[Lake] {
        &self.lakes
    }

    pub fn len(&self) -> usize {
        self.lakes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lakes.is_empty()
    }

    pub fn labels(&self) -> &[Option<usize>] {
        &self.labels
    }
}

/// Escape level of every node: the lowest elevation water must rise to before it can reach an
/// open boundary. Closed nodes, and core nodes walled in by them, stay at infinity.
pub fn flood_levels<G: Grid + ?Sized>(
    grid: &G,
    elevations: &Array1<f64>,
    mode: RoutingMode,
) -> Result<Array1<f64>> {
    check_node_values(grid, "elevations", elevations)?;
    let n = grid.number_of_nodes();
    let mut level = Array1::from_elem(n, f64::INFINITY);
    let mut visited = vec![false; n];
    let mut minheap = BinaryHeap::new();

    for node in 0..n {
        if grid.status(node) == NodeStatus::FixedValue {
            level[node] = elevations[node];
            visited[node] = true;
            minheap.push(GridCell {
                node,
                priority: elevations[node],
            });
        }
    }

    while let Some(cell) = minheap.pop() {
        for nb in grid.neighbors(cell.node, mode) {
            if visited[nb] || grid.is_closed(nb) {
                continue;
            }
            visited[nb] = true;
            let z = elevations[nb].max(cell.priority);
            level[nb] = z;
            minheap.push(GridCell { node: nb, priority: z });
        }
    }
    Ok(level)
}

/// Finds every depression in `elevations` and where it spills.
///
/// # Example
///
/// ```
/// use ndarray::array;
/// use sink_filler::{Grid, RasterGrid, RoutingMode, TOPOGRAPHIC_ELEVATION, map_depressions};
///
/// let grid = RasterGrid::from_dem(&array![
///     [5.0, 5.0, 5.0, 5.0],
///     [5.0, 1.0, 3.0, 5.0],
///     [5.0, 5.0, 5.0, 5.0],
/// ], 1.0).unwrap();
/// let lakes = map_depressions(&grid, grid.field(TOPOGRAPHIC_ELEVATION).unwrap(), RoutingMode::D8).unwrap();
/// assert_eq!(lakes.len(), 1);
/// assert_eq!(lakes.lakes()[0].nodes, vec![5, 6]);
/// ```
pub fn map_depressions<G: Grid + ?Sized>(
    grid: &G,
    elevations: &Array1<f64>,
    mode: RoutingMode,
) -> Result<LakeMap> {
    let n = grid.number_of_nodes();
    let level = flood_levels(grid, elevations, mode)?;
    let flooded: Vec<bool> = (0..n)
        .map(|node| grid.is_core(node) && level[node] > elevations[node])
        .collect();
    // dry core nodes whose every way down ends in a lake flooded to their own elevation
    let stranded: Vec<bool> = (0..n)
        .map(|node| {
            let z = elevations[node];
            grid.is_core(node)
                && !flooded[node]
                && !grid.neighbors(node, mode).into_iter().any(|nb| {
                    !grid.is_closed(nb)
                        && elevations[nb] < z
                        && !(flooded[nb] && level[nb] == z)
                })
        })
        .collect();

    let mut lake_map = LakeMap::empty(n);
    let mut seen = vec![false; n];
    let mut queue = VecDeque::new();
    for start in 0..n {
        if !flooded[start] || seen[start] {
            continue;
        }
        seen[start] = true;
        queue.push_back(start);
        let mut nodes = Vec::new();
        while let Some(node) = queue.pop_front() {
            nodes.push(node);
            for nb in grid.neighbors(node, mode) {
                // a lake has one level throughout, so this also keeps separate lakes apart
                if (flooded[nb] || stranded[nb]) && !seen[nb] && level[nb] == level[node] {
                    seen[nb] = true;
                    queue.push_back(nb);
                }
            }
        }

        let code = nodes
            .iter()
            .copied()
            .min_by(|&a, &b| elevations[a].total_cmp(&elevations[b]).then(a.cmp(&b)))
            .unwrap_or(start);
        let outlet = exterior_margin(grid, &nodes, mode)?
            .into_iter()
            .filter(|&m| !grid.is_closed(m))
            .min_by(|&a, &b| elevations[a].total_cmp(&elevations[b]).then(a.cmp(&b)));
        let spill_elevation = outlet.map_or(f64::INFINITY, |o| elevations[o]);
        lake_map.insert_lake(code, &nodes, outlet, spill_elevation);
    }
    Ok(lake_map)
}
