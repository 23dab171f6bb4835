//! Detects whether an elevation edit changed where a lake drains to.

use std::collections::HashSet;

use ndarray::Array1;

use crate::error::{Result, SinkFillError};
use crate::grid::{Grid, RoutingMode, check_node_values};

/// The neighbor outside `lake` that `node` drops to most steeply, or `None` if every outside
/// neighbor is at or above it. Equal drops go to the first neighbor in enumeration order.
pub fn exterior_receiver<G: Grid + ?Sized>(
    grid: &G,
    mode: RoutingMode,
    lake: &HashSet<usize>,
    elevations: &Array1<f64>,
    node: usize,
) -> Option<usize> {
    let z = elevations[node];
    let mut best: Option<(usize, f64)> = None;
    for nb in grid.neighbors(node, mode) {
        if lake.contains(&nb) || grid.is_closed(nb) {
            continue;
        }
        let drop = z - elevations[nb];
        if drop > 0.0 && best.is_none_or(|(_, d)| drop > d) {
            best = Some((nb, drop));
        }
    }
    best.map(|(nb, _)| nb)
}

/// True if any node in `lake_nodes` drains across the lake boundary to a different neighbor
/// under `new` than under `old`, gaining or losing an exterior receiver included.
///
/// Flow between lake nodes is ignored: re-grading a lake interior is expected to reshuffle it.
///
/// # Example
///
/// ```
/// use ndarray::Array1;
/// use sink_filler::{RasterGrid, RoutingMode, directions_changed};
///
/// let grid = RasterGrid::new(7, 7, 1.0).unwrap();
/// let mut old = Array1::<f64>::ones(49);
/// old[22] = 0.0;
/// old[23] = 0.0;
/// let mut new = old.clone();
/// new[23] = 1.2;
/// assert!(directions_changed(&grid, RoutingMode::D8, &[22, 23], &old, &new).unwrap());
/// ```
pub fn directions_changed<G: Grid + ?Sized>(
    grid: &G,
    mode: RoutingMode,
    lake_nodes: &[usize],
    old: &Array1<f64>,
    new: &Array1<f64>,
) -> Result<bool> {
    check_node_values(grid, "old elevations", old)?;
    check_node_values(grid, "new elevations", new)?;
    let n = grid.number_of_nodes();
    if let Some(bad) = lake_nodes.iter().find(|&&node| node >= n) {
        return Err(SinkFillError::InvalidInput(format!(
            "lake node {bad} is outside a grid of {n} nodes"
        )));
    }
    let lake: HashSet<usize> = lake_nodes.iter().copied().collect();
    Ok(lake_nodes.iter().any(|&node| {
        exterior_receiver(grid, mode, &lake, old, node)
            != exterior_receiver(grid, mode, &lake, new, node)
    }))
}
