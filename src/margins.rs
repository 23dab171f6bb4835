//! Exterior and interior margins of a depression.

use std::collections::{BTreeSet, HashSet};

use crate::error::{Result, SinkFillError};
use crate::grid::{Grid, RoutingMode};

fn check_lake<G: Grid + ?Sized>(grid: &G, lake_nodes: &[usize]) -> Result<HashSet<usize>> {
    if lake_nodes.is_empty() {
        return Err(SinkFillError::InvalidInput(
            "lake node set is empty".to_string(),
        ));
    }
    let n = grid.number_of_nodes();
    if let Some(bad) = lake_nodes.iter().find(|&&node| node >= n) {
        return Err(SinkFillError::InvalidInput(format!(
            "lake node {bad} is outside a grid of {n} nodes"
        )));
    }
    Ok(lake_nodes.iter().copied().collect())
}

/// All nodes that neighbor the lake but are not part of it, sorted and without duplicates.
///
/// # Example
///
/// ```
/// use sink_filler::{RasterGrid, RoutingMode, exterior_margin};
///
/// let grid = RasterGrid::new(5, 5, 1.0).unwrap();
/// let margin = exterior_margin(&grid, &[12], RoutingMode::D4).unwrap();
/// assert_eq!(margin, vec![7, 11, 13, 17]);
/// ```
pub fn exterior_margin<G: Grid + ?Sized>(
    grid: &G,
    lake_nodes: &[usize],
    mode: RoutingMode,
) -> Result<Vec<usize>> {
    let lake = check_lake(grid, lake_nodes)?;
    let margin: BTreeSet<usize> = lake_nodes
        .iter()
        .flat_map(|&node| grid.neighbors(node, mode))
        .filter(|nb| !lake.contains(nb))
        .collect();
    Ok(margin.into_iter().collect())
}

/// The lake nodes that touch `exterior_margin`, sorted.
pub fn interior_margin<G: Grid + ?Sized>(
    grid: &G,
    lake_nodes: &[usize],
    exterior_margin: &[usize],
    mode: RoutingMode,
) -> Result<Vec<usize>> {
    let lake = check_lake(grid, lake_nodes)?;
    let exterior: HashSet<usize> = exterior_margin.iter().copied().collect();
    let margin: BTreeSet<usize> = lake
        .into_iter()
        .filter(|&node| grid.neighbors(node, mode).iter().any(|nb| exterior.contains(nb)))
        .collect();
    Ok(margin.into_iter().collect())
}
