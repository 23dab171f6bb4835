//! Filling depressions so that every core node drains.

use std::collections::{BinaryHeap, HashMap, HashSet};

use ndarray::{Array1, Zip};
use tracing::{debug, info, warn};

use crate::drainage::{directions_changed, exterior_receiver};
use crate::error::{Result, SinkFillError};
use crate::grid::{Grid, RoutingMode};
use crate::lakes::{GridCell, Lake, LakeMap};
use crate::margins::{exterior_margin, interior_margin};
use crate::routing::FlowRouter;
use crate::{SEDIMENT_FILL_DEPTH, TOPOGRAPHIC_ELEVATION};

/// Gradient put on a lake surface when none is given: small enough to leave the regional
/// grade alone.
pub const DEFAULT_FILL_SLOPE: f64 = 1.0e-5;

/// How far a lake node is from its outlet when grading the lake surface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SlopeDistance {
    /// Straight-line distance in grid coordinates.
    Euclidean,
    /// Shortest path from the outlet that stays inside the lake.
    FlowPath,
    /// Straight-line distance, switching a lake to [`SlopeDistance::FlowPath`] when straight
    /// lines leave any of its nodes without a lower neighbor.
    #[default]
    EuclideanWithFallback,
}

fn check_slope(slope: f64) -> Result<()> {
    if slope > 0.0 && slope.is_finite() {
        Ok(())
    } else {
        Err(SinkFillError::InvalidInput(format!(
            "fill slope must be positive and finite, got {slope}"
        )))
    }
}

/// Raises `nodes` to `elevations[outlet] + slope * distance`.
fn grade(elevations: &mut Array1<f64>, nodes: &[usize], distances: &[f64], outlet: usize, slope: f64) {
    let outlet_z = elevations[outlet];
    for (&node, &d) in nodes.iter().zip(distances) {
        elevations[node] = outlet_z + slope * d;
    }
}

/// Fills the depressions of a grid's `topographic__elevation` in place.
///
/// Each depression is either filled flat to its outlet's elevation or, with `apply_slope`,
/// graded up away from the outlet so that a steepest-descent router finds a way out of every
/// node. One call does one pass: when [`SinkFiller::fill_pits`] reports depressions left over
/// (only likely with odd shapes graded along straight lines), call it again.
///
/// # Example
///
/// ```
/// use ndarray::array;
/// use sink_filler::{RasterGrid, RoutingMode, SinkFiller, TOPOGRAPHIC_ELEVATION};
///
/// let mut grid = RasterGrid::from_dem(&array![
///     [3.0, 3.0, 3.0, 3.0],
///     [3.0, 1.0, 2.0, 3.0],
///     [3.0, 3.0, 3.0, 3.0],
/// ], 1.0).unwrap();
/// let mut filler = SinkFiller::new(&mut grid, RoutingMode::D8, false, None).unwrap();
/// assert_eq!(filler.fill_pits().unwrap(), 0);
/// let dem = grid.field_as_array2(TOPOGRAPHIC_ELEVATION).unwrap();
/// assert_eq!(dem, array![[3.0, 3.0, 3.0, 3.0], [3.0, 3.0, 3.0, 3.0], [3.0, 3.0, 3.0, 3.0]]);
/// ```
pub struct SinkFiller<'a, G: ?Sized> {
    grid: &'a mut G,
    router: FlowRouter,
    apply_slope: bool,
    fill_slope: f64,
    distance: SlopeDistance,
}

impl<'a, G: Grid + Sync + ?Sized> SinkFiller<'a, G> {
    /// Sets up a filler and gives the grid a zeroed `sediment_fill__depth` field.
    ///
    /// `fill_slope` defaults to [`DEFAULT_FILL_SLOPE`] and is only used with `apply_slope`.
    pub fn new(
        grid: &'a mut G,
        routing: RoutingMode,
        apply_slope: bool,
        fill_slope: Option<f64>,
    ) -> Result<Self> {
        let fill_slope = fill_slope.unwrap_or(DEFAULT_FILL_SLOPE);
        check_slope(fill_slope)?;
        grid.add_zeros(SEDIMENT_FILL_DEPTH)?;
        Ok(SinkFiller {
            grid,
            router: FlowRouter::new(routing),
            apply_slope,
            fill_slope,
            distance: SlopeDistance::default(),
        })
    }

    pub fn with_distance(mut self, distance: SlopeDistance) -> Self {
        self.distance = distance;
        self
    }

    pub fn grid(&self) -> &G {
        &*self.grid
    }

    pub fn routing(&self) -> RoutingMode {
        self.router.method()
    }

    pub fn fill_slope(&self) -> f64 {
        self.fill_slope
    }

    pub fn distance(&self) -> SlopeDistance {
        self.distance
    }

    pub fn exterior_margin(&self, lake_nodes: &[usize]) -> Result<Vec<usize>> {
        exterior_margin(&*self.grid, lake_nodes, self.routing())
    }

    pub fn interior_margin(&self, lake_nodes: &[usize], exterior: &[usize]) -> Result<Vec<usize>> {
        interior_margin(&*self.grid, lake_nodes, exterior, self.routing())
    }

    pub fn drainage_directions_change(
        &self,
        lake_nodes: &[usize],
        old: &Array1<f64>,
        new: &Array1<f64>,
    ) -> Result<bool> {
        directions_changed(&*self.grid, self.routing(), lake_nodes, old, new)
    }

    /// Depressions in the grid's current elevations.
    pub fn map_depressions(&self) -> Result<LakeMap> {
        let elevations = self.grid.field(TOPOGRAPHIC_ELEVATION)?;
        self.router.map_depressions(&*self.grid, elevations)
    }

    /// Grades one lake of `lake_map` up from `outlet` at `slope`.
    ///
    /// Returns a copy of the current elevation field in which every node labelled `lake_code`
    /// sits at `elevation[outlet] + slope * distance`, and the ids of those nodes. Everything
    /// else is left as it was, and calling it twice gives the same answer.
    pub fn add_slopes(
        &self,
        lake_map: &LakeMap,
        slope: f64,
        outlet: usize,
        lake_code: usize,
    ) -> Result<(Array1<f64>, Vec<usize>)> {
        check_slope(slope)?;
        let n = self.grid.number_of_nodes();
        if outlet >= n {
            return Err(SinkFillError::InvalidInput(format!(
                "outlet {outlet} is outside a grid of {n} nodes"
            )));
        }
        if lake_map.labels().len() != n {
            return Err(SinkFillError::InvalidInput(format!(
                "lake map covers {} nodes but the grid has {n}",
                lake_map.labels().len()
            )));
        }
        let mut elevations = self.grid.field(TOPOGRAPHIC_ELEVATION)?.clone();
        let nodes = lake_map.nodes_with_code(lake_code);
        let metric = match self.distance {
            SlopeDistance::FlowPath => SlopeDistance::FlowPath,
            _ => SlopeDistance::Euclidean,
        };
        let distances = self.distances(&nodes, outlet, metric);
        grade(&mut elevations, &nodes, &distances, outlet, slope);
        Ok((elevations, nodes))
    }

    /// Fills every depression in one pass.
    ///
    /// Returns how many depressions are left afterwards, which is zero unless a graded lake
    /// could not be made to drain in one go. With `apply_slope` every core sink that is not part
    /// of a remaining depression counts too. `sediment_fill__depth` is set to how much each node
    /// was raised by this call.
    pub fn fill_pits(&mut self) -> Result<usize> {
        let original = self.grid.field(TOPOGRAPHIC_ELEVATION)?.clone();
        if let Some(node) = original.iter().position(|z| !z.is_finite()) {
            return Err(SinkFillError::InvalidInput(format!(
                "elevation at node {node} is not finite"
            )));
        }

        let sinks = self
            .router
            .steepest_descent(&*self.grid, &original)?
            .core_sinks(&*self.grid);
        if sinks.is_empty() {
            debug!("no core sinks, nothing to fill");
            self.grid.add_zeros(SEDIMENT_FILL_DEPTH)?;
            return Ok(0);
        }

        let lake_map = self.router.map_depressions(&*self.grid, &original)?;
        if let Some(lake) = lake_map.lakes().iter().find(|lake| lake.outlet.is_none()) {
            return Err(SinkFillError::DegenerateLake { code: lake.code });
        }
        debug!(sinks = sinks.len(), lakes = lake_map.len(), "mapped depressions");

        let mut elevations = original.clone();
        for lake in lake_map.lakes() {
            let Some(outlet) = lake.outlet else { continue };
            if self.apply_slope {
                self.fill_graded(&mut elevations, lake, outlet)?;
            } else {
                debug!(lake = lake.code, outlet, nodes = lake.nodes.len(), "filling flat");
                let outlet_z = elevations[outlet];
                for &node in &lake.nodes {
                    elevations[node] = outlet_z;
                }
            }
        }

        let mut depth = Array1::<f64>::zeros(original.len());
        Zip::from(&mut depth)
            .and(&elevations)
            .and(&original)
            .par_for_each(|d, &new, &old| *d = new - old);

        let remapped = self.router.map_depressions(&*self.grid, &elevations)?;
        let residual_sinks = self
            .router
            .steepest_descent(&*self.grid, &elevations)?
            .core_sinks(&*self.grid);
        // flat fills leave flats behind by design, graded ones must not
        let stranded = residual_sinks
            .iter()
            .filter(|&&node| remapped.code_at(node).is_none())
            .count();
        let remaining = if self.apply_slope {
            remapped.len() + stranded
        } else {
            remapped.len()
        };

        *self.grid.field_mut(TOPOGRAPHIC_ELEVATION)? = elevations;
        self.grid.add_field(SEDIMENT_FILL_DEPTH, depth)?;

        info!(
            lakes = lake_map.len(),
            remaining,
            residual_sinks = residual_sinks.len(),
            "filled depressions"
        );
        if remaining > 0 {
            warn!(
                lakes = remapped.len(),
                stranded, "depressions left after filling, run fill_pits again"
            );
        }
        Ok(remaining)
    }

    /// Grades one lake, falling back to flow-path distances or a gentler slope when the
    /// straight-line result would not drain through `outlet`.
    fn fill_graded(&self, elevations: &mut Array1<f64>, lake: &Lake, outlet: usize) -> Result<()> {
        let grid = &*self.grid;
        let mode = self.routing();
        let outlet_z = elevations[outlet];

        let mut flat = elevations.clone();
        for &node in &lake.nodes {
            flat[node] = outlet_z;
        }

        let mut metric = match self.distance {
            SlopeDistance::FlowPath => SlopeDistance::FlowPath,
            _ => SlopeDistance::Euclidean,
        };
        let mut distances = self.distances(&lake.nodes, outlet, metric);
        let mut graded = flat.clone();
        grade(&mut graded, &lake.nodes, &distances, outlet, self.fill_slope);

        if self.distance == SlopeDistance::EuclideanWithFallback {
            let trapped = self.trapped_nodes(&lake.nodes, &graded);
            if !trapped.is_empty() {
                debug!(
                    lake = lake.code,
                    trapped = trapped.len(),
                    "straight-line grading traps nodes, grading along flow paths"
                );
                metric = SlopeDistance::FlowPath;
                distances = self.distances(&lake.nodes, outlet, metric);
                graded = flat.clone();
                grade(&mut graded, &lake.nodes, &distances, outlet, self.fill_slope);
            }
        }

        // nodes next to the outlet are supposed to start draining into it
        let exterior = exterior_margin(grid, &lake.nodes, mode)?;
        let near_outlet: HashSet<usize> = grid.neighbors(outlet, mode).into_iter().collect();
        let watched: Vec<usize> = interior_margin(grid, &lake.nodes, &exterior, mode)?
            .into_iter()
            .filter(|node| !near_outlet.contains(node))
            .collect();

        if !watched.is_empty() && directions_changed(grid, mode, &watched, &flat, &graded)? {
            let members: HashSet<usize> = lake.nodes.iter().copied().collect();
            let distance_of: HashMap<usize, f64> =
                lake.nodes.iter().copied().zip(distances.iter().copied()).collect();
            let cap = watched
                .iter()
                .filter_map(|&node| {
                    let lowest = grid
                        .neighbors(node, mode)
                        .into_iter()
                        .filter(|nb| !members.contains(nb) && !grid.is_closed(*nb))
                        .map(|nb| elevations[nb])
                        .filter(|&z| z > outlet_z)
                        .fold(f64::INFINITY, f64::min);
                    let d = distance_of.get(&node).copied()?;
                    (lowest.is_finite() && d > 0.0).then(|| 0.5 * (lowest - outlet_z) / d)
                })
                .fold(f64::INFINITY, f64::min);
            if cap < self.fill_slope {
                debug!(
                    lake = lake.code,
                    slope = cap,
                    "graded lake leaks past its outlet, easing the slope"
                );
                graded = flat.clone();
                grade(&mut graded, &lake.nodes, &distances, outlet, cap);
            }
            // spilling over another node at the outlet's own elevation is still a way out
            let past_spill_level = watched.iter().any(|&node| {
                exterior_receiver(grid, mode, &members, &graded, node)
                    .is_some_and(|r| elevations[r] > outlet_z)
            });
            if past_spill_level {
                warn!(lake = lake.code, outlet, "graded lake still drains past its outlet");
            }
        }

        debug!(lake = lake.code, outlet, ?metric, nodes = lake.nodes.len(), "graded lake");
        for &node in &lake.nodes {
            elevations[node] = graded[node];
        }
        Ok(())
    }

    /// Distance of each of `nodes` from `outlet`, in the same order.
    fn distances(&self, nodes: &[usize], outlet: usize, metric: SlopeDistance) -> Vec<f64> {
        let grid = &*self.grid;
        match metric {
            SlopeDistance::FlowPath => self.flow_path_distances(nodes, outlet),
            _ => nodes.iter().map(|&node| grid.distance(node, outlet)).collect(),
        }
    }

    /// Dijkstra from the outlet through lake nodes only. A node the search cannot reach gets
    /// its straight-line distance.
    fn flow_path_distances(&self, nodes: &[usize], outlet: usize) -> Vec<f64> {
        let grid = &*self.grid;
        let mode = self.routing();
        let index: HashMap<usize, usize> = nodes.iter().enumerate().map(|(i, &n)| (n, i)).collect();
        let mut dist = vec![f64::INFINITY; nodes.len()];
        let mut minheap = BinaryHeap::new();
        minheap.push(GridCell {
            node: outlet,
            priority: 0.0,
        });
        while let Some(cell) = minheap.pop() {
            if let Some(&i) = index.get(&cell.node) {
                if cell.priority > dist[i] {
                    continue;
                }
            }
            for nb in grid.neighbors(cell.node, mode) {
                if let Some(&i) = index.get(&nb) {
                    let d = cell.priority + grid.distance(cell.node, nb);
                    if d < dist[i] {
                        dist[i] = d;
                        minheap.push(GridCell { node: nb, priority: d });
                    }
                }
            }
        }
        for (d, &node) in dist.iter_mut().zip(nodes) {
            if d.is_infinite() {
                *d = grid.distance(node, outlet);
            }
        }
        dist
    }

    /// Lake nodes with no strictly lower open neighbor.
    fn trapped_nodes(&self, nodes: &[usize], elevations: &Array1<f64>) -> Vec<usize> {
        let grid = &*self.grid;
        nodes
            .iter()
            .copied()
            .filter(|&node| {
                !grid
                    .neighbors(node, self.routing())
                    .into_iter()
                    .any(|nb| !grid.is_closed(nb) && elevations[nb] < elevations[node])
            })
            .collect()
    }
}
