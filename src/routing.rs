//! Steepest-descent (D8 / D4) flow routing.

use ndarray::Array1;
use rayon::prelude::*;

use crate::error::Result;
use crate::grid::{Grid, RoutingMode, check_node_values};
use crate::lakes::{LakeMap, map_depressions};
use crate::{FLOW_RECEIVER_NODE, FLOW_SINK_FLAG, TOPOGRAPHIC_ELEVATION};

/// Receiver and sink flag for every node.
#[derive(Clone, Debug, PartialEq)]
pub struct FlowDirections {
    /// Steepest-descent neighbor, `None` for sinks and boundary nodes.
    pub receivers: Vec<Option<usize>>,
    /// True where water has nowhere lower to go.
    pub sink_flags: Vec<bool>,
}

impl FlowDirections {
    /// Core nodes flagged as sinks.
    pub fn core_sinks<G: Grid + ?Sized>(&self, grid: &G) -> Vec<usize> {
        self.sink_flags
            .iter()
            .enumerate()
            .filter_map(|(node, &sink)| (sink && grid.is_core(node)).then_some(node))
            .collect()
    }
}

/// Routes flow to the steepest downhill neighbor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FlowRouter {
    method: RoutingMode,
}

impl FlowRouter {
    pub fn new(method: RoutingMode) -> Self {
        FlowRouter { method }
    }

    pub fn method(&self) -> RoutingMode {
        self.method
    }

    /// Receivers of `elevations` without touching the grid's fields.
    ///
    /// Only core nodes get a receiver; boundary nodes are where flow ends. The receiver is the
    /// neighbor with the largest positive gradient (drop over distance), the first in
    /// enumeration order on ties. Closed nodes never receive.
    pub fn steepest_descent<G: Grid + Sync + ?Sized>(
        &self,
        grid: &G,
        elevations: &Array1<f64>,
    ) -> Result<FlowDirections> {
        check_node_values(grid, "elevations", elevations)?;
        let method = self.method;
        let receivers: Vec<Option<usize>> = (0..grid.number_of_nodes())
            .into_par_iter()
            .map(|node| {
                if !grid.is_core(node) {
                    return None;
                }
                let z = elevations[node];
                let mut best: Option<(usize, f64)> = None;
                for nb in grid.neighbors(node, method) {
                    if grid.is_closed(nb) {
                        continue;
                    }
                    let gradient = (z - elevations[nb]) / grid.distance(node, nb);
                    if gradient > 0.0 && best.is_none_or(|(_, g)| gradient > g) {
                        best = Some((nb, gradient));
                    }
                }
                best.map(|(nb, _)| nb)
            })
            .collect();
        let sink_flags = receivers
            .iter()
            .enumerate()
            .map(|(node, r)| r.is_none() && !grid.is_closed(node))
            .collect();
        Ok(FlowDirections {
            receivers,
            sink_flags,
        })
    }

    /// Routes the grid's `topographic__elevation` and stores the result as
    /// `flow__receiver_node` (a node's own id when it has no receiver) and `flow__sink_flag`
    /// (1.0 for sinks).
    pub fn route_flow<G: Grid + Sync + ?Sized>(&self, grid: &mut G) -> Result<FlowDirections> {
        let elevations = grid.field(TOPOGRAPHIC_ELEVATION)?;
        let directions = self.steepest_descent(&*grid, elevations)?;
        let receiver_field: Array1<f64> = directions
            .receivers
            .iter()
            .enumerate()
            .map(|(node, r)| r.unwrap_or(node) as f64)
            .collect();
        let sink_field: Array1<f64> = directions
            .sink_flags
            .iter()
            .map(|&s| if s { 1.0 } else { 0.0 })
            .collect();
        grid.add_field(FLOW_RECEIVER_NODE, receiver_field)?;
        grid.add_field(FLOW_SINK_FLAG, sink_field)?;
        Ok(directions)
    }

    /// Lakes in `elevations` under this router's neighbor topology, with their outlets.
    pub fn map_depressions<G: Grid + ?Sized>(
        &self,
        grid: &G,
        elevations: &Array1<f64>,
    ) -> Result<LakeMap> {
        map_depressions(grid, elevations, self.method)
    }
}
