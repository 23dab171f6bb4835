//! # Sink-filler
//!
//! `sink-filler` removes closed depressions (pits, sinks, lakes) from an elevation surface so
//! that a steepest-descent flow router finds a downhill path out of every core node. It is the
//! kind of conditioning a landscape-evolution or hydrology model runs before routing flow.
//!
//! A depression is found with a priority flood from the open boundaries, its outlet is the
//! lowest node around its edge, and it is then either filled flat to the outlet's elevation or
//! graded up away from the outlet by a tiny slope so that water on the filled surface still
//! knows which way to go.
//!
//! ## Example
//!
//! ```
//! use ndarray::array;
//! use sink_filler::{FlowRouter, Grid, RasterGrid, RoutingMode, SinkFiller};
//!
//! let mut grid = RasterGrid::from_dem(&array![
//!     [10.0, 12.0, 10.0, 10.0],
//!     [12.0,  1.0,  9.0, 12.0],
//!     [10.0, 12.0, 10.0, 11.0],
//! ], 8.0).expect("Failed to create grid");
//!
//! let mut filler = SinkFiller::new(&mut grid, RoutingMode::D8, true, None).unwrap();
//! let remaining = filler.fill_pits().unwrap();
//! assert_eq!(remaining, 0);
//!
//! let directions = FlowRouter::new(RoutingMode::D8).route_flow(&mut grid).unwrap();
//! assert!(directions.core_sinks(&grid).is_empty());
//! ```

mod drainage;
mod error;
mod filler;
mod grid;
mod lakes;
mod margins;
mod routing;

pub use drainage::{directions_changed, exterior_receiver};
pub use error::{Result, SinkFillError};
pub use filler::{DEFAULT_FILL_SLOPE, SinkFiller, SlopeDistance};
pub use grid::{Grid, NodeStatus, RasterGrid, RoutingMode};
pub use lakes::{Lake, LakeMap, flood_levels, map_depressions};
pub use margins::{exterior_margin, interior_margin};
pub use routing::{FlowDirections, FlowRouter};

/// Node elevations.
pub const TOPOGRAPHIC_ELEVATION: &str = "topographic__elevation";
/// How much [`SinkFiller::fill_pits`] raised each node.
pub const SEDIMENT_FILL_DEPTH: &str = "sediment_fill__depth";
/// Receiver of each node, its own id when it has none.
pub const FLOW_RECEIVER_NODE: &str = "flow__receiver_node";
/// 1.0 where a node has no downhill neighbor.
pub const FLOW_SINK_FLAG: &str = "flow__sink_flag";
