use std::collections::HashMap;
use std::str::FromStr;

use ndarray::{Array1, Array2};

use crate::error::{Result, SinkFillError};

/// Which neighbors water is allowed to move to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum RoutingMode {
    /// Orthogonal neighbors only.
    D4,
    /// Orthogonal plus diagonal neighbors.
    #[default]
    D8,
}

impl RoutingMode {
    pub fn max_neighbors(self) -> usize {
        match self {
            RoutingMode::D4 => 4,
            RoutingMode::D8 => 8,
        }
    }
}

impl FromStr for RoutingMode {
    type Err = SinkFillError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "D4" => Ok(RoutingMode::D4),
            "D8" => Ok(RoutingMode::D8),
            other => Err(SinkFillError::InvalidInput(format!(
                "unknown routing method `{other}`, expected D4 or D8"
            ))),
        }
    }
}

/// Boundary classification of a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeStatus {
    /// Interior node, elevation free to change, flow must leave it.
    Core,
    /// Open boundary: fixed elevation, water leaves the grid here.
    FixedValue,
    /// Closed boundary: nothing flows into or through it.
    Closed,
}

/// What the filler needs from a grid: topology, coordinates, node status and named node fields.
///
/// Neighbor lists must come back in a fixed order, every tie-break in the crate is "first
/// neighbor wins".
pub trait Grid {
    fn number_of_nodes(&self) -> usize;

    /// `(x, y)` of a node.
    fn node_xy(&self, node: usize) -> (f64, f64);

    fn status(&self, node: usize) -> NodeStatus;

    /// Neighbors of `node` under `mode`, in the grid's fixed enumeration order.
    fn neighbors(&self, node: usize, mode: RoutingMode) -> Vec<usize>;

    /// Fails with [`SinkFillError::MissingField`] if the grid carries no such field.
    fn field(&self, name: &str) -> Result<&Array1<f64>>;

    fn field_mut(&mut self, name: &str) -> Result<&mut Array1<f64>>;

    /// Adds a field, replacing any existing field of the same name.
    fn add_field(&mut self, name: &str, values: Array1<f64>) -> Result<()>;

    fn is_core(&self, node: usize) -> bool {
        self.status(node) == NodeStatus::Core
    }

    fn is_closed(&self, node: usize) -> bool {
        self.status(node) == NodeStatus::Closed
    }

    fn core_nodes(&self) -> Vec<usize> {
        (0..self.number_of_nodes()).filter(|&n| self.is_core(n)).collect()
    }

    /// Straight-line distance between two nodes.
    fn distance(&self, a: usize, b: usize) -> f64 {
        let (xa, ya) = self.node_xy(a);
        let (xb, yb) = self.node_xy(b);
        (xa - xb).hypot(ya - yb)
    }

    fn has_field(&self, name: &str) -> bool {
        self.field(name).is_ok()
    }

    fn add_zeros(&mut self, name: &str) -> Result<()> {
        let n = self.number_of_nodes();
        self.add_field(name, Array1::zeros(n))
    }
}

// neighbor offsets: E, N, W, S, NE, NW, SW, SE
const DX: [isize; 8] = [1, 0, -1, 0, 1, -1, -1, 1];
const DY: [isize; 8] = [0, 1, 0, -1, 1, 1, -1, -1];

/// Regular raster of square cells.
///
/// Fails with [`SinkFillError::InvalidInput`] unless `values` holds one entry per node.
pub(crate) fn check_node_values<G: Grid + ?Sized>(
    grid: &G,
    what: &str,
    values: &Array1<f64>,
) -> Result<()> {
    let n = grid.number_of_nodes();
    if values.len() != n {
        return Err(SinkFillError::InvalidInput(format!(
            "{what} has {} values but the grid has {n} nodes",
            values.len()
        )));
    }
    Ok(())
}

/// Node `id = row * ncols + col`, at `x = col * spacing`, `y = row * spacing`, so row 0 is the
/// bottom of the grid. Perimeter nodes start out as [`NodeStatus::FixedValue`], everything else
/// is [`NodeStatus::Core`].
#[derive(Clone, Debug)]
pub struct RasterGrid {
    nrows: usize,
    ncols: usize,
    spacing: f64,
    status: Vec<NodeStatus>,
    fields: HashMap<String, Array1<f64>>,
}

impl RasterGrid {
    pub fn new(nrows: usize, ncols: usize, spacing: f64) -> Result<Self> {
        if nrows == 0 || ncols == 0 {
            return Err(SinkFillError::InvalidInput(format!(
                "a raster needs at least one row and column, got {nrows}x{ncols}"
            )));
        }
        if !(spacing > 0.0 && spacing.is_finite()) {
            return Err(SinkFillError::InvalidInput(format!(
                "node spacing must be positive, got {spacing}"
            )));
        }
        let status = (0..nrows * ncols)
            .map(|node| {
                let (row, col) = (node / ncols, node % ncols);
                if row == 0 || col == 0 || row == nrows - 1 || col == ncols - 1 {
                    NodeStatus::FixedValue
                } else {
                    NodeStatus::Core
                }
            })
            .collect();
        Ok(RasterGrid {
            nrows,
            ncols,
            spacing,
            status,
            fields: HashMap::new(),
        })
    }

    /// Builds a grid from a DEM and stores it as `topographic__elevation`.
    ///
    /// Row `r` of `dem` becomes grid row `r`, i.e. the first array row sits at `y = 0`.
    ///
    /// # Example
    ///
    /// ```
    /// use ndarray::array;
    /// use sink_filler::{Grid, RasterGrid, TOPOGRAPHIC_ELEVATION};
    ///
    /// let grid = RasterGrid::from_dem(&array![[1.0, 2.0], [3.0, 4.0]], 10.0).unwrap();
    /// assert_eq!(grid.field(TOPOGRAPHIC_ELEVATION).unwrap()[2], 3.0);
    /// assert_eq!(grid.node_xy(3), (10.0, 10.0));
    /// ```
    pub fn from_dem(dem: &Array2<f64>, spacing: f64) -> Result<Self> {
        let mut grid = RasterGrid::new(dem.nrows(), dem.ncols(), spacing)?;
        grid.add_field(
            crate::TOPOGRAPHIC_ELEVATION,
            dem.iter().copied().collect::<Array1<f64>>(),
        )?;
        Ok(grid)
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.nrows, self.ncols)
    }

    pub fn spacing(&self) -> f64 {
        self.spacing
    }

    pub fn node_at(&self, row: usize, col: usize) -> Option<usize> {
        (row < self.nrows && col < self.ncols).then(|| row * self.ncols + col)
    }

    pub fn set_status(&mut self, node: usize, status: NodeStatus) -> Result<()> {
        match self.status.get_mut(node) {
            Some(s) => {
                *s = status;
                Ok(())
            }
            None => Err(SinkFillError::InvalidInput(format!(
                "node {node} is outside a grid of {} nodes",
                self.status.len()
            ))),
        }
    }

    /// Closes every perimeter node, leaving no open boundary at all.
    pub fn close_perimeter(&mut self) {
        for s in self.status.iter_mut().filter(|s| **s == NodeStatus::FixedValue) {
            *s = NodeStatus::Closed;
        }
    }

    /// A node field reshaped to `(nrows, ncols)`.
    pub fn field_as_array2(&self, name: &str) -> Result<Array2<f64>> {
        let values = self.field(name)?;
        Array2::from_shape_vec((self.nrows, self.ncols), values.to_vec())
            .map_err(|e| SinkFillError::InvalidInput(e.to_string()))
    }
}

impl Grid for RasterGrid {
    fn number_of_nodes(&self) -> usize {
        self.nrows * self.ncols
    }

    fn node_xy(&self, node: usize) -> (f64, f64) {
        let (row, col) = (node / self.ncols, node % self.ncols);
        (col as f64 * self.spacing, row as f64 * self.spacing)
    }

    fn status(&self, node: usize) -> NodeStatus {
        self.status[node]
    }

    fn neighbors(&self, node: usize, mode: RoutingMode) -> Vec<usize> {
        let (row, col) = ((node / self.ncols) as isize, (node % self.ncols) as isize);
        (0..mode.max_neighbors())
            .filter_map(|n| {
                let rn = row + DY[n];
                let cn = col + DX[n];
                if rn < 0 || cn < 0 || rn >= self.nrows as isize || cn >= self.ncols as isize {
                    None
                } else {
                    Some(rn as usize * self.ncols + cn as usize)
                }
            })
            .collect()
    }

    fn field(&self, name: &str) -> Result<&Array1<f64>> {
        self.fields
            .get(name)
            .ok_or_else(|| SinkFillError::MissingField(name.to_string()))
    }

    fn field_mut(&mut self, name: &str) -> Result<&mut Array1<f64>> {
        self.fields
            .get_mut(name)
            .ok_or_else(|| SinkFillError::MissingField(name.to_string()))
    }

    fn add_field(&mut self, name: &str, values: Array1<f64>) -> Result<()> {
        let expected = self.number_of_nodes();
        if values.len() != expected {
            return Err(SinkFillError::FieldSize {
                name: name.to_string(),
                expected,
                got: values.len(),
            });
        }
        self.fields.insert(name.to_string(), values);
        Ok(())
    }
}
