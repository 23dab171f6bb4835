use anyhow::Result;
use ndarray::{Array2, array};
use sink_filler::{FLOW_RECEIVER_NODE, FlowRouter, RasterGrid, RoutingMode};

fn main() -> Result<()> {
    let dem: Array2<f64> = array![
        [2.0, 3.0, 3.0, 7.0],
        [3.0, 5.0, 4.0, 2.0],
        [5.0, 6.0, 8.0, 0.0],
    ];
    let mut grid = RasterGrid::from_dem(&dem, 8.0)?;
    for mode in [RoutingMode::D8, RoutingMode::D4] {
        println!("Routing {mode:?} on {dem}");
        let directions = FlowRouter::new(mode).route_flow(&mut grid)?;
        println!("receivers are {}", grid.field_as_array2(FLOW_RECEIVER_NODE)?);
        println!("core sinks {:?}", directions.core_sinks(&grid));
    }

    Ok(())
}
