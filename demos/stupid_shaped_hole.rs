use anyhow::Result;
use ndarray::Array2;
use sink_filler::{
    FlowRouter, RasterGrid, RoutingMode, SinkFiller, SlopeDistance, TOPOGRAPHIC_ELEVATION,
};
use tracing_subscriber::EnvFilter;

// a tilted plane with a hook shaped hole whose spill point sits at the tip of the hook
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let hook = [18, 19, 20, 21, 29, 37, 36, 35, 34];
    for distance in [SlopeDistance::Euclidean, SlopeDistance::EuclideanWithFallback] {
        let mut dem = Array2::from_shape_fn((8, 8), |(_, c)| 10.0 + c as f64);
        for node in hook {
            dem[(node / 8, node % 8)] = 0.0;
        }
        dem[(2, 1)] = 10.5;

        let mut grid = RasterGrid::from_dem(&dem, 1.0)?;
        let mut sf = SinkFiller::new(&mut grid, RoutingMode::D8, true, Some(0.01))?
            .with_distance(distance);
        sf.fill_pits()?;
        let sinks = FlowRouter::new(RoutingMode::D8)
            .route_flow(&mut grid)?
            .core_sinks(&grid);
        println!("{distance:?} fill gives {}", grid.field_as_array2(TOPOGRAPHIC_ELEVATION)?);
        println!("sinks left {sinks:?}");
    }

    Ok(())
}
