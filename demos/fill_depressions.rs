use anyhow::Result;
use ndarray::{Array2, array};
use sink_filler::{RasterGrid, RoutingMode, SEDIMENT_FILL_DEPTH, SinkFiller, TOPOGRAPHIC_ELEVATION};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let dem: Array2<f64> = array![
        [3.0, 3.0, 3.0, 7.0],
        [3.0, 2.0, 4.0, 2.0],
        [5.0, 6.0, 8.0, 0.0],
    ];
    let mut grid = RasterGrid::from_dem(&dem, 8.0)?;
    println!("Filling depressions flat on {dem}");
    let mut sf = SinkFiller::new(&mut grid, RoutingMode::D8, false, None)?;
    let remaining = sf.fill_pits()?;
    println!("now is {}", grid.field_as_array2(TOPOGRAPHIC_ELEVATION)?);
    println!("{remaining} depressions left");

    let dem: Array2<f64> = array![
        [10.0, 12.0, 10.0, 10.0],
        [12.0, 1.0, 10.0, 12.0],
        [10.0, 12.0, 10.0, 11.0],
    ];
    let mut grid = RasterGrid::from_dem(&dem, 8.0)?;
    println!("Filling depressions with a gradient on {dem}");
    let mut sf = SinkFiller::new(&mut grid, RoutingMode::D8, true, Some(0.01))?;
    sf.fill_pits()?;
    println!("now is {}", grid.field_as_array2(TOPOGRAPHIC_ELEVATION)?);
    println!("fill depth {}", grid.field_as_array2(SEDIMENT_FILL_DEPTH)?);

    Ok(())
}
