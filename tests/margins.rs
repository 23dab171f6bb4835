#[cfg(test)]
mod tests {
    use ndarray::Array1;
    use sink_filler::{
        Grid, RasterGrid, RoutingMode, SinkFillError, SinkFiller, TOPOGRAPHIC_ELEVATION,
        exterior_margin, interior_margin,
    };

    fn grid7() -> RasterGrid {
        let mut grid = RasterGrid::new(7, 7, 1.0).unwrap();
        grid.add_field(TOPOGRAPHIC_ELEVATION, Array1::ones(49)).unwrap();
        grid
    }

    #[test]
    fn test_get_lake_ext_margin() {
        let grid = grid7();
        let lake = [16, 17, 23, 24, 25, 30, 31, 32];
        let ext = exterior_margin(&grid, &lake, RoutingMode::D8).unwrap();
        assert_eq!(
            ext,
            vec![8, 9, 10, 11, 15, 18, 19, 22, 26, 29, 33, 36, 37, 38, 39, 40]
        );
    }

    #[test]
    fn test_ext_margin_ignores_order_and_duplicates() {
        let grid = grid7();
        let lake = [32, 16, 31, 24, 17, 25, 23, 30, 24, 16];
        let ext = exterior_margin(&grid, &lake, RoutingMode::D8).unwrap();
        assert_eq!(
            ext,
            vec![8, 9, 10, 11, 15, 18, 19, 22, 26, 29, 33, 36, 37, 38, 39, 40]
        );
    }

    #[test]
    fn test_ext_margin_d4() {
        let grid = grid7();
        let ext = exterior_margin(&grid, &[23, 24], RoutingMode::D4).unwrap();
        assert_eq!(ext, vec![16, 17, 22, 25, 30, 31]);
    }

    #[test]
    fn test_get_lake_int_margin() {
        let grid = grid7();
        let lake = [16, 17, 18, 23, 24, 25, 26, 30, 31, 32];
        let ext = [8, 9, 10, 11, 12, 15, 19, 20, 22, 27, 29, 33, 34, 36, 37, 38, 39, 40];
        let int = interior_margin(&grid, &lake, &ext, RoutingMode::D8).unwrap();
        assert_eq!(int, vec![16, 17, 18, 23, 25, 26, 30, 31, 32]);
    }

    #[test]
    fn test_margins_through_filler() {
        let mut grid = grid7();
        let filler = SinkFiller::new(&mut grid, RoutingMode::D8, false, None).unwrap();
        let lake = [16, 17, 18, 23, 24, 25, 30, 31, 32];
        let ext = filler.exterior_margin(&lake).unwrap();
        assert_eq!(ext.len(), 16);
        let int = filler.interior_margin(&lake, &ext).unwrap();
        // 24 is the only node completely surrounded by lake
        assert_eq!(int, vec![16, 17, 18, 23, 25, 30, 31, 32]);
    }

    #[test]
    fn test_margins_are_consistent() {
        let grid = RasterGrid::new(10, 10, 1.0).unwrap();
        let lake = [34, 35, 36, 44, 45, 46, 54, 55, 56, 65, 74];
        for mode in [RoutingMode::D8, RoutingMode::D4] {
            let ext = exterior_margin(&grid, &lake, mode).unwrap();
            let int = interior_margin(&grid, &lake, &ext, mode).unwrap();
            for &m in &ext {
                assert!(!lake.contains(&m));
                assert!(grid.neighbors(m, mode).iter().any(|nb| lake.contains(nb)));
            }
            for &i in &int {
                assert!(lake.contains(&i));
                assert!(grid.neighbors(i, mode).iter().any(|nb| ext.contains(nb)));
            }
        }
    }

    #[test]
    fn test_empty_lake_is_an_error() {
        let grid = grid7();
        assert!(matches!(
            exterior_margin(&grid, &[], RoutingMode::D8),
            Err(SinkFillError::InvalidInput(_))
        ));
        assert!(matches!(
            interior_margin(&grid, &[], &[1, 2], RoutingMode::D8),
            Err(SinkFillError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_out_of_range_lake_is_an_error() {
        let grid = grid7();
        assert!(matches!(
            exterior_margin(&grid, &[16, 49], RoutingMode::D4),
            Err(SinkFillError::InvalidInput(_))
        ));
    }
}
