#[cfg(test)]
mod tests {
    use ndarray::{Array1, array};
    use sink_filler::{
        FLOW_RECEIVER_NODE, FLOW_SINK_FLAG, FlowRouter, Grid, NodeStatus, RasterGrid, RoutingMode,
        SinkFillError, TOPOGRAPHIC_ELEVATION, flood_levels, map_depressions,
    };

    #[test]
    fn test_d8_finds_the_diagonal() {
        let mut grid = RasterGrid::from_dem(
            &array![
                [0.0, 9.0, 9.0],
                [9.0, 5.0, 9.0],
                [9.0, 9.0, 9.0],
            ],
            1.0,
        )
        .unwrap();
        let d8 = FlowRouter::new(RoutingMode::D8).route_flow(&mut grid).unwrap();
        assert_eq!(d8.receivers[4], Some(0));
        assert!(d8.core_sinks(&grid).is_empty());
        assert_eq!(grid.field(FLOW_RECEIVER_NODE).unwrap()[4], 0.0);
        assert_eq!(grid.field(FLOW_SINK_FLAG).unwrap()[4], 0.0);

        let d4 = FlowRouter::new(RoutingMode::D4).route_flow(&mut grid).unwrap();
        assert_eq!(d4.receivers[4], None);
        assert_eq!(d4.core_sinks(&grid), vec![4]);
        assert_eq!(grid.field(FLOW_RECEIVER_NODE).unwrap()[4], 4.0);
        assert_eq!(grid.field(FLOW_SINK_FLAG).unwrap()[4], 1.0);
    }

    #[test]
    fn test_steepest_gradient_not_biggest_drop() {
        // the diagonal drop is bigger, but spread over sqrt(2) it is gentler
        let grid = RasterGrid::from_dem(
            &array![
                [9.0, 9.0, 0.8],
                [9.0, 5.0, 2.0],
                [9.0, 9.0, 9.0],
            ],
            1.0,
        )
        .unwrap();
        let fr = FlowRouter::new(RoutingMode::D8);
        let directions = fr
            .steepest_descent(&grid, grid.field(TOPOGRAPHIC_ELEVATION).unwrap())
            .unwrap();
        assert_eq!(directions.receivers[4], Some(5));
    }

    #[test]
    fn test_ties_go_to_first_neighbor() {
        let grid = RasterGrid::from_dem(
            &array![
                [9.0, 1.0, 9.0],
                [1.0, 5.0, 1.0],
                [9.0, 1.0, 9.0],
            ],
            1.0,
        )
        .unwrap();
        let fr = FlowRouter::new(RoutingMode::D4);
        let directions = fr
            .steepest_descent(&grid, grid.field(TOPOGRAPHIC_ELEVATION).unwrap())
            .unwrap();
        // east comes first
        assert_eq!(directions.receivers[4], Some(5));
    }

    #[test]
    fn test_closed_nodes_never_receive() {
        let mut grid = RasterGrid::from_dem(
            &array![
                [9.0, 9.0, 9.0],
                [9.0, 5.0, 0.0],
                [9.0, 9.0, 4.0],
            ],
            1.0,
        )
        .unwrap();
        grid.set_status(5, NodeStatus::Closed).unwrap();
        let fr = FlowRouter::new(RoutingMode::D8);
        let directions = fr
            .steepest_descent(&grid, grid.field(TOPOGRAPHIC_ELEVATION).unwrap())
            .unwrap();
        assert_eq!(directions.receivers[4], Some(8));
        assert!(!directions.sink_flags[5]);
    }

    #[test]
    fn test_map_two_lakes() {
        let grid = RasterGrid::from_dem(
            &array![
                [9.0, 9.0, 9.0, 9.0, 9.0, 9.0, 9.0],
                [9.0, 2.0, 3.0, 9.0, 6.0, 9.0, 9.0],
                [9.0, 3.0, 1.0, 9.0, 5.0, 9.0, 9.0],
                [9.0, 7.0, 9.0, 9.0, 9.0, 8.0, 9.0],
            ],
            1.0,
        )
        .unwrap();
        let z = grid.field(TOPOGRAPHIC_ELEVATION).unwrap();
        let lake_map = map_depressions(&grid, z, RoutingMode::D8).unwrap();
        assert_eq!(lake_map.len(), 2);

        let first = &lake_map.lakes()[0];
        assert_eq!(first.nodes, vec![8, 9, 15, 16]);
        assert_eq!(first.code, 16);
        assert_eq!(first.outlet, Some(22));
        assert_eq!(first.spill_elevation, 7.0);

        let second = &lake_map.lakes()[1];
        assert_eq!(second.nodes, vec![11, 18]);
        assert_eq!(second.code, 18);
        assert_eq!(second.outlet, Some(26));
        assert_eq!(second.spill_elevation, 8.0);

        assert_eq!(lake_map.code_at(9), Some(16));
        assert_eq!(lake_map.code_at(22), None);
        assert_eq!(lake_map.nodes_with_code(18), vec![11, 18]);

        let levels = flood_levels(&grid, z, RoutingMode::D8).unwrap();
        assert_eq!(levels[8], 7.0);
        assert_eq!(levels[11], 8.0);
        assert_eq!(levels[10], 9.0);
    }

    #[test]
    fn test_closed_outlet_leaves_no_spill() {
        let mut grid = RasterGrid::from_dem(
            &array![
                [9.0, 9.0, 9.0, 9.0],
                [9.0, 1.0, 2.0, 9.0],
                [9.0, 9.0, 9.0, 9.0],
            ],
            1.0,
        )
        .unwrap();
        grid.close_perimeter();
        let z = grid.field(TOPOGRAPHIC_ELEVATION).unwrap().clone();
        let lake_map = FlowRouter::new(RoutingMode::D8).map_depressions(&grid, &z).unwrap();
        // walled in, so the whole interior is one lake with nowhere to spill
        assert_eq!(lake_map.len(), 1);
        assert_eq!(lake_map.lakes()[0].nodes, vec![5, 6]);
        assert_eq!(lake_map.lakes()[0].outlet, None);
        assert!(lake_map.lakes()[0].spill_elevation.is_infinite());
        assert!(flood_levels(&grid, &z, RoutingMode::D8).unwrap()[5].is_infinite());
    }

    #[test]
    fn test_d4_splits_what_d8_joins() {
        let grid = RasterGrid::from_dem(
            &array![
                [5.0, 5.0, 5.0, 5.0, 5.0],
                [5.0, 1.0, 9.0, 9.0, 5.0],
                [5.0, 9.0, 2.0, 9.0, 5.0],
                [5.0, 9.0, 9.0, 9.0, 5.0],
                [5.0, 5.0, 5.0, 5.0, 5.0],
            ],
            1.0,
        )
        .unwrap();
        let z = grid.field(TOPOGRAPHIC_ELEVATION).unwrap();
        assert_eq!(map_depressions(&grid, z, RoutingMode::D8).unwrap().len(), 1);
        // the center is walled in by 9s on all four sides
        let d4 = map_depressions(&grid, z, RoutingMode::D4).unwrap();
        assert_eq!(d4.len(), 2);
        assert_eq!(d4.code_at(12), Some(12));
        assert_eq!(d4.lakes()[1].spill_elevation, 9.0);
    }

    #[test]
    fn test_flats_at_spill_level_are_not_lakes() {
        let grid = RasterGrid::from_dem(
            &array![
                [1.0, 1.0, 1.0, 1.0],
                [1.0, 1.0, 1.0, 1.0],
                [1.0, 1.0, 1.0, 1.0],
            ],
            1.0,
        )
        .unwrap();
        let z = grid.field(TOPOGRAPHIC_ELEVATION).unwrap();
        assert!(map_depressions(&grid, z, RoutingMode::D8).unwrap().is_empty());
    }

    /// 7x7 plane rising to the east with a pit at 24 whose only low neighbor is 17, a node on a
    /// flat at 3.5 that drains nowhere but the pit.
    fn flat_rim_grid() -> RasterGrid {
        let mut grid = RasterGrid::new(7, 7, 1.0).unwrap();
        let mut z: Array1<f64> = (0..49).map(|n| 1.0 + grid.node_xy(n).0).collect();
        let at = |row, col| grid.node_at(row, col).unwrap();
        z[at(3, 3)] = 0.0;
        for (row, col) in [(2, 2), (3, 2), (4, 2)] {
            z[at(row, col)] = 4.5;
        }
        for (row, col) in [(1, 2), (1, 3), (2, 3)] {
            z[at(row, col)] = 3.5;
        }
        grid.add_field(TOPOGRAPHIC_ELEVATION, z).unwrap();
        grid
    }

    #[test]
    fn test_lake_takes_in_flat_that_only_drains_into_it() {
        let grid = flat_rim_grid();
        let z = grid.field(TOPOGRAPHIC_ELEVATION).unwrap();

        let d8 = map_depressions(&grid, z, RoutingMode::D8).unwrap();
        assert_eq!(d8.len(), 1);
        let lake = &d8.lakes()[0];
        assert_eq!(lake.nodes, vec![17, 24]);
        assert_eq!(lake.code, 24);
        // 9 and 10 both sit at 3.5 but still drain north, so either can take the lake
        assert_eq!(lake.outlet, Some(9));
        assert_eq!(lake.spill_elevation, 3.5);

        // without diagonals 10 can only go down through 17
        let d4 = map_depressions(&grid, z, RoutingMode::D4).unwrap();
        assert_eq!(d4.len(), 1);
        assert_eq!(d4.lakes()[0].nodes, vec![10, 17, 24]);
        assert_eq!(d4.lakes()[0].outlet, Some(9));
    }

    #[test]
    fn test_field_length_must_match_grid() {
        let grid = RasterGrid::new(7, 7, 1.0).unwrap();
        let short = Array1::<f64>::ones(10);
        assert!(matches!(
            map_depressions(&grid, &short, RoutingMode::D8),
            Err(SinkFillError::InvalidInput(_))
        ));
        assert!(matches!(
            flood_levels(&grid, &short, RoutingMode::D4),
            Err(SinkFillError::InvalidInput(_))
        ));
        assert!(matches!(
            FlowRouter::new(RoutingMode::D8).steepest_descent(&grid, &short),
            Err(SinkFillError::InvalidInput(_))
        ));
    }
}
