// Helper functions to build test maps in various configurations

use grid_map_editor::{Dimensions, GridCoord, LocationKind, MapModel};

/// Empty 3×3 map
pub fn small_map() -> MapModel {
    MapModel::new(Dimensions::new(3, 3).unwrap())
}

/// The walkthrough map: obstacle at (0,0), agent R1 at (2,2), nothing else
pub fn walkthrough_map() -> MapModel {
    let mut map = small_map();
    map.set_cell(GridCoord::new(0, 0), LocationKind::Obstacle)
        .unwrap();
    map.add_agent("R1", GridCoord::new(2, 2)).unwrap();
    map
}

/// A 5×4 map the simulator accepts: two agents, two endpoints, tasks possible
pub fn complete_map() -> MapModel {
    let mut map = MapModel::new(Dimensions::new(5, 4).unwrap());

    for x in 1..4 {
        map.set_cell(GridCoord::new(x, 1), LocationKind::Obstacle)
            .unwrap();
    }
    map.set_cell(GridCoord::new(0, 0), LocationKind::NonTaskEndpoint)
        .unwrap();
    map.set_cell(GridCoord::new(4, 0), LocationKind::NonTaskEndpoint)
        .unwrap();
    map.set_cell(GridCoord::new(0, 3), LocationKind::PickupLocation)
        .unwrap();
    map.set_cell(GridCoord::new(4, 3), LocationKind::DeliveryLocation)
        .unwrap();

    map.add_agent("agent1", GridCoord::new(1, 2)).unwrap();
    map.add_agent("agent2", GridCoord::new(3, 2)).unwrap();
    map
}
