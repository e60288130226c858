use crate::MapError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single grid position. Serialized as `[x, y]` to match the map format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "[u32; 2]", into = "[u32; 2]")]
pub struct GridCoord {
    x: u32,
    y: u32,
}

impl GridCoord {
    /// Create a coordinate. Bounds are checked by the map that stores it.
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    pub const fn x(&self) -> u32 {
        self.x
    }

    pub const fn y(&self) -> u32 {
        self.y
    }
}

impl From<[u32; 2]> for GridCoord {
    fn from([x, y]: [u32; 2]) -> Self {
        Self::new(x, y)
    }
}

impl From<GridCoord> for [u32; 2] {
    fn from(coord: GridCoord) -> Self {
        [coord.x, coord.y]
    }
}

impl fmt::Display for GridCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Width and height of a map, both at least 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dimensions {
    width: u32,
    height: u32,
}

impl Dimensions {
    /// Size used when the dimension source is unavailable
    pub const DEFAULT: Dimensions = Dimensions {
        width: 20,
        height: 20,
    };

    /// Create dimensions, rejecting empty grids
    pub fn new(width: u32, height: u32) -> Result<Self, MapError> {
        if width == 0 || height == 0 {
            return Err(MapError::InvalidDimensions { width, height });
        }
        Ok(Self { width, height })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Total number of cells
    pub fn cell_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Check if a coordinate lies inside the grid
    pub fn contains(&self, coord: GridCoord) -> bool {
        coord.x < self.width && coord.y < self.height
    }

    /// Build a coordinate, rejecting anything outside the grid
    pub fn coord(&self, x: u32, y: u32) -> Result<GridCoord, MapError> {
        let coord = GridCoord::new(x, y);
        self.check(coord)?;
        Ok(coord)
    }

    /// Return `OutOfBounds` for coordinates outside the grid
    pub fn check(&self, coord: GridCoord) -> Result<(), MapError> {
        if self.contains(coord) {
            Ok(())
        } else {
            Err(MapError::OutOfBounds {
                coord,
                width: self.width,
                height: self.height,
            })
        }
    }

    /// All coordinates in row-major order (y outer, x inner)
    pub fn coords(self) -> impl Iterator<Item = GridCoord> {
        let Dimensions { width, height } = self;
        (0..height).flat_map(move |y| (0..width).map(move |x| GridCoord::new(x, y)))
    }
}

impl Default for Dimensions {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}×{}", self.width, self.height)
    }
}

/// The four location sets a cell can belong to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationKind {
    Obstacle,
    NonTaskEndpoint,
    PickupLocation,
    DeliveryLocation,
}

impl LocationKind {
    /// Wire order of the location sets
    pub const ALL: [LocationKind; 4] = [
        LocationKind::Obstacle,
        LocationKind::NonTaskEndpoint,
        LocationKind::PickupLocation,
        LocationKind::DeliveryLocation,
    ];

    /// Slot of this kind in a `[_; 4]` table
    pub(crate) fn index(self) -> usize {
        match self {
            LocationKind::Obstacle => 0,
            LocationKind::NonTaskEndpoint => 1,
            LocationKind::PickupLocation => 2,
            LocationKind::DeliveryLocation => 3,
        }
    }

    /// Key of the set in the `map` section of the payload
    pub fn set_name(self) -> &'static str {
        match self {
            LocationKind::Obstacle => "obstacles",
            LocationKind::NonTaskEndpoint => "non_task_endpoints",
            LocationKind::PickupLocation => "pickup_locations",
            LocationKind::DeliveryLocation => "delivery_locations",
        }
    }
}

/// What occupies a cell. Exactly one per coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellRole {
    Obstacle,
    NonTaskEndpoint,
    PickupLocation,
    DeliveryLocation,
    Agent,
    Empty,
}

impl CellRole {
    pub const ALL: [CellRole; 6] = [
        CellRole::Obstacle,
        CellRole::NonTaskEndpoint,
        CellRole::PickupLocation,
        CellRole::DeliveryLocation,
        CellRole::Agent,
        CellRole::Empty,
    ];

    /// Stable lowercase name (`"pickup_location"`, `"empty"`, ...)
    pub fn as_str(self) -> &'static str {
        match self {
            CellRole::Obstacle => "obstacle",
            CellRole::NonTaskEndpoint => "non_task_endpoint",
            CellRole::PickupLocation => "pickup_location",
            CellRole::DeliveryLocation => "delivery_location",
            CellRole::Agent => "agent",
            CellRole::Empty => "empty",
        }
    }

    /// The location set behind this role, if any
    pub fn location_kind(self) -> Option<LocationKind> {
        match self {
            CellRole::Obstacle => Some(LocationKind::Obstacle),
            CellRole::NonTaskEndpoint => Some(LocationKind::NonTaskEndpoint),
            CellRole::PickupLocation => Some(LocationKind::PickupLocation),
            CellRole::DeliveryLocation => Some(LocationKind::DeliveryLocation),
            CellRole::Agent | CellRole::Empty => None,
        }
    }

    pub fn is_empty(self) -> bool {
        self == CellRole::Empty
    }
}

impl From<LocationKind> for CellRole {
    fn from(kind: LocationKind) -> Self {
        match kind {
            LocationKind::Obstacle => CellRole::Obstacle,
            LocationKind::NonTaskEndpoint => CellRole::NonTaskEndpoint,
            LocationKind::PickupLocation => CellRole::PickupLocation,
            LocationKind::DeliveryLocation => CellRole::DeliveryLocation,
        }
    }
}

impl fmt::Display for CellRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
