use crate::{CellRole, GridCoord, LocationKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A map edit with timestamp
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapEvent {
    pub timestamp: DateTime<Utc>,
    pub event: EventType,
}

impl MapEvent {
    /// Create a new event with the current timestamp
    pub fn new(event: EventType) -> Self {
        Self {
            timestamp: Utc::now(),
            event,
        }
    }
}

/// Types of edits recorded in the session history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventType {
    CellPainted {
        coord: GridCoord,
        kind: LocationKind,
        /// What the cell held before
        previous: CellRole,
    },

    CellCleared {
        coord: GridCoord,
        previous: CellRole,
    },

    AgentAdded {
        name: String,
        start: GridCoord,
        previous: CellRole,
    },

    AgentRemoved {
        name: String,
        start: GridCoord,
    },

    MapReset,

    /// The whole map was replaced from an external payload
    MapLoaded {
        agents: usize,
        locations: usize,
        /// Entries dropped or displaced while loading
        adjusted: usize,
    },
}

impl EventType {
    /// One-line description for history lists
    pub fn describe(&self) -> String {
        match self {
            EventType::CellPainted { coord, kind, .. } => {
                format!("Added {} at {}", kind.set_name(), coord)
            }
            EventType::CellCleared { coord, previous } => {
                format!("Removed {} at {}", previous, coord)
            }
            EventType::AgentAdded { name, start, .. } => format!("Added agent {} at {}", name, start),
            EventType::AgentRemoved { name, .. } => format!("Removed agent {}", name),
            EventType::MapReset => "Cleared map".to_string(),
            EventType::MapLoaded {
                agents, locations, ..
            } => format!("Loaded map ({} agents, {} locations)", agents, locations),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_creation() {
        let event = MapEvent::new(EventType::MapReset);

        assert!(event.timestamp <= Utc::now());
        assert_eq!(event.event, EventType::MapReset);
    }

    #[test]
    fn test_event_descriptions() {
        let painted = EventType::CellPainted {
            coord: GridCoord::new(1, 2),
            kind: LocationKind::PickupLocation,
            previous: CellRole::Empty,
        };
        assert_eq!(painted.describe(), "Added pickup_locations at (1, 2)");

        let cleared = EventType::CellCleared {
            coord: GridCoord::new(0, 0),
            previous: CellRole::Obstacle,
        };
        assert_eq!(cleared.describe(), "Removed obstacle at (0, 0)");
    }

    #[test]
    fn test_event_serialization() {
        let event = MapEvent::new(EventType::AgentAdded {
            name: "R1".to_string(),
            start: GridCoord::new(2, 2),
            previous: CellRole::Empty,
        });

        let json = serde_json::to_string(&event).unwrap();
        let deserialized: MapEvent = serde_json::from_str(&json).unwrap();

        assert_eq!(deserialized.event, event.event);
    }
}
