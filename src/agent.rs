use crate::GridCoord;
use serde::{Deserialize, Serialize};

/// An agent and the cell it starts on
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Agent {
    /// Unique, case-sensitive name
    pub name: String,

    /// Start cell
    pub start: GridCoord,
}

impl Agent {
    /// Create a new agent
    pub fn new(name: impl Into<String>, start: GridCoord) -> Self {
        Self {
            name: name.into(),
            start,
        }
    }

    /// Check if this agent starts on a given cell
    pub fn starts_at(&self, coord: GridCoord) -> bool {
        self.start == coord
    }

    /// Check if this agent carries a given name (exact match)
    pub fn is_named(&self, name: &str) -> bool {
        self.name == name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_creation() {
        let agent = Agent::new("R1", GridCoord::new(2, 2));

        assert_eq!(agent.name, "R1");
        assert_eq!(agent.start, GridCoord::new(2, 2));
    }

    #[test]
    fn test_agent_matching() {
        let agent = Agent::new("R1", GridCoord::new(1, 0));

        assert!(agent.starts_at(GridCoord::new(1, 0)));
        assert!(!agent.starts_at(GridCoord::new(0, 1)));

        assert!(agent.is_named("R1"));
        assert!(!agent.is_named("r1"));
    }

    #[test]
    fn test_agent_wire_shape() {
        let agent = Agent::new("agent1", GridCoord::new(0, 3));
        let json = serde_json::to_value(&agent).unwrap();

        assert_eq!(json, serde_json::json!({"name": "agent1", "start": [0, 3]}));
    }
}
