use crate::LocationKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Authoring tools in the tool bar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tool {
    #[default]
    Obstacle,
    Endpoint,
    Pickup,
    Delivery,
    Agent,
    Erase,
}

impl Tool {
    /// Tool bar order
    pub const ALL: [Tool; 6] = [
        Tool::Obstacle,
        Tool::Endpoint,
        Tool::Pickup,
        Tool::Delivery,
        Tool::Agent,
        Tool::Erase,
    ];

    /// Location set painted by this tool. `Agent` and `Erase` have none.
    pub fn location_kind(self) -> Option<LocationKind> {
        match self {
            Tool::Obstacle => Some(LocationKind::Obstacle),
            Tool::Endpoint => Some(LocationKind::NonTaskEndpoint),
            Tool::Pickup => Some(LocationKind::PickupLocation),
            Tool::Delivery => Some(LocationKind::DeliveryLocation),
            Tool::Agent | Tool::Erase => None,
        }
    }

    /// Human-readable name
    pub fn label(self) -> &'static str {
        match self {
            Tool::Obstacle => "Obstacle",
            Tool::Endpoint => "Non-task Endpoint",
            Tool::Pickup => "Pickup Location",
            Tool::Delivery => "Delivery Location",
            Tool::Agent => "Agent Start",
            Tool::Erase => "Erase",
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The active tool. Selecting one never touches the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ToolState {
    current: Tool,
}

impl ToolState {
    pub fn new(tool: Tool) -> Self {
        Self { current: tool }
    }

    pub fn current(&self) -> Tool {
        self.current
    }

    /// Make `tool` the active tool
    pub fn select(&mut self, tool: Tool) {
        if tool != self.current {
            tracing::debug!(from = %self.current, to = %tool, "tool changed");
        }
        self.current = tool;
    }

    pub fn is_selected(&self, tool: Tool) -> bool {
        self.current == tool
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tool() {
        let state = ToolState::default();
        assert_eq!(state.current(), Tool::Obstacle);
    }

    #[test]
    fn test_select_replaces_tool() {
        let mut state = ToolState::default();

        state.select(Tool::Erase);
        assert!(state.is_selected(Tool::Erase));
        assert!(!state.is_selected(Tool::Obstacle));

        state.select(Tool::Pickup);
        assert_eq!(state.current(), Tool::Pickup);
    }

    #[test]
    fn test_paint_tools_map_to_sets() {
        let paint: Vec<_> = Tool::ALL
            .into_iter()
            .filter_map(Tool::location_kind)
            .collect();

        assert_eq!(paint, LocationKind::ALL.to_vec());
        assert_eq!(Tool::Agent.location_kind(), None);
        assert_eq!(Tool::Erase.location_kind(), None);
    }

    #[test]
    fn test_labels() {
        assert_eq!(Tool::Endpoint.to_string(), "Non-task Endpoint");
        assert_eq!(Tool::Agent.label(), "Agent Start");
    }
}
