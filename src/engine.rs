//! Click handling: turns a tool applied to a cell into a map edit.

use crate::{Agent, CellRole, GridCoord, LocationKind, MapError, MapModel, Tool};
use tracing::debug;

/// Result of clicking a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// The erase tool emptied the cell
    Cleared { previous: CellRole },

    /// A paint tool put the cell into a location set
    Painted {
        kind: LocationKind,
        previous: CellRole,
    },

    /// The agent tool needs a name before anything changes
    AgentRequested(PendingAgent),
}

/// An agent placement waiting for its name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingAgent {
    pub coord: GridCoord,
}

impl PendingAgent {
    /// Finish the placement with the name the user supplied.
    ///
    /// Returns the agent that had to make room, if any.
    pub fn complete(self, map: &mut MapModel, name: &str) -> Result<Option<Agent>, MapError> {
        map.add_agent(name, self.coord)
    }
}

/// Apply `tool` to `coord`.
///
/// Erase empties the cell. The agent tool leaves the map alone and returns a
/// [`PendingAgent`]. Paint tools move the cell into the tool's set, so
/// repainting replaces the old role instead of adding to it.
pub fn handle_click(map: &mut MapModel, tool: Tool, coord: GridCoord) -> Result<ClickOutcome, MapError> {
    debug!(%coord, %tool, "cell clicked");
    map.dimensions().check(coord)?;

    let outcome = match tool.location_kind() {
        None if tool == Tool::Erase => ClickOutcome::Cleared {
            previous: map.clear_cell(coord),
        },
        None => ClickOutcome::AgentRequested(PendingAgent { coord }),
        Some(kind) => ClickOutcome::Painted {
            kind,
            previous: map.set_cell(coord, kind)?,
        },
    };

    Ok(outcome)
}
