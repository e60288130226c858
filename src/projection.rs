//! Display projection of the map: cell roles to presentation tokens, and the agent list.
//!
//! Projections are recomputed from the model on every call, so they can never
//! drift from it.

use crate::{CellRole, Dimensions, GridCoord, MapModel};

/// How a role is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayToken {
    /// Short style name (`"endpoint"`, `"pickup"`, ...)
    pub class: &'static str,
    /// Fill colour as RGB
    pub fill: [u8; 3],
    /// Text colour as RGB
    pub text: [u8; 3],
    /// Legend label
    pub label: &'static str,
}

const DARK_TEXT: [u8; 3] = [0x00, 0x00, 0x00];
const LIGHT_TEXT: [u8; 3] = [0xff, 0xff, 0xff];

/// Presentation token for a role
pub fn role_to_display(role: CellRole) -> DisplayToken {
    match role {
        CellRole::Empty => DisplayToken {
            class: "empty",
            fill: [0xff, 0xff, 0xff],
            text: DARK_TEXT,
            label: "Empty",
        },
        CellRole::Obstacle => DisplayToken {
            class: "obstacle",
            fill: [0x33, 0x33, 0x33],
            text: LIGHT_TEXT,
            label: "Obstacle",
        },
        CellRole::NonTaskEndpoint => DisplayToken {
            class: "endpoint",
            fill: [0x00, 0x7b, 0xff],
            text: DARK_TEXT,
            label: "Non-task Endpoint",
        },
        CellRole::PickupLocation => DisplayToken {
            class: "pickup",
            fill: [0x28, 0xa7, 0x45],
            text: DARK_TEXT,
            label: "Pickup Location",
        },
        CellRole::DeliveryLocation => DisplayToken {
            class: "delivery",
            fill: [0xdc, 0x35, 0x45],
            text: DARK_TEXT,
            label: "Delivery Location",
        },
        CellRole::Agent => DisplayToken {
            class: "agent",
            fill: [0xff, 0xc1, 0x07],
            text: DARK_TEXT,
            label: "Agent Start",
        },
    }
}

/// The role of every cell, row-major
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridProjection {
    dimensions: Dimensions,
    roles: Vec<CellRole>,
}

impl GridProjection {
    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    /// Role at a coordinate, `None` outside the grid
    pub fn role(&self, coord: GridCoord) -> Option<CellRole> {
        if !self.dimensions.contains(coord) {
            return None;
        }
        let index = coord.y() as usize * self.dimensions.width() as usize + coord.x() as usize;
        self.roles.get(index).copied()
    }

    /// Each cell with its role, row-major
    pub fn cells(&self) -> impl Iterator<Item = (GridCoord, CellRole)> + '_ {
        self.dimensions.coords().zip(self.roles.iter().copied())
    }

    /// Number of cells holding `role`
    pub fn count(&self, role: CellRole) -> usize {
        self.roles.iter().filter(|r| **r == role).count()
    }

    /// Text rendering, one character per cell (`#` obstacle, `E` endpoint,
    /// `P` pickup, `D` delivery, `A` agent, `.` empty)
    pub fn to_ascii(&self) -> String {
        let width = self.dimensions.width() as usize;
        let mut out = String::with_capacity(self.roles.len() + self.dimensions.height() as usize);

        for row in self.roles.chunks(width) {
            for role in row {
                out.push(match role {
                    CellRole::Obstacle => '#',
                    CellRole::NonTaskEndpoint => 'E',
                    CellRole::PickupLocation => 'P',
                    CellRole::DeliveryLocation => 'D',
                    CellRole::Agent => 'A',
                    CellRole::Empty => '.',
                });
            }
            out.push('\n');
        }

        out
    }
}

/// Project every cell of the map
pub fn project_all(map: &MapModel) -> GridProjection {
    let dimensions = map.dimensions();
    GridProjection {
        dimensions,
        roles: dimensions.coords().map(|c| map.role_at(c)).collect(),
    }
}

/// One line of the agent list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentListEntry {
    pub name: String,
    pub start: GridCoord,
}

impl AgentListEntry {
    /// `"R1 (2, 2)"`
    pub fn label(&self) -> String {
        format!("{} {}", self.name, self.start)
    }
}

/// Agents in map order
pub fn project_agent_list(map: &MapModel) -> Vec<AgentListEntry> {
    map.agents()
        .iter()
        .map(|a| AgentListEntry {
            name: a.name.clone(),
            start: a.start,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LocationKind;
    use std::collections::HashSet;

    #[test]
    fn test_display_tokens_are_distinct() {
        let classes: HashSet<_> = CellRole::ALL
            .into_iter()
            .map(|r| role_to_display(r).class)
            .collect();
        let fills: HashSet<_> = CellRole::ALL
            .into_iter()
            .map(|r| role_to_display(r).fill)
            .collect();

        assert_eq!(classes.len(), CellRole::ALL.len());
        assert_eq!(fills.len(), CellRole::ALL.len());
        assert_eq!(role_to_display(CellRole::Obstacle).text, LIGHT_TEXT);
    }

    #[test]
    fn test_projection_follows_model() {
        let mut map = MapModel::new(Dimensions::new(3, 2).unwrap());
        map.set_cell(GridCoord::new(0, 0), LocationKind::Obstacle).unwrap();
        map.add_agent("R1", GridCoord::new(2, 1)).unwrap();

        let projection = project_all(&map);
        assert_eq!(projection.to_ascii(), "#..\n..A\n");
        assert_eq!(projection.role(GridCoord::new(2, 1)), Some(CellRole::Agent));
        assert_eq!(projection.role(GridCoord::new(3, 0)), None);

        map.clear_cell(GridCoord::new(0, 0));
        map.remove_agent("R1");

        let projection = project_all(&map);
        assert_eq!(projection.count(CellRole::Empty), 6);
    }

    #[test]
    fn test_projection_cells_match_role_at() {
        let mut map = MapModel::new(Dimensions::new(4, 3).unwrap());
        map.set_cell(GridCoord::new(3, 2), LocationKind::DeliveryLocation)
            .unwrap();
        map.set_cell(GridCoord::new(1, 2), LocationKind::NonTaskEndpoint)
            .unwrap();

        for (coord, role) in project_all(&map).cells() {
            assert_eq!(role, map.role_at(coord));
        }
    }

    #[test]
    fn test_agent_list_order() {
        let mut map = MapModel::new(Dimensions::new(3, 3).unwrap());
        map.add_agent("B", GridCoord::new(1, 1)).unwrap();
        map.add_agent("A", GridCoord::new(0, 0)).unwrap();

        let list = project_agent_list(&map);
        let labels: Vec<_> = list.iter().map(AgentListEntry::label).collect();

        assert_eq!(labels, vec!["B (1, 1)", "A (0, 0)"]);
    }
}
