use crate::{
    Agent, CellRole, Dimensions, EventType, GridCoord, LocationKind, LocationsPayload, MapError,
    MapEvent, MapPayload,
};
use indexmap::IndexSet;
use tracing::{debug, warn};

/// The map being edited: agents plus four mutually exclusive location sets.
///
/// Every coordinate holds at most one role. All mutations go through
/// [`MapModel::set_cell`], [`MapModel::clear_cell`] and [`MapModel::add_agent`],
/// which displace whatever occupied the target cell before writing to it.
#[derive(Debug, Clone)]
pub struct MapModel {
    dimensions: Dimensions,

    /// Agents in insertion order (list display order)
    agents: Vec<Agent>,

    /// One insertion-ordered set per `LocationKind`, indexed by `LocationKind::index`
    locations: [IndexSet<GridCoord>; 4],

    /// Edit history for the session
    events: Vec<MapEvent>,
}

/// What happened while loading an external payload into a model
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Cells whose earlier entry was displaced by a later one
    pub displaced: Vec<GridCoord>,

    /// Entries that could not be placed at all
    pub rejected: Vec<String>,
}

impl LoadReport {
    /// True when the payload loaded exactly as given
    pub fn is_clean(&self) -> bool {
        self.displaced.is_empty() && self.rejected.is_empty()
    }

    /// Number of entries that were displaced or dropped
    pub fn adjusted(&self) -> usize {
        self.displaced.len() + self.rejected.len()
    }
}

impl MapModel {
    /// Most history entries kept per session
    pub const MAX_HISTORY: usize = 500;

    /// Create an empty map
    pub fn new(dimensions: Dimensions) -> Self {
        Self {
            dimensions,
            agents: Vec::new(),
            locations: Default::default(),
            events: Vec::new(),
        }
    }

    /// Build a map from a wire payload.
    ///
    /// Entries are applied in wire order through the same exclusivity rules as
    /// interactive edits: the four location sets first, then agents. A later
    /// entry displaces an earlier one on the same cell; out-of-bounds entries
    /// and duplicate agent names are dropped. Both are listed in the report.
    pub fn from_payload(dimensions: Dimensions, payload: &MapPayload) -> (Self, LoadReport) {
        let mut model = Self::new(dimensions);
        let mut report = LoadReport::default();

        for kind in LocationKind::ALL {
            for &coord in payload.map.get(kind) {
                match model.place_location(coord, kind) {
                    Ok(previous) => {
                        if !previous.is_empty() && previous != CellRole::from(kind) {
                            report.displaced.push(coord);
                        }
                    }
                    Err(e) => report.rejected.push(format!("{}: {}", kind.set_name(), e)),
                }
            }
        }

        for agent in &payload.agents {
            match model.place_agent(&agent.name, agent.start) {
                Ok(previous) => {
                    if !previous.is_empty() {
                        report.displaced.push(agent.start);
                    }
                }
                Err(e) => report.rejected.push(format!("agent {}: {}", agent.name, e)),
            }
        }

        debug_assert!(model.overlapping_cells().is_empty());
        (model, report)
    }

    // ========== Cell Operations ==========

    /// Put a cell into a location set, displacing whatever was there.
    ///
    /// Returns the role the cell held before.
    pub fn set_cell(&mut self, coord: GridCoord, kind: LocationKind) -> Result<CellRole, MapError> {
        let previous = self.place_location(coord, kind)?;

        if previous != CellRole::from(kind) {
            self.log_event(EventType::CellPainted {
                coord,
                kind,
                previous,
            });
        }

        Ok(previous)
    }

    /// Remove a cell from every location set and drop any agent starting there.
    ///
    /// Idempotent; coordinates outside the grid are already empty.
    pub fn clear_cell(&mut self, coord: GridCoord) -> CellRole {
        let previous = self.remove_everywhere(coord);

        if !previous.is_empty() {
            self.log_event(EventType::CellCleared { coord, previous });
        }

        previous
    }

    /// The role currently held by a cell
    pub fn role_at(&self, coord: GridCoord) -> CellRole {
        let agent = self
            .agents
            .iter()
            .any(|a| a.starts_at(coord))
            .then_some(CellRole::Agent);

        let mut roles = LocationKind::ALL
            .into_iter()
            .filter(|kind| self.locations[kind.index()].contains(&coord))
            .map(CellRole::from)
            .chain(agent);

        let role = roles.next().unwrap_or(CellRole::Empty);
        debug_assert!(roles.next().is_none(), "cell {} holds more than one role", coord);
        role
    }

    /// Coordinates claimed by more than one role. Always empty for a consistent map.
    pub fn overlapping_cells(&self) -> Vec<GridCoord> {
        let mut seen = IndexSet::new();
        let mut overlapping = IndexSet::new();

        let claims = self
            .locations
            .iter()
            .flat_map(|set| set.iter().copied())
            .chain(self.agents.iter().map(|a| a.start));

        for coord in claims {
            if !seen.insert(coord) {
                overlapping.insert(coord);
            }
        }

        overlapping.into_iter().collect()
    }

    // ========== Agent Operations ==========

    /// Add an agent starting on `coord`.
    ///
    /// Fails without touching the map if the cell is outside the grid, the
    /// name is blank, or another agent already uses the name. Otherwise the
    /// cell is cleared first and the agent appended to the list. Returns the
    /// agent that started on the cell before, if any.
    pub fn add_agent(&mut self, name: &str, coord: GridCoord) -> Result<Option<Agent>, MapError> {
        let displaced = self.agents.iter().find(|a| a.starts_at(coord)).cloned();
        let previous = self.place_agent(name, coord)?;
        debug!(agent = name, %coord, "added agent");

        if let Some(agent) = &displaced {
            debug!(agent = %agent.name, %coord, "agent displaced");
            self.log_event(EventType::AgentRemoved {
                name: agent.name.clone(),
                start: agent.start,
            });
        }

        self.log_event(EventType::AgentAdded {
            name: name.to_string(),
            start: coord,
            previous,
        });

        Ok(displaced)
    }

    /// Remove the agent with this name. No-op if there is none.
    pub fn remove_agent(&mut self, name: &str) -> Option<Agent> {
        let index = self.agents.iter().position(|a| a.is_named(name))?;
        let agent = self.agents.remove(index);
        debug!(agent = name, "removed agent");

        self.log_event(EventType::AgentRemoved {
            name: agent.name.clone(),
            start: agent.start,
        });

        Some(agent)
    }

    /// Get an agent by name
    pub fn agent(&self, name: &str) -> Option<&Agent> {
        self.agents.iter().find(|a| a.is_named(name))
    }

    /// Agents in list order
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    // ========== Whole-Map Operations ==========

    /// Replace the map with an empty one of the same size. History is kept.
    pub fn reset(&mut self) {
        let events = std::mem::take(&mut self.events);
        *self = Self::new(self.dimensions);
        self.events = events;
        self.log_event(EventType::MapReset);
    }

    /// Replace the whole map with the contents of a payload. History is kept.
    pub fn load_payload(&mut self, payload: &MapPayload) -> LoadReport {
        let (mut fresh, report) = Self::from_payload(self.dimensions, payload);
        fresh.events = std::mem::take(&mut self.events);
        *self = fresh;

        if !report.is_clean() {
            warn!(
                displaced = report.displaced.len(),
                rejected = report.rejected.len(),
                "loaded map needed adjustments"
            );
        }

        self.log_event(EventType::MapLoaded {
            agents: self.agents.len(),
            locations: self.location_count(),
            adjusted: report.adjusted(),
        });

        report
    }

    /// Wire representation: sets and agents in insertion order
    pub fn to_payload(&self) -> MapPayload {
        let set = |kind: LocationKind| -> Vec<GridCoord> {
            self.locations[kind.index()].iter().copied().collect()
        };

        MapPayload {
            agents: self.agents.clone(),
            map: LocationsPayload {
                obstacles: set(LocationKind::Obstacle),
                non_task_endpoints: set(LocationKind::NonTaskEndpoint),
                pickup_locations: set(LocationKind::PickupLocation),
                delivery_locations: set(LocationKind::DeliveryLocation),
            },
        }
    }

    // ========== Internal Mutations ==========

    /// Displace and insert without logging
    fn place_location(&mut self, coord: GridCoord, kind: LocationKind) -> Result<CellRole, MapError> {
        self.dimensions.check(coord)?;
        if self.locations[kind.index()].contains(&coord) {
            return Ok(CellRole::from(kind));
        }
        let previous = self.remove_everywhere(coord);
        self.locations[kind.index()].insert(coord);
        Ok(previous)
    }

    /// Check, displace and append without logging
    fn place_agent(&mut self, name: &str, coord: GridCoord) -> Result<CellRole, MapError> {
        self.dimensions.check(coord)?;
        if name.trim().is_empty() {
            return Err(MapError::EmptyName);
        }
        if self.agent(name).is_some() {
            return Err(MapError::DuplicateName(name.to_string()));
        }

        let previous = self.remove_everywhere(coord);
        self.agents.push(Agent::new(name, coord));
        Ok(previous)
    }

    /// Remove a coordinate from all sets and agent starts, returning its old role
    fn remove_everywhere(&mut self, coord: GridCoord) -> CellRole {
        let previous = self.role_at(coord);

        for set in &mut self.locations {
            set.shift_remove(&coord);
        }
        self.agents.retain(|a| !a.starts_at(coord));

        previous
    }

    // ========== Event Logging ==========

    /// Log an event, dropping the oldest once the history is full
    fn log_event(&mut self, event: EventType) {
        self.events.push(MapEvent::new(event));
        if self.events.len() > Self::MAX_HISTORY {
            let excess = self.events.len() - Self::MAX_HISTORY;
            self.events.drain(..excess);
        }
    }

    /// Get all events
    pub fn events(&self) -> &[MapEvent] {
        &self.events
    }

    /// Clear event log
    pub fn clear_events(&mut self) {
        self.events.clear();
    }

    // ========== Utility Methods ==========

    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    /// Cells in one location set, in insertion order
    pub fn locations(&self, kind: LocationKind) -> &IndexSet<GridCoord> {
        &self.locations[kind.index()]
    }

    /// Count cells across all four location sets
    pub fn location_count(&self) -> usize {
        self.locations.iter().map(IndexSet::len).sum()
    }

    /// Count agents
    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }

    /// True when no cell holds a role
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty() && self.location_count() == 0
    }
}

impl Default for MapModel {
    fn default() -> Self {
        Self::new(Dimensions::DEFAULT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn small_map() -> MapModel {
        MapModel::new(Dimensions::new(3, 3).unwrap())
    }

    #[test]
    fn test_map_creation() {
        let map = small_map();
        assert!(map.is_empty());
        assert_eq!(map.dimensions(), Dimensions::new(3, 3).unwrap());
        assert_eq!(map.role_at(GridCoord::new(1, 1)), CellRole::Empty);
    }

    #[test]
    fn test_set_cell_replaces_previous_role() {
        let mut map = small_map();
        let c = GridCoord::new(1, 2);

        assert_eq!(map.set_cell(c, LocationKind::Obstacle), Ok(CellRole::Empty));
        assert_eq!(
            map.set_cell(c, LocationKind::DeliveryLocation),
            Ok(CellRole::Obstacle)
        );

        assert_eq!(map.role_at(c), CellRole::DeliveryLocation);
        assert!(!map.locations(LocationKind::Obstacle).contains(&c));
        assert_eq!(map.location_count(), 1);
    }

    #[test]
    fn test_set_cell_displaces_agent() {
        let mut map = small_map();
        let c = GridCoord::new(0, 1);

        map.add_agent("R1", c).unwrap();
        map.set_cell(c, LocationKind::Obstacle).unwrap();

        assert_eq!(map.role_at(c), CellRole::Obstacle);
        assert_eq!(map.agent_count(), 0);
    }

    #[test]
    fn test_set_cell_out_of_bounds() {
        let mut map = small_map();

        assert_matches!(
            map.set_cell(GridCoord::new(0, 3), LocationKind::Obstacle),
            Err(MapError::OutOfBounds { .. })
        );
        assert!(map.is_empty());
    }

    #[test]
    fn test_clear_cell_is_idempotent() {
        let mut map = small_map();
        let c = GridCoord::new(2, 0);
        map.set_cell(c, LocationKind::PickupLocation).unwrap();

        assert_eq!(map.clear_cell(c), CellRole::PickupLocation);
        assert_eq!(map.clear_cell(c), CellRole::Empty);
        assert_eq!(map.clear_cell(GridCoord::new(9, 9)), CellRole::Empty);
        assert!(map.is_empty());
    }

    #[test]
    fn test_clear_cell_removes_agent() {
        let mut map = small_map();
        let c = GridCoord::new(2, 2);
        map.add_agent("R1", c).unwrap();

        assert_eq!(map.clear_cell(c), CellRole::Agent);
        assert_eq!(map.role_at(c), CellRole::Empty);
        assert!(map.agents().is_empty());
    }

    #[test]
    fn test_add_agent_displaces_location() {
        let mut map = small_map();
        let c = GridCoord::new(1, 1);
        map.set_cell(c, LocationKind::NonTaskEndpoint).unwrap();

        map.add_agent("R1", c).unwrap();

        assert_eq!(map.role_at(c), CellRole::Agent);
        assert!(map.locations(LocationKind::NonTaskEndpoint).is_empty());
    }

    #[test]
    fn test_add_agent_duplicate_name() {
        let mut map = small_map();
        map.add_agent("X", GridCoord::new(0, 0)).unwrap();
        map.set_cell(GridCoord::new(1, 0), LocationKind::Obstacle).unwrap();

        let result = map.add_agent("X", GridCoord::new(1, 0));

        assert_eq!(result, Err(MapError::DuplicateName("X".to_string())));
        assert_eq!(map.agent_count(), 1);
        assert_eq!(map.agent("X").unwrap().start, GridCoord::new(0, 0));
        // Failed placement leaves the target cell alone
        assert_eq!(map.role_at(GridCoord::new(1, 0)), CellRole::Obstacle);
    }

    #[test]
    fn test_add_agent_names_are_case_sensitive() {
        let mut map = small_map();
        map.add_agent("r1", GridCoord::new(0, 0)).unwrap();
        map.add_agent("R1", GridCoord::new(1, 0)).unwrap();

        assert_eq!(map.agent_count(), 2);
    }

    #[test]
    fn test_add_agent_rejects_bad_input() {
        let mut map = small_map();

        assert_matches!(
            map.add_agent("Y", GridCoord::new(3, 0)),
            Err(MapError::OutOfBounds { width: 3, height: 3, .. })
        );
        assert_eq!(map.add_agent("  ", GridCoord::new(0, 0)), Err(MapError::EmptyName));
        assert!(map.agents().is_empty());
    }

    #[test]
    fn test_remove_agent() {
        let mut map = small_map();
        map.add_agent("A", GridCoord::new(0, 0)).unwrap();
        map.add_agent("B", GridCoord::new(1, 0)).unwrap();

        let removed = map.remove_agent("A").unwrap();
        assert_eq!(removed.start, GridCoord::new(0, 0));
        assert!(map.remove_agent("A").is_none());

        let names: Vec<_> = map.agents().iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["B"]);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut map = small_map();
        map.set_cell(GridCoord::new(0, 0), LocationKind::Obstacle).unwrap();
        map.set_cell(GridCoord::new(1, 0), LocationKind::PickupLocation).unwrap();
        map.add_agent("R1", GridCoord::new(2, 2)).unwrap();

        map.reset();

        assert!(map.is_empty());
        for kind in LocationKind::ALL {
            assert!(map.locations(kind).is_empty());
        }
        assert_eq!(map.dimensions(), Dimensions::new(3, 3).unwrap());
        assert_eq!(map.events().last().unwrap().event, EventType::MapReset);
    }

    #[test]
    fn test_to_payload_keeps_insertion_order() {
        let mut map = small_map();
        map.set_cell(GridCoord::new(2, 2), LocationKind::Obstacle).unwrap();
        map.set_cell(GridCoord::new(0, 0), LocationKind::Obstacle).unwrap();
        map.set_cell(GridCoord::new(1, 1), LocationKind::Obstacle).unwrap();
        map.clear_cell(GridCoord::new(0, 0));

        let payload = map.to_payload();

        assert_eq!(
            payload.map.obstacles,
            vec![GridCoord::new(2, 2), GridCoord::new(1, 1)]
        );
        assert_eq!(payload, map.to_payload());
    }

    #[test]
    fn test_from_payload_normalizes_overlaps() {
        let payload = MapPayload {
            agents: vec![Agent::new("agent1", GridCoord::new(0, 0))],
            map: LocationsPayload {
                non_task_endpoints: vec![GridCoord::new(0, 0), GridCoord::new(5, 5)],
                ..Default::default()
            },
        };

        let (map, report) = MapModel::from_payload(Dimensions::new(3, 3).unwrap(), &payload);

        assert_eq!(map.role_at(GridCoord::new(0, 0)), CellRole::Agent);
        assert!(map.locations(LocationKind::NonTaskEndpoint).is_empty());
        assert_eq!(report.displaced, vec![GridCoord::new(0, 0)]);
        assert_eq!(report.rejected.len(), 1);
        assert!(map.overlapping_cells().is_empty());
    }

    #[test]
    fn test_load_payload_keeps_history() {
        let mut map = small_map();
        map.set_cell(GridCoord::new(0, 0), LocationKind::Obstacle).unwrap();

        let payload = MapPayload {
            agents: vec![Agent::new("R1", GridCoord::new(1, 1))],
            map: LocationsPayload::default(),
        };
        let report = map.load_payload(&payload);

        assert!(report.is_clean());
        assert_eq!(map.role_at(GridCoord::new(0, 0)), CellRole::Empty);
        assert_eq!(map.role_at(GridCoord::new(1, 1)), CellRole::Agent);
        assert_eq!(map.events().len(), 2);
    }

    #[test]
    fn test_add_agent_over_agent_logs_removal() {
        let mut map = small_map();
        let c = GridCoord::new(1, 1);

        assert_eq!(map.add_agent("A", c), Ok(None));
        let displaced = map.add_agent("B", c).unwrap();

        assert_eq!(displaced, Some(Agent::new("A", c)));
        assert_eq!(map.agents(), &[Agent::new("B", c)]);

        let history: Vec<_> = map.events().iter().map(|e| e.event.clone()).collect();
        assert_eq!(
            history,
            vec![
                EventType::AgentAdded {
                    name: "A".to_string(),
                    start: c,
                    previous: CellRole::Empty,
                },
                EventType::AgentRemoved {
                    name: "A".to_string(),
                    start: c,
                },
                EventType::AgentAdded {
                    name: "B".to_string(),
                    start: c,
                    previous: CellRole::Agent,
                },
            ]
        );
    }

    #[test]
    fn test_history_is_capped() {
        let mut map = small_map();
        let c = GridCoord::new(0, 0);

        for i in 0..MapModel::MAX_HISTORY + 20 {
            let kind = if i % 2 == 0 {
                LocationKind::Obstacle
            } else {
                LocationKind::PickupLocation
            };
            map.set_cell(c, kind).unwrap();
        }

        assert_eq!(map.events().len(), MapModel::MAX_HISTORY);
        assert_eq!(
            map.events().last().unwrap().event,
            EventType::CellPainted {
                coord: c,
                kind: LocationKind::PickupLocation,
                previous: CellRole::Obstacle,
            }
        );

        map.clear_events();
        assert!(map.events().is_empty());
    }

    #[test]
    fn test_repaint_is_not_logged_twice() {
        let mut map = small_map();
        let c = GridCoord::new(1, 1);

        map.set_cell(c, LocationKind::Obstacle).unwrap();
        map.set_cell(c, LocationKind::Obstacle).unwrap();

        assert_eq!(map.events().len(), 1);
    }
}
