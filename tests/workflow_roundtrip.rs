mod fixtures;

use assert_matches::assert_matches;
use fixtures::sample_maps::{complete_map, walkthrough_map};
use grid_map_editor::{
    Dimensions, DirectorySink, GridCoord, MapModel, MapService, OfflineMapService,
    ValidationReport, Workflow, WorkflowEvent,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

const WAIT: Duration = Duration::from_secs(5);

fn workflow(dimensions: Dimensions, temp_dir: &TempDir) -> Workflow {
    Workflow::new(
        Arc::new(OfflineMapService::with_dimensions(dimensions)),
        Arc::new(DirectorySink::new(temp_dir.path().join("exports"))),
    )
}

#[test]
fn test_validate_walkthrough_map() {
    let temp_dir = TempDir::new().unwrap();
    let map = walkthrough_map();
    let mut workflow = workflow(map.dimensions(), &temp_dir);

    workflow.validate(&map).unwrap();

    assert_eq!(
        workflow.wait(WAIT),
        Some(WorkflowEvent::Validated(ValidationReport::Failed {
            errors: vec!["Not enough non-task endpoints: 0 endpoints for 1 agents".to_string()]
        }))
    );
}

#[test]
fn test_export_writes_simulator_yaml() {
    let temp_dir = TempDir::new().unwrap();
    let map = complete_map();
    let mut workflow = workflow(map.dimensions(), &temp_dir);

    workflow.export(&map).unwrap();

    let (report, saved_to) = assert_matches!(
        workflow.wait(WAIT),
        Some(WorkflowEvent::Exported { report, saved_to }) => (report, saved_to)
    );
    assert!(report.is_success());

    let path = saved_to.unwrap();
    assert_eq!(path.file_name().unwrap(), "map_5x4.yaml");

    let yaml: serde_yaml::Value =
        serde_yaml::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    let expected: serde_yaml::Value = serde_yaml::from_str(
        r#"
agents:
  - name: agent1
    start: [1, 2]
  - name: agent2
    start: [3, 2]
map:
  dimensions: [5, 4]
  obstacles: [[1, 1], [2, 1], [3, 1]]
  non_task_endpoints: [[0, 0], [4, 0]]
  pickup_locations: [[0, 3]]
  delivery_locations: [[4, 3]]
"#,
    )
    .unwrap();
    assert_eq!(yaml, expected);
}

#[test]
fn test_failed_export_writes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let map = walkthrough_map();
    let mut workflow = workflow(map.dimensions(), &temp_dir);

    workflow.export(&map).unwrap();

    let saved_to = assert_matches!(
        workflow.wait(WAIT),
        Some(WorkflowEvent::Exported { report: ValidationReport::Failed { .. }, saved_to }) => saved_to
    );
    assert_eq!(saved_to, None);
    assert!(!temp_dir.path().join("exports").exists());
}

#[test]
fn test_example_load_normalizes_overlap() {
    let temp_dir = TempDir::new().unwrap();
    let mut workflow = workflow(Dimensions::DEFAULT, &temp_dir);
    let mut map = MapModel::default();

    workflow.load_example().unwrap();
    let payload = assert_matches!(
        workflow.wait(WAIT),
        Some(WorkflowEvent::ExampleLoaded(Ok(payload))) => payload
    );
    let report = map.load_payload(&payload);

    assert_eq!(report.displaced, vec![GridCoord::new(0, 0)]);
    assert_eq!(map.agent("agent1").unwrap().start, GridCoord::new(0, 0));
    assert!(map.overlapping_cells().is_empty());
}

#[test]
fn test_server_checks_out_of_bounds_payloads() {
    let service = OfflineMapService::with_dimensions(Dimensions::new(2, 2).unwrap());
    let mut payload = walkthrough_map().to_payload();
    payload.map.pickup_locations.push(GridCoord::new(7, 1));

    let response = service.submit_map(&payload).unwrap();

    let errors = assert_matches!(
        response,
        grid_map_editor::SubmitResponse::Error { errors } => errors
    );
    assert_eq!(
        errors,
        vec![
            "Not enough non-task endpoints: 0 endpoints for 1 agents".to_string(),
            "Agent R1 is outside map boundaries".to_string(),
            "pickup_locations location (7, 1) is outside map boundaries".to_string(),
        ]
    );
}
