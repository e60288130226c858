use anyhow::Result;
use grid_map_editor::{
    handle_click, project_agent_list, project_all, run_validation, ClickOutcome, Dimensions,
    GridCoord, MapModel, MapService, OfflineMapService, Tool, ToolState, ValidatedMap,
};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    println!("Grid Map Editor - Headless Walkthrough");
    println!("======================================\n");

    let dimensions = Dimensions::new(3, 3)?;
    let service = OfflineMapService::with_dimensions(dimensions);
    let mut map = MapModel::new(dimensions);
    let mut tools = ToolState::default();

    println!("✓ Created {} map", map.dimensions());

    // Paint an obstacle and a pickup location
    tools.select(Tool::Obstacle);
    handle_click(&mut map, tools.current(), GridCoord::new(0, 0))?;
    tools.select(Tool::Pickup);
    handle_click(&mut map, tools.current(), GridCoord::new(1, 1))?;

    // The agent tool asks for a name before placing
    tools.select(Tool::Agent);
    if let ClickOutcome::AgentRequested(pending) =
        handle_click(&mut map, tools.current(), GridCoord::new(2, 2))?
    {
        pending.complete(&mut map, "R1")?;
    }

    tools.select(Tool::Erase);
    handle_click(&mut map, tools.current(), GridCoord::new(1, 1))?;

    println!("\n✓ Painted obstacle, pickup and agent, then erased the pickup");
    print!("{}", project_all(&map).to_ascii());

    println!("\n👤 Agents:");
    for entry in project_agent_list(&map) {
        println!("  └─ {}", entry.label());
    }

    println!("\n🔍 Local checks:");
    for issue in map.validate().issues {
        println!("  └─ [{:?}] {}", issue.severity, issue.message);
    }

    println!("\n📤 Validation (offline service):");
    let report = run_validation(&service, &map.to_payload());
    for error in report.errors() {
        println!("  ✗ {}", error);
    }

    // An endpoint per agent makes the map acceptable
    tools.select(Tool::Endpoint);
    handle_click(&mut map, tools.current(), GridCoord::new(0, 2))?;
    print!("\n✓ Added a non-task endpoint\n{}", project_all(&map).to_ascii());

    let report = run_validation(&service, &map.to_payload());
    println!(
        "\n📤 Validation: {}",
        if report.is_success() { "passed" } else { "failed" }
    );

    if let Some(artifact) = service.submit_map(&map.to_payload())?.artifact() {
        println!("\n📄 {}:\n{}", artifact.filename, artifact.content);
    }

    println!("📜 History:");
    for event in map.events() {
        println!("  └─ {}", event.event.describe());
    }

    Ok(())
}
