use anyhow::Result;
use eframe::egui;
use grid_map_editor::{load_dimensions, DirectorySink, EditorConfig, MapEditorApp, Workflow};
use std::sync::Arc;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = EditorConfig::load()?;
    tracing::info!(output_dir = %config.output_dir.display(), "Starting Grid Map Editor");

    let service = config.build_service()?;
    let dimensions = load_dimensions(service.as_ref());
    let sink = Arc::new(DirectorySink::new(config.output_dir.clone()));

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 760.0])
            .with_title("Grid Map Editor"),
        ..Default::default()
    };

    eframe::run_native(
        "Grid Map Editor",
        options,
        Box::new(move |cc| {
            let ctx = cc.egui_ctx.clone();
            let workflow = Workflow::new(service, sink).with_notifier(move || ctx.request_repaint());
            Ok(Box::new(MapEditorApp::new(workflow, dimensions)))
        }),
    )
    .map_err(|e| anyhow::anyhow!("Failed to run editor: {}", e))
}
