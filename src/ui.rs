use crate::{
    engine::{handle_click, ClickOutcome, PendingAgent},
    projection::{project_agent_list, project_all, role_to_display},
    validation::{ValidatedMap, ValidationSeverity},
    workflow::{RequestKind, ValidationReport, Workflow, WorkflowEvent},
    CellRole, Dimensions, GridCoord, LoadReport, MapModel, Tool, ToolState,
};
use egui::{pos2, vec2, Align2, Color32, FontId, Pos2, Rect, Sense, Stroke};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{info, warn};

/// Side length of one grid cell in points
const CELL_SIZE: f32 = 25.0;
/// Gap between neighbouring cells
const CELL_GAP: f32 = 1.0;
/// Largest side the setup form accepts
const MAX_SIDE: u32 = 500;
/// History entries shown in the side panel
const RECENT_EVENTS: usize = 10;

/// Main application state
pub struct MapEditorApp {
    screen: Screen,

    /// The map being edited
    map: MapModel,

    /// Active paint tool
    tools: ToolState,

    /// Server round-trips
    workflow: Workflow,

    /// Values in the setup form
    setup: SetupForm,

    /// Open "Add Agent" dialog, if any
    agent_dialog: Option<AgentDialog>,

    /// Pending confirmation, if any
    confirm: Option<Confirm>,

    /// Last validate/export outcome
    results: Option<ValidationReport>,

    /// Where the last export was written
    last_export: Option<PathBuf>,

    /// Local pre-check severities per cell
    local_issues: HashMap<GridCoord, ValidationSeverity>,

    /// Whether the local checks panel is visible
    show_local_checks: bool,

    /// Cell under the pointer
    hovered: Option<GridCoord>,

    /// Status message
    status_message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    Setup,
    Builder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SetupForm {
    width: u32,
    height: u32,
}

impl From<Dimensions> for SetupForm {
    fn from(dimensions: Dimensions) -> Self {
        Self {
            width: dimensions.width(),
            height: dimensions.height(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct AgentDialog {
    name: String,
    x: u32,
    y: u32,
    error: Option<String>,
}

impl AgentDialog {
    fn at(coord: GridCoord) -> Self {
        Self {
            x: coord.x(),
            y: coord.y(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Confirm {
    ClearMap,
    ResetDimensions,
}

impl Confirm {
    fn question(self) -> &'static str {
        match self {
            Confirm::ClearMap => "Are you sure you want to clear the entire map?",
            Confirm::ResetDimensions => {
                "Are you sure you want to reset map dimensions? This will clear the current map."
            }
        }
    }
}

enum DialogAction {
    None,
    Submit,
    Cancel,
}

impl MapEditorApp {
    /// Create the app on the setup screen, with the form showing `dimensions`
    pub fn new(workflow: Workflow, dimensions: Dimensions) -> Self {
        Self {
            screen: Screen::Setup,
            map: MapModel::new(dimensions),
            tools: ToolState::default(),
            workflow,
            setup: SetupForm::from(dimensions),
            agent_dialog: None,
            confirm: None,
            results: None,
            last_export: None,
            local_issues: HashMap::new(),
            show_local_checks: true,
            hovered: None,
            status_message: "Choose map dimensions to start.".to_string(),
        }
    }

    /// The map being edited
    pub fn map(&self) -> &MapModel {
        &self.map
    }

    // ========== Actions ==========

    /// Apply the current tool to a cell
    fn click_cell(&mut self, coord: GridCoord) {
        match handle_click(&mut self.map, self.tools.current(), coord) {
            Ok(ClickOutcome::AgentRequested(PendingAgent { coord })) => {
                self.agent_dialog = Some(AgentDialog::at(coord));
            }
            Ok(_) => {}
            Err(e) => self.status_message = format!("❌ {}", e),
        }
    }

    /// Try to add the agent described by the dialog. Keeps the dialog open on failure.
    fn submit_agent_dialog(&mut self) {
        let Some(dialog) = self.agent_dialog.as_mut() else {
            return;
        };

        let result = self
            .map
            .dimensions()
            .coord(dialog.x, dialog.y)
            .and_then(|coord| PendingAgent { coord }.complete(&mut self.map, dialog.name.trim()));

        match result {
            Ok(displaced) => {
                self.status_message = match displaced {
                    Some(agent) => format!(
                        "✓ Added agent {} (replaced agent {} at {})",
                        dialog.name.trim(),
                        agent.name,
                        agent.start
                    ),
                    None => format!("✓ Added agent {}", dialog.name.trim()),
                };
                self.agent_dialog = None;
            }
            Err(e) => dialog.error = Some(e.to_string()),
        }
    }

    fn clear_history(&mut self) {
        self.map.clear_events();
        self.status_message = "History cleared".to_string();
    }

    fn remove_agent(&mut self, name: &str) {
        if self.map.remove_agent(name).is_some() {
            self.status_message = format!("Removed agent {}", name);
        }
    }

    fn validate_map(&mut self) {
        let started = self.workflow.validate(&self.map);
        self.report_start(started, "Validating map...");
    }

    fn export_map(&mut self) {
        let started = self.workflow.export(&self.map);
        self.report_start(started, "Exporting map...");
    }

    fn load_example(&mut self) {
        let started = self.workflow.load_example();
        self.report_start(started, "Loading example...");
    }

    fn apply_setup(&mut self) {
        let result = Dimensions::new(self.setup.width.max(1), self.setup.height.max(1));
        match result {
            Ok(dimensions) => {
                let started = self.workflow.apply_dimensions(dimensions);
                self.report_start(started, "Saving dimensions...");
            }
            Err(e) => self.status_message = format!("❌ {}", e),
        }
    }

    fn confirmed(&mut self, confirm: Confirm) {
        match confirm {
            Confirm::ClearMap => {
                self.map.reset();
                self.results = None;
                self.status_message = "Map cleared".to_string();
            }
            Confirm::ResetDimensions => {
                let started = self.workflow.reset_dimensions();
                self.report_start(started, "Resetting dimensions...");
            }
        }
    }

    fn report_start<E: std::fmt::Display>(&mut self, started: Result<(), E>, message: &str) {
        self.status_message = match started {
            Ok(()) => message.to_string(),
            Err(e) => format!("⚠ {}", e),
        };
    }

    /// Fold a finished request into the editor state
    fn handle_workflow_event(&mut self, event: WorkflowEvent) {
        match event {
            WorkflowEvent::Validated(report) => {
                self.status_message = if report.is_success() {
                    "✓ Validation passed".to_string()
                } else {
                    format!("❌ Validation failed: {} errors", report.errors().len())
                };
                self.results = Some(report);
            }
            WorkflowEvent::Exported { report, saved_to } => {
                self.status_message = match (&saved_to, report.is_success()) {
                    (Some(path), _) => format!("✓ Exported to {}", path.display()),
                    (None, true) => "⚠ Map is valid but the file could not be saved".to_string(),
                    (None, false) => "❌ Export failed".to_string(),
                };
                self.last_export = saved_to;
                self.results = Some(report);
            }
            WorkflowEvent::ExampleLoaded(Ok(payload)) => {
                let report = self.map.load_payload(&payload);
                self.results = None;
                self.screen = Screen::Builder;
                self.status_message = self.load_status("Example", &report);
            }
            WorkflowEvent::ExampleLoaded(Err(e)) => {
                warn!("Failed to load example: {}", e);
                self.status_message = format!("❌ Failed to load example: {}", e);
            }
            WorkflowEvent::DimensionsApplied(Ok(dimensions)) => {
                info!(%dimensions, "Starting new map");
                self.map = MapModel::new(dimensions);
                self.setup = SetupForm::from(dimensions);
                self.results = None;
                self.screen = Screen::Builder;
                self.status_message = format!("Map {} ready", dimensions);
            }
            WorkflowEvent::DimensionsApplied(Err(e)) => {
                self.status_message = format!("❌ Failed to save dimensions: {}", e);
            }
            WorkflowEvent::DimensionsReset(Ok(())) => {
                self.map = MapModel::new(Dimensions::DEFAULT);
                self.setup = SetupForm::from(Dimensions::DEFAULT);
                self.results = None;
                self.agent_dialog = None;
                self.screen = Screen::Setup;
                self.status_message = "Dimensions reset. Choose new map dimensions.".to_string();
            }
            WorkflowEvent::DimensionsReset(Err(e)) => {
                self.status_message = format!("❌ Failed to reset dimensions: {}", e);
            }
            WorkflowEvent::Failed { request, message } => {
                self.status_message = format!("❌ The {} request failed: {}", request, message);
            }
        }
    }

    /// Status line after replacing the map from a payload.
    ///
    /// Entries that had to be dropped or displaced are named, along with the
    /// first error the adjusted map will now fail validation with.
    fn load_status(&self, what: &str, report: &LoadReport) -> String {
        if report.is_clean() {
            return format!("✓ {} loaded", what);
        }

        let mut message = format!("⚠ {} loaded with {} entries adjusted", what, report.adjusted());
        if !report.displaced.is_empty() {
            let cells: Vec<String> = report.displaced.iter().map(|c| c.to_string()).collect();
            message.push_str(&format!(" (overlaps resolved at {})", cells.join(", ")));
        }
        if let Some(issue) = self.map.validate().errors().first() {
            message.push_str(&format!(". Validation will fail: {}", issue.message));
        }
        message
    }

    // ========== Rendering ==========

    /// Render the entire UI
    fn render_ui(&mut self, ctx: &egui::Context) {
        while let Some(event) = self.workflow.poll() {
            self.handle_workflow_event(event);
        }

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if let Some(kind) = self.workflow.in_flight() {
                    ui.spinner();
                    ui.label(busy_label(kind));
                    ui.separator();
                }
                ui.label(&self.status_message);
            });
        });

        match self.screen {
            Screen::Setup => self.render_setup(ctx),
            Screen::Builder => self.render_builder(ctx),
        }

        self.render_agent_dialog(ctx);
        self.render_confirm(ctx);
    }

    /// Render the dimension setup screen
    fn render_setup(&mut self, ctx: &egui::Context) {
        let busy = self.workflow.is_busy();

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(40.0);
                ui.heading("Grid Map Editor");
                ui.label("Set the size of the map before placing anything.");
                ui.add_space(20.0);

                egui::Grid::new("setup_form").num_columns(2).show(ui, |ui| {
                    ui.label("Width:");
                    ui.add(egui::DragValue::new(&mut self.setup.width).range(1..=MAX_SIDE));
                    ui.end_row();

                    ui.label("Height:");
                    ui.add(egui::DragValue::new(&mut self.setup.height).range(1..=MAX_SIDE));
                    ui.end_row();
                });

                ui.add_space(10.0);
                ui.horizontal(|ui| {
                    if ui.add_enabled(!busy, egui::Button::new("Create Map")).clicked() {
                        self.apply_setup();
                    }
                    if ui.button("Default (20×20)").clicked() {
                        self.setup = SetupForm::from(Dimensions::DEFAULT);
                    }
                    if ui.add_enabled(!busy, egui::Button::new("Load Example")).clicked() {
                        self.load_example();
                    }
                });
            });
        });
    }

    /// Render the map builder screen
    fn render_builder(&mut self, ctx: &egui::Context) {
        if self.show_local_checks {
            let result = self.map.validate();
            self.local_issues = self.map.cells_with_issues(&result);
        } else {
            self.local_issues.clear();
        }

        let busy = self.workflow.is_busy();

        // Toolbar
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.horizontal_wrapped(|ui| {
                for tool in Tool::ALL {
                    if ui
                        .selectable_label(self.tools.is_selected(tool), tool.label())
                        .clicked()
                    {
                        self.tools.select(tool);
                    }
                }

                ui.separator();

                if ui.button("👤 Add Agent").clicked() {
                    self.agent_dialog = Some(AgentDialog::default());
                }
                if ui.add_enabled(!busy, egui::Button::new("✓ Validate")).clicked() {
                    self.validate_map();
                }
                if ui.add_enabled(!busy, egui::Button::new("💾 Export")).clicked() {
                    self.export_map();
                }
                if ui.add_enabled(!busy, egui::Button::new("Load Example")).clicked() {
                    self.load_example();
                }
                if ui.button("Clear").clicked() {
                    self.confirm = Some(Confirm::ClearMap);
                }
                if ui.add_enabled(!busy, egui::Button::new("Reset Dimensions")).clicked() {
                    self.confirm = Some(Confirm::ResetDimensions);
                }

                ui.separator();
                ui.checkbox(&mut self.show_local_checks, "Local checks");
            });

            ui.horizontal(|ui| {
                ui.label(format!("Current: {}", self.tools.current().label()));
                ui.separator();
                ui.label(format!("Size: {}", self.map.dimensions()));
                ui.separator();
                match self.hovered {
                    Some(coord) => ui.label(format!("Cell: {}", coord)),
                    None => ui.label("Cell: -"),
                };
            });
        });

        egui::SidePanel::right("side_panel")
            .default_width(280.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    self.render_agent_list(ui);
                    ui.separator();
                    self.render_results(ui);
                    if self.show_local_checks {
                        ui.separator();
                        self.render_local_checks(ui);
                    }
                    ui.separator();
                    self.render_history(ui);
                });
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::both().show(ui, |ui| {
                self.render_grid(ui);
            });
        });
    }

    /// Paint the grid and handle clicks on it
    fn render_grid(&mut self, ui: &mut egui::Ui) {
        let dimensions = self.map.dimensions();
        let pitch = CELL_SIZE + CELL_GAP;
        let size = vec2(
            dimensions.width() as f32 * pitch + CELL_GAP,
            dimensions.height() as f32 * pitch + CELL_GAP,
        );
        let (response, painter) = ui.allocate_painter(size, Sense::click());
        let origin = response.rect.min;

        self.hovered = response
            .hover_pos()
            .and_then(|pos| cell_at(origin, pos, dimensions));

        painter.rect_filled(response.rect, 0.0, Color32::from_rgb(0xf8, 0xf9, 0xfa));

        let projection = project_all(&self.map);
        for (coord, role) in projection.cells() {
            let rect = cell_rect(origin, coord);
            let token = role_to_display(role);
            let mut fill = rgb(token.fill);
            if self.hovered == Some(coord) && role == CellRole::Empty {
                fill = Color32::from_rgb(0xe9, 0xec, 0xef);
            }

            painter.rect_filled(rect, 0.0, fill);
            painter.rect_stroke(rect, 0.0, Stroke::new(1.0, Color32::from_gray(0x66)));

            if role == CellRole::Agent {
                if let Some(agent) = self.map.agents().iter().find(|a| a.starts_at(coord)) {
                    let short_name: String = agent.name.chars().take(2).collect();
                    painter.text(
                        rect.center(),
                        Align2::CENTER_CENTER,
                        short_name,
                        FontId::proportional(10.0),
                        rgb(token.text),
                    );
                }
            }

            if let Some(severity) = self.local_issues.get(&coord) {
                painter.rect_stroke(rect.shrink(1.0), 0.0, Stroke::new(2.0, severity_color(*severity)));
            }
        }

        if let Some(coord) = self.hovered {
            painter.rect_stroke(
                cell_rect(origin, coord).expand(1.0),
                0.0,
                Stroke::new(1.5, Color32::from_rgb(0x00, 0x7b, 0xff)),
            );
        }

        if response.clicked() {
            if let Some(coord) = response
                .interact_pointer_pos()
                .and_then(|pos| cell_at(origin, pos, dimensions))
            {
                self.click_cell(coord);
            }
        }
    }

    /// Render the agent list
    fn render_agent_list(&mut self, ui: &mut egui::Ui) {
        ui.heading("Agents");

        let entries = project_agent_list(&self.map);
        if entries.is_empty() {
            ui.label("  (none)");
            return;
        }

        let mut remove = None;
        for entry in &entries {
            ui.horizontal(|ui| {
                ui.label(entry.label());
                if ui.small_button("×").clicked() {
                    remove = Some(entry.name.clone());
                }
            });
        }

        if let Some(name) = remove {
            self.remove_agent(&name);
        }
    }

    /// Render the last validate/export outcome
    fn render_results(&mut self, ui: &mut egui::Ui) {
        ui.heading("Validation");

        match &self.results {
            None => {
                ui.label("Not validated yet");
            }
            Some(ValidationReport::Passed) => {
                ui.label(
                    egui::RichText::new("✓ Validation Successful!")
                        .color(Color32::from_rgb(0x28, 0xa7, 0x45))
                        .strong(),
                );
                ui.label("Map meets all constraints.");
                if let Some(path) = &self.last_export {
                    ui.label(format!("Saved to {}", path.display()));
                }
            }
            Some(ValidationReport::Failed { errors }) => {
                ui.label(
                    egui::RichText::new("✗ Validation Failed:")
                        .color(Color32::RED)
                        .strong(),
                );
                for error in errors {
                    ui.label(format!("• {}", error));
                }
            }
        }
    }

    /// Render the local pre-check panel
    fn render_local_checks(&mut self, ui: &mut egui::Ui) {
        ui.heading("Local checks");

        let result = self.map.validate();
        if result.issues.is_empty() {
            ui.colored_label(Color32::from_rgb(0x28, 0xa7, 0x45), "✓ All checks passed");
            return;
        }

        for (issues, icon, severity) in [
            (result.errors(), "❌", ValidationSeverity::Error),
            (result.warnings(), "⚠", ValidationSeverity::Warning),
            (result.info(), "ℹ", ValidationSeverity::Info),
        ] {
            for issue in issues {
                ui.horizontal_wrapped(|ui| {
                    ui.colored_label(severity_color(severity), icon);
                    ui.label(&issue.message);
                });
            }
        }
    }

    /// Render recent edit history, newest first
    fn render_history(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.heading("History");
            if ui
                .add_enabled(!self.map.events().is_empty(), egui::Button::new("Clear history"))
                .clicked()
            {
                self.clear_history();
            }
        });

        let events = self.map.events();
        if events.is_empty() {
            ui.label("  (no edits yet)");
        }
        for event in events.iter().rev().take(RECENT_EVENTS) {
            ui.label(format!(
                "{}  {}",
                event.timestamp.format("%H:%M:%S"),
                event.event.describe()
            ));
        }
    }

    /// Render the "Add Agent" dialog
    fn render_agent_dialog(&mut self, ctx: &egui::Context) {
        let Some(dialog) = self.agent_dialog.as_mut() else {
            return;
        };

        let mut action = DialogAction::None;
        egui::Window::new("Add Agent")
            .collapsible(false)
            .resizable(false)
            .anchor(Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                egui::Grid::new("agent_form").num_columns(2).show(ui, |ui| {
                    ui.label("Name:");
                    ui.text_edit_singleline(&mut dialog.name);
                    ui.end_row();

                    ui.label("X:");
                    ui.add(egui::DragValue::new(&mut dialog.x));
                    ui.end_row();

                    ui.label("Y:");
                    ui.add(egui::DragValue::new(&mut dialog.y));
                    ui.end_row();
                });

                if let Some(error) = &dialog.error {
                    ui.colored_label(Color32::RED, error);
                }

                ui.horizontal(|ui| {
                    if ui.button("Add").clicked() {
                        action = DialogAction::Submit;
                    }
                    if ui.button("Cancel").clicked() {
                        action = DialogAction::Cancel;
                    }
                });
            });

        match action {
            DialogAction::None => {}
            DialogAction::Submit => self.submit_agent_dialog(),
            DialogAction::Cancel => self.agent_dialog = None,
        }
    }

    /// Render the pending confirmation, if any
    fn render_confirm(&mut self, ctx: &egui::Context) {
        let Some(confirm) = self.confirm else {
            return;
        };

        let mut answer = None;
        egui::Window::new("Confirm")
            .collapsible(false)
            .resizable(false)
            .anchor(Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(confirm.question());
                ui.horizontal(|ui| {
                    if ui.button("OK").clicked() {
                        answer = Some(true);
                    }
                    if ui.button("Cancel").clicked() {
                        answer = Some(false);
                    }
                });
            });

        if let Some(yes) = answer {
            self.confirm = None;
            if yes {
                self.confirmed(confirm);
            }
        }
    }
}

// ========== Geometry ==========

/// Screen rectangle of a cell
fn cell_rect(origin: Pos2, coord: GridCoord) -> Rect {
    let pitch = CELL_SIZE + CELL_GAP;
    let min = pos2(
        origin.x + CELL_GAP + coord.x() as f32 * pitch,
        origin.y + CELL_GAP + coord.y() as f32 * pitch,
    );
    Rect::from_min_size(min, vec2(CELL_SIZE, CELL_SIZE))
}

/// Cell under a screen position, if any
fn cell_at(origin: Pos2, pos: Pos2, dimensions: Dimensions) -> Option<GridCoord> {
    let offset = pos - origin;
    if offset.x < 0.0 || offset.y < 0.0 {
        return None;
    }

    let pitch = CELL_SIZE + CELL_GAP;
    let coord = GridCoord::new((offset.x / pitch) as u32, (offset.y / pitch) as u32);
    dimensions.contains(coord).then_some(coord)
}

fn rgb([r, g, b]: [u8; 3]) -> Color32 {
    Color32::from_rgb(r, g, b)
}

fn severity_color(severity: ValidationSeverity) -> Color32 {
    match severity {
        ValidationSeverity::Error => Color32::RED,
        ValidationSeverity::Warning => Color32::from_rgb(255, 165, 0),
        ValidationSeverity::Info => Color32::BLUE,
    }
}

fn busy_label(kind: RequestKind) -> &'static str {
    match kind {
        RequestKind::Validate => "Validating...",
        RequestKind::Export => "Exporting...",
        RequestKind::LoadExample => "Loading example...",
        RequestKind::ResetDimensions => "Resetting dimensions...",
        RequestKind::ApplyDimensions => "Saving dimensions...",
    }
}

impl eframe::App for MapEditorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.render_ui(ctx);
    }
}
