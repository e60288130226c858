// Grid Map Editor - Core Library

pub mod agent;
pub mod cell;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod map;
pub mod offline;
pub mod projection;
pub mod serialization;
pub mod service;
pub mod tool;
pub mod ui;
pub mod validation;
pub mod workflow;

// Re-export main types for convenience
pub use agent::Agent;
pub use cell::{CellRole, Dimensions, GridCoord, LocationKind};
pub use config::EditorConfig;
pub use engine::{handle_click, ClickOutcome, PendingAgent};
pub use error::{MapError, TransportError};
pub use event::{EventType, MapEvent};
pub use map::{LoadReport, MapModel};
pub use offline::OfflineMapService;
pub use projection::{
    project_agent_list, project_all, role_to_display, AgentListEntry, DisplayToken, GridProjection,
};
pub use serialization::{
    ArtifactSink, DimensionsPayload, DirectorySink, LocationsPayload, MapArtifact, MapPayload,
    SubmitResponse,
};
pub use service::{HttpMapService, MapService};
pub use tool::{Tool, ToolState};
pub use ui::MapEditorApp;
pub use validation::{
    ValidatedMap, ValidationIssue, ValidationIssueType, ValidationResult, ValidationSeverity,
    Validator,
};
pub use workflow::{
    load_dimensions, run_export, run_validation, RequestKind, ValidationReport, Workflow,
    WorkflowError, WorkflowEvent,
};
