//! Validate/export round-trips and the other server requests.
//!
//! Requests run on a worker thread and report back through a channel that the
//! UI drains once per frame. Only one request may be in flight at a time.

use crate::{ArtifactSink, Dimensions, MapModel, MapPayload, MapService, SubmitResponse};
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info, warn};

/// Outcome shown to the user after validate or export
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationReport {
    Passed,
    /// Messages exactly as the validator produced them
    Failed { errors: Vec<String> },
}

impl ValidationReport {
    fn from_response(response: SubmitResponse) -> Self {
        match response {
            SubmitResponse::Success { .. } => ValidationReport::Passed,
            SubmitResponse::Error { errors } => ValidationReport::Failed { errors },
        }
    }

    fn transport_failure(message: String) -> Self {
        ValidationReport::Failed {
            errors: vec![message],
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ValidationReport::Passed)
    }

    pub fn errors(&self) -> &[String] {
        match self {
            ValidationReport::Passed => &[],
            ValidationReport::Failed { errors } => errors,
        }
    }
}

/// Kinds of server request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Validate,
    Export,
    LoadExample,
    ResetDimensions,
    ApplyDimensions,
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RequestKind::Validate => "validate",
            RequestKind::Export => "export",
            RequestKind::LoadExample => "load example",
            RequestKind::ResetDimensions => "reset dimensions",
            RequestKind::ApplyDimensions => "apply dimensions",
        })
    }
}

/// Completed request, delivered by [`Workflow::poll`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowEvent {
    Validated(ValidationReport),

    Exported {
        report: ValidationReport,
        /// Where the sink put the file, if it managed to
        saved_to: Option<PathBuf>,
    },

    ExampleLoaded(Result<MapPayload, String>),

    DimensionsReset(Result<(), String>),

    DimensionsApplied(Result<Dimensions, String>),

    /// The request died before producing a result
    Failed {
        request: RequestKind,
        message: String,
    },
}

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("a {0} request is still in progress")]
    Busy(RequestKind),

    #[error("failed to start request: {0}")]
    Spawn(String),
}

// ========== Synchronous Round-Trips ==========

/// Submit a map and interpret the answer
pub fn run_validation(service: &dyn MapService, payload: &MapPayload) -> ValidationReport {
    match service.submit_map(payload) {
        Ok(response) => ValidationReport::from_response(response),
        Err(e) => {
            error!("Validation error: {}", e);
            ValidationReport::transport_failure(format!("Network error: {}", e))
        }
    }
}

/// Submit a map and hand a successful export to the sink.
///
/// A sink failure is logged but does not turn the export into a failure.
pub fn run_export(
    service: &dyn MapService,
    sink: &dyn ArtifactSink,
    payload: &MapPayload,
) -> (ValidationReport, Option<PathBuf>) {
    let response = match service.submit_map(payload) {
        Ok(response) => response,
        Err(e) => {
            error!("Export error: {}", e);
            return (
                ValidationReport::transport_failure(format!("Export failed: {}", e)),
                None,
            );
        }
    };

    let Some(artifact) = response.artifact() else {
        return match response {
            SubmitResponse::Error { errors } => (ValidationReport::Failed { errors }, None),
            SubmitResponse::Success { .. } => (
                ValidationReport::transport_failure(
                    "Export failed: response did not include a map file".to_string(),
                ),
                None,
            ),
        };
    };

    info!(filename = %artifact.filename, "Downloading exported map");
    let saved_to = match sink.save(&artifact) {
        Ok(path) => Some(path),
        Err(e) => {
            error!("Failed to save {}: {:#}", artifact.filename, e);
            None
        }
    };

    (ValidationReport::Passed, saved_to)
}

/// Session dimensions, or the default grid if the source is unavailable
pub fn load_dimensions(service: &dyn MapService) -> Dimensions {
    match service.fetch_dimensions() {
        Ok(dimensions) => {
            info!(%dimensions, "Dimensions loaded");
            dimensions
        }
        Err(e) => {
            warn!("Failed to load dimensions, using default: {}", e);
            Dimensions::DEFAULT
        }
    }
}

// ========== Background Requests ==========

type Job = Box<dyn FnOnce(&dyn MapService, &dyn ArtifactSink) -> WorkflowEvent + Send>;

/// Runs server requests off the UI thread, one at a time
pub struct Workflow {
    service: Arc<dyn MapService>,
    sink: Arc<dyn ArtifactSink>,
    sender: Sender<WorkflowEvent>,
    receiver: Receiver<WorkflowEvent>,
    in_flight: Option<RequestKind>,
    notify: Option<Arc<dyn Fn() + Send + Sync>>,
}

impl Workflow {
    pub fn new(service: Arc<dyn MapService>, sink: Arc<dyn ArtifactSink>) -> Self {
        let (sender, receiver) = crossbeam_channel::unbounded();
        Self {
            service,
            sink,
            sender,
            receiver,
            in_flight: None,
            notify: None,
        }
    }

    /// Called from the worker after each result is queued (e.g. to request a repaint)
    pub fn with_notifier(mut self, notify: impl Fn() + Send + Sync + 'static) -> Self {
        self.notify = Some(Arc::new(notify));
        self
    }

    pub fn service(&self) -> &dyn MapService {
        self.service.as_ref()
    }

    /// The request currently running, if any
    pub fn in_flight(&self) -> Option<RequestKind> {
        self.in_flight
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Validate the map as it is now
    pub fn validate(&mut self, map: &MapModel) -> Result<(), WorkflowError> {
        let payload = map.to_payload();
        self.start(
            RequestKind::Validate,
            Box::new(move |service: &dyn MapService, _: &dyn ArtifactSink| {
                WorkflowEvent::Validated(run_validation(service, &payload))
            }),
        )
    }

    /// Export the map as it is now
    pub fn export(&mut self, map: &MapModel) -> Result<(), WorkflowError> {
        let payload = map.to_payload();
        self.start(
            RequestKind::Export,
            Box::new(move |service: &dyn MapService, sink: &dyn ArtifactSink| {
                let (report, saved_to) = run_export(service, sink, &payload);
                WorkflowEvent::Exported { report, saved_to }
            }),
        )
    }

    /// Fetch the example map. The caller replaces its model when it arrives.
    pub fn load_example(&mut self) -> Result<(), WorkflowError> {
        self.start(
            RequestKind::LoadExample,
            Box::new(|service: &dyn MapService, _: &dyn ArtifactSink| {
                WorkflowEvent::ExampleLoaded(service.fetch_example().map_err(|e| e.to_string()))
            }),
        )
    }

    /// Clear the session dimensions on the server
    pub fn reset_dimensions(&mut self) -> Result<(), WorkflowError> {
        self.start(
            RequestKind::ResetDimensions,
            Box::new(|service: &dyn MapService, _: &dyn ArtifactSink| {
                WorkflowEvent::DimensionsReset(service.reset_dimensions().map_err(|e| e.to_string()))
            }),
        )
    }

    /// Store new session dimensions and read back what the server settled on
    pub fn apply_dimensions(&mut self, dimensions: Dimensions) -> Result<(), WorkflowError> {
        self.start(
            RequestKind::ApplyDimensions,
            Box::new(move |service: &dyn MapService, _: &dyn ArtifactSink| {
                let result = service
                    .apply_dimensions(dimensions)
                    .map(|()| load_dimensions(service))
                    .map_err(|e| e.to_string());
                WorkflowEvent::DimensionsApplied(result)
            }),
        )
    }

    /// Take a finished request without blocking
    pub fn poll(&mut self) -> Option<WorkflowEvent> {
        let event = self.receiver.try_recv().ok()?;
        self.in_flight = None;
        Some(event)
    }

    /// Block until the running request finishes or `timeout` passes
    pub fn wait(&mut self, timeout: Duration) -> Option<WorkflowEvent> {
        match self.receiver.recv_timeout(timeout) {
            Ok(event) => {
                self.in_flight = None;
                Some(event)
            }
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    fn start(&mut self, kind: RequestKind, job: Job) -> Result<(), WorkflowError> {
        if let Some(running) = self.in_flight {
            warn!(requested = %kind, %running, "request refused, another is in flight");
            return Err(WorkflowError::Busy(running));
        }

        let service = Arc::clone(&self.service);
        let sink = Arc::clone(&self.sink);
        let sender = self.sender.clone();
        let notify = self.notify.clone();

        std::thread::Builder::new()
            .name(format!("map-{}", kind).replace(' ', "-"))
            .spawn(move || {
                let outcome =
                    panic::catch_unwind(AssertUnwindSafe(|| job(service.as_ref(), sink.as_ref())));
                let event = outcome.unwrap_or_else(|payload| {
                    let message = panic_message(payload.as_ref());
                    error!(request = %kind, "request panicked: {}", message);
                    WorkflowEvent::Failed {
                        request: kind,
                        message,
                    }
                });
                let _ = sender.send(event);
                if let Some(notify) = notify {
                    notify();
                }
            })
            .map_err(|e| WorkflowError::Spawn(e.to_string()))?;

        info!(request = %kind, "request started");
        self.in_flight = Some(kind);
        Ok(())
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
