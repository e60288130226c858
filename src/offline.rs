//! In-process stand-in for the map server, used when no server is configured.

use crate::{
    Agent, Dimensions, GridCoord, LocationsPayload, MapArtifact, MapPayload, MapService,
    SubmitResponse, TransportError, Validator,
};
use std::sync::{Mutex, PoisonError};
use tracing::info;

/// Serves the same contract as the HTTP server without leaving the process.
///
/// Session dimensions live in memory; validation applies the error-level
/// checks of [`Validator`] and exports render YAML locally.
#[derive(Debug, Default)]
pub struct OfflineMapService {
    dimensions: Mutex<Option<Dimensions>>,
}

impl OfflineMapService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with session dimensions already chosen
    pub fn with_dimensions(dimensions: Dimensions) -> Self {
        Self {
            dimensions: Mutex::new(Some(dimensions)),
        }
    }

    fn session_dimensions(&self) -> Option<Dimensions> {
        *self.dimensions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_session_dimensions(&self, dimensions: Option<Dimensions>) {
        *self.dimensions.lock().unwrap_or_else(PoisonError::into_inner) = dimensions;
    }

    /// The map offered by "Load Example"
    pub fn example_payload() -> MapPayload {
        MapPayload {
            agents: vec![Agent::new("agent1", GridCoord::new(0, 0))],
            map: LocationsPayload {
                non_task_endpoints: vec![GridCoord::new(0, 0)],
                ..Default::default()
            },
        }
    }
}

impl MapService for OfflineMapService {
    fn fetch_dimensions(&self) -> Result<Dimensions, TransportError> {
        Ok(self.session_dimensions().unwrap_or_default())
    }

    fn apply_dimensions(&self, dimensions: Dimensions) -> Result<(), TransportError> {
        info!(%dimensions, "Saved dimensions to session");
        self.set_session_dimensions(Some(dimensions));
        Ok(())
    }

    fn reset_dimensions(&self) -> Result<(), TransportError> {
        self.set_session_dimensions(None);
        Ok(())
    }

    fn submit_map(&self, payload: &MapPayload) -> Result<SubmitResponse, TransportError> {
        let dimensions = self.session_dimensions().unwrap_or_default();

        let errors = Validator::validate_payload(payload, dimensions).error_messages();
        if !errors.is_empty() {
            return Ok(SubmitResponse::Error { errors });
        }

        match MapArtifact::yaml(payload, dimensions) {
            Ok(artifact) => Ok(SubmitResponse::Success {
                yaml: Some(artifact.content),
                filename: Some(artifact.filename),
            }),
            Err(e) => Ok(SubmitResponse::Error {
                errors: vec![e.to_string()],
            }),
        }
    }

    fn fetch_example(&self) -> Result<MapPayload, TransportError> {
        Ok(Self::example_payload())
    }
}
