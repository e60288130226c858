use crate::{Agent, Dimensions, GridCoord, LocationKind};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Map description exchanged with the validation server.
///
/// Also the shape of the example map served by the example source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapPayload {
    pub agents: Vec<Agent>,
    pub map: LocationsPayload,
}

/// The `map` section of a payload
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationsPayload {
    #[serde(default)]
    pub obstacles: Vec<GridCoord>,
    #[serde(default)]
    pub non_task_endpoints: Vec<GridCoord>,
    #[serde(default)]
    pub pickup_locations: Vec<GridCoord>,
    #[serde(default)]
    pub delivery_locations: Vec<GridCoord>,
}

impl LocationsPayload {
    /// The list for one location set
    pub fn get(&self, kind: LocationKind) -> &[GridCoord] {
        match kind {
            LocationKind::Obstacle => &self.obstacles,
            LocationKind::NonTaskEndpoint => &self.non_task_endpoints,
            LocationKind::PickupLocation => &self.pickup_locations,
            LocationKind::DeliveryLocation => &self.delivery_locations,
        }
    }
}

impl MapPayload {
    /// Encode as the JSON request body
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).context("Failed to encode map payload")
    }

    /// Decode a JSON payload
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse map payload")
    }
}

/// `{width, height}` as served by the dimension source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionsPayload {
    pub width: u32,
    pub height: u32,
}

impl From<Dimensions> for DimensionsPayload {
    fn from(dims: Dimensions) -> Self {
        Self {
            width: dims.width(),
            height: dims.height(),
        }
    }
}

/// Server answer to a validate/export submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum SubmitResponse {
    Success {
        /// Serialized map, present on export
        #[serde(default, skip_serializing_if = "Option::is_none")]
        yaml: Option<String>,
        /// Suggested file name for the serialized map
        #[serde(default, skip_serializing_if = "Option::is_none")]
        filename: Option<String>,
    },
    Error {
        #[serde(default)]
        errors: Vec<String>,
    },
}

impl SubmitResponse {
    /// The downloadable artifact carried by a successful export
    pub fn artifact(&self) -> Option<MapArtifact> {
        match self {
            SubmitResponse::Success {
                yaml: Some(content),
                filename: Some(filename),
            } => Some(MapArtifact {
                content: content.clone(),
                filename: filename.clone(),
            }),
            _ => None,
        }
    }
}

/// A ready-to-save exported map
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapArtifact {
    pub content: String,
    pub filename: String,
}

/// YAML document layout written by the exporter
#[derive(Debug, Serialize)]
struct YamlDocument<'a> {
    agents: &'a [Agent],
    map: YamlMap<'a>,
}

#[derive(Debug, Serialize)]
struct YamlMap<'a> {
    dimensions: [u32; 2],
    obstacles: &'a [GridCoord],
    non_task_endpoints: &'a [GridCoord],
    pickup_locations: &'a [GridCoord],
    delivery_locations: &'a [GridCoord],
}

impl MapArtifact {
    /// Render a payload as the simulator's YAML map file
    pub fn yaml(payload: &MapPayload, dimensions: Dimensions) -> Result<Self> {
        let document = YamlDocument {
            agents: &payload.agents,
            map: YamlMap {
                dimensions: [dimensions.width(), dimensions.height()],
                obstacles: &payload.map.obstacles,
                non_task_endpoints: &payload.map.non_task_endpoints,
                pickup_locations: &payload.map.pickup_locations,
                delivery_locations: &payload.map.delivery_locations,
            },
        };

        let content = serde_yaml::to_string(&document).context("Failed to render map YAML")?;

        Ok(Self {
            content,
            filename: format!("map_{}x{}.yaml", dimensions.width(), dimensions.height()),
        })
    }
}

/// Destination for exported maps
pub trait ArtifactSink: Send + Sync {
    /// Persist the artifact, returning where it went
    fn save(&self, artifact: &MapArtifact) -> Result<PathBuf>;
}

/// Writes exported maps into a directory
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl ArtifactSink for DirectorySink {
    fn save(&self, artifact: &MapArtifact) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create output directory: {}", self.dir.display()))?;

        // Only the final component of the suggested name is used
        let filename = Path::new(&artifact.filename)
            .file_name()
            .with_context(|| format!("Invalid file name: {}", artifact.filename))?;
        let path = self.dir.join(filename);

        let file = File::create(&path)
            .with_context(|| format!("Failed to create map file: {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        writer
            .write_all(artifact.content.as_bytes())
            .with_context(|| format!("Failed to write map file: {}", path.display()))?;
        writer
            .flush()
            .with_context(|| format!("Failed to flush map file: {}", path.display()))?;

        Ok(path)
    }
}
