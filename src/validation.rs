use crate::{Dimensions, GridCoord, LocationKind, MapModel, MapPayload};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Validation severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ValidationSeverity {
    Info,    // Blue - informational
    Warning, // Yellow - map is usable but incomplete
    Error,   // Red - the simulator will reject the map
}

/// Validation issue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub severity: ValidationSeverity,
    pub message: String,
    pub affected_cells: Vec<GridCoord>,
    pub issue_type: ValidationIssueType,
}

/// Types of validation issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationIssueType {
    NotEnoughEndpoints,
    AgentOutOfBounds,
    LocationOutOfBounds,
    NoPickupLocations,
    NoDeliveryLocations,
    NoAgents,
}

/// Complete validation result
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationResult {
    /// Create a new empty validation result
    pub fn new() -> Self {
        Self { issues: Vec::new() }
    }

    /// Add an issue
    pub fn add_issue(&mut self, issue: ValidationIssue) {
        self.issues.push(issue);
    }

    /// Check if there are any errors
    pub fn has_errors(&self) -> bool {
        self.issues
            .iter()
            .any(|i| i.severity == ValidationSeverity::Error)
    }

    /// Check if there are any warnings
    pub fn has_warnings(&self) -> bool {
        self.issues
            .iter()
            .any(|i| i.severity == ValidationSeverity::Warning)
    }

    /// Get all errors
    pub fn errors(&self) -> Vec<&ValidationIssue> {
        self.with_severity(ValidationSeverity::Error)
    }

    /// Get all warnings
    pub fn warnings(&self) -> Vec<&ValidationIssue> {
        self.with_severity(ValidationSeverity::Warning)
    }

    /// Get all info messages
    pub fn info(&self) -> Vec<&ValidationIssue> {
        self.with_severity(ValidationSeverity::Info)
    }

    fn with_severity(&self, severity: ValidationSeverity) -> Vec<&ValidationIssue> {
        self.issues.iter().filter(|i| i.severity == severity).collect()
    }

    /// Error messages only, in the order the server reports them
    pub fn error_messages(&self) -> Vec<String> {
        self.errors().into_iter().map(|i| i.message.clone()).collect()
    }

    /// Check if validation passed (no errors)
    pub fn is_valid(&self) -> bool {
        !self.has_errors()
    }
}

/// Structural checks the simulator applies to a map
pub struct Validator;

impl Validator {
    /// Run all checks on the map being edited
    pub fn validate(map: &MapModel) -> ValidationResult {
        Self::validate_payload(&map.to_payload(), map.dimensions())
    }

    /// Run all checks on a submitted payload.
    ///
    /// Payloads come from outside the editor, so bounds are checked here too.
    pub fn validate_payload(payload: &MapPayload, dimensions: Dimensions) -> ValidationResult {
        let mut result = ValidationResult::new();

        // Every agent needs an endpoint to park on
        let endpoints = payload.map.non_task_endpoints.len();
        let agents = payload.agents.len();
        if endpoints < agents {
            result.add_issue(ValidationIssue {
                severity: ValidationSeverity::Error,
                message: format!(
                    "Not enough non-task endpoints: {} endpoints for {} agents",
                    endpoints, agents
                ),
                affected_cells: payload.agents.iter().map(|a| a.start).collect(),
                issue_type: ValidationIssueType::NotEnoughEndpoints,
            });
        }

        for agent in &payload.agents {
            if !dimensions.contains(agent.start) {
                result.add_issue(ValidationIssue {
                    severity: ValidationSeverity::Error,
                    message: format!("Agent {} is outside map boundaries", agent.name),
                    affected_cells: vec![],
                    issue_type: ValidationIssueType::AgentOutOfBounds,
                });
            }
        }

        for kind in LocationKind::ALL {
            for &coord in payload.map.get(kind) {
                if !dimensions.contains(coord) {
                    result.add_issue(ValidationIssue {
                        severity: ValidationSeverity::Error,
                        message: format!(
                            "{} location ({}, {}) is outside map boundaries",
                            kind.set_name(),
                            coord.x(),
                            coord.y()
                        ),
                        affected_cells: vec![],
                        issue_type: ValidationIssueType::LocationOutOfBounds,
                    });
                }
            }
        }

        if payload.map.pickup_locations.is_empty() {
            result.add_issue(ValidationIssue {
                severity: ValidationSeverity::Warning,
                message: "No pickup locations. Tasks cannot be generated.".to_string(),
                affected_cells: vec![],
                issue_type: ValidationIssueType::NoPickupLocations,
            });
        }

        if payload.map.delivery_locations.is_empty() {
            result.add_issue(ValidationIssue {
                severity: ValidationSeverity::Warning,
                message: "No delivery locations. Tasks cannot be completed.".to_string(),
                affected_cells: vec![],
                issue_type: ValidationIssueType::NoDeliveryLocations,
            });
        }

        if payload.agents.is_empty() {
            result.add_issue(ValidationIssue {
                severity: ValidationSeverity::Info,
                message: "No agents placed yet.".to_string(),
                affected_cells: vec![],
                issue_type: ValidationIssueType::NoAgents,
            });
        }

        result
    }
}

/// Extension trait for MapModel to add validation
pub trait ValidatedMap {
    /// Validate the map
    fn validate(&self) -> ValidationResult;

    /// Get cells with validation issues
    fn cells_with_issues(&self, result: &ValidationResult) -> HashMap<GridCoord, ValidationSeverity>;
}

impl ValidatedMap for MapModel {
    fn validate(&self) -> ValidationResult {
        Validator::validate(self)
    }

    fn cells_with_issues(&self, result: &ValidationResult) -> HashMap<GridCoord, ValidationSeverity> {
        let mut cells = HashMap::new();

        for issue in &result.issues {
            for coord in &issue.affected_cells {
                cells
                    .entry(*coord)
                    .and_modify(|severity: &mut ValidationSeverity| {
                        // Keep the highest severity
                        if issue.severity > *severity {
                            *severity = issue.severity;
                        }
                    })
                    .or_insert(issue.severity);
            }
        }

        cells
    }
}
