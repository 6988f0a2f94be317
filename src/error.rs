//! Error types for the recommendation pipeline.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

use crate::types::ProgramNumber;

/// Failure reported by an analysis collaborator
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    #[error("overlay analysis failed for #{program}: {message}")]
    Overlay {
        program: ProgramNumber,
        message: String,
    },

    #[error("longshot detection failed: {0}")]
    Longshot(String),

    #[error("hidden value detection failed: {0}")]
    HiddenValue(String),
}

impl AnalysisError {
    pub fn component(&self) -> Component {
        match self {
            AnalysisError::Overlay { .. } => Component::OverlayAnalyzer,
            AnalysisError::Longshot(_) => Component::LongshotDetector,
            AnalysisError::HiddenValue(_) => Component::HiddenValueDetector,
        }
    }
}

/// Pipeline stage that produced an error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Component {
    OverlayAnalyzer,
    LongshotDetector,
    HiddenValueDetector,
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Component::OverlayAnalyzer => "overlay analyzer",
            Component::LongshotDetector => "longshot detector",
            Component::HiddenValueDetector => "hidden value detector",
        };
        f.write_str(name)
    }
}

/// Error returned at the recommendation boundary
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecommendationError {
    #[error("race {race}: {component} failed: {source}")]
    Collaborator {
        race: u32,
        component: Component,
        #[source]
        source: AnalysisError,
    },
}

impl RecommendationError {
    pub fn collaborator(race: u32, source: AnalysisError) -> Self {
        RecommendationError::Collaborator {
            race,
            component: source.component(),
            source,
        }
    }

    pub fn race(&self) -> u32 {
        match self {
            RecommendationError::Collaborator { race, .. } => *race,
        }
    }
}
