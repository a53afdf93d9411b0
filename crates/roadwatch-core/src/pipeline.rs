//! Observation write path and map-view read path.

use serde::Serialize;
use thiserror::Error;

use crate::app_config::AppConfig;
use crate::area::{AreaSelector, ConditionStore, RoadId, RoadSegment};
use crate::condition::{classify, resolve_score, Classification, ConditionScore, ScoreInput};
use crate::geo::{Point, Segment};
use crate::matcher::{match_segments, DEFAULT_BUFFER_METERS};

/// Radius around a point within which area centers are considered, in meters.
pub const DEFAULT_SEARCH_RADIUS_METERS: f64 = 10_000.0;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("area selection failed: {0}")]
    AreaSelection(#[source] BoxError),

    #[error("condition write-back failed: {0}")]
    WriteBack(#[source] BoxError),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchSettings {
    pub search_radius_meters: f64,
    /// Per-side buffer tolerance.
    pub buffer_meters: f64,
}

impl Default for MatchSettings {
    fn default() -> Self {
        Self {
            search_radius_meters: DEFAULT_SEARCH_RADIUS_METERS,
            buffer_meters: DEFAULT_BUFFER_METERS,
        }
    }
}

impl MatchSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            search_radius_meters: config.search_radius_meters,
            buffer_meters: config.buffer_meters,
        }
    }
}

/// A single position report with its damage signal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub location: Point,
    pub score: ScoreInput,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObservationOutcome {
    pub matched: Vec<RoadId>,
    pub score: ConditionScore,
    pub classification: Classification,
    /// Rows the store reported as updated.
    pub updated: u64,
}

/// A road ready for display.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RenderedRoad {
    pub id: RoadId,
    pub segment: Segment,
    pub condition: ConditionScore,
    pub classification: Classification,
}

impl From<RoadSegment> for RenderedRoad {
    fn from(road: RoadSegment) -> Self {
        Self {
            id: road.id,
            segment: road.segment,
            condition: road.condition,
            classification: classify(road.condition),
        }
    }
}

/// Match an observation to roads and write the resolved score to all of them.
///
/// No matching road is not an error: the outcome carries an empty `matched`
/// list and the store is not called.
///
/// # Errors
///
/// Returns [`PipelineError`] if the selector or the store fails.
pub async fn record_observation<A, S>(
    selector: &A,
    store: &S,
    observation: &Observation,
    settings: &MatchSettings,
) -> Result<ObservationOutcome, PipelineError>
where
    A: AreaSelector,
    S: ConditionStore,
{
    let candidates = selector
        .find_nearby(observation.location, settings.search_radius_meters)
        .await
        .map_err(|e| PipelineError::AreaSelection(Box::new(e)))?;

    let matched: Vec<RoadId> = match_segments(
        observation.location,
        &candidates,
        settings.buffer_meters,
    )
    .iter()
    .map(|road| road.id)
    .collect();

    let score = resolve_score(observation.score);
    let classification = classify(score);

    if matched.is_empty() {
        tracing::info!(
            location = %observation.location,
            candidates = candidates.len(),
            "observation matched no road"
        );
        return Ok(ObservationOutcome {
            matched,
            score,
            classification,
            updated: 0,
        });
    }

    let updated = store
        .set_condition(&matched, score)
        .await
        .map_err(|e| PipelineError::WriteBack(Box::new(e)))?;

    tracing::info!(
        location = %observation.location,
        matched = matched.len(),
        updated,
        score = score.value(),
        tier = %classification.tier,
        "applied observation"
    );

    Ok(ObservationOutcome {
        matched,
        score,
        classification,
        updated,
    })
}

/// Every road around `center`, classified for display.
///
/// # Errors
///
/// Returns [`PipelineError::AreaSelection`] if the selector fails.
pub async fn render_area<A>(
    selector: &A,
    center: Point,
    settings: &MatchSettings,
) -> Result<Vec<RenderedRoad>, PipelineError>
where
    A: AreaSelector,
{
    let roads = selector
        .find_nearby(center, settings.search_radius_meters)
        .await
        .map_err(|e| PipelineError::AreaSelection(Box::new(e)))?;

    Ok(roads.into_iter().map(RenderedRoad::from).collect())
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;
