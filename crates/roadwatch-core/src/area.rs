//! Seams to the spatial store.
//!
//! The core never owns road data. It asks an [`AreaSelector`] for candidate
//! roads near a point and hands the resolved score to a [`ConditionStore`] for
//! write-back.

use std::future::Future;

use serde::Serialize;

use crate::condition::ConditionScore;
use crate::geo::{Point, Segment};

/// Stable identifier of a road segment in its store.
pub type RoadId = i64;

/// A candidate road: identifier, geometry and current score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RoadSegment {
    pub id: RoadId,
    pub segment: Segment,
    pub condition: ConditionScore,
}

/// Finds roads belonging to areas whose registered center lies within a
/// great-circle radius of a point.
///
/// An empty result is not an error.
pub trait AreaSelector {
    type Error: std::error::Error + Send + Sync + 'static;

    fn find_nearby(
        &self,
        point: Point,
        radius_meters: f64,
    ) -> impl Future<Output = Result<Vec<RoadSegment>, Self::Error>> + Send;
}

/// Persists a new condition score for a batch of roads.
///
/// Implementations apply the whole batch atomically and return the number of
/// roads updated.
pub trait ConditionStore {
    type Error: std::error::Error + Send + Sync + 'static;

    fn set_condition(
        &self,
        ids: &[RoadId],
        score: ConditionScore,
    ) -> impl Future<Output = Result<u64, Self::Error>> + Send;
}
