//! [`AreaSelector`] and [`ConditionStore`] over Postgres.

use std::future::Future;

use roadwatch_core::{AreaSelector, ConditionScore, ConditionStore, Point, RoadId, RoadSegment};
use sqlx::PgPool;

use crate::roads::{list_roads_near, set_road_condition};
use crate::DbError;

#[derive(Debug, Clone)]
pub struct PgRoadStore {
    pool: PgPool,
}

impl PgRoadStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl AreaSelector for PgRoadStore {
    type Error = DbError;

    fn find_nearby(
        &self,
        point: Point,
        radius_meters: f64,
    ) -> impl Future<Output = Result<Vec<RoadSegment>, Self::Error>> + Send {
        async move {
            let rows = list_roads_near(&self.pool, point, radius_meters).await?;
            let roads = rows
                .iter()
                .filter_map(|row| match row.to_road_segment() {
                    Ok(road) => Some(road),
                    Err(e) => {
                        tracing::warn!(road_id = row.id, error = %e, "skipping unreadable road row");
                        None
                    }
                })
                .collect();
            Ok(roads)
        }
    }
}

impl ConditionStore for PgRoadStore {
    type Error = DbError;

    fn set_condition(
        &self,
        ids: &[RoadId],
        score: ConditionScore,
    ) -> impl Future<Output = Result<u64, Self::Error>> + Send {
        set_road_condition(&self.pool, ids, score)
    }
}
