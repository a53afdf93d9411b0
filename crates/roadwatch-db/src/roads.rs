//! Database operations for the `roads` table.

use chrono::{DateTime, Utc};
use roadwatch_core::{geo::EARTH_RADIUS_METERS, ConditionScore, Point, RoadId, RoadSegment, Segment};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

const ROAD_COLUMNS: &str = "r.id, r.public_id, r.city_id, r.name, \
                            r.start_lng, r.start_lat, r.end_lng, r.end_lat, \
                            r.condition, r.created_at, r.updated_at";

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `roads` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RoadRow {
    pub id: i64,
    pub public_id: Uuid,
    pub city_id: i64,
    pub name: Option<String>,
    pub start_lng: f64,
    pub start_lat: f64,
    pub end_lng: f64,
    pub end_lat: f64,
    pub condition: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RoadRow {
    /// Convert to the matcher's value type.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::InvalidGeometry`] if a stored coordinate or the
    /// condition is out of range.
    pub fn to_road_segment(&self) -> Result<RoadSegment, DbError> {
        let invalid = |e: roadwatch_core::CoreError| {
            DbError::InvalidGeometry(format!("road {}: {e}", self.id))
        };
        let p1 = Point::new(self.start_lng, self.start_lat).map_err(invalid)?;
        let p2 = Point::new(self.end_lng, self.end_lat).map_err(invalid)?;
        let condition = ConditionScore::new(self.condition).map_err(invalid)?;
        Ok(RoadSegment {
            id: self.id,
            segment: Segment::new(p1, p2),
            condition,
        })
    }
}

/// Input record for creating a road.
#[derive(Debug, Clone)]
pub struct NewRoad {
    pub city_id: i64,
    pub name: Option<String>,
    pub segment: Segment,
    pub condition: ConditionScore,
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Insert a road under an existing city.
///
/// # Errors
///
/// Returns [`DbError::InvalidGeometry`] for a zero-length segment,
/// [`DbError::NotFound`] if the city does not exist, or [`DbError::Sqlx`] if
/// the insert fails.
pub async fn create_road(pool: &PgPool, road: &NewRoad) -> Result<RoadRow, DbError> {
    if road.segment.is_degenerate() {
        return Err(DbError::InvalidGeometry(format!(
            "road endpoints are identical: {}",
            road.segment.p1
        )));
    }

    let sql = format!(
        "INSERT INTO roads AS r \
             (public_id, city_id, name, start_lng, start_lat, end_lng, end_lat, condition) \
         SELECT $1, c.id, $3, $4, $5, $6, $7, $8 \
         FROM cities c \
         WHERE c.id = $2 \
         RETURNING {ROAD_COLUMNS}"
    );

    sqlx::query_as::<_, RoadRow>(&sql)
        .bind(Uuid::new_v4())
        .bind(road.city_id)
        .bind(road.name.as_deref())
        .bind(road.segment.p1.lng())
        .bind(road.segment.p1.lat())
        .bind(road.segment.p2.lng())
        .bind(road.segment.p2.lat())
        .bind(road.condition.value())
        .fetch_optional(pool)
        .await?
        .ok_or(DbError::NotFound)
}

/// All roads of one city, ordered by id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_roads_for_city(pool: &PgPool, city_id: i64) -> Result<Vec<RoadRow>, DbError> {
    let sql = format!(
        "SELECT {ROAD_COLUMNS} \
         FROM roads r \
         WHERE r.city_id = $1 \
         ORDER BY r.id"
    );

    let rows = sqlx::query_as::<_, RoadRow>(&sql)
        .bind(city_id)
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

/// Roads owned by every city whose center lies within `radius_meters` of
/// `point`, by great-circle (haversine) distance.
///
/// Ordered by city then road id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_roads_near(
    pool: &PgPool,
    point: Point,
    radius_meters: f64,
) -> Result<Vec<RoadRow>, DbError> {
    let sql = format!(
        "SELECT {ROAD_COLUMNS} \
         FROM roads r \
         JOIN cities c ON c.id = r.city_id \
         WHERE 2 * $3::float8 * ASIN(LEAST(1.0, SQRT( \
                 POWER(SIN(RADIANS(c.center_lat - $2::float8) / 2), 2) \
                 + COS(RADIANS($2::float8)) * COS(RADIANS(c.center_lat)) \
                   * POWER(SIN(RADIANS(c.center_lng - $1::float8) / 2), 2) \
               ))) <= $4::float8 \
         ORDER BY c.id, r.id"
    );

    let rows = sqlx::query_as::<_, RoadRow>(&sql)
        .bind(point.lng())
        .bind(point.lat())
        .bind(EARTH_RADIUS_METERS)
        .bind(radius_meters)
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

/// Set `condition` on every road in `ids` in one transaction.
///
/// Returns the number of rows updated. Unknown ids are ignored.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails; nothing is written in that case.
pub async fn set_road_condition(
    pool: &PgPool,
    ids: &[RoadId],
    score: ConditionScore,
) -> Result<u64, DbError> {
    if ids.is_empty() {
        return Ok(0);
    }

    let mut tx = pool.begin().await?;
    let result = sqlx::query(
        "UPDATE roads \
         SET condition = $2, updated_at = NOW() \
         WHERE id = ANY($1)",
    )
    .bind(ids)
    .bind(score.value())
    .execute(&mut *tx)
    .await?;
    tx.commit().await?;

    Ok(result.rows_affected())
}
