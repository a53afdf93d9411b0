//! Database operations for the `cities` table.

use chrono::{DateTime, Utc};
use roadwatch_core::Point;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// A row from the `cities` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CityRow {
    pub id: i64,
    pub public_id: Uuid,
    pub name: String,
    pub center_lng: f64,
    pub center_lat: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CityRow {
    /// The registered center as a validated point.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::InvalidGeometry`] if the stored coordinates are out of range.
    pub fn center(&self) -> Result<Point, DbError> {
        Point::new(self.center_lng, self.center_lat)
            .map_err(|e| DbError::InvalidGeometry(format!("city {}: {e}", self.id)))
    }
}

/// Input record for creating a city.
#[derive(Debug, Clone)]
pub struct NewCity {
    pub name: String,
    pub center: Point,
}

/// Insert a city and return the full row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails (including a duplicate name).
pub async fn create_city(pool: &PgPool, city: &NewCity) -> Result<CityRow, DbError> {
    let row = sqlx::query_as::<_, CityRow>(
        "INSERT INTO cities (public_id, name, center_lng, center_lat) \
         VALUES ($1, $2, $3, $4) \
         RETURNING id, public_id, name, center_lng, center_lat, created_at, updated_at",
    )
    .bind(Uuid::new_v4())
    .bind(city.name.trim())
    .bind(city.center.lng())
    .bind(city.center.lat())
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Fetch a city by id.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no city has this id, or [`DbError::Sqlx`]
/// if the query fails.
pub async fn get_city(pool: &PgPool, id: i64) -> Result<CityRow, DbError> {
    sqlx::query_as::<_, CityRow>(
        "SELECT id, public_id, name, center_lng, center_lat, created_at, updated_at \
         FROM cities \
         WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)
}
