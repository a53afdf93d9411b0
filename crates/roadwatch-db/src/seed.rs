use roadwatch_core::NetworkFile;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub cities: usize,
    pub roads_inserted: usize,
}

/// Upsert cities and roads from a network file.
///
/// Cities are keyed on name and roads on their city plus exact geometry, so
/// seeding twice is a no-op. Existing road conditions are never overwritten;
/// a file condition only applies to newly inserted roads. Runs in a single
/// transaction.
///
/// # Errors
///
/// Returns [`DbError::InvalidGeometry`] for roads without exactly two points,
/// or [`DbError::Sqlx`] if any database operation fails.
pub async fn seed_network(pool: &PgPool, network: &NetworkFile) -> Result<SeedSummary, DbError> {
    let mut tx = pool.begin().await?;
    let mut summary = SeedSummary::default();

    for city in &network.cities {
        let city_id: i64 = sqlx::query_scalar(
            "INSERT INTO cities (public_id, name, center_lng, center_lat) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (name) DO UPDATE SET \
                 center_lng = EXCLUDED.center_lng, \
                 center_lat = EXCLUDED.center_lat, \
                 updated_at = NOW() \
             RETURNING id",
        )
        .bind(Uuid::new_v4())
        .bind(city.name.trim())
        .bind(city.center.lng())
        .bind(city.center.lat())
        .fetch_one(&mut *tx)
        .await?;
        summary.cities += 1;

        for road in &city.roads {
            let segment = road.segment().ok_or_else(|| {
                DbError::InvalidGeometry(format!(
                    "road in city '{}' must have exactly two points",
                    city.name
                ))
            })?;

            let inserted: Option<i64> = sqlx::query_scalar(
                "INSERT INTO roads \
                     (public_id, city_id, name, start_lng, start_lat, end_lng, end_lat, condition) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
                 ON CONFLICT (city_id, start_lng, start_lat, end_lng, end_lat) DO NOTHING \
                 RETURNING id",
            )
            .bind(Uuid::new_v4())
            .bind(city_id)
            .bind(road.name.as_deref())
            .bind(segment.p1.lng())
            .bind(segment.p1.lat())
            .bind(segment.p2.lng())
            .bind(segment.p2.lat())
            .bind(road.condition_or_default().value())
            .fetch_optional(&mut *tx)
            .await?;

            if inserted.is_some() {
                summary.roads_inserted += 1;
            }
        }

        tracing::debug!(city = %city.name, city_id, "seeded city");
    }

    tx.commit().await?;
    Ok(summary)
}
