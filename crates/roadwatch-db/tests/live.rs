//! Live integration tests for roadwatch-db using `#[sqlx::test]`.
//!
//! Each test gets a fresh, fully-migrated Postgres database spun up by the
//! sqlx test harness. Run with `DATABASE_URL` set and `--ignored`.

use roadwatch_core::{
    record_observation, ConditionScore, DamageCategory, MatchSettings, NetworkFile, Observation,
    Point, Segment,
};
use roadwatch_db::{
    create_city, create_road, get_city, list_roads_for_city, list_roads_near, seed_network,
    set_road_condition, DbError, NewCity, NewRoad, PgRoadStore,
};

const NETWORK: &str = r"
cities:
  - name: Kalyani
    center: [88.43, 22.97]
    roads:
      - name: Station Road
        coordinates: [[88.4300, 22.9700], [88.4300, 22.9710]]
      - name: Parallel Lane
        coordinates: [[88.4301, 22.9700], [88.4301, 22.9710]]
        condition: 90
  - name: Faraway
    center: [10.0, 10.0]
    roads:
      - coordinates: [[10.0, 10.0], [10.0, 10.001]]
";

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn point(lng: f64, lat: f64) -> Point {
    Point::new(lng, lat).expect("valid point")
}

async fn seed(pool: &sqlx::PgPool) {
    let network = NetworkFile::from_yaml(NETWORK).expect("valid network");
    seed_network(pool, &network).await.expect("seed_network failed");
}

async fn city_id(pool: &sqlx::PgPool, name: &str) -> i64 {
    sqlx::query_scalar::<_, i64>("SELECT id FROM cities WHERE name = $1")
        .bind(name)
        .fetch_one(pool)
        .await
        .unwrap_or_else(|e| panic!("city lookup failed for '{name}': {e}"))
}

// ---------------------------------------------------------------------------
// Cities and roads
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires a live Postgres via DATABASE_URL"]
async fn create_and_get_city(pool: sqlx::PgPool) {
    let created = create_city(
        &pool,
        &NewCity {
            name: "Kalyani".to_string(),
            center: point(88.43, 22.97),
        },
    )
    .await
    .expect("create_city failed");

    let fetched = get_city(&pool, created.id).await.expect("get_city failed");
    assert_eq!(fetched.name, "Kalyani");
    assert_eq!(fetched.center().expect("center"), point(88.43, 22.97));
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires a live Postgres via DATABASE_URL"]
async fn get_city_unknown_id_is_not_found(pool: sqlx::PgPool) {
    let err = get_city(&pool, 9_999).await.unwrap_err();
    assert!(matches!(err, DbError::NotFound));
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires a live Postgres via DATABASE_URL"]
async fn create_road_validates_city_and_geometry(pool: sqlx::PgPool) {
    let city = create_city(
        &pool,
        &NewCity {
            name: "Kalyani".to_string(),
            center: point(88.43, 22.97),
        },
    )
    .await
    .expect("create_city failed");

    let segment = Segment::new(point(88.43, 22.97), point(88.431, 22.971));
    let road = create_road(
        &pool,
        &NewRoad {
            city_id: city.id,
            name: None,
            segment,
            condition: ConditionScore::DEFAULT,
        },
    )
    .await
    .expect("create_road failed");
    assert_eq!(road.condition, 50.0);

    let missing_city = create_road(
        &pool,
        &NewRoad {
            city_id: city.id + 100,
            name: None,
            segment,
            condition: ConditionScore::DEFAULT,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(missing_city, DbError::NotFound));

    let degenerate = create_road(
        &pool,
        &NewRoad {
            city_id: city.id,
            name: None,
            segment: Segment::new(segment.p1, segment.p1),
            condition: ConditionScore::DEFAULT,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(degenerate, DbError::InvalidGeometry(_)));
}

// ---------------------------------------------------------------------------
// Seeding and area selection
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires a live Postgres via DATABASE_URL"]
async fn seed_network_is_idempotent(pool: sqlx::PgPool) {
    let network = NetworkFile::from_yaml(NETWORK).expect("valid network");

    let first = seed_network(&pool, &network).await.expect("first seed");
    assert_eq!(first.cities, 2);
    assert_eq!(first.roads_inserted, 3);

    let second = seed_network(&pool, &network).await.expect("second seed");
    assert_eq!(second.cities, 2);
    assert_eq!(second.roads_inserted, 0);

    let kalyani = city_id(&pool, "Kalyani").await;
    let roads = list_roads_for_city(&pool, kalyani).await.expect("list");
    assert_eq!(roads.len(), 2);
    assert_eq!(roads[1].condition, 90.0);
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires a live Postgres via DATABASE_URL"]
async fn list_roads_near_filters_by_city_center_distance(pool: sqlx::PgPool) {
    seed(&pool).await;

    let near = list_roads_near(&pool, point(88.4305, 22.9705), 10_000.0)
        .await
        .expect("list_roads_near failed");
    assert_eq!(near.len(), 2);

    let nowhere = list_roads_near(&pool, point(-70.0, -30.0), 10_000.0)
        .await
        .expect("list_roads_near failed");
    assert!(nowhere.is_empty());
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires a live Postgres via DATABASE_URL"]
async fn set_road_condition_updates_only_listed_ids(pool: sqlx::PgPool) {
    seed(&pool).await;
    let kalyani = city_id(&pool, "Kalyani").await;
    let roads = list_roads_for_city(&pool, kalyani).await.expect("list");

    let score = ConditionScore::new(15.0).expect("score");
    let updated = set_road_condition(&pool, &[roads[0].id], score)
        .await
        .expect("update");
    assert_eq!(updated, 1);

    let after = list_roads_for_city(&pool, kalyani).await.expect("list");
    assert_eq!(after[0].condition, 15.0);
    assert_eq!(after[1].condition, 90.0);

    assert_eq!(set_road_condition(&pool, &[], score).await.expect("noop"), 0);
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires a live Postgres via DATABASE_URL"]
async fn observation_updates_every_overlapping_road(pool: sqlx::PgPool) {
    seed(&pool).await;
    let store = PgRoadStore::new(pool.clone());
    let observation = Observation {
        location: point(88.43005, 22.9705),
        score: DamageCategory::Image.into(),
    };

    let outcome = record_observation(&store, &store, &observation, &MatchSettings::default())
        .await
        .expect("record_observation failed");
    assert_eq!(outcome.matched.len(), 2);
    assert_eq!(outcome.updated, 2);

    let kalyani = city_id(&pool, "Kalyani").await;
    let roads = list_roads_for_city(&pool, kalyani).await.expect("list");
    assert!(roads.iter().all(|r| r.condition == 10.0));
}
