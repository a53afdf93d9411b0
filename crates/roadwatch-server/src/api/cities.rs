use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Extension, Json,
};
use roadwatch_core::{ConditionScore, Point, Segment};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::middleware::RequestId;

use super::{map_db_error, parse_body, ApiError, ApiResponse, AppState, ResponseMeta};

const MAX_NAME_LEN: usize = 200;

#[derive(Debug, Deserialize)]
pub(super) struct CreateCityRequest {
    pub name: String,
    pub center: [f64; 2],
}

#[derive(Debug, Serialize)]
pub(super) struct CityView {
    pub id: i64,
    pub public_id: Uuid,
    pub name: String,
    pub center: [f64; 2],
}

#[derive(Debug, Deserialize)]
pub(super) struct CreateRoadRequest {
    #[serde(default)]
    pub name: Option<String>,
    pub coordinates: Vec<[f64; 2]>,
    #[serde(default)]
    pub condition: Option<f64>,
}

#[derive(Debug, Serialize)]
pub(super) struct RoadCreatedView {
    pub id: i64,
    pub public_id: Uuid,
    pub city_id: i64,
    pub name: Option<String>,
    pub coordinates: [[f64; 2]; 2],
    pub condition: f64,
}

fn validation_error(request_id: &str, message: impl Into<String>) -> ApiError {
    ApiError::new(request_id, "validation_error", message)
}

fn validate_name(request_id: &str, name: &str) -> Result<String, ApiError> {
    let name = name.trim();
    if name.is_empty() || name.len() > MAX_NAME_LEN {
        return Err(validation_error(
            request_id,
            format!("name must be 1-{MAX_NAME_LEN} characters"),
        ));
    }
    Ok(name.to_owned())
}

fn parse_segment(request_id: &str, coordinates: &[[f64; 2]]) -> Result<Segment, ApiError> {
    let [a, b] = coordinates else {
        return Err(validation_error(
            request_id,
            format!(
                "coordinates must hold exactly 2 points, got {}",
                coordinates.len()
            ),
        ));
    };
    let p1 = Point::try_from(*a).map_err(|e| validation_error(request_id, e.to_string()))?;
    let p2 = Point::try_from(*b).map_err(|e| validation_error(request_id, e.to_string()))?;
    let segment = Segment::new(p1, p2);
    if segment.is_degenerate() {
        return Err(validation_error(request_id, "road endpoints must differ"));
    }
    Ok(segment)
}

/// POST /api/v1/cities: register a city and its center.
pub(super) async fn create_city(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Result<Json<CreateCityRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<CityView>>), ApiError> {
    let rid = &req_id.0;
    let body = parse_body(rid, body)?;

    let name = validate_name(rid, &body.name)?;
    let center = Point::try_from(body.center).map_err(|e| validation_error(rid, e.to_string()))?;

    let row = roadwatch_db::create_city(&state.pool, &roadwatch_db::NewCity { name, center })
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;

    tracing::info!(city_id = row.id, name = %row.name, "city created");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            data: CityView {
                id: row.id,
                public_id: row.public_id,
                name: row.name,
                center: [row.center_lng, row.center_lat],
            },
            meta: ResponseMeta::new(req_id.0),
        }),
    ))
}

/// POST /api/v1/cities/{city_id}/roads: add a road segment to a city.
pub(super) async fn create_road(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(city_id): Path<i64>,
    body: Result<Json<CreateRoadRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<RoadCreatedView>>), ApiError> {
    let rid = &req_id.0;
    let body = parse_body(rid, body)?;

    let name = body
        .name
        .as_deref()
        .map(|n| validate_name(rid, n))
        .transpose()?;
    let segment = parse_segment(rid, &body.coordinates)?;
    let condition = body
        .condition
        .map(ConditionScore::new)
        .transpose()
        .map_err(|e| validation_error(rid, e.to_string()))?
        .unwrap_or_default();

    let row = roadwatch_db::create_road(
        &state.pool,
        &roadwatch_db::NewRoad {
            city_id,
            name,
            segment,
            condition,
        },
    )
    .await
    .map_err(|e| match e {
        roadwatch_db::DbError::NotFound => {
            ApiError::new(rid, "not_found", format!("city {city_id} not found"))
        }
        other => map_db_error(rid.clone(), &other),
    })?;

    tracing::info!(road_id = row.id, city_id, "road created");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            data: RoadCreatedView {
                id: row.id,
                public_id: row.public_id,
                city_id: row.city_id,
                name: row.name,
                coordinates: [[row.start_lng, row.start_lat], [row.end_lng, row.end_lat]],
                condition: row.condition,
            },
            meta: ResponseMeta::new(req_id.0),
        }),
    ))
}
