//! Map view and observation endpoints.

use axum::{extract::rejection::JsonRejection, extract::State, Extension, Json};
use roadwatch_core::{
    ConditionScore, DamageCategory, Observation, Point, RenderedRoad, RoadId, ScoreInput,
    SeverityTier,
};
use roadwatch_db::PgRoadStore;
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{map_pipeline_error, parse_body, ApiError, ApiResponse, AppState, ResponseMeta};

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(super) struct ViewRequest {
    pub lng: f64,
    pub lat: f64,
}

#[derive(Debug, Serialize)]
pub(super) struct RoadView {
    pub id: RoadId,
    pub condition: f64,
    pub tier: SeverityTier,
    pub color: &'static str,
    /// `[lng, lat]` pairs.
    pub coordinates: [[f64; 2]; 2],
    /// `[lat, lng]` pairs, ready for map polylines.
    pub path: [[f64; 2]; 2],
}

impl From<RenderedRoad> for RoadView {
    fn from(road: RenderedRoad) -> Self {
        let (p1, p2) = (road.segment.p1, road.segment.p2);
        Self {
            id: road.id,
            condition: road.condition.value(),
            tier: road.classification.tier,
            color: road.classification.color,
            coordinates: [p1.into(), p2.into()],
            path: [p1.to_lat_lng(), p2.to_lat_lng()],
        }
    }
}

/// Either `"lng,lat"` or `[lng, lat]`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(super) enum LocationInput {
    Text(String),
    Pair([f64; 2]),
}

impl LocationInput {
    fn to_point(&self) -> Result<Point, roadwatch_core::CoreError> {
        match self {
            Self::Text(raw) => Point::parse_lng_lat(raw),
            Self::Pair([lng, lat]) => Point::new(*lng, *lat),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct ObservationRequest {
    pub location: LocationInput,
    #[serde(default)]
    pub category: Option<DamageCategory>,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
}

impl ObservationRequest {
    /// An explicit score wins, then the category, then the MIME type.
    fn score_input(&self) -> Result<ScoreInput, roadwatch_core::CoreError> {
        if let Some(raw) = self.score {
            return ConditionScore::new(raw).map(ScoreInput::from);
        }
        let category = self.category.unwrap_or_else(|| {
            self.mime_type
                .as_deref()
                .map_or(DamageCategory::Unknown, DamageCategory::from_mime_type)
        });
        Ok(category.into())
    }
}

#[derive(Debug, Serialize)]
pub(super) struct ObservationView {
    pub matched: Vec<RoadId>,
    pub score: f64,
    pub tier: SeverityTier,
    pub color: &'static str,
    pub updated: u64,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/map/roads: every road around the view center, classified.
pub(super) async fn roads_in_view(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Result<Json<ViewRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<Vec<RoadView>>>, ApiError> {
    let rid = &req_id.0;
    let body = parse_body(rid, body)?;
    let center = Point::new(body.lng, body.lat)
        .map_err(|e| ApiError::new(rid, "validation_error", e.to_string()))?;

    let store = PgRoadStore::new(state.pool.clone());
    let roads = roadwatch_core::render_area(&store, center, &state.settings)
        .await
        .map_err(|e| map_pipeline_error(rid.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: roads.into_iter().map(RoadView::from).collect(),
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// POST /api/v1/map/observations: match a report to roads and update them.
pub(super) async fn record_observation(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Result<Json<ObservationRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<ObservationView>>, ApiError> {
    let rid = &req_id.0;
    let body = parse_body(rid, body)?;
    let location = body
        .location
        .to_point()
        .map_err(|e| ApiError::new(rid, "validation_error", e.to_string()))?;
    let score = body
        .score_input()
        .map_err(|e| ApiError::new(rid, "validation_error", e.to_string()))?;

    let store = PgRoadStore::new(state.pool.clone());
    let outcome = roadwatch_core::record_observation(
        &store,
        &store,
        &Observation { location, score },
        &state.settings,
    )
    .await
    .map_err(|e| map_pipeline_error(rid.clone(), &e))?;

    if outcome.matched.is_empty() {
        return Err(ApiError::new(
            rid,
            "no_road_found",
            format!("no road found near {location}"),
        ));
    }

    Ok(Json(ApiResponse {
        data: ObservationView {
            matched: outcome.matched,
            score: outcome.score.value(),
            tier: outcome.classification.tier,
            color: outcome.classification.color,
            updated: outcome.updated,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(json: serde_json::Value) -> ObservationRequest {
        serde_json::from_value(json).expect("valid request")
    }

    #[test]
    fn location_accepts_string_and_pair() {
        let text = request(serde_json::json!({ "location": "88.43, 22.97" }));
        let pair = request(serde_json::json!({ "location": [88.43, 22.97] }));
        assert_eq!(text.location.to_point().unwrap(), pair.location.to_point().unwrap());
    }

    #[test]
    fn explicit_score_takes_precedence() {
        let req = request(serde_json::json!({
            "location": [0.0, 0.0],
            "category": "IMAGE",
            "score": 80.0
        }));
        let input = req.score_input().unwrap();
        assert_eq!(roadwatch_core::resolve_score(input).value(), 80.0);
    }

    #[test]
    fn mime_type_is_used_when_category_is_missing() {
        let req = request(serde_json::json!({
            "location": [0.0, 0.0],
            "mime_type": "video/mp4"
        }));
        let input = req.score_input().unwrap();
        assert_eq!(roadwatch_core::resolve_score(input).value(), 70.0);
    }

    #[test]
    fn unknown_category_falls_back_to_neutral_score() {
        let req = request(serde_json::json!({
            "location": [0.0, 0.0],
            "category": "AUDIO"
        }));
        let input = req.score_input().unwrap();
        assert_eq!(roadwatch_core::resolve_score(input).value(), 50.0);
    }

    #[test]
    fn out_of_range_score_is_rejected() {
        let req = request(serde_json::json!({ "location": [0.0, 0.0], "score": 101.0 }));
        assert!(req.score_input().is_err());
    }

    #[test]
    fn road_view_carries_both_coordinate_orders() {
        let road = RenderedRoad::from(roadwatch_core::RoadSegment {
            id: 3,
            segment: roadwatch_core::Segment::new(
                Point::new(88.43, 22.97).unwrap(),
                Point::new(88.44, 22.98).unwrap(),
            ),
            condition: ConditionScore::new(20.0).unwrap(),
        });
        let view = RoadView::from(road);
        assert_eq!(view.coordinates[0], [88.43, 22.97]);
        assert_eq!(view.path[0], [22.97, 88.43]);
        assert_eq!(view.tier, SeverityTier::Poor);
        assert_eq!(view.color, "#ff4d4d");
    }
}
