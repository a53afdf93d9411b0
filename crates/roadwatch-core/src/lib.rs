//! Road condition matching core.
//!
//! Resolves a GPS observation to the road segments it lies on, turns a damage
//! signal into a condition score, and classifies stored scores into display
//! tiers. Storage and spatial selection sit behind the traits in [`area`].

pub mod app_config;
pub mod area;
pub mod condition;
pub mod config;
pub mod error;
pub mod geo;
pub mod matcher;
pub mod memory;
pub mod network;
pub mod pipeline;

pub use app_config::{AppConfig, Environment};
pub use area::{AreaSelector, ConditionStore, RoadId, RoadSegment};
pub use condition::{
    classify, resolve_score, Classification, ConditionScore, DamageCategory, ScoreInput,
    SeverityTier,
};
pub use config::{build_app_config, load_app_config, load_app_config_from_env};
pub use error::{ConfigError, CoreError};
pub use geo::{haversine_meters, meters_to_degrees, Point, Segment};
pub use matcher::{is_inside_buffer, match_segments, DEFAULT_BUFFER_METERS};
pub use memory::InMemoryNetwork;
pub use network::{load_network, CityConfig, NetworkFile, RoadConfig};
pub use pipeline::{
    record_observation, render_area, MatchSettings, Observation, ObservationOutcome,
    PipelineError, RenderedRoad, DEFAULT_SEARCH_RADIUS_METERS,
};
