//! Road network definition files.
//!
//! A network file lists cities with their registered center and the road
//! segments they own. It seeds the database and backs offline matching.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::condition::ConditionScore;
use crate::geo::{Point, Segment};
use crate::ConfigError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoadConfig {
    #[serde(default)]
    pub name: Option<String>,
    /// Exactly two `[lng, lat]` points.
    pub coordinates: Vec<Point>,
    #[serde(default)]
    pub condition: Option<ConditionScore>,
}

impl RoadConfig {
    /// The road's geometry, if it has exactly two points.
    #[must_use]
    pub fn segment(&self) -> Option<Segment> {
        match self.coordinates.as_slice() {
            [p1, p2] => Some(Segment::new(*p1, *p2)),
            _ => None,
        }
    }

    #[must_use]
    pub fn condition_or_default(&self) -> ConditionScore {
        self.condition.unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CityConfig {
    pub name: String,
    pub center: Point,
    #[serde(default)]
    pub roads: Vec<RoadConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetworkFile {
    pub cities: Vec<CityConfig>,
}

impl NetworkFile {
    /// Parse and validate a network from YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NetworkFileParse`] for malformed YAML or
    /// out-of-range coordinates, and [`ConfigError::Validation`] for
    /// structural problems.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let network: NetworkFile = serde_yaml::from_str(content)?;
        validate_network(&network)?;
        Ok(network)
    }
}

/// Load and validate a road network from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_network(path: &Path) -> Result<NetworkFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::NetworkFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    NetworkFile::from_yaml(&content)
}

fn validate_network(network: &NetworkFile) -> Result<(), ConfigError> {
    let mut seen_names = HashSet::new();

    for city in &network.cities {
        if city.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "city name must be non-empty".to_string(),
            ));
        }

        if !seen_names.insert(city.name.trim().to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate city name: '{}'",
                city.name
            )));
        }

        for (index, road) in city.roads.iter().enumerate() {
            let Some(segment) = road.segment() else {
                return Err(ConfigError::Validation(format!(
                    "road #{index} in city '{}' has {} points; expected exactly 2",
                    city.name,
                    road.coordinates.len()
                )));
            };
            if segment.is_degenerate() {
                return Err(ConfigError::Validation(format!(
                    "road #{index} in city '{}' has identical endpoints {}",
                    city.name, segment.p1
                )));
            }
        }
    }

    Ok(())
}
