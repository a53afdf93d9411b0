//! In-process road store backed by a [`NetworkFile`].
//!
//! Used for offline matching from the CLI and as the store in pipeline tests.

use std::collections::BTreeMap;
use std::convert::Infallible;
use std::future::{ready, Future};
use std::sync::RwLock;

use crate::area::{AreaSelector, ConditionStore, RoadId, RoadSegment};
use crate::condition::ConditionScore;
use crate::geo::{haversine_meters, Point};
use crate::network::NetworkFile;

#[derive(Debug)]
struct CityEntry {
    center: Point,
    road_ids: Vec<RoadId>,
}

/// Cities and roads held in memory. Road ids are assigned from 1 in file order.
#[derive(Debug)]
pub struct InMemoryNetwork {
    cities: Vec<CityEntry>,
    roads: RwLock<BTreeMap<RoadId, RoadSegment>>,
}

impl InMemoryNetwork {
    /// Build from a validated network file. Roads without exactly two points
    /// are dropped.
    #[must_use]
    pub fn from_network(network: &NetworkFile) -> Self {
        let mut cities = Vec::with_capacity(network.cities.len());
        let mut roads = BTreeMap::new();
        let mut next_id: RoadId = 1;

        for city in &network.cities {
            let mut road_ids = Vec::with_capacity(city.roads.len());
            for road in &city.roads {
                let Some(segment) = road.segment() else {
                    continue;
                };
                roads.insert(
                    next_id,
                    RoadSegment {
                        id: next_id,
                        segment,
                        condition: road.condition_or_default(),
                    },
                );
                road_ids.push(next_id);
                next_id += 1;
            }
            cities.push(CityEntry {
                center: city.center,
                road_ids,
            });
        }

        Self {
            cities,
            roads: RwLock::new(roads),
        }
    }

    /// Every road in the network, ordered by id.
    #[must_use]
    pub fn roads(&self) -> Vec<RoadSegment> {
        self.read_roads().values().copied().collect()
    }

    #[must_use]
    pub fn road(&self, id: RoadId) -> Option<RoadSegment> {
        self.read_roads().get(&id).copied()
    }

    fn select(&self, point: Point, radius_meters: f64) -> Vec<RoadSegment> {
        let roads = self.read_roads();
        self.cities
            .iter()
            .filter(|city| haversine_meters(city.center, point) <= radius_meters)
            .flat_map(|city| city.road_ids.iter())
            .filter_map(|id| roads.get(id).copied())
            .collect()
    }

    fn update(&self, ids: &[RoadId], score: ConditionScore) -> u64 {
        let mut roads = self
            .roads
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let mut updated = 0;
        for id in ids {
            if let Some(road) = roads.get_mut(id) {
                road.condition = score;
                updated += 1;
            }
        }
        updated
    }

    fn read_roads(&self) -> std::sync::RwLockReadGuard<'_, BTreeMap<RoadId, RoadSegment>> {
        self.roads
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl AreaSelector for InMemoryNetwork {
    type Error = Infallible;

    fn find_nearby(
        &self,
        point: Point,
        radius_meters: f64,
    ) -> impl Future<Output = Result<Vec<RoadSegment>, Self::Error>> + Send {
        ready(Ok(self.select(point, radius_meters)))
    }
}

impl ConditionStore for InMemoryNetwork {
    type Error = Infallible;

    fn set_condition(
        &self,
        ids: &[RoadId],
        score: ConditionScore,
    ) -> impl Future<Output = Result<u64, Self::Error>> + Send {
        ready(Ok(self.update(ids, score)))
    }
}
