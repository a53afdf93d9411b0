//! Commands that run without a database.

use std::path::Path;

use roadwatch_core::{
    classify, match_segments, ConditionScore, InMemoryNetwork, NetworkFile, Point, RoadId,
};

pub(crate) fn run_classify(score: f64) -> anyhow::Result<()> {
    let score = ConditionScore::new(score)?;
    let classification = classify(score);
    println!("{}\t{}", classification.tier, classification.color);
    Ok(())
}

pub(crate) fn run_match(lng: f64, lat: f64, network: &Path, tolerance: f64) -> anyhow::Result<()> {
    let point = Point::new(lng, lat)?;
    let network = roadwatch_core::load_network(network)?;
    let matches = match_in_network(&network, point, tolerance);

    if matches.is_empty() {
        println!("no road found near {point}");
        return Ok(());
    }

    for (id, name) in matches {
        println!("{id}\t{}", name.unwrap_or("(unnamed)"));
    }
    Ok(())
}

/// Every road in the file whose buffer contains `point`, with its name.
///
/// Ids follow [`InMemoryNetwork`] numbering.
pub(crate) fn match_in_network(
    network: &NetworkFile,
    point: Point,
    tolerance: f64,
) -> Vec<(RoadId, Option<&str>)> {
    let names: Vec<Option<&str>> = network
        .cities
        .iter()
        .flat_map(|city| city.roads.iter())
        .filter(|road| road.segment().is_some())
        .map(|road| road.name.as_deref())
        .collect();

    let roads = InMemoryNetwork::from_network(network).roads();
    match_segments(point, &roads, tolerance)
        .iter()
        .map(|road| {
            let name = usize::try_from(road.id - 1)
                .ok()
                .and_then(|i| names.get(i).copied())
                .flatten();
            (road.id, name)
        })
        .collect()
}
