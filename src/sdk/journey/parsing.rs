// Facts derived from a journey response: snapped endpoints, first leg timing, walks.
//
// The backend only routes from stops: requested locations are snapped on the closest
// stop and the walk to it is ignored. Anything compared with another planner must
// therefore start from the snapped points, i.e. the first and last features.
use serde::Serialize;

use super::types::{lng_lat, Feature, Geometry, JourneyResponse};
use crate::sdk::datetime::format_duration;
use crate::sdk::error::{JourneyError, JourneyResult};

/// First and last features plus at least one leg.
pub const MIN_FEATURES: usize = 3;

/// When the traveler actually starts moving on the first leg.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedLegSummary {
    pub travel_begin_time: i64,
    pub travel_begin_str: String,
    pub initial_wait: i64,
    pub initial_wait_str: String,
}

/// Walking durations in seconds. `middle_walks` is derived, never measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WalkBreakdown {
    pub first_walk: i64,
    pub middle_walks: i64,
    pub final_walk: i64,
    pub total_walk: i64,
}

/// Display record for one leg.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegView {
    pub kind: String,
    pub departure_id: Option<String>,
    pub arrival_id: Option<String>,
    pub start_time_str: Option<String>,
    pub departure_time_str: Option<String>,
    pub arrival_time_str: Option<String>,
    pub full_duration: Option<i64>,
    pub full_duration_str: Option<String>,
    pub waiting_duration: Option<i64>,
}

fn malformed(message: String) -> JourneyError {
    JourneyError::MalformedResponse(message)
}

fn required<T: Clone>(value: &Option<T>, field: &str, position: &str) -> JourneyResult<T> {
    value
        .clone()
        .ok_or_else(|| malformed(format!("{} has no '{}' property", position, field)))
}

fn point_coordinates(feature: &Feature, position: &str) -> JourneyResult<[f64; 2]> {
    match &feature.geometry {
        Geometry::Point { coordinates } => lng_lat(coordinates).ok_or_else(|| {
            malformed(format!(
                "{} point has {} coordinate(s)",
                position,
                coordinates.len()
            ))
        }),
        other => Err(malformed(format!(
            "unexpected {} feature type : {}",
            position,
            other.type_name()
        ))),
    }
}

/// Snapped source and destination, in backend order (`[lng, lat]`).
pub fn extract_used_endpoints(response: &JourneyResponse) -> JourneyResult<([f64; 2], [f64; 2])> {
    let features = &response.geojson.features;
    let (first, last) = match (features.first(), features.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return Err(malformed("response has no feature".to_string())),
    };

    Ok((
        point_coordinates(first, "first")?,
        point_coordinates(last, "last")?,
    ))
}

/// Timing of the first leg, i.e. the second feature.
pub fn extract_first_leg_timing(response: &JourneyResponse) -> JourneyResult<ParsedLegSummary> {
    let features = &response.geojson.features;
    if features.len() < MIN_FEATURES {
        return Err(malformed(format!(
            "expected at least {} features, got {}",
            MIN_FEATURES,
            features.len()
        )));
    }

    let second = &features[1];
    if !second.is_leg() {
        return Err(malformed(format!(
            "unexpected second feature type : {}",
            second.geometry.type_name()
        )));
    }

    let props = &second.properties;
    Ok(ParsedLegSummary {
        travel_begin_time: required(&props.departure_time, "departure_time", "first leg")?,
        travel_begin_str: required(&props.departure_time_str, "departure_time_str", "first leg")?,
        initial_wait: required(&props.waiting_duration, "waiting_duration", "first leg")?,
        initial_wait_str: required(&props.waiting_duration_str, "waiting_duration_str", "first leg")?,
    })
}

fn leg_duration(leg: &Feature) -> JourneyResult<i64> {
    required(&leg.properties.full_duration, "full_duration", "leg")
}

fn walk_duration(leg: &Feature) -> JourneyResult<i64> {
    if leg.is_walk() {
        leg_duration(leg)
    } else {
        Ok(0)
    }
}

pub fn extract_walk_breakdown(response: &JourneyResponse) -> JourneyResult<WalkBreakdown> {
    let legs: Vec<&Feature> = response
        .geojson
        .features
        .iter()
        .filter(|feature| feature.is_leg())
        .collect();

    let (first_leg, last_leg) = match (legs.first(), legs.last()) {
        (Some(first), Some(last)) => (*first, *last),
        _ => return Err(malformed("response has no leg".to_string())),
    };

    // a single leg plays both roles
    let first_walk = walk_duration(first_leg)?;
    let final_walk = walk_duration(last_leg)?;
    let mut total_walk: i64 = 0;
    for leg in legs.iter().filter(|leg| leg.is_walk()) {
        total_walk = total_walk
            .checked_add(leg_duration(leg)?)
            .ok_or_else(|| malformed("total walk duration overflows".to_string()))?;
    }
    let middle_walks = total_walk
        .checked_sub(first_walk)
        .and_then(|remaining| remaining.checked_sub(final_walk))
        .ok_or_else(|| malformed("middle walks duration overflows".to_string()))?;

    Ok(WalkBreakdown {
        first_walk,
        middle_walks,
        final_walk,
        total_walk,
    })
}

pub fn extract_legs(response: &JourneyResponse) -> Vec<LegView> {
    response
        .geojson
        .features
        .iter()
        .filter(|feature| feature.is_leg())
        .enumerate()
        .map(|(rank, leg)| {
            let props = &leg.properties;
            if let (Some(full), Some(waiting), Some(traveling)) =
                (props.full_duration, props.waiting_duration, props.traveling_duration)
            {
                if full != waiting + traveling {
                    log::warn!(
                        "Leg #{} has inconsistent durations: full={} waiting={} traveling={}",
                        rank,
                        full,
                        waiting,
                        traveling
                    );
                }
            }

            LegView {
                kind: props.kind.clone().unwrap_or_else(|| "unknown".to_string()),
                departure_id: props.departure_id.clone(),
                arrival_id: props.arrival_id.clone(),
                start_time_str: props.start_time_str.clone(),
                departure_time_str: props.departure_time_str.clone(),
                arrival_time_str: props.arrival_time_str.clone(),
                full_duration: props.full_duration,
                full_duration_str: props.full_duration.map(format_duration),
                waiting_duration: props.waiting_duration,
            }
        })
        .collect()
}
