use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use url::{form_urlencoded, Url};

use crate::sdk::error::{JourneyError, JourneyResult};

/// Leg tag used by the backend for walking legs.
pub const WALK_LEG: &str = "walk";

// GeoJSON allows `"properties": null`.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Envelope returned by the journey backend, whatever the outcome.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BackendReply {
    pub http_status: u16,
    #[serde(default)]
    pub error_msg: String,
    #[serde(default)]
    pub is_ok: bool,
    #[serde(default)]
    pub requested_path: String,
    #[serde(default)]
    pub requested_params: BTreeMap<String, String>,
    // empty object when the request parameters were rejected
    #[serde(default)]
    pub response: Value,
    /// Set by providers that know the full URL they requested.
    #[serde(skip)]
    pub requested_url: Option<Url>,
}

impl BackendReply {
    pub fn is_success(&self) -> bool {
        self.http_status == 200 && self.error_msg.is_empty()
    }

    /// The URL this reply answers: the full one when known, otherwise the path and
    /// parameters echoed by the backend.
    pub fn requested_target(&self) -> Option<String> {
        if let Some(url) = &self.requested_url {
            return Some(url.to_string());
        }
        if self.requested_path.is_empty() {
            return None;
        }
        let query = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.requested_params.iter())
            .finish();
        if query.is_empty() {
            Some(self.requested_path.clone())
        } else {
            Some(format!("{}?{}", self.requested_path, query))
        }
    }

    /// Decodes the `response` field. Only meaningful when [`Self::is_success`].
    pub fn journey(&self) -> JourneyResult<JourneyResponse> {
        JourneyResponse::deserialize(&self.response)
            .map_err(|e| JourneyError::MalformedResponse(format!("undecodable response: {}", e)))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JourneyResponse {
    pub journey_params: JourneyParams,
    pub geojson: FeatureCollection,
    #[serde(rename = "EAT")]
    pub eat: i64,
    #[serde(rename = "EAT_str")]
    pub eat_str: String,
    pub journey_duration: i64,
    pub journey_duration_str: String,
    pub walkspeed_km_per_hour: f64,
    pub computing_time_microseconds: i64,
    #[serde(default)]
    pub is_ok: bool,
    #[serde(default)]
    pub error_msg: String,
    #[serde(default)]
    pub printed_journey: Option<String>,
}

/// Echo of the request, as understood (and snapped) by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JourneyParams {
    pub srcid: String,
    pub srcname: String,
    #[serde(default)]
    pub srclon: f64,
    #[serde(default)]
    pub srclat: f64,
    pub src_snap_distance: f64,
    pub dstid: String,
    pub dstname: String,
    #[serde(default)]
    pub dstlon: f64,
    #[serde(default)]
    pub dstlat: f64,
    pub dst_snap_distance: f64,
    pub departure_time: i64,
    pub departure_time_str: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct FeatureCollection {
    #[serde(default)]
    pub features: Vec<Feature>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Feature {
    pub geometry: Geometry,
    #[serde(default, deserialize_with = "null_as_default")]
    pub properties: FeatureProperties,
}

impl Feature {
    /// Line features are the legs of the journey.
    pub fn is_leg(&self) -> bool {
        matches!(self.geometry, Geometry::LineString { .. })
    }

    pub fn is_walk(&self) -> bool {
        self.properties.kind.as_deref() == Some(WALK_LEG)
    }
}

/// GeoJSON position: `[lng, lat]`, optionally followed by an altitude.
pub type Position = Vec<f64>;

/// Horizontal part of a position, `None` when it has less than two components.
pub fn lng_lat(position: &[f64]) -> Option<[f64; 2]> {
    match position {
        [lng, lat, ..] => Some([*lng, *lat]),
        _ => None,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Geometry {
    Point { coordinates: Position },
    LineString { coordinates: Vec<Position> },
    #[serde(other)]
    Unsupported,
}

impl Geometry {
    pub fn type_name(&self) -> &'static str {
        match self {
            Geometry::Point { .. } => "Point",
            Geometry::LineString { .. } => "LineString",
            Geometry::Unsupported => "unsupported geometry",
        }
    }
}

/// Union of the properties found on points and legs; everything is optional
/// and the parser decides what is required.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct FeatureProperties {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub departure_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arrival_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time_str: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub departure_time: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub departure_time_str: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arrival_time: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arrival_time_str: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_duration: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub waiting_duration: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub waiting_duration_str: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub traveling_duration: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_features() {
        let collection: FeatureCollection = serde_json::from_value(json!({
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "geometry": {"type": "Point", "coordinates": [2.3, 48.8]}, "properties": null},
                {"type": "Feature",
                 "geometry": {"type": "LineString", "coordinates": [[2.3, 48.8], [2.4, 48.9]]},
                 "properties": {"type": "walk", "full_duration": 120}},
                {"type": "Feature", "geometry": {"type": "Polygon", "coordinates": []}},
            ]
        }))
        .unwrap();

        let features = &collection.features;
        assert_eq!(features.len(), 3);
        assert!(!features[0].is_leg());
        assert!(features[1].is_leg());
        assert!(features[1].is_walk());
        assert_eq!(features[1].properties.full_duration, Some(120));
        assert_eq!(features[2].geometry, Geometry::Unsupported);
    }

    #[test]
    fn test_positions_may_carry_an_altitude() {
        let feature: Feature = serde_json::from_value(json!({
            "type": "Feature",
            "geometry": {"type": "Point", "coordinates": [2.3, 48.8, 35.0]}
        }))
        .unwrap();

        match &feature.geometry {
            Geometry::Point { coordinates } => assert_eq!(lng_lat(coordinates), Some([2.3, 48.8])),
            other => panic!("expected a point, got {:?}", other),
        }
        assert_eq!(lng_lat(&[2.3]), None);
    }

    #[test]
    fn test_error_reply_has_empty_response() {
        let reply: BackendReply = serde_json::from_value(json!({
            "requested_path": "/journey_between_locations",
            "requested_params": {"src": "2.3,48.8"},
            "response": {},
            "is_ok": false,
            "http_status": 400,
            "error_msg": "missing required parameter 'dst'"
        }))
        .unwrap();

        assert!(!reply.is_success());
        assert!(matches!(reply.journey(), Err(JourneyError::MalformedResponse(_))));
        assert_eq!(
            reply.requested_target().as_deref(),
            Some("/journey_between_locations?src=2.3%2C48.8")
        );
    }

    #[test]
    fn test_requested_url_wins_over_echoed_path() {
        let mut reply: BackendReply = serde_json::from_value(json!({
            "requested_path": "/journey_between_stops",
            "http_status": 200
        }))
        .unwrap();
        assert_eq!(reply.requested_target().as_deref(), Some("/journey_between_stops"));

        reply.requested_url =
            Some(Url::parse("http://localhost:8080/journey_between_stops?srcid=1&dstid=2").unwrap());
        assert_eq!(
            reply.requested_target().as_deref(),
            Some("http://localhost:8080/journey_between_stops?srcid=1&dstid=2")
        );

        reply.requested_path.clear();
        reply.requested_url = None;
        assert_eq!(reply.requested_target(), None);
    }
}
