// Deep links to the two planners we compare against: the routemm viewer and the
// navitia playground.
use chrono::NaiveDateTime;
use serde::Serialize;
use url::{form_urlencoded, Url};

use super::parsing::extract_used_endpoints;
use super::types::JourneyResponse;
use crate::sdk::datetime::{format_for_navitia, format_for_routemm, project_on_reference_weekday};
use crate::sdk::error::{JourneyError, JourneyResult};
use crate::sdk::location::{
    canonicalize, format_fixed, to_m_per_s, AxisOrder, CoordSource, LatLng, Positioned,
    COORD_PRECISION,
};

pub const ROUTEMM_VIEWER_URL: &str = "http://routemm.mappysnap.net/multipath/viewer/map.html";
pub const NAVITIA_JOURNEYS_URL: &str = "https://api.navitia.io/v1/journeys";
pub const NAVITIA_PLAYGROUND_URL: &str = "https://canaltp.github.io/navitia-playground/play.html";

/// A routemm instance running next to the viewer.
pub const LOCAL_ROUTEMM_HOST: &str = "localhost:8888";

/// Speeds (km/h) the journey is replayed at on navitia.
pub const NAVITIA_WALKING_SPEEDS_KMH: [f64; 10] = [4.0, 4.7, 5.4, 6.0, 8.0, 9.3, 10.0, 12.0, 15.0, 18.0];

/// Local viewer instances, one per backend walking speed (km/h).
pub const LOCAL_VIEWER_PORTS: [(u16, f64); 10] = [
    (8041, 4.0),
    (8042, 4.7),
    (8043, 5.4),
    (8044, 6.0),
    (8045, 8.0),
    (8046, 9.3),
    (8047, 10.0),
    (8048, 12.0),
    (8049, 15.0),
    (8050, 18.0),
];

/// A link computed for one walking speed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpeedLink {
    pub walking_speed_kmh: f64,
    pub url: String,
}

/// The part of the map currently displayed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapView {
    pub center: LatLng,
    pub zoom: u8,
}

impl Positioned for MapView {
    fn position(&self) -> LatLng {
        self.center
    }
}

fn departure_time_of(response: &JourneyResponse) -> JourneyResult<u32> {
    let departure_time = response.journey_params.departure_time;
    u32::try_from(departure_time).map_err(|_| {
        JourneyError::MalformedResponse(format!("invalid departure_time : {}", departure_time))
    })
}

/// Link to the routemm viewer. Parameters travel in the fragment, not the query.
///
/// `src` and `dst` are backend pairs (`[lng, lat]`).
pub fn build_comparator_url(
    map_view: &MapView,
    src: [f64; 2],
    dst: [f64; 2],
    departure_time: u32,
    reference: NaiveDateTime,
) -> JourneyResult<Url> {
    let datetime = project_on_reference_weekday(departure_time, reference)?;
    let center = CoordSource::Positioned(map_view).resolve(AxisOrder::LatLng);

    let fragment = form_urlencoded::Serializer::new(String::new())
        .append_pair("zoom", &map_view.zoom.to_string())
        .append_pair("lng", &format_fixed(center.lng, COORD_PRECISION))
        .append_pair("lat", &format_fixed(center.lat, COORD_PRECISION))
        .append_pair("from", &canonicalize(&CoordSource::Pair(src), AxisOrder::LngLat))
        .append_pair("to", &canonicalize(&CoordSource::Pair(dst), AxisOrder::LngLat))
        .append_pair("datetime", &format_for_routemm(&datetime))
        .append_pair("departure", "true")
        .append_pair("providers", "tc")
        .append_pair("walk_speed", "normal")
        .finish();

    let mut url = Url::parse(ROUTEMM_VIEWER_URL)?;
    url.set_fragment(Some(&fragment));
    Ok(url)
}

/// Routemm link for the snapped endpoints of `response`.
pub fn comparator_url_for(
    response: &JourneyResponse,
    map_view: &MapView,
    reference: NaiveDateTime,
) -> JourneyResult<Url> {
    let (src, dst) = extract_used_endpoints(response)?;
    build_comparator_url(map_view, src, dst, departure_time_of(response)?, reference)
}

fn navitia_location(pair: [f64; 2]) -> String {
    canonicalize(&CoordSource::Pair(pair), AxisOrder::LngLat).replacen(',', ";", 1)
}

/// Link to the navitia playground, replaying the equivalent `/journeys` request.
///
/// The request URL is itself a query value of the playground URL, so its own
/// escapes get escaped a second time. The section mode keys are written already
/// escaped (`%5B%5D`), which ends up as `%25255B%25255D` in the final link.
pub fn build_journey_explorer_url(
    response: &JourneyResponse,
    walking_speed_kmh: f64,
    reference: NaiveDateTime,
) -> JourneyResult<Url> {
    let (src, dst) = extract_used_endpoints(response)?;
    let datetime = project_on_reference_weekday(departure_time_of(response)?, reference)?;

    let mut request_url = Url::parse(NAVITIA_JOURNEYS_URL)?;
    request_url
        .query_pairs_mut()
        .append_pair("from", &navitia_location(src))
        .append_pair("to", &navitia_location(dst))
        .append_pair("first_section_mode%5B%5D", "walking")
        .append_pair("last_section_mode%5B%5D", "walking")
        .append_pair("datetime_represents", "departure")
        .append_pair("datetime", &format_for_navitia(&datetime))
        .append_pair("walking_speed", &to_m_per_s(walking_speed_kmh));

    // every byte outside [A-Za-z0-9*-._] is escaped, as encodeURIComponent would
    // for the characters a serialized query can contain
    let request: String = form_urlencoded::byte_serialize(request_url.as_str().as_bytes()).collect();
    log::debug!("navitia request url : {}", request_url);

    Ok(Url::parse(&format!("{}?request={}", NAVITIA_PLAYGROUND_URL, request))?)
}

/// One navitia link per speed of [`NAVITIA_WALKING_SPEEDS_KMH`].
pub fn journey_explorer_urls(
    response: &JourneyResponse,
    reference: NaiveDateTime,
) -> JourneyResult<Vec<SpeedLink>> {
    NAVITIA_WALKING_SPEEDS_KMH
        .iter()
        .map(|&speed| {
            Ok(SpeedLink {
                walking_speed_kmh: speed,
                url: build_journey_explorer_url(response, speed, reference)?.into(),
            })
        })
        .collect()
}

/// The routemm link pointed at [`LOCAL_ROUTEMM_HOST`], with normal then fast walkers.
pub fn local_comparator_urls(comparator_url: &Url) -> JourneyResult<(Url, Url)> {
    let public_host = comparator_url.host_str().unwrap_or_default();
    let normal = Url::parse(&comparator_url.as_str().replacen(public_host, LOCAL_ROUTEMM_HOST, 1))?;

    let mut fast = normal.clone();
    let fragment = normal
        .fragment()
        .unwrap_or_default()
        .replacen("walk_speed=normal", "walk_speed=fast", 1);
    fast.set_fragment(Some(&fragment));
    Ok((normal, fast))
}

/// `viewer_url` served on another port, everything else kept.
pub fn url_with_port(viewer_url: &Url, port: u16) -> JourneyResult<Url> {
    let mut url = viewer_url.clone();
    url.set_port(Some(port))
        .map_err(|_| JourneyError::parse(viewer_url.as_str(), "this URL cannot have a port"))?;
    Ok(url)
}

/// `viewer_url` on each port of [`LOCAL_VIEWER_PORTS`].
pub fn local_viewer_urls(viewer_url: &Url) -> JourneyResult<Vec<SpeedLink>> {
    LOCAL_VIEWER_PORTS
        .iter()
        .map(|&(port, speed)| {
            Ok(SpeedLink {
                walking_speed_kmh: speed,
                url: url_with_port(viewer_url, port)?.into(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sdk::journey::types::BackendReply;
    use chrono::NaiveDate;
    use serde_json::json;

    fn thursday_morning() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2020, 12, 10)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    fn response(departure_time: i64) -> JourneyResponse {
        let reply: BackendReply = serde_json::from_value(json!({
            "http_status": 200,
            "error_msg": "",
            "response": {
                "journey_params": {
                    "srcid": "1", "srcname": "src", "src_snap_distance": 10.0,
                    "dstid": "2", "dstname": "dst", "dst_snap_distance": 20.0,
                    "departure_time": departure_time, "departure_time_str": "14:15:00"
                },
                "geojson": {"features": [
                    {"geometry": {"type": "Point", "coordinates": [2.289919, 48.84792]}},
                    {"geometry": {"type": "LineString", "coordinates": [[2.289919, 48.84792], [2.389442, 48.852088]]},
                     "properties": {"type": "walk", "full_duration": 1200}},
                    {"geometry": {"type": "Point", "coordinates": [2.389442, 48.852088]}}
                ]},
                "EAT": 52500, "EAT_str": "14:35:00",
                "journey_duration": 1200, "journey_duration_str": "20m00s",
                "walkspeed_km_per_hour": 15.0, "computing_time_microseconds": 42
            }
        }))
        .unwrap();
        reply.journey().unwrap()
    }

    #[test]
    fn test_journey_explorer_url_matches_known_playground_link() {
        let url = build_journey_explorer_url(&response(51300), 15.0, thursday_morning()).unwrap();
        assert_eq!(
            url.as_str(),
            "https://canaltp.github.io/navitia-playground/play.html?request=https%3A%2F%2Fapi.navitia.io%2Fv1%2Fjourneys%3Ffrom%3D2.289919%253B48.847920%26to%3D2.389442%253B48.852088%26first_section_mode%25255B%25255D%3Dwalking%26last_section_mode%25255B%25255D%3Dwalking%26datetime_represents%3Ddeparture%26datetime%3D20201214T141500%26walking_speed%3D4.166666666666667"
        );
    }

    #[test]
    fn test_journey_explorer_url_decodes_twice() {
        let url = build_journey_explorer_url(&response(51300), 15.0, thursday_morning()).unwrap();

        let request = url
            .query_pairs()
            .find(|(key, _)| key == "request")
            .map(|(_, value)| value.into_owned())
            .unwrap();
        let request_url = Url::parse(&request).unwrap();
        assert_eq!(request_url.path(), "/v1/journeys");

        let pairs: Vec<(String, String)> = request_url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert!(pairs.contains(&("from".to_string(), "2.289919;48.847920".to_string())));
        assert!(pairs.contains(&("walking_speed".to_string(), "4.166666666666667".to_string())));

        // the bracket escapes survive the first decoding
        let first_modes: Vec<String> = pairs
            .iter()
            .filter(|(key, _)| key == "first_section_mode%5B%5D")
            .map(|(_, value)| value.clone())
            .collect();
        assert_eq!(first_modes, vec!["walking".to_string()]);
        let decoded_key: String = form_urlencoded::parse(b"first_section_mode%5B%5D=x")
            .map(|(key, _)| key.into_owned())
            .collect();
        assert_eq!(decoded_key, "first_section_mode[]");
    }

    #[test]
    fn test_comparator_url() {
        let map_view = MapView {
            center: LatLng::new(48.8566, 2.3522),
            zoom: 13,
        };
        let url = comparator_url_for(&response(51300), &map_view, thursday_morning()).unwrap();
        assert_eq!(url.query(), None);
        assert_eq!(
            url.as_str(),
            "http://routemm.mappysnap.net/multipath/viewer/map.html#zoom=13&lng=2.352200&lat=48.856600&from=2.289919%2C48.847920&to=2.389442%2C48.852088&datetime=20201214T1415&departure=true&providers=tc&walk_speed=normal"
        );
    }

    #[test]
    fn test_one_explorer_url_per_speed() {
        let links = journey_explorer_urls(&response(51300), thursday_morning()).unwrap();
        assert_eq!(links.len(), NAVITIA_WALKING_SPEEDS_KMH.len());
        assert_eq!(links[1].walking_speed_kmh, 4.7);
        assert!(links[1].url.ends_with("walking_speed%3D1.3055555555555556"));
        assert!(links[9].url.ends_with("walking_speed%3D5"));
    }

    #[test]
    fn test_local_comparator_urls() {
        let map_view = MapView {
            center: LatLng::new(48.8566, 2.3522),
            zoom: 13,
        };
        let url = comparator_url_for(&response(51300), &map_view, thursday_morning()).unwrap();
        let (normal, fast) = local_comparator_urls(&url).unwrap();

        assert_eq!(normal.host_str(), Some("localhost"));
        assert_eq!(normal.port(), Some(8888));
        assert_eq!(normal.path(), url.path());
        assert_eq!(normal.fragment(), url.fragment());
        assert!(normal.as_str().ends_with("walk_speed=normal"));
        assert!(fast.as_str().starts_with("http://localhost:8888/multipath/viewer/map.html#zoom=13"));
        assert!(fast.as_str().ends_with("walk_speed=fast"));
    }

    #[test]
    fn test_url_with_port_keeps_the_rest() {
        let viewer = Url::parse("http://devbox:8042/viewer/?src=48.8,2.3&time=51300").unwrap();
        assert_eq!(
            url_with_port(&viewer, 10001).unwrap().as_str(),
            "http://devbox:10001/viewer/?src=48.8,2.3&time=51300"
        );

        let links = local_viewer_urls(&viewer).unwrap();
        assert_eq!(links.len(), LOCAL_VIEWER_PORTS.len());
        assert_eq!(links[0].url, "http://devbox:8041/viewer/?src=48.8,2.3&time=51300");
        assert_eq!(links[9].walking_speed_kmh, 18.0);

        let no_port = Url::parse("mailto:someone@example.org").unwrap();
        assert!(matches!(url_with_port(&no_port, 10001), Err(JourneyError::Parse { .. })));
    }

    #[test]
    fn test_negative_departure_time_is_rejected() {
        let map_view = MapView {
            center: LatLng::new(48.8566, 2.3522),
            zoom: 13,
        };
        assert!(matches!(
            comparator_url_for(&response(-1), &map_view, thursday_morning()),
            Err(JourneyError::MalformedResponse(_))
        ));
    }
}
