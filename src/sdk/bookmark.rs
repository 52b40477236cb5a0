// Bookmarkable view: the map position, the markers and the departure time all
// live in the page's query string so that a link reproduces the same journey.
use url::{form_urlencoded, Url};

use super::error::{JourneyError, JourneyResult};
use super::location::{parse_lat_lng, LatLng};

pub const MAP_CENTER_KEY: &str = "mapcenter";
pub const MAP_ZOOM_KEY: &str = "mapzoom";
pub const SRC_KEY: &str = "src";
pub const DST_KEY: &str = "dst";
pub const TIME_KEY: &str = "time";
pub const COMPARISON_PORT_KEY: &str = "comparisonport";

/// Ports below this one are reserved.
pub const MIN_CUSTOM_PORT: u16 = 1025;

/// Port of the viewer instance to compare with, unless the bookmark names one.
pub const DEFAULT_COMPARISON_PORT: u16 = 10001;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewDefaults {
    pub center: LatLng,
    pub zoom: u8,
    pub departure_time: i64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewState {
    pub center: LatLng,
    pub zoom: u8,
    pub src: Option<LatLng>,
    pub dst: Option<LatLng>,
    pub departure_time: i64,
    pub comparison_port: Option<u16>,
    /// src, dst and time were all given: the journey is computed on load.
    pub compute_at_startup: bool,
}

fn first_value(pairs: &[(String, String)], key: &str) -> JourneyResult<String> {
    pairs
        .iter()
        .find(|(name, _)| name == key)
        .map(|(_, value)| value.clone())
        .ok_or_else(|| JourneyError::parse(key, "inexisting param's key"))
}

fn int_param<T: std::str::FromStr>(pairs: &[(String, String)], key: &str) -> JourneyResult<T>
where
    T::Err: std::fmt::Display,
{
    let raw = first_value(pairs, key)?;
    raw.trim().parse::<T>().map_err(|e| JourneyError::parse(&raw, e))
}

fn lat_lng_param(pairs: &[(String, String)], key: &str) -> JourneyResult<LatLng> {
    parse_lat_lng(&first_value(pairs, key)?)
}

fn port_param(pairs: &[(String, String)], key: &str) -> JourneyResult<u16> {
    let port = int_param::<u16>(pairs, key)?;
    if port < MIN_CUSTOM_PORT {
        return Err(JourneyError::parse(
            &port.to_string(),
            format!("port must be in {}-{}", MIN_CUSTOM_PORT, u16::MAX),
        ));
    }
    Ok(port)
}

// Missing or invalid keys are not errors: the default is kept.
fn or_default<T>(key: &str, parsed: JourneyResult<T>) -> Option<T> {
    parsed
        .map_err(|e| log::debug!("bookmark key '{}' ignored: {}", key, e))
        .ok()
}

fn decode(query: &str) -> Vec<(String, String)> {
    form_urlencoded::parse(query.trim_start_matches('?').as_bytes())
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect()
}

impl ViewState {
    pub fn from_query(query: &str, defaults: &ViewDefaults) -> Self {
        let pairs = decode(query);

        let zoom = or_default(MAP_ZOOM_KEY, int_param::<u8>(&pairs, MAP_ZOOM_KEY));
        let center = or_default(MAP_CENTER_KEY, lat_lng_param(&pairs, MAP_CENTER_KEY));
        let src = or_default(SRC_KEY, lat_lng_param(&pairs, SRC_KEY));
        let dst = or_default(DST_KEY, lat_lng_param(&pairs, DST_KEY));
        let departure_time = or_default(TIME_KEY, int_param::<i64>(&pairs, TIME_KEY));
        let comparison_port = or_default(COMPARISON_PORT_KEY, port_param(&pairs, COMPARISON_PORT_KEY));

        Self {
            center: center.unwrap_or(defaults.center),
            zoom: zoom.unwrap_or(defaults.zoom),
            compute_at_startup: src.is_some() && dst.is_some() && departure_time.is_some(),
            src,
            dst,
            departure_time: departure_time.unwrap_or(defaults.departure_time),
            comparison_port,
        }
    }

    /// The keys describing this view, ready for [`update_query`].
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            (MAP_CENTER_KEY, self.center.to_lat_lng_string()),
            (MAP_ZOOM_KEY, self.zoom.to_string()),
        ];
        if let Some(src) = self.src {
            pairs.push((SRC_KEY, src.to_lat_lng_string()));
        }
        if let Some(dst) = self.dst {
            pairs.push((DST_KEY, dst.to_lat_lng_string()));
        }
        pairs.push((TIME_KEY, self.departure_time.to_string()));
        if let Some(port) = self.comparison_port {
            pairs.push((COMPARISON_PORT_KEY, port.to_string()));
        }
        pairs
    }

    pub fn comparison_port_or_default(&self) -> u16 {
        self.comparison_port.unwrap_or(DEFAULT_COMPARISON_PORT)
    }

    /// `viewer_url` updated to show this view; its unrelated keys are kept.
    pub fn bookmark_url(&self, viewer_url: &Url) -> Url {
        let mut url = viewer_url.clone();
        let query = update_query(viewer_url.query().unwrap_or(""), &self.to_query_pairs());
        url.set_query(Some(&query));
        url
    }
}

/// Sets each updated key in `query`: the first occurrence is replaced in place and
/// duplicates are dropped, unknown keys are appended. Other keys are kept.
pub fn update_query(query: &str, updates: &[(&str, String)]) -> String {
    let mut pairs = decode(query);

    for (key, value) in updates {
        match pairs.iter().position(|(name, _)| name == key) {
            Some(index) => {
                pairs[index].1 = value.clone();
                let mut seen = 0;
                pairs.retain(|(name, _)| {
                    if name != key {
                        return true;
                    }
                    seen += 1;
                    seen == 1
                });
            }
            None => pairs.push((key.to_string(), value.clone())),
        }
    }

    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs.iter())
        .finish()
}
