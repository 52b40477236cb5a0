use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::{JourneyError, JourneyResult};

/// Decimals of the canonical "lng,lat" form.
pub const COORD_PRECISION: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// "lat,lng" with the canonical precision, as stored in bookmarks.
    pub fn to_lat_lng_string(&self) -> String {
        format!(
            "{},{}",
            format_fixed(self.lat, COORD_PRECISION),
            format_fixed(self.lng, COORD_PRECISION)
        )
    }
}

/// Anything able to report where it currently is (a marker, a map center...).
pub trait Positioned {
    fn position(&self) -> LatLng;
}

/// How a two-element pair should be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AxisOrder {
    #[default]
    LatLng,
    /// GeoJSON order, as used by the backend.
    LngLat,
}

/// The accepted coordinate representations.
pub enum CoordSource<'a> {
    Positioned(&'a dyn Positioned),
    Record(LatLng),
    Pair([f64; 2]),
}

impl CoordSource<'_> {
    pub fn resolve(&self, axis_order: AxisOrder) -> LatLng {
        match self {
            CoordSource::Positioned(item) => item.position(),
            CoordSource::Record(point) => *point,
            CoordSource::Pair([first, second]) => match axis_order {
                AxisOrder::LatLng => LatLng::new(*first, *second),
                AxisOrder::LngLat => LatLng::new(*second, *first),
            },
        }
    }
}

/// Fixed-point rendering; negative zero is printed without its sign.
pub fn format_fixed(value: f64, decimals: usize) -> String {
    let value = if value == 0.0 { 0.0 } else { value };
    format!("{:.*}", decimals, value)
}

/// Canonical "lng,lat" form.
pub fn canonicalize(input: &CoordSource<'_>, axis_order: AxisOrder) -> String {
    let point = input.resolve(axis_order);
    format!(
        "{},{}",
        format_fixed(point.lng, COORD_PRECISION),
        format_fixed(point.lat, COORD_PRECISION)
    )
}

/// Canonicalizes coordinates coming from untyped JSON: `{"lat":..,"lng":..}` or a pair.
pub fn canonicalize_value(value: &Value, axis_order: AxisOrder) -> JourneyResult<String> {
    let source = source_from_value(value)?;
    Ok(canonicalize(&source, axis_order))
}

fn source_from_value(value: &Value) -> JourneyResult<CoordSource<'static>> {
    let unsupported = || JourneyError::UnsupportedCoordinateShape(value.to_string());
    match value {
        Value::Object(fields) => {
            let lat = fields.get("lat").and_then(Value::as_f64).ok_or_else(unsupported)?;
            let lng = fields.get("lng").and_then(Value::as_f64).ok_or_else(unsupported)?;
            Ok(CoordSource::Record(LatLng::new(lat, lng)))
        }
        Value::Array(items) if items.len() == 2 => {
            let first = items[0].as_f64().ok_or_else(unsupported)?;
            let second = items[1].as_f64().ok_or_else(unsupported)?;
            Ok(CoordSource::Pair([first, second]))
        }
        _ => Err(unsupported()),
    }
}

/// Parses "lat,lng" text (bookmarks, CLI arguments).
pub fn parse_lat_lng(text: &str) -> JourneyResult<LatLng> {
    let tokens: Vec<&str> = text.split(',').collect();
    if tokens.len() != 2 {
        return Err(JourneyError::UnsupportedCoordinateShape(format!(
            "'{}' has {} component(s), expected 'lat,lng'",
            text,
            tokens.len()
        )));
    }

    let parse_component = |token: &str| -> JourneyResult<f64> {
        let value = token
            .trim()
            .parse::<f64>()
            .map_err(|e| JourneyError::parse(text, e))?;
        if value.is_finite() {
            Ok(value)
        } else {
            Err(JourneyError::parse(text, "coordinate is not a finite number"))
        }
    };

    Ok(LatLng::new(parse_component(tokens[0])?, parse_component(tokens[1])?))
}

/// Walking speed in m/s, unrounded: 15 km/h -> "4.166666666666667".
pub fn to_m_per_s(speed_km_per_hour: f64) -> String {
    (speed_km_per_hour / 3.6).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Marker(LatLng);

    impl Positioned for Marker {
        fn position(&self) -> LatLng {
            self.0
        }
    }

    #[test]
    fn test_every_representation_gives_the_same_string() {
        let point = LatLng::new(48.84792, 2.289919);
        let marker = Marker(point);
        let expected = "2.289919,48.847920";

        assert_eq!(canonicalize(&CoordSource::Positioned(&marker), AxisOrder::LatLng), expected);
        assert_eq!(canonicalize(&CoordSource::Record(point), AxisOrder::LatLng), expected);
        assert_eq!(
            canonicalize(&CoordSource::Pair([48.84792, 2.289919]), AxisOrder::LatLng),
            expected
        );
        assert_eq!(
            canonicalize(&CoordSource::Pair([2.289919, 48.84792]), AxisOrder::LngLat),
            expected
        );
        assert_eq!(
            canonicalize_value(&json!({"lat": 48.84792, "lng": 2.289919}), AxisOrder::LatLng)
                .unwrap(),
            expected
        );
        assert_eq!(
            canonicalize_value(&json!([2.289919, 48.84792]), AxisOrder::LngLat).unwrap(),
            expected
        );
    }

    #[test]
    fn test_axis_order_does_not_affect_records() {
        let point = LatLng::new(44.837789, -0.57918);
        assert_eq!(
            canonicalize(&CoordSource::Record(point), AxisOrder::LngLat),
            canonicalize(&CoordSource::Record(point), AxisOrder::LatLng)
        );
    }

    #[test]
    fn test_precision_and_rounding() {
        assert_eq!(
            canonicalize(&CoordSource::Pair([1.0, -2.5]), AxisOrder::LatLng),
            "-2.500000,1.000000"
        );
        assert_eq!(format_fixed(48.8566667, 6), "48.856667");
        assert_eq!(format_fixed(-0.0, 6), "0.000000");
    }

    #[test]
    fn test_unsupported_shapes() {
        for value in [
            json!([1.0]),
            json!([1.0, 2.0, 3.0]),
            json!({"lat": 1.0}),
            json!({"lat": "1.0", "lng": 2.0}),
            json!("48.8,2.3"),
            json!(null),
        ] {
            match canonicalize_value(&value, AxisOrder::LatLng) {
                Err(JourneyError::UnsupportedCoordinateShape(_)) => {}
                other => panic!("expected unsupported shape for {}, got {:?}", value, other),
            }
        }
    }

    #[test]
    fn test_parse_lat_lng() {
        assert_eq!(parse_lat_lng("48.85, 2.35").unwrap(), LatLng::new(48.85, 2.35));
        assert!(matches!(
            parse_lat_lng("48.85"),
            Err(JourneyError::UnsupportedCoordinateShape(_))
        ));
        assert!(matches!(parse_lat_lng("abc,2.35"), Err(JourneyError::Parse { .. })));
        assert!(matches!(parse_lat_lng("NaN,2.35"), Err(JourneyError::Parse { .. })));
    }

    #[test]
    fn test_to_m_per_s() {
        assert_eq!(to_m_per_s(15.0), "4.166666666666667");
        assert_eq!(to_m_per_s(4.7), "1.3055555555555556");
        assert_eq!(to_m_per_s(3.6), "1");
        // nothing is lost on the way to the URL
        for speed in [4.0, 4.7, 5.4, 9.3, 18.0] {
            assert_eq!(to_m_per_s(speed).parse::<f64>().unwrap(), speed / 3.6);
        }
    }
}
