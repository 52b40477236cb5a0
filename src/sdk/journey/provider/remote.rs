use reqwest::blocking::Client;
use std::time::Duration;
use url::Url;

use crate::sdk::error::{JourneyError, JourneyResult};
use crate::sdk::journey::service::JourneyProvider;
use crate::sdk::journey::types::BackendReply;
use crate::sdk::location::{canonicalize, AxisOrder, CoordSource, LatLng};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

pub struct RemoteJourneyProvider {
    client: Client,
    base_url: Url,
}

impl RemoteJourneyProvider {
    pub fn new(base_url: &str) -> JourneyResult<Self> {
        // without the trailing slash, `join` would drop the last path segment
        let base_url = if base_url.ends_with('/') {
            Url::parse(base_url)?
        } else {
            Url::parse(&format!("{}/", base_url))?
        };

        Ok(Self {
            client: Client::builder().timeout(REQUEST_TIMEOUT).build()?,
            base_url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn locations_url(&self, src: LatLng, dst: LatLng, departure_time: i64) -> JourneyResult<Url> {
        let mut url = self.base_url.join("journey_between_locations")?;
        url.query_pairs_mut()
            .append_pair("src", &canonicalize(&CoordSource::Record(src), AxisOrder::LatLng))
            .append_pair("dst", &canonicalize(&CoordSource::Record(dst), AxisOrder::LatLng))
            .append_pair("departure-time", &departure_time.to_string());
        Ok(url)
    }

    pub fn stops_url(&self, srcid: &str, dstid: &str, departure_time: i64) -> JourneyResult<Url> {
        let mut url = self.base_url.join("journey_between_stops")?;
        url.query_pairs_mut()
            .append_pair("srcid", srcid)
            .append_pair("dstid", dstid)
            .append_pair("departure-time", &departure_time.to_string());
        Ok(url)
    }

    fn fetch(&self, url: Url) -> JourneyResult<BackendReply> {
        log::info!("about to request backend_url = {}", url);

        let response = self.client.get(url.clone()).send().map_err(|e| {
            log::error!("Failed to send GET request. URL: {}\nError: {}", url, e);
            e
        })?;

        // the envelope is meaningful whatever the status
        let status = response.status();
        let text = response.text()?;

        let mut reply: BackendReply = serde_json::from_str(&text).map_err(|e| {
            log::error!(
                "Failed to parse backend reply. URL: {}\nStatus: {}\nError: {}. Body: {}",
                url,
                status,
                e,
                text
            );
            JourneyError::Json(e)
        })?;

        if reply.http_status != status.as_u16() {
            log::warn!(
                "Reply claims status {} but HTTP status is {}",
                reply.http_status,
                status
            );
        }
        log::debug!("[{}] {}", reply.http_status, reply.error_msg);
        reply.requested_url = Some(url);
        Ok(reply)
    }
}

impl JourneyProvider for RemoteJourneyProvider {
    fn journey_between_locations(
        &self,
        src: LatLng,
        dst: LatLng,
        departure_time: i64,
    ) -> JourneyResult<BackendReply> {
        self.fetch(self.locations_url(src, dst, departure_time)?)
    }

    fn journey_between_stops(
        &self,
        srcid: &str,
        dstid: &str,
        departure_time: i64,
    ) -> JourneyResult<BackendReply> {
        self.fetch(self.stops_url(srcid, dstid, departure_time)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locations_url() {
        let provider = RemoteJourneyProvider::new("http://localhost:8080").unwrap();
        let url = provider
            .locations_url(LatLng::new(48.84792, 2.289919), LatLng::new(48.852088, 2.389442), 51300)
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8080/journey_between_locations?src=2.289919%2C48.847920&dst=2.389442%2C48.852088&departure-time=51300"
        );
    }

    #[test]
    fn test_stops_url_keeps_base_path() {
        let provider = RemoteJourneyProvider::new("http://example.org/backend").unwrap();
        let url = provider.stops_url("12", "42", 3600).unwrap();
        assert_eq!(
            url.as_str(),
            "http://example.org/backend/journey_between_stops?srcid=12&dstid=42&departure-time=3600"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            RemoteJourneyProvider::new("not a url"),
            Err(JourneyError::Url(_))
        ));
    }
}
