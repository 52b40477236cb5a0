use std::fs;
use std::path::{Path, PathBuf};

use crate::sdk::error::JourneyResult;
use crate::sdk::journey::service::JourneyProvider;
use crate::sdk::journey::types::BackendReply;
use crate::sdk::location::LatLng;

/// Serves a reply previously saved from the backend, whatever the request.
///
/// The file is read again on every call.
pub struct ReplayJourneyProvider {
    path: PathBuf,
}

impl ReplayJourneyProvider {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn load(&self) -> JourneyResult<BackendReply> {
        log::debug!("[PROVIDER] Replaying backend reply from {}", self.path.display());
        let data = fs::read_to_string(&self.path)?;
        let reply = serde_json::from_str(&data).map_err(|e| {
            log::error!(
                "Failed to parse saved reply {}: {}",
                self.path.display(),
                e
            );
            e
        })?;
        Ok(reply)
    }
}

impl JourneyProvider for ReplayJourneyProvider {
    fn journey_between_locations(
        &self,
        src: LatLng,
        dst: LatLng,
        departure_time: i64,
    ) -> JourneyResult<BackendReply> {
        log::debug!(
            "[PROVIDER] Ignoring request {:?} -> {:?} at {}",
            src,
            dst,
            departure_time
        );
        self.load()
    }

    fn journey_between_stops(
        &self,
        srcid: &str,
        dstid: &str,
        departure_time: i64,
    ) -> JourneyResult<BackendReply> {
        log::debug!(
            "[PROVIDER] Ignoring request {} -> {} at {}",
            srcid,
            dstid,
            departure_time
        );
        self.load()
    }
}
