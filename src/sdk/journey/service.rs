use super::types::BackendReply;
use crate::sdk::error::JourneyResult;
use crate::sdk::location::LatLng;

/// Source of journey replies.
///
/// Backend-side failures (bad parameters, unknown stops...) come back as an `Ok`
/// reply carrying a status and a message; `Err` is reserved for transport and
/// decoding problems.
pub trait JourneyProvider: Send + Sync {
    /// Journey between two arbitrary locations, snapped by the backend on stops.
    fn journey_between_locations(
        &self,
        src: LatLng,
        dst: LatLng,
        departure_time: i64,
    ) -> JourneyResult<BackendReply>;

    /// Journey between two stops given by their backend ids.
    fn journey_between_stops(
        &self,
        srcid: &str,
        dstid: &str,
        departure_time: i64,
    ) -> JourneyResult<BackendReply>;
}
