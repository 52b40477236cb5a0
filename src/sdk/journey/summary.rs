use chrono::NaiveDateTime;
use serde::Serialize;
use std::fmt;
use url::Url;

use super::parsing::{
    extract_first_leg_timing, extract_legs, extract_walk_breakdown, LegView, ParsedLegSummary,
    WalkBreakdown,
};
use super::types::BackendReply;
use super::urls::{
    build_journey_explorer_url, comparator_url_for, journey_explorer_urls, local_comparator_urls,
    local_viewer_urls, url_with_port, MapView, SpeedLink,
};
use crate::sdk::datetime::format_duration;
use crate::sdk::error::JourneyResult;

const PLACEHOLDER: &str = "-";

/// What the info panel displays for one backend reply.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JourneySummary {
    pub http_status: u16,
    pub error_msg: String,
    /// Backend request that produced this reply.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requested_url: Option<String>,
    /// The viewer on the comparison port, see [`JourneySummary::with_viewer_links`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparison_url: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub local_viewer_urls: Vec<SpeedLink>,
    #[serde(flatten)]
    pub journey: Option<JourneyDetails>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JourneyDetails {
    pub srcid: String,
    pub srcname: String,
    pub src_snap_distance: f64,
    pub dstid: String,
    pub dstname: String,
    pub dst_snap_distance: f64,
    pub departure_time: i64,
    pub departure_time_str: String,
    #[serde(rename = "EAT")]
    pub eat: i64,
    #[serde(rename = "EAT_str")]
    pub eat_str: String,
    pub journey_duration: i64,
    pub journey_duration_str: String,
    pub walkspeed_km_per_hour: f64,
    pub computing_time_microseconds: i64,
    #[serde(flatten)]
    pub first_leg: ParsedLegSummary,
    #[serde(flatten)]
    pub walks: WalkBreakdown,
    pub first_walk_str: String,
    pub middle_walks_str: String,
    pub final_walk_str: String,
    pub total_walk_str: String,
    pub comparator_url: String,
    pub local_comparator_url: String,
    pub local_comparator_fast_url: String,
    pub journey_explorer_url: String,
    pub journey_explorer_urls: Vec<SpeedLink>,
    pub legs: Vec<LegView>,
}

impl JourneySummary {
    /// Reset state shown when no journey can be displayed.
    pub fn placeholder(http_status: u16, error_msg: impl Into<String>) -> Self {
        Self {
            http_status,
            error_msg: error_msg.into(),
            requested_url: None,
            comparison_url: None,
            local_viewer_urls: Vec::new(),
            journey: None,
        }
    }

    /// Builds the summary of `reply`.
    ///
    /// Backend errors are reported as data in a placeholder summary; a successful
    /// reply that cannot be parsed is an error for the caller to handle.
    pub fn from_reply(
        reply: &BackendReply,
        map_view: &MapView,
        walking_speed_kmh: f64,
        reference: NaiveDateTime,
    ) -> JourneyResult<Self> {
        if !reply.is_success() {
            log::warn!(
                "Backend answered [{}] {}",
                reply.http_status,
                reply.error_msg
            );
            return Ok(Self {
                requested_url: reply.requested_target(),
                ..Self::placeholder(reply.http_status, reply.error_msg.clone())
            });
        }

        let response = reply.journey()?;
        let first_leg = extract_first_leg_timing(&response)?;
        let walks = extract_walk_breakdown(&response)?;
        let comparator_url = comparator_url_for(&response, map_view, reference)?;
        let (local_comparator_url, local_comparator_fast_url) =
            local_comparator_urls(&comparator_url)?;
        let journey_explorer_url =
            build_journey_explorer_url(&response, walking_speed_kmh, reference)?;
        let journey_explorer_urls = journey_explorer_urls(&response, reference)?;
        let legs = extract_legs(&response);

        let params = response.journey_params;
        let details = JourneyDetails {
            srcid: params.srcid,
            srcname: params.srcname,
            src_snap_distance: params.src_snap_distance,
            dstid: params.dstid,
            dstname: params.dstname,
            dst_snap_distance: params.dst_snap_distance,
            departure_time: params.departure_time,
            departure_time_str: params.departure_time_str,
            eat: response.eat,
            eat_str: response.eat_str,
            journey_duration: response.journey_duration,
            journey_duration_str: response.journey_duration_str,
            walkspeed_km_per_hour: response.walkspeed_km_per_hour,
            computing_time_microseconds: response.computing_time_microseconds,
            first_leg,
            first_walk_str: format_duration(walks.first_walk),
            middle_walks_str: format_duration(walks.middle_walks),
            final_walk_str: format_duration(walks.final_walk),
            total_walk_str: format_duration(walks.total_walk),
            walks,
            comparator_url: comparator_url.into(),
            local_comparator_url: local_comparator_url.into(),
            local_comparator_fast_url: local_comparator_fast_url.into(),
            journey_explorer_url: journey_explorer_url.into(),
            journey_explorer_urls,
            legs,
        };

        Ok(Self {
            http_status: reply.http_status,
            error_msg: reply.error_msg.clone(),
            requested_url: reply.requested_target(),
            comparison_url: None,
            local_viewer_urls: Vec::new(),
            journey: Some(details),
        })
    }

    /// Adds the links to other instances of the viewer showing the same view:
    /// `viewer_url` on the comparison port, and on each local instance port.
    pub fn with_viewer_links(mut self, viewer_url: &Url, comparison_port: u16) -> JourneyResult<Self> {
        self.comparison_url = Some(url_with_port(viewer_url, comparison_port)?.into());
        self.local_viewer_urls = local_viewer_urls(viewer_url)?;
        Ok(self)
    }
}

fn write_speed_links(f: &mut fmt::Formatter<'_>, label: &str, links: &[SpeedLink]) -> fmt::Result {
    writeln!(f, "{:<16}:", label)?;
    for link in links {
        writeln!(f, "  {:>4} km/h : {}", link.walking_speed_kmh, link.url)?;
    }
    Ok(())
}

impl fmt::Display for JourneySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let error = if self.error_msg.is_empty() {
            "none"
        } else {
            self.error_msg.as_str()
        };
        writeln!(f, "status          : {}", self.http_status)?;
        writeln!(f, "error           : {}", error)?;
        writeln!(
            f,
            "backend url     : {}",
            self.requested_url.as_deref().unwrap_or(PLACEHOLDER)
        )?;
        if let Some(comparison_url) = &self.comparison_url {
            writeln!(f, "compare with    : {}", comparison_url)?;
        }
        if !self.local_viewer_urls.is_empty() {
            write_speed_links(f, "local viewers", &self.local_viewer_urls)?;
        }

        let Some(journey) = &self.journey else {
            for label in [
                "source",
                "destination",
                "departure",
                "arrival (EAT)",
                "duration",
                "walks",
            ] {
                writeln!(f, "{:<16}: {}", label, PLACEHOLDER)?;
            }
            return Ok(());
        };

        writeln!(
            f,
            "source          : {} (id {}, snapped at {:.0} m)",
            journey.srcname, journey.srcid, journey.src_snap_distance
        )?;
        writeln!(
            f,
            "destination     : {} (id {}, snapped at {:.0} m)",
            journey.dstname, journey.dstid, journey.dst_snap_distance
        )?;
        writeln!(
            f,
            "departure       : {} (travel begins at {} after waiting {})",
            journey.departure_time_str,
            journey.first_leg.travel_begin_str,
            journey.first_leg.initial_wait_str
        )?;
        writeln!(f, "arrival (EAT)   : {}", journey.eat_str)?;
        writeln!(f, "duration        : {}", journey.journey_duration_str)?;
        writeln!(
            f,
            "walks           : first {} / middle {} / final {} / total {} (at {} km/h)",
            journey.first_walk_str,
            journey.middle_walks_str,
            journey.final_walk_str,
            journey.total_walk_str,
            journey.walkspeed_km_per_hour
        )?;
        for (rank, leg) in journey.legs.iter().enumerate() {
            writeln!(
                f,
                "  leg {:<2} [{:>5}] {} -> {}  departs {}  arrives {}  ({})",
                rank,
                leg.kind,
                leg.departure_id.as_deref().unwrap_or(PLACEHOLDER),
                leg.arrival_id.as_deref().unwrap_or(PLACEHOLDER),
                leg.departure_time_str.as_deref().unwrap_or(PLACEHOLDER),
                leg.arrival_time_str.as_deref().unwrap_or(PLACEHOLDER),
                leg.full_duration_str.as_deref().unwrap_or(PLACEHOLDER)
            )?;
        }
        writeln!(f, "computed in     : {} us", journey.computing_time_microseconds)?;
        writeln!(f, "routemm         : {}", journey.comparator_url)?;
        writeln!(f, "routemm (local) : {}", journey.local_comparator_url)?;
        writeln!(f, "routemm (fast)  : {}", journey.local_comparator_fast_url)?;
        writeln!(f, "navitia         : {}", journey.journey_explorer_url)?;
        write_speed_links(f, "navitia speeds", &journey.journey_explorer_urls)
    }
}
