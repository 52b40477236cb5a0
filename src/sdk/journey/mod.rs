pub mod parsing;
pub mod provider;
pub mod service;
pub mod summary;
pub mod types;
pub mod urls;

pub use parsing::{
    extract_first_leg_timing, extract_legs, extract_used_endpoints, extract_walk_breakdown,
    LegView, ParsedLegSummary, WalkBreakdown,
};
pub use provider::{RemoteJourneyProvider, ReplayJourneyProvider};
pub use service::JourneyProvider;
pub use summary::{JourneyDetails, JourneySummary};
pub use types::{
    BackendReply, Feature, FeatureCollection, Geometry, JourneyParams, JourneyResponse, Position,
};
pub use urls::{
    build_comparator_url, build_journey_explorer_url, journey_explorer_urls, local_comparator_urls,
    local_viewer_urls, url_with_port, MapView, SpeedLink,
};
