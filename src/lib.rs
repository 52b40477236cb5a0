pub mod sdk;

pub use sdk::bookmark::{update_query, ViewDefaults, ViewState};
pub use sdk::config::{BackendConfig, ViewerConfig};
pub use sdk::error::{JourneyError, JourneyResult};
pub use sdk::journey::{BackendReply, JourneyProvider, JourneySummary, MapView};
pub use sdk::location::LatLng;
