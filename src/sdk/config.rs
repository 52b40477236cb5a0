use std::env;
use std::path::PathBuf;
use url::Url;

use super::error::{JourneyError, JourneyResult};
use super::journey::provider::{RemoteJourneyProvider, ReplayJourneyProvider};
use super::journey::service::JourneyProvider;

pub const BACKEND_URL_VAR: &str = "JOURNEY_BACKEND_URL";
pub const REPLAY_FILE_VAR: &str = "JOURNEY_REPLAY_FILE";
pub const WALKING_SPEED_VAR: &str = "JOURNEY_WALKING_SPEED_KMH";
pub const VIEWER_URL_VAR: &str = "JOURNEY_VIEWER_URL";

pub const DEFAULT_WALKING_SPEED_KMH: f64 = 4.7;

#[derive(Debug, Clone, PartialEq)]
pub enum BackendConfig {
    Remote { base_url: String },
    Replay { path: PathBuf },
}

impl BackendConfig {
    pub fn into_provider(self) -> JourneyResult<Box<dyn JourneyProvider>> {
        match self {
            BackendConfig::Remote { base_url } => {
                log::info!("Using journey backend at {}", base_url);
                Ok(Box::new(RemoteJourneyProvider::new(&base_url)?))
            }
            BackendConfig::Replay { path } => {
                log::info!("Replaying journey reply from {}", path.display());
                Ok(Box::new(ReplayJourneyProvider::new(path)))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewerConfig {
    pub backend: BackendConfig,
    pub walking_speed_kmh: f64,
    /// Where the viewer is served; links to other viewer instances derive from it.
    pub viewer_url: Option<Url>,
}

impl ViewerConfig {
    pub fn from_env() -> JourneyResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// A replay file takes precedence over the remote backend.
    pub fn from_lookup<F>(lookup: F) -> JourneyResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let backend = match (non_empty(REPLAY_FILE_VAR), non_empty(BACKEND_URL_VAR)) {
            (Some(path), _) => BackendConfig::Replay {
                path: PathBuf::from(path),
            },
            (None, Some(base_url)) => BackendConfig::Remote { base_url },
            (None, None) => {
                return Err(JourneyError::Config(format!(
                    "either {} or {} must be set",
                    BACKEND_URL_VAR, REPLAY_FILE_VAR
                )))
            }
        };

        let walking_speed_kmh = match non_empty(WALKING_SPEED_VAR) {
            Some(raw) => {
                let speed = raw.trim().parse::<f64>().map_err(|e| {
                    JourneyError::Config(format!("{}='{}': {}", WALKING_SPEED_VAR, raw, e))
                })?;
                if !(speed.is_finite() && speed > 0.0) {
                    return Err(JourneyError::Config(format!(
                        "{} must be a positive speed, got {}",
                        WALKING_SPEED_VAR, raw
                    )));
                }
                speed
            }
            None => DEFAULT_WALKING_SPEED_KMH,
        };

        let viewer_url = non_empty(VIEWER_URL_VAR)
            .map(|raw| {
                Url::parse(raw.trim()).map_err(|e| {
                    JourneyError::Config(format!("{}='{}': {}", VIEWER_URL_VAR, raw, e))
                })
            })
            .transpose()?;

        Ok(Self {
            backend,
            walking_speed_kmh,
            viewer_url,
        })
    }
}
