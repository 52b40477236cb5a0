pub mod remote;
pub mod replay;

pub use remote::RemoteJourneyProvider;
pub use replay::ReplayJourneyProvider;
