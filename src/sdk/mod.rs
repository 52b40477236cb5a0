pub mod bookmark;
pub mod config;
pub mod datetime;
pub mod error;
pub mod journey;
pub mod location;
pub mod util;
