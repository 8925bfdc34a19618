pub mod catalog;
pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod parcel;
pub mod pipeline;
pub mod server;
